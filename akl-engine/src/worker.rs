use crate::boxes::{AndBox, AndBoxArena, BoxStatus, ChoiceBox, ChoiceBoxArena, SuspendOn};
use crate::builtins::{BuiltinCtx, BuiltinOutcome, Builtins};
use crate::clause::{Clause, GuardType, Program};
use crate::copy::copy_subtree;
use crate::envs::EnvArena;
use crate::error::Failed;
use crate::guard::{self, Prune};
use crate::ids::AndBoxId;
use crate::task::{Task, TaskQueue, Work};
use crate::trail::Trail;
use crate::unify::unify;
use crate::varstore::VariableStore;
use akl_ir::{Atom, Term};
use tracing::{debug, instrument, trace};

/// What happened as a result of one [`Forest::step`] call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Event {
    /// Work happened; call `step` again.
    Progress,
    /// A root and-box reached a fully solved, unpromoted configuration
    /// -- a query solution. It has been removed from the active root
    /// set; the caller is responsible for reflecting its bindings.
    Solution(AndBoxId),
    /// No candidate exists to split and the task queue is empty, but
    /// at least one root is still unsolved (§4.G: "the computation is
    /// deadlocked").
    Deadlocked,
    /// Every root has produced its solution (or failed) and there is
    /// nothing left to do.
    Done,
}

/// Owns every arena the execution core touches and drives the
/// scheduling loop of component G. Generic over the built-in set so
/// the engine doesn't depend on any particular predicate
/// implementation (§6.2).
pub struct Forest<B: Builtins> {
    pub envs: EnvArena,
    pub vars: VariableStore,
    pub trail: Trail,
    pub andboxes: AndBoxArena,
    pub choiceboxes: ChoiceBoxArena,
    pub tasks: TaskQueue,
    pub program: Program,
    pub builtins: B,
    /// Top-level and-boxes being driven concurrently: the query root,
    /// plus one more each time a split peels a solution off of it.
    pub roots: Vec<AndBoxId>,
}

impl<B: Builtins> Forest<B> {
    pub fn new(program: Program, builtins: B) -> Self {
        Forest {
            envs: EnvArena::new(),
            vars: VariableStore::new(),
            trail: Trail::new(),
            andboxes: AndBoxArena::new(),
            choiceboxes: ChoiceBoxArena::new(),
            tasks: TaskQueue::new(),
            program,
            builtins,
            roots: Vec::new(),
        }
    }

    /// Seeds a new root and-box with `goal` in a fresh child of
    /// `parent_env` and schedules it to start running (§6.3 step 3).
    pub fn seed_root(&mut self, parent_env: akl_ir::EnvId, goal: Term) -> AndBoxId {
        let env = self.envs.child_of(parent_env);
        let mut andbox = AndBox::new(env, None, self.trail.mark(), GuardType::None);
        andbox.goals.push_back(goal);
        let id = self.andboxes.alloc(andbox);
        self.roots.push(id);
        self.tasks.push(Task::Start(id));
        id
    }

    /// Runs one unit of scheduling work. Call repeatedly until it
    /// returns `Deadlocked` or `Done`.
    #[instrument(skip(self))]
    pub fn step(&mut self) -> Event {
        if let Some(pos) = self.roots.iter().position(|&r| {
            let b = self.andboxes.get(r);
            b.father.is_none() && b.status != BoxStatus::Dead && b.solved()
        }) {
            let id = self.roots.remove(pos);
            debug!(andbox = ?id, "solution");
            return Event::Solution(id);
        }

        match self.tasks.pop() {
            Some(Work::Wake(a)) => {
                self.recheck(a);
                Event::Progress
            }
            Some(Work::Recall(_choice)) => {
                // The minimal built-in set never posts a constraint
                // that would populate the recall stream; nothing to
                // do until one does.
                Event::Progress
            }
            Some(Work::Task(Task::Start(a))) | Some(Work::Task(Task::Promote(a))) => {
                self.recheck(a);
                Event::Progress
            }
            Some(Work::Task(Task::Split(candidate))) => {
                self.split(candidate);
                Event::Progress
            }
            None => {
                if let Some(candidate) = self.find_candidate() {
                    trace!(andbox = ?candidate, "found split candidate");
                    self.tasks.push(Task::Split(candidate));
                    Event::Progress
                } else if self.roots.is_empty() {
                    Event::Done
                } else {
                    Event::Deadlocked
                }
            }
        }
    }

    /// Expands `a`'s pending goals until it suspends, fails, or runs
    /// out of goals to expand (either solved, or blocked behind a
    /// still-open choice-box), then checks promotion eligibility.
    fn recheck(&mut self, a: AndBoxId) {
        loop {
            if self.andboxes.get(a).status == BoxStatus::Dead {
                return;
            }
            let andbox = self.andboxes.get(a);
            if andbox.tried.is_empty() && !andbox.goals.is_empty() {
                let goal = self.andboxes.get_mut(a).goals.pop_front().unwrap();
                match self.dispatch_goal(a, goal) {
                    Ok(true) => continue,
                    Ok(false) => return, // suspended; goal already requeued
                    Err(Failed) => {
                        self.fail(a);
                        return;
                    }
                }
            } else if andbox.solved() {
                self.try_promote_if_eligible(a);
                return;
            } else {
                return; // blocked behind an open choice-box
            }
        }
    }

    /// Dispatches one goal of `a`. Returns `Ok(true)` to keep
    /// expanding `a`'s remaining goals, `Ok(false)` if `a` suspended
    /// on this goal (it has already been pushed back), or `Err` if the
    /// goal failed outright.
    fn dispatch_goal(&mut self, a: AndBoxId, goal: Term) -> Result<bool, Failed> {
        let goal = self.vars.deref(&goal);
        match &goal {
            Term::Compound(f, args) if *f == Atom::new(",") && args.len() == 2 => {
                let andbox = self.andboxes.get_mut(a);
                andbox.goals.push_front(args[1].clone());
                andbox.goals.push_front(args[0].clone());
                Ok(true)
            }
            Term::Compound(f, args) if *f == Atom::new(";") && args.len() == 2 => {
                self.expand_disjunction(a, args[0].clone(), args[1].clone());
                Ok(true)
            }
            Term::Compound(f, args) if *f == Atom::new("->") && args.len() == 2 => {
                self.expand_if_then(a, args[0].clone(), args[1].clone(), Term::atom("fail"));
                Ok(true)
            }
            Term::Compound(f, args) if *f == Atom::new("\\+") && args.len() == 1 => {
                if self.solve_isolated(a, args[0].clone()) {
                    Err(Failed)
                } else {
                    Ok(true)
                }
            }
            _ => self.dispatch_call(a, &goal),
        }
    }

    /// An `(Cond -> Then ; Else)` term is parsed by `dispatch_goal` as
    /// nested binary compounds; this handles the common three-argument
    /// shape directly when the outer functor is `;` wrapping a `->`.
    fn expand_if_then(&mut self, a: AndBoxId, cond: Term, then: Term, els: Term) {
        if self.solve_isolated(a, cond) {
            self.andboxes.get_mut(a).goals.push_front(then);
        } else {
            self.andboxes.get_mut(a).goals.push_front(els);
        }
    }

    fn expand_disjunction(&mut self, a: AndBoxId, left: Term, right: Term) {
        // `(Cond -> Then ; Else)` surfaces as `;(->(Cond,Then), Else)`;
        // recognise that shape here so it runs as if-then-else rather
        // than an ordinary two-way disjunction.
        if let Term::Compound(f, args) = &left {
            if *f == Atom::new("->") && args.len() == 2 {
                self.expand_if_then(a, args[0].clone(), args[1].clone(), right);
                return;
            }
        }
        let env = self.andboxes.get(a).env;
        let choice_id = self
            .choiceboxes
            .alloc(ChoiceBox::new(a, GuardType::None));
        for branch in [left, right] {
            let child_env = self.envs.child_of(env);
            let mut child = AndBox::new(child_env, Some(choice_id), self.trail.mark(), GuardType::None);
            child.goals.push_back(branch);
            let child_id = self.andboxes.alloc(child);
            self.choiceboxes.get_mut(choice_id).alternatives.push(child_id);
        }
        crate::boxes::link_alternatives(&mut self.andboxes, self.choiceboxes.get(choice_id));
        self.andboxes.get_mut(a).tried.push(choice_id);
        for &alt in &self.choiceboxes.get(choice_id).alternatives.clone() {
            self.tasks.push(Task::Start(alt));
        }
    }

    fn dispatch_call(&mut self, a: AndBoxId, goal: &Term) -> Result<bool, Failed> {
        let (name, arity) = match goal.functor_arity() {
            Some(fa) => fa,
            None => return Err(Failed), // a bare variable or number isn't callable
        };
        let args: Vec<Term> = match goal {
            Term::Compound(_, args) => args.to_vec(),
            Term::Cons(h, t) => vec![(**h).clone(), (**t).clone()],
            _ => Vec::new(),
        };

        if let Some(outcome) = self.call_builtin(a, name, &args) {
            return match outcome {
                BuiltinOutcome::Succeeded => Ok(true),
                BuiltinOutcome::Failed => Err(Failed),
                BuiltinOutcome::Suspended(var) => {
                    self.andboxes.get_mut(a).goals.push_front(goal.clone());
                    self.vars.suspend(var, SuspendOn::AndBox(a));
                    self.andboxes.get_mut(a).status = BoxStatus::Unstable;
                    Ok(false)
                }
            };
        }

        let clauses = match self.program.clauses(name, arity) {
            Some(cs) if !cs.is_empty() => cs.to_vec(),
            _ => return Err(Failed),
        };
        self.expand_call(a, goal, &clauses)?;
        Ok(true)
    }

    fn call_builtin(&mut self, a: AndBoxId, name: Atom, args: &[Term]) -> Option<BuiltinOutcome> {
        let mut woken = Vec::new();
        let outcome = {
            let andbox = self.andboxes.get_mut(a);
            let mut ctx = BuiltinCtx {
                envs: &self.envs,
                vars: &mut self.vars,
                trail: &mut self.trail,
                andbox_id: a,
                andbox,
                woken: &mut woken,
            };
            self.builtins.call(name, args, &mut ctx)
        };
        self.wake_all(woken);
        outcome
    }

    /// Creates one child and-box per matching clause, all sharing a
    /// fresh choice-box, per §4.C's atomic-goal rule.
    fn expand_call(&mut self, a: AndBoxId, goal: &Term, clauses: &[Clause]) -> Result<(), Failed> {
        let parent_env = self.andboxes.get(a).env;
        let choice_id = self.choiceboxes.alloc(ChoiceBox::new(a, GuardType::None));
        let mut alternatives = Vec::new();

        for clause in clauses {
            let child_env = self.envs.child_of(parent_env);
            let (head, clause_guard, body) = clause.instantiate(&mut self.vars, child_env);
            let mark = self.trail.mark();
            let mut child = AndBox::new(child_env, Some(choice_id), mark, clause.guard_type);
            child.body_goals.push_back(body);
            let child_id = self.andboxes.alloc(child);

            let mut woken = Vec::new();
            let unify_result = {
                let child = self.andboxes.get_mut(child_id);
                unify(&self.envs, &mut self.vars, &mut self.trail, child_id, child, &head, goal, &mut woken)
            };
            match unify_result {
                Ok(()) => {
                    if !matches!(clause.guard_type, GuardType::None) {
                        self.andboxes.get_mut(child_id).goals.push_back(clause_guard);
                    }
                    alternatives.push(child_id);
                }
                Err(Failed) => {
                    self.andboxes.get_mut(child_id).status = BoxStatus::Dead;
                    self.trail.undo_to(mark, |v| self.vars.unbind(v));
                }
            }
            self.wake_all(woken);
        }

        if alternatives.is_empty() {
            return Err(Failed);
        }

        self.choiceboxes.get_mut(choice_id).alternatives = alternatives.clone();
        crate::boxes::link_alternatives(&mut self.andboxes, self.choiceboxes.get(choice_id));
        self.andboxes.get_mut(a).tried.push(choice_id);
        for alt in alternatives {
            self.tasks.push(Task::Start(alt));
        }
        Ok(())
    }

    fn try_promote_if_eligible(&mut self, a: AndBoxId) {
        let current = self.trail.mark();
        if let Some(scope) = guard::eligible_to_promote(&self.andboxes, &self.choiceboxes, a, current) {
            guard::promote(
                &mut self.envs,
                &mut self.vars,
                &mut self.trail,
                &mut self.andboxes,
                &mut self.choiceboxes,
                &mut self.tasks,
                a,
                scope,
            );
        }
    }

    /// Marks `a` dead, undoes its own trail contribution, and
    /// propagates failure per §4.F.
    fn fail(&mut self, a: AndBoxId) {
        let mark = self.andboxes.get(a).trail_mark;
        self.trail.undo_to(mark, |v| self.vars.unbind(v));
        self.andboxes.get_mut(a).status = BoxStatus::Dead;

        let father = match self.andboxes.get(a).father {
            Some(f) => f,
            None => {
                self.roots.retain(|&r| r != a);
                return;
            }
        };
        self.choiceboxes.get_mut(father).alternatives.retain(|&x| x != a);
        crate::boxes::link_alternatives(&mut self.andboxes, self.choiceboxes.get(father));

        let grandparent = self.choiceboxes.get(father).father;
        if let Some(&only) = self.choiceboxes.get(father).alternatives.first() {
            if self.choiceboxes.get(father).is_determinate() {
                self.tasks.push(Task::Promote(only));
            }
            return;
        }
        if !self.choiceboxes.get(father).untried.is_empty() {
            return;
        }
        // no live alternatives and nothing left to try: fail the parent.
        self.choiceboxes.get_mut(father).alternatives.clear();
        self.andboxes.get_mut(grandparent).tried.retain(|&c| c != father);
        self.fail(grandparent);
    }

    fn wake_all(&mut self, woken: Vec<SuspendOn>) {
        for w in woken {
            match w {
                SuspendOn::AndBox(id) => self.tasks.push_wake(id),
                SuspendOn::ChoiceBox(id) => self.tasks.push_recall(id),
            }
        }
    }

    /// Runs `goal` to its first solution in a fresh isolated and-box,
    /// restoring every stream to how it was before regardless of
    /// outcome (§3.7, §4.C negation / if-then-else condition).
    fn solve_isolated(&mut self, parent: AndBoxId, goal: Term) -> bool {
        let parent_env = self.andboxes.get(parent).env;
        let trail_mark = self.trail.mark();

        let env = self.envs.child_of(parent_env);
        let mut andbox = AndBox::new(env, None, trail_mark, GuardType::None);
        andbox.goals.push_back(goal);
        let root = self.andboxes.alloc(andbox);

        let saved_roots = std::mem::replace(&mut self.roots, vec![root]);
        // A private queue, not just a mark on the shared one: the outer
        // computation may already have work queued (e.g. sibling
        // `Task::Start` entries from `expand_call`'s per-clause loop),
        // and that work must stay untouched while this isolated root
        // runs, not get popped as if it belonged to it.
        let saved_tasks = std::mem::replace(&mut self.tasks, TaskQueue::new());
        self.tasks.push(Task::Start(root));

        let solved = loop {
            match self.step() {
                Event::Solution(id) if id == root => break true,
                Event::Solution(_) => continue,
                Event::Deadlocked | Event::Done => break false,
                Event::Progress => continue,
            }
        };
        self.roots = saved_roots;
        self.tasks = saved_tasks;

        self.trail.undo_to(trail_mark, |v| self.vars.unbind(v));
        solved
    }

    /// Finds the deepest, leftmost candidate to split (§4.G), scanning
    /// every active root's live frontier.
    fn find_candidate(&self) -> Option<AndBoxId> {
        let mut best: Option<(usize, AndBoxId)> = None;
        for &r in &self.roots {
            self.find_candidates_in(r, 0, &mut best);
        }
        best.map(|(_, id)| id)
    }

    fn find_candidates_in(&self, a: AndBoxId, depth: usize, best: &mut Option<(usize, AndBoxId)>) {
        let andbox = self.andboxes.get(a);
        if andbox.status == BoxStatus::Dead {
            return;
        }
        if andbox.solved() {
            if let Some(father) = andbox.father {
                let c = self.choiceboxes.get(father);
                let is_wait_family = matches!(andbox.guard_type, GuardType::None | GuardType::Wait);
                if is_wait_family && !c.is_last(a) {
                    if best.map_or(true, |(d, _)| depth > d) {
                        *best = Some((depth, a));
                    }
                }
            }
            return;
        }
        for &cb_id in &andbox.tried {
            let cb = self.choiceboxes.get(cb_id);
            for &alt in &cb.alternatives {
                self.find_candidates_in(alt, depth + 1, best);
            }
        }
    }

    /// Splits the subtree of `candidate`'s grandparent ("mother") so
    /// `candidate` can promote independently of its siblings (§4.G).
    fn split(&mut self, candidate: AndBoxId) {
        let fork = self
            .andboxes
            .get(candidate)
            .father
            .expect("a split candidate always has a parent choice-box");
        let mother = self.choiceboxes.get(fork).father;

        let result = copy_subtree(&mut self.envs, &mut self.vars, &mut self.andboxes, &mut self.choiceboxes, mother);
        let mother_copy = result.mother_copy;
        let fork_copy = result.choicebox_map[&fork];
        let candidate_copy = result.andbox_map[&candidate];

        // In the copy, only the candidate's copy survives in the fork.
        guard::prune(&mut self.andboxes, &mut self.choiceboxes, fork_copy, candidate_copy, Prune::AllSiblings);

        // In the original, the candidate is removed; its siblings carry on.
        self.choiceboxes.get_mut(fork).alternatives.retain(|&x| x != candidate);
        crate::boxes::link_alternatives(&mut self.andboxes, self.choiceboxes.get(fork));
        self.andboxes.get_mut(candidate).status = BoxStatus::Dead;

        match self.andboxes.get(mother).father {
            Some(parent_choice) => {
                let pc = self.choiceboxes.get_mut(parent_choice);
                let pos = pc.alternatives.iter().position(|&x| x == mother).unwrap_or(pc.alternatives.len());
                pc.alternatives.insert(pos, mother_copy);
                crate::boxes::link_alternatives(&mut self.andboxes, pc);
            }
            None => {
                let pos = self.roots.iter().position(|&x| x == mother).unwrap_or(self.roots.len());
                self.roots.insert(pos, mother_copy);
            }
        }

        if self.choiceboxes.get(fork).is_determinate() {
            if let Some(&only) = self.choiceboxes.get(fork).alternatives.first() {
                self.tasks.push(Task::Promote(only));
            }
        }
        self.tasks.push(Task::Promote(candidate_copy));
        self.tasks.push(Task::Start(mother_copy));
    }
}
