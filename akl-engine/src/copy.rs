use crate::boxes::{AndBox, AndBoxArena, ChoiceBox, ChoiceBoxArena, Constraint, SuspendOn};
use crate::envs::EnvArena;
use crate::ids::{AndBoxId, ChoiceBoxId};
use crate::trail::Mark;
use crate::varstore::VariableStore;
use akl_ir::{EnvId, EnvParent, Term, VarId};
use rustc_hash::FxHashMap;

/// The result of a subtree copy: the copy of `mother` itself, plus the
/// identity maps used to build it. Callers that need to find the copy
/// of some other entity inside the subtree (e.g. the fork choice-box
/// and the candidate and-box a split pivots on) look it up here rather
/// than re-deriving it.
pub struct CopyResult {
    pub mother_copy: AndBoxId,
    pub andbox_map: FxHashMap<AndBoxId, AndBoxId>,
    pub choicebox_map: FxHashMap<ChoiceBoxId, ChoiceBoxId>,
}

/// Deep-copies the subtree rooted at `mother`, producing a structurally
/// identical and-box with every local entity (and-boxes, choice-boxes,
/// variables whose env lies inside the subtree) fresh, and every
/// external variable shared with the original (§4.H).
///
/// `mother`'s own env keeps its existing parent -- the copy is meant
/// to become a sibling of `mother`, not a child of it.
pub fn copy_subtree(
    envs: &mut EnvArena,
    vars: &mut VariableStore,
    andboxes: &mut AndBoxArena,
    choiceboxes: &mut ChoiceBoxArena,
    mother: AndBoxId,
) -> CopyResult {
    let mother_env = andboxes.get(mother).env;
    let parent_env = envs.parent(mother_env).unwrap_or(mother_env);
    let mut ctx = Copier {
        envs,
        vars,
        andboxes,
        choiceboxes,
        andbox_map: FxHashMap::default(),
        choicebox_map: FxHashMap::default(),
        env_map: FxHashMap::default(),
        var_map: FxHashMap::default(),
        touched_externals: Vec::new(),
    };
    let mother_copy = ctx.copy_andbox(mother, parent_env, None);
    ctx.add_external_suspensions_into_copy();
    CopyResult {
        mother_copy,
        andbox_map: ctx.andbox_map,
        choicebox_map: ctx.choicebox_map,
    }
}

struct Copier<'a> {
    envs: &'a mut EnvArena,
    vars: &'a mut VariableStore,
    andboxes: &'a mut AndBoxArena,
    choiceboxes: &'a mut ChoiceBoxArena,
    andbox_map: FxHashMap<AndBoxId, AndBoxId>,
    choicebox_map: FxHashMap<ChoiceBoxId, ChoiceBoxId>,
    env_map: FxHashMap<EnvId, EnvId>,
    var_map: FxHashMap<VarId, VarId>,
    /// Variables discovered to be external to the subtree (shared
    /// rather than copied) that turned out to have at least one
    /// suspension pointing into it. Recorded so we can add the
    /// mirrored suspension onto the copy once every id is known
    /// (§4.H: "an external variable that has suspensions into the
    /// subtree receives an added suspension pointing at the copy").
    touched_externals: Vec<VarId>,
}

impl<'a> Copier<'a> {
    fn copy_env(&mut self, old: EnvId, new_parent: EnvId) -> EnvId {
        if let Some(&e) = self.env_map.get(&old) {
            return e;
        }
        let fresh = self.envs.child_of(new_parent);
        self.env_map.insert(old, fresh);
        fresh
    }

    /// Copies `old` if its env lies inside the subtree (the env was
    /// already remapped by a `copy_env` call from an ancestor
    /// and-box); otherwise the variable is external and is shared
    /// as-is.
    fn copy_var(&mut self, old: VarId) -> VarId {
        if let Some(&v) = self.var_map.get(&old) {
            return v;
        }
        let old_env = self.vars.env_of(old);
        let local = old_env.map_or(false, |e| self.env_map.contains_key(&e));
        if !local {
            self.var_map.insert(old, old);
            self.touched_externals.push(old);
            return old;
        }
        let new_env = self.env_map[&old_env.unwrap()];
        let fresh = self.vars.alloc(Some(new_env));
        self.var_map.insert(old, fresh);

        if let Some(binding) = self.vars.binding_of(old) {
            let copied = self.copy_term(&binding);
            self.vars.set_binding_for_copy(fresh, Some(copied));
        }
        let suspensions: Vec<SuspendOn> = self
            .vars
            .suspensions_of(old)
            .iter()
            .filter_map(|s| self.copy_suspend_on(*s))
            .collect();
        for s in suspensions {
            self.vars.suspend(fresh, s);
        }
        fresh
    }

    fn copy_suspend_on(&mut self, s: SuspendOn) -> Option<SuspendOn> {
        match s {
            SuspendOn::AndBox(id) => self.andbox_map.get(&id).map(|&i| SuspendOn::AndBox(i)),
            SuspendOn::ChoiceBox(id) => self.choicebox_map.get(&id).map(|&i| SuspendOn::ChoiceBox(i)),
        }
    }

    fn copy_term(&mut self, term: &Term) -> Term {
        match term {
            Term::Var(v) => Term::Var(self.copy_var(*v)),
            Term::Compound(f, args) => {
                Term::Compound(*f, args.iter().map(|a| self.copy_term(a)).collect())
            }
            Term::Cons(h, t) => Term::cons(self.copy_term(h), self.copy_term(t)),
            other => other.clone(),
        }
    }

    fn copy_andbox(
        &mut self,
        old_id: AndBoxId,
        new_parent_env: EnvId,
        new_father: Option<ChoiceBoxId>,
    ) -> AndBoxId {
        let (old_env, status, guard_type, goals, body_goals, unifiers, constraints, tried, local_vars, trail_mark) = {
            let old = self.andboxes.get(old_id);
            (
                old.env,
                old.status,
                old.guard_type,
                old.goals.clone(),
                old.body_goals.clone(),
                old.unifiers.clone(),
                old.constraints.clone(),
                old.tried.clone(),
                old.local_vars.clone(),
                old.trail_mark,
            )
        };

        let new_env = self.copy_env(old_env, new_parent_env);
        let new_id = self
            .andboxes
            .alloc(AndBox::new(new_env, new_father, trail_mark, guard_type));
        self.andbox_map.insert(old_id, new_id);

        let new_goals = goals.iter().map(|t| self.copy_term(t)).collect();
        let new_body_goals = body_goals.iter().map(|t| self.copy_term(t)).collect();
        let new_unifiers = unifiers
            .iter()
            .map(|(v, t)| (self.copy_var(*v), self.copy_term(t)))
            .collect();
        let new_constraints: Vec<Constraint> = constraints
            .iter()
            .map(|c| Constraint {
                var: self.copy_var(c.var),
                entailed: c.entailed,
            })
            .collect();
        let new_local_vars = local_vars.iter().map(|v| self.copy_var(*v)).collect();
        let new_tried: Vec<ChoiceBoxId> = tried
            .iter()
            .map(|&cb| self.copy_choicebox(cb, new_id))
            .collect();

        let b = self.andboxes.get_mut(new_id);
        b.status = status;
        b.goals = new_goals;
        b.body_goals = new_body_goals;
        b.unifiers = new_unifiers;
        b.constraints = new_constraints;
        b.local_vars = new_local_vars;
        b.tried = new_tried;
        new_id
    }

    fn copy_choicebox(&mut self, old_id: ChoiceBoxId, new_father: AndBoxId) -> ChoiceBoxId {
        let (guard_type, alternatives, untried) = {
            let old = self.choiceboxes.get(old_id);
            (old.guard_type, old.alternatives.clone(), old.untried.clone())
        };
        let new_id = self.choiceboxes.alloc(ChoiceBox::new(new_father, guard_type));
        self.choicebox_map.insert(old_id, new_id);

        let new_env = self.andboxes.get(new_father).env;
        let new_alts: Vec<AndBoxId> = alternatives
            .iter()
            .map(|&a| self.copy_andbox(a, new_env, Some(new_id)))
            .collect();

        let cb = self.choiceboxes.get_mut(new_id);
        cb.alternatives = new_alts;
        cb.untried = untried;
        crate::boxes::link_alternatives(self.andboxes, cb);
        new_id
    }

    fn add_external_suspensions_into_copy(&mut self) {
        let externals = std::mem::take(&mut self.touched_externals);
        for var in externals {
            let additions: Vec<SuspendOn> = self
                .vars
                .suspensions_of(var)
                .iter()
                .filter_map(|s| self.copy_suspend_on(*s))
                .collect();
            for add in additions {
                self.vars.suspend(var, add);
            }
        }
    }
}
