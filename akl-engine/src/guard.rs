use crate::boxes::{link_alternatives, AndBoxArena, BoxStatus, ChoiceBoxArena};
use crate::clause::GuardType;
use crate::envs::EnvArena;
use crate::ids::AndBoxId;
use crate::task::{Task, TaskQueue};
use crate::trail::{Mark, Trail};
use crate::varstore::VariableStore;
use akl_ir::is_local;

/// How far a guard's promotion prunes its siblings (§4.D's "On
/// promote, prune" column).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Prune {
    None,
    RightSiblings,
    AllSiblings,
}

/// Checks the §4.D dispatch table for a solved and-box `a` sitting in
/// choice-box `c`. Returns the prune scope to apply if `a` is eligible
/// to promote right now, or `None` if its guard's conditions aren't
/// met yet.
pub fn eligible_to_promote(
    andboxes: &AndBoxArena,
    choiceboxes: &ChoiceBoxArena,
    a: AndBoxId,
    current_trail: Mark,
) -> Option<Prune> {
    let andbox = andboxes.get(a);
    debug_assert!(andbox.solved());
    let father = andbox.father?;
    let c = choiceboxes.get(father);
    let quiet_and_empty = andbox.quiet_and_empty_trail(current_trail);

    match andbox.guard_type {
        GuardType::None | GuardType::Wait => c.is_last(a).then_some(Prune::None),
        GuardType::QuietWait | GuardType::Arrow => {
            (quiet_and_empty && andbox.leftmost()).then_some(Prune::RightSiblings)
        }
        GuardType::Commit => quiet_and_empty.then_some(Prune::AllSiblings),
        GuardType::Cut => {
            if (quiet_and_empty && andbox.leftmost()) || c.is_last(a) {
                Some(Prune::RightSiblings)
            } else {
                None
            }
        }
    }
}

/// Marks every and-box `scope` selects (relative to `keep`'s position
/// in `c`'s alternatives) DEAD and removes it from the choice-box
/// (§4.D prune column, §5 cancellation). Also drops any untried
/// clauses once a guard has committed to one alternative -- they'd
/// only ever become further right siblings.
pub fn prune(
    andboxes: &mut AndBoxArena,
    choiceboxes: &mut ChoiceBoxArena,
    choice_id: crate::ids::ChoiceBoxId,
    keep: AndBoxId,
    scope: Prune,
) {
    let choice = choiceboxes.get_mut(choice_id);
    let pos = choice.alternatives.iter().position(|&a| a == keep);
    let to_remove: Vec<AndBoxId> = match scope {
        Prune::None => Vec::new(),
        Prune::AllSiblings => choice
            .alternatives
            .iter()
            .copied()
            .filter(|&a| a != keep)
            .collect(),
        Prune::RightSiblings => match pos {
            Some(p) => choice.alternatives[p + 1..].to_vec(),
            None => Vec::new(),
        },
    };
    if scope != Prune::None {
        choice.untried.clear();
    }
    for &dead in &to_remove {
        andboxes.get_mut(dead).status = BoxStatus::Dead;
    }
    choice
        .alternatives
        .retain(|&a| a == keep || !to_remove.contains(&a));
    link_alternatives(andboxes, choice);
}

/// Promotes a solved, guard-eligible and-box `a` into its grandparent
/// `p` (the parent of `a`'s choice-box), per the eight steps of §4.E.
/// Schedules a recheck of `p` and WAKE/RECALL tasks for anything that
/// became observable, through `tasks`.
#[allow(clippy::too_many_arguments)]
pub fn promote(
    envs: &mut EnvArena,
    vars: &mut VariableStore,
    trail: &mut Trail,
    andboxes: &mut AndBoxArena,
    choiceboxes: &mut ChoiceBoxArena,
    tasks: &mut TaskQueue,
    a: AndBoxId,
    scope: Prune,
) {
    let father = andboxes
        .get(a)
        .father
        .expect("promote is only called on an and-box inside a choice-box");
    let grandfather = choiceboxes.get(father).father;

    prune(andboxes, choiceboxes, father, a, scope);

    let (a_env, unifiers, body_goals, local_vars) = {
        let ab = andboxes.get(a);
        (ab.env, ab.unifiers.clone(), ab.body_goals.clone(), ab.local_vars.clone())
    };
    let p_env = andboxes.get(grandfather).env;

    // Step 2: rehome local variables -- §3.2 locality is a pure
    // function of env equality, so reparenting `a`'s env onto `p`'s
    // parent makes every variable that was local to `a` local to `p`
    // without touching the variables themselves.
    envs.reparent(a_env, p_env);

    // Step 3: discharge unifiers.
    let mut woken = Vec::new();
    for (v, value) in unifiers {
        let value = vars.deref(&value);
        if is_local(vars.env_of(v), p_env) {
            vars.trail_bind(v, value, trail);
            woken.extend(vars.drain_suspensions(v));
        } else {
            andboxes.get_mut(grandfather).unifiers.push((v, value));
            vars.suspend(v, crate::boxes::SuspendOn::AndBox(grandfather));
        }
    }

    // Step 4: propagate constraints, waking anything newly local.
    let constraints: Vec<_> = andboxes.get_mut(a).constraints.drain(..).collect();
    for c in constraints {
        if is_local(vars.env_of(c.var), p_env) {
            woken.extend(vars.drain_suspensions(c.var));
        } else {
            andboxes.get_mut(grandfather).constraints.push(c);
        }
    }

    // Step 5: splice body goals at the front of p's goal queue.
    {
        let p = andboxes.get_mut(grandfather);
        for goal in body_goals.into_iter().rev() {
            p.goals.push_front(goal);
        }
        for v in local_vars {
            p.local_vars.push(v);
        }
    }

    // Step 6: delink a from its (now possibly empty) choice-box. If
    // that empties it, it also comes out of p's tried list -- p has no
    // more reason to wait on it.
    {
        let c = choiceboxes.get_mut(father);
        c.alternatives.retain(|&x| x != a);
        link_alternatives(andboxes, c);
        if c.alternatives.is_empty() {
            andboxes.get_mut(grandfather).tried.retain(|&x| x != father);
        }
    }
    andboxes.get_mut(a).status = BoxStatus::Dead;

    // Step 7/8: wake p and every suspension uncovered above.
    tasks.push(Task::Promote(grandfather));
    for w in woken {
        if let crate::boxes::SuspendOn::AndBox(id) = w {
            tasks.push_wake(id);
        } else if let crate::boxes::SuspendOn::ChoiceBox(id) = w {
            tasks.push_recall(id);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::boxes::{AndBox, ChoiceBox};

    #[test]
    fn none_guard_promotes_only_when_last() {
        let mut andboxes = AndBoxArena::new();
        let mut choiceboxes = ChoiceBoxArena::new();
        let trail = Trail::new();
        let parent = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(0), None, trail.mark(), GuardType::None));
        let c = choiceboxes.alloc(ChoiceBox::new(parent, GuardType::None));
        let a = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(1), Some(c), trail.mark(), GuardType::None));
        let b = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(2), Some(c), trail.mark(), GuardType::None));
        choiceboxes.get_mut(c).alternatives = vec![a, b];
        link_alternatives(&mut andboxes, choiceboxes.get(c));

        assert_eq!(eligible_to_promote(&andboxes, &choiceboxes, a, trail.mark()), None);

        choiceboxes.get_mut(c).alternatives = vec![a];
        link_alternatives(&mut andboxes, choiceboxes.get(c));
        assert_eq!(
            eligible_to_promote(&andboxes, &choiceboxes, a, trail.mark()),
            Some(Prune::None)
        );
    }

    #[test]
    fn commit_guard_does_not_require_leftmost() {
        let mut andboxes = AndBoxArena::new();
        let mut choiceboxes = ChoiceBoxArena::new();
        let trail = Trail::new();
        let parent = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(0), None, trail.mark(), GuardType::None));
        let c = choiceboxes.alloc(ChoiceBox::new(parent, GuardType::Commit));
        let a = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(1), Some(c), trail.mark(), GuardType::Commit));
        let b = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(2), Some(c), trail.mark(), GuardType::Commit));
        choiceboxes.get_mut(c).alternatives = vec![a, b];
        link_alternatives(&mut andboxes, choiceboxes.get(c));

        // b is not leftmost, but commit only needs quiet-and-empty-trail.
        assert_eq!(
            eligible_to_promote(&andboxes, &choiceboxes, b, trail.mark()),
            Some(Prune::AllSiblings)
        );
    }

    #[test]
    fn prune_all_siblings_marks_others_dead_and_clears_untried() {
        let mut andboxes = AndBoxArena::new();
        let mut choiceboxes = ChoiceBoxArena::new();
        let trail = Trail::new();
        let parent = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(0), None, trail.mark(), GuardType::None));
        let c = choiceboxes.alloc(ChoiceBox::new(parent, GuardType::Commit));
        let a = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(1), Some(c), trail.mark(), GuardType::Commit));
        let b = andboxes.alloc(AndBox::new(akl_ir::EnvId::from_raw(2), Some(c), trail.mark(), GuardType::Commit));
        choiceboxes.get_mut(c).alternatives = vec![a, b];

        prune(&mut andboxes, &mut choiceboxes, c, a, Prune::AllSiblings);
        assert_eq!(andboxes.get(b).status, BoxStatus::Dead);
        assert_eq!(choiceboxes.get(c).alternatives, vec![a]);
    }
}
