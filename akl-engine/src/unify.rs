use crate::boxes::{AndBox, BoxStatus, SuspendOn};
use crate::envs::EnvArena;
use crate::error::Failed;
use crate::ids::AndBoxId;
use crate::trail::Trail;
use crate::varstore::VariableStore;
use akl_ir::{is_external, Term, VarId};

/// Attempts to make `t1` and `t2` equal (§4.A). Bindings of variables
/// local to `andbox` go straight into the store and the trail;
/// bindings of external variables are deferred into `andbox.unifiers`
/// and recorded as a suspension instead, per the local/external
/// discipline that's the whole point of this function existing
/// instead of ordinary Prolog unification.
///
/// Any suspensions woken by a *local* binding are appended to `woken`
/// so the caller (the worker) can schedule WAKE tasks for them --
/// unify itself never touches a task queue.
pub fn unify(
    envs: &EnvArena,
    vars: &mut VariableStore,
    trail: &mut Trail,
    andbox_id: AndBoxId,
    andbox: &mut AndBox,
    t1: &Term,
    t2: &Term,
    woken: &mut Vec<SuspendOn>,
) -> Result<(), Failed> {
    let d1 = vars.deref(t1);
    let d2 = vars.deref(t2);

    match (&d1, &d2) {
        (Term::Var(v1), Term::Var(v2)) if v1 == v2 => Ok(()),
        (Term::Var(v), _) => bind(envs, vars, trail, andbox_id, andbox, *v, &d2, woken),
        (_, Term::Var(v)) => bind(envs, vars, trail, andbox_id, andbox, *v, &d1, woken),
        (Term::Atom(a), Term::Atom(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(Failed)
            }
        }
        (Term::Int(a), Term::Int(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(Failed)
            }
        }
        (Term::Float(a), Term::Float(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(Failed)
            }
        }
        (Term::Compound(f1, args1), Term::Compound(f2, args2)) => {
            if f1 != f2 || args1.len() != args2.len() {
                return Err(Failed);
            }
            for (a, b) in args1.iter().zip(args2.iter()) {
                unify(envs, vars, trail, andbox_id, andbox, a, b, woken)?;
            }
            Ok(())
        }
        (Term::Cons(h1, t1), Term::Cons(h2, t2)) => {
            unify(envs, vars, trail, andbox_id, andbox, h1, h2, woken)?;
            unify(envs, vars, trail, andbox_id, andbox, t1, t2, woken)
        }
        _ => Err(Failed),
    }
}

fn bind(
    envs: &EnvArena,
    vars: &mut VariableStore,
    trail: &mut Trail,
    andbox_id: AndBoxId,
    andbox: &mut AndBox,
    v: VarId,
    value: &Term,
    woken: &mut Vec<SuspendOn>,
) -> Result<(), Failed> {
    if occurs(vars, v, value) {
        return Err(Failed);
    }
    if is_external(envs, vars.env_of(v), andbox.env) {
        andbox.unifiers.push((v, value.clone()));
        vars.suspend(v, SuspendOn::AndBox(andbox_id));
        if andbox.status == BoxStatus::Stable {
            andbox.status = BoxStatus::Unstable;
        } else if andbox.status == BoxStatus::XStable {
            andbox.status = BoxStatus::XUnstable;
        }
        Ok(())
    } else {
        vars.trail_bind(v, value.clone(), trail);
        woken.extend(vars.drain_suspensions(v));
        Ok(())
    }
}

/// True iff `v` occurs anywhere inside `term` (after dereferencing),
/// including `term` being `v` itself. Binding `v` to a term containing
/// `v` must fail (§3.1) rather than build a cyclic structure.
fn occurs(vars: &VariableStore, v: VarId, term: &Term) -> bool {
    match vars.deref(term) {
        Term::Var(other) => other == v,
        Term::Compound(_, args) => args.iter().any(|a| occurs(vars, v, a)),
        Term::Cons(h, t) => occurs(vars, v, &h) || occurs(vars, v, &t),
        Term::Atom(_) | Term::Int(_) | Term::Float(_) => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::envs::EnvArena;
    use crate::ids::AndBoxId;
    use crate::trail::Trail;
    use akl_ir::EnvId;

    fn andbox_at(env: EnvId) -> (AndBox, AndBoxId) {
        let mut arena = crate::boxes::AndBoxArena::new();
        let id = arena.alloc(AndBox::new(env, None, Trail::new().mark(), crate::clause::GuardType::None));
        // peel the box back out; tests only need one at a time so a
        // throwaway arena is simplest.
        let placeholder = AndBox::new(env, None, Trail::new().mark(), crate::clause::GuardType::None);
        (std::mem::replace(arena.get_mut(id), placeholder), id)
    }

    #[test]
    fn local_variable_binds_directly_and_wakes_suspensions() {
        let envs = EnvArena::new();
        let mut vars = VariableStore::new();
        let mut trail = Trail::new();
        let root = EnvArena::query_env();
        let x = vars.alloc(Some(root));
        let (mut andbox, id) = andbox_at(root);
        let watcher = AndBoxId(7);
        vars.suspend(x, SuspendOn::AndBox(watcher));

        let mut woken = Vec::new();
        unify(&envs, &mut vars, &mut trail, id, &mut andbox, &Term::Var(x), &Term::int(5), &mut woken).unwrap();

        assert!(vars.is_bound(x));
        assert_eq!(vars.deref(&Term::Var(x)), Term::int(5));
        assert_eq!(woken, vec![SuspendOn::AndBox(watcher)]);
        assert!(andbox.unifiers.is_empty());
    }

    #[test]
    fn external_variable_defers_into_unifier_list() {
        let mut envs = EnvArena::new();
        let mut vars = VariableStore::new();
        let mut trail = Trail::new();
        let root = EnvArena::query_env();
        let child = envs.child_of(root);
        let x = vars.alloc(Some(root));
        let (mut andbox, id) = andbox_at(child);
        andbox.status = BoxStatus::Stable;

        let mut woken = Vec::new();
        unify(&envs, &mut vars, &mut trail, id, &mut andbox, &Term::Var(x), &Term::int(5), &mut woken).unwrap();

        assert!(!vars.is_bound(x));
        assert_eq!(andbox.unifiers, vec![(x, Term::int(5))]);
        assert_eq!(andbox.status, BoxStatus::Unstable);
    }

    #[test]
    fn occurs_check_rejects_self_referential_binding() {
        let envs = EnvArena::new();
        let mut vars = VariableStore::new();
        let mut trail = Trail::new();
        let root = EnvArena::query_env();
        let x = vars.alloc(Some(root));
        let (mut andbox, id) = andbox_at(root);

        let cyclic = Term::compound("f", vec![Term::Var(x)]);
        let mut woken = Vec::new();
        let result = unify(&envs, &mut vars, &mut trail, id, &mut andbox, &Term::Var(x), &cyclic, &mut woken);
        assert!(result.is_err());
        assert!(!vars.is_bound(x));
    }

    #[test]
    fn compound_terms_unify_structurally() {
        let envs = EnvArena::new();
        let mut vars = VariableStore::new();
        let mut trail = Trail::new();
        let root = EnvArena::query_env();
        let x = vars.alloc(Some(root));
        let (mut andbox, id) = andbox_at(root);

        let t1 = Term::compound("f", vec![Term::Var(x), Term::int(2)]);
        let t2 = Term::compound("f", vec![Term::int(1), Term::int(2)]);
        let mut woken = Vec::new();
        unify(&envs, &mut vars, &mut trail, id, &mut andbox, &t1, &t2, &mut woken).unwrap();
        assert_eq!(vars.deref(&Term::Var(x)), Term::int(1));
    }
}
