//! The built-in predicate table consumed by `akl-engine`'s worker
//! through the `Builtins` trait (component §6.2). Covers the minimum
//! set required to exercise the core end to end: control (`true`,
//! `fail`), unification (`=`), arithmetic (`is` and the numeric
//! comparisons), structural equality, and the two dereferencing type
//! tests. Also carries `write/1`, a one-argument side-effecting
//! predicate beyond the minimum set, needed to demonstrate
//! quiet-wait promotion ordering (the `ordered/1` demo program).

mod arith;

use akl_engine::{BuiltinCtx, BuiltinOutcome, Builtins, Failed};
use akl_ir::{Atom, Term};

pub use arith::Number;

/// The standard built-in set. Holds no state of its own -- every
/// built-in is a pure function of its arguments and the and-box it
/// runs in, reached through `ctx`.
pub struct StandardBuiltins;

impl Builtins for StandardBuiltins {
    fn call(&self, name: Atom, args: &[Term], ctx: &mut BuiltinCtx) -> Option<BuiltinOutcome> {
        let outcome = match (name.to_string().as_str(), args.len()) {
            ("true", 0) => Some(BuiltinOutcome::Succeeded),
            ("fail", 0) | ("false", 0) => Some(BuiltinOutcome::Failed),
            ("=", 2) => Some(unify_outcome(ctx, &args[0], &args[1])),
            ("is", 2) => Some(is(ctx, &args[0], &args[1])),
            ("<", 2) => Some(compare(ctx, &args[0], &args[1], |o| o == std::cmp::Ordering::Less)),
            (">", 2) => Some(compare(ctx, &args[0], &args[1], |o| o == std::cmp::Ordering::Greater)),
            ("=<", 2) => Some(compare(ctx, &args[0], &args[1], |o| o != std::cmp::Ordering::Greater)),
            (">=", 2) => Some(compare(ctx, &args[0], &args[1], |o| o != std::cmp::Ordering::Less)),
            ("=:=", 2) => Some(compare(ctx, &args[0], &args[1], |o| o == std::cmp::Ordering::Equal)),
            ("=\\=", 2) => Some(compare(ctx, &args[0], &args[1], |o| o != std::cmp::Ordering::Equal)),
            ("==", 2) => Some(structural_eq(ctx, &args[0], &args[1], true)),
            ("\\==", 2) => Some(structural_eq(ctx, &args[0], &args[1], false)),
            ("var", 1) => Some(type_test(ctx, &args[0], Term::is_var)),
            ("nonvar", 1) => Some(type_test(ctx, &args[0], |t| !t.is_var())),
            ("write", 1) => {
                tracing::info!(target: "akl::write", "{}", ctx.deref(&args[0]));
                Some(BuiltinOutcome::Succeeded)
            }
            _ => None,
        };
        outcome
    }
}

fn unify_outcome(ctx: &mut BuiltinCtx, a: &Term, b: &Term) -> BuiltinOutcome {
    match ctx.unify(a, b) {
        Ok(()) => BuiltinOutcome::Succeeded,
        Err(Failed) => BuiltinOutcome::Failed,
    }
}

fn is(ctx: &mut BuiltinCtx, target: &Term, expr: &Term) -> BuiltinOutcome {
    match arith::eval(ctx, expr) {
        Some(n) => unify_outcome(ctx, target, &n.into_term()),
        None => BuiltinOutcome::Failed,
    }
}

fn compare(
    ctx: &mut BuiltinCtx,
    lhs: &Term,
    rhs: &Term,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> BuiltinOutcome {
    match (arith::eval(ctx, lhs), arith::eval(ctx, rhs)) {
        (Some(a), Some(b)) => match a.partial_cmp(&b) {
            Some(o) if accept(o) => BuiltinOutcome::Succeeded,
            Some(_) => BuiltinOutcome::Failed,
            None => BuiltinOutcome::Failed,
        },
        _ => BuiltinOutcome::Failed,
    }
}

fn structural_eq(ctx: &mut BuiltinCtx, a: &Term, b: &Term, want_equal: bool) -> BuiltinOutcome {
    let equal = ctx.deref(a) == ctx.deref(b);
    if equal == want_equal {
        BuiltinOutcome::Succeeded
    } else {
        BuiltinOutcome::Failed
    }
}

fn type_test(ctx: &mut BuiltinCtx, t: &Term, test: impl Fn(&Term) -> bool) -> BuiltinOutcome {
    if test(&ctx.deref(t)) {
        BuiltinOutcome::Succeeded
    } else {
        BuiltinOutcome::Failed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use akl_engine::{AndBox, AndBoxArena, EnvArena, GuardType, Trail, VariableStore};

    /// Minimal harness: one and-box, fresh variable store, nothing
    /// else -- enough to drive a single built-in call.
    struct Harness {
        envs: EnvArena,
        vars: VariableStore,
        trail: Trail,
        andboxes: AndBoxArena,
        root: akl_engine::AndBoxId,
    }

    impl Harness {
        fn new() -> Self {
            let envs = EnvArena::new();
            let vars = VariableStore::new();
            let trail = Trail::new();
            let mut andboxes = AndBoxArena::new();
            let root = andboxes.alloc(AndBox::new(EnvArena::query_env(), None, trail.mark(), GuardType::None));
            Harness { envs, vars, trail, andboxes, root }
        }

        fn call(&mut self, name: &str, args: &[Term]) -> Option<BuiltinOutcome> {
            let id = self.root;
            let andbox = self.andboxes.get_mut(id);
            let mut woken = Vec::new();
            let mut ctx = BuiltinCtx {
                envs: &self.envs,
                vars: &mut self.vars,
                trail: &mut self.trail,
                andbox_id: id,
                andbox,
                woken: &mut woken,
            };
            StandardBuiltins.call(Atom::new(name), args, &mut ctx)
        }
    }

    #[test]
    fn arithmetic_promotes_int_and_float() {
        let mut h = Harness::new();
        let x = h.vars.alloc(Some(EnvArena::query_env()));
        let outcome = h.call("is", &[Term::Var(x), Term::compound("+", vec![Term::int(1), Term::float(0.5)])]);
        assert!(matches!(outcome, Some(BuiltinOutcome::Succeeded)));
        assert_eq!(h.vars.deref(&Term::Var(x)), Term::float(1.5));
    }

    #[test]
    fn division_by_zero_fails_rather_than_panics() {
        let mut h = Harness::new();
        let x = h.vars.alloc(Some(EnvArena::query_env()));
        let outcome = h.call("is", &[Term::Var(x), Term::compound("/", vec![Term::int(1), Term::int(0)])]);
        assert!(matches!(outcome, Some(BuiltinOutcome::Failed)));
    }

    #[test]
    fn unbound_argument_to_is_fails() {
        let mut h = Harness::new();
        let x = h.vars.alloc(Some(EnvArena::query_env()));
        let y = h.vars.alloc(Some(EnvArena::query_env()));
        let outcome = h.call("is", &[Term::Var(x), Term::Var(y)]);
        assert!(matches!(outcome, Some(BuiltinOutcome::Failed)));
    }

    #[test]
    fn numeric_comparison_accepts_mixed_tower() {
        let mut h = Harness::new();
        let outcome = h.call("<", &[Term::int(1), Term::float(1.5)]);
        assert!(matches!(outcome, Some(BuiltinOutcome::Succeeded)));
    }

    #[test]
    fn structural_equality_ignores_numeric_tower_promotion() {
        let mut h = Harness::new();
        // `1 == 1.0` is false structurally, unlike `1 =:= 1.0`.
        let outcome = h.call("==", &[Term::int(1), Term::float(1.0)]);
        assert!(matches!(outcome, Some(BuiltinOutcome::Failed)));
    }

    #[test]
    fn var_and_nonvar_classify_by_dereferenced_shape() {
        let mut h = Harness::new();
        let x = h.vars.alloc(Some(EnvArena::query_env()));
        assert!(matches!(h.call("var", &[Term::Var(x)]), Some(BuiltinOutcome::Succeeded)));
        assert!(matches!(h.call("nonvar", &[Term::Var(x)]), Some(BuiltinOutcome::Failed)));
        assert!(matches!(h.call("nonvar", &[Term::int(1)]), Some(BuiltinOutcome::Succeeded)));
    }

    #[test]
    fn unrecognised_predicate_falls_through() {
        let mut h = Harness::new();
        assert!(h.call("frobnicate", &[]).is_none());
    }
}
