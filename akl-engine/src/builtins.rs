use crate::boxes::{AndBox, SuspendOn};
use crate::envs::EnvArena;
use crate::error::Failed;
use crate::ids::AndBoxId;
use crate::trail::Trail;
use crate::unify::unify;
use crate::varstore::VariableStore;
use akl_ir::{Atom, Term, VarId};

/// The three outcomes a built-in can report (§6.2).
#[derive(Copy, Clone, Debug)]
pub enum BuiltinOutcome {
    Succeeded,
    Failed,
    Suspended(VarId),
}

/// Everything a built-in needs to inspect and mutate the and-box it
/// was called for, without being handed the whole worker. Built-ins
/// must go through `unify` for every binding (§6.2: "never bind
/// externals directly"); this type doesn't expose any other way to
/// write a variable.
pub struct BuiltinCtx<'a> {
    pub envs: &'a EnvArena,
    pub vars: &'a mut VariableStore,
    pub trail: &'a mut Trail,
    pub andbox_id: AndBoxId,
    pub andbox: &'a mut AndBox,
    pub woken: &'a mut Vec<SuspendOn>,
}

impl<'a> BuiltinCtx<'a> {
    pub fn unify(&mut self, t1: &Term, t2: &Term) -> Result<(), Failed> {
        unify(
            self.envs,
            self.vars,
            self.trail,
            self.andbox_id,
            self.andbox,
            t1,
            t2,
            self.woken,
        )
    }

    pub fn deref(&self, t: &Term) -> Term {
        self.vars.deref(t)
    }
}

/// Implemented by a crate that supplies concrete predicates (§6.2).
/// `call` returns `None` when `name/arity` isn't one it recognises, so
/// the worker can fall through to ordinary clause lookup.
pub trait Builtins {
    fn call(&self, name: Atom, args: &[Term], ctx: &mut BuiltinCtx) -> Option<BuiltinOutcome>;
}

/// A `Builtins` with nothing registered; useful for driving the
/// engine against programs that define every predicate themselves.
pub struct NoBuiltins;

impl Builtins for NoBuiltins {
    fn call(&self, _name: Atom, _args: &[Term], _ctx: &mut BuiltinCtx) -> Option<BuiltinOutcome> {
        None
    }
}
