use crate::boxes::SuspendOn;
use crate::trail::Trail;
use akl_ir::{EnvId, Term, VarId};

struct Slot {
    binding: Option<Term>,
    env: Option<EnvId>,
    suspensions: Vec<SuspendOn>,
}

/// Owns every variable's binding cell, env, and suspension list (§3.1,
/// §3.5). All mutation goes through [`VariableStore::trail_bind`] or
/// [`VariableStore::unbind`] so the trail and the cell never drift
/// apart -- nothing outside this module is allowed to touch `binding`
/// directly.
#[derive(Default)]
pub struct VariableStore {
    slots: Vec<Slot>,
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore { slots: Vec::new() }
    }

    /// Allocates a fresh, unbound variable in `env`. Pass `None` for a
    /// naked query variable with no owning and-box.
    pub fn alloc(&mut self, env: Option<EnvId>) -> VarId {
        let id = VarId::from_raw(self.slots.len() as u32);
        self.slots.push(Slot {
            binding: None,
            env,
            suspensions: Vec::new(),
        });
        id
    }

    pub fn env_of(&self, var: VarId) -> Option<EnvId> {
        self.slots[var.index()].env
    }

    pub fn is_bound(&self, var: VarId) -> bool {
        self.slots[var.index()].binding.is_some()
    }

    /// Binds `var` to `value` and appends an undo entry. Panics if
    /// `var` is already bound: a rebind outside the trail protocol is
    /// the implementation-invariant violation of §7, and callers are
    /// expected to have checked `is_bound` (or gone through `deref`)
    /// first.
    pub fn trail_bind(&mut self, var: VarId, value: Term, trail: &mut Trail) {
        let slot = &mut self.slots[var.index()];
        assert!(slot.binding.is_none(), "rebind of already-bound variable");
        slot.binding = Some(value);
        trail.push(var);
    }

    /// Reverses a `trail_bind`, called only by `Trail::undo_to`'s
    /// callback.
    pub fn unbind(&mut self, var: VarId) {
        self.slots[var.index()].binding = None;
    }

    pub fn suspend(&mut self, var: VarId, on: SuspendOn) {
        self.slots[var.index()].suspensions.push(on);
    }

    pub fn suspensions_of(&self, var: VarId) -> &[SuspendOn] {
        &self.slots[var.index()].suspensions
    }

    pub fn binding_of(&self, var: VarId) -> Option<Term> {
        self.slots[var.index()].binding.clone()
    }

    /// Sets a variable's binding directly, bypassing the trail. Only
    /// the copy engine calls this: the original's binding was already
    /// trailed (and, being ahead of the copy's own timeline, will
    /// never be undone by anything the copy does), so the copy just
    /// needs it baked in as a starting condition, not a fresh step.
    pub(crate) fn set_binding_for_copy(&mut self, var: VarId, value: Option<Term>) {
        self.slots[var.index()].binding = value;
    }

    /// Drains and returns every party waiting on `var`. Called right
    /// after a binding becomes observable (direct local bind, or a
    /// variable rehomed to local during promotion, §4.E step 8).
    pub fn drain_suspensions(&mut self, var: VarId) -> Vec<SuspendOn> {
        std::mem::take(&mut self.slots[var.index()].suspensions)
    }

    /// Chases a chain of bound variables to either a non-variable term
    /// or an unbound variable (§3.1). Idempotent: `deref(deref(t)) ==
    /// deref(t)`.
    pub fn deref(&self, term: &Term) -> Term {
        let mut current = term.clone();
        loop {
            match current {
                Term::Var(v) => match &self.slots[v.index()].binding {
                    Some(bound) => current = bound.clone(),
                    None => return Term::Var(v),
                },
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deref_chases_bound_chain_to_a_value() {
        let mut store = VariableStore::new();
        let mut trail = Trail::new();
        let x = store.alloc(None);
        let y = store.alloc(None);
        store.trail_bind(x, Term::Var(y), &mut trail);
        store.trail_bind(y, Term::int(42), &mut trail);

        assert_eq!(store.deref(&Term::Var(x)), Term::int(42));
        assert_eq!(store.deref(&Term::int(42)), Term::int(42));
    }

    #[test]
    fn deref_is_idempotent_on_unbound_variable() {
        let mut store = VariableStore::new();
        let x = store.alloc(None);
        let once = store.deref(&Term::Var(x));
        let twice = store.deref(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn unbind_after_trail_undo_makes_variable_unbound_again() {
        let mut store = VariableStore::new();
        let mut trail = Trail::new();
        let x = store.alloc(None);
        let mark = trail.mark();
        store.trail_bind(x, Term::int(1), &mut trail);
        assert!(store.is_bound(x));

        trail.undo_to(mark, |v| store.unbind(v));
        assert!(!store.is_bound(x));
        assert_eq!(store.deref(&Term::Var(x)), Term::Var(x));
    }

    #[test]
    #[should_panic(expected = "rebind")]
    fn rebinding_a_bound_variable_panics() {
        let mut store = VariableStore::new();
        let mut trail = Trail::new();
        let x = store.alloc(None);
        store.trail_bind(x, Term::int(1), &mut trail);
        store.trail_bind(x, Term::int(2), &mut trail);
    }
}
