use crate::varstore::VariableStore;
use akl_ir::{Atom, EnvId, Term, VarId};
use rustc_hash::FxHashMap;
use std::fmt;

/// One of the six guard operators of §6.1, surfaced as a clause
/// property rather than re-derived from syntax (there's no parser
/// here, so clauses arrive already classified, the way a compiled
/// clause would from the excluded compiler).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GuardType {
    None,
    Wait,
    QuietWait,
    Arrow,
    Commit,
    Cut,
}

impl GuardType {
    /// Pruning guards (`->`, `|`, `!`, `??`) remove other alternatives
    /// on commit; `?` and no-guard clauses don't (§4.D).
    pub fn is_pruning(self) -> bool {
        !matches!(self, GuardType::None | GuardType::Wait)
    }

    /// Quiet guards (`??`, `|`, `->`) forbid external bindings during
    /// guard execution; `?` and `!` are noisy and defer them instead.
    pub fn is_quiet(self) -> bool {
        matches!(self, GuardType::QuietWait | GuardType::Arrow | GuardType::Commit)
    }
}

/// Index into a clause's template-variable set (§6.1's "list of
/// variables mentioned in the clause"). `Clause::head`/`guard`/`body`
/// reference variables as `Term::Var` with these indices; activating
/// the clause allocates `var_count` fresh store variables and
/// substitutes index `i` with the `i`-th fresh one.
pub type TemplateVar = u32;

/// A single clause of a predicate definition, already split into
/// head/guard/body the way the excluded compiler would deliver it.
#[derive(Clone, Debug)]
pub struct Clause {
    pub head: Term,
    pub guard: Term,
    pub guard_type: GuardType,
    pub body: Term,
    pub var_count: u32,
}

impl Clause {
    /// Builds a clause with no guard goal (`guard_type` NONE implies
    /// the guard is trivially `true` and is never actually scheduled).
    pub fn fact(head: Term, var_count: u32) -> Clause {
        Clause {
            head,
            guard: Term::atom("true"),
            guard_type: GuardType::None,
            body: Term::atom("true"),
            var_count,
        }
    }

    pub fn rule(head: Term, body: Term, var_count: u32) -> Clause {
        Clause {
            head,
            guard: Term::atom("true"),
            guard_type: GuardType::None,
            body,
            var_count,
        }
    }

    pub fn guarded(
        head: Term,
        guard: Term,
        guard_type: GuardType,
        body: Term,
        var_count: u32,
    ) -> Clause {
        Clause {
            head,
            guard,
            guard_type,
            body,
            var_count,
        }
    }

    /// Activates this clause: allocates `var_count` fresh variables in
    /// `env` and substitutes template index `i` with the `i`-th fresh
    /// one throughout head, guard, and body (§6.1's "a fresh variable
    /// set in each activation").
    pub fn instantiate(&self, vars: &mut VariableStore, env: EnvId) -> (Term, Term, Term) {
        let mapping: Vec<VarId> = (0..self.var_count).map(|_| vars.alloc(Some(env))).collect();
        (
            substitute(&self.head, &mapping),
            substitute(&self.guard, &mapping),
            substitute(&self.body, &mapping),
        )
    }
}

fn substitute(term: &Term, mapping: &[VarId]) -> Term {
    match term {
        Term::Var(v) => Term::Var(mapping[v.index()]),
        Term::Compound(f, args) => {
            Term::Compound(*f, args.iter().map(|a| substitute(a, mapping)).collect())
        }
        Term::Cons(h, t) => Term::cons(substitute(h, mapping), substitute(t, mapping)),
        other => other.clone(),
    }
}

/// A loaded program: the predicate lookup of §6.1, `predicate(name,
/// arity) -> list of clauses`. Built directly by a caller (there's no
/// parser to populate it from source text), in clause order, which is
/// the order alternatives are tried in.
#[derive(Default)]
pub struct Program {
    predicates: FxHashMap<(Atom, usize), Vec<Clause>>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct NoSuchPredicate(pub Atom, pub usize);

impl fmt::Display for NoSuchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no predicate {}/{}", self.0, self.1)
    }
}

impl Program {
    pub fn new() -> Self {
        Program {
            predicates: FxHashMap::default(),
        }
    }

    /// Appends `clause` to the end of `name/arity`'s clause list,
    /// creating it if this is the first clause seen for that functor.
    pub fn define(&mut self, name: &str, arity: usize, clause: Clause) {
        self.predicates
            .entry((Atom::new(name), arity))
            .or_default()
            .push(clause);
    }

    /// Returns `None` (rather than an empty slice) when the predicate
    /// was never defined at all, distinguishing "no such predicate"
    /// from "predicate defined with zero clauses" for callers that
    /// want to report the former as a compile-time-style error instead
    /// of plain goal failure.
    pub fn clauses(&self, name: Atom, arity: usize) -> Option<&[Clause]> {
        self.predicates.get(&(name, arity)).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn guard_classification_matches_the_operator_table() {
        assert!(!GuardType::Wait.is_pruning());
        assert!(GuardType::Cut.is_pruning());
        assert!(GuardType::Commit.is_pruning());
        assert!(GuardType::Arrow.is_pruning());
        assert!(GuardType::QuietWait.is_pruning());
        assert!(!GuardType::None.is_pruning());

        assert!(GuardType::QuietWait.is_quiet());
        assert!(GuardType::Commit.is_quiet());
        assert!(GuardType::Arrow.is_quiet());
        assert!(!GuardType::Wait.is_quiet());
        assert!(!GuardType::Cut.is_quiet());
    }

    #[test]
    fn clauses_are_returned_in_definition_order() {
        let mut program = Program::new();
        program.define("p", 1, Clause::fact(Term::compound("p", vec![Term::int(1)]), 0));
        program.define("p", 1, Clause::fact(Term::compound("p", vec![Term::int(2)]), 0));

        let clauses = program.clauses(Atom::new("p"), 1).unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].head, Term::compound("p", vec![Term::int(1)]));
    }

    #[test]
    fn undefined_predicate_is_distinguished_from_empty() {
        let program = Program::new();
        assert_eq!(program.clauses(Atom::new("q"), 0), None);
    }

    #[test]
    fn instantiate_gives_each_activation_fresh_variables() {
        // member(X, [X|_]).
        let head = Term::compound(
            "member",
            vec![Term::Var(VarId::from_raw(0)), Term::cons(Term::Var(VarId::from_raw(0)), Term::Var(VarId::from_raw(1)))],
        );
        let clause = Clause::fact(head, 2);
        let mut vars = VariableStore::new();
        let env = EnvId::from_raw(0);

        let (h1, _, _) = clause.instantiate(&mut vars, env);
        let (h2, _, _) = clause.instantiate(&mut vars, env);
        assert_ne!(h1, h2);
        if let (Term::Compound(_, a1), Term::Compound(_, a2)) = (&h1, &h2) {
            assert_eq!(a1[0], a1[0]);
            assert_ne!(a1[0], a2[0]);
        } else {
            panic!("expected compound heads");
        }
    }
}
