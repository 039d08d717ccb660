use crate::{Atom, VarId};
use std::fmt;
use std::sync::Arc;

/// The tagged union of §9: every term is one of these six shapes.
/// Compound arguments are `Arc<[Term]>` rather than `Vec<Term>` so
/// that cloning a term during copying (§4.H) or answer construction
/// shares structure instead of deep-copying subterms that are known
/// to be immutable once built (only `Var` leaves are ever mutated,
/// and mutation happens in the variable store, not in the term).
#[derive(Clone, PartialEq, Debug)]
pub enum Term {
    Var(VarId),
    Atom(Atom),
    Int(i64),
    Float(OrderedFloat),
    Compound(Atom, Arc<[Term]>),
    Cons(Arc<Term>, Arc<Term>),
}

/// `f64` wrapper with total equality, needed because `Term` derives
/// `PartialEq` and bare `f64` equality (`NaN != NaN`) would make
/// `Term::Float` silently violate the reflexivity every other variant
/// gets for free. AKL floats are just data, never the subject of a
/// sort, so bit-pattern equality is all §3.1 asks for ("equality is by
/// value").
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl fmt::Display for OrderedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Term {
    pub fn atom(name: &str) -> Term {
        Term::Atom(Atom::new(name))
    }

    pub fn nil() -> Term {
        Term::Atom(Atom::nil())
    }

    pub fn int(v: i64) -> Term {
        Term::Int(v)
    }

    pub fn float(v: f64) -> Term {
        Term::Float(OrderedFloat(v))
    }

    pub fn compound(functor: &str, args: Vec<Term>) -> Term {
        Term::Compound(Atom::new(functor), args.into())
    }

    pub fn cons(head: Term, tail: Term) -> Term {
        Term::Cons(Arc::new(head), Arc::new(tail))
    }

    /// Builds a proper or improper list from `items`, ending in
    /// `tail` (pass `Term::nil()` for a proper list).
    pub fn list(items: Vec<Term>, tail: Term) -> Term {
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Term::cons(item, acc))
    }

    /// The functor/arity pair used to look up clauses (§6.1), if this
    /// term is the kind of thing that can appear as a goal head:
    /// atoms count as arity 0, compounds as their real arity, and
    /// `Cons` is treated as the conventional `'.'/2` functor so list
    /// goals and list data share one notion of shape.
    pub fn functor_arity(&self) -> Option<(Atom, usize)> {
        match self {
            Term::Atom(a) => Some((*a, 0)),
            Term::Compound(f, args) => Some((*f, args.len())),
            Term::Cons(..) => Some((Atom::new("."), 2)),
            Term::Var(_) | Term::Int(_) | Term::Float(_) => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    pub fn as_var(&self) -> Option<VarId> {
        match self {
            Term::Var(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(v) => write!(f, "{:?}", v),
            Term::Atom(a) => write!(f, "{}", a),
            Term::Int(i) => write!(f, "{}", i),
            Term::Float(v) => write!(f, "{}", v),
            Term::Compound(functor, args) => {
                write!(f, "{}(", functor)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Term::Cons(..) => {
                write!(f, "[")?;
                self.fmt_list_tail(f, true)?;
                write!(f, "]")
            }
        }
    }
}

impl Term {
    fn fmt_list_tail(&self, f: &mut fmt::Formatter<'_>, first: bool) -> fmt::Result {
        match self {
            Term::Cons(h, t) => {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", h)?;
                t.fmt_list_tail(f, false)
            }
            Term::Atom(a) if a.is_nil() => Ok(()),
            other => write!(f, "|{}", other),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn list_building_round_trips_through_display() {
        let l = Term::list(vec![Term::int(1), Term::int(2), Term::int(3)], Term::nil());
        assert_eq!(l.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn improper_list_displays_with_bar() {
        let l = Term::list(vec![Term::int(1)], Term::Var(VarId::from_raw(0)));
        assert_eq!(l.to_string(), "[1|_V0]");
    }

    #[test]
    fn functor_arity_treats_cons_as_dot_2() {
        let l = Term::cons(Term::int(1), Term::nil());
        assert_eq!(l.functor_arity(), Some((Atom::new("."), 2)));
        assert_eq!(Term::atom("foo").functor_arity(), Some((Atom::new("foo"), 0)));
        assert_eq!(Term::int(1).functor_arity(), None);
    }
}
