use lalrpop_intern::InternedString;
use std::fmt;

/// An interned symbol. Equality is by identity of the interned string,
/// never by comparing characters, which is what makes atom equality
/// (and hashing) constant-time regardless of name length (§3.1).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(InternedString);

impl Atom {
    /// Interns `name`, returning the unique atom for it. Every call
    /// with the same string returns the same `Atom`.
    pub fn new(name: &str) -> Self {
        Atom(lalrpop_intern::intern(name))
    }

    /// The distinguished atom for the empty list, `[]`.
    pub fn nil() -> Self {
        Atom::new("[]")
    }

    pub fn is_nil(&self) -> bool {
        *self == Atom::nil()
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Atom {
    fn from(s: &str) -> Self {
        Atom::new(s)
    }
}
