use std::fmt;

/// Arena index of an and-box (§3.3). Stable for the and-box's whole
/// lifetime, including while it's suspended and not reachable from the
/// scheduler's active frontier.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AndBoxId(pub(crate) u32);

impl AndBoxId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for AndBoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Arena index of a choice-box (§3.4).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChoiceBoxId(pub(crate) u32);

impl ChoiceBoxId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ChoiceBoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}
