use akl_ir::VarId;

/// One entry of the undo log (§3.7): the variable that got bound, and
/// what it was bound to immediately before (always `None`, since a
/// variable is only ever trailed the moment it moves from unbound to
/// bound -- §3.1's "bound at most once between consecutive undos").
struct Entry {
    var: VarId,
}

/// Append-only log of variable bindings. `Trail` doesn't know what a
/// variable is bound *to*; undoing just tells the variable store to
/// forget the binding, since every trailed binding started from
/// unbound.
#[derive(Default)]
pub struct Trail {
    entries: Vec<Entry>,
}

/// A position in the trail, returned by [`Trail::mark`]. Rewinding to
/// a stale mark (one taken after entries were already undone past it)
/// is a caller bug, not modeled here -- the worker only ever undoes to
/// marks it took itself, in LIFO order, matching the context-push
/// discipline of §3.7.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Mark(usize);

impl Trail {
    pub fn new() -> Self {
        Trail { entries: Vec::new() }
    }

    pub fn mark(&self) -> Mark {
        Mark(self.entries.len())
    }

    pub fn is_empty_since(&self, mark: Mark) -> bool {
        self.entries.len() == mark.0
    }

    pub fn push(&mut self, var: VarId) {
        self.entries.push(Entry { var });
    }

    /// Undoes every binding recorded since `mark`, in reverse order,
    /// unbinding each variable in `vars`. Returns to the exact trail
    /// length `mark` recorded.
    pub fn undo_to(&mut self, mark: Mark, unbind: impl FnMut(VarId)) {
        let mut unbind = unbind;
        while self.entries.len() > mark.0 {
            let e = self.entries.pop().expect("checked len > mark above");
            unbind(e.var);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mark_and_undo_rewinds_exactly() {
        let mut trail = Trail::new();
        let m0 = trail.mark();
        trail.push(VarId::from_raw(0));
        trail.push(VarId::from_raw(1));
        assert!(!trail.is_empty_since(m0));

        let mut undone = Vec::new();
        trail.undo_to(m0, |v| undone.push(v));
        assert_eq!(undone, vec![VarId::from_raw(1), VarId::from_raw(0)]);
        assert!(trail.is_empty_since(m0));
    }

    #[test]
    fn nested_marks_undo_independently() {
        let mut trail = Trail::new();
        trail.push(VarId::from_raw(0));
        let inner = trail.mark();
        trail.push(VarId::from_raw(1));
        trail.push(VarId::from_raw(2));

        let mut undone = Vec::new();
        trail.undo_to(inner, |v| undone.push(v));
        assert_eq!(undone, vec![VarId::from_raw(2), VarId::from_raw(1)]);
        assert!(!trail.is_empty_since(Mark(0)));
    }
}
