use crate::clause::Clause;
use crate::ids::{AndBoxId, ChoiceBoxId};
use crate::trail::Mark;
use akl_ir::{EnvId, Term, VarId};
use std::collections::VecDeque;

/// §3.3's status lattice. `Dead` and `Stable`/`XStable` are terminal
/// for scheduling purposes; `Unstable`/`XUnstable` mean "don't try to
/// promote or split this yet, something is pending". The `X` variants
/// distinguish stability reached while inside an isolated context
/// (negation, if-then-else condition) from ordinary stability, since
/// the worker must never let an X-and-box drive a SPLIT the way an
/// ordinary stable one can (§4.C, §5).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BoxStatus {
    Dead,
    Stable,
    Unstable,
    XStable,
    XUnstable,
}

impl BoxStatus {
    pub fn is_stable(self) -> bool {
        matches!(self, BoxStatus::Stable | BoxStatus::XStable)
    }
}

/// What a suspension points at (§3.5): a record always names either
/// an and-box or a choice-box, never a bare task, so that waking it
/// means re-examining a specific node rather than replaying an
/// arbitrary closure.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SuspendOn {
    AndBox(AndBoxId),
    ChoiceBox(ChoiceBoxId),
}

/// A constraint posted on an external variable (glossary: "a
/// predicate...that may suspend the and-box until entailed"). The
/// built-in set of §6.2 never posts one; this exists so `Quiet` has
/// something to check and so a future constraint-posting built-in has
/// somewhere to put its state without changing the and-box shape.
#[derive(Copy, Clone, Debug)]
pub struct Constraint {
    pub var: VarId,
    pub entailed: bool,
}

/// A conjunction executing under one guard (§3.3). The guard operator
/// itself is a per-clause property (§6.1): sibling alternatives in the
/// same choice-box can each carry a different one, so it lives here
/// rather than on `ChoiceBox`, which only has a uniform guard type for
/// the non-clause choice-boxes built by `;/2`, if-then-else, and
/// negation (those are always NONE).
pub struct AndBox {
    pub status: BoxStatus,
    pub guard_type: crate::clause::GuardType,
    pub env: EnvId,
    pub goals: VecDeque<Term>,
    pub unifiers: Vec<(VarId, Term)>,
    pub constraints: Vec<Constraint>,
    pub tried: Vec<ChoiceBoxId>,
    pub body_goals: VecDeque<Term>,
    pub father: Option<ChoiceBoxId>,
    pub previous: Option<AndBoxId>,
    pub next: Option<AndBoxId>,
    pub local_vars: Vec<VarId>,
    /// The trail position recorded when this and-box's guard started
    /// running; `EmptyTrail(A)` of §3.3 holds when the trail is back
    /// at this mark.
    pub trail_mark: Mark,
}

impl AndBox {
    pub fn new(
        env: EnvId,
        father: Option<ChoiceBoxId>,
        trail_mark: Mark,
        guard_type: crate::clause::GuardType,
    ) -> Self {
        AndBox {
            status: BoxStatus::Unstable,
            guard_type,
            env,
            goals: VecDeque::new(),
            unifiers: Vec::new(),
            constraints: Vec::new(),
            tried: Vec::new(),
            body_goals: VecDeque::new(),
            father,
            previous: None,
            next: None,
            local_vars: Vec::new(),
            trail_mark,
        }
    }

    pub fn leftmost(&self) -> bool {
        self.previous.is_none()
    }

    pub fn solved(&self) -> bool {
        self.tried.is_empty() && self.goals.is_empty()
    }

    pub fn quiet(&self) -> bool {
        self.unifiers.is_empty() && self.constraints.iter().all(|c| c.entailed)
    }

    pub fn empty_trail(&self, current: Mark) -> bool {
        self.trail_mark == current
    }

    pub fn is_stable(&self) -> bool {
        self.status.is_stable()
    }

    /// `Quiet(A) && EmptyTrail(A)`, the precondition §4.D calls
    /// "quiet-and-empty-trail" for every guard but NONE and WAIT.
    pub fn quiet_and_empty_trail(&self, current_trail: Mark) -> bool {
        self.quiet() && self.empty_trail(current_trail)
    }
}

/// A disjunction over untried and tried clauses (§3.4).
pub struct ChoiceBox {
    pub father: AndBoxId,
    pub guard_type: crate::clause::GuardType,
    /// Live alternatives, left-to-right.
    pub alternatives: Vec<AndBoxId>,
    /// Clauses not yet turned into and-boxes, in definition order.
    pub untried: Vec<Clause>,
}

impl ChoiceBox {
    pub fn new(father: AndBoxId, guard_type: crate::clause::GuardType) -> Self {
        ChoiceBox {
            father,
            guard_type,
            alternatives: Vec::new(),
            untried: Vec::new(),
        }
    }

    pub fn is_determinate(&self) -> bool {
        self.alternatives.len() == 1 && self.untried.is_empty()
    }

    /// `Last(C, A)` of §3.3: `A` is the only live sibling and there's
    /// nothing left to try.
    pub fn is_last(&self, andbox: AndBoxId) -> bool {
        self.is_determinate() && self.alternatives.first() == Some(&andbox)
    }
}

/// Owning arena of and-boxes, indexed by [`AndBoxId`]. And-boxes never
/// move once allocated, so ids stay valid for the arena's whole life;
/// `Dead` entries are left in place rather than removed (§3.8 --
/// dead and-boxes are skipped on dequeue, not freed, since other
/// entities may still hold their id).
#[derive(Default)]
pub struct AndBoxArena {
    boxes: Vec<AndBox>,
}

impl AndBoxArena {
    pub fn new() -> Self {
        AndBoxArena { boxes: Vec::new() }
    }

    pub fn alloc(&mut self, andbox: AndBox) -> AndBoxId {
        let id = AndBoxId(self.boxes.len() as u32);
        self.boxes.push(andbox);
        id
    }

    pub fn get(&self, id: AndBoxId) -> &AndBox {
        &self.boxes[id.index()]
    }

    pub fn get_mut(&mut self, id: AndBoxId) -> &mut AndBox {
        &mut self.boxes[id.index()]
    }
}

/// Rebuilds every alternative's `previous`/`next` pointers from
/// `choice.alternatives`'s current order. Called after any mutation
/// of that list (insertion during goal expansion, removal during
/// pruning or failure) so that `AndBox::leftmost` stays in sync with
/// the choice-box's own view of sibling order without the two ever
/// being updated by hand in more than one place.
pub fn link_alternatives(andboxes: &mut AndBoxArena, choice: &ChoiceBox) {
    for (i, &id) in choice.alternatives.iter().enumerate() {
        let previous = if i == 0 { None } else { Some(choice.alternatives[i - 1]) };
        let next = choice.alternatives.get(i + 1).copied();
        let b = andboxes.get_mut(id);
        b.previous = previous;
        b.next = next;
    }
}

#[derive(Default)]
pub struct ChoiceBoxArena {
    boxes: Vec<ChoiceBox>,
}

impl ChoiceBoxArena {
    pub fn new() -> Self {
        ChoiceBoxArena { boxes: Vec::new() }
    }

    pub fn alloc(&mut self, choice: ChoiceBox) -> ChoiceBoxId {
        let id = ChoiceBoxId(self.boxes.len() as u32);
        self.boxes.push(choice);
        id
    }

    pub fn get(&self, id: ChoiceBoxId) -> &ChoiceBox {
        &self.boxes[id.index()]
    }

    pub fn get_mut(&mut self, id: ChoiceBoxId) -> &mut ChoiceBox {
        &mut self.boxes[id.index()]
    }
}
