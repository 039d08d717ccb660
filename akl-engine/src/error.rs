use std::fmt;

/// A goal failed (§4.F). This is not an error: it's the ordinary
/// outcome of a branch not working out, so it's a plain marker type
/// rather than something carrying a message -- callers already know
/// which and-box failed and why from context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Failed;

impl fmt::Display for Failed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "goal failed")
    }
}

impl std::error::Error for Failed {}

/// The categories of §7 that *are* genuine errors: conditions a caller
/// of the driver needs to react to, as opposed to the normal absence
/// of a next solution.
#[derive(thiserror::Error, Debug)]
pub enum AklError {
    #[error("step limit exceeded after {partial_solutions} solution(s)")]
    StepLimitExceeded { partial_solutions: usize },

    #[error("implementation invariant violated: {detail}")]
    InvariantViolation { detail: String },
}

pub type AklResult<T> = Result<T, AklError>;
