//! Term model and scope predicates for the AKL execution core.
//!
//! This crate is deliberately inert: it knows nothing about and-boxes,
//! the trail, or the worker. It gives the rest of the crate a shared
//! vocabulary -- interned atoms, the `Term` sum type, variable/env
//! identifiers, and the local/external scope tests of §4.B -- so that
//! `akl-engine` can build the stateful machinery on top of it.

mod atom;
mod env;
mod ids;
mod term;

pub use atom::Atom;
pub use env::{is_external, is_local, EnvParent};
pub use ids::{EnvId, VarId};
pub use term::Term;
