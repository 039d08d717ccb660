//! Component H: the query driver. Wraps a `Forest` into a lazy
//! `Solutions` iterator that upgrades query variables, drives the
//! worker one answer at a time, and dereferences bindings on the way
//! out, matching §6.3's `solve(program, query, max-steps?) → sequence
//! of solutions` framing without forcing the whole search eagerly.

pub mod demo;

use akl_engine::{AklError, AklResult, Builtins, EnvArena, Event, Forest, Program, VariableStore};
use akl_ir::{Term, VarId};
use tracing::debug;

/// Construction-time configuration (§10.4), standing in for a
/// file-based config system the core has no use for.
#[derive(Copy, Clone, Default, Debug)]
pub struct SolveConfig {
    pub max_steps: Option<usize>,
}

/// One answer: each query variable of interest paired with its
/// dereferenced binding. A binding may still contain an unbound
/// `Term::Var` leaf if the query left it free; `Display` renders it
/// with its stable per-allocation name rather than leaving it opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub bindings: Vec<(String, Term)>,
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

/// Drives `program` against a query built by `build_query`, which
/// receives the fresh `VariableStore` so it can allocate the query's
/// free variables the way a real parser would hand the driver a term
/// plus variable table (§6.3 steps 1-2). Each variable allocated with
/// `vars.alloc(None)` has no env, which is exactly what makes it
/// external to every descendant and-box per §3.2 -- no separate
/// "upgrade" step is needed once allocation already does this.
pub fn solve<B: Builtins>(
    program: Program,
    builtins: B,
    build_query: impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>),
    config: SolveConfig,
) -> Solutions<B> {
    let mut forest = Forest::new(program, builtins);
    let (goal, vars) = build_query(&mut forest.vars);
    let query_env = EnvArena::query_env();
    forest.seed_root(query_env, goal);
    Solutions {
        forest,
        vars,
        config,
        steps_taken: 0,
        solutions_emitted: 0,
        done: false,
    }
}

/// Lazily drives the worker one answer at a time.
pub struct Solutions<B: Builtins> {
    forest: Forest<B>,
    vars: Vec<(String, VarId)>,
    config: SolveConfig,
    steps_taken: usize,
    solutions_emitted: usize,
    done: bool,
}

impl<B: Builtins> Iterator for Solutions<B> {
    type Item = AklResult<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(max) = self.config.max_steps {
                if self.steps_taken >= max {
                    self.done = true;
                    return Some(Err(AklError::StepLimitExceeded {
                        partial_solutions: self.solutions_emitted,
                    }));
                }
            }
            self.steps_taken += 1;
            match self.forest.step() {
                Event::Solution(id) => {
                    debug!(andbox = ?id, "driver collected solution");
                    self.solutions_emitted += 1;
                    let bindings = self
                        .vars
                        .iter()
                        .map(|(name, v)| (name.clone(), resolve(&self.forest.vars, &Term::Var(*v))))
                        .collect();
                    return Some(Ok(Solution { bindings }));
                }
                Event::Progress => continue,
                Event::Deadlocked | Event::Done => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

/// Fully dereferences `term`, recursing into compound/cons structure
/// so a binding like `[X|T]` comes back with every reachable variable
/// chased to its value, not just the outermost one (§6.3 step 5).
fn resolve(vars: &VariableStore, term: &Term) -> Term {
    match vars.deref(term) {
        Term::Compound(f, args) => {
            Term::Compound(f, args.iter().map(|a| resolve(vars, a)).collect())
        }
        Term::Cons(h, t) => Term::cons(resolve(vars, &h), resolve(vars, &t)),
        other => other,
    }
}
