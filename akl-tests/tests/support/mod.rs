//! Shared assertion helpers, in the manner of `chalk-tests`'s
//! `test_util.rs`: diff two solution listings line by line instead of
//! leaving the reader to eyeball a giant `assert_eq!` failure.

use akl_driver::Solution;
use akl_engine::AklResult;
use std::fmt::Write;

/// Runs `solutions` to completion and asserts the rendered listing,
/// one line per solution, matches `expected` exactly (order included --
/// AKL's copy-based splitting is order-sensitive, unlike set-oriented
/// backtracking).
pub fn assert_solutions_eq(solutions: impl Iterator<Item = AklResult<Solution>>, expected: &[&str]) {
    let actual: Vec<String> = solutions
        .map(|r| r.expect("solve should not error in these scenarios").to_string())
        .collect();
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();

    if actual == expected {
        return;
    }

    let diff = diff::slice(&expected, &actual);
    let mut rendered = String::new();
    for chunk in diff {
        match chunk {
            diff::Result::Both(a, _) => writeln!(&mut rendered, "  {}", a).unwrap(),
            diff::Result::Left(a) => writeln!(&mut rendered, "- {}", a).unwrap(),
            diff::Result::Right(a) => writeln!(&mut rendered, "+ {}", a).unwrap(),
        }
    }
    panic!("solution listing did not match, diff:\n{}\n(- expected, + actual)", rendered);
}

/// Counts solutions without checking their bindings -- used where only
/// the solution count matters.
pub fn solution_count(solutions: impl Iterator<Item = AklResult<Solution>>) -> usize {
    solutions.map(|r| r.expect("solve should not error in these scenarios")).count()
}
