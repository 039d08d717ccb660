//! The six literal end-to-end scenarios, run against the hand-built
//! demo programs in `akl_driver::demo` (standing in for a parser).

mod support;

use akl_builtins::StandardBuiltins;
use akl_driver::{demo, solve, SolveConfig};
use akl_ir::Term;
use support::{assert_solutions_eq, solution_count};

fn int(n: i64) -> Term {
    Term::int(n)
}

#[test]
fn p1_member_enumerates_in_list_order() {
    let solutions = solve(
        demo::member_program(),
        StandardBuiltins,
        demo::member_query(vec![int(1), int(2), int(3)]),
        SolveConfig::default(),
    );
    assert_solutions_eq(solutions, &["X = 1", "X = 2", "X = 3"]);
}

#[test]
fn p1_member_of_a_present_element_yields_one_solution() {
    let goal = Term::compound(
        "member",
        vec![int(2), Term::list(vec![int(1), int(2), int(3)], Term::nil())],
    );
    let solutions = solve(demo::member_program(), StandardBuiltins, demo::ground_query(goal), SolveConfig::default());
    assert_eq!(solution_count(solutions), 1);
}

#[test]
fn p1_member_of_an_absent_element_yields_no_solutions() {
    let goal = Term::compound(
        "member",
        vec![int(4), Term::list(vec![int(1), int(2), int(3)], Term::nil())],
    );
    let solutions = solve(demo::member_program(), StandardBuiltins, demo::ground_query(goal), SolveConfig::default());
    assert_eq!(solution_count(solutions), 0);
}

#[test]
fn p2_append_forward_direction_is_deterministic() {
    let solutions = solve(
        demo::append_program(),
        StandardBuiltins,
        demo::append_query(vec![int(1), int(2)], vec![int(3), int(4)]),
        SolveConfig::default(),
    );
    assert_solutions_eq(solutions, &["X = [1, 2, 3, 4]"]);
}

#[test]
fn p2_append_split_direction_yields_four_splits() {
    let solutions = solve(
        demo::append_program(),
        StandardBuiltins,
        demo::append_split_query(vec![int(1), int(2), int(3)]),
        SolveConfig::default(),
    );
    assert_solutions_eq(
        solutions,
        &[
            "X = [], Y = [1, 2, 3]",
            "X = [1], Y = [2, 3]",
            "X = [1, 2], Y = [3]",
            "X = [1, 2, 3], Y = []",
        ],
    );
}

#[test]
fn p3_len_counts_via_arithmetic() {
    let solutions = solve(
        demo::len_program(),
        StandardBuiltins,
        demo::len_query(vec![Term::atom("a"), Term::atom("b"), Term::atom("c")]),
        SolveConfig::default(),
    );
    assert_solutions_eq(solutions, &["N = 3"]);
}

#[test]
fn p4_quiet_wait_commits_to_the_leftmost_alternative() {
    let solutions = solve(demo::ordered_program(), StandardBuiltins, demo::ordered_query(), SolveConfig::default());
    assert_solutions_eq(solutions, &["X = a"]);
}

#[test]
fn p5_noisy_wait_splits_into_three_independent_solutions() {
    let solutions = solve(demo::pick_program(), StandardBuiltins, demo::pick_query(), SolveConfig::default());
    assert_solutions_eq(solutions, &["X = 1", "X = 2", "X = 3"]);
}

#[test]
fn p6_negation_succeeds_once_when_the_goal_fails() {
    let goal = Term::compound(
        "member",
        vec![int(4), Term::list(vec![int(1), int(2), int(3)], Term::nil())],
    );
    let solutions = solve(demo::member_program(), StandardBuiltins, demo::negation_query(goal), SolveConfig::default());
    assert_solutions_eq(solutions, &[""]);
}

#[test]
fn p6_negation_fails_when_the_goal_succeeds() {
    let goal = Term::compound(
        "member",
        vec![int(2), Term::list(vec![int(1), int(2), int(3)], Term::nil())],
    );
    let solutions = solve(demo::member_program(), StandardBuiltins, demo::negation_query(goal), SolveConfig::default());
    assert_eq!(solution_count(solutions), 0);
}
