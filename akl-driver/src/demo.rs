//! Hand-built versions of the literal end-to-end programs (§8.2),
//! standing in for the excluded parser/compiler well enough to
//! exercise the whole engine, the way `chalk-tests` exercises
//! `chalk-solve` through hand-lowered test programs rather than
//! parsed Rust source.

use akl_engine::{Clause, GuardType, Program, VariableStore};
use akl_ir::{Term, VarId};

fn var(n: u32) -> Term {
    Term::Var(VarId::from_raw(n))
}

/// `member(X, [X|_]). member(X, [_|T]) :- member(X, T).`
pub fn member_program() -> Program {
    let mut program = Program::new();
    program.define(
        "member",
        2,
        Clause::fact(Term::compound("member", vec![var(0), Term::cons(var(0), var(1))]), 2),
    );
    program.define(
        "member",
        2,
        Clause::rule(
            Term::compound("member", vec![var(0), Term::cons(var(2), var(1))]),
            Term::compound("member", vec![var(0), var(1)]),
            3,
        ),
    );
    program
}

/// `append([], Y, Y). append([H|T], Y, [H|R]) :- append(T, Y, R).`
pub fn append_program() -> Program {
    let mut program = Program::new();
    program.define(
        "append",
        3,
        Clause::fact(Term::compound("append", vec![Term::nil(), var(0), var(0)]), 1),
    );
    program.define(
        "append",
        3,
        Clause::rule(
            Term::compound(
                "append",
                vec![Term::cons(var(0), var(1)), var(2), Term::cons(var(0), var(3))],
            ),
            Term::compound("append", vec![var(1), var(2), var(3)]),
            4,
        ),
    );
    program
}

/// `len([], 0). len([_|T], N) :- len(T, M), N is M + 1.`
pub fn len_program() -> Program {
    let mut program = Program::new();
    program.define("len", 2, Clause::fact(Term::compound("len", vec![Term::nil(), Term::int(0)]), 0));
    let body = Term::compound(
        ",",
        vec![
            Term::compound("len", vec![var(1), var(2)]),
            Term::compound("is", vec![var(3), Term::compound("+", vec![var(2), Term::int(1)])]),
        ],
    );
    program.define(
        "len",
        2,
        Clause::rule(Term::compound("len", vec![Term::cons(var(0), var(1)), var(3)]), body, 4),
    );
    program
}

/// `ordered(a) :- true ?? write(first). ordered(b) :- true ?? write(second).`
pub fn ordered_program() -> Program {
    let mut program = Program::new();
    program.define(
        "ordered",
        1,
        Clause::guarded(
            Term::compound("ordered", vec![Term::atom("a")]),
            Term::atom("true"),
            GuardType::QuietWait,
            Term::compound("write", vec![Term::atom("first")]),
            0,
        ),
    );
    program.define(
        "ordered",
        1,
        Clause::guarded(
            Term::compound("ordered", vec![Term::atom("b")]),
            Term::atom("true"),
            GuardType::QuietWait,
            Term::compound("write", vec![Term::atom("second")]),
            0,
        ),
    );
    program
}

/// `pick(1) :- true ? true. pick(2) :- true ? true. pick(3) :- true ? true.`
pub fn pick_program() -> Program {
    let mut program = Program::new();
    for n in 1..=3 {
        program.define(
            "pick",
            1,
            Clause::guarded(
                Term::compound("pick", vec![Term::int(n)]),
                Term::atom("true"),
                GuardType::Wait,
                Term::atom("true"),
                0,
            ),
        );
    }
    program
}

/// A query builder for `member(X, items)`, naming the free variable `"X"`.
pub fn member_query(items: Vec<Term>) -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |vars: &mut VariableStore| {
        let x = vars.alloc(None);
        let goal = Term::compound("member", vec![Term::Var(x), Term::list(items, Term::nil())]);
        (goal, vec![("X".to_string(), x)])
    }
}

/// A query builder for a fully ground goal -- no free variables, so
/// the sole solution (if any) carries no bindings.
pub fn ground_query(goal: Term) -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |_vars: &mut VariableStore| (goal, Vec::new())
}

/// A query builder for `append(items_a, items_b, X)`, naming the
/// result variable `"X"`.
pub fn append_query(a: Vec<Term>, b: Vec<Term>) -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |vars: &mut VariableStore| {
        let x = vars.alloc(None);
        let goal = Term::compound(
            "append",
            vec![Term::list(a, Term::nil()), Term::list(b, Term::nil()), Term::Var(x)],
        );
        (goal, vec![("X".to_string(), x)])
    }
}

/// A query builder for `append(X, Y, items)`, the doubly-nondeterministic
/// direction of P2's second scenario.
pub fn append_split_query(items: Vec<Term>) -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |vars: &mut VariableStore| {
        let x = vars.alloc(None);
        let y = vars.alloc(None);
        let goal = Term::compound("append", vec![Term::Var(x), Term::Var(y), Term::list(items, Term::nil())]);
        (goal, vec![("X".to_string(), x), ("Y".to_string(), y)])
    }
}

/// A query builder for `len(items, N)`, naming the result `"N"`.
pub fn len_query(items: Vec<Term>) -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |vars: &mut VariableStore| {
        let n = vars.alloc(None);
        let goal = Term::compound("len", vec![Term::list(items, Term::nil()), Term::Var(n)]);
        (goal, vec![("N".to_string(), n)])
    }
}

/// A query builder for `ordered(X)`, naming the result `"X"`.
pub fn ordered_query() -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |vars: &mut VariableStore| {
        let x = vars.alloc(None);
        (Term::compound("ordered", vec![Term::Var(x)]), vec![("X".to_string(), x)])
    }
}

/// A query builder for `pick(X)`, naming the result `"X"`.
pub fn pick_query() -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |vars: &mut VariableStore| {
        let x = vars.alloc(None);
        (Term::compound("pick", vec![Term::Var(x)]), vec![("X".to_string(), x)])
    }
}

/// A query builder for `\+ goal`, carrying no bindings of its own
/// (P6): a negation's condition runs in an isolated context and
/// leaves no trace regardless of outcome.
pub fn negation_query(goal: Term) -> impl FnOnce(&mut VariableStore) -> (Term, Vec<(String, VarId)>) {
    move |_vars: &mut VariableStore| (Term::compound("\\+", vec![goal]), Vec::new())
}
