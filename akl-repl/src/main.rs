//! A minimal batch harness: picks one of the built-in demo programs
//! (§10.6) by name, runs its query against the engine, and prints
//! every solution it finds.

use akl_builtins::StandardBuiltins;
use akl_driver::{demo, solve, SolveConfig};
use akl_ir::Term;
use docopt::Docopt;
use serde::Deserialize;
use std::process::exit;

const USAGE: &str = "
akl-repl

Usage:
  akl-repl --program=NAME [--max-steps=N]
  akl-repl (-h | --help)

Options:
  --help              Show this screen.
  --program=NAME      One of: member, member-split, append, append-split, len, ordered, pick, negation.
  --max-steps=N       Abort after N scheduling steps instead of running to completion.
";

#[derive(Debug, Deserialize)]
struct Args {
    flag_program: String,
    flag_max_steps: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    let config = SolveConfig {
        max_steps: args.flag_max_steps,
    };

    let count = match args.flag_program.as_str() {
        "member" => run(demo::member_program(), demo::member_query(vec![Term::int(1), Term::int(2), Term::int(3)]), config),
        "member-split" => run(
            demo::member_program(),
            demo::ground_query(Term::compound("member", vec![Term::int(2), Term::list(vec![Term::int(1), Term::int(2), Term::int(3)], Term::nil())])),
            config,
        ),
        "append" => run(
            demo::append_program(),
            demo::append_query(vec![Term::int(1), Term::int(2)], vec![Term::int(3), Term::int(4)]),
            config,
        ),
        "append-split" => run(
            demo::append_program(),
            demo::append_split_query(vec![Term::int(1), Term::int(2), Term::int(3)]),
            config,
        ),
        "len" => run(demo::len_program(), demo::len_query(vec![Term::atom("a"), Term::atom("b"), Term::atom("c")]), config),
        "ordered" => run(demo::ordered_program(), demo::ordered_query(), config),
        "pick" => run(demo::pick_program(), demo::pick_query(), config),
        "negation" => run(
            demo::member_program(),
            demo::negation_query(Term::compound("member", vec![Term::int(4), Term::list(vec![Term::int(1), Term::int(2), Term::int(3)], Term::nil())])),
            config,
        ),
        other => {
            eprintln!("error: unknown --program {:?}; see --help", other);
            exit(1);
        }
    };

    println!("{} solution(s)", count);
}

fn run(
    program: akl_engine::Program,
    build_query: impl FnOnce(&mut akl_engine::VariableStore) -> (Term, Vec<(String, akl_ir::VarId)>),
    config: SolveConfig,
) -> usize {
    let mut count = 0;
    for solution in solve(program, StandardBuiltins, build_query, config) {
        match solution {
            Ok(s) => {
                println!("{}", s);
                count += 1;
            }
            Err(e) => {
                eprintln!("error: {}", e);
                exit(1);
            }
        }
    }
    count
}
