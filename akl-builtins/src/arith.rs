//! The arithmetic evaluator behind `is/2` and the numeric comparisons
//! (§6.2): `+ - * / mod` over integers and floats, with int-op-float
//! promoting to float, and failure (never a panic) on division by
//! zero or an unbound operand.

use akl_engine::BuiltinCtx;
use akl_ir::Term;
use std::cmp::Ordering;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn into_term(self) -> Term {
        match self {
            Number::Int(i) => Term::int(i),
            Number::Float(f) => Term::float(f),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// Evaluates `term` (already dereferenced through `ctx`) as an
/// arithmetic expression. Returns `None` on anything that isn't a
/// number, a recognised operator compound, or that bottoms out on an
/// unbound variable -- the caller turns that into `BuiltinOutcome::Failed`.
pub fn eval(ctx: &BuiltinCtx, term: &Term) -> Option<Number> {
    match ctx.deref(term) {
        Term::Int(i) => Some(Number::Int(i)),
        Term::Float(f) => Some(Number::Float(f.0)),
        Term::Compound(f, args) if args.len() == 2 => {
            let a = eval(ctx, &args[0])?;
            let b = eval(ctx, &args[1])?;
            apply(f.to_string().as_str(), a, b)
        }
        Term::Compound(f, args) if args.len() == 1 && f.to_string() == "-" => {
            match eval(ctx, &args[0])? {
                Number::Int(i) => Some(Number::Int(-i)),
                Number::Float(v) => Some(Number::Float(-v)),
            }
        }
        Term::Var(_) | Term::Atom(_) | Term::Cons(..) => None,
        _ => None,
    }
}

fn apply(op: &str, a: Number, b: Number) -> Option<Number> {
    match op {
        "+" => Some(numeric(a, b, i64::checked_add, |x, y| x + y)?),
        "-" => Some(numeric(a, b, i64::checked_sub, |x, y| x - y)?),
        "*" => Some(numeric(a, b, i64::checked_mul, |x, y| x * y)?),
        "/" => divide(a, b),
        "mod" => modulo(a, b),
        _ => None,
    }
}

fn numeric(
    a: Number,
    b: Number,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Option<Number> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => int_op(x, y).map(Number::Int),
        _ => Some(Number::Float(float_op(a.as_f64(), b.as_f64()))),
    }
}

fn divide(a: Number, b: Number) -> Option<Number> {
    match (a, b) {
        (Number::Int(_), Number::Int(0)) => None,
        (Number::Int(x), Number::Int(y)) if x % y == 0 => Some(Number::Int(x / y)),
        _ => {
            let d = b.as_f64();
            if d == 0.0 {
                None
            } else {
                Some(Number::Float(a.as_f64() / d))
            }
        }
    }
}

fn modulo(a: Number, b: Number) -> Option<Number> {
    match (a, b) {
        (Number::Int(_), Number::Int(0)) => None,
        (Number::Int(x), Number::Int(y)) => Some(Number::Int(x.rem_euclid(y))),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integer_division_stays_integral_when_exact() {
        assert_eq!(divide(Number::Int(6), Number::Int(3)), Some(Number::Int(2)));
    }

    #[test]
    fn integer_division_promotes_to_float_when_inexact() {
        assert_eq!(divide(Number::Int(1), Number::Int(2)), Some(Number::Float(0.5)));
    }

    #[test]
    fn division_by_zero_is_none_not_a_panic() {
        assert_eq!(divide(Number::Int(1), Number::Int(0)), None);
        assert_eq!(divide(Number::Float(1.0), Number::Int(0)), None);
    }

    #[test]
    fn modulo_follows_euclidean_convention() {
        assert_eq!(modulo(Number::Int(-1), Number::Int(3)), Some(Number::Int(2)));
    }
}
