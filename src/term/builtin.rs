//! Built-in predicates: arithmetic, numeric comparison, identity, `is/2`,
//! `nonvar/1` and negation as failure.
//!
//! Built-ins are ordinary terms for unification purposes; evaluation is
//! layered on top and driven by the argument builder.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::TermError;
use crate::substitution::Substitution;

use super::Term;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// A numeric literal.
///
/// Integer-only arithmetic stays integral while the mathematical result is
/// integral (so `7 / 2` is `3.5` but `6 / 2` is `3`). Any float operand
/// yields a float.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Number::Int(_))
    }

    /// Numeric ordering across representations (`3 =:= 3.0`).
    pub fn numeric_cmp(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

/// Structural equality: `3` and `3.0` are different terms.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// The fixed set of built-in operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// `=:=`
    ArithEqual,
    /// `=\=`
    ArithNotEqual,
    /// `==`
    Identical,
    /// `\==`
    NotIdentical,
    Less,
    Greater,
    /// `=<`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,
    Is,
    NonVar,
    /// `\+`: negation as failure.
    NotProvable,
}

impl BuiltinOp {
    pub const ALL: [BuiltinOp; 15] = [
        BuiltinOp::Add,
        BuiltinOp::Subtract,
        BuiltinOp::Multiply,
        BuiltinOp::Divide,
        BuiltinOp::ArithEqual,
        BuiltinOp::ArithNotEqual,
        BuiltinOp::Identical,
        BuiltinOp::NotIdentical,
        BuiltinOp::Less,
        BuiltinOp::Greater,
        BuiltinOp::LessOrEqual,
        BuiltinOp::GreaterOrEqual,
        BuiltinOp::Is,
        BuiltinOp::NonVar,
        BuiltinOp::NotProvable,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BuiltinOp::Add => "+",
            BuiltinOp::Subtract => "-",
            BuiltinOp::Multiply => "*",
            BuiltinOp::Divide => "/",
            BuiltinOp::ArithEqual => "=:=",
            BuiltinOp::ArithNotEqual => "=\\=",
            BuiltinOp::Identical => "==",
            BuiltinOp::NotIdentical => "\\==",
            BuiltinOp::Less => "<",
            BuiltinOp::Greater => ">",
            BuiltinOp::LessOrEqual => "=<",
            BuiltinOp::GreaterOrEqual => ">=",
            BuiltinOp::Is => "is",
            BuiltinOp::NonVar => "nonvar",
            BuiltinOp::NotProvable => "\\+",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn arity(self) -> usize {
        match self {
            BuiltinOp::NonVar | BuiltinOp::NotProvable => 1,
            _ => 2,
        }
    }

    /// `+ - * /`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BuiltinOp::Add | BuiltinOp::Subtract | BuiltinOp::Multiply | BuiltinOp::Divide
        )
    }

    /// Apply an arithmetic operator. `None` for division by zero or a
    /// non-arithmetic operator.
    pub fn compute(self, a: Number, b: Number) -> Option<Number> {
        use Number::{Float, Int};
        let float = |x: f64| Some(Float(x));
        match (self, a, b) {
            (BuiltinOp::Add, Int(x), Int(y)) => {
                Some(x.checked_add(y).map_or(Float(x as f64 + y as f64), Int))
            }
            (BuiltinOp::Subtract, Int(x), Int(y)) => {
                Some(x.checked_sub(y).map_or(Float(x as f64 - y as f64), Int))
            }
            (BuiltinOp::Multiply, Int(x), Int(y)) => {
                Some(x.checked_mul(y).map_or(Float(x as f64 * y as f64), Int))
            }
            (BuiltinOp::Divide, Int(_), Int(0)) => None,
            (BuiltinOp::Divide, Int(x), Int(y)) => match (x.checked_rem(y), x.checked_div(y)) {
                (Some(0), Some(q)) => Some(Int(q)),
                _ => float(x as f64 / y as f64),
            },
            (BuiltinOp::Add, x, y) => float(x.as_f64() + y.as_f64()),
            (BuiltinOp::Subtract, x, y) => float(x.as_f64() - y.as_f64()),
            (BuiltinOp::Multiply, x, y) => float(x.as_f64() * y.as_f64()),
            (BuiltinOp::Divide, x, y) => {
                if y.as_f64() == 0.0 {
                    None
                } else {
                    float(x.as_f64() / y.as_f64())
                }
            }
            _ => None,
        }
    }

    /// Evaluate this built-in as a goal under `subs`.
    pub fn evaluate(self, args: &[Term], subs: &Substitution) -> Evaluation {
        let applied: Vec<Term> = args.iter().map(|a| a.apply(subs)).collect();
        let decide = |ok: bool| {
            if ok {
                Evaluation::Succeeded(subs.clone())
            } else {
                Evaluation::Failed
            }
        };

        match (self, applied.as_slice()) {
            (op, [lhs, rhs]) if op.is_arithmetic() => {
                if lhs.evaluate().is_some() && rhs.evaluate().is_some() {
                    Evaluation::Succeeded(subs.clone())
                } else {
                    Evaluation::Lookup
                }
            }
            (BuiltinOp::Identical, [lhs, rhs]) => decide(lhs == rhs),
            (BuiltinOp::NotIdentical, [lhs, rhs]) => decide(lhs != rhs),
            (BuiltinOp::Is, [lhs, rhs]) => evaluate_is(lhs, rhs, subs),
            (BuiltinOp::NonVar, [arg]) => decide(!arg.is_variable()),
            (BuiltinOp::NotProvable, [_]) => Evaluation::Lookup,
            (op, [lhs, rhs]) => {
                let (Some(a), Some(b)) = (lhs.evaluate(), rhs.evaluate()) else {
                    return Evaluation::Failed;
                };
                let Some(ord) = a.numeric_cmp(b) else {
                    return Evaluation::Failed;
                };
                decide(match op {
                    BuiltinOp::ArithEqual => ord == Ordering::Equal,
                    BuiltinOp::ArithNotEqual => ord != Ordering::Equal,
                    BuiltinOp::Less => ord == Ordering::Less,
                    BuiltinOp::Greater => ord == Ordering::Greater,
                    BuiltinOp::LessOrEqual => ord != Ordering::Greater,
                    BuiltinOp::GreaterOrEqual => ord != Ordering::Less,
                    _ => false,
                })
            }
            _ => Evaluation::Failed,
        }
    }
}

/// `Lhs is Rhs`: a bare variable on the left is bound to the computed value;
/// a bare variable on the right is never evaluated.
fn evaluate_is(lhs: &Term, rhs: &Term, subs: &Substitution) -> Evaluation {
    if rhs.is_variable() {
        return Evaluation::Failed;
    }
    let Some(value) = rhs.evaluate() else {
        return Evaluation::Failed;
    };
    match lhs {
        Term::Variable(v) => {
            let mut extended = subs.clone();
            extended.add(v, Term::Number(value));
            if extended.is_consistent() {
                Evaluation::Succeeded(extended)
            } else {
                Evaluation::Failed
            }
        }
        Term::Number(n) if *n == value => Evaluation::Succeeded(subs.clone()),
        _ => Evaluation::Failed,
    }
}

/// Outcome of evaluating a built-in goal.
#[derive(Debug, Clone)]
pub enum Evaluation {
    /// The goal holds, possibly with extra bindings.
    Succeeded(Substitution),
    /// The goal does not hold.
    Failed,
    /// The goal needs the knowledge base (negation as failure, or
    /// arithmetic over non-numeric operands).
    Lookup,
}

impl fmt::Display for BuiltinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BuiltinOp {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| TermError::UnknownBuiltin {
            symbol: s.to_string(),
        })
    }
}
