//! The term algebra: constants, variables, compound terms, numbers and
//! built-in predicates.
//!
//! Terms are context-free and immutable. Argument lists live behind `Arc`
//! so cloning a term, or sharing a sub-term between an argument and its
//! sub-arguments, never copies the tree.
//!
//! # Architecture
//!
//! - [`Term`]: the tagged variant over all logical objects
//! - [`Variable`] / [`VarScope`] (`variable`): identities and naming scopes
//! - [`BuiltinOp`] (`builtin`): arithmetic and comparison evaluation
//! - `unify`: unification against a [`Substitution`]

pub mod builtin;
pub mod unify;
pub mod variable;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::TermError;
use crate::substitution::Substitution;

pub use builtin::{BuiltinOp, Number};
pub use variable::{VarId, VarScope, Variable};

/// Prefix marking a classically negated functor.
pub const NEGATION_PREFIX: char = '~';

// ---------------------------------------------------------------------------
// Predicate key
// ---------------------------------------------------------------------------

/// `functor/arity` pair identifying a predicate (or a rule tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateKey {
    pub functor: Arc<str>,
    pub arity: usize,
}

impl PredicateKey {
    pub fn new(functor: impl Into<Arc<str>>, arity: usize) -> Self {
        Self {
            functor: functor.into(),
            arity,
        }
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.functor, self.arity)
    }
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// A logical term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A logic variable.
    Variable(Variable),
    /// An atom such as `tweety` or `~fly`. The functor is never empty.
    Constant(Arc<str>),
    /// `functor(arg, ...)` with at least one argument.
    Compound(Arc<str>, Arc<[Term]>),
    /// An integer or floating-point literal.
    Number(Number),
    /// A built-in predicate or arithmetic operator applied to its operands.
    Builtin(BuiltinOp, Arc<[Term]>),
}

impl Term {
    /// Create a constant. Fails on an empty functor.
    pub fn constant(functor: impl AsRef<str>) -> Result<Self, TermError> {
        let functor = functor.as_ref();
        if functor.is_empty() || functor == "~" {
            return Err(TermError::EmptyFunctor);
        }
        Ok(Term::Constant(Arc::from(functor)))
    }

    /// Create a compound term. With no arguments this is a constant.
    pub fn compound(functor: impl AsRef<str>, args: Vec<Term>) -> Result<Self, TermError> {
        if args.is_empty() {
            return Self::constant(functor);
        }
        let functor = functor.as_ref();
        if functor.is_empty() || functor == "~" {
            return Err(TermError::EmptyFunctor);
        }
        Ok(Term::Compound(Arc::from(functor), args.into()))
    }

    /// Create a built-in term, checking the operator's arity.
    pub fn builtin(op: BuiltinOp, args: Vec<Term>) -> Result<Self, TermError> {
        if args.len() != op.arity() {
            return Err(TermError::BuiltinArity {
                op: op.symbol().to_string(),
                expected: op.arity(),
                actual: args.len(),
            });
        }
        Ok(Term::Builtin(op, args.into()))
    }

    /// Create a term from a functor name, recognising built-in operator
    /// symbols (`+`, `is`, `\+`, ...) when the arity matches.
    pub fn structure(functor: impl AsRef<str>, args: Vec<Term>) -> Result<Self, TermError> {
        let functor = functor.as_ref();
        match BuiltinOp::from_symbol(functor) {
            Some(op) if op.arity() == args.len() => Self::builtin(op, args),
            _ => Self::compound(functor, args),
        }
    }

    pub fn var(variable: Variable) -> Self {
        Term::Variable(variable)
    }

    pub fn int(value: i64) -> Self {
        Term::Number(Number::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Term::Number(Number::Float(value))
    }

    /// The functor for constants, compounds and built-ins.
    pub fn functor(&self) -> Option<&str> {
        match self {
            Term::Constant(f) | Term::Compound(f, _) => Some(f.as_ref()),
            Term::Builtin(op, _) => Some(op.symbol()),
            Term::Variable(_) | Term::Number(_) => None,
        }
    }

    /// Argument slice; empty for atoms, numbers and variables.
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Compound(_, args) | Term::Builtin(_, args) => &args[..],
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.args().len()
    }

    /// The rule tag of a constant or compound term.
    pub fn key(&self) -> Option<PredicateKey> {
        match self {
            Term::Constant(f) => Some(PredicateKey::new(Arc::clone(f), 0)),
            Term::Compound(f, args) => Some(PredicateKey::new(Arc::clone(f), args.len())),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Constants and compound terms: the only terms a rule may conclude.
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Constant(_) | Term::Compound(..))
    }

    /// An arithmetic built-in as the plain compound `op(lhs, rhs)`, the form
    /// under which rules can conclude it and goals over non-numeric operands
    /// look it up.
    pub fn arithmetic_literal(&self) -> Option<Term> {
        match self {
            Term::Builtin(op, args) if op.is_arithmetic() => {
                Some(Term::Compound(Arc::from(op.symbol()), Arc::clone(args)))
            }
            _ => None,
        }
    }

    /// Whether the functor carries the `~` prefix.
    pub fn is_negated(&self) -> bool {
        matches!(self, Term::Constant(f) | Term::Compound(f, _) if f.starts_with(NEGATION_PREFIX))
    }

    /// `F(...)` becomes `~F(...)` and `~F(...)` becomes `F(...)`.
    ///
    /// Returns `None` for terms without a negatable functor.
    pub fn negation(&self) -> Option<Term> {
        let flip = |f: &Arc<str>| -> Arc<str> {
            match f.strip_prefix(NEGATION_PREFIX) {
                Some(positive) => Arc::from(positive),
                None => Arc::from(format!("{NEGATION_PREFIX}{f}")),
            }
        };
        match self {
            Term::Constant(f) => Some(Term::Constant(flip(f))),
            Term::Compound(f, args) => Some(Term::Compound(flip(f), Arc::clone(args))),
            _ => None,
        }
    }

    /// A term is grounded iff no variable is reachable through its arguments.
    pub fn is_grounded(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) | Term::Number(_) => true,
            Term::Compound(_, args) | Term::Builtin(_, args) => args.iter().all(Term::is_grounded),
        }
    }

    /// Distinct variables in order of first occurrence.
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    pub(crate) fn collect_variables(&self, out: &mut Vec<Variable>) {
        match self {
            Term::Variable(v) => {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            Term::Compound(_, args) | Term::Builtin(_, args) => {
                for a in args.iter() {
                    a.collect_variables(out);
                }
            }
            Term::Constant(_) | Term::Number(_) => {}
        }
    }

    /// Whether `var` occurs anywhere in this term.
    pub fn contains_variable(&self, var: &Variable) -> bool {
        match self {
            Term::Variable(v) => v == var,
            Term::Compound(_, args) | Term::Builtin(_, args) => {
                args.iter().any(|a| a.contains_variable(var))
            }
            Term::Constant(_) | Term::Number(_) => false,
        }
    }

    /// Structural equality up to a consistent, one-to-one renaming of
    /// variables.
    pub fn is_equal_modulo_variables(&self, other: &Term) -> bool {
        self.equal_modulo_variables_with(other, &mut VariableRenaming::default())
    }

    /// Like [`Term::is_equal_modulo_variables`], sharing the renaming across
    /// several term pairs (e.g. a whole rule).
    pub fn equal_modulo_variables_with(&self, other: &Term, renaming: &mut VariableRenaming) -> bool {
        match (self, other) {
            (Term::Variable(a), Term::Variable(b)) => renaming.pair(a.id(), b.id()),
            (Term::Constant(a), Term::Constant(b)) => a == b,
            (Term::Number(a), Term::Number(b)) => a == b,
            (Term::Compound(f, xs), Term::Compound(g, ys)) => {
                f == g
                    && xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys.iter())
                        .all(|(x, y)| x.equal_modulo_variables_with(y, renaming))
            }
            (Term::Builtin(p, xs), Term::Builtin(q, ys)) => {
                p == q
                    && xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys.iter())
                        .all(|(x, y)| x.equal_modulo_variables_with(y, renaming))
            }
            _ => false,
        }
    }

    /// Clone the term with every bound variable replaced by its binding.
    ///
    /// Bindings are followed transitively. Arithmetic built-ins whose
    /// operands become numeric are evaluated, so `3 + 4` applies to `7`.
    pub fn apply(&self, subs: &Substitution) -> Term {
        let mut resolving = Vec::new();
        self.apply_guarded(subs, &mut resolving)
    }

    fn apply_guarded(&self, subs: &Substitution, resolving: &mut Vec<VarId>) -> Term {
        match self {
            Term::Variable(v) => {
                if resolving.contains(&v.id()) {
                    return self.clone();
                }
                match subs.get(v) {
                    Some(bound) => {
                        resolving.push(v.id());
                        let resolved = bound.apply_guarded(subs, resolving);
                        resolving.pop();
                        resolved
                    }
                    None => self.clone(),
                }
            }
            Term::Constant(_) | Term::Number(_) => self.clone(),
            Term::Compound(f, args) => {
                let args: Vec<Term> = args.iter().map(|a| a.apply_guarded(subs, resolving)).collect();
                Term::Compound(Arc::clone(f), args.into())
            }
            Term::Builtin(op, args) => {
                let args: Vec<Term> = args.iter().map(|a| a.apply_guarded(subs, resolving)).collect();
                if op.is_arithmetic() {
                    if let [Term::Number(a), Term::Number(b)] = args.as_slice() {
                        if let Some(n) = op.compute(*a, *b) {
                            return Term::Number(n);
                        }
                    }
                }
                Term::Builtin(*op, args.into())
            }
        }
    }

    /// Copy the term with every variable replaced by a fresh one. Variables
    /// already present in `renaming` reuse their replacement, so a rule
    /// renamed piecewise keeps its internal sharing.
    pub fn rename(&self, renaming: &mut HashMap<VarId, Variable>) -> Term {
        match self {
            Term::Variable(v) => Term::Variable(
                renaming
                    .entry(v.id())
                    .or_insert_with(|| v.renamed())
                    .clone(),
            ),
            Term::Constant(_) | Term::Number(_) => self.clone(),
            Term::Compound(f, args) => {
                let args: Vec<Term> = args.iter().map(|a| a.rename(renaming)).collect();
                Term::Compound(Arc::clone(f), args.into())
            }
            Term::Builtin(op, args) => {
                let args: Vec<Term> = args.iter().map(|a| a.rename(renaming)).collect();
                Term::Builtin(*op, args.into())
            }
        }
    }

    /// Numeric value of a number, or of an arithmetic built-in over numbers.
    pub fn evaluate(&self) -> Option<Number> {
        match self {
            Term::Number(n) => Some(*n),
            Term::Builtin(op, args) if op.is_arithmetic() => match args.as_ref() {
                [lhs, rhs] => op.compute(lhs.evaluate()?, rhs.evaluate()?),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

impl From<Number> for Term {
    fn from(n: Number) -> Self {
        Term::Number(n)
    }
}

// ---------------------------------------------------------------------------
// Variable renaming (bijection)
// ---------------------------------------------------------------------------

/// A one-to-one correspondence between variables of two terms, built up
/// while comparing them.
#[derive(Debug, Default, Clone)]
pub struct VariableRenaming {
    forward: HashMap<VarId, VarId>,
    backward: HashMap<VarId, VarId>,
}

impl VariableRenaming {
    fn pair(&mut self, a: VarId, b: VarId) -> bool {
        match (self.forward.get(&a), self.backward.get(&b)) {
            (Some(&fa), Some(&fb)) => fa == b && fb == a,
            (None, None) => {
                self.forward.insert(a, b);
                self.backward.insert(b, a);
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Quote a functor for display when it starts uppercase or has whitespace.
fn write_functor(f: &mut fmt::Formatter<'_>, functor: &str) -> fmt::Result {
    let (prefix, body) = match functor.strip_prefix(NEGATION_PREFIX) {
        Some(rest) if !rest.is_empty() => ("~", rest),
        _ => ("", functor),
    };
    let needs_quotes = body.chars().next().is_some_and(char::is_uppercase)
        || body.chars().any(char::is_whitespace);
    if needs_quotes {
        write!(f, "{prefix}'{body}'")
    } else {
        write!(f, "{prefix}{body}")
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Term]) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{v}"),
            Term::Constant(c) => write_functor(f, c),
            Term::Number(n) => write!(f, "{n}"),
            Term::Compound(functor, args) => {
                write_functor(f, functor)?;
                write!(f, "(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Term::Builtin(op, args) => match args.as_ref() {
                [lhs, rhs] => write!(f, "{lhs} {} {rhs}", op.symbol()),
                [arg] if *op == BuiltinOp::NotProvable => write!(f, "\\+ {arg}"),
                _ => {
                    write!(f, "{}(", op.symbol())?;
                    write_args(f, args)?;
                    write!(f, ")")
                }
            },
        }
    }
}
