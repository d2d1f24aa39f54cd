// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # aspic-engine
//!
//! An ASPIC+ structured-argumentation engine: strict and defeasible rules
//! over logic-programming terms, lazily constructed arguments, and
//! dialectical proof search deciding which arguments survive attack.
//!
//! ## Architecture
//!
//! - **Terms** (`term`): constants, variables, compound terms, numbers and
//!   built-in predicates, with unification
//! - **Substitutions** (`substitution`): binding ledgers with ban-on-conflict
//! - **Knowledge base** (`kb`): indexed rules, automatic names and rule
//!   hooks, transposition of strict rules
//! - **Arguments** (`argument`): lazy construction, valuation, attack relations
//! - **Reasoners** (`reasoner`): grounded and preferred-credulous games
//! - **Queries** (`query`, `engine`): verdicts and proofs for expressions
//!
//! ## Library usage
//!
//! ```
//! use aspic_engine::config::ReasonerConfig;
//! use aspic_engine::engine::Engine;
//! use aspic_engine::rule::Rule;
//! use aspic_engine::term::{Term, VarScope};
//!
//! let mut engine = Engine::new(ReasonerConfig::default()).unwrap();
//! let tweety = Term::constant("tweety").unwrap();
//! engine
//!     .add_rule(Rule::fact(Term::compound("bird", vec![tweety.clone()]).unwrap()).unwrap())
//!     .unwrap();
//!
//! let mut scope = VarScope::new();
//! let x = Term::var(scope.var("X"));
//! let fly = Rule::defeasible(
//!     Term::compound("fly", vec![x.clone()]).unwrap(),
//!     vec![Term::compound("bird", vec![x]).unwrap()],
//!     0.8,
//! )
//! .unwrap();
//! engine.add_rule(fly).unwrap();
//!
//! let outcome = engine.query_literal(Term::compound("fly", vec![tweety]).unwrap());
//! assert!(outcome.results[0].undefeated);
//! ```

pub mod argument;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod kb;
pub mod query;
pub mod reasoner;
pub mod rule;
pub mod substitution;
pub mod term;
