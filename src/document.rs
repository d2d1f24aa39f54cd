//! JSON rule documents.
//!
//! A rule document carries already-parsed rule data:
//!
//! ```json
//! {
//!   "rules": [
//!     { "head": { "functor": "bird", "args": ["tweety"] } },
//!     { "head": { "functor": "fly", "args": ["X"] },
//!       "body": [{ "functor": "bird", "args": ["X"] }],
//!       "degree": 0.8 }
//!   ],
//!   "queries": [{ "functor": "fly", "args": ["tweety"] }]
//! }
//! ```
//!
//! Terms are JSON numbers, names, `{"var": ..}`, `{"const": ..}` or
//! `{"functor": .., "args": [..]}`. A name starting with an uppercase letter
//! or `_` is a variable, any other name a constant. A built-in operator
//! symbol as functor (`"+"`, `">="`, `"is"`, `"\\+"`, ...) yields a built-in
//! predicate. Each rule and each query is its own variable scope.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AspicError, AspicResult, DocumentError, TermError};
use crate::rule::Rule;
use crate::term::{Term, VarScope};

/// Result type for document decoding.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// A term as it appears in a rule document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermSpec {
    Int(i64),
    Float(f64),
    Name(String),
    Var { var: String },
    Const {
        #[serde(rename = "const")]
        constant: String,
    },
    Struct {
        functor: String,
        #[serde(default)]
        args: Vec<TermSpec>,
    },
}

impl TermSpec {
    /// Build the term, resolving variable names in `scope`.
    pub fn to_term(&self, scope: &mut VarScope) -> Result<Term, TermError> {
        match self {
            TermSpec::Int(n) => Ok(Term::int(*n)),
            TermSpec::Float(x) => Ok(Term::float(*x)),
            TermSpec::Name(name) if is_variable_name(name) => Ok(Term::var(scope.var(name))),
            TermSpec::Name(name) | TermSpec::Const { constant: name } => Term::constant(name),
            TermSpec::Var { var } => Ok(Term::var(scope.var(var))),
            TermSpec::Struct { functor, args } => {
                let args = args
                    .iter()
                    .map(|a| a.to_term(scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Term::structure(functor, args)
            }
        }
    }
}

fn is_variable_name(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|ch| ch.is_uppercase() || ch == '_')
}

fn default_degree() -> f64 {
    1.0
}

/// A rule as it appears in a rule document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub head: TermSpec,
    #[serde(default)]
    pub body: Vec<TermSpec>,
    #[serde(default = "default_degree")]
    pub degree: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TermSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleSpec {
    pub fn to_rule(&self) -> AspicResult<Rule> {
        let mut scope = VarScope::new();
        let head = self.head.to_term(&mut scope)?;
        let body = self
            .body
            .iter()
            .map(|t| t.to_term(&mut scope))
            .collect::<Result<Vec<_>, _>>()?;
        let mut rule = Rule::new(head, body, self.degree)?;
        if let Some(name) = &self.name {
            rule = rule.with_name(name.to_term(&mut scope)?);
        }
        if let Some(caption) = &self.caption {
            rule = rule.with_caption(caption.clone());
        }
        if let Some(description) = &self.description {
            rule = rule.with_description(description.clone());
        }
        Ok(rule)
    }
}

/// A query: one literal or a conjunction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuerySpec {
    Conjunction(Vec<TermSpec>),
    Single(TermSpec),
}

impl QuerySpec {
    pub fn to_expression(&self) -> Result<Vec<Term>, TermError> {
        let mut scope = VarScope::new();
        match self {
            QuerySpec::Single(term) => Ok(vec![term.to_term(&mut scope)?]),
            QuerySpec::Conjunction(terms) => terms.iter().map(|t| t.to_term(&mut scope)).collect(),
        }
    }
}

/// Rules plus optional queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub queries: Vec<QuerySpec>,
}

impl RuleDocument {
    pub fn from_json_str(content: &str) -> DocumentResult<Self> {
        serde_json::from_str(content).map_err(|e| DocumentError::Json {
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> DocumentResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let document = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            rules = document.rules.len(),
            queries = document.queries.len(),
            "rule document read"
        );
        Ok(document)
    }

    /// Build every rule, reporting the index of the first invalid one.
    pub fn rules(&self) -> AspicResult<Vec<Rule>> {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.to_rule().map_err(|e| {
                    AspicError::from(DocumentError::Rule {
                        index,
                        source: Box::new(e),
                    })
                })
            })
            .collect()
    }

    pub fn queries(&self) -> AspicResult<Vec<Vec<Term>>> {
        Ok(self
            .queries
            .iter()
            .map(QuerySpec::to_expression)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
