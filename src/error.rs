//! Rich diagnostic error types for the argumentation engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know what went wrong and how
//! to resolve it. Reasoning failure (a claim that cannot be defended) and
//! unification inconsistency are *not* errors: they surface as ordinary results.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum AspicError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Document(#[from] DocumentError),
}

// ---------------------------------------------------------------------------
// Structural (term) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TermError {
    #[error("empty functor: constants and compound terms need a non-empty name")]
    #[diagnostic(
        code(aspic::term::empty_functor),
        help("Give the constant or compound term a name, e.g. `bird` or `fly(X)`.")
    )]
    EmptyFunctor,

    #[error("invalid rule consequent `{term}`: only constants and compound terms can be concluded")]
    #[diagnostic(
        code(aspic::term::invalid_consequent),
        help(
            "Variables, numbers and built-in predicates cannot head a rule. \
             Wrap the value in a compound term, e.g. `value(3)`."
        )
    )]
    InvalidConsequent { term: String },

    #[error("degree of belief {degree} is outside (0, 1]")]
    #[diagnostic(
        code(aspic::term::invalid_degree),
        help("Use 1.0 for strict rules and a value strictly between 0 and 1 for defeasible ones.")
    )]
    InvalidDegree { degree: f64 },

    #[error("unknown built-in operator `{symbol}`")]
    #[diagnostic(
        code(aspic::term::unknown_builtin),
        help(
            "Supported operators are + - * / =:= =\\= == \\== < > =< >= is nonvar \\+."
        )
    )]
    UnknownBuiltin { symbol: String },

    #[error("built-in `{op}` takes {expected} argument(s), got {actual}")]
    #[diagnostic(
        code(aspic::term::builtin_arity),
        help("Arithmetic and comparison operators are binary; `nonvar` and `\\+` are unary.")
    )]
    BuiltinArity {
        op: String,
        expected: usize,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Knowledge base errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum KnowledgeBaseError {
    #[error("duplicate rule: `{rule}` already exists (modulo variable renaming)")]
    #[diagnostic(
        code(aspic::kb::duplicate_rule),
        help("The knowledge base is unchanged. Remove the existing rule first if you meant to replace it.")
    )]
    DuplicateRule { rule: String },

    #[error("rule name `{name}` conflicts with {reason}")]
    #[diagnostic(
        code(aspic::kb::name_conflict),
        help(
            "Rule names must be unique (up to unification) and must differ from the \
             rule's own consequent. Choose a different name and retry."
        )
    )]
    NameConflict { name: String, reason: String },

    #[error("rule `{rule}` was generated from `{source_rule}` and cannot be removed directly")]
    #[diagnostic(
        code(aspic::kb::auto_generated_removal),
        help("Remove the generating rule instead; its rule hooks and transpositions go with it.")
    )]
    AutoGeneratedRemoval { rule: String, source_rule: String },

    #[error("rule {id} not found")]
    #[diagnostic(
        code(aspic::kb::rule_not_found),
        help("The rule id does not belong to this knowledge base, or the rule was already removed.")
    )]
    RuleNotFound { id: u64 },

    #[error("no rules concluding `{functor}/{arity}` with {antecedent_arity} antecedent literal(s)")]
    #[diagnostic(
        code(aspic::kb::predicate_not_found),
        help("Check the predicate catalogue with `kb.catalogue().predicates()`.")
    )]
    PredicateNotFound {
        functor: String,
        arity: usize,
        antecedent_arity: usize,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unsupported {axis} `{value}`")]
    #[diagnostic(
        code(aspic::config::unsupported_value),
        help("Supported values for {axis}: {expected}.")
    )]
    UnsupportedValue {
        axis: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("minimum strength {value} is outside [0, 1]")]
    #[diagnostic(
        code(aspic::config::invalid_threshold),
        help("Argument strengths lie in [0, 1]; pick a threshold in that range.")
    )]
    InvalidThreshold { value: f64 },

    #[error("failed to parse configuration {path}: {message}")]
    #[diagnostic(
        code(aspic::config::parse),
        help("Check the TOML syntax and the field names of ReasonerConfig.")
    )]
    Parse { path: String, message: String },

    #[error("failed to read configuration {path}")]
    #[diagnostic(
        code(aspic::config::read),
        help("Ensure the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write configuration {path}")]
    #[diagnostic(
        code(aspic::config::write),
        help("Check directory permissions and available disk space.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Rule document errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    #[error("failed to read rule document {path}")]
    #[diagnostic(
        code(aspic::document::read),
        help("Ensure the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule document: {message}")]
    #[diagnostic(
        code(aspic::document::json),
        help("Rule documents are JSON objects with `rules` and optional `queries` arrays.")
    )]
    Json { message: String },

    #[error("rule {index} is invalid")]
    #[diagnostic(
        code(aspic::document::rule),
        help("See the underlying error for the offending term.")
    )]
    Rule {
        index: usize,
        #[source]
        source: Box<AspicError>,
    },
}

/// Convenience alias for functions returning engine results.
pub type AspicResult<T> = std::result::Result<T, AspicError>;
