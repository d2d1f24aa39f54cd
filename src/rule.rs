//! Strict and defeasible inference rules.
//!
//! A rule concludes a literal from an ordered antecedent with a degree of
//! belief in `(0, 1]`. Degree `1.0` makes it strict; an empty antecedent
//! makes it a fact.

use std::collections::HashMap;
use std::fmt;

use crate::error::TermError;
use crate::term::{Term, Variable, VariableRenaming};

/// Identifier assigned by the owning [`KnowledgeBase`](crate::kb::KnowledgeBase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
    /// Id of a rule that belongs to no knowledge base (e.g. the synthetic
    /// fact behind a numeric literal).
    pub const DETACHED: RuleId = RuleId(0);

    pub(crate) fn new(raw: u64) -> Self {
        RuleId(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOrigin {
    /// Added by a caller.
    User,
    /// Hidden fact asserting the name of `source`.
    RuleHook { source: RuleId },
    /// Contraposition of the strict rule `source`.
    Transposition { source: RuleId },
}

impl RuleOrigin {
    /// The generating rule for auto-generated rules.
    pub fn source(self) -> Option<RuleId> {
        match self {
            RuleOrigin::User => None,
            RuleOrigin::RuleHook { source } | RuleOrigin::Transposition { source } => Some(source),
        }
    }
}

/// An inference rule `consequent <- antecedent` with a degree of belief.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    name: Option<Term>,
    consequent: Term,
    antecedent: Vec<Term>,
    degree: f64,
    origin: RuleOrigin,
    name_auto_assigned: bool,
    caption: Option<String>,
    description: Option<String>,
}

impl Rule {
    /// Create a rule. The consequent must be a constant or compound term and
    /// the degree must lie in `(0, 1]`. An arithmetic built-in consequent is
    /// stored in its compound form.
    pub fn new(consequent: Term, antecedent: Vec<Term>, degree: f64) -> Result<Self, TermError> {
        let consequent = consequent.arithmetic_literal().unwrap_or(consequent);
        if !consequent.is_literal() {
            return Err(TermError::InvalidConsequent {
                term: consequent.to_string(),
            });
        }
        if !(degree > 0.0 && degree <= 1.0) {
            return Err(TermError::InvalidDegree { degree });
        }
        Ok(Self {
            id: RuleId::DETACHED,
            name: None,
            consequent,
            antecedent,
            degree,
            origin: RuleOrigin::User,
            name_auto_assigned: false,
            caption: None,
            description: None,
        })
    }

    /// A strict fact.
    pub fn fact(consequent: Term) -> Result<Self, TermError> {
        Self::new(consequent, Vec::new(), 1.0)
    }

    /// A strict rule.
    pub fn strict(consequent: Term, antecedent: Vec<Term>) -> Result<Self, TermError> {
        Self::new(consequent, antecedent, 1.0)
    }

    /// A defeasible rule; `degree` must be below `1.0`.
    pub fn defeasible(consequent: Term, antecedent: Vec<Term>, degree: f64) -> Result<Self, TermError> {
        if degree >= 1.0 {
            return Err(TermError::InvalidDegree { degree });
        }
        Self::new(consequent, antecedent, degree)
    }

    /// Strict fact standing for a goal solved by evaluation (a number, a
    /// built-in or a negation as failure). Belongs to no knowledge base.
    pub(crate) fn evaluated(goal: Term) -> Self {
        Self {
            id: RuleId::DETACHED,
            name: None,
            consequent: goal,
            antecedent: Vec::new(),
            degree: 1.0,
            origin: RuleOrigin::User,
            name_auto_assigned: false,
            caption: None,
            description: None,
        }
    }

    pub fn with_name(mut self, name: Term) -> Self {
        self.name = Some(name);
        self.name_auto_assigned = false;
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> Option<&Term> {
        self.name.as_ref()
    }

    pub fn consequent(&self) -> &Term {
        &self.consequent
    }

    pub fn antecedent(&self) -> &[Term] {
        &self.antecedent
    }

    pub fn degree(&self) -> f64 {
        self.degree
    }

    pub fn origin(&self) -> RuleOrigin {
        self.origin
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.degree >= 1.0
    }

    pub fn is_defeasible(&self) -> bool {
        !self.is_strict()
    }

    pub fn is_fact(&self) -> bool {
        self.antecedent.is_empty()
    }

    /// Rule hooks and transpositions.
    pub fn is_auto_generated(&self) -> bool {
        self.origin != RuleOrigin::User
    }

    pub fn is_name_auto_assigned(&self) -> bool {
        self.name_auto_assigned
    }

    /// Distinct variables of consequent then antecedent, in order of first
    /// occurrence.
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.consequent.collect_variables(&mut out);
        for literal in &self.antecedent {
            literal.collect_variables(&mut out);
        }
        out
    }

    /// Same consequent and antecedent up to one consistent variable renaming.
    /// Degree and name are ignored.
    pub fn is_equal_modulo_variables(&self, other: &Rule) -> bool {
        if self.antecedent.len() != other.antecedent.len() {
            return false;
        }
        let mut renaming = VariableRenaming::default();
        self.consequent
            .equal_modulo_variables_with(&other.consequent, &mut renaming)
            && self
                .antecedent
                .iter()
                .zip(&other.antecedent)
                .all(|(a, b)| a.equal_modulo_variables_with(b, &mut renaming))
    }

    /// Copy with every variable (name included) replaced by a fresh one.
    pub fn rename_apart(&self) -> Rule {
        let mut renaming = HashMap::new();
        let mut out = self.clone();
        out.consequent = self.consequent.rename(&mut renaming);
        out.antecedent = self.antecedent.iter().map(|a| a.rename(&mut renaming)).collect();
        out.name = self.name.as_ref().map(|n| n.rename(&mut renaming));
        out
    }

    pub(crate) fn assign(&mut self, id: RuleId, origin: RuleOrigin) {
        self.id = id;
        self.origin = origin;
    }

    pub(crate) fn set_auto_name(&mut self, name: Term) {
        self.name = Some(name);
        self.name_auto_assigned = true;
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.consequent)?;
        match (self.is_fact(), self.is_strict()) {
            (true, true) => {}
            (true, false) => write!(f, " <~{}", self.degree)?,
            (false, strict) => {
                if strict {
                    write!(f, " <- ")?;
                } else {
                    write!(f, " <~{} ", self.degree)?;
                }
                for (i, literal) in self.antecedent.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{literal}")?;
                }
            }
        }
        write!(f, ".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::VarScope;

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    fn fly_rule(scope: &mut VarScope) -> Rule {
        let x = Term::var(scope.var("X"));
        Rule::defeasible(
            Term::compound("fly", vec![x.clone()]).unwrap(),
            vec![Term::compound("bird", vec![x]).unwrap()],
            0.8,
        )
        .unwrap()
    }

    #[test]
    fn consequent_must_be_literal() {
        let x = VarScope::new().var("X");
        assert!(matches!(
            Rule::fact(Term::var(x)),
            Err(TermError::InvalidConsequent { .. })
        ));
        assert!(matches!(
            Rule::fact(Term::int(3)),
            Err(TermError::InvalidConsequent { .. })
        ));
    }

    #[test]
    fn degree_range_is_checked() {
        assert!(matches!(Rule::new(c("a"), vec![], 0.0), Err(TermError::InvalidDegree { .. })));
        assert!(matches!(Rule::new(c("a"), vec![], 1.5), Err(TermError::InvalidDegree { .. })));
        assert!(matches!(
            Rule::defeasible(c("a"), vec![], 1.0),
            Err(TermError::InvalidDegree { .. })
        ));
    }

    #[test]
    fn classification() {
        let fact = Rule::fact(c("a")).unwrap();
        assert!(fact.is_fact() && fact.is_strict());
        let rule = fly_rule(&mut VarScope::new());
        assert!(rule.is_defeasible() && !rule.is_fact());
        assert!(!rule.is_auto_generated());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Rule::fact(c("a")).unwrap().to_string(), "a.");
        assert_eq!(fly_rule(&mut VarScope::new()).to_string(), "fly(X) <~0.8 bird(X).");
        let strict = Rule::strict(c("b"), vec![c("a"), c("c")]).unwrap();
        assert_eq!(strict.to_string(), "b <- a, c.");
        assert_eq!(Rule::new(c("a"), vec![], 0.5).unwrap().to_string(), "a <~0.5.");
    }

    #[test]
    fn equality_modulo_variables_ignores_degree() {
        let a = fly_rule(&mut VarScope::new());
        let b = fly_rule(&mut VarScope::new());
        assert!(a.is_equal_modulo_variables(&b));
        let strict = Rule::strict(a.consequent().clone(), a.antecedent().to_vec()).unwrap();
        assert!(a.is_equal_modulo_variables(&strict));
    }

    #[test]
    fn rename_apart_keeps_shape() {
        let mut scope = VarScope::new();
        let rule = fly_rule(&mut scope).with_name(
            Term::compound("r", vec![Term::var(scope.var("X"))]).unwrap(),
        );
        let renamed = rule.rename_apart();
        assert!(rule.is_equal_modulo_variables(&renamed));
        let x = scope.var("X");
        assert!(!renamed.consequent().contains_variable(&x));
        // the name shares the renamed variable
        let vars = renamed.variables();
        assert!(renamed.name().unwrap().contains_variable(&vars[0]));
    }

    #[test]
    fn metadata_is_kept() {
        let rule = Rule::fact(c("a"))
            .unwrap()
            .with_caption("A")
            .with_description("the letter a");
        assert_eq!(rule.caption(), Some("A"));
        assert_eq!(rule.description(), Some("the letter a"));
    }
}
