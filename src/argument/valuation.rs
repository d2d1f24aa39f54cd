//! Argument valuation strategies.
//!
//! A valuation combines the degree of belief of an argument's top rule with
//! the strengths of its sub-arguments.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rule::Rule;

use super::Argument;

/// Strategy computing an argument's strength.
pub trait Valuation {
    /// Strength of an argument built from `rule` over `sub_arguments`.
    fn strength(&self, rule: &Rule, sub_arguments: &[Arc<Argument>]) -> f64;

    /// Whether a strength threshold can be pushed down to sub-goals, i.e.
    /// whether a sub-argument below the threshold always yields a parent
    /// below it.
    fn prunes_sub_goals(&self) -> bool;
}

/// `min(degree, min over sub-arguments)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeakestLink;

impl Valuation for WeakestLink {
    fn strength(&self, rule: &Rule, sub_arguments: &[Arc<Argument>]) -> f64 {
        sub_arguments
            .iter()
            .map(|a| a.strength())
            .fold(rule.degree(), f64::min)
    }

    fn prunes_sub_goals(&self) -> bool {
        true
    }
}

/// The degree of the shallowest defeasible rule: the top rule's degree if it
/// is defeasible, else the weakest last-link value among sub-arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastLink;

impl Valuation for LastLink {
    fn strength(&self, rule: &Rule, sub_arguments: &[Arc<Argument>]) -> f64 {
        if rule.is_defeasible() {
            return rule.degree();
        }
        sub_arguments
            .iter()
            .map(|a| a.strength())
            .fold(rule.degree(), f64::min)
    }

    fn prunes_sub_goals(&self) -> bool {
        false
    }
}

/// Selectable valuation, as configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValuationKind {
    #[default]
    WeakestLink,
    LastLink,
}

impl ValuationKind {
    pub const EXPECTED: &'static str = "weakest-link, last-link";

    pub fn as_str(self) -> &'static str {
        match self {
            ValuationKind::WeakestLink => "weakest-link",
            ValuationKind::LastLink => "last-link",
        }
    }

    fn strategy(self) -> &'static dyn Valuation {
        match self {
            ValuationKind::WeakestLink => &WeakestLink,
            ValuationKind::LastLink => &LastLink,
        }
    }
}

impl Valuation for ValuationKind {
    fn strength(&self, rule: &Rule, sub_arguments: &[Arc<Argument>]) -> f64 {
        self.strategy().strength(rule, sub_arguments)
    }

    fn prunes_sub_goals(&self) -> bool {
        self.strategy().prunes_sub_goals()
    }
}

impl fmt::Display for ValuationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValuationKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weakest-link" => Ok(ValuationKind::WeakestLink),
            "last-link" => Ok(ValuationKind::LastLink),
            other => Err(ConfigError::UnsupportedValue {
                axis: "valuation",
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgumentBuilder;
    use crate::kb::KnowledgeBase;
    use crate::term::Term;

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    /// a <- b (strict), b <~0.6 c, c <~0.9.
    fn chain() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::new(c("c"), vec![], 0.9).unwrap()).unwrap();
        kb.add_rule(Rule::defeasible(c("b"), vec![c("c")], 0.6).unwrap()).unwrap();
        kb.add_rule(Rule::strict(c("a"), vec![c("b")]).unwrap()).unwrap();
        kb
    }

    fn strength_of(kb: &KnowledgeBase, kind: ValuationKind, goal: &str) -> f64 {
        let builder = ArgumentBuilder::new(kb, kind);
        let arg = builder.arguments(&c(goal), 0.0).next().unwrap();
        arg.strength()
    }

    #[test]
    fn weakest_link_takes_minimum() {
        let kb = chain();
        assert_eq!(strength_of(&kb, ValuationKind::WeakestLink, "b"), 0.6);
        assert_eq!(strength_of(&kb, ValuationKind::WeakestLink, "a"), 0.6);
    }

    #[test]
    fn last_link_uses_shallowest_defeasible_rule() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::new(c("c"), vec![], 0.3).unwrap()).unwrap();
        kb.add_rule(Rule::defeasible(c("b"), vec![c("c")], 0.6).unwrap()).unwrap();
        kb.add_rule(Rule::strict(c("a"), vec![c("b")]).unwrap()).unwrap();
        assert_eq!(strength_of(&kb, ValuationKind::LastLink, "b"), 0.6);
        assert_eq!(strength_of(&kb, ValuationKind::LastLink, "a"), 0.6);
        assert_eq!(strength_of(&kb, ValuationKind::WeakestLink, "a"), 0.3);
    }

    #[test]
    fn strict_facts_have_full_strength() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::fact(c("a")).unwrap()).unwrap();
        assert_eq!(strength_of(&kb, ValuationKind::WeakestLink, "a"), 1.0);
        assert_eq!(strength_of(&kb, ValuationKind::LastLink, "a"), 1.0);
    }

    #[test]
    fn kinds_parse_from_kebab_case() {
        assert_eq!("last-link".parse::<ValuationKind>().unwrap(), ValuationKind::LastLink);
        assert_eq!(ValuationKind::WeakestLink.to_string(), "weakest-link");
        assert!(matches!(
            "strongest-link".parse::<ValuationKind>(),
            Err(ConfigError::UnsupportedValue { axis: "valuation", .. })
        ));
    }
}
