//! Engine facade: top-level API for the argumentation engine.
//!
//! The `Engine` owns a knowledge base and the reasoning configuration, keeps
//! the transposition axis of the configuration in sync with the knowledge
//! base, and runs queries.

use std::fmt;
use std::sync::Arc;

use crate::config::ReasonerConfig;
use crate::document::RuleDocument;
use crate::error::AspicResult;
use crate::kb::{KbStats, KnowledgeBase};
use crate::query::{Query, QueryOutcome};
use crate::rule::{Rule, RuleId};
use crate::term::{PredicateKey, Term};

/// Summary of the knowledge base behind an engine.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub stats: KbStats,
    /// Groups of mutually recursive predicates.
    pub cyclic_predicates: Vec<Vec<PredicateKey>>,
    pub config: ReasonerConfig,
}

impl fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.stats)?;
        writeln!(
            f,
            "semantics: {}, valuation: {}, transposition: {}, restricted rebutting: {}",
            self.config.semantics,
            self.config.valuation,
            self.config.transposition,
            self.config.restricted_rebutting
        )?;
        if self.cyclic_predicates.is_empty() {
            write!(f, "no recursive predicates")
        } else {
            write!(f, "recursive predicate groups:")?;
            for group in &self.cyclic_predicates {
                let names: Vec<String> = group.iter().map(PredicateKey::to_string).collect();
                write!(f, "\n  {}", names.join(", "))?;
            }
            Ok(())
        }
    }
}

/// The argumentation engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: ReasonerConfig,
    kb: KnowledgeBase,
}

impl Engine {
    /// Create an engine with an empty knowledge base.
    pub fn new(config: ReasonerConfig) -> AspicResult<Self> {
        config.validate()?;
        tracing::info!(
            semantics = %config.semantics,
            valuation = %config.valuation,
            transposition = config.transposition,
            restricted_rebutting = config.restricted_rebutting,
            "initializing argumentation engine"
        );
        Ok(Self {
            kb: KnowledgeBase::with_transposition(config.transposition),
            config,
        })
    }

    /// Create an engine and load every rule of `document`.
    pub fn from_document(config: ReasonerConfig, document: &RuleDocument) -> AspicResult<Self> {
        let mut engine = Self::new(config)?;
        engine.load_document(document)?;
        Ok(engine)
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Replace the configuration. Switching transposition adds or removes
    /// the generated rules.
    pub fn set_config(&mut self, config: ReasonerConfig) -> AspicResult<()> {
        config.validate()?;
        self.kb.set_transposition(config.transposition);
        self.config = config;
        Ok(())
    }

    pub fn kb(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn add_rule(&mut self, rule: Rule) -> AspicResult<RuleId> {
        Ok(self.kb.add_rule(rule)?)
    }

    pub fn remove_rule(&mut self, id: RuleId) -> AspicResult<Arc<Rule>> {
        Ok(self.kb.remove_rule(id)?)
    }

    /// Add the rules of `document` in order. Stops at the first failure;
    /// rules added before it stay.
    pub fn load_document(&mut self, document: &RuleDocument) -> AspicResult<usize> {
        let rules = document.rules()?;
        let count = rules.len();
        for rule in rules {
            self.kb.add_rule(rule)?;
        }
        tracing::info!(rules = count, total = self.kb.len(), "rule document loaded");
        Ok(count)
    }

    /// Query a conjunction of literals.
    pub fn query(&self, expression: Vec<Term>) -> QueryOutcome {
        Query::new(expression, &self.kb, self.config.clone()).run()
    }

    /// Query a single literal.
    pub fn query_literal(&self, literal: Term) -> QueryOutcome {
        self.query(vec![literal])
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            stats: self.kb.stats(),
            cyclic_predicates: self.kb.cyclic_predicates(),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AspicError, ConfigError, KnowledgeBaseError};

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ReasonerConfig {
            min_strength: -0.1,
            ..ReasonerConfig::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(AspicError::Config(ConfigError::InvalidThreshold { .. }))
        ));
    }

    #[test]
    fn duplicate_rule_leaves_kb_unchanged() {
        let mut engine = Engine::new(ReasonerConfig::default()).unwrap();
        engine.add_rule(Rule::fact(c("a")).unwrap()).unwrap();
        let before = engine.kb().len();
        let err = engine.add_rule(Rule::fact(c("a")).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            AspicError::KnowledgeBase(KnowledgeBaseError::DuplicateRule { .. })
        ));
        assert_eq!(engine.kb().len(), before);
    }

    #[test]
    fn set_config_syncs_transposition() {
        let mut engine = Engine::new(ReasonerConfig::default()).unwrap();
        engine
            .add_rule(Rule::strict(c("a"), vec![c("b"), c("c")]).unwrap())
            .unwrap();
        let before = engine.kb().len();

        let config = ReasonerConfig {
            transposition: true,
            ..ReasonerConfig::default()
        };
        engine.set_config(config).unwrap();
        assert_eq!(engine.kb().len(), before + 2);
        assert_eq!(engine.info().stats.transpositions, 2);

        engine.set_config(ReasonerConfig::default()).unwrap();
        assert_eq!(engine.kb().len(), before);
    }

    #[test]
    fn info_reports_recursion() {
        let mut engine = Engine::new(ReasonerConfig::default()).unwrap();
        engine.add_rule(Rule::strict(c("p"), vec![c("q")]).unwrap()).unwrap();
        engine.add_rule(Rule::strict(c("q"), vec![c("p")]).unwrap()).unwrap();
        let info = engine.info();
        assert_eq!(info.cyclic_predicates.len(), 1);
        assert!(info.to_string().contains("p/0, q/0"));
    }
}
