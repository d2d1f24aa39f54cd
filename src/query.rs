//! Query driver.
//!
//! A query is one literal or a conjunction of literals. Every way of
//! supporting the whole expression (one argument list per match) is tested
//! with the configured reasoner; a match is undefeated only if each of its
//! arguments survives. All arguments touched along the way end up in one
//! proof, deduplicated by identity.

use std::sync::Arc;

use serde::Serialize;

use crate::argument::{Argument, ArgumentBuilder, ArgumentId, ArgumentStatus};
use crate::config::ReasonerConfig;
use crate::kb::KnowledgeBase;
use crate::reasoner::{Proof, ReasoningSession, Semantics};
use crate::term::Term;

/// One match of a query expression.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// The expression instantiated by the match.
    pub expression: Vec<Term>,
    pub undefeated: bool,
    /// The seed arguments, one per literal.
    pub arguments: Vec<Arc<Argument>>,
}

/// Everything a query produced.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub results: Vec<QueryResult>,
    pub proof: Proof,
    pub semantics: Semantics,
}

impl QueryOutcome {
    /// Whether some match survived.
    pub fn is_accepted(&self) -> bool {
        self.results.iter().any(|r| r.undefeated)
    }

    pub fn report(&self) -> QueryReport {
        QueryReport {
            semantics: self.semantics,
            results: self
                .results
                .iter()
                .map(|r| ResultReport {
                    expression: join(&r.expression),
                    undefeated: r.undefeated,
                    arguments: r.arguments.iter().map(|a| a.id()).collect(),
                })
                .collect(),
            proof: self
                .proof
                .arguments()
                .iter()
                .map(|a| ArgumentReport::new(a, &self.proof))
                .collect(),
        }
    }
}

/// A query against one knowledge base under one configuration.
pub struct Query<'kb> {
    expression: Vec<Term>,
    kb: &'kb KnowledgeBase,
    config: ReasonerConfig,
}

impl<'kb> Query<'kb> {
    pub fn new(expression: Vec<Term>, kb: &'kb KnowledgeBase, config: ReasonerConfig) -> Self {
        Self { expression, kb, config }
    }

    /// Query a single literal.
    pub fn literal(literal: Term, kb: &'kb KnowledgeBase, config: ReasonerConfig) -> Self {
        Self::new(vec![literal], kb, config)
    }

    pub fn expression(&self) -> &[Term] {
        &self.expression
    }

    /// Run the query in a fresh reasoning session.
    pub fn run(&self) -> QueryOutcome {
        let builder = ArgumentBuilder::new(self.kb, self.config.valuation)
            .with_max_depth(self.config.max_argument_depth);
        let reasoner = self.config.semantics.reasoner();
        let mut session = ReasoningSession::new(&builder, self.config.restricted_rebutting);
        let mut results = Vec::new();

        for list in builder.argument_lists(&self.expression, self.config.min_strength) {
            let mut undefeated = true;
            for argument in list.iter() {
                if session.evaluate(reasoner, argument).is_none() {
                    undefeated = false;
                }
            }
            results.push(QueryResult {
                expression: self.expression.iter().map(|t| t.apply(&list.substitution)).collect(),
                undefeated,
                arguments: list.arguments,
            });
        }

        let proof = session.into_proof();
        tracing::info!(
            expression = %join(&self.expression),
            semantics = %self.config.semantics,
            results = results.len(),
            undefeated = results.iter().filter(|r| r.undefeated).count(),
            proof = proof.len(),
            arguments = builder.ids().allocated(),
            "query complete"
        );
        QueryOutcome {
            results,
            proof,
            semantics: self.config.semantics,
        }
    }
}

fn join(terms: &[Term]) -> String {
    terms.iter().map(Term::to_string).collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// Serializable report
// ---------------------------------------------------------------------------

/// JSON view of a [`QueryOutcome`].
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub semantics: Semantics,
    pub results: Vec<ResultReport>,
    pub proof: Vec<ArgumentReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub expression: String,
    pub undefeated: bool,
    pub arguments: Vec<ArgumentId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentReport {
    pub id: ArgumentId,
    pub claim: String,
    pub strength: f64,
    pub status: ArgumentStatus,
    pub rule: String,
    pub sub_arguments: Vec<ArgumentId>,
    pub attackers: Vec<ArgumentId>,
    pub defenders: Vec<ArgumentId>,
}

impl ArgumentReport {
    fn new(argument: &Argument, proof: &Proof) -> Self {
        Self {
            id: argument.id(),
            claim: argument.claim().to_string(),
            strength: argument.strength(),
            status: proof.status(argument),
            rule: argument.top_rule().to_string(),
            sub_arguments: argument.sub_arguments().iter().map(|a| a.id()).collect(),
            attackers: proof.attackers(argument).iter().map(|e| e.attacker.id()).collect(),
            defenders: proof.defenders(argument).iter().map(|a| a.id()).collect(),
        }
    }
}
