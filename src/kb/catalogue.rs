//! Predicate catalogue and dependency diagnostics.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::rule::{Rule, RuleOrigin};
use crate::term::{PredicateKey, Term};

/// `functor -> arity -> number of rule occurrences`.
#[derive(Debug, Default, Clone)]
pub struct PredicateCatalogue {
    arities: BTreeMap<Arc<str>, BTreeMap<usize, usize>>,
}

impl PredicateCatalogue {
    pub(crate) fn record(&mut self, rule: &Rule) {
        for key in literal_keys(rule) {
            *self
                .arities
                .entry(key.functor)
                .or_default()
                .entry(key.arity)
                .or_insert(0) += 1;
        }
    }

    pub(crate) fn forget(&mut self, rule: &Rule) {
        for key in literal_keys(rule) {
            let Some(by_arity) = self.arities.get_mut(&key.functor) else {
                continue;
            };
            if let Some(count) = by_arity.get_mut(&key.arity) {
                *count -= 1;
                if *count == 0 {
                    by_arity.remove(&key.arity);
                }
            }
            if by_arity.is_empty() {
                self.arities.remove(&key.functor);
            }
        }
    }

    /// Observed arities of `functor`, ascending.
    pub fn arities(&self, functor: &str) -> BTreeSet<usize> {
        self.arities
            .get(functor)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, functor: &str, arity: usize) -> bool {
        self.arities
            .get(functor)
            .is_some_and(|m| m.contains_key(&arity))
    }

    /// Every observed predicate, sorted by functor then arity.
    pub fn predicates(&self) -> Vec<PredicateKey> {
        self.arities
            .iter()
            .flat_map(|(functor, m)| {
                m.keys()
                    .map(|&arity| PredicateKey::new(Arc::clone(functor), arity))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arities.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.arities.is_empty()
    }
}

fn literal_keys(rule: &Rule) -> impl Iterator<Item = PredicateKey> + '_ {
    std::iter::once(rule.consequent())
        .chain(rule.antecedent())
        .filter_map(Term::key)
}

/// Groups of predicates that depend on each other through positive
/// antecedent literals. Rule hooks are ignored; a single predicate is only
/// reported when it depends on itself.
pub(crate) fn cyclic_predicates<'a>(
    rules: impl Iterator<Item = &'a Rule>,
) -> Vec<Vec<PredicateKey>> {
    let mut graph: DiGraph<PredicateKey, ()> = DiGraph::new();
    let mut nodes: HashMap<PredicateKey, NodeIndex> = HashMap::new();
    let mut node = |graph: &mut DiGraph<PredicateKey, ()>, key: PredicateKey| {
        *nodes
            .entry(key.clone())
            .or_insert_with(|| graph.add_node(key))
    };

    for rule in rules {
        if matches!(rule.origin(), RuleOrigin::RuleHook { .. }) {
            continue;
        }
        let Some(head) = rule.consequent().key() else {
            continue;
        };
        let head_idx = node(&mut graph, head);
        for literal in rule.antecedent() {
            if let Some(dep) = literal.key() {
                let dep_idx = node(&mut graph, dep);
                graph.update_edge(dep_idx, head_idx, ());
            }
        }
    }

    let mut groups: Vec<Vec<PredicateKey>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| match scc.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        })
        .map(|scc| {
            let mut keys: Vec<PredicateKey> = scc.into_iter().map(|idx| graph[idx].clone()).collect();
            keys.sort();
            keys
        })
        .collect();
    groups.sort();
    groups
}
