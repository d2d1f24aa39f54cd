//! Indexed, mutable rule store.
//!
//! The knowledge base owns every rule it is given, assigns ids and automatic
//! names, and maintains the auto-generated rules derived from user rules:
//!
//! - **rule hooks**: a hidden fact asserting the name of every non-fact user
//!   rule, so a rule application can be looked up (and undercut) by name
//! - **transpositions**: contrapositives of strict rules, present only while
//!   transposition is enabled
//!
//! Auto-generated rules can only be removed together with their source.

mod catalogue;
mod transposition;

pub use catalogue::PredicateCatalogue;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::KnowledgeBaseError;
use crate::rule::{Rule, RuleId, RuleOrigin};
use crate::term::{PredicateKey, Term};

/// Result type for knowledge base operations.
pub type KbResult<T> = std::result::Result<T, KnowledgeBaseError>;

/// Functor prefix of automatically assigned rule names.
pub const AUTO_NAME_PREFIX: &str = "r";

/// Rule counts by origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KbStats {
    pub rules: usize,
    pub user_rules: usize,
    pub rule_hooks: usize,
    pub transpositions: usize,
    pub predicates: usize,
}

impl fmt::Display for KbStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rules ({} user, {} hooks, {} transpositions), {} predicates",
            self.rules, self.user_rules, self.rule_hooks, self.transpositions, self.predicates
        )
    }
}

/// The rule store.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    rules: BTreeMap<RuleId, Arc<Rule>>,
    /// consequent tag -> antecedent arity -> rules in insertion order.
    index: HashMap<PredicateKey, BTreeMap<usize, Vec<RuleId>>>,
    /// name tag -> named rules.
    names: HashMap<PredicateKey, Vec<RuleId>>,
    /// source rule -> its hooks and transpositions.
    generated: HashMap<RuleId, Vec<RuleId>>,
    catalogue: PredicateCatalogue,
    transposition: bool,
    next_id: u64,
    next_auto_name: u64,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
            index: HashMap::new(),
            names: HashMap::new(),
            generated: HashMap::new(),
            catalogue: PredicateCatalogue::default(),
            transposition: false,
            next_id: 1,
            next_auto_name: 1,
        }
    }

    /// Create a knowledge base with transposition on or off.
    pub fn with_transposition(enabled: bool) -> Self {
        let mut kb = Self::new();
        kb.transposition = enabled;
        kb
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Add a user rule and everything it generates.
    ///
    /// Fails without changing the knowledge base if the rule duplicates an
    /// existing user rule or rule hook modulo variable renaming, if its explicit name
    /// unifies with its own consequent, or if that name collides with a name
    /// that was not auto-assigned. A collision with an auto-assigned name
    /// renames the other rule instead. A rule equal to a stored transposition
    /// takes that transposition's place.
    pub fn add_rule(&mut self, mut rule: Rule) -> KbResult<RuleId> {
        if let Some(existing) = self.find(&rule, |r| !matches!(r.origin(), RuleOrigin::Transposition { .. })) {
            tracing::debug!(rule = %rule, existing = %existing, "duplicate rule rejected");
            return Err(KnowledgeBaseError::DuplicateRule {
                rule: rule.to_string(),
            });
        }

        let mut displaced = Vec::new();
        if let Some(name) = rule.name() {
            if !name.is_literal() {
                return Err(KnowledgeBaseError::NameConflict {
                    name: name.to_string(),
                    reason: "the term kinds allowed for names (use a constant or compound term)".into(),
                });
            }
            if name.is_unifiable(rule.consequent()) {
                return Err(KnowledgeBaseError::NameConflict {
                    name: name.to_string(),
                    reason: "the rule's own consequent".into(),
                });
            }
            for id in self.ids_named(name) {
                let other = &self.rules[&id];
                if !other.is_name_auto_assigned() {
                    return Err(KnowledgeBaseError::NameConflict {
                        name: name.to_string(),
                        reason: format!("the name of rule `{other}`"),
                    });
                }
                displaced.push(id);
            }
        } else if !rule.is_fact() {
            let name = self.fresh_auto_name(&rule);
            rule.set_auto_name(name);
        }

        if let Some(transposed) = self.find(&rule, |r| matches!(r.origin(), RuleOrigin::Transposition { .. })) {
            tracing::debug!(rule = %rule, "user rule replaces an equal transposition");
            self.drop_generated(transposed);
        }

        let strict_inference = rule.is_strict() && !rule.is_fact();
        let has_hook = !rule.is_fact() && rule.name().is_some();
        let id = self.insert(rule, RuleOrigin::User);

        for other in displaced {
            self.reassign_auto_name(other);
        }
        if has_hook {
            self.add_hook(id);
        }
        if self.transposition && strict_inference {
            self.transpose(id);
        }
        Ok(id)
    }

    /// Remove a user rule together with its hook and transpositions.
    ///
    /// With transposition on, contrapositives that the removed rule shared
    /// with, or shadowed for, the remaining strict rules are generated again.
    pub fn remove_rule(&mut self, id: RuleId) -> KbResult<Arc<Rule>> {
        let rule = self
            .rules
            .get(&id)
            .ok_or(KnowledgeBaseError::RuleNotFound { id: id.get() })?;
        if let Some(source) = rule.origin().source() {
            return Err(KnowledgeBaseError::AutoGeneratedRemoval {
                rule: rule.to_string(),
                source_rule: self
                    .rules
                    .get(&source)
                    .map_or_else(|| source.to_string(), ToString::to_string),
            });
        }

        for child in self.generated.remove(&id).unwrap_or_default() {
            self.detach(child);
        }
        let removed = self
            .detach(id)
            .ok_or(KnowledgeBaseError::RuleNotFound { id: id.get() })?;
        tracing::debug!(rule = %removed, "rule removed");
        if self.transposition {
            for source in self.strict_user_rules() {
                self.transpose(source);
            }
        }
        Ok(removed)
    }

    /// Remove the user rule equal to `rule` modulo variable renaming.
    pub fn remove_matching(&mut self, rule: &Rule) -> KbResult<Arc<Rule>> {
        match self.find_user_rule(rule) {
            Some(id) => self.remove_rule(id),
            None => Err(KnowledgeBaseError::PredicateNotFound {
                functor: rule.consequent().functor().unwrap_or_default().to_string(),
                arity: rule.consequent().arity(),
                antecedent_arity: rule.antecedent().len(),
            }),
        }
    }

    /// Turn transposition on (generating contrapositives for every strict
    /// user rule) or off (removing exactly those contrapositives).
    pub fn set_transposition(&mut self, enabled: bool) {
        if self.transposition == enabled {
            return;
        }
        self.transposition = enabled;

        if enabled {
            for id in self.strict_user_rules() {
                self.transpose(id);
            }
        } else {
            let transposed: Vec<RuleId> = self
                .rules
                .values()
                .filter(|r| matches!(r.origin(), RuleOrigin::Transposition { .. }))
                .map(|r| r.id())
                .collect();
            for id in &transposed {
                self.detach(*id);
            }
            for children in self.generated.values_mut() {
                children.retain(|c| !transposed.contains(c));
            }
            self.generated.retain(|_, children| !children.is_empty());
        }
        tracing::debug!(enabled, rules = self.rules.len(), "transposition toggled");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn is_transposition_enabled(&self) -> bool {
        self.transposition
    }

    pub fn rule(&self, id: RuleId) -> Option<&Arc<Rule>> {
        self.rules.get(&id)
    }

    /// All rules, auto-generated ones included, in id order.
    pub fn rules(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.values()
    }

    /// Rules added by callers, in id order.
    pub fn user_rules(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.values().filter(|r| !r.is_auto_generated())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a rule equal to `rule` modulo variable renaming is stored.
    pub fn rule_exists(&self, rule: &Rule) -> bool {
        self.find(rule, |_| true).is_some()
    }

    /// Whether `term` unifies with the name of some rule.
    pub fn is_rule_name(&self, term: &Term) -> bool {
        !self.ids_named(term).is_empty()
    }

    /// The first rule whose name unifies with `term`.
    pub fn rule_from_name(&self, term: &Term) -> Option<&Arc<Rule>> {
        self.ids_named(term).first().and_then(|id| self.rules.get(id))
    }

    /// Ids of the hook and transposition rules generated from `id`.
    pub fn generated_from(&self, id: RuleId) -> &[RuleId] {
        self.generated.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Rules whose consequent carries the same tag as `goal`, ordered by
    /// antecedent arity then insertion.
    pub fn candidates(&self, goal: &Term) -> Vec<Arc<Rule>> {
        let Some(key) = goal.key() else {
            return Vec::new();
        };
        self.index
            .get(&key)
            .into_iter()
            .flat_map(BTreeMap::values)
            .flatten()
            .filter_map(|id| self.rules.get(id).cloned())
            .collect()
    }

    /// Rules concluding `key` with exactly `antecedent_arity` literals.
    pub fn rules_for(&self, key: &PredicateKey, antecedent_arity: usize) -> KbResult<Vec<Arc<Rule>>> {
        self.index
            .get(key)
            .and_then(|by_arity| by_arity.get(&antecedent_arity))
            .map(|ids| ids.iter().filter_map(|id| self.rules.get(id).cloned()).collect())
            .ok_or_else(|| KnowledgeBaseError::PredicateNotFound {
                functor: key.functor.to_string(),
                arity: key.arity,
                antecedent_arity,
            })
    }

    pub fn catalogue(&self) -> &PredicateCatalogue {
        &self.catalogue
    }

    /// Groups of predicates that depend on each other through rules.
    pub fn cyclic_predicates(&self) -> Vec<Vec<PredicateKey>> {
        catalogue::cyclic_predicates(self.rules.values().map(AsRef::as_ref))
    }

    pub fn stats(&self) -> KbStats {
        let mut stats = KbStats {
            rules: self.rules.len(),
            predicates: self.catalogue.len(),
            ..KbStats::default()
        };
        for rule in self.rules.values() {
            match rule.origin() {
                RuleOrigin::User => stats.user_rules += 1,
                RuleOrigin::RuleHook { .. } => stats.rule_hooks += 1,
                RuleOrigin::Transposition { .. } => stats.transpositions += 1,
            }
        }
        stats
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn find(&self, rule: &Rule, accept: impl Fn(&Rule) -> bool) -> Option<RuleId> {
        let key = rule.consequent().key()?;
        self.index
            .get(&key)?
            .get(&rule.antecedent().len())?
            .iter()
            .filter_map(|id| self.rules.get(id))
            .map(Arc::as_ref)
            .find(|existing| accept(*existing) && existing.is_equal_modulo_variables(rule))
            .map(Rule::id)
    }

    /// User rules that transposition applies to.
    fn strict_user_rules(&self) -> Vec<RuleId> {
        self.rules
            .values()
            .filter(|r| !r.is_auto_generated() && r.is_strict() && !r.is_fact())
            .map(|r| r.id())
            .collect()
    }

    fn find_user_rule(&self, rule: &Rule) -> Option<RuleId> {
        self.find(rule, |r| !r.is_auto_generated())
    }

    fn ids_named(&self, name: &Term) -> Vec<RuleId> {
        let Some(key) = name.key() else {
            return Vec::new();
        };
        self.names
            .get(&key)
            .into_iter()
            .flatten()
            .filter(|id| {
                self.rules
                    .get(*id)
                    .and_then(|r| r.name())
                    .is_some_and(|n| n.is_unifiable(name))
            })
            .copied()
            .collect()
    }

    /// `rN(V1, ..., Vk)` over the rule's variables, skipping any `N` whose
    /// name is already taken.
    fn fresh_auto_name(&mut self, rule: &Rule) -> Term {
        let args: Vec<Term> = rule.variables().into_iter().map(Term::var).collect();
        loop {
            let functor = format!("{AUTO_NAME_PREFIX}{}", self.next_auto_name);
            self.next_auto_name += 1;
            if let Ok(name) = Term::compound(&functor, args.clone()) {
                if !self.is_rule_name(&name) {
                    return name;
                }
            }
        }
    }

    fn insert(&mut self, mut rule: Rule, origin: RuleOrigin) -> RuleId {
        let id = RuleId::new(self.next_id);
        self.next_id += 1;
        rule.assign(id, origin);

        if let Some(key) = rule.consequent().key() {
            self.index
                .entry(key)
                .or_default()
                .entry(rule.antecedent().len())
                .or_default()
                .push(id);
        }
        if let Some(key) = rule.name().and_then(Term::key) {
            self.names.entry(key).or_default().push(id);
        }
        if let Some(source) = origin.source() {
            self.generated.entry(source).or_default().push(id);
        }
        self.catalogue.record(&rule);

        tracing::debug!(id = %id, rule = %rule, ?origin, "rule added");
        self.rules.insert(id, Arc::new(rule));
        id
    }

    fn detach(&mut self, id: RuleId) -> Option<Arc<Rule>> {
        let rule = self.rules.remove(&id)?;
        if let Some(key) = rule.consequent().key() {
            if let Some(by_arity) = self.index.get_mut(&key) {
                if let Some(ids) = by_arity.get_mut(&rule.antecedent().len()) {
                    ids.retain(|i| *i != id);
                    if ids.is_empty() {
                        by_arity.remove(&rule.antecedent().len());
                    }
                }
                if by_arity.is_empty() {
                    self.index.remove(&key);
                }
            }
        }
        if let Some(key) = rule.name().and_then(Term::key) {
            self.unindex_name(&key, id);
        }
        self.catalogue.forget(&rule);
        Some(rule)
    }

    /// Detach an auto-generated rule and forget its source's claim on it.
    fn drop_generated(&mut self, id: RuleId) {
        let Some(rule) = self.detach(id) else {
            return;
        };
        if let Some(source) = rule.origin().source() {
            if let Some(children) = self.generated.get_mut(&source) {
                children.retain(|c| *c != id);
                if children.is_empty() {
                    self.generated.remove(&source);
                }
            }
        }
    }

    fn unindex_name(&mut self, key: &PredicateKey, id: RuleId) {
        if let Some(ids) = self.names.get_mut(key) {
            ids.retain(|i| *i != id);
            if ids.is_empty() {
                self.names.remove(key);
            }
        }
    }

    fn add_hook(&mut self, source: RuleId) {
        let Some(rule) = self.rules.get(&source) else {
            return;
        };
        let Some(name) = rule.name().cloned() else {
            return;
        };
        match Rule::new(name, Vec::new(), rule.degree()) {
            Ok(hook) => {
                self.insert(hook, RuleOrigin::RuleHook { source });
            }
            Err(e) => tracing::warn!(rule = %rule, error = %e, "cannot create rule hook"),
        }
    }

    /// Give an auto-named rule a fresh name and refresh its hook.
    fn reassign_auto_name(&mut self, id: RuleId) {
        let Some(current) = self.rules.get(&id).cloned() else {
            return;
        };
        if let Some(key) = current.name().and_then(Term::key) {
            self.unindex_name(&key, id);
        }
        let name = self.fresh_auto_name(&current);
        tracing::debug!(rule = %current, name = %name, "auto-assigned name displaced");

        let mut renamed = (*current).clone();
        renamed.set_auto_name(name);
        if let Some(key) = renamed.name().and_then(Term::key) {
            self.names.entry(key).or_default().push(id);
        }
        self.rules.insert(id, Arc::new(renamed));

        if current.origin() == RuleOrigin::User {
            let hooks: Vec<RuleId> = self
                .generated_from(id)
                .iter()
                .copied()
                .filter(|h| {
                    self.rules
                        .get(h)
                        .is_some_and(|r| matches!(r.origin(), RuleOrigin::RuleHook { .. }))
                })
                .collect();
            for hook in &hooks {
                self.detach(*hook);
            }
            if let Some(children) = self.generated.get_mut(&id) {
                children.retain(|c| !hooks.contains(c));
            }
            self.add_hook(id);
        }
    }

    fn transpose(&mut self, source: RuleId) {
        let Some(rule) = self.rules.get(&source).cloned() else {
            return;
        };
        for mut transposed in transposition::transpositions(&rule) {
            if self.rule_exists(&transposed) {
                tracing::trace!(rule = %transposed, "transposition already present");
                continue;
            }
            let name = self.fresh_auto_name(&transposed);
            transposed.set_auto_name(name);
            self.insert(transposed, RuleOrigin::Transposition { source });
        }
    }
}
