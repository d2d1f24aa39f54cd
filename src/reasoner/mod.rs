//! Dialectical proof search.
//!
//! A reasoner decides whether the last argument of the proponent list (PRO)
//! of a [`Dispute`] can be defended against every attacker the opponent
//! (OPP) can bring. Two strategies are available:
//!
//! - [`Grounded`]: sceptical; a defender must not itself be attacked by the
//!   attacker it answers
//! - [`PreferredCredulous`]: credulous; attackers already answered by some
//!   PRO member are free, and alternative defenders are backtracked over
//!
//! A [`ReasoningSession`] holds everything scoped to one run: argument
//! statuses, attacker caches, defenders and the accumulated [`Proof`].

mod grounded;
mod preferred;

pub use grounded::Grounded;
pub use preferred::{Defense, PreferredCredulous};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::argument::{Argument, ArgumentBuilder, ArgumentId, ArgumentStatus, Attack, AttackKind};
use crate::error::ConfigError;
use crate::term::Term;

// ---------------------------------------------------------------------------
// Semantics selection
// ---------------------------------------------------------------------------

/// Acceptance semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Semantics {
    #[default]
    Grounded,
    PreferredCredulous,
}

impl Semantics {
    pub const EXPECTED: &'static str = "grounded, preferred-credulous";

    pub fn as_str(self) -> &'static str {
        match self {
            Semantics::Grounded => "grounded",
            Semantics::PreferredCredulous => "preferred-credulous",
        }
    }

    pub fn reasoner(self) -> &'static dyn DialecticalReasoner {
        match self {
            Semantics::Grounded => &Grounded,
            Semantics::PreferredCredulous => &PreferredCredulous,
        }
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semantics {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grounded" => Ok(Semantics::Grounded),
            "preferred-credulous" => Ok(Semantics::PreferredCredulous),
            other => Err(ConfigError::UnsupportedValue {
                axis: "semantics",
                value: other.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispute
// ---------------------------------------------------------------------------

/// Proponent and opponent argument lists of a dialectical game.
#[derive(Debug, Clone, Default)]
pub struct Dispute {
    pub pro: Vec<Arc<Argument>>,
    pub opp: Vec<Arc<Argument>>,
}

impl Dispute {
    /// `PRO = [seed]`, `OPP = []`.
    pub fn seeded(seed: Arc<Argument>) -> Self {
        Self {
            pro: vec![seed],
            opp: Vec::new(),
        }
    }

    /// Whether PRO holds an argument semantically equal to `argument`.
    pub fn pro_contains(&self, argument: &Argument) -> bool {
        self.pro.iter().any(|p| p.is_semantically_equal(argument))
    }

    /// Whether OPP holds an argument semantically equal to `argument`.
    pub fn opp_contains(&self, argument: &Argument) -> bool {
        self.opp.iter().any(|o| o.is_semantically_equal(argument))
    }
}

/// A dialectical search strategy.
pub trait DialecticalReasoner {
    fn semantics(&self) -> Semantics;

    /// Defend the last PRO argument of `dispute` against all its attackers.
    ///
    /// Returns the (possibly extended) dispute on success and `None` when
    /// the argument cannot be defended. Statuses of the arguments examined
    /// are recorded in `session`.
    fn defend(&self, session: &mut ReasoningSession<'_>, dispute: Dispute) -> Option<Dispute>;
}

// ---------------------------------------------------------------------------
// Attack caches and proof
// ---------------------------------------------------------------------------

/// A successful attacker and what it attacks.
#[derive(Debug, Clone)]
pub struct AttackerEntry {
    pub attacker: Arc<Argument>,
    pub attack: Attack,
}

/// Attackers of one argument, split by whether the attack succeeds.
#[derive(Debug, Clone, Default)]
pub struct AttackCache {
    pub successful: Vec<AttackerEntry>,
    pub unsuccessful: Vec<Arc<Argument>>,
}

/// Every argument examined during a query, with the per-run inspection data.
#[derive(Debug, Clone, Default)]
pub struct Proof {
    arguments: Vec<Arc<Argument>>,
    ids: HashSet<ArgumentId>,
    statuses: HashMap<ArgumentId, ArgumentStatus>,
    attackers: HashMap<ArgumentId, AttackCache>,
    defenders: HashMap<ArgumentId, Vec<Arc<Argument>>>,
}

impl Proof {
    /// Arguments in the order they were first touched, deduplicated by id.
    pub fn arguments(&self) -> &[Arc<Argument>] {
        &self.arguments
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn contains(&self, argument: &Argument) -> bool {
        self.ids.contains(&argument.id())
    }

    pub fn status(&self, argument: &Argument) -> ArgumentStatus {
        self.statuses.get(&argument.id()).copied().unwrap_or_default()
    }

    /// Successful attackers of `argument`, if they were computed.
    pub fn attackers(&self, argument: &Argument) -> &[AttackerEntry] {
        self.attackers
            .get(&argument.id())
            .map(|c| c.successful.as_slice())
            .unwrap_or_default()
    }

    /// Arguments for a contrary claim that failed to attack `argument`.
    pub fn unsuccessful_attackers(&self, argument: &Argument) -> &[Arc<Argument>] {
        self.attackers
            .get(&argument.id())
            .map(|c| c.unsuccessful.as_slice())
            .unwrap_or_default()
    }

    /// Arguments that defeated `attacker` on behalf of PRO.
    pub fn defenders(&self, attacker: &Argument) -> &[Arc<Argument>] {
        self.defenders
            .get(&attacker.id())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn record(&mut self, argument: &Arc<Argument>) {
        for node in argument.subtree() {
            if self.ids.insert(node.id()) {
                self.arguments.push(node);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State of one reasoning run.
pub struct ReasoningSession<'b> {
    builder: &'b ArgumentBuilder<'b>,
    restricted_rebutting: bool,
    proof: Proof,
}

impl<'b> ReasoningSession<'b> {
    pub fn new(builder: &'b ArgumentBuilder<'b>, restricted_rebutting: bool) -> Self {
        Self {
            builder,
            restricted_rebutting,
            proof: Proof::default(),
        }
    }

    pub fn restricted_rebutting(&self) -> bool {
        self.restricted_rebutting
    }

    /// Run `reasoner` on `seed` from `PRO = [seed]`, `OPP = []`.
    pub fn evaluate(&mut self, reasoner: &dyn DialecticalReasoner, seed: &Arc<Argument>) -> Option<Dispute> {
        self.proof.record(seed);
        let outcome = reasoner.defend(self, Dispute::seeded(Arc::clone(seed)));
        tracing::debug!(
            argument = %seed,
            semantics = %reasoner.semantics(),
            undefeated = outcome.is_some(),
            "argument evaluated"
        );
        outcome
    }

    /// Deep successful attackers of `victim`, computed once per session.
    pub fn attackers_of(&mut self, victim: &Arc<Argument>) -> Vec<AttackerEntry> {
        if let Some(cache) = self.proof.attackers.get(&victim.id()) {
            return cache.successful.clone();
        }
        let cache = self.compute_attackers(victim);
        for entry in &cache.successful {
            self.proof.record(&entry.attacker);
        }
        tracing::debug!(
            victim = %victim,
            successful = cache.successful.len(),
            unsuccessful = cache.unsuccessful.len(),
            "attackers computed"
        );
        let successful = cache.successful.clone();
        self.proof.attackers.insert(victim.id(), cache);
        successful
    }

    pub fn status(&self, argument: &Argument) -> ArgumentStatus {
        self.proof.status(argument)
    }

    pub fn set_status(&mut self, argument: &Argument, status: ArgumentStatus) {
        self.proof.statuses.insert(argument.id(), status);
    }

    pub fn add_defender(&mut self, attacker: &Argument, defender: &Arc<Argument>) {
        let defenders = self.proof.defenders.entry(attacker.id()).or_default();
        if !defenders.iter().any(|d| d.id() == defender.id()) {
            defenders.push(Arc::clone(defender));
        }
    }

    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    pub fn into_proof(self) -> Proof {
        self.proof
    }

    fn compute_attackers(&self, victim: &Arc<Argument>) -> AttackCache {
        let mut cache = AttackCache::default();
        for node in victim.subtree() {
            if node.strength() < 1.0 {
                if let Some(goal) = node.claim().negation() {
                    self.collect(&mut cache, &goal, &node, AttackKind::Rebut);
                }
            }
            if node.top_rule().is_defeasible() {
                if let Some(goal) = node.applied_name().and_then(Term::negation) {
                    self.collect(&mut cache, &goal, &node, AttackKind::Undercut);
                }
            }
        }
        cache
    }

    fn collect(&self, cache: &mut AttackCache, goal: &Term, target: &Arc<Argument>, kind: AttackKind) {
        for candidate in self.builder.arguments(goal, 0.0) {
            let succeeds = match kind {
                AttackKind::Rebut => candidate.is_successful_attacker_of(target, self.restricted_rebutting),
                AttackKind::Undercut => candidate.undercuts(target),
            };
            if !succeeds {
                cache.unsuccessful.push(candidate);
            } else if !cache
                .successful
                .iter()
                .any(|e| e.attacker.is_semantically_equal(&candidate))
            {
                cache.successful.push(AttackerEntry {
                    attacker: candidate,
                    attack: Attack {
                        kind,
                        target: Arc::clone(target),
                    },
                });
            }
        }
    }
}
