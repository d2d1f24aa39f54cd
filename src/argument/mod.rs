//! Arguments, argument lists and the attack relations between arguments.
//!
//! An [`Argument`] is a tree: a top rule instance, the substitution that
//! instantiated it and one sub-argument per antecedent literal. Arguments
//! are immutable and shared via `Arc`; the per-run status of an argument is
//! held by the reasoning session, not by the argument itself.
//!
//! # Attacks
//!
//! - **rebut**: the attacker concludes the negation of the claim of the
//!   victim (or of one of its sub-arguments), the victim is not strict, and
//!   the attacker is at least as strong
//! - **undercut**: the attacker concludes the negation of the instantiated
//!   name of a defeasible rule application, whatever the strengths

pub mod builder;
pub mod valuation;

pub use builder::{ArgumentBuilder, ArgumentListStream, ArgumentStream};
pub use valuation::{LastLink, Valuation, ValuationKind, WeakestLink};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::rule::Rule;
use crate::substitution::Substitution;
use crate::term::Term;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Session-scoped argument number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArgumentId(u64);

impl ArgumentId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ArgumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Argument numbering owned by one reasoning session, starting from 1.
#[derive(Debug)]
pub struct ArgumentIds {
    next: AtomicU64,
}

impl Default for ArgumentIds {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgumentIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> ArgumentId {
        ArgumentId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

// ---------------------------------------------------------------------------
// Status and attacks
// ---------------------------------------------------------------------------

/// Verdict of the last reasoning run that examined an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgumentStatus {
    #[default]
    Unset,
    Undefeated,
    Defeated,
}

impl fmt::Display for ArgumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgumentStatus::Unset => "unset",
            ArgumentStatus::Undefeated => "undefeated",
            ArgumentStatus::Defeated => "defeated",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttackKind {
    Rebut,
    Undercut,
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttackKind::Rebut => "rebut",
            AttackKind::Undercut => "undercut",
        })
    }
}

/// A successful attack on `target`, a node of the attacked argument tree.
#[derive(Debug, Clone)]
pub struct Attack {
    pub kind: AttackKind,
    pub target: Arc<Argument>,
}

// ---------------------------------------------------------------------------
// Argument
// ---------------------------------------------------------------------------

/// An argument tree.
#[derive(Debug)]
pub struct Argument {
    id: ArgumentId,
    top_rule: Arc<Rule>,
    substitution: Substitution,
    sub_arguments: Vec<Arc<Argument>>,
    strength: f64,
    claim: Term,
    applied_name: Option<Term>,
    depth: usize,
}

impl Argument {
    pub(crate) fn new(
        id: ArgumentId,
        top_rule: Arc<Rule>,
        substitution: Substitution,
        sub_arguments: Vec<Arc<Argument>>,
        strength: f64,
        depth: usize,
    ) -> Self {
        let claim = top_rule.consequent().apply(&substitution);
        let applied_name = top_rule.name().map(|n| n.apply(&substitution));
        Self {
            id,
            top_rule,
            substitution,
            sub_arguments,
            strength,
            claim,
            applied_name,
            depth,
        }
    }

    pub fn id(&self) -> ArgumentId {
        self.id
    }

    /// The (renamed-apart) rule instance at the root.
    pub fn top_rule(&self) -> &Arc<Rule> {
        &self.top_rule
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    pub fn sub_arguments(&self) -> &[Arc<Argument>] {
        &self.sub_arguments
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// The top rule's consequent under the argument's substitution.
    pub fn claim(&self) -> &Term {
        &self.claim
    }

    /// The top rule's name under the argument's substitution.
    pub fn applied_name(&self) -> Option<&Term> {
        self.applied_name.as_ref()
    }

    /// Nesting level at which the builder produced this argument.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_main(&self) -> bool {
        self.depth == 0
    }

    pub fn is_atomic(&self) -> bool {
        self.sub_arguments.is_empty()
    }

    pub fn is_factual(&self) -> bool {
        self.is_atomic() && self.strength >= 1.0
    }

    /// This argument followed by every transitive sub-argument, pre-order.
    pub fn subtree(self: &Arc<Self>) -> Vec<Arc<Argument>> {
        let mut out = vec![Arc::clone(self)];
        let mut i = 0;
        while i < out.len() {
            let children = out[i].sub_arguments.clone();
            out.extend(children);
            i += 1;
        }
        out
    }

    /// Same top rule, claims equal modulo variables and pairwise
    /// semantically equal sub-arguments.
    pub fn is_semantically_equal(&self, other: &Argument) -> bool {
        if self.id == other.id {
            return true;
        }
        self.top_rule.id() == other.top_rule.id()
            && self.sub_arguments.len() == other.sub_arguments.len()
            && self.claim.is_equal_modulo_variables(&other.claim)
            && self
                .sub_arguments
                .iter()
                .zip(&other.sub_arguments)
                .all(|(a, b)| a.is_semantically_equal(b))
    }

    /// Rebut check against `victim` alone.
    pub fn is_successful_attacker_of(&self, victim: &Argument, restricted_rebutting: bool) -> bool {
        if victim.strength >= 1.0 || self.strength < victim.strength {
            return false;
        }
        if restricted_rebutting && self.top_rule.is_defeasible() && victim.top_rule.is_strict() {
            return false;
        }
        self.claim_negates(&victim.claim)
    }

    /// Undercut check against `victim` alone.
    pub fn undercuts(&self, victim: &Argument) -> bool {
        victim.top_rule.is_defeasible()
            && victim
                .applied_name
                .as_ref()
                .is_some_and(|name| self.claim_negates(name))
    }

    /// Direct attack on `victim`, undercuts first.
    pub fn attack_on(&self, victim: &Argument, restricted_rebutting: bool) -> Option<AttackKind> {
        if self.undercuts(victim) {
            Some(AttackKind::Undercut)
        } else if self.is_successful_attacker_of(victim, restricted_rebutting) {
            Some(AttackKind::Rebut)
        } else {
            None
        }
    }

    /// Successful attack on `victim` or any of its transitive
    /// sub-arguments, shallowest target first.
    pub fn deep_attack(&self, victim: &Arc<Argument>, restricted_rebutting: bool) -> Option<Attack> {
        victim.subtree().into_iter().find_map(|node| {
            self.attack_on(&node, restricted_rebutting)
                .map(|kind| Attack { kind, target: node })
        })
    }

    pub fn is_deep_successful_attacker_of(&self, victim: &Arc<Argument>, restricted_rebutting: bool) -> bool {
        self.deep_attack(victim, restricted_rebutting).is_some()
    }

    fn claim_negates(&self, target: &Term) -> bool {
        self.claim.is_literal()
            && target
                .negation()
                .is_some_and(|neg| self.claim.is_equal_modulo_variables(&neg))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.id, self.claim, self.strength)?;
        if !self.sub_arguments.is_empty() {
            write!(f, " <= ")?;
            for (i, sub) in self.sub_arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", sub.id)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Argument list
// ---------------------------------------------------------------------------

/// One argument per literal of a conjunction, with the substitution
/// accumulated across all of them.
#[derive(Debug, Clone, Default)]
pub struct ArgumentList {
    pub arguments: Vec<Arc<Argument>>,
    pub substitution: Substitution,
}

impl ArgumentList {
    pub fn empty(substitution: Substitution) -> Self {
        Self {
            arguments: Vec::new(),
            substitution,
        }
    }

    pub(crate) fn push(&mut self, argument: Arc<Argument>) {
        self.substitution = argument.substitution.clone();
        self.arguments.push(argument);
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Argument>> {
        self.arguments.iter()
    }
}
