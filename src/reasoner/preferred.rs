use std::sync::Arc;

use crate::argument::{Argument, ArgumentStatus};

use super::{AttackerEntry, DialecticalReasoner, Dispute, ReasoningSession, Semantics};

/// Credulous preferred semantics.
///
/// An attacker needs no answer if it is already in OPP or if some PRO
/// argument already attacks it. Otherwise a defender is chosen that is
/// conflict-free with PRO and not in OPP; when the remaining attackers
/// cannot be answered with that choice, the next defender is tried.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferredCredulous;

/// Outcome of answering one attacker.
#[derive(Debug, Clone)]
pub enum Defense {
    /// This attacker and every later one were answered.
    Success(Dispute),
    /// The attacker needs no new defender.
    Defended,
    /// No admissible defender exists.
    Exhausted,
}

impl DialecticalReasoner for PreferredCredulous {
    fn semantics(&self) -> Semantics {
        Semantics::PreferredCredulous
    }

    fn defend(&self, session: &mut ReasoningSession<'_>, dispute: Dispute) -> Option<Dispute> {
        let argument = Arc::clone(dispute.pro.last()?);
        let attackers = session.attackers_of(&argument);
        let outcome = self.defend_all(session, dispute, &attackers);
        let status = if outcome.is_some() {
            ArgumentStatus::Undefeated
        } else {
            ArgumentStatus::Defeated
        };
        session.set_status(&argument, status);
        outcome
    }
}

impl PreferredCredulous {
    fn defend_all(
        &self,
        session: &mut ReasoningSession<'_>,
        dispute: Dispute,
        attackers: &[AttackerEntry],
    ) -> Option<Dispute> {
        let mut current = dispute;
        for (i, entry) in attackers.iter().enumerate() {
            match self.answer(session, &current, entry, &attackers[i + 1..]) {
                Defense::Success(result) => return Some(result),
                Defense::Defended => {}
                Defense::Exhausted => return None,
            }
            // A free answer still records the attacker so later choices avoid it.
            if !current.opp_contains(&entry.attacker) {
                current.opp.push(Arc::clone(&entry.attacker));
            }
        }
        Some(current)
    }

    fn answer(
        &self,
        session: &mut ReasoningSession<'_>,
        current: &Dispute,
        entry: &AttackerEntry,
        rest: &[AttackerEntry],
    ) -> Defense {
        let attacker = &entry.attacker;
        let restricted = session.restricted_rebutting();

        if current.opp_contains(attacker) {
            return Defense::Defended;
        }
        if current.pro_contains(attacker) {
            return Defense::Exhausted;
        }
        if let Some(pro) = current
            .pro
            .iter()
            .find(|p| p.is_deep_successful_attacker_of(attacker, restricted))
        {
            session.add_defender(attacker, pro);
            session.set_status(attacker, ArgumentStatus::Defeated);
            return Defense::Defended;
        }

        for defence in session.attackers_of(attacker) {
            let defender = &defence.attacker;
            if current.opp_contains(defender) || conflicts_with(defender, &current.pro, restricted) {
                continue;
            }
            let mut next = current.clone();
            next.opp.push(Arc::clone(attacker));
            next.pro.push(Arc::clone(defender));

            let Some(defended) = self.defend(session, next) else {
                continue;
            };
            if let Some(result) = self.defend_all(session, defended, rest) {
                session.add_defender(attacker, defender);
                session.set_status(attacker, ArgumentStatus::Defeated);
                return Defense::Success(result);
            }
            tracing::trace!(attacker = %attacker, defender = %defender, "preferred: backtracking");
        }
        Defense::Exhausted
    }
}

/// Whether `candidate` and any PRO argument attack each other.
fn conflicts_with(candidate: &Arc<Argument>, pro: &[Arc<Argument>], restricted: bool) -> bool {
    pro.iter().any(|p| {
        candidate.is_deep_successful_attacker_of(p, restricted) || p.is_deep_successful_attacker_of(candidate, restricted)
    })
}
