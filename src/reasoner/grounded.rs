use std::sync::Arc;

use crate::argument::ArgumentStatus;

use super::{DialecticalReasoner, Dispute, ReasoningSession, Semantics};

/// Grounded semantics.
///
/// Every attacker of the argument under test must be answered by a defender
/// that is not already in PRO and that the attacker does not attack back.
/// One unanswerable attacker defeats the argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grounded;

impl DialecticalReasoner for Grounded {
    fn semantics(&self) -> Semantics {
        Semantics::Grounded
    }

    fn defend(&self, session: &mut ReasoningSession<'_>, dispute: Dispute) -> Option<Dispute> {
        let argument = Arc::clone(dispute.pro.last()?);
        let restricted = session.restricted_rebutting();
        let mut current = dispute;

        for entry in session.attackers_of(&argument) {
            let attacker = &entry.attacker;
            let mut answered = None;

            for defence in session.attackers_of(attacker) {
                let defender = &defence.attacker;
                if current.pro_contains(defender)
                    || attacker.is_deep_successful_attacker_of(defender, restricted)
                {
                    continue;
                }
                let mut next = current.clone();
                next.opp.push(Arc::clone(attacker));
                next.pro.push(Arc::clone(defender));
                if let Some(result) = self.defend(session, next) {
                    session.add_defender(attacker, defender);
                    answered = Some(result);
                    break;
                }
            }

            match answered {
                Some(result) => {
                    session.set_status(attacker, ArgumentStatus::Defeated);
                    current = result;
                }
                None => {
                    tracing::debug!(argument = %argument, attacker = %attacker, "grounded: no defender");
                    session.set_status(&argument, ArgumentStatus::Defeated);
                    return None;
                }
            }
        }

        session.set_status(&argument, ArgumentStatus::Undefeated);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{ArgumentBuilder, ValuationKind};
    use crate::kb::KnowledgeBase;
    use crate::rule::Rule;
    use crate::term::Term;

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    fn verdict(kb: &KnowledgeBase, goal: &str) -> bool {
        let builder = ArgumentBuilder::new(kb, ValuationKind::WeakestLink);
        let mut session = ReasoningSession::new(&builder, false);
        let seed = builder.arguments(&c(goal), 0.0).next().unwrap();
        session.evaluate(&Grounded, &seed).is_some()
    }

    #[test]
    fn unattacked_argument_is_undefeated() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::new(c("a"), vec![], 0.5).unwrap()).unwrap();
        assert!(verdict(&kb, "a"));
    }

    #[test]
    fn stronger_attacker_defeats() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::new(c("a"), vec![], 0.5).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("~a"), vec![], 0.7).unwrap()).unwrap();
        assert!(!verdict(&kb, "a"));
        assert!(verdict(&kb, "~a"));
    }

    #[test]
    fn mutual_attack_defeats_both() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::new(c("a"), vec![], 0.5).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("~a"), vec![], 0.5).unwrap()).unwrap();
        assert!(!verdict(&kb, "a"));
        assert!(!verdict(&kb, "~a"));
    }

    #[test]
    fn defender_reinstates_argument() {
        // ~a defeats a, but its premise p loses to ~p
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::new(c("a"), vec![], 0.5).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("~a"), vec![c("p")], 0.6).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("p"), vec![], 0.6).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("~p"), vec![], 0.8).unwrap()).unwrap();
        assert!(verdict(&kb, "a"));
    }

    #[test]
    fn defeated_attacker_status_is_recorded() {
        let mut kb = KnowledgeBase::new();
        kb.add_rule(Rule::new(c("a"), vec![], 0.5).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("~a"), vec![c("p")], 0.6).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("p"), vec![], 0.6).unwrap()).unwrap();
        kb.add_rule(Rule::new(c("~p"), vec![], 0.8).unwrap()).unwrap();

        let builder = ArgumentBuilder::new(&kb, ValuationKind::WeakestLink);
        let mut session = ReasoningSession::new(&builder, false);
        let seed = builder.arguments(&c("a"), 0.0).next().unwrap();
        let dispute = session.evaluate(&Grounded, &seed).unwrap();
        assert_eq!(dispute.pro.len(), 2);
        assert_eq!(dispute.opp.len(), 1);

        let attacker = &dispute.opp[0];
        assert_eq!(session.status(attacker), ArgumentStatus::Defeated);
        assert_eq!(session.proof().defenders(attacker).len(), 1);
        assert_eq!(session.status(&seed), ArgumentStatus::Undefeated);
    }
}
