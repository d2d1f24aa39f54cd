//! Contraposition of strict rules.
//!
//! `c <- a1, ..., an` yields, for every literal position `i`,
//! `~ai <- ~c, a1, ..., a(i-1), a(i+1), ..., an`. Positions holding
//! built-ins, numbers or variables have no negation and are skipped.

use crate::rule::Rule;

/// The contrapositives of a strict, non-fact rule. Empty for anything else.
pub(crate) fn transpositions(rule: &Rule) -> Vec<Rule> {
    if !rule.is_strict() || rule.is_fact() {
        return Vec::new();
    }
    let Some(negated_consequent) = rule.consequent().negation() else {
        return Vec::new();
    };

    let antecedent = rule.antecedent();
    let mut out = Vec::with_capacity(antecedent.len());
    for (i, literal) in antecedent.iter().enumerate() {
        let Some(head) = literal.negation() else {
            continue;
        };
        let mut body = Vec::with_capacity(antecedent.len());
        body.push(negated_consequent.clone());
        body.extend(
            antecedent
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, other)| other.clone()),
        );
        match Rule::strict(head, body) {
            Ok(transposed) => out.push(transposed),
            Err(e) => tracing::warn!(rule = %rule, error = %e, "skipping malformed transposition"),
        }
    }
    out
}
