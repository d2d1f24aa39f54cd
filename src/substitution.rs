//! Variable binding ledger with composition and consistency tracking.
//!
//! A [`Substitution`] maps each bound [`Variable`] to one [`Term`]. A second,
//! conflicting binding does not overwrite the first: the variable is *banned*
//! instead, its binding dropped, and the substitution becomes permanently
//! inconsistent. Unification failures on non-variable terms (a functor or
//! arity mismatch) mark the substitution as clashed, with the same effect.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::term::{Term, Variable};

/// Mapping from variables to terms plus a banned-variable set.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    bindings: HashMap<Variable, Term>,
    banned: HashSet<Variable>,
    clashed: bool,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `var` to `term`.
    ///
    /// Binding a banned variable is a no-op. Rebinding a bound variable to a
    /// different term bans it and removes the existing binding.
    pub fn add(&mut self, var: &Variable, term: Term) {
        if self.banned.contains(var) {
            return;
        }
        if let Term::Variable(v) = &term {
            if v == var {
                return;
            }
        }
        match self.bindings.get(var) {
            Some(existing) if *existing == term => {}
            Some(_) => {
                tracing::trace!(var = %var, "conflicting binding, variable banned");
                self.bindings.remove(var);
                self.banned.insert(var.clone());
            }
            None => {
                self.bindings.insert(var.clone(), term);
            }
        }
    }

    /// Merge every binding and ban of `other` into `self`.
    pub fn merge(&mut self, other: &Substitution) {
        for var in &other.banned {
            self.ban(var);
        }
        for (var, term) in &other.bindings {
            self.add(var, term.clone());
        }
        self.clashed |= other.clashed;
    }

    /// `self ∘ other`: apply `other` to every value of `self`, then merge
    /// `other`'s own bindings in.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut out = Substitution {
            bindings: HashMap::with_capacity(self.bindings.len() + other.bindings.len()),
            banned: self.banned.clone(),
            clashed: self.clashed,
        };
        for (var, term) in &self.bindings {
            out.bindings.insert(var.clone(), term.apply(other));
        }
        out.merge(other);
        out
    }

    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.bindings.get(var)
    }

    pub fn is_bound(&self, var: &Variable) -> bool {
        self.bindings.contains_key(var)
    }

    pub fn is_banned(&self, var: &Variable) -> bool {
        self.banned.contains(var)
    }

    /// No banned variable and no structural clash.
    pub fn is_consistent(&self) -> bool {
        self.banned.is_empty() && !self.clashed
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over `(variable, term)` bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter()
    }

    /// Follow variable-to-variable bindings at the top level only.
    pub(crate) fn walk(&self, term: &Term) -> Term {
        let mut current = term;
        let mut steps = 0usize;
        while let Term::Variable(v) = current {
            match self.bindings.get(v) {
                Some(next) if steps <= self.bindings.len() => {
                    current = next;
                    steps += 1;
                }
                _ => break,
            }
        }
        current.clone()
    }

    pub(crate) fn ban(&mut self, var: &Variable) {
        self.bindings.remove(var);
        self.banned.insert(var.clone());
    }

    pub(crate) fn mark_clash(&mut self) {
        self.clashed = true;
    }
}

impl PartialEq for Substitution {
    fn eq(&self, other: &Self) -> bool {
        self.bindings == other.bindings
            && self.banned == other.banned
            && self.clashed == other.clashed
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.bindings.iter().collect();
        entries.sort_by_key(|(v, _)| v.id());
        write!(f, "{{")?;
        for (i, (var, term)) in entries.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{var}/{term}")?;
        }
        if !self.is_consistent() {
            write!(f, " | inconsistent")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::VarScope;

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    #[test]
    fn add_binds_unbound_variable() {
        let x = VarScope::new().var("X");
        let mut subs = Substitution::new();
        subs.add(&x, c("a"));
        assert_eq!(subs.get(&x), Some(&c("a")));
        assert!(subs.is_consistent());
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn same_binding_twice_is_harmless() {
        let x = VarScope::new().var("X");
        let mut subs = Substitution::new();
        subs.add(&x, c("a"));
        subs.add(&x, c("a"));
        assert!(subs.is_consistent());
    }

    #[test]
    fn conflicting_binding_bans_variable() {
        let x = VarScope::new().var("X");
        let mut subs = Substitution::new();
        subs.add(&x, c("a"));
        subs.add(&x, c("b"));
        assert!(subs.get(&x).is_none());
        assert!(subs.is_banned(&x));
        assert!(!subs.is_consistent());

        // banned variables never bind again
        subs.add(&x, c("a"));
        assert!(subs.get(&x).is_none());
        assert!(!subs.is_consistent());
    }

    #[test]
    fn self_binding_is_ignored() {
        let x = VarScope::new().var("X");
        let mut subs = Substitution::new();
        subs.add(&x, Term::var(x.clone()));
        assert!(subs.is_empty());
    }

    #[test]
    fn merge_carries_bans() {
        let mut scope = VarScope::new();
        let (x, y) = (scope.var("X"), scope.var("Y"));
        let mut a = Substitution::new();
        a.add(&x, c("a"));
        let mut b = Substitution::new();
        b.add(&y, c("b"));
        b.add(&y, c("c"));
        a.merge(&b);
        assert_eq!(a.get(&x), Some(&c("a")));
        assert!(a.is_banned(&y));
        assert!(!a.is_consistent());
    }

    #[test]
    fn compose_applies_right_to_left_values() {
        let mut scope = VarScope::new();
        let (x, y) = (scope.var("X"), scope.var("Y"));
        let mut a = Substitution::new();
        a.add(&x, Term::compound("f", vec![Term::var(y.clone())]).unwrap());
        let mut b = Substitution::new();
        b.add(&y, c("tweety"));

        let ab = a.compose(&b);
        assert_eq!(
            ab.get(&x),
            Some(&Term::compound("f", vec![c("tweety")]).unwrap())
        );
        assert_eq!(ab.get(&y), Some(&c("tweety")));
    }

    #[test]
    fn compose_conflict_is_inconsistent() {
        let x = VarScope::new().var("X");
        let mut a = Substitution::new();
        a.add(&x, c("a"));
        let mut b = Substitution::new();
        b.add(&x, c("b"));
        assert!(!a.compose(&b).is_consistent());
    }

    #[test]
    fn walk_follows_variable_chain() {
        let mut scope = VarScope::new();
        let (x, y) = (scope.var("X"), scope.var("Y"));
        let mut subs = Substitution::new();
        subs.add(&x, Term::var(y.clone()));
        subs.add(&y, c("a"));
        assert_eq!(subs.walk(&Term::var(x)), c("a"));
    }

    #[test]
    fn display_is_sorted_by_identity() {
        let mut scope = VarScope::new();
        let (x, y) = (scope.var("X"), scope.var("Y"));
        let mut subs = Substitution::new();
        subs.add(&y, c("b"));
        subs.add(&x, c("a"));
        assert_eq!(subs.to_string(), "{X/a, Y/b}");
    }
}
