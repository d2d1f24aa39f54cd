//! Unification of terms against a [`Substitution`].
//!
//! Both sides are dereferenced through the current bindings before they are
//! compared, so earlier bindings are extended and never overwritten. Compound
//! arguments are unified left to right, each step feeding the next.

use crate::substitution::Substitution;

use super::Term;

impl Term {
    /// Whether `self` and `other` unify from an empty substitution.
    pub fn is_unifiable(&self, other: &Term) -> bool {
        let mut subs = Substitution::new();
        unify_into(self, other, &mut subs)
    }

    /// Unify `self` with `other`, extending a copy of `subs`.
    ///
    /// The result is always returned; check
    /// [`Substitution::is_consistent`] to learn whether unification
    /// succeeded.
    pub fn unify(&self, other: &Term, subs: &Substitution) -> Substitution {
        let mut out = subs.clone();
        unify_into(self, other, &mut out);
        out
    }
}

/// Unify in place. Returns `subs.is_consistent()` afterwards.
pub(crate) fn unify_into(a: &Term, b: &Term, subs: &mut Substitution) -> bool {
    if !subs.is_consistent() {
        return false;
    }
    let a = subs.walk(a);
    let b = subs.walk(b);

    match (&a, &b) {
        (Term::Variable(x), Term::Variable(y)) if x == y => true,
        (Term::Variable(x), other) | (other, Term::Variable(x)) => {
            if other.apply(subs).contains_variable(x) {
                tracing::trace!(var = %x, term = %other, "occurs check failed");
                subs.ban(x);
                return false;
            }
            subs.add(x, other.clone());
            subs.is_consistent()
        }
        (Term::Constant(f), Term::Constant(g)) => clash_unless(f == g, subs),
        (Term::Number(m), Term::Number(n)) => clash_unless(m == n, subs),
        (Term::Compound(f, xs), Term::Compound(g, ys)) => {
            if f != g || xs.len() != ys.len() {
                return clash_unless(false, subs);
            }
            xs.iter().zip(ys.iter()).all(|(x, y)| unify_into(x, y, subs))
        }
        (Term::Builtin(p, xs), Term::Builtin(q, ys)) => {
            if p != q || xs.len() != ys.len() {
                return clash_unless(false, subs);
            }
            xs.iter().zip(ys.iter()).all(|(x, y)| unify_into(x, y, subs))
        }
        _ => clash_unless(false, subs),
    }
}

fn clash_unless(ok: bool, subs: &mut Substitution) -> bool {
    if !ok {
        subs.mark_clash();
    }
    ok
}

#[cfg(test)]
mod tests {
    use crate::substitution::Substitution;
    use crate::term::{Term, VarScope};

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    fn t(functor: &str, args: Vec<Term>) -> Term {
        Term::compound(functor, args).unwrap()
    }

    #[test]
    fn variable_unifies_with_anything() {
        let x = VarScope::new().var("X");
        let subs = Term::var(x.clone()).unify(&c("tweety"), &Substitution::new());
        assert!(subs.is_consistent());
        assert_eq!(subs.get(&x), Some(&c("tweety")));
    }

    #[test]
    fn constants_unify_by_functor() {
        assert!(c("a").is_unifiable(&c("a")));
        assert!(!c("a").is_unifiable(&c("b")));
        assert!(!c("a").is_unifiable(&Term::int(1)));
    }

    #[test]
    fn compound_requires_same_functor_and_arity() {
        let x = VarScope::new().var("X");
        assert!(t("f", vec![c("a")]).is_unifiable(&t("f", vec![Term::var(x.clone())])));
        assert!(!t("f", vec![c("a")]).is_unifiable(&t("g", vec![c("a")])));
        assert!(!t("f", vec![c("a")]).is_unifiable(&t("f", vec![c("a"), c("b")])));
    }

    #[test]
    fn shared_variable_must_bind_consistently() {
        let mut scope = VarScope::new();
        let x = scope.var("X");
        let fxx = t("f", vec![Term::var(x.clone()), Term::var(x)]);
        assert!(fxx.is_unifiable(&t("f", vec![c("a"), c("a")])));
        assert!(!fxx.is_unifiable(&t("f", vec![c("a"), c("b")])));
    }

    #[test]
    fn existing_bindings_are_respected() {
        let x = VarScope::new().var("X");
        let mut subs = Substitution::new();
        subs.add(&x, c("a"));
        assert!(Term::var(x.clone()).unify(&c("a"), &subs).is_consistent());
        let failed = Term::var(x.clone()).unify(&c("b"), &subs);
        assert!(!failed.is_consistent());
        // the input substitution is untouched
        assert_eq!(subs.get(&x), Some(&c("a")));
    }

    #[test]
    fn occurs_check_rejects_cyclic_binding() {
        let x = VarScope::new().var("X");
        let fx = t("f", vec![Term::var(x.clone())]);
        assert!(!Term::var(x).is_unifiable(&fx));
    }

    #[test]
    fn variable_chains_resolve() {
        let mut scope = VarScope::new();
        let (x, y) = (scope.var("X"), scope.var("Y"));
        let lhs = t("p", vec![Term::var(x.clone()), Term::var(x.clone())]);
        let rhs = t("p", vec![Term::var(y.clone()), c("a")]);
        let subs = lhs.unify(&rhs, &Substitution::new());
        assert!(subs.is_consistent());
        assert_eq!(lhs.apply(&subs), t("p", vec![c("a"), c("a")]));
        assert_eq!(Term::var(y).apply(&subs), c("a"));
    }

    #[test]
    fn grounded_self_unification_is_identity() {
        let term = t("f", vec![c("a"), Term::int(3), t("g", vec![c("b")])]);
        let subs = term.unify(&term, &Substitution::new());
        assert!(subs.is_consistent());
        assert_eq!(term.apply(&subs), term);
    }

    #[test]
    fn numbers_unify_structurally() {
        assert!(Term::int(7).is_unifiable(&Term::int(7)));
        assert!(!Term::int(7).is_unifiable(&Term::float(7.0)));
    }
}
