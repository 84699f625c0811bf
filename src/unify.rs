//! Structural unification over a [`Scope`] with trail recording.
//!
//! ## Binding direction
//!
//! After both operands are walked, if the right operand is an unbound
//! variable it is bound to the left operand; otherwise, if the left operand
//! is an unbound variable, it is bound to the right operand. Two unbound
//! variables therefore always bind right → left.
//!
//! ## Partial failure
//!
//! Compound terms unify argument by argument, left to right, stopping at the
//! first mismatch. Bindings made before the mismatch stay in the scope and on
//! the trail: callers guard each attempt with a choicepoint and reroll it.
//!
//! ## Occurs check
//!
//! A variable is never bound to a term that contains it, so scopes stay
//! acyclic. Such an attempt is an ordinary unification failure.

use crate::scope::Scope;
use crate::term::{Term, Var};
use crate::trail::Trail;

/// Unify `a` with `b`, binding variables in `scope` and recording each
/// binding on `trail`.
pub fn unify(a: &Term, b: &Term, scope: &mut Scope, trail: &mut Trail) -> bool {
    let left = scope.walk(a).clone();
    let right = scope.walk(b).clone();

    match (&left, &right) {
        (Term::Var(x), Term::Var(y)) if x == y => true,
        (_, Term::Var(y)) => bind(*y, left.clone(), scope, trail),
        (Term::Var(x), _) => bind(*x, right.clone(), scope, trail),
        (Term::Atom(x), Term::Atom(y)) => x == y,
        (Term::Number(x), Term::Number(y)) => x == y,
        (Term::Str(x), Term::Str(y)) => x == y,
        (Term::Seq(xs), Term::Seq(ys)) => unify_all(xs, ys, scope, trail),
        (Term::Literal(x), Term::Literal(y)) => {
            x.functor() == y.functor() && unify_all(x.args(), y.args(), scope, trail)
        }
        // `sunny[self]` is still `sunny` once annotations are set aside.
        (Term::Atom(name), Term::Literal(lit)) | (Term::Literal(lit), Term::Atom(name)) => {
            lit.arity() == 0 && lit.functor() == name.as_ref()
        }
        _ => false,
    }
}

fn unify_all(xs: &[Term], ys: &[Term], scope: &mut Scope, trail: &mut Trail) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| unify(x, y, scope, trail))
}

fn bind(var: Var, value: Term, scope: &mut Scope, trail: &mut Trail) -> bool {
    if occurs(var, &value, scope) {
        return false;
    }
    scope.bind(var, value);
    trail.record_binding(var);
    true
}

/// Whether `var` appears anywhere in `term` under the bindings of `scope`.
pub fn occurs(var: Var, term: &Term, scope: &Scope) -> bool {
    match scope.walk(term) {
        Term::Var(v) => *v == var,
        Term::Seq(items) => items.iter().any(|t| occurs(var, t, scope)),
        Term::Literal(lit) => lit
            .args()
            .iter()
            .chain(lit.annots())
            .any(|t| occurs(var, t, scope)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::{push_choicepoint, reroll};

    fn fresh() -> (Scope, Trail) {
        (Scope::new(), Trail::new())
    }

    #[test]
    fn ground_terms_unify_iff_equal() {
        let terms = [
            Term::atom("a"),
            Term::atom("b"),
            Term::int(1),
            Term::float(1.0),
            Term::string("a"),
            Term::seq([Term::int(1), Term::atom("a")]),
            Term::literal("f", [Term::int(1)]),
            Term::literal("f", [Term::int(2)]),
            Term::literal("g", [Term::int(1)]),
        ];
        for x in &terms {
            for y in &terms {
                let (mut scope, mut trail) = fresh();
                assert_eq!(unify(x, y, &mut scope, &mut trail), x == y, "{x} vs {y}");
                assert!(scope.is_empty());
                assert!(trail.is_empty());
            }
        }
    }

    #[test]
    fn atom_and_string_do_not_unify() {
        let (mut scope, mut trail) = fresh();
        assert!(!unify(&Term::atom("a"), &Term::string("a"), &mut scope, &mut trail));
    }

    #[test]
    fn variable_binds_to_value() {
        let x = Var::fresh();
        let (mut scope, mut trail) = fresh();
        assert!(unify(&Term::Var(x), &Term::int(3), &mut scope, &mut trail));
        assert_eq!(scope.get(x), Some(&Term::int(3)));
        assert_eq!(trail.len(), 1);

        // Already bound: compares through the binding, no new entry.
        assert!(unify(&Term::int(3), &Term::Var(x), &mut scope, &mut trail));
        assert!(!unify(&Term::int(4), &Term::Var(x), &mut scope, &mut trail));
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn two_unbound_variables_bind_right_to_left() {
        let (x, y) = (Var::fresh(), Var::fresh());
        let (mut scope, mut trail) = fresh();
        assert!(unify(&Term::Var(x), &Term::Var(y), &mut scope, &mut trail));
        assert_eq!(scope.get(y), Some(&Term::Var(x)));
        assert!(!scope.is_bound(x));
    }

    #[test]
    fn same_variable_unifies_without_binding() {
        let x = Var::fresh();
        let (mut scope, mut trail) = fresh();
        assert!(unify(&Term::Var(x), &Term::Var(x), &mut scope, &mut trail));
        assert!(trail.is_empty());
    }

    #[test]
    fn structures_unify_positionally() {
        let (x, y) = (Var::fresh(), Var::fresh());
        let (mut scope, mut trail) = fresh();
        let a = Term::literal("p", [Term::Var(x), Term::atom("b")]);
        let b = Term::literal("p", [Term::atom("a"), Term::Var(y)]);
        assert!(unify(&a, &b, &mut scope, &mut trail));
        assert_eq!(scope.walk(&Term::Var(x)), &Term::atom("a"));
        assert_eq!(scope.walk(&Term::Var(y)), &Term::atom("b"));
    }

    #[test]
    fn arity_and_length_mismatch_fail() {
        let (mut scope, mut trail) = fresh();
        let f1 = Term::literal("f", [Term::int(1)]);
        let f2 = Term::literal("f", [Term::int(1), Term::int(2)]);
        assert!(!unify(&f1, &f2, &mut scope, &mut trail));
        let s1 = Term::seq([Term::var()]);
        let s2 = Term::seq([]);
        assert!(!unify(&s1, &s2, &mut scope, &mut trail));
        assert!(!unify(&s1, &f1, &mut scope, &mut trail));
    }

    #[test]
    fn annotations_are_ignored() {
        let (mut scope, mut trail) = fresh();
        let a = Term::annotated("f", [Term::int(1)], [Term::atom("source")]);
        let b = Term::literal("f", [Term::int(1)]);
        assert!(unify(&a, &b, &mut scope, &mut trail));

        let bare = Term::atom("sunny");
        let annotated = Term::annotated("sunny", [], [Term::atom("self")]);
        assert!(unify(&bare, &annotated, &mut scope, &mut trail));
        assert!(unify(&annotated, &bare, &mut scope, &mut trail));
        assert!(!unify(&Term::atom("rainy"), &annotated, &mut scope, &mut trail));
        assert!(scope.is_empty());
    }

    #[test]
    fn partial_failure_leaves_bindings_for_reroll() {
        let x = Var::fresh();
        let (mut scope, mut trail) = fresh();
        let cp = push_choicepoint(&mut trail);
        let a = Term::literal("f", [Term::Var(x), Term::int(1)]);
        let b = Term::literal("f", [Term::int(9), Term::int(2)]);

        assert!(!unify(&a, &b, &mut scope, &mut trail));
        assert!(scope.is_bound(x));

        reroll(&mut scope, &mut trail, cp).unwrap();
        assert!(!scope.is_bound(x));
        assert!(trail.is_empty());
    }

    #[test]
    fn occurs_check_rejects_cycles() {
        let x = Var::fresh();
        let (mut scope, mut trail) = fresh();
        let fx = Term::literal("f", [Term::Var(x)]);
        assert!(!unify(&Term::Var(x), &fx, &mut scope, &mut trail));
        assert!(!unify(&fx, &Term::Var(x), &mut scope, &mut trail));
        assert!(scope.is_empty());
    }

    #[test]
    fn occurs_check_sees_through_bindings() {
        let (x, y) = (Var::fresh(), Var::fresh());
        let (mut scope, mut trail) = fresh();
        assert!(unify(
            &Term::Var(y),
            &Term::seq([Term::Var(x)]),
            &mut scope,
            &mut trail
        ));
        assert!(!unify(&Term::Var(x), &Term::Var(y), &mut scope, &mut trail));
    }
}
