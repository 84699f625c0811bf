//! Grounding, substitution and freezing of terms.
//!
//! - [`grounded`] resolves a term to a variable-free value or fails hard.
//! - [`substitute`] resolves what is bound and leaves unbound variables in place.
//! - [`freeze`] snapshots a term so that later rerolls cannot change it.
//! - [`evaluate`] iterates the elements of a sequence-valued term.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::scope::Scope;
use crate::term::{Term, Var};

/// Per-call mapping from source variables to their fresh replacements.
pub type FreezeMemo = HashMap<Var, Var>;

/// Fully dereference `term`. Fails with an instantiation error if any
/// reachable component is still an unbound variable.
pub fn grounded(term: &Term, scope: &Scope) -> EngineResult<Term> {
    let value = scope.walk(term);
    match value {
        Term::Var(_) => Err(EngineError::Instantiation {
            term: term.to_string(),
        }),
        Term::Seq(items) => items
            .iter()
            .map(|t| grounded(t, scope))
            .collect::<EngineResult<Vec<_>>>()
            .map(Term::seq),
        Term::Literal(lit) => {
            let args = lit
                .args()
                .iter()
                .map(|t| grounded(t, scope))
                .collect::<EngineResult<Vec<_>>>()?;
            let annots = lit
                .annots()
                .iter()
                .map(|t| grounded(t, scope))
                .collect::<EngineResult<Vec<_>>>()?;
            Ok(Term::with_parts(lit.functor(), args, annots))
        }
        other => Ok(other.clone()),
    }
}

/// Whether `term` contains no unbound variable under `scope`.
pub fn is_ground(term: &Term, scope: &Scope) -> bool {
    match scope.walk(term) {
        Term::Var(_) => false,
        Term::Seq(items) => items.iter().all(|t| is_ground(t, scope)),
        Term::Literal(lit) => {
            lit.args().iter().all(|t| is_ground(t, scope))
                && lit.annots().iter().all(|t| is_ground(t, scope))
        }
        _ => true,
    }
}

/// Whether `term` contains a variable at all, ignoring any bindings.
pub fn has_variables(term: &Term) -> bool {
    !is_ground(term, &Scope::new())
}

/// Replace every bound variable by its value, recursively. Unbound
/// variables stay as they are.
pub fn substitute(term: &Term, scope: &Scope) -> Term {
    rebuild(term, scope, &mut |var| Term::Var(var))
}

/// Snapshot `term`: bound variables are replaced by their values and each
/// unbound variable by a fresh one, reusing the same fresh variable for
/// repeated occurrences recorded in `memo`.
///
/// The result shares no variable with `scope`'s unbound ones, so undoing
/// bindings afterwards cannot change it.
pub fn freeze(term: &Term, scope: &Scope, memo: &mut FreezeMemo) -> Term {
    rebuild(term, scope, &mut |var| {
        Term::Var(*memo.entry(var).or_insert_with(Var::fresh))
    })
}

fn rebuild(term: &Term, scope: &Scope, on_unbound: &mut dyn FnMut(Var) -> Term) -> Term {
    match scope.walk(term) {
        Term::Var(var) => on_unbound(*var),
        Term::Seq(items) => Term::seq(items.iter().map(|t| rebuild(t, scope, on_unbound))),
        Term::Literal(lit) => {
            let args = lit
                .args()
                .iter()
                .map(|t| rebuild(t, scope, on_unbound))
                .collect();
            let annots = lit
                .annots()
                .iter()
                .map(|t| rebuild(t, scope, on_unbound))
                .collect();
            Term::with_parts(lit.functor(), args, annots)
        }
        other => other.clone(),
    }
}

/// Elements of a sequence-valued term, for iteration.
///
/// A string yields its characters as one-character strings. The elements
/// themselves are substituted but may still contain unbound variables.
pub fn evaluate(term: &Term, scope: &Scope) -> EngineResult<std::vec::IntoIter<Term>> {
    match scope.walk(term) {
        Term::Var(_) => Err(EngineError::Instantiation {
            term: term.to_string(),
        }),
        Term::Seq(items) => Ok(items
            .iter()
            .map(|t| substitute(t, scope))
            .collect::<Vec<_>>()
            .into_iter()),
        Term::Str(text) => Ok(text
            .chars()
            .map(|c| Term::string(c.to_string()))
            .collect::<Vec<_>>()
            .into_iter()),
        other => Err(EngineError::TypeMismatch {
            action: "evaluate".into(),
            expected: "sequence".into(),
            found: other.kind().into(),
        }),
    }
}
