//! Variable binding store for one reasoning context.
//!
//! A [`Scope`] maps variables to the terms they are bound to. Bound values
//! may themselves contain variables, so reading a binding means *walking*
//! variable-to-variable chains to their end.

use std::collections::HashMap;

use crate::term::{Term, Var};

/// Variable → term bindings owned by a single intention.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<Var, Term>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct binding of `var`, without following chains.
    pub fn get(&self, var: Var) -> Option<&Term> {
        self.bindings.get(&var)
    }

    pub fn is_bound(&self, var: Var) -> bool {
        self.bindings.contains_key(&var)
    }

    /// Follow variable bindings until reaching an unbound variable or a
    /// non-variable term.
    pub fn walk<'a>(&'a self, mut term: &'a Term) -> &'a Term {
        while let Term::Var(var) = term {
            match self.bindings.get(var) {
                Some(next) => term = next,
                None => break,
            }
        }
        term
    }

    pub(crate) fn bind(&mut self, var: Var, value: Term) {
        self.bindings.insert(var, value);
    }

    pub(crate) fn unbind(&mut self, var: Var) {
        self.bindings.remove(&var);
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
