//! Trail: the undo log that makes backtracking possible.
//!
//! Every binding made by unification is recorded on the trail. A choicepoint
//! is a marker pushed before trying an alternative; rerolling to it pops and
//! undoes every binding recorded since, then removes the marker itself.
//! Rerolling is the only way bindings are ever reverted.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{EngineError, EngineResult};
use crate::scope::Scope;
use crate::term::Var;

static NEXT_CHOICEPOINT: AtomicU64 = AtomicU64::new(1);

/// Opaque choicepoint marker. No two markers are ever equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Choicepoint(u64);

impl Choicepoint {
    fn fresh() -> Self {
        Choicepoint(NEXT_CHOICEPOINT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// One entry of the trail.
#[derive(Debug, Clone, PartialEq)]
pub enum TrailEntry {
    /// The variable that was just bound.
    Binding(Var),
    Choicepoint(Choicepoint),
}

/// Append-only log of bindings segmented by choicepoints.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    entries: Vec<TrailEntry>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_binding(&mut self, var: Var) {
        self.entries.push(TrailEntry::Binding(var));
    }

    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, choicepoint: Choicepoint) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|e| *e == TrailEntry::Choicepoint(choicepoint))
    }
}

/// Push a fresh choicepoint marker and return it.
pub fn push_choicepoint(trail: &mut Trail) -> Choicepoint {
    let choicepoint = Choicepoint::fresh();
    trail.entries.push(TrailEntry::Choicepoint(choicepoint));
    choicepoint
}

/// Undo every binding above `choicepoint` and remove the marker.
///
/// Rerolling to a marker that is no longer on the trail is a bug in the
/// caller; the trail is left untouched and an error is returned.
pub fn reroll(scope: &mut Scope, trail: &mut Trail, choicepoint: Choicepoint) -> EngineResult<()> {
    let Some(index) = trail.position(choicepoint) else {
        return Err(EngineError::ChoicepointNotFound {
            choicepoint: choicepoint.id(),
        });
    };
    for entry in trail.entries.drain(index..).rev() {
        if let TrailEntry::Binding(var) = entry {
            scope.unbind(var);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    fn bind(scope: &mut Scope, trail: &mut Trail, var: Var, value: Term) {
        scope.bind(var, value);
        trail.record_binding(var);
    }

    #[test]
    fn choicepoints_are_unique() {
        let mut trail = Trail::new();
        let a = push_choicepoint(&mut trail);
        let b = push_choicepoint(&mut trail);
        assert_ne!(a, b);
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn reroll_undoes_bindings_above_marker() {
        let (x, y, z) = (Var::fresh(), Var::fresh(), Var::fresh());
        let mut scope = Scope::new();
        let mut trail = Trail::new();

        bind(&mut scope, &mut trail, x, Term::int(1));
        let cp = push_choicepoint(&mut trail);
        bind(&mut scope, &mut trail, y, Term::int(2));
        bind(&mut scope, &mut trail, z, Term::int(3));

        reroll(&mut scope, &mut trail, cp).unwrap();

        assert_eq!(scope.get(x), Some(&Term::int(1)));
        assert!(!scope.is_bound(y));
        assert!(!scope.is_bound(z));
        assert_eq!(trail.entries(), &[TrailEntry::Binding(x)]);
    }

    #[test]
    fn reroll_outer_marker_removes_inner_ones() {
        let (x, y) = (Var::fresh(), Var::fresh());
        let mut scope = Scope::new();
        let mut trail = Trail::new();

        let outer = push_choicepoint(&mut trail);
        bind(&mut scope, &mut trail, x, Term::atom("a"));
        let inner = push_choicepoint(&mut trail);
        bind(&mut scope, &mut trail, y, Term::atom("b"));

        reroll(&mut scope, &mut trail, outer).unwrap();
        assert!(scope.is_empty());
        assert!(trail.is_empty());

        // The inner marker went with it.
        let err = reroll(&mut scope, &mut trail, inner).unwrap_err();
        assert!(matches!(err, EngineError::ChoicepointNotFound { .. }));
    }

    #[test]
    fn reroll_unknown_marker_leaves_trail_intact() {
        let x = Var::fresh();
        let mut scope = Scope::new();
        let mut trail = Trail::new();
        let cp = push_choicepoint(&mut trail);
        reroll(&mut scope, &mut trail, cp).unwrap();

        bind(&mut scope, &mut trail, x, Term::int(1));
        assert!(reroll(&mut scope, &mut trail, cp).is_err());
        assert_eq!(trail.len(), 1);
        assert!(scope.is_bound(x));
    }
}
