//! Intentions: one in-progress reasoning context each.
//!
//! An [`Intention`] pairs a [`Scope`] with the [`Trail`] that undoes it, plus
//! an optional deadline before which the scheduler will not resume it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::EngineResult;
use crate::ground;
use crate::scope::Scope;
use crate::term::Term;
use crate::trail::{self, Choicepoint, Trail};
use crate::unify;

static NEXT_INTENTION: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of an intention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntentionId(u64);

impl IntentionId {
    fn fresh() -> Self {
        IntentionId(NEXT_INTENTION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for IntentionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "int:{}", self.0)
    }
}

/// Execution state of one reasoning context.
#[derive(Debug)]
pub struct Intention {
    id: IntentionId,
    pub scope: Scope,
    pub trail: Trail,
    /// Not runnable before this instant.
    pub wait_until: Option<Instant>,
}

impl Intention {
    pub fn new() -> Self {
        Self {
            id: IntentionId::fresh(),
            scope: Scope::new(),
            trail: Trail::new(),
            wait_until: None,
        }
    }

    pub fn id(&self) -> IntentionId {
        self.id
    }

    /// Unify two terms in this intention's scope.
    pub fn unify(&mut self, a: &Term, b: &Term) -> bool {
        unify::unify(a, b, &mut self.scope, &mut self.trail)
    }

    pub fn push_choicepoint(&mut self) -> Choicepoint {
        trail::push_choicepoint(&mut self.trail)
    }

    pub fn reroll(&mut self, choicepoint: Choicepoint) -> EngineResult<()> {
        trail::reroll(&mut self.scope, &mut self.trail, choicepoint)
    }

    pub fn grounded(&self, term: &Term) -> EngineResult<Term> {
        ground::grounded(term, &self.scope)
    }

    /// Current value of `term`, with unbound variables left in place.
    pub fn resolve(&self, term: &Term) -> Term {
        ground::substitute(term, &self.scope)
    }

    /// Whether a deadline is set and has not yet passed at `now`.
    pub fn is_waiting(&self, now: Instant) -> bool {
        self.wait_until.is_some_and(|deadline| deadline > now)
    }

    /// Clear the deadline if it has passed. Returns whether the intention is
    /// runnable at `now`.
    pub fn wake(&mut self, now: Instant) -> bool {
        match self.wait_until {
            Some(deadline) if deadline > now => false,
            Some(_) => {
                self.wait_until = None;
                true
            }
            None => true,
        }
    }
}

impl Default for Intention {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::term::Var;

    #[test]
    fn ids_are_unique() {
        assert_ne!(Intention::new().id(), Intention::new().id());
    }

    #[test]
    fn choicepoint_round_trip_through_intention() {
        let x = Var::fresh();
        let mut intention = Intention::new();
        let cp = intention.push_choicepoint();
        assert!(intention.unify(&Term::Var(x), &Term::atom("a")));
        assert_eq!(intention.grounded(&Term::Var(x)).unwrap(), Term::atom("a"));
        intention.reroll(cp).unwrap();
        assert!(intention.grounded(&Term::Var(x)).is_err());
        assert!(intention.trail.is_empty());
    }

    #[test]
    fn deadline_lifecycle() {
        let now = Instant::now();
        let mut intention = Intention::new();
        assert!(!intention.is_waiting(now));
        assert!(intention.wake(now));

        intention.wait_until = Some(now + Duration::from_millis(50));
        assert!(intention.is_waiting(now));
        assert!(!intention.wake(now));
        assert!(intention.wait_until.is_some());

        let later = now + Duration::from_millis(50);
        assert!(intention.wake(later));
        assert!(intention.wait_until.is_none());
    }
}
