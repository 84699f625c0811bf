//! The solution protocol shared by queries and actions.
//!
//! Every goal, whether a belief query, a composite goal or a library action,
//! runs as a [`Solutions`] state machine. Each call to
//! [`resume`](Solutions::resume) advances the search to the next point where
//! control returns to the caller:
//!
//! - [`Resume::Solution`]: bindings for one solution are committed to the
//!   intention's scope, guarded by a choicepoint the state machine owns.
//!   The next `resume` rerolls it before searching further.
//! - [`Resume::Suspended`]: the intention set a future deadline part way
//!   through a composite goal; resume again once it has passed.
//! - [`Resume::Exhausted`]: no further solutions; every binding the state
//!   machine made has been undone.

use crate::agent::Agent;
use crate::env::Env;
use crate::error::EngineResult;
use crate::intention::Intention;
use crate::term::Term;
use crate::trail::Choicepoint;

/// Everything a running goal may touch during one scheduling step.
pub struct ExecContext<'a> {
    pub env: &'a Env,
    pub agent: &'a mut Agent,
    pub intention: &'a mut Intention,
}

impl<'a> ExecContext<'a> {
    pub fn new(env: &'a Env, agent: &'a mut Agent, intention: &'a mut Intention) -> Self {
        Self {
            env,
            agent,
            intention,
        }
    }

    pub fn unify(&mut self, a: &Term, b: &Term) -> bool {
        self.intention.unify(a, b)
    }

    pub fn push_choicepoint(&mut self) -> Choicepoint {
        self.intention.push_choicepoint()
    }

    pub fn reroll(&mut self, choicepoint: Choicepoint) -> EngineResult<()> {
        self.intention.reroll(choicepoint)
    }

    pub fn grounded(&self, term: &Term) -> EngineResult<Term> {
        self.intention.grounded(term)
    }
}

/// Outcome of one [`Solutions::resume`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Solution,
    Suspended,
    Exhausted,
}

/// A resumable, lazily evaluated sequence of solutions.
pub trait Solutions {
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume>;
}

pub type BoxedSolutions = Box<dyn Solutions>;

/// Drive `solutions` to exhaustion within the current step, calling
/// `on_solution` while each solution's bindings are in place.
///
/// Suspensions are not honoured here: a deadline set by a nested goal stays
/// on the intention and takes effect once the current step ends.
pub fn for_each_solution(
    solutions: &mut dyn Solutions,
    cx: &mut ExecContext<'_>,
    mut on_solution: impl FnMut(&mut ExecContext<'_>) -> EngineResult<()>,
) -> EngineResult<usize> {
    let mut count = 0;
    loop {
        match solutions.resume(cx)? {
            Resume::Solution => {
                count += 1;
                on_solution(cx)?;
            }
            Resume::Suspended => {}
            Resume::Exhausted => return Ok(count),
        }
    }
}

// ---------------------------------------------------------------------------
// Deterministic: zero or one solution
// ---------------------------------------------------------------------------

struct Once<F> {
    run: Option<F>,
    choicepoint: Option<Choicepoint>,
}

impl<F> Solutions for Once<F>
where
    F: FnOnce(&mut ExecContext<'_>) -> EngineResult<bool>,
{
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume> {
        if let Some(cp) = self.choicepoint.take() {
            cx.reroll(cp)?;
            return Ok(Resume::Exhausted);
        }
        let Some(run) = self.run.take() else {
            return Ok(Resume::Exhausted);
        };
        let cp = cx.push_choicepoint();
        if run(cx)? {
            self.choicepoint = Some(cp);
            Ok(Resume::Solution)
        } else {
            cx.reroll(cp)?;
            Ok(Resume::Exhausted)
        }
    }
}

/// A deterministic step: `run` executes on the first resume under a fresh
/// choicepoint and yields one solution iff it returns `true`.
pub fn once<F>(run: F) -> BoxedSolutions
where
    F: FnOnce(&mut ExecContext<'_>) -> EngineResult<bool> + 'static,
{
    Box::new(Once {
        run: Some(run),
        choicepoint: None,
    })
}

// ---------------------------------------------------------------------------
// Nondeterministic: unify a target with each candidate in turn
// ---------------------------------------------------------------------------

struct Choices<F, I> {
    target: Term,
    init: Option<F>,
    candidates: Option<I>,
    choicepoint: Option<Choicepoint>,
}

impl<F, I> Solutions for Choices<F, I>
where
    F: FnOnce(&mut ExecContext<'_>) -> EngineResult<I>,
    I: Iterator<Item = Term>,
{
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume> {
        if let Some(cp) = self.choicepoint.take() {
            cx.reroll(cp)?;
        }
        if let Some(init) = self.init.take() {
            self.candidates = Some(init(cx)?);
        }
        let Some(candidates) = self.candidates.as_mut() else {
            return Ok(Resume::Exhausted);
        };
        for candidate in candidates.by_ref() {
            let cp = cx.push_choicepoint();
            if cx.unify(&self.target, &candidate) {
                self.choicepoint = Some(cp);
                return Ok(Resume::Solution);
            }
            cx.reroll(cp)?;
        }
        self.candidates = None;
        Ok(Resume::Exhausted)
    }
}

/// Enumerate the candidates produced by `init` (computed lazily on the
/// first resume), yielding once for each one that unifies with `target`.
pub fn choices<F, I>(target: Term, init: F) -> BoxedSolutions
where
    F: FnOnce(&mut ExecContext<'_>) -> EngineResult<I> + 'static,
    I: Iterator<Item = Term> + 'static,
{
    Box::new(Choices {
        target,
        init: Some(init),
        candidates: None,
        choicepoint: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Var;

    fn fixture() -> (Env, Agent, Intention) {
        (Env::new(), Agent::new("tester"), Intention::new())
    }

    #[test]
    fn once_yields_single_solution_then_restores() {
        let (env, mut agent, mut intention) = fixture();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let x = Var::fresh();
        let mut s = once(move |cx| Ok(cx.unify(&Term::Var(x), &Term::int(1))));

        assert_eq!(s.resume(&mut cx).unwrap(), Resume::Solution);
        assert_eq!(cx.grounded(&Term::Var(x)).unwrap(), Term::int(1));
        assert_eq!(s.resume(&mut cx).unwrap(), Resume::Exhausted);
        assert!(cx.intention.scope.is_empty());
        assert!(cx.intention.trail.is_empty());
    }

    #[test]
    fn once_false_is_no_solution() {
        let (env, mut agent, mut intention) = fixture();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let mut s = once(|_| Ok(false));
        assert_eq!(s.resume(&mut cx).unwrap(), Resume::Exhausted);
        assert!(cx.intention.trail.is_empty());
    }

    #[test]
    fn choices_skip_non_unifying_candidates() {
        let (env, mut agent, mut intention) = fixture();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let target = Term::literal("p", [Term::var(), Term::int(2)]);
        let candidates = vec![
            Term::literal("p", [Term::atom("a"), Term::int(1)]),
            Term::literal("p", [Term::atom("b"), Term::int(2)]),
        ];
        let mut s = choices(target, move |_| Ok(candidates.into_iter()));
        let found = for_each_solution(s.as_mut(), &mut cx, |_| Ok(())).unwrap();
        assert_eq!(found, 1);
        assert!(cx.intention.scope.is_empty());
    }
}
