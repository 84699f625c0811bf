//! Standard action library.
//!
//! Every action here is registered by [`register`]; [`Env::with_stdlib`]
//! builds an environment with the full set.
//!
//! [`Env::with_stdlib`]: crate::env::Env::with_stdlib

mod aggregate;
mod clock;
mod control;
mod enumerate;
mod functions;
mod predicates;

use crate::action::ActionRegistry;

/// Register the standard actions.
pub fn register(registry: &mut ActionRegistry) {
    control::register(registry);
    functions::register(registry);
    predicates::register(registry);
    enumerate::register(registry);
    aggregate::register(registry);
    clock::register(registry);
    tracing::debug!(actions = registry.len(), "standard library registered");
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for driving single actions in tests.

    use crate::agent::Agent;
    use crate::env::Env;
    use crate::exec::{ExecContext, for_each_solution};
    use crate::intention::Intention;
    use crate::printer::Printer;
    use crate::query::Query;
    use crate::term::{Term, Var};

    pub fn env() -> Env {
        Env::with_stdlib().with_printer(Printer::buffered())
    }

    /// Every value `var` takes across the solutions of `goal`.
    pub fn solutions(env: &Env, agent: &mut Agent, goal: Term, var: Var) -> Vec<Term> {
        let mut intention = Intention::new();
        let mut cx = ExecContext::new(env, agent, &mut intention);
        let mut query = Query::new(goal);
        let mut seen = Vec::new();
        for_each_solution(&mut query, &mut cx, |cx| {
            seen.push(cx.intention.resolve(&Term::Var(var)));
            Ok(())
        })
        .unwrap();
        seen
    }

    /// Number of solutions of `goal`.
    pub fn count(env: &Env, agent: &mut Agent, goal: Term) -> usize {
        solutions(env, agent, goal, Var::fresh()).len()
    }
}
