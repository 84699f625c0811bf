//! Output, agent control and intention control actions.

use std::time::{Duration, Instant};

use crate::action::ActionRegistry;
use crate::error::EngineError;
use crate::exec::once;
use crate::ground::{self, FreezeMemo};
use crate::term::Term;

pub(super) fn register(registry: &mut ActionRegistry) {
    registry.add_generator(".print", None, |args| {
        once(move |cx| {
            let mut memo = FreezeMemo::new();
            let text = args
                .iter()
                .map(|arg| ground::freeze(arg, &cx.intention.scope, &mut memo).to_plain_string())
                .collect::<Vec<_>>()
                .join(" ");
            cx.env.printer().print(cx.agent.id(), cx.agent.name(), &text);
            Ok(true)
        })
    });

    registry.add_generator(".fail", Some(0), |_| once(|_| Ok(false)));

    registry.add_generator(".my_name", Some(1), |args| {
        once(move |cx| {
            let name = Term::atom(cx.agent.name());
            Ok(cx.unify(&args[0], &name))
        })
    });

    registry.add_generator(".stopMAS", Some(0), |_| {
        once(|cx| {
            cx.env.shutdown();
            Ok(true)
        })
    });

    registry.add_generator(".dump", Some(0), |_| {
        once(|cx| {
            cx.agent.dump();
            Ok(true)
        })
    });

    // Trail records are left alone; undoing them later is a no-op.
    registry.add_generator(".unbind_all", Some(0), |_| {
        once(|cx| {
            cx.intention.scope.clear();
            Ok(true)
        })
    });

    registry.add_generator(".wait", Some(1), |args| {
        once(move |cx| {
            let millis = cx.grounded(&args[0])?;
            let Some(millis) = millis.as_number() else {
                return Err(EngineError::TypeMismatch {
                    action: ".wait".into(),
                    expected: "number".into(),
                    found: millis.kind().into(),
                });
            };
            let out_of_range = || EngineError::Precondition {
                action: ".wait".into(),
                message: format!("delay must be a non-negative number of milliseconds, got {millis}"),
            };
            let delay = Duration::try_from_secs_f64(millis.as_f64() / 1000.0)
                .map_err(|_| out_of_range())?;
            let deadline = Instant::now().checked_add(delay).ok_or_else(out_of_range)?;
            cx.intention.wait_until = Some(deadline);
            tracing::trace!(intention = %cx.intention.id(), ?delay, "intention waiting");
            Ok(true)
        })
    });
}

#[cfg(test)]
mod tests {
    use crate::agent::Agent;
    use crate::env::Env;
    use crate::error::EngineError;
    use crate::exec::{ExecContext, Resume, Solutions};
    use crate::intention::Intention;
    use crate::query::Query;
    use crate::stdlib::testing::{count, env, solutions};
    use crate::term::{Term, Var};

    fn run_once(env: &Env, agent: &mut Agent, intention: &mut Intention, goal: Term) -> Resume {
        let mut cx = ExecContext::new(env, agent, intention);
        Query::new(goal).resume(&mut cx).unwrap()
    }

    #[test]
    fn print_joins_frozen_arguments() {
        let env = env();
        let mut agent = Agent::new("alice");
        let x = Var::fresh();
        let goal = Term::literal(
            "&",
            [
                Term::literal("=", [Term::Var(x), Term::int(3)]),
                Term::literal(
                    ".print",
                    [Term::string("x is"), Term::Var(x), Term::literal("f", [Term::atom("a")])],
                ),
            ],
        );
        assert_eq!(count(&env, &mut agent, goal), 1);
        assert_eq!(env.printer().take_lines(), ["alice: x is 3 f(a)"]);
    }

    #[test]
    fn fail_and_my_name() {
        let env = env();
        let mut agent = Agent::new("bob");
        assert_eq!(count(&env, &mut agent, Term::atom(".fail")), 0);

        let n = Var::fresh();
        let found = solutions(&env, &mut agent, Term::literal(".my_name", [Term::Var(n)]), n);
        assert_eq!(found, [Term::atom("bob")]);
        let wrong = Term::literal(".my_name", [Term::atom("carol")]);
        assert_eq!(count(&env, &mut agent, wrong), 0);
    }

    #[test]
    fn stop_mas_requests_shutdown() {
        let env = env();
        let mut agent = Agent::new("a");
        assert_eq!(count(&env, &mut agent, Term::atom(".stopMAS")), 1);
        assert!(env.is_shutdown());
    }

    #[test]
    fn unbind_all_clears_scope() {
        let env = env();
        let mut agent = Agent::new("a");
        let mut intention = Intention::new();
        assert!(intention.unify(&Term::var(), &Term::int(1)));
        assert_eq!(
            run_once(&env, &mut agent, &mut intention, Term::atom(".unbind_all")),
            Resume::Solution
        );
        assert!(intention.scope.is_empty());
    }

    #[test]
    fn wait_sets_deadline() {
        let env = env();
        let mut agent = Agent::new("a");
        let mut intention = Intention::new();
        let goal = Term::literal(".wait", [Term::int(50)]);
        assert_eq!(run_once(&env, &mut agent, &mut intention, goal), Resume::Solution);
        assert!(intention.is_waiting(std::time::Instant::now()));
    }

    #[test]
    fn negative_wait_is_a_precondition_error() {
        let env = env();
        let mut agent = Agent::new("a");
        let mut intention = Intention::new();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let err = Query::new(Term::literal(".wait", [Term::int(-5)]))
            .resume(&mut cx)
            .unwrap_err();
        assert!(matches!(err, EngineError::Precondition { .. }));
        assert!(intention.wait_until.is_none());
    }

    #[test]
    fn unreachable_wait_deadline_is_a_precondition_error() {
        let env = env();
        let mut agent = Agent::new("a");
        let mut intention = Intention::new();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let err = Query::new(Term::literal(".wait", [Term::float(1e22)]))
            .resume(&mut cx)
            .unwrap_err();
        assert!(matches!(err, EngineError::Precondition { .. }));
        assert!(intention.wait_until.is_none());
    }
}
