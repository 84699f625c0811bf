//! Aggregation over the solutions of a nested goal.

use crate::action::ActionRegistry;
use crate::error::EngineError;
use crate::exec::{for_each_solution, once};
use crate::ground::{self, FreezeMemo};
use crate::query::Query;
use crate::scope::Scope;
use crate::term::Term;
use crate::trail::Trail;
use crate::unify::unify;

pub(super) fn register(registry: &mut ActionRegistry) {
    // `.findall(Pattern, Goal, List)`: every solution's pattern, frozen so
    // the result survives the nested goal being unwound.
    registry.add_generator(".findall", Some(3), |args| {
        once(move |cx| {
            let mut query = Query::new(args[1].clone());
            let mut memo = FreezeMemo::new();
            let mut found = Vec::new();
            for_each_solution(&mut query, cx, |cx| {
                found.push(ground::freeze(&args[0], &cx.intention.scope, &mut memo));
                Ok(())
            })?;
            Ok(cx.unify(&args[2], &Term::seq(found)))
        })
    });

    // `.count(Pattern, N)`: facts matching the pattern, tried in a scratch
    // scope so no bindings escape.
    registry.add_generator(".count", Some(2), |args| {
        once(move |cx| {
            let pattern = ground::substitute(&args[0], &cx.intention.scope);
            let group = match &pattern {
                Term::Var(_) => {
                    return Err(EngineError::Instantiation {
                        term: pattern.to_string(),
                    });
                }
                other => other.literal_group().ok_or_else(|| EngineError::InvalidGoal {
                    goal: other.to_string(),
                })?,
            };
            let matching = cx
                .agent
                .beliefs
                .lookup(&group)
                .iter()
                .filter(|belief| unify(&pattern, belief, &mut Scope::new(), &mut Trail::new()))
                .count();
            Ok(cx.unify(&args[1], &Term::int(matching as i64)))
        })
    });
}
