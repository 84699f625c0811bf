//! Nondeterministic actions: one solution per candidate value.

use crate::action::ActionRegistry;
use crate::error::EngineError;
use crate::exec::choices;
use crate::ground;
use crate::term::Term;

pub(super) fn register(registry: &mut ActionRegistry) {
    registry.add_generator(".member", Some(2), |args| {
        let target = args[0].clone();
        choices(target, move |cx| ground::evaluate(&args[1], &cx.intention.scope))
    });

    registry.add_generator(".range", Some(2), |args| {
        let target = args[0].clone();
        choices(target, move |cx| {
            let bound = cx.grounded(&args[1])?;
            let Some(n) = bound.as_number() else {
                return Err(EngineError::TypeMismatch {
                    action: ".range".into(),
                    expected: "number".into(),
                    found: bound.kind().into(),
                });
            };
            Ok((0..n.as_i64()).map(Term::int))
        })
    });

    registry.add_generator(".substring", Some(3), |args| {
        let target = args[2].clone();
        choices(target, move |cx| {
            let needle = cx.grounded(&args[0])?.to_plain_string();
            let haystack = cx.grounded(&args[1])?.to_plain_string();
            Ok(char_positions(&needle, &haystack).into_iter().map(Term::int))
        })
    });
}

/// Character offsets of every occurrence of `needle` in `haystack`,
/// leftmost first, overlaps included.
fn char_positions(needle: &str, haystack: &str) -> Vec<i64> {
    let needle: Vec<char> = needle.chars().collect();
    let haystack: Vec<char> = haystack.chars().collect();
    if needle.len() > haystack.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&start| haystack[start..start + needle.len()] == needle[..])
        .map(|start| start as i64)
        .collect()
}
