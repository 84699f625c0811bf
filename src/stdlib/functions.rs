//! Value-computing actions. Each unifies its result with its last argument.

use crate::action::{ActionRegistry, Param};
use crate::error::{EngineError, EngineResult};
use crate::exec::once;
use crate::term::{Term, compare_terms};

pub(super) fn register(registry: &mut ActionRegistry) {
    registry.add_function(".random", Vec::<Param>::new(), |_| Ok(Term::float(rand::random::<f64>())));

    registry.add_function(".min", [Param::Seq], |args| extreme(".min", &args[0], false));
    registry.add_function(".max", [Param::Seq], |args| extreme(".max", &args[0], true));

    registry.add_function(".length", [Param::Any], |args| match &args[0] {
        Term::Seq(items) => Ok(Term::int(items.len() as i64)),
        Term::Str(text) => Ok(Term::int(text.chars().count() as i64)),
        other => Err(EngineError::TypeMismatch {
            action: ".length".into(),
            expected: "sequence or string".into(),
            found: other.kind().into(),
        }),
    });

    registry.add_function(".nth", [Param::Int, Param::Seq], |args| {
        let index = args[0].as_number().map(|n| n.as_i64()).unwrap_or_default();
        let items = args[1].as_seq().unwrap_or_default();
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or_else(|| EngineError::Precondition {
                action: ".nth".into(),
                message: format!("index {index} out of range for sequence of length {}", items.len()),
            })
    });

    registry.add_function(".sort", [Param::Seq], |args| {
        let mut items = args[0].as_seq().unwrap_or_default().to_vec();
        items.sort_by(compare_terms);
        Ok(Term::seq(items))
    });

    // Variadic: the inputs are every argument but the last.
    registry.add_generator(".concat", None, |args| {
        once(move |cx| {
            let Some((result, inputs)) = args.split_last() else {
                return Err(EngineError::Precondition {
                    action: ".concat".into(),
                    message: "a result argument is required".into(),
                });
            };
            let values = inputs
                .iter()
                .map(|arg| cx.grounded(arg))
                .collect::<EngineResult<Vec<_>>>()?;
            let joined = concat(&values);
            Ok(cx.unify(result, &joined))
        })
    });
}

fn extreme(action: &str, list: &Term, max: bool) -> EngineResult<Term> {
    let items = list.as_seq().unwrap_or_default();
    let found = if max {
        items.iter().max_by(|a, b| compare_terms(a, b))
    } else {
        items.iter().min_by(|a, b| compare_terms(a, b))
    };
    found.cloned().ok_or_else(|| EngineError::Precondition {
        action: action.into(),
        message: "empty sequence".into(),
    })
}

/// Sequences concatenate into a sequence; any other mix joins as text.
fn concat(values: &[Term]) -> Term {
    if values.iter().all(|v| matches!(v, Term::Seq(_))) {
        Term::seq(values.iter().flat_map(|v| v.as_seq().unwrap_or_default().iter().cloned()))
    } else {
        Term::string(values.iter().map(Term::to_plain_string).collect::<String>())
    }
}
