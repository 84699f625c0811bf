//! Type tests.

use crate::action::{ActionRegistry, Param};
use crate::exec::once;
use crate::ground;
use crate::term::Term;

pub(super) fn register(registry: &mut ActionRegistry) {
    let tests: [(&str, fn(&Term) -> bool); 6] = [
        (".atom", |t| matches!(t, Term::Atom(_))),
        (".literal", |t| matches!(t, Term::Atom(_) | Term::Literal(_))),
        (".list", |t| matches!(t, Term::Seq(_))),
        (".number", |t| matches!(t, Term::Number(_))),
        (".string", |t| matches!(t, Term::Str(_))),
        (".structure", |t| matches!(t, Term::Literal(_) | Term::Seq(_))),
    ];
    for (name, test) in tests {
        registry.add_predicate(name, [Param::Any], move |args| Ok(test(&args[0])));
    }

    // Unlike the type tests, `.ground` accepts unbound arguments.
    registry.add_generator(".ground", Some(1), |args| {
        once(move |cx| Ok(ground::is_ground(&args[0], &cx.intention.scope)))
    });
}

#[cfg(test)]
mod tests {
    use crate::agent::Agent;
    use crate::stdlib::testing::{count, env};
    use crate::term::Term;

    fn holds(name: &str, arg: Term) -> bool {
        let env = env();
        let mut agent = Agent::new("a");
        count(&env, &mut agent, Term::literal(name, [arg])) == 1
    }

    #[test]
    fn type_tests() {
        let lit = Term::literal("f", [Term::int(1)]);
        assert!(holds(".atom", Term::atom("a")));
        assert!(!holds(".atom", lit.clone()));
        assert!(holds(".literal", Term::atom("a")));
        assert!(holds(".literal", lit.clone()));
        assert!(holds(".list", Term::seq([Term::int(1)])));
        assert!(holds(".number", Term::float(1.5)));
        assert!(!holds(".number", Term::string("1")));
        assert!(holds(".string", Term::string("1")));
        assert!(holds(".structure", lit));
        assert!(!holds(".structure", Term::atom("a")));
    }

    #[test]
    fn ground_test() {
        assert!(holds(".ground", Term::literal("f", [Term::int(1)])));
        assert!(!holds(".ground", Term::literal("f", [Term::var()])));
    }
}
