//! Action system: named operations callable from goals.
//!
//! Actions are registered in an [`ActionRegistry`] under their name and
//! arity (or as variadic). Whatever its shape, an [`Action`] runs as a
//! [`Solutions`](crate::exec::Solutions) state machine, so the scheduler and
//! the query engine never need to know which kind they are driving.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::exec::{BoxedSolutions, ExecContext, once};
use crate::term::{Number, Term};

/// Arguments of an action call.
pub type Args = Arc<[Term]>;

pub type FunctionFn = dyn Fn(&[Term]) -> EngineResult<Term>;
pub type PredicateFn = dyn Fn(&[Term]) -> EngineResult<bool>;
pub type GeneratorFn = dyn Fn(Args) -> BoxedSolutions;

/// Required kind of a function or predicate parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Any,
    Number,
    Int,
    String,
    Seq,
}

impl Param {
    fn accepts(self, value: &Term) -> bool {
        match self {
            Param::Any => true,
            Param::Number => matches!(value, Term::Number(_)),
            Param::Int => matches!(value, Term::Number(Number::Int(_))),
            Param::String => matches!(value, Term::Str(_)),
            Param::Seq => matches!(value, Term::Seq(_)),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Param::Any => "any term",
            Param::Number => "number",
            Param::Int => "integer",
            Param::String => "string",
            Param::Seq => "sequence",
        }
    }
}

/// A registered action.
#[derive(Clone)]
pub enum Action {
    /// Grounds and checks its inputs, computes a value and unifies it with
    /// the last argument. One solution or none.
    Function {
        params: Vec<Param>,
        call: Arc<FunctionFn>,
    },
    /// Grounds and checks its arguments. One solution, without bindings,
    /// iff the test holds.
    Predicate {
        params: Vec<Param>,
        test: Arc<PredicateFn>,
    },
    /// Builds its own solution state machine from the call arguments.
    Generator(Arc<GeneratorFn>),
}

impl Action {
    pub fn function(
        params: impl Into<Vec<Param>>,
        call: impl Fn(&[Term]) -> EngineResult<Term> + 'static,
    ) -> Self {
        Action::Function {
            params: params.into(),
            call: Arc::new(call),
        }
    }

    pub fn predicate(
        params: impl Into<Vec<Param>>,
        test: impl Fn(&[Term]) -> EngineResult<bool> + 'static,
    ) -> Self {
        Action::Predicate {
            params: params.into(),
            test: Arc::new(test),
        }
    }

    pub fn generator(start: impl Fn(Args) -> BoxedSolutions + 'static) -> Self {
        Action::Generator(Arc::new(start))
    }

    /// Arity implied by the action's shape, if fixed.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Action::Function { params, .. } => Some(params.len() + 1),
            Action::Predicate { params, .. } => Some(params.len()),
            Action::Generator(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Function { .. } => "function",
            Action::Predicate { .. } => "predicate",
            Action::Generator(_) => "generator",
        }
    }

    /// Start a call with the given arguments.
    pub fn run(&self, name: &str, args: Args) -> BoxedSolutions {
        match self {
            Action::Function { params, call } => {
                let (name, params, call) = (name.to_owned(), params.clone(), Arc::clone(call));
                once(move |cx| {
                    let Some((output, inputs)) = args.split_last() else {
                        return Ok(false);
                    };
                    let values = ground_params(cx, &name, &params, inputs)?;
                    let result = call(&values)?;
                    Ok(cx.unify(output, &result))
                })
            }
            Action::Predicate { params, test } => {
                let (name, params, test) = (name.to_owned(), params.clone(), Arc::clone(test));
                once(move |cx| {
                    let values = ground_params(cx, &name, &params, &args)?;
                    test(&values)
                })
            }
            Action::Generator(start) => start(args),
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Function { params, .. } => {
                f.debug_struct("Function").field("params", params).finish()
            }
            Action::Predicate { params, .. } => {
                f.debug_struct("Predicate").field("params", params).finish()
            }
            Action::Generator(_) => f.write_str("Generator"),
        }
    }
}

fn ground_params(
    cx: &ExecContext<'_>,
    action: &str,
    params: &[Param],
    args: &[Term],
) -> EngineResult<Vec<Term>> {
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let value = cx.grounded(arg)?;
            if param.accepts(&value) {
                Ok(value)
            } else {
                Err(EngineError::TypeMismatch {
                    action: action.into(),
                    expected: param.describe().into(),
                    found: value.kind().into(),
                })
            }
        })
        .collect()
}

/// Dispatch key: name plus arity, or `None` for variadic actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionKey {
    pub name: String,
    pub arity: Option<usize>,
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.arity {
            Some(arity) => write!(f, "{}/{}", self.name, arity),
            None => write!(f, "{}/*", self.name),
        }
    }
}

/// Registry of available actions.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<ActionKey, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. An existing action under the same key is replaced.
    pub fn register(&mut self, name: impl Into<String>, arity: Option<usize>, action: Action) {
        let key = ActionKey {
            name: name.into(),
            arity,
        };
        if self.actions.insert(key.clone(), action).is_some() {
            tracing::debug!(action = %key, "replaced registered action");
        }
    }

    /// Register a [`Action::Function`]; its arity is one more than `params`.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        params: impl Into<Vec<Param>>,
        call: impl Fn(&[Term]) -> EngineResult<Term> + 'static,
    ) {
        let action = Action::function(params, call);
        let arity = action.arity();
        self.register(name, arity, action);
    }

    /// Register an [`Action::Predicate`] with one argument per param.
    pub fn add_predicate(
        &mut self,
        name: impl Into<String>,
        params: impl Into<Vec<Param>>,
        test: impl Fn(&[Term]) -> EngineResult<bool> + 'static,
    ) {
        let action = Action::predicate(params, test);
        let arity = action.arity();
        self.register(name, arity, action);
    }

    /// Register an [`Action::Generator`]; `None` makes it variadic.
    pub fn add_generator(
        &mut self,
        name: impl Into<String>,
        arity: Option<usize>,
        start: impl Fn(Args) -> BoxedSolutions + 'static,
    ) {
        self.register(name, arity, Action::generator(start));
    }

    /// Find the action for a call: exact arity first, then variadic.
    pub fn lookup(&self, name: &str, arity: usize) -> Option<&Action> {
        let mut key = ActionKey {
            name: name.to_owned(),
            arity: Some(arity),
        };
        if let Some(action) = self.actions.get(&key) {
            return Some(action);
        }
        key.arity = None;
        self.actions.get(&key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&ActionKey> {
        let mut keys: Vec<_> = self.actions.keys().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field(
                "actions",
                &self.keys().iter().map(ToString::to_string).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::env::Env;
    use crate::exec::Resume;
    use crate::intention::Intention;
    use crate::term::Var;

    fn double_registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.add_function(".double", [Param::Int], |args| match &args[0] {
            Term::Number(n) => Ok(Term::int(n.as_i64() * 2)),
            _ => unreachable!("checked by Param::Int"),
        });
        registry.add_predicate(".positive", [Param::Number], |args| {
            Ok(args[0].as_number().is_some_and(|n| n.as_f64() > 0.0))
        });
        registry.add_generator(".any", None, |_| crate::exec::once(|_| Ok(true)));
        registry
    }

    #[test]
    fn lookup_prefers_exact_arity() {
        let mut registry = double_registry();
        registry.add_generator(".any", Some(1), |_| crate::exec::once(|_| Ok(false)));
        assert_eq!(registry.lookup(".double", 2).unwrap().kind(), "function");
        assert!(registry.lookup(".double", 1).is_none());
        assert!(registry.lookup(".any", 5).is_some());
        assert!(registry.lookup(".any", 1).is_some());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn keys_display() {
        let registry = double_registry();
        let keys: Vec<_> = registry.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, [".any/*", ".double/2", ".positive/1"]);
    }

    #[test]
    fn function_unifies_result_with_last_argument() {
        let env = Env::with_actions(double_registry());
        let mut agent = Agent::new("tester");
        let mut intention = Intention::new();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let x = Var::fresh();

        let action = env.actions().lookup(".double", 2).unwrap();
        let mut run = action.run(".double", Arc::from([Term::int(21), Term::Var(x)]));
        assert_eq!(run.resume(&mut cx).unwrap(), Resume::Solution);
        assert_eq!(cx.grounded(&Term::Var(x)).unwrap(), Term::int(42));
        assert_eq!(run.resume(&mut cx).unwrap(), Resume::Exhausted);
        assert!(cx.intention.scope.is_empty());

        let mut wrong = action.run(".double", Arc::from([Term::int(21), Term::int(41)]));
        assert_eq!(wrong.resume(&mut cx).unwrap(), Resume::Exhausted);
    }

    #[test]
    fn function_checks_and_grounds_inputs() {
        let env = Env::with_actions(double_registry());
        let mut agent = Agent::new("tester");
        let mut intention = Intention::new();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let action = env.actions().lookup(".double", 2).unwrap();

        let mut bad = action.run(".double", Arc::from([Term::string("x"), Term::var()]));
        let err = bad.resume(&mut cx).unwrap_err();
        assert!(matches!(err, EngineError::TypeMismatch { ref action, .. } if action == ".double"));

        let mut unbound = action.run(".double", Arc::from([Term::var(), Term::var()]));
        assert!(matches!(
            unbound.resume(&mut cx),
            Err(EngineError::Instantiation { .. })
        ));
    }

    #[test]
    fn predicate_yields_without_bindings() {
        let env = Env::with_actions(double_registry());
        let mut agent = Agent::new("tester");
        let mut intention = Intention::new();
        let mut cx = ExecContext::new(&env, &mut agent, &mut intention);
        let action = env.actions().lookup(".positive", 1).unwrap();

        let mut yes = action.run(".positive", Arc::from([Term::float(0.5)]));
        assert_eq!(yes.resume(&mut cx).unwrap(), Resume::Solution);
        assert!(cx.intention.scope.is_empty());
        assert_eq!(yes.resume(&mut cx).unwrap(), Resume::Exhausted);

        let mut no = action.run(".positive", Arc::from([Term::int(-1)]));
        assert_eq!(no.resume(&mut cx).unwrap(), Resume::Exhausted);
    }
}
