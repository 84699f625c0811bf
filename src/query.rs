//! Goal evaluation: belief queries and composite goals.
//!
//! A goal term is compiled into a [`Solutions`] state machine on its first
//! resume, after dereferencing it in the intention's scope:
//!
//! | Goal | Meaning |
//! |------|---------|
//! | `true` / `false` | one solution / none |
//! | `&(A, B)` | conjunction: every B solution for every A solution |
//! | `\|(A, B)` | disjunction: all solutions of A, then of B |
//! | `not(A)` | one solution without bindings iff A has none |
//! | `=(A, B)` | unify A with B |
//! | `.name(...)` | call the registered action |
//! | anything else | [`TermQuery`] over the agent's belief base |

use std::time::Instant;

use crate::error::{EngineError, EngineResult};
use crate::exec::{BoxedSolutions, ExecContext, Resume, Solutions, once};
use crate::ground::{self, FreezeMemo};
use crate::scope::Scope;
use crate::term::{LiteralGroup, Term};
use crate::trail::Choicepoint;

/// A goal, compiled lazily on first resume.
pub struct Query {
    goal: Term,
    state: QueryState,
}

enum QueryState {
    Pending,
    Running(BoxedSolutions),
    Done,
}

impl Query {
    pub fn new(goal: Term) -> Self {
        Self {
            goal,
            state: QueryState::Pending,
        }
    }

    pub fn goal(&self) -> &Term {
        &self.goal
    }
}

impl Solutions for Query {
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume> {
        loop {
            match &mut self.state {
                QueryState::Pending => {
                    self.state = QueryState::Running(compile(&self.goal, cx)?);
                }
                QueryState::Running(solutions) => {
                    let event = solutions.resume(cx)?;
                    if event == Resume::Exhausted {
                        self.state = QueryState::Done;
                    }
                    return Ok(event);
                }
                QueryState::Done => return Ok(Resume::Exhausted),
            }
        }
    }
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            QueryState::Pending => "pending",
            QueryState::Running(_) => "running",
            QueryState::Done => "done",
        };
        f.debug_struct("Query")
            .field("goal", &self.goal.to_string())
            .field("state", &state)
            .finish()
    }
}

fn compile(goal: &Term, cx: &mut ExecContext<'_>) -> EngineResult<BoxedSolutions> {
    let goal = cx.intention.scope.walk(goal).clone();
    match &goal {
        Term::Var(_) => Err(EngineError::Instantiation {
            term: goal.to_string(),
        }),
        Term::Atom(name) if name.as_ref() == "true" => Ok(once(|_| Ok(true))),
        Term::Atom(name) if name.as_ref() == "false" => Ok(once(|_| Ok(false))),
        Term::Atom(name) if name.starts_with('.') => call_action(name, &[], cx),
        Term::Atom(_) => Ok(Box::new(TermQuery::new(goal.clone()))),
        Term::Literal(lit) => {
            let args = lit.args();
            match (lit.functor(), args) {
                ("&", [left, right]) => Ok(Box::new(And::new(left.clone(), right.clone()))),
                ("|", [left, right]) => Ok(Box::new(Or::new(left.clone(), right.clone()))),
                ("not", [inner]) => Ok(Box::new(Not::new(inner.clone()))),
                ("=", [left, right]) => {
                    let (left, right) = (left.clone(), right.clone());
                    Ok(once(move |cx| Ok(cx.unify(&left, &right))))
                }
                (functor, _) if functor.starts_with('.') => call_action(functor, args, cx),
                _ => Ok(Box::new(TermQuery::new(goal.clone()))),
            }
        }
        other => Err(EngineError::InvalidGoal {
            goal: other.to_string(),
        }),
    }
}

fn call_action(name: &str, args: &[Term], cx: &ExecContext<'_>) -> EngineResult<BoxedSolutions> {
    let action = cx
        .env
        .actions()
        .lookup(name, args.len())
        .ok_or_else(|| EngineError::UnknownAction {
            name: name.into(),
            arity: args.len(),
        })?;
    tracing::trace!(action = name, arity = args.len(), "calling action");
    Ok(action.run(name, args.into()))
}

/// Whether the current intention must give control back before continuing.
fn suspended(cx: &ExecContext<'_>) -> bool {
    cx.intention.is_waiting(Instant::now())
}

// ---------------------------------------------------------------------------
// Belief query
// ---------------------------------------------------------------------------

enum Phase {
    Facts,
    Rules,
    Done,
}

/// Enumerates the beliefs, then the rules, of the goal's literal group.
///
/// Each candidate is tried under its own choicepoint. Facts and rules that
/// contain variables are renamed apart first, so the goal's variables are
/// the only ones ever bound in the intention's scope.
pub struct TermQuery {
    goal: Term,
    group: Option<LiteralGroup>,
    phase: Phase,
    next: usize,
    choicepoint: Option<Choicepoint>,
    body: Option<Query>,
}

impl TermQuery {
    pub fn new(goal: Term) -> Self {
        Self {
            goal,
            group: None,
            phase: Phase::Facts,
            next: 0,
            choicepoint: None,
            body: None,
        }
    }

    fn group(&mut self, cx: &ExecContext<'_>) -> EngineResult<LiteralGroup> {
        if let Some(group) = &self.group {
            return Ok(group.clone());
        }
        let goal = cx.intention.scope.walk(&self.goal);
        let group = match goal {
            Term::Var(_) => {
                return Err(EngineError::Instantiation {
                    term: self.goal.to_string(),
                });
            }
            other => other.literal_group().ok_or_else(|| EngineError::InvalidGoal {
                goal: other.to_string(),
            })?,
        };
        self.group = Some(group.clone());
        Ok(group)
    }

    fn undo_last(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<()> {
        self.body = None;
        if let Some(cp) = self.choicepoint.take() {
            cx.reroll(cp)?;
        }
        Ok(())
    }
}

fn rename_apart(term: &Term, memo: &mut FreezeMemo) -> Term {
    if ground::has_variables(term) {
        ground::freeze(term, &Scope::new(), memo)
    } else {
        term.clone()
    }
}

impl Solutions for TermQuery {
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume> {
        if let Some(body) = self.body.as_mut() {
            match body.resume(cx)? {
                Resume::Exhausted => self.undo_last(cx)?,
                event => return Ok(event),
            }
        } else {
            self.undo_last(cx)?;
        }

        let group = self.group(cx)?;
        loop {
            match self.phase {
                Phase::Facts => {
                    let Some(fact) = cx.agent.beliefs.lookup(&group).get(self.next).cloned() else {
                        self.phase = Phase::Rules;
                        self.next = 0;
                        continue;
                    };
                    self.next += 1;
                    let candidate = rename_apart(&fact, &mut FreezeMemo::new());
                    let cp = cx.push_choicepoint();
                    if cx.unify(&self.goal, &candidate) {
                        self.choicepoint = Some(cp);
                        return Ok(Resume::Solution);
                    }
                    cx.reroll(cp)?;
                }
                Phase::Rules => {
                    let Some(rule) = cx.agent.beliefs.rules(&group).get(self.next).cloned() else {
                        self.phase = Phase::Done;
                        continue;
                    };
                    self.next += 1;
                    let mut memo = FreezeMemo::new();
                    let head = rename_apart(&rule.head, &mut memo);
                    let body = rename_apart(&rule.body, &mut memo);
                    let cp = cx.push_choicepoint();
                    if !cx.unify(&self.goal, &head) {
                        cx.reroll(cp)?;
                        continue;
                    }
                    self.choicepoint = Some(cp);
                    let mut body = Query::new(body);
                    match body.resume(cx)? {
                        Resume::Exhausted => self.undo_last(cx)?,
                        event => {
                            self.body = Some(body);
                            return Ok(event);
                        }
                    }
                }
                Phase::Done => return Ok(Resume::Exhausted),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Composite goals
// ---------------------------------------------------------------------------

struct And {
    left: Query,
    right_goal: Term,
    right: Option<Query>,
}

impl And {
    fn new(left: Term, right: Term) -> Self {
        Self {
            left: Query::new(left),
            right_goal: right,
            right: None,
        }
    }
}

impl Solutions for And {
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume> {
        loop {
            if let Some(right) = self.right.as_mut() {
                match right.resume(cx)? {
                    Resume::Exhausted => self.right = None,
                    event => return Ok(event),
                }
            }
            match self.left.resume(cx)? {
                Resume::Solution => {
                    self.right = Some(Query::new(self.right_goal.clone()));
                    if suspended(cx) {
                        return Ok(Resume::Suspended);
                    }
                }
                event => return Ok(event),
            }
        }
    }
}

struct Or {
    left: Query,
    right: Query,
    left_done: bool,
}

impl Or {
    fn new(left: Term, right: Term) -> Self {
        Self {
            left: Query::new(left),
            right: Query::new(right),
            left_done: false,
        }
    }
}

impl Solutions for Or {
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume> {
        if !self.left_done {
            match self.left.resume(cx)? {
                Resume::Exhausted => self.left_done = true,
                event => return Ok(event),
            }
        }
        self.right.resume(cx)
    }
}

struct Not {
    inner: Query,
    choicepoint: Option<Choicepoint>,
    done: bool,
}

impl Not {
    fn new(inner: Term) -> Self {
        Self {
            inner: Query::new(inner),
            choicepoint: None,
            done: false,
        }
    }
}

impl Solutions for Not {
    fn resume(&mut self, cx: &mut ExecContext<'_>) -> EngineResult<Resume> {
        if self.done {
            return Ok(Resume::Exhausted);
        }
        let cp = match self.choicepoint {
            Some(cp) => cp,
            None => {
                let cp = cx.push_choicepoint();
                self.choicepoint = Some(cp);
                cp
            }
        };
        let event = self.inner.resume(cx)?;
        if event == Resume::Suspended {
            return Ok(event);
        }
        self.done = true;
        self.choicepoint = None;
        cx.reroll(cp)?;
        match event {
            Resume::Solution => Ok(Resume::Exhausted),
            _ => Ok(Resume::Solution),
        }
    }
}
