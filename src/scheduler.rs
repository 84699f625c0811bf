//! Cooperative intention scheduler.
//!
//! One stepper drives every intention of every agent. Each step picks the
//! next agent in round-robin order, takes that agent's first runnable
//! intention, resumes its goal once and rotates it to the back of the
//! agent's queue. Intentions with a future deadline are skipped until it
//! passes; when nothing is runnable, [`Scheduler::run`] sleeps the stepper
//! until the earliest deadline.

use std::time::{Duration, Instant};

use crate::agent::{ActiveIntention, Agent, AgentId, GoalPolicy};
use crate::env::Env;
use crate::error::EngineError;
use crate::exec::{ExecContext, Resume, Solutions};
use crate::intention::IntentionId;

/// Scheduler tuning.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Stop [`Scheduler::run`] after this many dispatched steps (default: unlimited).
    pub max_steps: Option<u64>,
    /// Longest single sleep while every intention waits (default: 10 ms).
    pub idle_poll: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            idle_poll: Duration::from_millis(10),
        }
    }
}

/// Result of one [`Scheduler::step`].
#[derive(Debug)]
pub enum StepOutcome {
    /// The goal produced a solution and the intention continues.
    Solution { agent: AgentId, intention: IntentionId },
    /// The goal gave control back part way through, waiting on a deadline.
    Suspended { agent: AgentId, intention: IntentionId },
    /// The goal is satisfied; the intention has ended.
    Completed {
        agent: AgentId,
        intention: IntentionId,
        solutions: usize,
    },
    /// The goal had no solution; the intention has ended.
    Failed { agent: AgentId, intention: IntentionId },
    /// A hard error ended the intention.
    Aborted {
        agent: AgentId,
        intention: IntentionId,
        error: EngineError,
    },
    /// Intentions exist but all are waiting.
    Idle { next_deadline: Option<Instant> },
    /// No agent has any intention left.
    NoIntentions,
    /// Shutdown was requested; nothing was dispatched.
    Shutdown,
}

impl StepOutcome {
    /// Whether an intention was resumed during this step.
    pub fn dispatched(&self) -> bool {
        !matches!(
            self,
            StepOutcome::Idle { .. } | StepOutcome::NoIntentions | StepOutcome::Shutdown
        )
    }
}

/// Why [`Scheduler::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    NoIntentions,
    Shutdown,
    StepLimit,
}

/// Totals over one [`Scheduler::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub solutions: u64,
    pub completed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub stopped: StopReason,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} steps, {} solutions, {} completed, {} failed, {} aborted ({:?})",
            self.steps, self.solutions, self.completed, self.failed, self.aborted, self.stopped
        )
    }
}

/// Drives the intentions of a set of agents sharing one [`Env`].
#[derive(Debug)]
pub struct Scheduler {
    env: Env,
    agents: Vec<Agent>,
    config: SchedulerConfig,
    next_agent: usize,
    steps: u64,
    solutions: u64,
}

impl Scheduler {
    pub fn new(env: Env, config: SchedulerConfig) -> Self {
        Self {
            env,
            agents: Vec::new(),
            config,
            next_agent: 0,
            steps: 0,
            solutions: 0,
        }
    }

    pub fn add_agent(&mut self, agent: Agent) -> AgentId {
        let id = agent.id();
        tracing::debug!(agent = %id, name = agent.name(), "agent added");
        self.agents.push(agent);
        id
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id() == id)
    }

    /// Dispatched steps so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Total live intentions across all agents.
    pub fn intention_count(&self) -> usize {
        self.agents.iter().map(|a| a.intentions.len()).sum()
    }

    pub fn step(&mut self) -> StepOutcome {
        self.step_at(Instant::now())
    }

    /// Run one step, treating `now` as the current time for deadlines.
    pub fn step_at(&mut self, now: Instant) -> StepOutcome {
        if self.env.is_shutdown() {
            return StepOutcome::Shutdown;
        }
        let Some((agent_index, position)) = self.select(now) else {
            return self.idle_outcome();
        };
        self.next_agent = (agent_index + 1) % self.agents.len();
        self.steps += 1;

        let agent = &mut self.agents[agent_index];
        let agent_id = agent.id();
        let Some(mut active) = agent.intentions.remove(position) else {
            return StepOutcome::NoIntentions;
        };
        let intention_id = active.id();
        tracing::debug!(agent = %agent_id, intention = %intention_id, step = self.steps, "step");

        let ActiveIntention {
            intention, query, ..
        } = &mut active;
        let mut cx = ExecContext::new(&self.env, agent, intention);
        let resumed = query.resume(&mut cx);

        let outcome = match resumed {
            Ok(Resume::Solution) => {
                active.solutions += 1;
                self.solutions += 1;
                if active.policy == GoalPolicy::First {
                    Self::finished(agent_id, &active)
                } else {
                    StepOutcome::Solution {
                        agent: agent_id,
                        intention: intention_id,
                    }
                }
            }
            Ok(Resume::Suspended) => StepOutcome::Suspended {
                agent: agent_id,
                intention: intention_id,
            },
            Ok(Resume::Exhausted) => Self::finished(agent_id, &active),
            Err(error) => {
                tracing::warn!(
                    agent = %agent_id,
                    intention = %intention_id,
                    goal = %active.goal,
                    error = %error,
                    "intention aborted"
                );
                StepOutcome::Aborted {
                    agent: agent_id,
                    intention: intention_id,
                    error,
                }
            }
        };

        if matches!(outcome, StepOutcome::Solution { .. } | StepOutcome::Suspended { .. }) {
            agent.intentions.push_back(active);
        }
        outcome
    }

    /// Round-robin choice of the next runnable intention, as
    /// `(agent index, queue position)`.
    fn select(&mut self, now: Instant) -> Option<(usize, usize)> {
        let (count, start) = (self.agents.len(), self.next_agent);
        (0..count)
            .map(|offset| (start + offset) % count)
            .find_map(|index| {
                self.agents[index]
                    .intentions
                    .iter_mut()
                    .position(|active| active.intention.wake(now))
                    .map(|position| (index, position))
            })
    }

    fn idle_outcome(&self) -> StepOutcome {
        if self.intention_count() == 0 {
            return StepOutcome::NoIntentions;
        }
        let next_deadline = self
            .agents
            .iter()
            .flat_map(|a| a.intentions.iter())
            .filter_map(|active| active.intention.wait_until)
            .min();
        StepOutcome::Idle { next_deadline }
    }

    fn finished(agent: AgentId, active: &ActiveIntention) -> StepOutcome {
        let intention = active.id();
        if active.solutions > 0 {
            tracing::info!(agent = %agent, intention = %intention, goal = %active.goal, solutions = active.solutions, "goal achieved");
            StepOutcome::Completed {
                agent,
                intention,
                solutions: active.solutions,
            }
        } else {
            tracing::info!(agent = %agent, intention = %intention, goal = %active.goal, "goal failed");
            StepOutcome::Failed { agent, intention }
        }
    }

    /// Step until shutdown, the step limit, or no intentions remain.
    pub fn run(&mut self) -> RunSummary {
        let (start, start_solutions) = (self.steps, self.solutions);
        let mut summary = RunSummary {
            steps: 0,
            solutions: 0,
            completed: 0,
            failed: 0,
            aborted: 0,
            stopped: StopReason::NoIntentions,
        };
        loop {
            if self
                .config
                .max_steps
                .is_some_and(|max| self.steps - start >= max)
            {
                summary.stopped = StopReason::StepLimit;
                break;
            }
            match self.step() {
                StepOutcome::Shutdown => {
                    summary.stopped = StopReason::Shutdown;
                    break;
                }
                StepOutcome::NoIntentions => {
                    summary.stopped = StopReason::NoIntentions;
                    break;
                }
                StepOutcome::Idle { next_deadline } => {
                    let now = Instant::now();
                    let pause = next_deadline
                        .map(|deadline| deadline.saturating_duration_since(now))
                        .map_or(self.config.idle_poll, |d| d.min(self.config.idle_poll));
                    std::thread::sleep(pause);
                }
                StepOutcome::Solution { .. } | StepOutcome::Suspended { .. } => {}
                StepOutcome::Completed { .. } => summary.completed += 1,
                StepOutcome::Failed { .. } => summary.failed += 1,
                StepOutcome::Aborted { .. } => summary.aborted += 1,
            }
        }
        summary.steps = self.steps - start;
        summary.solutions = self.solutions - start_solutions;
        tracing::info!(%summary, "scheduler stopped");
        summary
    }
}
