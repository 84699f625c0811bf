//! Agents: a belief base plus the intentions pursuing its goals.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::beliefs::BeliefBase;
use crate::intention::{Intention, IntentionId};
use crate::query::Query;
use crate::term::Term;

static NEXT_AGENT: AtomicU64 = AtomicU64::new(1);

/// Stable agent identity, used for diagnostics and output attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u64);

impl AgentId {
    pub fn fresh() -> Self {
        AgentId(NEXT_AGENT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent:{}", self.0)
    }
}

/// When an intention's goal counts as achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPolicy {
    /// The first solution satisfies the goal; the intention ends there.
    #[default]
    First,
    /// Every solution is produced; the intention ends on exhaustion.
    All,
}

/// An intention together with the goal it is running.
pub struct ActiveIntention {
    pub intention: Intention,
    pub goal: Term,
    pub policy: GoalPolicy,
    pub query: Query,
    pub solutions: usize,
}

impl ActiveIntention {
    pub fn new(goal: Term, policy: GoalPolicy) -> Self {
        Self {
            intention: Intention::new(),
            query: Query::new(goal.clone()),
            goal,
            policy,
            solutions: 0,
        }
    }

    pub fn id(&self) -> IntentionId {
        self.intention.id()
    }
}

impl std::fmt::Debug for ActiveIntention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveIntention")
            .field("id", &self.intention.id())
            .field("goal", &self.goal.to_string())
            .field("policy", &self.policy)
            .field("solutions", &self.solutions)
            .field("wait_until", &self.intention.wait_until)
            .finish()
    }
}

/// A reasoning agent.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    name: String,
    pub beliefs: BeliefBase,
    pub intentions: VecDeque<ActiveIntention>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AgentId::fresh(),
            name: name.into(),
            beliefs: BeliefBase::new(),
            intentions: VecDeque::new(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start pursuing `goal` in a new intention.
    pub fn add_goal(&mut self, goal: Term, policy: GoalPolicy) -> IntentionId {
        let active = ActiveIntention::new(goal, policy);
        let id = active.id();
        tracing::debug!(agent = %self.id, intention = %id, goal = %active.goal, "goal adopted");
        self.intentions.push_back(active);
        id
    }

    /// Drop an intention, discarding its state.
    pub fn drop_intention(&mut self, id: IntentionId) -> bool {
        let before = self.intentions.len();
        self.intentions.retain(|active| active.id() != id);
        before != self.intentions.len()
    }

    pub fn intention(&self, id: IntentionId) -> Option<&ActiveIntention> {
        self.intentions.iter().find(|active| active.id() == id)
    }

    /// Log every belief and rule at info level.
    pub fn dump(&self) {
        tracing::info!(agent = %self.id, name = %self.name, beliefs = self.beliefs.len(), "belief dump");
        for group in self.beliefs.groups() {
            for belief in self.beliefs.lookup(group) {
                tracing::info!(agent = %self.id, "{belief}");
            }
            for rule in self.beliefs.rules(group) {
                tracing::info!(agent = %self.id, "{rule}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agents_have_distinct_ids() {
        let a = Agent::new("a");
        let b = Agent::new("b");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), "a");
    }

    #[test]
    fn goals_become_intentions() {
        let mut agent = Agent::new("a");
        let first = agent.add_goal(Term::atom("g1"), GoalPolicy::First);
        let second = agent.add_goal(Term::atom("g2"), GoalPolicy::All);
        assert_eq!(agent.intentions.len(), 2);
        assert_eq!(agent.intention(second).unwrap().policy, GoalPolicy::All);

        assert!(agent.drop_intention(first));
        assert!(!agent.drop_intention(first));
        assert_eq!(agent.intentions.len(), 1);
    }
}
