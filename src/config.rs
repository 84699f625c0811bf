//! System files: agents, their initial beliefs, rules and goals, plus
//! scheduler settings.
//!
//! TOML by default, JSON for a `.json` extension. Terms use an externally
//! tagged form:
//!
//! ```toml
//! [scheduler]
//! max_steps = 1000
//! idle_poll_ms = 5
//!
//! [[agents]]
//! name = "counter"
//! beliefs = [ { lit = { functor = "foo", args = [ { int = 1 } ] } } ]
//! goals = [ { goal = { lit = { functor = "foo", args = [ { var = "X" } ] } }, policy = "all" } ]
//! ```
//!
//! Variable names are scoped to a single belief, rule or goal; `_` is always
//! a fresh variable.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, GoalPolicy};
use crate::beliefs::Rule;
use crate::env::Env;
use crate::error::{ConfigError, ConfigResult};
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::term::{Term, Var};

/// A term in tagged form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSpec {
    Var(String),
    Atom(String),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<TermSpec>),
    Lit(LiteralSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralSpec {
    pub functor: String,
    #[serde(default)]
    pub args: Vec<TermSpec>,
    #[serde(default)]
    pub annots: Vec<TermSpec>,
}

/// Variable names seen while building one term group.
type VarNames = HashMap<String, Var>;

impl TermSpec {
    /// Build a standalone term with its own variable namespace.
    pub fn to_term(&self) -> ConfigResult<Term> {
        self.build(&mut VarNames::new())
    }

    fn build(&self, vars: &mut VarNames) -> ConfigResult<Term> {
        Ok(match self {
            TermSpec::Var(name) if name == "_" => Term::var(),
            TermSpec::Var(name) => Term::Var(*vars.entry(name.clone()).or_insert_with(Var::fresh)),
            TermSpec::Atom(name) => {
                if name.is_empty() {
                    return Err(ConfigError::InvalidTerm {
                        message: "empty atom".into(),
                    });
                }
                Term::atom(name)
            }
            TermSpec::Int(value) => Term::int(*value),
            TermSpec::Float(value) => Term::float(*value),
            TermSpec::Str(text) => Term::string(text),
            TermSpec::Seq(items) => Term::seq(
                items
                    .iter()
                    .map(|item| item.build(vars))
                    .collect::<ConfigResult<Vec<_>>>()?,
            ),
            TermSpec::Lit(lit) => {
                if lit.functor.is_empty() {
                    return Err(ConfigError::InvalidTerm {
                        message: "literal with empty functor".into(),
                    });
                }
                let args = lit
                    .args
                    .iter()
                    .map(|a| a.build(vars))
                    .collect::<ConfigResult<Vec<_>>>()?;
                let annots = lit
                    .annots
                    .iter()
                    .map(|a| a.build(vars))
                    .collect::<ConfigResult<Vec<_>>>()?;
                Term::annotated(&lit.functor, args, annots)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub head: TermSpec,
    pub body: TermSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub goal: TermSpec,
    #[serde(default)]
    pub policy: GoalPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    #[serde(default)]
    pub beliefs: Vec<TermSpec>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
}

impl AgentSpec {
    /// Build the agent with its beliefs, rules and adopted goals.
    pub fn build(&self) -> ConfigResult<Agent> {
        let mut agent = Agent::new(&self.name);
        for spec in &self.beliefs {
            let belief = spec.to_term()?;
            if belief.literal_group().is_none() {
                return Err(ConfigError::InvalidTerm {
                    message: format!("belief of agent {} is not a literal: {belief}", self.name),
                });
            }
            if !agent.beliefs.add(belief.clone()) {
                tracing::warn!(agent = %self.name, %belief, "skipping duplicate belief");
            }
        }
        for spec in &self.rules {
            let mut vars = VarNames::new();
            let rule = Rule::new(spec.head.build(&mut vars)?, spec.body.build(&mut vars)?);
            if !agent.beliefs.add_rule(rule.clone()) {
                return Err(ConfigError::InvalidTerm {
                    message: format!("rule head of agent {} is not a literal: {rule}", self.name),
                });
            }
        }
        for spec in &self.goals {
            agent.add_goal(spec.goal.to_term()?, spec.policy);
        }
        Ok(agent)
    }
}

fn default_idle_poll_ms() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default)]
    pub max_steps: Option<u64>,
    #[serde(default = "default_idle_poll_ms")]
    pub idle_poll_ms: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_steps: None,
            idle_poll_ms: default_idle_poll_ms(),
        }
    }
}

/// Contents of a system file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemFile {
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
}

impl SystemFile {
    /// Load from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let label = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: label.clone(),
            source: e,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content, &label),
            Some("json") => Self::from_json(&content, &label),
            _ => Err(ConfigError::UnsupportedFormat { path: label }),
        }
    }

    pub fn from_toml(content: &str, path: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.into(),
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &str, path: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.into(),
            message: e.to_string(),
        })
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            max_steps: self.scheduler.max_steps,
            idle_poll: Duration::from_millis(self.scheduler.idle_poll_ms),
        }
    }

    /// Build a scheduler over `env` holding every agent of the file.
    pub fn build_scheduler(&self, env: Env) -> ConfigResult<Scheduler> {
        let mut scheduler = Scheduler::new(env, self.scheduler_config());
        for spec in &self.agents {
            scheduler.add_agent(spec.build()?);
        }
        tracing::info!(
            agents = scheduler.agents().len(),
            intentions = scheduler.intention_count(),
            "system built"
        );
        Ok(scheduler)
    }
}
