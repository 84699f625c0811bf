// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # akh-bdi
//!
//! Execution core for BDI (belief-desire-intention) agents: unification
//! with trail-based backtracking, belief queries and a cooperative scheduler
//! interleaving intentions.
//!
//! ## Architecture
//!
//! - **Terms** (`term`, `scope`, `trail`, `unify`, `ground`): immutable terms,
//!   variable bindings and the undo log that makes backtracking cheap
//! - **Beliefs** (`beliefs`, `query`): facts and rules indexed by literal group,
//!   queried lazily with composite goals
//! - **Actions** (`action`, `stdlib`): registered operations, each a resumable
//!   solution sequence
//! - **Intentions** (`intention`, `agent`, `scheduler`): per-goal scope and
//!   trail, scheduled round-robin with deadline-based suspension
//! - **Systems** (`config`): agents and goals loaded from TOML or JSON
//!
//! ## Library usage
//!
//! ```no_run
//! use akh_bdi::agent::{Agent, GoalPolicy};
//! use akh_bdi::env::Env;
//! use akh_bdi::scheduler::{Scheduler, SchedulerConfig};
//! use akh_bdi::term::Term;
//!
//! let mut agent = Agent::new("counter");
//! let x = Term::var();
//! agent.add_goal(
//!     Term::literal("&", [
//!         Term::literal(".range", [x.clone(), Term::int(3)]),
//!         Term::literal(".print", [x]),
//!     ]),
//!     GoalPolicy::All,
//! );
//! let mut scheduler = Scheduler::new(Env::with_stdlib(), SchedulerConfig::default());
//! scheduler.add_agent(agent);
//! let summary = scheduler.run();
//! println!("{summary}");
//! ```

pub mod action;
pub mod agent;
pub mod beliefs;
pub mod config;
pub mod env;
pub mod error;
pub mod exec;
pub mod ground;
pub mod intention;
pub mod printer;
pub mod query;
pub mod scheduler;
pub mod scope;
pub mod stdlib;
pub mod term;
pub mod trail;
pub mod unify;
