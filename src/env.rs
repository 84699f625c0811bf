//! Process-wide execution environment.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::action::ActionRegistry;
use crate::printer::Printer;
use crate::stdlib;

/// Shared context for every agent: the action registry, the output printer
/// and the shutdown flag.
///
/// Once shutdown is requested the scheduler dispatches no further steps.
#[derive(Debug)]
pub struct Env {
    shutdown: Arc<AtomicBool>,
    actions: ActionRegistry,
    printer: Printer,
}

impl Env {
    /// An environment with no actions registered, printing to stdout.
    pub fn new() -> Self {
        Self::with_actions(ActionRegistry::new())
    }

    /// An environment with the standard action library.
    pub fn with_stdlib() -> Self {
        let mut actions = ActionRegistry::new();
        stdlib::register(&mut actions);
        Self::with_actions(actions)
    }

    pub fn with_actions(actions: ActionRegistry) -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            actions,
            printer: Printer::stdout(),
        }
    }

    /// Replace the printer, e.g. with [`Printer::buffered`] in tests.
    pub fn with_printer(mut self, printer: Printer) -> Self {
        self.printer = printer;
        self
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    /// Request shutdown.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            tracing::info!("shutdown requested");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// The raw flag, for registration with signal handlers.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_is_sticky_and_shared() {
        let env = Env::new();
        let flag = env.shutdown_flag();
        assert!(!env.is_shutdown());
        env.shutdown();
        env.shutdown();
        assert!(env.is_shutdown());
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn external_flag_is_observed() {
        let env = Env::new();
        env.shutdown_flag().store(true, Ordering::SeqCst);
        assert!(env.is_shutdown());
    }

    #[test]
    fn stdlib_registers_actions() {
        let env = Env::with_stdlib();
        assert!(env.actions().lookup(".range", 2).is_some());
        assert!(Env::new().actions().is_empty());
    }
}
