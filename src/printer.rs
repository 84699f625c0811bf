//! Agent-tagged console output for the `.print` action.
//!
//! Each agent is assigned a colour pair the first time it prints; the
//! assignment is kept in a map keyed by [`AgentId`] for the lifetime of the
//! printer and never evicted.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossterm::style::{Color, Stylize};
use dashmap::DashMap;

use crate::agent::AgentId;

const PALETTE: [(Color, Color); 6] = [
    (Color::DarkGreen, Color::White),
    (Color::DarkMagenta, Color::White),
    (Color::DarkYellow, Color::Black),
    (Color::DarkBlue, Color::White),
    (Color::DarkCyan, Color::Black),
    (Color::DarkRed, Color::White),
];

enum Sink {
    Stdout,
    Buffer(Vec<String>),
}

/// Where `.print` output goes.
pub struct Printer {
    colors: DashMap<AgentId, usize>,
    next_color: AtomicUsize,
    sink: Mutex<Sink>,
}

impl Printer {
    /// Print coloured lines to standard output.
    pub fn stdout() -> Self {
        Self::with_sink(Sink::Stdout)
    }

    /// Collect plain lines in memory; read them back with [`Printer::take_lines`].
    pub fn buffered() -> Self {
        Self::with_sink(Sink::Buffer(Vec::new()))
    }

    fn with_sink(sink: Sink) -> Self {
        Self {
            colors: DashMap::new(),
            next_color: AtomicUsize::new(0),
            sink: Mutex::new(sink),
        }
    }

    /// Palette index assigned to `agent`, allocating one on first use.
    pub fn color_index(&self, agent: AgentId) -> usize {
        *self.colors.entry(agent).or_insert_with(|| {
            self.next_color.fetch_add(1, Ordering::Relaxed) % PALETTE.len()
        })
    }

    /// Print one line attributed to `agent`.
    pub fn print(&self, agent: AgentId, name: &str, text: &str) {
        let color = self.color_index(agent);
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        match &mut *sink {
            Sink::Stdout => {
                let (bg, fg) = PALETTE[color];
                let tag = format!(" {name} ").with(fg).on(bg);
                let mut out = std::io::stdout().lock();
                if let Err(e) = writeln!(out, "{tag} {text}") {
                    tracing::warn!(error = %e, "failed to write .print output");
                }
            }
            Sink::Buffer(lines) => lines.push(format!("{name}: {text}")),
        }
    }

    /// Drain the lines collected by a buffered printer.
    pub fn take_lines(&self) -> Vec<String> {
        match self.sink.lock() {
            Ok(mut sink) => match &mut *sink {
                Sink::Buffer(lines) => std::mem::take(lines),
                Sink::Stdout => Vec::new(),
            },
            Err(_) => Vec::new(),
        }
    }
}

impl std::fmt::Debug for Printer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Printer")
            .field("agents", &self.colors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_are_stable_per_agent() {
        let printer = Printer::buffered();
        let (a, b) = (AgentId::fresh(), AgentId::fresh());
        let first = printer.color_index(a);
        let second = printer.color_index(b);
        assert_ne!(first, second);
        assert_eq!(printer.color_index(a), first);
    }

    #[test]
    fn buffered_lines_are_drained() {
        let printer = Printer::buffered();
        let a = AgentId::fresh();
        printer.print(a, "alice", "hello");
        printer.print(a, "alice", "world");
        assert_eq!(printer.take_lines(), ["alice: hello", "alice: world"]);
        assert!(printer.take_lines().is_empty());
    }
}
