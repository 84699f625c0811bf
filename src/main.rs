//! akh-bdi CLI: run BDI agent systems.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use signal_hook::consts::{SIGINT, SIGTERM};

use akh_bdi::config::SystemFile;
use akh_bdi::env::Env;

#[derive(Parser)]
#[command(name = "akh-bdi", version, about = "BDI agent execution engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a system file until its intentions are done or shutdown is requested.
    Run {
        /// Path to a `.toml` or `.json` system file.
        file: PathBuf,

        /// Stop after this many scheduling steps (overrides the file).
        #[arg(long)]
        max_steps: Option<u64>,
    },

    /// Load a system file and show its agents without running them.
    Check {
        /// Path to a `.toml` or `.json` system file.
        file: PathBuf,
    },

    /// List the registered actions.
    Actions,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, max_steps } => {
            let mut system = SystemFile::load(&file)?;
            if max_steps.is_some() {
                system.scheduler.max_steps = max_steps;
            }
            let env = Env::with_stdlib();
            for signal in [SIGINT, SIGTERM] {
                signal_hook::flag::register(signal, env.shutdown_flag()).into_diagnostic()?;
            }
            let mut scheduler = system.build_scheduler(env)?;
            let summary = scheduler.run();
            println!("{summary}");
        }

        Commands::Check { file } => {
            let system = SystemFile::load(&file)?;
            let scheduler = system.build_scheduler(Env::with_stdlib())?;
            let config = scheduler.config();
            match config.max_steps {
                Some(max) => println!("Scheduler: max {max} steps, idle poll {:?}", config.idle_poll),
                None => println!("Scheduler: unlimited steps, idle poll {:?}", config.idle_poll),
            }
            for agent in scheduler.agents() {
                println!(
                    "Agent \"{}\" ({} beliefs, {} rules, {} goals):",
                    agent.name(),
                    agent.beliefs.len(),
                    agent.beliefs.rule_count(),
                    agent.intentions.len()
                );
                for group in agent.beliefs.groups() {
                    for belief in agent.beliefs.lookup(group) {
                        println!("  belief  {belief}");
                    }
                    for rule in agent.beliefs.rules(group) {
                        println!("  rule    {rule}");
                    }
                }
                for active in &agent.intentions {
                    println!("  goal    {} ({:?})", active.goal, active.policy);
                }
            }
        }

        Commands::Actions => {
            let env = Env::with_stdlib();
            let keys = env.actions().keys();
            println!("Actions ({}):", keys.len());
            for key in keys {
                println!("  {key}");
            }
        }
    }

    Ok(())
}
