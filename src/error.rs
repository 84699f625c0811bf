//! Rich diagnostic error types for the akh-bdi engine.
//!
//! Unification and query failure are *not* errors: they surface as an empty
//! solution sequence. The types here cover hard errors only, which abort the
//! goal being evaluated and are reported to whatever drives the intention.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the akh-bdi engine.
#[derive(Debug, Error, Diagnostic)]
pub enum BdiError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("insufficiently instantiated: {term}")]
    #[diagnostic(
        code(akh::engine::instantiation),
        help(
            "A concrete value was required but the term still contains unbound variables. \
             Bind the variables before this goal, e.g. by querying a belief first."
        )
    )]
    Instantiation { term: String },

    #[error("{action}: expected {expected}, found {found}")]
    #[diagnostic(
        code(akh::engine::type_mismatch),
        help("The action requires an argument of a specific kind. Check the goal's arguments.")
    )]
    TypeMismatch {
        action: String,
        expected: String,
        found: String,
    },

    #[error("{action}: {message}")]
    #[diagnostic(
        code(akh::engine::precondition),
        help("An argument violated the action's precondition (range, sign or emptiness).")
    )]
    Precondition { action: String, message: String },

    #[error("unknown action: {name}/{arity}")]
    #[diagnostic(
        code(akh::engine::unknown_action),
        help(
            "No action is registered under this name and arity. \
             List the registered actions with `akh-bdi actions`."
        )
    )]
    UnknownAction { name: String, arity: usize },

    #[error("not a goal: {goal}")]
    #[diagnostic(
        code(akh::engine::invalid_goal),
        help("Goals must be atoms or literals (or variables bound to one).")
    )]
    InvalidGoal { goal: String },

    #[error("choicepoint {choicepoint} is not on the trail")]
    #[diagnostic(
        code(akh::engine::choicepoint),
        help(
            "A choicepoint was rerolled twice or after an outer choicepoint already \
             removed it. This is a bug in the action that owns the choicepoint."
        )
    )]
    ChoicepointNotFound { choicepoint: u64 },
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read system file: {path}")]
    #[diagnostic(
        code(akh::config::read),
        help("Ensure the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse system file {path}: {message}")]
    #[diagnostic(
        code(akh::config::parse),
        help("Check the file syntax. Terms use the tagged form, e.g. `{{ int = 1 }}`.")
    )]
    Parse { path: String, message: String },

    #[error("unsupported system file format: {path}")]
    #[diagnostic(
        code(akh::config::format),
        help("Use a `.toml` or `.json` file.")
    )]
    UnsupportedFormat { path: String },

    #[error("invalid term: {message}")]
    #[diagnostic(
        code(akh::config::invalid_term),
        help("Literal functors must be non-empty.")
    )]
    InvalidTerm { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for results using the top-level error type.
pub type BdiResult<T> = std::result::Result<T, BdiError>;
