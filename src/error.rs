use std::path::PathBuf;

/// Errors that can occur while resolving or loading the run configuration.
///
/// All of these are fatal: the client reports them and stops before any
/// phase runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot resolve config path {path}")]
    Canonicalize {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot resolve trusted base directory {path}")]
    BaseDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("blocked path traversal attempt: {path} is outside {base}")]
    PathTraversal { path: PathBuf, base: PathBuf },

    #[error("failed to read config file {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors surfaced by phase collaborators. The orchestrator never retries
/// these; it hands them back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    #[error("failed to spawn `{command}` for {step}")]
    Spawn {
        step: &'static str,
        command: String,
        source: std::io::Error,
    },

    #[error("{step} failed: {message}")]
    Step {
        step: &'static str,
        message: String,
    },
}
