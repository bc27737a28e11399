use std::path::{Path, PathBuf};

use tracing::debug;

use super::env::{apply_overrides, EnvSource, ProcessEnv, PARAMS_VAR};
use super::loader::load_entries;
use super::run_config::RunConfig;
use crate::error::ConfigError;

/// Directory every configuration file must live under.
pub const DEFAULT_BASE_DIR: &str = "./roborumble";

/// Configuration file used when neither an argument nor `PARAMS` names one.
pub const DEFAULT_CONFIG_PATH: &str = "./roborumble/roborumble.txt";

/// Where the candidate configuration path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Argument,
    Environment,
    Default,
}

/// Output of a successful resolution.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: RunConfig,
    /// Canonical absolute path of the file the configuration came from.
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Finds, validates, and loads the run configuration.
///
/// The candidate path comes from the explicit argument, then the `PARAMS`
/// environment variable, then [`DEFAULT_CONFIG_PATH`]. It must canonicalize
/// to a location inside the trusted base directory; anything else is
/// rejected before a single key is read.
pub struct ConfigResolver<E: EnvSource = ProcessEnv> {
    base_dir: PathBuf,
    default_path: PathBuf,
    env: E,
}

impl ConfigResolver<ProcessEnv> {
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }
}

impl Default for ConfigResolver<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> ConfigResolver<E> {
    pub fn with_env(env: E) -> Self {
        ConfigResolver {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            default_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            env,
        }
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = path.into();
        self
    }

    /// Pick the configuration path to use, before any validation.
    /// Nothing is written to stdout here.
    pub fn candidate_path(&self, arg: Option<&Path>) -> (PathBuf, ConfigSource) {
        if let Some(path) = arg {
            return (path.to_path_buf(), ConfigSource::Argument);
        }
        if let Some(path) = self.env.var(PARAMS_VAR) {
            debug!(path = %path, "config path taken from {PARAMS_VAR}");
            return (PathBuf::from(path), ConfigSource::Environment);
        }
        debug!(path = %self.default_path.display(), "no config path given, using default");
        (self.default_path.clone(), ConfigSource::Default)
    }

    /// Canonicalize `candidate` and check that it lies inside the base
    /// directory. Containment is compared by path components.
    pub fn contain(&self, candidate: &Path) -> Result<PathBuf, ConfigError> {
        let canonical = candidate
            .canonicalize()
            .map_err(|e| ConfigError::Canonicalize {
                path: candidate.to_path_buf(),
                source: e,
            })?;
        let base = self
            .base_dir
            .canonicalize()
            .map_err(|e| ConfigError::BaseDir {
                path: self.base_dir.clone(),
                source: e,
            })?;

        if !canonical.starts_with(&base) {
            return Err(ConfigError::PathTraversal {
                path: canonical,
                base,
            });
        }
        Ok(canonical)
    }

    /// Resolve, validate, load, and apply environment overrides.
    pub fn resolve(&self, arg: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        let (candidate, source) = self.candidate_path(arg);
        let path = self.contain(&candidate)?;

        let mut entries = load_entries(&path)?;
        apply_overrides(&mut entries, &self.env);
        debug!(path = %path.display(), keys = entries.len(), "configuration loaded");

        Ok(ResolvedConfig {
            config: entries.into_iter().collect(),
            path,
            source,
        })
    }
}
