use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tracing::{debug, warn};

use super::{Collaborators, ExecutionParams, Fetcher, ListStrategy, Publisher, TrialEngine, TrialKind};
use crate::config::RunConfig;
use crate::error::PhaseError;

/// Configuration keys naming the command for each step.
pub mod command_keys {
    pub const VERSION: &str = "COMMAND.VERSION";
    pub const RATINGS: &str = "COMMAND.RATINGS";
    pub const PARTICIPANTS: &str = "COMMAND.PARTICIPANTS";
    pub const ARTIFACTS: &str = "COMMAND.ARTIFACTS";
    pub const SIZES: &str = "COMMAND.SIZES";
    pub const PRUNE: &str = "COMMAND.PRUNE";
    pub const LIST: &str = "COMMAND.LIST";
    pub const TRIALS: &str = "COMMAND.TRIALS";
    pub const UPLOAD: &str = "COMMAND.UPLOAD";
    pub const UPDATE_RATINGS: &str = "COMMAND.UPDATERATINGS";
}

/// Collaborators that run one external command per step.
///
/// A boolean step succeeds iff its command exits 0; an unconfigured one
/// reports `false`. Unconfigured unit steps are skipped and non-zero exits
/// are only logged. A command that cannot be started is an error.
#[derive(Debug, Clone)]
pub struct CommandCollaborators {
    config_path: PathBuf,
}

impl CommandCollaborators {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        CommandCollaborators {
            config_path: config_path.into(),
        }
    }

    fn context(&self, game: &str, config: &RunConfig) -> CommandContext {
        CommandContext {
            game: game.to_string(),
            config_path: self.config_path.clone(),
            config: config.clone(),
        }
    }
}

impl Collaborators for CommandCollaborators {
    type Engine = CommandEngine;
    type Fetcher = CommandFetcher;
    type Publisher = CommandPublisher;

    fn bind_engine(&mut self, game: &str, config: &RunConfig) -> CommandEngine {
        CommandEngine {
            ctx: self.context(game, config),
        }
    }

    fn fetcher(&mut self, game: &str, config: &RunConfig) -> CommandFetcher {
        CommandFetcher {
            ctx: self.context(game, config),
        }
    }

    fn publisher(&mut self, game: &str, config: &RunConfig, version: &str) -> CommandPublisher {
        CommandPublisher {
            ctx: self.context(game, config),
            version: version.to_string(),
        }
    }
}

struct CommandContext {
    game: String,
    config_path: PathBuf,
    config: RunConfig,
}

impl CommandContext {
    fn build(
        &self,
        step: &'static str,
        key: &str,
        env: &[(&str, String)],
    ) -> Result<Option<(String, Command)>, PhaseError> {
        let Some(line) = self.config.get(key) else {
            debug!(step, key, "no command configured");
            return Ok(None);
        };
        let mut parts = line.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(PhaseError::Step {
                step,
                message: format!("{key} is empty"),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(parts);
        cmd.env("RUMBLE_GAME", &self.game);
        cmd.env("RUMBLE_CONFIG", &self.config_path);
        for (name, value) in env {
            cmd.env(name, value);
        }
        Ok(Some((line.to_string(), cmd)))
    }

    fn status(
        &self,
        step: &'static str,
        key: &str,
        env: &[(&str, String)],
    ) -> Result<Option<ExitStatus>, PhaseError> {
        let Some((line, mut cmd)) = self.build(step, key, env)? else {
            return Ok(None);
        };
        debug!(step, command = %line, "running");
        let status = cmd.status().map_err(|e| PhaseError::Spawn {
            step,
            command: line,
            source: e,
        })?;
        Ok(Some(status))
    }

    /// Run a step whose outcome is a success flag.
    fn run_flag(
        &self,
        step: &'static str,
        key: &str,
        env: &[(&str, String)],
    ) -> Result<bool, PhaseError> {
        Ok(match self.status(step, key, env)? {
            Some(status) => {
                if !status.success() {
                    warn!(step, %status, "command reported failure");
                }
                status.success()
            }
            None => false,
        })
    }

    /// Run a step whose failure is logged and otherwise ignored.
    fn run_unit(
        &self,
        step: &'static str,
        key: &str,
        env: &[(&str, String)],
    ) -> Result<(), PhaseError> {
        if let Some(status) = self.status(step, key, env)? {
            if !status.success() {
                warn!(step, %status, "command failed, continuing");
            }
        }
        Ok(())
    }
}

/// Engine handle backed by `COMMAND.VERSION`, `COMMAND.LIST` and
/// `COMMAND.TRIALS`.
pub struct CommandEngine {
    ctx: CommandContext,
}

impl TrialEngine for CommandEngine {
    fn version(&mut self) -> Result<Option<String>, PhaseError> {
        let Some((line, mut cmd)) = self.ctx.build("version", command_keys::VERSION, &[])? else {
            return Ok(None);
        };
        let output = cmd.output().map_err(|e| PhaseError::Spawn {
            step: "version",
            command: line,
            source: e,
        })?;
        if !output.status.success() {
            warn!(status = %output.status, "version command failed");
            return Ok(None);
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!version.is_empty()).then_some(version))
    }

    fn prepare_list(&mut self, strategy: ListStrategy) -> Result<bool, PhaseError> {
        self.ctx.run_flag(
            "prepare list",
            command_keys::LIST,
            &[("RUMBLE_LIST", strategy.as_str().to_string())],
        )
    }

    fn run_trials(&mut self, kind: TrialKind, params: &ExecutionParams) -> Result<(), PhaseError> {
        let seed = params
            .random_seed
            .map_or_else(|| "none".to_string(), |s| s.to_string());
        self.ctx.run_unit(
            "trials",
            command_keys::TRIALS,
            &[
                ("RUMBLE_TRIALS", kind.as_str().to_string()),
                ("RUMBLE_PARALLEL", params.parallel.to_string()),
                ("RUMBLE_RANDOMSEED", seed),
            ],
        )
    }
}

pub struct CommandFetcher {
    ctx: CommandContext,
}

impl Fetcher for CommandFetcher {
    fn fetch_ratings(&mut self) -> Result<bool, PhaseError> {
        self.ctx.run_flag("ratings fetch", command_keys::RATINGS, &[])
    }

    fn fetch_participants(&mut self) -> Result<bool, PhaseError> {
        self.ctx.run_flag("participants fetch", command_keys::PARTICIPANTS, &[])
    }

    fn fetch_missing_artifacts(&mut self) -> Result<(), PhaseError> {
        self.ctx.run_unit("artifacts fetch", command_keys::ARTIFACTS, &[])
    }

    fn refresh_artifact_sizes(&mut self) -> Result<(), PhaseError> {
        self.ctx.run_unit("size refresh", command_keys::SIZES, &[])
    }

    fn prune_stale_participants(&mut self) -> Result<(), PhaseError> {
        self.ctx.run_unit("prune", command_keys::PRUNE, &[])
    }
}

pub struct CommandPublisher {
    ctx: CommandContext,
    version: String,
}

impl Publisher for CommandPublisher {
    fn upload_results(&mut self) -> Result<(), PhaseError> {
        self.ctx.run_unit(
            "upload",
            command_keys::UPLOAD,
            &[("RUMBLE_VERSION", self.version.clone())],
        )
    }

    fn update_ratings(&mut self) -> Result<bool, PhaseError> {
        self.ctx.run_flag("ratings update", command_keys::UPDATE_RATINGS, &[])
    }
}
