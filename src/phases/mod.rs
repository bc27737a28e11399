//! The collaborators the orchestrator drives: fetching participants and
//! artifacts, preparing and running trials, and publishing results.
//!
//! The loop only talks to these traits. [`CommandCollaborators`] is the
//! shipped implementation; tests substitute recording fakes.

mod command;

use crate::config::RunConfig;
use crate::error::PhaseError;

pub use command::{
    command_keys, CommandCollaborators, CommandEngine, CommandFetcher, CommandPublisher,
};

/// How the work list for an iteration is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListStrategy {
    /// Many participants per trial.
    Melee,
    /// Pairings prioritized from previously fetched ratings.
    Smart,
    /// Plain pairwise list.
    Default,
}

impl ListStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ListStrategy::Melee => "melee",
            ListStrategy::Smart => "smart",
            ListStrategy::Default => "default",
        }
    }

    /// Kind of trial the list feeds.
    pub fn trial_kind(self) -> TrialKind {
        match self {
            ListStrategy::Melee => TrialKind::Melee,
            ListStrategy::Smart | ListStrategy::Default => TrialKind::Pairwise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialKind {
    Melee,
    Pairwise,
}

impl TrialKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TrialKind::Melee => "melee",
            TrialKind::Pairwise => "pairwise",
        }
    }
}

/// Per-call execution parameters handed to [`TrialEngine::run_trials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionParams {
    pub parallel: bool,
    /// Seed forwarded to the engine; `None` forwards no seed at all.
    pub random_seed: Option<u64>,
}

impl ExecutionParams {
    /// The parameters the orchestrator forces for every execute phase.
    pub const fn sequential_unseeded() -> Self {
        ExecutionParams {
            parallel: false,
            random_seed: None,
        }
    }
}

/// Downloads participants and artifacts and keeps the server's participant
/// list tidy.
pub trait Fetcher {
    /// Fetch the current ratings. Returns whether they were fetched.
    fn fetch_ratings(&mut self) -> Result<bool, PhaseError>;
    /// Fetch the participants list. Returns whether it was fetched.
    fn fetch_participants(&mut self) -> Result<bool, PhaseError>;
    fn fetch_missing_artifacts(&mut self) -> Result<(), PhaseError>;
    fn refresh_artifact_sizes(&mut self) -> Result<(), PhaseError>;
    /// Ask the server to drop participants no longer in the list.
    fn prune_stale_participants(&mut self) -> Result<(), PhaseError>;
}

/// Builds work lists and runs trials locally.
pub trait TrialEngine {
    /// Version string the engine reports, if any.
    fn version(&mut self) -> Result<Option<String>, PhaseError>;
    /// Build the work list. Returns whether there is work to run.
    fn prepare_list(&mut self, strategy: ListStrategy) -> Result<bool, PhaseError>;
    fn run_trials(&mut self, kind: TrialKind, params: &ExecutionParams) -> Result<(), PhaseError>;
}

/// Sends results upstream and triggers the remote ratings update.
pub trait Publisher {
    fn upload_results(&mut self) -> Result<(), PhaseError>;
    /// Returns whether the remote ratings update succeeded.
    fn update_ratings(&mut self) -> Result<bool, PhaseError>;
}

/// Factory for the per-iteration collaborator handles.
pub trait Collaborators {
    type Engine: TrialEngine;
    type Fetcher: Fetcher;
    type Publisher: Publisher;

    fn bind_engine(&mut self, game: &str, config: &RunConfig) -> Self::Engine;
    fn fetcher(&mut self, game: &str, config: &RunConfig) -> Self::Fetcher;
    fn publisher(&mut self, game: &str, config: &RunConfig, version: &str) -> Self::Publisher;
}
