use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::state::{OrchestrationState, RatingsStatus};
use super::strategy::select_strategy;
use super::throttle::{FetchThrottle, FETCH_INTERVAL};
use crate::config::{ResolvedConfig, RunConfig, RunFlags, RunOnly};
use crate::error::PhaseError;
use crate::phases::{
    Collaborators, ExecutionParams, Fetcher, ListStrategy, Publisher, TrialEngine, TrialKind,
};

/// Knobs that are not part of the run configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Stop after this many iterations even when `ITERATE` is `YES`.
    pub max_iterations: Option<u64>,
    pub fetch_interval: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        OrchestratorOptions {
            max_iterations: None,
            fetch_interval: FETCH_INTERVAL,
        }
    }
}

/// What happened during one iteration. `None` means the step was not
/// attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationReport {
    pub iteration: u64,
    pub ratings_fetched: Option<bool>,
    pub participants_fetched: Option<bool>,
    pub pruned: bool,
    pub strategy: Option<ListStrategy>,
    pub list_ready: Option<bool>,
    pub trials_run: bool,
    pub uploaded: bool,
    pub ratings_updated: Option<bool>,
}

/// Drives the fetch / execute / upload cycle.
pub struct Orchestrator<C: Collaborators, K: Clock = SystemClock> {
    config: RunConfig,
    flags: RunFlags,
    state: OrchestrationState,
    throttle: FetchThrottle,
    options: OrchestratorOptions,
    collaborators: C,
    clock: K,
}

impl<C: Collaborators> Orchestrator<C, SystemClock> {
    pub fn new(resolved: ResolvedConfig, collaborators: C) -> Self {
        Self::with_clock(resolved.config, &resolved.path, collaborators, SystemClock)
    }
}

impl<C: Collaborators, K: Clock> Orchestrator<C, K> {
    pub fn with_clock(config: RunConfig, config_path: &Path, collaborators: C, clock: K) -> Self {
        let flags = RunFlags::from_config(&config);
        let options = OrchestratorOptions::default();
        Orchestrator {
            config,
            flags,
            state: OrchestrationState::for_config_path(config_path),
            throttle: FetchThrottle::new(options.fetch_interval),
            options,
            collaborators,
            clock,
        }
    }

    pub fn options(mut self, options: OrchestratorOptions) -> Self {
        self.throttle = FetchThrottle::new(options.fetch_interval);
        self.options = options;
        self
    }

    pub fn flags(&self) -> &RunFlags {
        &self.flags
    }

    pub fn state(&self) -> &OrchestrationState {
        &self.state
    }

    /// Run iterations until `ITERATE` says stop or the iteration cap is hit.
    /// Returns the number of completed iterations. Collaborator errors end
    /// the run and are returned as-is.
    pub fn run(&mut self) -> Result<u64, PhaseError> {
        info!(
            game = %self.state.game_identifier,
            flags = ?self.flags,
            "starting rumble client"
        );

        loop {
            if let Some(max) = self.options.max_iterations {
                if self.state.iteration_count >= max {
                    info!(max, "iteration cap reached");
                    break;
                }
            }

            let report = self.run_iteration()?;
            debug!(?report, "iteration finished");

            if !self.flags.iterate {
                break;
            }
        }

        Ok(self.state.iteration_count)
    }

    /// Run one loop body: engine bind, fetch, execute, upload.
    pub fn run_iteration(&mut self) -> Result<IterationReport, PhaseError> {
        let mut report = IterationReport {
            iteration: self.state.iteration_count,
            ..Default::default()
        };

        let mut engine = self
            .collaborators
            .bind_engine(&self.state.game_identifier, &self.config);
        if self.state.engine_version.is_none() && self.state.capture_version(engine.version()?) {
            info!(version = ?self.state.engine_version, "engine version captured");
        }

        println!("Iteration number {}", self.state.iteration_count);

        if self.flags.download {
            self.fetch_phase(&mut report)?;
        }
        if self.flags.execute {
            self.execute_phase(&mut engine, &mut report)?;
        }
        if self.flags.upload {
            self.upload_phase(&mut report)?;
        }

        self.state.iteration_count += 1;
        Ok(report)
    }

    fn fetch_phase(&mut self, report: &mut IterationReport) -> Result<(), PhaseError> {
        let mut fetcher = self
            .collaborators
            .fetcher(&self.state.game_identifier, &self.config);

        if self.flags.run_only == RunOnly::Server {
            let fetched = fetcher.fetch_ratings()?;
            self.state.ratings = RatingsStatus::Fetched(fetched);
            report.ratings_fetched = Some(fetched);
        }

        let now = self.clock.now_millis();
        if !self.throttle.is_open(self.state.last_fetch_ms, now) {
            debug!(last_fetch_ms = ?self.state.last_fetch_ms, now, "participants fetch throttled");
            return Ok(());
        }

        let participants = fetcher.fetch_participants()?;
        self.state.participants_fetched = participants;
        report.participants_fetched = Some(participants);

        println!("Downloading missing participants ...");
        fetcher.fetch_missing_artifacts()?;
        fetcher.refresh_artifact_sizes()?;

        if self.state.ratings.is_fresh() && self.state.participants_fetched {
            println!("Removing old participants from server ...");
            fetcher.prune_stale_participants()?;
            report.pruned = true;
        }

        self.state.last_fetch_ms = Some(self.clock.now_millis());
        Ok(())
    }

    fn execute_phase(
        &mut self,
        engine: &mut C::Engine,
        report: &mut IterationReport,
    ) -> Result<(), PhaseError> {
        let strategy = select_strategy(
            self.flags.melee,
            self.flags.run_only,
            self.state.ratings.is_fresh(),
        );
        report.strategy = Some(strategy);

        match strategy {
            ListStrategy::Melee => println!("Preparing melee trial list ..."),
            ListStrategy::Smart => println!("Preparing trial list using smart selection ..."),
            ListStrategy::Default => println!("Preparing trial list ..."),
        }
        let ready = engine.prepare_list(strategy)?;
        report.list_ready = Some(ready);
        if !ready {
            debug!(strategy = strategy.as_str(), "work list not ready, skipping trials");
            return Ok(());
        }

        let kind = strategy.trial_kind();
        match kind {
            TrialKind::Melee => println!("Executing melee trials ..."),
            TrialKind::Pairwise => println!("Executing trials ..."),
        }
        engine.run_trials(kind, &ExecutionParams::sequential_unseeded())?;
        report.trials_run = true;
        Ok(())
    }

    fn upload_phase(&mut self, report: &mut IterationReport) -> Result<(), PhaseError> {
        let Some(version) = self.state.engine_version.clone() else {
            debug!("no engine version captured yet, skipping upload");
            return Ok(());
        };

        println!("Uploading results ...");
        let mut publisher =
            self.collaborators
                .publisher(&self.state.game_identifier, &self.config, &version);
        publisher.upload_results()?;
        report.uploaded = true;

        println!("Updating ratings ...");
        let updated = publisher.update_ratings()?;
        self.state.ratings = RatingsStatus::Recomputed(updated);
        report.ratings_updated = Some(updated);
        Ok(())
    }
}
