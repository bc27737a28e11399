use std::path::Path;

/// Newest known fact about whether ratings are fresh, and which phase
/// produced it.
///
/// A ratings fetch and a remote ratings recomputation both answer the same
/// question for the next gating decision, so only the latest one counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatingsStatus {
    #[default]
    Unknown,
    Fetched(bool),
    Recomputed(bool),
}

impl RatingsStatus {
    pub fn is_fresh(self) -> bool {
        matches!(self, RatingsStatus::Fetched(true) | RatingsStatus::Recomputed(true))
    }
}

/// Cross-iteration state of one client run. Lives only as long as the
/// process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationState {
    pub(super) iteration_count: u64,
    pub(super) last_fetch_ms: Option<u64>,
    pub(super) ratings: RatingsStatus,
    pub(super) participants_fetched: bool,
    pub(super) engine_version: Option<String>,
    pub(super) game_identifier: String,
}

impl OrchestrationState {
    pub fn new(game_identifier: impl Into<String>) -> Self {
        OrchestrationState {
            iteration_count: 0,
            last_fetch_ms: None,
            ratings: RatingsStatus::Unknown,
            participants_fetched: false,
            engine_version: None,
            game_identifier: game_identifier.into(),
        }
    }

    pub fn for_config_path(path: &Path) -> Self {
        Self::new(game_identifier(path))
    }

    pub fn iteration_count(&self) -> u64 {
        self.iteration_count
    }

    pub fn last_fetch_ms(&self) -> Option<u64> {
        self.last_fetch_ms
    }

    pub fn ratings(&self) -> RatingsStatus {
        self.ratings
    }

    pub fn participants_fetched(&self) -> bool {
        self.participants_fetched
    }

    pub fn engine_version(&self) -> Option<&str> {
        self.engine_version.as_deref()
    }

    pub fn game_identifier(&self) -> &str {
        &self.game_identifier
    }

    /// Record the engine version unless one is already captured. Returns
    /// whether it was stored.
    pub(super) fn capture_version(&mut self, version: Option<String>) -> bool {
        if self.engine_version.is_some() {
            return false;
        }
        match version {
            Some(v) => {
                self.engine_version = Some(v);
                true
            }
            None => false,
        }
    }
}

/// Game identifier for a configuration file: the file name without any
/// directory and without everything from its first `.`.
pub fn game_identifier(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_identifier_strips_directories_and_extension() {
        assert_eq!(game_identifier(Path::new("a/b/rumble.txt")), "rumble");
        assert_eq!(game_identifier(Path::new("rumble.txt")), "rumble");
        assert_eq!(
            game_identifier(Path::new("/srv/roborumble/meleerumble.txt")),
            "meleerumble"
        );
    }

    #[test]
    fn test_game_identifier_cuts_at_first_dot() {
        assert_eq!(game_identifier(Path::new("./roborumble/teamrumble.v2.txt")), "teamrumble");
    }

    #[test]
    fn test_game_identifier_without_extension() {
        assert_eq!(game_identifier(Path::new("configs/twinduel")), "twinduel");
    }

    #[test]
    fn test_initial_state() {
        let state = OrchestrationState::for_config_path(Path::new("/x/rumble.txt"));
        assert_eq!(state.iteration_count(), 0);
        assert_eq!(state.last_fetch_ms(), None);
        assert_eq!(state.ratings(), RatingsStatus::Unknown);
        assert!(!state.participants_fetched());
        assert_eq!(state.engine_version(), None);
        assert_eq!(state.game_identifier(), "rumble");
    }

    #[test]
    fn test_version_is_captured_once() {
        let mut state = OrchestrationState::new("rumble");
        assert!(!state.capture_version(None));
        assert!(state.capture_version(Some("1.9.5.0".into())));
        assert!(!state.capture_version(Some("1.9.6.0".into())));
        assert_eq!(state.engine_version(), Some("1.9.5.0"));
    }

    #[test]
    fn test_ratings_freshness() {
        assert!(!RatingsStatus::Unknown.is_fresh());
        assert!(RatingsStatus::Fetched(true).is_fresh());
        assert!(!RatingsStatus::Fetched(false).is_fresh());
        assert!(RatingsStatus::Recomputed(true).is_fresh());
        assert!(!RatingsStatus::Recomputed(false).is_fresh());
    }
}
