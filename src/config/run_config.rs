use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

/// Configuration keys read by the orchestrator itself.
pub mod keys {
    pub const DOWNLOAD: &str = "DOWNLOAD";
    pub const EXECUTE: &str = "EXECUTE";
    pub const UPLOAD: &str = "UPLOAD";
    pub const ITERATE: &str = "ITERATE";
    pub const RUNONLY: &str = "RUNONLY";
    pub const MELEE: &str = "MELEE";

    pub const USER: &str = "USER";
    pub const PARTICIPANTS_URL: &str = "PARTICIPANTSURL";
    pub const UPDATE_BOTS_URL: &str = "UPDATEBOTSURL";
    pub const RESULTS_URL: &str = "RESULTSURL";
    pub const RATINGS_URL: &str = "RATINGS.URL";
}

const YES: &str = "YES";
const NOT: &str = "NOT";
const GENERAL: &str = "GENERAL";
const SERVER: &str = "SERVER";

/// Resolved key/value configuration for one client run.
///
/// There is no mutator: a `RunConfig` is built once (file values, then
/// environment overrides) and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunConfig {
    entries: BTreeMap<String, String>,
}

impl RunConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RunConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RunConfig {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Which side of the rumble this client runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOnly {
    General,
    Server,
}

/// The run-mode flags the orchestrator branches on, read once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunFlags {
    pub download: bool,
    pub execute: bool,
    pub upload: bool,
    pub iterate: bool,
    pub melee: bool,
    pub run_only: RunOnly,
}

impl RunFlags {
    /// Read the flags from `config`. Missing flags default to `NOT` and
    /// `RUNONLY` defaults to `GENERAL`; only the exact value `YES` turns a
    /// flag on.
    pub fn from_config(config: &RunConfig) -> Self {
        let run_only = match config.get_or(keys::RUNONLY, GENERAL) {
            SERVER => RunOnly::Server,
            GENERAL => RunOnly::General,
            other => {
                warn!(key = keys::RUNONLY, value = other, "unrecognized value, using GENERAL");
                RunOnly::General
            }
        };

        RunFlags {
            download: yes_flag(config, keys::DOWNLOAD),
            execute: yes_flag(config, keys::EXECUTE),
            upload: yes_flag(config, keys::UPLOAD),
            iterate: yes_flag(config, keys::ITERATE),
            melee: yes_flag(config, keys::MELEE),
            run_only,
        }
    }
}

fn yes_flag(config: &RunConfig, key: &str) -> bool {
    match config.get_or(key, NOT) {
        YES => true,
        NOT => false,
        other => {
            warn!(key, value = other, "unrecognized flag value, treating as NOT");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_flag_defaults() {
        let flags = RunFlags::from_config(&RunConfig::default());
        assert!(!flags.download);
        assert!(!flags.execute);
        assert!(!flags.upload);
        assert!(!flags.iterate);
        assert!(!flags.melee);
        assert_eq!(flags.run_only, RunOnly::General);
    }

    #[test]
    fn test_flags_read_yes_values() {
        let config: RunConfig = [
            ("DOWNLOAD", "YES"),
            ("EXECUTE", "YES"),
            ("UPLOAD", "NOT"),
            ("ITERATE", "YES"),
            ("MELEE", "YES"),
            ("RUNONLY", "SERVER"),
        ]
        .into_iter()
        .collect();

        let flags = RunFlags::from_config(&config);
        assert!(flags.download);
        assert!(flags.execute);
        assert!(!flags.upload);
        assert!(flags.iterate);
        assert!(flags.melee);
        assert_eq!(flags.run_only, RunOnly::Server);
    }

    #[test]
    fn test_flags_are_case_sensitive() {
        let config: RunConfig = [("DOWNLOAD", "yes"), ("RUNONLY", "server")]
            .into_iter()
            .collect();
        let flags = RunFlags::from_config(&config);
        assert!(!flags.download);
        assert_eq!(flags.run_only, RunOnly::General);
    }

    #[test]
    fn test_get_or_falls_back() {
        let config: RunConfig = [("USER", "alice")].into_iter().collect();
        assert_eq!(config.get_or("USER", "anonymous"), "alice");
        assert_eq!(config.get_or("RESULTSURL", "none"), "none");
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let config: RunConfig = [("RATINGS.URL", "http://x/ratings"), ("USER", "bob")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"RATINGS.URL":"http://x/ratings","USER":"bob"}"#);
    }
}
