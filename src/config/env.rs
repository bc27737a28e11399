use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::run_config::keys;

/// Environment variable naming the configuration file when no argument is
/// given.
pub const PARAMS_VAR: &str = "PARAMS";

/// Environment variables allowed to override configuration keys, paired with
/// the key each one replaces.
pub const ENV_OVERRIDES: [(&str, &str); 5] = [
    ("RUMBLE_USER", keys::USER),
    ("RUMBLE_PARTICIPANTSURL", keys::PARTICIPANTS_URL),
    ("RUMBLE_UPDATEBOTSURL", keys::UPDATE_BOTS_URL),
    ("RUMBLE_RESULTSURL", keys::RESULTS_URL),
    ("RUMBLE_RATINGSURL", keys::RATINGS_URL),
];

/// The literal value that marks an override as absent.
const NULL_OVERRIDE: &str = "null";

/// Read access to environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment. Non-UTF-8 values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Apply the whitelisted environment overrides to `entries`. Unset variables
/// and the literal `null` leave the file value (or its absence) untouched.
pub fn apply_overrides(entries: &mut BTreeMap<String, String>, env: &dyn EnvSource) {
    for (var, key) in ENV_OVERRIDES {
        match env.var(var) {
            Some(value) if value != NULL_OVERRIDE => {
                debug!(var, key, "config key overridden from environment");
                entries.insert(key.to_string(), value);
            }
            Some(_) => debug!(var, "override set to null, ignored"),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn file_entries() -> BTreeMap<String, String> {
        [
            ("USER", "file-user"),
            ("RESULTSURL", "http://file/results"),
            ("DOWNLOAD", "YES"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_override_replaces_file_value() {
        let mut entries = file_entries();
        apply_overrides(&mut entries, &env(&[("RUMBLE_USER", "env-user")]));
        assert_eq!(entries["USER"], "env-user");
        assert_eq!(entries["RESULTSURL"], "http://file/results");
    }

    #[test]
    fn test_null_override_keeps_file_value() {
        let mut entries = file_entries();
        apply_overrides(
            &mut entries,
            &env(&[("RUMBLE_USER", "null"), ("RUMBLE_RESULTSURL", "null")]),
        );
        assert_eq!(entries["USER"], "file-user");
        assert_eq!(entries["RESULTSURL"], "http://file/results");
    }

    #[test]
    fn test_null_override_keeps_absence() {
        let mut entries = file_entries();
        apply_overrides(&mut entries, &env(&[("RUMBLE_RATINGSURL", "null")]));
        assert!(!entries.contains_key("RATINGS.URL"));
    }

    #[test]
    fn test_override_adds_missing_key() {
        let mut entries = file_entries();
        apply_overrides(
            &mut entries,
            &env(&[
                ("RUMBLE_RATINGSURL", "http://env/ratings"),
                ("RUMBLE_PARTICIPANTSURL", "http://env/participants"),
                ("RUMBLE_UPDATEBOTSURL", "http://env/update"),
            ]),
        );
        assert_eq!(entries["RATINGS.URL"], "http://env/ratings");
        assert_eq!(entries["PARTICIPANTSURL"], "http://env/participants");
        assert_eq!(entries["UPDATEBOTSURL"], "http://env/update");
    }

    #[test]
    fn test_non_whitelisted_keys_are_ignored() {
        let mut entries = file_entries();
        apply_overrides(&mut entries, &env(&[("RUMBLE_DOWNLOAD", "NOT"), ("DOWNLOAD", "NOT")]));
        assert_eq!(entries["DOWNLOAD"], "YES");
    }
}
