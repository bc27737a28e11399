//! Run configuration: locating the file under the trusted directory, loading
//! its key/value pairs, and applying the whitelisted environment overrides.

mod env;
mod loader;
mod resolver;
mod run_config;

pub use env::{apply_overrides, EnvSource, ProcessEnv, ENV_OVERRIDES, PARAMS_VAR};
pub use loader::{load_entries, parse_properties};
pub use resolver::{
    ConfigResolver, ConfigSource, ResolvedConfig, DEFAULT_BASE_DIR, DEFAULT_CONFIG_PATH,
};
pub use run_config::{keys, RunConfig, RunFlags, RunOnly};
