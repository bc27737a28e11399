//! # Rumble Client
//!
//! Client-side driver for a distributed competition rumble. Each iteration
//! fetches participants and artifacts from the coordination server, runs
//! trials locally, and uploads the results, as directed by a key/value
//! configuration file.
//!
//! ## Modules
//!
//! - [`config`]: Trusted-path resolution, file loading, environment overrides
//! - [`orchestrator`]: Control loop, cross-iteration state, fetch throttle
//! - [`phases`]: Collaborator traits and the command-backed implementation
//! - [`error`]: Structured error types

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod phases;
