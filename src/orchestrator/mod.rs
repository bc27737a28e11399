//! The client control loop: engine bind, throttled fetch, list strategy
//! selection, trial execution and upload, repeated while `ITERATE` is `YES`.

mod clock;
mod driver;
mod state;
mod strategy;
mod throttle;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub(crate) use clock::ManualClock;
pub use driver::{IterationReport, Orchestrator, OrchestratorOptions};
pub use state::{game_identifier, OrchestrationState, RatingsStatus};
pub use strategy::select_strategy;
pub use throttle::{FetchThrottle, FETCH_INTERVAL};
