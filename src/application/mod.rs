mod binder;
pub mod filename;
mod handle;
mod lifecycle;
pub mod options;
mod orchestrator;
pub mod progress;
mod sequencer;

pub use handle::{DownloadHandle, DownloadResult};
pub use options::DownloadOptions;
pub use orchestrator::{Dispatch, DownloadOrchestrator, OrchestratorConfig};
pub use progress::AggregateCounters;
