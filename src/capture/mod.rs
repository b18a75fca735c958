//! # Capture
//!
//! The stateful half of the crate: one orchestrator owning the active trail,
//! the captured territories and the capture statistics.
//!
//! - `config` - orchestrator tunables
//! - `state` - status and result values returned to callers
//! - `events` - lifecycle events and observers
//! - `scheduler` - time source and the deferred finalize
//! - `territory` - territory records and their R-tree store
//! - `orchestrator` - the state machine tying it together

pub mod config;
pub mod events;
pub mod orchestrator;
pub mod scheduler;
pub mod state;
pub mod territory;

pub use config::CaptureConfig;
pub use events::{CaptureEvent, CaptureObserver, LoggingObserver, NoopObserver};
pub use orchestrator::{CaptureOrchestrator, IngestOutcome};
pub use scheduler::{AUTO_FINALIZE_DELAY_MS, Clock, FinalizeTimer, ManualClock, SystemClock};
pub use state::{
    CaptureOutcome, CaptureResult, CaptureSnapshot, CaptureStats, CaptureStatus, PointResult,
    PointStatus, StartStatus,
};
pub use territory::{Territory, TerritoryStore, generate_territory_id};
