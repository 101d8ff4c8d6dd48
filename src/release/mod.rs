//! Release pipeline and the steps it drives
//!
//! Stage order is fixed:
//!
//! 1. pre command (optional)
//! 2. production cache clear check (optional)
//! 3. resolve and persist the new version
//! 4. write the version template and changelog entry
//! 5. Sentry release (optional)
//! 6. git add, signed commit, push, signed tag, push tag (optional)
//! 7. deploy (optional)
//!
//! See [`pipeline`] for how a run is planned and executed.

pub mod artifacts;
pub mod cache;
pub mod deploy;
pub mod git;
pub mod pipeline;
pub mod sentry;
pub mod stage;

pub use pipeline::{PlannedStage, ReleaseOrchestrator, ReleaseOutcome, ReleasePlan};
pub use stage::Stage;
