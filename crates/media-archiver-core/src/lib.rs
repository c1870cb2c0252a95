pub mod collision;
pub mod config;
pub mod cutoff;
pub mod dating;
pub mod engine;
pub mod error;
pub mod executor;
pub mod metadata;
pub mod model;
pub mod plan;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod summary;
pub mod transfer;

pub use config::{AppConfig, ArchiveSettings};
pub use engine::{ArchiveEngine, PlanRun, RunResult};
pub use error::Error;
pub use executor::{AlwaysApprove, AlwaysDecline, ConfirmationGate, Executor};
pub use model::{
    DateSource, ExecutionMode, MediaFile, OutcomeRow, OutcomeStatus, PlanRow, PlannedAction,
    ResolvedDate, RetentionCutoff, TransferMode,
};
pub use progress::{ProgressReporter, SilentReporter};
pub use summary::{summarize, Summary};
