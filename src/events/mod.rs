pub mod publisher;
pub mod run_context;

pub use publisher::{EventPublisher, PublishedEvent};
pub use run_context::{RunContext, RunReport, SkipReason, SkippedUnit};
