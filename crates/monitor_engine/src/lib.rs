//! Job monitor engine: status service client and the background tasks that poll it.
mod engine;
mod service;
mod types;

pub use engine::{EngineCommand, EngineHandle, EventSink, MonitorSettings};
pub use service::{ReqwestStatusService, ServiceSettings, StatusService};
pub use types::{
    EngineEvent, FailureKind, Generation, JobId, JobMetadata, JobStatusSnapshot, ServiceError,
    TerminationTrigger,
};
