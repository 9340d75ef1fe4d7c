use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type JobId = String;
pub type Generation = u64;

/// Body of `GET /projects/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStatusSnapshot {
    pub status: Option<String>,
    pub message: Option<String>,
    pub is_completed: bool,
    pub is_failed: bool,
}

/// The subset of `GET /projects/{id}` the monitor needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobMetadata {
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationTrigger {
    User,
    ServerReported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    MetadataLoaded {
        generation: Generation,
        result: Result<JobMetadata, ServiceError>,
        now: DateTime<Utc>,
    },
    StatusPolled {
        generation: Generation,
        result: Result<JobStatusSnapshot, ServiceError>,
        received_at: NaiveTime,
    },
    ClockTicked {
        generation: Generation,
        now: DateTime<Utc>,
    },
    TerminateFinished {
        generation: Generation,
        trigger: TerminationTrigger,
        result: Result<(), ServiceError>,
    },
    NavigationDue {
        generation: Generation,
        job_id: JobId,
    },
}

impl EngineEvent {
    pub fn generation(&self) -> Generation {
        match self {
            EngineEvent::MetadataLoaded { generation, .. }
            | EngineEvent::StatusPolled { generation, .. }
            | EngineEvent::ClockTicked { generation, .. }
            | EngineEvent::TerminateFinished { generation, .. }
            | EngineEvent::NavigationDue { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
        }
    }
}
