use chrono::{DateTime, NaiveTime, Utc};

use crate::{Generation, JobId, StatusSnapshot, TerminationTrigger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Dashboard opened for a job, or switched to a different job.
    JobMounted { job_id: JobId },
    /// Dashboard closed.
    JobUnmounted,
    /// Job metadata lookup finished; `created_at` is `None` when it failed.
    MetadataLoaded {
        generation: Generation,
        created_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    },
    /// A poll returned a status snapshot.
    StatusReceived {
        generation: Generation,
        snapshot: StatusSnapshot,
        /// Local wall-clock time the response arrived.
        received_at: NaiveTime,
    },
    /// A poll failed in transit.
    StatusPollFailed {
        generation: Generation,
        reason: String,
    },
    /// One-second tick of the elapsed clock.
    ClockTicked {
        generation: Generation,
        now: DateTime<Utc>,
    },
    /// User confirmed they want to stop the analysis.
    StopRequested,
    /// Remote terminate call returned.
    TerminateFinished {
        generation: Generation,
        trigger: TerminationTrigger,
        outcome: Result<(), String>,
    },
    /// The post-completion delay elapsed.
    NavigationDue { generation: Generation },
}
