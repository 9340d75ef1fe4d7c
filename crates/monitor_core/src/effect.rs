use std::time::Duration;

use crate::{Generation, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Begin polling, metadata lookup and the elapsed clock for a job.
    StartMonitoring { job_id: JobId, generation: Generation },
    /// Cancel the poll loop and the elapsed clock of this generation.
    StopPolling { generation: Generation },
    Terminate {
        job_id: JobId,
        generation: Generation,
        trigger: TerminationTrigger,
    },
    /// Fire `Msg::NavigationDue` once after `delay`.
    ScheduleNavigation {
        job_id: JobId,
        generation: Generation,
        delay: Duration,
    },
    NavigateToResults { job_id: JobId },
    /// User-visible notification.
    Alert { message: String },
    /// Cancel every task of the current job, including pending navigation.
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationTrigger {
    User,
    ServerReported,
}
