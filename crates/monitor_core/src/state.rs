use chrono::{DateTime, NaiveTime, Utc};

use crate::activity_log::{ActivityLog, LogEntry};
use crate::elapsed::{elapsed_seconds, format_elapsed, ELAPSED_ZERO};
use crate::phase::{classify, PhaseIndex, PHASES};
use crate::view_model::{CellState, MonitorView, PhaseCellView};

pub type JobId = String;

/// Identifies one mount of the monitor. Events from older mounts are stale.
pub type Generation = u64;

/// Shown in place of the server message once the job is stopped.
pub const STOPPED_MESSAGE: &str = "Analysis stopped by user.";

/// Shown when the server reports the job as failed.
pub const FAILED_MESSAGE: &str = "The analysis failed. Please try again or contact support.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Initializing,
    Processing,
    Completed,
    Failed,
    Terminated,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        matches!(self, Lifecycle::Initializing | Lifecycle::Processing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Lifecycle::Completed | Lifecycle::Failed | Lifecycle::Terminated
        )
    }
}

/// One poll response, already decoded from the service wire format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub status: Option<String>,
    pub message: String,
    pub is_completed: bool,
    pub is_failed: bool,
}

impl StatusSnapshot {
    fn log_message(&self) -> &str {
        if self.message.is_empty() {
            self.status.as_deref().unwrap_or_default()
        } else {
            &self.message
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorState {
    job_id: Option<JobId>,
    generation: Generation,
    lifecycle: Lifecycle,
    snapshot: Option<StatusSnapshot>,
    phase: PhaseIndex,
    furthest_phase: u8,
    log: ActivityLog,
    created_at: Option<DateTime<Utc>>,
    elapsed: String,
    status_message: String,
    terminating: bool,
    terminate_issued: bool,
    terminate_in_flight: bool,
    error: Option<String>,
    navigation_scheduled: bool,
    navigated: bool,
    dirty: bool,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            job_id: None,
            generation: 0,
            lifecycle: Lifecycle::Idle,
            snapshot: None,
            phase: PhaseIndex::INITIAL,
            furthest_phase: 0,
            log: ActivityLog::new(),
            created_at: None,
            elapsed: ELAPSED_ZERO.to_string(),
            status_message: String::new(),
            terminating: false,
            terminate_issued: false,
            terminate_in_flight: false,
            error: None,
            navigation_scheduled: false,
            navigated: false,
            dirty: false,
        }
    }
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn phase(&self) -> PhaseIndex {
        self.phase
    }

    pub fn is_terminating(&self) -> bool {
        self.terminating
    }

    /// Terminal with no terminate call still in flight, whichever side
    /// triggered it.
    pub fn is_settled(&self) -> bool {
        self.lifecycle.is_terminal() && !self.terminate_in_flight
    }

    /// Returns whether the state changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.job_id.is_some() && self.generation == generation
    }

    pub(crate) fn current_job(&self) -> Option<JobId> {
        self.job_id.clone()
    }

    /// Fresh state for a newly mounted job.
    pub(crate) fn mount(&mut self, job_id: JobId) -> Generation {
        let generation = self.generation + 1;
        *self = Self {
            job_id: Some(job_id),
            generation,
            lifecycle: Lifecycle::Initializing,
            dirty: true,
            ..Self::default()
        };
        generation
    }

    pub(crate) fn unmount(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            dirty: true,
            ..Self::default()
        };
    }

    pub(crate) fn seed_created_at(&mut self, created_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.created_at = Some(created_at);
        self.refresh_elapsed(now);
        self.mark_dirty();
    }

    /// Recomputes the elapsed display while the job is active.
    pub(crate) fn refresh_elapsed(&mut self, now: DateTime<Utc>) -> bool {
        if !self.lifecycle.is_active() {
            return false;
        }
        let Some(seconds) = self
            .created_at
            .and_then(|created_at| elapsed_seconds(created_at, now))
        else {
            return false;
        };
        let formatted = format_elapsed(seconds);
        if formatted == self.elapsed {
            return false;
        }
        self.elapsed = formatted;
        self.mark_dirty();
        true
    }

    /// Applies a snapshot and returns the phase it classifies to.
    pub(crate) fn apply_snapshot(
        &mut self,
        snapshot: StatusSnapshot,
        received_at: NaiveTime,
    ) -> PhaseIndex {
        let status_changed = self
            .snapshot
            .as_ref()
            .map_or(true, |previous| previous.status != snapshot.status);
        if status_changed {
            self.log
                .append(LogEntry::new(received_at, snapshot.log_message()));
        }

        let phase = classify(snapshot.status.as_deref());
        if let PhaseIndex::At(index) = phase {
            self.furthest_phase = self.furthest_phase.max(index);
        }
        self.phase = phase;
        self.status_message = snapshot.message.clone();
        self.snapshot = Some(snapshot);
        if self.lifecycle == Lifecycle::Initializing {
            self.lifecycle = Lifecycle::Processing;
        }
        self.mark_dirty();
        phase
    }

    pub(crate) fn complete(&mut self) -> bool {
        self.lifecycle = Lifecycle::Completed;
        self.mark_dirty();
        !std::mem::replace(&mut self.navigation_scheduled, true)
    }

    pub(crate) fn fail(&mut self) {
        self.lifecycle = Lifecycle::Failed;
        self.error = Some(FAILED_MESSAGE.to_string());
        self.mark_dirty();
    }

    /// Shared landing point for user aborts and server-reported stops.
    ///
    /// Returns `false` when the job had already reached a terminal state.
    pub(crate) fn enter_terminated(&mut self) -> bool {
        self.terminating = false;
        self.mark_dirty();
        if self.lifecycle.is_terminal() {
            return false;
        }
        self.lifecycle = Lifecycle::Terminated;
        self.phase = PhaseIndex::Stopped;
        self.status_message = STOPPED_MESSAGE.to_string();
        true
    }

    /// Latches the single terminate call allowed per mount and marks it
    /// in flight until [`finish_terminate`](Self::finish_terminate).
    pub(crate) fn claim_terminate(&mut self) -> bool {
        if std::mem::replace(&mut self.terminate_issued, true) {
            return false;
        }
        self.terminate_in_flight = true;
        true
    }

    pub(crate) fn finish_terminate(&mut self) {
        self.terminate_in_flight = false;
    }

    pub(crate) fn begin_terminating(&mut self) {
        self.terminating = true;
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn mark_navigated(&mut self) -> bool {
        self.lifecycle == Lifecycle::Completed && !std::mem::replace(&mut self.navigated, true)
    }

    pub fn view(&self) -> MonitorView {
        let cells = PHASES
            .iter()
            .enumerate()
            .map(|(index, info)| PhaseCellView {
                label: info.label,
                description: info.description,
                state: self.cell_state(index),
            })
            .collect();

        MonitorView {
            job_id: self.job_id.clone(),
            lifecycle: self.lifecycle,
            phase: self.phase.as_signed(),
            cells,
            status_message: self.status_message.clone(),
            log: self.log.to_vec(),
            elapsed: self.elapsed.clone(),
            abort_enabled: self.lifecycle.is_active() && !self.terminating,
            terminating: self.terminating,
            error: self.error.clone(),
        }
    }

    fn cell_state(&self, index: usize) -> CellState {
        match (self.lifecycle, self.phase) {
            (Lifecycle::Idle, _) => CellState::Pending,
            (Lifecycle::Completed, _) => CellState::Completed,
            (_, PhaseIndex::Stopped) => {
                if index < usize::from(self.furthest_phase) {
                    CellState::Completed
                } else {
                    CellState::Pending
                }
            }
            (_, PhaseIndex::At(current)) => match index.cmp(&usize::from(current)) {
                std::cmp::Ordering::Less => CellState::Completed,
                std::cmp::Ordering::Equal => CellState::Current,
                std::cmp::Ordering::Greater => CellState::Pending,
            },
        }
    }
}
