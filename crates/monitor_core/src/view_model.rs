use crate::{JobId, Lifecycle, LogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCellView {
    pub label: &'static str,
    pub description: &'static str,
    pub state: CellState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorView {
    pub job_id: Option<JobId>,
    pub lifecycle: Lifecycle,
    /// `0..=8`, or `-1` once stopped.
    pub phase: i8,
    pub cells: Vec<PhaseCellView>,
    pub status_message: String,
    pub log: Vec<LogEntry>,
    pub elapsed: String,
    pub abort_enabled: bool,
    pub terminating: bool,
    pub error: Option<String>,
}
