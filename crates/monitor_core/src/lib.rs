//! Job monitor core: pure state machine and view-model helpers.
mod activity_log;
mod effect;
mod elapsed;
mod msg;
mod phase;
mod state;
mod update;
mod view_model;

pub use activity_log::{ActivityLog, LogEntry, LOG_CAPACITY};
pub use effect::{Effect, TerminationTrigger};
pub use elapsed::{elapsed_seconds, format_elapsed};
pub use msg::Msg;
pub use phase::{
    classify, classify_with, ClassifierRule, PhaseIndex, PhaseInfo, CLASSIFIER_RULES, PHASES,
    PHASE_COUNT,
};
pub use state::{
    Generation, JobId, Lifecycle, MonitorState, StatusSnapshot, FAILED_MESSAGE, STOPPED_MESSAGE,
};
pub use update::{update, NAVIGATION_DELAY};
pub use view_model::{CellState, MonitorView, PhaseCellView};
