/// ANSI: clear screen and move the cursor home.
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub const CELL_COMPLETED: &str = "[x]";
pub const CELL_CURRENT: &str = "[>]";
pub const CELL_PENDING: &str = "[ ]";

pub const ABORT_HINT: &str = "Type \"stop\" to abort the analysis, \"help\" for commands.";
pub const TERMINATING_NOTICE: &str = "Stopping the analysis...";
pub const CONFIRM_PROMPT: &str = "Stop the analysis? This cannot be undone. [y/N]";
pub const STOP_CANCELLED: &str = "Stop cancelled.";
pub const HELP_TEXT: &str = "Commands: stop (abort the analysis), quit (close the monitor), help";
pub const LOG_HEADER: &str = "-- Activity --";
