use monitor_core::{CellState, Lifecycle, MonitorView, PhaseCellView};

use super::constants::*;

pub fn render(view: &MonitorView) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.cells.len() + view.log.len() + 8);

    lines.push(format!(
        "Job {} | {} | {}",
        view.job_id.as_deref().unwrap_or("-"),
        lifecycle_label(view.lifecycle),
        view.elapsed
    ));
    lines.push(String::new());
    lines.extend(view.cells.iter().map(format_cell));
    lines.push(String::new());

    if !view.status_message.is_empty() {
        lines.push(format!("Status: {}", view.status_message));
    }
    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    if view.terminating {
        lines.push(TERMINATING_NOTICE.to_string());
    } else if view.abort_enabled {
        lines.push(ABORT_HINT.to_string());
    }

    if !view.log.is_empty() {
        lines.push(String::new());
        lines.push(LOG_HEADER.to_string());
        lines.extend(
            view.log
                .iter()
                .map(|entry| format!("{}  {}", entry.time, entry.message)),
        );
    }

    lines
}

fn format_cell(cell: &PhaseCellView) -> String {
    match cell.state {
        CellState::Completed => format!("{CELL_COMPLETED} {}", cell.label),
        CellState::Current => format!("{CELL_CURRENT} {} - {}", cell.label, cell.description),
        CellState::Pending => format!("{CELL_PENDING} {}", cell.label),
    }
}

fn lifecycle_label(lifecycle: Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::Idle => "Idle",
        Lifecycle::Initializing => "Starting",
        Lifecycle::Processing => "Processing",
        Lifecycle::Completed => "Completed",
        Lifecycle::Failed => "Failed",
        Lifecycle::Terminated => "Stopped",
    }
}
