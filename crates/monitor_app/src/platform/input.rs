use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use monitor_core::Msg;
use monitor_logging::monitor_debug;

use super::ui::constants::{CONFIRM_PROMPT, HELP_TEXT, STOP_CANCELLED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    AskConfirmation,
    Stop,
    Cancelled,
    Quit,
    Help,
    Ignored,
}

/// Two-step abort: `stop`, then an explicit yes.
#[derive(Debug, Default)]
pub struct InputState {
    awaiting_confirmation: bool,
}

impl InputState {
    pub fn handle_line(&mut self, line: &str) -> InputAction {
        let command = line.trim().to_lowercase();
        if std::mem::take(&mut self.awaiting_confirmation) {
            return match command.as_str() {
                "y" | "yes" => InputAction::Stop,
                _ => InputAction::Cancelled,
            };
        }
        match command.as_str() {
            "stop" | "s" => {
                self.awaiting_confirmation = true;
                InputAction::AskConfirmation
            }
            "quit" | "q" => InputAction::Quit,
            "help" | "?" => InputAction::Help,
            _ => InputAction::Ignored,
        }
    }
}

/// Reads commands from stdin until it closes or the receiver goes away.
pub fn spawn_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let mut state = InputState::default();
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let sent = match state.handle_line(&line) {
                InputAction::AskConfirmation => prompt(CONFIRM_PROMPT),
                InputAction::Cancelled => prompt(STOP_CANCELLED),
                InputAction::Help => prompt(HELP_TEXT),
                InputAction::Stop => msg_tx.send(Msg::StopRequested).is_ok(),
                InputAction::Quit => msg_tx.send(Msg::JobUnmounted).is_ok(),
                InputAction::Ignored => true,
            };
            if !sent {
                break;
            }
        }
        monitor_debug!("Input reader finished");
    });
}

fn prompt(text: &str) -> bool {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{text}");
    let _ = stdout.flush();
    true
}
