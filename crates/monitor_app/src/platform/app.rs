use std::io::{self, Write};
use std::sync::mpsc;

use clap::Parser;
use monitor_core::{update, Effect, Lifecycle, MonitorState, MonitorView, Msg};
use monitor_logging::{monitor_info, monitor_warn};

use super::cli::Cli;
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::input;
use super::logging;
use super::ui;

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli)?;
    logging::initialize(config.log_destination, &config.log_path);
    monitor_info!(
        "job-monitor starting job_id={} base_url={}",
        config.job_id,
        config.service.base_url
    );

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let job_id = config.job_id.clone();
    let runner = EffectRunner::new(config, msg_tx.clone())?;
    input::spawn_reader(msg_tx.clone());

    let mut state = MonitorState::new();
    let mut pending = Some(Msg::JobMounted { job_id });

    loop {
        let msg = match pending.take() {
            Some(msg) => msg,
            None => match msg_rx.recv() {
                Ok(msg) => msg,
                Err(_) => break,
            },
        };

        let (next, effects) = update(state, msg);
        state = next;
        let navigate_to = runner.run(effects);

        if state.consume_dirty() {
            draw(&state.view())?;
        }

        if let Some(url) = navigate_to {
            println!("\nAnalysis complete. Results: {url}");
            break;
        }
        match state.lifecycle() {
            Lifecycle::Idle => {
                monitor_info!("Monitor closed by user");
                break;
            }
            Lifecycle::Failed | Lifecycle::Terminated if state.is_settled() => {
                monitor_warn!("Job ended in state {:?}", state.lifecycle());
                break;
            }
            _ => {}
        }
    }

    runner.run(vec![Effect::Teardown]);
    Ok(())
}

fn draw(view: &MonitorView) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", ui::constants::CLEAR_SCREEN)?;
    for line in ui::render::render(view) {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()
}
