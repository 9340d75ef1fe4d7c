use std::io::Write;
use std::sync::{mpsc, Arc};

use monitor_core::{Effect, Msg, StatusSnapshot, TerminationTrigger};
use monitor_engine::{
    EngineCommand, EngineEvent, EngineHandle, EventSink, ReqwestStatusService,
    TerminationTrigger as EngineTrigger,
};
use monitor_logging::{monitor_debug, monitor_info, monitor_warn};

use super::config::AppConfig;

/// Executes core effects against the engine and the terminal.
pub struct EffectRunner {
    engine: EngineHandle,
    config: AppConfig,
}

impl EffectRunner {
    pub fn new(config: AppConfig, msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<Self> {
        let service = Arc::new(ReqwestStatusService::new(config.service.clone())?);
        let sink = Arc::new(MsgSink { tx: msg_tx });
        let engine = EngineHandle::with_sink(service, config.monitor.clone(), sink)?;
        Ok(Self { engine, config })
    }

    /// Runs `effects` in order. Returns the results URL once navigation fires.
    pub fn run(&self, effects: Vec<Effect>) -> Option<String> {
        let mut navigate_to = None;
        for effect in effects {
            match effect {
                Effect::StartMonitoring { job_id, generation } => {
                    self.engine.send(EngineCommand::Start { job_id, generation });
                }
                Effect::StopPolling { generation } => {
                    self.engine.send(EngineCommand::StopPolling { generation });
                }
                Effect::Terminate {
                    job_id,
                    generation,
                    trigger,
                } => {
                    monitor_info!("Terminate job_id={} trigger={:?}", job_id, trigger);
                    self.engine.send(EngineCommand::Terminate {
                        job_id,
                        generation,
                        trigger: map_trigger(trigger),
                    });
                }
                Effect::ScheduleNavigation {
                    job_id,
                    generation,
                    delay,
                } => {
                    self.engine.send(EngineCommand::ScheduleNavigation {
                        job_id,
                        generation,
                        delay,
                    });
                }
                Effect::NavigateToResults { job_id } => {
                    navigate_to = Some(self.config.results_url(&job_id));
                }
                Effect::Alert { message } => {
                    let mut stderr = std::io::stderr().lock();
                    let _ = writeln!(stderr, "\x07{message}");
                }
                Effect::Teardown => self.engine.send(EngineCommand::Teardown),
            }
        }
        navigate_to
    }
}

struct MsgSink {
    tx: mpsc::Sender<Msg>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(map_event(event));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::MetadataLoaded {
            generation,
            result,
            now,
        } => {
            let created_at = match result {
                Ok(metadata) => metadata.created_at,
                Err(err) => {
                    monitor_warn!("Could not load job metadata: {}", err);
                    None
                }
            };
            Msg::MetadataLoaded {
                generation,
                created_at,
                now,
            }
        }
        EngineEvent::StatusPolled {
            generation,
            result,
            received_at,
        } => match result {
            Ok(snapshot) => Msg::StatusReceived {
                generation,
                snapshot: StatusSnapshot {
                    status: snapshot.status,
                    message: snapshot.message.unwrap_or_default(),
                    is_completed: snapshot.is_completed,
                    is_failed: snapshot.is_failed,
                },
                received_at,
            },
            Err(err) => {
                monitor_debug!("Status poll failed: {}", err);
                Msg::StatusPollFailed {
                    generation,
                    reason: err.to_string(),
                }
            }
        },
        EngineEvent::ClockTicked { generation, now } => Msg::ClockTicked { generation, now },
        EngineEvent::TerminateFinished {
            generation,
            trigger,
            result,
        } => Msg::TerminateFinished {
            generation,
            trigger: match trigger {
                EngineTrigger::User => TerminationTrigger::User,
                EngineTrigger::ServerReported => TerminationTrigger::ServerReported,
            },
            outcome: result.map_err(|err| err.to_string()),
        },
        EngineEvent::NavigationDue { generation, .. } => Msg::NavigationDue { generation },
    }
}

fn map_trigger(trigger: TerminationTrigger) -> EngineTrigger {
    match trigger {
        TerminationTrigger::User => EngineTrigger::User,
        TerminationTrigger::ServerReported => EngineTrigger::ServerReported,
    }
}
