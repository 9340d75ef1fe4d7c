use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::{Local, Utc};
use monitor_logging::{monitor_debug, monitor_info, monitor_warn};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, Generation, JobId, StatusService, TerminationTrigger};

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub clock_interval: Duration,
    /// How long shutdown waits for terminate requests still in flight.
    pub shutdown_grace: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(4),
            clock_interval: Duration::from_secs(1),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Start {
        job_id: JobId,
        generation: Generation,
    },
    StopPolling {
        generation: Generation,
    },
    Terminate {
        job_id: JobId,
        generation: Generation,
        trigger: TerminationTrigger,
    },
    ScheduleNavigation {
        job_id: JobId,
        generation: Generation,
        delay: Duration,
    },
    Teardown,
    Shutdown,
}

/// Receives engine events, typically forwarding them to the UI thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Option<mpsc::Receiver<EngineEvent>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    /// Starts the engine with an internal event queue read via
    /// [`try_recv`](Self::try_recv) and [`recv_timeout`](Self::recv_timeout).
    pub fn new(service: Arc<dyn StatusService>, settings: MonitorSettings) -> io::Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let (cmd_tx, thread) =
            spawn_engine(service, settings, Arc::new(ChannelEventSink { tx: event_tx }))?;
        Ok(Self {
            cmd_tx,
            event_rx: Some(event_rx),
            thread: Some(thread),
        })
    }

    /// Starts the engine delivering every event straight to `sink`.
    pub fn with_sink(
        service: Arc<dyn StatusService>,
        settings: MonitorSettings,
        sink: Arc<dyn EventSink>,
    ) -> io::Result<Self> {
        let (cmd_tx, thread) = spawn_engine(service, settings, sink)?;
        Ok(Self {
            cmd_tx,
            event_rx: None,
            thread: Some(thread),
        })
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.as_ref()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.as_ref()?.recv_timeout(timeout).ok()
    }
}

/// Blocks until the engine thread has finished, including any terminate
/// requests it is still waiting on.
impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn spawn_engine(
    service: Arc<dyn StatusService>,
    settings: MonitorSettings,
    sink: Arc<dyn EventSink>,
) -> io::Result<(mpsc::Sender<EngineCommand>, thread::JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let runtime = Runtime::new()?;

    let thread = thread::Builder::new()
        .name("monitor-engine".to_string())
        .spawn(move || {
            let mut engine = Engine {
                runtime,
                service,
                settings,
                sink,
                session: None,
                terminations: Vec::new(),
            };
            while let Ok(command) = cmd_rx.recv() {
                if command == EngineCommand::Shutdown {
                    break;
                }
                engine.handle_command(command);
            }
            engine.teardown();
            engine.finish_terminations();
        })?;

    Ok((cmd_tx, thread))
}

/// Tasks of one mounted job.
///
/// `polling` is a child of `token`: stopping the poll loop and the clock
/// leaves a pending navigation alive, while teardown cancels both.
struct Session {
    job_id: JobId,
    generation: Generation,
    token: CancellationToken,
    polling: CancellationToken,
}

struct Engine {
    runtime: Runtime,
    service: Arc<dyn StatusService>,
    settings: MonitorSettings,
    sink: Arc<dyn EventSink>,
    session: Option<Session>,
    terminations: Vec<JoinHandle<()>>,
}

impl Engine {
    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Start { job_id, generation } => self.start(job_id, generation),
            EngineCommand::StopPolling { generation } => {
                if let Some(session) = self.session_for(generation) {
                    monitor_info!("Stopping status polling for job {}", session.job_id);
                    session.polling.cancel();
                }
            }
            EngineCommand::Terminate {
                job_id,
                generation,
                trigger,
            } => {
                let service = self.service.clone();
                let sink = self.sink.clone();
                // Not tied to the session: a stop request is sent even if the
                // dashboard is closed meanwhile.
                self.terminations.retain(|task| !task.is_finished());
                self.terminations.push(self.runtime.spawn(async move {
                    let result = service.terminate(&job_id).await;
                    sink.emit(EngineEvent::TerminateFinished {
                        generation,
                        trigger,
                        result,
                    });
                }));
            }
            EngineCommand::ScheduleNavigation {
                job_id,
                generation,
                delay,
            } => {
                let Some(session) = self.session_for(generation) else {
                    return;
                };
                let token = session.token.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            sink.emit(EngineEvent::NavigationDue { generation, job_id });
                        }
                    }
                });
            }
            EngineCommand::Teardown => self.teardown(),
            EngineCommand::Shutdown => {}
        }
    }

    fn session_for(&self, generation: Generation) -> Option<&Session> {
        self.session
            .as_ref()
            .filter(|session| session.generation == generation)
    }

    fn start(&mut self, job_id: JobId, generation: Generation) {
        self.teardown();
        monitor_info!("Starting monitor for job {} (generation {})", job_id, generation);

        let token = CancellationToken::new();
        let polling = token.child_token();

        self.runtime.spawn(load_metadata(
            self.service.clone(),
            self.sink.clone(),
            job_id.clone(),
            generation,
            token.clone(),
        ));
        self.runtime.spawn(poll_loop(
            self.service.clone(),
            self.sink.clone(),
            job_id.clone(),
            generation,
            self.settings.poll_interval,
            polling.clone(),
        ));
        self.runtime.spawn(clock_loop(
            self.sink.clone(),
            generation,
            self.settings.clock_interval,
            polling.clone(),
        ));

        self.session = Some(Session {
            job_id,
            generation,
            token,
            polling,
        });
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            monitor_debug!("Tearing down monitor for job {}", session.job_id);
            session.token.cancel();
        }
    }

    /// Waits, up to the shutdown grace, for terminate requests still running.
    fn finish_terminations(&mut self) {
        let pending: Vec<_> = self
            .terminations
            .drain(..)
            .filter(|task| !task.is_finished())
            .collect();
        if pending.is_empty() {
            return;
        }
        monitor_info!("Waiting for {} terminate request(s) to finish", pending.len());
        let grace = self.settings.shutdown_grace;
        let drained = self.runtime.block_on(async move {
            tokio::time::timeout(grace, async move {
                for task in pending {
                    let _ = task.await;
                }
            })
            .await
        });
        if drained.is_err() {
            monitor_warn!("Terminate request still running after {:?}; abandoning it", grace);
        }
    }
}

async fn load_metadata(
    service: Arc<dyn StatusService>,
    sink: Arc<dyn EventSink>,
    job_id: JobId,
    generation: Generation,
    token: CancellationToken,
) {
    let result = tokio::select! {
        _ = token.cancelled() => return,
        result = service.get_by_id(&job_id) => result,
    };
    sink.emit(EngineEvent::MetadataLoaded {
        generation,
        result,
        now: Utc::now(),
    });
}

/// Fetches the job status every `interval`, starting immediately.
///
/// Each request runs as its own task so a slow response never delays the
/// next tick; overlapping requests are expected.
async fn poll_loop(
    service: Arc<dyn StatusService>,
    sink: Arc<dyn EventSink>,
    job_id: JobId,
    generation: Generation,
    interval: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let service = service.clone();
                let sink = sink.clone();
                let job_id = job_id.clone();
                let token = token.clone();
                tokio::spawn(async move {
                    let result = tokio::select! {
                        _ = token.cancelled() => return,
                        result = service.get_status(&job_id) => result,
                    };
                    if token.is_cancelled() {
                        return;
                    }
                    sink.emit(EngineEvent::StatusPolled {
                        generation,
                        result,
                        received_at: Local::now().time(),
                    });
                });
            }
        }
    }
    monitor_debug!("Poll loop for job {} stopped", job_id);
}

async fn clock_loop(
    sink: Arc<dyn EventSink>,
    generation: Generation,
    interval: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                sink.emit(EngineEvent::ClockTicked { generation, now: Utc::now() });
            }
        }
    }
}
