use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use monitor_engine::{
    EngineCommand, EngineEvent, EngineHandle, FailureKind, JobMetadata, JobStatusSnapshot,
    MonitorSettings, ServiceError, StatusService, TerminationTrigger,
};

/// In-memory status service returning scripted responses.
#[derive(Default)]
struct ScriptedService {
    statuses: Mutex<VecDeque<Result<JobStatusSnapshot, ServiceError>>>,
    status_delay: Duration,
    metadata_fails: bool,
    terminate_delay: Duration,
    status_calls: AtomicUsize,
    terminate_calls: AtomicUsize,
    terminates_done: AtomicUsize,
}

impl ScriptedService {
    fn with_statuses(statuses: Vec<Result<JobStatusSnapshot, ServiceError>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl StatusService for ScriptedService {
    async fn get_by_id(&self, _job_id: &str) -> Result<JobMetadata, ServiceError> {
        if self.metadata_fails {
            return Err(ServiceError::new(FailureKind::HttpStatus(404), "not found"));
        }
        Ok(JobMetadata {
            created_at: Some(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()),
        })
    }

    async fn get_status(&self, _job_id: &str) -> Result<JobStatusSnapshot, ServiceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobStatusSnapshot::default()))
    }

    async fn terminate(&self, _job_id: &str) -> Result<(), ServiceError> {
        self.terminate_calls.fetch_add(1, Ordering::SeqCst);
        if !self.terminate_delay.is_zero() {
            tokio::time::sleep(self.terminate_delay).await;
        }
        self.terminates_done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn fast_settings() -> MonitorSettings {
    MonitorSettings {
        poll_interval: Duration::from_millis(30),
        clock_interval: Duration::from_millis(20),
        shutdown_grace: Duration::from_secs(2),
    }
}

fn start(service: Arc<ScriptedService>, settings: MonitorSettings) -> EngineHandle {
    let engine = EngineHandle::new(service, settings).expect("engine");
    engine.send(EngineCommand::Start {
        job_id: "job-1".to_string(),
        generation: 1,
    });
    engine
}

/// Collects every event that arrives within `window`.
fn collect_for(engine: &EngineHandle, window: Duration) -> Vec<EngineEvent> {
    let deadline = Instant::now() + window;
    let mut events = Vec::new();
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        if let Some(event) = engine.recv_timeout(remaining) {
            events.push(event);
        }
    }
    events
}

fn wait_for<F>(engine: &EngineHandle, timeout: Duration, mut predicate: F) -> Option<EngineEvent>
where
    F: FnMut(&EngineEvent) -> bool,
{
    let deadline = Instant::now() + timeout;
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match engine.recv_timeout(remaining) {
            Some(event) if predicate(&event) => return Some(event),
            Some(_) => {}
            None => return None,
        }
    }
    None
}

fn is_poll(event: &EngineEvent) -> bool {
    matches!(event, EngineEvent::StatusPolled { .. })
}

#[test]
fn polls_immediately_and_keeps_polling() {
    let service = Arc::new(ScriptedService::with_statuses(vec![Ok(JobStatusSnapshot {
        status: Some("Segmentando".to_string()),
        ..JobStatusSnapshot::default()
    })]));
    let engine = start(service.clone(), fast_settings());

    let first = wait_for(&engine, Duration::from_millis(200), is_poll).expect("first poll");
    match first {
        EngineEvent::StatusPolled {
            generation, result, ..
        } => {
            assert_eq!(generation, 1);
            assert_eq!(result.unwrap().status.as_deref(), Some("Segmentando"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    let polls = collect_for(&engine, Duration::from_millis(200))
        .into_iter()
        .filter(is_poll)
        .count();
    assert!(polls >= 2, "expected repeated polls, got {polls}");
}

#[test]
fn transient_errors_do_not_stop_the_loop() {
    let service = Arc::new(ScriptedService::with_statuses(vec![
        Err(ServiceError::new(FailureKind::Network, "connection reset")),
        Err(ServiceError::new(FailureKind::Timeout, "timed out")),
    ]));
    let engine = start(service.clone(), fast_settings());

    let recovered = wait_for(&engine, Duration::from_millis(500), |event| {
        matches!(event, EngineEvent::StatusPolled { result: Ok(_), .. })
    });
    assert!(recovered.is_some());
    assert!(service.status_calls.load(Ordering::SeqCst) >= 3);
}

#[test]
fn metadata_is_loaded_once_at_start() {
    let engine = start(Arc::new(ScriptedService::default()), fast_settings());

    let events = collect_for(&engine, Duration::from_millis(150));
    let metadata: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::MetadataLoaded { result, .. } => Some(result.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(metadata.len(), 1);
    assert_eq!(
        metadata[0].as_ref().unwrap().created_at,
        Some(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
    );
}

#[test]
fn metadata_failure_is_delivered_as_error() {
    let service = Arc::new(ScriptedService {
        metadata_fails: true,
        ..ScriptedService::default()
    });
    let engine = start(service, fast_settings());

    let event = wait_for(&engine, Duration::from_millis(200), |event| {
        matches!(event, EngineEvent::MetadataLoaded { .. })
    });
    match event {
        Some(EngineEvent::MetadataLoaded { result, .. }) => {
            assert_eq!(result.unwrap_err().kind, FailureKind::HttpStatus(404));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn clock_ticks_independently_of_slow_polls() {
    let service = Arc::new(ScriptedService {
        status_delay: Duration::from_millis(400),
        ..ScriptedService::default()
    });
    let engine = start(service.clone(), fast_settings());

    let events = collect_for(&engine, Duration::from_millis(200));
    let ticks = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::ClockTicked { .. }))
        .count();
    assert!(ticks >= 3, "expected clock ticks while polls hang, got {ticks}");
    assert!(!events.iter().any(is_poll));
    // Ticks keep firing while earlier requests are still outstanding.
    assert!(service.status_calls.load(Ordering::SeqCst) >= 2);
}

#[test]
fn stop_polling_halts_polls_and_clock_but_keeps_navigation() {
    let service = Arc::new(ScriptedService::default());
    let engine = start(service.clone(), fast_settings());
    wait_for(&engine, Duration::from_millis(200), is_poll).expect("first poll");

    engine.send(EngineCommand::StopPolling { generation: 1 });
    engine.send(EngineCommand::ScheduleNavigation {
        job_id: "job-1".to_string(),
        generation: 1,
        delay: Duration::from_millis(150),
    });
    // Let in-flight work finish, then drop everything queued before the stop.
    std::thread::sleep(Duration::from_millis(40));
    while engine.try_recv().is_some() {}
    let calls_after_stop = service.status_calls.load(Ordering::SeqCst);

    let events = collect_for(&engine, Duration::from_millis(250));
    assert_eq!(service.status_calls.load(Ordering::SeqCst), calls_after_stop);
    assert!(!events.iter().any(is_poll));
    assert!(!events
        .iter()
        .any(|event| matches!(event, EngineEvent::ClockTicked { .. })));
    let navigations: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::NavigationDue { .. }))
        .collect();
    assert_eq!(
        navigations,
        vec![&EngineEvent::NavigationDue {
            generation: 1,
            job_id: "job-1".to_string()
        }]
    );
}

#[test]
fn stop_polling_for_an_old_generation_is_ignored() {
    let engine = start(Arc::new(ScriptedService::default()), fast_settings());
    engine.send(EngineCommand::StopPolling { generation: 7 });

    let polls = collect_for(&engine, Duration::from_millis(200))
        .into_iter()
        .filter(is_poll)
        .count();
    assert!(polls >= 2);
}

#[test]
fn teardown_cancels_pending_navigation() {
    let engine = start(Arc::new(ScriptedService::default()), fast_settings());
    engine.send(EngineCommand::ScheduleNavigation {
        job_id: "job-1".to_string(),
        generation: 1,
        delay: Duration::from_millis(80),
    });
    engine.send(EngineCommand::Teardown);

    let events = collect_for(&engine, Duration::from_millis(250));
    assert!(!events
        .iter()
        .any(|event| matches!(event, EngineEvent::NavigationDue { .. })));
}

#[test]
fn restart_replaces_the_previous_session() {
    let engine = start(Arc::new(ScriptedService::default()), fast_settings());
    wait_for(&engine, Duration::from_millis(200), is_poll).expect("first poll");

    engine.send(EngineCommand::Start {
        job_id: "job-2".to_string(),
        generation: 2,
    });
    // Skip anything already queued from the first session.
    std::thread::sleep(Duration::from_millis(50));
    while engine.try_recv().is_some() {}

    let events = collect_for(&engine, Duration::from_millis(150));
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| event.generation() == 2));
}

#[test]
fn terminate_reports_back_with_trigger() {
    let service = Arc::new(ScriptedService::default());
    let engine = start(service.clone(), fast_settings());
    engine.send(EngineCommand::Terminate {
        job_id: "job-1".to_string(),
        generation: 1,
        trigger: TerminationTrigger::User,
    });

    let event = wait_for(&engine, Duration::from_millis(200), |event| {
        matches!(event, EngineEvent::TerminateFinished { .. })
    });
    assert_eq!(
        event,
        Some(EngineEvent::TerminateFinished {
            generation: 1,
            trigger: TerminationTrigger::User,
            result: Ok(()),
        })
    );
    assert_eq!(service.terminate_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_the_handle_waits_for_a_server_reported_terminate() {
    let service = Arc::new(ScriptedService {
        terminate_delay: Duration::from_millis(50),
        ..ScriptedService::default()
    });
    let engine = start(service.clone(), fast_settings());
    engine.send(EngineCommand::StopPolling { generation: 1 });
    engine.send(EngineCommand::Terminate {
        job_id: "job-1".to_string(),
        generation: 1,
        trigger: TerminationTrigger::ServerReported,
    });
    engine.send(EngineCommand::Teardown);
    drop(engine);

    assert_eq!(service.terminate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.terminates_done.load(Ordering::SeqCst), 1);
}

#[test]
fn shutdown_gives_up_on_a_terminate_after_the_grace_period() {
    let service = Arc::new(ScriptedService {
        terminate_delay: Duration::from_secs(5),
        ..ScriptedService::default()
    });
    let settings = MonitorSettings {
        shutdown_grace: Duration::from_millis(100),
        ..fast_settings()
    };
    let engine = start(service.clone(), settings);
    engine.send(EngineCommand::Terminate {
        job_id: "job-1".to_string(),
        generation: 1,
        trigger: TerminationTrigger::User,
    });

    let started = Instant::now();
    drop(engine);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(service.terminates_done.load(Ordering::SeqCst), 0);
}
