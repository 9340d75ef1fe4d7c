use std::time::Duration;

use monitor_logging::{monitor_debug, monitor_info, monitor_warn};

use crate::{Effect, MonitorState, Msg, PhaseIndex, TerminationTrigger};

/// Pause between reaching `Completed` and navigating to the results view.
pub const NAVIGATION_DELAY: Duration = Duration::from_millis(1500);

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: MonitorState, msg: Msg) -> (MonitorState, Vec<Effect>) {
    let effects = match msg {
        Msg::JobMounted { job_id } => {
            let had_job = state.job_id().is_some();
            let generation = state.mount(job_id.clone());
            monitor_info!("Monitoring job {} (generation {})", job_id, generation);
            let mut effects = Vec::with_capacity(2);
            if had_job {
                effects.push(Effect::Teardown);
            }
            effects.push(Effect::StartMonitoring { job_id, generation });
            effects
        }
        Msg::JobUnmounted => {
            if state.job_id().is_none() {
                return (state, Vec::new());
            }
            state.unmount();
            vec![Effect::Teardown]
        }
        Msg::MetadataLoaded {
            generation,
            created_at,
            now,
        } => {
            if !state.is_current(generation) {
                return (state, Vec::new());
            }
            if created_at.is_none() {
                monitor_debug!("No creation time for job; elapsed clock starts now");
            }
            state.seed_created_at(created_at.unwrap_or(now), now);
            Vec::new()
        }
        Msg::StatusReceived {
            generation,
            snapshot,
            received_at,
        } => {
            // Terminal states are absorbing; late responses must not revive the job.
            if !state.is_current(generation) || !state.lifecycle().is_active() {
                return (state, Vec::new());
            }
            let is_completed = snapshot.is_completed;
            let is_failed = snapshot.is_failed;
            let phase = state.apply_snapshot(snapshot, received_at);

            if phase == PhaseIndex::Stopped {
                monitor_info!("Server reports job as terminated");
                handle_termination_state(&mut state, TerminationTrigger::ServerReported)
            } else if is_completed {
                let schedule = state.complete();
                monitor_info!("Job completed");
                let mut effects = vec![Effect::StopPolling { generation }];
                if schedule {
                    if let Some(job_id) = state.current_job() {
                        effects.push(Effect::ScheduleNavigation {
                            job_id,
                            generation,
                            delay: NAVIGATION_DELAY,
                        });
                    }
                }
                effects
            } else if is_failed {
                state.fail();
                monitor_warn!("Job reported as failed");
                vec![Effect::StopPolling { generation }]
            } else {
                Vec::new()
            }
        }
        Msg::StatusPollFailed { generation, reason } => {
            if state.is_current(generation) {
                monitor_debug!("Status poll failed, will retry: {}", reason);
            }
            Vec::new()
        }
        Msg::ClockTicked { generation, now } => {
            if state.is_current(generation) {
                state.refresh_elapsed(now);
            }
            Vec::new()
        }
        Msg::StopRequested => {
            if !state.lifecycle().is_active() || state.is_terminating() {
                return (state, Vec::new());
            }
            let Some(job_id) = state.current_job() else {
                return (state, Vec::new());
            };
            if !state.claim_terminate() {
                return (state, Vec::new());
            }
            state.begin_terminating();
            monitor_info!("User requested stop for job {}", job_id);
            vec![Effect::Terminate {
                job_id,
                generation: state.generation(),
                trigger: TerminationTrigger::User,
            }]
        }
        Msg::TerminateFinished {
            generation,
            trigger,
            outcome,
        } => {
            if !state.is_current(generation) {
                return (state, Vec::new());
            }
            state.finish_terminate();
            match (trigger, outcome) {
                (TerminationTrigger::User, outcome) => {
                    let mut effects = Vec::new();
                    if let Err(reason) = outcome {
                        let message = format!("Could not stop the analysis: {reason}");
                        monitor_warn!("{}", message);
                        state.set_error(message.clone());
                        effects.push(Effect::Alert { message });
                    }
                    effects.extend(handle_termination_state(&mut state, trigger));
                    effects
                }
                (TerminationTrigger::ServerReported, Err(reason)) => {
                    monitor_warn!("Terminate call after server-reported stop failed: {}", reason);
                    Vec::new()
                }
                (TerminationTrigger::ServerReported, Ok(())) => Vec::new(),
            }
        }
        Msg::NavigationDue { generation } => {
            if !state.is_current(generation) || !state.mark_navigated() {
                return (state, Vec::new());
            }
            match state.current_job() {
                Some(job_id) => vec![Effect::NavigateToResults { job_id }],
                None => Vec::new(),
            }
        }
    };

    (state, effects)
}

/// Moves the monitor into the terminated state and stops polling.
///
/// A server-reported stop still issues the terminate call once, unless the
/// user already did.
fn handle_termination_state(state: &mut MonitorState, trigger: TerminationTrigger) -> Vec<Effect> {
    if !state.enter_terminated() {
        return Vec::new();
    }
    let generation = state.generation();
    let mut effects = vec![Effect::StopPolling { generation }];
    if trigger == TerminationTrigger::ServerReported {
        if let Some(job_id) = state.current_job().filter(|_| state.claim_terminate()) {
            effects.push(Effect::Terminate {
                job_id,
                generation,
                trigger,
            });
        }
    }
    effects
}
