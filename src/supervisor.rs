/// Supervisor
///
/// Owns a prop run from start to finish:
///
/// ```text
/// NotStarted ──> Running ──────────────────────────────> Stopping ──> Stopped
///                  │ prime sensor                           ▲
///                  │ startup effect                         │ cancel + join
///                  └─ motion poller ┐                       │
///                     effect loop   ┴─ first to end, or stop request
/// ```
///
/// Both loops run on scoped threads, so neither can outlive `run`.
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, select, Sender};
use parking_lot::Mutex;

use crate::detection::{DebounceConfig, DetectionFilter, MotionDebouncer};
use crate::devices::Devices;
use crate::effects::{EffectOrchestrator, EffectRunner, ProfileKind, ProfileTable};
use crate::error::PropError;
use crate::messaging::shutdown::{self, ShutdownSignal, ShutdownTrigger};
use crate::messaging::{EventBus, EventQueue, PropEvent};
use crate::state::{RunState, RunStateMachine, TransitionError};

/// Pipeline settings the supervisor hands to its loops
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub debounce: DebounceConfig,
    pub filter: DetectionFilter,
    pub profiles: ProfileTable,
}

impl From<&crate::config::Config> for PipelineSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            debounce: config.debounce_config(),
            filter: config.detection,
            profiles: config.profiles.clone(),
        }
    }
}

/// Cloneable handle for ending a run from another thread
#[derive(Debug, Clone)]
pub struct StopHandle {
    trigger: Arc<ShutdownTrigger>,
}

impl StopHandle {
    /// Ask the supervisor to stop; calling it again has no effect
    pub fn request_stop(&self) {
        if !self.trigger.is_triggered() {
            tracing::info!("Stop requested");
        }
        self.trigger.trigger();
    }
}

#[derive(Debug, Clone, Copy)]
enum LoopKind {
    Poller,
    Handler,
}

impl LoopKind {
    fn name(&self) -> &'static str {
        match self {
            LoopKind::Poller => "motion poller",
            LoopKind::Handler => "effect handler",
        }
    }
}

/// Reports a loop's exit when dropped, so a panicking loop is noticed too
struct LoopExit {
    kind: LoopKind,
    done: Sender<LoopKind>,
}

impl Drop for LoopExit {
    fn drop(&mut self) {
        let _ = self.done.try_send(self.kind);
    }
}

/// Runs the motion poller and effect handler for one prop
pub struct Supervisor {
    devices: Devices,
    settings: PipelineSettings,
    bus: EventBus,
    machine: Mutex<RunStateMachine>,
    stop_trigger: Arc<ShutdownTrigger>,
    stop_signal: ShutdownSignal,
}

impl Supervisor {
    pub fn new(devices: Devices, settings: PipelineSettings) -> Self {
        let (trigger, signal) = shutdown::channel();
        Self {
            devices,
            settings,
            bus: EventBus::new(),
            machine: Mutex::new(RunStateMachine::new()),
            stop_trigger: Arc::new(trigger),
            stop_signal: signal,
        }
    }

    /// Bus carrying this run's lifecycle notifications
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            trigger: Arc::clone(&self.stop_trigger),
        }
    }

    /// Same as calling [`StopHandle::request_stop`]
    pub fn request_stop(&self) {
        self.stop_handle().request_stop();
    }

    pub fn state(&self) -> RunState {
        self.machine.lock().state()
    }

    /// Run until a stop request or a fatal error, then release the hardware
    ///
    /// A stop request yields `Ok(())`; a sensor or actuator failure is
    /// returned after both loops have been cancelled and joined.
    pub fn run(self) -> Result<(), PropError> {
        self.transition(RunStateMachine::start)?;
        tracing::info!("<-----STARTING CANDY BUCKET----->");

        let result = self.supervise();

        if self.state().is_running() {
            self.transition(RunStateMachine::stop)?;
        }
        self.transition(RunStateMachine::mark_stopped)?;

        match &result {
            Ok(()) => tracing::info!("Stopped candy bucket program"),
            Err(e) => {
                tracing::error!("Candy bucket stopped with error: {}", e);
                self.bus.publish(PropEvent::Fatal {
                    message: e.to_string(),
                });
            }
        }

        drop(self.devices);
        tracing::info!("Released hardware");
        result
    }

    fn supervise(&self) -> Result<(), PropError> {
        if self.stop_signal.is_triggered() {
            return Ok(());
        }

        let mut debouncer = MotionDebouncer::new(Arc::clone(&self.devices.sensor), self.settings.debounce)
            .with_camera(self.devices.camera.clone())
            .with_bus(self.bus.clone());
        debouncer.prime()?;

        tracing::info!("Starting lights and sound");
        let runner = EffectRunner::new(
            Arc::clone(&self.devices.lights),
            Arc::clone(&self.devices.speaker),
            self.bus.clone(),
        );
        let report = runner.run(
            ProfileKind::Startup,
            &self.settings.profiles.startup,
            0,
            &self.stop_signal,
        )?;
        if report.interrupted || self.stop_signal.is_triggered() {
            tracing::info!("Stop requested during startup effect");
            return Ok(());
        }

        let orchestrator = EffectOrchestrator::new(
            &self.devices,
            self.settings.profiles.clone(),
            self.settings.filter,
            self.bus.clone(),
        );

        tracing::info!("Starting working tasks");
        self.run_loops(debouncer, orchestrator)
    }

    fn run_loops(
        &self,
        mut debouncer: MotionDebouncer,
        mut orchestrator: EffectOrchestrator,
    ) -> Result<(), PropError> {
        let queue = EventQueue::new();
        let (cancel, cancelled) = shutdown::channel();
        let (done_tx, done_rx) = bounded::<LoopKind>(2);

        thread::scope(|scope| {
            let poller = {
                let queue = queue.clone();
                let cancelled = cancelled.clone();
                let exit = LoopExit {
                    kind: LoopKind::Poller,
                    done: done_tx.clone(),
                };
                thread::Builder::new()
                    .name("motion-poller".to_string())
                    .spawn_scoped(scope, move || {
                        let _exit = exit;
                        let result = debouncer.run(&queue, &cancelled);
                        tracing::debug!(
                            events = debouncer.events_emitted(),
                            last_tick = ?debouncer.last_tick(),
                            "Motion poller finished"
                        );
                        result
                    })
            };
            let handler = {
                let queue = queue.clone();
                let cancelled = cancelled.clone();
                let exit = LoopExit {
                    kind: LoopKind::Handler,
                    done: done_tx.clone(),
                };
                thread::Builder::new()
                    .name("effect-handler".to_string())
                    .spawn_scoped(scope, move || {
                        let _exit = exit;
                        orchestrator.run(&queue, &cancelled)
                    })
            };
            drop(done_tx);

            let (poller, handler) = match (poller, handler) {
                (Ok(poller), Ok(handler)) => (poller, handler),
                (Err(e), _) => {
                    // Whatever did start must wind down before the scope can end
                    cancel.trigger();
                    return Err(PropError::Spawn(LoopKind::Poller.name(), e));
                }
                (_, Err(e)) => {
                    cancel.trigger();
                    return Err(PropError::Spawn(LoopKind::Handler.name(), e));
                }
            };

            select! {
                recv(done_rx) -> ended => match ended {
                    Ok(kind) => tracing::warn!("The {} loop ended, stopping", kind.name()),
                    Err(_) => tracing::warn!("Both loops ended, stopping"),
                },
                recv(self.stop_signal.receiver()) -> _ => {
                    tracing::info!("Stopping working tasks");
                }
            }

            cancel.trigger();
            if let Some(ran_for) = self.state().running_duration() {
                tracing::info!("Ran for {:.1}s", ran_for.as_secs_f64());
            }
            let stopping = self.transition(RunStateMachine::stop);

            // Join both before surfacing anything, so no handle is left to the scope
            let poll_result = poller.join();
            let handle_result = handler.join();

            if !queue.is_empty() {
                tracing::info!("{} motion events left unhandled", queue.len());
            }

            stopping?;
            poll_result.map_err(|_| PropError::LoopPanicked(LoopKind::Poller.name()))??;
            handle_result.map_err(|_| PropError::LoopPanicked(LoopKind::Handler.name()))??;
            Ok(())
        })
    }

    fn transition(
        &self,
        step: fn(&mut RunStateMachine) -> Result<RunState, TransitionError>,
    ) -> Result<(), PropError> {
        let (old_state, new_state) = {
            let mut machine = self.machine.lock();
            let old_state = step(&mut machine)?;
            (old_state, machine.state())
        };

        tracing::info!("Run state: {} -> {}", old_state.description(), new_state.description());
        self.bus.publish(PropEvent::StateChanged {
            old_state,
            new_state,
        });
        Ok(())
    }
}
