/// Supervisor lifecycle state machine
///
/// Represents the lifecycle of a prop run with explicit state transitions.

use std::time::Instant;

/// Lifecycle state of a supervised run
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RunState {
    /// Supervisor has been built but `run` has not been called
    #[default]
    NotStarted,

    /// Startup effect and the polling/handling loops are active
    Running { since: Instant },

    /// Cancellation has been broadcast, loops are winding down
    Stopping,

    /// Both loops have been joined
    Stopped,
}

impl RunState {
    /// Check if the run has finished
    pub fn is_stopped(&self) -> bool {
        matches!(self, RunState::Stopped)
    }

    /// Check if the run is active
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }

    /// Get the time since the run started (if running)
    pub fn running_duration(&self) -> Option<std::time::Duration> {
        match self {
            RunState::Running { since } => Some(since.elapsed()),
            _ => None,
        }
    }

    /// Get a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            RunState::NotStarted => "Not started",
            RunState::Running { .. } => "Running",
            RunState::Stopping => "Stopping...",
            RunState::Stopped => "Stopped",
        }
    }
}

/// Invalid lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// A run can only be started once
    AlreadyStarted,

    /// Cannot stop a run that never started
    NotStarted,

    /// Cannot stop a run that already finished
    AlreadyStopped,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::AlreadyStarted => write!(f, "Run was already started"),
            TransitionError::NotStarted => write!(f, "Run has not started"),
            TransitionError::AlreadyStopped => write!(f, "Run is already stopped"),
        }
    }
}

impl std::error::Error for TransitionError {}

/// State machine for run lifecycle transitions
#[derive(Debug, Default)]
pub struct RunStateMachine {
    state: RunState,
}

impl RunStateMachine {
    /// Create a new state machine in the NotStarted state
    pub fn new() -> Self {
        Self {
            state: RunState::NotStarted,
        }
    }

    /// Get the current state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Transition from NotStarted to Running
    pub fn start(&mut self) -> Result<RunState, TransitionError> {
        match self.state {
            RunState::NotStarted => Ok(self.set(RunState::Running {
                since: Instant::now(),
            })),
            _ => Err(TransitionError::AlreadyStarted),
        }
    }

    /// Transition from Running to Stopping
    pub fn stop(&mut self) -> Result<RunState, TransitionError> {
        match self.state {
            RunState::Running { .. } => Ok(self.set(RunState::Stopping)),
            RunState::NotStarted => Err(TransitionError::NotStarted),
            RunState::Stopping | RunState::Stopped => Err(TransitionError::AlreadyStopped),
        }
    }

    /// Transition from Stopping to Stopped
    pub fn mark_stopped(&mut self) -> Result<RunState, TransitionError> {
        match self.state {
            RunState::Stopping => Ok(self.set(RunState::Stopped)),
            RunState::Stopped => Err(TransitionError::AlreadyStopped),
            _ => Err(TransitionError::NotStarted),
        }
    }

    // Returns the previous state
    fn set(&mut self, next: RunState) -> RunState {
        std::mem::replace(&mut self.state, next)
    }
}
