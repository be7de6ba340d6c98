/// Event types for the prop
///
/// [`MotionEvent`] is the unit of work handed from the debouncer to the
/// orchestrator. [`PropEvent`] notifications describe what the pipeline did
/// (past tense) and are broadcast to observers on the bus.
use std::time::Instant;

use crate::devices::Image;
use crate::effects::ProfileKind;
use crate::state::RunState;

/// A discrete motion detection produced by the debouncer
#[derive(Debug, Clone)]
pub struct MotionEvent {
    /// Position of this event in detection order (starts at 1)
    pub sequence: u64,
    /// Sensor counter value that triggered the event
    pub tick: i64,
    /// When the transition was observed
    pub observed_at: Instant,
    /// Image captured at detection time, if inline capture is enabled
    pub captured_image: Option<Image>,
}

impl MotionEvent {
    /// Create an event without an attached image
    pub fn new(sequence: u64, tick: i64) -> Self {
        Self {
            sequence,
            tick,
            observed_at: Instant::now(),
            captured_image: None,
        }
    }

    /// Attach an image captured alongside the detection
    pub fn with_image(mut self, image: Image) -> Self {
        self.captured_image = Some(image);
        self
    }
}

/// Lifecycle notifications
#[derive(Debug, Clone)]
pub enum PropEvent {
    /// Supervisor lifecycle changed
    StateChanged { old_state: RunState, new_state: RunState },

    /// The debouncer enqueued a motion event
    MotionDetected { sequence: u64, tick: i64 },

    /// An effect profile started (sequence 0 is the startup effect)
    EffectStarted { kind: ProfileKind, sequence: u64 },

    /// An effect profile finished and its tasks were joined
    EffectFinished {
        kind: ProfileKind,
        sequence: u64,
        interrupted: bool,
    },

    /// A motion event was skipped because vision failed
    EventDropped { sequence: u64, reason: String },

    /// A loop ended with a fatal error
    Fatal { message: String },
}

impl PropEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            PropEvent::StateChanged { new_state, .. } => {
                format!("Run state: {}", new_state.description())
            }
            PropEvent::MotionDetected { sequence, tick } => {
                format!("Motion #{} detected (tick {})", sequence, tick)
            }
            PropEvent::EffectStarted { kind, .. } => format!("Effect started: {}", kind),
            PropEvent::EffectFinished {
                kind, interrupted, ..
            } => {
                if *interrupted {
                    format!("Effect interrupted: {}", kind)
                } else {
                    format!("Effect finished: {}", kind)
                }
            }
            PropEvent::EventDropped { sequence, reason } => {
                format!("Motion #{} dropped: {}", sequence, reason)
            }
            PropEvent::Fatal { message } => format!("Fatal: {}", message),
        }
    }
}
