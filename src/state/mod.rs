/// State management module
///
/// Lifecycle state of a supervised prop run.

pub mod process_state;

// Re-export commonly used types
pub use process_state::{RunState, RunStateMachine, TransitionError};
