/// Messaging module
///
/// Everything that crosses a thread boundary in the pipeline:
/// - **Queue**: motion events from the debouncer to the orchestrator (FIFO, single consumer)
/// - **Bus**: lifecycle notifications broadcast to observers
/// - **Shutdown**: the cancellation token every wait in the pipeline listens to
///
/// ## Architecture
///
/// ```text
/// ┌───────────┐  MotionEvent   ┌────────────┐  ┌──────────────┐
/// │ Debouncer │ ─────────────> │ EventQueue │─>│ Orchestrator │
/// └───────────┘                └────────────┘  └──────────────┘
///       │                                             │
///       └──────────────── PropEvent ──────────────────┤
///                                                     ▼
///                                              ┌────────────┐
///                                              │  EventBus  │──> observers
///                                              └────────────┘
/// ```

pub mod bus;
pub mod events;
pub mod queue;
pub mod shutdown;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use events::{MotionEvent, PropEvent};
pub use queue::EventQueue;
pub use shutdown::{ShutdownSignal, ShutdownTrigger, Wait};
