/// Effects module
///
/// Turns motion events into synchronized light and sound effects.
///
/// ## Architecture
///
/// ```text
/// EffectOrchestrator            (one event at a time)
///   ├── Classifier verdict ──> ProfileKind ──> ProfileTable
///   └── EffectRunner
///       ├── LightActuator::start_animation ─┐
///       ├── SoundActuator::play            ─┤ concurrent
///       ├── wait duration (cancellable)     │
///       ├── lights stop + clear             │
///       └── join both tasks  <──────────────┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let mut orchestrator = EffectOrchestrator::new(&devices, profiles, filter, bus);
/// orchestrator.run(&queue, &shutdown)?;
/// ```

pub mod orchestrator;
pub mod profile;
pub mod runner;

// Re-export commonly used types
pub use orchestrator::EffectOrchestrator;
pub use profile::{EffectProfile, ProfileKind, ProfileTable};
pub use runner::{EffectReport, EffectRunner};
