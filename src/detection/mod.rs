/// Detection module
///
/// Everything that decides *that* something happened and *what* it was.
///
/// ## Architecture
///
/// ```text
/// MotionDebouncer
///   ├── DigitalSampler (counter reads)
///   └── ImageSource    (optional capture on motion)
///
/// Classification routing
///   ├── DetectionFilter (drop line + confidence gate)
///   └── judge           (treat > trick > nothing)
/// ```

pub mod classify;
pub mod debouncer;

// Re-export commonly used types
pub use classify::{judge, Detection, DetectionFilter, Verdict, TREAT_CLASS, TRICK_CLASS};
pub use debouncer::{DebounceConfig, MotionDebouncer};
