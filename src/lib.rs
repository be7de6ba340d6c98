//! Candy Bucket
//!
//! Controller for an animatronic Halloween candy bucket. A motion sensor's
//! edge counter is polled for movement; each debounced motion event is
//! answered with one light and sound effect, optionally picked by
//! classifying a photo of the bucket ("treat" when candy went in, "trick"
//! when it was taken out).
//!
//! Hardware is reached through the capability traits in [`devices`], so the
//! pipeline runs the same against real providers and test doubles.
//!
//! ```rust,ignore
//! let devices = Devices::new(sensor, lights, speaker);
//! let supervisor = Supervisor::new(devices, PipelineSettings::from(&config));
//! let stop = supervisor.stop_handle();
//! ctrlc::set_handler(move || stop.request_stop())?;
//! supervisor.run()?;
//! ```

pub mod config;
pub mod detection;
pub mod devices;
pub mod effects;
pub mod error;
pub mod messaging;
pub mod state;
pub mod supervisor;

pub use config::{Config, ValidationError};
pub use devices::{Classifier, DigitalSampler, Devices, EffectTask, Image, ImageSource, LightActuator, SoundActuator};
pub use error::{ActuatorError, AppResult, CaptureError, ClassifyError, ConfigError, PropError, SensorError};
pub use messaging::{EventBus, PropEvent};
pub use state::RunState;
pub use supervisor::{PipelineSettings, StopHandle, Supervisor};
