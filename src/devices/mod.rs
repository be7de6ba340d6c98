/// Hardware capability interfaces
///
/// The pipeline never talks to a device directly. Each piece of hardware is
/// reached through one narrow trait, resolved once by whoever builds the
/// [`Devices`] bundle and injected into the supervisor.
///
/// ## Architecture
///
/// ```text
/// Devices
///   ├── DigitalSampler  (motion counter)      ── CounterFileSampler
///   ├── ImageSource     (optional camera)     ── SnapshotCamera
///   ├── Classifier      (optional vision)
///   ├── LightActuator   (animated lights)     ── StripSimulator
///   └── SoundActuator   (speaker)             ── RodioSpeaker
/// ```
///
/// Actuators hand back an [`EffectTask`] for every long-running operation so
/// the caller can join it before moving on.
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::detection::Detection;
use crate::error::{ActuatorError, CaptureError, ClassifyError, SensorError};

pub mod camera;
pub mod lights;
pub mod sensor;
pub mod speaker;

pub use camera::SnapshotCamera;
pub use lights::{LightPattern, Rgb, StripSimulator};
pub use sensor::CounterFileSampler;
pub use speaker::RodioSpeaker;

/// In-memory image handed from the camera to the classifier
pub type Image = image::RgbaImage;

/// Source of a monotonically changing counter (e.g. PIR edge count)
pub trait DigitalSampler: Send + Sync {
    fn read(&self) -> Result<i64, SensorError>;
}

/// Camera capability
pub trait ImageSource: Send + Sync {
    fn capture(&self) -> Result<Image, CaptureError>;
}

/// Object detector over captured images
///
/// Implementations must be stateless: the same image yields the same detections.
pub trait Classifier: Send + Sync {
    fn classify(&self, image: &Image) -> Result<Vec<Detection>, ClassifyError>;
}

/// Animated light strip
pub trait LightActuator: Send + Sync {
    /// Start animating; the returned task runs until [`LightActuator::stop`] is called
    fn start_animation(&self, pattern: &str) -> Result<EffectTask, ActuatorError>;

    /// Stop any running animation. Must succeed when nothing is running.
    fn stop(&self) -> Result<(), ActuatorError>;

    /// Turn every light off. Must succeed when already dark.
    fn clear(&self) -> Result<(), ActuatorError>;
}

/// Speaker
pub trait SoundActuator: Send + Sync {
    /// Start playing an asset; the returned task ends when playback does
    fn play(&self, asset: &Path, volume: f32) -> Result<EffectTask, ActuatorError>;

    /// Cut short any in-flight playback. Must succeed when silent.
    fn stop(&self) -> Result<(), ActuatorError>;
}

/// The capability providers for one prop
#[derive(Clone)]
pub struct Devices {
    pub sensor: Arc<dyn DigitalSampler>,
    pub camera: Option<Arc<dyn ImageSource>>,
    pub classifier: Option<Arc<dyn Classifier>>,
    pub lights: Arc<dyn LightActuator>,
    pub speaker: Arc<dyn SoundActuator>,
}

impl Devices {
    /// Bundle the mandatory providers; camera and classifier start out absent
    pub fn new(
        sensor: Arc<dyn DigitalSampler>,
        lights: Arc<dyn LightActuator>,
        speaker: Arc<dyn SoundActuator>,
    ) -> Self {
        Self {
            sensor,
            camera: None,
            classifier: None,
            lights,
            speaker,
        }
    }

    pub fn with_camera(mut self, camera: Arc<dyn ImageSource>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }
}

/// Joinable handle to an actuator sub-task
///
/// Dropping a task without joining it detaches the thread; the orchestrator
/// always joins.
#[must_use = "effect tasks must be joined"]
pub struct EffectTask {
    name: &'static str,
    handle: Option<JoinHandle<Result<(), ActuatorError>>>,
}

impl EffectTask {
    /// Run `work` on a named thread
    pub fn spawn<F>(name: &'static str, work: F) -> Result<Self, ActuatorError>
    where
        F: FnOnce() -> Result<(), ActuatorError> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("effect-{}", name))
            .spawn(work)
            .map_err(|source| ActuatorError::SpawnFailed { name, source })?;

        Ok(Self {
            name,
            handle: Some(handle),
        })
    }

    /// A task that has already completed successfully
    pub fn completed(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the task and return its result
    pub fn join(mut self) -> Result<(), ActuatorError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or(Err(ActuatorError::TaskPanicked(self.name))),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for EffectTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectTask")
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish()
    }
}
