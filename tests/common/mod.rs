//! Scripted providers shared by the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use candy_bucket::detection::{DebounceConfig, Detection, DetectionFilter};
use candy_bucket::effects::{EffectProfile, ProfileTable};
use candy_bucket::messaging::shutdown::{self, ShutdownTrigger};
use candy_bucket::{
    ActuatorError, CaptureError, Classifier, ClassifyError, DigitalSampler, EffectTask, Image, ImageSource,
    LightActuator, PipelineSettings, PropEvent, SensorError, SoundActuator,
};

/// One actuator call, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Animate(String),
    LightsStop,
    LightsClear,
    Play(PathBuf),
    SoundStop,
}

/// Actuator call log shared between the mock lights and speaker
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(Call, Instant)>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.calls.lock().push((call, Instant::now()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|(call, _)| call.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|(c, _)| c == call).count()
    }

    pub fn plays(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Play(path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

/// Counter that walks through a script, then holds the last value
///
/// With `fail_after_script` the read after the script ends fails instead.
pub struct ScriptedSampler {
    script: Mutex<VecDeque<i64>>,
    last: Mutex<i64>,
    fail_after_script: bool,
    reads: Mutex<usize>,
}

impl ScriptedSampler {
    pub fn new(values: &[i64]) -> Self {
        Self {
            script: Mutex::new(values.iter().copied().collect()),
            last: Mutex::new(values.first().copied().unwrap_or(0)),
            fail_after_script: false,
            reads: Mutex::new(0),
        }
    }

    pub fn failing_after(values: &[i64]) -> Self {
        Self {
            fail_after_script: true,
            ..Self::new(values)
        }
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock()
    }
}

impl DigitalSampler for ScriptedSampler {
    fn read(&self) -> Result<i64, SensorError> {
        *self.reads.lock() += 1;
        match self.script.lock().pop_front() {
            Some(value) => {
                *self.last.lock() = value;
                Ok(value)
            }
            None if self.fail_after_script => Err(SensorError::Unavailable("sensor unplugged".to_string())),
            None => Ok(*self.last.lock()),
        }
    }
}

/// Light strip that records calls and animates until stopped
pub struct RecordingLights {
    log: CallLog,
    fail_pattern: Option<String>,
    panic_pattern: Option<String>,
}

impl RecordingLights {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_pattern: None,
            panic_pattern: None,
        }
    }

    /// Starting `pattern` fails
    pub fn failing_on(log: CallLog, pattern: &str) -> Self {
        Self {
            fail_pattern: Some(pattern.to_string()),
            ..Self::new(log)
        }
    }

    /// Starting `pattern` panics the calling thread
    pub fn panicking_on(log: CallLog, pattern: &str) -> Self {
        Self {
            panic_pattern: Some(pattern.to_string()),
            ..Self::new(log)
        }
    }
}

impl LightActuator for RecordingLights {
    fn start_animation(&self, pattern: &str) -> Result<EffectTask, ActuatorError> {
        if self.fail_pattern.as_deref() == Some(pattern) {
            return Err(ActuatorError::UnknownPattern(pattern.to_string()));
        }
        if self.panic_pattern.as_deref() == Some(pattern) {
            panic!("light driver crashed on {}", pattern);
        }
        self.log.push(Call::Animate(pattern.to_string()));
        Ok(EffectTask::completed("animation"))
    }

    fn stop(&self) -> Result<(), ActuatorError> {
        self.log.push(Call::LightsStop);
        Ok(())
    }

    fn clear(&self) -> Result<(), ActuatorError> {
        self.log.push(Call::LightsClear);
        Ok(())
    }
}

/// Speaker that records calls without making noise
///
/// With a playback length, each sound keeps its task alive for that long
/// unless `stop` is called.
pub struct RecordingSpeaker {
    log: CallLog,
    volumes: Mutex<Vec<f32>>,
    playback: Option<Duration>,
    playing: Mutex<Option<ShutdownTrigger>>,
}

impl RecordingSpeaker {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            volumes: Mutex::new(Vec::new()),
            playback: None,
            playing: Mutex::new(None),
        }
    }

    pub fn lingering(log: CallLog, playback: Duration) -> Self {
        Self {
            playback: Some(playback),
            ..Self::new(log)
        }
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.volumes.lock().clone()
    }
}

impl SoundActuator for RecordingSpeaker {
    fn play(&self, asset: &Path, volume: f32) -> Result<EffectTask, ActuatorError> {
        self.log.push(Call::Play(asset.to_path_buf()));
        self.volumes.lock().push(volume);

        let Some(playback) = self.playback else {
            return Ok(EffectTask::completed("sound"));
        };
        let (trigger, signal) = shutdown::channel();
        if let Some(previous) = self.playing.lock().replace(trigger) {
            previous.trigger();
        }
        EffectTask::spawn("sound", move || {
            signal.sleep(playback);
            Ok(())
        })
    }

    fn stop(&self) -> Result<(), ActuatorError> {
        self.log.push(Call::SoundStop);
        if let Some(playing) = self.playing.lock().take() {
            playing.trigger();
        }
        Ok(())
    }
}

/// Camera returning a blank frame, or failing every capture
pub struct MockCamera {
    fail: bool,
    captures: Mutex<usize>,
}

impl MockCamera {
    pub fn working() -> Self {
        Self {
            fail: false,
            captures: Mutex::new(0),
        }
    }

    pub fn broken() -> Self {
        Self {
            fail: true,
            captures: Mutex::new(0),
        }
    }

    pub fn captures(&self) -> usize {
        *self.captures.lock()
    }
}

impl ImageSource for MockCamera {
    fn capture(&self) -> Result<Image, CaptureError> {
        *self.captures.lock() += 1;
        if self.fail {
            Err(CaptureError::Unavailable("lens cap on".to_string()))
        } else {
            Ok(Image::new(4, 4))
        }
    }
}

/// Classifier answering from a script; an exhausted script returns nothing
pub struct ScriptedClassifier {
    answers: Mutex<VecDeque<Result<Vec<Detection>, String>>>,
}

impl ScriptedClassifier {
    pub fn new(answers: Vec<Result<Vec<Detection>, String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
        }
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, _image: &Image) -> Result<Vec<Detection>, ClassifyError> {
        match self.answers.lock().pop_front() {
            Some(Ok(detections)) => Ok(detections),
            Some(Err(reason)) => Err(ClassifyError::Unavailable(reason)),
            None => Ok(Vec::new()),
        }
    }
}

/// Short durations so the suite stays fast
pub fn fast_profiles() -> ProfileTable {
    ProfileTable {
        startup: EffectProfile::new("startup.wav", "pulse", 20),
        pending: Some(EffectProfile::new("pending.mp3", "solid", 0).sound_only()),
        treat: EffectProfile::new("treat.wav", "chase", 20),
        trick: EffectProfile::new("trick.mp3", "flicker", 20).sound_only(),
        motion: EffectProfile::new("motion.mp3", "flicker", 20),
    }
}

pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        debounce: DebounceConfig {
            cooldown: Duration::from_millis(30),
            idle_poll: Duration::from_millis(5),
            capture_on_motion: false,
        },
        filter: DetectionFilter::default(),
        profiles: fast_profiles(),
    }
}

/// Collect bus events until `done` says so or the timeout passes
pub fn collect_until<F>(events: &Receiver<PropEvent>, timeout: Duration, mut done: F) -> Vec<PropEvent>
where
    F: FnMut(&[PropEvent]) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();

    while !done(&seen) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(event) => seen.push(event),
            Err(_) => break,
        }
    }

    seen
}

/// Number of finished effects for motion events (startup excluded)
pub fn finished_effects(events: &[PropEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PropEvent::EffectFinished { sequence, .. } if *sequence > 0))
        .count()
}
