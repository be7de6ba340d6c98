/// Effect orchestrator
///
/// Consumes motion events one at a time and reacts to each with exactly one
/// effect. With a classifier attached, the bucket is photographed and the
/// verdict picks the profile; a failed capture or classification drops the
/// event and the loop carries on.
use std::sync::Arc;

use crate::detection::{judge, DetectionFilter, Verdict};
use crate::devices::{Classifier, Devices, Image, ImageSource};
use crate::error::ActuatorError;
use crate::messaging::{EventBus, EventQueue, MotionEvent, PropEvent, ShutdownSignal};

use super::profile::{ProfileKind, ProfileTable};
use super::runner::EffectRunner;

/// Reacts to motion events with light and sound effects
pub struct EffectOrchestrator {
    runner: EffectRunner,
    camera: Option<Arc<dyn ImageSource>>,
    classifier: Option<Arc<dyn Classifier>>,
    profiles: ProfileTable,
    filter: DetectionFilter,
    bus: EventBus,
    effects_run: u64,
    events_dropped: u64,
}

impl EffectOrchestrator {
    pub fn new(devices: &Devices, profiles: ProfileTable, filter: DetectionFilter, bus: EventBus) -> Self {
        Self {
            runner: EffectRunner::new(
                Arc::clone(&devices.lights),
                Arc::clone(&devices.speaker),
                bus.clone(),
            ),
            camera: devices.camera.clone(),
            classifier: devices.classifier.clone(),
            profiles,
            filter,
            bus,
            effects_run: 0,
            events_dropped: 0,
        }
    }

    pub fn effects_run(&self) -> u64 {
        self.effects_run
    }

    pub fn events_dropped(&self) -> u64 {
        self.events_dropped
    }

    /// Handle events until shutdown or an actuator failure
    ///
    /// Cancellation is a normal exit and returns `Ok(())`.
    pub fn run(&mut self, queue: &EventQueue, shutdown: &ShutdownSignal) -> Result<(), ActuatorError> {
        loop {
            tracing::info!("Waiting for motion event");
            let Some(event) = queue.take(shutdown) else {
                break;
            };
            self.handle(event, shutdown)?;
        }

        tracing::info!(
            "Effect handling stopped ({} effects, {} dropped events)",
            self.effects_run,
            self.events_dropped
        );
        Ok(())
    }

    /// React to a single event
    ///
    /// Returns the profile that ran, or `None` if the event was dropped.
    pub fn handle(
        &mut self,
        event: MotionEvent,
        shutdown: &ShutdownSignal,
    ) -> Result<Option<ProfileKind>, ActuatorError> {
        let sequence = event.sequence;
        tracing::info!(sequence, tick = event.tick, "Handling motion event");

        let kind = match self.classifier.clone() {
            None => ProfileKind::Motion,
            Some(classifier) => match self.classify_with_cue(event, classifier.as_ref(), shutdown)? {
                Ok(verdict) => verdict.into(),
                Err(reason) => {
                    tracing::warn!(sequence, "Dropping motion event: {}", reason);
                    self.events_dropped += 1;
                    self.bus.publish(PropEvent::EventDropped { sequence, reason });
                    return Ok(None);
                }
            },
        };

        if shutdown.is_triggered() {
            return Ok(None);
        }

        let Some(profile) = self.profiles.get(kind) else {
            return Ok(None);
        };
        tracing::info!(sequence, "Selected {} effect", kind);

        self.runner.run(kind, profile, sequence, shutdown)?;
        self.effects_run += 1;
        Ok(Some(kind))
    }

    /// Classify while the pending cue plays; the cue is joined before returning
    ///
    /// The outer result carries actuator failures, the inner one vision failures.
    fn classify_with_cue(
        &self,
        event: MotionEvent,
        classifier: &dyn Classifier,
        shutdown: &ShutdownSignal,
    ) -> Result<Result<Verdict, String>, ActuatorError> {
        let cue = match &self.profiles.pending {
            Some(pending) => Some(self.runner.play_cue(pending)?),
            None => None,
        };

        let verdict = self.classify(event, classifier);

        if let Some(cue) = cue {
            self.runner.finish_cue(cue, shutdown)?;
        }

        Ok(verdict)
    }

    fn classify(&self, event: MotionEvent, classifier: &dyn Classifier) -> Result<Verdict, String> {
        let image = match event.captured_image {
            Some(image) => image,
            None => self.capture()?,
        };

        tracing::info!("Looking for candy");
        let detections = classifier
            .classify(&image)
            .map_err(|e| format!("classification failed: {}", e))?;
        tracing::debug!("Detected the following: {:?}", detections);

        let dropped = self.filter.apply(detections);
        tracing::info!("Found candy: {:?}", dropped);

        Ok(judge(&dropped))
    }

    fn capture(&self) -> Result<Image, String> {
        let camera = self
            .camera
            .as_ref()
            .ok_or_else(|| "no camera configured".to_string())?;

        camera.capture().map_err(|e| format!("capture failed: {}", e))
    }
}
