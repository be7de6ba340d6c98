/// Effect runner
///
/// Runs one profile to completion: animation and sound start together, the
/// lights run for the profile's duration, then the lights are stopped and
/// cleared and both tasks are joined. The lights are stopped and cleared on
/// every path out of [`EffectRunner::run`], including cancellation and
/// actuator failures.
use std::sync::Arc;
use std::time::Duration;

use crate::devices::{EffectTask, LightActuator, SoundActuator};
use crate::error::ActuatorError;
use crate::messaging::{EventBus, PropEvent, ShutdownSignal};

use super::profile::{EffectProfile, ProfileKind};

/// How often a lingering sound is checked while waiting on shutdown
const SOUND_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What happened while running a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectReport {
    pub kind: ProfileKind,
    /// Shutdown cut the effect window or its sound short
    pub interrupted: bool,
}

/// Drives the light and sound actuators for one effect at a time
#[derive(Clone)]
pub struct EffectRunner {
    lights: Arc<dyn LightActuator>,
    speaker: Arc<dyn SoundActuator>,
    bus: EventBus,
}

impl EffectRunner {
    pub fn new(lights: Arc<dyn LightActuator>, speaker: Arc<dyn SoundActuator>, bus: EventBus) -> Self {
        Self {
            lights,
            speaker,
            bus,
        }
    }

    /// Run `profile` and return once every sub-task has been joined
    pub fn run(
        &self,
        kind: ProfileKind,
        profile: &EffectProfile,
        sequence: u64,
        shutdown: &ShutdownSignal,
    ) -> Result<EffectReport, ActuatorError> {
        tracing::info!(
            profile = %kind,
            sequence,
            "Starting effect ({} for {:?})",
            profile.sound_asset.display(),
            profile.duration()
        );
        self.bus.publish(PropEvent::EffectStarted { kind, sequence });

        let animation = if profile.has_animation {
            match self.lights.start_animation(&profile.light_pattern) {
                Ok(task) => Some(task),
                Err(e) => {
                    if let Err(cleanup) = self.finish(None, None, true, shutdown) {
                        tracing::warn!(profile = %kind, sequence, "Cleanup after animation failure: {}", cleanup);
                    }
                    return Err(e);
                }
            }
        } else {
            None
        };

        let sound = match self.speaker.play(&profile.sound_asset, profile.volume) {
            Ok(task) => task,
            Err(e) => {
                if let Err(cleanup) = self.finish(animation, None, true, shutdown) {
                    tracing::warn!(profile = %kind, sequence, "Cleanup after playback failure: {}", cleanup);
                }
                return Err(e);
            }
        };

        let window_cut = shutdown.sleep(profile.duration()).is_cancelled();
        let sound_cut = self.finish(animation, Some(sound), window_cut, shutdown)?;
        let interrupted = window_cut || sound_cut;

        tracing::info!(profile = %kind, sequence, interrupted, "LEDs stopped");
        self.bus.publish(PropEvent::EffectFinished {
            kind,
            sequence,
            interrupted,
        });

        Ok(EffectReport { kind, interrupted })
    }

    /// Play a sound without touching the lights
    pub fn play_cue(&self, profile: &EffectProfile) -> Result<EffectTask, ActuatorError> {
        self.speaker.play(&profile.sound_asset, profile.volume)
    }

    /// Wait for a cue to end, silencing it if shutdown comes first
    pub fn finish_cue(&self, cue: EffectTask, shutdown: &ShutdownSignal) -> Result<(), ActuatorError> {
        self.join_sound(cue, shutdown).map(|_| ())
    }

    /// Stop and clear the lights, then join the sub-tasks
    ///
    /// Every step runs even if an earlier one failed; the first error wins.
    /// Returns whether shutdown cut the sound short while it was joined.
    fn finish(
        &self,
        animation: Option<EffectTask>,
        sound: Option<EffectTask>,
        interrupted: bool,
        shutdown: &ShutdownSignal,
    ) -> Result<bool, ActuatorError> {
        let stopped = self.lights.stop();
        let cleared = self.lights.clear();
        let silenced = if interrupted {
            self.speaker.stop()
        } else {
            Ok(())
        };

        let animation_done = animation.map_or(Ok(()), EffectTask::join);
        let sound_done = match sound {
            Some(sound) if !interrupted => self.join_sound(sound, shutdown),
            Some(sound) => sound.join().map(|_| false),
            None => Ok(false),
        };

        stopped.and(cleared).and(silenced).and(animation_done)?;
        sound_done
    }

    /// Join a sound task, stopping the speaker if shutdown arrives first
    ///
    /// Returns whether the sound was cut short.
    fn join_sound(&self, sound: EffectTask, shutdown: &ShutdownSignal) -> Result<bool, ActuatorError> {
        let mut cut = false;
        while !sound.is_finished() {
            if shutdown.sleep(SOUND_POLL_INTERVAL).is_cancelled() {
                tracing::debug!("Cutting {} task short", sound.name());
                cut = true;
                break;
            }
        }

        let silenced = if cut { self.speaker.stop() } else { Ok(()) };
        let joined = sound.join();
        silenced.and(joined).map(|_| cut)
    }
}

