/// Speaker backed by rodio
///
/// Each `play` call gets its own thread that opens the default output stream,
/// decodes the preloaded asset and waits for the sink to drain. The output
/// stream is not `Send`, so it never leaves the thread that created it.
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, Sink};

use super::{EffectTask, SoundActuator};
use crate::error::ActuatorError;

/// How often a playback thread checks for completion or cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Handle on the playback currently owned by the speaker
struct Playback {
    cancelled: Arc<AtomicBool>,
    sink: Arc<Mutex<Option<Arc<Sink>>>>,
}

impl Playback {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.stop();
        }
    }
}

/// Sound actuator that plays mp3/wav assets on the default output device
pub struct RodioSpeaker {
    current: Mutex<Option<Playback>>,
}

impl RodioSpeaker {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }
}

impl Default for RodioSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundActuator for RodioSpeaker {
    fn play(&self, asset: &Path, volume: f32) -> Result<EffectTask, ActuatorError> {
        if !asset.exists() {
            return Err(ActuatorError::AssetNotFound(asset.display().to_string()));
        }

        let path = asset.display().to_string();
        let audio_data = std::fs::read(asset).map_err(|e| ActuatorError::PlaybackFailed {
            path: path.clone(),
            source: Box::new(e),
        })?;
        tracing::info!("Playing sound: {} ({} bytes)", path, audio_data.len());

        let cancelled = Arc::new(AtomicBool::new(false));
        let slot = Arc::new(Mutex::new(None));
        let previous = self.current.lock().replace(Playback {
            cancelled: Arc::clone(&cancelled),
            sink: Arc::clone(&slot),
        });
        if let Some(previous) = previous {
            previous.cancel();
        }

        let volume = volume.clamp(0.0, 1.0);
        EffectTask::spawn("sound", move || {
            let fail = |e: Box<dyn std::error::Error + Send + Sync>| {
                ActuatorError::PlaybackFailed {
                    path: path.clone(),
                    source: e,
                }
            };

            let (_stream, stream_handle) =
                OutputStream::try_default().map_err(|e| fail(Box::new(e)))?;
            let sink = Arc::new(Sink::try_new(&stream_handle).map_err(|e| fail(Box::new(e)))?);
            let source = Decoder::new(Cursor::new(audio_data)).map_err(|e| fail(Box::new(e)))?;

            *slot.lock() = Some(Arc::clone(&sink));
            if cancelled.load(Ordering::SeqCst) {
                return Ok(());
            }

            sink.set_volume(volume);
            sink.append(source);
            sink.play();

            while !sink.empty() && !cancelled.load(Ordering::SeqCst) {
                thread::sleep(POLL_INTERVAL);
            }
            sink.stop();
            slot.lock().take();

            tracing::debug!("Sound finished: {}", path);
            Ok(())
        })
    }

    fn stop(&self) -> Result<(), ActuatorError> {
        if let Some(playback) = self.current.lock().take() {
            tracing::debug!("Stopping sound playback");
            playback.cancel();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Playback itself needs an audio device; these tests cover the paths that don't.

    #[test]
    fn test_missing_asset_is_rejected() {
        let speaker = RodioSpeaker::new();
        let result = speaker.play(Path::new("/nonexistent/ghostly_whisper.mp3"), 0.5);
        assert!(matches!(result, Err(ActuatorError::AssetNotFound(_))));
    }

    #[test]
    fn test_stop_when_silent_is_ok() {
        let speaker = RodioSpeaker::default();
        assert!(speaker.stop().is_ok());
        assert!(speaker.stop().is_ok());
    }
}
