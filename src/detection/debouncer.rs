/// Motion debouncer
///
/// Polls the motion counter and turns every change into one [`MotionEvent`].
/// After an event the poller sleeps through a cooldown, so sensor chatter
/// while a visitor is still in front of the prop collapses into that single
/// event.
use std::sync::Arc;
use std::time::Duration;

use crate::devices::{DigitalSampler, ImageSource};
use crate::error::SensorError;
use crate::messaging::{EventBus, EventQueue, MotionEvent, PropEvent, ShutdownSignal};

/// Debouncer timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period after each event
    pub cooldown: Duration,
    /// Delay between reads while nothing changes
    pub idle_poll: Duration,
    /// Capture an image as soon as motion is seen
    pub capture_on_motion: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(3),
            idle_poll: Duration::from_millis(100),
            capture_on_motion: false,
        }
    }
}

/// Turns a changing counter into discrete motion events
pub struct MotionDebouncer {
    sampler: Arc<dyn DigitalSampler>,
    camera: Option<Arc<dyn ImageSource>>,
    config: DebounceConfig,
    bus: EventBus,
    last_tick: Option<i64>,
    events_emitted: u64,
}

impl MotionDebouncer {
    /// Create an unprimed debouncer
    pub fn new(sampler: Arc<dyn DigitalSampler>, config: DebounceConfig) -> Self {
        Self {
            sampler,
            camera: None,
            config,
            bus: EventBus::new(),
            last_tick: None,
            events_emitted: 0,
        }
    }

    /// Camera used when `capture_on_motion` is enabled
    pub fn with_camera(mut self, camera: Option<Arc<dyn ImageSource>>) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    /// Read the sensor once and take that value as the baseline
    pub fn prime(&mut self) -> Result<i64, SensorError> {
        let tick = self.sampler.read()?;
        self.last_tick = Some(tick);
        tracing::debug!("Motion sensor primed at tick {}", tick);
        Ok(tick)
    }

    /// Last counter value seen, if primed
    pub fn last_tick(&self) -> Option<i64> {
        self.last_tick
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }

    /// Read the sensor once; returns an event if the counter moved
    ///
    /// An unprimed debouncer treats its first read as the baseline.
    pub fn poll_once(&mut self) -> Result<Option<MotionEvent>, SensorError> {
        let tick = self.sampler.read()?;

        match self.last_tick.replace(tick) {
            None => Ok(None),
            Some(last) if last == tick => Ok(None),
            Some(_) => {
                self.events_emitted += 1;
                let event = MotionEvent::new(self.events_emitted, tick);
                Ok(Some(self.attach_image(event)))
            }
        }
    }

    fn attach_image(&self, event: MotionEvent) -> MotionEvent {
        if !self.config.capture_on_motion {
            return event;
        }
        let Some(camera) = &self.camera else {
            return event;
        };

        match camera.capture() {
            Ok(image) => event.with_image(image),
            Err(e) => {
                // The orchestrator captures on its own when the event has no image
                tracing::warn!("Capture on motion #{} failed: {}", event.sequence, e);
                event
            }
        }
    }

    /// Poll until shutdown or a sensor failure
    ///
    /// Cancellation is a normal exit and returns `Ok(())`.
    pub fn run(&mut self, queue: &EventQueue, shutdown: &ShutdownSignal) -> Result<(), SensorError> {
        tracing::info!(
            "Polling motion sensor (cooldown {:?}, idle poll {:?})",
            self.config.cooldown,
            self.config.idle_poll
        );

        while !shutdown.is_triggered() {
            let pause = match self.poll_once()? {
                Some(event) => {
                    tracing::info!(sequence = event.sequence, tick = event.tick, "Motion detected!");
                    self.bus.publish(PropEvent::MotionDetected {
                        sequence: event.sequence,
                        tick: event.tick,
                    });
                    queue.put(event);
                    self.config.cooldown
                }
                None => self.config.idle_poll,
            };

            if shutdown.sleep(pause).is_cancelled() {
                break;
            }
        }

        tracing::info!("Motion polling stopped after {} events", self.events_emitted);
        Ok(())
    }
}
