/// Simulated light strip
///
/// Renders animation frames into an in-memory pixel buffer and logs them,
/// standing in for an addressable LED strip on boards without one.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;

use super::{EffectTask, LightActuator};
use crate::error::ActuatorError;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const PUMPKIN: Rgb = Rgb::new(255, 100, 0);
    pub const WITCH: Rgb = Rgb::new(140, 0, 255);
    pub const GHOST: Rgb = Rgb::new(200, 220, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale brightness by `level / 255`
    pub fn scaled(self, level: u8) -> Self {
        let scale = |c: u8| ((c as u16 * level as u16) / 255) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn is_off(&self) -> bool {
        *self == Rgb::OFF
    }
}

/// Built-in animations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPattern {
    /// Whole strip breathes in pumpkin orange
    Pulse,
    /// Candle-like random flicker
    Flicker,
    /// Single purple pixel running along the strip
    Chase,
    /// Steady ghostly white
    Solid,
}

impl LightPattern {
    /// Steps in one pulse cycle
    const PULSE_PERIOD: u64 = 32;

    /// Render frame number `step` for a strip of `length` pixels
    pub fn frame<R: Rng>(&self, step: u64, length: usize, rng: &mut R) -> Vec<Rgb> {
        match self {
            LightPattern::Pulse => {
                let phase = step % Self::PULSE_PERIOD;
                let half = Self::PULSE_PERIOD / 2;
                let level = if phase < half {
                    phase * 16
                } else {
                    (Self::PULSE_PERIOD - 1 - phase) * 16
                };
                vec![Rgb::PUMPKIN.scaled(level as u8); length]
            }
            LightPattern::Flicker => (0..length)
                .map(|_| Rgb::PUMPKIN.scaled(rng.gen_range(40..=255)))
                .collect(),
            LightPattern::Chase => {
                let lit = if length == 0 {
                    0
                } else {
                    (step % length as u64) as usize
                };
                (0..length)
                    .map(|i| if i == lit { Rgb::WITCH } else { Rgb::OFF })
                    .collect()
            }
            LightPattern::Solid => vec![Rgb::GHOST; length],
        }
    }
}

impl FromStr for LightPattern {
    type Err = ActuatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pulse" => Ok(LightPattern::Pulse),
            "flicker" => Ok(LightPattern::Flicker),
            "chase" => Ok(LightPattern::Chase),
            "solid" => Ok(LightPattern::Solid),
            _ => Err(ActuatorError::UnknownPattern(s.to_string())),
        }
    }
}

impl fmt::Display for LightPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightPattern::Pulse => write!(f, "pulse"),
            LightPattern::Flicker => write!(f, "flicker"),
            LightPattern::Chase => write!(f, "chase"),
            LightPattern::Solid => write!(f, "solid"),
        }
    }
}

struct StripState {
    pixels: Vec<Rgb>,
    /// Generation of the animation allowed to draw, if any
    active: Option<u64>,
    generation: u64,
    frames_rendered: u64,
}

/// Light actuator that animates an in-memory strip
pub struct StripSimulator {
    length: usize,
    frame_interval: Duration,
    state: Arc<Mutex<StripState>>,
}

impl StripSimulator {
    /// Create a dark strip of `length` pixels
    pub fn new(length: usize, frame_interval: Duration) -> Self {
        Self {
            length,
            frame_interval,
            state: Arc::new(Mutex::new(StripState {
                pixels: vec![Rgb::OFF; length],
                active: None,
                generation: 0,
                frames_rendered: 0,
            })),
        }
    }

    /// Snapshot of the current pixel buffer
    pub fn pixels(&self) -> Vec<Rgb> {
        self.state.lock().pixels.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.state.lock().active.is_some()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.state.lock().frames_rendered
    }
}

impl LightActuator for StripSimulator {
    fn start_animation(&self, pattern: &str) -> Result<EffectTask, ActuatorError> {
        let pattern: LightPattern = pattern.parse()?;

        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.active = Some(state.generation);
            state.generation
        };
        tracing::info!("Animating lights: {}", pattern);

        let state = Arc::clone(&self.state);
        let length = self.length;
        let frame_interval = self.frame_interval;

        EffectTask::spawn("animation", move || {
            let mut rng = rand::thread_rng();
            let mut step = 0u64;

            loop {
                {
                    let mut state = state.lock();
                    if state.active != Some(generation) {
                        break;
                    }
                    state.pixels = pattern.frame(step, length, &mut rng);
                    state.frames_rendered += 1;

                    if step % 25 == 0 {
                        let lit = state.pixels.iter().filter(|p| !p.is_off()).count();
                        tracing::debug!("{} frame {}: {}/{} lit", pattern, step, lit, length);
                    }
                }

                thread::sleep(frame_interval);
                step += 1;
            }

            tracing::debug!("{} animation ended after {} frames", pattern, step);
            Ok(())
        })
    }

    fn stop(&self) -> Result<(), ActuatorError> {
        if self.state.lock().active.take().is_some() {
            tracing::debug!("Stopping light animation");
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), ActuatorError> {
        let mut state = self.state.lock();
        state.pixels.iter_mut().for_each(|p| *p = Rgb::OFF);
        tracing::debug!("Lights cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_pattern_parsing() {
        assert_eq!("Pulse".parse::<LightPattern>().unwrap(), LightPattern::Pulse);
        assert_eq!(" chase ".parse::<LightPattern>().unwrap(), LightPattern::Chase);
        assert!(matches!(
            "strobe".parse::<LightPattern>(),
            Err(ActuatorError::UnknownPattern(_))
        ));
    }

    #[test]
    fn test_chase_lights_one_pixel() {
        let mut rng = StepRng::new(0, 1);
        let frame = LightPattern::Chase.frame(12, 10, &mut rng);
        assert_eq!(frame.len(), 10);
        assert_eq!(frame.iter().filter(|p| !p.is_off()).count(), 1);
        assert_eq!(frame[2], Rgb::WITCH);
    }

    #[test]
    fn test_pulse_starts_dark_and_peaks_mid_cycle() {
        let mut rng = StepRng::new(0, 1);
        let dark = LightPattern::Pulse.frame(0, 4, &mut rng);
        assert!(dark.iter().all(|p| p.is_off()));

        let bright = LightPattern::Pulse.frame(15, 4, &mut rng);
        assert!(bright[0].r > 200);
    }

    #[test]
    fn test_scaled_color() {
        assert_eq!(Rgb::PUMPKIN.scaled(255), Rgb::PUMPKIN);
        assert_eq!(Rgb::PUMPKIN.scaled(0), Rgb::OFF);
    }

    #[test]
    fn test_animation_runs_until_stopped() {
        let strip = StripSimulator::new(8, Duration::from_millis(5));
        let task = strip.start_animation("solid").unwrap();

        thread::sleep(Duration::from_millis(30));
        assert!(strip.is_animating());
        assert!(strip.pixels().iter().all(|p| *p == Rgb::GHOST));

        strip.stop().unwrap();
        strip.clear().unwrap();
        task.join().unwrap();

        assert!(!strip.is_animating());
        assert!(strip.frames_rendered() > 0);
        assert!(strip.pixels().iter().all(|p| p.is_off()));
    }

    #[test]
    fn test_stop_and_clear_are_idempotent() {
        let strip = StripSimulator::new(4, Duration::from_millis(5));
        assert!(strip.stop().is_ok());
        assert!(strip.clear().is_ok());
        assert!(strip.stop().is_ok());
        assert!(strip.clear().is_ok());
    }

    #[test]
    fn test_unknown_pattern_is_rejected_without_animating() {
        let strip = StripSimulator::new(4, Duration::from_millis(5));
        assert!(strip.start_animation("disco").is_err());
        assert!(!strip.is_animating());
    }
}
