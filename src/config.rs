use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detection::{DebounceConfig, DetectionFilter};
use crate::effects::ProfileTable;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// File holding the motion sensor's edge counter
    pub motion_counter_path: String,

    /// Still image kept up to date by the camera daemon (optional)
    #[serde(default)]
    pub camera_snapshot_path: Option<String>,

    /// Capture an image the moment motion is seen
    #[serde(default)]
    pub capture_on_motion: bool,

    /// Quiet period after each motion event in milliseconds
    pub cooldown_ms: u64,

    /// Sensor poll interval while nothing moves in milliseconds
    pub idle_poll_ms: u64,

    /// Drop line and confidence gate for classifier detections
    #[serde(default)]
    pub detection: DetectionFilter,

    /// Number of pixels on the light strip
    pub light_count: usize,

    /// Animation frame interval in milliseconds
    pub light_frame_ms: u64,

    /// Light and sound effects
    #[serde(default)]
    pub profiles: ProfileTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            motion_counter_path: "/run/candy-bucket/motion_count".to_string(),
            camera_snapshot_path: None,
            capture_on_motion: false,
            cooldown_ms: 3000, // 3 seconds between visitors
            idle_poll_ms: 100,
            detection: DetectionFilter::default(),
            light_count: 30,
            light_frame_ms: 40, // 25 FPS
            profiles: ProfileTable::default(),
        }
    }
}

/// Value-range problems found by [`Config::validate`]
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidVolume { profile: String, value: f32 },
    ZeroDuration { profile: String },
    CooldownTooShort { cooldown_ms: u64, idle_poll_ms: u64 },
    ZeroIdlePoll,
    InvalidConfidence { value: f32 },
    EmptyStrip,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidVolume { profile, value } => {
                write!(f, "Invalid volume for {}: {} (must be 0.0-1.0)", profile, value)
            }
            ValidationError::ZeroDuration { profile } => {
                write!(f, "Effect duration for {} must be greater than zero", profile)
            }
            ValidationError::CooldownTooShort {
                cooldown_ms,
                idle_poll_ms,
            } => write!(
                f,
                "Cooldown {}ms must be longer than the idle poll interval {}ms",
                cooldown_ms, idle_poll_ms
            ),
            ValidationError::ZeroIdlePoll => write!(f, "Idle poll interval must be greater than zero"),
            ValidationError::InvalidConfidence { value } => {
                write!(f, "Invalid minimum confidence: {} (must be 0.0-1.0)", value)
            }
            ValidationError::EmptyStrip => write!(f, "Light strip must have at least one pixel"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Config {
    /// Load configuration from the default location next to the executable.
    /// Creates a default config if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing the defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!("Created default config at: {}", path.display());
            return Ok(config);
        }

        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(Box::new(e)))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| load_failed(Box::new(e)))?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source,
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    /// Directory holding the executable; relative asset paths start here
    pub fn base_dir() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        exe_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::Invalid("Could not determine executable directory".to_string()))
    }

    /// Get the config file path (in app's base directory)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::base_dir()?.join("config").join("config.json"))
    }

    /// Check every value range, collecting all problems
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.idle_poll_ms == 0 {
            errors.push(ValidationError::ZeroIdlePoll);
        }

        if self.cooldown_ms <= self.idle_poll_ms {
            errors.push(ValidationError::CooldownTooShort {
                cooldown_ms: self.cooldown_ms,
                idle_poll_ms: self.idle_poll_ms,
            });
        }

        if !(0.0..=1.0).contains(&self.detection.min_confidence) {
            errors.push(ValidationError::InvalidConfidence {
                value: self.detection.min_confidence,
            });
        }

        if self.light_count == 0 {
            errors.push(ValidationError::EmptyStrip);
        }

        for (kind, profile) in self.profiles.iter() {
            if !(0.0..=1.0).contains(&profile.volume) {
                errors.push(ValidationError::InvalidVolume {
                    profile: kind.to_string(),
                    value: profile.volume,
                });
            }

            // The pending cue has no light window
            if profile.duration_ms == 0 && kind != crate::effects::ProfileKind::Pending {
                errors.push(ValidationError::ZeroDuration {
                    profile: kind.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Debouncer timing from this config
    pub fn debounce_config(&self) -> DebounceConfig {
        DebounceConfig {
            cooldown: Duration::from_millis(self.cooldown_ms),
            idle_poll: Duration::from_millis(self.idle_poll_ms),
            capture_on_motion: self.capture_on_motion,
        }
    }

    /// Profile table with sound assets resolved against `base`
    pub fn resolved_profiles(&self, base: &Path) -> ProfileTable {
        self.profiles.resolve_assets(base)
    }

    pub fn light_frame_interval(&self) -> Duration {
        Duration::from_millis(self.light_frame_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cooldown_ms, 3000);
        assert_eq!(config.idle_poll_ms, 100);
        assert_eq!(config.detection.drop_threshold, 400);
        assert!(!config.capture_on_motion);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debounce_config() {
        let config = Config::default();
        let debounce = config.debounce_config();
        assert_eq!(debounce.cooldown, Duration::from_secs(3));
        assert_eq!(debounce.idle_poll, Duration::from_millis(100));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.cooldown_ms = 50;
        config.light_count = 0;
        config.profiles.treat.volume = 1.5;
        config.profiles.motion.duration_ms = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyStrip));
        assert!(errors.contains(&ValidationError::ZeroDuration {
            profile: "Motion".to_string()
        }));
    }

    #[test]
    fn test_pending_cue_may_have_zero_duration() {
        let config = Config::default();
        assert_eq!(config.profiles.pending.as_ref().map(|p| p.duration_ms), Some(0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let path = std::env::temp_dir()
            .join(format!("candy_bucket_config_{}", std::process::id()))
            .join("config.json");
        let _ = fs::remove_file(&path);

        // Missing file gets the defaults written out
        let created = Config::load_from(&path).unwrap();
        assert_eq!(created, Config::default());
        assert!(path.exists());

        let mut edited = created.clone();
        edited.capture_on_motion = true;
        edited.camera_snapshot_path = Some("/run/camera/latest.jpg".to_string());
        edited.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), edited);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "motion_counter_path": "/tmp/motion",
            "cooldown_ms": 2000,
            "idle_poll_ms": 50,
            "light_count": 12,
            "light_frame_ms": 30
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.profiles, ProfileTable::default());
        assert_eq!(config.detection, DetectionFilter::default());
        assert!(config.camera_snapshot_path.is_none());
    }

    #[test]
    fn test_malformed_config_is_load_error() {
        let path = std::env::temp_dir().join(format!("candy_bucket_bad_{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
        let _ = fs::remove_file(&path);
    }
}
