use thiserror::Error;

/// Error taxonomy for the prop controller.
///
/// Component errors are split by how the pipeline reacts to them: sensor and
/// actuator failures end the run, capture and classification failures only
/// drop the event being handled. [`PropError`] is the terminal result the
/// supervisor hands back to the caller.

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Motion sensor unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read motion sensor counter")]
    ReadFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Motion sensor returned a malformed value: {0:?}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to capture image")]
    CaptureFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to decode captured image")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classification failed")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("Failed to start light animation '{pattern}'")]
    AnimationFailed {
        pattern: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unknown light pattern: {0}")]
    UnknownPattern(String),

    #[error("Failed to stop lights")]
    StopFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to clear lights")]
    ClearFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to play sound: {path}")]
    PlaybackFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Sound asset not found: {0}")]
    AssetNotFound(String),

    #[error("Failed to spawn {name} task")]
    SpawnFailed {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Terminal error of a supervised run
#[derive(Error, Debug)]
pub enum PropError {
    #[error("Motion polling stopped: {0}")]
    Sensor(#[from] SensorError),

    #[error("Effect handling stopped: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] crate::state::TransitionError),

    #[error("Failed to spawn {0} loop")]
    Spawn(&'static str, #[source] std::io::Error),

    #[error("{0} loop panicked")]
    LoopPanicked(&'static str),
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = ActuatorError::UnknownPattern("strobe".to_string());
        assert_eq!(err.to_string(), "Unknown light pattern: strobe");

        let err = SensorError::Unavailable("motion".to_string());
        assert_eq!(err.to_string(), "Motion sensor unavailable: motion");
    }

    #[test]
    fn test_prop_error_wraps_component_errors() {
        let err: PropError = SensorError::Malformed("abc".to_string()).into();
        assert!(matches!(err, PropError::Sensor(_)));
        assert_eq!(
            err.to_string(),
            "Motion polling stopped: Motion sensor returned a malformed value: \"abc\""
        );

        let err: PropError = ActuatorError::TaskPanicked("animation").into();
        assert!(matches!(err, PropError::Actuator(_)));
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/config.json"
        );
    }
}
