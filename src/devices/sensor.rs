use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::DigitalSampler;
use crate::error::SensorError;

/// Motion counter exposed as a text file
///
/// Kernel GPIO drivers (and the board daemons wrapping them) export edge
/// counters as a file holding one decimal integer. Every read opens the file
/// fresh so the latest value is always seen.
#[derive(Debug, Clone)]
pub struct CounterFileSampler {
    path: PathBuf,
}

impl CounterFileSampler {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DigitalSampler for CounterFileSampler {
    fn read(&self) -> Result<i64, SensorError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SensorError::Unavailable(self.path.display().to_string()),
            _ => SensorError::ReadFailed(Box::new(e)),
        })?;

        let value = raw.trim();
        value
            .parse::<i64>()
            .map_err(|_| SensorError::Malformed(value.to_string()))
    }
}
