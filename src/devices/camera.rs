use std::path::{Path, PathBuf};

use super::{Image, ImageSource};
use crate::error::CaptureError;

/// Camera backed by a snapshot file
///
/// Camera daemons on small boards (libcamera-still in timelapse mode, motion,
/// etc.) keep overwriting one still image. Capturing decodes whatever the
/// daemon wrote last.
#[derive(Debug, Clone)]
pub struct SnapshotCamera {
    path: PathBuf,
}

impl SnapshotCamera {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ImageSource for SnapshotCamera {
    fn capture(&self) -> Result<Image, CaptureError> {
        if !self.path.exists() {
            return Err(CaptureError::Unavailable(self.path.display().to_string()));
        }

        let image = image::open(&self.path).map_err(|e| match e {
            image::ImageError::IoError(io) => CaptureError::CaptureFailed(Box::new(io)),
            other => CaptureError::DecodeFailed(Box::new(other)),
        })?;

        let image = image.to_rgba8();
        tracing::debug!(
            "Captured {}x{} snapshot from {}",
            image.width(),
            image.height(),
            self.path.display()
        );
        Ok(image)
    }
}
