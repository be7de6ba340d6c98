/// Classification routing
///
/// Turns raw detections from a [`Classifier`](crate::devices::Classifier)
/// into a verdict. Only candy that has actually been dropped into the bucket
/// counts: boxes whose top edge sits below the drop line (`y_min` under the
/// threshold, pixels from the top of the frame) with enough confidence.
use serde::{Deserialize, Serialize};

/// Class label for candy the visitor gave
pub const TREAT_CLASS: &str = "treat";
/// Class label for anything else dropped in the bucket
pub const TRICK_CLASS: &str = "trick";

/// One object found in a captured image
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_name: String,
    /// Score in [0, 1]
    pub confidence: f32,
    /// Top edge of the bounding box, in pixels
    pub y_min: u32,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f32, y_min: u32) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            y_min,
        }
    }
}

/// Position and confidence gate applied before routing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionFilter {
    /// Detections must start above this line (`y_min < drop_threshold`)
    pub drop_threshold: u32,
    /// Detections must score strictly above this
    pub min_confidence: f32,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self {
            drop_threshold: 400,
            min_confidence: 0.2,
        }
    }
}

impl DetectionFilter {
    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.y_min < self.drop_threshold && detection.confidence > self.min_confidence
    }

    /// Keep only detections that pass the gate
    pub fn apply(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections.into_iter().filter(|d| self.accepts(d)).collect()
    }
}

/// Outcome of judging what was dropped in the bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Treat,
    Trick,
    Nothing,
}

/// Treats win over tricks; anything else is nothing
pub fn judge(detections: &[Detection]) -> Verdict {
    if detections.iter().any(|d| d.class_name == TREAT_CLASS) {
        Verdict::Treat
    } else if detections.iter().any(|d| d.class_name == TRICK_CLASS) {
        Verdict::Trick
    } else {
        Verdict::Nothing
    }
}
