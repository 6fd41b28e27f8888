//! Eye aspect ratio computation

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::landmarks::{EyeIndices, FrameObservation, LandmarkFrame, Point2};

/// Corner distances at or below this are treated as degenerate geometry
const MIN_EYE_WIDTH: f32 = 1e-6;

/// Per-eye and mean eye aspect ratio for one frame
///
/// An eye dropped for degenerate geometry is `None` and excluded from the
/// mean; at least one eye is always present. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarSample {
    /// Left-eye EAR, `None` if the eye was dropped
    pub left_ear: Option<f32>,
    /// Right-eye EAR, `None` if the eye was dropped
    pub right_ear: Option<f32>,
    /// Mean EAR over the available eyes
    pub mean_ear: f32,
    /// Frame sequence number
    pub frame_index: u64,
    /// Capture timestamp (milliseconds since epoch)
    pub timestamp_ms: u64,
}

/// Compute the 6-point eye aspect ratio
///
/// EAR = (‖p2−p6‖ + ‖p3−p5‖) / (2·‖p1−p4‖), with the points in fixed order
/// p1..p6. Lower values indicate a more closed eye; the ratio is invariant
/// under uniform scaling of the coordinates.
///
/// Returns `None` when the horizontal corner distance is degenerate
/// (coincident corners from detector noise), never ∞ or NaN.
pub fn eye_aspect_ratio(p: &[Point2; 6]) -> Option<f32> {
    let vertical = p[1].distance(&p[5]) + p[2].distance(&p[4]);
    let horizontal = p[0].distance(&p[3]);
    if horizontal <= MIN_EYE_WIDTH {
        return None;
    }
    Some(vertical / (2.0 * horizontal))
}

/// Maps landmark frames to EAR samples using a fixed eye-index scheme
///
/// Pure function of its inputs; holds no per-frame state.
#[derive(Debug, Clone, Default)]
pub struct EarExtractor {
    indices: EyeIndices,
}

impl EarExtractor {
    /// Create an extractor with the given eye-index configuration
    pub fn new(indices: EyeIndices) -> Self {
        Self { indices }
    }

    /// Extract the EAR sample for one observation
    ///
    /// Returns `None` (no sample) when the detector found no face or both
    /// eyes have degenerate geometry. A single degenerate eye is dropped
    /// and the frame proceeds with the other.
    pub fn extract(&self, observation: &FrameObservation) -> Option<EarSample> {
        let frame = observation.landmarks.as_ref()?;

        let left_ear = self.eye_ear(frame, &self.indices.left);
        let right_ear = self.eye_ear(frame, &self.indices.right);

        let mean_ear = match (left_ear, right_ear) {
            (Some(left), Some(right)) => (left + right) / 2.0,
            (Some(left), None) => left,
            (None, Some(right)) => right,
            (None, None) => {
                debug!(
                    frame_index = observation.frame_index,
                    "both eyes degenerate, frame yields no sample"
                );
                return None;
            }
        };

        Some(EarSample {
            left_ear,
            right_ear,
            mean_ear,
            frame_index: observation.frame_index,
            timestamp_ms: observation.timestamp_ms,
        })
    }

    /// EAR for one eye; `None` when an index is missing from the frame or
    /// the corner distance is degenerate
    fn eye_ear(&self, frame: &LandmarkFrame, ids: &[usize; 6]) -> Option<f32> {
        let mut points = [Point2::default(); 6];
        for (slot, &id) in points.iter_mut().zip(ids.iter()) {
            *slot = frame.get(id)?;
        }
        eye_aspect_ratio(&points)
    }
}
