//! Landmark frame types and eye index configuration

use serde::{Deserialize, Serialize};

/// 2D landmark coordinate in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Ordered facial landmark set for a single frame, indexed by the
/// detector's fixed landmark-id scheme. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    points: Vec<Point2>,
}

impl LandmarkFrame {
    /// Create a frame from detector output
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Get the landmark at a fixed index
    pub fn get(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    /// Number of landmarks in the frame
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the frame carries no landmarks
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-frame pipeline input
///
/// `landmarks` is `None` when the external detector found no face; this is
/// the explicit no-detection marker, never a zero-filled frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Monotonically increasing frame sequence number
    pub frame_index: u64,
    /// Capture timestamp (milliseconds since epoch)
    pub timestamp_ms: u64,
    /// Detected landmarks, or `None` when the detector found no face
    pub landmarks: Option<LandmarkFrame>,
}

impl FrameObservation {
    /// Observation with a detected landmark frame
    pub fn detected(frame_index: u64, timestamp_ms: u64, landmarks: LandmarkFrame) -> Self {
        Self {
            frame_index,
            timestamp_ms,
            landmarks: Some(landmarks),
        }
    }

    /// Observation for a frame where the detector found no face
    pub fn no_detection(frame_index: u64, timestamp_ms: u64) -> Self {
        Self {
            frame_index,
            timestamp_ms,
            landmarks: None,
        }
    }
}

/// MediaPipe FaceMesh ids for the left-eye 6-point scheme
pub const LEFT_EYE_6: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// MediaPipe FaceMesh ids for the right-eye 6-point scheme
pub const RIGHT_EYE_6: [usize; 6] = [263, 387, 385, 362, 380, 373];

/// Landmark ids of the six EAR points per eye, in fixed order:
/// p1/p4 are the horizontal corners, p2/p3 the upper lid, p5/p6 the lower lid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyeIndices {
    pub left: [usize; 6],
    pub right: [usize; 6],
}

impl Default for EyeIndices {
    fn default() -> Self {
        Self {
            left: LEFT_EYE_6,
            right: RIGHT_EYE_6,
        }
    }
}
