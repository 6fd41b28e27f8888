//! Eye geometry extraction
//!
//! Maps facial landmark frames from an external detector into per-eye
//! eye-aspect-ratio (EAR) samples:
//! - Fixed 6-point-per-eye landmark index scheme (MediaPipe FaceMesh defaults)
//! - Scale-invariant EAR computation
//! - Degenerate geometry and missing detections propagate as "no sample"

pub mod ear;
pub mod landmarks;

pub use ear::{eye_aspect_ratio, EarExtractor, EarSample};
pub use landmarks::{
    EyeIndices, FrameObservation, LandmarkFrame, Point2, LEFT_EYE_6, RIGHT_EYE_6,
};
