//! Drowsy State Machine
//!
//! Classifies the smoothed eye-openness signal into Alert/Drowsy states
//! with temporal hysteresis:
//! - Consecutive-frame debounce before confirming a Drowsy transition
//! - No-signal ticks hold the last known state
//! - Exactly one alarm event per actual transition

pub mod config;
pub mod machine;

pub use config::{
    StateConfig, DEFAULT_CONSECUTIVE_FRAMES, DEFAULT_EAR_THRESHOLD, EAR_THRESHOLD_RANGE,
};
pub use machine::{AlarmEvent, DrowsyState, DrowsyStateMachine};

use thiserror::Error;

/// Errors during state machine configuration
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// EAR threshold outside the allowed range
    #[error("ear_threshold {value} is out of range [{min}, {max}]")]
    ThresholdOutOfRange { value: f32, min: f32, max: f32 },

    /// Debounce count must be at least one frame
    #[error("consecutive_frames {value} is invalid, must be >= 1")]
    InvalidConsecutiveFrames { value: u32 },
}
