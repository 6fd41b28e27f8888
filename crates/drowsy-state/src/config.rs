//! State machine configuration

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Allowed EAR threshold range
pub const EAR_THRESHOLD_RANGE: (f32, f32) = (0.05, 0.40);

/// Default EAR threshold
pub const DEFAULT_EAR_THRESHOLD: f32 = 0.22;

/// Default consecutive-frame debounce count (~0.5s at 30fps)
pub const DEFAULT_CONSECUTIVE_FRAMES: u32 = 15;

/// State machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Signal values below this count as a closed-eye tick
    pub ear_threshold: f32,

    /// Consecutive below-threshold ticks required to confirm Drowsy;
    /// 1 means immediate transition on a single crossing
    pub consecutive_frames: u32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            consecutive_frames: DEFAULT_CONSECUTIVE_FRAMES,
        }
    }
}

impl StateConfig {
    /// Check all fields, rejecting out-of-range values instead of clamping
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.ear_threshold)?;
        if self.consecutive_frames < 1 {
            return Err(ConfigError::InvalidConsecutiveFrames {
                value: self.consecutive_frames,
            });
        }
        Ok(())
    }
}

/// Range-check an EAR threshold; NaN fails the comparison and is rejected
pub(crate) fn validate_threshold(value: f32) -> Result<(), ConfigError> {
    let (min, max) = EAR_THRESHOLD_RANGE;
    if !(value >= min && value <= max) {
        return Err(ConfigError::ThresholdOutOfRange { value, min, max });
    }
    Ok(())
}
