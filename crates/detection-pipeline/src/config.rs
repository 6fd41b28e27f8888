//! Pipeline configuration

use alarm_sink::DEFAULT_QUEUE_CAPACITY;
use drowsy_state::{StateConfig, DEFAULT_CONSECUTIVE_FRAMES, DEFAULT_EAR_THRESHOLD};
use serde::{Deserialize, Serialize};
use signal_filter::{EarSmoother, DEFAULT_WINDOW};
use tracing::info;

use crate::PipelineError;

/// Top-level pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Signal values below this count as a closed-eye tick
    pub ear_threshold: f32,

    /// Consecutive below-threshold frames required to confirm Drowsy
    pub consecutive_frames: u32,

    /// Moving-average window over the mean EAR signal (1 = pass-through)
    pub smoothing_window: usize,

    /// Capacity of the alarm event queue
    pub event_queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            consecutive_frames: DEFAULT_CONSECUTIVE_FRAMES,
            smoothing_window: DEFAULT_WINDOW,
            event_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from defaults, an optional file, and `DROWSY_*`
    /// environment overrides (later sources win)
    pub fn load(path: Option<&str>) -> Result<Self, PipelineError> {
        let mut builder = config::Config::builder()
            .set_default("ear_threshold", DEFAULT_EAR_THRESHOLD as f64)?
            .set_default("consecutive_frames", DEFAULT_CONSECUTIVE_FRAMES as i64)?
            .set_default("smoothing_window", DEFAULT_WINDOW as i64)?
            .set_default("event_queue_capacity", DEFAULT_QUEUE_CAPACITY as i64)?;

        if let Some(path) = path {
            info!(path, "loading pipeline configuration file");
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("DROWSY").try_parsing(true));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check all component configuration before the pipeline starts
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.state_config().validate()?;
        EarSmoother::new(self.smoothing_window)?;
        if self.event_queue_capacity < 1 {
            return Err(PipelineError::InvalidQueueCapacity);
        }
        Ok(())
    }

    /// State machine slice of the configuration
    pub fn state_config(&self) -> StateConfig {
        StateConfig {
            ear_threshold: self.ear_threshold,
            consecutive_frames: self.consecutive_frames,
        }
    }
}
