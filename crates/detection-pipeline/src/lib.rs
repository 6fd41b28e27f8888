//! Drowsiness Detection Pipeline
//!
//! Wires the ocular-state components into one per-frame pipeline:
//! landmark observation -> EAR extraction -> smoothing -> state machine,
//! with alarm events handed off to a decoupled sink dispatcher.
//!
//! Evaluation is strictly sequential in frame order; the state machine's
//! counters make the reduction order-dependent, so frame K completes (or
//! is explicitly skipped) before frame K+1 is evaluated.

pub mod config;
pub mod runner;

pub use config::PipelineConfig;
pub use runner::{PipelineHandle, PipelineRunner, DEFAULT_FRAME_QUEUE};

use drowsy_state::{AlarmEvent, DrowsyState, DrowsyStateMachine};
use eye_geometry::{EarExtractor, EyeIndices, FrameObservation};
use signal_filter::EarSmoother;
use thiserror::Error;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid state configuration: {0}")]
    State(#[from] drowsy_state::ConfigError),

    #[error("invalid filter configuration: {0}")]
    Filter(#[from] signal_filter::FilterError),

    #[error("event_queue_capacity must be >= 1")]
    InvalidQueueCapacity,

    #[error("configuration loading failed: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("pipeline is stopped")]
    Stopped,
}

/// Synchronous per-frame pipeline core
///
/// Owns the extractor, smoother, and state machine exclusively; no other
/// component mutates their state.
pub struct DrowsyPipeline {
    extractor: EarExtractor,
    smoother: EarSmoother,
    machine: DrowsyStateMachine,
    /// Highest frame index evaluated so far
    last_frame_index: Option<u64>,
}

impl DrowsyPipeline {
    /// Build a pipeline with the default eye-index scheme
    ///
    /// Configuration is validated here; the pipeline never starts in an
    /// undefined state.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_indices(config, EyeIndices::default())
    }

    /// Build a pipeline with a custom eye-index scheme
    pub fn with_indices(
        config: &PipelineConfig,
        indices: EyeIndices,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            extractor: EarExtractor::new(indices),
            smoother: EarSmoother::new(config.smoothing_window)?,
            machine: DrowsyStateMachine::new(config.state_config())?,
            last_frame_index: None,
        })
    }

    /// Evaluate one frame
    ///
    /// Frames must arrive in increasing frame-index order; an observation
    /// that does not advance the index is skipped, so no event is ever
    /// emitted for a superseded frame. Returns an event only on a state
    /// transition.
    pub fn process(&mut self, observation: &FrameObservation) -> Option<AlarmEvent> {
        if let Some(last) = self.last_frame_index {
            if observation.frame_index <= last {
                warn!(
                    frame_index = observation.frame_index,
                    last_frame_index = last,
                    "out-of-order frame skipped"
                );
                return None;
            }
        }
        self.last_frame_index = Some(observation.frame_index);

        let sample = self.extractor.extract(observation);
        let signal = self.smoother.update(sample.map(|s| s.mean_ear));
        self.machine
            .tick(signal, observation.frame_index, observation.timestamp_ms)
    }

    /// Current classification
    pub fn state(&self) -> DrowsyState {
        self.machine.state()
    }

    /// Consecutive below-threshold ticks counted so far
    pub fn below_count(&self) -> u32 {
        self.machine.below_count()
    }

    /// Replace the EAR threshold for future frames
    pub fn set_threshold(&mut self, ear_threshold: f32) -> Result<(), PipelineError> {
        self.machine.set_threshold(ear_threshold)?;
        Ok(())
    }
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
