//! Signal Filtering
//!
//! Combines per-frame mean EAR samples into a smoothed scalar signal over
//! a bounded rolling window, suppressing single-frame detector noise.

mod smoother;

pub use smoother::{EarSmoother, DEFAULT_WINDOW};

use thiserror::Error;

/// Errors during filter configuration
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// Window length must be at least one sample
    #[error("smoothing window {window} is invalid, must be >= 1")]
    InvalidWindow { window: usize },
}
