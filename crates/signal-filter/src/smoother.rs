//! Rolling-window moving average over the mean EAR signal

use std::collections::VecDeque;

use crate::FilterError;

/// Default window length (pass-through, no smoothing)
pub const DEFAULT_WINDOW: usize = 1;

/// Moving-average smoother over a bounded history of mean EAR values
///
/// The history is owned exclusively by the smoother and depends only on
/// the sequence of samples received so far, not on wall-clock timing. A
/// no-sample tick never injects a fabricated value: the history is left
/// untouched and the tick is forwarded downstream as an explicit
/// no-signal `None`.
#[derive(Debug, Clone)]
pub struct EarSmoother {
    /// Most recent mean EAR values, oldest first
    window: VecDeque<f32>,
    /// Maximum window length
    capacity: usize,
}

impl EarSmoother {
    /// Create a smoother with the given window length
    ///
    /// A window of 1 is a pass-through. Rejects `window == 0` at
    /// configuration time.
    pub fn new(window: usize) -> Result<Self, FilterError> {
        if window < 1 {
            return Err(FilterError::InvalidWindow { window });
        }
        Ok(Self {
            window: VecDeque::with_capacity(window),
            capacity: window,
        })
    }

    /// Feed one tick and return the smoothed signal
    ///
    /// `None` in means no usable sample this frame; the history is held
    /// unchanged and `None` is returned so the state machine sees an
    /// explicit no-signal tick.
    pub fn update(&mut self, mean_ear: Option<f32>) -> Option<f32> {
        let value = mean_ear?;

        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);

        let sum: f32 = self.window.iter().sum();
        Some(sum / self.window.len() as f32)
    }

    /// Number of samples currently in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Check if no samples have been received yet
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Configured window length
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

impl Default for EarSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW).expect("default window is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            EarSmoother::new(0),
            Err(FilterError::InvalidWindow { window: 0 })
        ));
    }

    #[test]
    fn test_window_of_one_is_passthrough() {
        let mut smoother = EarSmoother::new(1).unwrap();
        assert_eq!(smoother.update(Some(0.30)), Some(0.30));
        assert_eq!(smoother.update(Some(0.18)), Some(0.18));
    }

    #[test]
    fn test_moving_average() {
        let mut smoother = EarSmoother::new(3).unwrap();
        assert_eq!(smoother.update(Some(0.3)), Some(0.3));
        assert!((smoother.update(Some(0.2)).unwrap() - 0.25).abs() < 1e-6);
        assert!((smoother.update(Some(0.1)).unwrap() - 0.2).abs() < 1e-6);
        // Window is full, oldest sample (0.3) evicted
        assert!((smoother.update(Some(0.1)).unwrap() - 0.4 / 3.0).abs() < 1e-6);
        assert_eq!(smoother.len(), 3);
    }

    #[test]
    fn test_no_sample_holds_history() {
        let mut smoother = EarSmoother::new(3).unwrap();
        smoother.update(Some(0.3));
        smoother.update(Some(0.2));

        // No-sample tick: explicit no-signal out, history untouched
        assert_eq!(smoother.update(None), None);
        assert_eq!(smoother.len(), 2);

        // Next real sample averages over the same preserved history
        assert!((smoother.update(Some(0.1)).unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_no_sample_before_first_sample() {
        let mut smoother = EarSmoother::new(2).unwrap();
        assert_eq!(smoother.update(None), None);
        assert!(smoother.is_empty());
    }

    #[test]
    fn test_clear_resets_history() {
        let mut smoother = EarSmoother::new(4).unwrap();
        smoother.update(Some(0.3));
        smoother.update(Some(0.1));
        smoother.clear();
        assert!(smoother.is_empty());
        assert_eq!(smoother.update(Some(0.2)), Some(0.2));
    }
}
