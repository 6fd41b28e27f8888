//! Alert/Drowsy classification with consecutive-frame debounce

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{validate_threshold, StateConfig};
use crate::ConfigError;

/// Discrete driver alertness state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrowsyState {
    #[default]
    Alert,
    Drowsy,
}

/// Emitted on each Alert/Drowsy transition, never per-frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmEvent {
    /// State entered by this transition
    pub state: DrowsyState,
    /// Frame that confirmed the transition
    pub frame_index: u64,
    /// Capture timestamp of that frame (milliseconds since epoch)
    pub timestamp_ms: u64,
    /// Smoothed mean EAR at the time of transition
    pub mean_ear: f32,
    /// Threshold in force at the time of transition
    pub threshold: f32,
}

/// Finite-state machine over the smoothed EAR signal
///
/// State and counter are owned exclusively by the machine; evaluation is
/// an order-dependent sequential reduction over ticks, one frame at a time.
#[derive(Debug, Clone)]
pub struct DrowsyStateMachine {
    /// Current classification
    state: DrowsyState,
    /// Consecutive ticks with signal below threshold
    below_count: u32,
    /// Closed-eye signal threshold
    ear_threshold: f32,
    /// Debounce count required to confirm Drowsy
    consecutive_frames: u32,
}

impl DrowsyStateMachine {
    /// Create a state machine in the Alert state
    ///
    /// Invalid configuration is rejected here, before any frame is
    /// processed; values are never silently clamped.
    pub fn new(config: StateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: DrowsyState::Alert,
            below_count: 0,
            ear_threshold: config.ear_threshold,
            consecutive_frames: config.consecutive_frames,
        })
    }

    /// Evaluate one tick of the smoothed signal
    ///
    /// `None` is a no-signal tick (detection lost or geometry degenerate):
    /// state and counter are held unchanged, so a detection failure never
    /// spuriously raises or clears the alarm. Returns an event only on an
    /// actual transition.
    pub fn tick(
        &mut self,
        signal: Option<f32>,
        frame_index: u64,
        timestamp_ms: u64,
    ) -> Option<AlarmEvent> {
        let Some(value) = signal else {
            debug!(frame_index, "no-signal tick, holding state");
            return None;
        };

        if value < self.ear_threshold {
            self.below_count = self.below_count.saturating_add(1);
            if self.state == DrowsyState::Alert && self.below_count >= self.consecutive_frames {
                self.state = DrowsyState::Drowsy;
                info!(
                    frame_index,
                    mean_ear = value,
                    below_count = self.below_count,
                    "drowsiness confirmed"
                );
                return Some(self.event(frame_index, timestamp_ms, value));
            }
        } else {
            self.below_count = 0;
            if self.state == DrowsyState::Drowsy {
                self.state = DrowsyState::Alert;
                info!(frame_index, mean_ear = value, "driver recovered");
                return Some(self.event(frame_index, timestamp_ms, value));
            }
        }

        None
    }

    /// Replace the EAR threshold for future ticks
    ///
    /// Validated like construction-time configuration; on rejection the
    /// previous threshold stays in force. Ticks already counted are not
    /// re-evaluated against the new value.
    pub fn set_threshold(&mut self, ear_threshold: f32) -> Result<(), ConfigError> {
        validate_threshold(ear_threshold)?;
        self.ear_threshold = ear_threshold;
        Ok(())
    }

    /// Current classification
    pub fn state(&self) -> DrowsyState {
        self.state
    }

    /// Check if the alarm condition is currently active
    pub fn is_drowsy(&self) -> bool {
        self.state == DrowsyState::Drowsy
    }

    /// Consecutive below-threshold ticks counted so far
    pub fn below_count(&self) -> u32 {
        self.below_count
    }

    /// Threshold currently in force
    pub fn ear_threshold(&self) -> f32 {
        self.ear_threshold
    }

    /// Return to Alert with a cleared counter (e.g. on driver change)
    pub fn reset(&mut self) {
        self.state = DrowsyState::Alert;
        self.below_count = 0;
    }

    fn event(&self, frame_index: u64, timestamp_ms: u64, mean_ear: f32) -> AlarmEvent {
        AlarmEvent {
            state: self.state,
            frame_index,
            timestamp_ms,
            mean_ear,
            threshold: self.ear_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn machine(ear_threshold: f32, consecutive_frames: u32) -> DrowsyStateMachine {
        DrowsyStateMachine::new(StateConfig {
            ear_threshold,
            consecutive_frames,
        })
        .unwrap()
    }

    /// Run a signal sequence, returning (tick index, event) pairs
    fn run(
        machine: &mut DrowsyStateMachine,
        signals: &[Option<f32>],
    ) -> Vec<(usize, AlarmEvent)> {
        signals
            .iter()
            .enumerate()
            .filter_map(|(i, s)| machine.tick(*s, i as u64, i as u64 * 33).map(|e| (i, e)))
            .collect()
    }

    #[test]
    fn test_initial_state_is_alert() {
        let machine = machine(0.22, 3);
        assert_eq!(machine.state(), DrowsyState::Alert);
        assert_eq!(machine.below_count(), 0);
    }

    #[test]
    fn test_transition_on_nth_consecutive_below_tick() {
        // T=0.22, N=3: below at ticks 2,3,4 -> Drowsy on the 3rd (index 4),
        // recovery at index 5
        let mut machine = machine(0.22, 3);
        let signals = [0.30, 0.30, 0.18, 0.17, 0.19, 0.30].map(Some);
        let events = run(&mut machine, &signals);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, 4);
        assert_eq!(events[0].1.state, DrowsyState::Drowsy);
        assert!((events[0].1.mean_ear - 0.19).abs() < 1e-6);
        assert_eq!(events[1].0, 5);
        assert_eq!(events[1].1.state, DrowsyState::Alert);
        assert_eq!(machine.below_count(), 0);
    }

    #[test]
    fn test_never_transitions_before_nth_tick() {
        let mut machine = machine(0.22, 3);
        assert!(machine.tick(Some(0.18), 0, 0).is_none());
        assert!(machine.tick(Some(0.18), 1, 33).is_none());
        assert_eq!(machine.below_count(), 2);
        assert_eq!(machine.state(), DrowsyState::Alert);
        assert!(machine.tick(Some(0.18), 2, 66).is_some());
    }

    #[test]
    fn test_no_signal_holds_state_and_counter() {
        // [0.30, NO_SIGNAL, 0.18, 0.17, 0.19]: the no-signal tick neither
        // increments nor resets, Drowsy confirmed at index 4
        let mut machine = machine(0.22, 3);
        let signals = [Some(0.30), None, Some(0.18), Some(0.17), Some(0.19)];
        let events = run(&mut machine, &signals);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, 4);
        assert_eq!(events[0].1.state, DrowsyState::Drowsy);
    }

    #[test]
    fn test_no_signal_run_is_idempotent() {
        let mut machine = machine(0.22, 3);
        machine.tick(Some(0.18), 0, 0);
        machine.tick(Some(0.18), 1, 33);

        for i in 2..50 {
            assert!(machine.tick(None, i, i * 33).is_none());
        }
        assert_eq!(machine.state(), DrowsyState::Alert);
        assert_eq!(machine.below_count(), 2);

        // The held counter resumes where it left off
        let event = machine.tick(Some(0.18), 50, 50 * 33).unwrap();
        assert_eq!(event.state, DrowsyState::Drowsy);
    }

    #[test]
    fn test_no_signal_holds_drowsy_state() {
        let mut machine = machine(0.22, 2);
        machine.tick(Some(0.10), 0, 0);
        machine.tick(Some(0.10), 1, 33);
        assert!(machine.is_drowsy());

        for i in 2..30 {
            assert!(machine.tick(None, i, i * 33).is_none());
        }
        assert!(machine.is_drowsy());
    }

    #[test]
    fn test_single_event_for_sustained_closure() {
        // 2N below-threshold ticks emit exactly one Drowsy event, not N
        let mut machine = machine(0.22, 3);
        let signals: Vec<Option<f32>> = std::iter::repeat(Some(0.15)).take(6).collect();
        let events = run(&mut machine, &signals);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, 2);
        assert_eq!(events[0].1.state, DrowsyState::Drowsy);
    }

    #[test]
    fn test_counter_resets_when_signal_recovers() {
        let mut machine = machine(0.22, 3);
        machine.tick(Some(0.18), 0, 0);
        machine.tick(Some(0.18), 1, 33);
        machine.tick(Some(0.30), 2, 66);
        assert_eq!(machine.below_count(), 0);

        // Two more below ticks are not enough after the reset
        assert!(machine.tick(Some(0.18), 3, 99).is_none());
        assert!(machine.tick(Some(0.18), 4, 132).is_none());
        assert_eq!(machine.state(), DrowsyState::Alert);
    }

    #[test]
    fn test_immediate_transition_when_debounce_is_one() {
        let mut machine = machine(0.22, 1);
        let event = machine.tick(Some(0.18), 0, 0).unwrap();
        assert_eq!(event.state, DrowsyState::Drowsy);
        let event = machine.tick(Some(0.30), 1, 33).unwrap();
        assert_eq!(event.state, DrowsyState::Alert);
    }

    #[test]
    fn test_signal_at_threshold_counts_as_open() {
        let mut machine = machine(0.22, 1);
        assert!(machine.tick(Some(0.22), 0, 0).is_none());
        assert_eq!(machine.below_count(), 0);
    }

    #[test]
    fn test_event_carries_transition_context() {
        let mut machine = machine(0.22, 1);
        let event = machine.tick(Some(0.17), 42, 1_700_000_000_000).unwrap();
        assert_eq!(event.frame_index, 42);
        assert_eq!(event.timestamp_ms, 1_700_000_000_000);
        assert!((event.mean_ear - 0.17).abs() < 1e-6);
        assert!((event.threshold - 0.22).abs() < 1e-6);
    }

    #[test]
    fn test_set_threshold_applies_to_future_ticks_only() {
        let mut machine = machine(0.22, 3);
        machine.tick(Some(0.18), 0, 0);
        machine.tick(Some(0.18), 1, 33);
        assert_eq!(machine.below_count(), 2);

        // Lowering the threshold does not retroactively re-evaluate the
        // counted ticks; 0.18 is now an open eye and resets the counter
        machine.set_threshold(0.15).unwrap();
        assert_eq!(machine.below_count(), 2);
        assert!(machine.tick(Some(0.18), 2, 66).is_none());
        assert_eq!(machine.below_count(), 0);
    }

    #[test]
    fn test_set_threshold_rejects_out_of_range() {
        let mut machine = machine(0.22, 3);
        assert!(machine.set_threshold(0.5).is_err());
        assert!((machine.ear_threshold() - 0.22).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_config_rejected_before_any_frame() {
        let result = DrowsyStateMachine::new(StateConfig {
            ear_threshold: 0.5,
            consecutive_frames: 3,
        });
        assert!(matches!(
            result,
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn test_reset_returns_to_alert() {
        let mut machine = machine(0.22, 2);
        machine.tick(Some(0.10), 0, 0);
        machine.tick(Some(0.10), 1, 33);
        assert!(machine.is_drowsy());

        machine.reset();
        assert_eq!(machine.state(), DrowsyState::Alert);
        assert_eq!(machine.below_count(), 0);
    }

    proptest! {
        /// Every emitted event flips the state relative to the previous
        /// event: exactly one event per actual transition, regardless of
        /// the signal sequence
        #[test]
        fn test_events_alternate_states(
            signals in prop::collection::vec(
                prop::option::weighted(0.9, 0.0f32..0.45),
                0..200,
            )
        ) {
            let mut machine = machine(0.22, 3);
            let mut previous = DrowsyState::Alert;
            for (i, signal) in signals.iter().enumerate() {
                if let Some(event) = machine.tick(*signal, i as u64, i as u64 * 33) {
                    // No-signal ticks never produce an event
                    prop_assert!(signal.is_some());
                    prop_assert_ne!(event.state, previous);
                    previous = event.state;
                }
            }
        }
    }
}
