//! Bounded-queue event dispatcher

use std::collections::VecDeque;

use drowsy_state::AlarmEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::AlarmSink;

/// Default event queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Delivers queued alarm events to a sink without stalling frame evaluation
///
/// Events arrive through a bounded channel and are delivered strictly in
/// frame-index order. When the sink is unavailable the event is kept in a
/// pending buffer and retried on the next delivery opportunity: bursty
/// delivery queues rather than drops, and a slow sink degrades log
/// timeliness, not detection correctness.
pub struct AlarmDispatcher<S: AlarmSink> {
    /// Channel receiver for incoming events
    receiver: mpsc::Receiver<AlarmEvent>,
    /// Delivery target
    sink: S,
    /// Events not yet accepted by the sink, oldest first
    pending: VecDeque<AlarmEvent>,
}

impl<S: AlarmSink> AlarmDispatcher<S> {
    /// Create a dispatcher reading from an existing channel
    pub fn new(receiver: mpsc::Receiver<AlarmEvent>, sink: S) -> Self {
        Self {
            receiver,
            sink,
            pending: VecDeque::new(),
        }
    }

    /// Create a channel pair for the dispatcher
    pub fn channel(capacity: usize, sink: S) -> (mpsc::Sender<AlarmEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx, sink))
    }

    /// Run until the sending side closes, then flush the backlog
    ///
    /// Returns the sink so callers can inspect or close it.
    pub async fn run(mut self) -> S {
        info!("alarm dispatcher started");

        while let Some(event) = self.receiver.recv().await {
            self.pending.push_back(event);
            self.flush();
        }

        // Channel closed: one final delivery attempt for the backlog
        self.flush();
        if !self.pending.is_empty() {
            warn!(
                undelivered = self.pending.len(),
                "dispatcher stopping with undelivered events"
            );
        }

        info!("alarm dispatcher stopped");
        self.sink
    }

    /// Deliver pending events in order, stopping at the first failure
    fn flush(&mut self) {
        while let Some(event) = self.pending.front() {
            match self.sink.deliver(event) {
                Ok(()) => {
                    debug!(frame_index = event.frame_index, "alarm event delivered");
                    self.pending.pop_front();
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        pending = self.pending.len(),
                        "alarm sink unavailable, will retry"
                    );
                    break;
                }
            }
        }
    }
}
