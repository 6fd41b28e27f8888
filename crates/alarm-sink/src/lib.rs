//! Alarm Sink
//!
//! Delivery of drowsiness alarm events to external consumers:
//! - `AlarmSink` trait for UI feedback and log collaborators
//! - Append-only human-readable event log
//! - Bounded-queue dispatcher decoupling delivery from frame evaluation

mod dispatcher;
mod sink;

pub use dispatcher::{AlarmDispatcher, DEFAULT_QUEUE_CAPACITY};
pub use sink::{AlarmSink, EventLog, MemorySink};

use thiserror::Error;

/// Errors during event delivery
#[derive(Debug, Error)]
pub enum SinkError {
    /// Underlying log file could not be opened or written
    #[error("event log I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
