//! Sink trait and implementations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use drowsy_state::{AlarmEvent, DrowsyState};
use tracing::info;

use crate::SinkError;

/// Consumer of alarm events
///
/// Receives events in strict frame-index order, at most one per actual
/// state change. A failing delivery is surfaced as an error so the
/// dispatcher can buffer and retry; it must not halt frame processing.
pub trait AlarmSink {
    /// Deliver one alarm event
    fn deliver(&mut self, event: &AlarmEvent) -> Result<(), SinkError>;
}

/// Append-only event log, one human-readable line per event
///
/// The file is opened in append mode and never truncated or rewritten.
pub struct EventLog {
    file: File,
    path: PathBuf,
}

impl EventLog {
    /// Open (or create) the log at `path` and append a session marker
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(
            file,
            "Session started at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        info!(path = %path.display(), "event log opened");
        Ok(Self { file, path })
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_line(event: &AlarmEvent) -> String {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(event.timestamp_ms as i64)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| event.timestamp_ms.to_string());
        match event.state {
            DrowsyState::Drowsy => format!(
                "[{timestamp}] ALARM: Drowsy (EAR={:.3} < {:.3}, frame {})",
                event.mean_ear, event.threshold, event.frame_index
            ),
            DrowsyState::Alert => format!(
                "[{timestamp}] ALARM OFF: recovered (EAR={:.3}, frame {})",
                event.mean_ear, event.frame_index
            ),
        }
    }
}

impl AlarmSink for EventLog {
    fn deliver(&mut self, event: &AlarmEvent) -> Result<(), SinkError> {
        writeln!(self.file, "{}", Self::format_line(event))?;
        self.file.flush()?;
        Ok(())
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        // Best-effort session marker; there is no caller left to report to
        let _ = writeln!(
            self.file,
            "Session ended at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
    }
}

/// In-memory sink collecting events, for tests and embedding UIs
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<AlarmEvent>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Events collected so far, in delivery order
    pub fn events(&self) -> &[AlarmEvent] {
        &self.events
    }

    /// Number of collected events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if no events were delivered
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl AlarmSink for MemorySink {
    fn deliver(&mut self, event: &AlarmEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}
