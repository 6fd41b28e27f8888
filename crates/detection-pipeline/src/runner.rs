//! Async frame intake and cancellation

use drowsy_state::AlarmEvent;
use eye_geometry::FrameObservation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{DrowsyPipeline, PipelineError};

/// Default frame intake queue capacity
pub const DEFAULT_FRAME_QUEUE: usize = 32;

/// Handle for feeding frames into a running pipeline and stopping it
pub struct PipelineHandle {
    frames: mpsc::Sender<FrameObservation>,
    shutdown: watch::Sender<bool>,
}

impl PipelineHandle {
    /// Submit one frame observation in capture order
    ///
    /// Fails once the pipeline has stopped; no frame is admitted after
    /// cancellation.
    pub async fn submit(&self, observation: FrameObservation) -> Result<(), PipelineError> {
        if *self.shutdown.borrow() {
            return Err(PipelineError::Stopped);
        }
        self.frames
            .send(observation)
            .await
            .map_err(|_| PipelineError::Stopped)
    }

    /// Request a clean stop
    ///
    /// The frame currently being evaluated completes; no further frame is
    /// admitted or evaluated and no further event is emitted.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Processes frames one at a time in arrival order, forwarding alarm
/// events to the dispatcher queue
///
/// Dropping the handle (without an explicit stop) closes the frame
/// channel; the runner then drains the frames already queued and exits.
pub struct PipelineRunner {
    pipeline: DrowsyPipeline,
    frames: mpsc::Receiver<FrameObservation>,
    events: mpsc::Sender<AlarmEvent>,
    shutdown: watch::Receiver<bool>,
}

impl PipelineRunner {
    /// Create a runner and its handle
    pub fn new(
        pipeline: DrowsyPipeline,
        events: mpsc::Sender<AlarmEvent>,
        frame_queue: usize,
    ) -> (PipelineHandle, Self) {
        let (frame_tx, frame_rx) = mpsc::channel(frame_queue);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        (
            PipelineHandle {
                frames: frame_tx,
                shutdown: shutdown_tx,
            },
            Self {
                pipeline,
                frames: frame_rx,
                events,
                shutdown: shutdown_rx,
            },
        )
    }

    /// Run until stopped or until all frame senders are dropped
    ///
    /// Returns the pipeline so callers can inspect its final state.
    pub async fn run(mut self) -> DrowsyPipeline {
        info!("detection pipeline started");
        let mut shutdown_open = true;

        loop {
            tokio::select! {
                biased;
                changed = self.shutdown.changed(), if shutdown_open => {
                    match changed {
                        Ok(()) if *self.shutdown.borrow() => {
                            info!("pipeline stop requested");
                            break;
                        }
                        Ok(()) => {}
                        // Handle dropped without an explicit stop: keep
                        // draining the frames already queued
                        Err(_) => shutdown_open = false,
                    }
                }
                observation = self.frames.recv() => {
                    let Some(observation) = observation else {
                        debug!("frame channel closed");
                        break;
                    };
                    if let Some(event) = self.pipeline.process(&observation) {
                        self.forward(event).await;
                    }
                }
            }
        }

        info!("detection pipeline stopped");
        self.pipeline
    }

    /// Hand an event to the dispatcher queue without dropping it
    ///
    /// A full queue means the sink is slow; evaluation waits for capacity
    /// rather than losing a transition.
    async fn forward(&self, event: AlarmEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!("event queue full, waiting for dispatcher");
                if self.events.send(event).await.is_err() {
                    warn!("alarm dispatcher gone, event dropped");
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("alarm dispatcher gone, event dropped");
            }
        }
    }
}
