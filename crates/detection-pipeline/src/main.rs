//! Drowsiness Detection Pipeline - Demo Entry Point
//!
//! Feeds a synthetic landmark trace (open eyes, a long closure, recovery)
//! through the full async pipeline and appends the resulting alarm events
//! to `drowsy_log.txt`.

use alarm_sink::{AlarmDispatcher, EventLog};
use anyhow::Result;
use detection_pipeline::{
    init_logging, DrowsyPipeline, PipelineConfig, PipelineRunner, DEFAULT_FRAME_QUEUE,
};
use eye_geometry::{FrameObservation, LandmarkFrame, Point2, LEFT_EYE_6, RIGHT_EYE_6};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!(
        "=== Drowsiness Detection Pipeline v{} ===",
        env!("CARGO_PKG_VERSION")
    );

    let config_path = std::env::args().nth(1);
    let config = PipelineConfig::load(config_path.as_deref())?;
    info!(?config, "configuration loaded");

    let pipeline = DrowsyPipeline::new(&config)?;
    let log = EventLog::open("drowsy_log.txt")?;
    let (event_tx, dispatcher) = AlarmDispatcher::channel(config.event_queue_capacity, log);
    let (handle, runner) = PipelineRunner::new(pipeline, event_tx, DEFAULT_FRAME_QUEUE);

    let dispatcher_task = tokio::spawn(dispatcher.run());
    let runner_task = tokio::spawn(runner.run());

    let start_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_millis() as u64;

    // 30 frames open, 45 closed, 30 open again, with periodic detector
    // dropouts to exercise the hold-state fallback
    for frame in 0..105u64 {
        let timestamp_ms = start_ms + frame * 33;
        let observation = if frame % 25 == 7 {
            FrameObservation::no_detection(frame, timestamp_ms)
        } else {
            let lid_height = match frame {
                30..=74 => 0.2,
                _ => 0.6,
            };
            FrameObservation::detected(frame, timestamp_ms, synthetic_frame(lid_height))
        };
        handle.submit(observation).await?;
    }

    // Closing the handle drains the queued frames and stops the pipeline
    drop(handle);
    runner_task.await?;
    dispatcher_task.await?;

    info!("demo finished, events appended to drowsy_log.txt");
    Ok(())
}

/// Landmark frame with both eyes at their default MediaPipe ids; corners
/// 4.0 apart and lids `h` above/below the midline, so EAR = h / 2
fn synthetic_frame(h: f32) -> LandmarkFrame {
    let eye = |cx: f32, cy: f32| {
        [
            Point2::new(cx, cy),
            Point2::new(cx + 1.0, cy + h),
            Point2::new(cx + 3.0, cy + h),
            Point2::new(cx + 4.0, cy),
            Point2::new(cx + 3.0, cy - h),
            Point2::new(cx + 1.0, cy - h),
        ]
    };
    let mut points = vec![Point2::default(); 400];
    for (i, p) in LEFT_EYE_6.iter().zip(eye(100.0, 100.0)) {
        points[*i] = p;
    }
    for (i, p) in RIGHT_EYE_6.iter().zip(eye(200.0, 100.0)) {
        points[*i] = p;
    }
    LandmarkFrame::new(points)
}
