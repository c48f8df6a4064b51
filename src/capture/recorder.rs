// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Periodic activation recording.
//!
//! One frame is pulled and classified per tick. Ticks never overlap: a slow
//! frame pushes the following ticks back instead of bursting to catch up,
//! so timing is best effort. The run ends when the total duration elapses,
//! the stop future resolves, or the frame source is exhausted.
//!
//! On a multi-threaded runtime frames are pulled through
//! `block_in_place`, so image decoding does not stall other tasks such as
//! the Ctrl-C listener. The stop future is still only checked between frames.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::calibration::SampleGeometry;
use crate::config::{CaptureConfig, DetectionConfig};
use crate::error::{KeyscanError, Result};

use super::classify::{classify_frame, render_activation, DEFAULT_EPSILON};
use super::frame::Frame;
use super::matrix::ActivationMatrix;
use super::source::FrameSource;

/// Default sampling period
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

/// Default run length: a 5 minute song at quarter speed plus 30 s of margin
pub const DEFAULT_TOTAL_DURATION: Duration = Duration::from_secs(1230);

/// Why a recording ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Total duration elapsed
    Elapsed,
    /// Stop signal received (e.g. Ctrl-C)
    Cancelled,
    /// Frame source had no more frames
    Exhausted,
}

/// A finished recording
#[derive(Debug, Clone)]
pub struct Recording {
    pub matrix: ActivationMatrix,
    pub stop_reason: StopReason,
}

/// Samples a keyboard row at a fixed period
#[derive(Debug, Clone)]
pub struct ActivationRecorder {
    geometry: SampleGeometry,
    epsilon: u8,
    sample_interval: Duration,
    total_duration: Duration,
    end_on_exhaustion: bool,
}

impl ActivationRecorder {
    /// Create a recorder with the stock 50 ms period and 1230 s run length
    pub fn new(geometry: SampleGeometry) -> Self {
        Self {
            geometry,
            epsilon: DEFAULT_EPSILON,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            total_duration: DEFAULT_TOTAL_DURATION,
            end_on_exhaustion: true,
        }
    }

    /// Create a recorder from the run configuration
    pub fn from_config(
        geometry: SampleGeometry,
        capture: &CaptureConfig,
        detection: &DetectionConfig,
    ) -> Result<Self> {
        let total_duration = capture
            .total_duration()
            .map_err(|e| KeyscanError::Configuration(format!("{:#}", e)))?;

        Ok(Self::new(geometry)
            .with_epsilon(detection.epsilon)
            .with_sample_interval(capture.sample_interval())
            .with_total_duration(total_duration)
            .with_end_on_exhaustion(capture.end_on_exhaustion))
    }

    pub fn with_epsilon(mut self, epsilon: u8) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_total_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Treat running out of frames as the end of the video
    pub fn with_end_on_exhaustion(mut self, enabled: bool) -> Self {
        self.end_on_exhaustion = enabled;
        self
    }

    /// Expected number of lines for an uninterrupted run
    pub fn expected_lines(&self) -> u128 {
        self.total_duration.as_millis() / self.sample_interval.as_millis().max(1)
    }

    /// Record until the duration elapses, `stop` resolves or frames run out
    pub async fn record<S, F>(&self, source: &mut S, stop: F) -> Result<Recording>
    where
        S: FrameSource,
        F: Future,
    {
        let mut matrix = ActivationMatrix::new(self.geometry.num_keys());

        let mut ticker = time::interval(self.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = time::sleep_until(deadline_after(self.total_duration));
        tokio::pin!(deadline);
        tokio::pin!(stop);

        info!(
            "Recording {} keys every {:?} (up to {} lines)",
            self.geometry.num_keys(),
            self.sample_interval,
            self.expected_lines()
        );

        let stop_reason = loop {
            tokio::select! {
                biased;

                _ = &mut deadline => break StopReason::Elapsed,
                _ = &mut stop => break StopReason::Cancelled,
                _ = ticker.tick() => {
                    let frame = match pull_frame(source)? {
                        Some(frame) => frame,
                        None if self.end_on_exhaustion => break StopReason::Exhausted,
                        None => {
                            return Err(KeyscanError::Capture(format!(
                                "frame source ran out after {} lines",
                                matrix.len()
                            )));
                        }
                    };

                    let activation = classify_frame(&frame, &self.geometry, self.epsilon)?;
                    debug!("{}", render_activation(&activation));
                    matrix.push(activation)?;
                }
            }
        };

        match (stop_reason, source.frames_left()) {
            (StopReason::Cancelled, _) => warn!("Capture cancelled after {} lines", matrix.len()),
            (StopReason::Elapsed, Some(left)) if left > 0 => warn!(
                "Capture time ran out after {} lines with {} frames unread",
                matrix.len(),
                left
            ),
            _ => info!("Finished capture with {} lines ({:?})", matrix.len(), stop_reason),
        }

        Ok(Recording {
            matrix,
            stop_reason,
        })
    }
}

/// Pull one frame, off the async worker when the runtime allows it
fn pull_frame<S: FrameSource>(source: &mut S) -> Result<Option<Frame>> {
    match Handle::current().runtime_flavor() {
        RuntimeFlavor::MultiThread => task::block_in_place(|| source.next_frame()),
        _ => source.next_frame(),
    }
}

/// Far-future instants overflow, so very long durations are capped
fn deadline_after(duration: Duration) -> time::Instant {
    let now = time::Instant::now();
    now.checked_add(duration)
        .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::{Frame, Rgb};
    use crate::capture::source::FrameSequence;
    use std::future;

    const MAGENTA: Rgb = Rgb::new(255, 0, 255);
    const BLACK: Rgb = Rgb::new(0, 0, 0);

    fn geometry() -> SampleGeometry {
        SampleGeometry {
            row_y: 0,
            columns_x: vec![0, 2],
        }
    }

    fn frame(left: Rgb, right: Rgb) -> Frame {
        let mut frame = Frame::filled(3, 1, BLACK);
        frame.set_pixel(0, 0, left).unwrap();
        frame.set_pixel(2, 0, right).unwrap();
        frame
    }

    /// Endless source of identical frames
    struct Repeat(Frame);

    impl FrameSource for Repeat {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            Ok(Some(self.0.clone()))
        }
    }

    struct Failing;

    impl FrameSource for Failing {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            Err(KeyscanError::Capture("screen unavailable".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_one_line_per_tick() {
        let recorder = ActivationRecorder::new(geometry())
            .with_sample_interval(Duration::from_millis(50))
            .with_total_duration(Duration::from_millis(1020));

        let mut source = Repeat(frame(MAGENTA, BLACK));
        let recording = recorder
            .record(&mut source, future::pending::<()>())
            .await
            .unwrap();

        // ticks at 0, 50, ..., 1000
        assert_eq!(recording.stop_reason, StopReason::Elapsed);
        assert_eq!(recording.matrix.len(), 21);
        assert!(recording
            .matrix
            .lines()
            .iter()
            .all(|line| line == &vec![true, false]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lines_follow_frame_order() {
        let recorder = ActivationRecorder::new(geometry());
        let mut source = FrameSequence::new(vec![
            frame(BLACK, BLACK),
            frame(MAGENTA, BLACK),
            frame(MAGENTA, MAGENTA),
            frame(BLACK, MAGENTA),
        ]);

        let recording = recorder
            .record(&mut source, future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(recording.stop_reason, StopReason::Exhausted);
        assert_eq!(
            recording.matrix.lines(),
            &[
                vec![false, false],
                vec![true, false],
                vec![true, true],
                vec![false, true],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_error_when_not_allowed() {
        let recorder = ActivationRecorder::new(geometry())
            .with_total_duration(Duration::from_secs(10))
            .with_end_on_exhaustion(false);
        let mut source = FrameSequence::new(vec![frame(BLACK, BLACK)]);

        let result = recorder.record(&mut source, future::pending::<()>()).await;
        assert!(matches!(result, Err(KeyscanError::Capture(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_signal_keeps_partial_matrix() {
        let recorder = ActivationRecorder::new(geometry())
            .with_sample_interval(Duration::from_millis(50))
            .with_total_duration(Duration::from_secs(60));
        let mut source = Repeat(frame(BLACK, MAGENTA));

        let stop = time::sleep(Duration::from_millis(120));
        let recording = recorder.record(&mut source, stop).await.unwrap();

        // ticks at 0, 50, 100
        assert_eq!(recording.stop_reason, StopReason::Cancelled);
        assert_eq!(recording.matrix.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failure_is_fatal() {
        let recorder = ActivationRecorder::new(geometry());
        let result = recorder.record(&mut Failing, future::pending::<()>()).await;
        assert!(matches!(result, Err(KeyscanError::Capture(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_bounds_geometry_is_fatal() {
        let recorder = ActivationRecorder::new(SampleGeometry {
            row_y: 5,
            columns_x: vec![0, 1],
        });
        let mut source = Repeat(frame(BLACK, BLACK));
        let result = recorder.record(&mut source, future::pending::<()>()).await;
        assert!(matches!(result, Err(KeyscanError::OutOfBounds { .. })));
    }

    #[test]
    fn test_from_config() {
        let recorder = ActivationRecorder::from_config(
            geometry(),
            &CaptureConfig::default(),
            &DetectionConfig::default(),
        )
        .unwrap();
        // 1230 s at 50 ms
        assert_eq!(recorder.expected_lines(), 24_600);
    }

    #[test]
    fn test_new_uses_stock_run_length() {
        let recorder = ActivationRecorder::new(geometry());
        assert_eq!(recorder.expected_lines(), 24_600);
    }

    #[test]
    fn test_from_config_rejects_unrepresentable_duration() {
        let capture = CaptureConfig {
            song_duration_minutes: f64::NAN,
            ..CaptureConfig::default()
        };
        let result =
            ActivationRecorder::from_config(geometry(), &capture, &DetectionConfig::default());
        assert!(matches!(result, Err(KeyscanError::Configuration(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_run_leaves_frames_unread() {
        let recorder = ActivationRecorder::new(geometry())
            .with_total_duration(Duration::from_millis(120));
        let mut source = FrameSequence::new(vec![frame(BLACK, MAGENTA); 10]);

        let recording = recorder
            .record(&mut source, future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(recording.stop_reason, StopReason::Elapsed);
        assert_eq!(recording.matrix.len(), 3);
        assert_eq!(source.frames_left(), Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_records_on_multi_thread_runtime() {
        let recorder =
            ActivationRecorder::new(geometry()).with_sample_interval(Duration::from_millis(1));
        let mut source = FrameSequence::new(vec![
            frame(MAGENTA, BLACK),
            frame(BLACK, MAGENTA),
        ]);

        let recording = recorder
            .record(&mut source, future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(recording.stop_reason, StopReason::Exhausted);
        assert_eq!(
            recording.matrix.lines(),
            &[vec![true, false], vec![false, true]]
        );
    }
}
