//! Detection session: the throttled, single-flight detection loop

use std::sync::Arc;
use std::time::Duration;

use alerting::{AlertDispatcher, Announcement, AnnouncementScheduler};
use camera_capture::{CameraError, FrameSource, VideoFrame};
use detection_core::{Detection, DistanceEstimator, Roi};
use event_fusion::{fuse, LayerConverter};
use metrics::{counter, histogram};
use object_detection::KnownObjectDetector;
use scene_heuristics::{detect_generic_obstacles, GenericObstacleConfig, LevelChangeDetector, LevelDetectionConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::settings::{NavigatorConfig, PipelineConfig};
use crate::NavigatorError;

/// Outcome of one executed detection cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// 1-based index of the executed cycle within the session
    pub cycle: u64,
    /// Sequence number of the analysed frame
    pub frame_sequence: u32,
    /// Fused, ranked detections
    pub detections: Vec<Detection>,
    pub announcement: Option<Announcement>,
}

/// Totals for a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub cycles: u64,
    pub announcements: u64,
    pub errors: u64,
}

/// Cancels a running session from another task
#[derive(Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Owns all loop state for one walk: counters, throttling and the
/// announcement scheduler
pub struct DetectionSession {
    pipeline: PipelineConfig,
    roi: Roi,
    level_config: LevelDetectionConfig,
    obstacle_config: GenericObstacleConfig,
    detector: KnownObjectDetector,
    level_detector: LevelChangeDetector,
    converter: LayerConverter,
    scheduler: AnnouncementScheduler,
    dispatcher: AlertDispatcher,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
    reports: Option<mpsc::Sender<CycleReport>>,
    summary: SessionSummary,
    last_cycle: Option<Instant>,
    latest: Vec<Detection>,
}

impl DetectionSession {
    pub fn new(
        config: &NavigatorConfig,
        detector: KnownObjectDetector,
        dispatcher: AlertDispatcher,
    ) -> Result<Self, NavigatorError> {
        config.validate()?;

        let converter = LayerConverter::new(
            DistanceEstimator::new(config.object_detection.distance.clone()),
            config.level_detection.min_confidence,
            config.generic_obstacles.overlap_threshold,
        );
        let (stop_tx, stop_rx) = watch::channel(false);

        Ok(Self {
            pipeline: config.pipeline.clone(),
            roi: config.object_detection.roi,
            level_config: config.level_detection.clone(),
            obstacle_config: config.generic_obstacles.clone(),
            detector,
            level_detector: LevelChangeDetector::new(config.level_detection.clone())?,
            converter,
            scheduler: AnnouncementScheduler::new(config.announcements.clone()),
            dispatcher,
            stop_tx: Arc::new(stop_tx),
            stop_rx,
            reports: None,
            summary: SessionSummary::default(),
            last_cycle: None,
            latest: Vec::new(),
        })
    }

    /// Receive a [`CycleReport`] for every executed cycle. Reports are
    /// dropped when the receiver lags behind.
    pub fn subscribe(&mut self, capacity: usize) -> mpsc::Receiver<CycleReport> {
        let (tx, rx) = mpsc::channel(capacity);
        self.reports = Some(tx);
        rx
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Fused list from the most recent cycle
    pub fn latest(&self) -> &[Detection] {
        &self.latest
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.pipeline.audio_enabled = enabled;
    }

    /// Clear counters and throttling so the session starts fresh
    pub fn start(&mut self) {
        self.stop_tx.send_replace(false);
        self.stop_rx.borrow_and_update();
        self.summary = SessionSummary::default();
        self.last_cycle = None;
        self.latest.clear();
        self.scheduler.reset();
        info!("Detection session started ({} fps)", self.pipeline.analysis_fps);
    }

    /// Run until the source is exhausted or the session is stopped
    pub async fn run<S>(&mut self, source: &mut S) -> Result<SessionSummary, NavigatorError>
    where
        S: FrameSource + ?Sized,
    {
        self.start();
        let result = self.run_loop(source).await;

        self.scheduler.reset();
        info!(
            "Detection session stopped: {} frames, {} cycles, {} announcements",
            self.summary.frames, self.summary.cycles, self.summary.announcements
        );
        result.map(|_| self.summary)
    }

    async fn run_loop<S>(&mut self, source: &mut S) -> Result<(), NavigatorError>
    where
        S: FrameSource + ?Sized,
    {
        let min_interval = self.pipeline.min_cycle_interval();

        loop {
            if *self.stop_rx.borrow() {
                return Ok(());
            }

            let next = tokio::select! {
                biased;
                _ = self.stop_rx.changed() => continue,
                next = source.next_frame() => next,
            };

            let frame = match next {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Frame source exhausted");
                    return Ok(());
                }
                Err(CameraError::Decode(e)) => {
                    warn!("Skipping frame: {}", e);
                    continue;
                }
                Err(e) => {
                    error!("Frame source failed: {}", e);
                    return Err(e.into());
                }
            };
            self.summary.frames += 1;

            if !source.is_ready() || !frame.is_ready() {
                debug!("Frame {} unavailable, skipping cycle", frame.sequence);
                self.latest.clear();
                continue;
            }

            let now = Instant::now();
            if !self.cycle_due(now, min_interval) {
                continue;
            }
            self.last_cycle = Some(now);
            self.summary.cycles += 1;

            let started = std::time::Instant::now();
            match self.run_cycle(&frame, now).await {
                Ok(report) => self.publish(report),
                Err(e) => {
                    self.summary.errors += 1;
                    counter!("navigator_cycle_errors_total").increment(1);
                    warn!("Detection cycle {} failed: {}", self.summary.cycles, e);
                }
            }
            counter!("navigator_cycles_total").increment(1);
            histogram!("navigator_cycle_duration_seconds").record(started.elapsed().as_secs_f64());
        }
    }

    fn cycle_due(&self, now: Instant, min_interval: Duration) -> bool {
        match self.last_cycle {
            Some(last) => now.saturating_duration_since(last) >= min_interval,
            None => true,
        }
    }

    /// One cycle: Layer 1 always, Layer 2 (and 3) on the reduced cadence,
    /// then fusion and scheduling
    async fn run_cycle(&mut self, frame: &VideoFrame, now: Instant) -> Result<CycleReport, NavigatorError> {
        let cycle = self.summary.cycles;
        let known = self.detector.detect(frame).await?;

        let mut layer2 = Vec::new();
        let heuristics_due = cycle % self.level_config.every_n_cycles as u64 == 0;
        if heuristics_due {
            if self.level_config.enabled {
                let level_changes = self.level_detector.detect(frame);
                layer2.extend(self.converter.level_changes(&level_changes, frame.height));
            }
            if self.obstacle_config.enabled {
                let obstacles = detect_generic_obstacles(frame, &self.roi, &self.obstacle_config);
                layer2.extend(self.converter.obstacles(&obstacles, &known, frame.width, frame.height));
            }
        }

        let detections = fuse(known, layer2);
        counter!("navigator_detections_total").increment(detections.len() as u64);
        debug!(
            "Cycle {}: {:?}",
            cycle,
            detections
                .iter()
                .map(|d| (d.label.as_str(), d.priority.as_str(), d.distance))
                .collect::<Vec<_>>()
        );

        let announcement = self.scheduler.evaluate(&detections, self.pipeline.audio_enabled, now);
        if let Some(announcement) = &announcement {
            self.summary.announcements += 1;
            counter!("navigator_announcements_total").increment(1);
            if let Err(e) = self.dispatcher.dispatch(announcement) {
                warn!("Alert output failed: {}", e);
            }
        }

        self.latest = detections.clone();
        Ok(CycleReport {
            cycle,
            frame_sequence: frame.sequence,
            detections,
            announcement,
        })
    }

    fn publish(&self, report: CycleReport) {
        if let Some(tx) = &self.reports {
            if tx.try_send(report).is_err() {
                debug!("Cycle report dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture::frame_channel;

    fn session(config: &NavigatorConfig) -> DetectionSession {
        let detector = KnownObjectDetector::new(config.object_detection.clone()).unwrap();
        DetectionSession::new(config, detector, AlertDispatcher::default()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttles_to_analysis_rate() {
        let config = NavigatorConfig::default();
        let mut session = session(&config);
        let (tx, mut source) = frame_channel(64);

        // 30 frames at ~10 ms spacing against a 66 ms cycle interval
        let producer = tokio::spawn(async move {
            for i in 0..30 {
                let mut frame = VideoFrame::filled(64, 48, [50, 50, 50]);
                frame.sequence = i;
                if tx.send(frame).await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        let summary = session.run(&mut source).await.unwrap();
        producer.await.unwrap();

        assert_eq!(summary.frames, 30);
        assert!(summary.cycles >= 4 && summary.cycles <= 6, "cycles = {}", summary.cycles);
        assert_eq!(summary.errors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_handle_ends_session() {
        let config = NavigatorConfig::default();
        let mut session = session(&config);
        let (_tx, mut source) = frame_channel(4);
        let handle = session.stop_handle();

        let run = tokio::spawn(async move { session.run(&mut source).await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop();

        let summary = run.await.unwrap().unwrap();
        assert_eq!(summary.frames, 0);
    }

    #[tokio::test]
    async fn test_restart_resets_state() {
        let config = NavigatorConfig::default();
        let mut session = session(&config);

        let (tx, mut source) = frame_channel(4);
        tx.send(VideoFrame::filled(64, 48, [0, 0, 0])).await.unwrap();
        drop(tx);
        let first = session.run(&mut source).await.unwrap();
        assert_eq!(first.frames, 1);

        let (tx, mut source) = frame_channel(4);
        drop(tx);
        let second = session.run(&mut source).await.unwrap();
        assert_eq!(second, SessionSummary::default());
        assert!(session.latest().is_empty());
    }

    /// Delivers frames while reporting that the camera is not ready
    struct WarmingUpSource {
        remaining: u32,
    }

    #[async_trait::async_trait]
    impl FrameSource for WarmingUpSource {
        fn is_ready(&self) -> bool {
            false
        }

        fn dimensions(&self) -> (u32, u32) {
            (0, 0)
        }

        async fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(VideoFrame::filled(64, 48, [50, 50, 50])))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unready_source_runs_no_cycles() {
        let mut session = session(&NavigatorConfig::default());
        let mut reports = session.subscribe(8);
        let mut source = WarmingUpSource { remaining: 5 };

        let summary = session.run(&mut source).await.unwrap();

        assert_eq!(summary.frames, 5);
        assert_eq!(summary.cycles, 0);
        assert!(reports.try_recv().is_err());
        assert!(session.latest().is_empty());
    }

    #[tokio::test]
    async fn test_stair_detected_on_fourth_cycle() {
        let mut session = session(&NavigatorConfig::default());
        let stair = VideoFrame::from_fn(100, 200, |_, y| if y < 120 { [40, 40, 40] } else { [200, 200, 200] });

        let mut reports = Vec::new();
        for cycle in 1..=4 {
            session.summary.cycles = cycle;
            reports.push(session.run_cycle(&stair, Instant::now()).await.unwrap());
        }

        assert!(reports[..3].iter().all(|r| r.detections.is_empty()));
        let fourth = &reports[3];
        assert_eq!(fourth.detections.len(), 1);
        assert_eq!(fourth.detections[0].label, "Escalera bajando");
        let announcement = fourth.announcement.as_ref().unwrap();
        assert!(announcement.message.starts_with("¡Alto!"));
    }
}
