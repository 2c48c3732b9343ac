//! End-to-end detection loop scenarios on synthetic frames

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alerting::{AlertDispatcher, AlertError, NoHaptics, VoiceOutput};
use async_trait::async_trait;
use camera_capture::{frame_channel, FrameSender, VideoFrame};
use detection_core::{BoundingBox, DetectionType, Priority};
use navigator::{CycleReport, DetectionSession, NavigatorConfig};
use object_detection::{
    FnModel, KnownObjectDetector, ModelLoader, ObjectDetectorError, ObjectModel, RawPrediction,
};
use tokio::sync::mpsc;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

#[derive(Clone, Default)]
struct SpokenLog(Arc<Mutex<Vec<String>>>);

impl VoiceOutput for SpokenLog {
    fn is_supported(&self) -> bool {
        true
    }

    fn speak(&mut self, text: &str, _interrupt: bool) -> Result<(), AlertError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Person walking toward the camera: 5.0 m at sequence 0, 0.5 m at 9
fn approaching_person(frame: &VideoFrame) -> Vec<RawPrediction> {
    let distance = 5.0 - 0.5 * frame.sequence as f32;
    // person reference height 0.7 at 1 m
    let height = 0.7 / distance * HEIGHT as f32;
    let bbox = BoundingBox::new(240.0, HEIGHT as f32 / 2.0 - height / 2.0, 160.0, height);
    vec![RawPrediction::new("person", 0.9, bbox)]
}

fn frame(sequence: u32) -> VideoFrame {
    let mut frame = VideoFrame::filled(WIDTH, HEIGHT, [90, 90, 90]);
    frame.sequence = sequence;
    frame
}

fn stair_frame(sequence: u32) -> VideoFrame {
    let mut frame = VideoFrame::from_fn(WIDTH, HEIGHT, |_, y| {
        if y < 300 {
            [40, 40, 40]
        } else {
            [200, 200, 200]
        }
    });
    frame.sequence = sequence;
    frame
}

fn spawn_producer(tx: FrameSender, frames: Vec<VideoFrame>, spacing: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        for frame in frames {
            if tx.send(frame).await.is_err() {
                break;
            }
            tokio::time::sleep(spacing).await;
        }
    })
}

fn drain(reports: &mut mpsc::Receiver<CycleReport>) -> Vec<CycleReport> {
    let mut out = Vec::new();
    while let Ok(report) = reports.try_recv() {
        out.push(report);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn approaching_person_escalates_to_critical() {
    let mut config = NavigatorConfig::default();
    config.object_detection.max_distance = 10.0;
    config.level_detection.enabled = false;

    let model: Arc<dyn ObjectModel> = Arc::new(FnModel::new("approaching", approaching_person));
    let detector = KnownObjectDetector::with_model(config.object_detection.clone(), model).unwrap();

    let spoken = SpokenLog::default();
    let dispatcher = AlertDispatcher::new(Box::new(spoken.clone()), Box::new(NoHaptics));
    let mut session = DetectionSession::new(&config, detector, dispatcher).unwrap();
    let mut reports = session.subscribe(32);

    let (tx, mut source) = frame_channel(4);
    let producer = spawn_producer(tx, (0..10).map(frame).collect(), Duration::from_millis(700));

    let summary = session.run(&mut source).await.unwrap();
    producer.await.unwrap();

    assert_eq!(summary.frames, 10);
    assert_eq!(summary.cycles, 10);
    assert_eq!(summary.errors, 0);

    let reports = drain(&mut reports);
    assert_eq!(reports.len(), 10);

    let priorities: Vec<Priority> = reports
        .iter()
        .map(|r| {
            assert_eq!(r.detections.len(), 1);
            assert_eq!(r.detections[0].kind, DetectionType::KnownObject);
            r.detections[0].priority
        })
        .collect();

    // Ranks never increase (severity never drops) and the walk ends critical
    assert!(priorities.windows(2).all(|w| w[1].rank() <= w[0].rank()));
    assert_eq!(priorities.first(), Some(&Priority::High));
    assert_eq!(priorities.last(), Some(&Priority::Critical));

    let announced: Vec<_> = reports.iter().filter_map(|r| r.announcement.as_ref()).collect();
    assert!(announced.len() >= 2, "announcements: {:?}", announced);
    let keys: std::collections::HashSet<_> = announced.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(keys.len(), announced.len());
    assert_eq!(announced.last().map(|a| a.priority), Some(Priority::Critical));

    let spoken = spoken.0.lock().unwrap();
    assert_eq!(spoken.len(), announced.len());
    assert_eq!(spoken[0], "Persona al frente, 5 metros");
    assert_eq!(summary.announcements as usize, spoken.len());
}

#[tokio::test(start_paused = true)]
async fn muted_session_never_announces() {
    let mut config = NavigatorConfig::default();
    config.object_detection.max_distance = 10.0;
    config.pipeline.audio_enabled = false;

    let model: Arc<dyn ObjectModel> = Arc::new(FnModel::new("approaching", approaching_person));
    let detector = KnownObjectDetector::with_model(config.object_detection.clone(), model).unwrap();
    let spoken = SpokenLog::default();
    let dispatcher = AlertDispatcher::new(Box::new(spoken.clone()), Box::new(NoHaptics));
    let mut session = DetectionSession::new(&config, detector, dispatcher).unwrap();

    let (tx, mut source) = frame_channel(4);
    let producer = spawn_producer(tx, (0..10).map(frame).collect(), Duration::from_millis(700));
    let summary = session.run(&mut source).await.unwrap();
    producer.await.unwrap();

    assert_eq!(summary.cycles, 10);
    assert_eq!(summary.announcements, 0);
    assert!(spoken.0.lock().unwrap().is_empty());
}

struct BrokenLoader;

#[async_trait]
impl ModelLoader for BrokenLoader {
    async fn load(&self) -> Result<Arc<dyn ObjectModel>, ObjectDetectorError> {
        Err(ObjectDetectorError::ModelLoad("weights not found".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn failed_model_load_keeps_level_detection() {
    let config = NavigatorConfig::default();
    let mut detector = KnownObjectDetector::new(config.object_detection.clone()).unwrap();
    detector.start_loading(Arc::new(BrokenLoader));

    let mut session = DetectionSession::new(&config, detector, AlertDispatcher::default()).unwrap();
    let mut reports = session.subscribe(16);

    let (tx, mut source) = frame_channel(4);
    let producer = spawn_producer(tx, (0..8).map(stair_frame).collect(), Duration::from_millis(100));
    let summary = session.run(&mut source).await.unwrap();
    producer.await.unwrap();

    assert_eq!(summary.cycles, 8);
    assert_eq!(summary.errors, 0);

    let reports = drain(&mut reports);
    for report in &reports {
        let expect_stair = report.cycle % 4 == 0;
        assert_eq!(!report.detections.is_empty(), expect_stair, "cycle {}", report.cycle);
        if expect_stair {
            assert_eq!(report.detections[0].kind, DetectionType::StairDown);
            assert_eq!(report.detections[0].priority, Priority::Critical);
        }
    }
    // Announced on cycle 4; cycle 8 falls inside the critical interval
    let announced = reports.iter().filter(|r| r.announcement.is_some()).count();
    assert_eq!(announced, 1);
}

/// Fails on one frame, succeeds elsewhere
struct FlakyModel;

#[async_trait]
impl ObjectModel for FlakyModel {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn detect(&self, frame: &VideoFrame) -> Result<Vec<RawPrediction>, ObjectDetectorError> {
        if frame.sequence == 2 {
            return Err(ObjectDetectorError::Inference("backend hiccup".into()));
        }
        Ok(vec![RawPrediction::new(
            "chair",
            0.8,
            BoundingBox::new(260.0, 200.0, 120.0, 120.0),
        )])
    }
}

#[tokio::test(start_paused = true)]
async fn cycle_failure_does_not_stop_the_loop() {
    let config = NavigatorConfig::default();
    let model: Arc<dyn ObjectModel> = Arc::new(FlakyModel);
    let detector = KnownObjectDetector::with_model(config.object_detection.clone(), model).unwrap();
    let mut session = DetectionSession::new(&config, detector, AlertDispatcher::default()).unwrap();
    let mut reports = session.subscribe(16);

    let (tx, mut source) = frame_channel(4);
    let producer = spawn_producer(tx, (0..5).map(frame).collect(), Duration::from_millis(200));
    let summary = session.run(&mut source).await.unwrap();
    producer.await.unwrap();

    assert_eq!(summary.cycles, 5);
    assert_eq!(summary.errors, 1);

    let reports = drain(&mut reports);
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.frame_sequence != 2));
    assert!(reports.iter().all(|r| r.detections[0].label == "Silla"));
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_pending_frame_wait() {
    let config = NavigatorConfig::default();
    let detector = KnownObjectDetector::new(config.object_detection.clone()).unwrap();
    let mut session = DetectionSession::new(&config, detector, AlertDispatcher::default()).unwrap();
    let stop = session.stop_handle();

    // Producer stays alive but never sends
    let (_tx, mut source) = frame_channel(1);
    let run = tokio::spawn(async move {
        let summary = session.run(&mut source).await;
        (session, summary)
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    stop.stop();

    let (session, summary) = run.await.unwrap();
    assert_eq!(summary.unwrap().cycles, 0);
    assert!(session.latest().is_empty());
}
