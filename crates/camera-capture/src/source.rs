//! Frame sources
//!
//! A [`FrameSource`] hands the detection loop one decoded frame at a time.
//! Returning `Ok(None)` means the stream has ended.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{CameraError, VideoFrame};

/// Supplier of live video frames
#[async_trait]
pub trait FrameSource: Send {
    /// Whether the source currently delivers frames with real dimensions
    fn is_ready(&self) -> bool;

    /// Current frame dimensions, `(0, 0)` until the first frame arrives
    fn dimensions(&self) -> (u32, u32);

    /// Wait for the next frame
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError>;
}

/// Sending half of an in-memory frame channel
pub type FrameSender = mpsc::Sender<VideoFrame>;

/// Create an in-memory frame channel
pub fn frame_channel(capacity: usize) -> (FrameSender, ChannelFrameSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelFrameSource::new(rx))
}

/// Frame source fed by a host-side producer (platform camera callback, tests)
pub struct ChannelFrameSource {
    rx: mpsc::Receiver<VideoFrame>,
    dimensions: (u32, u32),
}

impl ChannelFrameSource {
    pub fn new(rx: mpsc::Receiver<VideoFrame>) -> Self {
        Self {
            rx,
            dimensions: (0, 0),
        }
    }
}

#[async_trait]
impl FrameSource for ChannelFrameSource {
    fn is_ready(&self) -> bool {
        self.dimensions.0 > 0 && self.dimensions.1 > 0
    }

    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        let frame = self.rx.recv().await;
        if let Some(frame) = &frame {
            self.dimensions = (frame.width, frame.height);
        }
        Ok(frame)
    }
}

/// Plays back a directory of still images at a fixed rate
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    looping: bool,
    period: Duration,
    ticker: Option<Interval>,
    dimensions: (u32, u32),
    sequence: u32,
}

impl ImageSequenceSource {
    /// Open every PNG/JPEG file in `dir`, sorted by file name
    pub fn open(dir: impl AsRef<Path>, fps: u32, looping: bool) -> Result<Self, CameraError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| CameraError::Open(format!("{}: {}", dir.display(), e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(CameraError::Open(format!("no images in {}", dir.display())));
        }

        info!("Image sequence source: {} frames from {} @ {} fps", paths.len(), dir.display(), fps);

        Ok(Self {
            paths,
            next: 0,
            looping,
            period: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            ticker: None,
            dimensions: (0, 0),
            sequence: 0,
        })
    }

    /// Number of images in the sequence
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[async_trait]
impl FrameSource for ImageSequenceSource {
    fn is_ready(&self) -> bool {
        self.dimensions.0 > 0 && self.dimensions.1 > 0
    }

    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        if self.next >= self.paths.len() {
            if !self.looping {
                return Ok(None);
            }
            self.next = 0;
        }

        let period = self.period;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;

        let path = self.paths[self.next].clone();
        self.next += 1;

        let decoded = tokio::task::spawn_blocking(move || image::open(&path).map(|img| img.to_rgb8()))
            .await
            .map_err(|e| CameraError::Stream(e.to_string()))?;

        let img = match decoded {
            Ok(img) => img,
            Err(e) => {
                warn!("Skipping undecodable frame: {}", e);
                return Err(CameraError::Decode(e.to_string()));
            }
        };

        self.sequence = self.sequence.wrapping_add(1);
        let timestamp_ns = self.sequence as u64 * self.period.as_nanos() as u64;
        let frame = VideoFrame::from_rgb_image(img, timestamp_ns, self.sequence);
        self.dimensions = (frame.width, frame.height);
        debug!("Frame {} decoded ({}x{})", self.sequence, frame.width, frame.height);

        Ok(Some(frame))
    }
}
