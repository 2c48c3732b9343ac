//! Camera Capture Library for the Obstacle Navigator
//!
//! The camera device itself is owned by the host platform. This crate only
//! models what the detection loop consumes:
//! - Decoded RGB video frames
//! - Frame sources that yield frames one at a time
//! - An in-memory channel source and an image-sequence source

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::{frame_channel, ChannelFrameSource, FrameSender, FrameSource, ImageSequenceSource};

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open frame source: {0}")]
    Open(String),

    #[error("Failed to decode frame: {0}")]
    Decode(String),

    #[error("Camera not ready")]
    NotReady,

    #[error("Streaming error: {0}")]
    Stream(String),

    #[error("Frame source closed")]
    Closed,
}
