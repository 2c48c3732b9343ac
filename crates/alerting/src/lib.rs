//! Alerting System
//!
//! Turns the fused detection list into rate-limited speech and vibration:
//! - Throttling with a shorter interval while anything critical is in view
//! - Same-situation suppression keyed on type, label and rounded distance
//! - Type-specific Spanish phrasing and vibration patterns
//! - Voice/haptic capabilities resolved once at startup

mod config;
mod message;
mod output;
mod scheduler;
mod vibration;

pub use config::{AnnouncementConfig, CriticalRepeatPolicy};
pub use message::{announcement_message, format_distance};
pub use output::{AlertDispatcher, HapticOutput, LogHaptics, LogVoice, NoHaptics, VoiceOutput};
pub use scheduler::{announcement_key, Announcement, AnnouncementScheduler};
pub use vibration::vibration_pattern;

use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Output capability failed: {0}")]
    Output(String),

    #[error("Invalid announcement configuration: {0}")]
    Config(String),
}
