//! Announcement configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AlertError;

/// Whether a critical top detection may repeat an already announced situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalRepeatPolicy {
    /// Repeat every critical interval while it stays on top
    #[default]
    Always,
    /// Repeat only when the previous announcement was not critical
    OnNewCritical,
    /// Identical situations are never repeated
    Never,
}

/// Announcement throttling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncementConfig {
    /// Minimum gap between announcements (ms)
    pub normal_interval_ms: u64,

    /// Minimum gap while a critical detection is in view (ms)
    pub critical_interval_ms: u64,

    pub critical_repeat: CriticalRepeatPolicy,
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        Self {
            normal_interval_ms: 2000,
            critical_interval_ms: 1200,
            critical_repeat: CriticalRepeatPolicy::Always,
        }
    }
}

impl AnnouncementConfig {
    pub fn validate(&self) -> Result<(), AlertError> {
        if self.critical_interval_ms > self.normal_interval_ms {
            return Err(AlertError::Config(format!(
                "critical interval {} ms exceeds normal interval {} ms",
                self.critical_interval_ms, self.normal_interval_ms
            )));
        }
        Ok(())
    }

    pub fn normal_interval(&self) -> Duration {
        Duration::from_millis(self.normal_interval_ms)
    }

    pub fn critical_interval(&self) -> Duration {
        Duration::from_millis(self.critical_interval_ms)
    }
}
