//! Announcement scheduler

use detection_core::{Detection, Priority};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::{AnnouncementConfig, CriticalRepeatPolicy};
use crate::message::announcement_message;
use crate::vibration::vibration_pattern;

/// A decision to speak and vibrate for the top detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    /// Situation identity, `type:label:rounded distance`
    pub key: String,
    pub message: String,
    pub vibration: Vec<u64>,
    pub priority: Priority,
    /// Cut off any utterance in progress
    pub interrupt: bool,
}

/// Identity of a situation for repeat suppression
pub fn announcement_key(detection: &Detection) -> String {
    format!(
        "{}:{}:{}",
        detection.kind.as_str(),
        detection.label,
        detection.distance.round() as i64
    )
}

/// Session-scoped throttling state
#[derive(Debug)]
pub struct AnnouncementScheduler {
    config: AnnouncementConfig,
    last_key: Option<String>,
    last_at: Option<Instant>,
    last_was_critical: bool,
}

impl AnnouncementScheduler {
    pub fn new(config: AnnouncementConfig) -> Self {
        Self {
            config,
            last_key: None,
            last_at: None,
            last_was_critical: false,
        }
    }

    pub fn config(&self) -> &AnnouncementConfig {
        &self.config
    }

    /// Forget everything; the next eligible detection is announced at once
    pub fn reset(&mut self) {
        self.last_key = None;
        self.last_at = None;
        self.last_was_critical = false;
    }

    /// Decide whether this cycle's fused list warrants an announcement.
    ///
    /// `detections` must already be ranked; only the first entry is spoken.
    pub fn evaluate(&mut self, detections: &[Detection], audio_enabled: bool, now: Instant) -> Option<Announcement> {
        if !audio_enabled {
            return None;
        }
        let top = detections.first()?;

        let has_critical = detections.iter().any(Detection::is_critical);
        let interval = if has_critical {
            self.config.critical_interval()
        } else {
            self.config.normal_interval()
        };

        if let Some(last_at) = self.last_at {
            if now.saturating_duration_since(last_at) < interval {
                return None;
            }
        }

        let key = announcement_key(top);
        if self.last_key.as_deref() == Some(key.as_str()) && !self.may_repeat(top) {
            debug!("Suppressing repeat of {}", key);
            return None;
        }

        let announcement = Announcement {
            message: announcement_message(top),
            vibration: vibration_pattern(top).to_vec(),
            priority: top.priority,
            interrupt: top.is_critical(),
            key: key.clone(),
        };

        info!("Announcing [{}]: {}", top.priority.as_str(), announcement.message);
        self.last_key = Some(key);
        self.last_at = Some(now);
        self.last_was_critical = top.is_critical();

        Some(announcement)
    }

    fn may_repeat(&self, top: &Detection) -> bool {
        if !top.is_critical() {
            return false;
        }
        match self.config.critical_repeat {
            CriticalRepeatPolicy::Always => true,
            CriticalRepeatPolicy::OnNewCritical => !self.last_was_critical,
            CriticalRepeatPolicy::Never => false,
        }
    }
}

impl Default for AnnouncementScheduler {
    fn default() -> Self {
        Self::new(AnnouncementConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detection_core::{DetectionType, Position};
    use std::time::Duration;

    fn det(label: &str, priority: Priority, distance: f32) -> Detection {
        Detection {
            kind: DetectionType::KnownObject,
            label: label.to_string(),
            distance,
            position: Position::Center,
            position_x: 0.5,
            priority,
            confidence: 0.9,
            bounding_box: None,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_key_rounds_distance() {
        assert_eq!(announcement_key(&det("Silla", Priority::Medium, 2.4)), "known_object:Silla:2");
        assert_eq!(announcement_key(&det("Silla", Priority::Medium, 2.6)), "known_object:Silla:3");
    }

    #[test]
    fn test_muted_or_empty_does_nothing() {
        let mut scheduler = AnnouncementScheduler::default();
        let t0 = Instant::now();
        assert!(scheduler.evaluate(&[], true, t0).is_none());
        assert!(scheduler.evaluate(&[det("Silla", Priority::Medium, 2.0)], false, t0).is_none());
        // Nothing was recorded, so the next call announces
        assert!(scheduler.evaluate(&[det("Silla", Priority::Medium, 2.0)], true, t0).is_some());
    }

    #[test]
    fn test_same_key_within_normal_interval_suppressed() {
        let mut scheduler = AnnouncementScheduler::default();
        let t0 = Instant::now();
        let list = [det("Silla", Priority::Medium, 2.0)];

        assert!(scheduler.evaluate(&list, true, t0).is_some());
        assert!(scheduler.evaluate(&list, true, t0 + ms(500)).is_none());
    }

    #[test]
    fn test_same_key_suppressed_even_after_interval() {
        let mut scheduler = AnnouncementScheduler::default();
        let t0 = Instant::now();
        let list = [det("Silla", Priority::Medium, 2.0)];

        assert!(scheduler.evaluate(&list, true, t0).is_some());
        assert!(scheduler.evaluate(&list, true, t0 + ms(5000)).is_none());
        // A material change is announced
        let moved = [det("Silla", Priority::High, 1.2)];
        assert!(scheduler.evaluate(&moved, true, t0 + ms(5000)).is_some());
    }

    #[test]
    fn test_critical_bypasses_normal_interval() {
        let mut scheduler = AnnouncementScheduler::default();
        let t0 = Instant::now();

        assert!(scheduler.evaluate(&[det("Silla", Priority::Medium, 2.0)], true, t0).is_some());

        let critical = [det("Persona", Priority::Critical, 0.8)];
        // Inside the critical interval: still throttled
        assert!(scheduler.evaluate(&critical, true, t0 + ms(1000)).is_none());
        // Past 1200 ms but under 2000 ms
        let announcement = scheduler.evaluate(&critical, true, t0 + ms(1500)).unwrap();
        assert_eq!(announcement.priority, Priority::Critical);
        assert!(announcement.interrupt);
        assert_eq!(announcement.message, "Persona al frente, 0.8 metros");
        assert_eq!(announcement.vibration, vec![100, 50, 100, 50, 100]);
    }

    #[test]
    fn test_repeat_policies() {
        let critical = [det("Persona", Priority::Critical, 0.8)];
        let t0 = Instant::now();

        let mut always = AnnouncementScheduler::default();
        assert!(always.evaluate(&critical, true, t0).is_some());
        assert!(always.evaluate(&critical, true, t0 + ms(1300)).is_some());

        let mut never = AnnouncementScheduler::new(AnnouncementConfig {
            critical_repeat: CriticalRepeatPolicy::Never,
            ..Default::default()
        });
        assert!(never.evaluate(&critical, true, t0).is_some());
        assert!(never.evaluate(&critical, true, t0 + ms(1300)).is_none());

        let mut on_new = AnnouncementScheduler::new(AnnouncementConfig {
            critical_repeat: CriticalRepeatPolicy::OnNewCritical,
            ..Default::default()
        });
        assert!(on_new.evaluate(&critical, true, t0).is_some());
        // Previous announcement was already critical
        assert!(on_new.evaluate(&critical, true, t0 + ms(1300)).is_none());

        // Same key, first time it turns critical
        let mut escalating = AnnouncementScheduler::new(AnnouncementConfig {
            critical_repeat: CriticalRepeatPolicy::OnNewCritical,
            ..Default::default()
        });
        assert!(escalating.evaluate(&[det("Persona", Priority::High, 2.4)], true, t0).is_some());
        let closer = [det("Persona", Priority::Critical, 1.6)];
        assert!(escalating.evaluate(&closer, true, t0 + ms(1300)).is_some());
    }

    #[test]
    fn test_reset_clears_throttling() {
        let mut scheduler = AnnouncementScheduler::default();
        let t0 = Instant::now();
        let list = [det("Silla", Priority::Medium, 2.0)];

        assert!(scheduler.evaluate(&list, true, t0).is_some());
        scheduler.reset();
        assert!(scheduler.evaluate(&list, true, t0 + ms(10)).is_some());
    }
}
