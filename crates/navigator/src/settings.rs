//! Layered configuration: defaults, optional TOML file, then
//! `NAVIGATOR__SECTION__KEY` environment overrides

use std::path::Path;
use std::time::Duration;

use ::config::{Config, Environment, File};
use alerting::AnnouncementConfig;
use object_detection::ObjectDetectionConfig;
use scene_heuristics::{GenericObstacleConfig, LevelDetectionConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::NavigatorError;

/// Detection loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Target detection cycles per second
    pub analysis_fps: u32,

    /// Speak and vibrate
    pub audio_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis_fps: 15,
            audio_enabled: true,
        }
    }
}

impl PipelineConfig {
    /// Minimum time between two executed cycles
    pub fn min_cycle_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.analysis_fps.max(1) as u64)
    }
}

/// Full navigator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub pipeline: PipelineConfig,
    pub object_detection: ObjectDetectionConfig,
    pub level_detection: LevelDetectionConfig,
    pub generic_obstacles: GenericObstacleConfig,
    pub announcements: AnnouncementConfig,
}

impl NavigatorConfig {
    /// Load and validate
    pub fn load(path: Option<&Path>) -> Result<Self, NavigatorError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix("NAVIGATOR").separator("__").try_parsing(true))
            .build()?;

        let config: NavigatorConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NavigatorError> {
        if self.pipeline.analysis_fps == 0 {
            return Err(NavigatorError::Config("analysis_fps must be positive".into()));
        }
        self.object_detection.validate()?;
        self.level_detection.validate()?;
        self.generic_obstacles.validate()?;
        self.announcements.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::CriticalRepeatPolicy;

    #[test]
    fn test_defaults_are_valid() {
        let config = NavigatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.min_cycle_interval(), Duration::from_millis(66));
        assert!(config.level_detection.enabled);
        assert!(!config.generic_obstacles.enabled);
    }

    #[test]
    fn test_load_partial_file() {
        let path = std::env::temp_dir().join(format!("navigator-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[pipeline]
analysis_fps = 10

[level_detection]
sensitivity = 0.9

[announcements]
critical_repeat = "on_new_critical"
"#,
        )
        .unwrap();

        let config = NavigatorConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.pipeline.analysis_fps, 10);
        assert!(config.pipeline.audio_enabled);
        assert!((config.level_detection.sensitivity - 0.9).abs() < 1e-6);
        assert_eq!(config.level_detection.stripe_height, 10);
        assert_eq!(config.announcements.critical_repeat, CriticalRepeatPolicy::OnNewCritical);
        assert_eq!(config.object_detection.min_confidence, 0.45);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = NavigatorConfig::default();
        config.pipeline.analysis_fps = 0;
        assert!(matches!(config.validate(), Err(NavigatorError::Config(_))));

        let mut config = NavigatorConfig::default();
        config.level_detection.sensitivity = 2.0;
        assert!(matches!(config.validate(), Err(NavigatorError::Heuristics(_))));

        let mut config = NavigatorConfig::default();
        config.object_detection.roi.x_start = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = NavigatorConfig::load(Some(Path::new("/nonexistent/navigator.toml")));
        assert!(matches!(result, Err(NavigatorError::Config(_))));
    }
}
