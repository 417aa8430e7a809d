use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backend::Bounds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            motion: MotionConfig::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Pointer backend: "auto", "enigo" or "virtual"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Addressable area of the virtual backend
    #[serde(default = "default_virtual_bounds")]
    pub virtual_bounds: Bounds,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            backend: default_backend(),
            virtual_bounds: default_virtual_bounds(),
        }
    }
}

/// Pointer motion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Travel speed in pixels per second
    #[serde(default = "default_speed_px_per_sec")]
    pub speed_px_per_sec: f64,
    /// Position updates per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed_px_per_sec: default_speed_px_per_sec(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> crate::Result<()> {
        validate_rate("motion.speed_px_per_sec", self.speed_px_per_sec)?;
        validate_frame_rate("motion.frame_rate", self.frame_rate)
    }
}

/// Wheel scrolling parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Wheel units (notches) delivered per second
    #[serde(default = "default_units_per_sec")]
    pub units_per_sec: f64,
    /// Tick opportunities per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            units_per_sec: default_units_per_sec(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl ScrollConfig {
    pub fn validate(&self) -> crate::Result<()> {
        validate_rate("scroll.units_per_sec", self.units_per_sec)?;
        validate_frame_rate("scroll.frame_rate", self.frame_rate)
    }
}

fn validate_rate(name: &str, value: f64) -> crate::Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(crate::Error::InvalidConfig(format!(
            "{} must be greater than zero (got {})",
            name, value
        )));
    }
    Ok(())
}

fn validate_frame_rate(name: &str, value: u32) -> crate::Result<()> {
    if value == 0 {
        return Err(crate::Error::InvalidConfig(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backend() -> String {
    "auto".to_string()
}

fn default_virtual_bounds() -> Bounds {
    Bounds::new(0, 0, 1919, 1079)
}

fn default_speed_px_per_sec() -> f64 {
    1000.0
}

fn default_frame_rate() -> u32 {
    120
}

fn default_units_per_sec() -> f64 {
    300.0
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.validate()?;
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/cursorglide/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("cursorglide")
            .join("config.toml")
    }

    /// Check every motion and scroll invariant
    pub fn validate(&self) -> crate::Result<()> {
        self.motion.validate()?;
        self.scroll.validate()?;
        if self.general.virtual_bounds.is_empty() {
            return Err(crate::Error::InvalidConfig(format!(
                "general.virtual_bounds is empty: {}",
                self.general.virtual_bounds
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let config = AppConfig::default();
        assert_eq!(config.motion.speed_px_per_sec, 1000.0);
        assert_eq!(config.motion.frame_rate, 120);
        assert_eq!(config.scroll.units_per_sec, 300.0);
        assert_eq!(config.scroll.frame_rate, 120);
        assert_eq!(config.general.backend, "auto");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [motion]
            speed_px_per_sec = 2500.0
            "#,
        )
        .unwrap();
        assert_eq!(config.motion.speed_px_per_sec, 2500.0);
        assert_eq!(config.motion.frame_rate, 120);
        assert_eq!(config.scroll.units_per_sec, 300.0);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let zero_speed = AppConfig::from_toml("[motion]\nspeed_px_per_sec = 0.0\n");
        assert!(matches!(zero_speed, Err(crate::Error::InvalidConfig(_))));

        let zero_fps = AppConfig::from_toml("[scroll]\nframe_rate = 0\n");
        assert!(matches!(zero_fps, Err(crate::Error::InvalidConfig(_))));

        let negative_scroll = ScrollConfig {
            units_per_sec: -3.0,
            frame_rate: 60,
        };
        assert!(negative_scroll.validate().is_err());

        let nan_speed = MotionConfig {
            speed_px_per_sec: f64::NAN,
            frame_rate: 60,
        };
        assert!(nan_speed.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result = AppConfig::from_toml("[motion\nspeed = ");
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_toml_output_parses_back() {
        let mut config = AppConfig::default();
        config.general.backend = "virtual".to_string();
        config.scroll.units_per_sec = 42.5;
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.general.backend, "virtual");
        assert_eq!(parsed.scroll, config.scroll);
        assert_eq!(parsed.general.virtual_bounds, config.general.virtual_bounds);
    }
}
