use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Default hard cap on simultaneously live render instances.
pub const DEFAULT_MAX_ACTIVE: u32 = 20;
/// Default pre-entry margin in pixels applied around the viewport.
pub const DEFAULT_MARGIN: f32 = 100.0;
/// Default minimum visible fraction before a surface counts as entered.
pub const DEFAULT_THRESHOLD: f32 = 0.1;
/// Longest accepted delay before a restored context is rebuilt.
pub const MAX_RESTORE_DELAY: Duration = Duration::from_secs(60);
/// Lowest accepted non-zero frame cap.
pub const MIN_FPS: f32 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub version: u32,
    #[serde(default)]
    pub pool: PoolSection,
    #[serde(default)]
    pub observer: ObserverSection,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub variants: VariantsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    #[serde(default = "default_max_active")]
    pub max_active: u32,
    #[serde(
        default = "default_restore_delay",
        deserialize_with = "deserialize_duration"
    )]
    pub restore_delay: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverSection {
    #[serde(default = "default_margin")]
    pub margin: f32,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderSection {
    #[serde(default = "default_card_width")]
    pub card_width: u32,
    #[serde(default = "default_card_height")]
    pub card_height: u32,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_power")]
    pub power: PowerSetting,
    #[serde(default = "default_background")]
    pub background: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantsSection {
    #[serde(default)]
    pub pack_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerSetting {
    #[default]
    Low,
    High,
}

fn default_max_active() -> u32 {
    DEFAULT_MAX_ACTIVE
}

fn default_restore_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_margin() -> f32 {
    DEFAULT_MARGIN
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_card_width() -> u32 {
    300
}

fn default_card_height() -> u32 {
    200
}

fn default_background() -> bool {
    true
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            max_active: default_max_active(),
            restore_delay: default_restore_delay(),
        }
    }
}

impl Default for ObserverSection {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            threshold: default_threshold(),
        }
    }
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            card_width: default_card_width(),
            card_height: default_card_height(),
            fps: None,
            power: PowerSetting::default(),
            background: default_background(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            version: 1,
            pool: PoolSection::default(),
            observer: ObserverSection::default(),
            render: RenderSection::default(),
            variants: VariantsSection::default(),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_power<'de, D>(deserializer: D) -> Result<PowerSetting, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_power(&raw).map_err(de::Error::custom)
}

/// Parses a GPU power preference (`low`, `high`, and a few aliases).
pub fn parse_power(raw: &str) -> Result<PowerSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "low" | "low-power" | "lowpower" | "battery" => Ok(PowerSetting::Low),
        "high" | "high-performance" | "performance" => Ok(PowerSetting::High),
        other => Err(format!(
            "invalid power setting '{other}'; expected low or high"
        )),
    }
}

impl PoolConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: PoolConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn card_size(&self) -> (u32, u32) {
        (self.render.card_width, self.render.card_height)
    }

    /// Frame cap with non-positive values treated as uncapped.
    pub fn target_fps(&self) -> Option<f32> {
        self.render
            .fps
            .and_then(|fps| if fps > 0.0 { Some(fps) } else { None })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.pool.max_active == 0 {
            return Err(ConfigError::Invalid(
                "pool.max_active must be greater than zero".into(),
            ));
        }

        if self.pool.restore_delay > MAX_RESTORE_DELAY {
            return Err(ConfigError::Invalid(format!(
                "pool.restore_delay must be at most {}s (got {:?})",
                MAX_RESTORE_DELAY.as_secs(),
                self.pool.restore_delay
            )));
        }

        let margin = self.observer.margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "observer.margin must be a non-negative number of pixels (got {margin})"
            )));
        }

        let threshold = self.observer.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "observer.threshold must be within (0, 1] (got {threshold})"
            )));
        }

        if self.render.card_width == 0 || self.render.card_height == 0 {
            return Err(ConfigError::Invalid(
                "render.card_width and render.card_height must be greater than zero".into(),
            ));
        }

        if let Some(fps) = self.render.fps {
            if fps < 0.0 || !fps.is_finite() {
                return Err(ConfigError::Invalid("render.fps must be >= 0".into()));
            }
            if fps > 0.0 && fps < MIN_FPS {
                return Err(ConfigError::Invalid(format!(
                    "render.fps must be 0 (uncapped) or at least {MIN_FPS} (got {fps})"
                )));
            }
        }

        if let Some(dir) = &self.variants.pack_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "variants.pack_dir may not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}
