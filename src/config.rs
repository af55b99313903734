use std::path::Path;
use std::time::Duration;

use bevy::prelude::Resource;
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::engine::models::{Coordinate, Metrics};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "MISSION_PLANNER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "mission_planner.toml";

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub map: MapConfig,
    pub tiles: TileConfig,
    pub mission: MissionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial view center
    pub center: Coordinate,
    /// Initial slippy-map zoom level
    pub zoom: u8,
    /// Screen padding (px) kept around the route when fitting the view
    pub fit_padding: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            // Boston harbour
            center: Coordinate::new(42.36, -71.06),
            zoom: 13,
            fit_padding: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Template with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub cache_dir: String,
    pub max_concurrent_downloads: usize,
    pub user_agent: String,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            cache_dir: "data/tiles".to_string(),
            max_concurrent_downloads: 30,
            user_agent: "MissionPlanner/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub tick_interval_secs: f64,
    pub initial_metrics: Metrics,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1.0,
            initial_metrics: Metrics::default(),
        }
    }
}

impl MissionConfig {
    /// Falls back to one second when the value does not fit a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.tick_interval_secs).unwrap_or(Duration::from_secs(1))
    }
}

impl PlannerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: PlannerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        info!("Loading planner config from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads the config named by `MISSION_PLANNER_CONFIG` or `mission_planner.toml`.
    /// A missing file yields defaults; an unreadable or invalid one is logged and ignored.
    pub fn load_or_default() -> Self {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if !Path::new(&path).exists() {
            info!("No config at {}, using defaults", path);
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config {}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !self.map.center.is_valid() {
            return Err(format!("map.center out of range: {:?}", self.map.center));
        }
        if self.map.zoom > 19 {
            return Err(format!("map.zoom must be at most 19, got {}", self.map.zoom));
        }
        let interval = self.mission.tick_interval_secs;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(format!("mission.tick_interval_secs must be positive, got {}", interval));
        }
        if Duration::try_from_secs_f64(interval).is_err() {
            return Err(format!("mission.tick_interval_secs is too large: {}", interval));
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tiles.url_template.contains(placeholder) {
                return Err(format!("tiles.url_template is missing {}", placeholder));
            }
        }
        Ok(())
    }
}
