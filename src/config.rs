use crate::errors::{PathfindingError, PathfindingResult};
use crate::pathfinding::grid::Viewpoint;
use crate::pathfinding::grid_cost::CollisionMethod;
use bevy::prelude::*;
use range_types::{CellSize, ObstacleCost};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

pub mod range_types;

/// Initial configuration of a pathfinding behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PathfindingBehaviorData {
    pub allow_diagonals: bool,
    #[validate(range(min = 0.0))]
    pub acceleration: f32,
    #[validate(range(min = 0.0))]
    pub max_speed: f32,
    #[validate(range(min = 0.0))]
    pub angular_max_speed: f32,
    pub rotate_object: bool,
    pub angle_offset: f32,
    pub cell_width: CellSize,
    pub cell_height: CellSize,
    #[validate(range(min = 0.0))]
    pub extra_border: f32,
    pub grid_offset_x: f32,
    pub grid_offset_y: f32,
    pub viewpoint: Viewpoint,
    pub collision_method: CollisionMethod,
}

impl Default for PathfindingBehaviorData {
    fn default() -> Self {
        Self {
            allow_diagonals: true,
            acceleration: 400.0,
            max_speed: 200.0,
            angular_max_speed: 180.0,
            rotate_object: true,
            angle_offset: 0.0,
            cell_width: CellSize::default(),
            cell_height: CellSize::default(),
            extra_border: 0.0,
            grid_offset_x: 0.0,
            grid_offset_y: 0.0,
            viewpoint: Viewpoint::TopDown,
            collision_method: CollisionMethod::Legacy,
        }
    }
}

/// Initial configuration of an obstacle behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObstacleData {
    pub impassable: bool,
    #[validate(range(min = 0.0))]
    pub cost: f32,
}

impl Default for ObstacleData {
    fn default() -> Self {
        Self {
            impassable: true,
            cost: ObstacleCost::default().get(),
        }
    }
}

/// Defaults applied to newly created behaviors, persisted as TOML
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct PathfindingSettings {
    pub pathfinding: PathfindingBehaviorData,
    pub obstacle: ObstacleData,
}

impl PathfindingSettings {
    /// Check every range rule, reporting the first failing section
    pub fn validate(&self) -> PathfindingResult<()> {
        self.pathfinding
            .validate()
            .map_err(|errors| PathfindingError::InvalidConfiguration {
                reason: format!("pathfinding: {errors}"),
            })?;
        self.obstacle
            .validate()
            .map_err(|errors| PathfindingError::InvalidConfiguration {
                reason: format!("obstacle: {errors}"),
            })?;
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> PathfindingResult<Self> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_file(path: &Path) -> PathfindingResult<Self> {
        if !path.exists() {
            return Err(PathfindingError::ConfigFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file(&self, path: &Path) -> PathfindingResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("wayfinder");
        fs::create_dir_all(&path).ok()?;
        path.push("pathfinding.toml");
        Some(path)
    })
}

/// Load the user's settings, falling back to defaults when missing or invalid
pub fn load_settings() -> PathfindingSettings {
    let Some(config_path) = get_config_path() else {
        return PathfindingSettings::default();
    };

    match PathfindingSettings::load_from_file(&config_path) {
        Ok(settings) => {
            info!("Loaded pathfinding settings from {}", config_path.display());
            settings
        }
        Err(PathfindingError::ConfigFileNotFound { .. }) => PathfindingSettings::default(),
        Err(err) => {
            warn!("Ignoring pathfinding settings: {err}");
            PathfindingSettings::default()
        }
    }
}

pub fn save_settings(settings: &PathfindingSettings) -> PathfindingResult<()> {
    let config_path = get_config_path().ok_or(PathfindingError::ConfigDirNotFound)?;
    settings.save_to_file(&config_path)
}
