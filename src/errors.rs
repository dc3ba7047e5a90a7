use bevy::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathfindingError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Failed to access config file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    // Scene-related errors
    #[error("Entity {entity} has no {behavior} with a scene object")]
    MissingBehavior {
        entity: Entity,
        behavior: &'static str,
    },

    #[error("Obstacle registry missing from the scene")]
    RegistryMissing,
}

/// Result type alias for fallible operations
pub type PathfindingResult<T> = Result<T, PathfindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pathfinding_error_display() {
        let err = PathfindingError::MissingBehavior {
            entity: Entity::from_raw(42),
            behavior: "PathfindingBehavior",
        };
        assert!(err.to_string().contains("no PathfindingBehavior with a scene object"));

        let err = PathfindingError::ConfigDirNotFound;
        assert_eq!(err.to_string(), "Failed to get config directory");

        let err = PathfindingError::InvalidConfiguration {
            reason: "cell_width: range".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid configuration: cell_width: range");
    }
}
