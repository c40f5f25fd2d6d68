//! Error types
//!
//! Failures are confined to the edges of the game: loading assets and
//! configuration, and talking to the terminal or the audio device. The
//! simulation itself has no error path.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    /// A required sprite is missing from the asset directory
    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// A sprite exists but could not be read
    #[error("Failed to read asset '{}': {source}", .path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sprite file contains no visible rows
    #[error("Sprite '{}' is empty", .0.display())]
    EmptySprite(PathBuf),

    /// Settings file could not be read
    #[error("Failed to read settings '{}': {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for [`crate::Settings`]
    #[error("Invalid settings '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing a frame to the output failed
    #[error("Render error: {0}")]
    Render(#[from] std::io::Error),

    /// The audio output could not be opened
    #[error("Audio device error: {0}")]
    Audio(String),
}

impl GameError {
    /// Wraps an I/O failure on an asset, mapping "not found" to its own variant
    pub fn asset(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            GameError::AssetNotFound(path)
        } else {
            GameError::AssetRead { path, source }
        }
    }
}
