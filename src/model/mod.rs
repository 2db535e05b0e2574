use thiserror::Error;

pub mod actor;
pub mod behaviors;
pub mod config;
pub mod constants;
pub mod delta;
pub mod environment;
pub mod events;
pub mod factory;
pub mod garden;
pub mod grid;
pub mod persistence;
pub mod population;
pub mod quadtree;
pub mod summary;

/// Structured errors of the simulation core. Recoverable conditions are
/// handled and logged locally; these surface only for startup and load
/// failures.
#[derive(Error, Debug)]
pub enum GardenError {
    #[error("invalid save payload: {0}")]
    InvalidSave(String),

    #[error("save version {0} is newer than this build supports")]
    UnsupportedVersion(u32),

    #[error("invalid delta: {0}")]
    InvalidDelta(String),

    #[error("flower factory did not come up in time")]
    FactoryInitTimeout,

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file system error: {0}")]
    FileSystem(#[from] std::io::Error),
}
