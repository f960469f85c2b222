use thiserror::Error;

use crate::registry::ObjectId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no placed object with id {0}")]
    NotFound(ObjectId),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("spatial tracking is not supported on this device")]
    Unsupported,
    #[error("failed to start AR session: {0}")]
    StartFailed(String),
    #[error("an AR session is already running")]
    AlreadyRunning,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load model {url}: {reason}")]
    Load { url: String, reason: String },
    #[error("mesh {name} is invalid: {reason}")]
    InvalidMesh { name: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("surface owned by object {0} has a non-finite transform")]
    NonFiniteTransform(ObjectId),
    #[error("ray has no direction")]
    DegenerateRay,
}
