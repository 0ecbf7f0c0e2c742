use thiserror::Error;

use crate::geometry::Vec3f;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot normalize a zero-length direction")]
    DegenerateDirection,
    #[error("invalid ellipsoid radii {radii:?}: every semi-axis must be finite and non-zero")]
    InvalidEllipsoid { radii: Vec3f },
    #[error("invalid box size {size:?}: every extent must be finite and positive")]
    InvalidCuboid { size: Vec3f },
    #[error("invalid render config: {0}")]
    InvalidConfig(String),
    #[error("invalid camera: {0}")]
    InvalidCamera(String),
    #[error("scene description, line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("render cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
