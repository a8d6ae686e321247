use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrbitError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    /// Non-positive or non-finite mass, distance or viewport size.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No drawing surface this tick. The driver retries on the next one.
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,
}

impl OrbitError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        OrbitError::InvalidInput(msg.into())
    }
}
