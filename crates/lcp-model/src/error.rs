use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid coordinate: {0}")]
    InvalidCoord(String),
}
