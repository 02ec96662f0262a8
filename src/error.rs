use thiserror::Error;

/// Errors raised while reading option documents
///
/// The encoding passes themselves never fail: missing or partial styling
/// degrades to "attribute absent" instead of raising.
#[derive(Debug, Error)]
pub enum VisualError {
    /// A color string could not be parsed as a hex color
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Option document is not valid JSON or has the wrong shape
    #[error("Option error: {0}")]
    Option(#[from] serde_json::Error),
}

/// Type alias for Results using VisualError
pub type Result<T> = std::result::Result<T, VisualError>;
