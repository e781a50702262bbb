//! Error taxonomy for model setup operations.

/// Failure of a geometry, thermal or material operation.
///
/// Every entry point validates its inputs before touching the caller's
/// fields, so any of these errors means nothing was modified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetupError {
    /// Missing, conflicting or unrecognized parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input that would divide by zero or collapse a solid.
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    #[error("no material properties configured for phase {phase}")]
    MissingMaterial { phase: i32 },

    #[error("failed to parse description: {0}")]
    Parse(String),

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },
}

impl SetupError {
    pub fn config(msg: impl Into<String>) -> Self {
        SetupError::Configuration(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        SetupError::NumericDegeneracy(msg.into())
    }

    /// Maps a JSON decoding failure. Configuration errors raised while
    /// converting a field keep their kind, everything else is a parse error.
    pub fn from_json(err: serde_json::Error) -> Self {
        let msg = err.to_string();
        match msg.strip_prefix("configuration error: ") {
            Some(reason) => SetupError::Configuration(reason.to_string()),
            None => SetupError::Parse(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;
