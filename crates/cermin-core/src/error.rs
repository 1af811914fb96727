//! Accessor error type

/// Errors produced by registered field accessors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AccessError {
    /// Value kind mismatch during conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type or kind name
        expected: String,
        /// Actual type or kind name
        got: String,
    },

    /// Field was registered without accessors (metadata-only)
    #[error("Field has no registered accessor")]
    NoAccessor,
}
