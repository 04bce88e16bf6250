//! Error types for profile loading and validation.

/// Errors that can occur when building, loading, or validating a device profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// An I/O error occurred while reading a profile file.
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse profile: {0}")]
    Parse(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A block type column refers to a subtype that was never declared.
    #[error("block type '{block_type}' uses unknown column subtype '{subtype}'")]
    UnknownSubType {
        /// The block type whose layout holds the bad column.
        block_type: String,
        /// The undeclared subtype name.
        subtype: String,
    },

    /// No built-in part matches the requested name.
    #[error("unknown part '{0}'")]
    UnknownPart(String),

    /// A profile value failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}
