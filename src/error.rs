/// Errors surfaced by the engines.
///
/// Only two tiers fail a call: a violated caller contract and an internal
/// failure. Degenerate-but-valid input is reported through
/// [`Condition`](crate::models::Condition) on the result instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FpError {
    /// Width or height is zero, or their product overflows.
    #[error("Invalid image size ({0}x{1})")]
    InvalidImageSize(usize, usize),

    /// Pixel buffer length does not match width × height.
    #[error("Pixel buffer length ({0}) does not match the image size ({1})")]
    BufferSizeMismatch(usize, usize),

    /// Resolution outside the supported range.
    #[error("Invalid resolution: {0} ppi")]
    InvalidResolution(u32),

    /// A minutia record handed to the matcher is malformed.
    #[error("Invalid minutia record at index {index}: {reason}")]
    InvalidMinutia {
        /// Position of the offending record in its input list.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal invariant violated; no result is produced.
    #[error("System failure: {0}")]
    SystemFailure(String),
}

impl FpError {
    /// True when the caller supplied input that breaks the call contract.
    pub fn is_invalid_input(&self) -> bool {
        !self.is_system_failure()
    }

    /// True for unrecoverable internal failures.
    pub fn is_system_failure(&self) -> bool {
        matches!(self, FpError::SystemFailure(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FpError>;
