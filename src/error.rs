use thiserror::Error;

/// Errors raised by `SkipListMap`. Absent keys are never errors; they are
/// reported as `Ok(None)` or `Ok(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The key is the null-equivalent value of its type.
    #[error("invalid key: null-equivalent keys cannot be stored or looked up")]
    InvalidKey,

    /// The level promotion probability is outside of (0, 1].
    #[error("invalid iteration probability {0}: must be in (0, 1]")]
    InvalidProbability(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
