//! Error types for processor configuration.

use thiserror::Error;

/// Errors reported by [`DualChannelProcessor::prepare`](crate::DualChannelProcessor::prepare).
///
/// These are the only failures the processor can report. Everything on the
/// audio path is sanitised instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Sample rate is zero, negative or not finite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Maximum block size is zero.
    #[error("maximum block size must be greater than zero")]
    ZeroBlockSize,

    /// Channel layout the processor cannot run.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(usize),
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ConfigError::InvalidSampleRate(-1.0).to_string(),
            "invalid sample rate: -1 Hz"
        );
        assert_eq!(
            ConfigError::ZeroBlockSize.to_string(),
            "maximum block size must be greater than zero"
        );
        assert_eq!(
            ConfigError::UnsupportedChannelCount(0).to_string(),
            "unsupported channel count: 0"
        );
    }
}
