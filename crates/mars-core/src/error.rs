//! Error types for coefficient design.

use thiserror::Error;

/// Errors reported by the strict filter coefficient designers.
///
/// The audio path never sees these: it designs through
/// [`FilterCoefficients::design_clamped`](crate::FilterCoefficients::design_clamped),
/// which pins the cutoff into a stable range instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoefficientError {
    /// Sample rate was zero, negative or not finite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Cutoff was not strictly between 0 Hz and Nyquist.
    #[error("cutoff {cutoff_hz} Hz outside (0, {nyquist_hz}) Hz")]
    CutoffOutOfRange {
        /// Requested cutoff frequency in Hz.
        cutoff_hz: f32,
        /// Nyquist frequency for the sample rate in use.
        nyquist_hz: f32,
    },
}
