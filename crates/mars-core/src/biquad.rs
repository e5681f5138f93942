//! Biquad (bi-quadratic) filter section and coefficient design.
//!
//! Coefficients follow the RBJ Audio EQ Cookbook low-pass / high-pass
//! formulas at Butterworth Q, normalised by `a0`.
//!
//! Two designers are provided:
//!
//! - [`FilterCoefficients::design`] rejects cutoffs outside `(0, nyquist)`
//!   with a [`CoefficientError`]; use it on setup paths.
//! - [`FilterCoefficients::design_clamped`] pins the cutoff into
//!   `[MIN_CUTOFF_HZ, 0.49 * sample_rate]` and never fails; the audio path
//!   uses this one so a stale or out-of-range control can never produce an
//!   unstable section.

use crate::CoefficientError;
use core::f32::consts::{FRAC_1_SQRT_2, PI};
use libm::{cosf, sinf};

/// Q factor of a second-order Butterworth response.
pub const BUTTERWORTH_Q: f32 = FRAC_1_SQRT_2;

/// Lowest cutoff the clamping designer will produce.
pub const MIN_CUTOFF_HZ: f32 = 10.0;

/// Highest cutoff the clamping designer will produce, as a fraction of the
/// sample rate (just below Nyquist).
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Response shape of a second-order section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Passes content below the cutoff.
    LowPass,
    /// Passes content above the cutoff.
    HighPass,
}

/// Normalised coefficients of one second-order IIR section.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    /// Feedforward coefficient for x[n].
    pub b0: f32,
    /// Feedforward coefficient for x[n-1].
    pub b1: f32,
    /// Feedforward coefficient for x[n-2].
    pub b2: f32,
    /// Feedback coefficient for y[n-1].
    pub a1: f32,
    /// Feedback coefficient for y[n-2].
    pub a2: f32,
}

impl FilterCoefficients {
    /// Coefficients that pass the input through unchanged.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a Butterworth section, rejecting invalid configurations.
    ///
    /// # Errors
    ///
    /// - [`CoefficientError::InvalidSampleRate`] if `sample_rate` is not a
    ///   positive finite number.
    /// - [`CoefficientError::CutoffOutOfRange`] if `cutoff_hz <= 0` or
    ///   `cutoff_hz >= sample_rate / 2`.
    pub fn design(
        kind: FilterKind,
        cutoff_hz: f32,
        sample_rate: f32,
    ) -> Result<Self, CoefficientError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            #[cfg(feature = "tracing")]
            tracing::debug!(sample_rate, "coefficient design rejected sample rate");
            return Err(CoefficientError::InvalidSampleRate(sample_rate));
        }
        let nyquist_hz = sample_rate * 0.5;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist_hz) {
            #[cfg(feature = "tracing")]
            tracing::debug!(cutoff_hz, nyquist_hz, "coefficient design rejected cutoff");
            return Err(CoefficientError::CutoffOutOfRange {
                cutoff_hz,
                nyquist_hz,
            });
        }
        Ok(Self::rbj(kind, cutoff_hz, sample_rate))
    }

    /// Low-pass shorthand for [`design`](Self::design).
    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Result<Self, CoefficientError> {
        Self::design(FilterKind::LowPass, cutoff_hz, sample_rate)
    }

    /// High-pass shorthand for [`design`](Self::design).
    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Result<Self, CoefficientError> {
        Self::design(FilterKind::HighPass, cutoff_hz, sample_rate)
    }

    /// Design a Butterworth section, clamping the cutoff into a stable range.
    ///
    /// Never fails. An invalid sample rate yields [`PASSTHROUGH`](Self::PASSTHROUGH).
    pub fn design_clamped(kind: FilterKind, cutoff_hz: f32, sample_rate: f32) -> Self {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Self::PASSTHROUGH;
        }
        Self::rbj(kind, clamp_cutoff(cutoff_hz, sample_rate), sample_rate)
    }

    fn rbj(kind: FilterKind, cutoff_hz: f32, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * cutoff_hz / sample_rate;
        let cos_omega = cosf(omega);
        let alpha = sinf(omega) / (2.0 * BUTTERWORTH_Q);

        let (b0, b1, b2) = match kind {
            FilterKind::LowPass => {
                let b1 = 1.0 - cos_omega;
                (b1 * 0.5, b1, b1 * 0.5)
            }
            FilterKind::HighPass => {
                let b1 = -(1.0 + cos_omega);
                (-b1 * 0.5, b1, -b1 * 0.5)
            }
        };
        let a0_inv = 1.0 / (1.0 + alpha);

        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: -2.0 * cos_omega * a0_inv,
            a2: (1.0 - alpha) * a0_inv,
        }
    }
}

impl Default for FilterCoefficients {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// Pin a cutoff into `[MIN_CUTOFF_HZ, 0.49 * sample_rate]`.
///
/// The upper bound always wins: at sample rates where `MIN_CUTOFF_HZ` would
/// reach Nyquist, the lower bound drops to half the upper one. NaN maps to
/// the lower bound. A non-positive sample rate returns `MIN_CUTOFF_HZ`.
#[inline]
pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let max = sample_rate * MAX_CUTOFF_RATIO;
    if max.is_nan() || max <= 0.0 {
        return MIN_CUTOFF_HZ;
    }
    let min = MIN_CUTOFF_HZ.min(max * 0.5);
    if cutoff_hz.is_nan() {
        min
    } else {
        cutoff_hz.clamp(min, max)
    }
}

/// Second-order IIR section, Direct Form I.
///
/// Coefficients and state are separate: swapping coefficients every block
/// keeps the history, so the output stays continuous.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: FilterCoefficients,

    /// Input history: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output history: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the coefficients, keeping the filter history.
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: FilterCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> FilterCoefficients {
        self.coeffs
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::flush_denormal(output);

        output
    }

    /// Clears the filter history without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
