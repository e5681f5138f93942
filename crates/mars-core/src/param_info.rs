//! Parameter metadata for host-facing controls.
//!
//! A [`ParamDescriptor`] carries everything a control surface needs to
//! present and quantise a value: range, step, skew and default. The audio
//! path only uses [`ParamDescriptor::clamp`]; the normalisation helpers
//! serve whatever adapter maps knob positions to values.
//!
//! # Skew
//!
//! The skew factor bends the mapping between a normalised position
//! `p ∈ [0, 1]` and the plain value, concentrating resolution at one end:
//!
//! ```text
//! p     = ((value - min) / (max - min)) ^ skew
//! value = min + (max - min) * p ^ (1 / skew)
//! ```
//!
//! `skew < 1` gives more knob travel to the low end of the range (the
//! 0.35 used by the cutoff controls puts 1 kHz near the middle of a
//! 20 Hz–20 kHz knob); `skew == 1` is linear.
//!
//! This module is `no_std` compatible and allocation-free.

use libm::{powf, roundf};

/// Unit type for display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamUnit {
    /// Dimensionless value, usually 0–1.
    #[default]
    None,
    /// Frequency in Hz.
    Hertz,
}

impl ParamUnit {
    /// Short suffix for display (`""` or `"Hz"`).
    pub fn suffix(self) -> &'static str {
        match self {
            ParamUnit::None => "",
            ParamUnit::Hertz => "Hz",
        }
    }
}

/// Describes a single control parameter.
///
/// # Example
///
/// ```rust
/// use mars_core::{ParamDescriptor, ParamUnit};
///
/// let cutoff = ParamDescriptor::new("cutoff", "Cutoff", 20.0, 20000.0, 1000.0)
///     .with_step(1.0)
///     .with_skew(0.35)
///     .with_unit(ParamUnit::Hertz);
///
/// assert_eq!(cutoff.clamp(50000.0), 20000.0);
/// assert_eq!(cutoff.snap(440.4), 440.0);
/// let mid = cutoff.denormalize(0.5);
/// assert!(mid > 1000.0 && mid < 3000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable string identifier used by hosts and the parameter store.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit type for formatting.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Quantisation interval (0 = continuous).
    pub step: f32,
    /// Skew exponent of the normalised mapping (1 = linear).
    pub skew: f32,
    /// Default value.
    pub default: f32,
}

impl ParamDescriptor {
    /// Create a continuous, linear, unitless descriptor.
    pub const fn new(
        id: &'static str,
        name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            id,
            name,
            unit: ParamUnit::None,
            min,
            max,
            step: 0.0,
            skew: 1.0,
            default,
        }
    }

    /// Set the quantisation step.
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Set the skew exponent.
    pub const fn with_skew(mut self, skew: f32) -> Self {
        self.skew = skew;
        self
    }

    /// Set the display unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Clamp a value into `[min, max]`. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Quantise to the nearest step (counted from `min`), then clamp.
    pub fn snap(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        if self.step > 0.0 {
            self.clamp(self.min + self.step * roundf((value - self.min) / self.step))
        } else {
            value
        }
    }

    /// Map a plain value to a normalised position in `[0, 1]`.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        let proportion = (self.clamp(value) - self.min) / span;
        if self.skew == 1.0 {
            proportion
        } else {
            powf(proportion, self.skew)
        }
    }

    /// Map a normalised position in `[0, 1]` to a plain value.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let p = normalized.clamp(0.0, 1.0);
        let p = if self.skew == 1.0 || p <= 0.0 {
            p
        } else {
            powf(p, 1.0 / self.skew)
        };
        self.clamp(self.min + (self.max - self.min) * p)
    }
}
