//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.

/// Convert milliseconds to samples at the given sample rate.
///
/// # Example
/// ```rust
/// use mars_core::ms_to_samples;
///
/// assert_eq!(ms_to_samples(10.0, 48000.0), 480.0);
/// ```
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush denormal (subnormal) floating-point values to zero.
///
/// Subnormal numbers cause severe CPU slowdowns on most architectures.
/// Values below 1e-20 are replaced with zero, leaving margin before the
/// IEEE 754 subnormal range begins.
///
/// Use this in feedback loops (comb filters, delay lines, allpass chains)
/// where signal can decay indefinitely toward zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals.
///
/// Computed as `dry * (1 - mix) + wet * mix` so that `mix == 0.0` returns
/// `dry` and `mix == 1.0` returns `wet` exactly.
///
/// # Arguments
///
/// * `dry` - Unprocessed signal
/// * `wet` - Processed signal
/// * `mix` - Blend factor in \[0.0, 1.0\]: 0.0 = all dry, 1.0 = all wet
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(1000.0, 44100.0), 44100.0);
        assert_eq!(ms_to_samples(0.0, 48000.0), 0.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
        assert_eq!(flush_denormal(-1e-10), -1e-10);
    }

    #[test]
    fn test_wet_dry_mix_endpoints_are_exact() {
        let dry = 0.123_456_7;
        let wet = -0.765_432_1;
        assert_eq!(wet_dry_mix(dry, wet, 0.0), dry);
        assert_eq!(wet_dry_mix(dry, wet, 1.0), wet);
        assert!((wet_dry_mix(1.0, 0.0, 0.25) - 0.75).abs() < 1e-6);
    }
}
