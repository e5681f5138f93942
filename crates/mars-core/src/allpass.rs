//! Allpass filter for reverb diffusion.
//!
//! A Freeverb-style Schroeder allpass: it smears an impulse in time without
//! coloring the long-term frequency response.

use crate::InterpolatedDelay;
use crate::flush_denormal;

/// Schroeder allpass filter for diffusion.
///
/// # Example
///
/// ```rust
/// use mars_core::AllpassFilter;
///
/// let mut allpass = AllpassFilter::new(556);
/// allpass.set_feedback(0.5);
///
/// let output = allpass.process(1.0);
/// assert_eq!(output, -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    delay: InterpolatedDelay,
    feedback: f32,
}

impl AllpassFilter {
    /// Create a new allpass filter with the given delay length in samples.
    pub fn new(delay_samples: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(delay_samples),
            feedback: 0.5,
        }
    }

    /// Set the feedback coefficient. Stable for |feedback| < 1.0.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Get the current feedback value.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Process a single sample.
    ///
    /// ```text
    /// output      = -input + delayed
    /// delay_input =  input + delayed * feedback
    /// ```
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delay_samples = (self.delay.capacity() - 1) as f32;
        let delayed = self.delay.read(delay_samples);

        let output = -input + delayed;

        self.delay
            .write(flush_denormal(input + delayed * self.feedback));

        output
    }

    /// Clear the delay line.
    pub fn clear(&mut self) {
        self.delay.clear();
    }

    /// Get the delay length in samples.
    pub fn capacity(&self) -> usize {
        self.delay.capacity()
    }
}
