//! Circular-buffer delay line with fractional reads.
//!
//! The buffer is sized once (from `prepare`) and never reallocates; reads
//! and writes are allocation-free.
//!
//! | User | Delay Range | Modulation |
//! |------|-------------|------------|
//! | Modulated-delay stage | 0-14 ms | Yes (LFO) |
//! | Diffuser combs | 25-37 ms | No |
//! | Diffuser allpasses | 5-13 ms | No |

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Circular delay line with linear interpolation between taps.
///
/// # Example
///
/// ```rust
/// use mars_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(64);
/// delay.write(1.0);
/// delay.write(0.0);
///
/// // Delay 1 reads the sample written before the last one.
/// assert_eq!(delay.read(1.0), 1.0);
/// assert_eq!(delay.read(0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a new delay line with the given capacity in samples.
    ///
    /// # Panics
    ///
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize) -> Self {
        assert!(max_delay_samples > 0, "Delay size must be > 0");

        Self {
            buffer: vec![0.0; max_delay_samples],
            write_pos: 0,
        }
    }

    /// Reads a delayed sample.
    ///
    /// Delay 0 is the most recently written sample. Delays beyond the
    /// capacity are clamped to the oldest sample.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay_clamped = delay_samples.clamp(0.0, (len - 1) as f32);

        let delay_int = delay_clamped as usize;
        let frac = delay_clamped - delay_int as f32;

        let read_pos = (self.write_pos + len - delay_int - 1) % len;
        let next_pos = (read_pos + len - 1) % len;

        let a = self.buffer[read_pos];
        let b = self.buffer[next_pos];
        a + (b - a) * frac
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zeroes the buffer and rewinds the write cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Returns the capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_delay_reads() {
        let mut delay = InterpolatedDelay::new(10);
        for i in 1..=5 {
            delay.write(i as f32);
        }

        assert_eq!(delay.read(0.0), 5.0);
        assert_eq!(delay.read(3.0), 2.0);
    }

    #[test]
    fn test_fractional_read_interpolates() {
        let mut delay = InterpolatedDelay::new(10);
        delay.write(0.0);
        delay.write(1.0);

        // Halfway between 1.0 (delay 0) and 0.0 (delay 1)
        assert!((delay.read(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_overlong_delay_is_clamped() {
        let mut delay = InterpolatedDelay::new(4);
        for i in 0..4 {
            delay.write(i as f32);
        }
        assert_eq!(delay.read(100.0), 0.0);
        assert!(delay.read(100.0).is_finite());
    }

    #[test]
    fn test_clear() {
        let mut delay = InterpolatedDelay::new(8);
        for _ in 0..8 {
            delay.write(1.0);
        }
        delay.clear();
        for d in 0..8 {
            assert_eq!(delay.read(d as f32), 0.0);
        }
    }
}
