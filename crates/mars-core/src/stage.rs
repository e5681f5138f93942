//! The [`Stage`] capability trait.
//!
//! Every element of a processing chain implements the same three
//! operations: `prepare`, `set_parameters` and `process`.
//!
//! ## Design Decisions
//!
//! - **Mono**: a stage owns the state for exactly one channel. Stereo is two
//!   independent instances, so per-channel coefficient offsets cannot leak
//!   across channels.
//! - **Allocation only in `prepare`**: `set_parameters`, `process_sample`,
//!   `process` and `reset` must not allocate, lock or block.
//! - **Typed parameters**: each stage declares its own parameter struct via
//!   an associated type.

/// Core trait for all chain stages.
///
/// # Example
///
/// ```rust
/// use mars_core::Stage;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Stage for Gain {
///     type Params = f32;
///
///     fn prepare(&mut self, _sample_rate: f32, _max_block_size: usize) {}
///
///     fn set_parameters(&mut self, params: &f32) {
///         self.gain = *params;
///     }
///
///     fn process_sample(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain { gain: 1.0 };
/// gain.set_parameters(&0.5);
/// let mut block = [1.0, 2.0];
/// gain.process(&mut block);
/// assert_eq!(block, [0.5, 1.0]);
/// ```
pub trait Stage {
    /// Runtime parameters accepted by [`set_parameters`](Self::set_parameters).
    type Params;

    /// Allocate and reset internal state for a stream configuration.
    ///
    /// Must be called before the first `process`, and again whenever the
    /// sample rate or maximum block size changes. Leaves the stage
    /// quiescent: zeroed delay lines, zero modulation phase, zero filter
    /// history.
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize);

    /// Update runtime parameters. Called once per block.
    fn set_parameters(&mut self, params: &Self::Params);

    /// Process a single sample.
    fn process_sample(&mut self, input: f32) -> f32;

    /// Process a block of samples in place.
    ///
    /// Default implementation calls [`process_sample`](Self::process_sample)
    /// for each sample.
    fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Clear internal state without reallocating or changing parameters.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One-sample delay: exercises state across block boundaries.
    struct UnitDelay {
        z1: f32,
        scale: f32,
    }

    impl Stage for UnitDelay {
        type Params = f32;
        fn prepare(&mut self, _: f32, _: usize) {
            self.z1 = 0.0;
        }
        fn set_parameters(&mut self, params: &f32) {
            self.scale = *params;
        }
        fn process_sample(&mut self, input: f32) -> f32 {
            let out = self.z1;
            self.z1 = input * self.scale;
            out
        }
        fn reset(&mut self) {
            self.z1 = 0.0;
        }
    }

    #[test]
    fn test_default_block_processing_is_in_place() {
        let mut stage = UnitDelay { z1: 0.0, scale: 1.0 };
        stage.prepare(48000.0, 4);

        let mut a = [1.0, 2.0, 3.0];
        stage.process(&mut a);
        assert_eq!(a, [0.0, 1.0, 2.0]);

        let mut b = [4.0];
        stage.process(&mut b);
        assert_eq!(b, [3.0]);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut stage = UnitDelay { z1: 0.0, scale: 2.0 };
        stage.process_sample(1.0);
        stage.reset();
        assert_eq!(stage.process_sample(0.0), 0.0);
    }
}
