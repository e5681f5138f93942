//! Low-pass and high-pass filter stages.

use mars_core::{Biquad, FilterCoefficients, FilterKind, Stage};

/// Parameters of a filter stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStageParameters {
    /// Cutoff frequency in Hz.
    pub cutoff_hz: f32,
}

/// One Butterworth biquad acting as the chain's low-pass or high-pass.
///
/// Coefficients are redesigned from the cutoff and the prepared sample rate
/// on every [`set_parameters`](Stage::set_parameters) call, even when the
/// cutoff has not moved. The design clamps the cutoff below Nyquist, so the
/// section stays stable for any input.
///
/// # Example
///
/// ```rust
/// use mars_core::{FilterKind, Stage};
/// use mars_effects::{FilterStage, FilterStageParameters};
///
/// let mut lowpass = FilterStage::new(FilterKind::LowPass);
/// lowpass.prepare(48000.0, 512);
/// lowpass.set_parameters(&FilterStageParameters { cutoff_hz: 1000.0 });
///
/// let mut dc = [1.0f32; 512];
/// lowpass.process(&mut dc);
/// assert!((dc[511] - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct FilterStage {
    kind: FilterKind,
    biquad: Biquad,
    cutoff_hz: f32,
    sample_rate: f32,
}

impl FilterStage {
    /// Create a stage of the given role, fully open until configured.
    pub fn new(kind: FilterKind) -> Self {
        let cutoff_hz = match kind {
            FilterKind::LowPass => f32::MAX,
            FilterKind::HighPass => 0.0,
        };
        let mut stage = Self {
            kind,
            biquad: Biquad::new(),
            cutoff_hz,
            sample_rate: 48000.0,
        };
        stage.update_coefficients();
        stage
    }

    /// Filter role.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Requested cutoff in Hz (before clamping to the sample rate).
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Coefficients currently loaded.
    pub fn coefficients(&self) -> FilterCoefficients {
        self.biquad.coefficients()
    }

    fn update_coefficients(&mut self) {
        self.biquad.set_coefficients(FilterCoefficients::design_clamped(
            self.kind,
            self.cutoff_hz,
            self.sample_rate,
        ));
    }
}

impl Stage for FilterStage {
    type Params = FilterStageParameters;

    fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.biquad.clear();
        self.update_coefficients();
    }

    fn set_parameters(&mut self, params: &FilterStageParameters) {
        self.cutoff_hz = params.cutoff_hz;
        self.update_coefficients();
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        self.biquad.process(input)
    }

    fn reset(&mut self) {
        self.biquad.clear();
    }
}
