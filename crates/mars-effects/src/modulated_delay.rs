//! Chorus-like modulated delay stage.

use crate::mapper::{ChorusStageParameters, MAX_CHORUS_FEEDBACK, MAX_CHORUS_RATE_HZ};
use libm::ceilf;
use mars_core::{
    InterpolatedDelay, Lfo, SmoothedParam, Stage, flush_denormal, ms_to_samples, wet_dry_mix,
};

/// Centre of the modulated tap.
pub const BASE_DELAY_MS: f32 = 7.0;

/// One linearly interpolated tap swept by a sine LFO around
/// [`BASE_DELAY_MS`], with feedback into the delay line.
///
/// ```text
/// delay  = base * (1 + depth * lfo)        (never below one sample)
/// wet    = line.read(delay)
/// line  <- input + wet * feedback
/// output = input * (1 - mix) + wet * mix
/// ```
///
/// # Example
///
/// ```rust
/// use mars_core::Stage;
/// use mars_effects::{ChorusStageParameters, ModulatedDelay};
///
/// let mut chorus = ModulatedDelay::new();
/// chorus.prepare(48000.0, 64);
/// chorus.set_parameters(&ChorusStageParameters {
///     feedback: -0.3,
///     depth: 0.5,
///     rate: 0.5,
///     mix: 0.0,
/// });
///
/// let mut block = [0.25f32; 64];
/// chorus.process(&mut block);
/// assert!(block.iter().all(|&s| s == 0.25));
/// ```
#[derive(Debug, Clone)]
pub struct ModulatedDelay {
    delay: InterpolatedDelay,
    lfo: Lfo,
    base_delay_samples: f32,
    rate: SmoothedParam,
    depth: SmoothedParam,
    feedback: SmoothedParam,
    mix: SmoothedParam,
    snap_pending: bool,
}

impl ModulatedDelay {
    /// Create an unprepared stage sized for 48 kHz.
    pub fn new() -> Self {
        const SAMPLE_RATE: f32 = 48000.0;
        let defaults = ChorusStageParameters::default();
        Self {
            delay: InterpolatedDelay::new(Self::capacity_for(SAMPLE_RATE)),
            lfo: Lfo::new(SAMPLE_RATE, defaults.rate),
            base_delay_samples: ms_to_samples(BASE_DELAY_MS, SAMPLE_RATE),
            rate: SmoothedParam::standard(defaults.rate, SAMPLE_RATE),
            depth: SmoothedParam::standard(defaults.depth, SAMPLE_RATE),
            feedback: SmoothedParam::standard(defaults.feedback, SAMPLE_RATE),
            mix: SmoothedParam::standard(defaults.mix, SAMPLE_RATE),
            snap_pending: true,
        }
    }

    /// Buffer length covering the full excursion (twice the base delay).
    fn capacity_for(sample_rate: f32) -> usize {
        ceilf(ms_to_samples(2.0 * BASE_DELAY_MS, sample_rate)) as usize + 2
    }

    /// Target parameters (after clamping).
    pub fn parameters(&self) -> ChorusStageParameters {
        ChorusStageParameters {
            feedback: self.feedback.target(),
            depth: self.depth.target(),
            rate: self.rate.target(),
            mix: self.mix.target(),
        }
    }

    /// Current LFO phase in turns.
    pub fn lfo_phase(&self) -> f32 {
        self.lfo.phase()
    }

    fn smoothers(&mut self) -> [&mut SmoothedParam; 4] {
        [
            &mut self.rate,
            &mut self.depth,
            &mut self.feedback,
            &mut self.mix,
        ]
    }
}

impl Default for ModulatedDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ModulatedDelay {
    type Params = ChorusStageParameters;

    fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        self.delay = InterpolatedDelay::new(Self::capacity_for(sample_rate));
        self.base_delay_samples = ms_to_samples(BASE_DELAY_MS, sample_rate);
        self.lfo.set_sample_rate(sample_rate);
        self.lfo.reset();
        for param in self.smoothers() {
            param.set_sample_rate(sample_rate);
            param.snap_to_target();
        }
        self.snap_pending = true;
    }

    fn set_parameters(&mut self, params: &ChorusStageParameters) {
        let params = params.clamped();
        let snap = core::mem::take(&mut self.snap_pending);
        let targets = [params.rate, params.depth, params.feedback, params.mix];
        for (param, target) in self.smoothers().into_iter().zip(targets) {
            if snap {
                param.set_immediate(target);
            } else {
                param.set_target(target);
            }
        }
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let rate = self.rate.advance();
        let depth = self.depth.advance();
        let feedback = self.feedback.advance();
        let mix = self.mix.advance();

        self.lfo.set_frequency(rate.clamp(0.0, MAX_CHORUS_RATE_HZ));
        let modulation = self.lfo.advance();

        let delay_samples = (self.base_delay_samples * (1.0 + depth * modulation)).max(1.0);
        // The line has not been written for this sample yet, so delay 0 is
        // already one sample old.
        let wet = self.delay.read(delay_samples - 1.0);

        let feedback = feedback.clamp(-MAX_CHORUS_FEEDBACK, MAX_CHORUS_FEEDBACK);
        self.delay.write(flush_denormal(input + wet * feedback));

        wet_dry_mix(input, wet, mix)
    }

    fn reset(&mut self) {
        self.delay.clear();
        self.lfo.reset();
        for param in self.smoothers() {
            param.snap_to_target();
        }
    }
}
