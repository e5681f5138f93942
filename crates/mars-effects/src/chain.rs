//! One channel's fixed six-stage chain.
//!
//! The chain is a homogeneous array of [`ChainStage`] values, all driven
//! through the [`Stage`] trait and always processed in [`StagePosition::ALL`]
//! order:
//!
//! ```text
//! diffuser 1 → diffuser 2 → mod delay 1 → mod delay 2 → low-pass → high-pass
//! ```
//!
//! There is no other ordering and no way to insert or remove stages.

use crate::diffuser::Diffuser;
use crate::filter::{FilterStage, FilterStageParameters};
use crate::mapper::{
    Channel, ChorusStageParameters, MappedParameters, ReverbStageParameters,
};
use crate::modulated_delay::ModulatedDelay;
use mars_core::{FilterKind, Stage};

/// Number of stages in a chain.
pub const STAGE_COUNT: usize = 6;

/// Slot of a stage within the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagePosition {
    /// First diffuser (`reverb1*` controls).
    Diffuser1,
    /// Second diffuser (`reverb2*` controls).
    Diffuser2,
    /// First modulated delay.
    ModulatedDelay1,
    /// Second modulated delay.
    ModulatedDelay2,
    /// Low-pass filter.
    LowPass,
    /// High-pass filter.
    HighPass,
}

impl StagePosition {
    /// Processing order.
    pub const ALL: [StagePosition; STAGE_COUNT] = [
        StagePosition::Diffuser1,
        StagePosition::Diffuser2,
        StagePosition::ModulatedDelay1,
        StagePosition::ModulatedDelay2,
        StagePosition::LowPass,
        StagePosition::HighPass,
    ];

    /// Index into the chain.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            StagePosition::Diffuser1 => "Diffuser 1",
            StagePosition::Diffuser2 => "Diffuser 2",
            StagePosition::ModulatedDelay1 => "Modulated Delay 1",
            StagePosition::ModulatedDelay2 => "Modulated Delay 2",
            StagePosition::LowPass => "Low-Pass",
            StagePosition::HighPass => "High-Pass",
        }
    }
}

/// Parameters for any stage variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageParameters {
    /// For [`ChainStage::Diffuser`].
    Reverb(ReverbStageParameters),
    /// For [`ChainStage::ModulatedDelay`].
    Chorus(ChorusStageParameters),
    /// For [`ChainStage::Filter`].
    Filter(FilterStageParameters),
}

/// The closed set of stage variants a chain is built from.
#[derive(Debug, Clone)]
pub enum ChainStage {
    /// Reverb-like diffuser.
    Diffuser(Diffuser),
    /// Chorus-like modulated delay.
    ModulatedDelay(ModulatedDelay),
    /// Low-pass or high-pass biquad.
    Filter(FilterStage),
}

impl ChainStage {
    /// Fresh stage for a chain slot.
    pub fn for_position(position: StagePosition) -> Self {
        match position {
            StagePosition::Diffuser1 | StagePosition::Diffuser2 => {
                ChainStage::Diffuser(Diffuser::new())
            }
            StagePosition::ModulatedDelay1 | StagePosition::ModulatedDelay2 => {
                ChainStage::ModulatedDelay(ModulatedDelay::new())
            }
            StagePosition::LowPass => ChainStage::Filter(FilterStage::new(FilterKind::LowPass)),
            StagePosition::HighPass => ChainStage::Filter(FilterStage::new(FilterKind::HighPass)),
        }
    }
}

impl Stage for ChainStage {
    type Params = StageParameters;

    fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        match self {
            ChainStage::Diffuser(s) => s.prepare(sample_rate, max_block_size),
            ChainStage::ModulatedDelay(s) => s.prepare(sample_rate, max_block_size),
            ChainStage::Filter(s) => s.prepare(sample_rate, max_block_size),
        }
    }

    /// A parameter variant that does not match the stage is ignored.
    fn set_parameters(&mut self, params: &StageParameters) {
        match (self, params) {
            (ChainStage::Diffuser(s), StageParameters::Reverb(p)) => s.set_parameters(p),
            (ChainStage::ModulatedDelay(s), StageParameters::Chorus(p)) => s.set_parameters(p),
            (ChainStage::Filter(s), StageParameters::Filter(p)) => s.set_parameters(p),
            _ => {}
        }
    }

    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        match self {
            ChainStage::Diffuser(s) => s.process_sample(input),
            ChainStage::ModulatedDelay(s) => s.process_sample(input),
            ChainStage::Filter(s) => s.process_sample(input),
        }
    }

    // Dispatch once per block rather than once per sample.
    fn process(&mut self, block: &mut [f32]) {
        match self {
            ChainStage::Diffuser(s) => s.process(block),
            ChainStage::ModulatedDelay(s) => s.process(block),
            ChainStage::Filter(s) => s.process(block),
        }
    }

    fn reset(&mut self) {
        match self {
            ChainStage::Diffuser(s) => s.reset(),
            ChainStage::ModulatedDelay(s) => s.reset(),
            ChainStage::Filter(s) => s.reset(),
        }
    }
}

/// Six stages processing one channel in place.
///
/// # Example
///
/// ```rust
/// use mars_effects::{Channel, ControlSnapshot, ParameterMapper, StageChain};
///
/// let mut chain = StageChain::new();
/// chain.prepare(48000.0, 128);
///
/// let mapped = ParameterMapper::default().map(&ControlSnapshot::default());
/// chain.apply(&mapped, Channel::Left);
///
/// let mut block = [0.0f32; 128];
/// chain.process(&mut block);
/// assert!(block.iter().all(|&s| s == 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct StageChain {
    stages: [ChainStage; STAGE_COUNT],
}

impl StageChain {
    /// Chain with every stage unprepared.
    pub fn new() -> Self {
        Self {
            stages: StagePosition::ALL.map(ChainStage::for_position),
        }
    }

    /// Prepare every stage. Allocates; never call from the audio thread.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        for stage in &mut self.stages {
            stage.prepare(sample_rate, max_block_size);
        }
    }

    /// Push one channel's share of a block's mapped parameters.
    pub fn apply(&mut self, mapped: &MappedParameters, channel: Channel) {
        let per_stage = [
            StageParameters::Reverb(mapped.reverb1),
            StageParameters::Reverb(mapped.reverb2),
            StageParameters::Chorus(*mapped.chorus1.get(channel)),
            StageParameters::Chorus(*mapped.chorus2.get(channel)),
            StageParameters::Filter(FilterStageParameters {
                cutoff_hz: mapped.lowpass_cutoff_hz,
            }),
            StageParameters::Filter(FilterStageParameters {
                cutoff_hz: mapped.highpass_cutoff_hz,
            }),
        ];
        for (stage, params) in self.stages.iter_mut().zip(per_stage.iter()) {
            stage.set_parameters(params);
        }
    }

    /// Set parameters of a single stage.
    pub fn set_stage_parameters(&mut self, position: StagePosition, params: &StageParameters) {
        self.stages[position.index()].set_parameters(params);
    }

    /// Run the block through all six stages in order.
    pub fn process(&mut self, block: &mut [f32]) {
        for stage in &mut self.stages {
            stage.process(block);
        }
    }

    /// Clear all stage state.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Stage at a position.
    pub fn stage(&self, position: StagePosition) -> &ChainStage {
        &self.stages[position.index()]
    }
}

impl Default for StageChain {
    fn default() -> Self {
        Self::new()
    }
}
