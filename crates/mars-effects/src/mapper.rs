//! Control values to per-stage DSP parameters.
//!
//! [`ParameterMapper::map`] is pure: one snapshot in, one
//! [`MappedParameters`] out, no allocation. Every control is clamped to its
//! declared range before use and every derived value is clamped to the
//! range its stage accepts, so a misbehaving store cannot push a stage out
//! of its stable region.
//!
//! ## Derivations
//!
//! | Stage | Field | Source |
//! |-------|-------|--------|
//! | diffuser N | `room_size`, `wet_level` | `reverbNMix` |
//! | diffuser N | `damping` | 0.33 (N = 1), 0.71 (N = 2) |
//! | diffuser N | `dry_level` | `1 - reverbNAmount` |
//! | diffuser N | `freeze` | `reverbNAmount * 0.3` |
//! | mod delay N | `mix` | `reverbNMix * 0.33` |
//! | mod delay 1 and 2 | `depth` | `reverb1ModDepth` |
//! | mod delay 1 and 2 | `rate` | `reverb1ModRate` + per-channel offset |
//! | mod delay N | `feedback` | per-channel constant ([`StereoOffsets`]) |
//! | low-pass | cutoff | `masterHighpass` |
//! | high-pass | cutoff | `masterLowpass` |
//!
//! Both modulated delays follow the first reverb's modulation controls;
//! `reverb2ModRate` and `reverb2ModDepth` are stored but drive nothing. The
//! low-pass stage is fed from `masterHighpass` ("Low Cut") and the high-pass
//! stage from `masterLowpass` ("High Cut"), consistently for every block.

use crate::controls::{ControlId, ControlSnapshot};

/// Fixed damping of the first diffuser.
pub const REVERB1_DAMPING: f32 = 0.33;
/// Fixed damping of the second diffuser.
pub const REVERB2_DAMPING: f32 = 0.71;
/// Share of a reverb's amount that becomes freeze.
pub const FREEZE_SCALE: f32 = 0.3;
/// Share of a reverb's mix that becomes modulated-delay mix.
pub const CHORUS_MIX_SCALE: f32 = 0.33;

/// Largest modulation rate a modulated-delay stage accepts.
pub const MAX_CHORUS_RATE_HZ: f32 = 20.0;
/// Largest feedback magnitude a modulated-delay stage accepts.
pub const MAX_CHORUS_FEEDBACK: f32 = 0.95;

/// Which side of the stereo pair a stage instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Left, also used for mono.
    Left,
    /// Right.
    Right,
}

/// One value per channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelPair<T> {
    /// Left channel value.
    pub left: T,
    /// Right channel value.
    pub right: T,
}

impl<T> ChannelPair<T> {
    /// Pair from left and right values.
    pub const fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Value for one channel.
    #[inline]
    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }
}

impl<T: Copy> ChannelPair<T> {
    /// Same value on both channels.
    pub const fn both(value: T) -> Self {
        Self {
            left: value,
            right: value,
        }
    }
}

/// Parameters of one diffuser stage, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbStageParameters {
    /// Decay time of the feedback network.
    pub room_size: f32,
    /// High-frequency loss in the feedback path.
    pub damping: f32,
    /// Gain of the diffused signal.
    pub wet_level: f32,
    /// Gain of the unprocessed signal.
    pub dry_level: f32,
    /// Input suppression / sustain amount.
    pub freeze: f32,
}

impl ReverbStageParameters {
    /// Every field clamped into `[0, 1]`; NaN becomes 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            room_size: unit(self.room_size),
            damping: unit(self.damping),
            wet_level: unit(self.wet_level),
            dry_level: unit(self.dry_level),
            freeze: unit(self.freeze),
        }
    }
}

impl Default for ReverbStageParameters {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.33,
            dry_level: 0.4,
            freeze: 0.0,
        }
    }
}

/// Parameters of one modulated-delay stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusStageParameters {
    /// Delayed output routed back into the delay line, `[-0.95, 0.95]`.
    pub feedback: f32,
    /// Modulation excursion as a fraction of the base delay, `[0, 1]`.
    pub depth: f32,
    /// LFO frequency in Hz, `[0, 20]`.
    pub rate: f32,
    /// Wet/dry blend, `[0, 1]`.
    pub mix: f32,
}

impl ChorusStageParameters {
    /// Every field clamped into the range the stage accepts; NaN becomes 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            feedback: finite_or_zero(self.feedback)
                .clamp(-MAX_CHORUS_FEEDBACK, MAX_CHORUS_FEEDBACK),
            depth: unit(self.depth),
            rate: finite_or_zero(self.rate).clamp(0.0, MAX_CHORUS_RATE_HZ),
            mix: unit(self.mix),
        }
    }
}

impl Default for ChorusStageParameters {
    fn default() -> Self {
        Self {
            feedback: 0.0,
            depth: 0.5,
            rate: 1.0,
            mix: 0.5,
        }
    }
}

/// Deliberate left/right differences that widen the stereo image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoOffsets {
    /// Feedback of the first modulated delay.
    pub chorus1_feedback: ChannelPair<f32>,
    /// Feedback of the second modulated delay.
    pub chorus2_feedback: ChannelPair<f32>,
    /// Added to `reverb1ModRate` for both modulated delays.
    pub rate_offset: ChannelPair<f32>,
}

impl StereoOffsets {
    /// No left/right asymmetry: both chains receive identical parameters.
    pub const fn matched() -> Self {
        Self {
            chorus1_feedback: ChannelPair::both(-0.3),
            chorus2_feedback: ChannelPair::both(0.3),
            rate_offset: ChannelPair::both(0.0),
        }
    }
}

impl Default for StereoOffsets {
    fn default() -> Self {
        Self {
            chorus1_feedback: ChannelPair::new(-0.2999, -0.3001),
            chorus2_feedback: ChannelPair::new(0.2887, 0.3112),
            rate_offset: ChannelPair::new(-0.001, 0.0),
        }
    }
}

/// Everything one block needs, derived from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedParameters {
    /// First diffuser, shared by both channels.
    pub reverb1: ReverbStageParameters,
    /// Second diffuser, shared by both channels.
    pub reverb2: ReverbStageParameters,
    /// First modulated delay, per channel.
    pub chorus1: ChannelPair<ChorusStageParameters>,
    /// Second modulated delay, per channel.
    pub chorus2: ChannelPair<ChorusStageParameters>,
    /// Cutoff of the low-pass stage in Hz.
    pub lowpass_cutoff_hz: f32,
    /// Cutoff of the high-pass stage in Hz.
    pub highpass_cutoff_hz: f32,
    /// Final blend of chain output against the input, `[0, 1]`.
    pub dry_wet: f32,
}

/// Maps control snapshots to stage parameters.
///
/// # Example
///
/// ```rust
/// use mars_effects::{ControlId, ControlSnapshot, ParameterMapper};
///
/// let snapshot = ControlSnapshot::default().with(ControlId::Reverb1Mix, 0.8);
/// let mapped = ParameterMapper::default().map(&snapshot);
///
/// assert_eq!(mapped.reverb1.room_size, 0.8);
/// assert_eq!(mapped.reverb1.wet_level, 0.8);
/// assert_eq!(mapped.reverb1.damping, 0.33);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterMapper {
    offsets: StereoOffsets,
}

impl ParameterMapper {
    /// Mapper using the given stereo offsets.
    pub const fn new(offsets: StereoOffsets) -> Self {
        Self { offsets }
    }

    /// Current stereo offsets.
    pub fn offsets(&self) -> &StereoOffsets {
        &self.offsets
    }

    /// Replace the stereo offsets.
    pub fn set_offsets(&mut self, offsets: StereoOffsets) {
        self.offsets = offsets;
    }

    /// Derive every stage parameter for one block.
    pub fn map(&self, snapshot: &ControlSnapshot) -> MappedParameters {
        let read = |id: ControlId| id.descriptor().clamp(snapshot.get(id));

        let amount1 = read(ControlId::Reverb1Amount);
        let mix1 = read(ControlId::Reverb1Mix);
        let amount2 = read(ControlId::Reverb2Amount);
        let mix2 = read(ControlId::Reverb2Mix);
        let mod_rate = read(ControlId::Reverb1ModRate);
        let mod_depth = read(ControlId::Reverb1ModDepth);

        let chorus = |feedback: &ChannelPair<f32>, mix: f32, channel: Channel| {
            ChorusStageParameters {
                feedback: *feedback.get(channel),
                depth: mod_depth,
                rate: mod_rate + *self.offsets.rate_offset.get(channel),
                mix: mix * CHORUS_MIX_SCALE,
            }
            .clamped()
        };
        let chorus_pair = |feedback: &ChannelPair<f32>, mix: f32| {
            ChannelPair::new(
                chorus(feedback, mix, Channel::Left),
                chorus(feedback, mix, Channel::Right),
            )
        };

        MappedParameters {
            reverb1: reverb(amount1, mix1, REVERB1_DAMPING),
            reverb2: reverb(amount2, mix2, REVERB2_DAMPING),
            chorus1: chorus_pair(&self.offsets.chorus1_feedback, mix1),
            chorus2: chorus_pair(&self.offsets.chorus2_feedback, mix2),
            lowpass_cutoff_hz: read(ControlId::MasterHighpass),
            highpass_cutoff_hz: read(ControlId::MasterLowpass),
            dry_wet: read(ControlId::MasterDryWet),
        }
    }
}

fn reverb(amount: f32, mix: f32, damping: f32) -> ReverbStageParameters {
    ReverbStageParameters {
        room_size: mix,
        damping,
        wet_level: mix,
        dry_level: 1.0 - amount,
        freeze: amount * FREEZE_SCALE,
    }
    .clamped()
}

#[inline]
fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

#[inline]
fn unit(x: f32) -> f32 {
    finite_or_zero(x).clamp(0.0, 1.0)
}
