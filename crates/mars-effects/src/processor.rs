//! Stereo orchestration: two independent chains driven from one snapshot.
//!
//! Per block, [`DualChannelProcessor::process_block`]:
//!
//! 1. clears every channel it will not process,
//! 2. maps the snapshot once,
//! 3. pushes left-channel parameters into the left chain and right-channel
//!    parameters into the right chain,
//! 4. runs the left channel through the left chain, then the right channel
//!    through the right chain,
//! 5. blends chain output against the input when `masterDryWet < 1`.
//!
//! Nothing here allocates, locks or returns an error once `prepare` has
//! succeeded.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::chain::StageChain;
use crate::controls::{ControlSnapshot, ParameterSource};
use crate::error::ConfigError;
use crate::mapper::{Channel, MappedParameters, ParameterMapper, StereoOffsets};
use mars_core::wet_dry_mix;

/// Stream configuration accepted by [`DualChannelProcessor::prepare`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the host will deliver.
    pub max_block_size: usize,
    /// Channels per block. One or two are processed; any beyond two are
    /// silenced.
    pub channel_count: usize,
}

impl ProcessorConfig {
    /// Configuration with an explicit channel count.
    pub const fn new(sample_rate: f32, max_block_size: usize, channel_count: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channel_count,
        }
    }

    /// Two-channel configuration.
    pub const fn stereo(sample_rate: f32, max_block_size: usize) -> Self {
        Self::new(sample_rate, max_block_size, 2)
    }

    /// Check the configuration without touching any processor.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidSampleRate`] for a non-positive or non-finite rate.
    /// - [`ConfigError::ZeroBlockSize`] for a zero maximum block size.
    /// - [`ConfigError::UnsupportedChannelCount`] for zero channels.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.channel_count == 0 {
            return Err(ConfigError::UnsupportedChannelCount(0));
        }
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::stereo(48000.0, 512)
    }
}

/// Whether a host bus layout can be run: mono or stereo, with the input
/// layout equal to the output layout.
///
/// ```rust
/// use mars_effects::is_layout_supported;
///
/// assert!(is_layout_supported(2, 2));
/// assert!(is_layout_supported(1, 1));
/// assert!(!is_layout_supported(1, 2));
/// assert!(!is_layout_supported(6, 6));
/// ```
pub fn is_layout_supported(input_channels: usize, output_channels: usize) -> bool {
    input_channels == output_channels && matches!(output_channels, 1 | 2)
}

/// A channel-major, in-place buffer of `channel_count × sample_count` samples.
///
/// ```rust
/// use mars_effects::AudioBlock;
///
/// let mut data = [0.0f32; 8];
/// let mut block = AudioBlock::new(&mut data, 2);
/// assert_eq!(block.sample_count(), 4);
/// block.channel_mut(1)[0] = 1.0;
/// assert_eq!(data[4], 1.0);
/// ```
#[derive(Debug)]
pub struct AudioBlock<'a> {
    data: &'a mut [f32],
    channel_count: usize,
    sample_count: usize,
}

impl<'a> AudioBlock<'a> {
    /// Wrap a buffer holding `channel_count` consecutive channels.
    ///
    /// Trailing samples that do not fill a whole frame are left alone.
    pub fn new(data: &'a mut [f32], channel_count: usize) -> Self {
        let sample_count = data.len().checked_div(channel_count).unwrap_or(0);
        Self {
            data,
            channel_count,
            sample_count,
        }
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Samples per channel.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Read access to one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count`.
    pub fn channel(&self, index: usize) -> &[f32] {
        assert!(index < self.channel_count, "channel index out of range");
        let start = index * self.sample_count;
        &self.data[start..start + self.sample_count]
    }

    /// Write access to one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count`.
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        assert!(index < self.channel_count, "channel index out of range");
        let start = index * self.sample_count;
        &mut self.data[start..start + self.sample_count]
    }
}

/// Two independent [`StageChain`]s, one per channel.
///
/// # Example
///
/// ```rust
/// use mars_effects::{
///     AudioBlock, ControlId, DualChannelProcessor, ParameterStore, ProcessorConfig,
/// };
///
/// let store = ParameterStore::new();
/// store.set(ControlId::Reverb1Mix, 0.3);
///
/// let mut processor = DualChannelProcessor::new();
/// processor.prepare(ProcessorConfig::stereo(48000.0, 256)).unwrap();
///
/// let mut data = vec![0.0f32; 2 * 256];
/// data[0] = 1.0;
/// data[256] = 1.0;
/// processor.process_with(&mut AudioBlock::new(&mut data, 2), &store);
/// assert!(data.iter().all(|s| s.is_finite()));
/// ```
#[derive(Debug, Clone)]
pub struct DualChannelProcessor {
    left: StageChain,
    right: StageChain,
    mapper: ParameterMapper,
    config: Option<ProcessorConfig>,
    /// Input copy for the final dry/wet blend, sized in `prepare`.
    dry: Vec<f32>,
}

impl DualChannelProcessor {
    /// Unprepared processor with the default stereo offsets.
    pub fn new() -> Self {
        Self::with_stereo_offsets(StereoOffsets::default())
    }

    /// Unprepared processor with custom stereo offsets.
    pub fn with_stereo_offsets(offsets: StereoOffsets) -> Self {
        Self {
            left: StageChain::new(),
            right: StageChain::new(),
            mapper: ParameterMapper::new(offsets),
            config: None,
            dry: Vec::new(),
        }
    }

    /// Replace the stereo offsets. Takes effect from the next block.
    pub fn set_stereo_offsets(&mut self, offsets: StereoOffsets) {
        self.mapper.set_offsets(offsets);
    }

    /// Current stereo offsets.
    pub fn stereo_offsets(&self) -> &StereoOffsets {
        self.mapper.offsets()
    }

    /// Allocate and reset both chains for a stream configuration.
    ///
    /// Must not overlap [`process_block`](Self::process_block). On error the
    /// processor is left unprepared and `process_block` does nothing until a
    /// later `prepare` succeeds.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`ProcessorConfig::validate`].
    pub fn prepare(&mut self, config: ProcessorConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            #[cfg(feature = "tracing")]
            tracing::warn!(%err, "processor configuration rejected");
            self.config = None;
            return Err(err);
        }

        self.left.prepare(config.sample_rate, config.max_block_size);
        self.right.prepare(config.sample_rate, config.max_block_size);
        self.dry = vec![0.0; config.max_block_size];
        self.config = Some(config);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = config.sample_rate,
            max_block_size = config.max_block_size,
            channel_count = config.channel_count,
            "processor prepared"
        );
        Ok(())
    }

    /// Active configuration, if prepared.
    pub fn config(&self) -> Option<&ProcessorConfig> {
        self.config.as_ref()
    }

    /// Whether `prepare` has succeeded.
    pub fn is_prepared(&self) -> bool {
        self.config.is_some()
    }

    /// Clear all stage state without reallocating.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    /// Chain for one channel.
    pub fn chain(&self, channel: Channel) -> &StageChain {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    /// Take one snapshot from `source` and process the block with it.
    pub fn process_with<S: ParameterSource + ?Sized>(
        &mut self,
        block: &mut AudioBlock<'_>,
        source: &S,
    ) {
        let snapshot = source.snapshot();
        self.process_block(block, &snapshot);
    }

    /// Process one block in place.
    ///
    /// The first channel runs through the left chain, the second through the
    /// right chain; any further channels are zeroed. Blocks longer than the
    /// prepared maximum are processed in maximum-size pieces. An unprepared
    /// processor leaves the block untouched.
    pub fn process_block(&mut self, block: &mut AudioBlock<'_>, snapshot: &ControlSnapshot) {
        let Some(config) = self.config else {
            return;
        };

        let active = block.channel_count().min(config.channel_count).min(2);
        for index in active..block.channel_count() {
            block.channel_mut(index).fill(0.0);
        }

        let mapped = self.mapper.map(snapshot);
        self.apply(&mapped);

        let max_block = config.max_block_size;
        for index in 0..active {
            let chain = if index == 0 {
                &mut self.left
            } else {
                &mut self.right
            };
            let samples = block.channel_mut(index);
            for piece in samples.chunks_mut(max_block) {
                run_chain(chain, &mut self.dry, piece, mapped.dry_wet);
            }
        }
    }

    fn apply(&mut self, mapped: &MappedParameters) {
        self.left.apply(mapped, Channel::Left);
        self.right.apply(mapped, Channel::Right);
    }
}

impl Default for DualChannelProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Process one piece (at most `dry.len()` samples) through a chain,
/// blending against the input when `dry_wet < 1`.
fn run_chain(chain: &mut StageChain, dry: &mut [f32], samples: &mut [f32], dry_wet: f32) {
    if dry_wet >= 1.0 {
        chain.process(samples);
        return;
    }

    let dry = &mut dry[..samples.len()];
    dry.copy_from_slice(samples);
    chain.process(samples);
    for (out, &input) in samples.iter_mut().zip(dry.iter()) {
        *out = wet_dry_mix(input, *out, dry_wet);
    }
}
