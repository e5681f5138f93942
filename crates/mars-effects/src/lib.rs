//! Mars Effects - the stereo reverb/chorus/filter processor
//!
//! Built on `mars-core`, this crate assembles the fixed processing chain and
//! everything that feeds it:
//!
//! - [`ParameterStore`] / [`ControlSnapshot`] - the eleven controls, read
//!   once per block through [`ParameterSource`]
//! - [`ParameterMapper`] - controls to per-stage parameters
//! - [`Diffuser`], [`ModulatedDelay`], [`FilterStage`] - the stage variants
//! - [`StageChain`] - six stages, fixed order, one channel
//! - [`DualChannelProcessor`] - left and right chains with stereo offsets
//!
//! ## Example
//!
//! ```rust
//! use mars_effects::{
//!     AudioBlock, ControlId, DualChannelProcessor, ParameterStore, ProcessorConfig,
//! };
//!
//! // Control thread side
//! let store = ParameterStore::new();
//! store.set(ControlId::Reverb1Amount, 0.5);
//! store.set(ControlId::Reverb1Mix, 0.5);
//!
//! // Audio thread side
//! let mut processor = DualChannelProcessor::new();
//! processor.prepare(ProcessorConfig::stereo(48000.0, 512))?;
//!
//! let mut buffer = vec![0.0f32; 2 * 512];
//! processor.process_with(&mut AudioBlock::new(&mut buffer, 2), &store);
//! # Ok::<(), mars_effects::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod chain;
pub mod controls;
pub mod diffuser;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod modulated_delay;
pub mod processor;

// Re-export main types at crate root
pub use chain::{ChainStage, STAGE_COUNT, StageChain, StageParameters, StagePosition};
pub use controls::{
    CONTROL_COUNT, CONTROL_LAYOUT, ControlId, ControlSnapshot, ParameterSource, ParameterStore,
};
pub use diffuser::Diffuser;
pub use error::ConfigError;
pub use filter::{FilterStage, FilterStageParameters};
pub use mapper::{
    Channel, ChannelPair, ChorusStageParameters, MappedParameters, ParameterMapper,
    ReverbStageParameters, StereoOffsets,
};
pub use modulated_delay::ModulatedDelay;
pub use processor::{AudioBlock, DualChannelProcessor, ProcessorConfig, is_layout_supported};
