//! Mars Core - DSP primitives for the mars stereo effects processor
//!
//! This crate provides the building blocks the processing chain is assembled
//! from, designed for real-time audio with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Stage System
//!
//! - [`Stage`] - Capability set shared by every stage in a processing chain
//!   (`prepare`, `set_parameters`, `process`)
//!
//! ## Parameters
//!
//! - [`SmoothedParam`] - Exponential smoothing for click-free changes
//! - [`ParamDescriptor`] - Range, step and skew metadata for control parameters
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR section (Direct Form I)
//! - [`FilterCoefficients`] - RBJ cookbook low-pass / high-pass design
//! - [`CombFilter`] - Damped feedback comb for Freeverb-style diffusion
//! - [`AllpassFilter`] - Schroeder allpass for diffusion
//!
//! ## Delay Lines & Modulation
//!
//! - [`InterpolatedDelay`] - Variable-length delay with fractional reads
//! - [`Lfo`] - Sine low-frequency oscillator
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build without the standard library:
//!
//! ```toml
//! [dependencies]
//! mars-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: buffers are allocated in `prepare`, never in `process`
//! - **Lock-free**: nothing in this crate blocks
//! - **Numerically guarded**: feedback paths flush denormals, coefficient
//!   design refuses or clamps unstable cutoffs

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod comb;
pub mod delay;
pub mod error;
pub mod lfo;
pub mod math;
pub mod param;
pub mod param_info;
pub mod stage;

// Re-export main types at crate root
pub use allpass::AllpassFilter;
pub use biquad::{
    BUTTERWORTH_Q, Biquad, FilterCoefficients, FilterKind, MIN_CUTOFF_HZ, clamp_cutoff,
};
pub use comb::CombFilter;
pub use delay::InterpolatedDelay;
pub use error::CoefficientError;
pub use lfo::Lfo;
pub use math::{flush_denormal, ms_to_samples, wet_dry_mix};
pub use param::SmoothedParam;
pub use param_info::{ParamDescriptor, ParamUnit};
pub use stage::Stage;
