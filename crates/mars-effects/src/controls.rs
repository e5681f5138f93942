//! Control parameters: static layout, lock-free store and per-block snapshot.
//!
//! The processor never reads controls one at a time during a block. It takes
//! a [`ControlSnapshot`] once at the start of each block through the
//! [`ParameterSource`] trait, so the host adapter decides where values live.
//!
//! [`ParameterStore`] is the stock source: one `AtomicU32` per control
//! holding the `f32` bit pattern, written with `Release` by the control
//! thread and read with `Acquire` by the audio thread. Controls are
//! independent; a snapshot may see one knob's new value next to another's
//! old one.
//!
//! | Id | Name | Range | Step | Skew | Default |
//! |----|------|-------|------|------|---------|
//! | `masterHighpass` | Low Cut | 20–20000 Hz | 1 | 0.35 | 20000 |
//! | `masterLowpass` | High Cut | 20–20000 Hz | 1 | 0.35 | 20 |
//! | `reverb1Amount` | Rev 1 Amount | 0.05–1.0 | 0.05 | 1 | 0.5 |
//! | `reverb1Mix` | Rev 1 Mix | 0.0–1.0 | 0.05 | 1 | 0.5 |
//! | `reverb1ModRate` | Rev 1 Mod Rate | 0.002–10 Hz | 0.005 | 1 | 0.5 |
//! | `reverb1ModDepth` | Rev 1 ModDepth | 0.0–1.0 | 0.05 | 1 | 0.5 |
//! | `reverb2Amount` | Rev 2 Amount | 0.05–1.0 | 0.05 | 1 | 0.5 |
//! | `reverb2Mix` | Rev 2 Mix | 0.0–1.0 | 0.05 | 1 | 0.5 |
//! | `reverb2ModRate` | Rev 2 Mod Rate | 0.002–10 Hz | 0.005 | 1 | 0.5 |
//! | `reverb2ModDepth` | Rev 2 ModDepth | 0.0–1.0 | 0.05 | 1 | 0.5 |
//! | `masterDryWet` | Dry/Wet | 0.0–1.0 | 0.05 | 1 | 1.0 |

use core::sync::atomic::{AtomicU32, Ordering};
use mars_core::{ParamDescriptor, ParamUnit};

/// Number of control parameters.
pub const CONTROL_COUNT: usize = 11;

/// Identifies one control parameter. The discriminant is the index into
/// [`CONTROL_LAYOUT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// `masterHighpass`, displayed as "Low Cut".
    MasterHighpass,
    /// `masterLowpass`, displayed as "High Cut".
    MasterLowpass,
    /// `reverb1Amount`
    Reverb1Amount,
    /// `reverb1Mix`
    Reverb1Mix,
    /// `reverb1ModRate`
    Reverb1ModRate,
    /// `reverb1ModDepth`
    Reverb1ModDepth,
    /// `reverb2Amount`
    Reverb2Amount,
    /// `reverb2Mix`
    Reverb2Mix,
    /// `reverb2ModRate`
    Reverb2ModRate,
    /// `reverb2ModDepth`
    Reverb2ModDepth,
    /// `masterDryWet`: final blend between the untouched input and the chain.
    MasterDryWet,
}

impl ControlId {
    /// All controls in layout order.
    pub const ALL: [ControlId; CONTROL_COUNT] = [
        ControlId::MasterHighpass,
        ControlId::MasterLowpass,
        ControlId::Reverb1Amount,
        ControlId::Reverb1Mix,
        ControlId::Reverb1ModRate,
        ControlId::Reverb1ModDepth,
        ControlId::Reverb2Amount,
        ControlId::Reverb2Mix,
        ControlId::Reverb2ModRate,
        ControlId::Reverb2ModDepth,
        ControlId::MasterDryWet,
    ];

    /// Position in [`CONTROL_LAYOUT`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Descriptor for this control.
    #[inline]
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &CONTROL_LAYOUT[self.index()]
    }

    /// Stable string id (e.g. `"reverb1Mix"`).
    pub fn as_str(self) -> &'static str {
        self.descriptor().id
    }

    /// Look up a control by its string id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|control| control.as_str() == id)
    }
}

const fn cutoff(id: &'static str, name: &'static str, default: f32) -> ParamDescriptor {
    ParamDescriptor::new(id, name, 20.0, 20000.0, default)
        .with_step(1.0)
        .with_skew(0.35)
        .with_unit(ParamUnit::Hertz)
}

const fn amount(id: &'static str, name: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(id, name, 0.05, 1.0, 0.5).with_step(0.05)
}

const fn unit_range(id: &'static str, name: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(id, name, 0.0, 1.0, 0.5).with_step(0.05)
}

const fn mod_rate(id: &'static str, name: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(id, name, 0.002, 10.0, 0.5)
        .with_step(0.005)
        .with_unit(ParamUnit::Hertz)
}

/// Descriptors for every control, indexed by [`ControlId::index`].
pub static CONTROL_LAYOUT: [ParamDescriptor; CONTROL_COUNT] = [
    cutoff("masterHighpass", "Low Cut", 20000.0),
    cutoff("masterLowpass", "High Cut", 20.0),
    amount("reverb1Amount", "Rev 1 Amount"),
    unit_range("reverb1Mix", "Rev 1 Mix"),
    mod_rate("reverb1ModRate", "Rev 1 Mod Rate"),
    unit_range("reverb1ModDepth", "Rev 1 ModDepth"),
    amount("reverb2Amount", "Rev 2 Amount"),
    unit_range("reverb2Mix", "Rev 2 Mix"),
    mod_rate("reverb2ModRate", "Rev 2 Mod Rate"),
    unit_range("reverb2ModDepth", "Rev 2 ModDepth"),
    ParamDescriptor::new("masterDryWet", "Dry/Wet", 0.0, 1.0, 1.0).with_step(0.05),
];

/// Values of all controls at one instant.
///
/// Values are stored as given; consumers clamp on read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    values: [f32; CONTROL_COUNT],
}

impl ControlSnapshot {
    /// Snapshot from raw values in layout order.
    pub const fn from_values(values: [f32; CONTROL_COUNT]) -> Self {
        Self { values }
    }

    /// Raw value of one control.
    #[inline]
    pub fn get(&self, id: ControlId) -> f32 {
        self.values[id.index()]
    }

    /// Overwrite one control.
    #[inline]
    pub fn set(&mut self, id: ControlId, value: f32) {
        self.values[id.index()] = value;
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, id: ControlId, value: f32) -> Self {
        self.set(id, value);
        self
    }

    /// All values in layout order.
    pub fn values(&self) -> &[f32; CONTROL_COUNT] {
        &self.values
    }
}

impl Default for ControlSnapshot {
    /// Every control at its declared default.
    fn default() -> Self {
        Self {
            values: core::array::from_fn(|i| CONTROL_LAYOUT[i].default),
        }
    }
}

/// Read access to control values, one snapshot per block.
///
/// This is the whole contract between the processor and whatever holds the
/// parameters. Implementations must not block.
pub trait ParameterSource {
    /// Read every control once.
    fn snapshot(&self) -> ControlSnapshot;
}

impl ParameterSource for ControlSnapshot {
    fn snapshot(&self) -> ControlSnapshot {
        *self
    }
}

impl<T: ParameterSource + ?Sized> ParameterSource for &T {
    fn snapshot(&self) -> ControlSnapshot {
        (**self).snapshot()
    }
}

/// Lock-free control storage shared between a control thread and the audio
/// thread.
///
/// # Example
///
/// ```rust
/// use mars_effects::{ControlId, ParameterSource, ParameterStore};
///
/// let store = ParameterStore::new();
/// store.set(ControlId::Reverb1Mix, 0.25);
/// store.set(ControlId::Reverb1Amount, 7.0); // clamped to 1.0
///
/// let snapshot = store.snapshot();
/// assert_eq!(snapshot.get(ControlId::Reverb1Mix), 0.25);
/// assert_eq!(snapshot.get(ControlId::Reverb1Amount), 1.0);
/// ```
#[derive(Debug)]
pub struct ParameterStore {
    /// f32 bit patterns, indexed by [`ControlId::index`].
    values: [AtomicU32; CONTROL_COUNT],
}

impl ParameterStore {
    /// Store with every control at its default.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(CONTROL_LAYOUT[i].default.to_bits())),
        }
    }

    /// Write a plain value, clamped into the control's range.
    pub fn set(&self, id: ControlId, value: f32) {
        let clamped = id.descriptor().clamp(value);
        #[cfg(feature = "tracing")]
        if clamped != value {
            tracing::debug!(control = id.as_str(), value, clamped, "control value clamped");
        }
        self.values[id.index()].store(clamped.to_bits(), Ordering::Release);
    }

    /// Write a normalised `[0, 1]` knob position, applying skew and step.
    pub fn set_normalized(&self, id: ControlId, normalized: f32) {
        let desc = id.descriptor();
        self.set(id, desc.snap(desc.denormalize(normalized)));
    }

    /// Current plain value of one control.
    #[inline]
    pub fn get(&self, id: ControlId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Acquire))
    }

    /// Current value of one control as a normalised knob position.
    pub fn get_normalized(&self, id: ControlId) -> f32 {
        id.descriptor().normalize(self.get(id))
    }

    /// Put every control back to its default.
    pub fn reset_to_defaults(&self) {
        for (slot, desc) in self.values.iter().zip(CONTROL_LAYOUT.iter()) {
            slot.store(desc.default.to_bits(), Ordering::Release);
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSource for ParameterStore {
    fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            values: core::array::from_fn(|i| {
                f32::from_bits(self.values[i].load(Ordering::Acquire))
            }),
        }
    }
}
