//! Property-based tests for the mapper and the dual-channel processor.
//!
//! Verifies that mapped stage parameters stay inside their stage ranges for
//! any control values, and that the processor output stays finite and
//! bounded for random settings.

use mars_effects::{
    AudioBlock, CONTROL_COUNT, CONTROL_LAYOUT, ControlId, ControlSnapshot, DualChannelProcessor,
    ParameterMapper, ProcessorConfig, StereoOffsets,
};
use proptest::prelude::*;

/// Snapshot from normalised knob positions, one per control.
fn snapshot_from_positions(positions: &[f32; 16]) -> ControlSnapshot {
    let mut snapshot = ControlSnapshot::default();
    for (i, desc) in CONTROL_LAYOUT.iter().enumerate() {
        snapshot.set(ControlId::ALL[i], desc.snap(desc.denormalize(positions[i])));
    }
    snapshot
}

fn in_unit(x: f32) -> bool {
    (0.0..=1.0).contains(&x)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any valid snapshot maps into the stage ranges.
    #[test]
    fn mapped_parameters_in_range(positions in prop::array::uniform16(0.0f32..=1.0f32)) {
        let mapped = ParameterMapper::default().map(&snapshot_from_positions(&positions));

        for reverb in [mapped.reverb1, mapped.reverb2] {
            prop_assert!(in_unit(reverb.room_size));
            prop_assert!(in_unit(reverb.damping));
            prop_assert!(in_unit(reverb.wet_level));
            prop_assert!(in_unit(reverb.dry_level));
            prop_assert!((0.0..=0.3 + 1e-6).contains(&reverb.freeze));
        }
        for pair in [mapped.chorus1, mapped.chorus2] {
            for chorus in [pair.left, pair.right] {
                prop_assert!(chorus.feedback.abs() <= 0.95);
                prop_assert!(in_unit(chorus.depth));
                prop_assert!((0.0..=20.0).contains(&chorus.rate));
                prop_assert!((0.0..=0.33 + 1e-6).contains(&chorus.mix));
            }
        }
        prop_assert!((20.0..=20000.0).contains(&mapped.lowpass_cutoff_hz));
        prop_assert!((20.0..=20000.0).contains(&mapped.highpass_cutoff_hz));
        prop_assert!(in_unit(mapped.dry_wet));
    }

    /// Arbitrary raw values, including out-of-range and non-finite ones,
    /// are clamped rather than trusted.
    #[test]
    fn raw_values_are_sanitised(
        raw in prop::array::uniform16(prop::num::f32::ANY),
    ) {
        let mut values = [0.0f32; CONTROL_COUNT];
        values.copy_from_slice(&raw[..CONTROL_COUNT]);
        let mapped = ParameterMapper::default().map(&ControlSnapshot::from_values(values));

        for reverb in [mapped.reverb1, mapped.reverb2] {
            prop_assert!(in_unit(reverb.room_size));
            prop_assert!(in_unit(reverb.dry_level));
            prop_assert!(in_unit(reverb.freeze));
        }
        for chorus in [mapped.chorus1.left, mapped.chorus2.right] {
            prop_assert!(chorus.rate.is_finite() && chorus.rate >= 0.0);
            prop_assert!(in_unit(chorus.mix));
        }
        prop_assert!(mapped.lowpass_cutoff_hz.is_finite());
        prop_assert!(mapped.highpass_cutoff_hz.is_finite());
    }

    /// Matched offsets always yield identical left/right parameters.
    #[test]
    fn matched_offsets_symmetric(positions in prop::array::uniform16(0.0f32..=1.0f32)) {
        let mapped = ParameterMapper::new(StereoOffsets::matched())
            .map(&snapshot_from_positions(&positions));
        prop_assert_eq!(mapped.chorus1.left, mapped.chorus1.right);
        prop_assert_eq!(mapped.chorus2.left, mapped.chorus2.right);
    }

    /// Random settings and random input never produce non-finite or
    /// runaway output.
    #[test]
    fn processor_output_finite(
        positions in prop::array::uniform16(0.0f32..=1.0f32),
        input in prop::array::uniform32(-1.0f32..=1.0f32),
        sample_rate in prop::sample::select(vec![22050.0f32, 44100.0, 48000.0, 96000.0]),
    ) {
        let snapshot = snapshot_from_positions(&positions);
        let mut processor = DualChannelProcessor::new();
        processor.prepare(ProcessorConfig::stereo(sample_rate, 128)).unwrap();

        for _ in 0..32 {
            let mut data: Vec<f32> = input.iter().cycle().take(256).copied().collect();
            processor.process_block(&mut AudioBlock::new(&mut data, 2), &snapshot);
            for &sample in &data {
                prop_assert!(sample.is_finite(), "non-finite output: {}", sample);
                prop_assert!(sample.abs() < 100.0, "runaway output: {}", sample);
            }
        }
    }
}
