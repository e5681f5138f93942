//! End-to-end scenarios for the dual-channel processor.

use mars_core::Stage;
use mars_effects::{
    AudioBlock, ChainStage, Channel, ControlId, ControlSnapshot, DualChannelProcessor,
    ParameterMapper, ParameterSource, ParameterStore, ProcessorConfig, StagePosition,
    StereoOffsets,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK: usize = 512;

fn prepared(offsets: StereoOffsets) -> DualChannelProcessor {
    let mut processor = DualChannelProcessor::with_stereo_offsets(offsets);
    processor
        .prepare(ProcessorConfig::stereo(SAMPLE_RATE, BLOCK))
        .unwrap();
    processor
}

/// Test program: two sines, one low and one high.
fn signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            0.4 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
                + 0.2 * (2.0 * std::f32::consts::PI * 3100.0 * t).sin()
        })
        .collect()
}

/// Feed the same signal to both channels, block by block.
fn run_blocks(
    processor: &mut DualChannelProcessor,
    snapshot: &ControlSnapshot,
    blocks: usize,
) -> (Vec<f32>, Vec<f32>) {
    let input = signal(BLOCK * blocks);
    let mut left = Vec::with_capacity(input.len());
    let mut right = Vec::with_capacity(input.len());
    for chunk in input.chunks(BLOCK) {
        let mut data = chunk.to_vec();
        data.extend_from_slice(chunk);

        let mut block = AudioBlock::new(&mut data, 2);
        processor.process_block(&mut block, snapshot);
        left.extend_from_slice(block.channel(0));
        right.extend_from_slice(block.channel(1));
    }
    (left, right)
}

#[test]
fn mapped_values_for_reference_scenario() {
    let store = ParameterStore::new();
    store.set(ControlId::Reverb1Amount, 0.5);
    store.set(ControlId::Reverb1Mix, 0.5);
    store.set(ControlId::MasterLowpass, 20000.0);
    store.set(ControlId::MasterHighpass, 20.0);

    let mapped = ParameterMapper::default().map(&store.snapshot());
    assert_eq!(mapped.reverb1.room_size, 0.5);
    assert_eq!(mapped.reverb1.wet_level, 0.5);
    assert_eq!(mapped.reverb1.dry_level, 0.5);
    assert_eq!(mapped.reverb1.damping, 0.33);
    assert!((mapped.reverb1.freeze - 0.15).abs() < 1e-6);
    assert!((mapped.chorus1.left.rate - 0.499).abs() < 1e-6);
    assert_eq!(mapped.chorus1.right.rate, 0.5);

    // Cross-wired cutoffs: "Low Cut" feeds the low-pass, "High Cut" the high-pass.
    assert_eq!(mapped.lowpass_cutoff_hz, 20.0);
    assert_eq!(mapped.highpass_cutoff_hz, 20000.0);
}

#[test]
fn cutoffs_reach_the_filter_stages() {
    let mut processor = prepared(StereoOffsets::default());
    let snapshot = ControlSnapshot::default()
        .with(ControlId::MasterHighpass, 20.0)
        .with(ControlId::MasterLowpass, 20000.0);
    let mut data = vec![0.0f32; 2 * BLOCK];
    processor.process_block(&mut AudioBlock::new(&mut data, 2), &snapshot);

    for channel in [Channel::Left, Channel::Right] {
        let chain = processor.chain(channel);
        match chain.stage(StagePosition::LowPass) {
            ChainStage::Filter(f) => assert_eq!(f.cutoff_hz(), 20.0),
            other => panic!("unexpected {:?}", other),
        }
        match chain.stage(StagePosition::HighPass) {
            ChainStage::Filter(f) => assert_eq!(f.cutoff_hz(), 20000.0),
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn silence_after_prepare_stays_silent() {
    let mut processor = prepared(StereoOffsets::default());
    let snapshot = ControlSnapshot::default()
        .with(ControlId::Reverb1Mix, 1.0)
        .with(ControlId::Reverb2Mix, 1.0)
        .with(ControlId::Reverb1Amount, 1.0);
    for _ in 0..16 {
        let mut data = vec![0.0f32; 2 * BLOCK];
        processor.process_block(&mut AudioBlock::new(&mut data, 2), &snapshot);
        assert!(data.iter().all(|&s| s == 0.0));
    }
}

#[test]
fn reprepare_discards_previous_state() {
    let snapshot = ControlSnapshot::default();

    let mut reused = prepared(StereoOffsets::default());
    let _ = run_blocks(&mut reused, &snapshot, 8);
    reused
        .prepare(ProcessorConfig::stereo(96000.0, BLOCK))
        .unwrap();

    // Silence immediately after re-prepare: nothing from the old stream leaks.
    let mut data = vec![0.0f32; 2 * BLOCK];
    reused.process_block(&mut AudioBlock::new(&mut data, 2), &snapshot);
    assert!(data.iter().all(|&s| s == 0.0));

    // And the re-prepared processor behaves exactly like a fresh one.
    let mut fresh = DualChannelProcessor::new();
    fresh
        .prepare(ProcessorConfig::stereo(96000.0, BLOCK))
        .unwrap();
    let mut data_fresh = vec![0.0f32; 2 * BLOCK];
    fresh.process_block(&mut AudioBlock::new(&mut data_fresh, 2), &snapshot);

    let a = run_blocks(&mut reused, &snapshot, 4);
    let b = run_blocks(&mut fresh, &snapshot, 4);
    assert_eq!(a, b);
}

#[test]
fn matched_offsets_give_bit_identical_channels() {
    let mut processor = prepared(StereoOffsets::matched());
    let snapshot = ControlSnapshot::default()
        .with(ControlId::Reverb1ModDepth, 0.8)
        .with(ControlId::Reverb1ModRate, 1.3);
    let (left, right) = run_blocks(&mut processor, &snapshot, 12);
    assert_eq!(left, right);
}

#[test]
fn default_offsets_decorrelate_channels() {
    let mut processor = prepared(StereoOffsets::default());
    let snapshot = ControlSnapshot::default();
    let (left, right) = run_blocks(&mut processor, &snapshot, 12);
    let max_diff = left
        .iter()
        .zip(&right)
        .map(|(l, r)| (l - r).abs())
        .fold(0.0f32, f32::max);
    assert!(max_diff > 1e-4, "channels identical: {}", max_diff);
}

#[test]
fn zero_reverb_mix_leaves_only_dry_diffusers() {
    // With both reverb mixes at zero the diffusers add nothing and the
    // modulated delays get mix 0, so the chain reduces to dry gains and the
    // (fully open) filters.
    let amount1 = 0.4;
    let amount2 = 0.8;
    let snapshot = ControlSnapshot::default()
        .with(ControlId::Reverb1Mix, 0.0)
        .with(ControlId::Reverb2Mix, 0.0)
        .with(ControlId::Reverb1Amount, amount1)
        .with(ControlId::Reverb2Amount, amount2)
        .with(ControlId::MasterHighpass, 20000.0)
        .with(ControlId::MasterLowpass, 20.0);

    let mapped = ParameterMapper::default().map(&snapshot);
    assert_eq!(mapped.reverb1.wet_level, 0.0);
    assert_eq!(mapped.chorus1.left.mix, 0.0);
    assert_eq!(mapped.chorus2.right.mix, 0.0);

    let mut processor = prepared(StereoOffsets::default());
    let (left, _) = run_blocks(&mut processor, &snapshot, 8);

    // Reference: the same dry gains followed by the same filters.
    let gain = (1.0 - amount1) * (1.0 - amount2);
    let mut reference = mars_effects::StageChain::new();
    reference.prepare(SAMPLE_RATE, BLOCK);
    reference.apply(&mapped, Channel::Left);
    let mut lowpass = match reference.stage(StagePosition::LowPass) {
        ChainStage::Filter(f) => f.clone(),
        other => panic!("unexpected {:?}", other),
    };
    let mut highpass = match reference.stage(StagePosition::HighPass) {
        ChainStage::Filter(f) => f.clone(),
        other => panic!("unexpected {:?}", other),
    };

    let expected: Vec<f32> = signal(BLOCK * 8)
        .into_iter()
        .map(|x| highpass.process_sample(lowpass.process_sample(x * gain)))
        .collect();

    for (i, (got, want)) in left.iter().zip(&expected).enumerate() {
        assert!((got - want).abs() < 1e-4, "sample {}: {} vs {}", i, got, want);
    }
}

#[test]
fn store_and_snapshot_sources_agree() {
    let store = ParameterStore::new();
    store.set(ControlId::Reverb2Mix, 0.8);
    store.set(ControlId::MasterDryWet, 0.6);
    let snapshot = store.snapshot();

    let mut via_store = prepared(StereoOffsets::default());
    let mut via_snapshot = prepared(StereoOffsets::default());

    let mut a = signal(BLOCK);
    a.extend(signal(BLOCK));
    let mut b = a.clone();
    via_store.process_with(&mut AudioBlock::new(&mut a, 2), &store);
    via_snapshot.process_with(&mut AudioBlock::new(&mut b, 2), &snapshot);
    assert_eq!(a, b);
}
