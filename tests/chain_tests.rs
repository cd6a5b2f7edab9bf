//! Pyramid Chain Tests
//!
//! Tests for:
//! - base resolution rule: breakpoint caps, monotonicity, half-resolution
//! - tier sets and extents per quality mode
//! - buffer acquire/release schedules (terminal buffer excluded)
//! - blur/upsample chain sequencing and blend factor compensation

use halation::chain::{
    ChainStep, Extent, acquire_schedule, base_resolution, chain_blend_factor, chain_sequence,
    dispatch_size, release_schedule, step_blend_factor, tier_extent,
};
use halation::{HalationError, PyramidTier, QualityMode, Slot};

const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Resolution Rule
// ============================================================================

#[test]
fn standard_screen_uses_640x384_base() {
    let base = base_resolution(Extent::new(1920, 1080), false).unwrap();
    assert_eq!(base, Extent::new(640, 384));
}

#[test]
fn large_screen_uses_1280x768_base() {
    let base = base_resolution(Extent::new(3840, 2160), false).unwrap();
    assert_eq!(base, Extent::new(1280, 768));
}

#[test]
fn breakpoints_are_exclusive() {
    // Exactly at the breakpoints the small caps still apply.
    let base = base_resolution(Extent::new(2560, 1440), false).unwrap();
    assert_eq!(base, Extent::new(640, 384));
    let base = base_resolution(Extent::new(2561, 1441), false).unwrap();
    assert_eq!(base, Extent::new(1280, 768));
}

#[test]
fn axes_break_independently() {
    // Ultrawide: wide width cap, standard height cap.
    let base = base_resolution(Extent::new(3440, 1440), false).unwrap();
    assert_eq!(base, Extent::new(1280, 384));
}

#[test]
fn base_width_is_monotonic_in_screen_width() {
    let mut last = 0;
    for width in [320, 640, 1280, 1920, 2560, 2561, 3840, 7680] {
        let base = base_resolution(Extent::new(width, 1080), false).unwrap();
        assert!(
            base.width >= last,
            "base width regressed at screen width {width}"
        );
        last = base.width;
    }
}

#[test]
fn half_resolution_mode_halves_the_caps() {
    let base = base_resolution(Extent::new(1920, 1080), true).unwrap();
    assert_eq!(base, Extent::new(320, 192));
}

#[test]
fn degenerate_screen_is_a_configuration_error() {
    let err = base_resolution(Extent::new(0, 0), false).unwrap_err();
    assert!(matches!(
        err,
        HalationError::InvalidDimensions {
            width: 0,
            height: 0
        }
    ));
}

// ============================================================================
// Tier Extents
// ============================================================================

#[test]
fn tier_extents_follow_the_divisor_table() {
    let base = Extent::new(640, 384);
    let expected = [
        (PyramidTier::Tier1, 640, 384),
        (PyramidTier::Tier2, 320, 192),
        (PyramidTier::Tier3, 160, 96),
        (PyramidTier::Tier4, 80, 48),
        (PyramidTier::Tier5, 40, 24),
    ];
    for (tier, width, height) in expected {
        assert_eq!(tier_extent(base, tier), Extent::new(width, height));
    }
}

#[test]
fn dispatch_grid_covers_every_tier_exactly() {
    // The fixed caps divide evenly down to tier 5 for both cap pairs.
    for base in [Extent::new(640, 384), Extent::new(1280, 768)] {
        for tier in PyramidTier::ALL {
            let extent = tier_extent(base, tier);
            let (gx, gy) = dispatch_size(extent);
            assert_eq!(gx * 8, extent.width, "{tier:?} width not group-aligned");
            assert_eq!(gy * 8, extent.height, "{tier:?} height not group-aligned");
        }
    }
}

// ============================================================================
// Tier Sets & Buffer Lifetimes
// ============================================================================

#[test]
fn low_quality_uses_tiers_1_3_5() {
    assert_eq!(
        QualityMode::Low.tiers(),
        &[PyramidTier::Tier1, PyramidTier::Tier3, PyramidTier::Tier5]
    );
    assert_eq!(QualityMode::Low.octaves(), 3);
}

#[test]
fn high_quality_uses_all_five_tiers() {
    assert_eq!(QualityMode::High.tiers(), &PyramidTier::ALL);
    assert_eq!(QualityMode::High.octaves(), 5);
}

#[test]
fn acquire_schedule_is_tier_set_times_both_slots() {
    for quality in [QualityMode::Low, QualityMode::High] {
        let acquires = acquire_schedule(quality);
        assert_eq!(acquires.len(), quality.tiers().len() * 2);
        for &tier in quality.tiers() {
            assert!(acquires.contains(&(tier, Slot::A)));
            assert!(acquires.contains(&(tier, Slot::B)));
        }
        // No tier outside the mode's set is ever allocated.
        for &(tier, _) in &acquires {
            assert!(quality.tiers().contains(&tier));
        }
    }
}

#[test]
fn release_schedule_keeps_only_the_terminal_buffer() {
    for quality in [QualityMode::Low, QualityMode::High] {
        let acquires = acquire_schedule(quality);
        let releases = release_schedule(quality);
        assert_eq!(releases.len(), acquires.len() - 1);
        assert!(!releases.contains(&(PyramidTier::Tier1, Slot::B)));
        for pair in &releases {
            assert!(acquires.contains(pair));
        }
    }
}

// ============================================================================
// Chain Sequencing
// ============================================================================

#[test]
fn high_quality_chain_walks_every_tier_upward() {
    let seq = chain_sequence(QualityMode::High);
    let expected = [
        (PyramidTier::Tier5, PyramidTier::Tier5),
        (PyramidTier::Tier4, PyramidTier::Tier5),
        (PyramidTier::Tier3, PyramidTier::Tier4),
        (PyramidTier::Tier2, PyramidTier::Tier3),
        (PyramidTier::Tier1, PyramidTier::Tier2),
    ];
    assert_eq!(seq.len(), expected.len());
    for (step, (tier, lower)) in seq.iter().zip(expected) {
        assert_eq!((step.tier, step.lower), (tier, lower));
    }
}

#[test]
fn low_quality_chain_skips_even_tiers() {
    let seq = chain_sequence(QualityMode::Low);
    let expected = [
        (PyramidTier::Tier5, PyramidTier::Tier5),
        (PyramidTier::Tier3, PyramidTier::Tier5),
        (PyramidTier::Tier1, PyramidTier::Tier3),
    ];
    assert_eq!(seq.len(), expected.len());
    for (step, (tier, lower)) in seq.iter().zip(expected) {
        assert_eq!((step.tier, step.lower), (tier, lower));
    }
}

#[test]
fn chain_terminates_at_tier_1() {
    for quality in [QualityMode::Low, QualityMode::High] {
        let seq = chain_sequence(quality);
        assert_eq!(seq.last().unwrap().tier, PyramidTier::Tier1);
    }
}

#[test]
fn only_the_first_step_is_a_seed() {
    for quality in [QualityMode::Low, QualityMode::High] {
        let seq = chain_sequence(quality);
        assert!(seq[0].is_seed());
        assert!(seq[1..].iter().all(|s| !s.is_seed()));
    }
}

#[test]
fn seed_step_always_blends_at_one() {
    let seed = ChainStep {
        tier: PyramidTier::Tier5,
        lower: PyramidTier::Tier5,
    };
    assert!(approx(step_blend_factor(seed, 0.2), 1.0));
    assert!(approx(step_blend_factor(seed, 0.9), 1.0));
}

// ============================================================================
// Blend Factor Compensation
// ============================================================================

#[test]
fn high_quality_passes_the_configured_factor_through() {
    assert!(approx(chain_blend_factor(QualityMode::High, 0.65), 0.65));
}

#[test]
fn low_quality_prescales_by_two_thirds() {
    let factor = chain_blend_factor(QualityMode::Low, 0.65);
    assert!(approx(factor, 0.65 * 2.0 / 3.0));

    // The compensation reaches every non-seed step unchanged.
    for &step in &chain_sequence(QualityMode::Low)[1..] {
        assert!(approx(step_blend_factor(step, factor), 0.65 * 2.0 / 3.0));
    }
}

// ============================================================================
// Downsample Outputs
// ============================================================================

#[test]
fn downsample_outputs_match_the_mode() {
    assert_eq!(
        QualityMode::Low.downsample_outputs(),
        &[PyramidTier::Tier3, PyramidTier::Tier5]
    );
    assert_eq!(
        QualityMode::High.downsample_outputs(),
        &[
            PyramidTier::Tier2,
            PyramidTier::Tier3,
            PyramidTier::Tier4,
            PyramidTier::Tier5,
        ]
    );
}
