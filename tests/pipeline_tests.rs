//! Published Parameter Tests
//!
//! Tests for:
//! - composite parameter vector: intensity curve, dirt intensity slot
//! - linear tint conversion
//! - dirt tile transform letterboxing
//! - end-to-end scenarios A (1080p low) and B (4K high) on the CPU-side
//!   pipeline state, and determinism of the published parameters

use glam::{Vec3, Vec4};

use halation::chain::{Extent, acquire_schedule, base_resolution, chain_blend_factor};
use halation::dirt::dirt_tile_transform;
use halation::pipeline::{ScreenInfo, composite_params};
use halation::{BloomSettings, PyramidTier, QualityMode};

const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Composite Parameters
// ============================================================================

#[test]
fn zero_strength_publishes_zero_intensity() {
    let mut settings = BloomSettings::default();
    settings.set_strength(0.0);
    let params = composite_params(&settings);
    assert_eq!(params.x, 1.0);
    assert_eq!(params.y, 0.0);
    assert_eq!(params.w, 1.0);
}

#[test]
fn intensity_is_strictly_increasing_in_strength() {
    let mut settings = BloomSettings::default();
    let mut last = f32::MIN;
    for strength in [0.0, 0.01, 0.1, 0.5, 1.0, 4.0, 10.0] {
        settings.set_strength(strength);
        let intensity = composite_params(&settings).y;
        assert!(intensity > last, "intensity not increasing at {strength}");
        last = intensity;
    }
}

#[test]
fn dirt_intensity_occupies_the_third_slot() {
    let mut settings = BloomSettings::default();
    settings.set_dirt_intensity(0.75);
    assert_eq!(composite_params(&settings).z, 0.75);
}

// ============================================================================
// Tint
// ============================================================================

#[test]
fn default_white_tint_is_linear_white() {
    let settings = BloomSettings::default();
    assert_eq!(settings.linear_tint(), Vec4::ONE);
}

#[test]
fn tint_channels_convert_independently() {
    let mut settings = BloomSettings::default();
    settings.tint = Vec3::new(1.0, 0.5, 0.0);
    let linear = settings.linear_tint();
    assert_eq!(linear.x, 1.0);
    assert!((linear.y - 0.214_041_14).abs() < 1e-5);
    assert_eq!(linear.z, 0.0);
    assert_eq!(linear.w, 1.0);
}

// ============================================================================
// Dirt Tile Transform
// ============================================================================

#[test]
fn square_dirt_on_widescreen_letterboxes_vertically() {
    let screen = ScreenInfo::new(1920, 1080);
    let t = dirt_tile_transform(1.0, screen.aspect_ratio());
    assert_eq!(t.x, 1.0);
    assert!(approx(t.y, 1080.0 / 1920.0));
    assert_eq!(t.z, 0.0);
    assert!(approx(t.w, (1.0 - 1080.0 / 1920.0) * 0.5));
}

#[test]
fn matching_aspect_is_identity() {
    let screen = ScreenInfo::new(1920, 1080);
    let t = dirt_tile_transform(16.0 / 9.0, screen.aspect_ratio());
    assert!(approx(t.x, 1.0) && approx(t.y, 1.0));
    assert!(approx(t.z, 0.0) && approx(t.w, 0.0));
}

// ============================================================================
// Scenario A: 1920x1080, low quality
// ============================================================================

#[test]
fn scenario_a_1080p_low_quality() {
    let mut settings = BloomSettings::default();
    settings.high_quality = false;
    settings.set_threshold(1.0);
    settings.set_strength(0.1);
    settings.set_upsample_factor(0.65);

    let screen = ScreenInfo::new(1920, 1080);
    let base = base_resolution(screen.scaled(), settings.half_resolution).unwrap();
    assert_eq!(base, Extent::new(640, 384));

    let quality = settings.quality();
    assert_eq!(quality, QualityMode::Low);
    let tiers: Vec<PyramidTier> = acquire_schedule(quality).iter().map(|&(t, _)| t).collect();
    assert!(tiers.contains(&PyramidTier::Tier1));
    assert!(tiers.contains(&PyramidTier::Tier3));
    assert!(tiers.contains(&PyramidTier::Tier5));
    assert!(!tiers.contains(&PyramidTier::Tier2));
    assert!(!tiers.contains(&PyramidTier::Tier4));

    // intensity = 2^(0.1/10) - 1
    let intensity = composite_params(&settings).y;
    assert!((intensity - 0.006_955_5).abs() < 1e-5);
}

// ============================================================================
// Scenario B: 3840x2160, high quality
// ============================================================================

#[test]
fn scenario_b_4k_high_quality() {
    let mut settings = BloomSettings::default();
    settings.high_quality = true;

    let screen = ScreenInfo::new(3840, 2160);
    let base = base_resolution(screen.scaled(), settings.half_resolution).unwrap();
    assert_eq!(base, Extent::new(1280, 768));

    let tiers: Vec<PyramidTier> = acquire_schedule(settings.quality())
        .iter()
        .map(|&(t, _)| t)
        .collect();
    for tier in PyramidTier::ALL {
        assert!(tiers.contains(&tier), "{tier:?} missing in high quality");
    }
}

// ============================================================================
// Dynamic Resolution
// ============================================================================

#[test]
fn scale_factor_applies_before_the_breakpoints() {
    // A 4K screen rendered at half scale falls back to the small caps.
    let screen = ScreenInfo::with_scale(3840, 2160, 0.5);
    assert_eq!(screen.scaled(), Extent::new(1920, 1080));
    let base = base_resolution(screen.scaled(), false).unwrap();
    assert_eq!(base, Extent::new(640, 384));
}

#[test]
fn dirt_aspect_uses_the_native_screen_size() {
    // Scaling must not move the dirt letterbox.
    let native = ScreenInfo::new(3840, 2160);
    let scaled = ScreenInfo::with_scale(3840, 2160, 0.5);
    assert_eq!(native.aspect_ratio(), scaled.aspect_ratio());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn published_parameters_are_deterministic() {
    let mut settings = BloomSettings::default();
    settings.set_strength(0.37);
    settings.set_dirt_intensity(1.25);
    settings.tint = Vec3::new(0.9, 0.8, 1.0);

    let screen = ScreenInfo::new(2560, 1440);
    let runs: Vec<(Vec4, Vec4, Vec4, f32)> = (0..2)
        .map(|_| {
            (
                composite_params(&settings),
                settings.linear_tint(),
                dirt_tile_transform(2.0, screen.aspect_ratio()),
                chain_blend_factor(settings.quality(), settings.upsample_factor()),
            )
        })
        .collect();
    assert_eq!(runs[0].0, runs[1].0);
    assert_eq!(runs[0].1, runs[1].1);
    assert_eq!(runs[0].2, runs[1].2);
    assert!((runs[0].3 - runs[1].3).abs() == 0.0);
}
