//! Bloom Settings
//!
//! Pure-data configuration for the bloom pipeline. Parameters mirror the
//! effect's user-facing surface: a luminance threshold, an exponential
//! strength, the upsample "focus" factor, a tint color, and lens dirt
//! intensity. Setters clamp into the documented ranges; the struct carries
//! no GPU state, so it serializes cleanly.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::chain::QualityMode;

/// Upper bound of the bloom threshold range.
pub const MAX_THRESHOLD: f32 = 8.0;

/// Bloom pipeline configuration.
///
/// # Usage
///
/// ```rust
/// use halation::BloomSettings;
///
/// let mut settings = BloomSettings::default();
/// settings.set_strength(0.2);
/// settings.set_upsample_factor(0.5);
/// settings.high_quality = true;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Whether the effect runs at all. The host framework is expected to
    /// skip the pipeline entirely when this is false.
    pub enabled: bool,

    /// High quality blurs 5 octaves of bloom; low quality only blurs 3.
    pub high_quality: bool,

    /// Halve the bloom working resolution for resource-constrained targets.
    pub half_resolution: bool,

    /// Global tint of the bloom, as an sRGB-encoded HDR color. Published to
    /// the compositor in linear space.
    pub tint: Vec3,

    /// The threshold luminance above which a pixel will start to bloom.
    /// Range [0, 8].
    threshold: f32,

    /// A modulator controlling how much bloom is added back into the image.
    /// Non-negative; converted to an exponential intensity gain.
    strength: f32,

    /// Controls the "focus" of the blur. High values spread out more,
    /// causing a haze. Range [0, 1].
    upsample_factor: f32,

    /// The intensity of the lens dirtiness. Non-negative.
    dirt_intensity: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            high_quality: false,
            half_resolution: false,
            tint: Vec3::ONE,
            threshold: 1.0,
            strength: 0.1,
            upsample_factor: 0.65,
            dirt_intensity: 0.0,
        }
    }
}

impl BloomSettings {
    /// Creates settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The pyramid depth this configuration selects.
    #[must_use]
    pub fn quality(&self) -> QualityMode {
        if self.high_quality {
            QualityMode::High
        } else {
            QualityMode::Low
        }
    }

    /// Returns the luminance cutoff.
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Sets the luminance cutoff, clamped to [0, 8].
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.0, MAX_THRESHOLD);
    }

    /// Returns the bloom strength.
    #[inline]
    #[must_use]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Sets the bloom strength. Negative values clamp to zero.
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength.max(0.0);
    }

    /// Returns the upsample blend factor.
    #[inline]
    #[must_use]
    pub fn upsample_factor(&self) -> f32 {
        self.upsample_factor
    }

    /// Sets the upsample blend factor, clamped to [0, 1].
    pub fn set_upsample_factor(&mut self, factor: f32) {
        self.upsample_factor = factor.clamp(0.0, 1.0);
    }

    /// Returns the lens dirt intensity.
    #[inline]
    #[must_use]
    pub fn dirt_intensity(&self) -> f32 {
        self.dirt_intensity
    }

    /// Sets the lens dirt intensity. Negative values clamp to zero.
    pub fn set_dirt_intensity(&mut self, intensity: f32) {
        self.dirt_intensity = intensity.max(0.0);
    }

    /// The additive intensity published to the compositor:
    /// `exp2(strength / 10) - 1`. Zero strength contributes nothing;
    /// growth is exponential thereafter.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        (self.strength / 10.0).exp2() - 1.0
    }

    /// The tint converted to linear space, with unit alpha, ready to bind
    /// as a uniform.
    #[must_use]
    pub fn linear_tint(&self) -> Vec4 {
        let t = self.tint;
        Vec4::new(
            srgb_to_linear(t.x),
            srgb_to_linear(t.y),
            srgb_to_linear(t.z),
            1.0,
        )
    }
}

/// One sRGB channel to linear.
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_into_range() {
        let mut s = BloomSettings::default();
        s.set_threshold(100.0);
        assert_eq!(s.threshold(), MAX_THRESHOLD);
        s.set_threshold(-1.0);
        assert_eq!(s.threshold(), 0.0);
        s.set_strength(-0.5);
        assert_eq!(s.strength(), 0.0);
        s.set_upsample_factor(1.5);
        assert_eq!(s.upsample_factor(), 1.0);
        s.set_dirt_intensity(-2.0);
        assert_eq!(s.dirt_intensity(), 0.0);
    }

    #[test]
    fn zero_strength_adds_no_intensity() {
        let mut s = BloomSettings::default();
        s.set_strength(0.0);
        assert_eq!(s.intensity(), 0.0);
    }

    #[test]
    fn intensity_is_strictly_increasing() {
        let mut s = BloomSettings::default();
        let mut last = -1.0_f32;
        for strength in [0.0, 0.05, 0.1, 0.5, 1.0, 2.0, 8.0] {
            s.set_strength(strength);
            assert!(
                s.intensity() > last,
                "intensity({strength}) = {} not above {last}",
                s.intensity()
            );
            last = s.intensity();
        }
    }

    #[test]
    fn white_tint_stays_white_in_linear() {
        let s = BloomSettings::default();
        assert_eq!(s.linear_tint(), Vec4::ONE);
    }

    #[test]
    fn mid_grey_tint_converts_to_linear() {
        let mut s = BloomSettings::default();
        s.tint = Vec3::splat(0.5);
        let linear = s.linear_tint();
        assert!((linear.x - 0.214_041_14).abs() < 1e-5);
        assert_eq!(linear.w, 1.0);
    }

    #[test]
    fn settings_round_trip_through_serde() {
        let mut s = BloomSettings::default();
        s.high_quality = true;
        s.set_strength(0.3);
        s.tint = Vec3::new(1.0, 0.9, 0.8);
        let json = serde_json::to_string(&s).unwrap();
        let back: BloomSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
