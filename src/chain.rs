//! Pyramid Chain Topology
//!
//! Pure bookkeeping for the bloom pyramid: tier identities and extents, the
//! quality-mode tier sets, the pass sequencing for the blur/upsample chain,
//! and the buffer acquire/release schedule. Nothing in this module touches
//! the GPU; [`crate::pipeline::BloomPipeline`] drives dispatches from the
//! sequences computed here.
//!
//! # Tier layout
//!
//! The pyramid has five fixed resolution tiers, each a fraction of the bloom
//! base resolution (itself capped independently of the display resolution):
//!
//! | Tier | Divisor | At 640x384 base |
//! |------|---------|-----------------|
//! | 1    | 1       | 640x384         |
//! | 2    | 2       | 320x192         |
//! | 3    | 4       | 160x96          |
//! | 4    | 8       | 80x48           |
//! | 5    | 16      | 40x24           |
//!
//! Low quality sums 3 octaves over tiers {1,3,5} with a 4x frequency stride;
//! high quality sums 5 octaves over all tiers with a 2x stride.

use serde::{Deserialize, Serialize};

use crate::errors::{HalationError, Result};

/// Thread-group edge length for every compute kernel in the pipeline.
pub const WORKGROUP_SIZE: u32 = 8;

/// Base-resolution width cap for ordinary displays.
pub const BASE_WIDTH: u32 = 640;
/// Base-resolution width cap for very wide displays.
pub const WIDE_BASE_WIDTH: u32 = 1280;
/// Screen width above which the wide cap applies.
pub const WIDTH_BREAKPOINT: u32 = 2560;

/// Base-resolution height cap for ordinary displays.
pub const BASE_HEIGHT: u32 = 384;
/// Base-resolution height cap for tall displays.
pub const TALL_BASE_HEIGHT: u32 = 768;
/// Screen height above which the tall cap applies.
pub const HEIGHT_BREAKPOINT: u32 = 1440;

/// Low quality strides 4x between octaves instead of 2x, so its upsample
/// blend factor is pre-scaled by this calibrated constant to keep the
/// perceived bloom spread comparable with high quality. Preserved verbatim;
/// not a formula to re-derive.
pub const LOW_QUALITY_BLEND_COMPENSATION: f32 = 2.0 / 3.0;

// ─── Tiers & Slots ────────────────────────────────────────────────────────────

/// One resolution level of the bloom pyramid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PyramidTier {
    /// Full bloom base resolution.
    Tier1,
    /// Half base resolution (high quality only).
    Tier2,
    /// Quarter base resolution.
    Tier3,
    /// Eighth base resolution (high quality only).
    Tier4,
    /// Sixteenth base resolution.
    Tier5,
}

impl PyramidTier {
    /// All tiers, largest first.
    pub const ALL: [PyramidTier; 5] = [
        PyramidTier::Tier1,
        PyramidTier::Tier2,
        PyramidTier::Tier3,
        PyramidTier::Tier4,
        PyramidTier::Tier5,
    ];

    /// Fixed divisor of the bloom base resolution for this tier.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            PyramidTier::Tier1 => 1,
            PyramidTier::Tier2 => 2,
            PyramidTier::Tier3 => 4,
            PyramidTier::Tier4 => 8,
            PyramidTier::Tier5 => 16,
        }
    }

    /// Zero-based index into per-tier arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PyramidTier::Tier1 => 0,
            PyramidTier::Tier2 => 1,
            PyramidTier::Tier3 => 2,
            PyramidTier::Tier4 => 3,
            PyramidTier::Tier5 => 4,
        }
    }
}

/// One of the two buffers owned by each tier.
///
/// Invariant: within a frame, a tier's `B` buffer is never read before its
/// `A` buffer (or the downsample source) has been written.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Slot {
    /// Downsample target, read by the blur/upsample chain.
    A,
    /// Blur/upsample target; tier 1's `B` is the published bloom buffer.
    B,
}

impl Slot {
    /// Zero-based index into per-slot arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

// ─── Quality Mode ─────────────────────────────────────────────────────────────

/// Pyramid depth selector, fixed per invocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum QualityMode {
    /// 3 octaves over tiers {1,3,5}, 4x frequency stride.
    #[default]
    Low,
    /// 5 octaves over all tiers, 2x frequency stride.
    High,
}

impl QualityMode {
    /// The tiers this mode allocates and processes. No tier outside this
    /// set is ever acquired.
    #[must_use]
    pub const fn tiers(self) -> &'static [PyramidTier] {
        match self {
            QualityMode::Low => &[PyramidTier::Tier1, PyramidTier::Tier3, PyramidTier::Tier5],
            QualityMode::High => &PyramidTier::ALL,
        }
    }

    /// Number of blur octaves summed by this mode.
    #[must_use]
    pub const fn octaves(self) -> u32 {
        match self {
            QualityMode::Low => 3,
            QualityMode::High => 5,
        }
    }

    /// Tiers whose `A` buffers the secondary downsample dispatch writes.
    /// Tier 1 is produced earlier by the extract pass and is the dispatch
    /// input, never an output.
    #[must_use]
    pub const fn downsample_outputs(self) -> &'static [PyramidTier] {
        match self {
            QualityMode::Low => &[PyramidTier::Tier3, PyramidTier::Tier5],
            QualityMode::High => &[
                PyramidTier::Tier2,
                PyramidTier::Tier3,
                PyramidTier::Tier4,
                PyramidTier::Tier5,
            ],
        }
    }
}

// ─── Extents & Resolution Rule ────────────────────────────────────────────────

/// Integer texture extent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Byte size of one `Rgba16Float` buffer at this extent.
    #[must_use]
    pub const fn byte_size(self) -> u64 {
        self.width as u64 * self.height as u64 * 8
    }
}

/// Derives the bloom base resolution (tier 1) from the scale-adjusted screen
/// size. The caps keep compute cost bounded independent of display
/// resolution; `half_resolution` further halves both axes for
/// resource-constrained targets.
///
/// A degenerate screen size is a configuration error.
pub fn base_resolution(screen: Extent, half_resolution: bool) -> Result<Extent> {
    if screen.width == 0 || screen.height == 0 {
        return Err(HalationError::InvalidDimensions {
            width: screen.width,
            height: screen.height,
        });
    }

    let mut width = if screen.width > WIDTH_BREAKPOINT {
        WIDE_BASE_WIDTH
    } else {
        BASE_WIDTH
    };
    let mut height = if screen.height > HEIGHT_BREAKPOINT {
        TALL_BASE_HEIGHT
    } else {
        BASE_HEIGHT
    };

    if half_resolution {
        width /= 2;
        height /= 2;
    }

    Ok(Extent::new(width, height))
}

/// Extent of one pyramid tier for a given base resolution.
#[must_use]
pub fn tier_extent(base: Extent, tier: PyramidTier) -> Extent {
    let d = tier.divisor();
    Extent::new(base.width / d, base.height / d)
}

/// Thread-group grid covering `extent` with 8x8 groups.
#[must_use]
pub fn dispatch_size(extent: Extent) -> (u32, u32) {
    (
        extent.width.div_ceil(WORKGROUP_SIZE),
        extent.height.div_ceil(WORKGROUP_SIZE),
    )
}

// ─── Buffer Lifetimes ─────────────────────────────────────────────────────────

/// The (tier, slot) pairs acquired at the start of an invocation, in
/// acquisition order.
#[must_use]
pub fn acquire_schedule(quality: QualityMode) -> Vec<(PyramidTier, Slot)> {
    quality
        .tiers()
        .iter()
        .flat_map(|&tier| [(tier, Slot::A), (tier, Slot::B)])
        .collect()
}

/// The (tier, slot) pairs released at the end of an invocation: everything
/// acquired except tier 1's `B` buffer, whose ownership transfers to the
/// external compositor.
#[must_use]
pub fn release_schedule(quality: QualityMode) -> Vec<(PyramidTier, Slot)> {
    acquire_schedule(quality)
        .into_iter()
        .filter(|&(tier, slot)| !(tier == PyramidTier::Tier1 && slot == Slot::B))
        .collect()
}

// ─── Blur / Upsample Sequencing ───────────────────────────────────────────────

/// One step of the blur/upsample chain: blur `tier`'s `A` content into its
/// `B` buffer, blending in the already-processed `lower` tier's `B` result.
///
/// The innermost step names itself as `lower`: there is no smaller tier
/// yet, so the pure-blur kernel runs with the blend factor pinned to 1.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChainStep {
    /// The tier being produced this step.
    pub tier: PyramidTier,
    /// The smaller, already-blurred tier feeding the upsample. Equal to
    /// `tier` only on the seed step.
    pub lower: PyramidTier,
}

impl ChainStep {
    /// Whether this is the degenerate innermost step (no smaller tier's
    /// result available; pure blur).
    #[must_use]
    pub const fn is_seed(self) -> bool {
        self.tier as u32 == self.lower as u32
    }
}

/// The blur/upsample chain for a quality mode, smallest tier first.
/// The terminal step leaves the final bloom in tier 1's `B` buffer.
#[must_use]
pub const fn chain_sequence(quality: QualityMode) -> &'static [ChainStep] {
    match quality {
        QualityMode::Low => &[
            ChainStep {
                tier: PyramidTier::Tier5,
                lower: PyramidTier::Tier5,
            },
            ChainStep {
                tier: PyramidTier::Tier3,
                lower: PyramidTier::Tier5,
            },
            ChainStep {
                tier: PyramidTier::Tier1,
                lower: PyramidTier::Tier3,
            },
        ],
        QualityMode::High => &[
            ChainStep {
                tier: PyramidTier::Tier5,
                lower: PyramidTier::Tier5,
            },
            ChainStep {
                tier: PyramidTier::Tier4,
                lower: PyramidTier::Tier5,
            },
            ChainStep {
                tier: PyramidTier::Tier3,
                lower: PyramidTier::Tier4,
            },
            ChainStep {
                tier: PyramidTier::Tier2,
                lower: PyramidTier::Tier3,
            },
            ChainStep {
                tier: PyramidTier::Tier1,
                lower: PyramidTier::Tier2,
            },
        ],
    }
}

/// The upsample blend factor actually fed to the chain's non-seed steps.
/// High quality passes the configured factor through; low quality
/// pre-scales it by [`LOW_QUALITY_BLEND_COMPENSATION`].
#[must_use]
pub fn chain_blend_factor(quality: QualityMode, configured: f32) -> f32 {
    match quality {
        QualityMode::Low => configured * LOW_QUALITY_BLEND_COMPENSATION,
        QualityMode::High => configured,
    }
}

/// Blend factor for a single chain step: the seed step always blurs with
/// factor 1 (no upsample contribution), every other step uses the chain
/// factor.
#[must_use]
pub fn step_blend_factor(step: ChainStep, chain_factor: f32) -> f32 {
    if step.is_seed() { 1.0 } else { chain_factor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_table_matches_tier_layout() {
        let divisors: Vec<u32> = PyramidTier::ALL.iter().map(|t| t.divisor()).collect();
        assert_eq!(divisors, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn base_resolution_rejects_degenerate_screen() {
        assert!(base_resolution(Extent::new(0, 1080), false).is_err());
        assert!(base_resolution(Extent::new(1920, 0), false).is_err());
    }

    #[test]
    fn half_resolution_halves_both_axes() {
        let full = base_resolution(Extent::new(1920, 1080), false).unwrap();
        let half = base_resolution(Extent::new(1920, 1080), true).unwrap();
        assert_eq!(half.width, full.width / 2);
        assert_eq!(half.height, full.height / 2);
    }

    #[test]
    fn dispatch_size_rounds_up() {
        assert_eq!(dispatch_size(Extent::new(640, 384)), (80, 48));
        assert_eq!(dispatch_size(Extent::new(40, 24)), (5, 3));
        assert_eq!(dispatch_size(Extent::new(41, 25)), (6, 4));
    }

    #[test]
    fn seed_step_names_itself_as_lower() {
        for quality in [QualityMode::Low, QualityMode::High] {
            let seq = chain_sequence(quality);
            assert!(seq[0].is_seed());
            assert!(seq[1..].iter().all(|s| !s.is_seed()));
        }
    }
}
