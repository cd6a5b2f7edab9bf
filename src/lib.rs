//! # Halation
//!
//! A compute-shader bloom pyramid for wgpu HDR pipelines.
//!
//! Pixels above a luminance threshold are extracted from the rendered HDR
//! image, progressively downsampled into a pyramid of decreasing
//! resolutions, blurred at each level, then recombined bottom-up
//! (upsample + blend) into a single bloom buffer at a capped working
//! resolution. The crate publishes that buffer together with the composite
//! parameters (intensity, tint, lens-dirt transform) for a host-owned uber
//! pass to add back onto the source image.
//!
//! # Algorithm
//!
//! 1. **Extract**: threshold the HDR source and downsample into the first
//!    (largest) pyramid tier.
//! 2. **Downsample chain**: one dispatch expands tier 1 into the remaining
//!    tiers: {3,5} in low quality, {2,3,4,5} in high quality.
//! 3. **Blur/upsample chain**: blur the smallest tier, then repeatedly
//!    upsample-blend-blur from smaller to larger tiers until tier 1's "b"
//!    buffer holds the final bloom.
//!
//! # Usage
//!
//! ```rust,ignore
//! use halation::{BloomPipeline, BloomSettings, ScreenInfo};
//!
//! let mut bloom = BloomPipeline::new(&device, &queue);
//! let settings = BloomSettings::default();
//!
//! let output = bloom.render(
//!     &device, &queue, &mut encoder,
//!     &hdr_view, ScreenInfo::new(1920, 1080), &settings,
//! )?;
//!
//! // ... uber composite samples bloom.bloom_view(output.bloom) ...
//! bloom.release(output.bloom);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod chain;
pub mod dirt;
pub mod errors;
pub mod kernels;
pub mod passes;
pub mod pipeline;
pub mod pool;
pub mod settings;

pub use chain::{Extent, PyramidTier, QualityMode, Slot};
pub use dirt::DirtTexture;
pub use errors::{HalationError, Result};
pub use pipeline::{BloomFrameOutput, BloomPipeline, ScreenInfo};
pub use pool::{BLOOM_TEXTURE_FORMAT, BloomBufferPool, BufferHandle};
pub use settings::BloomSettings;
