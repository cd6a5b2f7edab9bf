//! Pyramid Orchestrator
//!
//! Drives one bloom invocation per frame: derives the bloom base resolution
//! from the screen size, acquires the tier buffers for the active quality
//! mode, encodes extract → downsample chain → blur/upsample chain in
//! program order on the caller's command encoder, releases every buffer
//! except the terminal tier-1 "b", and publishes that buffer plus the
//! composite parameters for the external uber pass.
//!
//! # Data Flow
//!
//! ```text
//! HDR source ──► ExtractDownsample ──► tier1.a
//!                                        │
//!                    DownsampleChain ◄───┘ (one dispatch)
//!                        │
//!            tiers {3,5} or {2,3,4,5} "a"
//!                        │
//!              BlurUpsampleChain (smallest → largest)
//!                        │
//!                     tier1.b ──► published to the uber compositor
//! ```
//!
//! Dispatches within one invocation execute in issue order on the single
//! command stream; no explicit fences are needed for the intra-frame
//! read-after-write dependencies.

use glam::Vec4;

use crate::chain::{
    self, Extent, PyramidTier, Slot, acquire_schedule, chain_blend_factor, chain_sequence,
    release_schedule, step_blend_factor, tier_extent,
};
use crate::dirt::{DirtTexture, dirt_tile_transform};
use crate::errors::Result;
use crate::passes::{BlurUpsamplePass, DownsampleChainPass, ExtractDownsamplePass};
use crate::pool::{BloomBufferPool, BufferHandle};
use crate::settings::BloomSettings;

/// Screen dimensions for one invocation.
///
/// `width`/`height` are the native display size; `scale` is the dynamic
/// resolution factor applied before the base-resolution breakpoints. The
/// lens dirt aspect ratio is compared against the native size, so dirt
/// letterboxing does not shift when dynamic resolution changes.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl ScreenInfo {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn with_scale(width: u32, height: u32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// The scale-adjusted size the bloom resolution rule sees.
    #[must_use]
    pub fn scaled(self) -> Extent {
        Extent::new(
            (self.width as f32 * self.scale) as u32,
            (self.height as f32 * self.scale) as u32,
        )
    }

    /// Native width over height.
    #[must_use]
    pub fn aspect_ratio(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Everything the external uber compositor needs from one invocation.
pub struct BloomFrameOutput {
    /// The terminal tier-1 "b" buffer. Ownership transfers with this
    /// handle: sample it once in the composite pass, then release it via
    /// [`BloomPipeline::release`].
    pub bloom: BufferHandle,
    /// `{1.0, intensity, dirt_intensity, 1.0}` uniform vector.
    pub params: Vec4,
    /// Tint color in linear space.
    pub tint: Vec4,
    /// `{scale_x, scale_y, offset_x, offset_y}` dirt letterbox transform.
    pub dirt_tile: Vec4,
    /// The dirt texture to bind (the black placeholder when none is set).
    pub dirt_view: wgpu::TextureView,
}

/// The `{1.0, intensity, dirt_intensity, 1.0}` vector published alongside
/// the bloom buffer.
#[must_use]
pub fn composite_params(settings: &BloomSettings) -> Vec4 {
    Vec4::new(1.0, settings.intensity(), settings.dirt_intensity(), 1.0)
}

/// The full bloom pyramid pipeline.
pub struct BloomPipeline {
    extract: ExtractDownsamplePass,
    downsample: DownsampleChainPass,
    blur: BlurUpsamplePass,
    pool: BloomBufferPool,
    sampler: wgpu::Sampler,
    dirt: Option<DirtTexture>,
    dirt_placeholder: DirtTexture,
}

impl BloomPipeline {
    /// Creates the pipeline: compiles the five kernels, builds the shared
    /// bilinear sampler and the black dirt placeholder, and starts with an
    /// empty buffer pool.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::with_pool(device, queue, BloomBufferPool::new())
    }

    /// Creates the pipeline over a caller-configured pool (e.g. one with a
    /// byte budget).
    #[must_use]
    pub fn with_pool(device: &wgpu::Device, queue: &wgpu::Queue, pool: BloomBufferPool) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            extract: ExtractDownsamplePass::new(device),
            downsample: DownsampleChainPass::new(device),
            blur: BlurUpsamplePass::new(device),
            pool,
            sampler,
            dirt: None,
            dirt_placeholder: DirtTexture::black_placeholder(device, queue),
        }
    }

    /// Sets or clears the lens dirt texture.
    pub fn set_dirt_texture(&mut self, dirt: Option<DirtTexture>) {
        self.dirt = dirt;
    }

    /// The currently bound dirt texture, if any.
    #[must_use]
    pub fn dirt_texture(&self) -> Option<&DirtTexture> {
        self.dirt.as_ref()
    }

    /// The pool's per-frame bookkeeping, for inspection.
    #[must_use]
    pub fn pool(&self) -> &BloomBufferPool {
        &self.pool
    }

    /// The sampling view of a published bloom buffer.
    #[must_use]
    pub fn bloom_view(&self, handle: BufferHandle) -> &wgpu::TextureView {
        self.pool.view(handle)
    }

    /// Releases the transferred terminal buffer after the composite pass
    /// has consumed it.
    pub fn release(&mut self, handle: BufferHandle) {
        self.pool.release(handle);
    }

    /// Runs one bloom invocation, encoding every dispatch onto `encoder`.
    ///
    /// On error nothing is published: all buffers acquired so far are
    /// returned to the pool and the caller should skip the additive
    /// composite this frame.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        screen: ScreenInfo,
        settings: &BloomSettings,
    ) -> Result<BloomFrameOutput> {
        let quality = settings.quality();
        let base = chain::base_resolution(screen.scaled(), settings.half_resolution)?;

        self.pool.begin_frame();

        // ── Acquire the tier buffers for this mode ─────────────────────────
        let mut handles: [[Option<BufferHandle>; 2]; 5] = Default::default();
        for (tier, slot) in acquire_schedule(quality) {
            match self.pool.acquire(device, tier, slot, base) {
                Ok(handle) => handles[tier.index()][slot.index()] = Some(handle),
                Err(err) => {
                    for row in handles.iter_mut() {
                        for handle in row.iter_mut() {
                            if let Some(handle) = handle.take() {
                                self.pool.release(handle);
                            }
                        }
                    }
                    return Err(err);
                }
            }
        }
        let view = |tier: PyramidTier, slot: Slot| {
            self.pool.view(
                handles[tier.index()][slot.index()].expect("tier buffer acquired for this mode"),
            )
        };

        log::debug!(
            "Bloom pyramid: {}x{} base, {:?} quality ({} octaves, {} buffers)",
            base.width,
            base.height,
            quality,
            quality.octaves(),
            self.pool.acquired_count(),
        );

        // ── Extract + first downsample: HDR source → tier1.a ───────────────
        self.extract.record(
            device,
            queue,
            encoder,
            source,
            &self.sampler,
            view(PyramidTier::Tier1, Slot::A),
            base,
            settings.threshold(),
        );

        // ── Secondary downsample: tier1.a → remaining tiers' "a" ───────────
        let outputs: Vec<&wgpu::TextureView> = quality
            .downsample_outputs()
            .iter()
            .map(|&tier| view(tier, Slot::A))
            .collect();
        self.downsample.record(
            device,
            queue,
            encoder,
            quality,
            view(PyramidTier::Tier1, Slot::A),
            &self.sampler,
            &outputs,
            base,
            settings.upsample_factor(),
        );

        // ── Blur / upsample chain, smallest tier first ─────────────────────
        let blend = chain_blend_factor(quality, settings.upsample_factor());
        for (step_index, &step) in chain_sequence(quality).iter().enumerate() {
            let extent = tier_extent(base, step.tier);
            if step.is_seed() {
                self.blur.record_blur(
                    device,
                    queue,
                    encoder,
                    step_index,
                    view(step.tier, Slot::A),
                    &self.sampler,
                    view(step.tier, Slot::B),
                    extent,
                );
            } else {
                self.blur.record_upsample_blur(
                    device,
                    queue,
                    encoder,
                    step_index,
                    view(step.tier, Slot::A),
                    view(step.lower, Slot::B),
                    &self.sampler,
                    view(step.tier, Slot::B),
                    extent,
                    step_blend_factor(step, blend),
                );
            }
        }

        // ── Release everything except the terminal tier1.b ─────────────────
        for (tier, slot) in release_schedule(quality) {
            if let Some(handle) = handles[tier.index()][slot.index()].take() {
                self.pool.release(handle);
            }
        }
        debug_assert_eq!(self.pool.released_count() + 1, self.pool.acquired_count());

        // ── Publish ────────────────────────────────────────────────────────
        let dirt = self.dirt.as_ref().unwrap_or(&self.dirt_placeholder);
        let bloom = handles[PyramidTier::Tier1.index()][Slot::B.index()]
            .take()
            .expect("terminal buffer acquired in every mode");

        Ok(BloomFrameOutput {
            bloom,
            params: composite_params(settings),
            tint: settings.linear_tint(),
            dirt_tile: dirt_tile_transform(dirt.aspect_ratio(), screen.aspect_ratio()),
            dirt_view: dirt.view().clone(),
        })
    }
}
