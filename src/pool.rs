//! Bloom Buffer Pool
//!
//! A fixed-shape pool for the pyramid's intermediate render targets: five
//! resolution tiers, two slots ("a"/"b") each, acquired at the start of one
//! pipeline invocation and released by its end. The sole exception is the
//! terminal tier-1 "b" buffer, whose handle transfers to the external
//! compositor; the consumer releases it after sampling.
//!
//! # Memory Strategy
//!
//! - Textures are never destroyed during normal rendering; released buffers
//!   go to a free list keyed by extent and are reused by later frames.
//! - The pool grows on demand. When a byte budget is configured, growth past
//!   it is a fatal [`HalationError::ResourceExhaustion`] for the frame.
//! - Call [`BloomBufferPool::trim`] after a resolution change to drop stale
//!   free-list allocations.
//!
//! Acquire and release are synchronous bookkeeping, not GPU synchronization
//! points; dispatch ordering on the command stream is what guarantees a
//! buffer is written before a later pass reads it.

use rustc_hash::FxHashMap;

use crate::chain::{Extent, PyramidTier, Slot, tier_extent};
use crate::errors::{HalationError, Result};

/// Working format of every pyramid buffer.
pub const BLOOM_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Handle to an acquired pyramid buffer.
///
/// Valid from `acquire` until `release`. Handles are unique across frames;
/// a released handle is never reissued.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BufferHandle(u64);

struct PooledBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: Extent,
}

impl PooledBuffer {
    fn new(device: &wgpu::Device, extent: Extent, label: &'static str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BLOOM_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            extent,
        }
    }
}

struct ActiveBuffer {
    buffer: PooledBuffer,
    tier: PyramidTier,
    slot: Slot,
}

/// GPU texture pool for the bloom pyramid's per-frame buffers.
pub struct BloomBufferPool {
    /// Buffers currently held by outstanding handles.
    active: FxHashMap<u64, ActiveBuffer>,
    /// Released buffers available for reuse, grouped by extent.
    free: FxHashMap<(u32, u32), Vec<PooledBuffer>>,
    next_handle: u64,
    /// Total bytes of texture memory created by this pool.
    allocated_bytes: u64,
    /// Optional hard ceiling on `allocated_bytes`.
    budget: Option<u64>,
    acquired_this_frame: u32,
    released_this_frame: u32,
}

impl BloomBufferPool {
    /// Creates an empty pool with no byte budget.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: FxHashMap::default(),
            free: FxHashMap::default(),
            next_handle: 0,
            allocated_bytes: 0,
            budget: None,
            acquired_this_frame: 0,
            released_this_frame: 0,
        }
    }

    /// Creates an empty pool that refuses to grow past `budget` bytes of
    /// texture memory.
    #[must_use]
    pub fn with_budget(budget: u64) -> Self {
        Self {
            budget: Some(budget),
            ..Self::new()
        }
    }

    /// Marks the start of one pipeline invocation, resetting the per-frame
    /// acquire/release counters.
    pub fn begin_frame(&mut self) {
        self.acquired_this_frame = 0;
        self.released_this_frame = 0;
    }

    /// Acquires the buffer for `(tier, slot)` at the given base resolution,
    /// reusing a pooled allocation when one matches.
    ///
    /// A degenerate tier extent or one beyond the device's 2D texture limit
    /// is a configuration error; growth past the pool budget is resource
    /// exhaustion. Both are fatal for the frame.
    pub fn acquire(
        &mut self,
        device: &wgpu::Device,
        tier: PyramidTier,
        slot: Slot,
        base: Extent,
    ) -> Result<BufferHandle> {
        let extent = tier_extent(base, tier);
        if extent.width == 0 || extent.height == 0 {
            return Err(HalationError::InvalidDimensions {
                width: extent.width,
                height: extent.height,
            });
        }
        let limit = device.limits().max_texture_dimension_2d;
        if extent.width > limit || extent.height > limit {
            return Err(HalationError::InvalidDimensions {
                width: extent.width,
                height: extent.height,
            });
        }

        let key = (extent.width, extent.height);
        let buffer = match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(buffer) => buffer,
            None => {
                let grown = self.allocated_bytes + extent.byte_size();
                if let Some(budget) = self.budget
                    && grown > budget
                {
                    return Err(HalationError::ResourceExhaustion {
                        requested: grown,
                        budget,
                    });
                }
                self.allocated_bytes = grown;
                log::trace!(
                    "Bloom pool grows to {} bytes ({}x{} buffer)",
                    self.allocated_bytes,
                    extent.width,
                    extent.height,
                );
                PooledBuffer::new(device, extent, "Bloom Pyramid Buffer")
            }
        };

        let handle = BufferHandle(self.next_handle);
        self.next_handle += 1;
        self.active.insert(handle.0, ActiveBuffer { buffer, tier, slot });
        self.acquired_this_frame += 1;
        Ok(handle)
    }

    /// Returns a buffer to the free list. Safe to call from the external
    /// compositor for the transferred terminal buffer.
    pub fn release(&mut self, handle: BufferHandle) {
        let Some(entry) = self.active.remove(&handle.0) else {
            log::warn!("release of unknown bloom buffer handle {handle:?}");
            return;
        };
        let key = (entry.buffer.extent.width, entry.buffer.extent.height);
        self.free.entry(key).or_default().push(entry.buffer);
        self.released_this_frame += 1;
    }

    /// The sampling/storage view of an acquired buffer.
    ///
    /// # Panics
    ///
    /// Panics if the handle has already been released.
    #[must_use]
    pub fn view(&self, handle: BufferHandle) -> &wgpu::TextureView {
        &self.entry(handle).buffer.view
    }

    /// The raw texture of an acquired buffer.
    ///
    /// # Panics
    ///
    /// Panics if the handle has already been released.
    #[must_use]
    pub fn texture(&self, handle: BufferHandle) -> &wgpu::Texture {
        &self.entry(handle).buffer.texture
    }

    /// The extent of an acquired buffer.
    #[must_use]
    pub fn extent(&self, handle: BufferHandle) -> Extent {
        self.entry(handle).buffer.extent
    }

    /// The (tier, slot) identity of an acquired buffer.
    #[must_use]
    pub fn identity(&self, handle: BufferHandle) -> (PyramidTier, Slot) {
        let entry = self.entry(handle);
        (entry.tier, entry.slot)
    }

    fn entry(&self, handle: BufferHandle) -> &ActiveBuffer {
        self.active
            .get(&handle.0)
            .expect("bloom buffer handle used after release")
    }

    /// Buffers acquired since `begin_frame`.
    #[must_use]
    pub fn acquired_count(&self) -> u32 {
        self.acquired_this_frame
    }

    /// Buffers released since `begin_frame`.
    #[must_use]
    pub fn released_count(&self) -> u32 {
        self.released_this_frame
    }

    /// Buffers currently held by outstanding handles.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.active.len()
    }

    /// Total bytes of texture memory this pool has created.
    #[must_use]
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes
    }

    /// Drops all free-list allocations. Call after a resolution or quality
    /// change to avoid holding stale GPU memory.
    pub fn trim(&mut self) {
        for bucket in self.free.values() {
            for buffer in bucket {
                self.allocated_bytes -= buffer.extent.byte_size();
            }
        }
        self.free.clear();
    }
}

impl Default for BloomBufferPool {
    fn default() -> Self {
        Self::new()
    }
}
