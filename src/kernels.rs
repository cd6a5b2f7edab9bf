//! Compute Kernel Registry
//!
//! The five compute programs of the bloom pipeline, as a static, process-wide
//! read-only registry mapping kernel identity to WGSL source. Sources are
//! embedded at compile time; no synchronization is needed beyond one-time
//! module creation per device.
//!
//! All kernels use 8x8 thread groups and write `rgba16float` storage
//! textures. Their uniform layouts are mirrored by the Pod structs in
//! [`crate::passes`].

/// Identity of one compute program in the pipeline.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kernel {
    /// Thresholds the HDR source and downsamples it into tier 1.
    ExtractDownsampleHdr,
    /// Expands tier 1 into tiers {3,5} in one dispatch (low quality).
    DownsampleLow,
    /// Expands tier 1 into tiers {2,3,4,5} in one dispatch (high quality).
    DownsampleHigh,
    /// Small-kernel blur of a tier's `A` buffer into its `B` buffer.
    Blur,
    /// Bilinear upsample of a smaller tier's `B`, blend with the current
    /// tier's `A`, then blur into the current tier's `B`.
    UpsampleBlur,
}

impl Kernel {
    /// Entry point shared by every kernel.
    pub const ENTRY_POINT: &'static str = "main";

    /// The embedded WGSL source.
    #[must_use]
    pub const fn source(self) -> &'static str {
        match self {
            Kernel::ExtractDownsampleHdr => {
                include_str!("shaders/bloom_extract_downsample.wgsl")
            }
            Kernel::DownsampleLow => include_str!("shaders/bloom_downsample_low.wgsl"),
            Kernel::DownsampleHigh => include_str!("shaders/bloom_downsample_high.wgsl"),
            Kernel::Blur => include_str!("shaders/bloom_blur.wgsl"),
            Kernel::UpsampleBlur => include_str!("shaders/bloom_upsample_blur.wgsl"),
        }
    }

    /// Debug label used for the shader module and pipeline.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Kernel::ExtractDownsampleHdr => "Bloom Extract Downsample",
            Kernel::DownsampleLow => "Bloom Downsample Low",
            Kernel::DownsampleHigh => "Bloom Downsample High",
            Kernel::Blur => "Bloom Blur",
            Kernel::UpsampleBlur => "Bloom Upsample Blur",
        }
    }

    /// Creates the shader module for this kernel.
    #[must_use]
    pub fn create_module(self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.label()),
            source: wgpu::ShaderSource::Wgsl(self.source().into()),
        })
    }
}
