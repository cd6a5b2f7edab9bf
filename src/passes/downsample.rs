//! Secondary Downsample Chain
//!
//! A single dispatch that expands tier 1's "a" buffer into the remaining
//! tiers' "a" buffers: {3,5} in low quality, {2,3,4,5} in high quality.
//! The dispatch grid covers the half-resolution grid; each thread reads a
//! small bilinear footprint of tier 1 and the thread group reduces through
//! workgroup memory for the coarser tiers, so no tier depends on another
//! tier's output within the dispatch.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::chain::{Extent, QualityMode, WORKGROUP_SIZE};
use crate::kernels::Kernel;

use super::{create_kernel_pipeline, sampler_entry, storage_entry, texture_entry, uniform_buffer, uniform_entry};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DownsampleUniforms {
    inverse_dimensions: Vec2,
    /// Not read by this pass; carried for uniform-layout parity with the
    /// blur kernels.
    upsample_blend: f32,
    _pad: f32,
}

pub struct DownsampleChainPass {
    low_pipeline: wgpu::ComputePipeline,
    low_layout: wgpu::BindGroupLayout,
    high_pipeline: wgpu::ComputePipeline,
    high_layout: wgpu::BindGroupLayout,
    uniforms: wgpu::Buffer,
}

impl DownsampleChainPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let low_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Downsample Low Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2),
                storage_entry(3),
                storage_entry(4),
            ],
        });
        let high_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Downsample High Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2),
                storage_entry(3),
                storage_entry(4),
                storage_entry(5),
                storage_entry(6),
            ],
        });

        let low_pipeline = create_kernel_pipeline(device, Kernel::DownsampleLow, &low_layout);
        let high_pipeline = create_kernel_pipeline(device, Kernel::DownsampleHigh, &high_layout);
        let uniforms = uniform_buffer(device, "Bloom Downsample Uniforms");

        Self {
            low_pipeline,
            low_layout,
            high_pipeline,
            high_layout,
            uniforms,
        }
    }

    /// Encodes the downsample dispatch. `outputs` are the "a" views of
    /// [`QualityMode::downsample_outputs`], in tier order.
    pub fn record(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        quality: QualityMode,
        input: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        outputs: &[&wgpu::TextureView],
        base: Extent,
        upsample_blend: f32,
    ) {
        debug_assert_eq!(outputs.len(), quality.downsample_outputs().len());

        let uniforms = DownsampleUniforms {
            inverse_dimensions: Vec2::new(1.0 / base.width as f32, 1.0 / base.height as f32),
            upsample_blend,
            _pad: 0.0,
        };
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));

        let (pipeline, layout) = match quality {
            QualityMode::Low => (&self.low_pipeline, &self.low_layout),
            QualityMode::High => (&self.high_pipeline, &self.high_layout),
        };

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(input),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: self.uniforms.as_entire_binding(),
            },
        ];
        for (i, output) in outputs.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 3 + i as u32,
                resource: wgpu::BindingResource::TextureView(output),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Downsample BindGroup"),
            layout,
            entries: &entries,
        });

        // The dispatch covers the half-resolution grid; each thread's
        // bilinear sample reads a 2x2 footprint of tier 1.
        let half = Extent::new(base.width / 2, base.height / 2);
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Bloom Downsample Chain"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        cpass.dispatch_workgroups(
            half.width.div_ceil(WORKGROUP_SIZE),
            half.height.div_ceil(WORKGROUP_SIZE),
            1,
        );
    }
}
