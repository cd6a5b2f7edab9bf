//! Extract + Downsample Pass
//!
//! One-shot pass at the head of the pipeline: bilinear-samples the
//! full-resolution HDR source, subtracts the bloom threshold (clamped at
//! zero) per channel, and writes tier 1's "a" buffer at the bloom base
//! resolution. Fully parallel; no cross-texel dependency.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::chain::{Extent, dispatch_size};
use crate::kernels::Kernel;

use super::{create_kernel_pipeline, sampler_entry, storage_entry, texture_entry, uniform_buffer, uniform_entry};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct ExtractUniforms {
    inverse_output_size: Vec2,
    bloom_threshold: f32,
    _pad: f32,
}

pub struct ExtractDownsamplePass {
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    uniforms: wgpu::Buffer,
}

impl ExtractDownsamplePass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Extract Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2),
                storage_entry(3),
            ],
        });
        let pipeline = create_kernel_pipeline(device, Kernel::ExtractDownsampleHdr, &layout);
        let uniforms = uniform_buffer(device, "Bloom Extract Uniforms");

        Self {
            pipeline,
            layout,
            uniforms,
        }
    }

    /// Encodes the extract dispatch: `source` → tier-1 "a" (`output`).
    pub fn record(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        output: &wgpu::TextureView,
        output_extent: Extent,
        threshold: f32,
    ) {
        let uniforms = ExtractUniforms {
            inverse_output_size: Vec2::new(
                1.0 / output_extent.width as f32,
                1.0 / output_extent.height as f32,
            ),
            bloom_threshold: threshold,
            _pad: 0.0,
        };
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Extract BindGroup"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(output),
                },
            ],
        });

        let (groups_x, groups_y) = dispatch_size(output_extent);
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Bloom Extract Downsample"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        cpass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}
