//! Blur / Upsample Chain Pass
//!
//! Runs the per-tier steps of the reconstruction chain, smallest tier
//! first. The seed step blurs the innermost tier's "a" buffer into its "b"
//! buffer with the blend factor pinned to 1; every later step
//! bilinear-upsamples the previous tier's "b" result, blends it with the
//! current tier's "a" content by the upsample blend factor, blurs, and
//! writes the current tier's "b".
//!
//! Each chain slot owns its own uniform buffer so all steps can be encoded
//! into one command stream; a shared buffer would be overwritten before the
//! queued dispatches execute.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::chain::{Extent, dispatch_size};
use crate::kernels::Kernel;

use super::{create_kernel_pipeline, sampler_entry, storage_entry, texture_entry, uniform_buffer, uniform_entry};

/// Upper bound on chain steps (the high-quality chain visits every tier).
const MAX_CHAIN_STEPS: usize = 5;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BlurUniforms {
    inverse_dimensions: Vec2,
    upsample_blend_factor: f32,
    _pad: f32,
}

pub struct BlurUpsamplePass {
    blur_pipeline: wgpu::ComputePipeline,
    blur_layout: wgpu::BindGroupLayout,
    upsample_pipeline: wgpu::ComputePipeline,
    upsample_layout: wgpu::BindGroupLayout,
    step_uniforms: Vec<wgpu::Buffer>,
}

impl BlurUpsamplePass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Blur Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2),
                storage_entry(3),
            ],
        });
        let upsample_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Upsample Blur Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3),
                storage_entry(4),
            ],
        });

        let blur_pipeline = create_kernel_pipeline(device, Kernel::Blur, &blur_layout);
        let upsample_pipeline = create_kernel_pipeline(device, Kernel::UpsampleBlur, &upsample_layout);

        let step_uniforms = (0..MAX_CHAIN_STEPS)
            .map(|_| uniform_buffer(device, "Bloom Chain Step Uniforms"))
            .collect();

        Self {
            blur_pipeline,
            blur_layout,
            upsample_pipeline,
            upsample_layout,
            step_uniforms,
        }
    }

    /// Encodes the seed step: pure blur of `input` (tier "a") into `output`
    /// (tier "b"). No smaller tier's result exists yet, so the blend factor
    /// is pinned to 1.
    pub fn record_blur(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        step: usize,
        input: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        output: &wgpu::TextureView,
        extent: Extent,
    ) {
        self.write_step_uniforms(queue, step, extent, 1.0);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Blur BindGroup"),
            layout: &self.blur_layout,
            entries: &[
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
                    resource: self.step_uniforms[step].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(output),
                },
            ],
        });

        self.dispatch(encoder, &self.blur_pipeline, &bind_group, extent, "Bloom Blur");
    }

    /// Encodes one upsample-and-blur step: `lower` is the previous
    /// (smaller) tier's "b" result, `higher` the current tier's "a"
    /// content, `output` the current tier's "b" buffer.
    pub fn record_upsample_blur(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        step: usize,
        higher: &wgpu::TextureView,
        lower: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        output: &wgpu::TextureView,
        extent: Extent,
        blend_factor: f32,
    ) {
        self.write_step_uniforms(queue, step, extent, blend_factor);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Upsample Blur BindGroup"),
            layout: &self.upsample_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(higher),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(lower),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.step_uniforms[step].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(output),
                },
            ],
        });

        self.dispatch(
            encoder,
            &self.upsample_pipeline,
            &bind_group,
            extent,
            "Bloom Upsample Blur",
        );
    }

    fn write_step_uniforms(&self, queue: &wgpu::Queue, step: usize, extent: Extent, blend: f32) {
        let uniforms = BlurUniforms {
            inverse_dimensions: Vec2::new(1.0 / extent.width as f32, 1.0 / extent.height as f32),
            upsample_blend_factor: blend,
            _pad: 0.0,
        };
        queue.write_buffer(&self.step_uniforms[step], 0, bytemuck::bytes_of(&uniforms));
    }

    fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        extent: Extent,
        label: &str,
    ) {
        let (groups_x, groups_y) = dispatch_size(extent);
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        cpass.set_pipeline(pipeline);
        cpass.set_bind_group(0, bind_group, &[]);
        cpass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}
