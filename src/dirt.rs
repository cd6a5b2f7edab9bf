//! Lens Dirt
//!
//! A dirt texture simulates smudges and dust on the lens; the compositor
//! multiplies it into the bloom contribution. The tile transform computed
//! here letterboxes the texture onto the screen so it is never stretched
//! or squashed: the aspect ratios are compared once per invocation and the
//! smaller axis is centered.
//!
//! When no dirt texture is set, a 1x1 black placeholder is bound instead,
//! so the dirt term contributes nothing visible regardless of intensity.

use glam::Vec4;

use crate::errors::Result;

/// A lens dirt texture with its sampling view and dimensions.
pub struct DirtTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DirtTexture {
    /// Uploads an image as a dirt texture.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &image::DynamicImage,
        label: &str,
    ) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(device, queue, &rgba, width, height, label)
    }

    /// Loads a dirt texture from an image file on disk.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self> {
        let image = image::open(path.as_ref())?;
        let dirt = Self::from_image(device, queue, &image, "Lens Dirt");
        log::debug!(
            "Loaded lens dirt texture {:?} ({}x{})",
            path.as_ref(),
            dirt.width,
            dirt.height
        );
        Ok(dirt)
    }

    /// A 1x1 black texture used when no dirt texture is configured.
    pub fn black_placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba8(device, queue, &[0, 0, 0, 255], 1, 1, "Lens Dirt Placeholder")
    }

    fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// The sampling view for binding in the composite pass.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// The underlying texture.
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Computes the `{scale_x, scale_y, offset_x, offset_y}` transform that
/// letterboxes a dirt texture of `dirt_ratio` onto a screen of
/// `screen_ratio`, keeping the dirt centered and unstretched. Matching
/// ratios yield the identity `{1, 1, 0, 0}`.
#[must_use]
pub fn dirt_tile_transform(dirt_ratio: f32, screen_ratio: f32) -> Vec4 {
    let mut transform = Vec4::new(1.0, 1.0, 0.0, 0.0);

    if dirt_ratio > screen_ratio {
        transform.x = screen_ratio / dirt_ratio;
        transform.z = (1.0 - transform.x) * 0.5;
    } else if screen_ratio > dirt_ratio {
        transform.y = dirt_ratio / screen_ratio;
        transform.w = (1.0 - transform.y) * 0.5;
    }

    transform
}
