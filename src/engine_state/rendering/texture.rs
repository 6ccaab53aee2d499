//! Texture handling for the rendering pipeline.
//!
//! This module loads the block atlas from disk into CPU memory and uploads it,
//! and creates the depth texture used by every pass.

use std::path::Path;

use anyhow::Context;
use log::info;
use wgpu::util::DeviceExt;

/// How many channels the source image stored.
///
/// Pixels are always widened to RGBA on load; this records what the file held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Rgb,
    Rgba,
}

/// A decoded image, stored bottom row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels
    pub pixels: Vec<u8>,
    pub channel_mode: ChannelMode,
}

/// Reads and decodes the image at `path`.
///
/// # Errors
/// Fails if the file cannot be read or is not a supported image.
pub fn load_image(path: impl AsRef<Path>) -> anyhow::Result<LoadedImage> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    let image = decode_image(&bytes).with_context(|| format!("failed to decode {}", path.display()))?;
    info!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width,
        image.height,
        image.channel_mode
    );
    Ok(image)
}

/// Decodes an encoded image and flips it vertically, so that `v = 0` addresses
/// the bottom row the way atlas UVs expect.
pub fn decode_image(bytes: &[u8]) -> anyhow::Result<LoadedImage> {
    let image = image::load_from_memory(bytes)?.flipv();
    let channel_mode = if image.color().has_alpha() {
        ChannelMode::Rgba
    } else {
        ChannelMode::Rgb
    };
    let pixels = image.to_rgba8();

    Ok(LoadedImage {
        width: pixels.width(),
        height: pixels.height(),
        pixels: pixels.into_raw(),
        channel_mode,
    })
}

/// Represents a GPU texture with associated view and sampler.
///
/// This struct wraps a WebGPU texture along with its view and sampler,
/// providing a convenient way to manage texture resources in the rendering pipeline.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// The texture format used for depth buffers.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a new depth texture with the given configuration.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The surface configuration containing dimensions
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads an image as a nearest-filtered, repeating sRGB texture.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &LoadedImage,
        label: &str,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;

    #[test]
    fn decoded_images_start_at_the_bottom_row() {
        let mut source = RgbImage::new(2, 2);
        source.put_pixel(0, 0, Rgb([255, 0, 0]));
        source.put_pixel(0, 1, Rgb([0, 0, 255]));
        let mut png = Cursor::new(Vec::new());
        source.write_to(&mut png, ImageFormat::Png).unwrap();

        let image = decode_image(png.get_ref()).unwrap();

        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.channel_mode, ChannelMode::Rgb);
        assert_eq!(image.pixels.len(), 2 * 2 * 4);
        assert_eq!(&image.pixels[0..4], &[0, 0, 255, 255]);
        assert_eq!(&image.pixels[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn shipped_atlas_is_a_square_grid_of_tiles() {
        use crate::engine_state::voxels::block::ATLAS_TILES_PER_SIDE;

        let atlas = load_image("assets/textures/atlas.png").unwrap();

        assert_eq!(atlas.width, atlas.height);
        assert_eq!(atlas.width % ATLAS_TILES_PER_SIDE, 0);
        assert_eq!(atlas.pixels.len(), (atlas.width * atlas.height * 4) as usize);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_image(b"not an image").is_err());
        assert!(load_image("does/not/exist.png").is_err());
    }
}
