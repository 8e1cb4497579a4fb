//! Texture resource management for wgpu
//!
//! Artwork textures are decoded on the CPU, get a full mip chain, and are
//! sampled trilinearly with the negotiated anisotropy. An image that cannot be
//! read or decoded is replaced by a checkerboard so that the gap is visible.

use std::path::Path;

use image::{imageops::FilterType, RgbaImage};

use crate::error::{GalleryError, Result};

/// Edge length of the placeholder image in pixels.
pub const PLACEHOLDER_SIZE: u32 = 64;
const PLACEHOLDER_CELL: u32 = 8;

/// Decoded RGBA8 pixels, sRGB encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// True when this is the substitute for an image that failed to load.
    pub placeholder: bool,
}

impl DecodedImage {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| GalleryError::ImageIo {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image::load_from_memory(&bytes)
            .map_err(|source| GalleryError::ImageDecode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        Ok(Self::from_rgba(rgba))
    }

    /// Loads `path`, substituting the placeholder (and logging why) on failure.
    pub fn load_or_placeholder(path: &Path) -> Self {
        match Self::load(path) {
            Ok(image) => {
                log::debug!("Loaded {} ({}x{})", path.display(), image.width, image.height);
                image
            }
            Err(err) => {
                log::warn!("{err}; showing placeholder");
                Self::placeholder()
            }
        }
    }

    /// Magenta and black checkerboard.
    pub fn placeholder() -> Self {
        let rgba = RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
            if (x / PLACEHOLDER_CELL + y / PLACEHOLDER_CELL) % 2 == 0 {
                image::Rgba([255, 0, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        });
        Self {
            placeholder: true,
            ..Self::from_rgba(rgba)
        }
    }

    fn from_rgba(rgba: RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            pixels: rgba.into_raw(),
            placeholder: false,
        }
    }

    pub fn size(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    /// Downscales, keeping aspect, so neither side exceeds `max_dimension`.
    pub fn limited_to(self, max_dimension: u32) -> Self {
        let largest = self.width.max(self.height);
        if largest <= max_dimension || max_dimension == 0 {
            return self;
        }
        let scale = max_dimension as f32 / largest as f32;
        let width = ((self.width as f32 * scale).round() as u32).clamp(1, max_dimension);
        let height = ((self.height as f32 * scale).round() as u32).clamp(1, max_dimension);
        let placeholder = self.placeholder;
        match RgbaImage::from_raw(self.width, self.height, self.pixels) {
            Some(base) => Self {
                placeholder,
                ..Self::from_rgba(image::imageops::resize(&base, width, height, FilterType::Triangle))
            },
            None => Self::placeholder(),
        }
    }

    /// Level 0 followed by successively halved levels down to 1x1.
    pub fn mip_chain(&self) -> Vec<DecodedImage> {
        let mut levels = vec![self.clone()];
        let Some(base) = RgbaImage::from_raw(self.width, self.height, self.pixels.clone()) else {
            return levels;
        };

        let (mut width, mut height) = (self.width, self.height);
        while width > 1 || height > 1 {
            width = (width / 2).max(1);
            height = (height / 2).max(1);
            let level = image::imageops::resize(&base, width, height, FilterType::Triangle);
            levels.push(DecodedImage {
                placeholder: self.placeholder,
                ..Self::from_rgba(level)
            });
        }
        levels
    }
}

/// Number of levels in a full mip chain for a `width` x `height` texture.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the renderer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Format of artwork textures; sampling decodes to linear.
    pub const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Creates a depth buffer with the given surface dimensions.
    pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads an artwork with its full mip chain.
    ///
    /// # Arguments
    /// * `max_anisotropy` - 1 disables anisotropic filtering
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        label: &str,
        max_anisotropy: u16,
    ) -> Self {
        let levels = image.mip_chain();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::IMAGE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Anisotropy requires linear filtering on all three filters.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: max_anisotropy.max(1),
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
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(64, 64), 7);
        assert_eq!(mip_level_count(1920, 1080), 11);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn test_placeholder_is_checkerboard() {
        let image = DecodedImage::placeholder();
        assert!(image.placeholder);
        assert_eq!((image.width, image.height), (PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
        assert_eq!(image.pixels.len(), (PLACEHOLDER_SIZE * PLACEHOLDER_SIZE * 4) as usize);
        assert_eq!(&image.pixels[0..4], &[255, 0, 255, 255]);
        let next_cell = (PLACEHOLDER_CELL * 4) as usize;
        assert_eq!(&image.pixels[next_cell..next_cell + 4], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_mip_chain_halves_to_one() {
        let chain = DecodedImage::placeholder().mip_chain();
        assert_eq!(chain.len() as u32, mip_level_count(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
        assert_eq!((chain[1].width, chain[1].height), (32, 32));
        let last = chain.last().unwrap();
        assert_eq!((last.width, last.height), (1, 1));
        assert_eq!(last.pixels.len(), 4);
    }

    #[test]
    fn test_limited_to_keeps_aspect() {
        let wide = DecodedImage {
            width: 400,
            height: 100,
            pixels: vec![128; 400 * 100 * 4],
            placeholder: false,
        };
        let limited = wide.clone().limited_to(200);
        assert_eq!((limited.width, limited.height), (200, 50));
        assert_eq!(limited.pixels.len(), 200 * 50 * 4);
        assert_eq!(wide.clone().limited_to(4096), wide);
    }

    #[test]
    fn test_missing_file_falls_back_to_placeholder() {
        let path = Path::new("no/such/artwork.jpeg");
        assert!(matches!(
            DecodedImage::load(path),
            Err(GalleryError::ImageIo { .. })
        ));
        assert!(DecodedImage::load_or_placeholder(path).placeholder);
    }

    #[test]
    fn test_undecodable_bytes_report_decode_error() {
        let path = std::env::temp_dir().join("artgrid-not-an-image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let result = DecodedImage::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(GalleryError::ImageDecode { .. })));
    }
}
