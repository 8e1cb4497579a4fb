//! Colour-space and filtering capabilities, resolved once when the renderer starts.

use wgpu::{DownlevelFlags, TextureFormat};

/// Largest anisotropy level requested for artwork textures.
pub const MAX_ANISOTROPY: u16 = 16;

/// How linear shader output reaches the display as sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPipeline {
    /// The surface format is sRGB; the hardware encodes on write.
    NativeSrgb,
    /// Only linear surface formats exist; the fragment shader encodes.
    ShaderEncoded,
}

impl ColorPipeline {
    /// Value of the shader's `encode_srgb` flag.
    pub fn shader_flag(self) -> u32 {
        match self {
            ColorPipeline::NativeSrgb => 0,
            ColorPipeline::ShaderEncoded => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCapabilities {
    pub surface_format: TextureFormat,
    pub color: ColorPipeline,
    /// 1 when anisotropic filtering is unavailable.
    pub max_anisotropy: u16,
}

/// Picks the surface format and filtering level from what the adapter offers.
///
/// Returns `None` when the surface reports no formats at all.
pub fn negotiate(formats: &[TextureFormat], downlevel: DownlevelFlags) -> Option<RenderCapabilities> {
    let (surface_format, color) = match formats.iter().copied().find(TextureFormat::is_srgb) {
        Some(format) => (format, ColorPipeline::NativeSrgb),
        None => (*formats.first()?, ColorPipeline::ShaderEncoded),
    };

    let max_anisotropy = if downlevel.contains(DownlevelFlags::ANISOTROPIC_FILTERING) {
        MAX_ANISOTROPY
    } else {
        1
    };

    Some(RenderCapabilities {
        surface_format,
        color,
        max_anisotropy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_srgb_surface() {
        let caps = negotiate(
            &[TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb],
            DownlevelFlags::all(),
        )
        .unwrap();
        assert_eq!(caps.surface_format, TextureFormat::Bgra8UnormSrgb);
        assert_eq!(caps.color, ColorPipeline::NativeSrgb);
        assert_eq!(caps.color.shader_flag(), 0);
        assert_eq!(caps.max_anisotropy, MAX_ANISOTROPY);
    }

    #[test]
    fn test_linear_only_surface_encodes_in_shader() {
        let caps = negotiate(&[TextureFormat::Rgba8Unorm], DownlevelFlags::empty()).unwrap();
        assert_eq!(caps.surface_format, TextureFormat::Rgba8Unorm);
        assert_eq!(caps.color, ColorPipeline::ShaderEncoded);
        assert_eq!(caps.color.shader_flag(), 1);
        assert_eq!(caps.max_anisotropy, 1);
    }

    #[test]
    fn test_no_formats() {
        assert_eq!(negotiate(&[], DownlevelFlags::all()), None);
    }
}
