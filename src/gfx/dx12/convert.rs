//! 通用类型与 DXGI/D3D12 枚举的互转

use windows::Win32::Foundation::LUID;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use crate::gfx::api::{ColorSpace, DisplayRotation, FeatureLevel, PixelFormat, ResourceState};

pub fn to_dxgi_format(format: PixelFormat) -> DXGI_FORMAT {
    match format {
        PixelFormat::Unknown => DXGI_FORMAT_UNKNOWN,
        PixelFormat::Bgra8Unorm => DXGI_FORMAT_B8G8R8A8_UNORM,
        PixelFormat::Rgb10a2Unorm => DXGI_FORMAT_R10G10B10A2_UNORM,
        PixelFormat::Rgba16Float => DXGI_FORMAT_R16G16B16A16_FLOAT,
        PixelFormat::D32Float => DXGI_FORMAT_D32_FLOAT,
        PixelFormat::D16Unorm => DXGI_FORMAT_D16_UNORM,
    }
}

pub fn to_d3d_level(level: FeatureLevel) -> D3D_FEATURE_LEVEL {
    match level {
        FeatureLevel::Level11_0 => D3D_FEATURE_LEVEL_11_0,
        FeatureLevel::Level11_1 => D3D_FEATURE_LEVEL_11_1,
        FeatureLevel::Level12_0 => D3D_FEATURE_LEVEL_12_0,
        FeatureLevel::Level12_1 => D3D_FEATURE_LEVEL_12_1,
    }
}

pub fn to_d3d_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
    match state {
        ResourceState::Present => D3D12_RESOURCE_STATE_PRESENT,
        ResourceState::RenderTarget => D3D12_RESOURCE_STATE_RENDER_TARGET,
        ResourceState::CopySource => D3D12_RESOURCE_STATE_COPY_SOURCE,
        ResourceState::CopyDest => D3D12_RESOURCE_STATE_COPY_DEST,
    }
}

pub fn to_dxgi_color_space(color_space: ColorSpace) -> DXGI_COLOR_SPACE_TYPE {
    match color_space {
        ColorSpace::Sdr => DXGI_COLOR_SPACE_RGB_FULL_G22_NONE_P709,
        ColorSpace::Hdr10Pq => DXGI_COLOR_SPACE_RGB_FULL_G2084_NONE_P2020,
        ColorSpace::ScRgbLinear => DXGI_COLOR_SPACE_RGB_FULL_G10_NONE_P709,
    }
}

pub fn to_dxgi_rotation(rotation: DisplayRotation) -> DXGI_MODE_ROTATION {
    match rotation {
        DisplayRotation::Identity => DXGI_MODE_ROTATION_IDENTITY,
        DisplayRotation::Rotate90 => DXGI_MODE_ROTATION_ROTATE90,
        DisplayRotation::Rotate180 => DXGI_MODE_ROTATION_ROTATE180,
        DisplayRotation::Rotate270 => DXGI_MODE_ROTATION_ROTATE270,
    }
}

/// LUID 打包为比较用的 u64
pub fn luid_to_u64(luid: &LUID) -> u64 {
    ((luid.HighPart as u32 as u64) << 32) | luid.LowPart as u64
}

/// 以 NUL 截断的 UTF-16 描述字符串
pub fn utf16_description(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_buffer_formats_map_to_dxgi() {
        assert_eq!(to_dxgi_format(PixelFormat::Bgra8Unorm), DXGI_FORMAT_B8G8R8A8_UNORM);
        assert_eq!(
            to_dxgi_format(PixelFormat::Rgb10a2Unorm),
            DXGI_FORMAT_R10G10B10A2_UNORM
        );
        assert_eq!(
            to_dxgi_format(PixelFormat::Rgba16Float),
            DXGI_FORMAT_R16G16B16A16_FLOAT
        );
        assert_eq!(to_dxgi_format(PixelFormat::Unknown), DXGI_FORMAT_UNKNOWN);
    }

    #[test]
    fn test_luid_packing_is_lossless() {
        let luid = LUID {
            LowPart: 0xDEAD_BEEF,
            HighPart: -1,
        };
        assert_eq!(luid_to_u64(&luid), 0xFFFF_FFFF_DEAD_BEEF);
    }

    #[test]
    fn test_utf16_description_truncates_at_nul() {
        let mut raw = [0u16; 8];
        for (i, c) in "GPU".encode_utf16().enumerate() {
            raw[i] = c;
        }
        assert_eq!(utf16_description(&raw), "GPU");
        assert_eq!(utf16_description(&[0u16; 4]), "");
    }
}
