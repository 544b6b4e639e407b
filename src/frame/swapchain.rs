//! 交换链几何与色彩空间推导
//!
//! 交换链管理器的纯计算部分：输出尺寸换算、视口与裁剪矩形、
//! 屏幕旋转补偿矩阵、HDR 色彩空间协商。这里不持有任何图形
//! 句柄，重建编排在 `resources` 模块。
//!
//! # 设计原则
//!
//! - **纯函数**：同样的输入永远给同样的输出，独立于后端可测
//! - **旋转补偿**：显示旋转由交换链声明，着色器侧用反向旋转
//!   矩阵抵消，四个朝向对应四个固定矩阵

use nalgebra::Matrix4;

use crate::gfx::api::{
    ColorSpace, DisplayRotation, OutputInfo, PixelFormat, RectI, Size, Viewport,
};

/// 交换链缓冲的最小边长；窗口最小化时输出矩形可能是 0
pub fn clamp_extent(width: u32, height: u32) -> Size {
    Size::new(width.max(1), height.max(1))
}

/// 旋转后的渲染目标尺寸
///
/// 交换链缓冲始终按显示器的本机朝向分配，窗口逻辑尺寸在
/// 90°/270° 时宽高互换。
pub fn render_extent(output: Size, rotation: DisplayRotation) -> Size {
    match rotation {
        DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => {
            Size::new(output.height, output.width)
        }
        _ => output,
    }
}

/// 覆盖整个渲染目标的视口
pub fn full_viewport(extent: Size) -> Viewport {
    Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

/// 覆盖整个渲染目标的裁剪矩形
pub fn full_scissor(extent: Size) -> RectI {
    RectI::new(0, 0, extent.width as i32, extent.height as i32)
}

/// 显示旋转的屏幕空间补偿矩阵
///
/// 显示器顺时针旋转 θ 时着色器需要预旋转 -θ 才能摆正画面，
/// 因此 90° 映射到 270° 的 Z 旋转矩阵，反之亦然。矩阵按
/// 行向量约定排布，供 HLSL `mul(v, M)` 直接使用。
pub fn rotation_transform(rotation: DisplayRotation) -> Matrix4<f32> {
    match rotation {
        DisplayRotation::Identity => Matrix4::identity(),
        // 90° 显示旋转 -> 270° Z 旋转
        DisplayRotation::Rotate90 => Matrix4::new(
            0.0, -1.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ),
        // 180° 显示旋转 -> 180° Z 旋转
        DisplayRotation::Rotate180 => Matrix4::new(
            -1.0, 0.0, 0.0, 0.0, //
            0.0, -1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ),
        // 270° 显示旋转 -> 90° Z 旋转
        DisplayRotation::Rotate270 => Matrix4::new(
            0.0, 1.0, 0.0, 0.0, //
            -1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ),
    }
}

/// 在所有输出中找到与窗口矩形交叠面积最大的那个
///
/// 窗口跨越多显示器时以覆盖最多的为准；完全不交叠返回 `None`。
pub fn best_output<'a>(window: &RectI, outputs: &'a [OutputInfo]) -> Option<&'a OutputInfo> {
    let mut best: Option<(&OutputInfo, i64)> = None;
    for output in outputs {
        let area = window.intersection_area(&output.desktop_rect);
        if area <= 0 {
            continue;
        }
        match best {
            Some((_, best_area)) if best_area >= area => {}
            _ => best = Some((output, area)),
        }
    }
    best.map(|(output, _)| output)
}

/// 窗口当前所在的输出是否原生支持 HDR10
pub fn hdr10_detected(window: Option<RectI>, outputs: &[OutputInfo]) -> bool {
    let Some(bounds) = window else {
        return false;
    };
    best_output(&bounds, outputs).map_or(false, |output| output.hdr10)
}

/// 由后备缓冲格式与显示能力决定交换链色彩空间
///
/// HDR 输出只在应用显式开启 HDR 且格式具备 HDR 承载能力时
/// 选用；其余一律回落到 SDR。
pub fn color_space_for(format: PixelFormat, display_hdr10: bool, hdr_enabled: bool) -> ColorSpace {
    if !(display_hdr10 && hdr_enabled) {
        return ColorSpace::Sdr;
    }
    match format {
        PixelFormat::Rgb10a2Unorm => ColorSpace::Hdr10Pq,
        PixelFormat::Rgba16Float => ColorSpace::ScRgbLinear,
        _ => ColorSpace::Sdr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(name: &str, rect: RectI, hdr10: bool) -> OutputInfo {
        OutputInfo {
            name: name.to_string(),
            desktop_rect: rect,
            hdr10,
        }
    }

    #[test]
    fn test_clamp_extent_floors_at_one() {
        let extent = clamp_extent(0, 0);
        assert_eq!(extent, Size::new(1, 1));
        assert_eq!(clamp_extent(800, 600), Size::new(800, 600));
    }

    #[test]
    fn test_render_extent_swaps_for_portrait() {
        let output = Size::new(1920, 1080);
        assert_eq!(render_extent(output, DisplayRotation::Identity), output);
        assert_eq!(render_extent(output, DisplayRotation::Rotate180), output);
        assert_eq!(
            render_extent(output, DisplayRotation::Rotate90),
            Size::new(1080, 1920)
        );
        assert_eq!(
            render_extent(output, DisplayRotation::Rotate270),
            Size::new(1080, 1920)
        );
    }

    #[test]
    fn test_full_viewport_covers_extent() {
        let viewport = full_viewport(Size::new(800, 600));
        assert_eq!(viewport.width, 800.0);
        assert_eq!(viewport.height, 600.0);
        assert_eq!(viewport.min_depth, 0.0);
        assert_eq!(viewport.max_depth, 1.0);

        let scissor = full_scissor(Size::new(800, 600));
        assert_eq!(scissor.width(), 800);
        assert_eq!(scissor.height(), 600);
    }

    #[test]
    fn test_rotation_transform_is_inverse_rotation() {
        assert_eq!(
            rotation_transform(DisplayRotation::Identity),
            Matrix4::identity()
        );

        // 90° 补偿矩阵是 270° 的 Z 旋转
        let r90 = rotation_transform(DisplayRotation::Rotate90);
        assert_eq!(r90[(0, 1)], -1.0);
        assert_eq!(r90[(1, 0)], 1.0);
        assert_eq!(r90[(2, 2)], 1.0);

        // 相对朝向互为逆矩阵
        let r270 = rotation_transform(DisplayRotation::Rotate270);
        assert_eq!(r90 * r270, Matrix4::identity());
        let r180 = rotation_transform(DisplayRotation::Rotate180);
        assert_eq!(r180 * r180, Matrix4::identity());
    }

    #[test]
    fn test_best_output_picks_largest_overlap() {
        let outputs = [
            output("SDR", RectI::new(0, 0, 1920, 1080), false),
            output("HDR", RectI::new(1920, 0, 3840, 1080), true),
        ];

        // 窗口大部分落在第二台显示器上
        let window = RectI::new(1800, 100, 2600, 700);
        let best = best_output(&window, &outputs).unwrap();
        assert_eq!(best.name, "HDR");

        // 完全在桌面之外
        let offscreen = RectI::new(-500, -500, -100, -100);
        assert!(best_output(&offscreen, &outputs).is_none());
    }

    #[test]
    fn test_hdr10_detected_requires_bounds() {
        let outputs = [output("HDR", RectI::new(0, 0, 1920, 1080), true)];
        assert!(hdr10_detected(Some(RectI::new(100, 100, 800, 600)), &outputs));
        assert!(!hdr10_detected(None, &outputs));
        assert!(!hdr10_detected(Some(RectI::new(100, 100, 800, 600)), &[]));
    }

    #[test]
    fn test_color_space_selection() {
        // HDR 显示器 + HDR 选项 + HDR 格式
        assert_eq!(
            color_space_for(PixelFormat::Rgb10a2Unorm, true, true),
            ColorSpace::Hdr10Pq
        );
        assert_eq!(
            color_space_for(PixelFormat::Rgba16Float, true, true),
            ColorSpace::ScRgbLinear
        );

        // SDR 格式在 HDR 显示器上仍是 SDR
        assert_eq!(
            color_space_for(PixelFormat::Bgra8Unorm, true, true),
            ColorSpace::Sdr
        );

        // 显示器不支持 HDR10 时选项不起作用
        assert_eq!(
            color_space_for(PixelFormat::Rgb10a2Unorm, false, true),
            ColorSpace::Sdr
        );
        // 选项关闭时显示能力不起作用
        assert_eq!(
            color_space_for(PixelFormat::Rgb10a2Unorm, true, false),
            ColorSpace::Sdr
        );
    }
}
