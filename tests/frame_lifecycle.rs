//! 帧生命周期集成测试
//!
//! 用无头模拟后端驱动完整的构建 + 多帧呈现流程，覆盖栅栏节拍、
//! 尺寸变化、HDR 色彩空间协商与适配器补齐。

use dist_frame::frame::{DeviceResources, DeviceResourcesDesc};
use dist_frame::gfx::api::{
    ColorSpace, DeviceOptions, DisplayRotation, PixelFormat, RectI, ResourceState,
};
use dist_frame::gfx::null::{NullApi, NullInstance, NullTopology};

fn build_with(topology: NullTopology, desc: DeviceResourcesDesc) -> DeviceResources<NullApi> {
    let instance = NullInstance::with_topology(topology);
    let mut resources = DeviceResources::with_instance(instance, desc).unwrap();
    resources.create_device_resources().unwrap();
    resources.set_window(
        dist_frame::gfx::null::NullWindow,
        800,
        600,
        DisplayRotation::Identity,
    );
    resources.create_window_size_dependent_resources().unwrap();
    resources
}

fn build(desc: DeviceResourcesDesc) -> DeviceResources<NullApi> {
    build_with(NullTopology::default(), desc)
}

fn run_frame(resources: &mut DeviceResources<NullApi>) {
    resources
        .prepare(ResourceState::Present, ResourceState::RenderTarget)
        .unwrap();
    resources.present(ResourceState::RenderTarget).unwrap();
}

#[test]
fn test_basic_construction_scenario() {
    let desc = DeviceResourcesDesc {
        back_buffer_count: 2,
        device_count: 1,
        ..Default::default()
    };
    let resources = build(desc);

    assert_eq!(resources.screen_viewport().width, 800.0);
    assert_eq!(resources.screen_viewport().height, 600.0);
    assert_eq!(resources.back_buffer_count(), 2);
    assert_eq!(resources.device_count(), 1);
    assert!(resources.device(0).is_some());
    assert!(resources.render_target(0).is_some());
}

#[test]
fn test_fence_values_increase_across_slot_cycle() {
    let mut resources = build(DeviceResourcesDesc::default());
    let cycle = resources.back_buffer_count() as usize;

    // 每帧开始时记录当前槽位的栅栏值
    let mut observed = Vec::new();
    for _ in 0..cycle * 3 {
        let slot = resources.back_buffer_index() as usize;
        observed.push(resources.fence_value(0, slot).unwrap());
        run_frame(&mut resources);
    }

    // 同一槽位每绕一圈必须严格递增
    for k in 0..observed.len() - cycle {
        assert!(
            observed[k] < observed[k + cycle],
            "fence value at frame {} ({}) did not increase after a full cycle ({})",
            k,
            observed[k],
            observed[k + cycle]
        );
    }
}

#[test]
fn test_gpu_lag_forces_blocking_waits() {
    // 完成值落后信号两帧，槽位复用前必须真正等待；
    // 等待从不越过已发信号的值，否则模拟后端会报死锁错误
    let mut resources = build_with(
        NullTopology::default().with_fence_lag(2),
        DeviceResourcesDesc::default(),
    );

    for _ in 0..8 {
        run_frame(&mut resources);
    }

    let stats = resources.stats();
    assert_eq!(stats.frames_presented, 8);
    assert!(stats.blocking_waits > 0);
}

#[test]
fn test_multi_adapter_lockstep_presentation() {
    let desc = DeviceResourcesDesc {
        device_count: 3,
        ..Default::default()
    };
    let mut resources = build(desc);

    for _ in 0..4 {
        run_frame(&mut resources);
    }

    // 所有适配器共用同一槽位下标，栅栏值步调一致
    let slot = resources.back_buffer_index() as usize;
    let primary = resources.fence_value(0, slot).unwrap();
    for index in 1..3 {
        assert_eq!(resources.fence_value(index, slot).unwrap(), primary);
    }
    assert_eq!(resources.stats().frames_presented, 4);
}

#[test]
fn test_same_size_resize_is_noop() {
    let mut resources = build(DeviceResourcesDesc::default());
    let target_before = resources.render_target(0).unwrap().id();
    let depth_before = resources.depth_stencil(0).unwrap().id();

    let changed = resources
        .window_size_changed(800, 600, DisplayRotation::Identity)
        .unwrap();

    assert!(!changed);
    assert_eq!(resources.render_target(0).unwrap().id(), target_before);
    assert_eq!(resources.depth_stencil(0).unwrap().id(), depth_before);
}

#[test]
fn test_real_resize_recreates_resources() {
    let mut resources = build(DeviceResourcesDesc::default());
    let target_before = resources.render_target(0).unwrap().id();
    let rebuilds_before = resources.stats().swapchain_rebuilds;

    let changed = resources
        .window_size_changed(1280, 720, DisplayRotation::Identity)
        .unwrap();

    assert!(changed);
    assert_ne!(resources.render_target(0).unwrap().id(), target_before);
    assert_eq!(resources.screen_viewport().width, 1280.0);
    assert_eq!(resources.stats().swapchain_rebuilds, rebuilds_before + 1);

    // 重建后帧循环照常工作
    run_frame(&mut resources);
}

#[test]
fn test_rotation_resize_swaps_render_extent() {
    let mut resources = build(DeviceResourcesDesc::default());

    let changed = resources
        .window_size_changed(800, 600, DisplayRotation::Rotate270)
        .unwrap();

    assert!(changed);
    assert_eq!(resources.screen_viewport().width, 600.0);
    assert_eq!(resources.screen_viewport().height, 800.0);
    assert_eq!(resources.rotation(), DisplayRotation::Rotate270);
}

#[test]
fn test_minimized_window_clamps_to_one_pixel() {
    let mut resources = build(DeviceResourcesDesc::default());
    let changed = resources
        .window_size_changed(0, 0, DisplayRotation::Identity)
        .unwrap();

    assert!(changed);
    assert_eq!(resources.screen_viewport().width, 1.0);
    assert_eq!(resources.screen_viewport().height, 1.0);
}

fn hdr_topology() -> NullTopology {
    // HDR 显示器放在 SDR 主屏右侧，窗口整体移到它上面；
    // 两屏重叠时面积并列会选中先枚举的 SDR 屏
    NullTopology::default()
        .with_output("HDR panel", RectI::new(1920, 0, 3840, 1080), true)
        .with_window_bounds(RectI::new(2000, 100, 2800, 700))
}

#[test]
fn test_hdr10_format_negotiates_pq_color_space() {
    let desc = DeviceResourcesDesc {
        back_buffer_format: PixelFormat::Rgb10a2Unorm,
        options: DeviceOptions::ENABLE_HDR,
        ..Default::default()
    };
    let resources = build_with(hdr_topology(), desc);
    assert_eq!(resources.color_space(), ColorSpace::Hdr10Pq);
}

#[test]
fn test_float_format_negotiates_scrgb_color_space() {
    let desc = DeviceResourcesDesc {
        back_buffer_format: PixelFormat::Rgba16Float,
        options: DeviceOptions::ENABLE_HDR,
        ..Default::default()
    };
    let resources = build_with(hdr_topology(), desc);
    assert_eq!(resources.color_space(), ColorSpace::ScRgbLinear);
}

#[test]
fn test_sdr_display_stays_sdr_despite_hdr_flag() {
    // 默认拓扑只有一台 SDR 显示器
    let desc = DeviceResourcesDesc {
        back_buffer_format: PixelFormat::Rgb10a2Unorm,
        options: DeviceOptions::ENABLE_HDR,
        ..Default::default()
    };
    let resources = build(desc);
    assert_eq!(resources.color_space(), ColorSpace::Sdr);
}

#[test]
fn test_hdr_flag_off_stays_sdr_on_hdr_display() {
    let desc = DeviceResourcesDesc {
        back_buffer_format: PixelFormat::Rgb10a2Unorm,
        ..Default::default()
    };
    let resources = build_with(hdr_topology(), desc);
    assert_eq!(resources.color_space(), ColorSpace::Sdr);
}

#[test]
fn test_warp_fallback_fills_requested_count() {
    // 默认拓扑只有一块硬件显卡，请求三个适配器
    let desc = DeviceResourcesDesc {
        device_count: 3,
        ..Default::default()
    };
    let resources = build(desc);

    assert_eq!(resources.device_count(), 3);
    assert!(!resources.adapter_info(0).unwrap().is_software);
    assert!(resources.adapter_info(1).unwrap().is_software);
    assert!(resources.adapter_info(2).unwrap().is_software);
}

#[test]
fn test_tearing_downgrade_without_display_support() {
    let desc = DeviceResourcesDesc {
        options: DeviceOptions::ALLOW_TEARING,
        ..Default::default()
    };
    let resources = build_with(NullTopology::default().without_tearing(), desc);
    assert!(!resources.device_options().contains(DeviceOptions::ALLOW_TEARING));
}
