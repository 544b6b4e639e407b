//! dist_frame 演示程序
//!
//! 驱动帧管理器跑一个最小的呈现循环：加载配置、初始化日志、
//! 创建窗口与设备资源，每帧做一对 Prepare/Present 括号。
//! Windows 上走 DirectX 12 后端；其他平台以无头模拟后端跑
//! 固定帧数后退出，用于冒烟验证。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件（config.toml）
//! cargo run
//!
//! # 命令行覆盖
//! cargo run -- --warp --hdr --devices 2 --width 1280 --height 720
//! ```

use std::process;

use tracing::{error, info};

use dist_frame::core::{config::FrameConfig, log};

fn main() {
    // 配置加载与参数覆盖在日志初始化之前
    let mut config = FrameConfig::from_file_or_default("config.toml");
    config.apply_args(std::env::args());

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    }

    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);

    info!(version = env!("CARGO_PKG_VERSION"), "dist_frame starting");
    info!(
        width = config.window.width,
        height = config.window.height,
        buffers = config.graphics.back_buffer_count,
        devices = config.graphics.device_count,
        hdr = config.graphics.enable_hdr,
        tearing = config.graphics.allow_tearing,
        warp = config.graphics.force_warp,
        "Graphics configuration"
    );

    if let Err(e) = run(&config) {
        error!("Fatal error: {:#}", e);
        eprintln!("Fatal error: {:#}", e);
        process::exit(1);
    }
}

#[cfg(target_os = "windows")]
fn run(config: &FrameConfig) -> anyhow::Result<()> {
    use std::rc::Rc;

    use dist_frame::frame::{DeviceNotify, DeviceResources, DeviceResourcesDesc};
    use dist_frame::gfx::api::{DisplayRotation, ResourceState};
    use dist_frame::gfx::dx12::{Dx12Api, Dx12Window};
    use tracing::{debug, warn};
    use windows::Win32::Foundation::HWND;
    use winit::dpi::LogicalSize;
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::{ControlFlow, EventLoop};
    use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};
    use winit::window::WindowBuilder;

    /// 演示程序没有自己的 GPU 资源，观察者只记录恢复节奏
    struct LossLogger;

    impl DeviceNotify for LossLogger {
        fn on_device_lost(&self) {
            warn!("Device lost, application resources released");
        }

        fn on_device_restored(&self) {
            info!("Device restored, application resources recreated");
        }
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&config.window.title)
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
        .with_resizable(config.window.resizable)
        .build(&event_loop)?;

    let hwnd = match window.window_handle()?.as_raw() {
        RawWindowHandle::Win32(handle) => HWND(handle.hwnd.get() as *mut core::ffi::c_void),
        _ => anyhow::bail!("unsupported window handle type"),
    };

    let mut resources =
        DeviceResources::<Dx12Api>::new(DeviceResourcesDesc::from_config(&config.graphics))?;
    resources.create_device_resources()?;

    let size = window.inner_size();
    resources.set_window(Dx12Window(hwnd), size.width, size.height, DisplayRotation::Identity);
    resources.create_window_size_dependent_resources()?;

    let observer: Rc<dyn DeviceNotify> = Rc::new(LossLogger);
    resources.register_device_notify(Rc::downgrade(&observer));

    info!("Entering main loop");
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run(move |event, elwt| {
        // 观察者随事件循环存活
        let _ = &observer;
        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, draining GPU");
                if let Err(e) = resources.wait_for_gpu() {
                    warn!("GPU drain on shutdown failed: {}", e);
                }
                let stats = resources.stats();
                info!(
                    frames = stats.frames_presented,
                    waits = stats.blocking_waits,
                    recoveries = stats.recoveries,
                    "Session statistics"
                );
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(new_size),
                ..
            } => {
                debug!(width = new_size.width, height = new_size.height, "Window resized");
                let rotation = resources.rotation();
                if let Err(e) =
                    resources.window_size_changed(new_size.width, new_size.height, rotation)
                {
                    error!("Resize failed: {}", e);
                    elwt.exit();
                }
            }
            // 重新获得焦点时主动验证设备，默认适配器变化不会从呈现路径报出来
            Event::WindowEvent {
                event: WindowEvent::Focused(true),
                ..
            } => {
                if let Err(e) = resources.validate_device() {
                    error!("Device validation failed: {}", e);
                    elwt.exit();
                }
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                let frame = resources
                    .prepare(ResourceState::Present, ResourceState::RenderTarget)
                    .and_then(|_| resources.present(ResourceState::RenderTarget));
                if let Err(e) = frame {
                    error!("Frame failed: {}", e);
                    elwt.exit();
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run(config: &FrameConfig) -> anyhow::Result<()> {
    use dist_frame::frame::{DeviceResources, DeviceResourcesDesc};
    use dist_frame::gfx::api::{DisplayRotation, ResourceState};
    use dist_frame::gfx::null::NullWindow;
    use dist_frame::gfx::NullApi;

    const SMOKE_FRAMES: u32 = 120;

    let mut resources =
        DeviceResources::<NullApi>::new(DeviceResourcesDesc::from_config(&config.graphics))?;
    resources.create_device_resources()?;
    resources.set_window(
        NullWindow,
        config.window.width,
        config.window.height,
        DisplayRotation::Identity,
    );
    resources.create_window_size_dependent_resources()?;

    info!(frames = SMOKE_FRAMES, "Running headless smoke loop");
    for _ in 0..SMOKE_FRAMES {
        resources.prepare(ResourceState::Present, ResourceState::RenderTarget)?;
        resources.present(ResourceState::RenderTarget)?;
    }

    resources.wait_for_gpu()?;
    let stats = resources.stats();
    info!(
        frames = stats.frames_presented,
        waits = stats.blocking_waits,
        "Headless run complete"
    );
    Ok(())
}
