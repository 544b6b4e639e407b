//! dist_frame - 多适配器设备与帧生命周期管理
//!
//! 本库管理 GPU 设备、交换链与帧循环的完整生命周期：按策略选择
//! 适配器（硬件不足以 WARP 补齐）、为每个适配器维护设备上下文、
//! 协商交换链的 HDR 色彩空间与显示旋转，并以栅栏节拍驱动
//! Prepare/Present 帧括号。设备丢失（移除/重置）在内部走恢复
//! 流程，通过观察者回调通知客户端，不作为错误外传。
//!
//! # 模块结构
//!
//! - `core`：配置、日志与错误类型
//! - `gfx`：后端抽象（`api`）与两个实现（`dx12`、`null`）
//! - `frame`：适配器选择、设备上下文、交换链几何与帧循环总控
//!
//! # 使用示例
//!
//! ```no_run
//! use dist_frame::frame::{DeviceResources, DeviceResourcesDesc};
//! use dist_frame::gfx::api::ResourceState;
//! use dist_frame::gfx::NullApi;
//! use dist_frame::gfx::null::NullWindow;
//! use dist_frame::gfx::api::DisplayRotation;
//!
//! # fn main() -> dist_frame::core::error::Result<()> {
//! let mut resources = DeviceResources::<NullApi>::new(DeviceResourcesDesc::default())?;
//! resources.create_device_resources()?;
//! resources.set_window(NullWindow, 800, 600, DisplayRotation::Identity);
//! resources.create_window_size_dependent_resources()?;
//!
//! // 每帧一对括号，中间录制渲染命令
//! resources.prepare(ResourceState::Present, ResourceState::RenderTarget)?;
//! resources.present(ResourceState::RenderTarget)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod frame;
pub mod gfx;

pub use crate::core::config::FrameConfig;
pub use crate::core::error::{FrameError, Result};
pub use crate::frame::{DeviceNotify, DeviceResources, DeviceResourcesDesc};
