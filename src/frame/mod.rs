//! 帧生命周期管理
//!
//! 本模块提供设备、交换链与帧循环的统一管理：选择适配器、
//! 构建每适配器的设备上下文、维护交换链与尺寸相关资源，
//! 并驱动 Prepare/Present 帧括号与设备丢失恢复。
//!
//! # 架构设计
//!
//! - `DeviceResources`：对外门面，泛化在 `gfx` 的后端抽象之上
//! - `AdapterContext`：单适配器的句柄集合与逐帧操作
//! - `adapter`：按策略选择恰好 N 个适配器，不足以 WARP 补齐
//! - `swapchain`：几何与色彩空间推导的纯函数部分
//! - `sync` / `stats` / `recovery`：栅栏记账、帧统计、丢失观察者

pub mod adapter;
pub mod context;
pub mod recovery;
pub mod resources;
pub mod stats;
pub mod swapchain;
pub mod sync;

pub use adapter::{select_adapters, AdapterPolicy};
pub use context::AdapterContext;
pub use recovery::{DeviceNotify, LossOrigin};
pub use resources::{DeviceResources, DeviceResourcesDesc};
pub use stats::FrameStatsSnapshot;
pub use swapchain::rotation_transform;
pub use sync::{FenceValue, FramePhase};
