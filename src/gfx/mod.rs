//! 图形后端模块
//!
//! 本模块封装了不同图形 API 的底层实现，包括：
//! - DirectX 12：Windows 平台的高性能图形 API
//! - Null：确定性的无头模拟后端，用于 CI 与测试
//!
//! 所有后端都实现了 `api` 中的统一 trait 族，
//! 确保上层的设备/交换链/帧循环逻辑可以在后端之间无缝切换。

pub mod api;
#[cfg(target_os = "windows")]
pub mod dx12;
pub mod null;

pub use api::GpuApi;
#[cfg(target_os = "windows")]
pub use dx12::Dx12Api;
pub use null::NullApi;
