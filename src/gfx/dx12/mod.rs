//! DirectX 12 后端模块
//!
//! `backend` 把 `gfx::api` 的 trait 族落到 DXGI/D3D12 上，
//! `convert` 负责通用类型与平台枚举的互转。

pub mod backend;
pub mod convert;

pub use backend::{
    Dx12Adapter, Dx12Api, Dx12Device, Dx12Instance, Dx12Queue, Dx12Swapchain, Dx12Window,
};
