//! Null 后端：确定性的无头模拟实现
//!
//! 在没有 GPU、没有窗口系统的环境（CI、服务器）里驱动完整的
//! 设备/交换链/帧循环/恢复逻辑。拓扑可配置，故障可注入，
//! 所有句柄都带身份编号以便断言重建行为。

mod backend;
mod topology;

pub use backend::{
    NullAdapter, NullApi, NullCommandAllocator, NullCommandList, NullDescriptorHeap, NullDevice,
    NullFence, NullInstance, NullQueue, NullResource, NullSwapchain, NullWindow,
};
pub use topology::{NullAdapterDesc, NullTopology};
