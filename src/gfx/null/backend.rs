//! Null 后端实现
//!
//! 一个完全确定性的内存后端：不触碰任何平台 API，但忠实模拟
//! 帧管理器关心的全部语义——适配器枚举、设备代际、带滞后的栅栏、
//! 交换链下标轮转、设备移除。CI 与测试在任何平台上都能驱动
//! 完整的设备/交换链/帧循环/恢复路径。
//!
//! 故障注入通过 [`NullInstance`] 上的方法完成：
//! `fail_present_after`、`poison_device`、`change_default_adapter_luid`、
//! `invalidate_factory`。

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::core::error::{GraphicsError, Result};
use crate::gfx::api::{
    AdapterInfo, ColorSpace, DeviceLoss, DisplayRotation, FeatureLevel, GpuAdapter, GpuApi,
    GpuCommandAllocator, GpuCommandList, GpuDevice, GpuFence, GpuInstance, GpuQueue, GpuSwapchain,
    InstanceDesc, OutputInfo, PixelFormat, PowerPreference, RectI, ResourceState, SurfaceStatus,
    SwapchainDesc,
};

use super::topology::{NullTopology, WARP_LUID};

/// Null 后端标记类型
pub struct NullApi;

impl GpuApi for NullApi {
    type Instance = NullInstance;
    type Adapter = NullAdapter;
    type Device = NullDevice;
    type Queue = NullQueue;
    type CommandAllocator = NullCommandAllocator;
    type CommandList = NullCommandList;
    type Fence = NullFence;
    type Swapchain = NullSwapchain;
    type Resource = NullResource;
    type DescriptorHeap = NullDescriptorHeap;
    type DescriptorHandle = u64;
    type Window = NullWindow;

    const NAME: &'static str = "Null";
}

/// 无头窗口目标
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWindow;

type Shared = Rc<RefCell<NullState>>;

/// 整个模拟平台的可变状态，被所有派生句柄共享
#[derive(Debug)]
struct NullState {
    topology: NullTopology,
    factory_current: bool,
    next_device_id: u64,
    /// id 小于该值的设备视为已移除
    poisoned_below: u64,
    poison_reason: String,
    /// 还剩几次成功呈现后注入设备移除
    fail_present_in: Option<u64>,
    presents: u64,
    /// 加到全新枚举出的 LUID 上，模拟默认适配器变化
    luid_bump: u64,
    next_resource_id: u64,
    next_heap_base: u64,
}

impl NullState {
    fn new(topology: NullTopology) -> Self {
        Self {
            topology,
            factory_current: true,
            next_device_id: 1,
            poisoned_below: 0,
            poison_reason: String::new(),
            fail_present_in: None,
            presents: 0,
            luid_bump: 0,
            next_resource_id: 1,
            next_heap_base: 0,
        }
    }

    fn device_removed(&self, device_id: u64) -> Option<DeviceLoss> {
        if device_id < self.poisoned_below {
            Some(DeviceLoss::Removed(self.poison_reason.clone()))
        } else {
            None
        }
    }

    fn alloc_resource_id(&mut self) -> u64 {
        let id = self.next_resource_id;
        self.next_resource_id += 1;
        id
    }
}

// ---------------------------------------------------------------------------
// 实例
// ---------------------------------------------------------------------------

/// Null 实例：模拟工厂 + 故障注入入口
pub struct NullInstance {
    shared: Shared,
}

impl NullInstance {
    /// 在给定拓扑上创建实例
    pub fn with_topology(topology: NullTopology) -> Self {
        Self {
            shared: Rc::new(RefCell::new(NullState::new(topology))),
        }
    }

    /// 再成功呈现 `n` 次之后，下一次呈现报告设备移除
    ///
    /// 注入生效时当前所有设备同时被毒化，与真实 TDR 的表现一致。
    pub fn fail_present_after(&self, n: u64) {
        self.shared.borrow_mut().fail_present_in = Some(n);
    }

    /// 立即毒化当前所有设备
    pub fn poison_device(&self, reason: &str) {
        let mut state = self.shared.borrow_mut();
        state.poisoned_below = state.next_device_id;
        state.poison_reason = reason.to_string();
        info!(reason, "Null backend: devices poisoned");
    }

    /// 让后续的全新枚举产生不同的默认适配器 LUID
    pub fn change_default_adapter_luid(&self) {
        self.shared.borrow_mut().luid_bump += 0x10;
    }

    /// 使工厂的枚举信息过期
    pub fn invalidate_factory(&self) {
        self.shared.borrow_mut().factory_current = false;
    }

    /// 至今成功呈现的帧数
    pub fn presents(&self) -> u64 {
        self.shared.borrow().presents
    }

    fn sorted_adapters(&self, preference: PowerPreference) -> Vec<NullAdapter> {
        let state = self.shared.borrow();
        let mut descs: Vec<_> = state.topology.adapters.clone();
        match preference {
            PowerPreference::None => {}
            PowerPreference::HighPerformance => {
                descs.sort_by(|a, b| b.dedicated_video_memory.cmp(&a.dedicated_video_memory));
            }
            PowerPreference::MinimumPower => {
                descs.sort_by(|a, b| a.dedicated_video_memory.cmp(&b.dedicated_video_memory));
            }
        }

        descs
            .into_iter()
            .enumerate()
            .map(|(ordinal, desc)| NullAdapter {
                max_level: desc.max_level,
                info: AdapterInfo {
                    ordinal: ordinal as u32,
                    description: desc.description,
                    vendor_id: desc.vendor_id,
                    device_id: desc.device_id,
                    dedicated_video_memory: desc.dedicated_video_memory,
                    is_software: desc.software,
                    luid: desc.luid + state.luid_bump,
                },
            })
            .collect()
    }
}

impl GpuInstance<NullApi> for NullInstance {
    fn new(_desc: &InstanceDesc) -> Result<Self> {
        Ok(Self::with_topology(NullTopology::default()))
    }

    fn supports_tearing(&self) -> bool {
        self.shared.borrow().topology.tearing_supported
    }

    fn enumerate_adapters(&self, preference: PowerPreference) -> Result<Vec<NullAdapter>> {
        Ok(self.sorted_adapters(preference))
    }

    fn warp_adapter(&self) -> Result<NullAdapter> {
        let state = self.shared.borrow();
        if !state.topology.warp_available {
            return Err(GraphicsError::AdapterUnavailable(
                "WARP adapter not available on this system".to_string(),
            )
            .into());
        }
        Ok(NullAdapter {
            max_level: FeatureLevel::Level12_1,
            info: AdapterInfo {
                ordinal: u32::MAX,
                description: "Null WARP (software)".to_string(),
                vendor_id: 0x1414,
                device_id: 0x8C,
                dedicated_video_memory: 0,
                is_software: true,
                luid: WARP_LUID + state.luid_bump,
            },
        })
    }

    fn probe_adapter(&self, adapter: &NullAdapter, min_level: FeatureLevel) -> bool {
        adapter.max_level >= min_level
    }

    fn create_device(
        &self,
        adapter: &NullAdapter,
        min_level: FeatureLevel,
    ) -> Result<(NullDevice, FeatureLevel)> {
        let level = FeatureLevel::DESCENDING
            .iter()
            .copied()
            .find(|l| *l <= adapter.max_level && *l >= min_level)
            .ok_or_else(|| {
                GraphicsError::DeviceCreation(format!(
                    "adapter '{}' does not support feature level {}",
                    adapter.info.description,
                    min_level.as_str()
                ))
            })?;

        let mut state = self.shared.borrow_mut();
        let id = state.next_device_id;
        state.next_device_id += 1;
        debug!(id, level = level.as_str(), adapter = %adapter.info.description, "Null device created");

        Ok((
            NullDevice {
                shared: Rc::clone(&self.shared),
                id,
                luid: adapter.info.luid,
                level,
            },
            level,
        ))
    }

    fn enumerate_outputs(&self) -> Result<Vec<OutputInfo>> {
        Ok(self.shared.borrow().topology.outputs.clone())
    }

    fn window_bounds(&self, _window: &NullWindow) -> Option<RectI> {
        let state = self.shared.borrow();
        if state.topology.window_visible {
            Some(state.topology.window_bounds)
        } else {
            None
        }
    }

    fn default_adapter_luid(&self, preference: PowerPreference) -> Result<Option<u64>> {
        Ok(self
            .sorted_adapters(preference)
            .first()
            .map(|a| a.info.luid))
    }

    fn is_current(&self) -> bool {
        self.shared.borrow().factory_current
    }

    fn refresh(&mut self) -> Result<()> {
        self.shared.borrow_mut().factory_current = true;
        Ok(())
    }

    fn create_swapchain(
        &self,
        queue: &NullQueue,
        _window: &NullWindow,
        desc: &SwapchainDesc,
    ) -> Result<NullSwapchain> {
        let mut state = self.shared.borrow_mut();
        if state.device_removed(queue.device_id).is_some() {
            return Err(GraphicsError::SwapchainCreation(
                "bound device has been removed".to_string(),
            )
            .into());
        }

        let buffers = (0..desc.buffer_count)
            .map(|_| NullResource {
                id: state.alloc_resource_id(),
                width: desc.width,
                height: desc.height,
                format: desc.format,
            })
            .collect();

        debug!(
            width = desc.width,
            height = desc.height,
            buffers = desc.buffer_count,
            "Null swapchain created"
        );

        Ok(NullSwapchain {
            shared: Rc::clone(&self.shared),
            device_id: queue.device_id,
            width: desc.width,
            height: desc.height,
            format: desc.format,
            buffer_count: desc.buffer_count,
            buffers,
            current: 0,
            color_space: ColorSpace::Sdr,
            rotation: DisplayRotation::Identity,
        })
    }

    fn report_live_objects(&self) {
        let state = self.shared.borrow();
        debug!(
            resources_allocated = state.next_resource_id - 1,
            "Null backend live object report"
        );
    }
}

// ---------------------------------------------------------------------------
// 适配器 / 设备
// ---------------------------------------------------------------------------

/// Null 适配器句柄
#[derive(Debug, Clone)]
pub struct NullAdapter {
    info: AdapterInfo,
    max_level: FeatureLevel,
}

impl GpuAdapter for NullAdapter {
    fn info(&self) -> &AdapterInfo {
        &self.info
    }
}

/// Null 逻辑设备，代际编号标识身份
pub struct NullDevice {
    shared: Shared,
    id: u64,
    luid: u64,
    level: FeatureLevel,
}

impl NullDevice {
    /// 设备身份编号；恢复重建后必然不同
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn feature_level(&self) -> FeatureLevel {
        self.level
    }
}

impl GpuDevice<NullApi> for NullDevice {
    fn create_queue(&self) -> Result<NullQueue> {
        Ok(NullQueue {
            shared: Rc::clone(&self.shared),
            device_id: self.id,
        })
    }

    fn create_command_allocator(&self) -> Result<NullCommandAllocator> {
        Ok(NullCommandAllocator { resets: 0 })
    }

    fn create_command_list(&self, _allocator: &NullCommandAllocator) -> Result<NullCommandList> {
        // 与真实后端一致：创建即关闭，等待第一次 reset
        Ok(NullCommandList {
            open: Cell::new(false),
            transitions: Cell::new(0),
        })
    }

    fn create_fence(&self, initial: u64) -> Result<NullFence> {
        let lag = self.shared.borrow().topology.fence_lag;
        Ok(NullFence {
            completed: Cell::new(initial),
            pending: Cell::new(initial),
            lag,
        })
    }

    fn create_rtv_heap(&self, capacity: u32) -> Result<NullDescriptorHeap> {
        let mut state = self.shared.borrow_mut();
        state.next_heap_base += 0x1000;
        Ok(NullDescriptorHeap {
            base: state.next_heap_base,
            capacity,
        })
    }

    fn create_dsv_heap(&self, capacity: u32) -> Result<NullDescriptorHeap> {
        self.create_rtv_heap(capacity)
    }

    fn create_render_target(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<NullResource> {
        let mut state = self.shared.borrow_mut();
        Ok(NullResource {
            id: state.alloc_resource_id(),
            width,
            height,
            format,
        })
    }

    fn create_depth_stencil(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<NullResource> {
        let mut state = self.shared.borrow_mut();
        Ok(NullResource {
            id: state.alloc_resource_id(),
            width,
            height,
            format,
        })
    }

    fn create_rtv(
        &self,
        heap: &NullDescriptorHeap,
        index: u32,
        _resource: &NullResource,
        _format: PixelFormat,
    ) {
        debug_assert!(index < heap.capacity, "RTV index out of heap capacity");
    }

    fn create_dsv(
        &self,
        heap: &NullDescriptorHeap,
        index: u32,
        _resource: &NullResource,
        _format: PixelFormat,
    ) {
        debug_assert!(index < heap.capacity, "DSV index out of heap capacity");
    }

    fn descriptor_handle(&self, heap: &NullDescriptorHeap, index: u32) -> u64 {
        heap.base + index as u64
    }

    fn adapter_luid(&self) -> u64 {
        self.luid
    }

    fn removal_reason(&self) -> Option<DeviceLoss> {
        self.shared.borrow().device_removed(self.id)
    }
}

// ---------------------------------------------------------------------------
// 队列 / 命令 / 栅栏
// ---------------------------------------------------------------------------

/// Null 命令队列
pub struct NullQueue {
    shared: Shared,
    device_id: u64,
}

impl GpuQueue<NullApi> for NullQueue {
    fn execute(&self, list: &NullCommandList) {
        debug_assert!(!list.open.get(), "executing a command list that was not closed");
    }

    fn signal(&self, fence: &NullFence, value: u64) -> Result<()> {
        if let Some(loss) = self.shared.borrow().device_removed(self.device_id) {
            return Err(GraphicsError::Synchronization(format!(
                "signal on removed device: {:?}",
                loss
            ))
            .into());
        }
        fence.pending.set(value);
        // 完成值按配置的滞后推进，模拟 GPU 落后 CPU 的常态
        let caught_up = value.saturating_sub(fence.lag);
        if caught_up > fence.completed.get() {
            fence.completed.set(caught_up);
        }
        Ok(())
    }
}

/// Null 命令分配器
pub struct NullCommandAllocator {
    resets: u64,
}

impl NullCommandAllocator {
    pub fn reset_count(&self) -> u64 {
        self.resets
    }
}

impl GpuCommandAllocator for NullCommandAllocator {
    fn reset(&mut self) -> Result<()> {
        self.resets += 1;
        Ok(())
    }
}

/// Null 命令列表，跟踪开闭状态以捕获时序错误
pub struct NullCommandList {
    open: Cell<bool>,
    transitions: Cell<u32>,
}

impl NullCommandList {
    pub fn transition_count(&self) -> u32 {
        self.transitions.get()
    }
}

impl GpuCommandList<NullApi> for NullCommandList {
    fn reset(&mut self, _allocator: &NullCommandAllocator) -> Result<()> {
        if self.open.get() {
            return Err(
                GraphicsError::Backend("command list reset while still open".to_string()).into(),
            );
        }
        self.open.set(true);
        self.transitions.set(0);
        Ok(())
    }

    fn transition(
        &mut self,
        _resource: &NullResource,
        before: ResourceState,
        after: ResourceState,
    ) {
        debug_assert!(self.open.get(), "barrier recorded on a closed command list");
        debug_assert!(before != after, "redundant barrier");
        self.transitions.set(self.transitions.get() + 1);
    }

    fn close(&mut self) -> Result<()> {
        if !self.open.get() {
            return Err(
                GraphicsError::Backend("closing a command list that is not open".to_string())
                    .into(),
            );
        }
        self.open.set(false);
        Ok(())
    }
}

/// Null 栅栏：信号即知，完成值按滞后推进
pub struct NullFence {
    completed: Cell<u64>,
    pending: Cell<u64>,
    lag: u64,
}

impl GpuFence for NullFence {
    fn completed_value(&self) -> u64 {
        self.completed.get()
    }

    fn wait_until(&self, value: u64) -> Result<()> {
        if value > self.pending.get() {
            // 真实后端会在此无限阻塞；模拟后端把必然的死锁暴露为错误
            return Err(GraphicsError::Synchronization(format!(
                "waiting for fence value {} but only {} has been signaled",
                value,
                self.pending.get()
            ))
            .into());
        }
        if value > self.completed.get() {
            self.completed.set(value);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 资源 / 描述符 / 交换链
// ---------------------------------------------------------------------------

/// Null 资源，编号即身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullResource {
    id: u64,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl NullResource {
    /// 资源身份编号；任何重建都会产生新编号
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

/// Null 描述符堆
pub struct NullDescriptorHeap {
    base: u64,
    capacity: u32,
}

/// Null 交换链
pub struct NullSwapchain {
    shared: Shared,
    device_id: u64,
    width: u32,
    height: u32,
    format: PixelFormat,
    buffer_count: u32,
    buffers: Vec<NullResource>,
    current: u32,
    color_space: ColorSpace,
    rotation: DisplayRotation,
}

impl NullSwapchain {
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }
}

impl GpuSwapchain<NullApi> for NullSwapchain {
    fn resize(
        &mut self,
        width: u32,
        height: u32,
        buffer_count: u32,
        format: PixelFormat,
        _allow_tearing: bool,
    ) -> Result<SurfaceStatus> {
        let mut state = self.shared.borrow_mut();
        if let Some(loss) = state.device_removed(self.device_id) {
            return Ok(SurfaceStatus::DeviceLost(loss));
        }

        self.width = width;
        self.height = height;
        self.format = format;
        self.buffer_count = buffer_count;
        self.buffers = (0..buffer_count)
            .map(|_| NullResource {
                id: state.alloc_resource_id(),
                width,
                height,
                format,
            })
            .collect();
        // 与翻转模型一致：重建后当前下标回到 0
        self.current = 0;
        Ok(SurfaceStatus::Ok)
    }

    fn back_buffer(&self, index: u32) -> Result<NullResource> {
        self.buffers
            .get(index as usize)
            .copied()
            .ok_or_else(|| {
                GraphicsError::Backend(format!("back buffer index {} out of range", index)).into()
            })
    }

    fn current_back_buffer_index(&self) -> u32 {
        self.current
    }

    fn present(&mut self, _interval: u32, _allow_tearing: bool) -> Result<SurfaceStatus> {
        let mut state = self.shared.borrow_mut();

        if let Some(loss) = state.device_removed(self.device_id) {
            return Ok(SurfaceStatus::DeviceLost(loss));
        }

        if let Some(remaining) = state.fail_present_in {
            if remaining == 0 {
                state.fail_present_in = None;
                state.poisoned_below = state.next_device_id;
                state.poison_reason = "simulated device removal at present".to_string();
                let reason = state.poison_reason.clone();
                info!("Null backend: injected device removal at present");
                return Ok(SurfaceStatus::DeviceLost(DeviceLoss::Removed(reason)));
            }
            state.fail_present_in = Some(remaining - 1);
        }

        state.presents += 1;
        self.current = (self.current + 1) % self.buffer_count;
        Ok(SurfaceStatus::Ok)
    }

    fn supports_color_space(&self, _color_space: ColorSpace) -> bool {
        true
    }

    fn set_color_space(&mut self, color_space: ColorSpace) -> Result<()> {
        self.color_space = color_space;
        Ok(())
    }

    fn set_rotation(&mut self, rotation: DisplayRotation) -> Result<()> {
        self.rotation = rotation;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::null::topology::NullAdapterDesc;

    fn instance(topology: NullTopology) -> NullInstance {
        NullInstance::with_topology(topology)
    }

    #[test]
    fn test_warp_unavailable_is_fatal() {
        let inst = instance(NullTopology::empty().without_warp());
        assert!(inst.warp_adapter().is_err());
    }

    #[test]
    fn test_min_power_enumeration_order() {
        let inst = instance(
            NullTopology::empty()
                .with_adapter(NullAdapterDesc::discrete("dGPU"))
                .with_adapter(NullAdapterDesc::integrated("iGPU")),
        );

        let adapters = inst.enumerate_adapters(PowerPreference::MinimumPower).unwrap();
        assert_eq!(adapters[0].info().description, "iGPU");
        assert_eq!(adapters[0].info().ordinal, 0);

        let adapters = inst.enumerate_adapters(PowerPreference::HighPerformance).unwrap();
        assert_eq!(adapters[0].info().description, "dGPU");
    }

    #[test]
    fn test_device_generation_and_poison() {
        let inst = instance(NullTopology::default());
        let adapter = &inst.enumerate_adapters(PowerPreference::None).unwrap()[0];

        let (first, _) = inst.create_device(adapter, FeatureLevel::Level11_0).unwrap();
        assert!(first.removal_reason().is_none());

        inst.poison_device("test poison");
        assert!(matches!(first.removal_reason(), Some(DeviceLoss::Removed(_))));

        let (second, _) = inst.create_device(adapter, FeatureLevel::Level11_0).unwrap();
        assert!(second.removal_reason().is_none());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_fence_lag_and_wait() {
        let inst = instance(NullTopology::default().with_fence_lag(1));
        let adapter = &inst.enumerate_adapters(PowerPreference::None).unwrap()[0];
        let (device, _) = inst.create_device(adapter, FeatureLevel::Level11_0).unwrap();
        let queue = device.create_queue().unwrap();
        let fence = device.create_fence(0).unwrap();

        queue.signal(&fence, 3).unwrap();
        assert_eq!(fence.completed_value(), 2);

        fence.wait_until(3).unwrap();
        assert_eq!(fence.completed_value(), 3);

        // 等待从未发出的信号是死锁，模拟后端将其暴露为错误
        assert!(fence.wait_until(4).is_err());
    }

    #[test]
    fn test_present_failure_script() {
        let inst = instance(NullTopology::default());
        let adapter = &inst.enumerate_adapters(PowerPreference::None).unwrap()[0];
        let (device, _) = inst.create_device(adapter, FeatureLevel::Level11_0).unwrap();
        let queue = device.create_queue().unwrap();
        let mut swapchain = inst
            .create_swapchain(
                &queue,
                &NullWindow,
                &SwapchainDesc {
                    width: 640,
                    height: 480,
                    format: PixelFormat::Bgra8Unorm,
                    buffer_count: 2,
                    allow_tearing: false,
                },
            )
            .unwrap();

        inst.fail_present_after(2);
        assert_eq!(swapchain.present(1, false).unwrap(), SurfaceStatus::Ok);
        assert_eq!(swapchain.present(1, false).unwrap(), SurfaceStatus::Ok);
        assert!(matches!(
            swapchain.present(1, false).unwrap(),
            SurfaceStatus::DeviceLost(DeviceLoss::Removed(_))
        ));
        // 失败的同时设备被毒化
        assert!(device.removal_reason().is_some());
        assert_eq!(inst.presents(), 2);
    }

    #[test]
    fn test_swapchain_index_rotation_and_resize_identity() {
        let inst = instance(NullTopology::default());
        let adapter = &inst.enumerate_adapters(PowerPreference::None).unwrap()[0];
        let (device, _) = inst.create_device(adapter, FeatureLevel::Level11_0).unwrap();
        let queue = device.create_queue().unwrap();
        let mut swapchain = inst
            .create_swapchain(
                &queue,
                &NullWindow,
                &SwapchainDesc {
                    width: 640,
                    height: 480,
                    format: PixelFormat::Bgra8Unorm,
                    buffer_count: 3,
                    allow_tearing: false,
                },
            )
            .unwrap();

        assert_eq!(swapchain.current_back_buffer_index(), 0);
        swapchain.present(1, false).unwrap();
        assert_eq!(swapchain.current_back_buffer_index(), 1);
        swapchain.present(1, false).unwrap();
        swapchain.present(1, false).unwrap();
        assert_eq!(swapchain.current_back_buffer_index(), 0);

        let before = swapchain.back_buffer(0).unwrap().id();
        swapchain.resize(800, 600, 3, PixelFormat::Bgra8Unorm, false).unwrap();
        let after = swapchain.back_buffer(0).unwrap();
        assert_ne!(before, after.id());
        assert_eq!(after.width(), 800);
        assert_eq!(swapchain.current_back_buffer_index(), 0);
    }

    #[test]
    fn test_luid_bump_changes_fresh_enumeration() {
        let inst = instance(NullTopology::default());
        let before = inst.default_adapter_luid(PowerPreference::None).unwrap();
        inst.change_default_adapter_luid();
        let after = inst.default_adapter_luid(PowerPreference::None).unwrap();
        assert_ne!(before, after);
    }
}
