//! 单适配器设备上下文
//!
//! 一个逻辑 GPU 的全部句柄：设备、队列、每槽位命令分配器、
//! 命令列表、栅栏与槽位栅栏值、RTV/DSV 堆、渲染目标与深度缓冲。
//! 多适配器编排由上层 `DeviceResources` 完成，这里只负责
//! 单个适配器的构建、拆毁与逐帧操作。
//!
//! 构建顺序是硬约束：调试层在实例创建时已打开（在任何设备之前），
//! 命令分配器为每个槽位预先创建，帧循环中途不再分配。

use tracing::{debug, info};

use crate::core::error::{GraphicsError, Result};
use crate::gfx::api::{
    AdapterInfo, FeatureLevel, GpuAdapter, GpuApi, GpuCommandAllocator, GpuCommandList, GpuDevice,
    GpuFence, GpuInstance, GpuQueue, GpuSwapchain, PixelFormat, ResourceState,
};

use super::sync::{FenceValue, FrameSlots};

/// 深度模板视图在 DSV 堆中的槽位
const DSV_SLOT: u32 = 0;

/// 单适配器的设备上下文
pub struct AdapterContext<A: GpuApi> {
    index: usize,
    adapter: A::Adapter,
    device: A::Device,
    feature_level: FeatureLevel,
    queue: A::Queue,
    allocators: Vec<A::CommandAllocator>,
    command_list: A::CommandList,
    fence: A::Fence,
    slots: FrameSlots,
    rtv_heap: A::DescriptorHeap,
    dsv_heap: A::DescriptorHeap,
    /// 槽位渲染目标；适配器 0 为交换链后备缓冲，其余为本地镜像
    render_targets: Vec<Option<A::Resource>>,
    depth_stencil: Option<A::Resource>,
}

impl<A: GpuApi> AdapterContext<A> {
    /// 构建一个适配器的全部设备级资源
    ///
    /// 失败即致命：任何一步出错都会中止启动或恢复，没有部分成功。
    pub fn create(
        instance: &A::Instance,
        adapter: A::Adapter,
        index: usize,
        back_buffer_count: u32,
        min_level: FeatureLevel,
        initial_slot: usize,
    ) -> Result<Self> {
        let (device, feature_level) = instance.create_device(&adapter, min_level)?;
        let queue = device.create_queue()?;

        let rtv_heap = device.create_rtv_heap(back_buffer_count)?;
        let dsv_heap = device.create_dsv_heap(1)?;

        // 每个槽位一个分配器，全部预先创建
        let mut allocators = Vec::with_capacity(back_buffer_count as usize);
        for _ in 0..back_buffer_count {
            allocators.push(device.create_command_allocator()?);
        }
        let command_list = device.create_command_list(&allocators[initial_slot])?;

        // 栅栏以当前槽位的值初始化，随即递增该槽位：
        // 这是下一次信号的期望值
        let mut slots = FrameSlots::new(back_buffer_count as usize);
        let fence = device.create_fence(slots.value(initial_slot).value())?;
        slots.increment(initial_slot);

        info!(
            adapter = index,
            description = %adapter.info().description,
            level = feature_level.as_str(),
            buffers = back_buffer_count,
            "Adapter context created"
        );

        Ok(Self {
            index,
            adapter,
            device,
            feature_level,
            queue,
            allocators,
            command_list,
            fence,
            slots,
            rtv_heap,
            dsv_heap,
            render_targets: (0..back_buffer_count).map(|_| None).collect(),
            depth_stencil: None,
        })
    }

    // -- 尺寸相关资源 -------------------------------------------------------

    /// 释放全部尺寸相关资源（交换链重建前必须先放掉后备缓冲引用）
    pub fn release_size_dependent(&mut self) {
        for target in &mut self.render_targets {
            *target = None;
        }
        self.depth_stencil = None;
    }

    /// 把交换链后备缓冲绑定为本上下文的渲染目标（仅适配器 0）
    pub fn bind_swapchain_targets(
        &mut self,
        swapchain: &A::Swapchain,
        format: PixelFormat,
    ) -> Result<()> {
        for slot in 0..self.render_targets.len() {
            let buffer = swapchain.back_buffer(slot as u32)?;
            self.device
                .create_rtv(&self.rtv_heap, slot as u32, &buffer, format);
            self.render_targets[slot] = Some(buffer);
        }
        Ok(())
    }

    /// 创建与主后备缓冲同格式同尺寸的本地镜像目标（次级适配器）
    pub fn create_mirror_targets(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<()> {
        for slot in 0..self.render_targets.len() {
            let target = self.device.create_render_target(width, height, format)?;
            self.device
                .create_rtv(&self.rtv_heap, slot as u32, &target, format);
            self.render_targets[slot] = Some(target);
        }
        debug!(adapter = self.index, width, height, "Mirror render targets created");
        Ok(())
    }

    /// 重建深度缓冲；`PixelFormat::Unknown` 表示不需要深度
    pub fn create_depth_stencil(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<()> {
        if format == PixelFormat::Unknown {
            self.depth_stencil = None;
            return Ok(());
        }
        let depth = self.device.create_depth_stencil(width, height, format)?;
        self.device.create_dsv(&self.dsv_heap, DSV_SLOT, &depth, format);
        self.depth_stencil = Some(depth);
        Ok(())
    }

    /// 交换链重建后把所有槽位的栅栏值拉平到当前槽位的值
    ///
    /// 旧槽位可能残留大于将来信号值的期望，不拉平会造成永久等待。
    pub fn level_fence_values(&mut self, current_slot: usize) {
        let value = self.slots.value(current_slot);
        for slot in 0..self.slots.len() {
            self.slots.set(slot, value);
        }
    }

    // -- 逐帧操作 -----------------------------------------------------------

    /// Prepare：重置当前槽位的分配器与命令列表，录制入场屏障
    pub fn prepare(
        &mut self,
        slot: usize,
        before: ResourceState,
        after: ResourceState,
    ) -> Result<()> {
        self.allocators[slot].reset()?;
        self.command_list.reset(&self.allocators[slot])?;

        if before != after {
            let target = Self::slot_target(&self.render_targets, slot)?;
            self.command_list.transition(target, before, after);
        }
        Ok(())
    }

    /// Present 的录制半程：出场屏障、关闭、提交
    pub fn finish_and_submit(&mut self, slot: usize, before: ResourceState) -> Result<()> {
        if before != ResourceState::Present {
            let target = Self::slot_target(&self.render_targets, slot)?;
            self.command_list.transition(target, before, ResourceState::Present);
        }
        self.command_list.close()?;
        self.queue.execute(&self.command_list);
        Ok(())
    }

    /// 在队列上发出当前槽位的栅栏信号，返回发出的值
    pub fn signal_frame(&mut self, slot: usize) -> Result<FenceValue> {
        let value = self.slots.value(slot);
        self.queue.signal(&self.fence, value.value())?;
        Ok(value)
    }

    /// 轮转到 `new_slot`：必要时等待其上一次占用完成，然后盖上
    /// 新的期望值。返回是否真正发生了阻塞等待。
    pub fn advance_to_slot(&mut self, new_slot: usize, signaled: FenceValue) -> Result<bool> {
        let required = self.slots.value(new_slot);
        let blocked = if FenceValue::new(self.fence.completed_value()) < required {
            self.fence.wait_until(required.value())?;
            true
        } else {
            false
        };

        // 此处是分配器复用安全性的唯一保证点
        debug_assert!(
            self.fence.completed_value() >= required.value(),
            "allocator slot {} reused before GPU finished its previous frame",
            new_slot
        );

        self.slots.stamp_next(new_slot, signaled);
        Ok(blocked)
    }

    /// 排空本适配器的全部 GPU 工作
    ///
    /// 信号当前槽位的值并等待，随后递增该槽位。
    pub fn wait_for_gpu(&mut self, slot: usize) -> Result<()> {
        let value = self.slots.value(slot);
        self.queue.signal(&self.fence, value.value())?;
        self.fence.wait_until(value.value())?;
        self.slots.increment(slot);
        Ok(())
    }

    // -- 访问器 -------------------------------------------------------------

    pub fn adapter_info(&self) -> &AdapterInfo {
        self.adapter.info()
    }

    pub fn device(&self) -> &A::Device {
        &self.device
    }

    pub fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }

    pub fn queue(&self) -> &A::Queue {
        &self.queue
    }

    pub fn command_list(&self) -> &A::CommandList {
        &self.command_list
    }

    pub fn command_allocator(&self, slot: usize) -> Option<&A::CommandAllocator> {
        self.allocators.get(slot)
    }

    pub fn render_target(&self, slot: usize) -> Result<&A::Resource> {
        Self::slot_target(&self.render_targets, slot)
    }

    /// 只借 `render_targets` 字段，屏障录制时命令列表可同时可变借用
    fn slot_target(targets: &[Option<A::Resource>], slot: usize) -> Result<&A::Resource> {
        targets.get(slot).and_then(Option::as_ref).ok_or_else(|| {
            GraphicsError::Backend(format!(
                "render target {} missing: window size dependent resources not created",
                slot
            ))
            .into()
        })
    }

    pub fn try_render_target(&self, slot: usize) -> Option<&A::Resource> {
        self.render_targets.get(slot).and_then(Option::as_ref)
    }

    pub fn depth_stencil(&self) -> Option<&A::Resource> {
        self.depth_stencil.as_ref()
    }

    pub fn rtv_handle(&self, slot: usize) -> A::DescriptorHandle {
        self.device.descriptor_handle(&self.rtv_heap, slot as u32)
    }

    pub fn dsv_handle(&self) -> A::DescriptorHandle {
        self.device.descriptor_handle(&self.dsv_heap, DSV_SLOT)
    }

    /// 当前记录在某槽位上的栅栏值
    pub fn fence_value(&self, slot: usize) -> FenceValue {
        self.slots.value(slot)
    }

    pub fn device_removed(&self) -> bool {
        self.device.removal_reason().is_some()
    }
}
