//! 设备资源总控
//!
//! [`DeviceResources`] 是整个帧管理器的对外门面：持有实例、
//! N 个适配器上下文、交换链与窗口几何，编排设备创建、尺寸相关
//! 资源重建、Prepare/Present 帧括号与设备丢失恢复。
//!
//! # 设计原则
//!
//! - **单线程驱动**：一个 CPU 线程走完 Prepare、录制、Present，
//!   CPU 与 GPU 之间只靠栅栏同步，内部不加锁
//! - **双通道错误**：构建类失败是致命错误沿 `Result` 外传；
//!   设备丢失在内部走恢复流程，调用方看不到错误
//! - **锁步多适配器**：所有适配器共用同一个 `back_buffer_index`，
//!   逐帧操作对每个适配器重复一遍，交换链只属于适配器 0

use std::rc::Weak;

use nalgebra::Matrix4;
use tracing::{debug, info, warn};

use crate::core::config::{GraphicsConfig, MAX_BACK_BUFFER_COUNT};
use crate::core::error::{FrameError, GraphicsError, Result};
use crate::gfx::api::{
    AdapterInfo, ColorSpace, DeviceLoss, DeviceOptions, DisplayRotation, FeatureLevel, GpuApi,
    GpuDevice, GpuInstance, GpuSwapchain, InstanceDesc, PixelFormat, RectI, ResourceState, Size,
    SurfaceStatus, SwapchainDesc, Viewport,
};

use super::adapter::{select_adapters, AdapterPolicy};
use super::context::AdapterContext;
use super::recovery::{DeviceNotify, DeviceNotifySlot, LossOrigin};
use super::stats::{FrameStats, FrameStatsSnapshot};
use super::swapchain::{
    clamp_extent, color_space_for, full_scissor, full_viewport, hdr10_detected, render_extent,
    rotation_transform,
};
use super::sync::FramePhase;

/// `DeviceResources` 的构建参数
///
/// 构造后不可变；唯一的例外是显示能力不支持时撕裂选项会被降级。
#[derive(Debug, Clone)]
pub struct DeviceResourcesDesc {
    pub back_buffer_count: u32,
    pub device_count: u32,
    pub back_buffer_format: PixelFormat,
    /// `Unknown` 表示不创建深度缓冲
    pub depth_buffer_format: PixelFormat,
    pub options: DeviceOptions,
    pub policy: AdapterPolicy,
    pub min_feature_level: FeatureLevel,
}

impl Default for DeviceResourcesDesc {
    fn default() -> Self {
        Self {
            back_buffer_count: 2,
            device_count: 1,
            back_buffer_format: PixelFormat::Bgra8Unorm,
            depth_buffer_format: PixelFormat::D32Float,
            options: DeviceOptions::empty(),
            policy: AdapterPolicy::default(),
            min_feature_level: FeatureLevel::Level11_0,
        }
    }
}

impl DeviceResourcesDesc {
    /// 从配置文件的图形段构建
    pub fn from_config(config: &GraphicsConfig) -> Self {
        let mut options = DeviceOptions::empty();
        if config.allow_tearing {
            options |= DeviceOptions::ALLOW_TEARING;
        }
        if config.enable_hdr {
            options |= DeviceOptions::ENABLE_HDR;
        }
        Self {
            back_buffer_count: config.back_buffer_count,
            device_count: config.device_count,
            back_buffer_format: config.back_buffer_format.into(),
            depth_buffer_format: config.depth_buffer_format.into(),
            options,
            policy: AdapterPolicy {
                force_warp: config.force_warp,
                prefer_min_power: config.prefer_min_power,
                adapter_ordinal: config.adapter_ordinal,
            },
            min_feature_level: FeatureLevel::Level11_0,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.back_buffer_count < 2 || self.back_buffer_count > MAX_BACK_BUFFER_COUNT {
            return Err(FrameError::Initialization(format!(
                "back buffer count {} out of range [2, {}]",
                self.back_buffer_count, MAX_BACK_BUFFER_COUNT
            )));
        }
        if self.device_count == 0 {
            return Err(FrameError::Initialization(
                "device count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// 设备、交换链与帧生命周期的总控
pub struct DeviceResources<A: GpuApi> {
    instance: A::Instance,
    desc: DeviceResourcesDesc,
    contexts: Vec<AdapterContext<A>>,
    swapchain: Option<A::Swapchain>,
    window: Option<A::Window>,
    output_size: Size,
    rotation: DisplayRotation,
    back_buffer_index: usize,
    viewport: Viewport,
    scissor: RectI,
    color_space: ColorSpace,
    phase: FramePhase,
    stats: FrameStats,
    notify: DeviceNotifySlot,
}

impl<A: GpuApi> DeviceResources<A> {
    /// 创建实例并构建总控；调试构建自动打开调试层
    pub fn new(desc: DeviceResourcesDesc) -> Result<Self> {
        let instance = A::Instance::new(&InstanceDesc {
            enable_debug_layer: cfg!(debug_assertions),
        })?;
        Self::with_instance(instance, desc)
    }

    /// 在调用方给定的实例上构建总控
    ///
    /// 测试用它注入模拟实例；实例的故障注入入口保持可达。
    pub fn with_instance(instance: A::Instance, desc: DeviceResourcesDesc) -> Result<Self> {
        desc.validate()?;
        Ok(Self {
            instance,
            desc,
            contexts: Vec::new(),
            swapchain: None,
            window: None,
            output_size: Size::new(1, 1),
            rotation: DisplayRotation::Identity,
            back_buffer_index: 0,
            viewport: full_viewport(Size::new(1, 1)),
            scissor: full_scissor(Size::new(1, 1)),
            color_space: ColorSpace::Sdr,
            phase: FramePhase::Idle,
            stats: FrameStats::new(),
            notify: DeviceNotifySlot::new(),
        })
    }

    // -- 构建与重建 ---------------------------------------------------------

    /// 创建全部设备级资源：适配器选择与每适配器上下文
    ///
    /// 恢复路径会在完整拆毁后重新调用，语义等同首次创建。
    pub fn create_device_resources(&mut self) -> Result<()> {
        // 撕裂能力跟着工厂走，每次重建都重新确认
        if self.desc.options.contains(DeviceOptions::ALLOW_TEARING)
            && !self.instance.supports_tearing()
        {
            warn!("Variable refresh rate displays not supported, tearing disabled");
            self.desc.options.remove(DeviceOptions::ALLOW_TEARING);
        }

        let adapters = select_adapters::<A>(
            &self.instance,
            &self.desc.policy,
            self.desc.min_feature_level,
            self.desc.device_count,
        )?;

        self.contexts.clear();
        for (index, adapter) in adapters.into_iter().enumerate() {
            self.contexts.push(AdapterContext::create(
                &self.instance,
                adapter,
                index,
                self.desc.back_buffer_count,
                self.desc.min_feature_level,
                self.back_buffer_index,
            )?);
        }

        info!(
            backend = A::NAME,
            devices = self.contexts.len(),
            buffers = self.desc.back_buffer_count,
            "Device resources created"
        );
        Ok(())
    }

    /// 绑定窗口并记录初始几何
    pub fn set_window(&mut self, window: A::Window, width: u32, height: u32, rotation: DisplayRotation) {
        self.window = Some(window);
        self.output_size = Size::new(width, height);
        self.rotation = rotation;
    }

    /// 窗口几何变化通知；返回是否真的发生了重建
    ///
    /// 尺寸与旋转都没变时只刷新色彩空间（窗口可能被拖到了另一台
    /// 显示器上）并返回 `false`，不触碰任何资源。
    pub fn window_size_changed(
        &mut self,
        width: u32,
        height: u32,
        rotation: DisplayRotation,
    ) -> Result<bool> {
        let size = Size::new(width, height);
        if size == self.output_size && rotation == self.rotation {
            self.update_color_space()?;
            return Ok(false);
        }

        self.output_size = size;
        self.rotation = rotation;
        self.create_window_size_dependent_resources()?;
        Ok(true)
    }

    /// 重建所有随窗口尺寸变化的资源
    ///
    /// 交换链存在则原地 resize；resize 报设备丢失时转入恢复流程并
    /// 提前返回，恢复会重新进入本方法且必然走"新建"分支终止。
    pub fn create_window_size_dependent_resources(&mut self) -> Result<()> {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                return Err(FrameError::Initialization(
                    "set_window must be called with a valid window first".to_string(),
                ))
            }
        };
        if self.contexts.is_empty() {
            return Err(FrameError::Initialization(
                "create_device_resources must be called first".to_string(),
            ));
        }

        // 排空在飞帧；设备已经丢失时等待可能失败，丢失由 resize 兜底
        if let Err(e) = self.drain_all_adapters() {
            debug!(error = %e, "GPU drain before resize failed");
        }

        for ctx in &mut self.contexts {
            ctx.release_size_dependent();
            ctx.level_fence_values(self.back_buffer_index);
        }

        let extent = clamp_extent(self.output_size.width, self.output_size.height);
        let render = render_extent(extent, self.rotation);
        let format = self.desc.back_buffer_format;
        let allow_tearing = self.desc.options.contains(DeviceOptions::ALLOW_TEARING);

        let resize_status = match &mut self.swapchain {
            Some(swapchain) => Some(swapchain.resize(
                render.width,
                render.height,
                self.desc.back_buffer_count,
                format,
                allow_tearing,
            )?),
            None => None,
        };

        match resize_status {
            Some(SurfaceStatus::DeviceLost(loss)) => {
                self.handle_device_lost(LossOrigin::Resize, loss)?;
                return Ok(());
            }
            Some(SurfaceStatus::Ok) => {}
            None => {
                let swapchain_desc = SwapchainDesc {
                    width: render.width,
                    height: render.height,
                    format,
                    buffer_count: self.desc.back_buffer_count,
                    allow_tearing,
                };
                let swapchain = self.instance.create_swapchain(
                    self.contexts[0].queue(),
                    &window,
                    &swapchain_desc,
                )?;
                self.swapchain = Some(swapchain);
            }
        }

        if let Some(swapchain) = &mut self.swapchain {
            swapchain.set_rotation(self.rotation)?;
        }
        self.update_color_space()?;

        self.back_buffer_index = match &self.swapchain {
            Some(swapchain) => swapchain.current_back_buffer_index() as usize,
            None => 0,
        };

        let depth_format = self.desc.depth_buffer_format;
        let (primary, secondary) = self.contexts.split_at_mut(1);
        if let Some(swapchain) = &self.swapchain {
            primary[0].bind_swapchain_targets(swapchain, format)?;
        }
        primary[0].create_depth_stencil(render.width, render.height, depth_format)?;
        for ctx in secondary {
            ctx.create_mirror_targets(render.width, render.height, format)?;
            ctx.create_depth_stencil(render.width, render.height, depth_format)?;
        }

        self.viewport = full_viewport(render);
        self.scissor = full_scissor(render);
        self.stats.record_swapchain_rebuild();

        info!(
            width = render.width,
            height = render.height,
            rotation = ?self.rotation,
            color_space = ?self.color_space,
            "Window size dependent resources created"
        );
        Ok(())
    }

    /// 重新协商交换链色彩空间
    ///
    /// 工厂过期（显示器热插拔、HDR 开关）时先刷新，再按窗口当前
    /// 所在输出的能力与后备缓冲格式决定目标色彩空间。
    pub fn update_color_space(&mut self) -> Result<()> {
        if !self.instance.is_current() {
            self.instance.refresh()?;
        }

        let mut display_hdr10 = false;
        if self.swapchain.is_some() {
            if let Some(window) = &self.window {
                let bounds = self.instance.window_bounds(window);
                if bounds.is_some() {
                    let outputs = self.instance.enumerate_outputs()?;
                    display_hdr10 = hdr10_detected(bounds, &outputs);
                }
            }
        }

        let hdr_enabled = self.desc.options.contains(DeviceOptions::ENABLE_HDR);
        let target = color_space_for(self.desc.back_buffer_format, display_hdr10, hdr_enabled);

        if target != self.color_space {
            info!(from = ?self.color_space, to = ?target, "Color space changed");
        }
        self.color_space = target;

        if let Some(swapchain) = &mut self.swapchain {
            if swapchain.supports_color_space(target) {
                swapchain.set_color_space(target)?;
            }
        }
        Ok(())
    }

    // -- 帧括号 -------------------------------------------------------------

    /// 帧开始：重置当前槽位的分配器与命令列表，录制入场屏障
    ///
    /// `before != after` 时把当前后备缓冲从 `before`（通常 PRESENT）
    /// 转换到 `after`（通常 RENDER_TARGET）。
    pub fn prepare(&mut self, before: ResourceState, after: ResourceState) -> Result<()> {
        if !self.phase.begin_prepare() {
            debug_assert!(false, "prepare called before the previous frame was presented");
            warn!("Prepare called out of frame phase, continuing");
        }

        let slot = self.back_buffer_index;
        for ctx in &mut self.contexts {
            ctx.prepare(slot, before, after)?;
        }
        Ok(())
    }

    /// 帧结束：所有适配器提交后做一次交换链呈现
    ///
    /// 呈现报设备丢失时进入恢复流程，本帧静默跳过；调用方
    /// 不会看到错误，观察者回调会通知重建。
    pub fn present(&mut self, before: ResourceState) -> Result<()> {
        if !self.phase.begin_present() {
            debug_assert!(false, "present called without a prepared frame");
            warn!("Present called out of frame phase, continuing");
        }

        let slot = self.back_buffer_index;
        for ctx in &mut self.contexts {
            ctx.finish_and_submit(slot, before)?;
        }

        // 所有适配器提交完毕才允许呈现
        let allow_tearing = self.desc.options.contains(DeviceOptions::ALLOW_TEARING);
        let interval = if allow_tearing { 0 } else { 1 };
        let status = match &mut self.swapchain {
            Some(swapchain) => swapchain.present(interval, allow_tearing)?,
            None => {
                return Err(GraphicsError::Backend(
                    "present without a swapchain".to_string(),
                )
                .into())
            }
        };

        match status {
            SurfaceStatus::Ok => {
                self.phase.mark_presented();
                self.move_to_next_frame()?;
                self.stats.record_present();
            }
            SurfaceStatus::DeviceLost(loss) => {
                self.handle_device_lost(LossOrigin::Present, loss)?;
            }
        }
        self.phase.finish();
        Ok(())
    }

    /// 帧轮转：信号、取新下标、按需等待、盖新期望值
    ///
    /// 交换链报告的下标只读一次，作为所有适配器共同的新槽位。
    fn move_to_next_frame(&mut self) -> Result<()> {
        let current = self.back_buffer_index;

        let mut signaled = Vec::with_capacity(self.contexts.len());
        for ctx in &mut self.contexts {
            signaled.push(ctx.signal_frame(current)?);
        }

        let next = match &self.swapchain {
            Some(swapchain) => swapchain.current_back_buffer_index() as usize,
            None => current,
        };

        for (ctx, value) in self.contexts.iter_mut().zip(signaled) {
            if ctx.advance_to_slot(next, value)? {
                self.stats.record_blocking_wait();
            }
        }

        self.back_buffer_index = next;
        Ok(())
    }

    /// 排空所有适配器的全部 GPU 工作
    ///
    /// 关机与破坏性重建前调用；等待期间递增当前槽位的栅栏值。
    pub fn wait_for_gpu(&mut self) -> Result<()> {
        self.drain_all_adapters()
    }

    fn drain_all_adapters(&mut self) -> Result<()> {
        let slot = self.back_buffer_index;
        for ctx in &mut self.contexts {
            ctx.wait_for_gpu(slot)?;
        }
        Ok(())
    }

    // -- 设备丢失恢复 -------------------------------------------------------

    /// 主动检查设备有效性
    ///
    /// 默认适配器变化（外接显卡拔出、驱动更新）不会从 Present 报
    /// 出来，需要在窗口重新可见等时机显式验证。
    pub fn validate_device(&mut self) -> Result<()> {
        if self.contexts.is_empty() {
            return Ok(());
        }

        if let Some(loss) = self.contexts[0].device().removal_reason() {
            return self.handle_device_lost(LossOrigin::Validate, loss);
        }

        // 主适配器是按策略选中的软件适配器（WARP）时跳过默认适配器
        // 比较，枚举首位的硬件适配器与它永远不同
        if self.contexts[0].adapter_info().is_software {
            return Ok(());
        }

        let current = self
            .instance
            .default_adapter_luid(self.desc.policy.preference())?;
        if let Some(luid) = current {
            if luid != self.contexts[0].device().adapter_luid() {
                return self.handle_device_lost(
                    LossOrigin::Validate,
                    DeviceLoss::Removed("default adapter changed since device creation".to_string()),
                );
            }
        }
        Ok(())
    }

    /// 设备丢失恢复：通知、全量拆毁、重建、再通知
    ///
    /// 观察者的 lost 回调在任何拆毁之前同步执行，让客户端先放掉
    /// 自己持有的 GPU 资源。重建失败是致命错误。
    fn handle_device_lost(&mut self, origin: LossOrigin, loss: DeviceLoss) -> Result<()> {
        self.stats.record_recovery();
        warn!(origin = origin.as_str(), reason = ?loss, "Device lost, rebuilding all resources");

        self.notify.notify_lost();

        for ctx in &mut self.contexts {
            ctx.release_size_dependent();
        }
        self.contexts.clear();
        self.swapchain = None;

        self.instance.refresh()?;
        if cfg!(debug_assertions) {
            self.instance.report_live_objects();
        }

        self.create_device_resources()?;
        self.create_window_size_dependent_resources()?;

        self.notify.notify_restored();
        info!("Device recovery complete");
        Ok(())
    }

    /// 注册设备丢失观察者；最多一个，弱引用持有
    pub fn register_device_notify(&mut self, observer: Weak<dyn DeviceNotify>) {
        self.notify.register(observer);
    }

    // -- 访问器 -------------------------------------------------------------

    pub fn instance(&self) -> &A::Instance {
        &self.instance
    }

    pub fn device(&self, index: usize) -> Option<&A::Device> {
        self.contexts.get(index).map(AdapterContext::device)
    }

    pub fn command_queue(&self, index: usize) -> Option<&A::Queue> {
        self.contexts.get(index).map(AdapterContext::queue)
    }

    pub fn command_list(&self, index: usize) -> Option<&A::CommandList> {
        self.contexts.get(index).map(AdapterContext::command_list)
    }

    /// 当前槽位的命令分配器
    pub fn command_allocator(&self, index: usize) -> Option<&A::CommandAllocator> {
        self.contexts
            .get(index)
            .and_then(|ctx| ctx.command_allocator(self.back_buffer_index))
    }

    /// 当前槽位的渲染目标
    pub fn render_target(&self, index: usize) -> Option<&A::Resource> {
        self.contexts
            .get(index)
            .and_then(|ctx| ctx.try_render_target(self.back_buffer_index))
    }

    pub fn depth_stencil(&self, index: usize) -> Option<&A::Resource> {
        self.contexts.get(index).and_then(AdapterContext::depth_stencil)
    }

    /// 当前槽位的 RTV 句柄
    pub fn render_target_view(&self, index: usize) -> Option<A::DescriptorHandle> {
        self.contexts
            .get(index)
            .map(|ctx| ctx.rtv_handle(self.back_buffer_index))
    }

    pub fn depth_stencil_view(&self, index: usize) -> Option<A::DescriptorHandle> {
        self.contexts.get(index).map(AdapterContext::dsv_handle)
    }

    pub fn adapter_info(&self, index: usize) -> Option<&AdapterInfo> {
        self.contexts.get(index).map(AdapterContext::adapter_info)
    }

    pub fn screen_viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scissor_rect(&self) -> RectI {
        self.scissor
    }

    pub fn back_buffer_format(&self) -> PixelFormat {
        self.desc.back_buffer_format
    }

    pub fn depth_buffer_format(&self) -> PixelFormat {
        self.desc.depth_buffer_format
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// 构造时请求的适配器数量，恢复前后恒定
    pub fn device_count(&self) -> u32 {
        self.desc.device_count
    }

    pub fn back_buffer_count(&self) -> u32 {
        self.desc.back_buffer_count
    }

    pub fn back_buffer_index(&self) -> u32 {
        self.back_buffer_index as u32
    }

    pub fn output_size(&self) -> Size {
        self.output_size
    }

    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    /// 当前旋转的屏幕空间补偿矩阵
    pub fn rotation_transform(&self) -> Matrix4<f32> {
        rotation_transform(self.rotation)
    }

    pub fn device_options(&self) -> DeviceOptions {
        self.desc.options
    }

    pub fn stats(&self) -> FrameStatsSnapshot {
        self.stats.snapshot()
    }

    /// 测试与诊断用：某适配器某槽位当前记录的栅栏值
    pub fn fence_value(&self, index: usize, slot: usize) -> Option<u64> {
        self.contexts.get(index).map(|ctx| ctx.fence_value(slot).value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::null::{NullApi, NullInstance, NullTopology, NullWindow};

    fn build(desc: DeviceResourcesDesc) -> DeviceResources<NullApi> {
        let instance = NullInstance::with_topology(NullTopology::default());
        let mut resources = DeviceResources::with_instance(instance, desc).unwrap();
        resources.create_device_resources().unwrap();
        resources.set_window(NullWindow, 800, 600, DisplayRotation::Identity);
        resources.create_window_size_dependent_resources().unwrap();
        resources
    }

    #[test]
    fn test_back_buffer_count_bounds() {
        let instance = NullInstance::with_topology(NullTopology::default());
        let desc = DeviceResourcesDesc {
            back_buffer_count: 1,
            ..Default::default()
        };
        assert!(DeviceResources::<NullApi>::with_instance(instance, desc).is_err());

        let instance = NullInstance::with_topology(NullTopology::default());
        let desc = DeviceResourcesDesc {
            back_buffer_count: MAX_BACK_BUFFER_COUNT + 1,
            ..Default::default()
        };
        assert!(DeviceResources::<NullApi>::with_instance(instance, desc).is_err());
    }

    #[test]
    fn test_window_required_before_size_dependent_resources() {
        let instance = NullInstance::with_topology(NullTopology::default());
        let mut resources =
            DeviceResources::<NullApi>::with_instance(instance, DeviceResourcesDesc::default())
                .unwrap();
        resources.create_device_resources().unwrap();
        assert!(resources.create_window_size_dependent_resources().is_err());
    }

    #[test]
    fn test_construction_populates_accessors() {
        let resources = build(DeviceResourcesDesc::default());

        assert_eq!(resources.device_count(), 1);
        assert_eq!(resources.back_buffer_count(), 2);
        assert!(resources.device(0).is_some());
        assert!(resources.device(1).is_none());
        assert!(resources.command_queue(0).is_some());
        assert!(resources.render_target(0).is_some());
        assert!(resources.depth_stencil(0).is_some());
        assert!(resources.render_target_view(0).is_some());
        assert_eq!(resources.screen_viewport().width, 800.0);
        assert_eq!(resources.scissor_rect().width(), 800);
    }

    #[test]
    fn test_depth_disabled_yields_no_depth_stencil() {
        let desc = DeviceResourcesDesc {
            depth_buffer_format: PixelFormat::Unknown,
            ..Default::default()
        };
        let resources = build(desc);
        assert!(resources.depth_stencil(0).is_none());
    }

    #[test]
    fn test_frame_bracket_advances_index() {
        let mut resources = build(DeviceResourcesDesc::default());
        assert_eq!(resources.back_buffer_index(), 0);

        resources
            .prepare(ResourceState::Present, ResourceState::RenderTarget)
            .unwrap();
        resources.present(ResourceState::RenderTarget).unwrap();

        assert_eq!(resources.back_buffer_index(), 1);
        assert_eq!(resources.stats().frames_presented, 1);
    }

    #[test]
    fn test_mirror_targets_on_secondary_adapters() {
        let desc = DeviceResourcesDesc {
            device_count: 3,
            ..Default::default()
        };
        let resources = build(desc);

        assert_eq!(resources.device_count(), 3);
        for index in 0..3 {
            assert!(resources.render_target(index).is_some());
            assert!(resources.render_target_view(index).is_some());
        }
        // 次级适配器的目标是本地镜像，与交换链缓冲不同
        let primary = resources.render_target(0).unwrap().id();
        let mirror = resources.render_target(1).unwrap().id();
        assert_ne!(primary, mirror);
    }

    #[test]
    fn test_rotation_swaps_viewport() {
        let mut resources = build(DeviceResourcesDesc::default());
        let changed = resources
            .window_size_changed(800, 600, DisplayRotation::Rotate90)
            .unwrap();
        assert!(changed);
        assert_eq!(resources.screen_viewport().width, 600.0);
        assert_eq!(resources.screen_viewport().height, 800.0);
        assert_eq!(resources.rotation(), DisplayRotation::Rotate90);
    }
}
