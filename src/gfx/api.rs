//! 图形后端的统一抽象接口
//!
//! 本模块定义了帧管理器与具体图形 API（DirectX 12、无头模拟）之间的
//! 边界。上层的设备/交换链/帧循环逻辑只依赖这里的 trait 族，
//! 不直接接触任何平台句柄。
//!
//! # 设计理念
//!
//! - **关联类型**：每个后端通过 [`GpuApi`] 的关联类型声明自己的
//!   实例/适配器/设备/队列等句柄类型，上层代码对它们泛型
//! - **按角色拆分**：工厂、设备、队列、命令列表、栅栏、交换链
//!   各自一个 trait，映射到帧循环中它们各自承担的调用序列
//! - **双通道错误**：不可恢复的失败走 [`Result`]；设备移除/重置
//!   通过 [`SurfaceStatus`] / [`DeviceLoss`] 返回，由恢复控制器消化

use crate::core::config::{BackBufferFormat, DepthBufferFormat};
use crate::core::error::Result;

// ---------------------------------------------------------------------------
// 共享数据类型
// ---------------------------------------------------------------------------

/// 像素格式
///
/// 只覆盖帧管理器需要的格式：三种后备缓冲格式与两种深度格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Unknown,
    /// 8 位 BGRA（SDR 标准格式）
    Bgra8Unorm,
    /// 10:10:10:2（HDR10 候选格式）
    Rgb10a2Unorm,
    /// 16 位浮点（线性/scRGB 候选格式）
    Rgba16Float,
    /// 32 位浮点深度
    D32Float,
    /// 16 位定点深度
    D16Unorm,
}

impl PixelFormat {
    /// 是否为 HDR 候选后备缓冲格式
    pub fn is_hdr_capable(&self) -> bool {
        matches!(self, PixelFormat::Rgb10a2Unorm | PixelFormat::Rgba16Float)
    }
}

impl From<BackBufferFormat> for PixelFormat {
    fn from(format: BackBufferFormat) -> Self {
        match format {
            BackBufferFormat::Bgra8Unorm => PixelFormat::Bgra8Unorm,
            BackBufferFormat::Rgb10a2Unorm => PixelFormat::Rgb10a2Unorm,
            BackBufferFormat::Rgba16Float => PixelFormat::Rgba16Float,
        }
    }
}

impl From<DepthBufferFormat> for PixelFormat {
    fn from(format: DepthBufferFormat) -> Self {
        match format {
            DepthBufferFormat::D32Float => PixelFormat::D32Float,
            DepthBufferFormat::D16Unorm => PixelFormat::D16Unorm,
            DepthBufferFormat::Disabled => PixelFormat::Unknown,
        }
    }
}

/// 交换链的输出色彩空间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// 标准 SDR（G22 / P709）
    Sdr,
    /// HDR10（ST.2084 PQ / P2020）
    Hdr10Pq,
    /// 线性 scRGB（G10 / P709）
    ScRgbLinear,
}

/// 资源状态（屏障的前后状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// 可呈现 / 跨队列通用状态
    Present,
    /// 渲染目标
    RenderTarget,
    /// 拷贝源（mGPU 合成时客户端使用）
    CopySource,
    /// 拷贝目标
    CopyDest,
}

/// 设备特性级别，按能力升序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeatureLevel {
    Level11_0,
    Level11_1,
    Level12_0,
    Level12_1,
}

impl FeatureLevel {
    /// 设备创建时按降序尝试的候选列表
    pub const DESCENDING: [FeatureLevel; 4] = [
        FeatureLevel::Level12_1,
        FeatureLevel::Level12_0,
        FeatureLevel::Level11_1,
        FeatureLevel::Level11_0,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureLevel::Level11_0 => "11_0",
            FeatureLevel::Level11_1 => "11_1",
            FeatureLevel::Level12_0 => "12_0",
            FeatureLevel::Level12_1 => "12_1",
        }
    }
}

/// 适配器枚举时的功耗偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerPreference {
    /// 按平台默认顺序枚举
    None,
    /// 高性能优先
    HighPerformance,
    /// 低功耗优先
    MinimumPower,
}

/// 显示旋转（相对窗口的原生朝向）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRotation {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
}

bitflags::bitflags! {
    /// 设备选项开关，构造后除显示能力降级外不再变化
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceOptions: u32 {
        /// 允许撕裂呈现（可变刷新率显示器）
        const ALLOW_TEARING = 0b0001;
        /// 启用 HDR 输出协商
        const ENABLE_HDR    = 0b0010;
        /// 启用 4K 输出
        const ENABLE_4K     = 0b0100;
    }
}

/// 整数矩形，桌面坐标或窗口坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectI {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl RectI {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// 与另一矩形的交叠面积，无交叠时为 0
    pub fn intersection_area(&self, other: &RectI) -> i64 {
        let ax = (self.right.min(other.right) - self.left.max(other.left)).max(0) as i64;
        let ay = (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0) as i64;
        ax * ay
    }
}

/// 逻辑输出尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// 屏幕视口
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// 适配器的静态描述信息
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    /// 枚举序号
    pub ordinal: u32,
    /// 厂商给出的描述字符串
    pub description: String,
    pub vendor_id: u32,
    pub device_id: u32,
    /// 专用显存字节数
    pub dedicated_video_memory: u64,
    /// 是否为软件（WARP）适配器
    pub is_software: bool,
    /// 本机唯一标识（LUID），恢复时用于检测默认适配器变化
    pub luid: u64,
}

/// 显示输出的描述信息，用于 HDR 协商
#[derive(Debug, Clone)]
pub struct OutputInfo {
    /// 输出设备名
    pub name: String,
    /// 桌面坐标下的覆盖矩形
    pub desktop_rect: RectI,
    /// 输出是否以 HDR10（ST.2084）色彩空间工作
    pub hdr10: bool,
}

/// 交换链创建参数
#[derive(Debug, Clone)]
pub struct SwapchainDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub buffer_count: u32,
    pub allow_tearing: bool,
}

/// 设备丢失的种类，携带平台原因文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceLoss {
    /// 设备被移除（驱动升级、物理拔出、TDR）
    Removed(String),
    /// 设备被重置
    Reset,
}

/// Present / ResizeBuffers 这类表面操作的结果
///
/// 设备丢失不是错误：调用方据此进入恢复流程。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceStatus {
    Ok,
    DeviceLost(DeviceLoss),
}

/// 实例（工厂）创建参数
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceDesc {
    /// 创建设备前启用调试层与 GPU 验证
    pub enable_debug_layer: bool,
}

// ---------------------------------------------------------------------------
// Trait 族
// ---------------------------------------------------------------------------

/// 后端选择 trait
///
/// 每个后端实现一次，声明自己的全部句柄类型。上层的
/// `DeviceResources<A>` 对该 trait 泛型，从而在任何后端上
/// 复用同一套生命周期逻辑。
pub trait GpuApi: Sized + 'static {
    type Instance: GpuInstance<Self>;
    type Adapter: GpuAdapter;
    type Device: GpuDevice<Self>;
    type Queue: GpuQueue<Self>;
    type CommandAllocator: GpuCommandAllocator;
    type CommandList: GpuCommandList<Self>;
    type Fence: GpuFence;
    type Swapchain: GpuSwapchain<Self>;
    type Resource;
    type DescriptorHeap;
    type DescriptorHandle: Copy;
    /// 交换链绑定的窗口目标
    type Window: Clone;

    /// 后端名称，用于日志输出
    const NAME: &'static str;
}

/// 实例：适配器枚举、设备创建、交换链工厂
///
/// 对应 DXGI 工厂承担的全部职责。
pub trait GpuInstance<A: GpuApi>: Sized {
    /// 创建实例
    ///
    /// `enable_debug_layer` 为真时在任何设备创建之前打开调试层，
    /// 顺序不可颠倒：事后打开会使已创建的设备失效。
    fn new(desc: &InstanceDesc) -> Result<Self>;

    /// 平台是否支持撕裂呈现
    fn supports_tearing(&self) -> bool;

    /// 按给定偏好枚举适配器
    ///
    /// 返回的顺序即枚举顺序；软件/远程适配器由调用方负责跳过
    /// （`AdapterInfo::is_software`）。
    fn enumerate_adapters(&self, preference: PowerPreference) -> Result<Vec<A::Adapter>>;

    /// 获取软件（WARP）适配器
    ///
    /// 失败即致命：没有任何硬件适配器可用时它是最后的退路。
    fn warp_adapter(&self) -> Result<A::Adapter>;

    /// 探测适配器能否在 `min_level` 上创建设备，不保留任何设备
    fn probe_adapter(&self, adapter: &A::Adapter, min_level: FeatureLevel) -> bool;

    /// 在适配器上创建设备
    ///
    /// 从高到低尝试 [`FeatureLevel::DESCENDING`] 中不低于
    /// `min_level` 的级别，返回实际获得的级别。
    fn create_device(
        &self,
        adapter: &A::Adapter,
        min_level: FeatureLevel,
    ) -> Result<(A::Device, FeatureLevel)>;

    /// 枚举所有适配器的所有显示输出
    fn enumerate_outputs(&self) -> Result<Vec<OutputInfo>>;

    /// 查询窗口在桌面坐标下的矩形，窗口不可见时返回 `None`
    fn window_bounds(&self, window: &A::Window) -> Option<RectI>;

    /// 以一次全新枚举取第一个适配器的 LUID
    ///
    /// 与现有设备的 LUID 不一致说明默认适配器已变化（显卡热插拔、
    /// 驱动更新），调用方应进入恢复流程。无适配器时返回 `None`。
    fn default_adapter_luid(&self, preference: PowerPreference) -> Result<Option<u64>>;

    /// 实例的枚举信息是否仍然有效
    fn is_current(&self) -> bool;

    /// 重建过期的实例（工厂）
    fn refresh(&mut self) -> Result<()>;

    /// 创建绑定到 `queue` 的交换链
    ///
    /// 总是翻转模型、单采样；同时抑制平台默认的 ALT+ENTER 全屏切换。
    fn create_swapchain(
        &self,
        queue: &A::Queue,
        window: &A::Window,
        desc: &SwapchainDesc,
    ) -> Result<A::Swapchain>;

    /// 调试构建下报告仍然存活的图形对象
    fn report_live_objects(&self) {}
}

/// 适配器句柄
pub trait GpuAdapter: Clone {
    fn info(&self) -> &AdapterInfo;
}

/// 逻辑设备：资源与同步原语的工厂
pub trait GpuDevice<A: GpuApi> {
    fn create_queue(&self) -> Result<A::Queue>;

    fn create_command_allocator(&self) -> Result<A::CommandAllocator>;

    /// 创建命令列表；返回时已关闭，等待第一次 `reset`
    fn create_command_list(&self, allocator: &A::CommandAllocator) -> Result<A::CommandList>;

    /// 创建初值为 `initial` 的栅栏
    fn create_fence(&self, initial: u64) -> Result<A::Fence>;

    fn create_rtv_heap(&self, capacity: u32) -> Result<A::DescriptorHeap>;

    fn create_dsv_heap(&self, capacity: u32) -> Result<A::DescriptorHeap>;

    /// 创建一块可作渲染目标的已提交资源（次级适配器的镜像目标）
    fn create_render_target(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<A::Resource>;

    fn create_depth_stencil(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<A::Resource>;

    /// 在堆的 `index` 槽位写入渲染目标视图
    fn create_rtv(
        &self,
        heap: &A::DescriptorHeap,
        index: u32,
        resource: &A::Resource,
        format: PixelFormat,
    );

    /// 在堆的 `index` 槽位写入深度模板视图
    fn create_dsv(
        &self,
        heap: &A::DescriptorHeap,
        index: u32,
        resource: &A::Resource,
        format: PixelFormat,
    );

    /// 取堆中 `index` 槽位的描述符句柄
    fn descriptor_handle(&self, heap: &A::DescriptorHeap, index: u32) -> A::DescriptorHandle;

    /// 设备所在适配器的 LUID
    fn adapter_luid(&self) -> u64;

    /// 设备已丢失时返回丢失原因，健康时返回 `None`
    fn removal_reason(&self) -> Option<DeviceLoss>;
}

/// 命令队列
pub trait GpuQueue<A: GpuApi> {
    /// 提交一条已关闭的命令列表
    fn execute(&self, list: &A::CommandList);

    /// 在队列时间线上写入 `value`
    fn signal(&self, fence: &A::Fence, value: u64) -> Result<()>;
}

/// 命令分配器
pub trait GpuCommandAllocator {
    /// 回收已录制命令的内存
    ///
    /// 只有当 GPU 已执行完该分配器上录制的全部命令时才允许调用，
    /// 由帧循环的栅栏等待保证。
    fn reset(&mut self) -> Result<()>;
}

/// 命令列表
pub trait GpuCommandList<A: GpuApi> {
    /// 对 `allocator` 重新打开列表开始录制
    fn reset(&mut self, allocator: &A::CommandAllocator) -> Result<()>;

    /// 录制一条资源状态转换屏障
    fn transition(&mut self, resource: &A::Resource, before: ResourceState, after: ResourceState);

    /// 结束录制
    fn close(&mut self) -> Result<()>;
}

/// 栅栏与其等待事件
pub trait GpuFence {
    /// GPU 侧已完成的最大值
    fn completed_value(&self) -> u64;

    /// 阻塞直到完成值达到 `value`
    ///
    /// 无超时：挂起的 GPU 只能通过呈现路径的设备移除信号被发现。
    fn wait_until(&self, value: u64) -> Result<()>;
}

/// 交换链
pub trait GpuSwapchain<A: GpuApi> {
    /// 以新尺寸重建后备缓冲
    ///
    /// 返回 `Ok(SurfaceStatus::DeviceLost(_))` 时调用方进入恢复流程；
    /// 其余失败为致命错误。
    fn resize(
        &mut self,
        width: u32,
        height: u32,
        buffer_count: u32,
        format: PixelFormat,
        allow_tearing: bool,
    ) -> Result<SurfaceStatus>;

    /// 取第 `index` 个后备缓冲
    fn back_buffer(&self, index: u32) -> Result<A::Resource>;

    /// 当前后备缓冲下标，呈现后由交换链自行推进
    fn current_back_buffer_index(&self) -> u32;

    /// 呈现
    ///
    /// `interval` 为 0 时允许配合撕裂标志立即呈现，为 1 时垂直同步。
    fn present(&mut self, interval: u32, allow_tearing: bool) -> Result<SurfaceStatus>;

    /// 交换链是否支持给定色彩空间
    fn supports_color_space(&self, color_space: ColorSpace) -> bool;

    /// 设置输出色彩空间
    fn set_color_space(&mut self, color_space: ColorSpace) -> Result<()>;

    /// 设置交换链旋转
    fn set_rotation(&mut self, rotation: DisplayRotation) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection_area() {
        let a = RectI::new(0, 0, 100, 100);
        let b = RectI::new(50, 50, 150, 150);
        assert_eq!(a.intersection_area(&b), 2500);

        let c = RectI::new(200, 200, 300, 300);
        assert_eq!(a.intersection_area(&c), 0);

        // 完全包含
        let d = RectI::new(10, 10, 20, 20);
        assert_eq!(a.intersection_area(&d), 100);
    }

    #[test]
    fn test_feature_level_ordering() {
        assert!(FeatureLevel::Level12_1 > FeatureLevel::Level11_0);
        assert_eq!(FeatureLevel::DESCENDING[0], FeatureLevel::Level12_1);
        assert_eq!(FeatureLevel::DESCENDING[3], FeatureLevel::Level11_0);
    }

    #[test]
    fn test_hdr_capable_formats() {
        assert!(PixelFormat::Rgb10a2Unorm.is_hdr_capable());
        assert!(PixelFormat::Rgba16Float.is_hdr_capable());
        assert!(!PixelFormat::Bgra8Unorm.is_hdr_capable());
    }

    #[test]
    fn test_config_format_mapping() {
        assert_eq!(PixelFormat::from(BackBufferFormat::Bgra8Unorm), PixelFormat::Bgra8Unorm);
        assert_eq!(PixelFormat::from(DepthBufferFormat::Disabled), PixelFormat::Unknown);
    }
}
