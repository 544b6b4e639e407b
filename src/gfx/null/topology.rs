//! 模拟平台拓扑
//!
//! 描述 Null 后端"机器"上有什么：硬件适配器、显示输出、窗口位置、
//! WARP 可用性。测试通过构建器搭出想要的拓扑，再用
//! `NullInstance::with_topology` 创建实例。

use crate::gfx::api::{FeatureLevel, OutputInfo, RectI};

/// 软件适配器的 LUID 基值
pub(crate) const WARP_LUID: u64 = 0x5741_5250;

/// 一个模拟适配器的描述
#[derive(Debug, Clone)]
pub struct NullAdapterDesc {
    pub description: String,
    pub vendor_id: u32,
    pub device_id: u32,
    pub dedicated_video_memory: u64,
    /// 该适配器能支持的最高特性级别
    pub max_level: FeatureLevel,
    /// 本机唯一标识基值（枚举时可能被注入偏移）
    pub luid: u64,
    /// 枚举时带软件标志（类似 Basic Render Driver）
    pub software: bool,
}

impl NullAdapterDesc {
    /// 一块典型的独立显卡
    pub fn discrete(description: &str) -> Self {
        Self {
            description: description.to_string(),
            vendor_id: 0x10DE,
            device_id: 0x2200,
            dedicated_video_memory: 8 << 30,
            max_level: FeatureLevel::Level12_1,
            luid: 0x1000,
            software: false,
        }
    }

    /// 一块典型的集成显卡
    pub fn integrated(description: &str) -> Self {
        Self {
            description: description.to_string(),
            vendor_id: 0x8086,
            device_id: 0x9A49,
            dedicated_video_memory: 128 << 20,
            max_level: FeatureLevel::Level12_0,
            luid: 0x2000,
            software: false,
        }
    }

    /// 枚举中出现的软件渲染驱动（选择器应跳过）
    pub fn software_stub(description: &str) -> Self {
        Self {
            description: description.to_string(),
            vendor_id: 0x1414,
            device_id: 0x8C,
            dedicated_video_memory: 0,
            max_level: FeatureLevel::Level12_1,
            luid: 0x3000,
            software: true,
        }
    }

    pub fn with_luid(mut self, luid: u64) -> Self {
        self.luid = luid;
        self
    }

    pub fn with_max_level(mut self, level: FeatureLevel) -> Self {
        self.max_level = level;
        self
    }
}

/// Null 后端的平台拓扑
///
/// `Default` 给出一台单显卡、单 SDR 显示器、窗口可见的普通机器。
#[derive(Debug, Clone)]
pub struct NullTopology {
    pub(crate) adapters: Vec<NullAdapterDesc>,
    pub(crate) outputs: Vec<OutputInfo>,
    pub(crate) window_bounds: RectI,
    pub(crate) window_visible: bool,
    pub(crate) warp_available: bool,
    pub(crate) tearing_supported: bool,
    /// 栅栏完成值落后信号值的帧数，模拟 GPU 滞后
    pub(crate) fence_lag: u64,
}

impl Default for NullTopology {
    fn default() -> Self {
        Self {
            adapters: vec![NullAdapterDesc::discrete("Null Discrete GPU")],
            outputs: vec![OutputInfo {
                name: r"\\.\DISPLAY1".to_string(),
                desktop_rect: RectI::new(0, 0, 1920, 1080),
                hdr10: false,
            }],
            window_bounds: RectI::new(100, 100, 900, 700),
            window_visible: true,
            warp_available: true,
            tearing_supported: true,
            fence_lag: 1,
        }
    }
}

impl NullTopology {
    /// 空机器：没有任何硬件适配器和输出
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
            outputs: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_adapter(mut self, adapter: NullAdapterDesc) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn with_output(mut self, name: &str, desktop_rect: RectI, hdr10: bool) -> Self {
        self.outputs.push(OutputInfo {
            name: name.to_string(),
            desktop_rect,
            hdr10,
        });
        self
    }

    pub fn with_window_bounds(mut self, bounds: RectI) -> Self {
        self.window_bounds = bounds;
        self
    }

    /// 窗口不可见（最小化），HDR 探测将拿不到窗口矩形
    pub fn with_hidden_window(mut self) -> Self {
        self.window_visible = false;
        self
    }

    /// 模拟缺失可选图形工具特性的系统：WARP 不可用
    pub fn without_warp(mut self) -> Self {
        self.warp_available = false;
        self
    }

    pub fn without_tearing(mut self) -> Self {
        self.tearing_supported = false;
        self
    }

    /// 设置栅栏滞后；0 表示信号即完成
    pub fn with_fence_lag(mut self, lag: u64) -> Self {
        self.fence_lag = lag;
        self
    }
}
