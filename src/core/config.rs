//! 配置管理模块
//!
//! 提供帧管理器配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! 适配器选择策略（force_warp / prefer_min_power / adapter_ordinal）
//! 在构造时一次性传入，取代进程级静态开关，避免初始化顺序问题。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//! title = "DistFrame"
//! resizable = true
//!
//! [graphics]
//! back_buffer_count = 2
//! device_count = 1
//! back_buffer_format = "bgra8_unorm"  # 或 "rgb10a2_unorm", "rgba16_float"
//! depth_buffer_format = "d32_float"   # 或 "d16_unorm", "disabled"
//! allow_tearing = false
//! enable_hdr = false
//! force_warp = false
//! prefer_min_power = false
//! # adapter_ordinal = 0
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 交换链后备缓冲数量上限
pub const MAX_BACK_BUFFER_COUNT: u32 = 3;

/// 帧管理器配置
///
/// 包含了设备、交换链与帧循环所需的所有配置项。
/// 可以从配置文件加载，也可以通过代码构建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// 窗口配置
    pub window: WindowConfig,

    /// 图形配置
    pub graphics: GraphicsConfig,

    /// 日志配置
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 是否可调整大小
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 后备缓冲数量（同时在飞帧数），合法范围 2..=3
    #[serde(default = "default_back_buffer_count")]
    pub back_buffer_count: u32,

    /// 逻辑设备数量（mGPU 时 > 1）
    #[serde(default = "default_device_count")]
    pub device_count: u32,

    /// 后备缓冲像素格式
    #[serde(default = "default_back_buffer_format")]
    pub back_buffer_format: BackBufferFormat,

    /// 深度缓冲格式
    #[serde(default = "default_depth_buffer_format")]
    pub depth_buffer_format: DepthBufferFormat,

    /// 允许撕裂呈现（可变刷新率显示器）
    #[serde(default = "default_allow_tearing")]
    pub allow_tearing: bool,

    /// 启用 HDR 输出协商
    #[serde(default = "default_enable_hdr")]
    pub enable_hdr: bool,

    /// 强制使用软件适配器（WARP）
    #[serde(default = "default_force_warp")]
    pub force_warp: bool,

    /// 枚举时优先选择低功耗适配器
    #[serde(default = "default_prefer_min_power")]
    pub prefer_min_power: bool,

    /// 只接受第 N 个枚举到的适配器（硬过滤）
    #[serde(default)]
    pub adapter_ordinal: Option<u32>,
}

/// 后备缓冲像素格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackBufferFormat {
    /// 8 位 BGRA，SDR 标准格式
    Bgra8Unorm,
    /// 10:10:10:2，HDR10 候选格式
    Rgb10a2Unorm,
    /// 16 位浮点，线性/scRGB 候选格式
    Rgba16Float,
}

/// 深度缓冲格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthBufferFormat {
    /// 32 位浮点深度
    D32Float,
    /// 16 位定点深度
    D16Unorm,
    /// 不创建深度缓冲
    Disabled,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_title() -> String { "DistFrame".to_string() }
fn default_resizable() -> bool { true }
fn default_back_buffer_count() -> u32 { 2 }
fn default_device_count() -> u32 { 1 }
fn default_back_buffer_format() -> BackBufferFormat { BackBufferFormat::Bgra8Unorm }
fn default_depth_buffer_format() -> DepthBufferFormat { DepthBufferFormat::D32Float }
fn default_allow_tearing() -> bool { false }
fn default_enable_hdr() -> bool { false }
fn default_force_warp() -> bool { false }
fn default_prefer_min_power() -> bool { false }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "distframe.log".to_string() }

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            graphics: GraphicsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            back_buffer_count: default_back_buffer_count(),
            device_count: default_device_count(),
            back_buffer_format: default_back_buffer_format(),
            depth_buffer_format: default_depth_buffer_format(),
            allow_tearing: default_allow_tearing(),
            enable_hdr: default_enable_hdr(),
            force_warp: default_force_warp(),
            prefer_min_power: default_prefer_min_power(),
            adapter_ordinal: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl FrameConfig {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `FrameConfig` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    #[allow(dead_code)]
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// # 说明
    ///
    /// 支持的参数：
    /// - `--warp`: 强制使用软件适配器
    /// - `--adapter <n>`: 只接受第 n 个枚举到的适配器
    /// - `--devices <n>`: 逻辑设备数量
    /// - `--width <value>` / `--height <value>`: 窗口尺寸
    /// - `--hdr`: 启用 HDR 协商
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if args.iter().any(|a| a == "--warp") {
            self.graphics.force_warp = true;
        }

        if args.iter().any(|a| a == "--hdr") {
            self.graphics.enable_hdr = true;
        }

        if let Some(idx) = args.iter().position(|a| a == "--adapter") {
            if let Some(ordinal_str) = args.get(idx + 1) {
                if let Ok(ordinal) = ordinal_str.parse() {
                    self.graphics.adapter_ordinal = Some(ordinal);
                }
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--devices") {
            if let Some(count_str) = args.get(idx + 1) {
                if let Ok(count) = count_str.parse() {
                    self.graphics.device_count = count;
                }
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--width") {
            if let Some(width_str) = args.get(idx + 1) {
                if let Ok(width) = width_str.parse() {
                    self.window.width = width;
                }
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--height") {
            if let Some(height_str) = args.get(idx + 1) {
                if let Ok(height) = height_str.parse() {
                    self.window.height = height;
                }
            }
        }
    }

    /// 验证配置的有效性
    ///
    /// # 返回值
    ///
    /// 配置有效返回 `Ok(())`，否则返回错误
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        if !(2..=MAX_BACK_BUFFER_COUNT).contains(&self.graphics.back_buffer_count) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.back_buffer_count".to_string(),
                reason: format!("Back buffer count must be 2..={}", MAX_BACK_BUFFER_COUNT),
            }.into());
        }

        if self.graphics.device_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "graphics.device_count".to_string(),
                reason: "Device count must be at least 1".to_string(),
            }.into());
        }

        Ok(())
    }
}

impl BackBufferFormat {
    /// 是否为 HDR 候选格式
    pub fn is_hdr_capable(&self) -> bool {
        matches!(self, BackBufferFormat::Rgb10a2Unorm | BackBufferFormat::Rgba16Float)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FrameConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.graphics.back_buffer_count, 2);
        assert_eq!(config.graphics.device_count, 1);
        assert_eq!(config.graphics.back_buffer_format, BackBufferFormat::Bgra8Unorm);
        assert!(!config.graphics.force_warp);
    }

    #[test]
    fn test_config_validation() {
        let mut config = FrameConfig::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());

        config.window.width = 800;
        config.graphics.back_buffer_count = 4;
        assert!(config.validate().is_err());

        config.graphics.back_buffer_count = 2;
        config.graphics.device_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FrameConfig = toml::from_str(
            r#"
            [window]
            width = 1920

            [graphics]
            back_buffer_count = 3
            back_buffer_format = "rgba16_float"

            [logging]
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.graphics.back_buffer_count, 3);
        assert_eq!(config.graphics.back_buffer_format, BackBufferFormat::Rgba16Float);
        assert!(config.graphics.back_buffer_format.is_hdr_capable());
    }

    #[test]
    fn test_apply_args() {
        let mut config = FrameConfig::default();
        config.apply_args(["--warp", "--adapter", "1", "--width", "640", "--devices", "2"]);

        assert!(config.graphics.force_warp);
        assert_eq!(config.graphics.adapter_ordinal, Some(1));
        assert_eq!(config.window.width, 640);
        assert_eq!(config.graphics.device_count, 2);
    }
}
