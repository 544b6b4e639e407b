//! 错误处理模块
//!
//! 定义了帧管理器中使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! # 设计原则
//!
//! - 使用 `thiserror` 自动实现 `Error` trait
//! - 为每种错误类型提供清晰的上下文信息
//! - 支持错误链（error source）
//! - 构造期失败走 `Result` 通道；运行期设备丢失不走错误通道，
//!   由恢复控制器在内部消化（见 `frame::recovery`）

use thiserror::Error;

/// 统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, FrameError>;

/// 帧管理器的错误类型
///
/// 只覆盖不可恢复的失败；可恢复的设备移除/重置不会以错误形式出现。
#[derive(Debug, Error)]
pub enum FrameError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 图形 API 错误
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 初始化错误
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// 配置相关的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
///
/// 字符串载荷携带底层平台错误码文本（如 HRESULT）。
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// 没有可用的适配器（含 WARP 不可用）
    #[error("No usable adapter: {0}")]
    AdapterUnavailable(String),

    /// 设备创建失败
    #[error("Device creation failed: {0}")]
    DeviceCreation(String),

    /// 交换链创建/重建失败
    #[error("Swapchain creation failed: {0}")]
    SwapchainCreation(String),

    /// 资源创建失败
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// 栅栏/同步原语失败
    #[error("Synchronization failure: {0}")]
    Synchronization(String),

    /// 请求的能力不受支持
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// 后端内部错误
    #[error("Backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::from(GraphicsError::DeviceCreation("E_FAIL".to_string()));
        assert_eq!(err.to_string(), "Graphics error: Device creation failed: E_FAIL");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: FrameError = ConfigError::InvalidValue {
            field: "graphics.device_count".to_string(),
            reason: "must be at least 1".to_string(),
        }
        .into();
        assert!(matches!(err, FrameError::Config(_)));
    }
}
