//! 帧统计计数
//!
//! 原子计数器记录帧循环的关键事件，读侧（日志、覆盖层）可以
//! 从任意位置采样而不干扰帧循环。

use std::sync::atomic::{AtomicU64, Ordering};

/// 帧循环统计
#[derive(Debug, Default)]
pub struct FrameStats {
    /// 成功呈现的帧数
    frames_presented: AtomicU64,
    /// 实际发生阻塞的栅栏等待次数
    blocking_waits: AtomicU64,
    /// 设备丢失恢复次数
    recoveries: AtomicU64,
    /// 交换链重建次数（含首次创建）
    swapchain_rebuilds: AtomicU64,
}

/// 某一时刻的统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatsSnapshot {
    pub frames_presented: u64,
    pub blocking_waits: u64,
    pub recoveries: u64,
    pub swapchain_rebuilds: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_present(&self) {
        self.frames_presented.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blocking_wait(&self) {
        self.blocking_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recovery(&self) {
        self.recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_swapchain_rebuild(&self) {
        self.swapchain_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented.load(Ordering::Relaxed)
    }

    pub fn recoveries(&self) -> u64 {
        self.recoveries.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> FrameStatsSnapshot {
        FrameStatsSnapshot {
            frames_presented: self.frames_presented.load(Ordering::Relaxed),
            blocking_waits: self.blocking_waits.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
            swapchain_rebuilds: self.swapchain_rebuilds.load(Ordering::Relaxed),
        }
    }
}
