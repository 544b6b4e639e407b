//! 帧同步原语
//!
//! 提供帧循环使用的 CPU 侧同步记账：单调递增的栅栏值、
//! 按后备缓冲槽位记录的栅栏值数组、帧阶段状态机。
//!
//! # 设计原则
//!
//! - **Fence 同步**：CPU 等待 GPU 完成特定槽位的工作
//! - **槽位轮转**：N 个后备缓冲对应 N 个在飞帧，每个槽位记录
//!   自己"下一次可复用"所需的栅栏值
//! - **纯记账**：本模块不接触任何图形 API，真正的等待发生在后端

/// Fence 值
///
/// 用于 CPU-GPU 同步的单调递增值。
/// CPU 可以等待 GPU 完成特定 Fence 值对应的工作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FenceValue(u64);

impl FenceValue {
    /// 创建新的 Fence 值
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// 获取内部值
    pub fn value(&self) -> u64 {
        self.0
    }

    /// 递增 Fence 值
    pub fn increment(&mut self) {
        self.0 += 1;
    }

    /// 下一个 Fence 值
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// 按后备缓冲槽位记录的栅栏值
///
/// `value(i)` 表示：栅栏完成值达到它之后，槽位 i 上一次占用的
/// 命令分配器才允许复用。
#[derive(Debug, Clone)]
pub struct FrameSlots {
    values: Vec<FenceValue>,
}

impl FrameSlots {
    /// 创建 `count` 个槽位，全部从 0 开始
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![FenceValue::new(0); count],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, slot: usize) -> FenceValue {
        self.values[slot]
    }

    pub fn set(&mut self, slot: usize, value: FenceValue) {
        self.values[slot] = value;
    }

    /// 递增指定槽位的值
    pub fn increment(&mut self, slot: usize) {
        self.values[slot].increment();
    }

    /// 轮转到新槽位：新槽位的期望值变为刚发出信号的值 + 1
    pub fn stamp_next(&mut self, new_slot: usize, signaled: FenceValue) {
        self.values[new_slot] = signaled.next();
    }
}

/// 帧阶段状态机
///
/// `Idle → Prepared → Recorded → Presented → Idle`，所有适配器
/// 步调一致地走同一个阶段。`Recorded`/`Presented` 两个阶段在
/// `present()` 内部瞬时经过，对外可观察的静止状态只有
/// `Idle` 与 `Prepared`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// 帧尚未开始
    Idle,
    /// 命令列表已重置，等待客户端录制
    Prepared,
    /// 客户端录制完成，屏障与关闭已进行
    Recorded,
    /// 交换链已呈现，等待轮转
    Presented,
}

impl FramePhase {
    /// 进入 Prepare；返回进入前是否处于合法阶段
    pub fn begin_prepare(&mut self) -> bool {
        let legal = *self == FramePhase::Idle;
        *self = FramePhase::Prepared;
        legal
    }

    /// Present 入口，标记录制结束；返回进入前是否处于合法阶段
    pub fn begin_present(&mut self) -> bool {
        let legal = *self == FramePhase::Prepared;
        *self = FramePhase::Recorded;
        legal
    }

    /// 交换链呈现完成
    pub fn mark_presented(&mut self) {
        *self = FramePhase::Presented;
    }

    /// 帧轮转完成，回到空闲
    pub fn finish(&mut self) {
        *self = FramePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_value() {
        let mut fence = FenceValue::new(0);
        assert_eq!(fence.value(), 0);

        fence.increment();
        assert_eq!(fence.value(), 1);

        let next = fence.next();
        assert_eq!(next.value(), 2);
        assert_eq!(fence.value(), 1); // 原值不变
    }

    #[test]
    fn test_fence_ordering() {
        let f1 = FenceValue::new(1);
        let f2 = FenceValue::new(2);
        let f3 = FenceValue::new(1);

        assert!(f1 < f2);
        assert!(f2 > f1);
        assert_eq!(f1, f3);
    }

    #[test]
    fn test_frame_slots_cycle() {
        let mut slots = FrameSlots::new(2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.value(0).value(), 0);

        // 模拟第一帧：槽位 0 的值在设备创建时递增一次
        slots.increment(0);
        assert_eq!(slots.value(0).value(), 1);

        // 呈现后轮转到槽位 1，期望值 = 已发信号值 + 1
        let signaled = slots.value(0);
        slots.stamp_next(1, signaled);
        assert_eq!(slots.value(1).value(), 2);

        // 再轮转回槽位 0
        let signaled = slots.value(1);
        slots.stamp_next(0, signaled);
        assert_eq!(slots.value(0).value(), 3);
    }

    #[test]
    fn test_phase_transitions() {
        let mut phase = FramePhase::Idle;

        assert!(phase.begin_prepare());
        assert_eq!(phase, FramePhase::Prepared);

        // 重复 Prepare 是非法的，但状态仍然前进
        assert!(!phase.begin_prepare());

        assert!(phase.begin_present());
        phase.mark_presented();
        assert_eq!(phase, FramePhase::Presented);
        phase.finish();
        assert_eq!(phase, FramePhase::Idle);

        // 未 Prepare 直接 Present 是非法的
        assert!(!phase.begin_present());
    }
}
