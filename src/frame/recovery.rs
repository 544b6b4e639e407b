//! 设备丢失通知
//!
//! 恢复流程本身由 `DeviceResources` 驱动；本模块提供观察者接口
//! 与弱引用槽位。观察者的生命周期完全归调用方所有：这里只保存
//! 弱引用，从不延长、从不检查对方是否应当存活，对方先被释放时
//! 通知静默跳过。

use std::rc::Weak;

/// 设备丢失/恢复观察者
///
/// 客户端实现该接口以便在恢复前后释放并重建自己持有的 GPU 资源。
/// 回调在驱动线程上同步执行：`on_device_lost` 在任何句柄被拆毁
/// 之前发出，`on_device_restored` 在全部资源重建完成之后发出。
pub trait DeviceNotify {
    fn on_device_lost(&self);
    fn on_device_restored(&self);
}

/// 触发恢复的入口，用于日志与统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossOrigin {
    /// 呈现返回设备移除/重置
    Present,
    /// 交换链重建返回设备移除/重置
    Resize,
    /// 显式校验发现 LUID 变化或设备已移除
    Validate,
}

impl LossOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossOrigin::Present => "present",
            LossOrigin::Resize => "resize",
            LossOrigin::Validate => "validate",
        }
    }
}

/// 观察者槽位，至多一个
#[derive(Default)]
pub struct DeviceNotifySlot {
    observer: Option<Weak<dyn DeviceNotify>>,
}

impl DeviceNotifySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册观察者，替换之前注册的那个
    pub fn register(&mut self, observer: Weak<dyn DeviceNotify>) {
        self.observer = Some(observer);
    }

    pub fn clear(&mut self) {
        self.observer = None;
    }

    pub fn notify_lost(&self) {
        if let Some(observer) = self.upgrade() {
            observer.on_device_lost();
        }
    }

    pub fn notify_restored(&self) {
        if let Some(observer) = self.upgrade() {
            observer.on_device_restored();
        }
    }

    fn upgrade(&self) -> Option<std::rc::Rc<dyn DeviceNotify>> {
        self.observer.as_ref().and_then(Weak::upgrade)
    }
}
