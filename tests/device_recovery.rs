//! 设备丢失恢复集成测试
//!
//! 通过模拟后端的故障注入驱动三条恢复入口（呈现、重建、显式校验），
//! 断言观察者回调次数、设备句柄更替与恢复后的帧循环健康。

use std::cell::Cell;
use std::rc::{Rc, Weak};

use dist_frame::frame::{AdapterPolicy, DeviceNotify, DeviceResources, DeviceResourcesDesc};
use dist_frame::gfx::api::{DisplayRotation, GpuInstance, ResourceState};
use dist_frame::gfx::null::{NullApi, NullInstance, NullTopology, NullWindow};

struct CountingObserver {
    lost: Cell<u32>,
    restored: Cell<u32>,
}

impl CountingObserver {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            lost: Cell::new(0),
            restored: Cell::new(0),
        })
    }
}

impl DeviceNotify for CountingObserver {
    fn on_device_lost(&self) {
        self.lost.set(self.lost.get() + 1);
    }

    fn on_device_restored(&self) {
        // lost 先于 restored，且在恢复完成之后才发出
        assert_eq!(self.lost.get(), self.restored.get() + 1);
        self.restored.set(self.restored.get() + 1);
    }
}

fn build(desc: DeviceResourcesDesc) -> DeviceResources<NullApi> {
    let instance = NullInstance::with_topology(NullTopology::default());
    let mut resources = DeviceResources::with_instance(instance, desc).unwrap();
    resources.create_device_resources().unwrap();
    resources.set_window(NullWindow, 800, 600, DisplayRotation::Identity);
    resources.create_window_size_dependent_resources().unwrap();
    resources
}

fn run_frame(resources: &mut DeviceResources<NullApi>) {
    resources
        .prepare(ResourceState::Present, ResourceState::RenderTarget)
        .unwrap();
    resources.present(ResourceState::RenderTarget).unwrap();
}

#[test]
fn test_present_loss_recovers_with_new_device() {
    let mut resources = build(DeviceResourcesDesc::default());
    let observer = CountingObserver::new();
    resources.register_device_notify(Rc::downgrade(&observer) as Weak<dyn DeviceNotify>);

    let device_before = resources.device(0).unwrap().id();

    // 两帧成功之后下一次呈现报告设备移除
    resources.instance().fail_present_after(2);
    for _ in 0..3 {
        run_frame(&mut resources);
    }

    assert_eq!(observer.lost.get(), 1);
    assert_eq!(observer.restored.get(), 1);
    assert_ne!(resources.device(0).unwrap().id(), device_before);

    let stats = resources.stats();
    assert_eq!(stats.recoveries, 1);
    // 丢帧不计入呈现数
    assert_eq!(stats.frames_presented, 2);

    // 恢复后帧循环照常工作
    for _ in 0..2 {
        run_frame(&mut resources);
    }
    assert_eq!(resources.stats().frames_presented, 4);
    assert_eq!(observer.lost.get(), 1);
}

#[test]
fn test_device_count_constant_across_recovery() {
    let desc = DeviceResourcesDesc {
        device_count: 2,
        ..Default::default()
    };
    let mut resources = build(desc);
    assert_eq!(resources.device_count(), 2);

    resources.instance().fail_present_after(0);
    run_frame(&mut resources);

    assert_eq!(resources.stats().recoveries, 1);
    assert_eq!(resources.device_count(), 2);
    assert!(resources.device(0).is_some());
    assert!(resources.device(1).is_some());
}

#[test]
fn test_validate_detects_poisoned_device() {
    let mut resources = build(DeviceResourcesDesc::default());
    let observer = CountingObserver::new();
    resources.register_device_notify(Rc::downgrade(&observer) as Weak<dyn DeviceNotify>);
    let device_before = resources.device(0).unwrap().id();

    resources.instance().poison_device("simulated driver update");
    resources.validate_device().unwrap();

    assert_eq!(observer.lost.get(), 1);
    assert_eq!(observer.restored.get(), 1);
    assert_ne!(resources.device(0).unwrap().id(), device_before);

    // 设备健康时校验是无操作
    resources.validate_device().unwrap();
    assert_eq!(observer.lost.get(), 1);
}

#[test]
fn test_validate_detects_default_adapter_change() {
    let mut resources = build(DeviceResourcesDesc::default());
    let observer = CountingObserver::new();
    resources.register_device_notify(Rc::downgrade(&observer) as Weak<dyn DeviceNotify>);

    // 默认适配器 LUID 变化只能由显式校验发现
    resources.instance().change_default_adapter_luid();
    resources.validate_device().unwrap();

    assert_eq!(resources.stats().recoveries, 1);
    assert_eq!(observer.restored.get(), 1);

    // 重建后的设备带新 LUID，再次校验不再触发恢复
    resources.validate_device().unwrap();
    assert_eq!(resources.stats().recoveries, 1);
}

#[test]
fn test_forced_warp_validate_is_noop_on_healthy_device() {
    // 强制 WARP 时主设备与默认硬件适配器天然不同，
    // 校验不得把这种差异当成适配器变化
    let desc = DeviceResourcesDesc {
        policy: AdapterPolicy {
            force_warp: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut resources = build(desc);
    assert!(resources.adapter_info(0).unwrap().is_software);

    resources.validate_device().unwrap();
    resources.validate_device().unwrap();
    assert_eq!(resources.stats().recoveries, 0);

    run_frame(&mut resources);
}

#[test]
fn test_resize_on_lost_device_recovers() {
    let mut resources = build(DeviceResourcesDesc::default());
    let observer = CountingObserver::new();
    resources.register_device_notify(Rc::downgrade(&observer) as Weak<dyn DeviceNotify>);

    resources.instance().poison_device("removed during resize");
    let changed = resources
        .window_size_changed(1024, 768, DisplayRotation::Identity)
        .unwrap();

    assert!(changed);
    assert_eq!(observer.lost.get(), 1);
    assert_eq!(observer.restored.get(), 1);
    // 恢复路径以新尺寸完成重建
    assert_eq!(resources.screen_viewport().width, 1024.0);

    run_frame(&mut resources);
}

#[test]
fn test_dropped_observer_does_not_block_recovery() {
    let mut resources = build(DeviceResourcesDesc::default());
    let observer = CountingObserver::new();
    resources.register_device_notify(Rc::downgrade(&observer) as Weak<dyn DeviceNotify>);
    drop(observer);

    resources.instance().fail_present_after(0);
    run_frame(&mut resources);

    assert_eq!(resources.stats().recoveries, 1);
    run_frame(&mut resources);
}

#[test]
fn test_factory_refresh_during_recovery() {
    let mut resources = build(DeviceResourcesDesc::default());

    // 工厂过期与设备丢失同时发生（驱动更新的典型表现）
    resources.instance().invalidate_factory();
    resources.instance().fail_present_after(0);
    run_frame(&mut resources);

    assert_eq!(resources.stats().recoveries, 1);
    assert!(resources.instance().is_current());
}
