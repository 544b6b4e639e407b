//! 适配器选择
//!
//! 按策略从平台枚举中挑出恰好 N 个可用适配器：
//! 跳过软件/远程适配器，逐个探测设备创建能力，不足时以 WARP
//! 补齐。WARP 本身不可用且硬件搜索为空时为致命错误。

use tracing::{debug, info, warn};

use crate::core::error::{GraphicsError, Result};
use crate::gfx::api::{FeatureLevel, GpuAdapter, GpuApi, GpuInstance, PowerPreference};

/// 适配器选择策略
///
/// 构造时一次性传入；`force_warp` 优先级最高，
/// `adapter_ordinal` 是硬过滤：只接受第 N 个枚举到的适配器。
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterPolicy {
    pub force_warp: bool,
    pub prefer_min_power: bool,
    pub adapter_ordinal: Option<u32>,
}

impl AdapterPolicy {
    pub(crate) fn preference(&self) -> PowerPreference {
        if self.prefer_min_power {
            PowerPreference::MinimumPower
        } else {
            PowerPreference::None
        }
    }
}

/// 选出恰好 `count` 个支持 `min_level` 的适配器
///
/// 返回的顺序即设备顺序：第 0 个将持有交换链。
pub fn select_adapters<A: GpuApi>(
    instance: &A::Instance,
    policy: &AdapterPolicy,
    min_level: FeatureLevel,
    count: u32,
) -> Result<Vec<A::Adapter>> {
    if policy.force_warp {
        let warp = instance.warp_adapter()?;
        if !instance.probe_adapter(&warp, min_level) {
            return Err(GraphicsError::AdapterUnavailable(format!(
                "WARP does not support feature level {}",
                min_level.as_str()
            ))
            .into());
        }
        info!(count, "Adapter selection forced to WARP");
        return Ok((0..count).map(|_| warp.clone()).collect());
    }

    let mut selected: Vec<A::Adapter> = Vec::with_capacity(count as usize);

    for adapter in instance.enumerate_adapters(policy.preference())? {
        if selected.len() as u32 == count {
            break;
        }
        let info = adapter.info();

        if let Some(required) = policy.adapter_ordinal {
            if info.ordinal != required {
                continue;
            }
        }

        if info.is_software {
            debug!(ordinal = info.ordinal, description = %info.description, "Skipping software adapter");
            continue;
        }

        if !instance.probe_adapter(&adapter, min_level) {
            debug!(
                ordinal = info.ordinal,
                description = %info.description,
                min_level = min_level.as_str(),
                "Adapter failed device creation probe"
            );
            continue;
        }

        debug!(
            ordinal = info.ordinal,
            description = %info.description,
            vram_mb = info.dedicated_video_memory / (1 << 20),
            "Adapter accepted"
        );
        selected.push(adapter);
    }

    let hardware_found = selected.len() as u32;
    if hardware_found < count {
        // 硬件不足，以 WARP 补齐；WARP 拿不到即致命
        let warp = instance.warp_adapter().map_err(|e| {
            GraphicsError::AdapterUnavailable(format!(
                "{} hardware adapter(s) found, WARP fallback unavailable: {}",
                hardware_found, e
            ))
        })?;
        if !instance.probe_adapter(&warp, min_level) {
            return Err(GraphicsError::AdapterUnavailable(format!(
                "WARP does not support feature level {}",
                min_level.as_str()
            ))
            .into());
        }
        warn!(
            hardware = hardware_found,
            requested = count,
            "Filling remaining adapter slots with WARP"
        );
        while selected.len() as u32 != count {
            selected.push(warp.clone());
        }
    }

    info!(
        count,
        hardware = hardware_found,
        software = count - hardware_found,
        primary = %selected[0].info().description,
        "Adapter selection complete"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::null::{NullAdapterDesc, NullApi, NullInstance, NullTopology};

    fn select(
        instance: &NullInstance,
        policy: &AdapterPolicy,
        count: u32,
    ) -> Result<Vec<<NullApi as GpuApi>::Adapter>> {
        select_adapters::<NullApi>(instance, policy, FeatureLevel::Level11_0, count)
    }

    #[test]
    fn test_warp_fill_when_hardware_short() {
        let instance = NullInstance::with_topology(NullTopology::default());
        let adapters = select(&instance, &AdapterPolicy::default(), 3).unwrap();

        assert_eq!(adapters.len(), 3);
        assert!(!adapters[0].info().is_software);
        assert!(adapters[1].info().is_software);
        assert!(adapters[2].info().is_software);
    }

    #[test]
    fn test_force_warp_yields_all_software() {
        let instance = NullInstance::with_topology(NullTopology::default());
        let policy = AdapterPolicy {
            force_warp: true,
            ..Default::default()
        };
        let adapters = select(&instance, &policy, 2).unwrap();

        assert_eq!(adapters.len(), 2);
        assert!(adapters.iter().all(|a| a.info().is_software));
    }

    #[test]
    fn test_explicit_ordinal_is_hard_filter() {
        let instance = NullInstance::with_topology(
            NullTopology::empty()
                .with_adapter(NullAdapterDesc::discrete("first"))
                .with_adapter(NullAdapterDesc::discrete("second").with_luid(0x9000)),
        );
        let policy = AdapterPolicy {
            adapter_ordinal: Some(1),
            ..Default::default()
        };
        let adapters = select(&instance, &policy, 1).unwrap();
        assert_eq!(adapters[0].info().description, "second");
    }

    #[test]
    fn test_software_adapters_skipped_in_enumeration() {
        let instance = NullInstance::with_topology(
            NullTopology::empty()
                .with_adapter(NullAdapterDesc::software_stub("Basic Render Driver"))
                .with_adapter(NullAdapterDesc::discrete("real GPU")),
        );
        let adapters = select(&instance, &AdapterPolicy::default(), 1).unwrap();
        assert_eq!(adapters[0].info().description, "real GPU");
    }

    #[test]
    fn test_no_hardware_no_warp_is_fatal() {
        let instance = NullInstance::with_topology(NullTopology::empty().without_warp());
        assert!(select(&instance, &AdapterPolicy::default(), 1).is_err());
    }

    #[test]
    fn test_min_power_selects_integrated_first() {
        let instance = NullInstance::with_topology(
            NullTopology::empty()
                .with_adapter(NullAdapterDesc::discrete("dGPU"))
                .with_adapter(NullAdapterDesc::integrated("iGPU").with_luid(0x8000)),
        );
        let policy = AdapterPolicy {
            prefer_min_power: true,
            ..Default::default()
        };
        let adapters = select(&instance, &policy, 1).unwrap();
        assert_eq!(adapters[0].info().description, "iGPU");
    }

    #[test]
    fn test_feature_level_probe_filters() {
        let instance = NullInstance::with_topology(
            NullTopology::empty()
                .with_adapter(
                    NullAdapterDesc::discrete("old GPU").with_max_level(FeatureLevel::Level11_0),
                )
                .with_adapter(NullAdapterDesc::discrete("new GPU").with_luid(0x8000)),
        );
        let adapters =
            select_adapters::<NullApi>(&instance, &AdapterPolicy::default(), FeatureLevel::Level12_0, 1)
                .unwrap();
        assert_eq!(adapters[0].info().description, "new GPU");
    }
}
