//! DirectX 12 后端实现
//!
//! 把 `gfx::api` 的 trait 族映射到 DXGI/D3D12：工厂与适配器枚举、
//! 设备与队列创建、命令列表与栅栏、交换链与色彩空间协商。
//! 所有句柄都是 COM 引用计数对象，包装类型只负责把调用序列
//! 翻译成帧管理器需要的形状。
//!
//! # 关键顺序约束
//!
//! 调试层必须在创建任何设备之前打开（`Dx12Instance::new` 内完成），
//! 事后打开会使已创建的设备失效。

use windows::core::Interface;
use windows::Win32::Foundation::{CloseHandle, HANDLE, HWND, RECT};
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::System::Threading::{CreateEventW, WaitForSingleObject, INFINITE};
use windows::Win32::UI::WindowsAndMessaging::GetWindowRect;

use tracing::{debug, warn};

use crate::core::error::{GraphicsError, Result};
use crate::gfx::api::{
    AdapterInfo, ColorSpace, DeviceLoss, DisplayRotation, FeatureLevel, GpuAdapter, GpuApi,
    GpuCommandAllocator, GpuCommandList, GpuDevice, GpuFence, GpuInstance, GpuQueue, GpuSwapchain,
    InstanceDesc, OutputInfo, PixelFormat, PowerPreference, RectI, ResourceState, SurfaceStatus,
    SwapchainDesc,
};

use super::convert::{
    luid_to_u64, to_d3d_level, to_d3d_state, to_dxgi_color_space, to_dxgi_format,
    to_dxgi_rotation, utf16_description,
};

/// DirectX 12 后端标记类型
pub struct Dx12Api;

impl GpuApi for Dx12Api {
    type Instance = Dx12Instance;
    type Adapter = Dx12Adapter;
    type Device = Dx12Device;
    type Queue = Dx12Queue;
    type CommandAllocator = Dx12CommandAllocator;
    type CommandList = Dx12CommandList;
    type Fence = Dx12Fence;
    type Swapchain = Dx12Swapchain;
    type Resource = ID3D12Resource;
    type DescriptorHeap = Dx12DescriptorHeap;
    type DescriptorHandle = D3D12_CPU_DESCRIPTOR_HANDLE;
    type Window = Dx12Window;

    const NAME: &'static str = "DirectX 12";
}

/// 交换链绑定的窗口句柄
#[derive(Debug, Clone, Copy)]
pub struct Dx12Window(pub HWND);

fn win_err(e: windows::core::Error) -> String {
    format!("{}", e)
}

/// 设备移除 HRESULT 翻译为丢失种类，移除时带上设备报告的原因
fn classify_loss(device: &ID3D12Device, code: windows::core::HRESULT) -> DeviceLoss {
    if code == DXGI_ERROR_DEVICE_RESET {
        return DeviceLoss::Reset;
    }
    let reason = match unsafe { device.GetDeviceRemovedReason() } {
        Err(e) => win_err(e),
        Ok(()) => format!("0x{:08X}", code.0),
    };
    DeviceLoss::Removed(reason)
}

// ---------------------------------------------------------------------------
// 实例
// ---------------------------------------------------------------------------

/// DXGI 工厂包装，适配器枚举与交换链创建的入口
pub struct Dx12Instance {
    factory: IDXGIFactory4,
    tearing_supported: bool,
    debug_layer: bool,
}

impl Dx12Instance {
    unsafe fn create_factory(debug_layer: bool) -> Result<IDXGIFactory4> {
        let flags = if debug_layer {
            DXGI_CREATE_FACTORY_DEBUG
        } else {
            DXGI_CREATE_FACTORY_FLAGS(0)
        };
        CreateDXGIFactory2(flags).map_err(|e| {
            GraphicsError::Backend(format!("CreateDXGIFactory2 failed: {}", win_err(e))).into()
        })
    }

    unsafe fn probe_tearing(factory: &IDXGIFactory4) -> bool {
        let Ok(factory5) = factory.cast::<IDXGIFactory5>() else {
            return false;
        };
        let mut allow = windows::core::BOOL::default();
        factory5
            .CheckFeatureSupport(
                DXGI_FEATURE_PRESENT_ALLOW_TEARING,
                &mut allow as *mut _ as *mut core::ffi::c_void,
                std::mem::size_of::<windows::core::BOOL>() as u32,
            )
            .is_ok()
            && allow.as_bool()
    }

    unsafe fn adapter_from_dxgi(adapter: IDXGIAdapter1, ordinal: u32) -> Result<Dx12Adapter> {
        let desc = adapter
            .GetDesc1()
            .map_err(|e| GraphicsError::AdapterUnavailable(win_err(e)))?;
        Ok(Dx12Adapter {
            info: AdapterInfo {
                ordinal,
                description: utf16_description(&desc.Description),
                vendor_id: desc.VendorId,
                device_id: desc.DeviceId,
                dedicated_video_memory: desc.DedicatedVideoMemory as u64,
                is_software: (desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32) != 0,
                luid: luid_to_u64(&desc.AdapterLuid),
            },
            adapter,
        })
    }

    unsafe fn enumerate_on(
        factory: &IDXGIFactory4,
        preference: PowerPreference,
    ) -> Result<Vec<Dx12Adapter>> {
        let mut adapters = Vec::new();

        // 平台支持按偏好枚举时优先使用，否则退回序号枚举
        if let Ok(factory6) = factory.cast::<IDXGIFactory6>() {
            let gpu_preference = match preference {
                PowerPreference::None => DXGI_GPU_PREFERENCE_UNSPECIFIED,
                PowerPreference::HighPerformance => DXGI_GPU_PREFERENCE_HIGH_PERFORMANCE,
                PowerPreference::MinimumPower => DXGI_GPU_PREFERENCE_MINIMUM_POWER,
            };
            for ordinal in 0.. {
                match factory6.EnumAdapterByGpuPreference::<IDXGIAdapter1>(ordinal, gpu_preference)
                {
                    Ok(adapter) => adapters.push(Self::adapter_from_dxgi(adapter, ordinal)?),
                    Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
                    Err(e) => return Err(GraphicsError::AdapterUnavailable(win_err(e)).into()),
                }
            }
            return Ok(adapters);
        }

        for ordinal in 0.. {
            match factory.EnumAdapters1(ordinal) {
                Ok(adapter) => adapters.push(Self::adapter_from_dxgi(adapter, ordinal)?),
                Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
                Err(e) => return Err(GraphicsError::AdapterUnavailable(win_err(e)).into()),
            }
        }
        Ok(adapters)
    }
}

impl GpuInstance<Dx12Api> for Dx12Instance {
    fn new(desc: &InstanceDesc) -> Result<Self> {
        unsafe {
            // 调试层先于任何设备创建
            if desc.enable_debug_layer {
                let mut debug: Option<ID3D12Debug> = None;
                if D3D12GetDebugInterface(&mut debug).is_ok() {
                    if let Some(debug) = debug {
                        debug.EnableDebugLayer();
                        if let Ok(debug1) = debug.cast::<ID3D12Debug1>() {
                            debug1.SetEnableGPUBasedValidation(true);
                        }
                        debug!("D3D12 debug layer enabled");
                    }
                } else {
                    warn!("D3D12 debug layer requested but unavailable");
                }
            }

            let factory = Self::create_factory(desc.enable_debug_layer)?;
            let tearing_supported = Self::probe_tearing(&factory);
            Ok(Self {
                factory,
                tearing_supported,
                debug_layer: desc.enable_debug_layer,
            })
        }
    }

    fn supports_tearing(&self) -> bool {
        self.tearing_supported
    }

    fn enumerate_adapters(&self, preference: PowerPreference) -> Result<Vec<Dx12Adapter>> {
        unsafe { Self::enumerate_on(&self.factory, preference) }
    }

    fn warp_adapter(&self) -> Result<Dx12Adapter> {
        unsafe {
            let adapter: IDXGIAdapter1 = self.factory.EnumWarpAdapter().map_err(|e| {
                GraphicsError::AdapterUnavailable(format!(
                    "WARP adapter not available: {}",
                    win_err(e)
                ))
            })?;
            let mut warp = Self::adapter_from_dxgi(adapter, u32::MAX)?;
            // 部分系统的 WARP 枚举描述不带软件标志，这里强制认定
            warp.info.is_software = true;
            Ok(warp)
        }
    }

    fn probe_adapter(&self, adapter: &Dx12Adapter, min_level: FeatureLevel) -> bool {
        // 空输出参数：只探测能力，不保留设备
        unsafe {
            D3D12CreateDevice(
                &adapter.adapter,
                to_d3d_level(min_level),
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
            .is_ok()
        }
    }

    fn create_device(
        &self,
        adapter: &Dx12Adapter,
        min_level: FeatureLevel,
    ) -> Result<(Dx12Device, FeatureLevel)> {
        unsafe {
            // 从高到低尝试，停在最低要求之下
            for level in FeatureLevel::DESCENDING {
                if level < min_level {
                    break;
                }
                let mut device: Option<ID3D12Device> = None;
                if D3D12CreateDevice(&adapter.adapter, to_d3d_level(level), &mut device).is_ok() {
                    if let Some(device) = device {
                        return Ok((
                            Dx12Device {
                                device,
                                luid: adapter.info.luid,
                            },
                            level,
                        ));
                    }
                }
            }
            Err(GraphicsError::DeviceCreation(format!(
                "adapter '{}' does not support feature level {}",
                adapter.info.description,
                min_level.as_str()
            ))
            .into())
        }
    }

    fn enumerate_outputs(&self) -> Result<Vec<OutputInfo>> {
        unsafe {
            let mut outputs = Vec::new();
            for adapter in Self::enumerate_on(&self.factory, PowerPreference::None)? {
                for index in 0.. {
                    let output = match adapter.adapter.EnumOutputs(index) {
                        Ok(output) => output,
                        Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
                        Err(e) => return Err(GraphicsError::Backend(win_err(e)).into()),
                    };
                    let Ok(output6) = output.cast::<IDXGIOutput6>() else {
                        continue;
                    };
                    let desc = output6
                        .GetDesc1()
                        .map_err(|e| GraphicsError::Backend(win_err(e)))?;
                    let rect: RECT = desc.DesktopCoordinates;
                    outputs.push(OutputInfo {
                        name: utf16_description(&desc.DeviceName),
                        desktop_rect: RectI::new(rect.left, rect.top, rect.right, rect.bottom),
                        hdr10: desc.ColorSpace == DXGI_COLOR_SPACE_RGB_FULL_G2084_NONE_P2020,
                    });
                }
            }
            Ok(outputs)
        }
    }

    fn window_bounds(&self, window: &Dx12Window) -> Option<RectI> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(window.0, &mut rect) }.ok()?;
        Some(RectI::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn default_adapter_luid(&self, preference: PowerPreference) -> Result<Option<u64>> {
        // 全新工厂保证枚举结果不来自缓存
        unsafe {
            let factory = Self::create_factory(false)?;
            let adapters = Self::enumerate_on(&factory, preference)?;
            Ok(adapters
                .iter()
                .find(|a| !a.info.is_software)
                .map(|a| a.info.luid))
        }
    }

    fn is_current(&self) -> bool {
        unsafe { self.factory.IsCurrent().as_bool() }
    }

    fn refresh(&mut self) -> Result<()> {
        unsafe {
            self.factory = Self::create_factory(self.debug_layer)?;
            self.tearing_supported = Self::probe_tearing(&self.factory);
        }
        Ok(())
    }

    fn create_swapchain(
        &self,
        queue: &Dx12Queue,
        window: &Dx12Window,
        desc: &SwapchainDesc,
    ) -> Result<Dx12Swapchain> {
        unsafe {
            let flags = if desc.allow_tearing {
                DXGI_SWAP_CHAIN_FLAG_ALLOW_TEARING.0 as u32
            } else {
                0
            };
            let swapchain_desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: desc.width,
                Height: desc.height,
                Format: to_dxgi_format(desc.format),
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: desc.buffer_count,
                Scaling: DXGI_SCALING_STRETCH,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                AlphaMode: DXGI_ALPHA_MODE_IGNORE,
                Flags: flags,
                ..Default::default()
            };

            let swapchain: IDXGISwapChain1 = self
                .factory
                .CreateSwapChainForHwnd(&queue.queue, window.0, &swapchain_desc, None, None)
                .map_err(|e| GraphicsError::SwapchainCreation(win_err(e)))?;
            let swapchain: IDXGISwapChain3 = swapchain
                .cast()
                .map_err(|e| GraphicsError::SwapchainCreation(win_err(e)))?;

            // 抑制 DXGI 默认的 ALT+ENTER 全屏切换
            self.factory
                .MakeWindowAssociation(window.0, DXGI_MWA_NO_ALT_ENTER)
                .map_err(|e| GraphicsError::SwapchainCreation(win_err(e)))?;

            Ok(Dx12Swapchain {
                swapchain,
                device: queue.device.clone(),
                flags,
            })
        }
    }

    fn report_live_objects(&self) {
        unsafe {
            if let Ok(dxgi_debug) = DXGIGetDebugInterface1::<IDXGIDebug1>(0) {
                let _ = dxgi_debug.ReportLiveObjects(
                    DXGI_DEBUG_ALL,
                    DXGI_DEBUG_RLO_FLAGS(
                        DXGI_DEBUG_RLO_SUMMARY.0 | DXGI_DEBUG_RLO_IGNORE_INTERNAL.0,
                    ),
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 适配器 / 设备
// ---------------------------------------------------------------------------

/// DXGI 适配器句柄与描述信息
#[derive(Clone)]
pub struct Dx12Adapter {
    adapter: IDXGIAdapter1,
    info: AdapterInfo,
}

impl GpuAdapter for Dx12Adapter {
    fn info(&self) -> &AdapterInfo {
        &self.info
    }
}

/// D3D12 逻辑设备
pub struct Dx12Device {
    device: ID3D12Device,
    luid: u64,
}

impl Dx12Device {
    pub fn raw(&self) -> &ID3D12Device {
        &self.device
    }

    fn create_heap(
        &self,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
        capacity: u32,
    ) -> Result<Dx12DescriptorHeap> {
        unsafe {
            let heap_desc = D3D12_DESCRIPTOR_HEAP_DESC {
                Type: heap_type,
                NumDescriptors: capacity,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                NodeMask: 0,
            };
            let heap: ID3D12DescriptorHeap = self
                .device
                .CreateDescriptorHeap(&heap_desc)
                .map_err(|e| GraphicsError::ResourceCreation(win_err(e)))?;
            let start = heap.GetCPUDescriptorHandleForHeapStart();
            let increment = self.device.GetDescriptorHandleIncrementSize(heap_type) as usize;
            Ok(Dx12DescriptorHeap {
                _heap: heap,
                start,
                increment,
            })
        }
    }

    fn create_committed_texture(
        &self,
        width: u32,
        height: u32,
        format: DXGI_FORMAT,
        flags: D3D12_RESOURCE_FLAGS,
        initial_state: D3D12_RESOURCE_STATES,
        clear_value: &D3D12_CLEAR_VALUE,
    ) -> Result<ID3D12Resource> {
        unsafe {
            let heap_props = D3D12_HEAP_PROPERTIES {
                Type: D3D12_HEAP_TYPE_DEFAULT,
                ..Default::default()
            };
            let resource_desc = D3D12_RESOURCE_DESC {
                Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
                Alignment: 0,
                Width: width as u64,
                Height: height,
                DepthOrArraySize: 1,
                MipLevels: 1,
                Format: format,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
                Flags: flags,
            };

            let mut resource: Option<ID3D12Resource> = None;
            self.device
                .CreateCommittedResource(
                    &heap_props,
                    D3D12_HEAP_FLAG_NONE,
                    &resource_desc,
                    initial_state,
                    Some(clear_value),
                    &mut resource,
                )
                .map_err(|e| GraphicsError::ResourceCreation(win_err(e)))?;
            resource.ok_or_else(|| {
                GraphicsError::ResourceCreation(
                    "CreateCommittedResource returned no resource".to_string(),
                )
                .into()
            })
        }
    }
}

impl GpuDevice<Dx12Api> for Dx12Device {
    fn create_queue(&self) -> Result<Dx12Queue> {
        unsafe {
            let queue_desc = D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                ..Default::default()
            };
            let queue: ID3D12CommandQueue = self
                .device
                .CreateCommandQueue(&queue_desc)
                .map_err(|e| GraphicsError::DeviceCreation(win_err(e)))?;
            Ok(Dx12Queue {
                queue,
                device: self.device.clone(),
            })
        }
    }

    fn create_command_allocator(&self) -> Result<Dx12CommandAllocator> {
        unsafe {
            let allocator: ID3D12CommandAllocator = self
                .device
                .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
                .map_err(|e| GraphicsError::ResourceCreation(win_err(e)))?;
            Ok(Dx12CommandAllocator { allocator })
        }
    }

    fn create_command_list(&self, allocator: &Dx12CommandAllocator) -> Result<Dx12CommandList> {
        unsafe {
            let list: ID3D12GraphicsCommandList = self
                .device
                .CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &allocator.allocator, None)
                .map_err(|e| GraphicsError::ResourceCreation(win_err(e)))?;
            // 创建即关闭，与帧循环的"每帧先 reset"约定对齐
            list.Close()
                .map_err(|e| GraphicsError::ResourceCreation(win_err(e)))?;
            Ok(Dx12CommandList { list })
        }
    }

    fn create_fence(&self, initial: u64) -> Result<Dx12Fence> {
        unsafe {
            let fence: ID3D12Fence = self
                .device
                .CreateFence(initial, D3D12_FENCE_FLAG_NONE)
                .map_err(|e| GraphicsError::Synchronization(win_err(e)))?;
            let event = CreateEventW(None, false, false, None)
                .map_err(|e| GraphicsError::Synchronization(win_err(e)))?;
            Ok(Dx12Fence { fence, event })
        }
    }

    fn create_rtv_heap(&self, capacity: u32) -> Result<Dx12DescriptorHeap> {
        self.create_heap(D3D12_DESCRIPTOR_HEAP_TYPE_RTV, capacity)
    }

    fn create_dsv_heap(&self, capacity: u32) -> Result<Dx12DescriptorHeap> {
        self.create_heap(D3D12_DESCRIPTOR_HEAP_TYPE_DSV, capacity)
    }

    fn create_render_target(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<ID3D12Resource> {
        let dxgi_format = to_dxgi_format(format);
        let clear_value = D3D12_CLEAR_VALUE {
            Format: dxgi_format,
            Anonymous: D3D12_CLEAR_VALUE_0 {
                Color: [0.0, 0.0, 0.0, 1.0],
            },
        };
        self.create_committed_texture(
            width,
            height,
            dxgi_format,
            D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET,
            D3D12_RESOURCE_STATE_PRESENT,
            &clear_value,
        )
    }

    fn create_depth_stencil(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<ID3D12Resource> {
        let dxgi_format = to_dxgi_format(format);
        let clear_value = D3D12_CLEAR_VALUE {
            Format: dxgi_format,
            Anonymous: D3D12_CLEAR_VALUE_0 {
                DepthStencil: D3D12_DEPTH_STENCIL_VALUE {
                    Depth: 1.0,
                    Stencil: 0,
                },
            },
        };
        self.create_committed_texture(
            width,
            height,
            dxgi_format,
            D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
            D3D12_RESOURCE_STATE_DEPTH_WRITE,
            &clear_value,
        )
    }

    fn create_rtv(
        &self,
        heap: &Dx12DescriptorHeap,
        index: u32,
        resource: &ID3D12Resource,
        _format: PixelFormat,
    ) {
        unsafe {
            self.device
                .CreateRenderTargetView(resource, None, heap.handle(index));
        }
    }

    fn create_dsv(
        &self,
        heap: &Dx12DescriptorHeap,
        index: u32,
        resource: &ID3D12Resource,
        _format: PixelFormat,
    ) {
        unsafe {
            self.device
                .CreateDepthStencilView(resource, None, heap.handle(index));
        }
    }

    fn descriptor_handle(
        &self,
        heap: &Dx12DescriptorHeap,
        index: u32,
    ) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        heap.handle(index)
    }

    fn adapter_luid(&self) -> u64 {
        self.luid
    }

    fn removal_reason(&self) -> Option<DeviceLoss> {
        match unsafe { self.device.GetDeviceRemovedReason() } {
            Ok(()) => None,
            Err(e) if e.code() == DXGI_ERROR_DEVICE_RESET => Some(DeviceLoss::Reset),
            Err(e) => Some(DeviceLoss::Removed(win_err(e))),
        }
    }
}

// ---------------------------------------------------------------------------
// 队列 / 命令 / 栅栏
// ---------------------------------------------------------------------------

/// 命令队列；保留设备引用用于丢失原因查询
pub struct Dx12Queue {
    queue: ID3D12CommandQueue,
    device: ID3D12Device,
}

impl Dx12Queue {
    pub fn raw(&self) -> &ID3D12CommandQueue {
        &self.queue
    }
}

impl GpuQueue<Dx12Api> for Dx12Queue {
    fn execute(&self, list: &Dx12CommandList) {
        unsafe {
            let lists = [Some(list.list.clone().into())];
            self.queue.ExecuteCommandLists(&lists);
        }
    }

    fn signal(&self, fence: &Dx12Fence, value: u64) -> Result<()> {
        unsafe {
            self.queue
                .Signal(&fence.fence, value)
                .map_err(|e| GraphicsError::Synchronization(win_err(e)).into())
        }
    }
}

/// 命令分配器
pub struct Dx12CommandAllocator {
    allocator: ID3D12CommandAllocator,
}

impl GpuCommandAllocator for Dx12CommandAllocator {
    fn reset(&mut self) -> Result<()> {
        unsafe {
            self.allocator.Reset().map_err(|e| {
                GraphicsError::Backend(format!("allocator reset: {}", win_err(e))).into()
            })
        }
    }
}

/// 图形命令列表
pub struct Dx12CommandList {
    list: ID3D12GraphicsCommandList,
}

impl Dx12CommandList {
    pub fn raw(&self) -> &ID3D12GraphicsCommandList {
        &self.list
    }
}

impl GpuCommandList<Dx12Api> for Dx12CommandList {
    fn reset(&mut self, allocator: &Dx12CommandAllocator) -> Result<()> {
        unsafe {
            self.list.Reset(&allocator.allocator, None).map_err(|e| {
                GraphicsError::Backend(format!("command list reset: {}", win_err(e))).into()
            })
        }
    }

    fn transition(
        &mut self,
        resource: &ID3D12Resource,
        before: ResourceState,
        after: ResourceState,
    ) {
        unsafe {
            let mut barrier = D3D12_RESOURCE_BARRIER {
                Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
                Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
                Anonymous: D3D12_RESOURCE_BARRIER_0 {
                    Transition: std::mem::ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                        pResource: std::mem::ManuallyDrop::new(Some(resource.clone())),
                        Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                        StateBefore: to_d3d_state(before),
                        StateAfter: to_d3d_state(after),
                    }),
                },
            };
            self.list.ResourceBarrier(std::slice::from_ref(&barrier));
            // 释放屏障里克隆出的资源引用
            let transition = std::mem::ManuallyDrop::take(&mut barrier.Anonymous.Transition);
            drop(transition);
        }
    }

    fn close(&mut self) -> Result<()> {
        unsafe {
            self.list.Close().map_err(|e| {
                GraphicsError::Backend(format!("command list close: {}", win_err(e))).into()
            })
        }
    }
}

/// 栅栏与其等待事件
pub struct Dx12Fence {
    fence: ID3D12Fence,
    event: HANDLE,
}

impl GpuFence for Dx12Fence {
    fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    fn wait_until(&self, value: u64) -> Result<()> {
        unsafe {
            self.fence
                .SetEventOnCompletion(value, self.event)
                .map_err(|e| GraphicsError::Synchronization(win_err(e)))?;
            WaitForSingleObject(self.event, INFINITE);
        }
        Ok(())
    }
}

impl Drop for Dx12Fence {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.event);
        }
    }
}

// ---------------------------------------------------------------------------
// 描述符堆 / 交换链
// ---------------------------------------------------------------------------

/// 描述符堆，起始句柄与步长在创建时缓存
pub struct Dx12DescriptorHeap {
    _heap: ID3D12DescriptorHeap,
    start: D3D12_CPU_DESCRIPTOR_HANDLE,
    increment: usize,
}

impl Dx12DescriptorHeap {
    fn handle(&self, index: u32) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.start.ptr + index as usize * self.increment,
        }
    }
}

/// 翻转模型交换链；保留设备引用用于丢失原因查询
pub struct Dx12Swapchain {
    swapchain: IDXGISwapChain3,
    device: ID3D12Device,
    flags: u32,
}

impl Dx12Swapchain {
    pub fn raw(&self) -> &IDXGISwapChain3 {
        &self.swapchain
    }
}

impl GpuSwapchain<Dx12Api> for Dx12Swapchain {
    fn resize(
        &mut self,
        width: u32,
        height: u32,
        buffer_count: u32,
        format: PixelFormat,
        allow_tearing: bool,
    ) -> Result<SurfaceStatus> {
        self.flags = if allow_tearing {
            DXGI_SWAP_CHAIN_FLAG_ALLOW_TEARING.0 as u32
        } else {
            0
        };
        match unsafe {
            self.swapchain.ResizeBuffers(
                buffer_count,
                width,
                height,
                to_dxgi_format(format),
                DXGI_SWAP_CHAIN_FLAG(self.flags as i32),
            )
        } {
            Ok(()) => Ok(SurfaceStatus::Ok),
            Err(e)
                if e.code() == DXGI_ERROR_DEVICE_REMOVED
                    || e.code() == DXGI_ERROR_DEVICE_RESET =>
            {
                Ok(SurfaceStatus::DeviceLost(classify_loss(
                    &self.device,
                    e.code(),
                )))
            }
            Err(e) => Err(GraphicsError::SwapchainCreation(format!(
                "ResizeBuffers failed: {}",
                win_err(e)
            ))
            .into()),
        }
    }

    fn back_buffer(&self, index: u32) -> Result<ID3D12Resource> {
        unsafe {
            self.swapchain
                .GetBuffer(index)
                .map_err(|e| GraphicsError::SwapchainCreation(win_err(e)).into())
        }
    }

    fn current_back_buffer_index(&self) -> u32 {
        unsafe { self.swapchain.GetCurrentBackBufferIndex() }
    }

    fn present(&mut self, interval: u32, allow_tearing: bool) -> Result<SurfaceStatus> {
        // 撕裂模式只在无垂直同步时合法
        let flags = if interval == 0 && allow_tearing {
            DXGI_PRESENT_ALLOW_TEARING
        } else {
            DXGI_PRESENT(0)
        };
        let hr = unsafe { self.swapchain.Present(interval, flags) };
        if hr == DXGI_ERROR_DEVICE_REMOVED || hr == DXGI_ERROR_DEVICE_RESET {
            return Ok(SurfaceStatus::DeviceLost(classify_loss(&self.device, hr)));
        }
        hr.ok()
            .map_err(|e| GraphicsError::Backend(format!("Present failed: {}", win_err(e))))?;
        Ok(SurfaceStatus::Ok)
    }

    fn supports_color_space(&self, color_space: ColorSpace) -> bool {
        unsafe {
            match self
                .swapchain
                .CheckColorSpaceSupport(to_dxgi_color_space(color_space))
            {
                Ok(support) => {
                    (support & DXGI_SWAP_CHAIN_COLOR_SPACE_SUPPORT_FLAG_PRESENT.0 as u32) != 0
                }
                Err(_) => false,
            }
        }
    }

    fn set_color_space(&mut self, color_space: ColorSpace) -> Result<()> {
        unsafe {
            self.swapchain
                .SetColorSpace1(to_dxgi_color_space(color_space))
                .map_err(|e| GraphicsError::SwapchainCreation(win_err(e)).into())
        }
    }

    fn set_rotation(&mut self, rotation: DisplayRotation) -> Result<()> {
        // 桌面窗口默认恒等旋转，无需向交换链声明
        if rotation == DisplayRotation::Identity {
            return Ok(());
        }
        unsafe {
            self.swapchain
                .SetRotation(to_dxgi_rotation(rotation))
                .map_err(|e| GraphicsError::SwapchainCreation(win_err(e)).into())
        }
    }
}
