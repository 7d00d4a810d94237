/// Pixel dimensions of a render target. Zero extents are clamped to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub(crate) fn extent(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Adapter selection bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPower {
    #[default]
    Low,
    High,
}

impl From<GpuPower> for wgpu::PowerPreference {
    fn from(power: GpuPower) -> Self {
        match power {
            GpuPower::Low => wgpu::PowerPreference::LowPower,
            GpuPower::High => wgpu::PowerPreference::HighPerformance,
        }
    }
}

/// Reported when a device goes away without being destroyed on purpose.
///
/// `tag` is whatever the caller passed when requesting the context, so the
/// receiver can route the event without knowing anything about wgpu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLoss {
    pub tag: u64,
    pub reason: String,
    pub message: String,
}

/// Summary of the adapter picked at startup, for logs and `--verbose` output.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
    }
}
