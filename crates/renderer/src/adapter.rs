use std::sync::Arc;

use anyhow::{Context as _, Result};
use crossbeam_channel::Sender;

use crate::context::GpuContext;
use crate::types::{AdapterProfile, DeviceLoss, GpuPower};

/// Shared wgpu instance and adapter. Every render instance requests its own
/// device from here, so a lost device only takes one card down with it.
#[derive(Clone)]
pub struct GpuAdapter {
    inner: Arc<AdapterInner>,
}

struct AdapterInner {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    profile: AdapterProfile,
}

impl GpuAdapter {
    pub fn new(power: GpuPower) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: power.into(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let profile = AdapterProfile::from_wgpu(&adapter.get_info(), &adapter.limits());
        tracing::debug!(
            name = %profile.name,
            backend = ?profile.backend,
            device_type = ?profile.device_type,
            is_software = profile.is_software(),
            "selected GPU adapter"
        );

        Ok(Self {
            inner: Arc::new(AdapterInner {
                _instance: instance,
                adapter,
                profile,
            }),
        })
    }

    pub fn profile(&self) -> &AdapterProfile {
        &self.inner.profile
    }

    /// Requests a fresh device/queue pair. Losses are reported on `on_lost`
    /// tagged with `tag`.
    pub fn request_context(
        &self,
        label: &str,
        tag: u64,
        on_lost: Sender<DeviceLoss>,
    ) -> Result<GpuContext> {
        let (device, queue) = pollster::block_on(self.inner.adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some(label),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(self.inner.adapter.limits()),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::default(),
            },
        ))
        .with_context(|| format!("failed to create GPU device for {label}"))?;

        Ok(GpuContext::new(device, queue, tag, on_lost))
    }

    /// Checks that the adapter can still hand out devices.
    pub fn probe(&self) -> bool {
        let result = pollster::block_on(self.inner.adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cardshade probe"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::default(),
            },
        ));
        match result {
            Ok((device, _queue)) => {
                device.destroy();
                true
            }
            Err(err) => {
                tracing::debug!(%err, "adapter probe failed");
                false
            }
        }
    }
}
