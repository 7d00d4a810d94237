use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::types::DeviceLoss;

/// One device/queue pair owned by a single render instance.
pub struct GpuContext {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    lost: Arc<AtomicBool>,
    disposing: Arc<AtomicBool>,
}

impl GpuContext {
    pub(crate) fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        tag: u64,
        on_lost: Sender<DeviceLoss>,
    ) -> Self {
        let lost = Arc::new(AtomicBool::new(false));
        let disposing = Arc::new(AtomicBool::new(false));

        {
            let lost = Arc::clone(&lost);
            let disposing = Arc::clone(&disposing);
            device.set_device_lost_callback(move |reason, message| {
                if disposing.load(Ordering::Acquire) {
                    return;
                }
                lost.store(true, Ordering::Release);
                tracing::warn!(tag, ?reason, %message, "GPU device lost");
                let _ = on_lost.send(DeviceLoss {
                    tag,
                    reason: format!("{reason:?}"),
                    message,
                });
            });
        }

        device.on_uncaptured_error(Box::new(move |err| {
            tracing::error!(tag, %err, "uncaptured GPU error");
        }));

        Self {
            device,
            queue,
            lost,
            disposing,
        }
    }

    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    /// Flags the context as lost without waiting for the driver to say so.
    pub fn mark_lost(&self) {
        self.lost.store(true, Ordering::Release);
    }

    /// Tears the device down. The resulting device-lost callback is swallowed.
    pub(crate) fn destroy(&self) {
        self.disposing.store(true, Ordering::Release);
        self.device.destroy();
    }
}
