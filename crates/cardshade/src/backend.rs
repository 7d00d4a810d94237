//! Glue between the scheduler's abstract render targets and wgpu instances.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use poolconfig::PowerSetting;
use renderer::{DeviceLoss, GpuAdapter, GpuPower, InstanceSpec, RenderInstance, TargetSize};
use scheduler::{
    ContextId, ContextSignal, InstanceFactory, InstanceRequest, RenderTarget, SurfaceSize,
};

pub fn gpu_power(setting: PowerSetting) -> GpuPower {
    match setting {
        PowerSetting::Low => GpuPower::Low,
        PowerSetting::High => GpuPower::High,
    }
}

fn target_size(size: SurfaceSize) -> TargetSize {
    TargetSize::new(size.width, size.height)
}

/// A pooled card or background instance.
pub struct CardTarget {
    context: ContextId,
    instance: RenderInstance,
}

impl CardTarget {
    pub fn instance(&self) -> &RenderInstance {
        &self.instance
    }
}

impl RenderTarget for CardTarget {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn advance(&mut self, now: Instant) {
        self.instance.advance(now);
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.instance.resize(target_size(size));
    }

    fn dispose(&mut self) {
        self.instance.dispose();
    }

    fn mark_lost(&mut self) {
        self.instance.mark_lost();
    }

    fn set_scroll(&mut self, scroll: f32) {
        self.instance.set_scroll(scroll);
    }
}

/// Builds one [`RenderInstance`] per request, each on its own device. The
/// context id doubles as the device-loss tag.
pub struct GpuFactory {
    adapter: GpuAdapter,
    losses: Sender<DeviceLoss>,
    next_context: u64,
}

impl GpuFactory {
    pub fn new(adapter: GpuAdapter, losses: Sender<DeviceLoss>) -> Self {
        Self {
            adapter,
            losses,
            next_context: 0,
        }
    }

    pub fn contexts_created(&self) -> u64 {
        self.next_context
    }
}

impl InstanceFactory for GpuFactory {
    type Target = CardTarget;

    fn create(&mut self, request: InstanceRequest<'_>) -> Result<CardTarget> {
        self.next_context += 1;
        let context = ContextId(self.next_context);
        let label = match request.surface {
            Some(surface) => format!("card {surface}"),
            None => "background".to_string(),
        };

        let instance = RenderInstance::new(
            &self.adapter,
            InstanceSpec {
                label,
                variant: request.variant,
                params: request.params,
                size: target_size(request.size),
                started_at: request.started_at,
                tag: context.0,
            },
            self.losses.clone(),
        )?;
        Ok(CardTarget { context, instance })
    }
}

/// Minimum spacing between adapter checks while contexts await restore.
/// Each check blocks on a device request.
pub const RECOVERY_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Rate limit for adapter recovery checks.
#[derive(Debug, Clone, Copy)]
struct RecoveryThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl RecoveryThrottle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Claims a check slot at `now` if the previous one is old enough.
    fn try_claim(&mut self, now: Instant) -> bool {
        let due = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

/// Turns device-loss callbacks into scheduler signals. A loss is followed by
/// a restore once the adapter hands out devices again.
pub struct LossRelay {
    adapter: GpuAdapter,
    losses: Receiver<DeviceLoss>,
    signals: Sender<ContextSignal>,
    awaiting_restore: Vec<ContextId>,
    throttle: RecoveryThrottle,
}

impl LossRelay {
    pub fn new(
        adapter: GpuAdapter,
        losses: Receiver<DeviceLoss>,
        signals: Sender<ContextSignal>,
    ) -> Self {
        Self {
            adapter,
            losses,
            signals,
            awaiting_restore: Vec::new(),
            throttle: RecoveryThrottle::new(RECOVERY_CHECK_INTERVAL),
        }
    }

    /// Forwards pending losses and any restores that are now possible.
    /// The adapter is checked at most once per [`RECOVERY_CHECK_INTERVAL`].
    /// Returns the number of signals sent.
    pub fn relay(&mut self, now: Instant) -> usize {
        let mut sent = 0;
        while let Ok(loss) = self.losses.try_recv() {
            let context = ContextId(loss.tag);
            tracing::debug!(%context, reason = %loss.reason, "forwarding device loss");
            if self.signals.send(ContextSignal::Lost(context)).is_ok() {
                sent += 1;
                self.awaiting_restore.push(context);
            }
        }

        if self.awaiting_restore.is_empty() {
            self.throttle.reset();
            return sent;
        }
        if self.throttle.try_claim(now) && self.adapter.probe() {
            for context in self.awaiting_restore.drain(..) {
                if self.signals.send(ContextSignal::Restored(context)).is_ok() {
                    sent += 1;
                }
            }
        }
        sent
    }
}
