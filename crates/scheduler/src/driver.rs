use std::time::{Duration, Instant};

use crate::pool::InstancePool;
use crate::target::RenderTarget;

/// Handle identifying one started loop. A handle from before the latest
/// `start` or `stop` no longer ticks anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopHandle(u64);

/// The single per-frame callback shared by every pooled instance.
///
/// It borrows the pool only for the duration of a tick; ownership stays with
/// the manager.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    generation: u64,
    running: bool,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a loop, cancelling whichever loop was running before.
    pub fn start(&mut self) -> LoopHandle {
        if self.running {
            tracing::trace!(generation = self.generation, "cancelling previous animation loop");
        }
        self.generation += 1;
        self.running = true;
        LoopHandle(self.generation)
    }

    pub fn stop(&mut self) {
        if self.running {
            self.generation += 1;
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_current(&self, handle: LoopHandle) -> bool {
        self.running && handle.0 == self.generation
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances every active entry in insertion order. Returns how many were
    /// advanced; zero when the driver is stopped.
    pub fn tick<T: RenderTarget>(&mut self, pool: &mut InstancePool<T>, now: Instant) -> usize {
        if !self.running {
            return 0;
        }
        self.ticks += 1;
        let mut advanced = 0;
        for entry in pool.iter_mut() {
            if entry.active {
                entry.target.advance(now);
                advanced += 1;
            }
        }
        advanced
    }
}

/// Drops frames to honour an optional FPS cap.
#[derive(Debug, Clone)]
pub struct FramePacer {
    target_interval: Option<Duration>,
    accumulator: Duration,
    last_tick: Option<Instant>,
}

impl FramePacer {
    pub fn new(target_fps: Option<f32>) -> Self {
        // Caps too small to express as a Duration run uncapped.
        let target_interval = target_fps
            .filter(|fps| *fps > 0.0)
            .and_then(|fps| Duration::try_from_secs_f32(1.0 / fps).ok());
        Self {
            target_interval,
            accumulator: Duration::ZERO,
            last_tick: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.target_interval
    }

    pub fn reset(&mut self, now: Instant) {
        self.accumulator = Duration::ZERO;
        self.last_tick = Some(now);
    }

    pub fn should_render(&mut self, now: Instant) -> bool {
        let Some(interval) = self.target_interval else {
            self.last_tick = Some(now);
            return true;
        };
        let Some(last) = self.last_tick.replace(now) else {
            return true;
        };

        self.accumulator = self
            .accumulator
            .saturating_add(now.saturating_duration_since(last));
        if self.accumulator + Duration::from_micros(250) < interval {
            false
        } else {
            self.accumulator = self.accumulator.saturating_sub(interval);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_invalidates_old_handle() {
        let mut driver = AnimationDriver::new();
        let first = driver.start();
        let second = driver.start();
        assert!(!driver.is_current(first));
        assert!(driver.is_current(second));

        driver.stop();
        assert!(!driver.is_running());
        assert!(!driver.is_current(second));
    }

    #[test]
    fn stopped_driver_does_not_tick() {
        let mut driver = AnimationDriver::new();
        let mut pool: InstancePool<crate::testing::FakeTarget> = InstancePool::new();
        assert_eq!(driver.tick(&mut pool, Instant::now()), 0);
        assert_eq!(driver.ticks(), 0);
    }

    #[test]
    fn pacer_without_cap_always_renders() {
        let mut pacer = FramePacer::new(None);
        let now = Instant::now();
        assert!(pacer.should_render(now));
        assert!(pacer.should_render(now));
    }

    #[test]
    fn pacer_drops_frames_above_cap() {
        let mut pacer = FramePacer::new(Some(30.0));
        let start = Instant::now();
        pacer.reset(start);

        let mut rendered = 0;
        for frame in 1..=60 {
            // 60 Hz input against a 30 FPS cap.
            let now = start + Duration::from_micros(16_667 * frame);
            if pacer.should_render(now) {
                rendered += 1;
            }
        }
        assert!((29..=31).contains(&rendered), "rendered {rendered}");
    }

    #[test]
    fn non_positive_fps_means_uncapped() {
        assert!(FramePacer::new(Some(0.0)).interval().is_none());
        assert!(FramePacer::new(Some(-5.0)).interval().is_none());
    }

    #[test]
    fn unrepresentable_fps_means_uncapped() {
        let mut pacer = FramePacer::new(Some(1e-30));
        assert!(pacer.interval().is_none());
        assert!(pacer.should_render(Instant::now()));
        assert!(FramePacer::new(Some(f32::NAN)).interval().is_none());
    }
}
