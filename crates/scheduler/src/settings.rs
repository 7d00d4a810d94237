use std::time::Duration;

use poolconfig::PoolConfig;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("max_active must be at least 1")]
    ZeroCapacity,
    #[error("observer threshold {0} is outside 0..=1")]
    InvalidThreshold(f32),
    #[error("observer margin {0} must be a non-negative number of pixels")]
    InvalidMargin(f32),
    #[error("restore delay {0:?} exceeds {max:?}", max = poolconfig::MAX_RESTORE_DELAY)]
    RestoreDelayTooLong(Duration),
    #[error("frame cap {0} is below {min} fps", min = poolconfig::MIN_FPS)]
    FrameCapTooLow(f32),
}

/// Construction-time knobs. None of these change after the scheduler is
/// built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    pub max_active: usize,
    pub restore_delay: Duration,
    pub margin: f32,
    pub threshold: f32,
    pub target_fps: Option<f32>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            max_active: poolconfig::DEFAULT_MAX_ACTIVE as usize,
            restore_delay: Duration::from_millis(100),
            margin: poolconfig::DEFAULT_MARGIN,
            threshold: poolconfig::DEFAULT_THRESHOLD,
            target_fps: None,
        }
    }
}

impl SchedulerSettings {
    pub fn from_config(config: &PoolConfig) -> Self {
        Self {
            max_active: config.pool.max_active as usize,
            restore_delay: config.pool.restore_delay,
            margin: config.observer.margin,
            threshold: config.observer.threshold,
            target_fps: config.target_fps(),
        }
    }

    pub fn with_max_active(mut self, max_active: usize) -> Self {
        self.max_active = max_active;
        self
    }

    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.max_active == 0 {
            return Err(SchedulerError::ZeroCapacity);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SchedulerError::InvalidThreshold(self.threshold));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(SchedulerError::InvalidMargin(self.margin));
        }
        if self.restore_delay > poolconfig::MAX_RESTORE_DELAY {
            return Err(SchedulerError::RestoreDelayTooLong(self.restore_delay));
        }
        if let Some(fps) = self.target_fps {
            if fps > 0.0 && fps < poolconfig::MIN_FPS {
                return Err(SchedulerError::FrameCapTooLow(fps));
            }
        }
        Ok(())
    }
}
