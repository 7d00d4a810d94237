//! Lazy, capacity-bounded scheduling of per-card render instances.
//!
//! Cards only get a render instance while they are near the viewport, at most
//! `max_active` instances exist at once, and a single animation driver
//! advances whatever is live. Everything runs on one thread: the caller feeds
//! viewport changes and device signals into [`CardScheduler::pump`].
//!
//! The GPU is hidden behind [`InstanceFactory`] and [`RenderTarget`], so this
//! crate carries no graphics dependency of its own.

mod dispatch;
mod driver;
mod manager;
mod observer;
mod pool;
mod settings;
mod target;
mod types;

#[cfg(test)]
mod testing;

pub use dispatch::{CardScheduler, PumpReport};
pub use driver::{AnimationDriver, FramePacer, LoopHandle};
pub use manager::{Activation, PoolManager, PoolStats};
pub use observer::{VisibilityEdge, VisibilityObserver};
pub use pool::{InstanceKey, InstancePool, PoolEntry};
pub use settings::{SchedulerError, SchedulerSettings};
pub use target::{InstanceFactory, InstanceRequest, RenderTarget};
pub use types::{
    CardDescriptor, ContextId, ContextSignal, PlacedCard, SurfaceId, SurfaceRect, SurfaceSize,
    Viewport,
};
