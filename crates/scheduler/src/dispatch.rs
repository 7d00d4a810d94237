use std::time::Instant;

use crossbeam_channel::Receiver;
use shaderlib::ShaderLibrary;

use crate::driver::{AnimationDriver, FramePacer};
use crate::manager::{Activation, PoolManager, PoolStats};
use crate::observer::{VisibilityEdge, VisibilityObserver};
use crate::settings::{SchedulerError, SchedulerSettings};
use crate::target::InstanceFactory;
use crate::types::{ContextSignal, PlacedCard, SurfaceId, SurfaceRect, SurfaceSize, Viewport};

/// What one [`CardScheduler::pump`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub signals: usize,
    pub restores: usize,
    pub entered: usize,
    pub left: usize,
    pub advanced: usize,
    pub rendered: bool,
}

/// Single-threaded dispatch loop tying the observer, the pool manager and the
/// animation driver together.
///
/// Each `pump` runs to completion in a fixed order: device signals, due
/// restore timers, visibility edges, then at most one animation tick. Edges
/// are never processed in the middle of a tick.
pub struct CardScheduler<F: InstanceFactory> {
    observer: VisibilityObserver,
    manager: PoolManager<F>,
    driver: AnimationDriver,
    pacer: FramePacer,
    signals: Receiver<ContextSignal>,
    next_surface: u64,
    surfaces: Vec<SurfaceId>,
    last_viewport: Option<Viewport>,
}

impl<F: InstanceFactory> CardScheduler<F> {
    pub fn new(
        library: ShaderLibrary,
        factory: F,
        settings: SchedulerSettings,
        signals: Receiver<ContextSignal>,
    ) -> Result<Self, SchedulerError> {
        let manager = PoolManager::new(library, factory, &settings)?;
        Ok(Self {
            observer: VisibilityObserver::new(settings.margin, settings.threshold),
            manager,
            driver: AnimationDriver::new(),
            pacer: FramePacer::new(settings.target_fps),
            signals,
            next_surface: 0,
            surfaces: Vec::new(),
            last_viewport: None,
        })
    }

    pub fn manager(&self) -> &PoolManager<F> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut PoolManager<F> {
        &mut self.manager
    }

    pub fn observer(&self) -> &VisibilityObserver {
        &self.observer
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn stats(&self) -> PoolStats {
        self.manager.stats()
    }

    /// Surfaces registered by the latest rebuild, in list order.
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    /// Replaces the card list: tears everything down, registers the new
    /// surfaces with the observer and restarts the animation loop.
    pub fn rebuild(&mut self, cards: &[PlacedCard]) -> Vec<SurfaceId> {
        self.teardown_all();

        self.surfaces.clear();
        self.surfaces.reserve(cards.len());
        for card in cards {
            let id = SurfaceId(self.next_surface);
            self.next_surface += 1;
            self.manager.register(id, card.descriptor, card.rect.size());
            self.observer.observe(id, card.rect);
            self.surfaces.push(id);
        }

        self.driver.start();
        tracing::debug!(cards = cards.len(), "card list rebuilt");
        self.surfaces.clone()
    }

    /// Moves `surface` within the document, e.g. after a relayout.
    pub fn relayout(&mut self, surface: SurfaceId, rect: SurfaceRect) {
        self.observer.set_rect(surface, rect);
        self.manager.set_surface_size(surface, rect.size());
    }

    /// Removes one surface while keeping the rest of the list.
    pub fn remove_surface(&mut self, surface: SurfaceId) {
        self.observer.unobserve(surface);
        self.manager.unregister(surface);
        self.surfaces.retain(|id| *id != surface);
    }

    pub fn activate(&mut self, surface: SurfaceId, now: Instant) -> Activation {
        self.manager.activate(surface, now)
    }

    pub fn deactivate(&mut self, surface: SurfaceId) -> bool {
        self.manager.deactivate(surface)
    }

    /// Disposes every card instance, disconnects the observer and stops the
    /// animation loop. Idempotent.
    pub fn teardown_all(&mut self) {
        self.driver.stop();
        self.observer.disconnect_all();
        self.manager.teardown_all();
    }

    pub fn set_background(&mut self, size: SurfaceSize, now: Instant) -> bool {
        self.manager.set_background(size, now)
    }

    /// Resize hook for the full-viewport instance.
    pub fn resize_background(&mut self, size: SurfaceSize) {
        self.manager.resize_background(size);
    }

    /// Handles one device signal right away.
    pub fn handle_signal(&mut self, signal: ContextSignal, now: Instant) {
        match signal {
            ContextSignal::Lost(context) => {
                self.manager.on_context_lost(context);
            }
            ContextSignal::Restored(context) => {
                let observer = &self.observer;
                let viewport = self.last_viewport;
                self.manager.on_context_restored(context, now, |surface| {
                    viewport.is_some_and(|viewport| observer.is_in_viewport(surface, &viewport))
                });
            }
        }
    }

    /// Runs one scheduling step against the current viewport.
    pub fn pump(&mut self, viewport: Viewport, now: Instant) -> PumpReport {
        let mut report = PumpReport::default();
        self.last_viewport = Some(viewport);

        while let Ok(signal) = self.signals.try_recv() {
            self.handle_signal(signal, now);
            report.signals += 1;
        }

        let observer = &self.observer;
        report.restores = self
            .manager
            .fire_due_restores(now, |surface| observer.is_entered(surface));

        for edge in self.observer.update(&viewport) {
            match edge {
                VisibilityEdge::Enter(surface) => {
                    report.entered += 1;
                    self.manager.activate(surface, now);
                }
                VisibilityEdge::Leave(surface) => {
                    report.left += 1;
                    self.manager.deactivate(surface);
                }
            }
        }

        self.manager.set_scroll(viewport.scroll_y);
        if self.driver.is_running() && self.pacer.should_render(now) {
            report.advanced = self.driver.tick(self.manager.pool_mut(), now);
            self.manager.advance_background(now);
            report.rendered = true;
        }
        report
    }
}
