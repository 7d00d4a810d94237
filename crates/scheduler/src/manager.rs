use std::collections::HashMap;
use std::time::{Duration, Instant};

use shaderlib::{select, ShaderLibrary, VariantParams};

use crate::pool::{InstanceKey, InstancePool};
use crate::settings::{SchedulerError, SchedulerSettings};
use crate::target::{InstanceFactory, InstanceRequest, RenderTarget};
use crate::types::{CardDescriptor, ContextId, SurfaceId, SurfaceSize};

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub created: u64,
    pub evicted: u64,
    pub disposed: u64,
    /// Shader compile errors and context acquisition failures.
    pub creation_failures: u64,
    pub contexts_lost: u64,
    pub contexts_restored: u64,
    pub restores_scheduled: u64,
    pub restores_fired: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Created(InstanceKey),
    AlreadyLive,
    Failed,
    UnknownSurface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestoreTarget {
    Surface(SurfaceId),
    Background,
}

#[derive(Debug, Clone, Copy)]
struct PendingRestore {
    target: RestoreTarget,
    due: Instant,
}

#[derive(Debug, Clone, Copy)]
struct SurfaceSlot {
    descriptor: CardDescriptor,
    size: SurfaceSize,
    /// Non-owning back-reference into the pool.
    instance: Option<InstanceKey>,
}

struct Background<T> {
    context: ContextId,
    target: T,
    active: bool,
}

/// Neutral parameters for the full-viewport instance.
const BACKGROUND_PARAMS: VariantParams = VariantParams {
    random_seed: 0.0,
    speed_multiplier: 1.0,
    color_shift: 0.0,
    intensity: 1.0,
};

/// Owns every card render instance and decides when they live and die.
///
/// The pool is authoritative: surfaces only hold an [`InstanceKey`] to route
/// events, and every disposal goes through the manager.
pub struct PoolManager<F: InstanceFactory> {
    library: ShaderLibrary,
    factory: F,
    max_active: usize,
    restore_delay: Duration,
    pool: InstancePool<F::Target>,
    surfaces: HashMap<SurfaceId, SurfaceSlot>,
    pending: Vec<PendingRestore>,
    background: Option<Background<F::Target>>,
    background_size: Option<SurfaceSize>,
    stats: PoolStats,
}

impl<F: InstanceFactory> PoolManager<F> {
    pub fn new(
        library: ShaderLibrary,
        factory: F,
        settings: &SchedulerSettings,
    ) -> Result<Self, SchedulerError> {
        settings.validate()?;
        Ok(Self {
            library,
            factory,
            max_active: settings.max_active,
            restore_delay: settings.restore_delay,
            pool: InstancePool::with_capacity(settings.max_active),
            surfaces: HashMap::new(),
            pending: Vec::new(),
            background: None,
            background_size: None,
            stats: PoolStats::default(),
        })
    }

    pub fn library(&self) -> &ShaderLibrary {
        &self.library
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn pool(&self) -> &InstancePool<F::Target> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut InstancePool<F::Target> {
        &mut self.pool
    }

    /// Number of instances currently held, active or not.
    pub fn live_count(&self) -> usize {
        self.pool.len()
    }

    pub fn is_live(&self, surface: SurfaceId) -> bool {
        self.instance_of(surface).is_some()
    }

    pub fn instance_of(&self, surface: SurfaceId) -> Option<InstanceKey> {
        self.surfaces.get(&surface).and_then(|slot| slot.instance)
    }

    pub fn pending_restores(&self) -> usize {
        self.pending.len()
    }

    pub fn register(&mut self, surface: SurfaceId, descriptor: CardDescriptor, size: SurfaceSize) {
        self.surfaces
            .entry(surface)
            .and_modify(|slot| {
                slot.descriptor = descriptor;
                slot.size = size;
            })
            .or_insert(SurfaceSlot {
                descriptor,
                size,
                instance: None,
            });
    }

    /// Records a new rendering area for `surface`; takes effect on the next
    /// instance created for it.
    pub fn set_surface_size(&mut self, surface: SurfaceId, size: SurfaceSize) {
        if let Some(slot) = self.surfaces.get_mut(&surface) {
            slot.size = size;
        }
    }

    /// Forgets `surface`, disposing its instance if it has one.
    pub fn unregister(&mut self, surface: SurfaceId) {
        self.deactivate(surface);
        self.surfaces.remove(&surface);
    }

    /// Ensures `surface` has a live instance, evicting the oldest active one
    /// when the pool is full.
    pub fn activate(&mut self, surface: SurfaceId, now: Instant) -> Activation {
        let Some(slot) = self.surfaces.get(&surface).copied() else {
            tracing::trace!(%surface, "activate for unknown surface ignored");
            return Activation::UnknownSurface;
        };

        if let Some(key) = slot.instance {
            match self.pool.get(key).map(|entry| entry.active) {
                Some(true) => return Activation::AlreadyLive,
                Some(false) => {
                    tracing::debug!(%surface, "replacing instance whose context was lost");
                    self.retire(key);
                }
                None => self.clear_back_reference(surface, key),
            }
        }

        while self.pool.len() >= self.max_active {
            let Some(victim) = self.pool.oldest_active().or_else(|| self.pool.oldest()) else {
                break;
            };
            if let Some(entry) = self.pool.get(victim) {
                tracing::debug!(
                    evicted = %entry.surface,
                    incoming = %surface,
                    "pool full; evicting oldest instance"
                );
            }
            self.retire(victim);
            self.stats.evicted += 1;
        }

        let selection = select(&self.library, slot.descriptor.identity);
        let request = InstanceRequest {
            surface: Some(surface),
            variant: selection.variant,
            params: selection.params,
            size: slot.size,
            started_at: now,
        };

        match self.factory.create(request) {
            Ok(target) => {
                let context = target.context_id();
                let key = self.pool.push(surface, context, target);
                if let Some(slot) = self.surfaces.get_mut(&surface) {
                    slot.instance = Some(key);
                }
                self.pending
                    .retain(|pending| pending.target != RestoreTarget::Surface(surface));
                self.stats.created += 1;
                tracing::debug!(
                    %surface,
                    %context,
                    variant = selection.variant.name(),
                    live = self.pool.len(),
                    "render instance activated"
                );
                Activation::Created(key)
            }
            Err(err) => {
                self.stats.creation_failures += 1;
                tracing::warn!(
                    %surface,
                    variant = selection.variant.name(),
                    error = %format!("{err:#}"),
                    "render instance creation failed; card stays undecorated"
                );
                Activation::Failed
            }
        }
    }

    /// Disposes the instance of `surface`, if any. Returns whether one existed.
    pub fn deactivate(&mut self, surface: SurfaceId) -> bool {
        self.cancel_restore(RestoreTarget::Surface(surface));
        let Some(key) = self.instance_of(surface) else {
            return false;
        };
        self.retire(key);
        true
    }

    /// Marks the instance drawing through `context` inactive. It stays in the
    /// pool until it is replaced or removed.
    pub fn on_context_lost(&mut self, context: ContextId) -> bool {
        if let Some(background) = self.background.as_mut() {
            if background.context == context {
                background.active = false;
                background.target.mark_lost();
                self.stats.contexts_lost += 1;
                tracing::warn!(%context, "background render context lost");
                return true;
            }
        }

        let Some(entry) = self.pool.iter_mut().find(|entry| entry.context == context) else {
            tracing::trace!(%context, "context loss for unknown instance ignored");
            return false;
        };
        entry.active = false;
        entry.target.mark_lost();
        self.stats.contexts_lost += 1;
        tracing::warn!(%context, surface = %entry.surface, "render context lost");
        true
    }

    /// Drops the stale instance for `context` and, when its surface is still
    /// on screen, schedules a fresh one after the restore delay.
    pub fn on_context_restored(
        &mut self,
        context: ContextId,
        now: Instant,
        is_visible: impl FnOnce(SurfaceId) -> bool,
    ) -> bool {
        if self
            .background
            .as_ref()
            .is_some_and(|background| background.context == context)
        {
            self.stats.contexts_restored += 1;
            self.dispose_background();
            self.schedule_restore(RestoreTarget::Background, now);
            return true;
        }

        let Some((key, surface)) = self
            .pool
            .find_by_context(context)
            .map(|entry| (entry.key, entry.surface))
        else {
            tracing::trace!(%context, "context restore for unknown instance ignored");
            return false;
        };
        self.stats.contexts_restored += 1;
        self.retire(key);

        if is_visible(surface) {
            self.schedule_restore(RestoreTarget::Surface(surface), now);
            true
        } else {
            tracing::debug!(%surface, "context restored off screen; waiting for next enter");
            false
        }
    }

    /// Recreates instances whose restore delay has elapsed. `still_wanted`
    /// filters out surfaces that left the viewport in the meantime.
    pub fn fire_due_restores(
        &mut self,
        now: Instant,
        still_wanted: impl Fn(SurfaceId) -> bool,
    ) -> usize {
        if self.pending.iter().all(|pending| pending.due > now) {
            return 0;
        }

        let mut due = Vec::new();
        self.pending.retain(|pending| {
            if pending.due <= now {
                due.push(pending.target);
                false
            } else {
                true
            }
        });

        let mut fired = 0;
        for target in due {
            match target {
                RestoreTarget::Surface(surface) => {
                    if !still_wanted(surface) {
                        continue;
                    }
                    if matches!(self.activate(surface, now), Activation::Created(_)) {
                        fired += 1;
                    }
                }
                RestoreTarget::Background => {
                    if let Some(size) = self.background_size {
                        if self.set_background(size, now) {
                            fired += 1;
                        }
                    }
                }
            }
        }
        self.stats.restores_fired += fired as u64;
        fired
    }

    /// Disposes every pooled instance and forgets all surfaces and timers.
    /// Safe to call repeatedly.
    pub fn teardown_all(&mut self) {
        let count = self.pool.len();
        for mut entry in self.pool.drain() {
            entry.target.dispose();
        }
        self.stats.disposed += count as u64;
        self.surfaces.clear();
        self.pending
            .retain(|pending| pending.target == RestoreTarget::Background);
        if count > 0 {
            tracing::debug!(disposed = count, "render pool torn down");
        }
    }

    /// Creates (or replaces) the full-viewport instance.
    pub fn set_background(&mut self, size: SurfaceSize, now: Instant) -> bool {
        self.dispose_background();
        self.background_size = Some(size);
        let request = InstanceRequest {
            surface: None,
            variant: self.library.background(),
            params: BACKGROUND_PARAMS,
            size,
            started_at: now,
        };
        match self.factory.create(request) {
            Ok(target) => {
                self.background = Some(Background {
                    context: target.context_id(),
                    target,
                    active: true,
                });
                self.stats.created += 1;
                true
            }
            Err(err) => {
                self.stats.creation_failures += 1;
                tracing::warn!(error = %format!("{err:#}"), "background instance creation failed");
                false
            }
        }
    }

    pub fn resize_background(&mut self, size: SurfaceSize) {
        self.background_size = Some(size);
        if let Some(background) = self.background.as_mut() {
            background.target.resize(size);
        }
    }

    pub fn set_scroll(&mut self, scroll: f32) {
        if let Some(background) = self.background.as_mut() {
            background.target.set_scroll(scroll);
        }
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Advances the background instance if it is active.
    pub fn advance_background(&mut self, now: Instant) -> bool {
        match self.background.as_mut() {
            Some(background) if background.active => {
                background.target.advance(now);
                true
            }
            _ => false,
        }
    }

    pub fn dispose_background(&mut self) {
        if let Some(mut background) = self.background.take() {
            background.target.dispose();
            self.stats.disposed += 1;
        }
    }

    fn retire(&mut self, key: InstanceKey) {
        if let Some(mut entry) = self.pool.remove(key) {
            entry.target.dispose();
            self.stats.disposed += 1;
            self.clear_back_reference(entry.surface, key);
        }
    }

    fn clear_back_reference(&mut self, surface: SurfaceId, key: InstanceKey) {
        if let Some(slot) = self.surfaces.get_mut(&surface) {
            if slot.instance == Some(key) {
                slot.instance = None;
            }
        }
    }

    fn schedule_restore(&mut self, target: RestoreTarget, now: Instant) {
        if self.pending.iter().any(|pending| pending.target == target) {
            return;
        }
        self.pending.push(PendingRestore {
            target,
            due: restore_due(now, self.restore_delay),
        });
        self.stats.restores_scheduled += 1;
        tracing::debug!(?target, delay = ?self.restore_delay, "instance recreation scheduled");
    }

    fn cancel_restore(&mut self, target: RestoreTarget) {
        self.pending.retain(|pending| pending.target != target);
    }
}

/// Due time for a restore. A delay that overflows the clock fires on the
/// next pump instead.
fn restore_due(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay).unwrap_or_else(|| {
        tracing::warn!(?delay, "restore delay overflows the clock; restoring immediately");
        now
    })
}

impl<F: InstanceFactory> Drop for PoolManager<F> {
    fn drop(&mut self) {
        self.teardown_all();
        self.dispose_background();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::AnimationDriver;
    use crate::testing::{card, library, settings, Event, FakeFactory};
    use rand::prelude::*;
    use shaderlib::CardIdentity;

    const A: SurfaceId = SurfaceId(1);
    const B: SurfaceId = SurfaceId(2);
    const C: SurfaceId = SurfaceId(3);
    const D: SurfaceId = SurfaceId(4);

    fn manager(max_active: usize) -> PoolManager<FakeFactory> {
        let mut manager =
            PoolManager::new(library(), FakeFactory::new(), &settings(max_active)).unwrap();
        for (index, surface) in [A, B, C, D].into_iter().enumerate() {
            manager.register(surface, card(index as i64 + 1, 1), SurfaceSize::new(300, 200));
        }
        manager
    }

    fn context_of(manager: &PoolManager<FakeFactory>, surface: SurfaceId) -> ContextId {
        let key = manager.instance_of(surface).unwrap();
        manager.pool().get(key).unwrap().context
    }

    fn pool_surfaces(manager: &PoolManager<FakeFactory>) -> Vec<SurfaceId> {
        manager.pool().surfaces().collect()
    }

    #[test]
    fn zero_capacity_is_a_configuration_error() {
        let result = PoolManager::new(library(), FakeFactory::new(), &settings(0));
        assert!(matches!(result, Err(SchedulerError::ZeroCapacity)));
    }

    #[test]
    fn third_enter_evicts_first_with_capacity_two() {
        let mut manager = manager(2);
        let now = Instant::now();
        manager.activate(A, now);
        let a_context = context_of(&manager, A);
        manager.activate(B, now);
        manager.activate(C, now);

        assert_eq!(pool_surfaces(&manager), [B, C]);
        assert!(!manager.is_live(A));
        assert_eq!(manager.factory().disposed(), [a_context]);
        assert_eq!(manager.stats().evicted, 1);
    }

    #[test]
    fn eviction_ignores_visibility_recency() {
        let mut manager = manager(3);
        let now = Instant::now();
        manager.activate(A, now);
        manager.activate(B, now);
        manager.activate(C, now);

        // A entering again does not refresh its position.
        assert_eq!(manager.activate(A, now), Activation::AlreadyLive);
        manager.activate(D, now);

        assert_eq!(pool_surfaces(&manager), [B, C, D]);
    }

    #[test]
    fn reentering_creates_an_independent_instance() {
        let mut manager = PoolManager::new(library(), FakeFactory::new(), &settings(4)).unwrap();
        manager.register(A, card(3, 1), SurfaceSize::new(300, 200));
        let now = Instant::now();

        let Activation::Created(first) = manager.activate(A, now) else {
            panic!("expected a new instance");
        };
        let first_context = context_of(&manager, A);
        let first_params = manager.pool().get(first).unwrap().target.params;
        assert!(manager.deactivate(A));
        assert!(!manager.is_live(A));

        let Activation::Created(second) = manager.activate(A, now) else {
            panic!("expected a new instance");
        };
        assert_ne!(first, second);
        assert_ne!(first_context, context_of(&manager, A));

        let expected = shaderlib::select(manager.library(), CardIdentity::new(3, 1));
        let second_params = manager.pool().get(second).unwrap().target.params;
        assert_eq!(first_params, expected.params);
        assert_eq!(second_params, expected.params);
        assert!(manager.factory().events().contains(&Event::Created {
            context: context_of(&manager, A),
            surface: Some(A),
            variant: "psychedelicWaves".into(),
        }));
    }

    #[test]
    fn lost_instance_is_skipped_then_replaced_after_restore() {
        let mut manager = manager(4);
        let mut driver = AnimationDriver::new();
        driver.start();
        let now = Instant::now();
        manager.activate(A, now);
        manager.activate(B, now);
        let a_context = context_of(&manager, A);
        let b_context = context_of(&manager, B);

        assert!(manager.on_context_lost(b_context));
        assert!(manager.is_live(B));
        manager.factory().clear();
        assert_eq!(driver.tick(manager.pool_mut(), now), 1);
        assert_eq!(manager.factory().advanced(), [a_context]);

        assert!(manager.on_context_restored(b_context, now, |_| true));
        assert!(!manager.is_live(B));
        assert_eq!(manager.pending_restores(), 1);

        assert_eq!(
            manager.fire_due_restores(now + Duration::from_millis(50), |_| true),
            0
        );
        assert_eq!(
            manager.fire_due_restores(now + Duration::from_millis(100), |_| true),
            1
        );
        assert!(manager.is_live(B));
        assert_ne!(context_of(&manager, B), b_context);
        assert_eq!(manager.pending_restores(), 0);
    }

    #[test]
    fn restore_off_screen_waits_for_next_enter() {
        let mut manager = manager(4);
        let now = Instant::now();
        manager.activate(B, now);
        let b_context = context_of(&manager, B);
        manager.on_context_lost(b_context);

        assert!(!manager.on_context_restored(b_context, now, |_| false));
        assert!(!manager.is_live(B));
        assert_eq!(manager.pending_restores(), 0);
        assert!(matches!(manager.activate(B, now), Activation::Created(_)));
    }

    #[test]
    fn restore_is_dropped_when_surface_left_meanwhile() {
        let mut manager = manager(4);
        let now = Instant::now();
        manager.activate(B, now);
        let b_context = context_of(&manager, B);
        manager.on_context_lost(b_context);
        manager.on_context_restored(b_context, now, |_| true);

        assert_eq!(
            manager.fire_due_restores(now + Duration::from_secs(1), |_| false),
            0
        );
        assert!(!manager.is_live(B));
    }

    #[test]
    fn entering_a_lost_surface_rebuilds_it() {
        let mut manager = manager(4);
        let now = Instant::now();
        manager.activate(A, now);
        let stale = context_of(&manager, A);
        manager.on_context_lost(stale);

        assert!(matches!(manager.activate(A, now), Activation::Created(_)));
        assert_ne!(context_of(&manager, A), stale);
        assert!(manager.factory().disposed().contains(&stale));
        assert_eq!(manager.live_count(), 1);
    }

    #[test]
    fn full_pool_of_lost_instances_still_respects_capacity() {
        let mut manager = manager(2);
        let now = Instant::now();
        manager.activate(A, now);
        manager.activate(B, now);
        let a_context = context_of(&manager, A);
        let b_context = context_of(&manager, B);
        manager.on_context_lost(a_context);
        manager.on_context_lost(b_context);

        manager.activate(C, now);
        assert_eq!(pool_surfaces(&manager), [B, C]);
        assert_eq!(manager.pool().active_count(), 1);
    }

    #[test]
    fn compile_failure_leaves_surface_bare_without_retry() {
        let mut manager = manager(4);
        manager.factory_mut().failing.insert(A);
        let now = Instant::now();

        assert_eq!(manager.activate(A, now), Activation::Failed);
        assert!(!manager.is_live(A));
        assert_eq!(manager.factory().attempts, 1);
        assert_eq!(manager.stats().creation_failures, 1);

        assert!(matches!(manager.activate(B, now), Activation::Created(_)));
        assert_eq!(manager.live_count(), 1);

        manager.factory_mut().failing.clear();
        assert!(matches!(manager.activate(A, now), Activation::Created(_)));
    }

    #[test]
    fn oversized_restore_delay_is_rejected_up_front() {
        let settings = SchedulerSettings {
            restore_delay: Duration::from_secs(i64::MAX as u64),
            ..settings(4)
        };
        assert!(matches!(
            PoolManager::new(library(), FakeFactory::new(), &settings),
            Err(SchedulerError::RestoreDelayTooLong(_))
        ));
    }

    #[test]
    fn overflowing_restore_delay_fires_immediately() {
        let now = Instant::now();
        assert_eq!(restore_due(now, Duration::MAX), now);
        assert_eq!(
            restore_due(now, Duration::from_millis(100)),
            now + Duration::from_millis(100)
        );
    }

    #[test]
    fn teardown_disposes_everything_and_is_repeatable() {
        let mut manager = manager(3);
        let now = Instant::now();
        for surface in [A, B, C] {
            manager.activate(surface, now);
        }
        let b_context = context_of(&manager, B);
        manager.on_context_lost(b_context);
        manager.on_context_restored(b_context, now, |_| true);

        manager.teardown_all();
        assert_eq!(manager.live_count(), 0);
        assert_eq!(manager.pool().active_count(), 0);
        assert_eq!(manager.pending_restores(), 0);
        assert_eq!(manager.factory().disposed().len(), 3);

        manager.teardown_all();
        assert_eq!(manager.factory().disposed().len(), 3);
        assert_eq!(manager.activate(A, now), Activation::UnknownSurface);
    }

    #[test]
    fn events_for_unknown_ids_are_ignored() {
        let mut manager = manager(2);
        let now = Instant::now();
        assert_eq!(
            manager.activate(SurfaceId(99), now),
            Activation::UnknownSurface
        );
        assert!(!manager.deactivate(SurfaceId(99)));
        assert!(!manager.on_context_lost(ContextId(99)));
        assert!(!manager.on_context_restored(ContextId(99), now, |_| true));
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn unregister_disposes_live_instance() {
        let mut manager = manager(2);
        let now = Instant::now();
        manager.activate(A, now);
        let context = context_of(&manager, A);
        manager.unregister(A);
        assert_eq!(manager.factory().disposed(), [context]);
        assert_eq!(manager.activate(A, now), Activation::UnknownSurface);
    }

    #[test]
    fn background_resizes_and_recovers() {
        let mut manager = manager(2);
        let now = Instant::now();
        assert!(manager.set_background(SurfaceSize::new(800, 600), now));
        let background_context = match manager.factory().events().first() {
            Some(Event::Created {
                context,
                surface: None,
                variant,
            }) if variant == "twilightTunnel" => *context,
            other => panic!("unexpected events {other:?}"),
        };

        manager.resize_background(SurfaceSize::new(1024, 768));
        assert!(manager.factory().events().contains(&Event::Resized(
            background_context,
            SurfaceSize::new(1024, 768)
        )));

        assert!(manager.on_context_lost(background_context));
        assert!(!manager.advance_background(now));
        assert!(manager.on_context_restored(background_context, now, |_| false));
        assert!(!manager.has_background());
        assert_eq!(
            manager.fire_due_restores(now + Duration::from_millis(100), |_| false),
            1
        );
        assert!(manager.has_background());
        assert!(manager.advance_background(now));
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn random_event_streams_never_exceed_capacity() {
        const MAX: usize = 5;
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut manager = PoolManager::new(library(), FakeFactory::new(), &settings(MAX)).unwrap();
        let surfaces: Vec<SurfaceId> = (0..30).map(SurfaceId).collect();
        for surface in &surfaces {
            manager.register(*surface, card(surface.0 as i64, 2), SurfaceSize::new(300, 200));
        }

        let start = Instant::now();
        for step in 0..5_000u64 {
            let now = start + Duration::from_millis(step * 16);
            let surface = surfaces[rng.gen_range(0..surfaces.len())];
            match rng.gen_range(0..10) {
                0..=4 => {
                    manager.activate(surface, now);
                }
                5..=6 => {
                    manager.deactivate(surface);
                }
                7 => {
                    if let Some(key) = manager.instance_of(surface) {
                        let context = manager.pool().get(key).unwrap().context;
                        manager.on_context_lost(context);
                    }
                }
                8 => {
                    if let Some(key) = manager.instance_of(surface) {
                        let context = manager.pool().get(key).unwrap().context;
                        let visible = rng.gen_bool(0.5);
                        manager.on_context_restored(context, now, |_| visible);
                    }
                }
                _ => {
                    manager.fire_due_restores(now, |_| true);
                }
            }

            assert!(manager.live_count() <= MAX, "step {step}");
            let mut seen = std::collections::HashSet::new();
            for entry in manager.pool().iter() {
                assert!(seen.insert(entry.surface), "duplicate instance at step {step}");
                assert_eq!(manager.instance_of(entry.surface), Some(entry.key));
            }
        }

        manager.teardown_all();
        let stats = manager.stats();
        assert_eq!(stats.created, stats.disposed);
    }
}
