//! Recording fakes standing in for GPU-backed render instances.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

use shaderlib::{ShaderLibrary, VariantParams};

use crate::settings::SchedulerSettings;
use crate::target::{InstanceFactory, InstanceRequest, RenderTarget};
use crate::types::{CardDescriptor, ContextId, SurfaceId, SurfaceSize};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Created {
        context: ContextId,
        surface: Option<SurfaceId>,
        variant: String,
    },
    Advanced(ContextId),
    Resized(ContextId, SurfaceSize),
    Disposed(ContextId),
    Lost(ContextId),
}

pub(crate) type Log = Rc<RefCell<Vec<Event>>>;

#[derive(Debug)]
pub(crate) struct FakeTarget {
    context: ContextId,
    log: Log,
    disposed: bool,
    pub(crate) params: VariantParams,
}

impl RenderTarget for FakeTarget {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn advance(&mut self, _now: Instant) {
        self.log.borrow_mut().push(Event::Advanced(self.context));
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.log
            .borrow_mut()
            .push(Event::Resized(self.context, size));
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.log.borrow_mut().push(Event::Disposed(self.context));
        }
    }

    fn mark_lost(&mut self) {
        self.log.borrow_mut().push(Event::Lost(self.context));
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeFactory {
    pub(crate) log: Log,
    next_context: u64,
    pub(crate) failing: HashSet<SurfaceId>,
    pub(crate) attempts: usize,
}

impl FakeFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub(crate) fn disposed(&self) -> Vec<ContextId> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Disposed(context) => Some(*context),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn advanced(&self) -> Vec<ContextId> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Advanced(context) => Some(*context),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl InstanceFactory for FakeFactory {
    type Target = FakeTarget;

    fn create(&mut self, request: InstanceRequest<'_>) -> anyhow::Result<FakeTarget> {
        self.attempts += 1;
        if let Some(surface) = request.surface {
            if self.failing.contains(&surface) {
                anyhow::bail!("fragment shader failed to compile for {surface}");
            }
        }
        self.next_context += 1;
        let context = ContextId(self.next_context);
        self.log.borrow_mut().push(Event::Created {
            context,
            surface: request.surface,
            variant: request.variant.name().to_string(),
        });
        Ok(FakeTarget {
            context,
            log: Rc::clone(&self.log),
            disposed: false,
            params: request.params,
        })
    }
}

pub(crate) fn settings(max_active: usize) -> SchedulerSettings {
    SchedulerSettings {
        max_active,
        restore_delay: Duration::from_millis(100),
        margin: 100.0,
        threshold: 0.1,
        target_fps: None,
    }
}

pub(crate) fn library() -> ShaderLibrary {
    ShaderLibrary::builtin()
}

pub(crate) fn card(id_overall: i64, id_group: i64) -> CardDescriptor {
    CardDescriptor::new(id_overall, id_group, SurfaceSize::new(300, 200))
}
