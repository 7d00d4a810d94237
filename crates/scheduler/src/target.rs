use std::time::Instant;

use shaderlib::{ShaderVariant, VariantParams};

use crate::types::{ContextId, SurfaceId, SurfaceSize};

/// A live render instance as seen by the scheduler.
pub trait RenderTarget {
    /// Rendering context this instance draws through.
    fn context_id(&self) -> ContextId;

    /// Sets the time input from `now` and draws one frame.
    fn advance(&mut self, now: Instant);

    fn resize(&mut self, size: SurfaceSize);

    /// Releases GPU resources. Must tolerate repeated calls.
    fn dispose(&mut self);

    /// Called when the context backing this instance is reported lost.
    fn mark_lost(&mut self);

    /// Forwarded to full-viewport instances as the page scrolls.
    fn set_scroll(&mut self, _scroll: f32) {}
}

/// What the manager asks a factory to build.
#[derive(Debug, Clone, Copy)]
pub struct InstanceRequest<'a> {
    /// `None` for the full-viewport background instance.
    pub surface: Option<SurfaceId>,
    pub variant: &'a ShaderVariant,
    pub params: VariantParams,
    pub size: SurfaceSize,
    pub started_at: Instant,
}

/// Builds render instances. Construction failures (no context, shader does
/// not compile) are reported as errors and never panic.
pub trait InstanceFactory {
    type Target: RenderTarget;

    fn create(&mut self, request: InstanceRequest<'_>) -> anyhow::Result<Self::Target>;
}
