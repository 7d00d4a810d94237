//! Edge-triggered visibility tracking for card surfaces.
//!
//! A surface is "entered" when its intersection with the viewport, grown by
//! the configured margin on every side, covers a non-zero fraction of the
//! surface that is at least the threshold. `update` only reports transitions,
//! so a surface that stays entered across many updates yields one event.

use crate::types::{SurfaceId, SurfaceRect, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityEdge {
    Enter(SurfaceId),
    Leave(SurfaceId),
}

impl VisibilityEdge {
    pub fn surface(self) -> SurfaceId {
        match self {
            VisibilityEdge::Enter(id) | VisibilityEdge::Leave(id) => id,
        }
    }
}

#[derive(Debug, Clone)]
struct Observed {
    id: SurfaceId,
    rect: SurfaceRect,
    entered: bool,
}

#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    margin: f32,
    threshold: f32,
    targets: Vec<Observed>,
}

impl VisibilityObserver {
    pub fn new(margin: f32, threshold: f32) -> Self {
        Self {
            margin: margin.max(0.0),
            threshold: threshold.clamp(0.0, 1.0),
            targets: Vec::new(),
        }
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Starts tracking `id`. Re-observing an id updates its rectangle and
    /// keeps its current state.
    pub fn observe(&mut self, id: SurfaceId, rect: SurfaceRect) {
        if let Some(target) = self.find_mut(id) {
            target.rect = rect;
            return;
        }
        self.targets.push(Observed {
            id,
            rect,
            entered: false,
        });
    }

    pub fn set_rect(&mut self, id: SurfaceId, rect: SurfaceRect) {
        if let Some(target) = self.find_mut(id) {
            target.rect = rect;
        }
    }

    pub fn rect(&self, id: SurfaceId) -> Option<SurfaceRect> {
        self.targets
            .iter()
            .find(|target| target.id == id)
            .map(|target| target.rect)
    }

    pub fn unobserve(&mut self, id: SurfaceId) {
        self.targets.retain(|target| target.id != id);
    }

    pub fn disconnect_all(&mut self) {
        self.targets.clear();
    }

    pub fn is_entered(&self, id: SurfaceId) -> bool {
        self.targets
            .iter()
            .any(|target| target.id == id && target.entered)
    }

    /// Whether `id` overlaps the raw viewport, without margin or threshold.
    pub fn is_in_viewport(&self, id: SurfaceId, viewport: &Viewport) -> bool {
        let view = viewport.rect();
        self.targets.iter().any(|target| {
            target.id == id
                && target.rect.top() < view.bottom()
                && target.rect.bottom() > view.top()
        })
    }

    /// Recomputes every target against `viewport` and returns the transitions
    /// in observation order.
    pub fn update(&mut self, viewport: &Viewport) -> Vec<VisibilityEdge> {
        let root = viewport.rect().expanded(self.margin);
        let threshold = self.threshold;
        let mut edges = Vec::new();
        for target in &mut self.targets {
            let area = target.rect.area();
            let ratio = if area > 0.0 {
                target.rect.intersection_area(&root) / area
            } else {
                0.0
            };
            let entered = ratio > 0.0 && ratio >= threshold;

            if entered != target.entered {
                target.entered = entered;
                edges.push(if entered {
                    VisibilityEdge::Enter(target.id)
                } else {
                    VisibilityEdge::Leave(target.id)
                });
            }
        }
        edges
    }

    fn find_mut(&mut self, id: SurfaceId) -> Option<&mut Observed> {
        self.targets.iter_mut().find(|target| target.id == id)
    }
}
