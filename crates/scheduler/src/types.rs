use std::fmt;

use shaderlib::CardIdentity;

/// Opaque handle for one card surface. Ids are never reused, so events that
/// arrive for a surface from a previous list rebuild simply miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Identity of one rendering context, as reported by device signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSignal {
    Lost(ContextId),
    Restored(ContextId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in document pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grows the rectangle by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    pub fn intersection_area(&self, other: &SurfaceRect) -> f32 {
        let width = self.right().min(other.right()) - self.left().max(other.left());
        let height = self.bottom().min(other.bottom()) - self.top().max(other.top());
        if width <= 0.0 || height <= 0.0 {
            0.0
        } else {
            width * height
        }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(
            self.width.max(1.0).round() as u32,
            self.height.max(1.0).round() as u32,
        )
    }
}

/// The visible window onto the document: scroll offset plus extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(scroll_y: f32, width: f32, height: f32) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y,
            width,
            height,
        }
    }

    pub fn rect(&self) -> SurfaceRect {
        SurfaceRect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }

    pub fn size(&self) -> SurfaceSize {
        self.rect().size()
    }
}

/// A card as handed over by the list renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardDescriptor {
    pub identity: CardIdentity,
    pub size_hint: SurfaceSize,
}

impl CardDescriptor {
    pub const fn new(id_overall: i64, id_group: i64, size_hint: SurfaceSize) -> Self {
        Self {
            identity: CardIdentity::new(id_overall, id_group),
            size_hint,
        }
    }
}

/// A card descriptor together with where the layout put it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCard {
    pub descriptor: CardDescriptor,
    pub rect: SurfaceRect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_disjoint_rects_is_zero() {
        let a = SurfaceRect::new(0.0, 0.0, 10.0, 10.0);
        let b = SurfaceRect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&b), 0.0);
    }

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = SurfaceRect::new(0.0, 0.0, 10.0, 10.0);
        let b = SurfaceRect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&b), 25.0);
    }

    #[test]
    fn expansion_grows_every_side() {
        let rect = SurfaceRect::new(100.0, 100.0, 300.0, 200.0).expanded(100.0);
        assert_eq!(rect, SurfaceRect::new(0.0, 0.0, 500.0, 400.0));
    }
}
