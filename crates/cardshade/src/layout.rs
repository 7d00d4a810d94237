use scheduler::{CardDescriptor, PlacedCard, SurfaceRect, SurfaceSize};

use crate::cards::CardRecord;

const GAP: f32 = 20.0;
const PADDING: f32 = 20.0;

/// Auto-fill grid: as many fixed-size columns as fit the container width,
/// never fewer than one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub container_width: f32,
    pub card: SurfaceSize,
}

impl GridLayout {
    pub fn new(container_width: u32, card: SurfaceSize) -> Self {
        Self {
            container_width: container_width as f32,
            card,
        }
    }

    pub fn columns(&self) -> usize {
        let usable = (self.container_width - 2.0 * PADDING).max(0.0);
        let pitch = self.card.width as f32 + GAP;
        (((usable + GAP) / pitch).floor() as usize).max(1)
    }

    pub fn place(&self, cards: &[CardRecord]) -> Vec<PlacedCard> {
        let columns = self.columns();
        let width = self.card.width as f32;
        let height = self.card.height as f32;
        cards
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let column = index % columns;
                let row = index / columns;
                let identity = record.identity();
                PlacedCard {
                    descriptor: CardDescriptor::new(identity.overall, identity.group, self.card),
                    rect: SurfaceRect::new(
                        PADDING + column as f32 * (width + GAP),
                        PADDING + row as f32 * (height + GAP),
                        width,
                        height,
                    ),
                }
            })
            .collect()
    }

    /// Height of the whole document for `count` cards.
    pub fn document_height(&self, count: usize) -> f32 {
        if count == 0 {
            return 2.0 * PADDING;
        }
        let rows = count.div_ceil(self.columns());
        2.0 * PADDING + rows as f32 * self.card.height as f32 + (rows - 1) as f32 * GAP
    }
}
