use crate::geometry::Tile;
use glam::Vec3;

/// Index of the tile whose anchor is angularly closest to `forward`
/// (largest dot product). Exact ties resolve to the lowest tile index.
#[inline]
pub fn nearest_tile(tiles: &[Tile], forward: Vec3) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, tile) in tiles.iter().enumerate() {
        let d = tile.anchor.dot(forward);
        match best {
            Some((_, bd)) if d <= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Tracks the last item index reported to observers so that repeated
/// frames at rest never re-report the same item.
#[derive(Clone, Debug, Default)]
pub struct ActiveItemResolver {
    last_reported: Option<usize>,
}

impl ActiveItemResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_reported(&self) -> Option<usize> {
        self.last_reported
    }

    /// Resolve the nearest tile's item. Returns `Some(item_index)` only
    /// when it differs from the last reported one; the stored index is
    /// updated before returning.
    pub fn resolve(&mut self, tiles: &[Tile], forward: Vec3) -> Option<usize> {
        let tile = nearest_tile(tiles, forward)?;
        let item = tiles[tile].item_index;
        if self.last_reported == Some(item) {
            return None;
        }
        self.last_reported = Some(item);
        Some(item)
    }
}

// =============================================================================
// Tests
// =============================================================================
