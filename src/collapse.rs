//! Re-settling after a clear: every brick at or above the lowest cleared layer is
//! lifted, then dropped again bottom-up so higher bricks rest on already-settled
//! lower ones.

use crate::brick::BrickId;
use crate::error::GridError;
use crate::grid::{GridPos, VoxelGrid};

/// One brick moving down. The grid is already final when this is emitted; the
/// front-end only has to catch up visually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub brick: BrickId,
    pub from: GridPos,
    pub to_layer: usize,
}

impl Fall {
    pub const fn distance(&self) -> usize {
        self.from.layer - self.to_layer
    }
}

/// Settle everything from `lowest_removed_layer` upward. Returns one [`Fall`] per
/// brick whose layer changed, in settle order.
pub fn collapse(grid: &mut VoxelGrid, lowest_removed_layer: usize) -> Result<Vec<Fall>, GridError> {
    let mut fall_set: Vec<_> = grid
        .occupants_from_layer(lowest_removed_layer)
        .into_iter()
        .filter_map(|id| grid.placement_of(id).map(|p| (id, p)))
        .collect();
    if fall_set.is_empty() {
        return Ok(Vec::new());
    }
    // Stable: ties keep the scan order (y, then x).
    fall_set.sort_by_key(|(_, p)| p.anchor.layer);

    // Lift all first so no brick rests on a neighbour that is about to move.
    for (id, _) in &fall_set {
        grid.remove(*id);
    }

    let mut falls = Vec::new();
    for (id, placement) in fall_set {
        let from = placement.anchor;
        let layer = grid.place(&placement.brick(id), from.x, from.y)?;
        if layer != from.layer {
            log::debug!("brick {id} falls from layer {} to {layer}", from.layer);
            falls.push(Fall {
                brick: id,
                from,
                to_layer: layer,
            });
        }
    }
    Ok(falls)
}
