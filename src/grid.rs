//! Voxel grid: the single source of occupancy truth for every (x, y, layer) cell.
//!
//! Cells are stored layer-major in one flat vector. Each occupied cell records the
//! brick that covers it and that brick's colour; empty cells carry neither. A
//! reverse index maps brick ids to their placement, and a "last known" cache keeps
//! placements of lifted or removed bricks queryable until they are forgotten.

use crate::brick::{Brick, BrickColor, BrickId, Footprint};
use crate::error::GridError;
use std::collections::{HashMap, HashSet};

/// Hard cap on stack height; levels pick a limit at or below it.
pub const MAX_LAYERS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
    pub layer: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize, layer: usize) -> Self {
        Self { x, y, layer }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    brick: BrickId,
    color: BrickColor,
}

/// Where a brick sits: minimum-corner anchor plus the footprint and colour it was placed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub anchor: GridPos,
    pub footprint: Footprint,
    pub color: BrickColor,
}

impl Placement {
    pub fn brick(&self, id: BrickId) -> Brick {
        Brick::new(id, self.footprint, self.color)
    }

    /// Every cell the brick covers (all on the anchor layer).
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        let layer = self.anchor.layer;
        self.footprint
            .columns(self.anchor.x, self.anchor.y)
            .map(move |(x, y)| GridPos::new(x, y, layer))
    }

    /// True if the horizontal footprints of two placements share a column.
    pub fn overlaps_columns(&self, other: &Self) -> bool {
        let (a, b) = (self.anchor, other.anchor);
        a.x < b.x + other.footprint.width
            && b.x < a.x + self.footprint.width
            && a.y < b.y + other.footprint.depth
            && b.y < a.y + self.footprint.depth
    }
}

#[derive(Debug, Clone)]
pub struct VoxelGrid {
    width: usize,
    depth: usize,
    max_layers: usize,
    /// cells[(layer * depth + y) * width + x]
    cells: Vec<Option<Slot>>,
    placed: HashMap<BrickId, Placement>,
    last_known: HashMap<BrickId, Placement>,
    highest: Option<usize>,
}

impl VoxelGrid {
    pub fn new(width: usize, depth: usize, max_layers: usize) -> Result<Self, GridError> {
        if width == 0 || depth == 0 || max_layers == 0 || max_layers > MAX_LAYERS {
            return Err(GridError::InvalidDimensions {
                width,
                depth,
                max_layers,
            });
        }
        Ok(Self {
            width,
            depth,
            max_layers,
            cells: vec![None; width * depth * max_layers],
            placed: HashMap::new(),
            last_known: HashMap::new(),
            highest: None,
        })
    }

    /// Recreate the cell arrays for new dimensions. Every brick is dropped.
    pub fn resize(&mut self, width: usize, depth: usize, max_layers: usize) -> Result<(), GridError> {
        *self = Self::new(width, depth, max_layers)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.placed.clear();
        self.last_known.clear();
        self.highest = None;
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn max_layers(&self) -> usize {
        self.max_layers
    }

    /// Cells per layer.
    #[inline]
    pub fn layer_area(&self) -> usize {
        self.width * self.depth
    }

    #[inline]
    fn index(&self, x: usize, y: usize, layer: usize) -> Option<usize> {
        if x >= self.width || y >= self.depth || layer >= self.max_layers {
            return None;
        }
        Some((layer * self.depth + y) * self.width + x)
    }

    #[inline]
    fn slot(&self, x: usize, y: usize, layer: usize) -> Option<Slot> {
        self.index(x, y, layer).and_then(|i| self.cells[i])
    }

    /// Brick covering a cell; `None` when empty or out of range.
    #[inline]
    pub fn brick_at(&self, x: usize, y: usize, layer: usize) -> Option<BrickId> {
        self.slot(x, y, layer).map(|s| s.brick)
    }

    /// Colour of a cell; `None` when empty or out of range, so empty cells never match.
    #[inline]
    pub fn color_at(&self, x: usize, y: usize, layer: usize) -> Option<BrickColor> {
        self.slot(x, y, layer).map(|s| s.color)
    }

    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize, layer: usize) -> bool {
        self.slot(x, y, layer).is_some()
    }

    /// Bounds check only. Occupancy never blocks horizontally; it is resolved by resting height.
    pub fn is_valid_position(&self, x: i32, y: i32, footprint: Footprint) -> bool {
        if x < 0 || y < 0 || footprint.width == 0 || footprint.depth == 0 {
            return false;
        }
        x as usize + footprint.width <= self.width && y as usize + footprint.depth <= self.depth
    }

    /// Topmost occupied layer in one column.
    pub fn column_top(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.depth {
            return None;
        }
        let top = self.highest?;
        (0..=top).rev().find(|&layer| self.is_occupied(x, y, layer))
    }

    /// Layer a footprint anchored at (x, y) would rest on: one above the tallest
    /// column under it, or 0 on an empty floor. The result may be `>= max_layers`;
    /// callers decide what an overflow means.
    pub fn required_height(&self, x: usize, y: usize, footprint: Footprint) -> usize {
        footprint
            .columns(x, y)
            .filter_map(|(cx, cy)| self.column_top(cx, cy))
            .max()
            .map_or(0, |top| top + 1)
    }

    /// Drop a brick at (x, y): it rests at `required_height` and covers its whole
    /// footprint on that layer. Returns the layer. A brick that is already on the
    /// grid is lifted first. On overflow nothing changes.
    pub fn place(&mut self, brick: &Brick, x: usize, y: usize) -> Result<usize, GridError> {
        if !self.is_valid_position(x as i32, y as i32, brick.footprint) {
            return Err(GridError::OutOfBounds {
                x: x as i32,
                y: y as i32,
                width: brick.footprint.width,
                depth: brick.footprint.depth,
                grid_width: self.width,
                grid_depth: self.depth,
            });
        }
        let lifted = self.remove(brick.id);
        let layer = self.required_height(x, y, brick.footprint);
        if layer >= self.max_layers {
            if let Some(previous) = lifted {
                self.write(brick, previous.anchor);
            }
            return Err(GridError::LayerOverflow {
                layer,
                max_layers: self.max_layers,
            });
        }
        self.write(brick, GridPos::new(x, y, layer));
        Ok(layer)
    }

    fn write(&mut self, brick: &Brick, anchor: GridPos) {
        let slot = Slot {
            brick: brick.id,
            color: brick.color,
        };
        for (cx, cy) in brick.footprint.columns(anchor.x, anchor.y) {
            if let Some(i) = self.index(cx, cy, anchor.layer) {
                debug_assert!(self.cells[i].is_none(), "overlapping placement at ({cx}, {cy}, {})", anchor.layer);
                self.cells[i] = Some(slot);
            }
        }
        let placement = Placement {
            anchor,
            footprint: brick.footprint,
            color: brick.color,
        };
        self.placed.insert(brick.id, placement);
        self.last_known.insert(brick.id, placement);
        self.highest = Some(self.highest.map_or(anchor.layer, |h| h.max(anchor.layer)));
    }

    /// Take a brick off the grid. Its placement stays in the last-known cache until
    /// [`forget`](Self::forget). Removing a brick that is not on the grid is a no-op.
    pub fn remove(&mut self, id: BrickId) -> Option<Placement> {
        let placement = self.placed.remove(&id)?;
        for pos in placement.cells() {
            if let Some(i) = self.index(pos.x, pos.y, pos.layer) {
                if self.cells[i].is_some_and(|s| s.brick == id) {
                    self.cells[i] = None;
                }
            }
        }
        self.recalculate_highest();
        Some(placement)
    }

    /// Drop the cached placement of a brick that will not come back.
    pub fn forget(&mut self, id: BrickId) {
        if !self.placed.contains_key(&id) {
            self.last_known.remove(&id);
        }
    }

    /// Full top-down rescan from the previous highest layer.
    fn recalculate_highest(&mut self) {
        self.highest = self
            .highest
            .and_then(|top| (0..=top).rev().find(|&layer| !self.layer_is_empty(layer)));
    }

    pub fn layer_is_empty(&self, layer: usize) -> bool {
        if layer >= self.max_layers {
            return true;
        }
        let start = layer * self.layer_area();
        self.cells[start..start + self.layer_area()]
            .iter()
            .all(Option::is_none)
    }

    /// Number of occupied cells on a layer.
    pub fn layer_fill(&self, layer: usize) -> usize {
        if layer >= self.max_layers {
            return 0;
        }
        let start = layer * self.layer_area();
        self.cells[start..start + self.layer_area()]
            .iter()
            .filter(|c| c.is_some())
            .count()
    }

    /// Distinct bricks on `layer` or any layer above it, in ascending layer order.
    pub fn occupants_from_layer(&self, layer: usize) -> Vec<BrickId> {
        let Some(top) = self.highest else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for l in layer..=top {
            for y in 0..self.depth {
                for x in 0..self.width {
                    if let Some(id) = self.brick_at(x, y, l) {
                        if seen.insert(id) {
                            out.push(id);
                        }
                    }
                }
            }
        }
        out
    }

    /// Distinct bricks strictly above `layer`.
    pub fn occupants_above_layer(&self, layer: usize) -> Vec<BrickId> {
        self.occupants_from_layer(layer.saturating_add(1))
    }

    /// Live placement, else the last known one for a lifted or removed brick.
    pub fn placement_of(&self, id: BrickId) -> Option<Placement> {
        self.placed
            .get(&id)
            .or_else(|| self.last_known.get(&id))
            .copied()
    }

    pub fn footprint_of(&self, id: BrickId) -> Option<Footprint> {
        self.placement_of(id).map(|p| p.footprint)
    }

    pub fn color_of(&self, id: BrickId) -> Option<BrickColor> {
        self.placement_of(id).map(|p| p.color)
    }

    pub fn anchor_of(&self, id: BrickId) -> Option<GridPos> {
        self.placement_of(id).map(|p| p.anchor)
    }

    /// True if the brick currently occupies cells.
    pub fn contains(&self, id: BrickId) -> bool {
        self.placed.contains_key(&id)
    }

    pub fn highest_layer(&self) -> Option<usize> {
        self.highest
    }

    pub fn brick_count(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Live placements, unordered.
    pub fn placements(&self) -> impl Iterator<Item = (BrickId, Placement)> + '_ {
        self.placed.iter().map(|(id, p)| (*id, *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brick(id: u32, w: usize, d: usize, color: BrickColor) -> Brick {
        Brick::new(BrickId(id), Footprint::new(w, d), color)
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(VoxelGrid::new(0, 4, 10).is_err());
        assert!(VoxelGrid::new(4, 4, 0).is_err());
        assert!(VoxelGrid::new(4, 4, MAX_LAYERS + 1).is_err());
        assert!(VoxelGrid::new(4, 4, MAX_LAYERS).is_ok());
    }

    #[test]
    fn test_place_on_empty_floor() {
        let mut grid = VoxelGrid::new(4, 4, 10).unwrap();
        let b = brick(1, 2, 1, BrickColor::Red);
        assert_eq!(grid.place(&b, 1, 2).unwrap(), 0);
        assert_eq!(grid.brick_at(1, 2, 0), Some(BrickId(1)));
        assert_eq!(grid.brick_at(2, 2, 0), Some(BrickId(1)));
        assert_eq!(grid.color_at(2, 2, 0), Some(BrickColor::Red));
        assert_eq!(grid.brick_at(3, 2, 0), None);
        assert_eq!(grid.brick_at(1, 3, 0), None);
        assert_eq!(grid.highest_layer(), Some(0));
    }

    #[test]
    fn test_small_brick_stacks_on_large_one() {
        let mut grid = VoxelGrid::new(4, 4, 10).unwrap();
        grid.place(&brick(1, 2, 2, BrickColor::Red), 0, 0).unwrap();
        assert_eq!(grid.required_height(0, 0, Footprint::UNIT), 1);
        assert_eq!(grid.place(&brick(2, 1, 1, BrickColor::Blue), 0, 0).unwrap(), 1);
    }

    #[test]
    fn test_rests_on_tallest_column() {
        let mut grid = VoxelGrid::new(4, 4, 10).unwrap();
        grid.place(&brick(1, 1, 1, BrickColor::Red), 1, 0).unwrap();
        grid.place(&brick(2, 1, 1, BrickColor::Red), 1, 0).unwrap();
        // Column (0,0) is empty, column (1,0) is two high.
        assert_eq!(grid.required_height(0, 0, Footprint::new(2, 1)), 2);
        assert_eq!(grid.required_height(0, 0, Footprint::UNIT), 0);
    }

    #[test]
    fn test_out_of_range_queries_are_empty() {
        let grid = VoxelGrid::new(2, 2, 4).unwrap();
        assert_eq!(grid.brick_at(2, 0, 0), None);
        assert_eq!(grid.color_at(0, 5, 0), None);
        assert_eq!(grid.color_at(0, 0, 4), None);
        assert_eq!(grid.column_top(9, 9), None);
    }

    #[test]
    fn test_place_out_of_bounds_is_error() {
        let mut grid = VoxelGrid::new(3, 3, 4).unwrap();
        let err = grid.place(&brick(1, 2, 1, BrickColor::Red), 2, 0).unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { .. }));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_overflow_leaves_grid_untouched() {
        let mut grid = VoxelGrid::new(1, 1, 2).unwrap();
        grid.place(&brick(1, 1, 1, BrickColor::Red), 0, 0).unwrap();
        grid.place(&brick(2, 1, 1, BrickColor::Red), 0, 0).unwrap();
        let err = grid.place(&brick(3, 1, 1, BrickColor::Red), 0, 0).unwrap_err();
        assert_eq!(err, GridError::LayerOverflow { layer: 2, max_layers: 2 });
        assert_eq!(grid.brick_count(), 2);
        assert!(!grid.contains(BrickId(3)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut grid = VoxelGrid::new(3, 3, 4).unwrap();
        grid.place(&brick(1, 2, 2, BrickColor::Green), 0, 0).unwrap();
        grid.place(&brick(2, 1, 1, BrickColor::Blue), 2, 2).unwrap();
        assert!(grid.remove(BrickId(1)).is_some());
        assert!(grid.remove(BrickId(1)).is_none());
        assert_eq!(grid.brick_count(), 1);
        assert_eq!(grid.brick_at(0, 0, 0), None);
        assert_eq!(grid.brick_at(2, 2, 0), Some(BrickId(2)));
    }

    #[test]
    fn test_highest_layer_rescanned_on_remove() {
        let mut grid = VoxelGrid::new(2, 2, 10).unwrap();
        grid.place(&brick(1, 1, 1, BrickColor::Red), 0, 0).unwrap();
        grid.place(&brick(2, 1, 1, BrickColor::Red), 0, 0).unwrap();
        grid.place(&brick(3, 1, 1, BrickColor::Red), 0, 0).unwrap();
        assert_eq!(grid.highest_layer(), Some(2));
        grid.remove(BrickId(3));
        assert_eq!(grid.highest_layer(), Some(1));
        grid.remove(BrickId(1));
        // Layer 1 still holds brick 2 even though layer 0 is empty.
        assert_eq!(grid.highest_layer(), Some(1));
        grid.remove(BrickId(2));
        assert_eq!(grid.highest_layer(), None);
    }

    #[test]
    fn test_last_known_survives_remove_until_forget() {
        let mut grid = VoxelGrid::new(3, 3, 4).unwrap();
        grid.place(&brick(7, 1, 2, BrickColor::Cyan), 1, 1).unwrap();
        grid.remove(BrickId(7));
        assert!(!grid.contains(BrickId(7)));
        assert_eq!(grid.color_of(BrickId(7)), Some(BrickColor::Cyan));
        assert_eq!(grid.footprint_of(BrickId(7)), Some(Footprint::new(1, 2)));
        assert_eq!(grid.anchor_of(BrickId(7)), Some(GridPos::new(1, 1, 0)));
        grid.forget(BrickId(7));
        assert_eq!(grid.placement_of(BrickId(7)), None);
    }

    #[test]
    fn test_occupants_above_layer() {
        let mut grid = VoxelGrid::new(2, 2, 10).unwrap();
        grid.place(&brick(1, 2, 2, BrickColor::Red), 0, 0).unwrap();
        grid.place(&brick(2, 2, 1, BrickColor::Blue), 0, 0).unwrap();
        grid.place(&brick(3, 1, 1, BrickColor::Blue), 1, 1).unwrap();
        grid.place(&brick(4, 1, 1, BrickColor::Blue), 0, 0).unwrap();
        assert_eq!(grid.occupants_above_layer(0), vec![BrickId(2), BrickId(3), BrickId(4)]);
        assert_eq!(grid.occupants_above_layer(1), vec![BrickId(4)]);
        assert_eq!(grid.occupants_from_layer(0).len(), 4);
        assert!(grid.occupants_above_layer(5).is_empty());
        assert!(grid.occupants_above_layer(usize::MAX).is_empty());
    }

    #[test]
    fn test_is_valid_position_bounds_only() {
        let mut grid = VoxelGrid::new(4, 3, 4).unwrap();
        grid.place(&brick(1, 4, 3, BrickColor::Red), 0, 0).unwrap();
        assert!(grid.is_valid_position(0, 0, Footprint::new(4, 3)));
        assert!(grid.is_valid_position(2, 1, Footprint::new(2, 2)));
        assert!(!grid.is_valid_position(3, 0, Footprint::new(2, 1)));
        assert!(!grid.is_valid_position(-1, 0, Footprint::UNIT));
        assert!(!grid.is_valid_position(0, 0, Footprint::new(0, 1)));
    }

    #[test]
    fn test_resize_drops_everything() {
        let mut grid = VoxelGrid::new(2, 2, 4).unwrap();
        grid.place(&brick(1, 1, 1, BrickColor::Red), 0, 0).unwrap();
        grid.resize(5, 6, 7).unwrap();
        assert_eq!((grid.width(), grid.depth(), grid.max_layers()), (5, 6, 7));
        assert!(grid.is_empty());
        assert_eq!(grid.placement_of(BrickId(1)), None);
        assert_eq!(grid.highest_layer(), None);
    }

    #[test]
    fn test_overlaps_columns() {
        let a = Placement {
            anchor: GridPos::new(0, 0, 0),
            footprint: Footprint::new(2, 2),
            color: BrickColor::Red,
        };
        let b = Placement {
            anchor: GridPos::new(1, 1, 3),
            footprint: Footprint::UNIT,
            color: BrickColor::Red,
        };
        let c = Placement {
            anchor: GridPos::new(2, 0, 1),
            footprint: Footprint::UNIT,
            color: BrickColor::Red,
        };
        assert!(a.overlaps_columns(&b));
        assert!(!a.overlaps_columns(&c));
    }
}
