//! Connected-component search: grow a clear from the matched cells through every
//! same-coloured occupied cell reachable by face adjacency, across layers.

use crate::brick::{BrickColor, BrickId};
use crate::grid::{GridPos, VoxelGrid};
use std::collections::{HashSet, VecDeque};

/// Bricks (and their cells) destroyed by one clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearSet {
    pub color: BrickColor,
    /// Each brick once, in discovery order.
    pub bricks: Vec<BrickId>,
    /// Every visited cell, in BFS order.
    pub cells: Vec<GridPos>,
}

impl ClearSet {
    /// Lowest layer touched by the clear.
    pub fn lowest_layer(&self) -> Option<usize> {
        self.cells.iter().map(|p| p.layer).min()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }
}

/// The 6 face neighbours of a cell; off-grid neighbours on the low side are skipped,
/// off-grid ones on the high side come back empty from the grid queries.
fn neighbours(p: GridPos) -> impl Iterator<Item = GridPos> {
    let GridPos { x, y, layer } = p;
    [
        x.checked_sub(1).map(|x| GridPos::new(x, y, layer)),
        Some(GridPos::new(x + 1, y, layer)),
        y.checked_sub(1).map(|y| GridPos::new(x, y, layer)),
        Some(GridPos::new(x, y + 1, layer)),
        layer.checked_sub(1).map(|l| GridPos::new(x, y, l)),
        Some(GridPos::new(x, y, layer + 1)),
    ]
    .into_iter()
    .flatten()
}

/// Breadth-first search from `seeds` over occupied cells of `color`.
/// Seeds that are empty or a different colour are ignored.
pub fn connected_component(grid: &VoxelGrid, seeds: &[GridPos], color: BrickColor) -> ClearSet {
    let same = |p: GridPos| grid.color_at(p.x, p.y, p.layer) == Some(color);

    let mut visited: HashSet<GridPos> = HashSet::new();
    let mut queue: VecDeque<GridPos> = VecDeque::new();
    for &seed in seeds {
        if same(seed) && visited.insert(seed) {
            queue.push_back(seed);
        }
    }

    let mut seen_bricks = HashSet::new();
    let mut bricks = Vec::new();
    let mut cells = Vec::new();

    while let Some(p) = queue.pop_front() {
        if let Some(id) = grid.brick_at(p.x, p.y, p.layer) {
            if seen_bricks.insert(id) {
                bricks.push(id);
            }
        }
        cells.push(p);
        for n in neighbours(p) {
            if same(n) && visited.insert(n) {
                queue.push_back(n);
            }
        }
    }

    ClearSet {
        color,
        bricks,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brick::{Brick, Footprint};

    fn put(grid: &mut VoxelGrid, id: u32, w: usize, d: usize, color: BrickColor, x: usize, y: usize) {
        grid.place(&Brick::new(BrickId(id), Footprint::new(w, d), color), x, y)
            .unwrap();
    }

    fn layer_seeds(grid: &VoxelGrid, layer: usize) -> Vec<GridPos> {
        (0..grid.depth())
            .flat_map(|y| (0..grid.width()).map(move |x| GridPos::new(x, y, layer)))
            .collect()
    }

    #[test]
    fn test_whole_layer_of_unit_bricks() {
        let mut grid = VoxelGrid::new(4, 4, 10).unwrap();
        let mut id = 0;
        for y in 0..4 {
            for x in 0..4 {
                id += 1;
                put(&mut grid, id, 1, 1, BrickColor::Red, x, y);
            }
        }
        let set = connected_component(&grid, &layer_seeds(&grid, 0), BrickColor::Red);
        assert_eq!(set.bricks.len(), 16);
        assert_eq!(set.cells.len(), 16);
        assert_eq!(set.lowest_layer(), Some(0));
    }

    #[test]
    fn test_extends_vertically_through_same_colour() {
        let mut grid = VoxelGrid::new(2, 2, 10).unwrap();
        put(&mut grid, 1, 2, 2, BrickColor::Red, 0, 0); // layer 0
        put(&mut grid, 2, 1, 1, BrickColor::Red, 0, 0); // layer 1, red
        put(&mut grid, 3, 1, 1, BrickColor::Red, 0, 0); // layer 2, red
        put(&mut grid, 4, 1, 1, BrickColor::Blue, 1, 1); // layer 1, blue
        put(&mut grid, 5, 1, 1, BrickColor::Red, 1, 1); // layer 2, red but only touches blue below
        let set = connected_component(&grid, &layer_seeds(&grid, 0), BrickColor::Red);
        let mut ids = set.bricks.clone();
        ids.sort();
        assert_eq!(ids, vec![BrickId(1), BrickId(2), BrickId(3)]);
    }

    #[test]
    fn test_large_brick_listed_once() {
        let mut grid = VoxelGrid::new(3, 2, 10).unwrap();
        put(&mut grid, 1, 3, 2, BrickColor::Green, 0, 0);
        put(&mut grid, 2, 3, 1, BrickColor::Green, 0, 0);
        let set = connected_component(&grid, &layer_seeds(&grid, 0), BrickColor::Green);
        assert_eq!(set.bricks, vec![BrickId(1), BrickId(2)]);
        assert_eq!(set.cells.len(), 9);
    }

    #[test]
    fn test_lateral_same_colour_joins_from_line_seed() {
        let mut grid = VoxelGrid::new(3, 3, 10).unwrap();
        put(&mut grid, 1, 3, 1, BrickColor::Yellow, 0, 0); // row 0
        put(&mut grid, 2, 1, 1, BrickColor::Yellow, 2, 1); // touches row from the side
        put(&mut grid, 3, 1, 1, BrickColor::Yellow, 0, 2); // isolated
        let seeds: Vec<_> = (0..3).map(|x| GridPos::new(x, 0, 0)).collect();
        let set = connected_component(&grid, &seeds, BrickColor::Yellow);
        assert_eq!(set.bricks, vec![BrickId(1), BrickId(2)]);
    }

    #[test]
    fn test_wrong_colour_seeds_ignored() {
        let mut grid = VoxelGrid::new(2, 1, 4).unwrap();
        put(&mut grid, 1, 1, 1, BrickColor::Blue, 0, 0);
        let set = connected_component(&grid, &[GridPos::new(0, 0, 0)], BrickColor::Red);
        assert!(set.is_empty());
        assert_eq!(set.lowest_layer(), None);
    }
}
