//! Spawner: which brick comes next and where it appears above the grid.

use crate::brick::{BrickColor, BrickShape, Footprint};
use crate::config::{LevelConfig, SpawnPolicy};
use crate::grid::VoxelGrid;

/// Small LCG; deterministic per seed so games replay.
#[derive(Debug, Clone)]
struct Lcg(u32);

impl Lcg {
    fn next_rand(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12345);
        self.0 >> 16
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_rand() as usize) % n.max(1)
    }
}

/// Bag of the level's shapes (random order, then refill).
#[derive(Debug, Clone)]
pub struct BrickBag {
    shapes: Vec<BrickShape>,
    queue: Vec<BrickShape>,
    rng: Lcg,
}

impl BrickBag {
    pub fn new(shapes: &[BrickShape], seed: u32) -> Self {
        let mut b = Self {
            shapes: shapes.to_vec(),
            queue: Vec::with_capacity(shapes.len() * 2),
            rng: Lcg(seed),
        };
        b.refill();
        b
    }

    fn refill(&mut self) {
        let mut all = self.shapes.clone();
        // Fisher–Yates shuffle
        for i in (1..all.len()).rev() {
            let j = self.rng.below(i + 1);
            all.swap(i, j);
        }
        self.queue.extend(all);
    }

    pub fn next(&mut self) -> BrickShape {
        if self.queue.len() < 2 {
            self.refill();
        }
        if self.queue.is_empty() {
            return BrickShape::Cube;
        }
        self.queue.remove(0)
    }
}

#[derive(Debug, Clone)]
pub struct Spawner {
    bag: BrickBag,
    colors: Vec<BrickColor>,
    policy: SpawnPolicy,
    rng: Lcg,
}

impl Spawner {
    pub fn new(level: &LevelConfig) -> Self {
        Self {
            bag: BrickBag::new(&level.shapes, level.seed),
            colors: level.colors.clone(),
            policy: level.spawn,
            rng: Lcg(level.seed.rotate_left(13) ^ 0x9E37_79B9),
        }
    }

    /// Next shape from the bag with a colour drawn from the level palette.
    pub fn next_brick(&mut self) -> (BrickShape, BrickColor) {
        let shape = self.bag.next();
        let color = if self.colors.is_empty() {
            BrickColor::Red
        } else {
            self.colors[self.rng.below(self.colors.len())]
        };
        (shape, color)
    }

    /// Anchor where `footprint` fits inside the grid, or `None` if it cannot fit at all.
    pub fn try_spawn(&mut self, grid: &VoxelGrid, footprint: Footprint) -> Option<(usize, usize)> {
        if footprint.width > grid.width() || footprint.depth > grid.depth() {
            return None;
        }
        let max_x = grid.width() - footprint.width;
        let max_y = grid.depth() - footprint.depth;
        let (x, y) = match self.policy {
            SpawnPolicy::Fixed { x, y } => (x.min(max_x), y.min(max_y)),
            SpawnPolicy::Random => (self.rng.below(max_x + 1), self.rng.below(max_y + 1)),
        };
        grid.is_valid_position(x as i32, y as i32, footprint)
            .then_some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_deals_every_shape_per_round() {
        let shapes = [BrickShape::Cube, BrickShape::Bar, BrickShape::Square];
        let mut bag = BrickBag::new(&shapes, 42);
        let mut dealt: Vec<_> = (0..3).map(|_| bag.next()).collect();
        dealt.sort_by_key(|s| s.name());
        let mut expected = shapes.to_vec();
        expected.sort_by_key(|s| s.name());
        assert_eq!(dealt, expected);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let level = LevelConfig::default();
        let mut a = Spawner::new(&level);
        let mut b = Spawner::new(&level);
        for _ in 0..20 {
            assert_eq!(a.next_brick(), b.next_brick());
        }
    }

    #[test]
    fn test_random_spawn_always_fits() {
        let level = LevelConfig {
            width: 5,
            depth: 3,
            ..LevelConfig::default()
        };
        let grid = VoxelGrid::new(5, 3, 10).unwrap();
        let mut spawner = Spawner::new(&level);
        for fp in [Footprint::new(3, 1), Footprint::new(2, 2), Footprint::new(5, 3)] {
            for _ in 0..50 {
                let (x, y) = spawner.try_spawn(&grid, fp).unwrap();
                assert!(grid.is_valid_position(x as i32, y as i32, fp));
            }
        }
        assert_eq!(spawner.try_spawn(&grid, Footprint::new(6, 1)), None);
    }

    #[test]
    fn test_fixed_spawn_shifts_inside() {
        let level = LevelConfig {
            spawn: SpawnPolicy::Fixed { x: 3, y: 1 },
            ..LevelConfig::default()
        };
        let grid = VoxelGrid::new(4, 4, 10).unwrap();
        let mut spawner = Spawner::new(&level);
        assert_eq!(spawner.try_spawn(&grid, Footprint::UNIT), Some((3, 1)));
        assert_eq!(spawner.try_spawn(&grid, Footprint::new(2, 2)), Some((2, 1)));
    }

    #[test]
    fn test_colours_from_palette() {
        let level = LevelConfig {
            colors: vec![BrickColor::Cyan, BrickColor::Magenta],
            ..LevelConfig::default()
        };
        let mut spawner = Spawner::new(&level);
        for _ in 0..30 {
            let (_, c) = spawner.next_brick();
            assert!(matches!(c, BrickColor::Cyan | BrickColor::Magenta));
        }
    }
}
