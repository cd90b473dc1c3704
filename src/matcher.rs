//! Layer completion: which layer (or line) is full and single-coloured.

use crate::brick::BrickColor;
use crate::grid::{GridPos, VoxelGrid};

/// Clearing ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// A whole layer, every cell occupied, one colour.
    #[default]
    FullLayer,
    /// Legacy ruleset: a single row or column of a layer.
    Lines,
}

/// A complete row (fixed y) or column (fixed x).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Row(usize),
    Column(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMatch {
    pub layer: usize,
    pub color: BrickColor,
    /// Set in [`MatchMode::Lines`]; `None` means the whole layer matched.
    pub line: Option<Line>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LayerMatcher {
    mode: MatchMode,
}

impl LayerMatcher {
    pub const fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Lowest matching layer, scanning upward from layer 0. Only one match per call.
    pub fn find_first(&self, grid: &VoxelGrid) -> Option<LayerMatch> {
        let top = grid.highest_layer()?;
        (0..=top).find_map(|layer| self.check_layer(grid, layer))
    }

    pub fn check_layer(&self, grid: &VoxelGrid, layer: usize) -> Option<LayerMatch> {
        match self.mode {
            MatchMode::FullLayer => full_layer_color(grid, layer).map(|color| LayerMatch {
                layer,
                color,
                line: None,
            }),
            MatchMode::Lines => first_line(grid, layer).map(|(line, color)| LayerMatch {
                layer,
                color,
                line: Some(line),
            }),
        }
    }

    /// Cells that seed the flood fill for a match: the whole layer, or exactly the line.
    pub fn seeds(grid: &VoxelGrid, m: &LayerMatch) -> Vec<GridPos> {
        match m.line {
            None => (0..grid.depth())
                .flat_map(|y| (0..grid.width()).map(move |x| GridPos::new(x, y, m.layer)))
                .collect(),
            Some(line) => line_cells(grid, m.layer, line).collect(),
        }
    }
}

/// Colour of a layer whose every cell is occupied by one colour.
pub fn full_layer_color(grid: &VoxelGrid, layer: usize) -> Option<BrickColor> {
    uniform_color(
        (0..grid.depth())
            .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
            .map(|(x, y)| grid.color_at(x, y, layer)),
    )
}

/// First complete line on a layer: rows (y ascending) before columns (x ascending).
pub fn first_line(grid: &VoxelGrid, layer: usize) -> Option<(Line, BrickColor)> {
    let rows = (0..grid.depth()).map(Line::Row);
    let columns = (0..grid.width()).map(Line::Column);
    rows.chain(columns).find_map(|line| {
        uniform_color(line_cells(grid, layer, line).map(|p| grid.color_at(p.x, p.y, p.layer)))
            .map(|color| (line, color))
    })
}

fn line_cells(grid: &VoxelGrid, layer: usize, line: Line) -> Box<dyn Iterator<Item = GridPos>> {
    match line {
        Line::Row(y) => Box::new((0..grid.width()).map(move |x| GridPos::new(x, y, layer))),
        Line::Column(x) => Box::new((0..grid.depth()).map(move |y| GridPos::new(x, y, layer))),
    }
}

/// `Some(colour)` if every cell is occupied and all share it; any empty cell fails.
fn uniform_color(mut cells: impl Iterator<Item = Option<BrickColor>>) -> Option<BrickColor> {
    let first = cells.next()??;
    for c in cells {
        if c != Some(first) {
            return None;
        }
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brick::{Brick, BrickId, Footprint};

    fn fill_layer(grid: &mut VoxelGrid, next_id: &mut u32, color: impl Fn(usize, usize) -> BrickColor) {
        for y in 0..grid.depth() {
            for x in 0..grid.width() {
                *next_id += 1;
                let b = Brick::new(BrickId(*next_id), Footprint::UNIT, color(x, y));
                grid.place(&b, x, y).unwrap();
            }
        }
    }

    #[test]
    fn test_full_layer_single_colour_matches() {
        let mut grid = VoxelGrid::new(4, 4, 10).unwrap();
        let mut id = 0;
        fill_layer(&mut grid, &mut id, |_, _| BrickColor::Red);
        let m = LayerMatcher::default().find_first(&grid).unwrap();
        assert_eq!(m.layer, 0);
        assert_eq!(m.color, BrickColor::Red);
        assert_eq!(m.line, None);
        assert_eq!(LayerMatcher::seeds(&grid, &m).len(), 16);
    }

    #[test]
    fn test_missing_cell_does_not_match() {
        let mut grid = VoxelGrid::new(3, 3, 10).unwrap();
        let mut id = 0;
        fill_layer(&mut grid, &mut id, |_, _| BrickColor::Blue);
        grid.remove(BrickId(5));
        assert_eq!(full_layer_color(&grid, 0), None);
        assert!(LayerMatcher::default().find_first(&grid).is_none());
    }

    #[test]
    fn test_two_colours_do_not_match() {
        let mut grid = VoxelGrid::new(3, 3, 10).unwrap();
        let mut id = 0;
        fill_layer(&mut grid, &mut id, |x, y| {
            if (x, y) == (2, 2) {
                BrickColor::Green
            } else {
                BrickColor::Blue
            }
        });
        assert_eq!(full_layer_color(&grid, 0), None);
    }

    #[test]
    fn test_empty_layer_never_matches() {
        let grid = VoxelGrid::new(2, 2, 4).unwrap();
        assert_eq!(full_layer_color(&grid, 0), None);
        assert!(LayerMatcher::default().find_first(&grid).is_none());
    }

    #[test]
    fn test_lowest_layer_wins() {
        let mut grid = VoxelGrid::new(2, 2, 10).unwrap();
        let mut id = 0;
        fill_layer(&mut grid, &mut id, |_, _| BrickColor::Yellow);
        fill_layer(&mut grid, &mut id, |_, _| BrickColor::Cyan);
        let m = LayerMatcher::default().find_first(&grid).unwrap();
        assert_eq!((m.layer, m.color), (0, BrickColor::Yellow));
    }

    #[test]
    fn test_large_bricks_fill_layer() {
        let mut grid = VoxelGrid::new(4, 2, 10).unwrap();
        let a = Brick::new(BrickId(1), Footprint::new(2, 2), BrickColor::Magenta);
        let b = Brick::new(BrickId(2), Footprint::new(2, 2), BrickColor::Magenta);
        grid.place(&a, 0, 0).unwrap();
        assert_eq!(full_layer_color(&grid, 0), None);
        grid.place(&b, 2, 0).unwrap();
        assert_eq!(full_layer_color(&grid, 0), Some(BrickColor::Magenta));
    }

    #[test]
    fn test_lines_prefers_rows_over_columns() {
        let mut grid = VoxelGrid::new(3, 3, 10).unwrap();
        // Column x=0 all red, row y=2 all green (corner (0,2) green breaks the column).
        let cells = [
            (0, 0, BrickColor::Red),
            (0, 1, BrickColor::Red),
            (1, 2, BrickColor::Green),
            (2, 2, BrickColor::Green),
            (0, 2, BrickColor::Green),
        ];
        for (i, (x, y, c)) in cells.into_iter().enumerate() {
            grid.place(&Brick::new(BrickId(i as u32), Footprint::UNIT, c), x, y)
                .unwrap();
        }
        let m = LayerMatcher::new(MatchMode::Lines).find_first(&grid).unwrap();
        assert_eq!(m.line, Some(Line::Row(2)));
        assert_eq!(m.color, BrickColor::Green);
        assert_eq!(
            LayerMatcher::seeds(&grid, &m),
            vec![GridPos::new(0, 2, 0), GridPos::new(1, 2, 0), GridPos::new(2, 2, 0)]
        );
    }

    #[test]
    fn test_lines_finds_column() {
        let mut grid = VoxelGrid::new(3, 2, 10).unwrap();
        let bar = Brick::new(BrickId(1), Footprint::new(1, 2), BrickColor::Blue);
        grid.place(&bar, 1, 0).unwrap();
        let m = LayerMatcher::new(MatchMode::Lines).find_first(&grid).unwrap();
        assert_eq!(m.line, Some(Line::Column(1)));
        // Full-layer ruleset ignores it.
        assert!(LayerMatcher::new(MatchMode::FullLayer).find_first(&grid).is_none());
    }
}
