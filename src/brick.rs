//! Bricks: colour palette, shapes, footprints and the record the grid stores.

use std::fmt;

/// Fixed brick palette. Index order matches the theme's brick colour slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BrickColor {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

impl BrickColor {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Magenta,
        Self::Cyan,
    ];

    /// Colour slot 0..6 for theme lookup.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
        }
    }

    /// First `n` palette entries (clamped to 1..=6).
    pub fn palette(n: usize) -> Vec<Self> {
        Self::ALL[..n.clamp(1, Self::ALL.len())].to_vec()
    }
}

impl fmt::Display for BrickColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rectangular cell span of a brick at one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint {
    pub width: usize,
    pub depth: usize,
}

impl Footprint {
    pub const UNIT: Self = Self { width: 1, depth: 1 };

    pub const fn new(width: usize, depth: usize) -> Self {
        Self { width, depth }
    }

    /// Quarter turn: width and depth swap.
    pub const fn rotated(self) -> Self {
        Self {
            width: self.depth,
            depth: self.width,
        }
    }

    pub const fn area(self) -> usize {
        self.width * self.depth
    }

    /// Every (x, y) column covered when anchored at (x, y).
    pub fn columns(self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        (y..y + self.depth).flat_map(move |cy| (x..x + self.width).map(move |cx| (cx, cy)))
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.depth)
    }
}

/// Brick shapes a level can deal. All are axis-aligned boxes one layer tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrickShape {
    Cube,
    Domino,
    Bar,
    Square,
    Slab,
    Long,
}

impl BrickShape {
    pub const ALL: [Self; 6] = [
        Self::Cube,
        Self::Domino,
        Self::Bar,
        Self::Square,
        Self::Slab,
        Self::Long,
    ];

    /// Footprint in rotation 0.
    pub const fn base(self) -> Footprint {
        match self {
            Self::Cube => Footprint::new(1, 1),
            Self::Domino => Footprint::new(2, 1),
            Self::Bar => Footprint::new(3, 1),
            Self::Square => Footprint::new(2, 2),
            Self::Slab => Footprint::new(3, 2),
            Self::Long => Footprint::new(4, 1),
        }
    }

    /// Footprint for a rotation in quarter turns (0..4).
    pub const fn footprint(self, rotation: u8) -> Footprint {
        if rotation % 2 == 1 {
            self.base().rotated()
        } else {
            self.base()
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Domino => "domino",
            Self::Bar => "bar",
            Self::Square => "square",
            Self::Slab => "slab",
            Self::Long => "long",
        }
    }

    /// True if some rotation fits a `width` x `depth` grid.
    pub fn fits(self, width: usize, depth: usize) -> bool {
        let f = self.base();
        (f.width <= width && f.depth <= depth) || (f.depth <= width && f.width <= depth)
    }
}

/// Stable brick identity; survives lifting and re-placing during collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrickId(pub u32);

impl fmt::Display for BrickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A landed brick as the grid sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brick {
    pub id: BrickId,
    pub footprint: Footprint,
    pub color: BrickColor,
}

impl Brick {
    pub const fn new(id: BrickId, footprint: Footprint, color: BrickColor) -> Self {
        Self {
            id,
            footprint,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_swaps_footprint() {
        assert_eq!(BrickShape::Slab.footprint(0), Footprint::new(3, 2));
        assert_eq!(BrickShape::Slab.footprint(1), Footprint::new(2, 3));
        assert_eq!(BrickShape::Slab.footprint(2), Footprint::new(3, 2));
        assert_eq!(BrickShape::Square.footprint(3), Footprint::new(2, 2));
    }

    #[test]
    fn test_columns_cover_rectangle() {
        let cols: Vec<_> = Footprint::new(2, 2).columns(1, 3).collect();
        assert_eq!(cols, vec![(1, 3), (2, 3), (1, 4), (2, 4)]);
    }

    #[test]
    fn test_shape_fits() {
        assert!(BrickShape::Long.fits(1, 4));
        assert!(!BrickShape::Long.fits(3, 3));
        assert!(BrickShape::Slab.fits(2, 3));
    }

    #[test]
    fn test_palette_clamped() {
        assert_eq!(BrickColor::palette(0), vec![BrickColor::Red]);
        assert_eq!(BrickColor::palette(3).len(), 3);
        assert_eq!(BrickColor::palette(99).len(), 6);
    }
}
