//! Board: the orchestrator around the grid. Lands bricks, runs one clear cycle at a
//! time (match, flood, remove, collapse) and queues events for the front-end.

use crate::brick::{Brick, BrickColor, BrickId, BrickShape, Footprint};
use crate::collapse::{self, Fall};
use crate::config::LevelConfig;
use crate::error::{ConfigError, GridError};
use crate::flood;
use crate::grid::{GridPos, VoxelGrid};
use crate::matcher::{LayerMatcher, Line};

/// Discrete notifications for effects, audio and animation. The board never waits
/// on whoever consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    BrickPlaced {
        brick: BrickId,
        anchor: GridPos,
        color: BrickColor,
    },
    LayerCleared {
        layer: usize,
        color: BrickColor,
        line: Option<Line>,
        bricks: Vec<BrickId>,
        cells: Vec<GridPos>,
    },
    BrickFell(Fall),
    CollapseComplete {
        moved: usize,
    },
    StackOverflow {
        required_layer: usize,
    },
}

/// Result of landing a brick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Placed { layer: usize },
    /// The stack is too tall for this footprint; nothing was placed.
    Overflow { required_layer: usize },
}

/// What one clear cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearReport {
    pub layer: usize,
    pub color: BrickColor,
    pub line: Option<Line>,
    pub destroyed: Vec<BrickId>,
    pub cells_cleared: usize,
    pub falls: Vec<Fall>,
}

#[derive(Debug, Clone)]
pub struct Board {
    grid: VoxelGrid,
    matcher: LayerMatcher,
    next_id: u32,
    events: Vec<BoardEvent>,
}

impl Board {
    pub fn new(level: &LevelConfig) -> Result<Self, ConfigError> {
        level.validate()?;
        Ok(Self {
            grid: VoxelGrid::new(level.width, level.depth, level.max_layers)?,
            matcher: LayerMatcher::new(level.ruleset),
            next_id: 0,
            events: Vec::new(),
        })
    }

    /// New level: the grid is rebuilt for the new dimensions.
    pub fn reset(&mut self, level: &LevelConfig) -> Result<(), ConfigError> {
        level.validate()?;
        self.grid.resize(level.width, level.depth, level.max_layers)?;
        self.matcher = LayerMatcher::new(level.ruleset);
        self.events.clear();
        Ok(())
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn matcher(&self) -> &LayerMatcher {
        &self.matcher
    }

    /// Mint a brick record with a fresh id.
    pub fn new_brick(&mut self, shape: BrickShape, rotation: u8, color: BrickColor) -> Brick {
        self.next_id = self.next_id.wrapping_add(1);
        Brick::new(BrickId(self.next_id), shape.footprint(rotation), color)
    }

    pub fn is_valid_position(&self, x: i32, y: i32, footprint: Footprint) -> bool {
        self.grid.is_valid_position(x, y, footprint)
    }

    /// Layer a footprint at (x, y) would come to rest on (may exceed the cap).
    pub fn resting_layer(&self, x: usize, y: usize, footprint: Footprint) -> usize {
        self.grid.required_height(x, y, footprint)
    }

    pub fn land(&mut self, brick: &Brick, x: usize, y: usize) -> Result<Landing, GridError> {
        match self.grid.place(brick, x, y) {
            Ok(layer) => {
                log::debug!(
                    "brick {} ({} {}) placed at ({x}, {y}, {layer})",
                    brick.id,
                    brick.footprint,
                    brick.color
                );
                self.events.push(BoardEvent::BrickPlaced {
                    brick: brick.id,
                    anchor: GridPos::new(x, y, layer),
                    color: brick.color,
                });
                Ok(Landing::Placed { layer })
            }
            Err(GridError::LayerOverflow { layer, max_layers }) => {
                log::warn!("stack overflow: brick {} needs layer {layer} of {max_layers}", brick.id);
                self.events.push(BoardEvent::StackOverflow {
                    required_layer: layer,
                });
                Ok(Landing::Overflow {
                    required_layer: layer,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// One check cycle. Clears at most one matched layer (plus everything flooded
    /// from it) and settles the rest. Call again for the next match.
    pub fn resolve_clear(&mut self) -> Result<Option<ClearReport>, GridError> {
        let Some(m) = self.matcher.find_first(&self.grid) else {
            return Ok(None);
        };
        let seeds = LayerMatcher::seeds(&self.grid, &m);
        let set = flood::connected_component(&self.grid, &seeds, m.color);
        let Some(lowest) = set.lowest_layer() else {
            return Ok(None);
        };
        log::info!(
            "layer {} cleared ({}): {} bricks, {} cells",
            m.layer,
            m.color,
            set.bricks.len(),
            set.cells.len()
        );
        self.events.push(BoardEvent::LayerCleared {
            layer: m.layer,
            color: m.color,
            line: m.line,
            bricks: set.bricks.clone(),
            cells: set.cells.clone(),
        });

        for &id in &set.bricks {
            self.grid.remove(id);
            self.grid.forget(id);
        }

        let falls = collapse::collapse(&mut self.grid, lowest)?;
        self.events
            .extend(falls.iter().copied().map(BoardEvent::BrickFell));
        self.events.push(BoardEvent::CollapseComplete { moved: falls.len() });

        Ok(Some(ClearReport {
            layer: m.layer,
            color: m.color,
            line: m.line,
            destroyed: set.bricks,
            cells_cleared: set.cells.len(),
            falls,
        }))
    }

    /// Run cycles until nothing matches. Returns every report in order.
    pub fn resolve_all(&mut self) -> Result<Vec<ClearReport>, GridError> {
        let mut reports = Vec::new();
        while let Some(report) = self.resolve_clear()? {
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }
}
