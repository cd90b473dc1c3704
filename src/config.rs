//! Level and game configuration handed to the core at level start.

use crate::brick::{BrickColor, BrickShape};
use crate::error::ConfigError;
use crate::grid::MAX_LAYERS;
use crate::matcher::MatchMode;

/// Where new bricks appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnPolicy {
    /// Uniform over every anchor where the footprint fits.
    #[default]
    Random,
    /// Always this anchor, shifted back inside the grid for wide footprints.
    Fixed { x: usize, y: usize },
}

/// Grid dimensions, brick set and ruleset for one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    pub width: usize,
    pub depth: usize,
    /// Stack height limit; landing above it is a loss.
    pub max_layers: usize,
    pub shapes: Vec<BrickShape>,
    pub colors: Vec<BrickColor>,
    pub ruleset: MatchMode,
    pub spawn: SpawnPolicy,
    pub seed: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 4,
            depth: 4,
            max_layers: 12,
            shapes: vec![
                BrickShape::Cube,
                BrickShape::Domino,
                BrickShape::Square,
                BrickShape::Bar,
            ],
            colors: BrickColor::palette(4),
            ruleset: MatchMode::FullLayer,
            spawn: SpawnPolicy::Random,
            seed: 0x1234_5678,
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.depth == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                depth: self.depth,
            });
        }
        if self.max_layers == 0 || self.max_layers > MAX_LAYERS {
            return Err(ConfigError::LayerCap {
                got: self.max_layers,
                cap: MAX_LAYERS,
            });
        }
        if self.shapes.is_empty() {
            return Err(ConfigError::NoShapes);
        }
        if self.colors.is_empty() {
            return Err(ConfigError::NoColors);
        }
        if let Some(shape) = self
            .shapes
            .iter()
            .find(|s| !s.fits(self.width, self.depth))
        {
            return Err(ConfigError::ShapeTooLarge {
                shape: shape.name(),
                width: self.width,
                depth: self.depth,
            });
        }
        if let SpawnPolicy::Fixed { x, y } = self.spawn {
            if x >= self.width || y >= self.depth {
                return Err(ConfigError::SpawnOutside { x, y });
            }
        }
        Ok(())
    }

    /// Drop shapes that cannot fit this grid in any rotation.
    pub fn retain_fitting_shapes(&mut self) {
        let (w, d) = (self.width, self.depth);
        self.shapes.retain(|s| s.fits(w, d));
    }
}

/// Options that affect game behaviour around the level (timing, scoring start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub level: LevelConfig,
    /// Delay before a freshly spawned brick starts falling (0 = none).
    pub spawn_delay_ms: u64,
    pub initial_level: u32,
    /// Fall speed stays fixed instead of rising with level.
    pub relaxed: bool,
    /// Layers of air between the top of the stack and a new brick.
    pub spawn_clearance: usize,
    /// Number of upcoming bricks shown in the preview.
    pub preview: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: LevelConfig::default(),
            spawn_delay_ms: 0,
            initial_level: 1,
            relaxed: false,
            spawn_clearance: 4,
            preview: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(LevelConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_levels() {
        let base = LevelConfig::default();
        let cases = [
            LevelConfig { width: 0, ..base.clone() },
            LevelConfig { max_layers: MAX_LAYERS + 1, ..base.clone() },
            LevelConfig { shapes: Vec::new(), ..base.clone() },
            LevelConfig { colors: Vec::new(), ..base.clone() },
            LevelConfig { width: 2, depth: 2, ..base.clone() },
            LevelConfig { spawn: SpawnPolicy::Fixed { x: 4, y: 0 }, ..base.clone() },
        ];
        for cfg in cases {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_retain_fitting_shapes() {
        let mut cfg = LevelConfig {
            width: 2,
            depth: 2,
            ..LevelConfig::default()
        };
        cfg.retain_fitting_shapes();
        assert_eq!(
            cfg.shapes,
            vec![BrickShape::Cube, BrickShape::Domino, BrickShape::Square]
        );
        assert_eq!(cfg.validate(), Ok(()));
    }
}
