//! Voxstack core: a voxel grid of coloured bricks with single-colour layer clears,
//! cross-layer flood fill and bottom-up collapse, plus the game state that drives it.

pub mod board;
pub mod brick;
pub mod collapse;
pub mod config;
pub mod error;
pub mod flood;
pub mod game;
pub mod grid;
pub mod matcher;
pub mod spawner;

pub use board::{Board, BoardEvent, ClearReport, Landing};
pub use brick::{Brick, BrickColor, BrickId, BrickShape, Footprint};
pub use collapse::Fall;
pub use config::{GameConfig, LevelConfig, SpawnPolicy};
pub use error::{ConfigError, GridError};
pub use game::{FallingBrick, GameOverCause, GameState};
pub use grid::{GridPos, MAX_LAYERS, Placement, VoxelGrid};
pub use matcher::{LayerMatch, LayerMatcher, Line, MatchMode};
