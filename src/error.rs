//! Error types for the grid core and level configuration.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid dimensions {width}x{depth} with {max_layers} layers")]
    InvalidDimensions {
        width: usize,
        depth: usize,
        max_layers: usize,
    },
    #[error("footprint {width}x{depth} at ({x}, {y}) leaves the {grid_width}x{grid_depth} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        depth: usize,
        grid_width: usize,
        grid_depth: usize,
    },
    #[error("resting layer {layer} exceeds the {max_layers}-layer stack")]
    LayerOverflow { layer: usize, max_layers: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1 (got {width}x{depth})")]
    EmptyGrid { width: usize, depth: usize },
    #[error("max layers must be in 1..={cap} (got {got})")]
    LayerCap { got: usize, cap: usize },
    #[error("level needs at least one brick shape")]
    NoShapes,
    #[error("level needs at least one brick colour")]
    NoColors,
    #[error("shape {shape} does not fit a {width}x{depth} grid in any rotation")]
    ShapeTooLarge {
        shape: &'static str,
        width: usize,
        depth: usize,
    },
    #[error("fixed spawn anchor ({x}, {y}) is outside the grid")]
    SpawnOutside { x: usize, y: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}
