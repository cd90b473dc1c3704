//! Headless runner: a greedy player drops bricks without a terminal, then prints a summary.

use anyhow::Result;
use std::time::Instant;
use voxstack::{BoardEvent, BrickColor, FallingBrick, Footprint, GameConfig, GameOverCause, GameState};

/// Rotation and anchor the player steers a brick to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Target {
    rotation: u8,
    x: usize,
    y: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub bricks: u32,
    pub layers_cleared: u32,
    pub bricks_fallen: usize,
    pub score: u32,
    pub level: u32,
    pub height: usize,
    pub game_over: Option<GameOverCause>,
}

pub fn run(config: &GameConfig, bricks: u32) -> Result<()> {
    let summary = play(config, bricks)?;
    let outcome = match summary.game_over {
        Some(GameOverCause::StackOverflow { required_layer }) => {
            format!("stack overflow (needed layer {required_layer})")
        }
        Some(GameOverCause::NoRoom) => "no room to spawn".to_string(),
        None => "still playing".to_string(),
    };
    println!("bricks dropped : {}", summary.bricks);
    println!("layers cleared : {}", summary.layers_cleared);
    println!("bricks fallen  : {}", summary.bricks_fallen);
    println!("score          : {}", summary.score);
    println!("level          : {}", summary.level);
    println!("stack height   : {}", summary.height);
    println!("outcome        : {outcome}");
    Ok(())
}

/// Drop up to `bricks` bricks, resolving every clear cascade before the next one.
pub fn play(config: &GameConfig, bricks: u32) -> Result<Summary> {
    let mut config = config.clone();
    config.spawn_delay_ms = 0;
    let mut state = GameState::new(&config)?;
    let mut summary = Summary::default();
    for _ in 0..bricks {
        let Some(falling) = state.falling else {
            break;
        };
        let target = choose_target(&state, &falling);
        steer(&mut state, target);
        state.hard_drop(Instant::now());
        while state.clear_pending() && !state.is_over() {
            state.tick_clears();
        }
        summary.bricks += 1;
        for event in state.drain_events() {
            match event {
                BoardEvent::BrickFell(_) => summary.bricks_fallen += 1,
                BoardEvent::StackOverflow { required_layer } => {
                    log::info!("headless game ended: needed layer {required_layer}");
                }
                _ => {}
            }
        }
        if state.is_over() {
            break;
        }
    }
    summary.layers_cleared = state.layers_cleared;
    summary.score = state.score;
    summary.level = state.level;
    summary.height = state.grid().highest_layer().map_or(0, |h| h + 1);
    summary.game_over = state.game_over;
    Ok(summary)
}

/// Lowest landing first, then fewest foreign colours on that layer, then fewest gaps.
fn choose_target(state: &GameState, falling: &FallingBrick) -> Target {
    let grid = state.grid();
    let base = falling.shape.footprint(0);
    let rotations: &[u8] = if base.width == base.depth { &[0] } else { &[0, 1] };
    let mut best: Option<(usize, Target)> = None;
    for &rotation in rotations {
        let fp = falling.shape.footprint(rotation);
        if fp.width > grid.width() || fp.depth > grid.depth() {
            continue;
        }
        for y in 0..=grid.depth() - fp.depth {
            for x in 0..=grid.width() - fp.width {
                let layer = grid.required_height(x, y, fp);
                let cost = layer * 64
                    + foreign_cells(state, layer, falling.color) * 4
                    + gaps(state, x, y, fp, layer);
                if best.is_none_or(|(c, _)| cost < c) {
                    best = Some((cost, Target { rotation, x, y }));
                }
            }
        }
    }
    best.map_or(
        Target {
            rotation: 0,
            x: 0,
            y: 0,
        },
        |(_, t)| t,
    )
}

fn foreign_cells(state: &GameState, layer: usize, color: BrickColor) -> usize {
    let grid = state.grid();
    let mut n = 0;
    for y in 0..grid.depth() {
        for x in 0..grid.width() {
            if grid.color_at(x, y, layer).is_some_and(|c| c != color) {
                n += 1;
            }
        }
    }
    n
}

/// Empty cells trapped under the footprint if it lands at `layer`.
fn gaps(state: &GameState, x: usize, y: usize, fp: Footprint, layer: usize) -> usize {
    fp.columns(x, y)
        .map(|(cx, cy)| {
            let floor = state.grid().column_top(cx, cy).map_or(0, |t| t + 1);
            layer - floor
        })
        .sum()
}

/// Park the brick in the front-left corner, rotate, then walk it to the target.
fn steer(state: &mut GameState, target: Target) {
    let now = Instant::now();
    while state.move_left(now) {}
    while state.move_forward(now) {}
    for _ in 0..target.rotation {
        state.rotate_cw(now);
    }
    for _ in 0..target.x {
        state.move_right(now);
    }
    for _ in 0..target.y {
        state.move_back(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxstack::{BrickShape, LevelConfig, SpawnPolicy};

    #[test]
    fn test_single_colour_cubes_clear_every_layer() {
        let config = GameConfig {
            level: LevelConfig {
                width: 2,
                depth: 2,
                max_layers: 4,
                shapes: vec![BrickShape::Cube],
                colors: vec![BrickColor::Green],
                spawn: SpawnPolicy::Fixed { x: 0, y: 0 },
                ..LevelConfig::default()
            },
            ..GameConfig::default()
        };
        let summary = play(&config, 40).unwrap();
        assert_eq!(summary.bricks, 40);
        assert_eq!(summary.layers_cleared, 10);
        assert_eq!(summary.game_over, None);
        assert_eq!(summary.height, 0);
    }

    #[test]
    fn test_runs_until_game_over_or_budget() {
        let summary = play(&GameConfig::default(), 200).unwrap();
        assert!(summary.bricks <= 200);
        assert!(summary.game_over.is_some() || summary.bricks == 200);
        assert!(summary.height <= GameConfig::default().level.max_layers);
    }
}
