//! Game state: board, falling brick, gravity, clear cycles, scoring.

use crate::board::{Board, BoardEvent, ClearReport, Landing};
use crate::brick::{BrickColor, BrickShape, Footprint};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::grid::VoxelGrid;
use crate::spawner::Spawner;
use std::time::{Duration, Instant};

/// Ticks a combo stays alive after a clear.
pub const COMBO_TIMER_TICKS: u32 = 90;

/// Cleared layers per level step.
const LAYERS_PER_LEVEL: u32 = 5;

const MAX_COMBO: u32 = 10;

/// The brick the player is steering. `altitude` is the layer its underside is at;
/// it lands once that reaches the resting layer below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingBrick {
    pub shape: BrickShape,
    pub color: BrickColor,
    pub rotation: u8, // 0..4
    pub x: i32,
    pub y: i32,
    pub altitude: usize,
}

impl FallingBrick {
    pub fn footprint(&self) -> Footprint {
        self.shape.footprint(self.rotation)
    }

    /// True if column (x, y) lies under this brick.
    pub fn covers(&self, x: usize, y: usize) -> bool {
        let fp = self.footprint();
        let (x, y) = (x as i32, y as i32);
        x >= self.x && x < self.x + fp.width as i32 && y >= self.y && y < self.y + fp.depth as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    /// A brick needed a layer above the stack limit.
    StackOverflow { required_layer: usize },
    /// The next brick had nowhere to appear.
    NoRoom,
}

#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    spawner: Spawner,
    pub falling: Option<FallingBrick>,
    pub next_bricks: Vec<(BrickShape, BrickColor)>,
    pub score: u32,
    pub level: u32,
    initial_level: u32,
    pub layers_cleared: u32,
    pub bricks_landed: u32,
    pub game_over: Option<GameOverCause>,
    pub combo_multiplier: u32,
    pub combo_timer_ticks: u32,
    /// Most recent clear, for the sidebar.
    pub last_clear: Option<ClearReport>,
    /// Set after a clear: the next tick runs another check cycle.
    pending_check: bool,
    spawn_ready_at: Option<Instant>,
    spawn_delay_ms: u64,
    spawn_clearance: usize,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        let board = Board::new(&config.level)?;
        let mut spawner = Spawner::new(&config.level);
        let next_bricks = (0..config.preview.max(1))
            .map(|_| spawner.next_brick())
            .collect();
        let mut state = Self {
            board,
            spawner,
            falling: None,
            next_bricks,
            score: 0,
            level: config.initial_level.max(1),
            initial_level: config.initial_level.max(1),
            layers_cleared: 0,
            bricks_landed: 0,
            game_over: None,
            combo_multiplier: 1,
            combo_timer_ticks: 0,
            last_clear: None,
            pending_check: false,
            spawn_ready_at: None,
            spawn_delay_ms: config.spawn_delay_ms,
            spawn_clearance: config.spawn_clearance,
        };
        state.spawn_next();
        Ok(state)
    }

    pub fn grid(&self) -> &VoxelGrid {
        self.board.grid()
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// True while the fresh brick is still in spawn delay (no gravity / no input).
    pub fn is_spawn_delay(&self, now: Instant) -> bool {
        self.spawn_ready_at.is_some_and(|t| now < t)
    }

    /// True while a previous clear may have exposed another match.
    pub fn clear_pending(&self) -> bool {
        self.pending_check
    }

    /// Layer the falling brick would land on right now (ghost position).
    pub fn resting_layer(&self) -> Option<usize> {
        let b = self.falling?;
        if b.x < 0 || b.y < 0 {
            return None;
        }
        Some(
            self.board
                .resting_layer(b.x as usize, b.y as usize, b.footprint()),
        )
    }

    fn can_occupy(&self, b: &FallingBrick) -> bool {
        let fp = b.footprint();
        self.board.is_valid_position(b.x, b.y, fp)
            && self.board.resting_layer(b.x as usize, b.y as usize, fp) <= b.altitude
    }

    fn accepts_input(&self, now: Instant) -> bool {
        !self.is_over() && !self.is_spawn_delay(now)
    }

    fn try_update(&mut self, now: Instant, f: impl FnOnce(&mut FallingBrick)) -> bool {
        if !self.accepts_input(now) {
            return false;
        }
        let Some(mut moved) = self.falling else {
            return false;
        };
        f(&mut moved);
        if self.can_occupy(&moved) {
            self.falling = Some(moved);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self, now: Instant) -> bool {
        self.try_update(now, |b| b.x -= 1)
    }

    pub fn move_right(&mut self, now: Instant) -> bool {
        self.try_update(now, |b| b.x += 1)
    }

    /// Toward y = 0.
    pub fn move_forward(&mut self, now: Instant) -> bool {
        self.try_update(now, |b| b.y -= 1)
    }

    pub fn move_back(&mut self, now: Instant) -> bool {
        self.try_update(now, |b| b.y += 1)
    }

    pub fn rotate_cw(&mut self, now: Instant) -> bool {
        self.try_update(now, |b| b.rotation = (b.rotation + 1) % 4)
    }

    pub fn rotate_ccw(&mut self, now: Instant) -> bool {
        self.try_update(now, |b| b.rotation = (b.rotation + 3) % 4)
    }

    /// Move the brick down one layer, landing it if it is already resting.
    pub fn tick_gravity(&mut self, now: Instant) {
        if !self.accepts_input(now) {
            return;
        }
        self.step_down();
    }

    pub fn soft_drop(&mut self, now: Instant) {
        if !self.accepts_input(now) {
            return;
        }
        if self.step_down() {
            self.score += 1;
        }
    }

    /// Returns true if the brick moved (false if it landed instead).
    fn step_down(&mut self) -> bool {
        let Some(resting) = self.resting_layer() else {
            return false;
        };
        match self.falling.as_mut() {
            Some(b) if b.altitude > resting => {
                b.altitude -= 1;
                true
            }
            Some(_) => {
                self.lock_brick();
                false
            }
            None => false,
        }
    }

    pub fn hard_drop(&mut self, now: Instant) {
        if !self.accepts_input(now) {
            return;
        }
        let Some(resting) = self.resting_layer() else {
            return;
        };
        if let Some(b) = self.falling.as_mut() {
            let distance = b.altitude.saturating_sub(resting) as u32;
            self.score += distance * 2;
            b.altitude = resting;
        }
        self.lock_brick();
    }

    fn lock_brick(&mut self) {
        let Some(falling) = self.falling.take() else {
            return;
        };
        let brick = self
            .board
            .new_brick(falling.shape, falling.rotation, falling.color);
        match self
            .board
            .land(&brick, falling.x as usize, falling.y as usize)
        {
            Ok(Landing::Placed { .. }) => {
                self.bricks_landed += 1;
                self.run_clear_cycle();
                self.spawn_next();
            }
            Ok(Landing::Overflow { required_layer }) => {
                self.game_over = Some(GameOverCause::StackOverflow { required_layer });
            }
            Err(e) => {
                log::error!("falling brick could not land: {e}");
                self.game_over = Some(GameOverCause::NoRoom);
            }
        }
    }

    /// Per-tick bookkeeping: combo decay and the follow-up check cycle after a clear.
    pub fn tick_clears(&mut self) {
        if self.combo_timer_ticks > 0 {
            self.combo_timer_ticks -= 1;
            if self.combo_timer_ticks == 0 {
                self.combo_multiplier = 1;
            }
        }
        if self.pending_check && !self.is_over() {
            self.run_clear_cycle();
        }
    }

    /// One match/flood/remove/collapse cycle and its scoring.
    fn run_clear_cycle(&mut self) {
        match self.board.resolve_clear() {
            Ok(Some(report)) => {
                self.combo_multiplier = if self.combo_timer_ticks > 0 {
                    (self.combo_multiplier + 1).min(MAX_COMBO)
                } else {
                    1
                };
                self.combo_timer_ticks = COMBO_TIMER_TICKS;
                self.score += report.cells_cleared as u32 * self.combo_multiplier;
                self.layers_cleared += 1;
                self.level = self.initial_level + self.layers_cleared / LAYERS_PER_LEVEL;
                self.last_clear = Some(report);
                self.pending_check = true;
            }
            Ok(None) => self.pending_check = false,
            Err(e) => {
                log::error!("clear cycle failed: {e}");
                self.pending_check = false;
            }
        }
    }

    fn spawn_next(&mut self) {
        let next = self.next_bricks.remove(0);
        self.next_bricks.push(self.spawner.next_brick());
        let (shape, color) = next;
        // Shapes that only fit the floor turned sideways spawn rotated.
        let spawn = [0, 1].into_iter().find_map(|rotation| {
            self.spawner
                .try_spawn(self.board.grid(), shape.footprint(rotation))
                .map(|(x, y)| (rotation, x, y))
        });
        let Some((rotation, x, y)) = spawn else {
            self.game_over = Some(GameOverCause::NoRoom);
            return;
        };
        let top = self.board.grid().highest_layer().map_or(0, |h| h + 1);
        self.falling = Some(FallingBrick {
            shape,
            color,
            rotation,
            x: x as i32,
            y: y as i32,
            altitude: top + self.spawn_clearance,
        });
        self.spawn_ready_at = (self.spawn_delay_ms > 0)
            .then(|| Instant::now() + Duration::from_millis(self.spawn_delay_ms));
    }

    /// Board events since the last drain.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        self.board.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LevelConfig, SpawnPolicy};

    fn two_by_one(max_layers: usize) -> GameConfig {
        GameConfig {
            level: LevelConfig {
                width: 2,
                depth: 1,
                max_layers,
                shapes: vec![BrickShape::Cube],
                colors: vec![BrickColor::Red],
                spawn: SpawnPolicy::Fixed { x: 0, y: 0 },
                ..LevelConfig::default()
            },
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_spawns_above_stack() {
        let state = GameState::new(&two_by_one(10)).unwrap();
        let b = state.falling.unwrap();
        assert_eq!((b.x, b.y), (0, 0));
        assert_eq!(b.altitude, 4);
        assert_eq!(state.resting_layer(), Some(0));
    }

    #[test]
    fn test_gravity_lands_brick() {
        let mut state = GameState::new(&two_by_one(10)).unwrap();
        let now = Instant::now();
        for _ in 0..4 {
            state.tick_gravity(now);
        }
        assert_eq!(state.falling.unwrap().altitude, 0);
        assert_eq!(state.bricks_landed, 0);
        state.tick_gravity(now);
        assert_eq!(state.bricks_landed, 1);
        assert!(state.grid().is_occupied(0, 0, 0));
    }

    #[test]
    fn test_hard_drop_clears_layer_and_scores() {
        let mut state = GameState::new(&two_by_one(10)).unwrap();
        let now = Instant::now();
        state.hard_drop(now); // 4 layers: +8
        assert!(state.move_right(now));
        state.hard_drop(now); // 5 layers: +10, then 2 cells cleared: +2
        assert_eq!(state.layers_cleared, 1);
        assert_eq!(state.score, 20);
        assert!(state.grid().is_empty());
        assert!(state.clear_pending());
        state.tick_clears();
        assert!(!state.clear_pending());
        let events = state.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, BoardEvent::LayerCleared { layer: 0, .. })));
    }

    #[test]
    fn test_move_blocked_by_taller_column() {
        let mut state = GameState::new(&two_by_one(10)).unwrap();
        let now = Instant::now();
        for _ in 0..2 {
            assert!(state.move_right(now));
            state.hard_drop(now);
        }
        // Column x=1 is two high; new brick spawns at layer 6 over x=0.
        assert_eq!(state.falling.unwrap().altitude, 6);
        for _ in 0..5 {
            state.tick_gravity(now);
        }
        assert_eq!(state.falling.unwrap().altitude, 1);
        assert!(!state.move_right(now));
        assert_eq!(state.falling.unwrap().x, 0);
        assert!(!state.move_left(now));
    }

    #[test]
    fn test_overflow_ends_game() {
        let mut state = GameState::new(&two_by_one(2)).unwrap();
        let now = Instant::now();
        state.hard_drop(now);
        state.hard_drop(now);
        assert!(!state.is_over());
        state.hard_drop(now);
        assert_eq!(
            state.game_over,
            Some(GameOverCause::StackOverflow { required_layer: 2 })
        );
        assert_eq!(state.grid().brick_count(), 2);
        // Input is ignored once the game is over.
        state.hard_drop(now);
        assert_eq!(state.grid().brick_count(), 2);
    }

    #[test]
    fn test_rotation_respects_bounds() {
        let config = GameConfig {
            level: LevelConfig {
                width: 3,
                depth: 1,
                shapes: vec![BrickShape::Bar],
                spawn: SpawnPolicy::Fixed { x: 0, y: 0 },
                ..LevelConfig::default()
            },
            ..GameConfig::default()
        };
        let mut state = GameState::new(&config).unwrap();
        let now = Instant::now();
        // A 3x1 bar cannot stand as 1x3 in a 1-deep grid.
        assert!(!state.rotate_cw(now));
        assert!(!state.rotate_ccw(now));
        assert_eq!(state.falling.unwrap().footprint(), Footprint::new(3, 1));
    }

    #[test]
    fn test_sideways_only_shape_spawns_rotated() {
        let config = GameConfig {
            level: LevelConfig {
                width: 1,
                depth: 3,
                shapes: vec![BrickShape::Bar],
                spawn: SpawnPolicy::Fixed { x: 0, y: 0 },
                ..LevelConfig::default()
            },
            ..GameConfig::default()
        };
        assert!(config.level.validate().is_ok());
        let mut state = GameState::new(&config).unwrap();
        assert_eq!(state.game_over, None);
        let b = state.falling.unwrap();
        assert_eq!(b.rotation, 1);
        assert_eq!(b.footprint(), Footprint::new(1, 3));
        // One brick fills the whole layer, so it lands and clears at once.
        state.hard_drop(Instant::now());
        assert_eq!(state.bricks_landed, 1);
        assert_eq!(state.layers_cleared, 1);
        assert_eq!(state.game_over, None);
        assert_eq!(state.falling.map(|b| b.rotation), Some(1));
    }

    #[test]
    fn test_combo_grows_and_decays() {
        let config = GameConfig {
            level: LevelConfig {
                width: 1,
                depth: 1,
                shapes: vec![BrickShape::Cube],
                colors: vec![BrickColor::Blue],
                ..LevelConfig::default()
            },
            ..GameConfig::default()
        };
        let mut state = GameState::new(&config).unwrap();
        let now = Instant::now();
        state.hard_drop(now);
        assert_eq!(state.combo_multiplier, 1);
        state.hard_drop(now);
        assert_eq!(state.combo_multiplier, 2);
        for _ in 0..COMBO_TIMER_TICKS {
            state.tick_clears();
        }
        assert_eq!(state.combo_multiplier, 1);
    }

    #[test]
    fn test_falling_covers() {
        let b = FallingBrick {
            shape: BrickShape::Square,
            color: BrickColor::Red,
            rotation: 0,
            x: 1,
            y: 1,
            altitude: 3,
        };
        assert!(b.covers(2, 2));
        assert!(!b.covers(0, 1));
        assert!(!b.covers(3, 1));
    }
}
