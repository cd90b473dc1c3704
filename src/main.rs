//! Voxstack: 3D colour-layer brick-stacking puzzle in the terminal.

mod anim;
mod app;
mod headless;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use voxstack::{BrickColor, BrickShape, ConfigError, GameConfig, LevelConfig, MatchMode, SpawnPolicy};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let config = build_game_config(&args).context("invalid level settings")?;
    log::info!(
        "level {}x{}x{}, {} shapes, {} colours, {:?}",
        config.level.width,
        config.level.depth,
        config.level.max_layers,
        config.level.shapes.len(),
        config.level.colors.len(),
        config.level.ruleset
    );
    if let Some(bricks) = args.headless {
        return headless::run(&config, bricks);
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go somewhere when asked:
/// a file with `--log-file`, stderr in headless runs. `RUST_LOG` filters.
fn init_logging(args: &Args) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        env_logger::Builder::from_env(env)
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else if args.headless.is_some() {
        env_logger::Builder::from_env(env).init();
    }
    Ok(())
}

/// Level and game options from the CLI (and the menu's difficulty / ruleset picks).
pub fn build_game_config(args: &Args) -> Result<GameConfig, ConfigError> {
    let colors = args
        .colors
        .unwrap_or_else(|| args.difficulty.color_count());
    let spawn = match (args.spawn_x, args.spawn_y) {
        (None, None) => SpawnPolicy::Random,
        (x, y) => SpawnPolicy::Fixed {
            x: x.unwrap_or(0),
            y: y.unwrap_or(0),
        },
    };
    let mut level = LevelConfig {
        width: args.width,
        depth: args.depth,
        max_layers: args.max_layers,
        shapes: args.difficulty.shapes().to_vec(),
        colors: BrickColor::palette(colors),
        ruleset: args.ruleset.into(),
        spawn,
        seed: args.seed.unwrap_or_else(clock_seed),
    };
    level.retain_fitting_shapes();
    level.validate()?;
    Ok(GameConfig {
        level,
        spawn_delay_ms: args.spawn_delay_ms.unwrap_or(0),
        initial_level: args.initial_level,
        relaxed: args.relaxed,
        spawn_clearance: args.spawn_clearance,
        preview: 3,
    })
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0x1234_5678, |d| d.subsec_nanos() ^ d.as_secs() as u32)
}

/// 3D colour-layer stacking puzzle in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "voxstack",
    version,
    about = "3D brick-stacking puzzle in the terminal. Fill a whole layer with one colour to clear it.",
    long_about = "Voxstack is a terminal puzzle played in a small 3D well.\n\n\
        Coloured bricks fall onto a WIDTH x DEPTH floor and rest on whatever is highest beneath \
        their footprint. When every cell of a layer holds the same colour the layer clears, \
        together with every same-coloured brick touching it, and everything above drops to fill \
        the gap. Stack past the height limit and the game is over.\n\n\
        CONTROLS (normal):\n  Arrows      Move on the floor   X / Z     Rotate CW / CCW\n  S           Soft drop           Enter/Space Hard drop   P  Pause   Q / Esc  Quit\n\n\
        CONTROLS (vim):\n  h/l         Left / right        k/j       Forward / back\n  i / u       Rotate CW / CCW     d         Soft drop   Space  Hard drop\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Game mode: endless (play until game over), timed (score in time limit), or clear (clear N layers).
    #[arg(short, long, default_value = "endless")]
    pub mode: GameMode,

    /// Difficulty: more colours, larger bricks and faster gravity as it rises.
    #[arg(short, long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Clear rule: a whole single-colour layer, or any single-colour row/column (legacy).
    #[arg(short, long, default_value = "layers")]
    pub ruleset: Ruleset,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Floor width in cells.
    #[arg(long, default_value = "4", value_name = "CELLS")]
    pub width: usize,

    /// Floor depth in cells.
    #[arg(long, default_value = "4", value_name = "CELLS")]
    pub depth: usize,

    /// Stack height limit in layers (at most 100).
    #[arg(long, default_value = "12", value_name = "LAYERS")]
    pub max_layers: usize,

    /// Number of brick colours in play (1-6). Defaults from difficulty.
    #[arg(long, value_name = "N")]
    pub colors: Option<usize>,

    /// In mode 'clear': layers to clear to win.
    #[arg(long, default_value = "20", value_name = "N")]
    pub clear_layers: u32,

    /// In mode 'timed': time limit in seconds.
    #[arg(long, default_value = "180", value_name = "SECS")]
    pub time_limit: u32,

    /// Disable clear flash and falling animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Gravity in layers per second. Defaults from difficulty.
    #[arg(long, value_name = "RATE")]
    pub tick_rate: Option<f64>,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Spawn delay in ms: a new brick ignores input and gravity until this has passed.
    #[arg(long, value_name = "MS")]
    pub spawn_delay_ms: Option<u64>,

    /// Layers of air between the top of the stack and a new brick.
    #[arg(long, default_value = "4", value_name = "LAYERS")]
    pub spawn_clearance: usize,

    /// Relaxed mode: gravity speed does not increase with level (fixed speed).
    #[arg(long)]
    pub relaxed: bool,

    /// Initial level. Affects starting speed when not relaxed.
    #[arg(long, default_value = "1", value_name = "N")]
    pub initial_level: u32,

    /// Always spawn at this x (with --spawn-y; missing one defaults to 0).
    #[arg(long, value_name = "X")]
    pub spawn_x: Option<usize>,

    /// Always spawn at this y.
    #[arg(long, value_name = "Y")]
    pub spawn_y: Option<usize>,

    /// Seed for the brick sequence. Defaults from the clock.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u32>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Play N bricks with a built-in greedy player and print a summary, no TUI.
    #[arg(long, value_name = "BRICKS")]
    pub headless: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GameMode {
    #[default]
    Endless,
    Timed,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn color_count(self) -> usize {
        match self {
            Self::Easy => 3,
            Self::Medium => 4,
            Self::Hard => 5,
        }
    }

    pub const fn shapes(self) -> &'static [BrickShape] {
        match self {
            Self::Easy => &[BrickShape::Cube, BrickShape::Domino, BrickShape::Square],
            Self::Medium => &[
                BrickShape::Cube,
                BrickShape::Domino,
                BrickShape::Square,
                BrickShape::Bar,
            ],
            Self::Hard => &BrickShape::ALL,
        }
    }

    /// Gravity in layers per second at level 1.
    pub const fn tick_rate(self) -> f64 {
        match self {
            Self::Easy => 1.2,
            Self::Medium => 2.0,
            Self::Hard => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Ruleset {
    /// Whole layer, one colour.
    #[default]
    #[value(alias = "full")]
    Layers,
    /// Any full row or column of one colour within a layer.
    Lines,
}

impl From<Ruleset> for MatchMode {
    fn from(r: Ruleset) -> Self {
        match r {
            Ruleset::Layers => Self::FullLayer,
            Ruleset::Lines => Self::Lines,
        }
    }
}
