//! App: terminal init, main loop, tick and key handling.

use crate::anim::FallAnimations;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, ClearFlash, View};
use crate::{Args, Difficulty, GameMode, Ruleset};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use voxstack::{BoardEvent, GameConfig, GameOverCause, GameState};

/// DAS (Delayed Auto-Shift): delay before movement starts repeating when you hold a key.
const REPEAT_DELAY_MS: u64 = 170;
/// ARR (Auto-Repeat Rate): time between repeated moves while holding. 50 ms ≈ 20 moves/sec.
const REPEAT_INTERVAL_MS: u64 = 50;
/// Render and clear-check cadence; the combo timer counts these frames.
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    StackOverflow { required_layer: usize },
    NoRoom,
    TimeUp,
    ClearedN,
}

impl From<GameOverCause> for GameOverReason {
    fn from(cause: GameOverCause) -> Self {
        match cause {
            GameOverCause::StackOverflow { required_layer } => {
                Self::StackOverflow { required_layer }
            }
            GameOverCause::NoRoom => Self::NoRoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Difficulty,
    Mode,
    Ruleset,
    Start,
}

impl MenuTab {
    const fn next(self) -> Self {
        match self {
            Self::Difficulty => Self::Mode,
            Self::Mode => Self::Ruleset,
            Self::Ruleset => Self::Start,
            Self::Start => Self::Difficulty,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Difficulty => Self::Start,
            Self::Mode => Self::Difficulty,
            Self::Ruleset => Self::Mode,
            Self::Start => Self::Ruleset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub current_tab: MenuTab,
    pub selected_difficulty: Difficulty,
    pub selected_mode: GameMode,
    pub selected_ruleset: Ruleset,
    pub animation_start: Instant,
}

impl MenuState {
    fn from_args(args: &Args) -> Self {
        Self {
            current_tab: MenuTab::Difficulty,
            selected_difficulty: args.difficulty,
            selected_mode: args.mode,
            selected_ruleset: args.ruleset,
            animation_start: Instant::now(),
        }
    }

    /// Left/right on the focused tab; `forward` is right.
    fn cycle(&mut self, forward: bool) {
        match self.current_tab {
            MenuTab::Difficulty => {
                self.selected_difficulty = match (self.selected_difficulty, forward) {
                    (Difficulty::Easy, true) | (Difficulty::Hard, false) => Difficulty::Medium,
                    (Difficulty::Medium, true) | (Difficulty::Easy, false) => Difficulty::Hard,
                    (Difficulty::Hard, true) | (Difficulty::Medium, false) => Difficulty::Easy,
                };
            }
            MenuTab::Mode => {
                self.selected_mode = match (self.selected_mode, forward) {
                    (GameMode::Endless, true) | (GameMode::Clear, false) => GameMode::Timed,
                    (GameMode::Timed, true) | (GameMode::Endless, false) => GameMode::Clear,
                    (GameMode::Clear, true) | (GameMode::Timed, false) => GameMode::Endless,
                };
            }
            MenuTab::Ruleset => {
                self.selected_ruleset = match self.selected_ruleset {
                    Ruleset::Layers => Ruleset::Lines,
                    Ruleset::Lines => Ruleset::Layers,
                };
            }
            MenuTab::Start => {}
        }
    }
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    paused: bool,
    game_start: Instant,
    game_over_reason: Option<GameOverReason>,
    last_tick: Instant,
    /// Gravity (layers/sec) at level 1.
    base_tick_rate: f64,
    repeat_state: Option<(Action, Instant)>,
    last_repeat_fire: Option<Instant>,
    /// Most recent cleared layer, highlighted until its fade finishes.
    flash: Option<ClearFlash>,
    /// TachyonFX fade for `flash` (created on first draw of the flash).
    clear_effect: Option<Effect>,
    /// Last time we processed the clear effect (for delta).
    clear_effect_time: Option<Instant>,
    falls: FallAnimations,
    menu_state: MenuState,
    quit_selected: QuitOption,
    /// Best score this session.
    best_score: u32,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let state = GameState::new(&config)?;
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        let now = Instant::now();
        Ok(Self {
            base_tick_rate: args.tick_rate.unwrap_or_else(|| args.difficulty.tick_rate()),
            menu_state: MenuState::from_args(&args),
            args,
            config,
            theme,
            state,
            screen,
            paused: false,
            game_start: now,
            game_over_reason: None,
            last_tick: now,
            repeat_state: None,
            last_repeat_fire: None,
            flash: None,
            clear_effect: None,
            clear_effect_time: None,
            falls: FallAnimations::default(),
            quit_selected: QuitOption::Resume,
            best_score: 0,
        })
    }

    fn reset_game(&mut self) -> Result<()> {
        let now = Instant::now();
        self.base_tick_rate = self
            .args
            .tick_rate
            .unwrap_or_else(|| self.args.difficulty.tick_rate());
        self.state = GameState::new(&self.config)?;
        self.screen = Screen::Playing;
        self.paused = false;
        self.game_start = now;
        self.game_over_reason = None;
        self.last_tick = now;
        self.repeat_state = None;
        self.last_repeat_fire = None;
        self.clear_flash();
        self.falls.clear();
        log::info!("new game: {:?} {:?}", self.args.mode, self.args.difficulty);
        Ok(())
    }

    /// Apply the menu picks and start.
    fn start_from_menu(&mut self) -> Result<()> {
        self.args.difficulty = self.menu_state.selected_difficulty;
        self.args.mode = self.menu_state.selected_mode;
        self.args.ruleset = self.menu_state.selected_ruleset;
        self.config = crate::build_game_config(&self.args)?;
        self.reset_game()
    }

    fn clear_flash(&mut self) {
        self.flash = None;
        self.clear_effect = None;
        self.clear_effect_time = None;
    }

    fn apply_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::MoveLeft => {
                self.state.move_left(now);
            }
            Action::MoveRight => {
                self.state.move_right(now);
            }
            Action::MoveForward => {
                self.state.move_forward(now);
            }
            Action::MoveBack => {
                self.state.move_back(now);
            }
            Action::RotateCw => {
                self.state.rotate_cw(now);
            }
            Action::RotateCcw => {
                self.state.rotate_ccw(now);
            }
            Action::SoftDrop => self.state.soft_drop(now),
            Action::HardDrop => {
                self.state.hard_drop(now);
                self.repeat_state = None;
            }
            Action::Pause | Action::Quit | Action::None => {}
        }
    }

    fn tick_repeat(&mut self) {
        let now = Instant::now();
        let Some((action, first)) = self.repeat_state else {
            return;
        };
        if !action.repeats() || first.elapsed() < Duration::from_millis(REPEAT_DELAY_MS) {
            return;
        }
        let next =
            self.last_repeat_fire.unwrap_or(first) + Duration::from_millis(REPEAT_INTERVAL_MS);
        if now >= next {
            self.apply_action(action, now);
            self.last_repeat_fire = Some(now);
        }
    }

    /// Feed board events to the animations. The grid is already settled; this only
    /// schedules what the player sees.
    fn consume_events(&mut self, now: Instant) {
        for event in self.state.drain_events() {
            match event {
                BoardEvent::LayerCleared { cells, .. } if !self.args.no_animation => {
                    self.clear_flash();
                    self.flash = Some(ClearFlash { cells });
                }
                BoardEvent::BrickFell(fall) if !self.args.no_animation => {
                    self.falls.push(fall, now);
                }
                _ => {}
            }
        }
    }

    fn check_game_end(&mut self) {
        let reason = if let Some(cause) = self.state.game_over {
            Some(cause.into())
        } else if self.args.mode == GameMode::Timed
            && self.game_start.elapsed() >= Duration::from_secs(self.args.time_limit as u64)
        {
            Some(GameOverReason::TimeUp)
        } else if self.args.mode == GameMode::Clear
            && self.state.layers_cleared >= self.args.clear_layers
        {
            Some(GameOverReason::ClearedN)
        } else {
            None
        };
        self.best_score = self.best_score.max(self.state.score);
        if let Some(reason) = reason {
            log::info!(
                "game over ({reason:?}): score {}, {} layers",
                self.state.score,
                self.state.layers_cleared
            );
            self.game_over_reason = Some(reason);
            self.screen = Screen::GameOver;
            self.repeat_state = None;
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Release events are needed to stop key repeat; not every terminal has them.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.falls.prune(now);
            let view = View {
                screen: self.screen,
                state: &self.state,
                theme: &self.theme,
                palette: &self.config.level.colors,
                paused: self.paused,
                game_over_reason: self.game_over_reason,
                mode: self.args.mode,
                clear_layers: self.args.clear_layers,
                time_limit: self.args.time_limit,
                game_start: self.game_start,
                now,
                menu_state: &self.menu_state,
                quit_selected: self.quit_selected,
                best_score: self.best_score,
                falls: &self.falls,
                flash: self.flash.as_ref(),
                spawn_clearance: self.config.spawn_clearance,
            };
            let clear_effect = &mut self.clear_effect;
            let clear_effect_time = &mut self.clear_effect_time;
            terminal.draw(|f| ui::draw(f, &view, clear_effect, clear_effect_time))?;

            if self.flash.is_some() && self.clear_effect.as_ref().is_some_and(Effect::done) {
                self.clear_flash();
            }

            let rate = if self.args.relaxed {
                self.base_tick_rate
            } else {
                self.base_tick_rate * (1.0 + (self.state.level.saturating_sub(1) as f64) * 0.15)
            };
            let tick_interval = Duration::from_secs_f64(1.0 / rate.max(0.1));

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    let action = key_to_action(key);

                    // Only first presses act; a release ends our own repeat.
                    if key.kind != KeyEventKind::Press {
                        if key.kind == KeyEventKind::Release
                            && self.repeat_state.map(|(a, _)| a) == Some(action)
                        {
                            self.repeat_state = None;
                            self.last_repeat_fire = None;
                        }
                        continue;
                    }
                    if self.repeat_state.map(|(a, _)| a) == Some(action) {
                        continue;
                    }

                    match self.screen {
                        Screen::Menu => match action {
                            Action::Quit => return Ok(()),
                            Action::MoveLeft => self.menu_state.cycle(false),
                            Action::MoveRight => self.menu_state.cycle(true),
                            Action::MoveBack | Action::SoftDrop => {
                                self.menu_state.current_tab = self.menu_state.current_tab.next();
                            }
                            Action::MoveForward => {
                                self.menu_state.current_tab = self.menu_state.current_tab.prev();
                            }
                            Action::HardDrop => {
                                if self.menu_state.current_tab == MenuTab::Start {
                                    self.start_from_menu()?;
                                } else {
                                    self.menu_state.current_tab = MenuTab::Start;
                                }
                            }
                            _ => {}
                        },
                        Screen::Playing => {
                            if self.paused {
                                match action {
                                    Action::Pause => self.paused = false,
                                    Action::Quit => {
                                        self.screen = Screen::QuitMenu;
                                        self.quit_selected = QuitOption::Resume;
                                    }
                                    _ => {}
                                }
                            } else if action == Action::Pause {
                                self.paused = true;
                                self.repeat_state = None;
                            } else if action == Action::Quit {
                                self.screen = Screen::QuitMenu;
                                self.quit_selected = QuitOption::Resume;
                                self.repeat_state = None;
                            } else {
                                let now = Instant::now();
                                self.apply_action(action, now);
                                if action.repeats() {
                                    self.repeat_state = Some((action, now));
                                    self.last_repeat_fire = None;
                                }
                                // A lock swaps the brick; don't carry held input into the next one.
                                if self.state.falling.is_none() || self.state.is_spawn_delay(now) {
                                    self.repeat_state = None;
                                }
                            }
                        }
                        Screen::QuitMenu => match action {
                            Action::MoveBack | Action::SoftDrop | Action::MoveRight => {
                                self.quit_selected = match self.quit_selected {
                                    QuitOption::Resume => QuitOption::MainMenu,
                                    QuitOption::MainMenu => QuitOption::Exit,
                                    QuitOption::Exit => QuitOption::Resume,
                                };
                            }
                            Action::MoveForward | Action::MoveLeft => {
                                self.quit_selected = match self.quit_selected {
                                    QuitOption::Resume => QuitOption::Exit,
                                    QuitOption::MainMenu => QuitOption::Resume,
                                    QuitOption::Exit => QuitOption::MainMenu,
                                };
                            }
                            Action::HardDrop => match self.quit_selected {
                                QuitOption::Resume => self.screen = Screen::Playing,
                                QuitOption::MainMenu => {
                                    self.menu_state = MenuState::from_args(&self.args);
                                    self.screen = Screen::Menu;
                                }
                                QuitOption::Exit => return Ok(()),
                            },
                            Action::Pause | Action::Quit => self.screen = Screen::Playing,
                            _ => {}
                        },
                        Screen::GameOver => {
                            if action == Action::Quit {
                                return Ok(());
                            }
                            if matches!(key.code, KeyCode::Char('r' | 'R')) {
                                self.reset_game()?;
                            } else if matches!(key.code, KeyCode::Char('m' | 'M')) {
                                self.menu_state = MenuState::from_args(&self.args);
                                self.screen = Screen::Menu;
                            }
                        }
                    }
                }
            }

            if self.screen == Screen::Playing && !self.paused {
                self.tick_repeat();
                if self.last_tick.elapsed() >= tick_interval {
                    self.last_tick = Instant::now();
                    self.state.tick_gravity(Instant::now());
                }
                // Cascades resolve one clear per frame so each one is visible.
                self.state.tick_clears();
                self.consume_events(Instant::now());
                self.check_game_end();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_menu_tabs_wrap() {
        let mut tab = MenuTab::Difficulty;
        for _ in 0..4 {
            tab = tab.next();
        }
        assert_eq!(tab, MenuTab::Difficulty);
        assert_eq!(MenuTab::Difficulty.prev(), MenuTab::Start);
    }

    #[test]
    fn test_menu_cycle_round_trips() {
        let args = Args::parse_from(["voxstack", "-d", "easy"]);
        let mut menu = MenuState::from_args(&args);
        menu.cycle(true);
        assert_eq!(menu.selected_difficulty, Difficulty::Medium);
        menu.cycle(false);
        menu.cycle(false);
        assert_eq!(menu.selected_difficulty, Difficulty::Hard);
        menu.current_tab = MenuTab::Ruleset;
        menu.cycle(true);
        assert_eq!(menu.selected_ruleset, Ruleset::Lines);
    }

    #[test]
    fn test_game_over_cause_maps_to_reason() {
        let reason: GameOverReason = GameOverCause::StackOverflow { required_layer: 12 }.into();
        assert_eq!(reason, GameOverReason::StackOverflow { required_layer: 12 });
        assert_eq!(GameOverReason::from(GameOverCause::NoRoom), GameOverReason::NoRoom);
    }
}
