//! Layout and drawing: menu, top-down height map, front elevation, sidebar, pause,
//! quit menu and game over.

use crate::{Difficulty, GameMode, Ruleset};
use crate::anim::FallAnimations;
use crate::app::{GameOverReason, MenuState, MenuTab, QuitOption, Screen};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::ops::Range;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};
use voxstack::game::COMBO_TIMER_TICKS;
use voxstack::{BrickColor, BrickShape, GameState, GridPos};

/// Top view: each column is three characters wide, showing its stack height.
const TOP_CELL_W: u16 = 3;
/// Front view: two characters per column, one row per layer.
const FRONT_CELL_W: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
/// Height the sidebar sections need to render without squeezing.
const SIDEBAR_HEIGHT: u16 = 25;
const NEXT_PREVIEW_W: u16 = 7;

/// Duration of the cleared-layer fade (TachyonFX) in ms.
const CLEAR_FADE_MS: u32 = 450;

/// Cells removed by the last clear, across every layer the flood reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearFlash {
    pub cells: Vec<GridPos>,
}

/// Everything a frame needs from the app.
pub struct View<'a> {
    pub screen: Screen,
    pub state: &'a GameState,
    pub theme: &'a Theme,
    pub palette: &'a [BrickColor],
    pub paused: bool,
    pub game_over_reason: Option<GameOverReason>,
    pub mode: GameMode,
    pub clear_layers: u32,
    pub time_limit: u32,
    pub game_start: Instant,
    pub now: Instant,
    pub menu_state: &'a MenuState,
    pub quit_selected: QuitOption,
    pub best_score: u32,
    pub falls: &'a FallAnimations,
    pub flash: Option<&'a ClearFlash>,
    pub spawn_clearance: usize,
}

struct GameRects {
    all: Rect,
    top: Rect,
    front: Rect,
    sidebar: Rect,
}

fn top_view_size(state: &GameState) -> (u16, u16) {
    let grid = state.grid();
    (
        grid.width() as u16 * TOP_CELL_W + 2,
        grid.depth() as u16 + 2,
    )
}

fn front_view_size(state: &GameState, spawn_clearance: usize) -> (u16, u16) {
    let grid = state.grid();
    let rows = (grid.max_layers() + spawn_clearance) as u16;
    (grid.width() as u16 * FRONT_CELL_W + 2, rows + 2)
}

/// Centre top view, front view and sidebar in `area`.
fn game_rects(area: Rect, view: &View) -> GameRects {
    let (tw, th) = top_view_size(view.state);
    let (fw, fh) = front_view_size(view.state, view.spawn_clearance);
    let total_w = tw + 1 + fw + 1 + SIDEBAR_WIDTH;
    let total_h = th.max(fh).max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let all = vert[1];

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(tw),
            Constraint::Length(1),
            Constraint::Length(fw),
            Constraint::Length(1),
            Constraint::Length(SIDEBAR_WIDTH),
        ])
        .split(all);
    GameRects {
        all,
        top: Rect {
            height: th.min(cols[0].height),
            ..cols[0]
        },
        front: Rect {
            height: fh.min(cols[2].height),
            ..cols[2]
        },
        sidebar: cols[4],
    }
}

/// Scale an RGB colour; depth shading in the front view.
fn shade(color: Color, factor: f32) -> Color {
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::White => (255, 255, 255),
        other => return other,
    };
    let f = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    Color::Rgb(f(r), f(g), f(b))
}

/// Draw current screen, with pause overlay, quit menu and the clear fade on top of the game.
/// While a flash is set and animations are on, updates `clear_effect` / `clear_effect_time`.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    clear_effect: &mut Option<Effect>,
    clear_effect_time: &mut Option<Instant>,
) {
    let area = frame.area();
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing | Screen::QuitMenu => {
            let rects = game_rects(area, view);
            draw_game(frame, view, &rects);
            if let Some(flash) = view.flash {
                apply_clear_effect(frame, view, &rects, flash, clear_effect, clear_effect_time);
            }
            if view.screen == Screen::QuitMenu {
                draw_quit_menu(frame, view.theme, view.quit_selected);
            } else if view.paused {
                draw_pause_overlay(frame, view.theme, area);
            }
        }
        Screen::GameOver => {
            let rects = game_rects(area, view);
            draw_game(frame, view, &rects);
            draw_game_over(frame, view, rects.all);
        }
    }
}

fn draw_game(frame: &mut Frame, view: &View, rects: &GameRects) {
    draw_top_view(frame, view, rects.top);
    draw_front_view(frame, view, rects.front);
    draw_sidebar(frame, view, rects.sidebar);
}

fn view_block<'a>(theme: &Theme, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

/// Height map seen from above. The falling brick is drawn over the stack.
fn draw_top_view(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let grid = view.state.grid();
    let block = view_block(theme, " Top ");
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let flashing: HashSet<(usize, usize)> = view
        .flash
        .map(|f| f.cells.iter().map(|p| (p.x, p.y)).collect())
        .unwrap_or_default();
    let falling = view.state.falling;
    let buf = frame.buffer_mut();

    for y in 0..grid.depth() {
        for x in 0..grid.width() {
            let rx = inner.x + x as u16 * TOP_CELL_W;
            let ry = inner.y + y as u16;
            if rx + TOP_CELL_W > inner.x + inner.width || ry >= inner.y + inner.height {
                continue;
            }
            let top = grid.column_top(x, y);
            let stack_bg = top
                .and_then(|l| grid.color_at(x, y, l))
                .map_or(theme.bg, |c| theme.brick(c));
            let (text, style) = if let Some(b) = falling.filter(|b| b.covers(x, y)) {
                (
                    "▓▓▓".to_string(),
                    Style::default().fg(theme.brick(b.color)).bg(stack_bg),
                )
            } else if flashing.contains(&(x, y)) {
                (
                    "   ".to_string(),
                    Style::default().fg(Color::Black).bg(Color::White),
                )
            } else if let Some(l) = top {
                (
                    format!("{:^3}", l + 1),
                    Style::default().fg(Color::Black).bg(stack_bg),
                )
            } else {
                (
                    " · ".to_string(),
                    Style::default().fg(theme.inactive_fg).bg(theme.bg),
                )
            };
            buf.set_string(rx, ry, text, style);
        }
    }
}

/// Elevation seen from the front (y = 0 side): x across, layers up. The front-most
/// brick in each column wins; deeper bricks are darker.
fn draw_front_view(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let grid = state.grid();
    let block = view_block(theme, " Front ");
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    let buf = frame.buffer_mut();
    let all = 0..grid.width();

    for layer in 0..inner.height as usize {
        if layer == grid.max_layers() {
            let limit = Style::default().fg(Color::Red).bg(theme.bg);
            put_front_row(buf, inner, all.clone(), layer, "┄┄", limit);
        } else {
            put_front_row(buf, inner, all.clone(), layer, "  ", Style::default().bg(theme.bg));
        }
    }

    // Back to front so nearer bricks overwrite.
    let mut placements: Vec<_> = grid.placements().collect();
    placements.sort_by_key(|(id, p)| (std::cmp::Reverse(p.anchor.y), *id));
    for (id, p) in placements {
        let layer = view
            .falls
            .display_layer(id, view.now)
            .map_or(p.anchor.layer, |l| l.round().max(0.0) as usize);
        let depth_factor = (1.0 - 0.12 * p.anchor.y as f32).max(0.55);
        let color = shade(theme.brick(p.color), depth_factor);
        let xs = p.anchor.x..p.anchor.x + p.footprint.width;
        put_front_row(buf, inner, xs, layer, "██", Style::default().fg(color).bg(theme.bg));
    }

    if let Some(flash) = view.flash {
        let white = Style::default().fg(Color::White).bg(Color::White);
        for c in &flash.cells {
            put_front_row(buf, inner, c.x..c.x + 1, c.layer, "██", white);
        }
    }

    let Some(falling) = state.falling else {
        return;
    };
    let style = Style::default().fg(theme.brick(falling.color)).bg(theme.bg);
    let x0 = falling.x.max(0) as usize;
    let xs = x0..x0 + falling.footprint().width;
    if let Some(rest) = state.resting_layer() {
        if rest != falling.altitude {
            put_front_row(buf, inner, xs.clone(), rest, "░░", style);
        }
    }
    put_front_row(buf, inner, xs, falling.altitude, "▓▓", style);
}

/// Paint columns `xs` of one front-view layer; anything outside `inner` is skipped.
fn put_front_row(
    buf: &mut Buffer,
    inner: Rect,
    xs: Range<usize>,
    layer: usize,
    symbol: &str,
    style: Style,
) {
    if layer >= inner.height as usize {
        return;
    }
    let ry = inner.y + inner.height - 1 - layer as u16;
    for x in xs {
        let rx = inner.x + x as u16 * FRONT_CELL_W;
        if rx + FRONT_CELL_W <= inner.x + inner.width {
            buf.set_string(rx, ry, symbol, style);
        }
    }
}

/// Buffer positions of the flash: every removed cell in the front view (x, layer)
/// and in the top view (x, y).
fn flash_buffer_positions(rects: &GameRects, flash: &ClearFlash) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    let front = Block::default().borders(Borders::ALL).inner(rects.front);
    for p in &flash.cells {
        if p.layer as u16 >= front.height {
            continue;
        }
        let ry = front.y + front.height - 1 - p.layer as u16;
        let x0 = front.x + p.x as u16 * FRONT_CELL_W;
        for rx in x0..(x0 + FRONT_CELL_W).min(front.x + front.width) {
            set.insert((rx, ry));
        }
    }
    let top = Block::default().borders(Borders::ALL).inner(rects.top);
    for p in &flash.cells {
        let x0 = top.x + p.x as u16 * TOP_CELL_W;
        let ry = top.y + p.y as u16;
        if ry >= top.y + top.height {
            continue;
        }
        for rx in x0..(x0 + TOP_CELL_W).min(top.x + top.width) {
            set.insert((rx, ry));
        }
    }
    set
}

/// Create or update the clear fade and process it (TachyonFX: fade flashed cells to bg).
fn apply_clear_effect(
    frame: &mut Frame,
    view: &View,
    rects: &GameRects,
    flash: &ClearFlash,
    clear_effect: &mut Option<Effect>,
    clear_effect_time: &mut Option<Instant>,
) {
    let delta = clear_effect_time
        .map(|t| view.now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *clear_effect_time = Some(view.now);

    if clear_effect.is_none() {
        let flashing = flash_buffer_positions(rects, flash);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            flashing.contains(&(pos.x, pos.y))
        }));
        let bg = view.theme.bg;
        let effect = fx::fade_to(bg, bg, (CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(rects.all);
        *clear_effect = Some(effect);
    }

    if let Some(effect) = clear_effect {
        frame.render_effect(effect, rects.all, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next (border + title + preview)
            Constraint::Length(1),
            Constraint::Length(4), // Colours
            Constraint::Length(1),
            Constraint::Length(8), // Stats
            Constraint::Length(1),
            Constraint::Length(4), // Combo
        ])
        .split(area);

    let section = |frame: &mut Frame, outer: Rect| {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(outer);
        block.render(outer, frame.buffer_mut());
        inner
    };

    // --- Next ---
    let next_inner = section(frame, chunks[0]);
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(2)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style)))
        .render(next_layout[0], frame.buffer_mut());
    for (i, &(shape, color)) in state.next_bricks.iter().enumerate() {
        let x = next_layout[1].x + i as u16 * NEXT_PREVIEW_W;
        if x + NEXT_PREVIEW_W > next_layout[1].x + next_layout[1].width {
            break;
        }
        let sub = Rect {
            x,
            width: NEXT_PREVIEW_W,
            ..next_layout[1]
        };
        draw_brick_preview(frame, theme, sub, shape, color);
    }

    // --- Colours in this level ---
    let colours_inner = section(frame, chunks[2]);
    let colours_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(colours_inner);
    Paragraph::new(Line::from(Span::styled("Colours", title_style)))
        .render(colours_layout[0], frame.buffer_mut());
    let strip: Vec<Span> = view
        .palette
        .iter()
        .map(|&c| Span::styled("███ ", Style::default().fg(theme.brick(c))))
        .collect();
    Paragraph::new(Line::from(strip)).render(colours_layout[1], frame.buffer_mut());

    // --- Stats ---
    let stats_inner = section(frame, chunks[4]);
    let grid = state.grid();
    let elapsed = view.now.saturating_duration_since(view.game_start).as_secs();
    let (time_label, secs) = if view.mode == GameMode::Timed {
        ("Left: ", (view.time_limit as u64).saturating_sub(elapsed))
    } else {
        ("Time: ", elapsed)
    };
    let layers = if view.mode == GameMode::Clear {
        format!("{} / {}", state.layers_cleared, view.clear_layers)
    } else {
        state.layers_cleared.to_string()
    };
    let height = grid.highest_layer().map_or(0, |h| h + 1);
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats_lines = vec![
        stat("Score: ", state.score.to_string()),
        stat("Best: ", view.best_score.max(state.score).to_string()),
        stat("Level: ", state.level.to_string()),
        stat("Layers: ", layers),
        stat(time_label, format!("{:02}:{:02}", secs / 60, secs % 60)),
        stat("Height: ", format!("{height} / {}", grid.max_layers())),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Combo ---
    let combo_inner = section(frame, chunks[6]);
    let combo_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(combo_inner);
    let combo_ratio = (state.combo_timer_ticks as f64 / COMBO_TIMER_TICKS as f64).min(1.0);
    let combo_label = if state.combo_timer_ticks > 0 {
        format!("Combo x{}", state.combo_multiplier)
    } else {
        "Combo".to_string()
    };
    Paragraph::new(Line::from(Span::styled(combo_label, title_style)))
        .render(combo_layout[0], frame.buffer_mut());
    let bar_color = if combo_ratio > 0.6 {
        Color::Green
    } else if combo_ratio > 0.3 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .ratio(combo_ratio)
        .label("")
        .gauge_style(Style::default().fg(bar_color))
        .render(combo_layout[1], frame.buffer_mut());
}

/// Footprint of an upcoming brick, one character per cell, centred in `area`.
fn draw_brick_preview(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    shape: BrickShape,
    color: BrickColor,
) {
    let fp = shape.base();
    let w = (fp.width as u16).min(area.width);
    let off_x = area.width.saturating_sub(w) / 2;
    let style = Style::default().fg(theme.brick(color));
    let row = "█".repeat(w as usize);
    for dy in 0..(fp.depth as u16).min(area.height) {
        frame
            .buffer_mut()
            .set_string(area.x + off_x, area.y + dy, &row, style);
    }
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let menu = view.menu_state;
    let popup_w = 48u16;
    let popup_h = 22u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };

    let title = Line::from(vec![
        Span::styled(
            " Vox ",
            Style::default().fg(theme.brick(BrickColor::Cyan)).bold(),
        ),
        Span::styled("stack ", Style::default().fg(theme.main_fg).bold()),
    ]);

    let highlight_style = Style::default()
        .fg(Color::Black)
        .bg(theme.brick(BrickColor::Yellow))
        .bold();
    let selected_style = Style::default().fg(theme.brick(BrickColor::Yellow)).bold();
    let normal_style = Style::default().fg(theme.main_fg);

    let option = |tab: MenuTab, label: &'static str, selected: bool| {
        let style = if menu.current_tab == tab && selected {
            highlight_style
        } else if selected {
            selected_style
        } else {
            normal_style
        };
        Span::styled(label, style)
    };
    let row = |spans: Vec<Span<'static>>| {
        let mut out = Vec::with_capacity(spans.len() * 2);
        for (i, s) in spans.into_iter().enumerate() {
            if i > 0 {
                out.push(Span::from("  "));
            }
            out.push(s);
        }
        Line::from(out)
    };
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme.div_line)))
    };

    let difficulty = row(vec![
        option(MenuTab::Difficulty, " EASY ", menu.selected_difficulty == Difficulty::Easy),
        option(MenuTab::Difficulty, " MEDIUM ", menu.selected_difficulty == Difficulty::Medium),
        option(MenuTab::Difficulty, " HARD ", menu.selected_difficulty == Difficulty::Hard),
    ]);
    let mode = row(vec![
        option(MenuTab::Mode, " ENDLESS ", menu.selected_mode == GameMode::Endless),
        option(MenuTab::Mode, " TIMED ", menu.selected_mode == GameMode::Timed),
        option(MenuTab::Mode, " CLEAR ", menu.selected_mode == GameMode::Clear),
    ]);
    let ruleset = row(vec![
        option(MenuTab::Ruleset, " WHOLE LAYER ", menu.selected_ruleset == Ruleset::Layers),
        option(MenuTab::Ruleset, " ROWS & COLUMNS ", menu.selected_ruleset == Ruleset::Lines),
    ]);
    let start_btn = Span::styled(
        " [ START ] ",
        if menu.current_tab == MenuTab::Start {
            highlight_style
        } else {
            normal_style
        },
    );
    let key = |k: &'static str| Span::styled(k, Style::default().fg(theme.brick(BrickColor::Blue)));

    let lines = vec![
        Line::from(""),
        title,
        Line::from(""),
        heading(" ─ DIFFICULTY ─ "),
        difficulty,
        Line::from(""),
        heading(" ─ MODE ─ "),
        mode,
        Line::from(""),
        heading(" ─ CLEAR RULE ─ "),
        ruleset,
        Line::from(""),
        Line::from(""),
        Line::from(start_btn),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            key(" ↕ "),
            Span::from("NAVIGATE   "),
            key(" ↔ "),
            Span::from("CHANGE   "),
            key(" ENTER "),
            Span::from("START"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " [Q] QUIT ",
            Style::default().fg(theme.brick(BrickColor::Red)),
        )),
    ];

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Slide in from below, ease-out cubic.
    let elapsed = view
        .now
        .saturating_duration_since(menu.animation_start)
        .as_millis() as f32;
    let t = (elapsed / 500.0).min(1.0);
    let offset = ((1.0 - t).powi(3) * 10.0) as u16;
    let mut anim_popup = popup;
    anim_popup.y = (anim_popup.y + offset).min(area.y + area.height.saturating_sub(popup.height));

    p.render(anim_popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup_w = 28u16;
    let popup_h = 5u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, game_area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let popup_w = 34u16.min(game_area.width);
    let popup_h = 13u16.min(game_area.height);
    let popup = Rect {
        x: game_area.x + game_area.width.saturating_sub(popup_w) / 2,
        y: game_area.y + game_area.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };
    let (title, title_style) = match view.game_over_reason {
        Some(GameOverReason::TimeUp) => (" Time's up! ".to_string(), Style::default().fg(Color::Black).bg(Color::Yellow)),
        Some(GameOverReason::ClearedN) => (
            format!(" {} layers cleared! ", view.clear_layers),
            Style::default().fg(Color::Black).bg(Color::Green),
        ),
        Some(GameOverReason::StackOverflow { required_layer }) => (
            format!(" Stack overflow at {} ", required_layer + 1),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
        Some(GameOverReason::NoRoom) | None => (
            " Game Over ".to_string(),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
    };
    let fg = Style::default().fg(theme.main_fg);
    let elapsed = view.now.saturating_duration_since(view.game_start).as_secs();
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, title_style)),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score), fg)),
        Line::from(Span::styled(format!(" Best: {} ", view.best_score), fg)),
        Line::from(Span::styled(format!(" Layers: {} ", state.layers_cleared), fg)),
        Line::from(Span::styled(format!(" Bricks: {} ", state.bricks_landed), fg)),
        Line::from(Span::styled(
            format!(" Time: {:02}:{:02} ", elapsed / 60, elapsed % 60),
            fg,
        )),
    ];
    if state.score > 0 && state.score >= view.best_score {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R — Restart  M — Menu  Q — Quit ",
        fg,
    )));
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Voxstack ", theme.title)),
    );
    for y in popup.y..popup.y + popup.height {
        for x in popup.x..popup.x + popup.width {
            frame.buffer_mut()[(x, y)].set_style(Style::default().bg(theme.bg));
        }
    }
    p.render(popup, frame.buffer_mut());
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let area = frame.area();
    let qw = 24u16.min(area.width);
    let qh = 8u16.min(area.height);
    let quit_rect = Rect {
        x: area.x + area.width.saturating_sub(qw) / 2,
        y: area.y + area.height.saturating_sub(qh) / 2,
        width: qw,
        height: qh,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    // Clear background
    for y in quit_rect.y..quit_rect.y + quit_rect.height {
        for x in quit_rect.x..quit_rect.x + quit_rect.width {
            frame.buffer_mut()[(x, y)].set_style(Style::default().bg(theme.bg));
        }
    }

    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}
