//! Layout and drawing: board, candies in motion, sidebar, clear fade.

use crate::app::{Animation, Flash, Motion};
use crate::theme::Theme;
use candytui::{Cell, EMPTY, Grid, State, Token};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count};

/// Terminal columns per board cell.
pub const CELL_W: u16 = 4;
/// Terminal rows per board cell.
pub const CELL_H: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;

/// Duration of the cleared-candy fade (TachyonFX) in ms.
pub const CLEAR_FADE_MS: u32 = 300;

/// Glyphs for shaped palettes, by token.
const GLYPHS: [char; 6] = ['●', '■', '▲', '◆', '★', '♥'];

/// Everything one frame needs from the app.
pub struct Scene<'a> {
    pub grid: &'a Grid,
    pub theme: &'a Theme,
    pub score: u32,
    pub state: State,
    pub selection: Option<Cell>,
    pub cursor: Cell,
    pub anim: Option<&'a Animation>,
    pub flashes: &'a [Flash],
    pub last_chain: u32,
    pub last_gain: u32,
    pub now: Instant,
}

/// A candy at a possibly fractional row (mid-fall).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub row: f32,
    pub col: usize,
    pub token: Token,
}

/// Board with border, centred together with the sidebar.
fn board_outer(area: Rect, size: usize) -> Rect {
    let n = size as u16;
    let (w, h) = (n * CELL_W + 2, n * CELL_H + 2);
    let total_w = w + SIDEBAR_WIDTH;
    Rect {
        x: area.x + area.width.saturating_sub(total_w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

/// Board inner rect (cells only, no border).
pub fn board_rect(area: Rect, size: usize) -> Rect {
    let outer = board_outer(area, size);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Board (row, col) under a terminal position. Positions off the board
/// give coordinates outside `0..size`, which the game ignores.
pub fn cell_at(area: Rect, size: usize, x: u16, y: u16) -> (i32, i32) {
    let inner = board_rect(area, size);
    let col = (i32::from(x) - i32::from(inner.x)).div_euclid(i32::from(CELL_W));
    let row = (i32::from(y) - i32::from(inner.y)).div_euclid(i32::from(CELL_H));
    (row, col)
}

/// Where every candy sits at `now`.
///
/// The game already holds the board after the animated step, so static
/// candies come from it, except for swaps (first half) and clears, which
/// show the board from before the step. Falling and refilled candies are
/// hidden at their destination and drawn along their path instead.
pub fn sprites(grid: &Grid, anim: Option<&Animation>, now: Instant) -> Vec<Sprite> {
    let t = anim.map_or(1.0, |a| a.progress(now));
    let mut hidden: HashSet<Cell> = HashSet::new();
    let mut moving = Vec::new();
    let base = match anim.map(|a| (&a.motion, a)) {
        Some((Motion::Swap { .. }, a)) if t < 0.5 => &a.before,
        Some((Motion::Clear { .. }, a)) => &a.before,
        Some((Motion::Fall { plan }, _)) => {
            for drop in plan {
                hidden.insert(drop.to);
                let span = drop.distance() as f32;
                moving.push(Sprite {
                    row: drop.from.row as f32 + span * t,
                    col: drop.to.col,
                    token: drop.token,
                });
            }
            grid
        }
        Some((Motion::Refill { per_column }, _)) => {
            for column in per_column {
                let lift = column.count() as f32 * (1.0 - t);
                for (row, &token) in column.values.iter().enumerate() {
                    hidden.insert(Cell::new(row, column.col));
                    moving.push(Sprite {
                        row: row as f32 - lift,
                        col: column.col,
                        token,
                    });
                }
            }
            grid
        }
        _ => grid,
    };

    let n = base.size();
    let mut out = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            let token = base.at(row, col);
            if token != EMPTY && !hidden.contains(&Cell::new(row, col)) {
                out.push(Sprite {
                    row: row as f32,
                    col,
                    token,
                });
            }
        }
    }
    out.extend(moving);
    out
}

/// Paint one candy. Rows above the board (refills entering) are clipped.
fn draw_sprite(buf: &mut Buffer, board: Rect, sprite: Sprite, color: Color, theme: &Theme) {
    let top = i32::from(board.y) + (sprite.row * f32::from(CELL_H)).round() as i32;
    let x0 = board.x + sprite.col as u16 * CELL_W;
    for dy in 0..i32::from(CELL_H) {
        let y = top + dy;
        if y < i32::from(board.y) || y >= i32::from(board.y + board.height) {
            continue;
        }
        for dx in 1..CELL_W - 1 {
            if let Some(cell) = buf.cell_mut((x0 + dx, y as u16)) {
                let glyph = if theme.shaped && dy == 0 && dx == 1 {
                    GLYPHS[(usize::from(sprite.token) + 5) % 6]
                } else {
                    ' '
                };
                cell.set_char(glyph).set_bg(color).set_fg(theme.bg);
            }
        }
    }
}

/// Bracket a cell with `left`/`right` in its outer columns.
fn draw_marker(buf: &mut Buffer, board: Rect, cell: Cell, left: char, right: char, color: Color) {
    let x0 = board.x + cell.col as u16 * CELL_W;
    let y0 = board.y + cell.row as u16 * CELL_H;
    for dy in 0..CELL_H {
        for (dx, ch) in [(0, left), (CELL_W - 1, right)] {
            if let Some(c) = buf.cell_mut((x0 + dx, y0 + dy)) {
                c.set_char(ch).set_fg(color);
            }
        }
    }
}

fn draw_board(frame: &mut Frame, scene: &Scene, board: Rect) {
    let theme = scene.theme;
    let greyed: HashSet<Cell> = scene
        .flashes
        .iter()
        .flat_map(|f| f.cells.iter().copied())
        .collect();
    let buf = frame.buffer_mut();
    for sprite in sprites(scene.grid, scene.anim, scene.now) {
        let whole = sprite.row.fract() == 0.0;
        let at = Cell::new(sprite.row.max(0.0) as usize, sprite.col);
        let color = if whole && greyed.contains(&at) {
            theme.inactive_fg
        } else {
            theme.candy_color(sprite.token)
        };
        draw_sprite(buf, board, sprite, color, theme);
    }
    if scene.state != State::Resolving {
        draw_marker(buf, board, scene.cursor, '[', ']', theme.main_fg);
    }
    if let Some(sel) = scene.selection {
        draw_marker(buf, board, sel, '▐', '▌', theme.title);
    }
}

fn draw_sidebar(frame: &mut Frame, scene: &Scene, board_outer: Rect) {
    let theme = scene.theme;
    let area = frame.area();
    let x = board_outer.x + board_outer.width + 1;
    let sidebar = Rect {
        x,
        y: board_outer.y,
        width: SIDEBAR_WIDTH.saturating_sub(1).min(area.width.saturating_sub(x)),
        height: board_outer.height,
    };
    let label = Style::default().fg(theme.main_fg);
    let value = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
    let (status, status_color) = match scene.state {
        State::Idle => ("Your move", theme.candy_color(2)),
        State::SwapPending => ("Pick a neighbour", theme.title),
        State::Resolving => ("Cascading…", theme.inactive_fg),
    };
    let mut lines = vec![
        Line::from(Span::styled(" Score ", label)),
        Line::from(Span::styled(format!(" {} ", scene.score), value)),
        Line::from(""),
        Line::from(Span::styled(format!(" {status} "), Style::default().fg(status_color))),
    ];
    if let Some(Animation {
        motion: Motion::Clear { .. },
        ..
    }) = scene.anim
    {
        if scene.last_gain > 0 {
            lines.push(Line::from(Span::styled(
                format!(" +{} ", scene.last_gain),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }
    } else if scene.state == State::Idle && scene.last_chain > 1 {
        lines.push(Line::from(Span::styled(
            format!(" Chain x{} ", scene.last_chain),
            Style::default().fg(theme.title),
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(" Click / Space  select", label)),
        Line::from(Span::styled(" ←↑↓→ / hjkl    move", label)),
        Line::from(Span::styled(" R  new board", label)),
        Line::from(Span::styled(" Q  quit", label)),
    ]);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line)),
        )
        .render(sidebar, frame.buffer_mut());
}

/// Terminal positions covered by the given board cells.
fn cell_positions(board: Rect, cells: &[Cell]) -> HashSet<(u16, u16)> {
    cells
        .iter()
        .flat_map(|c| {
            let x0 = board.x + c.col as u16 * CELL_W;
            let y0 = board.y + c.row as u16 * CELL_H;
            (0..CELL_W).flat_map(move |dx| (0..CELL_H).map(move |dy| (x0 + dx, y0 + dy)))
        })
        .collect()
}

/// Cleared candies melt into the board background.
fn candy_fade(board: Rect, cells: &[Cell], bg: Color) -> Effect {
    let positions = cell_positions(board, cells);
    let cleared = CellFilter::PositionFn(ref_count(move |pos: Position| {
        positions.contains(&(pos.x, pos.y))
    }));
    fx::fade_to(bg, bg, (CLEAR_FADE_MS, Interpolation::Linear))
        .with_filter(cleared)
        .with_area(board)
}

/// Run the candy fade for the time since its last frame. The fade is
/// built on the first frame of a clear and dropped by the app when done.
fn render_candy_fade(
    frame: &mut Frame,
    board: Rect,
    cells: &[Cell],
    bg: Color,
    fade: &mut Option<Effect>,
    last_frame: &mut Option<Instant>,
    now: Instant,
) {
    let elapsed = last_frame.map_or(std::time::Duration::ZERO, |t| now.saturating_duration_since(t));
    *last_frame = Some(now);
    let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
    let effect = fade.get_or_insert_with(|| candy_fade(board, cells, bg));
    frame.render_effect(effect, board, TfxDuration::from_millis(elapsed_ms));
}

/// Draw the board, candies, sidebar, and any running clear fade.
pub fn draw(
    frame: &mut Frame,
    scene: &Scene,
    clear_effect: &mut Option<Effect>,
    clear_effect_process_time: &mut Option<Instant>,
) {
    let theme = scene.theme;
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(theme.bg))
        .render(area, frame.buffer_mut());

    let size = scene.grid.size();
    let outer = board_outer(area, size);
    let board = board_rect(area, size);
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .title(Span::styled(" candytui ", Style::default().fg(theme.title)))
        .title_alignment(Alignment::Center)
        .render(outer, frame.buffer_mut());

    draw_board(frame, scene, board);
    draw_sidebar(frame, scene, outer);

    if let Some(Animation {
        motion: Motion::Clear { cells },
        ..
    }) = scene.anim
    {
        render_candy_fade(
            frame,
            board,
            cells,
            theme.bg,
            clear_effect,
            clear_effect_process_time,
            scene.now,
        );
    }
}
