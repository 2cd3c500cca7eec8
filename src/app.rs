//! App: terminal init, main loop, and the animation scheduler that paces cascades.
//!
//! The game never advances a cascade on its own. Each event it emits is
//! turned into an [`Animation`]; when that animation finishes the app
//! acknowledges it by calling [`Game::advance`], which runs the next step
//! and emits the next event. With `--no-animation` every event completes
//! immediately and a cascade resolves within one frame.

use crate::Args;
use crate::input::{Action, key_to_action, left_click};
use crate::theme::Theme;
use crate::ui::{self, Scene};
use anyhow::Result;
use candytui::gravity::TokenDrop;
use candytui::refill::ColumnRefill;
use candytui::{Cell, ClickOutcome, Game, GameConfig, GameEvent, Grid, State};
use crossterm::event::{self, Event, KeyEventKind};
use log::debug;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Accepted swap slide.
const SWAP_MS: u64 = 160;
/// Fall time per row, for drops and refills.
const ROW_FALL_MS: u64 = 70;
/// Grey-out after a rejected click or swap.
const FLASH_MS: u64 = 320;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Motion {
    Swap { a: Cell, b: Cell },
    Clear { cells: Vec<Cell> },
    Fall { plan: Vec<TokenDrop> },
    Refill { per_column: Vec<ColumnRefill> },
}

/// One cascade step being shown.
#[derive(Debug, Clone)]
pub struct Animation {
    pub motion: Motion,
    /// Board before the step; the game already holds the board after it.
    pub before: Grid,
    pub started: Instant,
    pub duration: Duration,
}

impl Animation {
    /// 0.0 at start, 1.0 when finished.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Cells drawn greyed out until `until`.
#[derive(Debug, Clone)]
pub struct Flash {
    pub cells: Vec<Cell>,
    pub until: Instant,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    game: Game,
    /// Board as of the last event shown; the start frame of the next animation.
    shown: Grid,
    anim: Option<Animation>,
    flashes: Vec<Flash>,
    cursor: Cell,
    /// TachyonFX fade for cleared cells (created on the first frame of a clear).
    clear_effect: Option<Effect>,
    /// Last time the clear effect was processed (for delta).
    clear_effect_process_time: Option<Instant>,
    /// Terminal area of the last frame, for mapping mouse clicks.
    last_area: Rect,
    last_chain: u32,
    last_gain: u32,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let game = Game::new(&config)?;
        let shown = game.grid().clone();
        let centre = config.size / 2;
        Ok(Self {
            args,
            config,
            theme,
            game,
            shown,
            anim: None,
            flashes: Vec::new(),
            cursor: Cell::new(centre, centre),
            clear_effect: None,
            clear_effect_process_time: None,
            last_area: Rect::default(),
            last_chain: 0,
            last_gain: 0,
        })
    }

    fn reset_game(&mut self) -> Result<()> {
        self.game = Game::new(&self.config)?;
        self.shown = self.game.grid().clone();
        self.anim = None;
        self.flashes.clear();
        self.clear_effect = None;
        self.clear_effect_process_time = None;
        self.last_chain = 0;
        self.last_gain = 0;
        Ok(())
    }

    fn flash(&mut self, cells: Vec<Cell>, now: Instant) {
        self.flashes.push(Flash {
            cells,
            until: now + Duration::from_millis(FLASH_MS),
        });
    }

    /// Turn one game event into an animation, a flash, or nothing.
    fn start_animation(&mut self, event: GameEvent, now: Instant) {
        debug!("event {event:?} (awaits ack: {})", event.awaits_ack());
        let before = std::mem::replace(&mut self.shown, self.game.grid().clone());
        let (motion, duration) = match event {
            GameEvent::CellSelected { .. } => return,
            GameEvent::CascadeSettled { chain } => {
                self.last_chain = chain;
                return;
            }
            GameEvent::SelectionDiscarded { first, second } => {
                self.flash(vec![first, second], now);
                return;
            }
            GameEvent::InputRejected { cell } => {
                self.flash(vec![cell], now);
                return;
            }
            GameEvent::SwapAttempted { a, b, accepted } => {
                if !accepted {
                    self.flash(vec![a, b], now);
                    return;
                }
                (Motion::Swap { a, b }, Duration::from_millis(SWAP_MS))
            }
            GameEvent::CellsCleared { cells, score_delta } => {
                self.last_gain = score_delta;
                (
                    Motion::Clear { cells },
                    Duration::from_millis(u64::from(ui::CLEAR_FADE_MS)),
                )
            }
            GameEvent::TokensDropped { plan } => {
                let rows = plan.iter().map(TokenDrop::distance).max().unwrap_or(0);
                if rows == 0 {
                    return;
                }
                (
                    Motion::Fall { plan },
                    Duration::from_millis(ROW_FALL_MS * rows as u64),
                )
            }
            GameEvent::ColumnsRefilled {
                per_column,
                max_count,
            } => (
                Motion::Refill { per_column },
                Duration::from_millis(ROW_FALL_MS * max_count as u64),
            ),
        };
        if self.args.no_animation {
            return;
        }
        self.anim = Some(Animation {
            motion,
            before,
            started: now,
            duration,
        });
    }

    /// Drain events into animations and advance the cascade while nothing is playing.
    fn pump(&mut self, now: Instant) {
        while self.anim.is_none() {
            if let Some(event) = self.game.poll_event() {
                self.start_animation(event, now);
            } else if self.game.current_state() == State::Resolving {
                self.game.advance();
            } else {
                break;
            }
        }
    }

    /// Drop the current animation once it has played out.
    fn finish_animation(&mut self, now: Instant) {
        let done = match &self.anim {
            None => false,
            Some(Animation {
                motion: Motion::Clear { .. },
                ..
            }) => self.clear_effect.as_ref().is_some_and(|e| e.done()),
            Some(anim) => anim.progress(now) >= 1.0,
        };
        if done {
            self.anim = None;
            self.clear_effect = None;
            self.clear_effect_process_time = None;
        }
    }

    fn click(&mut self, row: i32, col: i32) {
        let outcome = self.game.on_cell_clicked(row, col);
        debug!("click ({row}, {col}) -> {outcome:?}");
        if outcome != ClickOutcome::OutOfBounds {
            if let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) {
                self.cursor = Cell::new(row, col);
            }
        }
    }

    fn move_cursor(&mut self, action: Action) {
        let last = self.config.size - 1;
        let Cell { row, col } = self.cursor;
        self.cursor = match action {
            Action::CursorUp => Cell::new(row.saturating_sub(1), col),
            Action::CursorDown => Cell::new((row + 1).min(last), col),
            Action::CursorLeft => Cell::new(row, col.saturating_sub(1)),
            Action::CursorRight => Cell::new(row, (col + 1).min(last)),
            _ => self.cursor,
        };
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            self.flashes.retain(|f| f.until > now);
            self.pump(now);

            terminal.draw(|f| {
                self.last_area = f.area();
                let scene = Scene {
                    grid: self.game.grid(),
                    theme: &self.theme,
                    score: self.game.score(),
                    state: self.game.current_state(),
                    selection: self.game.selection(),
                    cursor: self.cursor,
                    anim: self.anim.as_ref(),
                    flashes: &self.flashes,
                    last_chain: self.last_chain,
                    last_gain: self.last_gain,
                    now,
                };
                ui::draw(
                    f,
                    &scene,
                    &mut self.clear_effect,
                    &mut self.clear_effect_process_time,
                );
            })?;

            self.finish_animation(Instant::now());

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if !event::poll(timeout)? {
                continue;
            }
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => match key_to_action(key) {
                        Action::Quit => return Ok(()),
                        Action::Restart => self.reset_game()?,
                        Action::Select => {
                            let Cell { row, col } = self.cursor;
                            self.click(row as i32, col as i32);
                        }
                        Action::None => {}
                        action => self.move_cursor(action),
                    },
                    Event::Mouse(mouse) => {
                        if let Some((x, y)) = left_click(mouse) {
                            let (row, col) = ui::cell_at(self.last_area, self.config.size, x, y);
                            self.click(row, col);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
