//! Candytui — match-3 candy puzzle game in the terminal.

mod app;
mod input;
mod logging;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use candytui::config::{DEFAULT_SIZE, DEFAULT_VARIANTS};
use candytui::{GameConfig, InitialBoard};
use clap::{Parser, ValueEnum};

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        logging::init(path, &args.log_level)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = args.game_config();
    config.validate().context("invalid board options")?;
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Match-3 candy puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "candytui",
    version,
    about = "Match-3 candy puzzle in the terminal. Swap neighbouring candies to line up three or more.",
    long_about = "Candytui is a terminal match-3 game.\n\n\
        Click a candy, then click a neighbour to swap them. A swap that lines up three or \
        more identical candies in a row or column clears them; candies above fall down and \
        new ones drop in from the top, which may line up again. Swaps that line nothing up \
        are undone. Input is locked while a cascade plays out.\n\n\
        CONTROLS:\n  Mouse       Click candies\n  Arrows/hjkl Move cursor   Space/Enter Select\n  R           New board     Q / Esc     Quit"
)]
pub struct Args {
    /// Board side length in cells.
    #[arg(short, long, default_value_t = DEFAULT_SIZE, value_name = "N")]
    pub size: usize,

    /// Number of candy kinds (3-6).
    #[arg(short, long, default_value_t = DEFAULT_VARIANTS, value_name = "K")]
    pub variants: u8,

    /// Seed for a reproducible board and refills.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Starting board: clean (no lines) or settle (random, lines cleared before play, unscored).
    #[arg(long, default_value = "clean")]
    pub initial_board: StartBoard,

    /// Disable animations: cascades resolve instantly.
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write log records to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// Log filter (env_logger syntax), used with --log-file.
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log_level: String,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size,
            variants: self.variants,
            initial_board: self.initial_board.into(),
            seed: self.seed,
        }
    }
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
pub enum StartBoard {
    #[default]
    Clean,
    Settle,
}

impl From<StartBoard> for InitialBoard {
    fn from(value: StartBoard) -> Self {
        match value {
            StartBoard::Clean => Self::Clean,
            StartBoard::Settle => Self::Settle,
        }
    }
}
