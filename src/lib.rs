//! Candytui core: match-3 board model and the phase machine that drives it.
//!
//! The board ([`Grid`]) is mutated by three pure steps: [`detect`] finds
//! runs of three or more, [`gravity`] compacts columns, [`refill`] tops
//! them up. [`Game`] sequences those steps behind a single input gate and
//! reports each change as a [`GameEvent`].

pub mod config;
pub mod detect;
pub mod event;
pub mod gravity;
pub mod grid;
pub mod machine;
pub mod refill;

pub use config::{ConfigError, GameConfig};
pub use event::GameEvent;
pub use grid::{Cell, EMPTY, Grid, GridError, InitialBoard, Token};
pub use machine::{ClickOutcome, Game, State};
pub use refill::{RandomTokens, TokenSource};
