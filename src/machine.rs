//! Game controller: input gating, swap resolution and the cascade phase loop.

use crate::config::{ConfigError, GameConfig};
use crate::detect::{find_alignments, has_alignment};
use crate::event::GameEvent;
use crate::gravity;
use crate::grid::{Cell, Grid};
use crate::refill::{self, RandomTokens, TokenSource};
use log::{debug, info, trace};
use std::collections::VecDeque;

/// Externally visible input state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for a first click.
    Idle,
    /// One cell selected, waiting for the second click.
    SwapPending,
    /// A cascade is running; input is locked.
    Resolving,
}

/// Next cascade step to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Clear,
    Collapse,
    Refill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    SwapPending { first: Cell },
    Resolving { next: Step },
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected,
    /// Second click not adjacent to the first.
    Discarded,
    /// Swap made a run; cascade started.
    Swapped,
    /// Swap made no run and was undone.
    SwapReverted,
    /// Cascade in progress.
    Rejected,
    OutOfBounds,
}

/// One game: the board, the score and the phase that gates input.
///
/// Every step mutates the board first and only then queues the matching
/// [`GameEvent`]. During a cascade the game stays in [`State::Resolving`]
/// and each call to [`Game::advance`] runs exactly one step, so a renderer
/// can animate a step and acknowledge it by advancing. [`Game::settle`]
/// runs the whole cascade at once.
#[derive(Debug)]
pub struct Game<S: TokenSource = RandomTokens> {
    grid: Grid,
    variants: u8,
    score: u32,
    phase: Phase,
    source: S,
    events: VecDeque<GameEvent>,
    /// Clear passes in the running cascade.
    chain: u32,
    /// Off while the starting board settles.
    scoring: bool,
}

impl Game<RandomTokens> {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        let source = config
            .seed
            .map_or_else(RandomTokens::from_entropy, RandomTokens::seeded);
        Self::with_source(config, source)
    }
}

impl<S: TokenSource> Game<S> {
    /// Build a random starting board from `source`.
    ///
    /// With [`crate::InitialBoard::Settle`] a board holding runs starts in
    /// [`State::Resolving`]; its cascade is not scored.
    pub fn with_source(config: &GameConfig, mut source: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::random(config.size, config.variants, &mut source, config.initial_board);
        info!(
            "new {0}x{0} board, {1} variants, {2:?} start",
            config.size, config.variants, config.initial_board
        );
        Ok(Self::from_grid(grid, config.variants, source))
    }

    /// Start on a given board. A board with runs or empty cells is not
    /// playable yet: the game starts [`State::Resolving`] and settles it
    /// without scoring.
    pub fn from_grid(grid: Grid, variants: u8, source: S) -> Self {
        let unsettled = has_alignment(&grid) || grid.empty_count() > 0;
        if unsettled {
            debug!("starting board needs settling");
        }
        Self {
            grid,
            variants,
            score: 0,
            phase: if unsettled {
                Phase::Resolving { next: Step::Clear }
            } else {
                Phase::Idle
            },
            source,
            events: VecDeque::new(),
            chain: 0,
            scoring: !unsettled,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn variants(&self) -> u8 {
        self.variants
    }

    pub fn current_state(&self) -> State {
        match self.phase {
            Phase::Idle => State::Idle,
            Phase::SwapPending { .. } => State::SwapPending,
            Phase::Resolving { .. } => State::Resolving,
        }
    }

    /// First cell of a pending swap.
    pub fn selection(&self) -> Option<Cell> {
        match self.phase {
            Phase::SwapPending { first } => Some(first),
            _ => None,
        }
    }

    pub fn poll_event(&mut self) -> Option<GameEvent> {
        self.events.pop_front()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    /// Click with raw coordinates, which may fall off the board.
    pub fn on_cell_clicked(&mut self, row: i32, col: i32) -> ClickOutcome {
        match (usize::try_from(row), usize::try_from(col)) {
            (Ok(row), Ok(col)) => self.click(Cell::new(row, col)),
            _ => {
                debug!("ignoring click outside board at ({row}, {col})");
                ClickOutcome::OutOfBounds
            }
        }
    }

    pub fn click(&mut self, cell: Cell) -> ClickOutcome {
        if !self.grid.in_bounds(cell) {
            debug!("ignoring click outside board at {cell}");
            return ClickOutcome::OutOfBounds;
        }
        match self.phase {
            Phase::Resolving { .. } => {
                debug!("click at {cell} rejected during cascade");
                self.events.push_back(GameEvent::InputRejected { cell });
                ClickOutcome::Rejected
            }
            Phase::Idle => {
                self.phase = Phase::SwapPending { first: cell };
                self.events.push_back(GameEvent::CellSelected { cell });
                ClickOutcome::Selected
            }
            Phase::SwapPending { first } => self.try_swap(first, cell),
        }
    }

    fn try_swap(&mut self, first: Cell, second: Cell) -> ClickOutcome {
        self.phase = Phase::Idle;
        if !first.is_adjacent(&second) {
            self.events
                .push_back(GameEvent::SelectionDiscarded { first, second });
            return ClickOutcome::Discarded;
        }
        if let Err(err) = self.grid.swap(first, second) {
            debug!("swap refused: {err}");
            return ClickOutcome::OutOfBounds;
        }
        let accepted = has_alignment(&self.grid);
        if accepted {
            self.phase = Phase::Resolving { next: Step::Clear };
        } else {
            self.grid.exchange(first, second);
        }
        info!(
            "swap {first} <-> {second} {}",
            if accepted { "accepted" } else { "reverted" }
        );
        self.events.push_back(GameEvent::SwapAttempted {
            a: first,
            b: second,
            accepted,
        });
        if accepted {
            ClickOutcome::Swapped
        } else {
            ClickOutcome::SwapReverted
        }
    }

    /// Run one cascade step. Returns true while the cascade continues.
    pub fn advance(&mut self) -> bool {
        let Phase::Resolving { next } = self.phase else {
            return false;
        };
        trace!("cascade step {next:?}");
        match next {
            Step::Clear => {
                let cells = find_alignments(&self.grid);
                if cells.is_empty() {
                    if self.grid.empty_count() > 0 {
                        self.phase = Phase::Resolving {
                            next: Step::Collapse,
                        };
                        return true;
                    }
                    let chain = std::mem::take(&mut self.chain);
                    self.phase = Phase::Idle;
                    self.scoring = true;
                    info!("cascade settled after {chain} pass(es), score {}", self.score);
                    self.events.push_back(GameEvent::CascadeSettled { chain });
                    return false;
                }
                self.grid.clear(&cells);
                let score_delta = if self.scoring { cells.len() as u32 } else { 0 };
                self.score += score_delta;
                self.chain += 1;
                self.events.push_back(GameEvent::CellsCleared {
                    cells: cells.into_iter().collect(),
                    score_delta,
                });
                self.phase = Phase::Resolving {
                    next: Step::Collapse,
                };
            }
            Step::Collapse => {
                let plan = gravity::collapse(&mut self.grid);
                self.events.push_back(GameEvent::TokensDropped { plan });
                self.phase = Phase::Resolving { next: Step::Refill };
            }
            Step::Refill => {
                let plan = refill::plan(&self.grid, self.variants, &mut self.source);
                refill::apply(&mut self.grid, &plan);
                let max_count = plan.max_count();
                self.events.push_back(GameEvent::ColumnsRefilled {
                    per_column: plan.columns,
                    max_count,
                });
                self.phase = Phase::Resolving { next: Step::Clear };
            }
        }
        true
    }

    /// Run the cascade to quiescence. Returns the number of clear passes.
    pub fn settle(&mut self) -> u32 {
        let mut passes = 0;
        while let Phase::Resolving { next } = self.phase {
            if next == Step::Clear && has_alignment(&self.grid) {
                passes += 1;
            }
            self.advance();
        }
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{InitialBoard, Token};

    struct Fixed(Token);

    impl TokenSource for Fixed {
        fn next_token(&mut self, _variants: u8) -> Token {
            self.0
        }
    }

    struct Cycle(Vec<Token>, usize);

    impl TokenSource for Cycle {
        fn next_token(&mut self, _variants: u8) -> Token {
            let token = self.0[self.1 % self.0.len()];
            self.1 += 1;
            token
        }
    }

    fn quiet() -> Grid {
        Grid::from_rows(
            &[
                vec![1, 2, 3, 4],
                vec![2, 3, 4, 1],
                vec![3, 4, 1, 2],
                vec![4, 1, 2, 3],
            ],
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_first_click_selects_without_mutation() {
        let mut game = Game::from_grid(quiet(), 5, Fixed(5));
        assert_eq!(game.click(Cell::new(1, 1)), ClickOutcome::Selected);
        assert_eq!(game.current_state(), State::SwapPending);
        assert_eq!(game.selection(), Some(Cell::new(1, 1)));
        assert_eq!(game.grid(), &quiet());
    }

    #[test]
    fn test_same_cell_twice_discards() {
        let mut game = Game::from_grid(quiet(), 5, Fixed(5));
        game.click(Cell::new(0, 0));
        assert_eq!(game.click(Cell::new(0, 0)), ClickOutcome::Discarded);
        assert_eq!(game.current_state(), State::Idle);
        assert_eq!(game.selection(), None);
    }

    #[test]
    fn test_non_adjacent_never_mutates() {
        let mut game = Game::from_grid(quiet(), 5, Fixed(5));
        game.click(Cell::new(0, 0));
        assert_eq!(game.click(Cell::new(1, 1)), ClickOutcome::Discarded);
        assert_eq!(game.grid(), &quiet());
        assert_eq!(
            game.drain_events().last(),
            Some(&GameEvent::SelectionDiscarded {
                first: Cell::new(0, 0),
                second: Cell::new(1, 1)
            })
        );
    }

    #[test]
    fn test_out_of_bounds_click_is_noop() {
        let mut game = Game::from_grid(quiet(), 5, Fixed(5));
        assert_eq!(game.on_cell_clicked(-1, 2), ClickOutcome::OutOfBounds);
        assert_eq!(game.on_cell_clicked(2, 4), ClickOutcome::OutOfBounds);
        assert_eq!(game.current_state(), State::Idle);
        game.click(Cell::new(2, 2));
        assert_eq!(game.on_cell_clicked(9, 9), ClickOutcome::OutOfBounds);
        assert_eq!(game.current_state(), State::SwapPending);
        assert!(game.drain_events().len() == 1);
    }

    #[test]
    fn test_swap_without_run_reverts() {
        let mut game = Game::from_grid(quiet(), 5, Fixed(5));
        game.click(Cell::new(2, 2));
        assert_eq!(game.click(Cell::new(2, 3)), ClickOutcome::SwapReverted);
        assert_eq!(game.grid(), &quiet());
        assert_eq!(game.current_state(), State::Idle);
        assert!(game.drain_events().contains(&GameEvent::SwapAttempted {
            a: Cell::new(2, 2),
            b: Cell::new(2, 3),
            accepted: false
        }));
    }

    #[test]
    fn test_advance_is_noop_when_idle() {
        let mut game = Game::from_grid(quiet(), 5, Fixed(5));
        assert!(!game.advance());
        assert_eq!(game.settle(), 0);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_settle_start_is_unscored() {
        let config = GameConfig {
            size: 8,
            variants: 3,
            initial_board: InitialBoard::Settle,
            seed: Some(11),
        };
        let mut game = Game::new(&config).unwrap();
        // Three variants on 8x8 virtually always hold a run.
        assert_eq!(game.current_state(), State::Resolving);
        assert_eq!(game.click(Cell::new(0, 0)), ClickOutcome::Rejected);
        let passes = game.settle();
        assert!(passes > 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.current_state(), State::Idle);
        assert!(find_alignments(game.grid()).is_empty());
        assert!(game.grid().is_full(3));
    }

    #[test]
    fn test_board_with_run_starts_resolving_unscored() {
        let board = Grid::from_rows(
            &[
                vec![1, 1, 1, 4],
                vec![2, 3, 4, 1],
                vec![3, 4, 1, 2],
                vec![4, 1, 2, 3],
            ],
            5,
        )
        .unwrap();
        let mut game = Game::from_grid(board, 5, Cycle(vec![5, 2, 3], 0));
        assert_eq!(game.current_state(), State::Resolving);
        assert_eq!(game.click(Cell::new(3, 3)), ClickOutcome::Rejected);
        assert_eq!(game.settle(), 1);
        assert_eq!(game.score(), 0);
        assert_eq!(game.current_state(), State::Idle);
        assert!(game.grid().is_full(5));
        assert!(find_alignments(game.grid()).is_empty());
    }

    #[test]
    fn test_board_with_gap_starts_resolving() {
        let mut board = quiet();
        board.set(Cell::new(0, 0), crate::grid::EMPTY).unwrap();
        let mut game = Game::from_grid(board, 5, Fixed(5));
        assert_eq!(game.current_state(), State::Resolving);
        assert_eq!(game.settle(), 0);
        assert_eq!(game.grid().at(0, 0), 5);
        assert_eq!(game.current_state(), State::Idle);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            size: 1,
            ..GameConfig::default()
        };
        assert!(Game::new(&config).is_err());
    }
}
