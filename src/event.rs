//! Notifications the game emits after each state change, for the renderer to animate.

use crate::gravity::TokenDrop;
use crate::grid::Cell;
use crate::refill::ColumnRefill;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// First click of a pair registered.
    CellSelected { cell: Cell },
    /// Second click was not a neighbour of the first; nothing moved.
    SelectionDiscarded { first: Cell, second: Cell },
    /// Neighbouring cells swapped. When not accepted the board has already been restored.
    SwapAttempted { a: Cell, b: Cell, accepted: bool },
    /// Click arrived while a cascade was running.
    InputRejected { cell: Cell },
    CellsCleared { cells: Vec<Cell>, score_delta: u32 },
    TokensDropped { plan: Vec<TokenDrop> },
    ColumnsRefilled {
        per_column: Vec<ColumnRefill>,
        max_count: usize,
    },
    /// Board is quiescent again. `chain` counts the clear passes of the cascade.
    CascadeSettled { chain: u32 },
}

impl GameEvent {
    /// True for events that leave the game in the middle of a cascade
    /// and expect [`crate::Game::advance`] once their animation finishes.
    pub fn awaits_ack(&self) -> bool {
        matches!(
            self,
            Self::SwapAttempted { accepted: true, .. }
                | Self::CellsCleared { .. }
                | Self::TokensDropped { .. }
                | Self::ColumnsRefilled { .. }
        )
    }
}
