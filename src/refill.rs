//! Refill: how many fresh tokens each column needs, and their values.

use crate::grid::{Cell, EMPTY, Grid, Token};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies new tokens.
pub trait TokenSource {
    /// A token in `1..=variants`.
    fn next_token(&mut self, variants: u8) -> Token;
}

/// Uniform random tokens from a seedable generator.
#[derive(Debug, Clone)]
pub struct RandomTokens {
    rng: StdRng,
}

impl RandomTokens {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl TokenSource for RandomTokens {
    fn next_token(&mut self, variants: u8) -> Token {
        self.rng.gen_range(1..=variants.max(1))
    }
}

/// Fresh tokens for one column, written from row 0 downward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRefill {
    pub col: usize,
    pub values: Vec<Token>,
}

impl ColumnRefill {
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefillPlan {
    pub columns: Vec<ColumnRefill>,
}

impl RefillPlan {
    /// Largest per-column count; the slowest column's fall ends the phase.
    pub fn max_count(&self) -> usize {
        self.columns.iter().map(ColumnRefill::count).max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(ColumnRefill::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Plan the refill of a compacted board. Columns without empties are skipped.
pub fn plan<S: TokenSource + ?Sized>(grid: &Grid, variants: u8, source: &mut S) -> RefillPlan {
    let columns = (0..grid.size())
        .filter_map(|col| {
            let count = grid.column_empty_count(col);
            (count > 0).then(|| ColumnRefill {
                col,
                values: (0..count)
                    .map(|_| {
                        let token = source.next_token(variants);
                        debug_assert!(
                            (1..=variants).contains(&token),
                            "token source produced {token}, expected 1..={variants}"
                        );
                        token
                    })
                    .collect(),
            })
        })
        .collect();
    RefillPlan { columns }
}

/// Write planned values top-down: row 0 gets the first value.
pub fn apply(grid: &mut Grid, plan: &RefillPlan) {
    for column in &plan.columns {
        for (row, &token) in column.values.iter().enumerate() {
            let cell = Cell::new(row, column.col);
            debug_assert_eq!(grid.get(cell), Ok(EMPTY), "refill over a token at {cell}");
            grid.put(cell, token);
        }
    }
}
