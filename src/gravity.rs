//! Gravity: stable per-column compaction and the drop plan that describes it.

use crate::grid::{Cell, EMPTY, Grid, Token};

/// One token's vertical relocation during a collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDrop {
    pub from: Cell,
    pub to: Cell,
    pub token: Token,
}

impl TokenDrop {
    /// Rows fallen.
    pub fn distance(&self) -> usize {
        self.to.row - self.from.row
    }
}

/// Result of resolving gravity on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collapse {
    /// Moved tokens, column by column, each column listed top to bottom.
    pub drops: Vec<TokenDrop>,
    /// Board with every empty cell pushed to the top of its column.
    pub grid: Grid,
}

/// Compact one column bottom-up.
///
/// Returns the compacted values and the moved tokens as (from_row, to_row,
/// token) in top-to-bottom order. The write slot starts at the bottom and
/// moves up once per surviving token, so a token never passes another one
/// and every gap below it is skipped in one motion.
fn compact_column(values: &[Token]) -> (Vec<Token>, Vec<(usize, usize, Token)>) {
    let n = values.len();
    let mut out = vec![EMPTY; n];
    let mut moves = Vec::new();
    let mut slot = n;
    for row in (0..n).rev() {
        let token = values[row];
        if token == EMPTY {
            continue;
        }
        slot -= 1;
        out[slot] = token;
        if slot != row {
            moves.push((row, slot, token));
        }
    }
    moves.reverse();
    (out, moves)
}

/// Plan the collapse without touching `grid`.
pub fn resolve(grid: &Grid) -> Collapse {
    let mut compacted = grid.clone();
    let drops = collapse(&mut compacted);
    Collapse {
        drops,
        grid: compacted,
    }
}

/// Collapse `grid` in place and return the drop plan.
pub fn collapse(grid: &mut Grid) -> Vec<TokenDrop> {
    let mut drops = Vec::new();
    for col in 0..grid.size() {
        let (values, moves) = compact_column(&grid.column(col));
        if moves.is_empty() {
            continue;
        }
        grid.set_column(col, &values);
        drops.extend(moves.into_iter().map(|(from, to, token)| TokenDrop {
            from: Cell::new(from, col),
            to: Cell::new(to, col),
            token,
        }));
    }
    drops
}

/// Every column has its empty cells on top: no empty cell sits under a token.
pub fn is_compact(grid: &Grid) -> bool {
    (0..grid.size()).all(|col| {
        let column = grid.column(col);
        column
            .iter()
            .skip_while(|&&t| t == EMPTY)
            .all(|&t| t != EMPTY)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::find_alignments;

    fn column_grid(column: &[Token]) -> Grid {
        let n = column.len();
        let rows: Vec<Vec<Token>> = column
            .iter()
            .enumerate()
            .map(|(r, &t)| {
                // Checkerboard filler so the filler columns never line up.
                let mut row: Vec<Token> = (0..n).map(|c| 4 + ((r + c) % 2) as Token).collect();
                row[0] = t;
                row
            })
            .collect();
        Grid::from_rows(&rows, 5).unwrap()
    }

    #[test]
    fn test_compacts_column_preserving_order() {
        let (values, moves) = compact_column(&[0, 2, 0, 3]);
        assert_eq!(values, vec![0, 0, 2, 3]);
        assert_eq!(moves, vec![(1, 2, 2)]);
    }

    #[test]
    fn test_multiple_gaps_skipped_in_one_motion() {
        // Rows 3 and 5 removed from a 10-tall column.
        let mut column: Vec<Token> = vec![1, 2, 3, 0, 4, 0, 5, 1, 2, 3];
        let (values, moves) = compact_column(&column);
        assert_eq!(values, vec![0, 0, 1, 2, 3, 4, 5, 1, 2, 3]);
        assert_eq!(moves, vec![(0, 2, 1), (1, 3, 2), (2, 4, 3), (4, 5, 4)]);
        column.retain(|&t| t != EMPTY);
        assert_eq!(&values[2..], &column[..]);
    }

    #[test]
    fn test_collapse_mutates_grid_and_reports_drops() {
        let mut g = column_grid(&[0, 2, 0, 3]);
        let drops = collapse(&mut g);
        assert_eq!(g.column(0), vec![0, 0, 2, 3]);
        assert_eq!(
            drops,
            vec![TokenDrop {
                from: Cell::new(1, 0),
                to: Cell::new(2, 0),
                token: 2
            }]
        );
        assert_eq!(drops[0].distance(), 1);
        assert!(is_compact(&g));
    }

    #[test]
    fn test_resolve_is_pure() {
        let g = column_grid(&[3, 0, 0, 1]);
        let before = g.clone();
        let result = resolve(&g);
        assert_eq!(g, before);
        assert_eq!(result.grid.column(0), vec![0, 0, 3, 1]);
        assert_eq!(result.drops.len(), 1);
        assert_eq!(result.drops[0].distance(), 2);
    }

    #[test]
    fn test_full_column_has_no_drops() {
        let mut g = column_grid(&[1, 2, 3, 1]);
        assert!(collapse(&mut g).is_empty());
    }

    #[test]
    fn test_clear_then_collapse_is_compact() {
        let mut g = Grid::from_rows(
            &[
                vec![1, 2, 3, 4],
                vec![2, 2, 2, 1],
                vec![3, 1, 2, 4],
                vec![4, 3, 2, 1],
            ],
            5,
        )
        .unwrap();
        let cells = find_alignments(&g);
        assert_eq!(cells.len(), 5);
        g.clear(&cells);
        assert!(!is_compact(&g));
        collapse(&mut g);
        assert!(is_compact(&g));
        assert_eq!(g.empty_count(), 5);
        assert_eq!(g.column(2), vec![0, 0, 0, 3]);
    }
}
