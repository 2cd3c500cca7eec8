//! Alignment detection: cells in horizontal or vertical runs of three or more.

use crate::grid::{Cell, EMPTY, Grid};
use std::collections::BTreeSet;

/// Every cell that belongs to at least one run.
///
/// Scans each row and each column with a window of three. A run of length
/// L is covered by its L-2 overlapping windows, and crossing runs (L/T
/// shapes) share their corner cell, so the result is deduplicated by
/// collecting into a set.
pub fn find_alignments(grid: &Grid) -> BTreeSet<Cell> {
    let n = grid.size();
    let mut found = BTreeSet::new();
    if n < 3 {
        return found;
    }

    for row in 0..n {
        for col in 0..n - 2 {
            let t = grid.at(row, col);
            if t != EMPTY && t == grid.at(row, col + 1) && t == grid.at(row, col + 2) {
                found.extend((col..col + 3).map(|c| Cell::new(row, c)));
            }
        }
    }

    for col in 0..n {
        for row in 0..n - 2 {
            let t = grid.at(row, col);
            if t != EMPTY && t == grid.at(row + 1, col) && t == grid.at(row + 2, col) {
                found.extend((row..row + 3).map(|r| Cell::new(r, col)));
            }
        }
    }

    found
}

/// True as soon as one run is found.
pub fn has_alignment(grid: &Grid) -> bool {
    let n = grid.size();
    if n < 3 {
        return false;
    }
    (0..n).any(|a| {
        (0..n - 2).any(|b| {
            let h = grid.at(a, b);
            let v = grid.at(b, a);
            (h != EMPTY && h == grid.at(a, b + 1) && h == grid.at(a, b + 2))
                || (v != EMPTY && v == grid.at(b + 1, a) && v == grid.at(b + 2, a))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows, 5).unwrap()
    }

    #[test]
    fn test_row_of_three() {
        let g = grid(&[&[1, 1, 1, 2], &[2, 1, 2, 1], &[1, 2, 1, 2], &[2, 1, 2, 1]]);
        let found = find_alignments(&g);
        let expected: BTreeSet<Cell> = [Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)].into();
        assert_eq!(found, expected);
        assert!(has_alignment(&g));
    }

    #[test]
    fn test_long_run_fully_captured() {
        let g = grid(&[&[2, 1, 2, 1, 2], &[3, 3, 3, 3, 3], &[2, 1, 2, 1, 2], &[1, 2, 1, 2, 1], &[2, 1, 2, 1, 2]]);
        let found = find_alignments(&g);
        assert_eq!(found.len(), 5);
        assert!(found.iter().all(|c| c.row == 1));
    }

    #[test]
    fn test_l_shape_dedupes_corner() {
        let g = grid(&[&[4, 4, 4, 1], &[4, 2, 1, 2], &[4, 1, 2, 1], &[1, 2, 1, 2]]);
        let found = find_alignments(&g);
        // Three across plus three down sharing (0, 0).
        assert_eq!(found.len(), 5);
        assert!(found.contains(&Cell::new(2, 0)));
    }

    #[test]
    fn test_vertical_run() {
        let g = grid(&[&[1, 5, 2], &[2, 5, 1], &[1, 5, 2]]);
        let found = find_alignments(&g);
        assert_eq!(found, (0..3).map(|r| Cell::new(r, 1)).collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_empty_tokens_never_match() {
        let g = grid(&[&[0, 0, 0], &[0, 0, 0], &[0, 0, 0]]);
        assert!(find_alignments(&g).is_empty());
        assert!(!has_alignment(&g));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let g = grid(&[&[1, 1, 1, 2], &[2, 3, 2, 2], &[3, 3, 1, 2], &[3, 2, 2, 2]]);
        let first = find_alignments(&g);
        let second = find_alignments(&g);
        assert_eq!(first, second);
        assert_eq!(has_alignment(&g), !first.is_empty());
    }
}
