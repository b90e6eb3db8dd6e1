// print.rs — Console rendering of a grid.
//
// Each value takes PRINT_CELL_WIDTH characters (right-aligned, one trailing
// space). At most PRINT_MAX_WIDTH columns and PRINT_MAX_HEIGHT rows are
// printed; anything cut off is marked with "...":
//
//     1   2   3 ...
//     2   4   6 ...
//   ...

use std::fmt::Write;

use crate::config::{PRINT_CELL_WIDTH, PRINT_MAX_HEIGHT, PRINT_MAX_WIDTH};
use crate::grid::Grid;

/// Truncation marker for cut rows and columns.
pub const ELLIPSIS: &str = "...";

/// Render `grid` for the console, truncating to the print caps.
pub fn render_grid(grid: &Grid) -> String {
    if grid.is_empty() {
        return "<empty grid>\n".to_string();
    }

    let cols = grid.width().min(PRINT_MAX_WIDTH);
    let rows = grid.height().min(PRINT_MAX_HEIGHT);
    let value_width = PRINT_CELL_WIDTH - 1;

    let mut out = String::with_capacity((rows + 1) * (cols * PRINT_CELL_WIDTH + ELLIPSIS.len() + 1));
    for row in grid.rows().take(rows) {
        for v in &row[..cols] {
            // Writing to a String cannot fail.
            let _ = write!(out, "{v:>value_width$} ");
        }
        if grid.width() > cols {
            out.push_str(ELLIPSIS);
        }
        out.push('\n');
    }
    if grid.height() > rows {
        out.push_str(ELLIPSIS);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_grid_not_truncated() {
        let g = Grid::from_vec(3, 2, vec![1, 20, 255, 0, 5, 10]);
        assert_eq!(render_grid(&g), "  1  20 255 \n  0   5  10 \n");
    }

    #[test]
    fn test_wide_grid_truncated() {
        let g = Grid::filled(PRINT_MAX_WIDTH + 5, 1, 7);
        let s = render_grid(&g);
        let line = s.lines().next().unwrap();
        assert!(line.ends_with(ELLIPSIS));
        assert_eq!(line.len(), PRINT_MAX_WIDTH * PRINT_CELL_WIDTH + ELLIPSIS.len());
        assert_eq!(s.lines().count(), 1);
    }

    #[test]
    fn test_tall_grid_truncated() {
        let g = Grid::filled(2, PRINT_MAX_HEIGHT + 1, 1);
        let s = render_grid(&g);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), PRINT_MAX_HEIGHT + 1);
        assert_eq!(*lines.last().unwrap(), ELLIPSIS);
    }

    #[test]
    fn test_exactly_at_caps_not_truncated() {
        let g = Grid::filled(PRINT_MAX_WIDTH, PRINT_MAX_HEIGHT, 9);
        assert!(!render_grid(&g).contains(ELLIPSIS));
    }

    #[test]
    fn test_lines_fit_console() {
        let g = Grid::filled(100, 3, 255);
        for line in render_grid(&g).lines() {
            assert!(line.len() <= crate::config::PRINT_CONSOLE_WIDTH);
        }
    }

    #[test]
    fn test_empty_grid() {
        assert_eq!(render_grid(&Grid::empty()), "<empty grid>\n");
    }
}
