// parser.rs — Text input → Grid.
//
// Format: one grid row per line, values separated by whitespace or commas.
//
//   1 2 3
//   4 5 6
//
// Hard failures (SatError::Validation, with the 1-based line number):
//   - a token that is not a non-negative decimal integer,
//   - a row with more or fewer values than the first row,
//   - more than INPUT_MAX_WIDTH values in a row,
//   - more than INPUT_MAX_HEIGHT rows.
//
// Soft failure: a value above MAX_VALUE is clipped to MAX_VALUE and a
// warning is logged; parsing continues. Digit strings too long for any
// integer type are clipped the same way.
//
// Trailing blank lines are ignored. Input with no rows yields the empty
// grid.

use std::path::Path;

use tracing::warn;

use crate::config::{INPUT_MAX_HEIGHT, INPUT_MAX_WIDTH};
use crate::error::{Result, SatError};
use crate::grid::Grid;
use crate::value::{Value, MAX_VALUE};

/// Read and parse a grid file.
pub fn parse_file(path: &Path) -> Result<Grid> {
    let text = std::fs::read_to_string(path).map_err(|source| SatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = parse_str(&text)?;
    tracing::info!(path = %path.display(), width = grid.width(), height = grid.height(), "parsed input grid");
    Ok(grid)
}

/// Parse a grid from text.
pub fn parse_str(text: &str) -> Result<Grid> {
    let lines: Vec<&str> = text.lines().collect();
    let last_non_blank = lines.iter().rposition(|l| !l.trim().is_empty());
    let lines = match last_non_blank {
        Some(i) => &lines[..=i],
        None => return Ok(Grid::empty()),
    };

    if lines.len() > INPUT_MAX_HEIGHT {
        return Err(SatError::validation(
            INPUT_MAX_HEIGHT + 1,
            format!("too many lines, the maximum is {INPUT_MAX_HEIGHT}"),
        ));
    }

    let mut data: Vec<Value> = Vec::new();
    let mut width = 0;

    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        let before = data.len();
        parse_line(line, line_no, &mut data)?;
        let line_width = data.len() - before;

        if line_no == 1 {
            width = line_width;
            data.reserve(width * (lines.len() - 1));
        } else if line_width > width {
            return Err(SatError::validation(line_no, "has more data than the others"));
        } else if line_width < width {
            return Err(SatError::validation(line_no, "has less data than the others"));
        }
    }

    Ok(Grid::from_vec(width, lines.len(), data))
}

fn parse_line(line: &str, line_no: usize, out: &mut Vec<Value>) -> Result<()> {
    let tokens = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    for (count, token) in tokens.enumerate() {
        if count == INPUT_MAX_WIDTH {
            return Err(SatError::validation(
                line_no,
                format!("too much data, the maximum is {INPUT_MAX_WIDTH} values"),
            ));
        }
        out.push(parse_token(token, line_no)?);
    }
    Ok(())
}

fn parse_token(token: &str, line_no: usize) -> Result<Value> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SatError::validation(line_no, format!("unknown input '{token}'")));
    }

    // All digits, so the only possible failure is overflow: clip like any
    // other oversize value.
    match token.parse::<u64>() {
        Ok(n) if n <= MAX_VALUE as u64 => Ok(n as Value),
        _ => {
            warn!(line = line_no, token, clipped_to = MAX_VALUE, "value exceeds maximum, clipped");
            Ok(MAX_VALUE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_grid() {
        let g = parse_str("1 2 3\n4 5 6\n").unwrap();
        assert_eq!(g, Grid::from_vec(3, 2, vec![1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_parse_accepts_commas_tabs_and_crlf() {
        let g = parse_str("1,2,\t3\r\n4, 5 ,6\r\n").unwrap();
        assert_eq!(g.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let g = parse_str("7 8\n9 10\n\n   \n").unwrap();
        assert_eq!((g.width(), g.height()), (2, 2));
    }

    #[test]
    fn test_empty_input_is_empty_grid() {
        assert!(parse_str("").unwrap().is_empty());
        assert!(parse_str("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_short_row_rejected_with_line() {
        let err = parse_str("1 2 3\n4 5\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("less data"), "{err}");
    }

    #[test]
    fn test_long_row_rejected_with_line() {
        let err = parse_str("1 2\n3 4\n5 6 7\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("more data"), "{err}");
    }

    #[test]
    fn test_blank_line_inside_grid_rejected() {
        let err = parse_str("1 2\n\n3 4\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_unparseable_token_rejected() {
        for text in ["1 2\n3 x\n", "1 -2\n", "1 2.5\n", "0x10\n"] {
            let err = parse_str(text).unwrap_err();
            assert!(err.to_string().contains("unknown input"), "{text:?}: {err}");
        }
        let err = parse_str("1 2\n3 abc\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2: unknown input 'abc'");
    }

    #[test]
    fn test_oversize_values_clipped() {
        let g = parse_str("256 1000\n99999999999999999999999 255\n").unwrap();
        assert_eq!(g.as_slice(), &[255, 255, 255, 255]);
    }

    #[test]
    fn test_too_wide_rejected() {
        let line = vec!["1"; INPUT_MAX_WIDTH + 1].join(" ");
        let err = parse_str(&line).unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert!(err.to_string().contains("too much data"));
    }

    #[test]
    fn test_max_width_accepted() {
        let line = vec!["1"; INPUT_MAX_WIDTH].join(" ");
        let g = parse_str(&line).unwrap();
        assert_eq!(g.width(), INPUT_MAX_WIDTH);
    }

    #[test]
    fn test_too_tall_rejected() {
        let text = "1\n".repeat(INPUT_MAX_HEIGHT + 1);
        let err = parse_str(&text).unwrap_err();
        assert!(err.to_string().contains("too many lines"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_file(Path::new("/nonexistent/input.txt")).unwrap_err();
        assert!(matches!(err, SatError::Io { .. }));
    }
}
