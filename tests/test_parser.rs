// tests/test_parser.rs — Parsing the bundled data files.
//
// These run with `cargo test --test test_parser`.

use std::path::PathBuf;

use summed_area::config::DEFAULT_INPUT_FILE;
use summed_area::parser::{parse_file, parse_str};
use summed_area::{CpuEngine, SatError};

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

#[test]
fn default_input_is_ten_by_ten() {
    let grid = parse_file(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_INPUT_FILE)).unwrap();
    assert_eq!((grid.width(), grid.height()), (10, 10));
    let (out, _) = CpuEngine::new().generate(&grid);
    assert_eq!(out.get(9, 9), 100);
}

#[test]
fn saturating_sample_clamps() {
    let grid = parse_file(&data("saturating_4_x_4.txt")).unwrap();
    let (out, _) = CpuEngine::new().generate(&grid);
    assert_eq!(out.row(0), &[100, 200, 255, 255]);
    assert_eq!(out.get(3, 3), 255);
}

#[test]
fn random_sample_dimensions() {
    let grid = parse_file(&data("random_64_x_48.txt")).unwrap();
    assert_eq!((grid.width(), grid.height()), (64, 48));
    assert!(grid.as_slice().iter().all(|&v| v < 4));
}

#[test]
fn ragged_sample_rejected_at_line_three() {
    let err = parse_file(&data("ragged_rows.txt")).unwrap_err();
    assert!(matches!(err, SatError::Validation { line: 3, .. }), "got {err}");
}

#[test]
fn missing_file_names_path() {
    let err = parse_file(&data("does_not_exist.txt")).unwrap_err();
    assert!(err.to_string().contains("does_not_exist.txt"), "got {err}");
}

#[test]
fn clipped_values_still_parse() {
    let grid = parse_str("300 1\n1 1\n").unwrap();
    assert_eq!(grid.as_slice(), &[255, 1, 1, 1]);
}
