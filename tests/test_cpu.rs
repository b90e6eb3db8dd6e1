// tests/test_cpu.rs — Summed-area table properties through the public API.
//
// These run with `cargo test --test test_cpu`. GPU equivalence lives in the
// ignored subprocess tests inside src/gpu/sat.rs.

use summed_area::compare::{compare, Equivalence};
use summed_area::engine::{self, Engine, SummedAreaTable};
use summed_area::{CpuEngine, Grid, MAX_VALUE};

fn sat(input: &Grid) -> Grid {
    CpuEngine::new().generate(input).0
}

fn pseudo_random(width: usize, height: usize, seed: u32, max: u8) -> Grid {
    let mut rng = seed;
    let data = (0..width * height)
        .map(|_| {
            rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
            ((rng >> 16) % (max as u32 + 1)) as u8
        })
        .collect();
    Grid::from_vec(width, height, data)
}

// ===== Known tables =====

#[test]
fn one_by_one() {
    assert_eq!(sat(&Grid::from_vec(1, 1, vec![5])).as_slice(), &[5]);
}

#[test]
fn three_by_three_ones() {
    let out = sat(&Grid::filled(3, 3, 1));
    assert_eq!(out.row(0), &[1, 2, 3]);
    assert_eq!(out.row(1), &[2, 4, 6]);
    assert_eq!(out.row(2), &[3, 6, 9]);
}

#[test]
fn two_by_two_max_saturates() {
    let out = sat(&Grid::filled(2, 2, MAX_VALUE));
    assert!(out.as_slice().iter().all(|&v| v == MAX_VALUE));
}

#[test]
fn uniform_grid_matches_closed_form() {
    for v in [0u8, 1, 3, 17, 255] {
        let out = sat(&Grid::filled(20, 15, v));
        for y in 0..15 {
            for x in 0..20 {
                let expected = ((x + 1) * (y + 1) * v as usize).min(MAX_VALUE as usize);
                assert_eq!(out.get(x, y) as usize, expected, "v={v} at ({x}, {y})");
            }
        }
    }
}

// ===== Structural properties =====

#[test]
fn origin_equals_input_origin() {
    let input = pseudo_random(9, 4, 3, 255);
    assert_eq!(sat(&input).get(0, 0), input.get(0, 0));
}

#[test]
fn monotone_along_rows_and_columns() {
    for seed in 1..6 {
        let input = pseudo_random(31, 17, seed, 5);
        let out = sat(&input);
        for y in 0..out.height() {
            for x in 0..out.width() {
                if x > 0 {
                    assert!(out.get(x, y) >= out.get(x - 1, y), "row not monotone at ({x}, {y})");
                }
                if y > 0 {
                    assert!(out.get(x, y) >= out.get(x, y - 1), "column not monotone at ({x}, {y})");
                }
            }
        }
    }
}

#[test]
fn output_shape_matches_input() {
    for (w, h) in [(1, 7), (7, 1), (64, 3), (5, 5)] {
        let out = sat(&Grid::new(w, h));
        assert_eq!((out.width(), out.height(), out.len()), (w, h, w * h));
    }
}

#[test]
fn saturation_never_wraps() {
    // Large enough that every true sum past the first few cells overflows u8
    // many times over.
    let input = pseudo_random(200, 200, 11, 255);
    let out = sat(&input);
    assert_eq!(out.get(199, 199), MAX_VALUE);
    assert!(out.as_slice().iter().filter(|&&v| v == MAX_VALUE).count() > 39_000);
}

#[test]
fn repeated_generate_identical() {
    let input = pseudo_random(40, 25, 21, 4);
    let engine = CpuEngine::new();
    let (a, _) = engine.generate(&input);
    let (b, _) = engine.generate(&input);
    assert_eq!(compare(&a, &b), Equivalence::Equal);
}

// ===== Engine abstraction =====

#[test]
fn engine_enum_matches_direct_call() {
    let input = pseudo_random(12, 8, 5, 9);
    let engine: Engine = CpuEngine::new().into();
    let run = engine::run(&engine, &input).unwrap();
    assert_eq!(run.engine, "CPU");
    assert_eq!(run.output, sat(&input));
}

#[test]
fn empty_grid_through_trait() {
    let (out, _) = SummedAreaTable::generate(&CpuEngine::new(), &Grid::empty()).unwrap();
    assert!(out.is_empty());
}

#[test]
fn compare_flags_single_cell_corruption() {
    let input = pseudo_random(10, 10, 8, 2);
    let good = sat(&input);
    let mut bad = good.clone();
    let v = bad.get(4, 6);
    bad.set(4, 6, v.wrapping_add(1));
    assert_eq!(
        compare(&good, &bad),
        Equivalence::Mismatch { index: 64, x: 4, y: 6, left: v, right: v.wrapping_add(1) }
    );
}
