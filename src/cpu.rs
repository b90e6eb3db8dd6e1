// cpu.rs — Sequential summed-area table, the reference every GPU result is
// validated against.
//
// Standard inclusion–exclusion recurrence, scanned row-major:
//
//   out[y][x] = in[y][x] + out[y][x-1] + out[y-1][x] - out[y-1][x-1]
//
//        x-1   x
//   y-1 [ D ][ B ]      B + C counts D twice,
//   y   [ C ][ ● ]      so D is subtracted once.
//
// `out[y][x-1]` and `out[y-1][x]` must be final before (x, y) is computed,
// which row-major, left-to-right order guarantees.
//
// OVERFLOW: the sum is built in `Accumulator` (u64) with the additions done
// before the subtraction, then clamped once. Clamped neighbours still give
// the clamped true sum: if any neighbour is at MAX_VALUE, the true sum at
// (x, y) is at least that large too, and B ≥ D always holds, so the
// subtraction never underflows.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::grid::Grid;
use crate::value::{saturate, Accumulator};

/// Single-threaded summed-area table engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEngine;

impl CpuEngine {
    pub fn new() -> Self {
        CpuEngine
    }

    /// Compute the summed-area table of `input`.
    ///
    /// The returned duration covers the scan only, not the output allocation.
    pub fn generate(&self, input: &Grid) -> (Grid, Duration) {
        let mut output = Grid::new(input.width(), input.height());

        let start = Instant::now();
        summed_area_into(input, &mut output);
        let elapsed = start.elapsed();

        debug!(width = input.width(), height = input.height(), ?elapsed, "CPU summed-area table generated");
        (output, elapsed)
    }
}

/// Fill `output` with the saturated summed-area table of `input`.
///
/// # Panics
/// Panics if the grids differ in shape.
pub fn summed_area_into(input: &Grid, output: &mut Grid) {
    assert!(
        input.same_shape(output),
        "output {}×{} does not match input {}×{}",
        output.width(),
        output.height(),
        input.width(),
        input.height(),
    );
    let width = input.width();
    let src = input.as_slice();
    let dst = output.as_mut_slice();

    for y in 0..input.height() {
        for x in 0..width {
            let i = y * width + x;
            let mut sum = src[i] as Accumulator;
            if x > 0 {
                sum += dst[i - 1] as Accumulator;
            }
            if y > 0 {
                sum += dst[i - width] as Accumulator;
            }
            if x > 0 && y > 0 {
                sum -= dst[i - width - 1] as Accumulator;
            }
            dst[i] = saturate(sum);
        }
    }
}
