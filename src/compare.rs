// compare.rs — Cross-validation of two engine outputs and their timings.
//
// The whole point of running both engines is this check: the GPU table must
// equal the CPU table cell for cell. The first mismatch is reported with its
// flat index, coordinates, and both values, which is usually enough to tell
// a missing barrier (whole columns wrong) from a stride bug (rows shifted).

use std::fmt;
use std::time::Duration;

use crate::grid::Grid;
use crate::value::Value;

/// Result of comparing two grids element-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equivalence {
    /// Same dimensions, same values.
    Equal,
    /// Different dimensions; values were not compared.
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    /// First differing cell in row-major order.
    Mismatch {
        index: usize,
        x: usize,
        y: usize,
        left: Value,
        right: Value,
    },
}

impl Equivalence {
    pub fn is_equal(&self) -> bool {
        matches!(self, Equivalence::Equal)
    }
}

impl fmt::Display for Equivalence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equivalence::Equal => write!(f, "outputs are identical"),
            Equivalence::DimensionMismatch { left, right } => write!(
                f,
                "output dimensions differ: {}×{} vs {}×{}",
                left.0, left.1, right.0, right.1
            ),
            Equivalence::Mismatch { index, x, y, left, right } => write!(
                f,
                "outputs differ at index {index} (x={x}, y={y}): {left} vs {right}"
            ),
        }
    }
}

/// Compare `left` and `right` cell by cell.
pub fn compare(left: &Grid, right: &Grid) -> Equivalence {
    if !left.same_shape(right) {
        return Equivalence::DimensionMismatch {
            left: (left.width(), left.height()),
            right: (right.width(), right.height()),
        };
    }

    let width = left.width().max(1);
    left.as_slice()
        .iter()
        .zip(right.as_slice())
        .position(|(a, b)| a != b)
        .map_or(Equivalence::Equal, |index| Equivalence::Mismatch {
            index,
            x: index % width,
            y: index / width,
            left: left.as_slice()[index],
            right: right.as_slice()[index],
        })
}

/// How much faster one engine was than the other.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedRatio {
    pub faster: &'static str,
    pub slower: &'static str,
    /// slower / faster, always ≥ 1.
    pub ratio: f64,
}

impl fmt::Display for SpeedRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was {:.2}x faster than {}", self.faster, self.ratio, self.slower)
    }
}

/// Ratio of the larger duration to the smaller, naming the faster engine.
///
/// A zero duration counts as one nanosecond so the ratio stays finite. Ties
/// favour `a`.
pub fn speed_ratio(a: &'static str, a_elapsed: Duration, b: &'static str, b_elapsed: Duration) -> SpeedRatio {
    let a_ns = a_elapsed.as_nanos().max(1) as f64;
    let b_ns = b_elapsed.as_nanos().max(1) as f64;
    if a_ns <= b_ns {
        SpeedRatio { faster: a, slower: b, ratio: b_ns / a_ns }
    } else {
        SpeedRatio { faster: b, slower: a, ratio: a_ns / b_ns }
    }
}
