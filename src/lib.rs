// summed-area: summed-area tables (2D inclusive prefix sums) on CPU and GPU
//
// The CPU engine is the reference; the wgpu engine computes the same table
// as two separable sweeps and is cross-validated against it cell for cell.
// Values saturate at MAX_VALUE on both engines instead of wrapping.

pub mod value;
pub mod grid;
pub mod config;
pub mod error;
pub mod parser;
pub mod print;
pub mod cpu;
pub mod engine;
pub mod compare;
pub mod gpu;

pub use cpu::CpuEngine;
pub use engine::{Engine, EngineRun, SummedAreaTable};
pub use error::{Result, SatError};
pub use gpu::device::{GpuDevice, GpuError};
pub use gpu::sat::GpuEngine;
pub use grid::Grid;
pub use value::{Accumulator, Value, MAX_VALUE};
