// config.rs — Compile-time limits and the per-run configuration.
//
// Limits follow the value domain: print caps are derived from the number of
// digits in MAX_VALUE so the printed table fits an 80-column console.

use std::path::PathBuf;

use crate::value::MAX_VALUE_DIGITS;

/// Widest row the parser accepts.
pub const INPUT_MAX_WIDTH: usize = 2048;

/// Most rows the parser accepts.
pub const INPUT_MAX_HEIGHT: usize = 2048;

/// Input file used when `--input` is not given.
pub const DEFAULT_INPUT_FILE: &str = "data/square_10_x_10.txt";

/// Directory searched for WGSL sources when `--shader-dir` is not given.
pub const DEFAULT_SHADER_DIR: &str = "shaders";

/// Target console width for printed grids.
pub const PRINT_CONSOLE_WIDTH: usize = 80;

/// Room reserved at the end of a printed row for the truncation marker.
pub const PRINT_ELLIPSIS_SIZE: usize = 7;

/// Printed column width: the widest value plus one separating space.
pub const PRINT_CELL_WIDTH: usize = MAX_VALUE_DIGITS + 1;

/// Columns printed before a row is truncated.
pub const PRINT_MAX_WIDTH: usize = (PRINT_CONSOLE_WIDTH - PRINT_ELLIPSIS_SIZE) / PRINT_CELL_WIDTH;

/// Rows printed before the grid is truncated. Same as the column cap, for
/// symmetry.
pub const PRINT_MAX_HEIGHT: usize = PRINT_MAX_WIDTH;

/// Which engines a run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineSelection {
    Cpu,
    Gpu,
    /// Run both and cross-validate.
    Both,
}

impl EngineSelection {
    pub fn runs_cpu(self) -> bool {
        matches!(self, EngineSelection::Cpu | EngineSelection::Both)
    }

    pub fn runs_gpu(self) -> bool {
        matches!(self, EngineSelection::Gpu | EngineSelection::Both)
    }
}

/// Everything one invocation of the benchmark needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Text file holding the input grid.
    pub input: PathBuf,
    /// Directory holding `sat_horizontal.wgsl` and `sat_vertical.wgsl`.
    pub shader_dir: PathBuf,
    pub engines: EngineSelection,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            shader_dir: PathBuf::from(DEFAULT_SHADER_DIR),
            engines: EngineSelection::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_caps_fit_console() {
        // u8: 4-character cells, (80 - 7) / 4 = 18 columns.
        assert_eq!(PRINT_CELL_WIDTH, 4);
        assert_eq!(PRINT_MAX_WIDTH, 18);
        assert!(PRINT_MAX_WIDTH * PRINT_CELL_WIDTH + PRINT_ELLIPSIS_SIZE <= PRINT_CONSOLE_WIDTH);
    }

    #[test]
    fn test_default_run_config() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.input, PathBuf::from("data/square_10_x_10.txt"));
        assert_eq!(cfg.shader_dir, PathBuf::from("shaders"));
        assert!(cfg.engines.runs_cpu() && cfg.engines.runs_gpu());
    }

    #[test]
    fn test_engine_selection() {
        assert!(EngineSelection::Cpu.runs_cpu());
        assert!(!EngineSelection::Cpu.runs_gpu());
        assert!(EngineSelection::Gpu.runs_gpu());
        assert!(!EngineSelection::Gpu.runs_cpu());
    }
}
