// engine.rs — One interface over both summed-area table engines.
//
// Callers that only want "a table and how long the math took" use the
// `SummedAreaTable` trait. Callers that pick the engine at runtime (the CLI)
// hold an `Engine`, a closed enum with exactly the CPU and GPU variants.
//
// Timing contract: the Duration returned by `generate` covers the numerical
// work only. Device init and shader compilation happen in the constructors;
// GPU upload and readback happen inside `generate` but outside the timer.

use std::time::Duration;

use crate::cpu::CpuEngine;
use crate::error::Result;
use crate::gpu::sat::GpuEngine;
use crate::grid::Grid;

/// A summed-area table generator.
pub trait SummedAreaTable {
    /// Short engine name for reports ("CPU", "GPU").
    fn name(&self) -> &'static str;

    /// Compute the saturated summed-area table of `input`.
    ///
    /// The output has the same dimensions as `input`; `input` is not
    /// modified. The Duration excludes setup and transfer.
    fn generate(&self, input: &Grid) -> Result<(Grid, Duration)>;
}

impl SummedAreaTable for CpuEngine {
    fn name(&self) -> &'static str {
        "CPU"
    }

    fn generate(&self, input: &Grid) -> Result<(Grid, Duration)> {
        Ok(CpuEngine::generate(self, input))
    }
}

impl SummedAreaTable for GpuEngine<'_> {
    fn name(&self) -> &'static str {
        "GPU"
    }

    fn generate(&self, input: &Grid) -> Result<(Grid, Duration)> {
        Ok(GpuEngine::generate(self, input)?)
    }
}

/// Either engine, selected explicitly by the caller.
pub enum Engine<'a> {
    Cpu(CpuEngine),
    Gpu(GpuEngine<'a>),
}

impl SummedAreaTable for Engine<'_> {
    fn name(&self) -> &'static str {
        match self {
            Engine::Cpu(e) => SummedAreaTable::name(e),
            Engine::Gpu(e) => SummedAreaTable::name(e),
        }
    }

    fn generate(&self, input: &Grid) -> Result<(Grid, Duration)> {
        match self {
            Engine::Cpu(e) => SummedAreaTable::generate(e, input),
            Engine::Gpu(e) => SummedAreaTable::generate(e, input),
        }
    }
}

impl From<CpuEngine> for Engine<'_> {
    fn from(engine: CpuEngine) -> Self {
        Engine::Cpu(engine)
    }
}

impl<'a> From<GpuEngine<'a>> for Engine<'a> {
    fn from(engine: GpuEngine<'a>) -> Self {
        Engine::Gpu(engine)
    }
}

/// Output of one engine run, kept for printing and cross-validation.
#[derive(Debug, Clone)]
pub struct EngineRun {
    pub engine: &'static str,
    pub output: Grid,
    pub elapsed: Duration,
}

/// Run `engine` on `input` and record the result under its name.
pub fn run<E: SummedAreaTable + ?Sized>(engine: &E, input: &Grid) -> Result<EngineRun> {
    let (output, elapsed) = engine.generate(input)?;
    tracing::info!(engine = engine.name(), width = output.width(), height = output.height(), ?elapsed, "table generated");
    Ok(EngineRun { engine: engine.name(), output, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_enum_dispatches_to_cpu() {
        let engine: Engine = CpuEngine::new().into();
        assert_eq!(engine.name(), "CPU");
        let (out, _) = engine.generate(&Grid::filled(3, 3, 1)).unwrap();
        assert_eq!(out.row(2), &[3, 6, 9]);
    }

    #[test]
    fn test_run_records_name_and_output() {
        let input = Grid::from_vec(2, 1, vec![4, 5]);
        let run = run(&CpuEngine::new(), &input).unwrap();
        assert_eq!(run.engine, "CPU");
        assert_eq!(run.output.as_slice(), &[4, 9]);
    }

    #[test]
    fn test_trait_object_usable() {
        let engines: Vec<Box<dyn SummedAreaTable>> = vec![Box::new(CpuEngine::new())];
        for e in &engines {
            let (out, _) = e.generate(&Grid::from_vec(1, 1, vec![5])).unwrap();
            assert_eq!(out.as_slice(), &[5]);
        }
    }
}
