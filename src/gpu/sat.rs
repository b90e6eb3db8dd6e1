// gpu/sat.rs — Two-pass separable summed-area table on the GPU.
//
// A 2D inclusive prefix sum is separable:
//
//   input            horizontal sweep       vertical sweep
//   [1 1 1]          [1 2 3]                [1 2 3]
//   [1 1 1]   ──►    [1 2 3]         ──►    [2 4 6]
//   [1 1 1]          [1 2 3]                [3 6 9]
//
// Rows are independent in the first sweep and columns in the second, so
// each maps to a 1D dispatch with one invocation per row or column.
//
//
// PER-CALL SEQUENCE
// ──────────────────
//   1. upload      InputSurface::upload        submit → wait
//   2. horizontal  compute pass #1  input → row_sums
//   3. barrier     pass boundary: row_sums goes STORAGE write → sampled read
//   4. vertical    compute pass #2  row_sums → table
//                  (2–4 in one submission)     submit → wait   ◄── timed
//   5. readback    SweepSurface::readback      submit → wait
//
// Step 3 is the one synchronisation the algorithm depends on. wgpu tracks
// texture usage per pass; recording the sweeps as two separate passes makes
// it emit the memory barrier on `row_sums` between them. Folding both
// dispatches into one pass would let the vertical sweep read stale rows.
//
//
// PIPELINE LIFETIME
// ─────────────────
// `GpuSatPipeline` compiles both shaders once. `GpuEngine::generate`
// allocates surfaces per call; they drop at the end of the call, on the error
// path included.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::gpu::device::{GpuDevice, GpuError};
use crate::gpu::surface::{InputSurface, SweepSurface, SWEEP_FORMAT};
use crate::grid::Grid;
use crate::value::MAX_VALUE;

/// WGSL source of the row sweep, looked up in the shader directory.
pub const HORIZONTAL_SHADER: &str = "sat_horizontal.wgsl";

/// WGSL source of the column sweep.
pub const VERTICAL_SHADER: &str = "sat_vertical.wgsl";

// ---------------------------------------------------------------------------
// Uniform params (must match WGSL struct SweepParams exactly)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SweepParams {
    width:     u32,
    height:    u32,
    max_value: u32,
    _pad:      u32,
}

// ---------------------------------------------------------------------------
// GpuSatPipeline
// ---------------------------------------------------------------------------

/// Both sweep pipelines plus the bind group layout they share.
///
/// Binding layout (identical in both shaders):
///   0 — source surface, `texture_2d<u32>`
///   1 — destination surface, `texture_storage_2d<r32uint, write>`
///   2 — `SweepParams` uniform
pub struct GpuSatPipeline {
    horizontal: wgpu::ComputePipeline,
    vertical:   wgpu::ComputePipeline,
    bgl:        wgpu::BindGroupLayout,
}

impl GpuSatPipeline {
    /// Compile `sat_horizontal.wgsl` and `sat_vertical.wgsl` from
    /// `shader_dir` and build both compute pipelines.
    pub fn new(gpu: &GpuDevice, shader_dir: &Path) -> Result<Self, GpuError> {
        let horizontal_module = gpu.compile_shader(shader_dir, HORIZONTAL_SHADER)?;
        let vertical_module = gpu.compile_shader(shader_dir, VERTICAL_SHADER)?;

        gpu.scoped("pipeline creation", || {
            let bgl = gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("GpuSat BGL"),
                entries: &[
                    // 0 — source surface
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Uint,
                        },
                        count: None,
                    },
                    // 1 — destination surface (storage write)
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: SWEEP_FORMAT,
                            view_dimension: wgpu::TextureViewDimension::D2,
                        },
                        count: None,
                    },
                    // 2 — params uniform
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

            let layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("GpuSat pipeline layout"),
                bind_group_layouts: &[&bgl],
                push_constant_ranges: &[],
            });

            let make = |module: &wgpu::ShaderModule, entry_point: &str| {
                gpu.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label:               Some(entry_point),
                    layout:              Some(&layout),
                    module,
                    entry_point,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    cache:               None,
                })
            };
            let horizontal = make(&horizontal_module, "horizontal_sweep");
            let vertical = make(&vertical_module, "vertical_sweep");

            GpuSatPipeline { horizontal, vertical, bgl }
        })
    }

    fn bind_group(
        &self,
        gpu:    &GpuDevice,
        label:  &str,
        src:    &wgpu::TextureView,
        dst:    &SweepSurface,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:  Some(label),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(src) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&dst.write_view) },
                wgpu::BindGroupEntry { binding: 2, resource: params.as_entire_binding() },
            ],
        })
    }
}

// ---------------------------------------------------------------------------
// GpuEngine
// ---------------------------------------------------------------------------

/// Summed-area table engine running the separable algorithm on a GPU.
///
/// Borrows the process-wide `GpuDevice`; owns its compiled pipelines.
pub struct GpuEngine<'a> {
    gpu:      &'a GpuDevice,
    pipeline: GpuSatPipeline,
}

impl<'a> GpuEngine<'a> {
    /// Compile the sweep shaders from `shader_dir`. This is the one-time
    /// setup excluded from every `generate` timing.
    pub fn new(gpu: &'a GpuDevice, shader_dir: &Path) -> Result<Self, GpuError> {
        let pipeline = GpuSatPipeline::new(gpu, shader_dir)?;
        info!(gpu = %gpu, "GPU engine ready");
        Ok(GpuEngine { gpu, pipeline })
    }

    pub fn device(&self) -> &GpuDevice {
        self.gpu
    }

    /// Compute the summed-area table of `input`.
    ///
    /// Returns the table and the time spent in the sweep submission alone;
    /// upload, surface allocation, and readback are outside the measurement.
    pub fn generate(&self, input: &Grid) -> Result<(Grid, Duration), GpuError> {
        if input.is_empty() {
            return Ok((Grid::empty(), Duration::ZERO));
        }

        let gpu = self.gpu;
        let max = gpu.max_surface_dimension();
        let (width, height) = match (u32::try_from(input.width()), u32::try_from(input.height())) {
            (Ok(w), Ok(h)) if w <= max && h <= max => (w, h),
            _ => {
                return Err(GpuError::SurfaceTooLarge {
                    width: input.width(),
                    height: input.height(),
                    max,
                })
            }
        };

        // 1. Upload (waits for completion).
        let source = InputSurface::upload(gpu, input)?;
        let row_sums = SweepSurface::new(gpu, width, height, "GpuSat row sums")?;
        let table = SweepSurface::new(gpu, width, height, "GpuSat table")?;

        let params = SweepParams { width, height, max_value: MAX_VALUE as u32, _pad: 0 };
        let (params_buf, horizontal_bg, vertical_bg) = gpu.scoped("bind groups", || {
            let params_buf = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label:    Some("GpuSat params"),
                contents: bytemuck::bytes_of(&params),
                usage:    wgpu::BufferUsages::UNIFORM,
            });
            let horizontal_bg =
                self.pipeline.bind_group(gpu, "horizontal_sweep BG", &source.view, &row_sums, &params_buf);
            let vertical_bg =
                self.pipeline.bind_group(gpu, "vertical_sweep BG", &row_sums.read_view, &table, &params_buf);
            (params_buf, horizontal_bg, vertical_bg)
        })?;

        // 2–4. Both sweeps in one submission, timed end to end.
        let ws = gpu.workgroup_size;
        let start = Instant::now();
        let mut encoder = gpu.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("GpuSat sweeps") },
        );
        {
            let mut pass = encoder.begin_compute_pass(
                &wgpu::ComputePassDescriptor { label: Some("horizontal_sweep"), timestamp_writes: None },
            );
            pass.set_pipeline(&self.pipeline.horizontal);
            pass.set_bind_group(0, &horizontal_bg, &[]);
            pass.dispatch_workgroups(ws.dispatch_count(height), 1, 1);
        }
        // Pass boundary: row_sums switches from storage write to sampled
        // read, and wgpu inserts the barrier here.
        {
            let mut pass = encoder.begin_compute_pass(
                &wgpu::ComputePassDescriptor { label: Some("vertical_sweep"), timestamp_writes: None },
            );
            pass.set_pipeline(&self.pipeline.vertical);
            pass.set_bind_group(0, &vertical_bg, &[]);
            pass.dispatch_workgroups(ws.dispatch_count(width), 1, 1);
        }
        gpu.submit_and_wait("sweeps", encoder)?;
        let elapsed = start.elapsed();

        // 5. Readback (waits for completion).
        let output = table.readback(gpu)?;
        drop(params_buf);
        if !output.same_shape(input) {
            return Err(GpuError::Device {
                stage: "readback",
                diagnostic: format!(
                    "read back {}×{} for a {}×{} input",
                    output.width(),
                    output.height(),
                    input.width(),
                    input.height()
                ),
            });
        }

        debug!(width, height, ?elapsed, "GPU summed-area table generated");
        Ok((output, elapsed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
