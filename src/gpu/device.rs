// gpu/device.rs — wgpu device context.
//
// Responsibilities:
//   - Enumerate adapters on the primary backends and pick the best one.
//   - Hold the device, queue, and the workgroup size baked into every
//     sweep shader.
//   - `submit_and_wait` — the single way work reaches the queue. The host
//     blocks until that submission completes before returning, and the
//     completed-submission counter advances by one.
//   - `compile_shader` — read a WGSL file from disk and compile it, turning
//     naga diagnostics into `GpuError::ShaderCompile`.
//   - `scoped` — run resource-creation calls inside wgpu error scopes so
//     validation and out-of-memory failures come back as `Err`, not as the
//     default uncaptured-error panic.
//
// ADAPTER SELECTION:
// `request_adapter` may hand back a software rasteriser (llvmpipe, WARP)
// even when a real GPU exists. We enumerate explicitly and rank:
//   DiscreteGpu / IntegratedGpu  <- ideal
//   VirtualGpu / Other           <- acceptable (VM pass-through, dzn)
//   Cpu                          <- last resort, logged as a warning
//
// One `GpuDevice` is created at process start and passed by reference to
// every engine that needs it. It is expensive to create and owns no
// per-call state apart from the submission counter.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Placeholder token in WGSL sources replaced by the workgroup size.
///
/// naga does not accept `override` expressions inside `@workgroup_size()`,
/// so the size is substituted into the source text before compilation.
pub const WORKGROUP_SIZE_TOKEN: &str = "{{WG_SIZE}}";

/// Invocations per workgroup for the 1D sweep dispatches.
///
/// Each invocation owns one row (horizontal sweep) or one column (vertical
/// sweep), so a workgroup covers `threads` consecutive rows or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkgroupSize {
    pub threads: u32,
}

impl WorkgroupSize {
    /// 64 invocations: two NVIDIA warps, one AMD wave64.
    pub const DEFAULT: WorkgroupSize = WorkgroupSize { threads: 64 };

    /// Number of workgroups needed to give each of `items` rows/columns its
    /// own invocation. Ceiling division, so the shader must guard:
    /// ```wgsl
    /// if gid.x >= params.height { return; }
    /// ```
    pub fn dispatch_count(&self, items: u32) -> u32 {
        items.div_ceil(self.threads)
    }

    /// Substitute this size into a WGSL template.
    pub fn specialise(&self, template: &str) -> String {
        template.replace(WORKGROUP_SIZE_TOKEN, &self.threads.to_string())
    }
}

impl Default for WorkgroupSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for WorkgroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invocations", self.threads)
    }
}

/// Cached adapter information for logging.
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor: u32,
    pub device: u32,
    pub device_type: wgpu::DeviceType,
    pub backend: wgpu::Backend,
}

impl From<wgpu::AdapterInfo> for AdapterInfo {
    fn from(info: wgpu::AdapterInfo) -> Self {
        AdapterInfo {
            name: info.name,
            vendor: info.vendor,
            device: info.device,
            device_type: info.device_type,
            backend: info.backend,
        }
    }
}

impl fmt::Display for AdapterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.name, self.backend, self.device_type)
    }
}

/// The GPU context: adapter, device, queue, and dispatch configuration.
///
/// # Field drop order
/// Fields drop top to bottom. `_instance` is declared last so the
/// `wgpu::Instance` outlives `device` and `queue`; some Vulkan layers crash
/// when the instance goes first.
pub struct GpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: AdapterInfo,
    pub workgroup_size: WorkgroupSize,
    completed_submissions: AtomicU64,
    _instance: wgpu::Instance,
}

impl GpuDevice {
    /// Create a `GpuDevice` on the best adapter of the primary backends
    /// (Vulkan, Metal, DX12).
    pub fn new() -> Result<Self, GpuError> {
        Self::new_with_backends(wgpu::Backends::PRIMARY)
    }

    /// Create a `GpuDevice` restricted to the given backends.
    pub fn new_with_backends(backends: wgpu::Backends) -> Result<Self, GpuError> {
        pollster::block_on(Self::init_async(backends))
    }

    async fn init_async(backends: wgpu::Backends) -> Result<Self, GpuError> {
        // Validation layer in debug builds for shader error feedback.
        let flags = if cfg!(debug_assertions) {
            wgpu::InstanceFlags::VALIDATION
                | wgpu::InstanceFlags::ALLOW_UNDERLYING_NONCOMPLIANT_ADAPTER
        } else {
            wgpu::InstanceFlags::ALLOW_UNDERLYING_NONCOMPLIANT_ADAPTER
        };

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            flags,
            ..Default::default()
        });

        let adapters = instance.enumerate_adapters(backends);
        for a in &adapters {
            let info = a.get_info();
            debug!(name = %info.name, backend = ?info.backend, kind = ?info.device_type, "found adapter");
        }

        let adapter = adapters
            .into_iter()
            .min_by_key(|a| adapter_rank(a.get_info().device_type))
            .ok_or(GpuError::NoSuitableAdapter)?;

        let adapter_info = AdapterInfo::from(adapter.get_info());
        if adapter_info.device_type == wgpu::DeviceType::Cpu {
            warn!(adapter = %adapter_info, "only a software adapter is available; GPU timings will not be representative");
        }

        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("summed-area"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        info!(adapter = %adapter_info, "GPU device ready");

        Ok(GpuDevice {
            device,
            queue,
            adapter_info,
            workgroup_size: WorkgroupSize::DEFAULT,
            completed_submissions: AtomicU64::new(0),
            _instance: instance,
        })
    }

    /// Override the workgroup size, validating it against the device limits.
    ///
    /// Takes effect for pipelines compiled afterwards.
    pub fn set_workgroup_size(&mut self, threads: u32) -> Result<(), GpuError> {
        validate_workgroup_size(threads, &self.device.limits())?;
        self.workgroup_size = WorkgroupSize { threads };
        Ok(())
    }

    /// Largest width or height a surface may have on this device.
    pub fn max_surface_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Submissions that have completed on this device so far.
    ///
    /// Strictly increases by one per `submit_and_wait`.
    pub fn completed_submissions(&self) -> u64 {
        self.completed_submissions.load(Ordering::Acquire)
    }

    /// Finish `encoder`, submit it, and block until the device has executed
    /// it. Returns the new completed-submission count.
    ///
    /// Validation and out-of-memory errors raised while finishing or
    /// submitting are returned as `GpuError::Device` tagged with `stage`.
    pub fn submit_and_wait(
        &self,
        stage: &'static str,
        encoder: wgpu::CommandEncoder,
    ) -> Result<u64, GpuError> {
        let index = self.scoped(stage, || self.queue.submit(std::iter::once(encoder.finish())))?;

        // No timeout: a device that never signals hangs the process.
        self.device.poll(wgpu::Maintain::WaitForSubmissionIndex(index));

        let completed = self.completed_submissions.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(stage, completed, "submission complete");
        Ok(completed)
    }

    /// Run `f` inside validation and out-of-memory error scopes.
    ///
    /// Any error wgpu reports while `f` runs is returned as
    /// `GpuError::Device { stage, .. }`.
    pub fn scoped<T>(&self, stage: &'static str, f: impl FnOnce() -> T) -> Result<T, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        let validation = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());
        match validation.or(oom) {
            Some(err) => Err(GpuError::Device { stage, diagnostic: err.to_string() }),
            None => Ok(value),
        }
    }

    /// Read `dir/file_name`, specialise the workgroup size, and compile it.
    ///
    /// # Errors
    /// - `ShaderNotFound` if the file cannot be read.
    /// - `ShaderCompile` with naga's diagnostic text on a WGSL error.
    pub fn compile_shader(&self, dir: &Path, file_name: &str) -> Result<wgpu::ShaderModule, GpuError> {
        let path = dir.join(file_name);
        let template = std::fs::read_to_string(&path)
            .map_err(|source| GpuError::ShaderNotFound { path: path.clone(), source })?;
        let source = self.workgroup_size.specialise(&template);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(file_name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::ShaderCompile { path, diagnostic: err.to_string() });
        }

        debug!(path = %path.display(), workgroup = %self.workgroup_size, "compiled shader");
        Ok(module)
    }
}

impl fmt::Display for GpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GpuDevice {{ adapter: {}, workgroup: {} }}",
            self.adapter_info, self.workgroup_size
        )
    }
}

/// Lower is better. Software adapters are kept as a last resort.
fn adapter_rank(kind: wgpu::DeviceType) -> u8 {
    match kind {
        wgpu::DeviceType::DiscreteGpu => 0,
        wgpu::DeviceType::IntegratedGpu => 1,
        wgpu::DeviceType::VirtualGpu => 2,
        wgpu::DeviceType::Other => 3,
        wgpu::DeviceType::Cpu => 4,
    }
}

fn validate_workgroup_size(threads: u32, limits: &wgpu::Limits) -> Result<(), GpuError> {
    let max = limits
        .max_compute_invocations_per_workgroup
        .min(limits.max_compute_workgroup_size_x);
    if threads == 0 || threads > max {
        return Err(GpuError::WorkgroupTooLarge { total: threads, max });
    }
    Ok(())
}

// ============================================================
// Error type
// ============================================================

/// Errors from device setup, shader compilation, and command submission.
#[derive(Error, Debug)]
pub enum GpuError {
    /// No adapter on the requested backends.
    #[error("no GPU adapter found; check that a Vulkan, Metal, or DX12 driver is installed")]
    NoSuitableAdapter,

    /// wgpu device request failed (driver issue, unsupported limits, ...).
    #[error("device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Workgroup size is zero or exceeds the device's invocation limit.
    #[error("workgroup size {total} is outside the device limit of 1..={max} invocations")]
    WorkgroupTooLarge { total: u32, max: u32 },

    /// Shader source file missing or unreadable.
    #[error("could not read shader file {}: {source}", path.display())]
    ShaderNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// WGSL failed to compile.
    #[error("shader {} failed to compile:\n{diagnostic}", path.display())]
    ShaderCompile { path: PathBuf, diagnostic: String },

    /// Validation or out-of-memory error captured while creating resources
    /// or submitting work.
    #[error("device error during {stage}: {diagnostic}")]
    Device { stage: &'static str, diagnostic: String },

    /// Mapping the readback buffer failed (typically a lost device).
    #[error("readback map failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    /// Grid dimensions exceed what a 2D surface can hold on this device.
    #[error("grid {width}×{height} exceeds the device surface limit of {max}")]
    SurfaceTooLarge { width: usize, height: usize, max: u32 },
}

// ============================================================
// Tests
// ============================================================
