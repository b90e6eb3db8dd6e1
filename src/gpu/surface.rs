// gpu/surface.rs — Device-resident grids and host↔device transfer.
//
// RESPONSIBILITIES
// ─────────────────
// 1. `InputSurface` — the input grid on the GPU as an `R8Uint` texture, one
//    Value per texel. Created by `InputSurface::upload`.
//
// 2. `SweepSurface` — an `R32Uint` texture written by a sweep shader
//    (storage binding) and read by the next one or by readback. The row-sum
//    intermediate and the final table are both SweepSurfaces.
//
// 3. `SweepSurface::readback` — copy the final table into a host-visible
//    buffer and unpack it into a fresh `Grid`.
//
//
// THE ROW-PITCH PROBLEM
// ──────────────────────
// A Grid is tightly packed: row y starts at byte `y * width`. wgpu buffer ↔
// texture copies require every buffer row to start on a multiple of
// `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT` (256 bytes):
//
//   Grid (width=3):      staging (padded_bytes_per_row=256):
//     [a b c]              [a b c _ _ ... _]   256 bytes
//     [d e f]              [d e f _ _ ... _]   256 bytes
//
// So a single flat memcpy only works when `width * bytes_per_cell` is
// already a multiple of 256. `RowPitch` computes the padded row size and
// `pack_rows` / `unpack_rows` offset-copy each row individually.
//
// The output surfaces hold 4 bytes per cell (`R32Uint`) because `r8uint` is
// not a core storage-texture format. The shaders already clamp to
// MAX_VALUE, so narrowing back to `Value` on readback is lossless.

use wgpu::util::DeviceExt;

use crate::gpu::device::{GpuDevice, GpuError};
use crate::grid::Grid;
use crate::value::{saturate, Accumulator, Value};

/// Buffer ↔ texture copies need rows aligned to this many bytes.
const COPY_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Input surface format: one `Value` per texel.
pub const INPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Uint;

/// Sweep surface format: one u32 per texel, storage-writable.
pub const SWEEP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Uint;

// ---------------------------------------------------------------------------
// Row pitch
// ---------------------------------------------------------------------------

/// Byte layout of one surface's rows inside a staging or readback buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPitch {
    /// Bytes of real data per row (`width * bytes_per_cell`).
    pub tight_bytes_per_row: u32,
    /// Bytes per row in the buffer, rounded up to `COPY_ALIGNMENT`.
    pub padded_bytes_per_row: u32,
    pub height: u32,
}

impl RowPitch {
    pub fn new(width: u32, height: u32, bytes_per_cell: u32) -> Self {
        let tight_bytes_per_row = width * bytes_per_cell;
        RowPitch {
            tight_bytes_per_row,
            padded_bytes_per_row: align_to(tight_bytes_per_row, COPY_ALIGNMENT),
            height,
        }
    }

    /// Total buffer size in bytes.
    pub fn buffer_size(&self) -> u64 {
        self.padded_bytes_per_row as u64 * self.height as u64
    }

    /// Whether rows need individual offset copies.
    pub fn is_padded(&self) -> bool {
        self.padded_bytes_per_row != self.tight_bytes_per_row
    }

    fn data_layout(&self) -> wgpu::ImageDataLayout {
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(self.padded_bytes_per_row),
            rows_per_image: Some(self.height),
        }
    }
}

/// Copy tightly packed rows into a buffer laid out with `pitch`.
/// Padding bytes are left zero.
pub fn pack_rows(tight: &[u8], pitch: RowPitch) -> Vec<u8> {
    let tight_row = pitch.tight_bytes_per_row as usize;
    let padded_row = pitch.padded_bytes_per_row as usize;
    debug_assert_eq!(tight.len(), tight_row * pitch.height as usize);

    if !pitch.is_padded() {
        return tight.to_vec();
    }

    let mut staging = vec![0u8; pitch.buffer_size() as usize];
    for (src, dst) in tight.chunks_exact(tight_row).zip(staging.chunks_exact_mut(padded_row)) {
        dst[..tight_row].copy_from_slice(src);
    }
    staging
}

/// Strip the row padding from a buffer laid out with `pitch`, calling
/// `row_fn(y, row_bytes)` for each row's real bytes.
pub fn unpack_rows(padded: &[u8], pitch: RowPitch, mut row_fn: impl FnMut(usize, &[u8])) {
    let tight_row = pitch.tight_bytes_per_row as usize;
    let padded_row = pitch.padded_bytes_per_row as usize;
    for (y, row) in padded.chunks_exact(padded_row).take(pitch.height as usize).enumerate() {
        row_fn(y, &row[..tight_row]);
    }
}

// ---------------------------------------------------------------------------
// InputSurface
// ---------------------------------------------------------------------------

/// The input grid resident on the GPU as an `R8Uint` texture.
///
/// Dropping it releases the texture.
pub struct InputSurface {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl InputSurface {
    /// Upload `grid` and block until the copy has executed.
    ///
    /// Returns only after the device signals completion, so the upload is
    /// never counted in a later timed submission.
    ///
    /// # Panics
    /// Panics on an empty grid; zero-sized textures are invalid.
    pub fn upload(gpu: &GpuDevice, grid: &Grid) -> Result<Self, GpuError> {
        assert!(!grid.is_empty(), "cannot upload an empty grid");
        let width = grid.width() as u32;
        let height = grid.height() as u32;
        let size = extent(width, height);

        let pitch = RowPitch::new(width, height, std::mem::size_of::<Value>() as u32);
        let staging = pack_rows(grid.as_slice(), pitch);
        tracing::debug!(width, height, padded_bytes_per_row = pitch.padded_bytes_per_row, "uploading input grid");

        let (texture, staging_buf) = gpu.scoped("input surface allocation", || {
            let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("InputSurface"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: INPUT_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let staging_buf = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("InputSurface::staging"),
                contents: &staging,
                usage: wgpu::BufferUsages::COPY_SRC,
            });
            (texture, staging_buf)
        })?;

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("InputSurface::upload"),
        });
        encoder.copy_buffer_to_texture(
            wgpu::ImageCopyBuffer { buffer: &staging_buf, layout: pitch.data_layout() },
            whole_texture(&texture),
            size,
        );
        gpu.submit_and_wait("upload", encoder)?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(InputSurface { texture, view, width, height })
    }
}

// ---------------------------------------------------------------------------
// SweepSurface
// ---------------------------------------------------------------------------

/// An `R32Uint` texture written by one sweep and read by the next pass or by
/// readback.
pub struct SweepSurface {
    pub texture: wgpu::Texture,
    /// Bound as `texture_2d<u32>` when this surface is a sweep's source.
    pub read_view: wgpu::TextureView,
    /// Bound as `texture_storage_2d<r32uint, write>` when it is a target.
    pub write_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl SweepSurface {
    pub fn new(gpu: &GpuDevice, width: u32, height: u32, label: &str) -> Result<Self, GpuError> {
        let texture = gpu.scoped("sweep surface allocation", || {
            gpu.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: extent(width, height),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: SWEEP_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::STORAGE_BINDING
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        })?;
        let read_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let write_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(SweepSurface { texture, read_view, write_view, width, height })
    }

    /// Copy the surface to a host-visible buffer, wait for it, and unpack it
    /// into a new `Grid` of the surface's dimensions.
    pub fn readback(&self, gpu: &GpuDevice) -> Result<Grid, GpuError> {
        let cell_bytes = std::mem::size_of::<u32>() as u32;
        let pitch = RowPitch::new(self.width, self.height, cell_bytes);

        let readback_buf = gpu.scoped("readback allocation", || {
            gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("SweepSurface::readback"),
                size: pitch.buffer_size(),
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("SweepSurface::readback"),
        });
        encoder.copy_texture_to_buffer(
            whole_texture(&self.texture),
            wgpu::ImageCopyBuffer { buffer: &readback_buf, layout: pitch.data_layout() },
            extent(self.width, self.height),
        );
        gpu.submit_and_wait("readback", encoder)?;

        let slice = readback_buf.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver outlives the poll below; a failed send only means
            // the caller already gave up.
            let _ = sender.send(result);
        });
        gpu.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| GpuError::Device {
                stage: "readback",
                diagnostic: "map callback never fired".into(),
            })??;

        let mut grid = Grid::new(self.width as usize, self.height as usize);
        {
            let mapped = slice.get_mapped_range();
            unpack_rows(&mapped, pitch, |y, bytes| {
                // Row starts are 256-byte aligned, so the cast cannot fail.
                let cells: &[u32] = bytemuck::cast_slice(bytes);
                for (dst, &src) in grid.row_mut(y).iter_mut().zip(cells) {
                    *dst = saturate(src as Accumulator);
                }
            });
        }
        readback_buf.unmap();

        Ok(grid)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round `value` up to the next multiple of `alignment`.
///
///   align_to(100, 256) = 256
///   align_to(256, 256) = 256
///   align_to(257, 256) = 512
#[inline]
pub(crate) fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d { width, height, depth_or_array_layers: 1 }
}

fn whole_texture(texture: &wgpu::Texture) -> wgpu::ImageCopyTexture<'_> {
    wgpu::ImageCopyTexture {
        texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
