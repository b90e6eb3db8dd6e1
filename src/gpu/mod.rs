// gpu/mod.rs — GPU summed-area table engine (wgpu compute).
//
// The CPU engine in `crate::cpu` remains the authoritative reference. Every
// GPU result is validated against it value-for-value.
//
// Layering:
//
//   device   adapter/device/queue bootstrap, error scopes, submit-and-wait,
//            shader loading from the shader directory
//   surface  input texture upload, sweep surfaces, padded-row readback
//   sat      the two sweep pipelines and GpuEngine::generate
//
// One host thread drives the device and blocks after every submission, so
// upload, compute, and readback never overlap.

pub mod device;
pub mod surface;
pub mod sat;
