// Copyright @yucwang 2026

//! Particle tracing that records what a sensor sees: per-unit splat
//! buffers filled by capture workers and merged by a coordinator.

pub mod capture;
pub mod process;
pub mod tracer;
pub mod work_result;

pub use capture::CaptureParticleWorker;
pub use process::{CaptureParticleProcess, CaptureSettings};
pub use tracer::{ParticleEvent, ParticleHandler, ParticleTracer, ParticleTracerSettings};
pub use work_result::CaptureWorkResult;
