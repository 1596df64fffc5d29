// Copyright @yucwang 2026

use crate::core::error::RenderResult;
use crate::core::filter::ReconstructionFilter;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Contiguous slice `[start, start + size)` of sample indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeWorkUnit {
    start: u64,
    size: u64,
}

impl RangeWorkUnit {
    pub fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// One past the last index.
    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    pub fn save<W: Write>(&self, stream: &mut W) -> io::Result<()> {
        stream.write_u64::<LittleEndian>(self.start)?;
        stream.write_u64::<LittleEndian>(self.size)
    }

    pub fn load<R: Read>(&mut self, stream: &mut R) -> io::Result<()> {
        self.start = stream.read_u64::<LittleEndian>()?;
        self.size = stream.read_u64::<LittleEndian>()?;
        Ok(())
    }
}

/// Split `[0, total)` into at most `unit_count` contiguous ranges. All
/// ranges get `total / n` samples and the last one also takes the
/// remainder. The unit count is clamped to `total`, so no range is empty.
pub fn partition(total: u64, unit_count: usize) -> Vec<RangeWorkUnit> {
    let n = (unit_count as u64).min(total);
    if n == 0 {
        return Vec::new();
    }

    let base = total / n;
    let mut units = Vec::with_capacity(n as usize);
    let mut start = 0;
    for i in 0..n {
        let size = if i + 1 == n { total - start } else { base };
        units.push(RangeWorkUnit::new(start, size));
        start += size;
    }
    units
}

/// Split `[0, total)` into consecutive ranges of exactly `unit_size`
/// samples; the last range holds whatever is left and may be shorter.
pub fn partition_by_size(total: u64, unit_size: u64) -> Vec<RangeWorkUnit> {
    if total == 0 || unit_size == 0 {
        return Vec::new();
    }

    let mut units = Vec::with_capacity(((total + unit_size - 1) / unit_size) as usize);
    let mut start = 0;
    while start < total {
        let size = unit_size.min(total - start);
        units.push(RangeWorkUnit::new(start, size));
        start += size;
    }
    units
}

/// Shared stop flag, polled once per sample by workers.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Completed,
    Cancelled,
}

/// Partial output of one work unit, transportable as bytes. `load` fills
/// a result that was created with the same shape.
pub trait WorkResult: Send {
    fn save<W: Write>(&self, stream: &mut W) -> io::Result<()>;
    fn load<R: Read>(&mut self, stream: &mut R) -> io::Result<()>;
}

/// Resources bound to every worker before it processes anything.
#[derive(Clone)]
pub struct WorkResources {
    pub scene: Arc<dyn Scene>,
    pub sensor: Arc<dyn Sensor>,
    pub filter: Arc<dyn ReconstructionFilter>,
}

pub trait WorkProcessor: Send {
    type Result: WorkResult;

    /// Bind the shared resources. Called once per worker lifetime.
    fn prepare(&mut self, resources: &WorkResources) -> RenderResult<()>;

    fn create_work_result(&self) -> RenderResult<Self::Result>;

    fn process(&mut self,
               unit: &RangeWorkUnit,
               result: &mut Self::Result,
               cancel: &CancellationToken) -> RenderResult<ProcessStatus>;

    /// Unprepared copy sharing only the configuration.
    fn clone_fresh(&self) -> Self where Self: Sized;
}

/// Coordinator side of a parallel job.
pub trait ParallelProcess: Sync {
    type Worker: WorkProcessor;

    fn bind_resources(&self, resources: &WorkResources) -> RenderResult<()>;

    fn create_work_processor(&self) -> Self::Worker;

    fn generate_work(&self, worker_slots: usize) -> RenderResult<Vec<RangeWorkUnit>>;

    fn process_result(&self,
                      result: &<Self::Worker as WorkProcessor>::Result,
                      cancelled: bool) -> RenderResult<()>;
}

/// Receives every freshly developed preview. Called while the coordinator
/// lock is held, so implementations must not call back into it.
pub trait PreviewObserver: Send + Sync {
    fn refresh(&self, preview: &Bitmap, received_samples: u64);
}
