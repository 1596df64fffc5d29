// Copyright @yucwang 2026

use crate::core::error::{RenderError, RenderResult};
use crate::core::work::{CancellationToken, ParallelProcess, ProcessStatus, WorkProcessor, WorkResources, WorkResult};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::io::Cursor;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// How finished work results reach the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTransport {
    /// Worker threads merge their results directly.
    InProcess,
    /// Results are saved to bytes, sent over a channel and loaded again on
    /// the coordinating thread, the way a remote worker would deliver them.
    Serialized,
}

impl FromStr for ResultTransport {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inprocess" | "local" => Ok(ResultTransport::InProcess),
            "serialized" | "remote" => Ok(ResultTransport::Serialized),
            _ => Err(RenderError::Parse(format!("unknown result transport {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub units_total: usize,
    pub units_merged: usize,
    pub units_cancelled: usize,
    pub samples_merged: u64,
}

impl RenderStats {
    /// Units never started because the job was cancelled.
    pub fn units_skipped(&self) -> usize {
        self.units_total - self.units_merged - self.units_cancelled
    }
}

#[derive(Default)]
struct StatsCounter {
    merged: AtomicUsize,
    cancelled: AtomicUsize,
    samples: AtomicU64,
}

impl StatsCounter {
    fn record(&self, was_cancelled: bool, samples: u64) {
        if was_cancelled {
            self.cancelled.fetch_add(1, Ordering::Relaxed);
        } else {
            self.merged.fetch_add(1, Ordering::Relaxed);
            self.samples.fetch_add(samples, Ordering::Relaxed);
        }
    }
}

/// Runs a parallel process on a pool of scoped threads of this process.
pub struct LocalScheduler {
    threads: usize,
    transport: ResultTransport,
    show_progress: bool,
}

impl LocalScheduler {
    /// `threads == 0` uses every available core.
    pub fn new(threads: usize) -> Self {
        let threads = if threads == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            threads
        };
        Self { threads, transport: ResultTransport::InProcess, show_progress: false }
    }

    pub fn with_transport(mut self, transport: ResultTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn transport(&self) -> ResultTransport {
        self.transport
    }

    pub fn run<P: ParallelProcess>(&self,
                                   process: &P,
                                   resources: &WorkResources,
                                   cancel: &CancellationToken) -> RenderResult<RenderStats> {
        process.bind_resources(resources)?;
        let units = process.generate_work(self.threads)?;
        let units_total = units.len();
        if units.is_empty() {
            warn!("Nothing to render: the job produced no work units.");
            return Ok(RenderStats::default());
        }

        let thread_count = self.threads.min(units_total);
        info!("Dispatching {} work units to {} threads ({:?} results).", units_total, thread_count, self.transport);

        let template = process.create_work_processor();
        let mut receiver = template.clone_fresh();
        if self.transport == ResultTransport::Serialized {
            receiver.prepare(resources)?;
        }

        let progress = if self.show_progress {
            let bar = ProgressBar::new(units_total as u64);
            bar.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} units")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let next_unit = AtomicUsize::new(0);
        let counter = StatsCounter::default();
        let transport = self.transport;

        let outcome = thread::scope(|scope| -> RenderResult<()> {
            let (tx, rx) = mpsc::channel::<(Vec<u8>, bool, u64)>();
            let mut handles = Vec::with_capacity(thread_count);
            for _ in 0..thread_count {
                let mut worker = template.clone_fresh();
                let tx = tx.clone();
                let (units, next_unit, counter, progress) = (&units, &next_unit, &counter, &progress);
                handles.push(scope.spawn(move || -> RenderResult<()> {
                    worker.prepare(resources)?;
                    while !cancel.is_cancelled() {
                        let index = next_unit.fetch_add(1, Ordering::Relaxed);
                        if index >= units.len() {
                            break;
                        }
                        let unit = &units[index];
                        let mut result = worker.create_work_result()?;
                        let was_cancelled = worker.process(unit, &mut result, cancel)? == ProcessStatus::Cancelled;
                        match transport {
                            ResultTransport::InProcess => {
                                process.process_result(&result, was_cancelled)?;
                                counter.record(was_cancelled, unit.size());
                            }
                            ResultTransport::Serialized => {
                                let mut bytes = Vec::new();
                                result.save(&mut bytes)?;
                                if tx.send((bytes, was_cancelled, unit.size())).is_err() {
                                    break;
                                }
                            }
                        }
                        progress.inc(1);
                    }
                    Ok(())
                }));
            }
            drop(tx);

            let mut received: RenderResult<()> = Ok(());
            if transport == ResultTransport::Serialized {
                received = (|| -> RenderResult<()> {
                    for (bytes, was_cancelled, samples) in rx.iter() {
                        let mut staging = receiver.create_work_result()?;
                        staging.load(&mut Cursor::new(bytes))?;
                        process.process_result(&staging, was_cancelled)?;
                        counter.record(was_cancelled, samples);
                    }
                    Ok(())
                })();
            }
            drop(rx);

            let mut joined: RenderResult<()> = Ok(());
            for handle in handles {
                let status = handle.join().map_err(|_| RenderError::WorkerPanic).and_then(|r| r);
                if joined.is_ok() {
                    joined = status;
                }
            }
            received.and(joined)
        });
        progress.finish_and_clear();
        outcome?;

        let stats = RenderStats {
            units_total,
            units_merged: counter.merged.load(Ordering::Relaxed),
            units_cancelled: counter.cancelled.load(Ordering::Relaxed),
            samples_merged: counter.samples.load(Ordering::Relaxed),
        };
        if cancel.is_cancelled() {
            info!("Job cancelled: {} of {} units merged, {} dropped.", stats.units_merged, units_total, stats.units_cancelled);
        } else {
            info!("Job finished: {} units, {} samples merged.", stats.units_merged, stats.samples_merged);
        }
        Ok(stats)
    }
}
