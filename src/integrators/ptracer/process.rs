// Copyright @yucwang 2026

use super::capture::CaptureParticleWorker;
use super::tracer::ParticleTracerSettings;
use super::work_result::CaptureWorkResult;
use crate::core::error::{RenderError, RenderResult};
use crate::core::sensor::Sensor;
use crate::core::work::{partition, partition_by_size, ParallelProcess, PreviewObserver, RangeWorkUnit, WorkResources};
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2u, Vector4f};

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Units handed out per worker slot when no granularity is configured.
const UNITS_PER_SLOT: usize = 4;

/// Job-level settings of a capture process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub tracer: ParticleTracerSettings,
    /// Total particles; 0 means crop pixels times `samples_per_pixel`.
    pub sample_count: u64,
    pub samples_per_pixel: u64,
    /// Particles per work unit, the last unit taking what is left; 0
    /// splits the budget evenly over the worker slots.
    pub granularity: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            tracer: ParticleTracerSettings::default(),
            sample_count: 0,
            samples_per_pixel: 1,
            granularity: 0,
        }
    }
}

struct Accumulation {
    crop_size: Vector2u,
    accum: Bitmap,
    developed: Bitmap,
    received: u64,
}

impl Accumulation {
    fn new(crop_size: Vector2u) -> Self {
        Self {
            crop_size,
            accum: Bitmap::new(crop_size.x, crop_size.y),
            developed: Bitmap::new(crop_size.x, crop_size.y),
            received: 0,
        }
    }

    /// `developed = accum * pixels / received`, alpha forced to one. All
    /// zero before anything was received.
    fn develop(&mut self) {
        let weight = if self.received > 0 {
            self.accum.pixel_count() as Float / self.received as Float
        } else {
            0.0
        };
        for (out, acc) in self.developed.pixels_mut().iter_mut().zip(self.accum.pixels()) {
            *out = Vector4f::new(acc[0] * weight, acc[1] * weight, acc[2] * weight, 1.0);
        }
    }
}

/// Coordinator of a capture job. Owns the accumulation buffers and the
/// received sample count; merges run under one lock.
pub struct CaptureParticleProcess {
    settings: CaptureSettings,
    state: Mutex<Option<Accumulation>>,
    observers: Mutex<Vec<Arc<dyn PreviewObserver>>>,
}

impl CaptureParticleProcess {
    pub fn new(settings: CaptureSettings) -> Self {
        Self { settings, state: Mutex::new(None), observers: Mutex::new(Vec::new()) }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn add_observer(&self, observer: Arc<dyn PreviewObserver>) {
        self.observers.lock().push(observer);
    }

    /// Allocate the buffers for the sensor's crop window. Only the first
    /// bind allocates; later ones are ignored.
    pub fn bind_sensor(&self, sensor: &dyn Sensor) {
        let mut state = self.state.lock();
        if let Some(existing) = state.as_ref() {
            if existing.crop_size != sensor.crop_size() {
                warn!("Ignoring re-bind to {}: buffers are already sized {}x{}.",
                      sensor.describe(), existing.crop_size.x, existing.crop_size.y);
            }
            return;
        }
        let crop_size = sensor.crop_size();
        info!("Capture buffers allocated for {} ({}x{}).", sensor.describe(), crop_size.x, crop_size.y);
        *state = Some(Accumulation::new(crop_size));
    }

    /// Add a finished result. Cancelled results are dropped untouched.
    pub fn merge_result(&self, result: &CaptureWorkResult, cancelled: bool) -> RenderResult<()> {
        if cancelled {
            debug!("Dropping cancelled result for samples {}..{}.", result.range().start(), result.range().end());
            return Ok(());
        }

        let mut guard = self.state.lock();
        let state = guard.as_mut()
            .ok_or_else(|| RenderError::Precondition(String::from("merge before a sensor was bound")))?;
        if result.crop_size() != state.crop_size {
            return Err(RenderError::IncompatibleResult {
                expected_width: state.crop_size.x,
                expected_height: state.crop_size.y,
                actual_width: result.crop_size().x,
                actual_height: result.crop_size().y,
            });
        }

        state.received += result.range().size();
        for y in 0..state.crop_size.y {
            for x in 0..state.crop_size.x {
                let (r, g, b) = result.crop_pixel(x, y).to_linear_rgb();
                let pixel = &mut state.accum[(x, y)];
                pixel[0] += r;
                pixel[1] += g;
                pixel[2] += b;
            }
        }
        state.develop();
        debug!("Merged samples {}..{}, {} received.", result.range().start(), result.range().end(), state.received);
        self.notify(state);
        Ok(())
    }

    /// Recompute the preview from the accumulator and notify observers.
    pub fn develop(&self) -> RenderResult<()> {
        let mut guard = self.state.lock();
        let state = guard.as_mut()
            .ok_or_else(|| RenderError::Precondition(String::from("develop before a sensor was bound")))?;
        state.develop();
        self.notify(state);
        Ok(())
    }

    fn notify(&self, state: &Accumulation) {
        for observer in self.observers.lock().iter() {
            observer.refresh(&state.developed, state.received);
        }
    }

    pub fn received_count(&self) -> u64 {
        self.state.lock().as_ref().map_or(0, |state| state.received)
    }

    pub fn developed_image(&self) -> Option<Bitmap> {
        self.state.lock().as_ref().map(|state| state.developed.clone())
    }

    pub fn accumulated_image(&self) -> Option<Bitmap> {
        self.state.lock().as_ref().map(|state| state.accum.clone())
    }

    /// Total particle budget of the job.
    pub fn sample_budget(&self) -> RenderResult<u64> {
        if self.settings.sample_count > 0 {
            return Ok(self.settings.sample_count);
        }
        let guard = self.state.lock();
        let state = guard.as_ref()
            .ok_or_else(|| RenderError::Precondition(String::from("sample budget needs a bound sensor")))?;
        let pixels = (state.crop_size.x * state.crop_size.y) as u64;
        Ok(pixels * self.settings.samples_per_pixel.max(1))
    }
}

impl ParallelProcess for CaptureParticleProcess {
    type Worker = CaptureParticleWorker;

    fn bind_resources(&self, resources: &WorkResources) -> RenderResult<()> {
        self.bind_sensor(resources.sensor.as_ref());
        Ok(())
    }

    fn create_work_processor(&self) -> CaptureParticleWorker {
        CaptureParticleWorker::new(self.settings.tracer)
    }

    fn generate_work(&self, worker_slots: usize) -> RenderResult<Vec<RangeWorkUnit>> {
        let budget = self.sample_budget()?;
        let units = if self.settings.granularity > 0 {
            partition_by_size(budget, self.settings.granularity)
        } else {
            partition(budget, worker_slots.max(1) * UNITS_PER_SLOT)
        };
        info!("Particle budget {} split into {} work units.", budget, units.len());
        Ok(units)
    }

    fn process_result(&self, result: &CaptureWorkResult, cancelled: bool) -> RenderResult<()> {
        self.merge_result(result, cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::constants::Vector2u;
    use crate::math::spectrum::RGBSpectrum;
    use crate::scenes::cornell::cornell_camera;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    fn bound_process() -> CaptureParticleProcess {
        let process = CaptureParticleProcess::new(CaptureSettings::default());
        process.bind_sensor(&cornell_camera(4, 3));
        process
    }

    fn random_result(rng: &mut LcgRng, start: u64, size: u64) -> CaptureWorkResult {
        let mut result = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(4, 3), 1);
        for y in 0..result.full_size().y {
            for x in 0..result.full_size().x {
                *result.pixel_mut(x, y) = RGBSpectrum::new(rng.next_f32(), rng.next_f32(), rng.next_f32());
            }
        }
        result.set_range(RangeWorkUnit::new(start, size));
        result
    }

    #[derive(Default)]
    struct CountingObserver {
        refreshes: AtomicUsize,
        last_received: AtomicU64,
    }

    impl PreviewObserver for CountingObserver {
        fn refresh(&self, preview: &Bitmap, received_samples: u64) {
            assert!(preview.pixels().iter().all(|p| p[3] == 1.0));
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            self.last_received.store(received_samples, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_develop_before_any_merge_is_black() {
        let process = bound_process();
        process.develop().unwrap();
        let image = process.developed_image().unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
        assert!(image.pixels().iter().all(|p| p[0] == 0.0 && p[1] == 0.0 && p[2] == 0.0 && p[3] == 1.0));

        let unbound = CaptureParticleProcess::new(CaptureSettings::default());
        assert!(unbound.develop().is_err());
    }

    #[test]
    fn test_merge_scales_by_pixels_over_samples() {
        let process = bound_process();
        let mut result = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(4, 3), 1);
        *result.pixel_mut(0, 0) = RGBSpectrum::splat(100.0);
        *result.pixel_mut(2, 1) = RGBSpectrum::new(1.0, 2.0, 3.0);
        result.set_range(RangeWorkUnit::new(0, 6));
        process.merge_result(&result, false).unwrap();

        assert_eq!(process.received_count(), 6);
        let accum = process.accumulated_image().unwrap();
        // Border pixels are not part of the image.
        assert!(accum.pixels().iter().all(|p| p[0] <= 3.0));
        assert_eq!(accum[(1, 0)][2], 3.0);

        let image = process.developed_image().unwrap();
        assert!((image[(1, 0)][1] - 2.0 * 12.0 / 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let mut rng = LcgRng::new(11);
        let results: Vec<_> = (0..6).map(|i| random_result(&mut rng, i * 10, 10)).collect();

        let forward = bound_process();
        for result in &results {
            forward.merge_result(result, false).unwrap();
        }

        let shuffled = bound_process();
        let mut order: Vec<usize> = (0..results.len()).collect();
        for i in (1..order.len()).rev() {
            let j = (rng.next_u32() as usize) % (i + 1);
            order.swap(i, j);
        }
        for &i in order.iter().rev() {
            shuffled.merge_result(&results[i], false).unwrap();
        }

        assert_eq!(forward.received_count(), shuffled.received_count());
        let a = forward.accumulated_image().unwrap();
        let b = shuffled.accumulated_image().unwrap();
        for (pa, pb) in a.pixels().iter().zip(b.pixels()) {
            for c in 0..3 {
                assert!((pa[c] - pb[c]).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_cancelled_result_is_dropped() {
        let mut rng = LcgRng::new(5);
        let process = bound_process();
        process.merge_result(&random_result(&mut rng, 0, 8), false).unwrap();
        let count = process.received_count();
        let accum = process.accumulated_image().unwrap();
        let developed = process.developed_image().unwrap();

        process.merge_result(&random_result(&mut rng, 8, 8), true).unwrap();
        assert_eq!(process.received_count(), count);
        assert_eq!(process.accumulated_image().unwrap(), accum);
        assert_eq!(process.developed_image().unwrap(), developed);
    }

    #[test]
    fn test_observers_and_shape_checks() {
        let process = bound_process();
        let observer = Arc::new(CountingObserver::default());
        process.add_observer(observer.clone());

        let mut rng = LcgRng::new(9);
        process.merge_result(&random_result(&mut rng, 0, 7), false).unwrap();
        process.merge_result(&random_result(&mut rng, 7, 3), false).unwrap();
        assert_eq!(observer.refreshes.load(Ordering::SeqCst), 2);
        assert_eq!(observer.last_received.load(Ordering::SeqCst), 10);

        let wrong = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(5, 3), 1);
        match process.merge_result(&wrong, false) {
            Err(RenderError::IncompatibleResult { actual_width, .. }) => assert_eq!(actual_width, 5),
            other => panic!("expected a shape error, got {:?}", other.err()),
        }

        // A second bind keeps the existing buffers.
        process.bind_sensor(&cornell_camera(8, 8));
        assert_eq!(process.received_count(), 10);
        assert_eq!(process.developed_image().unwrap().width(), 4);
    }

    #[test]
    fn test_work_generation() {
        let process = bound_process();
        let units = process.generate_work(2).unwrap();
        assert_eq!(units.len(), 8);
        assert_eq!(units.iter().map(|u| u.size()).sum::<u64>(), 12);

        let settings = CaptureSettings { sample_count: 1000, granularity: 300, ..CaptureSettings::default() };
        let coarse = CaptureParticleProcess::new(settings);
        let units = coarse.generate_work(16).unwrap();
        assert_eq!(units.len(), 4);
        assert!(units[..3].iter().all(|u| u.size() == 300));
        assert_eq!(units[3], RangeWorkUnit::new(900, 100));

        let unbound = CaptureParticleProcess::new(CaptureSettings::default());
        assert!(unbound.generate_work(4).is_err());
    }
}
