// Copyright @yucwang 2026

use super::tracer::{ParticleEvent, ParticleHandler, ParticleTracer, ParticleTracerSettings};
use super::work_result::CaptureWorkResult;
use crate::core::bsdf::{BSDFSampleRecord, TransportMode};
use crate::core::error::{RenderError, RenderResult};
use crate::core::filter::{filter_border, ReconstructionFilter};
use crate::core::scene::Scene;
use crate::core::sensor::{Sensor, SensorKind};
use crate::core::work::{CancellationToken, ProcessStatus, RangeWorkUnit, WorkProcessor, WorkResources};
use crate::filters::tabulated::TabulatedFilter;
use crate::math::constants::{Float, Vector2f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Prepared,
    Processing,
    Cancelled,
    Completed,
}

/// How a splat is weighted by the sensor, fixed when the worker is
/// prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorImportance {
    /// `importance(sample) / distance^2`.
    Pinhole,
    /// `1 / area_density(sample)`.
    Area,
}

impl SensorImportance {
    fn resolve(sensor: &dyn Sensor) -> RenderResult<Self> {
        let crop_offset = sensor.crop_offset();
        let crop_size = sensor.crop_size();
        if crop_size.x == 0 || crop_size.y == 0 {
            return Err(RenderError::Precondition(format!("{} has an empty crop window", sensor.describe())));
        }

        let center = Vector2f::new(crop_offset.x as Float + 0.5 * crop_size.x as Float,
                                   crop_offset.y as Float + 0.5 * crop_size.y as Float);
        match sensor.kind() {
            SensorKind::Pinhole if sensor.importance(&center) > 0.0 => Ok(SensorImportance::Pinhole),
            SensorKind::Area if sensor.area_density(&center) > 0.0 => Ok(SensorImportance::Area),
            kind => Err(RenderError::Capability(format!("{} does not provide {:?} importance",
                                                        sensor.describe(), kind))),
        }
    }

    fn eval(&self, sensor: &dyn Sensor, sample: &Vector2f, distance: Float) -> Float {
        match self {
            SensorImportance::Pinhole => sensor.importance(sample) / (distance * distance),
            SensorImportance::Area => {
                let density = sensor.area_density(sample);
                if density > 0.0 { 1.0 / density } else { 0.0 }
            }
        }
    }
}

/// Everything a prepared worker holds on to.
struct CaptureBinding {
    scene: Arc<dyn Scene>,
    sensor: Arc<dyn Sensor>,
    filter: TabulatedFilter,
    importance: SensorImportance,
}

/// Connects every particle event to the sensor and splats the visible
/// ones into the work result.
struct CaptureHandler<'a> {
    binding: &'a CaptureBinding,
    result: &'a mut CaptureWorkResult,
}

impl<'a> ParticleHandler for CaptureHandler<'a> {
    fn handle_interaction(&mut self, _depth: i32, event: ParticleEvent<'_>, weight: &RGBSpectrum) {
        let binding = self.binding;
        let p = event.position();
        let sample = match binding.sensor.position_to_sample(&p) {
            Some(sample) => sample,
            None => return,
        };

        let sensor_p = binding.sensor.position(&sample);
        if binding.scene.is_occluded(&sensor_p, &p) {
            return;
        }
        let to_sensor = sensor_p - p;
        let distance = to_sensor.norm();
        if distance <= 0.0 {
            return;
        }
        let d = to_sensor / distance;

        let scattering = match event {
            ParticleEvent::Surface(its) => match its.material() {
                Some(bsdf) => {
                    let record = BSDFSampleRecord::new(its.wi(), its.to_local(&d), TransportMode::Importance);
                    bsdf.eval_cos(&record)
                }
                None => return,
            },
            ParticleEvent::Medium { record, wi } => {
                RGBSpectrum::splat(record.medium.phase_function().eval(&wi, &d))
            }
        };
        if scattering.is_black() {
            return;
        }

        let importance = binding.importance.eval(binding.sensor.as_ref(), &sample, distance);
        if importance <= 0.0 {
            return;
        }

        let ray = Ray3f::new(p, d, Some(0.0), Some(distance));
        let value = *weight * scattering * binding.scene.attenuation(&ray) * importance;
        self.result.splat(&sample, &value, &binding.filter);
    }
}

/// Particle tracing worker that records the image seen by a sensor.
pub struct CaptureParticleWorker {
    tracer: ParticleTracer,
    binding: Option<CaptureBinding>,
    state: WorkerState,
}

impl CaptureParticleWorker {
    pub fn new(settings: ParticleTracerSettings) -> Self {
        Self { tracer: ParticleTracer::new(settings), binding: None, state: WorkerState::Idle }
    }

    pub fn settings(&self) -> &ParticleTracerSettings {
        self.tracer.settings()
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn sensor_importance(&self) -> Option<SensorImportance> {
        self.binding.as_ref().map(|binding| binding.importance)
    }

    fn binding(&self) -> RenderResult<&CaptureBinding> {
        self.binding.as_ref()
            .ok_or_else(|| RenderError::Precondition(String::from("capture worker used before prepare()")))
    }
}

impl WorkProcessor for CaptureParticleWorker {
    type Result = CaptureWorkResult;

    fn prepare(&mut self, resources: &WorkResources) -> RenderResult<()> {
        let importance = SensorImportance::resolve(resources.sensor.as_ref())?;
        let filter = TabulatedFilter::new(resources.filter.as_ref());
        debug!("Capture worker bound to {} with {:?} importance and a {} filter.",
               resources.sensor.describe(), importance, filter.name());
        self.binding = Some(CaptureBinding {
            scene: resources.scene.clone(),
            sensor: resources.sensor.clone(),
            filter,
            importance,
        });
        self.state = WorkerState::Prepared;
        Ok(())
    }

    fn create_work_result(&self) -> RenderResult<CaptureWorkResult> {
        let binding = self.binding()?;
        Ok(CaptureWorkResult::new(binding.sensor.crop_offset(),
                                  binding.sensor.crop_size(),
                                  filter_border(&binding.filter)))
    }

    fn process(&mut self,
               unit: &RangeWorkUnit,
               result: &mut CaptureWorkResult,
               cancel: &CancellationToken) -> RenderResult<ProcessStatus> {
        let binding = self.binding.as_ref()
            .ok_or_else(|| RenderError::Precondition(String::from("capture worker used before prepare()")))?;
        if result.crop_size() != binding.sensor.crop_size() || result.border() != filter_border(&binding.filter) {
            return Err(RenderError::Precondition(String::from("work result was not created by this worker")));
        }

        self.state = WorkerState::Processing;
        result.set_range(*unit);
        result.clear();

        let mut handler = CaptureHandler { binding, result };
        let status = self.tracer.trace_range(binding.scene.as_ref(), unit, &mut handler, cancel);
        self.state = match status {
            Ok(ProcessStatus::Completed) => WorkerState::Completed,
            Ok(ProcessStatus::Cancelled) => WorkerState::Cancelled,
            Err(_) => WorkerState::Prepared,
        };
        status
    }

    fn clone_fresh(&self) -> Self {
        Self::new(*self.tracer.settings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::{BasicScene, SceneObject};
    use crate::core::sensor::Sensor;
    use crate::core::work::WorkResources;
    use crate::emitters::point::PointEmitter;
    use crate::filters::box_filter::BoxFilter;
    use crate::filters::tent::TentFilter;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::{Vector2u, Vector3f};
    use crate::scenes::cornell::{cornell_box, cornell_camera};
    use crate::sensors::orthographic::OrthographicCamera;
    use crate::shapes::rectangle::Rectangle;

    /// Pinhole sensor reporting no importance.
    struct BlindSensor;

    impl Sensor for BlindSensor {
        fn kind(&self) -> SensorKind {
            SensorKind::Pinhole
        }
        fn film_size(&self) -> Vector2u {
            Vector2u::new(4, 4)
        }
        fn crop_offset(&self) -> Vector2u {
            Vector2u::new(0, 0)
        }
        fn crop_size(&self) -> Vector2u {
            Vector2u::new(4, 4)
        }
        fn position_to_sample(&self, _p: &Vector3f) -> Option<Vector2f> {
            None
        }
        fn position(&self, _sample: &Vector2f) -> Vector3f {
            Vector3f::zeros()
        }
    }

    fn cornell_resources() -> WorkResources {
        WorkResources {
            scene: Arc::new(cornell_box(false)),
            sensor: Arc::new(cornell_camera(16, 16)),
            filter: Arc::new(TentFilter::new(1.0).unwrap()),
        }
    }

    #[test]
    fn test_worker_state_machine() {
        let settings = ParticleTracerSettings { max_depth: 4, rr_depth: 3, multiple_scattering: true };
        let mut worker = CaptureParticleWorker::new(settings);
        assert_eq!(worker.state(), WorkerState::Idle);
        assert!(worker.create_work_result().is_err());

        let mut orphan = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(16, 16), 1);
        let unit = RangeWorkUnit::new(0, 8);
        assert!(worker.process(&unit, &mut orphan, &CancellationToken::new()).is_err());

        worker.prepare(&cornell_resources()).unwrap();
        assert_eq!(worker.state(), WorkerState::Prepared);
        assert_eq!(worker.sensor_importance(), Some(SensorImportance::Pinhole));

        let mut result = worker.create_work_result().unwrap();
        assert_eq!(result.border(), 1);
        assert_eq!(result.full_size(), Vector2u::new(18, 18));
        let status = worker.process(&unit, &mut result, &CancellationToken::new()).unwrap();
        assert_eq!(status, ProcessStatus::Completed);
        assert_eq!(worker.state(), WorkerState::Completed);
        assert_eq!(*result.range(), unit);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let status = worker.process(&RangeWorkUnit::new(8, 8), &mut result, &cancel).unwrap();
        assert_eq!(status, ProcessStatus::Cancelled);
        assert_eq!(worker.state(), WorkerState::Cancelled);
        assert!(result.total().is_black());

        let fresh = worker.clone_fresh();
        assert_eq!(fresh.state(), WorkerState::Idle);
        assert_eq!(fresh.settings(), &settings);
        assert!(fresh.sensor_importance().is_none());
    }

    #[test]
    fn test_capture_sees_the_lit_box() {
        let mut worker = CaptureParticleWorker::new(ParticleTracerSettings::default());
        worker.prepare(&cornell_resources()).unwrap();
        let mut result = worker.create_work_result().unwrap();
        worker.process(&RangeWorkUnit::new(0, 2000), &mut result, &CancellationToken::new()).unwrap();

        let total = result.total();
        assert!(total.is_valid());
        assert!(total.max_component() > 0.0);
    }

    #[test]
    fn test_results_do_not_depend_on_partitioning() {
        let resources = cornell_resources();
        let mut worker = CaptureParticleWorker::new(ParticleTracerSettings::default());
        worker.prepare(&resources).unwrap();

        let mut whole = worker.create_work_result().unwrap();
        worker.process(&RangeWorkUnit::new(0, 200), &mut whole, &CancellationToken::new()).unwrap();

        let mut first = worker.create_work_result().unwrap();
        let mut second = worker.create_work_result().unwrap();
        worker.process(&RangeWorkUnit::new(0, 120), &mut first, &CancellationToken::new()).unwrap();
        worker.process(&RangeWorkUnit::new(120, 80), &mut second, &CancellationToken::new()).unwrap();

        let full = whole.full_size();
        for y in 0..full.y {
            for x in 0..full.x {
                let split = first.pixel(x, y) + second.pixel(x, y);
                for c in 0..3 {
                    let a = whole.pixel(x, y)[c];
                    assert!((a - split[c]).abs() <= 1e-4 * a.abs().max(1.0));
                }
            }
        }
    }

    #[test]
    fn test_area_sensor_importance() {
        // A lit floor seen from above by an orthographic sensor.
        let mut scene = BasicScene::new();
        scene.add_object(SceneObject::new(
            Arc::new(Rectangle::new(Vector3f::zeros(), Vector3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 2.0))),
            Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.7)))));
        scene.add_emitter(Arc::new(PointEmitter::new(Vector3f::new(0.0, 1.0, 0.0), RGBSpectrum::splat(5.0))));
        let sensor = OrthographicCamera::new(Vector3f::new(0.0, 3.0, 0.0), Vector3f::zeros(),
                                             Vector3f::new(0.0, 0.0, -1.0), 1.0, 1.0, 8, 8);
        let resources = WorkResources {
            scene: Arc::new(scene),
            sensor: Arc::new(sensor),
            filter: Arc::new(BoxFilter::new(0.5).unwrap()),
        };

        let mut worker = CaptureParticleWorker::new(ParticleTracerSettings { max_depth: 1, rr_depth: 5, multiple_scattering: true });
        worker.prepare(&resources).unwrap();
        assert_eq!(worker.sensor_importance(), Some(SensorImportance::Area));
        let mut result = worker.create_work_result().unwrap();
        assert_eq!(result.border(), 0);
        worker.process(&RangeWorkUnit::new(0, 512), &mut result, &CancellationToken::new()).unwrap();
        assert!(result.total().max_component() > 0.0);
    }

    #[test]
    fn test_capability_mismatch_is_fatal_at_prepare() {
        let resources = WorkResources {
            scene: Arc::new(cornell_box(false)),
            sensor: Arc::new(BlindSensor),
            filter: Arc::new(BoxFilter::new(0.5).unwrap()),
        };
        let mut worker = CaptureParticleWorker::new(ParticleTracerSettings::default());
        match worker.prepare(&resources) {
            Err(RenderError::Capability(_)) => {}
            other => panic!("expected a capability error, got {:?}", other.err()),
        }
        assert_eq!(worker.state(), WorkerState::Idle);
    }
}
