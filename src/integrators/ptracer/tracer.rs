// Copyright @yucwang 2026

use crate::core::bsdf::TransportMode;
use crate::core::error::{RenderError, RenderResult};
use crate::core::interaction::{MediumInteraction, SurfaceIntersection};
use crate::core::path::{sample_emission_seed, EmissionSeed};
use crate::core::sampler::QmcSampleStream;
use crate::core::scene::{MediumSample, Scene};
use crate::core::work::{CancellationToken, ProcessStatus, RangeWorkUnit};
use crate::math::constants::{Float, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Immutable configuration shared by every clone of a particle worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleTracerSettings {
    /// Longest path in vertices, -1 for unbounded.
    pub max_depth: i32,
    /// Depth at which Russian roulette starts.
    pub rr_depth: i32,
    /// When false a particle stops after its first medium scattering event.
    pub multiple_scattering: bool,
}

impl Default for ParticleTracerSettings {
    fn default() -> Self {
        Self { max_depth: -1, rr_depth: 5, multiple_scattering: true }
    }
}

impl ParticleTracerSettings {
    fn within_depth(&self, depth: i32) -> bool {
        self.max_depth < 0 || depth <= self.max_depth
    }
}

/// A scattering location reached by a particle.
#[derive(Debug, Clone, Copy)]
pub enum ParticleEvent<'a> {
    Surface(&'a SurfaceIntersection),
    /// `wi` points back towards where the particle came from.
    Medium { record: &'a MediumInteraction, wi: Vector3f },
}

impl<'a> ParticleEvent<'a> {
    pub fn position(&self) -> Vector3f {
        match self {
            ParticleEvent::Surface(its) => its.p(),
            ParticleEvent::Medium { record, .. } => record.p,
        }
    }

    pub fn is_medium(&self) -> bool {
        matches!(self, ParticleEvent::Medium { .. })
    }
}

/// Receives the events of traced particles.
pub trait ParticleHandler {
    fn handle_emission(&mut self, _seed: &EmissionSeed) {}

    /// `weight` is the power the particle carries when it arrives at the
    /// event.
    fn handle_interaction(&mut self, depth: i32, event: ParticleEvent<'_>, weight: &RGBSpectrum);
}

const MAX_SURVIVAL: Float = 0.95;

#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleTracer {
    settings: ParticleTracerSettings,
}

impl ParticleTracer {
    pub fn new(settings: ParticleTracerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ParticleTracerSettings {
        &self.settings
    }

    /// Trace every sample of `range`, polling `cancel` before each one.
    pub fn trace_range<H: ParticleHandler>(&self,
                                           scene: &dyn Scene,
                                           range: &RangeWorkUnit,
                                           handler: &mut H,
                                           cancel: &CancellationToken) -> RenderResult<ProcessStatus> {
        if range.size() == 0 {
            return Err(RenderError::Precondition(String::from("empty work unit")));
        }
        for index in range.start()..range.end() {
            if cancel.is_cancelled() {
                return Ok(ProcessStatus::Cancelled);
            }
            self.trace_particle(scene, index, handler);
        }
        Ok(ProcessStatus::Completed)
    }

    /// Trace the particle of sample `index`. The Halton index is shifted by
    /// one, index 0 of the sequence being the origin in every dimension.
    pub fn trace_particle<H: ParticleHandler>(&self, scene: &dyn Scene, index: u64, handler: &mut H) {
        let mut stream = QmcSampleStream::new(index + 1);
        let seed = match sample_emission_seed(scene, &mut stream) {
            Some(seed) => seed,
            None => return,
        };
        handler.handle_emission(&seed);

        let power = seed.power();
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut ray = seed.ray();
        let mut depth = 1;
        while !throughput.is_black() && self.settings.within_depth(depth) {
            let its = scene.ray_intersection(&ray);
            let mut segment = ray;
            if let Some(its) = &its {
                segment.max_t = its.t();
            }

            match scene.sample_medium(&segment, stream.next_1d()) {
                MediumSample::Scattered(record, weight) => {
                    throughput *= weight;
                    let wi = -ray.dir();
                    handler.handle_interaction(depth, ParticleEvent::Medium { record: &record, wi }, &(throughput * power));
                    if !self.settings.multiple_scattering {
                        break;
                    }

                    let (wo, phase_weight) = record.medium.phase_function().sample(&wi, &stream.next_2d());
                    throughput *= phase_weight;
                    ray = Ray3f::new(record.p, wo, Some(0.0), None);
                }
                MediumSample::Passed(weight) => {
                    let its = match its {
                        Some(its) => its,
                        None => break,
                    };
                    throughput *= weight;
                    handler.handle_interaction(depth, ParticleEvent::Surface(&its), &(throughput * power));

                    let bsdf = match its.material() {
                        Some(bsdf) => bsdf,
                        None => break,
                    };
                    let (record, bsdf_weight) = match bsdf.sample(&its.wi(), &stream.next_2d(), TransportMode::Importance) {
                        Some(sample) => sample,
                        None => break,
                    };

                    let wi_world = -ray.dir();
                    let wo_world = its.to_world(&record.wo);
                    let geo_n = its.geo_normal();
                    if geo_n.dot(&wi_world) * record.wi.z <= 0.0 || geo_n.dot(&wo_world) * record.wo.z <= 0.0 {
                        break;
                    }
                    throughput *= bsdf_weight;
                    ray = Ray3f::new(its.p(), wo_world, Some(EPSILON), None);
                }
            }

            if depth >= self.settings.rr_depth {
                let survival = throughput.max_component().min(MAX_SURVIVAL);
                if stream.next_1d() >= survival {
                    break;
                }
                throughput /= survival;
            }
            depth += 1;
        }
    }
}
