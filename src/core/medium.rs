// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub trait PhaseFunction: Send + Sync {
    /// Phase function value for incident `wi` and outgoing `wo` (world
    /// space, both pointing away from the scattering point).
    fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> Float;

    /// Sample `wo`; returns the direction and the weight value / pdf.
    fn sample(&self, wi: &Vector3f, u: &Vector2f) -> (Vector3f, Float);
}

/// Outcome of free-flight sampling along a ray segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceSample {
    /// Scattered at `t`; `weight` is sigma_s * Tr / pdf.
    Scattered { t: Float, sigma_s: RGBSpectrum, transmittance: RGBSpectrum, weight: RGBSpectrum },
    /// Reached the end of the segment; `weight` is Tr / P(no collision).
    Passed { weight: RGBSpectrum },
}

pub trait Medium: Send + Sync {
    fn sigma_t(&self, p_world: Vector3f) -> RGBSpectrum;
    fn albedo(&self, p_world: Vector3f) -> RGBSpectrum;

    fn sigma_s(&self, p_world: Vector3f) -> RGBSpectrum {
        self.sigma_t(p_world) * self.albedo(p_world)
    }

    fn sigma_a(&self, p_world: Vector3f) -> RGBSpectrum {
        let one = RGBSpectrum::new(1.0, 1.0, 1.0);
        self.sigma_t(p_world) * (one - self.albedo(p_world))
    }

    fn phase_function(&self) -> &dyn PhaseFunction;

    /// Transmittance over `[ray.min_t, ray.max_t]`.
    fn transmittance(&self, ray: &Ray3f) -> RGBSpectrum;

    fn sample_distance(&self, ray: &Ray3f, u: Float) -> DistanceSample;
}
