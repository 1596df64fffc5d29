// Copyright @yucwang 2026

use crate::core::medium::{DistanceSample, Medium, PhaseFunction};
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::media::phase::IsotropicPhaseFunction;

pub struct HomogeneousMedium {
    sigma_t: RGBSpectrum,
    albedo: RGBSpectrum,
    scale: Float,
    phase: Box<dyn PhaseFunction>,
}

impl HomogeneousMedium {
    pub fn new(sigma_t: RGBSpectrum, albedo: RGBSpectrum) -> Self {
        Self {
            sigma_t,
            albedo: clamp_spectrum(albedo),
            scale: 1.0,
            phase: Box::new(IsotropicPhaseFunction),
        }
    }

    pub fn with_scale(mut self, scale: Float) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_phase_function(mut self, phase: Box<dyn PhaseFunction>) -> Self {
        self.phase = phase;
        self
    }

    fn scaled_sigma_t(&self) -> RGBSpectrum {
        self.sigma_t * self.scale
    }

    fn transmittance_over(&self, distance: Float) -> RGBSpectrum {
        (self.scaled_sigma_t() * -distance).exp()
    }
}

impl Medium for HomogeneousMedium {
    fn sigma_t(&self, _p_world: Vector3f) -> RGBSpectrum {
        self.scaled_sigma_t()
    }

    fn albedo(&self, _p_world: Vector3f) -> RGBSpectrum {
        self.albedo
    }

    fn phase_function(&self) -> &dyn PhaseFunction {
        self.phase.as_ref()
    }

    fn transmittance(&self, ray: &Ray3f) -> RGBSpectrum {
        self.transmittance_over((ray.max_t - ray.min_t).max(0.0))
    }

    // Distances are sampled with the channel-averaged extinction.
    fn sample_distance(&self, ray: &Ray3f, u: Float) -> DistanceSample {
        let sigma_t = self.scaled_sigma_t();
        let sampling_density = sigma_t.average();
        let segment = (ray.max_t - ray.min_t).max(0.0);
        if sampling_density <= 0.0 {
            return DistanceSample::Passed { weight: RGBSpectrum::splat(1.0) };
        }

        let distance = -(1.0 - u).ln() / sampling_density;
        if distance < segment {
            let transmittance = self.transmittance_over(distance);
            let pdf = sampling_density * (-sampling_density * distance).exp();
            let sigma_s = sigma_t * self.albedo;
            DistanceSample::Scattered {
                t: ray.min_t + distance,
                sigma_s,
                transmittance,
                weight: sigma_s * transmittance / pdf,
            }
        } else {
            let p_pass = (-sampling_density * segment).exp();
            DistanceSample::Passed { weight: self.transmittance_over(segment) / p_pass }
        }
    }
}

fn clamp_spectrum(value: RGBSpectrum) -> RGBSpectrum {
    RGBSpectrum::new(
        value[0].clamp(0.0, 1.0),
        value[1].clamp(0.0, 1.0),
        value[2].clamp(0.0, 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_medium_weights() {
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(0.5), RGBSpectrum::splat(0.8));
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), Some(0.0), Some(4.0));

        match medium.sample_distance(&ray, 0.1) {
            DistanceSample::Scattered { t, weight, .. } => {
                assert!(t > 0.0 && t < 4.0);
                // Grey medium: weight collapses to the albedo.
                assert!((weight[0] - 0.8).abs() < 1e-4);
            }
            DistanceSample::Passed { .. } => panic!("expected a scattering event"),
        }

        match medium.sample_distance(&ray, 0.999) {
            DistanceSample::Passed { weight } => assert!((weight[1] - 1.0).abs() < 1e-3),
            DistanceSample::Scattered { .. } => panic!("expected to pass"),
        }

        assert!((medium.transmittance(&ray)[2] - (-2.0f32).exp()).abs() < 1e-5);
    }

    #[test]
    fn test_clamped_albedo() {
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(1.0), RGBSpectrum::new(1.5, -0.2, 0.5))
            .with_scale(2.0);
        assert_eq!(medium.albedo(Vector3f::zeros()), RGBSpectrum::new(1.0, 0.0, 0.5));
        assert_eq!(medium.sigma_t(Vector3f::zeros()), RGBSpectrum::splat(2.0));
    }
}
