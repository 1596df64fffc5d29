// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFSampleRecord, TransportMode, BSDF};
use crate::math::constants::{ INV_PI, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Two-sided diffuse reflector.
pub struct LambertianDiffuseBSDF {
    color: RGBSpectrum
}

impl BSDF for LambertianDiffuseBSDF {
    fn eval_cos(&self, record: &BSDFSampleRecord) -> RGBSpectrum {
        if record.wi.z * record.wo.z <= 0.0 {
            return RGBSpectrum::default();
        }

        self.color * (INV_PI * record.wo.z.abs())
    }

    fn sample(&self,
              wi: &Vector3f,
              u: &Vector2f,
              mode: TransportMode) -> Option<(BSDFSampleRecord, RGBSpectrum)> {
        if wi.z == 0.0 {
            return None;
        }

        let mut wo = sample_cosine_hemisphere(u);
        if wi.z < 0.0 {
            wo.z *= -1.0;
        }
        let mut record = BSDFSampleRecord::new(*wi, wo, mode);
        record.pdf = sample_cosine_hemisphere_pdf(wo.z.abs());
        if record.pdf <= 0.0 {
            return None;
        }

        Some((record, self.color))
    }
}

impl LambertianDiffuseBSDF {
    pub fn new(rgb: RGBSpectrum) -> Self {
        Self {
            color: rgb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambertian_eval_and_sample() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.8));
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let record = BSDFSampleRecord::new(wi, wo, TransportMode::Importance);
        let value = bsdf.eval_cos(&record);
        assert!((value[0] - 0.8 * INV_PI * 0.8).abs() < 1e-6);

        let below = BSDFSampleRecord::new(wi, Vector3f::new(0.0, 0.0, -1.0), TransportMode::Importance);
        assert!(bsdf.eval_cos(&below).is_black());

        let (sampled, weight) = bsdf.sample(&Vector3f::new(0.0, 0.0, -1.0),
                                            &Vector2f::new(0.3, 0.7),
                                            TransportMode::Importance).unwrap();
        assert!(sampled.wo.z < 0.0);
        assert_eq!(weight, RGBSpectrum::splat(0.8));
    }
}
