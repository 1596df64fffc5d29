// Copyright @yucwang 2026

use crate::core::emitter::{DirectionSample, Emitter, EmitterFlag, PositionSample};
use crate::math::constants::{PI, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_uniform_sphere, sample_uniform_sphere_pdf};

/// Isotropic point light of radiant intensity `intensity`.
pub struct PointEmitter {
    position: Vector3f,
    intensity: RGBSpectrum,
}

impl PointEmitter {
    pub fn new(position: Vector3f, intensity: RGBSpectrum) -> Self {
        Self { position, intensity }
    }
}

impl Emitter for PointEmitter {
    fn get_flag(&self) -> EmitterFlag {
        EmitterFlag::DELTA_POSITION
    }

    fn power(&self) -> RGBSpectrum {
        self.intensity * (4.0 * PI)
    }

    fn sample_position(&self, _u: &Vector2f) -> PositionSample {
        PositionSample {
            p: self.position,
            n: Vector3f::new(0.0, 0.0, 1.0),
            pdf: 1.0,
            weight: self.power(),
        }
    }

    fn sample_direction(&self, u: &Vector2f, _position: &PositionSample) -> DirectionSample {
        DirectionSample {
            d: sample_uniform_sphere(u),
            pdf: sample_uniform_sphere_pdf(),
            weight: RGBSpectrum::splat(1.0),
        }
    }

    fn describe(&self) -> String {
        format!("PointEmitter[position = {:?}]", self.position)
    }
}
