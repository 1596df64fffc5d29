// Copyright @yucwang 2026

use crate::core::emitter::{DirectionSample, Emitter, EmitterFlag, PositionSample};
use crate::core::shape::Shape;
use crate::math::constants::{PI, Vector2f};
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_cosine_hemisphere, sample_cosine_hemisphere_pdf};
use std::sync::Arc;

/// Diffuse emitter attached to a shape; emits `radiance` from the front
/// side only.
pub struct AreaEmitter {
    shape: Arc<dyn Shape>,
    radiance: RGBSpectrum,
}

impl AreaEmitter {
    pub fn from_shape(shape: Arc<dyn Shape>, radiance: RGBSpectrum) -> Self {
        Self { shape, radiance }
    }
}

impl Emitter for AreaEmitter {
    fn get_flag(&self) -> EmitterFlag {
        EmitterFlag::SURFACE
    }

    fn power(&self) -> RGBSpectrum {
        self.radiance * (PI * self.shape.surface_area())
    }

    fn sample_position(&self, u: &Vector2f) -> PositionSample {
        let sample = self.shape.sample(u);
        let weight = if sample.pdf > 0.0 {
            self.radiance * (PI / sample.pdf)
        } else {
            RGBSpectrum::default()
        };
        PositionSample { p: sample.p, n: sample.normal, pdf: sample.pdf, weight }
    }

    fn sample_direction(&self, u: &Vector2f, position: &PositionSample) -> DirectionSample {
        let local_dir = sample_cosine_hemisphere(u);
        let frame = Frame::from_normal(&position.n);
        let pdf = sample_cosine_hemisphere_pdf(local_dir.z);
        let weight = if pdf > 0.0 { RGBSpectrum::splat(1.0) } else { RGBSpectrum::default() };
        DirectionSample { d: frame.to_world(&local_dir), pdf, weight }
    }

    fn describe(&self) -> String {
        format!("AreaEmitter[radiance = {:?}]", self.radiance.to_linear_rgb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector3f;
    use crate::shapes::rectangle::Rectangle;

    #[test]
    fn test_area_emitter_weights() {
        let shape = Arc::new(Rectangle::new(Vector3f::zeros(),
                                            Vector3f::new(1.0, 0.0, 0.0),
                                            Vector3f::new(0.0, 1.0, 0.0)));
        let emitter = AreaEmitter::from_shape(shape, RGBSpectrum::splat(1.0));
        let position = emitter.sample_position(&Vector2f::new(0.2, 0.4));
        // Uniform area sampling: every sample carries the full power.
        assert!((position.weight[0] - emitter.power()[0]).abs() < 1e-3);

        let direction = emitter.sample_direction(&Vector2f::new(0.3, 0.3), &position);
        assert!(direction.d.z > 0.0);
        assert_eq!(direction.weight, RGBSpectrum::splat(1.0));
    }
}
