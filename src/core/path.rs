// Copyright @yucwang 2026

use crate::core::emitter::{DirectionSample, PositionSample};
use crate::core::sampler::QmcSampleStream;
use crate::core::scene::Scene;
use crate::math::constants::{Float, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Start of a light path: the chosen emitter, its sampled position and
/// direction, and the position weight including the emitter selection
/// weight.
#[derive(Debug, Clone, Copy)]
pub struct EmissionSeed {
    pub emitter_index: usize,
    pub position: PositionSample,
    pub direction: DirectionSample,
    pub position_weight: RGBSpectrum,
}

impl EmissionSeed {
    /// Power carried by the departing particle.
    pub fn power(&self) -> RGBSpectrum {
        self.position_weight * self.direction.weight
    }

    pub fn ray(&self) -> Ray3f {
        Ray3f::new(self.position.p, self.direction.d, Some(EPSILON), None)
    }
}

/// Pick an emitter uniformly and sample an emission from it. Always
/// consumes five dimensions of `stream` (selection, position, direction),
/// so later dimensions line up across paths. `None` for an emitter-less
/// scene.
pub fn sample_emission_seed(scene: &dyn Scene, stream: &mut QmcSampleStream) -> Option<EmissionSeed> {
    let emitters = scene.emitters();
    let u_select = stream.next_1d();
    let u_position = stream.next_2d();
    let u_direction = stream.next_2d();
    if emitters.is_empty() {
        return None;
    }

    let count = emitters.len();
    let emitter_index = ((u_select * count as Float) as usize).min(count - 1);
    let emission = scene.sample_emission(emitters[emitter_index].as_ref(), &u_position, &u_direction);
    Some(EmissionSeed {
        emitter_index,
        position: emission.position,
        direction: emission.direction,
        position_weight: emission.position.weight * count as Float,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::BasicScene;
    use crate::emitters::point::PointEmitter;
    use crate::math::constants::Vector3f;
    use std::sync::Arc;

    #[test]
    fn test_emission_seed_selection_weight() {
        let mut scene = BasicScene::new();
        assert!(sample_emission_seed(&scene, &mut QmcSampleStream::new(1)).is_none());

        scene.add_emitter(Arc::new(PointEmitter::new(Vector3f::zeros(), RGBSpectrum::splat(1.0))));
        scene.add_emitter(Arc::new(PointEmitter::new(Vector3f::new(1.0, 0.0, 0.0), RGBSpectrum::splat(3.0))));

        let mut stream = QmcSampleStream::new(1);
        let seed = sample_emission_seed(&scene, &mut stream).expect("scene has emitters");
        assert_eq!(stream.dimension(), 5);
        // Halton index 1 in base 2 is 0.5, so the second emitter is picked.
        assert_eq!(seed.emitter_index, 1);
        let expected = 2.0 * 3.0 * 4.0 * std::f32::consts::PI;
        assert!((seed.power()[0] - expected).abs() < 1e-3);
        assert!((seed.ray().dir().norm() - 1.0).abs() < 1e-5);
    }
}
