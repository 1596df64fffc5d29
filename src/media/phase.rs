// Copyright @yucwang 2026

use crate::core::medium::PhaseFunction;
use crate::math::constants::{Float, Vector2f, Vector3f, INV_FOUR_PI, PI};
use crate::math::frame::Frame;
use crate::math::warp::sample_uniform_sphere;

pub struct IsotropicPhaseFunction;

impl PhaseFunction for IsotropicPhaseFunction {
    fn eval(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        INV_FOUR_PI
    }

    fn sample(&self, _wi: &Vector3f, u: &Vector2f) -> (Vector3f, Float) {
        (sample_uniform_sphere(u), 1.0)
    }
}

/// Henyey-Greenstein lobe; `g > 0` scatters forward.
pub struct HenyeyGreensteinPhaseFunction {
    g: Float,
}

impl HenyeyGreensteinPhaseFunction {
    pub fn new(g: Float) -> Self {
        Self { g: g.max(-0.99).min(0.99) }
    }

    fn eval_cos(&self, cos_theta: Float) -> Float {
        let denom = 1.0 + self.g * self.g + 2.0 * self.g * cos_theta;
        INV_FOUR_PI * (1.0 - self.g * self.g) / (denom * denom.sqrt())
    }
}

impl PhaseFunction for HenyeyGreensteinPhaseFunction {
    fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        self.eval_cos(wi.dot(wo))
    }

    fn sample(&self, wi: &Vector3f, u: &Vector2f) -> (Vector3f, Float) {
        // cos_theta is measured against -wi, the propagation direction.
        let cos_theta = if self.g.abs() < 1e-3 {
            1.0 - 2.0 * u.x
        } else {
            let sqr = (1.0 - self.g * self.g) / (1.0 - self.g + 2.0 * self.g * u.x);
            (1.0 + self.g * self.g - sqr * sqr) / (2.0 * self.g)
        };
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;
        let frame = Frame::from_normal(&(-wi));
        let local = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        (frame.to_world(&local), 1.0)
    }
}
