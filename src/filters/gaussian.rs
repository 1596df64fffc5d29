// Copyright @yucwang 2026

use crate::core::error::{RenderError, RenderResult};
use crate::core::filter::ReconstructionFilter;
use crate::core::properties::Properties;
use crate::math::constants::{Float, Vector2f};

/// Truncated Gaussian with support `4 * stddev`, shifted so it reaches zero
/// at the edge of the support.
pub struct GaussianFilter {
    stddev: Float,
    radius: Float,
    alpha: Float,
    edge: Float,
}

impl GaussianFilter {
    pub fn new(stddev: Float) -> RenderResult<Self> {
        if !(stddev > 0.0 && stddev.is_finite()) {
            return Err(RenderError::Parse(format!("gaussian stddev must be positive, got {}", stddev)));
        }
        let radius = 4.0 * stddev;
        let alpha = -1.0 / (2.0 * stddev * stddev);
        Ok(Self { stddev, radius, alpha, edge: (alpha * radius * radius).exp() })
    }

    pub fn from_properties(properties: &Properties) -> RenderResult<Self> {
        Self::new(properties.get_float("stddev", 0.5)?)
    }

    pub fn stddev(&self) -> Float {
        self.stddev
    }

    fn eval_1d(&self, x: Float) -> Float {
        ((self.alpha * x * x).exp() - self.edge).max(0.0)
    }
}

impl ReconstructionFilter for GaussianFilter {
    fn radius(&self) -> Vector2f {
        Vector2f::new(self.radius, self.radius)
    }

    fn eval(&self, offset: &Vector2f) -> Float {
        self.eval_1d(offset.x) * self.eval_1d(offset.y)
    }

    fn name(&self) -> &'static str {
        "gaussian"
    }
}
