// Copyright @yucwang 2026

use crate::core::error::{RenderError, RenderResult};
use crate::core::filter::ReconstructionFilter;
use crate::core::properties::Properties;
use crate::math::constants::{Float, Vector2f};

/// Separable triangle filter, normalized to unit integral.
pub struct TentFilter {
    radius: Float,
    inv_radius: Float,
}

impl TentFilter {
    pub fn new(radius: Float) -> RenderResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(RenderError::Parse(format!("tent radius must be positive, got {}", radius)));
        }
        Ok(Self { radius, inv_radius: 1.0 / radius })
    }

    pub fn from_properties(properties: &Properties) -> RenderResult<Self> {
        Self::new(properties.get_float("radius", 1.0)?)
    }

    fn eval_1d(&self, x: Float) -> Float {
        (1.0 - x.abs() * self.inv_radius).max(0.0) * self.inv_radius
    }
}

impl ReconstructionFilter for TentFilter {
    fn radius(&self) -> Vector2f {
        Vector2f::new(self.radius, self.radius)
    }

    fn eval(&self, offset: &Vector2f) -> Float {
        self.eval_1d(offset.x) * self.eval_1d(offset.y)
    }

    fn name(&self) -> &'static str {
        "tent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tent_weights() {
        let tent = TentFilter::new(1.0).unwrap();
        assert!((tent.eval(&Vector2f::new(0.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!((tent.eval(&Vector2f::new(0.5, 0.5)) - 0.25).abs() < 1e-6);
        assert_eq!(tent.eval(&Vector2f::new(1.0, 0.0)), 0.0);

        let wide = TentFilter::new(2.0).unwrap();
        assert!((wide.eval(&Vector2f::new(0.0, 0.0)) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_tent_rejects_degenerate_radius() {
        assert!(TentFilter::new(0.0).is_err());
        assert!(TentFilter::new(-1.0).is_err());
        assert!(TentFilter::new(Float::NAN).is_err());
        assert!(TentFilter::new(Float::INFINITY).is_err());
    }
}
