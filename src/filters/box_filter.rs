// Copyright @yucwang 2026

use crate::core::error::{RenderError, RenderResult};
use crate::core::filter::ReconstructionFilter;
use crate::core::properties::Properties;
use crate::math::constants::{Float, Vector2f};

pub struct BoxFilter {
    radius: Float,
}

impl BoxFilter {
    pub fn new(radius: Float) -> RenderResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(RenderError::Parse(format!("box radius must be positive, got {}", radius)));
        }
        Ok(Self { radius })
    }

    pub fn from_properties(properties: &Properties) -> RenderResult<Self> {
        Self::new(properties.get_float("radius", 0.5)?)
    }
}

impl ReconstructionFilter for BoxFilter {
    fn radius(&self) -> Vector2f {
        Vector2f::new(self.radius, self.radius)
    }

    fn eval(&self, offset: &Vector2f) -> Float {
        if offset.x.abs() <= self.radius && offset.y.abs() <= self.radius {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &'static str {
        "box"
    }
}
