// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

/// Image reconstruction filter. `eval` takes an offset from the sample
/// position in pixels and is zero outside `[-radius, radius]`.
pub trait ReconstructionFilter: Send + Sync {
    fn radius(&self) -> Vector2f;

    fn eval(&self, offset: &Vector2f) -> Float;

    fn name(&self) -> &'static str;
}

/// Padding in pixels a splat buffer needs around its crop window so that
/// every footprint touching the crop stays inside the buffer.
pub fn filter_border(filter: &dyn ReconstructionFilter) -> usize {
    let radius = filter.radius();
    (radius.x.max(radius.y) - 0.5).ceil().max(0.0) as usize
}
