// Copyright @yucwang 2026

use crate::core::filter::ReconstructionFilter;
use crate::math::constants::{Float, Vector2f};

pub const FILTER_RESOLUTION: usize = 32;

/// Lookup-table copy of a filter over one quadrant of its support, sampled
/// on a `(FILTER_RESOLUTION + 1)^2` grid and read back with nearest-neighbour
/// lookups. Evaluation is symmetric in both axes.
pub struct TabulatedFilter {
    name: &'static str,
    radius: Vector2f,
    factor: Vector2f,
    values: Vec<Float>,
}

impl TabulatedFilter {
    pub fn new(filter: &dyn ReconstructionFilter) -> Self {
        let radius = filter.radius();
        let n = FILTER_RESOLUTION + 1;
        let mut values = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                let offset = Vector2f::new(
                    x as Float / FILTER_RESOLUTION as Float * radius.x,
                    y as Float / FILTER_RESOLUTION as Float * radius.y,
                );
                values.push(filter.eval(&offset));
            }
        }

        Self {
            name: filter.name(),
            radius,
            factor: Vector2f::new(FILTER_RESOLUTION as Float / radius.x,
                                  FILTER_RESOLUTION as Float / radius.y),
            values,
        }
    }
}

impl ReconstructionFilter for TabulatedFilter {
    fn radius(&self) -> Vector2f {
        self.radius
    }

    fn eval(&self, offset: &Vector2f) -> Float {
        let x = (offset.x.abs() * self.factor.x).round() as usize;
        let y = (offset.y.abs() * self.factor.y).round() as usize;
        if x > FILTER_RESOLUTION || y > FILTER_RESOLUTION {
            return 0.0;
        }
        self.values[y * (FILTER_RESOLUTION + 1) + x]
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
