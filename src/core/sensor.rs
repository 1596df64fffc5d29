// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector2u, Vector3f};

/// Closed set of sensor families. Decides how the measurement importance
/// of a splat is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Single aperture point; exposes `importance`.
    Pinhole,
    /// Finite aperture area; exposes `area_density`.
    Area,
}

/// Sensor sample coordinates are continuous pixel positions on the full
/// film, pixel `(x, y)` covering `[x, x + 1) x [y, y + 1)`.
pub trait Sensor: Send + Sync {
    fn kind(&self) -> SensorKind;

    fn film_size(&self) -> Vector2u;
    fn crop_offset(&self) -> Vector2u;
    fn crop_size(&self) -> Vector2u;

    /// Project a world position onto the film. `None` if the point is not
    /// seen by the sensor or falls outside the crop window.
    fn position_to_sample(&self, p: &Vector3f) -> Option<Vector2f>;

    /// Aperture position that observes the given sample.
    fn position(&self, sample: &Vector2f) -> Vector3f;

    fn importance(&self, _sample: &Vector2f) -> Float {
        0.0
    }

    fn area_density(&self, _sample: &Vector2f) -> Float {
        0.0
    }

    fn describe(&self) -> String {
        String::from("Sensor")
    }
}

pub(crate) fn inside_crop(sample: &Vector2f, offset: &Vector2u, size: &Vector2u) -> bool {
    sample.x >= offset.x as Float
        && sample.y >= offset.y as Float
        && sample.x < (offset.x + size.x) as Float
        && sample.y < (offset.y + size.y) as Float
}
