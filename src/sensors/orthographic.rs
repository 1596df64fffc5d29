// Copyright @yucwang 2026

use crate::core::sensor::{inside_crop, Sensor, SensorKind};
use crate::math::constants::{Float, Vector2f, Vector2u, Vector3f};

/// Parallel-projection sensor whose aperture is a `2 * half_width` by
/// `2 * half_height` rectangle facing `forward`.
pub struct OrthographicCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    half_width: Float,
    half_height: Float,
    film_size: Vector2u,
}

impl OrthographicCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               half_width: Float,
               half_height: Float,
               width: usize,
               height: usize) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();
        Self { origin, forward, right, up, half_width, half_height,
               film_size: Vector2u::new(width, height) }
    }

    fn aperture_area(&self) -> Float {
        4.0 * self.half_width * self.half_height
    }
}

impl Sensor for OrthographicCamera {
    fn kind(&self) -> SensorKind {
        SensorKind::Area
    }

    fn film_size(&self) -> Vector2u {
        self.film_size
    }

    fn crop_offset(&self) -> Vector2u {
        Vector2u::new(0, 0)
    }

    fn crop_size(&self) -> Vector2u {
        self.film_size
    }

    fn position_to_sample(&self, p: &Vector3f) -> Option<Vector2f> {
        let d = p - self.origin;
        if d.dot(&self.forward) <= 0.0 {
            return None;
        }

        let u = 0.5 * (d.dot(&self.right) / self.half_width + 1.0);
        let v = 0.5 * (1.0 - d.dot(&self.up) / self.half_height);
        let sample = Vector2f::new(u * self.film_size.x as Float, v * self.film_size.y as Float);
        if inside_crop(&sample, &self.crop_offset(), &self.film_size) {
            Some(sample)
        } else {
            None
        }
    }

    fn position(&self, sample: &Vector2f) -> Vector3f {
        let x = (2.0 * sample.x / self.film_size.x as Float - 1.0) * self.half_width;
        let y = (1.0 - 2.0 * sample.y / self.film_size.y as Float) * self.half_height;
        self.origin + self.right * x + self.up * y
    }

    /// Area Jacobian of the film-to-aperture mapping (aperture area per unit
    /// of normalized film), so `1 / area_density` is the per-area importance.
    fn area_density(&self, _sample: &Vector2f) -> Float {
        self.aperture_area()
    }

    fn describe(&self) -> String {
        format!("OrthographicCamera[{}x{}, aperture {} x {}]",
                self.film_size.x, self.film_size.y,
                2.0 * self.half_width, 2.0 * self.half_height)
    }
}
