// Copyright @yucwang 2026

use crate::core::sensor::{inside_crop, Sensor, SensorKind};
use crate::math::constants::{Float, Vector2f, Vector2u, Vector3f};
use crate::math::ray::Ray3f;

pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    near_clip: Float,
    far_clip: Float,
    film_size: Vector2u,
    crop_offset: Vector2u,
    crop_size: Vector2u,
    inv_image_plane_area: Float,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize,
               near_clip: Float,
               far_clip: Float) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();
        let tan_half_fov_y = (0.5 * fov_y_radians).tan();
        let aspect = width as Float / height.max(1) as Float;
        // Image plane at unit distance spans 2 * aspect * tan by 2 * tan.
        let image_plane_area = 4.0 * aspect * tan_half_fov_y * tan_half_fov_y;

        Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y,
            aspect,
            near_clip,
            far_clip,
            film_size: Vector2u::new(width, height),
            crop_offset: Vector2u::new(0, 0),
            crop_size: Vector2u::new(width, height),
            inv_image_plane_area: 1.0 / image_plane_area,
        }
    }

    /// Restrict rendering to a sub-window of the film. The window is clamped
    /// to the film.
    pub fn with_crop(mut self, offset: Vector2u, size: Vector2u) -> Self {
        let x = offset.x.min(self.film_size.x);
        let y = offset.y.min(self.film_size.y);
        self.crop_offset = Vector2u::new(x, y);
        self.crop_size = Vector2u::new(size.x.min(self.film_size.x - x), size.y.min(self.film_size.y - y));
        self
    }

    pub fn width(&self) -> usize {
        self.film_size.x
    }

    pub fn height(&self) -> usize {
        self.film_size.y
    }

    /// Camera-space direction (unnormalized, z = 1) through a normalized
    /// film position `u` in `[0, 1]^2`.
    fn film_direction(&self, u: &Vector2f) -> Vector3f {
        let px = (2.0 * u.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * u.y) * self.tan_half_fov_y;
        Vector3f::new(px, py, 1.0)
    }

    /// Primary ray through a normalized film position `u` in `[0, 1]^2`.
    pub fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let d_camera = self.film_direction(u).normalize();
        let dir = (self.right * d_camera.x + self.up * d_camera.y + self.forward * d_camera.z).normalize();

        let inv_z = if d_camera.z != 0.0 { 1.0 / d_camera.z } else { std::f32::MAX };
        let near_t = self.near_clip * inv_z;
        let far_t = self.far_clip * inv_z;
        let origin = self.origin + dir * near_t;
        let max_t = far_t - near_t;
        Ray3f::new(origin, dir, Some(0.0), Some(max_t))
    }
}

impl Sensor for PerspectiveCamera {
    fn kind(&self) -> SensorKind {
        SensorKind::Pinhole
    }

    fn film_size(&self) -> Vector2u {
        self.film_size
    }

    fn crop_offset(&self) -> Vector2u {
        self.crop_offset
    }

    fn crop_size(&self) -> Vector2u {
        self.crop_size
    }

    fn position_to_sample(&self, p: &Vector3f) -> Option<Vector2f> {
        let d = p - self.origin;
        let z = d.dot(&self.forward);
        if z <= self.near_clip.max(0.0) || z >= self.far_clip {
            return None;
        }

        let px = d.dot(&self.right) / z;
        let py = d.dot(&self.up) / z;
        let u = 0.5 * (px / (self.aspect * self.tan_half_fov_y) + 1.0);
        let v = 0.5 * (1.0 - py / self.tan_half_fov_y);
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }

        let sample = Vector2f::new(u * self.film_size.x as Float, v * self.film_size.y as Float);
        if inside_crop(&sample, &self.crop_offset, &self.crop_size) {
            Some(sample)
        } else {
            None
        }
    }

    fn position(&self, _sample: &Vector2f) -> Vector3f {
        self.origin
    }

    /// Importance per unit solid angle times the cosine at the aperture,
    /// normalized so the whole image plane integrates to one.
    fn importance(&self, sample: &Vector2f) -> Float {
        let u = Vector2f::new(sample.x / self.film_size.x as Float, sample.y / self.film_size.y as Float);
        let d = self.film_direction(&u);
        let cos_theta = 1.0 / d.norm();
        self.inv_image_plane_area / (cos_theta * cos_theta * cos_theta)
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera[{}x{}, crop {:?} + {:?}]",
                self.film_size.x, self.film_size.y,
                (self.crop_offset.x, self.crop_offset.y),
                (self.crop_size.x, self.crop_size.y))
    }
}
