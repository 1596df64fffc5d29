// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Parallelogram `center + s * half_u + t * half_v`, `s, t` in `[-1, 1]`.
/// The normal is `half_u x half_v`.
pub struct Rectangle {
    center: Vector3f,
    half_u: Vector3f,
    half_v: Vector3f,
    normal: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Rectangle {
    pub fn new(center: Vector3f, half_u: Vector3f, half_v: Vector3f) -> Self {
        let cross = half_u.cross(&half_v);
        let area = 4.0 * cross.norm();
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        let normal = if area > 0.0 { cross.normalize() } else { Vector3f::new(0.0, 0.0, 1.0) };

        Self { center, half_u, half_v, normal, area, inv_area }
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    fn intersect_local(&self, ray: &Ray3f) -> Option<(Float, Vector2f)> {
        let denom = ray.dir().dot(&self.normal);
        if denom.abs() < EPSILON {
            return None;
        }

        let t = (self.center - ray.origin()).dot(&self.normal) / denom;
        if !ray.test_segment(t) {
            return None;
        }

        let local = ray.at(t) - self.center;
        let s = local.dot(&self.half_u) / self.half_u.norm_squared();
        let r = local.dot(&self.half_v) / self.half_v.norm_squared();
        if s.abs() > 1.0 || r.abs() > 1.0 {
            return None;
        }

        Some((t, Vector2f::new(0.5 * (s + 1.0), 0.5 * (r + 1.0))))
    }
}

impl Shape for Rectangle {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, uv) = self.intersect_local(ray)?;
        Some(SurfaceIntersection::new(ray.at(t), self.normal, self.normal, uv, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_local(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let p = self.center
            + (2.0 * u.x - 1.0) * self.half_u
            + (2.0 * u.y - 1.0) * self.half_v;
        SurfaceSampleRecord { p, normal: self.normal, pdf: self.inv_area }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_intersection() {
        let rect = Rectangle::new(Vector3f::new(0.0, 0.0, 2.0),
                                  Vector3f::new(1.0, 0.0, 0.0),
                                  Vector3f::new(0.0, 2.0, 0.0));
        assert!((rect.surface_area() - 8.0).abs() < 1e-5);
        assert!((rect.normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        let hit_ray = Ray3f::new(Vector3f::new(0.5, 1.5, 0.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = rect.ray_intersection(&hit_ray).expect("expected hit");
        assert!((hit.t() - 2.0).abs() < 1e-5);
        assert!((hit.uv() - Vector2f::new(0.75, 0.875)).norm() < 1e-5);

        let miss_ray = Ray3f::new(Vector3f::new(1.5, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(!rect.ray_intersection_t(&miss_ray));

        let short_ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, Some(1.0));
        assert!(rect.ray_intersection(&short_ray).is_none());
    }

    #[test]
    fn test_rectangle_sampling_stays_on_surface() {
        let rect = Rectangle::new(Vector3f::new(1.0, 1.0, 1.0),
                                  Vector3f::new(0.5, 0.0, 0.0),
                                  Vector3f::new(0.0, 0.0, 0.5));
        let sample = rect.sample(&Vector2f::new(0.9, 0.1));
        assert!((sample.p.y - 1.0).abs() < 1e-6);
        assert!((sample.pdf - 1.0).abs() < 1e-6);
    }
}
