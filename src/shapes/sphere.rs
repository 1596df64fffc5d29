// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::constants::{Float, Vector2f, Vector3f, INV_PI, INV_TWO_PI, PI};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius }
    }

    fn intersect_t(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(&ray.dir());
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t0 = -b - sqrt_d;
        let t1 = -b + sqrt_d;
        if ray.test_segment(t0) {
            Some(t0)
        } else if ray.test_segment(t1) {
            Some(t1)
        } else {
            None
        }
    }
}

impl Shape for Sphere {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.intersect_t(ray)?;
        let p = ray.at(t);
        let n = (p - self.center) / self.radius;
        let phi = n.y.atan2(n.x);
        let uv = Vector2f::new((phi + PI) * INV_TWO_PI, n.z.max(-1.0).min(1.0).acos() * INV_PI);
        Some(SurfaceIntersection::new(p, n, n, uv, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_t(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let n = sample_uniform_sphere(u);
        SurfaceSampleRecord {
            p: self.center + n * self.radius,
            normal: n,
            pdf: 1.0 / self.surface_area(),
        }
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_from_outside_and_inside() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("expected hit");
        assert!((hit.t() - 4.0).abs() < 1e-4);
        assert!((hit.geo_normal() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-4);

        let inside = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&inside).expect("expected hit");
        assert!((hit.t() - 1.0).abs() < 1e-4);

        let miss = Ray3f::new(Vector3f::new(2.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(!sphere.ray_intersection_t(&miss));
    }
}
