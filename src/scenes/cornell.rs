// Copyright @yucwang 2026

use crate::core::scene::{BasicScene, SceneObject};
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::media::homogeneous_medium::HomogeneousMedium;
use crate::media::phase::HenyeyGreensteinPhaseFunction;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;

use std::sync::Arc;

/// Box spanning `[-1, 1]^3`, open towards +z, lit by a small ceiling
/// light. With `fog` the whole scene sits in a thin forward-scattering
/// medium.
pub fn cornell_box(fog: bool) -> BasicScene {
    let white = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.73)));
    let red = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.63, 0.065, 0.05)));
    let green = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.14, 0.45, 0.091)));

    let x = Vector3f::new(1.0, 0.0, 0.0);
    let y = Vector3f::new(0.0, 1.0, 0.0);
    let z = Vector3f::new(0.0, 0.0, 1.0);
    let wall = |center: Vector3f, half_u: Vector3f, half_v: Vector3f| {
        Arc::new(Rectangle::new(center, half_u, half_v))
    };

    let mut scene = BasicScene::new();
    scene.add_object(SceneObject::new(wall(-y, x, z), white.clone()).with_name(String::from("floor")));
    scene.add_object(SceneObject::new(wall(y, x, z), white.clone()).with_name(String::from("ceiling")));
    scene.add_object(SceneObject::new(wall(-z, x, y), white.clone()).with_name(String::from("back")));
    scene.add_object(SceneObject::new(wall(-x, y, z), red).with_name(String::from("left")));
    scene.add_object(SceneObject::new(wall(x, y, z), green).with_name(String::from("right")));
    scene.add_object(SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.35, -0.6, -0.3), 0.4)), white.clone())
        .with_name(String::from("ball")));

    // Facing down: (0.25 x) cross (0.25 z) points along -y.
    let light = Rectangle::new(Vector3f::new(0.0, 0.99, 0.0), x * 0.25, z * 0.25);
    scene.add_object(SceneObject::with_emission(Arc::new(light), white, RGBSpectrum::new(17.0, 12.0, 4.0))
        .with_name(String::from("light")));

    if fog {
        let medium = HomogeneousMedium::new(RGBSpectrum::splat(0.25), RGBSpectrum::splat(0.8))
            .with_phase_function(Box::new(HenyeyGreensteinPhaseFunction::new(0.3)));
        scene.set_medium(Some(Arc::new(medium)));
    }
    scene
}

/// Pinhole camera looking into the open side of `cornell_box`.
pub fn cornell_camera(width: usize, height: usize) -> PerspectiveCamera {
    let fov_y: Float = 40.0;
    PerspectiveCamera::new(Vector3f::new(0.0, 0.0, 3.5),
                           Vector3f::zeros(),
                           Vector3f::new(0.0, 1.0, 0.0),
                           fov_y.to_radians(),
                           width,
                           height,
                           1e-2,
                           1e2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::Scene;
    use crate::core::sensor::Sensor;
    use crate::math::constants::Vector2f;

    #[test]
    fn test_cornell_box_layout() {
        let scene = cornell_box(true);
        assert_eq!(scene.len(), 7);
        assert_eq!(scene.emitters().len(), 1);
        assert!(scene.medium().is_some());

        let camera = cornell_camera(32, 32);
        // The floor under the light is in view and not hidden by the walls.
        let floor_point = Vector3f::new(-0.3, -0.999, 0.2);
        assert!(camera.position_to_sample(&floor_point).is_some());
        assert!(!scene.is_occluded(&camera.position(&Vector2f::zeros()), &floor_point));
    }
}
