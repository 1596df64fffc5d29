// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::emitter::{DirectionSample, Emitter, PositionSample};
use crate::core::interaction::{MediumInteraction, SurfaceIntersection};
use crate::core::medium::{DistanceSample, Medium};
use crate::core::shape::Shape;
use crate::emitters::area::AreaEmitter;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// Emission sampled from one emitter: origin, direction and the power the
/// departing particle carries (position weight times direction weight).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionSample {
    pub position: PositionSample,
    pub direction: DirectionSample,
}

impl EmissionSample {
    pub fn power(&self) -> RGBSpectrum {
        self.position.weight * self.direction.weight
    }
}

/// Result of sampling a participating medium along a ray segment.
pub enum MediumSample {
    Scattered(MediumInteraction, RGBSpectrum),
    Passed(RGBSpectrum),
}

/// Query interface the light-transport core needs from a scene.
pub trait Scene: Send + Sync {
    fn emitters(&self) -> &[Arc<dyn Emitter>];

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection>;

    /// True when anything blocks the open segment between `a` and `b`.
    fn is_occluded(&self, a: &Vector3f, b: &Vector3f) -> bool;

    /// Spectral transmittance along `[ray.min_t, ray.max_t]`.
    fn attenuation(&self, _ray: &Ray3f) -> RGBSpectrum {
        RGBSpectrum::splat(1.0)
    }

    /// Free-flight sampling along `[ray.min_t, ray.max_t]`.
    fn sample_medium(&self, _ray: &Ray3f, _u: Float) -> MediumSample {
        MediumSample::Passed(RGBSpectrum::splat(1.0))
    }

    fn sample_emission(&self, emitter: &dyn Emitter, u_position: &Vector2f, u_direction: &Vector2f) -> EmissionSample {
        let position = emitter.sample_position(u_position);
        let direction = emitter.sample_direction(u_direction, &position);
        EmissionSample { position, direction }
    }

    fn total_emitted_power(&self) -> RGBSpectrum {
        let mut total = RGBSpectrum::default();
        for emitter in self.emitters() {
            total += emitter.power();
        }
        total
    }
}

pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub material: Arc<dyn BSDF>,
    pub emission: RGBSpectrum,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn BSDF>) -> Self {
        Self { shape, material, emission: RGBSpectrum::default(), name: None }
    }

    pub fn with_emission(shape: Arc<dyn Shape>, material: Arc<dyn BSDF>, emission: RGBSpectrum) -> Self {
        Self { shape, material, emission, name: None }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }
}

/// Linear-scan scene: a list of objects, the emitters derived from the
/// emissive ones plus any added explicitly, and an optional medium filling
/// all of space.
pub struct BasicScene {
    objects: Vec<SceneObject>,
    emitters: Vec<Arc<dyn Emitter>>,
    medium: Option<Arc<dyn Medium>>,
}

impl Default for BasicScene {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicScene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            emitters: Vec::new(),
            medium: None,
        }
    }

    pub fn add_object(&mut self, object: SceneObject) {
        if !object.emission.is_black() {
            self.emitters.push(Arc::new(AreaEmitter::from_shape(
                object.shape.clone(),
                object.emission,
            )));
        }
        self.objects.push(object);
    }

    pub fn add_emitter(&mut self, emitter: Arc<dyn Emitter>) {
        self.emitters.push(emitter);
    }

    pub fn set_medium(&mut self, medium: Option<Arc<dyn Medium>>) {
        self.medium = medium;
    }

    pub fn medium(&self) -> Option<&Arc<dyn Medium>> {
        self.medium.as_ref()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Scene for BasicScene {
    fn emitters(&self) -> &[Arc<dyn Emitter>] {
        &self.emitters
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let mut closest: Option<(usize, SurfaceIntersection)> = None;
        let mut ray = *ray;
        for (idx, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.shape.ray_intersection(&ray) {
                if ray.update(hit.t()) {
                    closest = Some((idx, hit));
                }
            }
        }

        closest.map(|(idx, hit)| {
            hit.with_material(self.objects[idx].material.clone())
                .with_object_index(Some(idx))
                .with_incident(&(-ray.dir()))
        })
    }

    fn is_occluded(&self, a: &Vector3f, b: &Vector3f) -> bool {
        let ray = Ray3f::between(a, b);
        self.objects.iter().any(|object| object.shape.ray_intersection_t(&ray))
    }

    fn attenuation(&self, ray: &Ray3f) -> RGBSpectrum {
        match &self.medium {
            Some(medium) => medium.transmittance(ray),
            None => RGBSpectrum::splat(1.0),
        }
    }

    fn sample_medium(&self, ray: &Ray3f, u: Float) -> MediumSample {
        let medium = match &self.medium {
            Some(medium) => medium,
            None => return MediumSample::Passed(RGBSpectrum::splat(1.0)),
        };

        match medium.sample_distance(ray, u) {
            DistanceSample::Scattered { t, sigma_s, transmittance, weight } => {
                let interaction = MediumInteraction {
                    p: ray.at(t),
                    t,
                    medium: medium.clone(),
                    sigma_s,
                    transmittance,
                };
                MediumSample::Scattered(interaction, weight)
            }
            DistanceSample::Passed { weight } => MediumSample::Passed(weight),
        }
    }
}
