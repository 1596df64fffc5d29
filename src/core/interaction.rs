// Copyright @yucwang 2023

use crate::core::bsdf::BSDF;
use crate::core::medium::Medium;
use crate::math::constants::{ Float, Vector2f, Vector3f, EPSILON };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct SurfaceIntersection {
    p: Vector3f,
    geo_normal: Vector3f,
    sh_frame: Frame,
    uv: Vector2f,
    t: Float,
    wi: Vector3f,
    material: Option<Arc<dyn BSDF>>,
    object_index: Option<usize>,
}

impl fmt::Debug for SurfaceIntersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceIntersection")
            .field("p", &self.p)
            .field("geo_normal", &self.geo_normal)
            .field("t", &self.t)
            .field("material", &self.material.as_ref().map(|m| m.name()))
            .field("object_index", &self.object_index)
            .finish()
    }
}

pub struct SurfaceSampleRecord {
    pub p: Vector3f,
    pub normal: Vector3f,
    pub pdf: Float,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f,
               new_geo_normal: Vector3f,
               new_sh_normal: Vector3f,
               new_uv: Vector2f,
               new_t: Float) -> Self {
        Self { p: new_p, geo_normal: new_geo_normal, sh_frame: Frame::from_normal(&new_sh_normal),
               uv: new_uv, t: new_t, wi: Vector3f::new(0.0, 0.0, 1.0), material: None,
               object_index: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    pub fn geo_normal(&self) -> Vector3f {
        self.geo_normal
    }

    pub fn sh_normal(&self) -> Vector3f {
        self.sh_frame.z
    }

    pub fn sh_frame(&self) -> &Frame {
        &self.sh_frame
    }

    /// Incident direction in the local shading frame (towards where the
    /// path came from).
    pub fn wi(&self) -> Vector3f {
        self.wi
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    pub fn material(&self) -> Option<&dyn BSDF> {
        self.material.as_deref()
    }

    pub fn object_index(&self) -> Option<usize> {
        self.object_index
    }

    pub fn with_material(mut self, new_material: Arc<dyn BSDF>) -> Self {
        self.material = Some(new_material);
        self
    }

    pub fn with_object_index(mut self, object_index: Option<usize>) -> Self {
        self.object_index = object_index;
        self
    }

    pub fn with_incident(mut self, world_wi: &Vector3f) -> Self {
        self.wi = self.sh_frame.to_local(world_wi);
        self
    }

    pub fn spawn_ray(&self, dir: &Vector3f) -> Ray3f {
        Ray3f::new(self.p, *dir, Some(EPSILON), None)
    }
}

/// Scattering location sampled inside a participating medium.
#[derive(Clone)]
pub struct MediumInteraction {
    pub p: Vector3f,
    pub t: Float,
    pub medium: Arc<dyn Medium>,
    pub sigma_s: RGBSpectrum,
    pub transmittance: RGBSpectrum,
}

impl fmt::Debug for MediumInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediumInteraction")
            .field("p", &self.p)
            .field("t", &self.t)
            .field("sigma_s", &self.sigma_s)
            .field("transmittance", &self.transmittance)
            .finish()
    }
}
