// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Which quantity a path carries. Particle paths carry importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

// Definitions of types used in BSDF sampling and eval
// processes. Directions are in the local shading frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSampleRecord {
    pub wi: Vector3f,
    pub wo: Vector3f,
    pub pdf: Float,
    pub mode: TransportMode,
}

impl BSDFSampleRecord {
    pub fn new(wi: Vector3f, wo: Vector3f, mode: TransportMode) -> Self {
        Self { wi, wo, pdf: 0.0, mode }
    }
}

pub trait BSDF: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// f(wi, wo) * |cos(wo)|.
    fn eval_cos(&self, record: &BSDFSampleRecord) -> RGBSpectrum;

    /// Sample an outgoing direction for `wi`. Fills `wo` and `pdf` of the
    /// returned record and returns the weight f * |cos(wo)| / pdf, or `None`
    /// when the sample carries no energy.
    fn sample(&self, wi: &Vector3f, u: &Vector2f, mode: TransportMode)
        -> Option<(BSDFSampleRecord, RGBSpectrum)>;
}
