// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterFlag(u8);

impl EmitterFlag {
    pub const NONE: Self = Self(0);
    pub const SURFACE: Self = Self(1 << 0);
    pub const DELTA_POSITION: Self = Self(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for EmitterFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EmitterFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A sampled emission location. `weight` is the spatially integrated
/// power divided by the sampling density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub p: Vector3f,
    pub n: Vector3f,
    pub pdf: Float,
    pub weight: RGBSpectrum,
}

/// A sampled emission direction. `weight` is the directional profile
/// (including the cosine for surface emitters) divided by `pdf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionSample {
    pub d: Vector3f,
    pub pdf: Float,
    pub weight: RGBSpectrum,
}

pub trait Emitter: Send + Sync {
    fn get_flag(&self) -> EmitterFlag;

    /// Total emitted power.
    fn power(&self) -> RGBSpectrum;

    fn sample_position(&self, u: &Vector2f) -> PositionSample;
    fn sample_direction(&self, u: &Vector2f, position: &PositionSample) -> DirectionSample;

    fn describe(&self) -> String {
        String::from("Emitter")
    }
}
