// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, SHADOW_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::MAX)}
    }

    /// Segment from `from` towards `to`, shortened at both ends to avoid
    /// self-intersection.
    pub fn between(from: &Vector3f, to: &Vector3f) -> Self {
        let d = to - from;
        let dist = d.norm();
        Self { origin: *from, dir: d / dist,
               min_t: SHADOW_EPSILON,
               max_t: dist * (1.0 - SHADOW_EPSILON) }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn update(&mut self, t: Float) -> bool {
        if t < self.min_t || t > self.max_t {
            false
        } else {
            self.max_t = t;
            true
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

/* Tests for Ray */
