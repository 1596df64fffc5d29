/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector2u = na::Vector2<usize>;
pub type Vector3f = na::Vector3<Float>;
pub type Vector4f = na::Vector4<Float>;

pub const EPSILON: Float = 1e-4;
pub const SHADOW_EPSILON: Float = 1e-3;
pub const ONE_MINUS_EPSILON: Float = 0.99999994;
pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;
pub const INV_TWO_PI: Float = 0.15915494309;
pub const INV_FOUR_PI: Float = 0.07957747154;
pub const SQUARE_2: Float = 1.41421356;
pub const INV_SQUARE_2: Float = 0.70710678;
