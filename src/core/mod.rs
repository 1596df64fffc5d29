// Copyright @yucwang 2021

pub mod bsdf;
pub mod config;
pub mod emitter;
pub mod error;
pub mod filter;
pub mod interaction;
pub mod medium;
pub mod path;
pub mod properties;
pub mod registry;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod sensor;
pub mod shape;
pub mod vpl;
pub mod work;
