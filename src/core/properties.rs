// Copyright @yucwang 2026

use crate::core::error::{RenderError, RenderResult};
use crate::math::constants::Float;
use std::collections::HashMap;

/// Untyped name/value bag handed to factories; values are parsed on access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self { values: HashMap::new() }
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.values.get(name).cloned().unwrap_or_else(|| default.to_string())
    }

    pub fn get_float(&self, name: &str, default: Float) -> RenderResult<Float> {
        match self.values.get(name) {
            Some(v) => v.trim().parse::<Float>()
                .map_err(|_| RenderError::Parse(format!("invalid float for {}: {}", name, v))),
            None => Ok(default),
        }
    }

    pub fn get_integer(&self, name: &str, default: i64) -> RenderResult<i64> {
        match self.values.get(name) {
            Some(v) => v.trim().parse::<i64>()
                .map_err(|_| RenderError::Parse(format!("invalid integer for {}: {}", name, v))),
            None => Ok(default),
        }
    }

    pub fn get_boolean(&self, name: &str, default: bool) -> RenderResult<bool> {
        match self.values.get(name).map(|v| v.trim()) {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(v) => Err(RenderError::Parse(format!("invalid boolean for {}: {}", name, v))),
            None => Ok(default),
        }
    }
}
