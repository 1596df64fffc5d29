// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector4f };

use std::ops;
use std::vec::Vec;

/// Dense RGBA float image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    data: Vec<Vector4f>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector4f;

    fn index(&self, index: (usize, usize)) -> &Vector4f {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Vector4f {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_number = width * height;
        Self { data: vec!(Vector4f::new(0.0, 0.0, 0.0, 0.0);
                          pixel_number),
               width: width,
               height: height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn clear(&mut self) {
        for pixel in self.data.iter_mut() {
            *pixel = Vector4f::zeros();
        }
    }

    pub fn pixels(&self) -> &[Vector4f] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Vector4f] {
        &mut self.data
    }

    /// RGB triples in row-major order, alpha dropped.
    pub fn raw_rgb(&self) -> Vec<(Float, Float, Float)> {
        self.data.iter().map(|p| (p[0], p[1], p[2])).collect()
    }
}

/* Test for Bitmap */
