// Copyright @yucwang 2026

use crate::core::filter::ReconstructionFilter;
use crate::core::work::{RangeWorkUnit, WorkResult};
use crate::math::constants::{Float, Vector2f, Vector2u};
use crate::math::spectrum::{RGBSpectrum, SPECTRUM_SAMPLES};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Splat buffer of one capture work unit: the crop window padded by
/// `border` pixels on every side, plus the range it was traced from.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureWorkResult {
    crop_offset: Vector2u,
    crop_size: Vector2u,
    border: usize,
    full_size: Vector2u,
    pixels: Vec<RGBSpectrum>,
    range: RangeWorkUnit,
}

impl CaptureWorkResult {
    pub fn new(crop_offset: Vector2u, crop_size: Vector2u, border: usize) -> Self {
        let full_size = Vector2u::new(crop_size.x + 2 * border, crop_size.y + 2 * border);
        Self {
            crop_offset,
            crop_size,
            border,
            full_size,
            pixels: vec![RGBSpectrum::default(); full_size.x * full_size.y],
            range: RangeWorkUnit::default(),
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = RGBSpectrum::default();
        }
    }

    pub fn border(&self) -> usize {
        self.border
    }

    pub fn crop_size(&self) -> Vector2u {
        self.crop_size
    }

    pub fn full_size(&self) -> Vector2u {
        self.full_size
    }

    pub fn range(&self) -> &RangeWorkUnit {
        &self.range
    }

    pub fn set_range(&mut self, range: RangeWorkUnit) {
        self.range = range;
    }

    /// Pixel in buffer coordinates, border included.
    pub fn pixel(&self, x: usize, y: usize) -> RGBSpectrum {
        self.pixels[y * self.full_size.x + x]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut RGBSpectrum {
        &mut self.pixels[y * self.full_size.x + x]
    }

    /// Pixel relative to the crop window.
    pub fn crop_pixel(&self, x: usize, y: usize) -> RGBSpectrum {
        self.pixel(x + self.border, y + self.border)
    }

    pub fn total(&self) -> RGBSpectrum {
        let mut sum = RGBSpectrum::default();
        for pixel in &self.pixels {
            sum += *pixel;
        }
        sum
    }

    /// Spread `value` over every buffer pixel whose center lies inside the
    /// filter support around `sample` (film coordinates). Weights are the
    /// raw filter responses; nothing is renormalized.
    pub fn splat(&mut self, sample: &Vector2f, value: &RGBSpectrum, filter: &dyn ReconstructionFilter) {
        if !value.is_valid() {
            return;
        }
        let radius = filter.radius();
        let pos = Vector2f::new(
            sample.x - 0.5 - (self.crop_offset.x as Float - self.border as Float),
            sample.y - 0.5 - (self.crop_offset.y as Float - self.border as Float),
        );

        let min_x = (pos.x - radius.x).ceil().max(0.0) as i64;
        let min_y = (pos.y - radius.y).ceil().max(0.0) as i64;
        let max_x = ((pos.x + radius.x).floor() as i64).min(self.full_size.x as i64 - 1);
        let max_y = ((pos.y + radius.y).floor() as i64).min(self.full_size.y as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let offset = Vector2f::new(x as Float - pos.x, y as Float - pos.y);
                let weight = filter.eval(&offset);
                if weight != 0.0 {
                    *self.pixel_mut(x as usize, y as usize) += *value * weight;
                }
            }
        }
    }
}

impl WorkResult for CaptureWorkResult {
    fn save<W: Write>(&self, stream: &mut W) -> io::Result<()> {
        for pixel in &self.pixels {
            for channel in 0..SPECTRUM_SAMPLES {
                stream.write_f32::<LittleEndian>(pixel[channel])?;
            }
        }
        self.range.save(stream)
    }

    fn load<R: Read>(&mut self, stream: &mut R) -> io::Result<()> {
        for pixel in self.pixels.iter_mut() {
            for channel in 0..SPECTRUM_SAMPLES {
                pixel[channel] = stream.read_f32::<LittleEndian>()?;
            }
        }
        self.range.load(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::filter_border;
    use crate::core::rng::LcgRng;
    use crate::filters::box_filter::BoxFilter;
    use crate::filters::tabulated::TabulatedFilter;
    use crate::filters::tent::TentFilter;
    use std::io::{Cursor, Seek, SeekFrom};

    #[test]
    fn test_splat_between_pixels_covers_two_by_two() {
        let tent = TentFilter::new(1.0).unwrap();
        let border = filter_border(&tent);
        assert_eq!(border, 1);
        let mut result = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(6, 6), border);
        result.splat(&Vector2f::new(3.0, 2.0), &RGBSpectrum::splat(4.0), &tent);

        for y in 0..result.full_size().y {
            for x in 0..result.full_size().x {
                let expected = if (x == 3 || x == 4) && (y == 2 || y == 3) { 1.0 } else { 0.0 };
                assert!((result.pixel(x, y)[0] - expected).abs() < 1e-5, "pixel ({}, {})", x, y);
            }
        }
        assert!((result.total()[1] - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_splat_at_pixel_center() {
        let tent = TabulatedFilter::new(&TentFilter::new(1.0).unwrap());
        let mut result = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(4, 4), 1);
        result.splat(&Vector2f::new(1.5, 2.5), &RGBSpectrum::splat(2.0), &tent);
        assert!((result.crop_pixel(1, 2)[2] - 2.0).abs() < 1e-5);
        assert!((result.total()[2] - 2.0).abs() < 1e-5);

        let pixel_box = BoxFilter::new(0.5).unwrap();
        let mut unpadded = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(4, 4), 0);
        unpadded.splat(&Vector2f::new(0.5, 3.5), &RGBSpectrum::splat(1.0), &pixel_box);
        assert_eq!(unpadded.crop_pixel(0, 3), RGBSpectrum::splat(1.0));
        assert_eq!(unpadded.total(), RGBSpectrum::splat(1.0));
    }

    #[test]
    fn test_splat_honours_crop_offset_and_edges() {
        let tent = TentFilter::new(1.0).unwrap();
        let mut result = CaptureWorkResult::new(Vector2u::new(10, 20), Vector2u::new(4, 4), 1);
        result.splat(&Vector2f::new(10.5, 20.5), &RGBSpectrum::splat(1.0), &tent);
        assert!((result.crop_pixel(0, 0)[0] - 1.0).abs() < 1e-5);

        // A footprint straddling the crop corner lands partly in the border.
        result.clear();
        result.splat(&Vector2f::new(10.0, 20.0), &RGBSpectrum::splat(1.0), &tent);
        assert!((result.total()[0] - 1.0).abs() < 1e-5);
        assert!((result.pixel(0, 0)[0] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut rng = LcgRng::new(3);
        let mut result = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(3, 2), 1);
        for y in 0..result.full_size().y {
            for x in 0..result.full_size().x {
                *result.pixel_mut(x, y) = RGBSpectrum::new(rng.next_f32(), rng.next_f32(), rng.next_f32());
            }
        }
        result.set_range(RangeWorkUnit::new(10, 5));

        let mut file = tempfile::tempfile().unwrap();
        result.save(&mut file).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let mut loaded = CaptureWorkResult::new(Vector2u::new(0, 0), Vector2u::new(3, 2), 1);
        loaded.load(&mut file).unwrap();
        assert_eq!(loaded, result);
        assert_eq!(loaded.range().start(), 10);
        assert_eq!(loaded.range().size(), 5);

        let mut bytes = Vec::new();
        result.save(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 5 * 4 * SPECTRUM_SAMPLES * 4 + 16);
        let mut truncated = loaded.clone();
        assert!(truncated.load(&mut Cursor::new(&bytes[..bytes.len() - 1])).is_err());
    }
}
