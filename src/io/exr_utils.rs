/* Copyright 2020 @TwoCookingMice */

use crate::core::error::{RenderError, RenderResult};
use crate::math::bitmap::Bitmap;

use exr::prelude::*;
use std::path::Path;

// Write the RGB channels of a bitmap as an OpenEXR image
pub fn write_exr_to_file<P: AsRef<Path>>(image: &Bitmap, file_path: P) -> RenderResult<()> {
    let file_path = file_path.as_ref();
    log::info!("Starting writing openexr images: {}.", file_path.display());

    let width = image.width();
    write_rgb_file(file_path, width, image.height(), |x, y| {
        let pixel = image.pixels()[y * width + x];
        (pixel[0], pixel[1], pixel[2])
    })
    .map_err(|e| RenderError::Image(e.to_string()))?;

    log::info!("EXR written to: {}.", file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector4f;

    #[test]
    fn test_write_exr() {
        let mut image = Bitmap::new(3, 2);
        image[(2, 1)] = Vector4f::new(1.0, 0.5, 0.25, 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("developed.exr");
        write_exr_to_file(&image, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
