use super::core::ChargeIm;
use super::frame::ChargeFrame;
use image::ImageResult;
use std::path::Path;

fn dim_mismatch_err() -> image::ImageError {
    image::ImageError::Parameter(image::error::ParameterError::from_kind(
        image::error::ParameterErrorKind::DimensionMismatch,
    ))
}

// Helpers for f32 -> u16 scaling
// -----------------------------------------------------------------------------

/// Scales `pixels` so the largest value maps to `u16::MAX`. Negative values
/// clamp to zero; an all-zero image stays zero.
fn scale_to_u16(pixels: &[f32]) -> Vec<u16> {
    let max = pixels.iter().copied().fold(0.0_f32, f32::max);
    if max <= 0.0 {
        return vec![0; pixels.len()];
    }
    let k = u16::MAX as f32 / max;
    pixels
        .iter()
        .map(|&v| (v.max(0.0) * k).round().min(u16::MAX as f32) as u16)
        .collect()
}

// PNG output
// -----------------------------------------------------------------------------
impl ChargeIm {
    /// Writes a 16-bit grayscale PNG, brightest pixel at full scale.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        if self.is_empty() {
            return Err(dim_mismatch_err());
        }

        let img = image::ImageBuffer::<image::Luma<u16>, _>::from_raw(
            self.w as u32,
            self.h as u32,
            scale_to_u16(&self.arr),
        )
        .ok_or_else(dim_mismatch_err)?;

        img.save_with_format(path, image::ImageFormat::Png)
    }
}

impl ChargeFrame {
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.im.save_png(path)
    }
}

// Tests
// -----------------------------------------------------------------------------
