// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Detection point overlay for checking a calibration by eye.

use std::path::Path;

use tracing::info;

use crate::calibration::SampleGeometry;
use crate::error::{KeyscanError, Result};

use super::frame::{Frame, Rgb};

/// Color painted on every sample point
pub const MARKER: Rgb = Rgb::new(255, 0, 255);

/// Paint every sample point of `geometry` onto `frame`
pub fn mark_sample_points(frame: &mut Frame, geometry: &SampleGeometry) -> Result<()> {
    for &x in &geometry.columns_x {
        frame.set_pixel(x, geometry.row_y, MARKER)?;
    }
    Ok(())
}

/// Save a copy of `frame` with the sample points marked
pub fn write_overlay<P: AsRef<Path>>(frame: &Frame, geometry: &SampleGeometry, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut marked = frame.clone();
    mark_sample_points(&mut marked, geometry)?;

    let (width, height) = (marked.width(), marked.height());
    let image = image::RgbImage::from_raw(width, height, marked.into_bytes())
        .ok_or_else(|| KeyscanError::Capture("frame buffer does not match its size".to_string()))?;
    image
        .save(path)
        .map_err(|e| KeyscanError::Capture(format!("failed to write overlay {:?}: {}", path, e)))?;

    info!("Wrote detection points to {:?}", path);
    Ok(())
}
