// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-frame key activation.
//!
//! Idle keys are black, white or gray, so their channels sit close to their
//! average. A falling note paints the key in a color, which pulls at least
//! one channel away from the average.

use crate::calibration::SampleGeometry;
use crate::error::Result;

use super::frame::{Frame, Rgb};

/// Default maximum channel deviation for an idle key
pub const DEFAULT_EPSILON: u8 = 40;

/// Whether a color reads as an active (colored) key
pub fn is_colored(color: Rgb, epsilon: u8) -> bool {
    let (r, g, b) = (color.r as f64, color.g as f64, color.b as f64);
    let average = (r + g + b) / 3.0;
    let epsilon = epsilon as f64;

    (r - average).abs() > epsilon || (g - average).abs() > epsilon || (b - average).abs() > epsilon
}

/// Activation vector for one frame, one entry per key column
pub fn classify_frame(frame: &Frame, geometry: &SampleGeometry, epsilon: u8) -> Result<Vec<bool>> {
    geometry
        .columns_x
        .iter()
        .map(|&x| -> Result<bool> { Ok(is_colored(frame.pixel(x, geometry.row_y)?, epsilon)) })
        .collect()
}

/// One-line view of an activation vector, `#` for active keys
pub fn render_activation(activation: &[bool]) -> String {
    activation
        .iter()
        .map(|&active| if active { '#' } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyscanError;

    #[test]
    fn test_gray_is_idle() {
        assert!(!is_colored(Rgb::new(200, 200, 200), DEFAULT_EPSILON));
        assert!(!is_colored(Rgb::new(0, 0, 0), DEFAULT_EPSILON));
        assert!(!is_colored(Rgb::new(255, 255, 255), DEFAULT_EPSILON));
    }

    #[test]
    fn test_magenta_is_active() {
        // average 170, deviation 85 on R and B
        assert!(is_colored(Rgb::new(255, 0, 255), DEFAULT_EPSILON));
    }

    #[test]
    fn test_threshold_is_strict() {
        // average 40, R deviates by exactly 80
        assert!(!is_colored(Rgb::new(120, 0, 0), 80));
        assert!(is_colored(Rgb::new(120, 0, 0), 79));
    }

    #[test]
    fn test_classify_frame() {
        let mut frame = Frame::filled(10, 2, Rgb::new(20, 20, 20));
        frame.set_pixel(5, 1, Rgb::new(30, 200, 40)).unwrap();
        // Same column on the other row stays dark
        frame.set_pixel(0, 0, Rgb::new(30, 200, 40)).unwrap();

        let geometry = SampleGeometry {
            row_y: 1,
            columns_x: vec![0, 5, 9],
        };
        let activation = classify_frame(&frame, &geometry, DEFAULT_EPSILON).unwrap();
        assert_eq!(activation, vec![false, true, false]);
    }

    #[test]
    fn test_classify_out_of_bounds() {
        let frame = Frame::filled(10, 2, Rgb::new(0, 0, 0));
        let geometry = SampleGeometry {
            row_y: 1,
            columns_x: vec![0, 10],
        };
        assert!(matches!(
            classify_frame(&frame, &geometry, DEFAULT_EPSILON),
            Err(KeyscanError::OutOfBounds { x: 10, y: 1, .. })
        ));
    }

    #[test]
    fn test_render_activation() {
        assert_eq!(render_activation(&[false, true, true, false]), "_##_");
    }
}
