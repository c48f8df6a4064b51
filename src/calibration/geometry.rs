// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sample geometry derived from calibration points.
//!
//! Keys are assumed to be evenly spaced between the left-most and
//! right-most reference points, all sampled on a single row.

use crate::error::Result;

use super::settings::CalibrationSettings;

/// Pixel coordinates sampled for every key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGeometry {
    /// Row all keys are sampled on
    pub row_y: i32,
    /// One column per key, left to right
    pub columns_x: Vec<i32>,
}

impl SampleGeometry {
    /// Derive the geometry for validated settings
    pub fn from_settings(settings: &CalibrationSettings) -> Result<Self> {
        settings.validate()?;

        let left = settings.left_most_key_position;
        let right = settings.right_most_key_position;

        // i32 sums and differences can overflow for far-apart points
        let row_y = ((left.y as f64 + right.y as f64) / 2.0).round() as i32;
        let piano_width = right.x as f64 - left.x as f64;
        let gaps = (settings.num_of_keys - 1) as f64;

        let columns_x = (0..settings.num_of_keys)
            .map(|i| (left.x as f64 + i as f64 * piano_width / gaps).round() as i32)
            .collect();

        Ok(Self { row_y, columns_x })
    }

    /// Number of keys sampled
    pub fn num_keys(&self) -> usize {
        self.columns_x.len()
    }

    /// Index of the key column closest to `target_x`
    pub fn closest_key(&self, target_x: i32) -> Option<usize> {
        find_closest_index(target_x, &self.columns_x)
    }
}

/// Index of the value nearest to `target`; ties go to the lowest index
pub fn find_closest_index(target: i32, values: &[i32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, &value) in values.iter().enumerate() {
        let diff = value.abs_diff(target);
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((index, diff)),
        }
    }
    best.map(|(index, _)| index)
}
