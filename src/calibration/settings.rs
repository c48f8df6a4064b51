// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Calibration settings and their on-disk cache.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{KeyscanError, Result};

/// A screen coordinate in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Reference points for one keyboard, as picked by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationSettings {
    /// Top center of the left-most key
    pub left_most_key_position: Point,
    /// Top center of the right-most key
    pub right_most_key_position: Point,
    /// Top center of the key whose pitch anchors the mapping
    #[serde(alias = "c4KeyPosition")]
    pub reference_key_position: Point,
    /// Total number of keys on the visualizer keyboard
    pub num_of_keys: usize,
}

impl CalibrationSettings {
    /// Create validated settings
    pub fn new(left: Point, right: Point, reference: Point, num_of_keys: usize) -> Result<Self> {
        let settings = Self {
            left_most_key_position: left,
            right_most_key_position: right,
            reference_key_position: reference,
            num_of_keys,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants a geometry needs
    pub fn validate(&self) -> Result<()> {
        if self.num_of_keys < 2 {
            return Err(KeyscanError::Configuration(format!(
                "keyboard needs at least 2 keys, got {}",
                self.num_of_keys
            )));
        }
        if self.right_most_key_position.x <= self.left_most_key_position.x {
            return Err(KeyscanError::Configuration(format!(
                "right-most key (x={}) must be to the right of the left-most key (x={})",
                self.right_most_key_position.x, self.left_most_key_position.x
            )));
        }
        Ok(())
    }

    /// Load settings cached by a previous run
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| KeyscanError::persistence(path, e))?;
        let settings: Self =
            serde_json::from_str(&contents).map_err(|e| KeyscanError::persistence(path, e))?;
        settings.validate()?;
        info!("Loaded calibration settings from {:?}", path);
        Ok(settings)
    }

    /// Cache settings as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| KeyscanError::persistence(path, e))?;
        fs::write(path, json)?;
        info!("Calibration settings saved to {:?}", path);
        Ok(())
    }
}
