// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard calibration.
//!
//! This module provides:
//! - Calibration settings and their JSON cache
//! - Per-key sample coordinates derived from three reference points
//! - Interactive collection of the reference points

pub mod geometry;
pub mod prompt;
pub mod settings;

pub use geometry::{find_closest_index, SampleGeometry};
pub use prompt::{calibrate_keyboard, fetch_new_settings, CalibrationInput, KeyRole, TerminalPrompt};
pub use settings::{CalibrationSettings, Point};
