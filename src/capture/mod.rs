// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Frame capture and key activation.
//!
//! This module provides:
//! - Packed RGB frames and frame sources
//! - Color-based key activation per frame
//! - Periodic recording into an activation matrix
//! - A detection point overlay for debugging calibrations

pub mod classify;
pub mod frame;
pub mod matrix;
pub mod overlay;
pub mod recorder;
pub mod source;

pub use classify::{classify_frame, is_colored, render_activation, DEFAULT_EPSILON};
pub use frame::{Frame, Rgb};
pub use matrix::ActivationMatrix;
pub use overlay::{mark_sample_points, write_overlay};
pub use recorder::{ActivationRecorder, Recording, StopReason};
pub use source::{load_frame, FrameSequence, FrameSource, ImageSequenceSource};
