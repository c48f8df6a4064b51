// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! keyscan - piano visualizer video to MIDI.
//!
//! Samples the key row of a falling-note piano visualizer, decides which
//! keys are lit in each frame, and turns the resulting on/off matrix into
//! a MIDI file.

pub mod calibration;
pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod transcribe;

pub use calibration::{CalibrationSettings, Point, SampleGeometry};
pub use capture::{ActivationMatrix, ActivationRecorder, Frame, FrameSource};
pub use config::Config;
pub use error::{KeyscanError, Result};
pub use export::MidiExporter;
pub use pipeline::{transcribe_matrix, Pipeline, RunSummary};
pub use transcribe::{extract_notes, NoteEvent, PitchMapper, PitchedNote};
