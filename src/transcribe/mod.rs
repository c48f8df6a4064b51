// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Activation matrix to notes.

pub mod extract;
pub mod pitch;

pub use extract::{extract_notes, ExtractorState, NoteEvent, NoteExtractor};
pub use pitch::{map_pitch, PitchMapper, PitchedNote, MIDDLE_C};
