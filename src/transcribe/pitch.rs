// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key index to MIDI pitch mapping.
//!
//! Keys are assumed to be chromatic, so one offset (reference MIDI number
//! minus reference key index) maps every key.

use crate::calibration::{CalibrationSettings, SampleGeometry};
use crate::error::{KeyscanError, Result};

use super::extract::NoteEvent;

/// Middle C
pub const MIDDLE_C: u8 = 60;

/// Highest valid MIDI note number
pub const MAX_PITCH: i32 = 127;

/// Pitch of `key_index` given the index and pitch of the reference key
pub fn map_pitch(key_index: usize, reference_key_index: usize, reference_midi_number: u8) -> i32 {
    let left_most_key_midi = reference_midi_number as i32 - reference_key_index as i32;
    left_most_key_midi + key_index as i32
}

/// A note with pitch, still in capture line units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchedNote {
    pub pitch: u8,
    pub start_line: usize,
    pub line_span: usize,
}

/// Maps key indices to pitches for one calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchMapper {
    reference_key_index: usize,
    reference_midi_number: u8,
}

impl PitchMapper {
    pub fn new(reference_key_index: usize, reference_midi_number: u8) -> Self {
        Self {
            reference_key_index,
            reference_midi_number,
        }
    }

    /// Anchor the mapping on the key closest to the calibration reference point
    pub fn from_calibration(
        settings: &CalibrationSettings,
        geometry: &SampleGeometry,
        reference_midi_number: u8,
    ) -> Result<Self> {
        let reference_key_index = geometry
            .closest_key(settings.reference_key_position.x)
            .ok_or_else(|| KeyscanError::Configuration("geometry has no keys".to_string()))?;
        Ok(Self::new(reference_key_index, reference_midi_number))
    }

    pub fn reference_key_index(&self) -> usize {
        self.reference_key_index
    }

    /// Pitch of a key; may fall outside the MIDI range
    pub fn pitch(&self, key_index: usize) -> i32 {
        map_pitch(key_index, self.reference_key_index, self.reference_midi_number)
    }

    /// Pitch every note, failing on the first key outside 0..=127
    pub fn map_notes(&self, notes: &[NoteEvent]) -> Result<Vec<PitchedNote>> {
        notes
            .iter()
            .map(|note| {
                let pitch = self.pitch(note.key_index);
                if !(0..=MAX_PITCH).contains(&pitch) {
                    return Err(KeyscanError::PitchOutOfRange {
                        key_index: note.key_index,
                        pitch,
                    });
                }
                Ok(PitchedNote {
                    pitch: pitch as u8,
                    start_line: note.start_line,
                    line_span: note.line_span(),
                })
            })
            .collect()
    }
}
