// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note extraction from an activation matrix.
//!
//! Each key is decoded independently as runs of active lines. A note opens
//! on the line a key turns active and closes on the line before it turns
//! idle again. Lines before the first line with any active key are skipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::ActivationMatrix;

/// A note decoded from the matrix, in capture line units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Key position, left to right
    pub key_index: usize,
    /// First active line
    pub start_line: usize,
    /// Last active line (inclusive)
    pub end_line: usize,
}

impl NoteEvent {
    /// Length in lines, as the exporter measures it (`end - start`)
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Extraction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorState {
    /// No key has been active yet
    SkippingLeadingSilence,
    /// Every line from the first activation on is decoded
    Recording,
}

/// Edge-triggered run decoder
#[derive(Debug, Clone, Default)]
pub struct NoteExtractor {
    close_trailing_notes: bool,
}

impl NoteExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close notes still sounding on the last line instead of dropping them
    pub fn with_close_trailing_notes(mut self, enabled: bool) -> Self {
        self.close_trailing_notes = enabled;
        self
    }

    /// Decode every note, ordered by the line its end was observed on
    pub fn extract(&self, matrix: &ActivationMatrix) -> Vec<NoteEvent> {
        let mut notes = Vec::new();
        let mut open: Vec<Option<usize>> = vec![None; matrix.num_keys()];
        let mut state = ExtractorState::SkippingLeadingSilence;

        for (line_index, line) in matrix.lines().iter().enumerate() {
            if state == ExtractorState::SkippingLeadingSilence {
                if !line.iter().any(|&active| active) {
                    continue;
                }
                debug!("First active line at {}", line_index);
                state = ExtractorState::Recording;
            }

            for (key_index, (&active, slot)) in line.iter().zip(open.iter_mut()).enumerate() {
                match (*slot, active) {
                    (None, true) => *slot = Some(line_index),
                    (Some(start_line), false) => {
                        notes.push(NoteEvent {
                            key_index,
                            start_line,
                            end_line: line_index - 1,
                        });
                        *slot = None;
                    }
                    _ => {}
                }
            }
        }

        let unclosed = open.iter().filter(|slot| slot.is_some()).count();
        if unclosed > 0 {
            if self.close_trailing_notes {
                let last_line = matrix.len() - 1;
                for (key_index, slot) in open.iter().enumerate() {
                    if let Some(start_line) = *slot {
                        notes.push(NoteEvent {
                            key_index,
                            start_line,
                            end_line: last_line,
                        });
                    }
                }
                debug!("Closed {} notes still sounding at the last line", unclosed);
            } else {
                debug!("Dropped {} notes still sounding at the last line", unclosed);
            }
        }

        notes
    }
}

/// Decode notes with the default policy (trailing notes dropped)
pub fn extract_notes(matrix: &ActivationMatrix) -> Vec<NoteEvent> {
    NoteExtractor::new().extract(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    const F: bool = false;
    const T: bool = true;

    fn matrix(lines: Vec<Vec<bool>>) -> ActivationMatrix {
        ActivationMatrix::from_lines(lines).unwrap()
    }

    fn note(key_index: usize, start_line: usize, end_line: usize) -> NoteEvent {
        NoteEvent {
            key_index,
            start_line,
            end_line,
        }
    }

    #[test]
    fn test_single_note() {
        let notes = extract_notes(&matrix(vec![vec![F], vec![T], vec![T], vec![F]]));
        assert_eq!(notes, vec![note(0, 1, 2)]);
        assert_eq!(notes[0].line_span(), 1);
    }

    #[test]
    fn test_leading_silence_skip() {
        let notes = extract_notes(&matrix(vec![
            vec![F, F],
            vec![F, F],
            vec![T, F],
            vec![F, T],
            vec![F, F],
        ]));
        assert_eq!(notes, vec![note(0, 2, 2), note(1, 3, 3)]);
    }

    #[test]
    fn test_note_on_first_line() {
        let notes = extract_notes(&matrix(vec![vec![T, F], vec![F, F]]));
        assert_eq!(notes, vec![note(0, 0, 0)]);
    }

    #[test]
    fn test_unclosed_note_is_dropped() {
        assert!(extract_notes(&matrix(vec![vec![F], vec![T]])).is_empty());
    }

    #[test]
    fn test_unclosed_note_can_be_closed() {
        let extractor = NoteExtractor::new().with_close_trailing_notes(true);
        let notes = extractor.extract(&matrix(vec![
            vec![F, F, F],
            vec![T, F, T],
            vec![T, T, F],
            vec![T, T, F],
        ]));
        assert_eq!(notes, vec![note(2, 1, 1), note(0, 1, 3), note(1, 2, 3)]);
    }

    #[test]
    fn test_silence_after_recording_starts_is_not_skipped() {
        let notes = extract_notes(&matrix(vec![
            vec![T],
            vec![F],
            vec![F],
            vec![T],
            vec![T],
            vec![F],
        ]));
        assert_eq!(notes, vec![note(0, 0, 0), note(0, 3, 4)]);
    }

    #[test]
    fn test_order_is_end_line_then_key() {
        let notes = extract_notes(&matrix(vec![
            vec![T, T, T],
            vec![T, T, F],
            vec![F, T, F],
            vec![F, F, F],
        ]));
        // key 2 ends first, then key 0, then key 1
        assert_eq!(notes, vec![note(2, 0, 0), note(0, 0, 1), note(1, 0, 2)]);

        let notes = extract_notes(&matrix(vec![vec![T, T, T], vec![F, F, F]]));
        assert_eq!(notes, vec![note(0, 0, 0), note(1, 0, 0), note(2, 0, 0)]);
    }

    #[test]
    fn test_repeated_extraction_is_identical() {
        let m = matrix(vec![
            vec![F, F, F, F],
            vec![T, F, F, T],
            vec![T, T, F, T],
            vec![F, T, T, F],
            vec![T, F, T, F],
            vec![F, F, F, F],
        ]);
        let first = extract_notes(&m);
        assert_eq!(first.len(), 5);
        for _ in 0..10 {
            assert_eq!(extract_notes(&m), first);
        }
    }

    #[test]
    fn test_empty_and_silent_matrices() {
        assert!(extract_notes(&ActivationMatrix::new(4)).is_empty());
        assert!(extract_notes(&matrix(vec![vec![F, F]; 10])).is_empty());

        let extractor = NoteExtractor::new().with_close_trailing_notes(true);
        assert!(extractor.extract(&ActivationMatrix::new(4)).is_empty());
    }
}
