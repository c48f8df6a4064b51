// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the capture-to-MIDI pipeline.
//!
//! Every failure here is fatal to a run: nothing is retried and no partial
//! MIDI file is written.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by calibration, capture, transcription and export
#[derive(Debug, Error)]
pub enum KeyscanError {
    /// Calibration or configuration values that cannot produce a geometry
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Frame source unavailable, or a frame buffer that is malformed
    #[error("capture error: {0}")]
    Capture(String),

    /// Sample coordinate outside the captured image
    #[error("sample point ({x}, {y}) is outside the {width}x{height} frame")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Cached settings or capture file that cannot be read back
    #[error("failed to load {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    /// Key mapped to a pitch outside 0..=127
    #[error("key {key_index} maps to MIDI pitch {pitch}, outside 0..=127")]
    PitchOutOfRange { key_index: usize, pitch: i32 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl KeyscanError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        KeyscanError::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, KeyscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = KeyscanError::OutOfBounds {
            x: 2000,
            y: 10,
            width: 1920,
            height: 1080,
        };
        assert_eq!(
            err.to_string(),
            "sample point (2000, 10) is outside the 1920x1080 frame"
        );
    }

    #[test]
    fn test_persistence_message_names_file() {
        let err = KeyscanError::persistence("midi-capture.json", "expected `[`");
        assert!(err.to_string().contains("midi-capture.json"));
        assert!(err.to_string().contains("expected `[`"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: KeyscanError = io_err.into();
        assert!(matches!(err, KeyscanError::Io(_)));
    }
}
