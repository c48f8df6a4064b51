// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Capture-to-MIDI run.
//!
//! A cached capture file short-circuits calibration and recording so a take
//! can be re-converted without replaying the video.

use std::future::Future;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::calibration::{calibrate_keyboard, CalibrationInput, CalibrationSettings, SampleGeometry};
use crate::capture::{load_frame, write_overlay, ActivationMatrix, ActivationRecorder, ImageSequenceSource};
use crate::config::Config;
use crate::error::{KeyscanError, Result};
use crate::export::MidiExporter;
use crate::transcribe::{NoteExtractor, PitchMapper, PitchedNote};

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines in the activation matrix
    pub lines: usize,
    /// Notes written
    pub notes: usize,
    /// Whether the matrix came from the capture cache
    pub replayed: bool,
    /// MIDI file written
    pub output_file: PathBuf,
}

/// Turn a matrix into pitched notes for the given calibration
pub fn transcribe_matrix(
    settings: &CalibrationSettings,
    matrix: &ActivationMatrix,
    config: &Config,
) -> Result<Vec<PitchedNote>> {
    let geometry = SampleGeometry::from_settings(settings)?;
    if !matrix.is_empty() && matrix.num_keys() != geometry.num_keys() {
        return Err(KeyscanError::Configuration(format!(
            "capture has {} keys per line but calibration has {}",
            matrix.num_keys(),
            geometry.num_keys()
        )));
    }

    let notes = NoteExtractor::new()
        .with_close_trailing_notes(config.transcription.close_trailing_notes)
        .extract(matrix);
    info!("Extracted {} notes from {} lines", notes.len(), matrix.len());

    let mapper = PitchMapper::from_calibration(
        settings,
        &geometry,
        config.transcription.reference_midi_number,
    )?;
    info!(
        "Reference key is key {} (MIDI {})",
        mapper.reference_key_index(),
        config.transcription.reference_midi_number
    );
    mapper.map_notes(&notes)
}

/// Cache-aware capture-to-MIDI run
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Calibrate, record or replay, transcribe and write the MIDI file
    pub async fn run<I, F>(&self, input: &mut I, stop: F) -> Result<RunSummary>
    where
        I: CalibrationInput,
        F: Future,
    {
        let paths = &self.config.paths;

        let (settings, matrix, replayed) = if paths.capture_file.exists() {
            info!(
                "Found {:?}, skipping calibration and recording",
                paths.capture_file
            );
            let settings = CalibrationSettings::load(&paths.settings_file)?;
            let matrix = ActivationMatrix::load(&paths.capture_file)?;
            (settings, matrix, true)
        } else {
            let settings = calibrate_keyboard(input, &paths.settings_file)?;
            let matrix = self.record(&settings, stop).await?;
            matrix.save(&paths.capture_file)?;
            (settings, matrix, false)
        };

        let pitched = transcribe_matrix(&settings, &matrix, &self.config)?;
        if pitched.is_empty() {
            warn!("No notes detected; writing an empty track");
        }

        let exporter = MidiExporter::from_notes(&pitched, &self.config.export);
        exporter.export(&paths.output_file)?;

        Ok(RunSummary {
            lines: matrix.len(),
            notes: pitched.len(),
            replayed,
            output_file: paths.output_file.clone(),
        })
    }

    /// Record the frame directory into a fresh matrix
    pub async fn record<F: Future>(
        &self,
        settings: &CalibrationSettings,
        stop: F,
    ) -> Result<ActivationMatrix> {
        let geometry = SampleGeometry::from_settings(settings)?;
        let mut source = ImageSequenceSource::open(&self.config.capture.frames_dir)?;

        if let (Some(overlay), Some(first)) = (&self.config.paths.overlay_file, source.peek_path()) {
            let frame = load_frame(first)?;
            write_overlay(&frame, &geometry, overlay)?;
        }

        let recorder = ActivationRecorder::from_config(
            geometry,
            &self.config.capture,
            &self.config.detection,
        )?;
        info!("Ready to play the video...");
        Ok(recorder.record(&mut source, stop).await?.matrix)
    }
}
