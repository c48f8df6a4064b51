// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export.
//!
//! Writes transcribed notes as a Type 0 (single track) MIDI file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::config::ExportConfig;
use crate::transcribe::PitchedNote;

/// Conversion from capture lines to MIDI ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickMapping {
    /// Ticks per line for note starts
    pub start_tick_ratio: u64,
    /// Ticks per line for note durations
    pub duration_ratio: u64,
}

impl Default for TickMapping {
    fn default() -> Self {
        Self {
            start_tick_ratio: 3,
            duration_ratio: 3,
        }
    }
}

impl TickMapping {
    pub fn start_tick(&self, start_line: usize) -> u64 {
        start_line as u64 * self.start_tick_ratio
    }

    pub fn duration(&self, line_span: usize) -> u64 {
        line_span as u64 * self.duration_ratio
    }
}

/// The single track being exported
#[derive(Debug, Clone)]
pub struct ExportTrack {
    /// Track name
    pub name: String,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Notes in this track
    pub notes: Vec<ExportNote>,
    /// Program change at start (None = no change)
    pub program: Option<u8>,
}

impl ExportTrack {
    /// Create a new export track
    pub fn new(name: impl Into<String>, channel: u8) -> Self {
        Self {
            name: name.into(),
            channel,
            notes: Vec::new(),
            program: None,
        }
    }

    /// Add transcribed notes, converting lines to ticks
    pub fn add_pitched_notes(&mut self, notes: &[PitchedNote], mapping: TickMapping, velocity: u8) {
        for pitched in notes {
            self.notes.push(ExportNote {
                tick: mapping.start_tick(pitched.start_line),
                note: pitched.pitch,
                velocity,
                duration: mapping.duration(pitched.line_span),
            });
        }
    }

    /// Set program
    pub fn with_program(mut self, program: u8) -> Self {
        self.program = Some(program);
        self
    }
}

/// A note for export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNote {
    /// Start tick
    pub tick: u64,
    /// Note number (0-127)
    pub note: u8,
    /// Velocity (1-127)
    pub velocity: u8,
    /// Duration in ticks
    pub duration: u64,
}

impl ExportNote {
    /// Create a new export note
    pub fn new(tick: u64, note: u8, velocity: u8, duration: u64) -> Self {
        Self {
            tick,
            note,
            velocity,
            duration,
        }
    }

    /// End tick
    pub fn end_tick(&self) -> u64 {
        self.tick + self.duration
    }
}

/// MIDI event for export
#[derive(Debug, Clone)]
struct MidiExportEvent {
    /// Absolute tick
    tick: u64,
    /// Event data
    data: Vec<u8>,
}

impl MidiExportEvent {
    fn note_on(tick: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            tick,
            data: vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        }
    }

    fn note_off(tick: u64, channel: u8, note: u8) -> Self {
        Self {
            tick,
            data: vec![0x80 | (channel & 0x0F), note & 0x7F, 0],
        }
    }

    fn program_change(tick: u64, channel: u8, program: u8) -> Self {
        Self {
            tick,
            data: vec![0xC0 | (channel & 0x0F), program & 0x7F],
        }
    }

    fn tempo(tick: u64, bpm: f64) -> Self {
        let microseconds = (60_000_000.0 / bpm) as u32;
        Self {
            tick,
            data: vec![
                0xFF, 0x51, 0x03,
                ((microseconds >> 16) & 0xFF) as u8,
                ((microseconds >> 8) & 0xFF) as u8,
                (microseconds & 0xFF) as u8,
            ],
        }
    }

    fn time_signature(tick: u64, numerator: u8, denominator: u8) -> Self {
        // Denominator is expressed as power of 2
        let denom_power = (denominator as f64).log2() as u8;
        Self {
            tick,
            data: vec![
                0xFF, 0x58, 0x04,
                numerator,
                denom_power,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per MIDI quarter note
            ],
        }
    }

    fn track_name(tick: u64, name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut data = vec![0xFF, 0x03];
        push_variable_length(&mut data, bytes.len() as u32);
        data.extend_from_slice(bytes);
        Self { tick, data }
    }

    fn end_of_track() -> Self {
        Self {
            tick: 0, // Will be set correctly during writing
            data: vec![0xFF, 0x2F, 0x00],
        }
    }
}

/// Append a variable-length quantity
fn push_variable_length(buffer: &mut Vec<u8>, mut value: u32) {
    let mut bytes = Vec::with_capacity(4);

    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    buffer.extend_from_slice(&bytes);
}

/// MIDI file exporter
pub struct MidiExporter {
    /// PPQN (ticks per quarter note)
    ppqn: u16,
    /// Tempo in BPM
    tempo: f64,
    /// Track to export
    track: ExportTrack,
}

impl MidiExporter {
    /// Create an exporter for one empty track
    pub fn new(track: ExportTrack) -> Self {
        Self {
            ppqn: 128,
            tempo: 120.0,
            track,
        }
    }

    /// Build the exporter for transcribed notes
    pub fn from_notes(notes: &[PitchedNote], config: &ExportConfig) -> Self {
        let mapping = TickMapping {
            start_tick_ratio: config.start_tick_ratio,
            duration_ratio: config.duration_ratio,
        };
        let mut track =
            ExportTrack::new(config.track_name.clone(), config.channel).with_program(config.program);
        track.add_pitched_notes(notes, mapping, config.velocity);

        let mut exporter = Self::new(track);
        exporter.set_ppqn(config.ppqn);
        exporter.set_tempo(config.tempo);
        exporter
    }

    /// Set PPQN
    pub fn set_ppqn(&mut self, ppqn: u16) {
        self.ppqn = ppqn.max(1);
    }

    /// Get PPQN
    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// Set tempo; non-finite values keep the current tempo
    pub fn set_tempo(&mut self, bpm: f64) {
        if bpm.is_finite() {
            self.tempo = bpm.clamp(20.0, 300.0);
        }
    }

    /// Get tempo
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Get the track
    pub fn track(&self) -> &ExportTrack {
        &self.track
    }

    /// Export to file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        info!("Wrote {} notes to {:?}", self.track.notes.len(), path);
        Ok(())
    }

    /// Export to bytes
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Write a Type 0 MIDI file
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let track = &self.track;
        let mut events = Vec::with_capacity(track.notes.len() * 2 + 4);

        events.push(MidiExportEvent::track_name(0, &track.name));
        events.push(MidiExportEvent::tempo(0, self.tempo));
        events.push(MidiExportEvent::time_signature(0, 4, 4));

        if let Some(program) = track.program {
            events.push(MidiExportEvent::program_change(0, track.channel, program));
        }

        for note in &track.notes {
            events.push(MidiExportEvent::note_on(
                note.tick,
                track.channel,
                note.note,
                note.velocity,
            ));
            events.push(MidiExportEvent::note_off(
                note.end_tick(),
                track.channel,
                note.note,
            ));
        }

        // Stable sort keeps each note-on ahead of its own note-off
        events.sort_by_key(|e| e.tick);

        self.write_header(writer)?;
        self.write_track(writer, &events)?;

        Ok(())
    }

    /// Write MIDI file header chunk
    fn write_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        // MThd
        writer.write_all(b"MThd")?;
        // Chunk length (always 6)
        writer.write_all(&[0, 0, 0, 6])?;
        // Format 0
        writer.write_all(&0u16.to_be_bytes())?;
        // One track
        writer.write_all(&1u16.to_be_bytes())?;
        // PPQN
        writer.write_all(&self.ppqn.to_be_bytes())?;
        Ok(())
    }

    /// Write a track chunk
    fn write_track<W: Write>(&self, writer: &mut W, events: &[MidiExportEvent]) -> io::Result<()> {
        let mut track_data = Vec::new();
        let mut last_tick = 0u64;

        for event in events {
            let delta = event.tick.saturating_sub(last_tick);
            let delta = u32::try_from(delta).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("delta of {} ticks does not fit a MIDI event", delta),
                )
            })?;
            push_variable_length(&mut track_data, delta);
            track_data.extend_from_slice(&event.data);
            last_tick = event.tick;
        }

        // End of track
        let end_event = MidiExportEvent::end_of_track();
        push_variable_length(&mut track_data, 0);
        track_data.extend_from_slice(&end_event.data);

        // MTrk
        writer.write_all(b"MTrk")?;
        // Track length
        let length = track_data.len() as u32;
        writer.write_all(&length.to_be_bytes())?;
        // Track data
        writer.write_all(&track_data)?;

        Ok(())
    }
}
