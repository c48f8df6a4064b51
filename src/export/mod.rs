// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI file output.

pub mod smf;

pub use smf::{ExportNote, ExportTrack, MidiExporter, TickMapping};
