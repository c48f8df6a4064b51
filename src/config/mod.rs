// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Run configuration for keyscan.
//!
//! All fields have defaults, so an empty file (or no file at all) gives the
//! stock behavior: 50 ms sampling for a 5 minute song played at quarter
//! speed, epsilon 40, middle C as the reference key and a 3:3 tick ratio.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Cache and output file locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Frame sampling settings
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Key activation detection
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Note reconstruction
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    /// MIDI file output
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load a configuration file, picking the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Reject values that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.capture.sample_interval_ms == 0 {
            bail!("capture.sample_interval_ms must be greater than zero");
        }
        if !self.capture.playback_speed.is_finite() || self.capture.playback_speed <= 0.0 {
            bail!("capture.playback_speed must be a positive number");
        }
        if !self.capture.song_duration_minutes.is_finite() || self.capture.song_duration_minutes < 0.0 {
            bail!("capture.song_duration_minutes must be a non-negative number");
        }
        self.capture.total_duration()?;
        if self.export.start_tick_ratio == 0 || self.export.duration_ratio == 0 {
            bail!("export tick ratios must be greater than zero");
        }
        if self.export.channel > 15 {
            bail!("export.channel must be 0-15, got {}", self.export.channel);
        }
        if self.export.program > 127 {
            bail!("export.program must be 0-127, got {}", self.export.program);
        }
        if self.export.velocity == 0 || self.export.velocity > 127 {
            bail!("export.velocity must be 1-127, got {}", self.export.velocity);
        }
        if self.export.ppqn == 0 {
            bail!("export.ppqn must be greater than zero");
        }
        if !self.export.tempo.is_finite() || self.export.tempo <= 0.0 {
            bail!("export.tempo must be a positive number, got {}", self.export.tempo);
        }
        Ok(())
    }
}

/// File locations used as caches between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Most recent calibration settings
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,
    /// Recorded activation matrix; when present, recording is skipped
    #[serde(default = "default_capture_file")]
    pub capture_file: PathBuf,
    /// Generated MIDI file
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    /// Optional image marking every sample point
    #[serde(default)]
    pub overlay_file: Option<PathBuf>,
}

fn default_settings_file() -> PathBuf {
    PathBuf::from("last-settings.json")
}
fn default_capture_file() -> PathBuf {
    PathBuf::from("midi-capture.json")
}
fn default_output_file() -> PathBuf {
    PathBuf::from("song.mid")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
            capture_file: default_capture_file(),
            output_file: default_output_file(),
            overlay_file: None,
        }
    }
}

/// Frame sampling settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Directory of decoded video frames
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,
    /// Period between samples in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Length of the song at normal speed
    #[serde(default = "default_song_duration_minutes")]
    pub song_duration_minutes: f64,
    /// Playback speed of the visualizer (0.25 = quarter speed)
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f64,
    /// Extra seconds recorded after the song should have ended
    #[serde(default = "default_margin_secs")]
    pub margin_secs: u64,
    /// Stop cleanly when the frame source runs out of frames
    #[serde(default = "default_end_on_exhaustion")]
    pub end_on_exhaustion: bool,
}

fn default_frames_dir() -> PathBuf {
    PathBuf::from("frames")
}
fn default_sample_interval_ms() -> u64 {
    50
}
fn default_song_duration_minutes() -> f64 {
    5.0
}
fn default_playback_speed() -> f64 {
    0.25
}
fn default_margin_secs() -> u64 {
    30
}
fn default_end_on_exhaustion() -> bool {
    true
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frames_dir: default_frames_dir(),
            sample_interval_ms: default_sample_interval_ms(),
            song_duration_minutes: default_song_duration_minutes(),
            playback_speed: default_playback_speed(),
            margin_secs: default_margin_secs(),
            end_on_exhaustion: default_end_on_exhaustion(),
        }
    }
}

impl CaptureConfig {
    /// Sampling period
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Wall-clock length of the capture run
    pub fn total_duration(&self) -> Result<Duration> {
        let song_secs = self.song_duration_minutes * 60.0 / self.playback_speed;
        Duration::try_from_secs_f64(song_secs)
            .ok()
            .and_then(|song| song.checked_add(Duration::from_secs(self.margin_secs)))
            .with_context(|| {
                format!(
                    "capture length of {} minutes at speed {} plus {} s does not fit a duration",
                    self.song_duration_minutes, self.playback_speed, self.margin_secs
                )
            })
    }
}

/// Key activation detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionConfig {
    /// Maximum channel deviation from the gray average for an idle key
    #[serde(default = "default_epsilon")]
    pub epsilon: u8,
}

fn default_epsilon() -> u8 {
    40
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
        }
    }
}

/// Note reconstruction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionConfig {
    /// MIDI number of the calibration reference key
    #[serde(default = "default_reference_midi_number")]
    pub reference_midi_number: u8,
    /// Close notes still sounding on the last line instead of dropping them
    #[serde(default)]
    pub close_trailing_notes: bool,
}

fn default_reference_midi_number() -> u8 {
    60
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            reference_midi_number: default_reference_midi_number(),
            close_trailing_notes: false,
        }
    }
}

/// MIDI file output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// Ticks per capture line for note start positions
    #[serde(default = "default_ratio")]
    pub start_tick_ratio: u64,
    /// Ticks per capture line for note durations
    #[serde(default = "default_ratio")]
    pub duration_ratio: u64,
    /// Program change sent at the start of the track
    #[serde(default = "default_program")]
    pub program: u8,
    /// MIDI channel (0-15)
    #[serde(default)]
    pub channel: u8,
    /// Note-on velocity
    #[serde(default = "default_velocity")]
    pub velocity: u8,
    /// Ticks per quarter note
    #[serde(default = "default_ppqn")]
    pub ppqn: u16,
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Track name meta event
    #[serde(default = "default_track_name")]
    pub track_name: String,
}

fn default_ratio() -> u64 {
    3
}
fn default_program() -> u8 {
    1
}
fn default_velocity() -> u8 {
    64
}
fn default_ppqn() -> u16 {
    128
}
fn default_tempo() -> f64 {
    120.0
}
fn default_track_name() -> String {
    "Piano".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            start_tick_ratio: default_ratio(),
            duration_ratio: default_ratio(),
            program: default_program(),
            channel: 0,
            velocity: default_velocity(),
            ppqn: default_ppqn(),
            tempo: default_tempo(),
            track_name: default_track_name(),
        }
    }
}
