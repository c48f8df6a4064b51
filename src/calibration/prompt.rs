// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Interactive calibration.
//!
//! The user supplies three key positions and the key count. Settings from
//! the previous run are offered for reuse when the cache file exists.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::info;

use crate::error::{KeyscanError, Result};

use super::settings::{CalibrationSettings, Point};

/// Key count offered when the user just presses enter
pub const DEFAULT_NUM_KEYS: usize = 68;

/// Which reference key is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    LeftMost,
    RightMost,
    Reference,
}

impl KeyRole {
    /// Human-readable name used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            KeyRole::LeftMost => "left most key",
            KeyRole::RightMost => "right most key",
            KeyRole::Reference => "reference (middle C) key",
        }
    }
}

/// Source of calibration answers
pub trait CalibrationInput {
    /// Ask whether the cached settings should be reused
    fn confirm_reuse(&mut self) -> Result<bool>;

    /// Position of the top center of a key, in screen pixels
    fn key_position(&mut self, role: KeyRole) -> Result<Point>;

    /// Total number of keys on the keyboard
    fn key_count(&mut self, default: usize) -> Result<usize>;
}

/// Line-based prompts on a reader/writer pair (usually stdin/stdout)
pub struct TerminalPrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.writer, "{}: ", question)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(KeyscanError::Configuration(format!(
                "input closed while asking: {}",
                question
            )));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> CalibrationInput for TerminalPrompt<R, W> {
    fn confirm_reuse(&mut self) -> Result<bool> {
        let answer = self.ask("Use the same settings as last time? Y/n")?;
        Ok(answer != "n")
    }

    fn key_position(&mut self, role: KeyRole) -> Result<Point> {
        let answer = self.ask(&format!(
            "Enter the [vertical top, horizontal center] of the {} as x,y",
            role.label()
        ))?;
        parse_point(&answer)
    }

    fn key_count(&mut self, default: usize) -> Result<usize> {
        let answer = self.ask(&format!(
            "How many keys does the keyboard have in total? [{}]",
            default
        ))?;
        if answer.is_empty() {
            return Ok(default);
        }
        answer
            .parse()
            .map_err(|_| KeyscanError::Configuration(format!("invalid key count: {:?}", answer)))
    }
}

/// Parse `x,y` (whitespace tolerated)
pub fn parse_point(text: &str) -> Result<Point> {
    let invalid = || KeyscanError::Configuration(format!("expected x,y but got {:?}", text));

    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(Point::new(x, y))
}

/// Ask for a fresh set of calibration points
pub fn fetch_new_settings(input: &mut impl CalibrationInput) -> Result<CalibrationSettings> {
    let left = input.key_position(KeyRole::LeftMost)?;
    let right = input.key_position(KeyRole::RightMost)?;
    let reference = input.key_position(KeyRole::Reference)?;
    let num_of_keys = input.key_count(DEFAULT_NUM_KEYS)?;

    CalibrationSettings::new(left, right, reference, num_of_keys)
}

/// Reuse cached settings when the user agrees, otherwise calibrate and cache
pub fn calibrate_keyboard(
    input: &mut impl CalibrationInput,
    settings_path: &Path,
) -> Result<CalibrationSettings> {
    if settings_path.exists() && input.confirm_reuse()? {
        info!("Loading previous settings...");
        return CalibrationSettings::load(settings_path);
    }

    let settings = fetch_new_settings(input)?;
    settings.save(settings_path)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("120,845").unwrap(), Point::new(120, 845));
        assert_eq!(parse_point(" 7 , -3 ").unwrap(), Point::new(7, -3));
        assert!(parse_point("120").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_fetch_new_settings() {
        let mut input = prompt("10,500\n1010,502\n400,501\n61\n");
        let settings = fetch_new_settings(&mut input).unwrap();
        assert_eq!(settings.left_most_key_position, Point::new(10, 500));
        assert_eq!(settings.right_most_key_position, Point::new(1010, 502));
        assert_eq!(settings.reference_key_position, Point::new(400, 501));
        assert_eq!(settings.num_of_keys, 61);

        let transcript = String::from_utf8(input.writer).unwrap();
        assert!(transcript.contains("left most key"));
        assert!(transcript.contains("How many keys"));
    }

    #[test]
    fn test_key_count_default() {
        let mut input = prompt("\n");
        assert_eq!(input.key_count(DEFAULT_NUM_KEYS).unwrap(), 68);
    }

    #[test]
    fn test_confirm_reuse_only_declines_on_n() {
        assert!(prompt("\n").confirm_reuse().unwrap());
        assert!(prompt("Y\n").confirm_reuse().unwrap());
        assert!(prompt("yes\n").confirm_reuse().unwrap());
        assert!(!prompt("n\n").confirm_reuse().unwrap());
    }

    #[test]
    fn test_closed_input_is_error() {
        assert!(prompt("").key_position(KeyRole::LeftMost).is_err());
    }

    #[test]
    fn test_calibrate_reuses_cached_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last-settings.json");
        let cached =
            CalibrationSettings::new(Point::new(0, 9), Point::new(90, 9), Point::new(30, 9), 10)
                .unwrap();
        cached.save(&path).unwrap();

        let mut input = prompt("Y\n");
        let settings = calibrate_keyboard(&mut input, &path).unwrap();
        assert_eq!(settings, cached);
    }

    #[test]
    fn test_calibrate_fresh_saves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last-settings.json");
        let cached =
            CalibrationSettings::new(Point::new(0, 9), Point::new(90, 9), Point::new(30, 9), 10)
                .unwrap();
        cached.save(&path).unwrap();

        let mut input = prompt("n\n5,5\n505,5\n205,5\n\n");
        let settings = calibrate_keyboard(&mut input, &path).unwrap();
        assert_eq!(settings.num_of_keys, DEFAULT_NUM_KEYS);
        assert_eq!(CalibrationSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_calibrate_without_cache_does_not_ask_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last-settings.json");

        let mut input = prompt("0,0\n100,0\n50,0\n3\n");
        let settings = calibrate_keyboard(&mut input, &path).unwrap();
        assert_eq!(settings.num_of_keys, 3);
        assert!(path.exists());

        let transcript = String::from_utf8(input.writer).unwrap();
        assert!(!transcript.contains("same settings"));
    }
}
