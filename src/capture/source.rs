// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Frame sources.
//!
//! The recorder pulls one frame per tick from a [`FrameSource`]. The stock
//! source walks a directory of frame images exported from the screen
//! recording (e.g. `ffmpeg -i take.mp4 -vf fps=20 frames/%06d.png`).

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{KeyscanError, Result};

use super::frame::Frame;

/// File extensions picked up by [`ImageSequenceSource`]
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "tif", "tiff", "webp"];

/// Produces one frame per call
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Frames still queued, when the source knows
    fn frames_left(&self) -> Option<usize> {
        None
    }
}

/// Frames decoded from image files, in file name order
#[derive(Debug)]
pub struct ImageSequenceSource {
    files: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    /// Collect every image file in `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| {
            KeyscanError::Capture(format!("cannot read frame directory {:?}: {}", dir, e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(KeyscanError::Capture(format!(
                "no frame images found in {:?}",
                dir
            )));
        }
        debug!("Found {} frame images in {:?}", files.len(), dir);

        Ok(Self {
            files: files.into(),
        })
    }

    /// File the next call to `next_frame` will decode
    pub fn peek_path(&self) -> Option<&Path> {
        self.files.front().map(PathBuf::as_path)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode an image file into a packed RGB frame
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<Frame> {
    let path = path.as_ref();
    let image = image::open(path)
        .map_err(|e| KeyscanError::Capture(format!("failed to decode {:?}: {}", path, e)))?
        .to_rgb8();
    let width = image.width();
    Frame::new(width, image.into_raw())
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.files.pop_front() {
            Some(path) => load_frame(path).map(Some),
            None => Ok(None),
        }
    }

    fn frames_left(&self) -> Option<usize> {
        Some(self.files.len())
    }
}

/// Frames held in memory, for replays and tests
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: VecDeque<Frame>,
}

impl FrameSequence {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for FrameSequence {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }

    fn frames_left(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}
