// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Time-ordered activation matrix and its JSON cache.
//!
//! Stored on disk as a plain array of arrays of booleans, one inner array
//! per sampled line.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{KeyscanError, Result};

/// One activation vector per sampled frame, all of the same length
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<bool>>", into = "Vec<Vec<bool>>")]
pub struct ActivationMatrix {
    num_keys: usize,
    lines: Vec<Vec<bool>>,
}

impl ActivationMatrix {
    /// Empty matrix for a keyboard of `num_keys` keys
    pub fn new(num_keys: usize) -> Self {
        Self {
            num_keys,
            lines: Vec::new(),
        }
    }

    /// Build from lines, rejecting inconsistent lengths
    pub fn from_lines(lines: Vec<Vec<bool>>) -> Result<Self> {
        let num_keys = lines.first().map_or(0, Vec::len);
        let mut matrix = Self::new(num_keys);
        for line in lines {
            matrix.push(line)?;
        }
        Ok(matrix)
    }

    /// Append the next line
    pub fn push(&mut self, line: Vec<bool>) -> Result<()> {
        if line.len() != self.num_keys {
            return Err(KeyscanError::Capture(format!(
                "line {} has {} keys, expected {}",
                self.lines.len(),
                line.len(),
                self.num_keys
            )));
        }
        self.lines.push(line);
        Ok(())
    }

    /// Keys per line
    pub fn num_keys(&self) -> usize {
        self.num_keys
    }

    /// Number of sampled lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Vec<bool>] {
        &self.lines
    }

    /// Load a matrix cached by a previous run
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| KeyscanError::persistence(path, e))?;
        let matrix: Self =
            serde_json::from_str(&contents).map_err(|e| KeyscanError::persistence(path, e))?;
        info!("Loaded {} captured lines from {:?}", matrix.len(), path);
        Ok(matrix)
    }

    /// Cache the matrix as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string(self).map_err(|e| KeyscanError::persistence(path, e))?;
        fs::write(path, json)?;
        info!("Wrote {} captured lines to {:?}", self.len(), path);
        Ok(())
    }
}

impl TryFrom<Vec<Vec<bool>>> for ActivationMatrix {
    type Error = KeyscanError;

    fn try_from(lines: Vec<Vec<bool>>) -> Result<Self> {
        Self::from_lines(lines)
    }
}

impl From<ActivationMatrix> for Vec<Vec<bool>> {
    fn from(matrix: ActivationMatrix) -> Self {
        matrix.lines
    }
}
