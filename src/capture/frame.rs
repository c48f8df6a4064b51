// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Packed RGB frame buffers.

use crate::error::{KeyscanError, Result};

/// Bytes per pixel (R, G, B)
pub const CHANNELS: usize = 3;

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One captured frame, row-major, 3 bytes per pixel in R,G,B order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a packed buffer; the height follows from its length
    pub fn new(width: u32, data: Vec<u8>) -> Result<Self> {
        let stride = width as usize * CHANNELS;
        if stride == 0 {
            return Err(KeyscanError::Capture("frame width is zero".to_string()));
        }
        if data.len() % stride != 0 {
            return Err(KeyscanError::Capture(format!(
                "buffer of {} bytes is not a whole number of {}-pixel rows",
                data.len(),
                width
            )));
        }
        let height = (data.len() / stride) as u32;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one color
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Consume the frame, returning its packed bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: i32, y: i32) -> Result<usize> {
        let out_of_bounds = || KeyscanError::OutOfBounds {
            x: x.max(0) as u32,
            y: y.max(0) as u32,
            width: self.width,
            height: self.height,
        };
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Err(out_of_bounds());
        }
        Ok((self.width as usize * y as usize + x as usize) * CHANNELS)
    }

    /// Color at `(x, y)`
    pub fn pixel(&self, x: i32, y: i32) -> Result<Rgb> {
        let offset = self.offset(x, y)?;
        Ok(Rgb::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ))
    }

    /// Overwrite the color at `(x, y)`
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) -> Result<()> {
        let offset = self.offset(x, y)?;
        self.data[offset..offset + CHANNELS].copy_from_slice(&[color.r, color.g, color.b]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_offset() {
        // 2x2 frame: red, green / blue, white
        let data = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let frame = Frame::new(2, data).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.pixel(0, 0).unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(frame.pixel(1, 0).unwrap(), Rgb::new(0, 255, 0));
        assert_eq!(frame.pixel(0, 1).unwrap(), Rgb::new(0, 0, 255));
        assert_eq!(frame.pixel(1, 1).unwrap(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_out_of_bounds_does_not_wrap() {
        let frame = Frame::filled(4, 3, Rgb::new(0, 0, 0));
        // x == width would read the next row's first pixel if unchecked
        assert!(matches!(
            frame.pixel(4, 0),
            Err(KeyscanError::OutOfBounds { width: 4, height: 3, .. })
        ));
        assert!(frame.pixel(0, 3).is_err());
        assert!(frame.pixel(-1, 0).is_err());
    }

    #[test]
    fn test_rejects_ragged_buffer() {
        assert!(matches!(
            Frame::new(2, vec![0; 7]),
            Err(KeyscanError::Capture(_))
        ));
        assert!(Frame::new(0, Vec::new()).is_err());
    }

    #[test]
    fn test_set_pixel() {
        let mut frame = Frame::filled(3, 1, Rgb::new(10, 10, 10));
        frame.set_pixel(1, 0, Rgb::new(255, 0, 255)).unwrap();
        assert!(frame.set_pixel(3, 0, Rgb::new(0, 0, 0)).is_err());
        assert_eq!(frame.into_bytes(), vec![10, 10, 10, 255, 0, 255, 10, 10, 10]);
    }
}
