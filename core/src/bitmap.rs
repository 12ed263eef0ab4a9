//! Uncompressed 24-bit BMP decoding
//!
//! Only the subset of the format the terrain assets use: a 54-byte header
//! followed by bottom-up BGR rows. Missing image size and data offset fields
//! are filled in from the dimensions, which many exporters leave at zero.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::BitmapError;

/// Size of the file header plus the BITMAPINFOHEADER
pub const HEADER_LEN: usize = 54;

const SIGNATURE: &[u8; 2] = b"BM";
const DATA_OFFSET: usize = 0x0A;
const WIDTH: usize = 0x12;
const HEIGHT: usize = 0x16;
const BITS_PER_PIXEL: usize = 0x1C;
const COMPRESSION: usize = 0x1E;
const IMAGE_SIZE: usize = 0x22;

/// Decoded BMP pixel data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// BGR rows as stored in the file, bottom row first
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Read and decode a BMP file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BitmapError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| BitmapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes)
    }

    /// Decode a BMP held in memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, BitmapError> {
        if bytes.len() < HEADER_LEN {
            return Err(BitmapError::TooShort { len: bytes.len() });
        }
        let header = &bytes[..HEADER_LEN];
        if &header[..2] != SIGNATURE {
            return Err(BitmapError::BadSignature);
        }

        let compression = LittleEndian::read_u32(&header[COMPRESSION..]);
        if compression != 0 {
            return Err(BitmapError::Compressed { compression });
        }
        let bits = LittleEndian::read_u16(&header[BITS_PER_PIXEL..]);
        if bits != 24 {
            return Err(BitmapError::UnsupportedBitDepth { bits });
        }

        let raw_width = LittleEndian::read_i32(&header[WIDTH..]);
        let raw_height = LittleEndian::read_i32(&header[HEIGHT..]);
        if raw_width <= 0 || raw_height <= 0 {
            return Err(BitmapError::InvalidDimensions {
                width: raw_width,
                height: raw_height,
            });
        }
        let width = raw_width as u32;
        let height = raw_height as u32;
        let tight_len = width as usize * height as usize * 3;

        let mut data_offset = LittleEndian::read_u32(&header[DATA_OFFSET..]) as usize;
        if data_offset == 0 {
            data_offset = HEADER_LEN;
        }
        let mut image_size = LittleEndian::read_u32(&header[IMAGE_SIZE..]) as usize;
        if image_size == 0 {
            image_size = tight_len;
        }
        if image_size < tight_len {
            return Err(BitmapError::Truncated {
                expected: tight_len,
                actual: image_size,
            });
        }

        let available = bytes.len().saturating_sub(data_offset);
        if available < image_size {
            return Err(BitmapError::Truncated {
                expected: image_size,
                actual: available,
            });
        }

        Ok(Self {
            pixels: bytes[data_offset..data_offset + image_size].to_vec(),
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw BGR bytes, bottom row first
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes between the starts of consecutive rows.
    ///
    /// Rows are padded to four bytes when the image size covers every row
    /// padded, otherwise they are tightly packed. Slack after tightly packed
    /// rows does not count as padding.
    pub fn row_stride(&self) -> usize {
        let tight = self.width as usize * 3;
        let padded = (tight + 3) & !3;
        if self.pixels.len() >= padded * self.height as usize {
            padded
        } else {
            tight
        }
    }

    /// Convert to tightly packed RGBA8, keeping the bottom-up row order so
    /// that texture coordinate v = 0 addresses the first stored row.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let stride = self.row_stride();
        let row_len = self.width as usize * 3;
        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for row in 0..self.height as usize {
            let start = row * stride;
            for bgr in self.pixels[start..start + row_len].chunks_exact(3) {
                rgba.extend_from_slice(&[bgr[2], bgr[1], bgr[0], u8::MAX]);
            }
        }
        rgba
    }
}
