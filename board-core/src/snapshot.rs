//! Full-frame raster snapshots and their encoded wire form.
//!
//! History keeps snapshots raw so undo/redo restores are pixel-exact. For the
//! persistence pipeline and the remote store a snapshot travels as a PNG
//! `data:image/png;base64,...` data URI, opaque to everything but this module.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{BoardError, BoardResult};

/// MIME prefix of the encoded snapshot form.
const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// An immutable full-frame raster capture of the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Snapshot {
    /// Build a snapshot from raw RGBA8 pixels.
    pub(crate) fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Snapshot width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Snapshot height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether every pixel is fully transparent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    /// Encode as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Encode`] if PNG encoding fails.
    pub fn to_png(&self) -> BoardResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| BoardError::Encode("pixel buffer size mismatch".into()))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| BoardError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// Encode as a `data:image/png;base64,...` data URI.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Encode`] if PNG encoding fails.
    pub fn to_data_uri(&self) -> BoardResult<String> {
        let png = self.to_png()?;
        Ok(format!("{DATA_URI_PREFIX}{}", BASE64.encode(png)))
    }

    /// Decode a snapshot from a base64 PNG data URI.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSnapshot`] if the URI is malformed or the
    /// image cannot be decoded.
    pub fn from_data_uri(uri: &str) -> BoardResult<Self> {
        let encoded = parse_data_uri(uri)?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| BoardError::InvalidSnapshot(format!("bad base64: {e}")))?;
        Self::from_png_bytes(&bytes)
    }

    /// Decode a snapshot from raw image bytes (PNG or any `image`-supported
    /// format).
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSnapshot`] if the bytes do not decode.
    pub fn from_png_bytes(data: &[u8]) -> BoardResult<Self> {
        let img = image::load_from_memory(data)
            .map_err(|e| BoardError::InvalidSnapshot(format!("image decode failed: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// Extract the base64 payload from a data URI.
fn parse_data_uri(uri: &str) -> BoardResult<&str> {
    if !uri.starts_with("data:") {
        return Err(BoardError::InvalidSnapshot("not a data URI".into()));
    }
    let comma = uri
        .find(',')
        .ok_or_else(|| BoardError::InvalidSnapshot("data URI has no payload".into()))?;
    let meta = &uri[5..comma];
    if !meta.ends_with(";base64") {
        return Err(BoardError::InvalidSnapshot(
            "data URI is not base64 encoded".into(),
        ));
    }
    Ok(&uri[comma + 1..])
}
