//! Stroke tools and styles.
//!
//! A stroke is one continuous pointer-down-to-pointer-up gesture. Every point
//! of a stroke shares one tool, one color, and one width; only the rasterized
//! effect on the surface is kept, never the stroke itself.

use serde::{Deserialize, Serialize};

/// Minimum stroke width in pixels. Narrower requests are clamped up.
pub const MIN_STROKE_WIDTH: f32 = 1.0;

/// Drawing tool selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Paints with the selected color using source-over compositing.
    Pen,
    /// Clears pixels to full transparency regardless of color.
    Eraser,
}

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque black, the default pen color.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Create an opaque color from RGB channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha channel.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Style shared by every segment of one stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// How segments composite onto the surface.
    pub tool: Tool,
    /// Stroke color. Ignored by the eraser.
    pub color: Color,
    /// Stroke width in pixels, at least [`MIN_STROKE_WIDTH`].
    pub width: f32,
}

impl StrokeStyle {
    /// A pen stroke with the given color and width.
    #[must_use]
    pub fn pen(color: Color, width: f32) -> Self {
        Self {
            tool: Tool::Pen,
            color,
            width: width.max(MIN_STROKE_WIDTH),
        }
    }

    /// An eraser stroke with the given width.
    #[must_use]
    pub fn eraser(width: f32) -> Self {
        Self {
            tool: Tool::Eraser,
            color: Color::BLACK,
            width: width.max(MIN_STROKE_WIDTH),
        }
    }

    /// Half the effective stroke width, used as the stamp radius.
    #[must_use]
    pub(crate) fn radius(&self) -> f32 {
        self.width.max(MIN_STROKE_WIDTH) / 2.0
    }
}
