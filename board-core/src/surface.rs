//! The raster drawing surface.
//!
//! Owns an RGBA8 pixel buffer sized to its container. Segments are stamped as
//! capsules (a rectangle with semicircular ends), which gives round caps and
//! joins for free: a zero-length segment still paints a circle of the stroke
//! width's diameter.

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;
use crate::stroke::{Color, StrokeStyle, Tool};

/// A point in surface-local coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The raster drawing area.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    /// RGBA8 pixel data, row-major, `width * height * 4` bytes.
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a fully transparent surface of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The RGBA value at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Whether every pixel is fully transparent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }

    /// Blank the surface to full transparency.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Resize the surface to a new container size.
    ///
    /// The buffer is blanked; the caller repaints from the current history
    /// entry afterwards so content is preserved by redrawing, never by
    /// scaling pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
    }

    /// Capture a full-frame raster snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Blank the surface, then paint `snapshot` at the origin.
    ///
    /// When dimensions match this is a pixel-exact restore. When they differ
    /// (after a resize) the overlapping region is copied and the rest stays
    /// transparent.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.clear();
        self.paint(snapshot);
    }

    /// Paint `snapshot` over the surface at the origin, clipped to bounds.
    pub fn paint(&mut self, snapshot: &Snapshot) {
        let copy_w = (self.width.min(snapshot.width()) as usize) * 4;
        let copy_h = self.height.min(snapshot.height()) as usize;
        let src_stride = (snapshot.width() as usize) * 4;
        let dst_stride = (self.width as usize) * 4;
        let src = snapshot.pixels();
        for row in 0..copy_h {
            let s = row * src_stride;
            let d = row * dst_stride;
            self.pixels[d..d + copy_w].copy_from_slice(&src[s..s + copy_w]);
        }
    }

    /// Stamp one stroke segment from `from` to `to`.
    ///
    /// Every pixel within `style.radius()` of the segment is composited: the
    /// pen blends its color source-over, the eraser clears to transparency.
    /// `from == to` paints a single dot.
    pub fn draw_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let radius = style.radius();
        let r2 = radius * radius;

        let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
        let max_x = ((from.x.max(to.x) + radius).ceil() as i64)
            .clamp(0, i64::from(self.width).saturating_sub(1)) as u32;
        let max_y = ((from.y.max(to.y) + radius).ceil() as i64)
            .clamp(0, i64::from(self.height).saturating_sub(1)) as u32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point::new(x as f32, y as f32);
                if distance_sq_to_segment(p, from, to) <= r2 {
                    let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
                    match style.tool {
                        Tool::Pen => blend_source_over(&mut self.pixels[i..i + 4], style.color),
                        Tool::Eraser => self.pixels[i..i + 4].fill(0),
                    }
                }
            }
        }
    }
}

/// Composite `color` over an RGBA8 destination pixel.
fn blend_source_over(dst: &mut [u8], color: Color) {
    if color.a == 255 {
        dst.copy_from_slice(&[color.r, color.g, color.b, 255]);
        return;
    }
    let sa = f32::from(color.a) / 255.0;
    let inv = 1.0 - sa;
    dst[0] = f32::from(color.r).mul_add(sa, f32::from(dst[0]) * inv) as u8;
    dst[1] = f32::from(color.g).mul_add(sa, f32::from(dst[1]) * inv) as u8;
    dst[2] = f32::from(color.b).mul_add(sa, f32::from(dst[2]) * inv) as u8;
    dst[3] = 255.0_f32.mul_add(sa, f32::from(dst[3]) * inv) as u8;
}

/// Squared distance from `p` to the segment `a`-`b`.
fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx.mul_add(abx, aby * aby);

    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0)
    };

    let cx = t.mul_add(abx, a.x);
    let cy = t.mul_add(aby, a.y);
    let dx = p.x - cx;
    let dy = p.y - cy;
    dx.mul_add(dx, dy * dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen(width: f32) -> StrokeStyle {
        StrokeStyle::pen(Color::BLACK, width)
    }

    #[test]
    fn new_surface_is_blank() {
        let surface = Surface::new(100, 80);
        assert!(surface.is_blank());
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(100, 0), None);
    }

    #[test]
    fn zero_length_segment_paints_a_dot() {
        let mut surface = Surface::new(100, 100);
        let p = Point::new(50.0, 50.0);
        surface.draw_segment(p, p, &pen(10.0));

        // The stamp covers a circle of diameter 10 around (50, 50).
        assert_eq!(surface.pixel(50, 50), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(54, 50), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(50, 46), Some([0, 0, 0, 255]));
        // Outside the radius stays untouched.
        assert_eq!(surface.pixel(60, 50), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(99, 99), Some([0, 0, 0, 0]));
    }

    #[test]
    fn segment_paints_continuous_line() {
        let mut surface = Surface::new(100, 100);
        surface.draw_segment(Point::new(10.0, 20.0), Point::new(40.0, 20.0), &pen(4.0));

        for x in 10..=40 {
            assert_eq!(surface.pixel(x, 20), Some([0, 0, 0, 255]), "gap at x={x}");
        }
        assert_eq!(surface.pixel(25, 30), Some([0, 0, 0, 0]));
    }

    #[test]
    fn eraser_clears_painted_pixels() {
        let mut surface = Surface::new(50, 50);
        let p = Point::new(25.0, 25.0);
        surface.draw_segment(p, p, &pen(20.0));
        assert_eq!(surface.pixel(25, 25), Some([0, 0, 0, 255]));

        surface.draw_segment(p, p, &StrokeStyle::eraser(8.0));
        assert_eq!(surface.pixel(25, 25), Some([0, 0, 0, 0]));
        // Beyond the eraser radius the pen stroke survives.
        assert_eq!(surface.pixel(33, 25), Some([0, 0, 0, 255]));
    }

    #[test]
    fn segment_clips_to_surface_bounds() {
        let mut surface = Surface::new(20, 20);
        surface.draw_segment(Point::new(-10.0, 5.0), Point::new(30.0, 5.0), &pen(6.0));
        assert_eq!(surface.pixel(0, 5), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(19, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn snapshot_restore_is_pixel_exact() {
        let mut surface = Surface::new(64, 64);
        surface.draw_segment(Point::new(5.0, 5.0), Point::new(50.0, 40.0), &pen(3.0));
        let snapshot = surface.snapshot();
        let before = surface.pixels().to_vec();

        surface.clear();
        assert!(surface.is_blank());

        surface.restore(&snapshot);
        assert_eq!(surface.pixels(), before.as_slice());
    }

    #[test]
    fn restore_after_resize_clips_and_pads() {
        let mut surface = Surface::new(40, 40);
        let p = Point::new(35.0, 35.0);
        surface.draw_segment(p, p, &pen(4.0));
        let snapshot = surface.snapshot();

        // Grow: content is preserved at the origin, new area transparent.
        surface.resize(80, 80);
        surface.restore(&snapshot);
        assert_eq!(surface.pixel(35, 35), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(70, 70), Some([0, 0, 0, 0]));

        // Shrink: out-of-bounds content is clipped, no panic.
        surface.resize(20, 20);
        surface.restore(&snapshot);
        assert!(surface.is_blank());
    }

    #[test]
    fn translucent_pen_blends_over_existing_content() {
        let mut surface = Surface::new(10, 10);
        let p = Point::new(5.0, 5.0);
        surface.draw_segment(p, p, &StrokeStyle::pen(Color::rgb(255, 255, 255), 4.0));
        surface.draw_segment(p, p, &StrokeStyle::pen(Color::rgba(0, 0, 0, 128), 4.0));

        let px = surface.pixel(5, 5).expect("in bounds");
        // Half black over white lands near mid grey.
        assert!(px[0] > 100 && px[0] < 150, "got {px:?}");
        assert_eq!(px[3], 255);
    }
}
