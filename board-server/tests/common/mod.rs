//! Shared helpers for integration tests.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

pub mod server;

use board_core::{Color, Point, StrokeStyle, Surface};

/// Encode a small board with one dot as a PNG data URI.
pub fn sample_board(x: f32, y: f32) -> String {
    let mut surface = Surface::new(64, 64);
    let p = Point::new(x, y);
    surface.draw_segment(p, p, &StrokeStyle::pen(Color::BLACK, 8.0));
    surface.snapshot().to_data_uri().expect("encodes")
}
