//! Detection overlays for visual validation.
//!
//! Draws box outlines onto an RGB frame: green for the die, red for pips.
//! This is the only rendering in scope; the display collaborator owns
//! everything beyond it.

use image::{Rgb, RgbImage};

use crate::bbox::BBox;
use crate::ingest::DetectionFrame;

pub const DIE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const PIP_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const THICKNESS: u32 = 2;

/// Draw the frame's die and pip boxes onto `image`.
pub fn draw_detections(image: &mut RgbImage, frame: &DetectionFrame) {
    if let Some(die) = &frame.die_box {
        draw_box_outline(image, die, DIE_COLOR);
    }
    for pip in &frame.pip_boxes {
        draw_box_outline(image, pip, PIP_COLOR);
    }
}

/// Outline one box, clamped to the image bounds.
pub fn draw_box_outline(image: &mut RgbImage, bbox: &BBox, color: Rgb<u8>) {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let clamp_x = |v: f64| (v.max(0.0) as u32).min(w - 1);
    let clamp_y = |v: f64| (v.max(0.0) as u32).min(h - 1);
    let (x1, y1) = (clamp_x(bbox.x1), clamp_y(bbox.y1));
    let (x2, y2) = (clamp_x(bbox.x2), clamp_y(bbox.y2));

    for t in 0..THICKNESS {
        // Horizontal edges.
        for x in x1..=x2 {
            put(image, x, y1.saturating_add(t).min(h - 1), color);
            put(image, x, y2.saturating_sub(t), color);
        }
        // Vertical edges.
        for y in y1..=y2 {
            put(image, x1.saturating_add(t).min(w - 1), y, color);
            put(image, x2.saturating_sub(t), y, color);
        }
    }
}

fn put(image: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>) {
    if x < image.width() && y < image.height() {
        image.put_pixel(x, y, color);
    }
}
