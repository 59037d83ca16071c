//! Overlay and debug-view rendering.
//!
//! Drawing is delegated to `imageproc::drawing`. The annotated frame gets a
//! red bounding box and a filled green center dot per blob; the debug views
//! are white filled polygons on black, one mask per pipeline stage worth
//! inspecting.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_polygon_mut};
use imageproc::rect::Rect;

use crate::blob::Blob;
use crate::vision::Boundary;

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const GREEN: Rgb<u8> = Rgb([0, 200, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const BOX_THICKNESS: u32 = 2;
const CENTER_RADIUS: i32 = 3;

/// Copy `frame` and draw each blob's bounding box and center dot onto it.
pub fn annotate(frame: &RgbImage, blobs: &[Blob]) -> RgbImage {
    let mut out = frame.clone();
    for blob in blobs {
        draw_box(&mut out, blob);
        let (cx, cy) = blob.center;
        draw_filled_circle_mut(&mut out, (cx, cy), CENTER_RADIUS, GREEN);
    }
    out
}

fn draw_box(out: &mut RgbImage, blob: &Blob) {
    let rect = blob.bounding;
    for t in 0..BOX_THICKNESS {
        let (w, h) = (rect.width.saturating_sub(2 * t), rect.height.saturating_sub(2 * t));
        if w == 0 || h == 0 {
            break;
        }
        draw_hollow_rect_mut(
            out,
            Rect::at(rect.x + t as i32, rect.y + t as i32).of_size(w, h),
            RED,
        );
    }
}

/// Render boundary polygons filled white on a black canvas.
pub fn boundary_mask(width: u32, height: u32, boundaries: &[Boundary]) -> RgbImage {
    let mut out = RgbImage::from_pixel(width, height, BLACK);
    for boundary in boundaries {
        let poly = open_polygon(boundary);
        if poly.len() < 3 {
            continue;
        }
        draw_polygon_mut(&mut out, poly, WHITE);
    }
    out
}

/// Drop a repeated closing point; the drawing routine closes the polygon
/// itself and rejects an explicit duplicate.
fn open_polygon(boundary: &Boundary) -> &[imageproc::point::Point<i32>] {
    match boundary.split_last() {
        Some((last, rest)) if !rest.is_empty() && rest[0] == *last => rest,
        _ => boundary,
    }
}

/// Widen a single-channel map for presentation through the RGB display.
pub fn grayscale_view(map: &GrayImage) -> RgbImage {
    RgbImage::from_fn(map.width(), map.height(), |x, y| {
        let v = map.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}
