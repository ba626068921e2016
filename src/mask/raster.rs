/// CPU rasterization for the mask overlay
///
/// Strokes are rasterized straight into an RGBA layer as round-capped
/// capsules. There is no stroke log: once drawn, a segment only survives
/// as pixels.

use image::{Rgba, RgbaImage};

/// Position in overlay-local display pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// How a stroke is composited onto the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Blend {
    /// Source-over with the given straight-alpha color
    Paint(Rgba<u8>),
    /// Destination-out: covered pixels become fully transparent
    Erase,
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const MASK_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const MASK_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len_sq = abx * abx + aby * aby;

    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0)
    };

    let (cx, cy) = (a.x + t * abx, a.y + t * aby);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Straight-alpha source-over of `src` onto `dst`.
fn source_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let channel = |sc: u8, dc: u8| {
        let c = (sc as f32 * sa + dc as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Rasterize one segment of the given width onto `layer`.
///
/// A zero-length segment stamps a round dot. Pixels are covered when their
/// centre lies within `width / 2` of the segment. Returns whether any pixel
/// changed.
pub fn stroke_segment(layer: &mut RgbaImage, from: Point, to: Point, width: f32, blend: Blend) -> bool {
    let (w, h) = layer.dimensions();
    if w == 0 || h == 0 {
        return false;
    }

    let radius = width / 2.0;

    // Bounding box of the capsule, clamped to the layer
    let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
    let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
    let max_x = (from.x.max(to.x) + radius).ceil().min(w as f32);
    let max_y = (from.y.max(to.y) + radius).ceil().min(h as f32);

    if max_x <= 0.0 || max_y <= 0.0 {
        return false;
    }
    let (max_x, max_y) = (max_x as u32, max_y as u32);
    let mut changed = false;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if distance_to_segment(centre, from, to) > radius {
                continue;
            }

            let pixel = layer.get_pixel_mut(x, y);
            let blended = match blend {
                Blend::Paint(color) => source_over(*pixel, color),
                Blend::Erase => TRANSPARENT,
            };
            if blended != *pixel {
                *pixel = blended;
                changed = true;
            }
        }
    }

    changed
}

/// Wipe the whole layer to transparent.
pub fn clear(layer: &mut RgbaImage) {
    for pixel in layer.pixels_mut() {
        *pixel = TRANSPARENT;
    }
}

/// Render the binary export of an overlay layer.
///
/// Opaque black background; every pixel with any overlay coverage becomes
/// pure white, whatever its color or opacity.
pub fn binary_mask(overlay: &RgbaImage) -> RgbaImage {
    let (w, h) = overlay.dimensions();
    let mut mask = RgbaImage::from_pixel(w, h, MASK_BLACK);

    for (src, dst) in overlay.pixels().zip(mask.pixels_mut()) {
        if src[3] > 0 {
            *dst = MASK_WHITE;
        }
    }

    mask
}
