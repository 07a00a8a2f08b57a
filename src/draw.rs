//! Canvas drawing primitives shared by the label layout engines

use ab_glyph::{Font, PxScale};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const CUT_LINE_GRAY: Rgb<u8> = Rgb([180, 180, 180]);
pub const SHADE_GRAY: Rgb<u8> = Rgb([240, 240, 240]);
pub const GRID_GRAY: Rgb<u8> = Rgb([150, 150, 150]);
pub const EMERGENCY_RED: Rgb<u8> = Rgb([204, 0, 0]);

/// Draw text at a baseline-top position
pub fn text(img: &mut RgbImage, font: &impl Font, size: f32, x: i32, y: i32, s: &str, color: Rgb<u8>) {
    draw_text_mut(img, color, x, y, PxScale::from(size), font, s);
}

/// Measured pixel width of a string at the given size
pub fn text_width(font: &impl Font, size: f32, s: &str) -> u32 {
    text_size(PxScale::from(size), font, s).0
}

/// Draw text centered on a horizontal midpoint
pub fn text_centered(
    img: &mut RgbImage,
    font: &impl Font,
    size: f32,
    center_x: i32,
    y: i32,
    s: &str,
    color: Rgb<u8>,
) {
    let w = text_width(font, size, s) as i32;
    text(img, font, size, center_x - w / 2, y, s, color);
}

/// Horizontal rule of the given thickness
pub fn hline(img: &mut RgbImage, x0: i32, x1: i32, y: i32, thickness: u32, color: Rgb<u8>) {
    if x1 <= x0 {
        return;
    }
    draw_filled_rect_mut(
        img,
        Rect::at(x0, y).of_size((x1 - x0) as u32, thickness.max(1)),
        color,
    );
}

/// Vertical rule of the given thickness
pub fn vline(img: &mut RgbImage, x: i32, y0: i32, y1: i32, thickness: u32, color: Rgb<u8>) {
    if y1 <= y0 {
        return;
    }
    draw_filled_rect_mut(
        img,
        Rect::at(x, y0).of_size(thickness.max(1), (y1 - y0) as u32),
        color,
    );
}

/// Rectangle outline with pixel thickness, drawn as nested hollow rects
pub fn rect_outline(
    img: &mut RgbImage,
    x0: i32,
    y0: i32,
    w: u32,
    h: u32,
    thickness: u32,
    color: Rgb<u8>,
) {
    for t in 0..thickness as i32 {
        let inner_w = w as i32 - 2 * t;
        let inner_h = h as i32 - 2 * t;
        if inner_w <= 0 || inner_h <= 0 {
            break;
        }
        draw_hollow_rect_mut(
            img,
            Rect::at(x0 + t, y0 + t).of_size(inner_w as u32, inner_h as u32),
            color,
        );
    }
}

/// Filled rectangle
pub fn rect_filled(img: &mut RgbImage, x0: i32, y0: i32, w: u32, h: u32, color: Rgb<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    draw_filled_rect_mut(img, Rect::at(x0, y0).of_size(w, h), color);
}

/// Dashed rectangle outline used for the trim cut line
pub fn dashed_rect(
    img: &mut RgbImage,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    dash_px: u32,
    color: Rgb<u8>,
) {
    let dash = dash_px.max(1) as i32;
    let step = dash * 2;

    let mut x = x0;
    while x < x1 {
        let end = (x + dash).min(x1);
        hline(img, x, end, y0, 1, color);
        hline(img, x, end, y1, 1, color);
        x += step;
    }
    let mut y = y0;
    while y < y1 {
        let end = (y + dash).min(y1);
        vline(img, x0, y, end, 1, color);
        vline(img, x1, y, end, 1, color);
        y += step;
    }
}

/// Paste a grayscale symbol onto the canvas, clipping at the edges
pub fn paste_gray(img: &mut RgbImage, symbol: &GrayImage, x: i32, y: i32) {
    for (sx, sy, pixel) in symbol.enumerate_pixels() {
        let dx = x + sx as i32;
        let dy = y + sy as i32;
        if dx < 0 || dy < 0 || dx >= img.width() as i32 || dy >= img.height() as i32 {
            continue;
        }
        let v = pixel.0[0];
        img.put_pixel(dx as u32, dy as u32, Rgb([v, v, v]));
    }
}

/// Resize a symbol to fit within a bounding box, preserving aspect ratio.
/// Barcodes stay crisp with nearest-neighbour sampling.
pub fn fit_within(symbol: &GrayImage, max_w: u32, max_h: u32) -> GrayImage {
    if symbol.width() <= max_w && symbol.height() <= max_h {
        return symbol.clone();
    }
    let scale_w = max_w as f64 / symbol.width() as f64;
    let scale_h = max_h as f64 / symbol.height() as f64;
    let scale = scale_w.min(scale_h);
    let new_w = ((symbol.width() as f64 * scale) as u32).max(1);
    let new_h = ((symbol.height() as f64 * scale) as u32).max(1);
    image::imageops::resize(symbol, new_w, new_h, image::imageops::FilterType::Nearest)
}
