//! Offscreen drawing surface
//!
//! Rasterizes [`DrawCommand`]s into an RGBA buffer. Every shape goes through
//! the shared [`Viewport`]; nothing here does its own coordinate math.
//!
//! Coverage is sampled at pixel centers and blended source-over, so a later
//! command always paints over an earlier one.

use easel_shared::{Color, DrawCommand, Viewport};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use glam::DVec2;
use image::{Rgba, RgbaImage};

/// Glyph cell size of the bitmap font, in font pixels
const GLYPH_SIZE: f64 = 8.0;

/// Bold text is drawn twice, the second pass shifted right by this many font pixels
const BOLD_STYLE: u8 = 1;

pub struct Canvas {
    image: RgbaImage,
    viewport: Viewport,
}

impl Canvas {
    /// Fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            viewport: Viewport::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    /// Replace the buffer with a blank one of the new size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
        self.viewport = Viewport::new(width, height);
    }

    /// Paint one command. Window-level commands (background, resize,
    /// fullscreen) are not canvas content and are ignored here.
    pub fn apply(&mut self, command: &DrawCommand) {
        let vp = self.viewport;
        match command {
            DrawCommand::Line {
                start,
                stop,
                size,
                color,
            } => self.stroke_line(
                vp.to_pixels(*start),
                vp.to_pixels(*stop),
                vp.scale_to_pixels(*size),
                *color,
            ),
            DrawCommand::Rect { pos, size, color } => {
                let center = vp.to_pixels(*pos);
                let half = DVec2::new(vp.scale_to_pixels(size.x), vp.scale_to_pixels(size.y)).abs()
                    / 2.0;
                self.fill(center - half, center + half, *color, |p| {
                    let d = (p - center).abs();
                    d.x <= half.x && d.y <= half.y
                });
            }
            DrawCommand::RoundRect {
                pos,
                size,
                radius,
                color,
            } => {
                let center = vp.to_pixels(*pos);
                let half = DVec2::new(vp.scale_to_pixels(size.x), vp.scale_to_pixels(size.y)).abs()
                    / 2.0;
                let r = vp.scale_to_pixels(*radius).clamp(0.0, half.min_element());
                self.fill(center - half, center + half, *color, |p| {
                    let q = (p - center).abs() - half + DVec2::splat(r);
                    let outside = q.max(DVec2::ZERO).length();
                    let inside = q.x.max(q.y).min(0.0);
                    outside + inside - r <= 0.0
                });
            }
            DrawCommand::Circle { pos, radius, color } => {
                let center = vp.to_pixels(*pos);
                let r = vp.scale_to_pixels(*radius).abs();
                let extent = DVec2::splat(r);
                self.fill(center - extent, center + extent, *color, |p| {
                    p.distance_squared(center) <= r * r
                });
            }
            DrawCommand::Triangle { a, b, c, color } => {
                let (a, b, c) = (vp.to_pixels(*a), vp.to_pixels(*b), vp.to_pixels(*c));
                self.fill(a.min(b).min(c), a.max(b).max(c), *color, |p| {
                    let e0 = edge(a, b, p);
                    let e1 = edge(b, c, p);
                    let e2 = edge(c, a, p);
                    (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0)
                });
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                style,
                color,
                ..
            } => self.text(vp.to_pixels(*pos), text, vp.scale_to_pixels(*size), *style, *color),
            DrawCommand::SetBackground { .. }
            | DrawCommand::Resize { .. }
            | DrawCommand::Fullscreen { .. } => {}
        }
    }

    /// Stroke with butt caps: the band ends exactly at both endpoints
    fn stroke_line(&mut self, start: DVec2, stop: DVec2, width: f64, color: Color) {
        let dir = stop - start;
        let len_sq = dir.length_squared();
        if len_sq == 0.0 {
            return;
        }
        let half = width.abs() / 2.0;
        let pad = DVec2::splat(half);
        self.fill(start.min(stop) - pad, start.max(stop) + pad, color, |p| {
            let t = (p - start).dot(dir) / len_sq;
            if !(0.0..=1.0).contains(&t) {
                return false;
            }
            p.distance(start + dir * t) <= half
        });
    }

    /// Bitmap text centered on `center`, `height` pixels tall
    fn text(&mut self, center: DVec2, text: &str, height: f64, style: u8, color: Color) {
        let cell = height.abs() / GLYPH_SIZE;
        if cell <= 0.0 || text.is_empty() {
            return;
        }
        let glyphs: Vec<[u8; 8]> = text
            .chars()
            .map(|ch| BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')).unwrap_or([0; 8]))
            .collect();
        let advance = GLYPH_SIZE * cell;
        let origin = center - DVec2::new(advance * glyphs.len() as f64, advance) / 2.0;
        let passes = if style & BOLD_STYLE != 0 { 2 } else { 1 };

        for (i, glyph) in glyphs.iter().enumerate() {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..8 {
                    // Bit 0 is the leftmost column
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    for pass in 0..passes {
                        let min = origin
                            + DVec2::new(
                                i as f64 * advance + (col + pass) as f64 * cell,
                                row as f64 * cell,
                            );
                        let max = min + DVec2::splat(cell);
                        self.fill(min, max, color, |p| {
                            p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y
                        });
                    }
                }
            }
        }
    }

    /// Blend `color` into every pixel in the box whose center passes `inside`
    fn fill(&mut self, min: DVec2, max: DVec2, color: Color, inside: impl Fn(DVec2) -> bool) {
        if color.alpha() == 0 {
            return;
        }
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);
        let x0 = (min.x.floor() as i64).clamp(0, w);
        let x1 = (max.x.ceil() as i64).clamp(0, w);
        let y0 = (min.y.floor() as i64).clamp(0, h);
        let y1 = (max.y.ceil() as i64).clamp(0, h);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                if inside(center) {
                    let pixel = self.image.get_pixel_mut(x as u32, y as u32);
                    *pixel = blend(*pixel, color);
                }
            }
        }
    }
}

/// Twice the signed area of (a, b, p)
fn edge(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Source-over compositing of straight-alpha colors
pub(crate) fn blend(dst: Rgba<u8>, src: Color) -> Rgba<u8> {
    let sa = src.alpha() as f32 / 255.0;
    if sa >= 1.0 {
        return Rgba(src.0);
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let s = src.0[i] as f32 / 255.0;
        let d = dst.0[i] as f32 / 255.0;
        let c = (s * sa + d * da * (1.0 - sa)) / out_a;
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
