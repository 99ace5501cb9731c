//! RGB canvas with rectangle, line and bitmap-text primitives, encoded to PNG.

use anyhow::{anyhow, Result};

use crate::export::glyphs::{self, ADVANCE, GLYPH_H, GLYPH_W};

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];

/// Parses `#RRGGBB`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and a few names.
/// Alpha is composited over `under`.
pub fn parse_color(spec: &str, under: Rgb) -> Option<Rgb> {
    let s = spec.trim().to_ascii_lowercase();
    match s.as_str() {
        "white" => return Some(WHITE),
        "black" => return Some(BLACK),
        "red" => return Some([255, 0, 0]),
        _ => {}
    }
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let bytes = hex::decode(hex).ok()?;
        return Some([bytes[0], bytes[1], bytes[2]]);
    }
    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<f64> = inner
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    let (rgb, alpha) = match parts.as_slice() {
        [r, g, b] => ([*r, *g, *b], 1.0),
        [r, g, b, a] => ([*r, *g, *b], a.clamp(0.0, 1.0)),
        _ => return None,
    };
    let mut out = [0u8; 3];
    for i in 0..3 {
        let c = rgb[i].clamp(0.0, 255.0) * alpha + under[i] as f64 * (1.0 - alpha);
        out[i] = c.round() as u8;
    }
    Some(out)
}

#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: Rgb) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&fill);
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw row-major RGB bytes.
    pub fn rgb(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    pub fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 3) as usize;
        self.pixels[i..i + 3].copy_from_slice(&color);
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.put(px as i64, py as i64, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        if w == 0 || h == 0 {
            return;
        }
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y, 1, h, color);
        self.fill_rect(x + w - 1, y, 1, h, color);
    }

    /// Vertical blend from `top` to `bottom`.
    pub fn vertical_gradient(&mut self, top: Rgb, bottom: Rgb) {
        let span = self.height.saturating_sub(1).max(1) as f64;
        for y in 0..self.height {
            let t = y as f64 / span;
            let mut c = [0u8; 3];
            for i in 0..3 {
                c[i] = (top[i] as f64 + (bottom[i] as f64 - top[i] as f64) * t).round() as u8;
            }
            for x in 0..self.width {
                self.put(x as i64, y as i64, c);
            }
        }
    }

    pub fn line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgb) {
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Draws `text` with its top-left at (`x`, `top`) and returns the advance.
    /// Characters without a glyph leave a blank cell.
    pub fn text(&mut self, x: u32, top: u32, text: &str, color: Rgb, scale: u32) -> u32 {
        let scale = scale.max(1);
        let mut cursor = x;
        for ch in text.chars() {
            if let Some(rows) = glyphs::glyph(ch) {
                for gy in 0..GLYPH_H {
                    for gx in 0..GLYPH_W {
                        if glyphs::lit(&rows, gx, gy) {
                            self.fill_rect(cursor + gx * scale, top + gy * scale, scale, scale, color);
                        }
                    }
                }
            }
            cursor += ADVANCE * scale;
        }
        cursor - x
    }

    /// Text truncated to fit `max_w` pixels.
    pub fn text_clipped(&mut self, x: u32, top: u32, text: &str, color: Rgb, scale: u32, max_w: u32) -> u32 {
        let per = ADVANCE * scale.max(1);
        let fit = (max_w / per) as usize;
        let clipped: String = text.chars().take(fit).collect();
        self.text(x, top, &clipped, color, scale)
    }

    pub fn text_centered(&mut self, center_x: u32, top: u32, text: &str, color: Rgb, scale: u32) {
        let w = glyphs::text_width(text, scale.max(1));
        self.text(center_x.saturating_sub(w / 2), top, text, color, scale);
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, self.width, self.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|err| anyhow!("png header: {err}"))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|err| anyhow!("png data: {err}"))?;
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_colours() {
        assert_eq!(parse_color("#FF6633", BLACK), Some([255, 102, 51]));
        assert_eq!(parse_color("white", BLACK), Some(WHITE));
        assert_eq!(parse_color("rgba(255, 0, 0, 0.4)", BLACK), Some([102, 0, 0]));
        assert_eq!(parse_color("rgb(1, 2, 3)", WHITE), Some([1, 2, 3]));
        assert_eq!(parse_color("#12", BLACK), None);
        assert_eq!(parse_color("teal-ish", BLACK), None);
    }

    #[test]
    fn rects_clip_to_bounds() {
        let mut c = Canvas::new(4, 4, BLACK);
        c.fill_rect(2, 2, 10, 10, WHITE);
        assert_eq!(c.pixel(3, 3), Some(WHITE));
        assert_eq!(c.pixel(1, 1), Some(BLACK));
        assert_eq!(c.pixel(4, 4), None);
    }

    #[test]
    fn text_advances_per_char() {
        let mut c = Canvas::new(40, 10, BLACK);
        let advance = c.text(0, 0, "T~", WHITE, 1);
        assert_eq!(advance, 12);
        assert_eq!(c.pixel(0, 0), Some(WHITE));
        assert_eq!(c.pixel(6, 0), Some(BLACK));
    }

    #[test]
    fn png_signature() {
        let bytes = Canvas::new(3, 2, WHITE).encode_png().unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
