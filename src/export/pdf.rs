//! Single-page PDF that wraps a PNG snapshot without re-encoding it.
//!
//! The PNG's IDAT stream is already zlib data with per-row PNG predictors,
//! which PDF's FlateDecode accepts directly given `/Predictor 15`. The page is
//! sized to the image at 96 dpi.

use anyhow::{bail, ensure, Context, Result};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const POINTS_PER_PIXEL: f64 = 72.0 / 96.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PngImage {
    pub width: u32,
    pub height: u32,
    pub idat: Vec<u8>,
}

/// Splits an 8-bit non-interlaced RGB PNG into its header fields and the
/// concatenated IDAT payload.
pub fn parse_png(bytes: &[u8]) -> Result<PngImage> {
    ensure!(bytes.len() > 8 && bytes[..8] == PNG_SIGNATURE, "not a png");
    let mut pos = 8;
    let mut header = None;
    let mut idat = Vec::new();
    while pos + 8 <= bytes.len() {
        let len = u32::from_be_bytes(bytes[pos..pos + 4].try_into()?) as usize;
        let kind = &bytes[pos + 4..pos + 8];
        let start = pos + 8;
        let end = start.checked_add(len).context("chunk length overflow")?;
        ensure!(end + 4 <= bytes.len(), "truncated png chunk");
        let data = &bytes[start..end];
        match kind {
            b"IHDR" => {
                ensure!(data.len() == 13, "bad IHDR");
                let width = u32::from_be_bytes(data[0..4].try_into()?);
                let height = u32::from_be_bytes(data[4..8].try_into()?);
                let (depth, color, interlace) = (data[8], data[9], data[12]);
                if depth != 8 || color != 2 || interlace != 0 {
                    bail!("unsupported png layout depth={depth} color={color} interlace={interlace}");
                }
                header = Some((width, height));
            }
            b"IDAT" => idat.extend_from_slice(data),
            b"IEND" => break,
            _ => {}
        }
        pos = end + 4;
    }
    let (width, height) = header.context("png without IHDR")?;
    ensure!(!idat.is_empty(), "png without image data");
    Ok(PngImage { width, height, idat })
}

struct PdfWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self { out, offsets: Vec::new() }
    }

    fn object(&mut self, body: &str) {
        self.offsets.push(self.out.len());
        let n = self.offsets.len();
        self.out.extend_from_slice(format!("{n} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, dict: &str, data: &[u8]) {
        self.offsets.push(self.out.len());
        let n = self.offsets.len();
        self.out.extend_from_slice(
            format!("{n} 0 obj\n<< {dict} /Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.out.extend_from_slice(data);
        self.out.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref = self.out.len();
        let count = self.offsets.len() + 1;
        let mut table = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for off in &self.offsets {
            table.push_str(&format!("{off:010} 00000 n \n"));
        }
        table.push_str(&format!(
            "trailer\n<< /Size {count} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        ));
        self.out.extend_from_slice(table.as_bytes());
        self.out
    }
}

pub fn from_png(png_bytes: &[u8]) -> Result<Vec<u8>> {
    let image = parse_png(png_bytes)?;
    let page_w = image.width as f64 * POINTS_PER_PIXEL;
    let page_h = image.height as f64 * POINTS_PER_PIXEL;

    let mut pdf = PdfWriter::new();
    pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    pdf.object(&format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
         /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>"
    ));
    pdf.stream(
        &format!(
            "/Type /XObject /Subtype /Image /Width {w} /Height {h} /ColorSpace /DeviceRGB \
             /BitsPerComponent 8 /Filter /FlateDecode \
             /DecodeParms << /Predictor 15 /Colors 3 /BitsPerComponent 8 /Columns {w} >>",
            w = image.width,
            h = image.height
        ),
        &image.idat,
    );
    let content = format!("q\n{page_w:.2} 0 0 {page_h:.2} 0 0 cm\n/Im0 Do\nQ");
    pdf.stream("", content.as_bytes());
    Ok(pdf.finish(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::raster::{Canvas, WHITE};

    #[test]
    fn wraps_png_as_single_page() {
        let png = Canvas::new(40, 20, WHITE).encode_png().unwrap();
        let pdf = from_png(&png).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("/Width 40 /Height 20"));
        assert!(text.contains("/MediaBox [0 0 30.00 15.00]"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let png = Canvas::new(8, 8, WHITE).encode_png().unwrap();
        let pdf = from_png(&png).unwrap();
        let text = String::from_utf8_lossy(&pdf).into_owned();
        let xref = text.rfind("xref\n").unwrap();
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take(5)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, off) in entries.iter().enumerate() {
            assert!(pdf[*off..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }

    #[test]
    fn rejects_non_png() {
        assert!(from_png(b"GIF89a....").is_err());
    }
}
