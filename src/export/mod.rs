//! Static exports of an assembled dashboard: PNG snapshot, single-page PDF
//! and a two-slide PPTX. Every written file gets a `.sha256` sidecar.

pub mod glyphs;
pub mod pdf;
pub mod pptx;
pub mod raster;
pub mod snapshot;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use crate::logging::{log_export, v_str, ProfileScope};
use crate::render::Dashboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
    Pptx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Pdf, ExportFormat::Pptx];

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            "pptx" => Ok(Self::Pptx),
            other => bail!("unknown export format: {other}"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
        }
    }

    /// Export file name for `brand`. Anything outside `[A-Za-z0-9_-]` in the
    /// brand becomes `_`, so the name never leaves the export directory and
    /// is safe inside a quoted header value.
    pub fn file_name(&self, brand: &str) -> String {
        let brand = file_stem(brand);
        match self {
            Self::Png => format!("{brand}_dashboard.png"),
            Self::Pdf => format!("{brand}_dashboard.pdf"),
            Self::Pptx => format!("{brand}_dashboard_presentation.pptx"),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
            Self::Pptx => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        }
    }
}

pub fn render(format: ExportFormat, board: &Dashboard) -> Result<Vec<u8>> {
    let _scope = ProfileScope::with_context("export_render", &[("format", v_str(format.as_str()))]);
    let png = snapshot::render(board).encode_png().context("encode snapshot")?;
    match format {
        ExportFormat::Png => Ok(png),
        ExportFormat::Pdf => pdf::from_png(&png).context("wrap snapshot in pdf"),
        ExportFormat::Pptx => pptx::build(&board.brand, &png).context("build presentation"),
    }
}

#[derive(Debug, Clone)]
pub struct Exported {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Streams a file through SHA-256.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn file_stem(brand: &str) -> String {
    let stem: String = brand
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "wellboard".to_string()
    } else {
        stem
    }
}

/// Writes the export plus `<file>.sha256` (`<hex>  <file name>`) into `dir`.
pub fn export_to_dir(format: ExportFormat, board: &Dashboard, dir: &Path) -> Result<Exported> {
    let bytes = render(format, board)?;
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let name = format.file_name(&board.brand);
    let path = dir.join(&name);
    fs::write(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
    let sha256 = sha256_hex(&bytes);
    let sidecar = dir.join(format!("{name}.sha256"));
    fs::write(&sidecar, format!("{sha256}  {name}\n"))
        .with_context(|| format!("write {}", sidecar.display()))?;
    log_export(format.as_str(), &path.display().to_string(), bytes.len(), &sha256);
    Ok(Exported { format, path, bytes: bytes.len(), sha256 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_and_name_files() {
        assert_eq!(ExportFormat::parse(" PDF ").unwrap(), ExportFormat::Pdf);
        assert!(ExportFormat::parse("gif").is_err());
        assert_eq!(ExportFormat::Png.file_name("Geohallitians"), "Geohallitians_dashboard.png");
        assert_eq!(
            ExportFormat::Pptx.file_name("Geohallitians"),
            "Geohallitians_dashboard_presentation.pptx"
        );
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn brand_cannot_escape_the_export_dir() {
        let name = ExportFormat::Pdf.file_name("../../etc/Acme \"Oil\"");
        assert_eq!(name, "______etc_Acme__Oil__dashboard.pdf");
        assert!(!name.contains('/') && !name.contains('"') && !name.contains(".."));
        assert_eq!(ExportFormat::Png.file_name("  "), "wellboard_dashboard.png");
        assert_eq!(ExportFormat::Png.file_name("Geo-hall_2"), "Geo-hall_2_dashboard.png");
    }
}
