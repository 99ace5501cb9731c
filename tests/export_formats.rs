//! Export files written from an assembled KPI board: magic bytes, sidecar
//! checksums, PDF page structure and PPTX slide count.

use std::fs;

use wellboard::board::assemble;
use wellboard::config::{BoardKind, Config};
use wellboard::export::pptx::entry_names;
use wellboard::export::{export_to_dir, file_sha256, render, ExportFormat};
use wellboard::render::Dashboard;
use wellboard::seed;
use wellboard::store::Store;

fn board() -> Dashboard {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();
    seed::seed_demo(&store, 3).unwrap();
    assemble(BoardKind::Kpi, &store, &Config::default()).unwrap()
}

#[test]
fn every_format_writes_file_and_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let board = board();
    for format in ExportFormat::ALL {
        let written = export_to_dir(format, &board, dir.path()).unwrap();
        assert_eq!(written.path, dir.path().join(format.file_name("Geohallitians")));
        assert_eq!(fs::metadata(&written.path).unwrap().len() as usize, written.bytes);
        assert_eq!(file_sha256(&written.path).unwrap(), written.sha256);

        let sidecar_path = dir.path().join(format!("{}.sha256", format.file_name("Geohallitians")));
        let sidecar = fs::read_to_string(sidecar_path).unwrap();
        assert!(sidecar.starts_with(&written.sha256));
        assert!(sidecar.trim_end().ends_with(&format.file_name("Geohallitians")));
    }
}

#[test]
fn magic_bytes() {
    let board = board();
    let png = render(ExportFormat::Png, &board).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let pdf = render(ExportFormat::Pdf, &board).unwrap();
    assert_eq!(&pdf[..5], b"%PDF-");
    let pptx = render(ExportFormat::Pptx, &board).unwrap();
    assert_eq!(&pptx[..2], b"PK");
}

#[test]
fn pdf_is_one_page_with_the_snapshot() {
    let pdf = render(ExportFormat::Pdf, &board()).unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert_eq!(text.matches("/Type /Page ").count(), 1);
    assert!(text.contains("/Count 1"));
    assert!(text.contains("/Width 1280 /Height 800"));
    assert!(text.contains("/Predictor 15"));
}

#[test]
fn pptx_has_two_slides_and_the_snapshot_png() {
    let board = board();
    let deck = render(ExportFormat::Pptx, &board).unwrap();
    let names = entry_names(&deck).unwrap();
    let slides: Vec<_> = names
        .iter()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .collect();
    assert_eq!(slides.len(), 2);
    assert!(names.contains(&"[Content_Types].xml".to_string()));
    assert!(names.contains(&"ppt/media/image1.png".to_string()));

    let png = render(ExportFormat::Png, &board).unwrap();
    assert!(deck.windows(png.len()).any(|w| w == png.as_slice()));
}

#[test]
fn snapshot_is_stable_for_the_same_board() {
    let board = board();
    assert_eq!(render(ExportFormat::Png, &board).unwrap(), render(ExportFormat::Png, &board).unwrap());
}

#[test]
fn hostile_brand_still_writes_inside_the_export_dir() {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();
    let cfg = Config { brand: "../outside/Acme".to_string(), ..Config::default() };
    let board = assemble(BoardKind::Kpi, &store, &cfg).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let written = export_to_dir(ExportFormat::Png, &board, dir.path()).unwrap();
    assert_eq!(written.path.parent(), Some(dir.path()));
    assert_eq!(written.path.file_name().unwrap(), "___outside_Acme_dashboard.png");
}
