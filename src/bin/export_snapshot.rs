//! Writes dashboard exports without starting the server.
//! Usage: export_snapshot <png|pdf|pptx|all> [out_dir]

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use wellboard::board;
use wellboard::config::Config;
use wellboard::export::{export_to_dir, ExportFormat};
use wellboard::store::Store;

fn main() -> Result<()> {
    let which = env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let formats = if which == "all" {
        ExportFormat::ALL.to_vec()
    } else {
        match ExportFormat::parse(&which) {
            Ok(f) => vec![f],
            Err(err) => {
                eprintln!("{}; expected png, pdf, pptx or all", err);
                std::process::exit(2);
            }
        }
    };
    let cfg = Config::from_env();
    let out_dir = env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.export_dir));

    let store = match Store::open(&cfg.db_path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("cannot open {}: {:#}", cfg.db_path, err);
            std::process::exit(1);
        }
    };
    let dashboard = board::assemble(cfg.board, &store, &cfg)?;
    for format in formats {
        let written = export_to_dir(format, &dashboard, &out_dir)?;
        println!("{}  {} ({} bytes)", written.sha256, written.path.display(), written.bytes);
    }
    store.close()
}
