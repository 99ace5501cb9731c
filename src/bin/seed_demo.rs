//! Creates a demo database with three years of synthetic wells.
//! Usage: seed_demo <db_path> [seed]

use anyhow::{bail, Result};
use std::env;
use std::path::Path;
use wellboard::seed::{seed, SeedPlan};
use wellboard::store::Store;

fn main() -> Result<()> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: seed_demo <db_path> [seed]");
        std::process::exit(2);
    };
    let seed_value = env::args()
        .nth(2)
        .and_then(|v| v.parse().ok())
        .unwrap_or(42);
    if Path::new(&path).exists() {
        bail!("{} already exists; refusing to seed over it", path);
    }
    let store = Store::create(&path)?;
    let summary = seed(&store, &SeedPlan::demo(seed_value))?;
    println!(
        "seeded {}: {} wells, {} critical rows, {} volume rows, {} tests, {} resets",
        path, summary.wells, summary.critical_rows, summary.volume_rows, summary.test_rows, summary.resets
    );
    store.close()
}
