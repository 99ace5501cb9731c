//! Prints the run-life cycle table as pretty JSON.
//! Usage: runlife_report [db_path]

use anyhow::{Context, Result};
use std::env;
use wellboard::board::runlife_cycles;
use wellboard::config::Config;
use wellboard::store::Store;

fn main() -> Result<()> {
    let mut cfg = Config::from_env();
    if let Some(path) = env::args().nth(1) {
        cfg.db_path = path;
    }
    let store = match Store::open(&cfg.db_path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("cannot open {}: {:#}", cfg.db_path, err);
            std::process::exit(1);
        }
    };
    let cycles = runlife_cycles(&store, &cfg)?;
    let out = serde_json::to_string_pretty(&cycles).context("serialize cycles")?;
    println!("{}", out);
    store.close()
}
