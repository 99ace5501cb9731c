//! Dashboard server. Board, bind address and database come from the
//! environment; see `Config::from_env`.

use anyhow::Result;

fn main() -> Result<()> {
    wellboard::server::run(None)
}
