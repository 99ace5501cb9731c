//! Serves the trajectory board regardless of `WELLBOARD_BOARD`.

use anyhow::Result;
use wellboard::config::BoardKind;

fn main() -> Result<()> {
    wellboard::server::run(Some(BoardKind::Trajectory))
}
