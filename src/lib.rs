//! Oil and gas production dashboards backed by SQLite.
//!
//! A page load runs a fixed set of aggregation queries (`store`), reshapes
//! the rows (`derive`), and turns them into Plotly/Leaflet specs laid out as
//! a page (`render`, `board`). `export` rasterises an assembled board to
//! PNG, PDF or PPTX; `server` serves all of it over HTTP.

pub mod board;
pub mod config;
pub mod derive;
pub mod export;
pub mod logging;
pub mod model;
pub mod render;
pub mod seed;
pub mod server;
pub mod store;
