//! Dashboard assembly: one fetch, derive, render pass per page load.

pub mod kpi;
pub mod trajectory;

use anyhow::{Context, Result};

use crate::config::{BoardKind, Config};
use crate::derive::format::{format_number, last_updated};
use crate::derive::metrics::{monthly_means, proportions};
use crate::derive::runlife;
use crate::logging::{log, obj, v_num, v_str, Domain, Level, ProfileScope};
use crate::model::{FieldTotals, MonthlyCritical, RunLifeCycle, WellLocation, WellTotals};
use crate::render::chart::{self, markers_scatter, year_pair_lines, PairPoint};
use crate::render::map::wells_map;
use crate::render::palette::{self, YearSeries};
use crate::render::{data_card, titled_card, Card, CardBody, Dashboard};
use crate::store::Store;

pub use crate::render::page::Filter;

pub const BOARD_TITLE: &str = "PRODUCTION KPI's";
pub const BARREL_PRICE_URL: &str = "https://www.preciopetroleo.net/productos/tv-brent.html";
pub const LIFT_SYSTEMS: [&str; 4] = ["BES", "GAS LIFT", "BME", "PCP"];

pub fn assemble(kind: BoardKind, store: &Store, cfg: &Config) -> Result<Dashboard> {
    let scope = ProfileScope::with_context("assemble", &[("board", v_str(kind.as_str()))]);
    let board = match kind {
        BoardKind::Trajectory => trajectory::build(store, cfg),
        BoardKind::Kpi => kpi::build(store, cfg),
    }
    .with_context(|| format!("assemble {} board", kind.as_str()))?;
    log(
        Level::Info,
        Domain::Render,
        "board_assembled",
        obj(&[
            ("board", v_str(kind.as_str())),
            ("cards", v_num(board.cards().count() as f64)),
            ("elapsed_ms", v_num(scope.elapsed_ms())),
        ]),
    );
    Ok(board)
}

/// Run-life cycles with the configured checkpoint, marker and trailing policy.
pub fn runlife_cycles(store: &Store, cfg: &Config) -> Result<Vec<RunLifeCycle>> {
    let params = cfg.runlife_params();
    let samples = store.run_life_samples(&params.checkpoint, params.reset_marker)?;
    let cycles = runlife::segment(&samples, &params);
    log(
        Level::Debug,
        Domain::Derive,
        "runlife_segmented",
        obj(&[
            ("samples", v_num(samples.len() as f64)),
            ("cycles", v_num(cycles.len() as f64)),
        ]),
    );
    Ok(cycles)
}

fn skeleton(kind: BoardKind, cfg: &Config, filters: Vec<Filter>) -> Dashboard {
    Dashboard {
        kind,
        title: BOARD_TITLE.to_string(),
        brand: cfg.brand.clone(),
        last_updated: last_updated(cfg.utc_offset_hours),
        timezone_label: timezone_label(cfg.utc_offset_hours),
        filters,
        sidebar: Vec::new(),
        rows: Vec::new(),
        side_column: Vec::new(),
        exports: false,
        footer: format!("{} ©", cfg.brand),
    }
}

pub fn timezone_label(utc_offset_hours: i32) -> String {
    format!("UTC{:+03}:00", utc_offset_hours.clamp(-23, 23))
}

fn lift_system_filter() -> Filter {
    Filter::MultiSelect { options: LIFT_SYSTEMS.iter().map(|s| s.to_string()).collect() }
}

fn proportion_card(totals: &FieldTotals) -> Card {
    let shares = proportions(totals.gas, totals.oil, totals.water);
    titled_card(
        "Oil/Gas/Water Proportion",
        CardBody::Figure {
            figure: chart::pie(&["Gas", "Oil", "Water"], &[shares.gas, shares.oil, shares.water], &palette::PIE_COLORS, false),
        },
    )
}

fn barrel_price_card() -> Card {
    titled_card("Barrel Price Real Time (BRENT/WTI)", CardBody::Frame { src: BARREL_PRICE_URL.to_string() })
}

fn location_card(wells: &[WellTotals]) -> Card {
    titled_card("Wells Location", CardBody::Map { map: wells_map(wells) })
}

fn trajectory_card(title: &str, wells: &[WellLocation], water: bool) -> Card {
    titled_card(title, CardBody::Figure { figure: chart::trajectory_3d(wells, water) })
}

fn wells_card(count: i64) -> Card {
    data_card("Producing Wells", &count.to_string(), palette::CARD_WELLS)
}

/// Intake pressure and frequency each plotted against flow, one point per month.
fn flow_scatter_cards(monthly: &[MonthlyCritical], axis_prefix: &str, flow_title: &str) -> (Card, Card) {
    let flow: Vec<f64> = monthly.iter().map(|m| m.flow).collect();
    let pressure: Vec<f64> = monthly.iter().map(|m| m.intake_pressure).collect();
    let freq: Vec<f64> = monthly.iter().map(|m| m.freq).collect();
    let months: Vec<String> = monthly.iter().map(|m| m.month.to_string()).collect();
    let intake = titled_card(
        "Intake Pressure vs Flow",
        CardBody::Figure {
            figure: markers_scatter(&pressure, &flow, &months, &format!("{}Presion_Intake", axis_prefix), flow_title),
        },
    );
    let frequency = titled_card(
        "Frequency vs Flow",
        CardBody::Figure {
            figure: markers_scatter(&freq, &flow, &months, &format!("{}Freq", axis_prefix), flow_title),
        },
    );
    (intake, frequency)
}

fn wc_wor_card(title: &str, monthly: &[MonthlyCritical]) -> Card {
    let points: Vec<PairPoint> = monthly_means(monthly)
        .into_iter()
        .map(|m| PairPoint { year: m.year, month: m.month, first: m.wcut, second: m.wor })
        .collect();
    titled_card(
        title,
        CardBody::Figure {
            figure: year_pair_lines(&points, ["WCUT", "WOR"], [YearSeries::Wcut, YearSeries::Wor]),
        },
    )
}

fn bopd_bwpd_card(title: &str, monthly: &[MonthlyCritical]) -> Card {
    let points: Vec<PairPoint> = monthly
        .iter()
        .map(|m| PairPoint { year: m.year, month: m.month, first: m.bopd, second: m.bwpd })
        .collect();
    titled_card(
        title,
        CardBody::Figure {
            figure: year_pair_lines(&points, ["BOPD", "BWPD"], [YearSeries::Bopd, YearSeries::Bwpd]),
        },
    )
}

fn total_card(title: &str, value: f64, color: &str) -> Card {
    data_card(title, &format_number(value), color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timezone_labels() {
        assert_eq!(timezone_label(-5), "UTC-05:00");
        assert_eq!(timezone_label(0), "UTC+00:00");
        assert_eq!(timezone_label(11), "UTC+11:00");
    }

    #[test]
    fn zero_totals_render_an_empty_pie() {
        let card = proportion_card(&FieldTotals::default());
        let fig = card.figure().unwrap();
        assert_eq!(fig.data[0]["values"], serde_json::json!([0.0, 0.0, 0.0]));
    }
}
