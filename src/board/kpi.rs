//! The KPI board: averaged monthly variables plus run-life, run status, well
//! tests, alerts, bottom-5 rankings, hours gauge and missing values.

use anyhow::Result;

use crate::board::{
    barrel_price_card, bopd_bwpd_card, flow_scatter_cards, lift_system_filter, location_card,
    proportion_card, runlife_cycles, skeleton, trajectory_card, wc_wor_card, wells_card, Filter,
};
use crate::config::{BoardKind, Config};
use crate::derive::metrics::{average_hours, bottom_n, critical_alerts, null_heatmap, CriticalAlert};
use crate::model::{Aggregate, RunLifeCycle, RunStatusRow, WellTestRow};
use crate::render::chart::{self, well_areas, Measure};
use crate::render::palette;
use crate::render::table::{highlight_values, CellRule, Condition, DataTable};
use crate::render::{titled_card, Card, CardBody, Dashboard};
use crate::store::{Store, SOURCE_TABLES};

pub const BOTTOM_N: usize = 5;

fn filters() -> Vec<Filter> {
    vec![
        Filter::Dropdown { options: vec!["All".into()], selected: "All".into() },
        Filter::Checklist { options: vec!["All Fields".into()], selected: vec!["All Fields".into()], columns: 2 },
        lift_system_filter(),
    ]
}

pub fn runlife_table(cycles: &[RunLifeCycle], highlight: &[f64]) -> DataTable {
    let mut table = DataTable::new(&[
        ("uwi", "UWI"),
        ("peak_run_life", "Run Life"),
        ("peak_date", "Date"),
        ("lift_system", "Lift System"),
        ("cycle", "Cycle"),
    ]);
    table.rules = highlight_values("peak_run_life", highlight);
    for c in cycles {
        table.push_row(c);
    }
    table
}

pub fn run_status_table(rows: &[RunStatusRow]) -> DataTable {
    let mut table = DataTable::new(&[
        ("uwi", "UWI"),
        ("run_status", "Run Status"),
        ("date", "Date"),
        ("lift_system", "Lift System"),
    ])
    .with_rule(CellRule::new("run_status", Condition::GreaterThan(0.0), palette::HIGHLIGHT_GREEN))
    .with_rule(CellRule::new("run_status", Condition::Equals(0.0), palette::HIGHLIGHT_RED));
    for r in rows {
        table.push_row(r);
    }
    table
}

pub fn well_test_table(rows: &[WellTestRow]) -> DataTable {
    let mut table = DataTable::new(&[
        ("uwi", "UWI"),
        ("test_date", "Date"),
        ("test_num", "#"),
        ("certified", "Certified"),
        ("test_duration", "Duration"),
        ("api", "API"),
        ("bsw_p", "BSW_P"),
        ("lift_system", "Lift System"),
    ])
    .with_rule(CellRule::new("certified", Condition::Equals(1.0), palette::HIGHLIGHT_GREEN))
    .with_rule(CellRule::new("certified", Condition::Equals(0.0), palette::HIGHLIGHT_RED))
    .with_rule(CellRule::new("certified", Condition::Empty, palette::HIGHLIGHT_ORANGE));
    for r in rows {
        table.push_row(r);
    }
    table
}

pub fn alerts_table(alerts: &[CriticalAlert]) -> DataTable {
    let mut table = DataTable::new(&[
        ("uwi", "UWI"),
        ("bopd", "BOPD"),
        ("average_bopd", "Average_BOPD"),
        ("day", "Day"),
        ("kind", "Type"),
    ]);
    for a in alerts {
        table.push_row(a);
    }
    table
}

fn table_card(title: &str, table: DataTable) -> Card {
    titled_card(title, CardBody::Table { table })
}

pub fn build(store: &Store, cfg: &Config) -> Result<Dashboard> {
    let monthly = store.monthly_critical(Aggregate::Avg)?;
    let volumes = store.well_monthly_volumes()?;
    let totals = store.field_totals()?;
    let wells = store.count_wells()?;
    let locations = store.well_locations()?;
    let well_totals = store.well_totals()?;
    let hours = average_hours(&store.well_hours()?);
    let avg_bopd = store.average_bopd_by_well()?;
    let avg_gas = store.average_gas_by_well()?;
    let daily = store.daily_bopd()?;
    let bopd_trend = store.monthly_bopd_for(&cfg.bopd_wells)?;
    let cycles = runlife_cycles(store, cfg)?;
    let run_status = store.latest_run_status()?;
    let tests = store.latest_well_tests()?;
    let nulls = store.null_counts(&SOURCE_TABLES)?;

    let alerts = critical_alerts(&daily, &avg_bopd);
    let gas_volumes: Vec<_> = volumes
        .iter()
        .filter(|v| cfg.gas_wells.contains(&v.uwi))
        .cloned()
        .collect();

    let mut board = skeleton(BoardKind::Kpi, cfg, filters());
    board.exports = true;
    board.sidebar = vec![
        proportion_card(&totals),
        titled_card(
            "Average Hours/Day",
            CardBody::Figure { figure: chart::gauge(&hours, "Average Hours Per Day") },
        ),
        barrel_price_card(),
    ];

    let oil_trend = titled_card(
        "Top 5 highest Oil production",
        CardBody::Figure { figure: chart::bopd_trend(&bopd_trend) },
    );
    let gas_trend = titled_card(
        "Top 5 highest Gas production",
        CardBody::Figure {
            figure: well_areas(&gas_volumes, Measure::Gas, "Month/Year", "Sum Gas Production (KPC)"),
        },
    );
    let (intake, frequency) = flow_scatter_cards(&monthly, "Average_", "Average Caudal");

    board.rows = vec![
        vec![location_card(&well_totals), oil_trend, gas_trend],
        vec![
            trajectory_card("Well depth and aquifer depth", &locations, true),
            table_card("Operational efficiency", runlife_table(&cycles, &cfg.runlife_highlight)),
            table_card("Run Status updated", run_status_table(&run_status)),
        ],
        vec![
            table_card("Latest tests", well_test_table(&tests)),
            bopd_bwpd_card("BOPD and BWPD", &monthly),
            titled_card("API", CardBody::Figure { figure: chart::oil_quality_trend(&volumes) }),
        ],
        vec![wc_wor_card("WC and WOR", &monthly), frequency, intake],
        vec![titled_card(
            "Missing Values",
            CardBody::Figure { figure: chart::null_heatmap(&null_heatmap(&nulls)) },
        )],
    ];

    board.side_column = vec![
        wells_card(wells),
        titled_card(
            "Top 5 lowest oil production",
            CardBody::Figure { figure: chart::hbar(&bottom_n(&avg_bopd, BOTTOM_N), "Average Oil") },
        ),
        titled_card(
            "Top 5 lowest gas production",
            CardBody::Figure { figure: chart::hbar(&bottom_n(&avg_gas, BOTTOM_N), "Average_Gas") },
        ),
        table_card("Critical Alerts", alerts_table(&alerts)).with_background(palette::ALERT_BG),
    ];
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn runlife_table_highlights_listed_values() {
        let cycles = vec![RunLifeCycle {
            uwi: "Well001".into(),
            well_id: "a".into(),
            lift_system: Some("BES".into()),
            cycle: 1,
            peak_run_life: 413.0,
            peak_date: "2023-02-01".into(),
        }];
        let table = runlife_table(&cycles, &[413.0, 868.0]);
        assert_eq!(table.rows.len(), 1);
        let cell = &table.rows[0]["peak_run_life"];
        assert_eq!(table.style_for("peak_run_life", cell).map(|r| r.background.as_str()), Some(palette::HIGHLIGHT_GREEN));
        assert_eq!(table.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["UWI", "Run Life", "Date", "Lift System", "Cycle"]);
    }

    #[test]
    fn well_test_certified_colours() {
        let row = |certified| WellTestRow {
            uwi: "Well002".into(),
            test_date: "2023-01-01".into(),
            test_num: Some(3),
            certified,
            test_duration: Some(24.0),
            api: Some(31.5),
            bsw_p: None,
            lift_system: None,
        };
        let table = well_test_table(&[row(Some(1)), row(Some(0)), row(None)]);
        let colours: Vec<_> = table
            .rows
            .iter()
            .map(|r| table.style_for("certified", &r["certified"]).map(|c| c.background.clone()))
            .collect();
        assert_eq!(
            colours,
            vec![
                Some(palette::HIGHLIGHT_GREEN.to_string()),
                Some(palette::HIGHLIGHT_RED.to_string()),
                Some(palette::HIGHLIGHT_ORANGE.to_string()),
            ]
        );
        assert_eq!(table.rows[2]["certified"], json!(null));
    }
}
