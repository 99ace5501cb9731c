//! The overview board: summed monthly variables, per-well production areas,
//! map, 3D trajectories and field totals.

use anyhow::Result;

use crate::board::{
    barrel_price_card, bopd_bwpd_card, flow_scatter_cards, lift_system_filter, location_card,
    proportion_card, skeleton, total_card, trajectory_card, wc_wor_card, wells_card, Filter,
};
use crate::config::{BoardKind, Config};
use crate::model::Aggregate;
use crate::render::chart::{well_areas, Measure};
use crate::render::palette;
use crate::render::{titled_card, CardBody, Dashboard};
use crate::store::Store;

fn filters() -> Vec<Filter> {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let fields = strings(&["Field SPE-2", "Field SPE-3", "Field SPE-4", "Field SPE-5", "Field SPE-6"]);
    vec![
        Filter::Dropdown { options: strings(&["Month", "Day", "Year"]), selected: "Month".into() },
        Filter::Slider { min: 3, max: 12, step: 3, value: 12 },
        Filter::Checklist {
            options: strings(&["Total", "Versus", "Average"]),
            selected: strings(&["Total"]),
            columns: 3,
        },
        Filter::Checklist { options: fields.clone(), selected: fields, columns: 2 },
        lift_system_filter(),
        Filter::TextInput { button: "Submit".into(), hint: "Enter a value and press submit".into() },
    ]
}

pub fn build(store: &Store, cfg: &Config) -> Result<Dashboard> {
    let monthly = store.monthly_critical(Aggregate::Sum)?;
    let volumes = store.well_monthly_volumes()?;
    let totals = store.field_totals()?;
    let mean_flow = store.mean_flow()?.unwrap_or(0.0);
    let wells = store.count_wells()?;
    let locations = store.well_locations()?;
    let well_totals = store.well_totals()?;

    let mut board = skeleton(BoardKind::Trajectory, cfg, filters());
    board.sidebar = vec![proportion_card(&totals), barrel_price_card()];

    let oil = titled_card(
        "Oil Production",
        CardBody::Figure { figure: well_areas(&volumes, Measure::Oil, "Month-Year", "Oil Production") },
    );
    let gas = titled_card(
        "Gas Production",
        CardBody::Figure { figure: well_areas(&volumes, Measure::Gas, "Month-Year", "Gas Production") },
    );
    let (intake, frequency) = flow_scatter_cards(&monthly, "", "Caudal");

    board.rows = vec![
        vec![location_card(&well_totals), oil, gas],
        vec![
            trajectory_card("Wells Trajectory", &locations, false),
            wc_wor_card("WC vs WOR", &monthly),
            bopd_bwpd_card("BOPD vs BWPD", &monthly),
        ],
        vec![intake, frequency],
    ];

    board.side_column = vec![
        wells_card(wells),
        total_card("Total Oil", totals.oil, palette::CARD_OIL),
        total_card("Total Water", totals.water, palette::CARD_WATER),
        total_card("Total Gas", totals.gas, palette::CARD_GAS),
        total_card("Total Hours", totals.hours, palette::CARD_HOURS),
        total_card("Average Caudal", mean_flow, palette::CARD_FLOW),
    ];
    Ok(board)
}
