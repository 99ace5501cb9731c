//! Board assembly end to end: card sets per board, KPI values, empty stores
//! and the rendered page.

use wellboard::board::{assemble, BOARD_TITLE};
use wellboard::config::{BoardKind, Config};
use wellboard::render::{render_html, CardBody};
use wellboard::seed;
use wellboard::store::Store;

fn seeded_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();
    seed::seed_demo(&store, 11).unwrap();
    store
}

fn empty_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();
    store
}

#[test]
fn trajectory_board_card_set() {
    let store = seeded_store();
    let board = assemble(BoardKind::Trajectory, &store, &Config::default()).unwrap();
    assert_eq!(board.title, BOARD_TITLE);
    assert_eq!(
        board.card_titles(),
        vec![
            "Oil/Gas/Water Proportion",
            "Barrel Price Real Time (BRENT/WTI)",
            "Wells Location",
            "Oil Production",
            "Gas Production",
            "Wells Trajectory",
            "WC vs WOR",
            "BOPD vs BWPD",
            "Intake Pressure vs Flow",
            "Frequency vs Flow",
            "Producing Wells",
            "Total Oil",
            "Total Water",
            "Total Gas",
            "Total Hours",
            "Average Caudal",
        ]
    );
    assert!(!board.exports);
    assert_eq!(board.card("Producing Wells").and_then(|c| c.metric()), Some("17"));
}

#[test]
fn kpi_board_card_set() {
    let store = seeded_store();
    let board = assemble(BoardKind::Kpi, &store, &Config::default()).unwrap();
    let titles = board.card_titles();
    for expected in [
        "Average Hours/Day",
        "Top 5 highest Oil production",
        "Top 5 highest Gas production",
        "Well depth and aquifer depth",
        "Operational efficiency",
        "Run Status updated",
        "Latest tests",
        "API",
        "WC and WOR",
        "Missing Values",
        "Top 5 lowest oil production",
        "Top 5 lowest gas production",
        "Critical Alerts",
    ] {
        assert!(titles.contains(&expected), "missing {}", expected);
    }
    assert!(board.exports);
    assert!(!titles.contains(&"Total Oil"));
}

#[test]
fn kpi_tables_and_rankings_have_rows() {
    let store = seeded_store();
    let board = assemble(BoardKind::Kpi, &store, &Config::default()).unwrap();

    let status = board.card("Run Status updated").and_then(|c| c.table()).unwrap();
    assert_eq!(status.rows.len(), 17);

    let lowest = board.card("Top 5 lowest oil production").and_then(|c| c.figure()).unwrap();
    let bars = lowest.data[0]["x"].as_array().unwrap();
    assert_eq!(bars.len(), 5);
    let values: Vec<f64> = bars.iter().filter_map(|v| v.as_f64()).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));

    let alerts = board.card("Critical Alerts").unwrap();
    assert_eq!(alerts.background, "rgba(255, 0, 0, 0.4)");

    let efficiency = board.card("Operational efficiency").and_then(|c| c.table()).unwrap();
    for row in &efficiency.rows {
        assert!(row["cycle"].as_u64().unwrap() >= 1);
    }
}

#[test]
fn empty_store_still_assembles() {
    let store = empty_store();
    for kind in [BoardKind::Trajectory, BoardKind::Kpi] {
        let board = assemble(kind, &store, &Config::default()).unwrap();
        assert_eq!(board.card("Producing Wells").and_then(|c| c.metric()), Some("0"));
        let lift = board.card("Wells Location").unwrap();
        assert!(matches!(&lift.body, CardBody::Map { map } if map.markers.is_empty()));
    }
    let traj = assemble(BoardKind::Trajectory, &store, &Config::default()).unwrap();
    assert_eq!(traj.card("Total Oil").and_then(|c| c.metric()), Some("0.00"));
    assert_eq!(traj.card("Average Caudal").and_then(|c| c.metric()), Some("0.00"));
}

#[test]
fn missing_schema_is_an_error() {
    let store = Store::open_in_memory().unwrap();
    let err = assemble(BoardKind::Kpi, &store, &Config::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("assemble kpi board"));
}

#[test]
fn rendered_page_embeds_every_card() {
    let store = seeded_store();
    let cfg = Config { brand: "Acme".to_string(), ..Config::default() };
    let board = assemble(BoardKind::Kpi, &store, &cfg).unwrap();
    let html = render_html(&board);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Last Updated: "));
    assert!(html.contains("(UTC-05:00)"));
    assert!(html.contains("Acme ©"));
    for card in board.cards() {
        assert!(html.contains(&format!("id=\"{}\"", card.id)), "card {} not rendered", card.title);
    }
}
