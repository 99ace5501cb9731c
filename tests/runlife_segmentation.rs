//! Run-life cycle segmentation: cycle counts, numbering and peaks, both on
//! hand-built sample series and through the store's checkpoint query.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::params;

use wellboard::derive::runlife::{segment, RunLifeParams, TrailingCycle};
use wellboard::model::RunLifeSample;
use wellboard::store::Store;

fn day(n: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
        + Duration::days(n)
}

fn well(id: &str, values: &[f64]) -> Vec<RunLifeSample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| RunLifeSample {
            well_id: id.to_string(),
            ts: day(i as i64),
            run_life: Some(*v),
            uwi: format!("Well{}", id),
            lift_system: Some("BES".to_string()),
        })
        .collect()
}

fn excluding() -> RunLifeParams {
    RunLifeParams { trailing: TrailingCycle::Exclude, ..RunLifeParams::default() }
}

#[test]
fn worked_example_yields_three_cycles() {
    let samples = well("001", &[0.2, 0.6, 1.0, 0.3, 0.8, 1.0, 0.1]);
    let cycles = segment(&samples, &RunLifeParams::default());
    let peaks: Vec<f64> = cycles.iter().map(|c| c.peak_run_life).collect();
    assert_eq!(peaks, vec![1.0, 1.0, 0.1]);
    assert_eq!(cycles[0].peak_date, "2023-03-03");
    assert_eq!(cycles[1].peak_date, "2023-03-06");
    assert_eq!(cycles[2].peak_date, "2023-03-07");

    let closed = segment(&samples, &excluding());
    assert_eq!(closed.len(), 2);
}

#[test]
fn wells_without_reset_produce_nothing() {
    let mut samples = well("001", &[10.0, 11.0, 12.0]);
    samples.extend(well("002", &[400.0, 1.0, 2.0]));
    let cycles = segment(&samples, &RunLifeParams::default());
    assert!(cycles.iter().all(|c| c.well_id == "002"));
    assert_eq!(cycles.len(), 2);
}

#[test]
fn n_resets_give_n_plus_one_cycles() {
    for resets in 1..6 {
        let mut values = Vec::new();
        for r in 0..resets {
            values.extend([50.0 + r as f64, 60.0 + r as f64, 1.0]);
        }
        values.push(5.0);
        let samples = well("007", &values);
        assert_eq!(segment(&samples, &RunLifeParams::default()).len(), resets + 1);
        assert_eq!(segment(&samples, &excluding()).len(), resets);
    }
}

#[test]
fn final_reset_closes_the_last_cycle() {
    let samples = well("003", &[30.0, 31.0, 1.0, 2.0, 3.0, 1.0]);
    assert_eq!(segment(&samples, &RunLifeParams::default()).len(), 2);
    assert_eq!(segment(&samples, &excluding()).len(), 2);
}

#[test]
fn cycle_numbers_are_dense_per_well() {
    let mut samples = well("010", &[5.0, 1.0, 7.0, 1.0, 9.0]);
    samples.extend(well("004", &[3.0, 1.0, 4.0]));
    // Input order must not matter.
    samples.reverse();
    let cycles = segment(&samples, &RunLifeParams::default());
    for id in ["004", "010"] {
        let numbers: Vec<u32> = cycles.iter().filter(|c| c.well_id == id).map(|c| c.cycle).collect();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected, "well {}", id);
    }
    assert_eq!(cycles[0].uwi, "Well004");
}

#[test]
fn peak_is_the_true_maximum_and_occurs_on_its_date() {
    let values = [12.0, 90.0, 45.0, 1.0, 3.0, 8.0, 2.0, 1.0, 6.0];
    let samples = well("005", &values);
    for c in segment(&samples, &RunLifeParams::default()) {
        let at_date: Vec<f64> = samples
            .iter()
            .filter(|s| s.ts.format("%Y-%m-%d").to_string() == c.peak_date)
            .filter_map(|s| s.run_life)
            .collect();
        assert!(at_date.contains(&c.peak_run_life));
    }
    let peaks: Vec<f64> = segment(&samples, &RunLifeParams::default())
        .iter()
        .map(|c| c.peak_run_life)
        .collect();
    assert_eq!(peaks, vec![90.0, 8.0, 6.0]);
}

#[test]
fn store_feeds_only_checkpoint_samples() {
    let store = Store::open_in_memory().unwrap();
    store.init_schema().unwrap();
    let conn = store.connection();
    conn.execute(
        "INSERT INTO wells_master (well_id, uwi, lift_system) VALUES ('a', 'Well001', 'BES'), ('b', 'Well002', 'PCP')",
        [],
    )
    .unwrap();
    let rows: [(&str, &str, f64); 7] = [
        ("a", "2023-01-01 00:00:00", 40.0),
        ("a", "2023-01-01 12:00:00", 999.0),
        ("a", "2023-01-02 00:00:00", 1.0),
        ("a", "2023-01-03 00:00:00", 2.0),
        ("b", "2023-01-01 00:00:00", 70.0),
        ("b", "2023-01-02 00:00:00", 71.0),
        ("b", "2023-01-02 06:00:00", 1.0),
    ];
    for (id, ts, v) in rows {
        conn.execute(
            "INSERT INTO critical_variables (well_id, date, run_life) VALUES (?1, ?2, ?3)",
            params![id, ts, v],
        )
        .unwrap();
    }
    let params = RunLifeParams::default();
    let samples = store.run_life_samples(&params.checkpoint, params.reset_marker).unwrap();
    assert!(samples.iter().all(|s| s.ts.format("%H:%M").to_string() == "00:00"));
    // Well b resets only off-checkpoint, so its checkpoint series has no reset.
    let cycles = segment(&samples, &params);
    let a: Vec<f64> = cycles.iter().filter(|c| c.well_id == "a").map(|c| c.peak_run_life).collect();
    assert_eq!(a, vec![40.0, 2.0]);
    assert!(cycles.iter().all(|c| c.well_id == "a"));
}
