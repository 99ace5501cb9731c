//! Synthetic field data for demos and tests.
//!
//! Generates master data for the known wells, twice-daily critical variable
//! samples (the `00:00` sample carries the run-life checkpoint), daily
//! volumes and monthly well tests. Output is fully determined by the seed.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::params;

use crate::board::LIFT_SYSTEMS;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::render::map::MAP_CENTER;
use crate::render::palette;
use crate::store::{Store, TS_FORMAT};

#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlan {
    pub seed: u64,
    pub start: NaiveDate,
    pub days: u32,
    /// How many of the known wells to create, in palette order
    pub wells: usize,
    /// Run-life value written on the checkpoint sample of a restart day
    pub reset_marker: f64,
    pub reset_chance: f64,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            seed: 1,
            start: NaiveDate::from_ymd_opt(2022, 10, 1).unwrap_or_default(),
            days: 150,
            wells: 17,
            reset_marker: 1.0,
            reset_chance: 1.0 / 40.0,
        }
    }
}

impl SeedPlan {
    /// Three calendar years for the standalone demo database.
    pub fn demo(seed: u64) -> Self {
        Self {
            seed,
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            days: 1095,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSummary {
    pub wells: usize,
    pub critical_rows: usize,
    pub volume_rows: usize,
    pub test_rows: usize,
    pub resets: usize,
}

/// UWI for a palette well id: the trailing three digits, `...3001` -> `Well001`.
pub fn uwi_for(well_id: &str) -> String {
    let tail = &well_id[well_id.len().saturating_sub(3)..];
    format!("Well{tail}")
}

/// Every fifth well never restarts its pump, so it yields no run-life cycles.
pub fn never_resets(index: usize) -> bool {
    index % 5 == 4
}

fn maybe<T>(rng: &mut StdRng, null_chance: f64, value: impl FnOnce(&mut StdRng) -> T) -> Option<T> {
    if rng.gen_bool(null_chance) {
        None
    } else {
        Some(value(rng))
    }
}

pub fn seed(store: &Store, plan: &SeedPlan) -> Result<SeedSummary> {
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut summary = SeedSummary::default();
    let tx = store
        .connection()
        .unchecked_transaction()
        .context("begin seed transaction")?;
    {
        let mut master = tx.prepare(
            "INSERT INTO wells_master (well_id, uwi, geo_latitude, geo_longitude, wellhead_depth,
                                       water_depth, lift_system, purpose)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        let mut critical = tx.prepare(
            "INSERT INTO critical_variables (well_id, date, day, intake_pressure, freq, flow, wor,
                                             wcut, bwpd, bopd, run_life, run_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        let mut volumes = tx.prepare(
            "INSERT INTO daily_volumes (well_id, volume_date, oil, gas, water, hours, oil_quality)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        let mut tests = tx.prepare(
            "INSERT INTO well_tests (well_id, test_date, test_num, certified, test_duration, api, bsw_p)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;

        for (index, well_id) in palette::known_well_ids().take(plan.wells).enumerate() {
            let uwi = uwi_for(well_id);
            let lift = (index != 16).then(|| LIFT_SYSTEMS[index % LIFT_SYSTEMS.len()]);
            let purpose = if index % 7 == 6 { "Injection" } else { "Production" };
            let depth: f64 = rng.gen_range(6_000.0_f64..11_000.0);
            let water = (index % 3 != 0).then(|| depth * rng.gen_range(0.4_f64..0.8));
            master.execute(params![
                well_id,
                uwi,
                MAP_CENTER[0] + rng.gen_range(-1.5_f64..1.5),
                MAP_CENTER[1] + rng.gen_range(-1.5_f64..1.5),
                depth,
                water,
                lift,
                purpose,
            ])?;
            summary.wells += 1;

            let base_oil: f64 = rng.gen_range(80.0_f64..900.0);
            let base_cut: f64 = rng.gen_range(0.2_f64..0.9);
            let api: f64 = rng.gen_range(18.0_f64..36.0);
            let mut run_life: f64 = rng.gen_range(30.0_f64..400.0).round();
            let mut test_num = 0_i64;

            for d in 0..plan.days {
                let day = plan.start + Duration::days(d as i64);
                let day_str = day.format("%Y-%m-%d").to_string();
                let restart = !never_resets(index) && d > 0 && rng.gen_bool(plan.reset_chance);
                if restart {
                    run_life = plan.reset_marker;
                    summary.resets += 1;
                } else if d > 0 {
                    run_life += 1.0;
                }
                // Occasional production drop well below the well's mean.
                let dip = if rng.gen_bool(0.02) { 0.3 } else { 1.0 };
                let cut = (base_cut + rng.gen_range(-0.05_f64..0.05)).clamp(0.01, 0.99);
                let bopd = (base_oil * rng.gen_range(0.85_f64..1.15) * dip).round();
                let bwpd = (bopd * cut / (1.0 - cut)).round();

                for (hour, offset) in [(0_u32, 0.0), (12, 0.5)] {
                    let Some(ts) = day.and_hms_opt(hour, 0, 0) else { continue };
                    let pressure = maybe(&mut rng, 0.01, |r| r.gen_range(300.0_f64..900.0));
                    let freq: f64 = rng.gen_range(40.0_f64..60.0);
                    let flow: f64 = rng.gen_range(200.0_f64..2_000.0);
                    critical.execute(params![
                        well_id,
                        ts.format(TS_FORMAT).to_string(),
                        day_str,
                        pressure,
                        freq,
                        flow,
                        cut / (1.0 - cut),
                        cut,
                        bwpd,
                        bopd,
                        run_life + offset,
                        if restart && hour == 0 { 0.0 } else { 1.0 },
                    ])?;
                    summary.critical_rows += 1;
                }

                let hours = (if restart { 12.0 } else { 24.0 }) - rng.gen_range(0.0_f64..2.0);
                let gas = (bopd * rng.gen_range(0.8_f64..2.5)).round();
                let hours = maybe(&mut rng, 0.03, |_| hours);
                let quality = maybe(&mut rng, 0.05, |r| api + r.gen_range(-0.5_f64..0.5));
                volumes.execute(params![well_id, day_str, bopd, gas, bwpd, hours, quality])?;
                summary.volume_rows += 1;

                if day.format("%d").to_string() == "15" {
                    test_num += 1;
                    let certified = maybe(&mut rng, 0.15, |r| i64::from(r.gen_bool(0.7)));
                    let bsw = maybe(&mut rng, 0.2, |_| cut * 100.0);
                    tests.execute(params![well_id, day_str, test_num, certified, 24.0, api, bsw])?;
                    summary.test_rows += 1;
                }
            }
        }
    }
    tx.commit().context("commit seed transaction")?;
    log(
        Level::Info,
        Domain::Store,
        "seeded",
        obj(&[
            ("start", v_str(&plan.start.to_string())),
            ("wells", v_num(summary.wells as f64)),
            ("critical_rows", v_num(summary.critical_rows as f64)),
            ("resets", v_num(summary.resets as f64)),
        ]),
    );
    Ok(summary)
}

/// Default plan with the given seed.
pub fn seed_demo(store: &Store, seed_value: u64) -> Result<SeedSummary> {
    seed(store, &SeedPlan { seed: seed_value, ..SeedPlan::default() })
}
