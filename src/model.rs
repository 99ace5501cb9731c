//! Typed rows returned by the store queries.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Monthly rollup of `critical_variables`. Pressure, frequency and flow are
/// summed on the trajectory board and averaged on the KPI board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCritical {
    pub year: i32,
    pub month: u32,
    pub intake_pressure: f64,
    pub freq: f64,
    pub flow: f64,
    pub wor: f64,
    pub wcut: f64,
    pub bwpd: f64,
    pub bopd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellMonthlyVolume {
    pub well_id: String,
    pub uwi: String,
    pub year: i32,
    pub month: u32,
    pub oil: f64,
    pub gas: f64,
    pub oil_quality: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldTotals {
    pub hours: f64,
    pub oil: f64,
    pub water: f64,
    pub gas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellLocation {
    pub uwi: String,
    pub latitude: f64,
    pub longitude: f64,
    pub wellhead_depth: f64,
    pub water_depth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellTotals {
    pub well_id: String,
    pub uwi: String,
    pub gas: f64,
    pub oil: f64,
    pub water: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub lift_system: Option<String>,
    pub purpose: Option<String>,
}

/// One checkpoint sample of a well's run-life counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLifeSample {
    pub well_id: String,
    pub ts: NaiveDateTime,
    pub run_life: Option<f64>,
    pub uwi: String,
    pub lift_system: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLifeCycle {
    pub uwi: String,
    pub well_id: String,
    pub lift_system: Option<String>,
    pub cycle: u32,
    pub peak_run_life: f64,
    /// `YYYY-MM-DD`
    pub peak_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatusRow {
    pub well_id: String,
    pub uwi: String,
    pub date: String,
    pub run_status: Option<f64>,
    pub lift_system: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellTestRow {
    pub uwi: String,
    pub test_date: String,
    pub test_num: Option<i64>,
    pub certified: Option<i64>,
    pub test_duration: Option<f64>,
    pub api: Option<f64>,
    pub bsw_p: Option<f64>,
    pub lift_system: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellHours {
    pub uwi: String,
    pub total_hours: f64,
    pub days_with_values: i64,
    pub average_hours_per_day: f64,
}

/// A per-well average of one measure (BOPD, gas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellAverage {
    pub well_id: String,
    pub uwi: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBopd {
    pub well_id: String,
    pub bopd: f64,
    pub day: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellMonthlyBopd {
    pub well_id: String,
    pub uwi: String,
    pub year: i32,
    pub month: u32,
    pub bopd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullCount {
    pub table: String,
    pub column: String,
    pub nulls: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    Sum,
    Avg,
}

impl Aggregate {
    pub fn sql(&self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
        }
    }
}
