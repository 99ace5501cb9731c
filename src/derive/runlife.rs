//! Run-life cycle segmentation.
//!
//! A well's checkpoint samples are split into operational cycles at every
//! sample equal to the reset marker. The marker sample closes the cycle it
//! appears in; the next sample opens a new one. Each cycle reduces to its
//! peak run-life value and the date of that peak.

use serde::{Deserialize, Serialize};

use crate::model::{RunLifeCycle, RunLifeSample};

pub const MARKER_TOLERANCE: f64 = 1e-9;

/// What to do with the last cycle of a well when no reset closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingCycle {
    Include,
    Exclude,
}

impl TrailingCycle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "include" => Some(TrailingCycle::Include),
            "exclude" => Some(TrailingCycle::Exclude),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunLifeParams {
    pub reset_marker: f64,
    /// `HH:MM` daily checkpoint the samples were taken at
    pub checkpoint: String,
    pub trailing: TrailingCycle,
}

impl Default for RunLifeParams {
    fn default() -> Self {
        Self {
            reset_marker: 1.0,
            checkpoint: "00:00".to_string(),
            trailing: TrailingCycle::Include,
        }
    }
}

struct OpenCycle<'a> {
    peak: &'a RunLifeSample,
    peak_value: f64,
}

/// Segments samples into per-well cycles.
///
/// Input order does not matter: samples are stable-sorted by well id and
/// timestamp first. Null run-life values are skipped. Wells with no reset
/// sample produce no rows. Ties for the peak keep the earliest timestamp.
/// Output is ordered by UWI, then well id, then cycle.
pub fn segment(samples: &[RunLifeSample], params: &RunLifeParams) -> Vec<RunLifeCycle> {
    let mut ordered: Vec<&RunLifeSample> = samples.iter().filter(|s| s.run_life.is_some()).collect();
    ordered.sort_by(|a, b| a.well_id.cmp(&b.well_id).then(a.ts.cmp(&b.ts)));

    let mut out = Vec::new();
    for well in ordered.chunk_by(|a, b| a.well_id == b.well_id) {
        out.extend(segment_well(well, params));
    }
    out.sort_by(|a, b| {
        a.uwi.cmp(&b.uwi).then(a.well_id.cmp(&b.well_id)).then(a.cycle.cmp(&b.cycle))
    });
    out
}

fn is_reset(value: f64, marker: f64) -> bool {
    (value - marker).abs() < MARKER_TOLERANCE
}

fn segment_well(samples: &[&RunLifeSample], params: &RunLifeParams) -> Vec<RunLifeCycle> {
    let resets = samples
        .iter()
        .filter(|s| s.run_life.is_some_and(|v| is_reset(v, params.reset_marker)))
        .count();
    if resets == 0 {
        return Vec::new();
    }

    let mut closed: Vec<&RunLifeSample> = Vec::with_capacity(resets + 1);
    let mut open: Option<OpenCycle<'_>> = None;
    for &sample in samples {
        let Some(value) = sample.run_life else { continue };
        if let Some(cycle) = open.as_mut() {
            if value > cycle.peak_value {
                cycle.peak = sample;
                cycle.peak_value = value;
            }
        } else {
            open = Some(OpenCycle { peak: sample, peak_value: value });
        }
        if is_reset(value, params.reset_marker) {
            if let Some(cycle) = open.take() {
                closed.push(cycle.peak);
            }
        }
    }
    if let (Some(cycle), TrailingCycle::Include) = (open, params.trailing) {
        closed.push(cycle.peak);
    }

    closed
        .into_iter()
        .enumerate()
        .map(|(i, peak)| RunLifeCycle {
            uwi: peak.uwi.clone(),
            well_id: peak.well_id.clone(),
            lift_system: peak.lift_system.clone(),
            cycle: i as u32 + 1,
            peak_run_life: peak.run_life.unwrap_or_default(),
            peak_date: peak.ts.format("%Y-%m-%d").to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(n: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::days(n as i64)
    }

    fn series(well: &str, values: &[Option<f64>]) -> Vec<RunLifeSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| RunLifeSample {
                well_id: well.to_string(),
                ts: day(i as u32),
                run_life: *v,
                uwi: format!("U-{}", well),
                lift_system: Some("BES".to_string()),
            })
            .collect()
    }

    #[test]
    fn null_values_never_open_or_close_cycles() {
        let samples = series("w", &[None, Some(5.0), None, Some(1.0), None, Some(3.0)]);
        let cycles = segment(&samples, &RunLifeParams::default());
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].peak_run_life, 5.0);
        assert_eq!(cycles[1].peak_run_life, 3.0);
    }

    #[test]
    fn tie_keeps_earliest_date() {
        let samples = series("w", &[Some(7.0), Some(7.0), Some(1.0)]);
        let cycles = segment(&samples, &RunLifeParams::default());
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].peak_date, "2023-01-01");
    }

    #[test]
    fn custom_marker() {
        let params = RunLifeParams { reset_marker: 2.0, ..RunLifeParams::default() };
        let samples = series("w", &[Some(9.0), Some(2.0), Some(4.0), Some(1.0)]);
        let cycles = segment(&samples, &params);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1].peak_run_life, 4.0);
    }

    #[test]
    fn trailing_policy_parses() {
        assert_eq!(TrailingCycle::parse("Exclude"), Some(TrailingCycle::Exclude));
        assert_eq!(TrailingCycle::parse("maybe"), None);
    }
}
