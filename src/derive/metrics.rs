use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{DailyBopd, MonthlyCritical, NullCount, WellAverage, WellHours};

/// Gas, oil and water shares of a total, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shares {
    pub gas: f64,
    pub oil: f64,
    pub water: f64,
}

pub fn proportions(gas: f64, oil: f64, water: f64) -> Shares {
    let total = gas + oil + water;
    if total == 0.0 || !total.is_finite() {
        return Shares::default();
    }
    Shares {
        gas: gas / total * 100.0,
        oil: oil / total * 100.0,
        water: water / total * 100.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRatio {
    pub year: i32,
    pub month: u32,
    pub wcut: f64,
    pub wor: f64,
}

/// Mean WCUT and WOR per (year, month), oldest first.
pub fn monthly_means(rows: &[MonthlyCritical]) -> Vec<MonthlyRatio> {
    let mut acc: BTreeMap<(i32, u32), (f64, f64, u32)> = BTreeMap::new();
    for r in rows {
        let e = acc.entry((r.year, r.month)).or_insert((0.0, 0.0, 0));
        e.0 += r.wcut;
        e.1 += r.wor;
        e.2 += 1;
    }
    acc.into_iter()
        .map(|((year, month), (wcut, wor, n))| MonthlyRatio {
            year,
            month,
            wcut: wcut / n as f64,
            wor: wor / n as f64,
        })
        .collect()
}

/// Distinct years in first-seen order.
pub fn years_of<T>(rows: &[T], year: impl Fn(&T) -> i32) -> Vec<i32> {
    let mut out = Vec::new();
    for r in rows {
        let y = year(r);
        if !out.contains(&y) {
            out.push(y);
        }
    }
    out
}

/// The `n` lowest averages, lowest first.
pub fn bottom_n(rows: &[WellAverage], n: usize) -> Vec<WellAverage> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
    sorted.truncate(n);
    sorted
}

pub const ALERT_FRACTION: f64 = 0.10;
pub const ALERT_TYPE: &str = "bopd production less than 10% average";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalAlert {
    pub uwi: String,
    pub bopd: f64,
    pub average_bopd: f64,
    pub day: String,
    pub kind: String,
}

/// Days on which a well produced strictly less than 10% of its average BOPD,
/// most recent day first.
pub fn critical_alerts(daily: &[DailyBopd], averages: &[WellAverage]) -> Vec<CriticalAlert> {
    let by_well: BTreeMap<&str, &WellAverage> =
        averages.iter().map(|a| (a.well_id.as_str(), a)).collect();
    let mut out: Vec<CriticalAlert> = daily
        .iter()
        .filter_map(|d| {
            let avg = by_well.get(d.well_id.as_str())?;
            (d.bopd < ALERT_FRACTION * avg.value).then(|| CriticalAlert {
                uwi: avg.uwi.clone(),
                bopd: d.bopd,
                average_bopd: round2(avg.value),
                day: d.day.clone(),
                kind: ALERT_TYPE.to_string(),
            })
        })
        .collect();
    out.sort_by(|a, b| b.day.cmp(&a.day));
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HoursGauge {
    pub average: f64,
    pub max: f64,
}

/// Mean of the per-well average hours/day, with the largest per-well value
/// as the gauge range.
pub fn average_hours(rows: &[WellHours]) -> HoursGauge {
    if rows.is_empty() {
        return HoursGauge::default();
    }
    let sum: f64 = rows.iter().map(|r| r.average_hours_per_day).sum();
    let max = rows.iter().map(|r| r.average_hours_per_day).fold(f64::MIN, f64::max);
    HoursGauge { average: sum / rows.len() as f64, max }
}

/// Table × column grid of null counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullGrid {
    pub tables: Vec<String>,
    pub columns: Vec<String>,
    /// `z[t][c]`, `None` where a table has no such column
    pub z: Vec<Vec<Option<i64>>>,
}

/// Pivots null counts into a sorted grid, stripping `_updated` from column
/// names. Counts landing on the same cell are summed.
pub fn null_heatmap(counts: &[NullCount]) -> NullGrid {
    let mut cells: BTreeMap<(String, String), i64> = BTreeMap::new();
    for c in counts {
        let column = c.column.replace("_updated", "");
        *cells.entry((c.table.clone(), column)).or_insert(0) += c.nulls;
    }
    let mut tables: Vec<String> = cells.keys().map(|(t, _)| t.clone()).collect();
    tables.dedup();
    let mut columns: Vec<String> = cells.keys().map(|(_, c)| c.clone()).collect();
    columns.sort();
    columns.dedup();
    let z = tables
        .iter()
        .map(|t| {
            columns
                .iter()
                .map(|c| cells.get(&(t.clone(), c.clone())).copied())
                .collect()
        })
        .collect();
    NullGrid { tables, columns, z }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avg(id: &str, v: f64) -> WellAverage {
        WellAverage { well_id: id.to_string(), uwi: format!("Well{}", id), value: v }
    }

    #[test]
    fn proportions_sum_to_hundred() {
        let s = proportions(10.0, 30.0, 60.0);
        assert!((s.gas + s.oil + s.water - 100.0).abs() < 1e-9);
        assert_eq!(s.water, 60.0);
    }

    #[test]
    fn proportions_of_nothing() {
        assert_eq!(proportions(0.0, 0.0, 0.0), Shares::default());
    }

    #[test]
    fn bottom_n_is_ascending() {
        let rows = vec![avg("1", 5.0), avg("2", 1.0), avg("3", 3.0)];
        let out = bottom_n(&rows, 2);
        assert_eq!(out.iter().map(|r| r.value).collect::<Vec<_>>(), vec![1.0, 3.0]);
    }

    #[test]
    fn alerts_below_ten_percent() {
        let averages = vec![avg("1", 100.0)];
        let daily = vec![
            DailyBopd { well_id: "1".into(), bopd: 9.0, day: "2023-01-01".into() },
            DailyBopd { well_id: "1".into(), bopd: 10.0, day: "2023-01-02".into() },
            DailyBopd { well_id: "1".into(), bopd: 2.0, day: "2023-01-03".into() },
            DailyBopd { well_id: "9".into(), bopd: 0.0, day: "2023-01-04".into() },
        ];
        let alerts = critical_alerts(&daily, &averages);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].day, "2023-01-03");
        assert_eq!(alerts[0].kind, ALERT_TYPE);
    }

    #[test]
    fn heatmap_strips_suffix_and_fills_gaps() {
        let counts = vec![
            NullCount { table: "a".into(), column: "x_updated".into(), nulls: 2 },
            NullCount { table: "b".into(), column: "y".into(), nulls: 1 },
        ];
        let grid = null_heatmap(&counts);
        assert_eq!(grid.tables, vec!["a", "b"]);
        assert_eq!(grid.columns, vec!["x", "y"]);
        assert_eq!(grid.z, vec![vec![Some(2), None], vec![None, Some(1)]]);
    }

    #[test]
    fn hours_gauge() {
        let rows = vec![
            WellHours { uwi: "a".into(), total_hours: 48.0, days_with_values: 2, average_hours_per_day: 24.0 },
            WellHours { uwi: "b".into(), total_hours: 24.0, days_with_values: 2, average_hours_per_day: 12.0 },
        ];
        let g = average_hours(&rows);
        assert_eq!(g.average, 18.0);
        assert_eq!(g.max, 24.0);
        assert_eq!(average_hours(&[]), HoursGauge::default());
    }
}
