//! Read-only access to the production database.
//!
//! `Store` owns the single connection for the process. Every dashboard query
//! is a method returning typed rows; none of them take user input except the
//! fixed UWI subsets and the run-life checkpoint, which are bound as
//! parameters.

pub mod schema;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Params, Row};

use crate::logging::{log, log_query, obj, v_str, Domain, Level, ProfileScope};
use crate::model::{
    Aggregate, DailyBopd, FieldTotals, MonthlyCritical, NullCount, RunLifeSample, RunStatusRow,
    WellAverage, WellHours, WellLocation, WellMonthlyBopd, WellMonthlyVolume, WellTestRow,
    WellTotals,
};

pub use schema::SOURCE_TABLES;

pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Store {
    conn: Connection,
    label: String,
}

impl Store {
    /// Opens an existing database read-only. Fails when the file is missing
    /// or lacks any of the source tables.
    pub fn open(path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).with_context(|| format!("open database {}", path))?;
        let store = Self { conn, label: path.to_string() };
        store.require_source_tables()?;
        log(Level::Info, Domain::Store, "db_connect", obj(&[("path", v_str(path))]));
        Ok(store)
    }

    /// Opens or creates a writable database and makes sure the schema exists.
    /// Only the seeding tools use this.
    pub fn create(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("create database {}", path))?;
        let store = Self { conn, label: path.to_string() };
        store.init_schema()?;
        log(Level::Info, Domain::Store, "db_create", obj(&[("path", v_str(path))]));
        Ok(store)
    }

    fn require_source_tables(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .context("list tables")?;
        let present = stmt
            .query_map([], |r| r.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<String>>>())
            .with_context(|| format!("read schema of {}", self.label))?;
        let missing: Vec<&str> = SOURCE_TABLES
            .iter()
            .copied()
            .filter(|t| !present.iter().any(|p| p == t))
            .collect();
        if !missing.is_empty() {
            bail!("{} is missing tables: {}", self.label, missing.join(", "));
        }
        Ok(())
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()?, label: ":memory:".to_string() })
    }

    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::CREATE_TABLES).context("create schema")?;
        Ok(())
    }

    pub fn close(self) -> Result<()> {
        let label = self.label;
        self.conn.close().map_err(|(_, err)| err).context("close database")?;
        log(Level::Info, Domain::Store, "db_close", obj(&[("path", v_str(&label))]));
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn rows<T, P, F>(&self, name: &str, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let scope = ProfileScope::new("query");
        let mut stmt = self.conn.prepare(sql).with_context(|| format!("prepare {}", name))?;
        let out = stmt
            .query_map(params, f)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<T>>>())
            .with_context(|| format!("query {}", name))?;
        log_query(name, out.len(), scope.elapsed_ms());
        Ok(out)
    }

    // =========================================================================
    // Critical variables
    // =========================================================================

    /// Monthly rollup. `agg` applies to pressure, frequency and flow; the
    /// ratio and rate columns are always summed.
    pub fn monthly_critical(&self, agg: Aggregate) -> Result<Vec<MonthlyCritical>> {
        let f = agg.sql();
        let sql = format!(
            "SELECT CAST(strftime('%Y', date) AS INTEGER) AS year,
                    CAST(strftime('%m', date) AS INTEGER) AS month,
                    {f}(intake_pressure), {f}(freq), {f}(flow),
                    TOTAL(wor), TOTAL(wcut), TOTAL(bwpd), TOTAL(bopd)
             FROM critical_variables
             WHERE strftime('%Y', date) IS NOT NULL
             GROUP BY year, month
             ORDER BY year, month"
        );
        self.rows("monthly_critical", &sql, [], |r| {
            Ok(MonthlyCritical {
                year: r.get(0)?,
                month: r.get(1)?,
                intake_pressure: r.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                freq: r.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                flow: r.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                wor: r.get(5)?,
                wcut: r.get(6)?,
                bwpd: r.get(7)?,
                bopd: r.get(8)?,
            })
        })
    }

    /// Mean flow across every critical-variables row.
    pub fn mean_flow(&self) -> Result<Option<f64>> {
        let v = self
            .conn
            .query_row("SELECT AVG(flow) FROM critical_variables", [], |r| r.get(0))
            .context("query mean_flow")?;
        Ok(v)
    }

    pub fn average_bopd_by_well(&self) -> Result<Vec<WellAverage>> {
        self.rows(
            "average_bopd_by_well",
            "SELECT a.well_id, b.uwi, AVG(a.bopd)
             FROM critical_variables a
             JOIN wells_master b ON a.well_id = b.well_id
             GROUP BY a.well_id, b.uwi
             HAVING AVG(a.bopd) IS NOT NULL
             ORDER BY b.uwi",
            [],
            well_average,
        )
    }

    pub fn daily_bopd(&self) -> Result<Vec<DailyBopd>> {
        self.rows(
            "daily_bopd",
            "SELECT well_id, bopd, COALESCE(day, date(date))
             FROM critical_variables
             WHERE bopd IS NOT NULL
             GROUP BY well_id, bopd, COALESCE(day, date(date))",
            [],
            |r| Ok(DailyBopd { well_id: r.get(0)?, bopd: r.get(1)?, day: r.get(2)? }),
        )
    }

    /// Monthly summed BOPD for a fixed subset of wells, oldest month first.
    pub fn monthly_bopd_for(&self, uwis: &[String]) -> Result<Vec<WellMonthlyBopd>> {
        if uwis.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; uwis.len()].join(", ");
        let sql = format!(
            "SELECT a.well_id, b.uwi,
                    CAST(strftime('%Y', a.date) AS INTEGER) AS year,
                    CAST(strftime('%m', a.date) AS INTEGER) AS month,
                    TOTAL(a.bopd)
             FROM critical_variables a
             JOIN wells_master b ON a.well_id = b.well_id
             WHERE b.uwi IN ({placeholders}) AND strftime('%Y', a.date) IS NOT NULL
             GROUP BY a.well_id, b.uwi, year, month
             ORDER BY year, month, b.uwi"
        );
        self.rows("monthly_bopd_for", &sql, params_from_iter(uwis.iter()), |r| {
            Ok(WellMonthlyBopd {
                well_id: r.get(0)?,
                uwi: r.get(1)?,
                year: r.get(2)?,
                month: r.get(3)?,
                bopd: r.get(4)?,
            })
        })
    }

    /// Checkpoint-time run-life samples for wells that recorded at least one
    /// reset, ordered by well and timestamp. Duplicate timestamps collapse to
    /// their maximum.
    pub fn run_life_samples(&self, checkpoint: &str, marker: f64) -> Result<Vec<RunLifeSample>> {
        let raw = self.rows(
            "run_life_samples",
            "SELECT c.well_id, c.date, MAX(c.run_life), w.uwi, w.lift_system
             FROM critical_variables c
             JOIN wells_master w ON c.well_id = w.well_id
             WHERE strftime('%H:%M', c.date) = ?1
               AND c.well_id IN (
                   SELECT well_id FROM critical_variables WHERE ABS(run_life - ?2) < 1e-9
               )
             GROUP BY c.well_id, c.date, w.uwi, w.lift_system
             ORDER BY c.well_id, c.date",
            params![checkpoint, marker],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, Option<f64>>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, Option<String>>(4)?,
                ))
            },
        )?;
        raw.into_iter()
            .map(|(well_id, date, run_life, uwi, lift_system)| {
                let ts = parse_ts(&date).with_context(|| format!("bad timestamp for {}", well_id))?;
                Ok(RunLifeSample { well_id, ts, run_life, uwi, lift_system })
            })
            .collect()
    }

    /// The most recent run status of every well.
    pub fn latest_run_status(&self) -> Result<Vec<RunStatusRow>> {
        self.rows(
            "latest_run_status",
            "SELECT c.well_id, w.uwi, date(c.date), c.run_status, w.lift_system
             FROM critical_variables c
             INNER JOIN (
                 SELECT well_id, MAX(date) AS max_date
                 FROM critical_variables
                 GROUP BY well_id
             ) m ON c.well_id = m.well_id AND c.date = m.max_date
             INNER JOIN wells_master w ON c.well_id = w.well_id
             ORDER BY w.uwi",
            [],
            |r| {
                Ok(RunStatusRow {
                    well_id: r.get(0)?,
                    uwi: r.get(1)?,
                    date: r.get(2)?,
                    run_status: r.get(3)?,
                    lift_system: r.get(4)?,
                })
            },
        )
    }

    // =========================================================================
    // Daily volumes
    // =========================================================================

    pub fn well_monthly_volumes(&self) -> Result<Vec<WellMonthlyVolume>> {
        self.rows(
            "well_monthly_volumes",
            "SELECT a.well_id, b.uwi,
                    CAST(strftime('%Y', a.volume_date) AS INTEGER) AS year,
                    CAST(strftime('%m', a.volume_date) AS INTEGER) AS month,
                    TOTAL(a.oil), TOTAL(a.gas), AVG(a.oil_quality)
             FROM daily_volumes a
             JOIN wells_master b ON a.well_id = b.well_id
             WHERE strftime('%Y', a.volume_date) IS NOT NULL
             GROUP BY a.well_id, b.uwi, year, month
             ORDER BY b.uwi, year, month",
            [],
            |r| {
                Ok(WellMonthlyVolume {
                    well_id: r.get(0)?,
                    uwi: r.get(1)?,
                    year: r.get(2)?,
                    month: r.get(3)?,
                    oil: r.get(4)?,
                    gas: r.get(5)?,
                    oil_quality: r.get(6)?,
                })
            },
        )
    }

    pub fn field_totals(&self) -> Result<FieldTotals> {
        let t = self
            .conn
            .query_row(
                "SELECT TOTAL(hours), TOTAL(oil), TOTAL(water), TOTAL(gas) FROM daily_volumes",
                [],
                |r| Ok(FieldTotals { hours: r.get(0)?, oil: r.get(1)?, water: r.get(2)?, gas: r.get(3)? }),
            )
            .context("query field_totals")?;
        Ok(t)
    }

    pub fn well_totals(&self) -> Result<Vec<WellTotals>> {
        let raw = self.rows(
            "well_totals",
            "SELECT a.well_id, b.uwi, TOTAL(a.gas), TOTAL(a.oil), TOTAL(a.water),
                    b.geo_latitude, b.geo_longitude, b.lift_system, b.purpose
             FROM daily_volumes a
             JOIN wells_master b ON a.well_id = b.well_id
             GROUP BY a.well_id
             ORDER BY b.uwi",
            [],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, f64>(2)?,
                    r.get::<_, f64>(3)?,
                    r.get::<_, f64>(4)?,
                    r.get::<_, Option<f64>>(5)?,
                    r.get::<_, Option<f64>>(6)?,
                    r.get::<_, Option<String>>(7)?,
                    r.get::<_, Option<String>>(8)?,
                ))
            },
        )?;
        // wells without coordinates cannot be placed on the map
        Ok(raw
            .into_iter()
            .filter_map(|(well_id, uwi, gas, oil, water, lat, lon, lift_system, purpose)| {
                Some(WellTotals {
                    well_id,
                    uwi,
                    gas,
                    oil,
                    water,
                    latitude: lat?,
                    longitude: lon?,
                    lift_system,
                    purpose,
                })
            })
            .collect())
    }

    pub fn well_hours(&self) -> Result<Vec<WellHours>> {
        self.rows(
            "well_hours",
            "SELECT b.uwi,
                    SUM(a.hours),
                    COUNT(DISTINCT a.volume_date),
                    SUM(a.hours) / COUNT(DISTINCT a.volume_date)
             FROM daily_volumes a
             INNER JOIN wells_master b ON a.well_id = b.well_id
             WHERE a.hours IS NOT NULL
             GROUP BY a.well_id, b.uwi
             ORDER BY b.uwi",
            [],
            |r| {
                Ok(WellHours {
                    uwi: r.get(0)?,
                    total_hours: r.get(1)?,
                    days_with_values: r.get(2)?,
                    average_hours_per_day: r.get(3)?,
                })
            },
        )
    }

    pub fn average_gas_by_well(&self) -> Result<Vec<WellAverage>> {
        self.rows(
            "average_gas_by_well",
            "SELECT a.well_id, b.uwi, AVG(a.gas)
             FROM daily_volumes a
             JOIN wells_master b ON a.well_id = b.well_id
             GROUP BY a.well_id, b.uwi
             HAVING AVG(a.gas) IS NOT NULL
             ORDER BY b.uwi",
            [],
            well_average,
        )
    }

    // =========================================================================
    // Master data and tests
    // =========================================================================

    pub fn count_wells(&self) -> Result<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(DISTINCT uwi) FROM wells_master", [], |r| r.get(0))
            .context("query count_wells")?;
        Ok(n)
    }

    pub fn well_locations(&self) -> Result<Vec<WellLocation>> {
        let raw = self.rows(
            "well_locations",
            "SELECT uwi, geo_latitude, geo_longitude, wellhead_depth, water_depth
             FROM wells_master
             ORDER BY uwi",
            [],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<f64>>(1)?,
                    r.get::<_, Option<f64>>(2)?,
                    r.get::<_, Option<f64>>(3)?,
                    r.get::<_, Option<f64>>(4)?,
                ))
            },
        )?;
        Ok(raw
            .into_iter()
            .filter_map(|(uwi, lat, lon, depth, water_depth)| {
                Some(WellLocation {
                    uwi,
                    latitude: lat?,
                    longitude: lon?,
                    wellhead_depth: depth.unwrap_or(0.0),
                    water_depth,
                })
            })
            .collect())
    }

    /// The most recent well test per well.
    pub fn latest_well_tests(&self) -> Result<Vec<WellTestRow>> {
        self.rows(
            "latest_well_tests",
            "SELECT w.uwi, t.test_date, t.test_num, t.certified, t.test_duration,
                    t.api, t.bsw_p, w.lift_system
             FROM well_tests t
             INNER JOIN (
                 SELECT well_id, MAX(test_date) AS max_date
                 FROM well_tests
                 GROUP BY well_id
             ) m ON t.well_id = m.well_id AND t.test_date = m.max_date
             INNER JOIN wells_master w ON t.well_id = w.well_id
             ORDER BY w.uwi",
            [],
            |r| {
                Ok(WellTestRow {
                    uwi: r.get(0)?,
                    test_date: r.get(1)?,
                    test_num: r.get(2)?,
                    certified: r.get(3)?,
                    test_duration: r.get(4)?,
                    api: r.get(5)?,
                    bsw_p: r.get(6)?,
                    lift_system: r.get(7)?,
                })
            },
        )
    }

    /// Null count of every column of every listed table. Only the fixed source
    /// tables are accepted.
    pub fn null_counts(&self, tables: &[&str]) -> Result<Vec<NullCount>> {
        let mut out = Vec::new();
        for &table in tables {
            if !schema::is_source_table(table) {
                bail!("unknown table {}", table);
            }
            let columns = self.rows(
                "table_info",
                &format!("PRAGMA table_info({table})"),
                [],
                |r| r.get::<_, String>(1),
            )?;
            if columns.is_empty() {
                continue;
            }
            let sums = columns
                .iter()
                .map(|col| format!("SUM(CASE WHEN \"{col}\" IS NULL THEN 1 ELSE 0 END)"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("SELECT COUNT(*), {sums} FROM {table}");
            let counts: Vec<i64> = self
                .conn
                .query_row(&sql, [], |r| {
                    (1..=columns.len())
                        .map(|i| r.get::<_, Option<i64>>(i).map(|v| v.unwrap_or(0)))
                        .collect()
                })
                .with_context(|| format!("count nulls in {}", table))?;
            for (column, nulls) in columns.into_iter().zip(counts) {
                out.push(NullCount { table: table.to_string(), column, nulls });
            }
        }
        log_query("null_counts", out.len(), 0.0);
        Ok(out)
    }
}

fn well_average(r: &Row<'_>) -> rusqlite::Result<WellAverage> {
    Ok(WellAverage { well_id: r.get(0)?, uwi: r.get(1)?, value: r.get(2)? })
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated form, and bare dates.
pub fn parse_ts(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TS_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("unparseable timestamp {:?}", raw))?;
    date.and_hms_opt(0, 0, 0).context("midnight out of range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ts_accepts_common_forms() {
        let a = parse_ts("2023-04-01 00:00:00").unwrap();
        let b = parse_ts("2023-04-01T00:00:00").unwrap();
        let c = parse_ts("2023-04-01").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(parse_ts("April first").is_err());
    }

    #[test]
    fn null_counts_rejects_unknown_table() {
        let store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        assert!(store.null_counts(&["sqlite_master"]).is_err());
    }

    #[test]
    fn empty_schema_queries_return_nothing() {
        let store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        assert_eq!(store.count_wells().unwrap(), 0);
        assert!(store.monthly_critical(Aggregate::Avg).unwrap().is_empty());
        assert_eq!(store.field_totals().unwrap(), FieldTotals::default());
        assert_eq!(store.mean_flow().unwrap(), None);
        assert!(store.monthly_bopd_for(&[]).unwrap().is_empty());
        store.close().unwrap();
    }
}
