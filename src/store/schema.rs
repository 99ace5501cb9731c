/// Source tables, in the order the missing-values heatmap lists them.
pub const SOURCE_TABLES: [&str; 4] = [
    "well_tests",
    "wells_master",
    "daily_volumes",
    "critical_variables",
];

pub const CREATE_TABLES: &str = "BEGIN;
CREATE TABLE IF NOT EXISTS wells_master (
    well_id TEXT PRIMARY KEY,
    uwi TEXT NOT NULL,
    geo_latitude REAL,
    geo_longitude REAL,
    wellhead_depth REAL,
    water_depth REAL,
    lift_system TEXT,
    purpose TEXT
);
CREATE TABLE IF NOT EXISTS daily_volumes (
    well_id TEXT NOT NULL,
    volume_date TEXT NOT NULL,
    oil REAL,
    gas REAL,
    water REAL,
    hours REAL,
    oil_quality REAL
);
CREATE TABLE IF NOT EXISTS critical_variables (
    well_id TEXT NOT NULL,
    date TEXT NOT NULL,
    day TEXT,
    intake_pressure REAL,
    freq REAL,
    flow REAL,
    wor REAL,
    wcut REAL,
    bwpd REAL,
    bopd REAL,
    run_life REAL,
    run_status REAL
);
CREATE TABLE IF NOT EXISTS well_tests (
    well_id TEXT NOT NULL,
    test_date TEXT NOT NULL,
    test_num INTEGER,
    certified INTEGER,
    test_duration REAL,
    api REAL,
    bsw_p REAL
);
CREATE INDEX IF NOT EXISTS idx_critical_well_date ON critical_variables (well_id, date);
CREATE INDEX IF NOT EXISTS idx_volumes_well_date ON daily_volumes (well_id, volume_date);
COMMIT;";

pub fn is_source_table(name: &str) -> bool {
    SOURCE_TABLES.contains(&name)
}
