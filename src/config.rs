use serde::{Deserialize, Serialize};

use crate::derive::runlife::{RunLifeParams, TrailingCycle};

/// Which of the two dashboards to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    Trajectory,
    Kpi,
}

impl BoardKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trajectory" | "traj" | "overview" => Some(BoardKind::Trajectory),
            "kpi" | "final" => Some(BoardKind::Kpi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardKind::Trajectory => "trajectory",
            BoardKind::Kpi => "kpi",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub bind_addr: String,
    /// How long a connection may take to send its request head
    pub read_timeout_ms: u64,
    pub board: BoardKind,
    pub export_dir: String,
    pub brand: String,
    pub utc_offset_hours: i32,
    pub runlife_marker: f64,
    pub runlife_checkpoint: String,
    pub runlife_trailing: TrailingCycle,
    /// Run-life values the efficiency table paints green
    pub runlife_highlight: Vec<f64>,
    pub bopd_wells: Vec<String>,
    pub gas_wells: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "data/wellboard.sqlite".to_string(),
            bind_addr: "127.0.0.1:8050".to_string(),
            read_timeout_ms: 5_000,
            board: BoardKind::Kpi,
            export_dir: "out/exports".to_string(),
            brand: "Geohallitians".to_string(),
            utc_offset_hours: -5,
            runlife_marker: 1.0,
            runlife_checkpoint: "00:00".to_string(),
            runlife_trailing: TrailingCycle::Include,
            runlife_highlight: vec![1426.0, 413.0, 343.0, 167.0, 496.0, 573.0, 868.0],
            bopd_wells: list_of(&["Well013", "Well017", "Well002", "Well008", "Well010"]),
            gas_wells: list_of(&["Well007", "Well009", "Well012", "Well014", "Well013"]),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            db_path: std::env::var("WELLBOARD_DB").unwrap_or(d.db_path),
            bind_addr: std::env::var("WELLBOARD_BIND").unwrap_or(d.bind_addr),
            read_timeout_ms: std::env::var("WELLBOARD_READ_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms: &u64| *ms > 0)
                .unwrap_or(d.read_timeout_ms),
            board: std::env::var("WELLBOARD_BOARD").ok().and_then(|v| BoardKind::parse(&v)).unwrap_or(d.board),
            export_dir: std::env::var("WELLBOARD_EXPORT_DIR").unwrap_or(d.export_dir),
            brand: std::env::var("WELLBOARD_BRAND").unwrap_or(d.brand),
            utc_offset_hours: std::env::var("WELLBOARD_UTC_OFFSET_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|h: &i32| (-23..=23).contains(h))
                .unwrap_or(d.utc_offset_hours),
            runlife_marker: std::env::var("RUNLIFE_MARKER").ok().and_then(|v| v.parse().ok()).unwrap_or(d.runlife_marker),
            runlife_checkpoint: std::env::var("RUNLIFE_CHECKPOINT").unwrap_or(d.runlife_checkpoint),
            runlife_trailing: std::env::var("RUNLIFE_TRAILING")
                .ok()
                .and_then(|v| TrailingCycle::parse(&v))
                .unwrap_or(d.runlife_trailing),
            runlife_highlight: std::env::var("RUNLIFE_HIGHLIGHT")
                .ok()
                .map(|v| v.split(',').filter_map(|s| s.trim().parse().ok()).collect())
                .unwrap_or(d.runlife_highlight),
            bopd_wells: std::env::var("BOPD_WELLS").ok().map(|v| split_list(&v)).unwrap_or(d.bopd_wells),
            gas_wells: std::env::var("GAS_WELLS").ok().map(|v| split_list(&v)).unwrap_or(d.gas_wells),
        }
    }

    pub fn runlife_params(&self) -> RunLifeParams {
        RunLifeParams {
            reset_marker: self.runlife_marker,
            checkpoint: self.runlife_checkpoint.clone(),
            trailing: self.runlife_trailing,
        }
    }
}

fn list_of(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_kind_aliases() {
        assert_eq!(BoardKind::parse("KPI"), Some(BoardKind::Kpi));
        assert_eq!(BoardKind::parse(" overview "), Some(BoardKind::Trajectory));
        assert_eq!(BoardKind::parse("other"), None);
    }

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list("Well001, ,Well002,"), vec!["Well001", "Well002"]);
    }

    #[test]
    fn default_params_use_unit_marker() {
        let p = Config::default().runlife_params();
        assert_eq!(p.reset_marker, 1.0);
        assert_eq!(p.checkpoint, "00:00");
        assert_eq!(p.trailing, TrailingCycle::Include);
    }
}
