//! Pure transformations from query rows to the numbers the board displays.

pub mod format;
pub mod metrics;
pub mod runlife;

pub use format::{format_axis, format_number, month_full_year_label, month_year_label, thousand_ticks};
pub use metrics::{bottom_n, critical_alerts, proportions, Shares};
pub use runlife::{segment, RunLifeParams, TrailingCycle};
