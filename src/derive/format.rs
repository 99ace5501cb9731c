//! Number and calendar label formatting used on cards and axes.

use chrono::{FixedOffset, Offset, Utc};

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn month_abbr(month: u32) -> Option<&'static str> {
    month.checked_sub(1).and_then(|i| MONTH_ABBR.get(i as usize)).copied()
}

/// Card value: two decimals with a spaced ` K`/` M` suffix.
pub fn format_number(x: f64) -> String {
    if x.abs() >= 1e6 {
        format!("{:.2} M", x / 1e6)
    } else if x.abs() >= 1e3 {
        format!("{:.2} K", x / 1e3)
    } else {
        format!("{:.2}", x)
    }
}

/// Axis label: whole units with a `K`/`M` suffix.
pub fn format_axis(y: f64) -> String {
    if y >= 1e6 {
        format!("{:.0}M", y / 1e6)
    } else if y >= 1e3 {
        format!("{:.0}K", y / 1e3)
    } else {
        format!("{}", y.trunc() as i64)
    }
}

/// `Jan/23`
pub fn month_year_label(year: i32, month: u32) -> String {
    let yy = year.rem_euclid(100);
    format!("{}/{:02}", month_abbr(month).unwrap_or("N/A"), yy)
}

/// `Jan/2023`
pub fn month_full_year_label(year: i32, month: u32) -> String {
    format!("{}/{}", month_abbr(month).unwrap_or("N/A"), year)
}

/// Sortable category key for monthly x axes: `2023-04`.
pub fn year_month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Tick values every thousand from zero up to the first thousand above
/// `max`, labelled `0`, `1K`, `2K`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Ticks {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub range: (f64, f64),
}

const MAX_TICKS: u64 = 50;

/// Past `MAX_TICKS` thousands the step widens to a multiple of a thousand.
pub fn thousand_ticks(max: f64) -> Ticks {
    let max = if max.is_finite() && max > 0.0 { max.min(1e15) } else { 0.0 };
    let top_k = (max / 1000.0).floor() as u64 + 1;
    let step = top_k.div_ceil(MAX_TICKS).max(1);
    let mut values = vec![0.0];
    let mut labels = vec!["0".to_string()];
    let mut k = step;
    while k <= top_k {
        values.push(k as f64 * 1000.0);
        labels.push(format!("{}K", k));
        k += step;
    }
    Ticks { values, labels, range: (0.0, top_k as f64 * 1000.0) }
}

/// Wall-clock time in a fixed offset, `YYYY-MM-DD HH:MM:SS`.
pub fn last_updated(utc_offset_hours: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_hours.clamp(-23, 23) * 3600).unwrap_or(Utc.fix());
    Utc::now().with_timezone(&offset).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_numbers() {
        assert_eq!(format_number(999.0), "999.00");
        assert_eq!(format_number(1_500.0), "1.50 K");
        assert_eq!(format_number(-2_345_678.0), "-2.35 M");
        assert_eq!(format_number(0.0), "0.00");
    }

    #[test]
    fn axis_numbers() {
        assert_eq!(format_axis(999.9), "999");
        assert_eq!(format_axis(5_000.0), "5K");
        assert_eq!(format_axis(3_000_000.0), "3M");
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_year_label(2023, 1), "Jan/23");
        assert_eq!(month_year_label(2005, 12), "Dec/05");
        assert_eq!(month_full_year_label(2022, 7), "Jul/2022");
        assert_eq!(month_full_year_label(2022, 13), "N/A/2022");
        assert_eq!(year_month_key(2023, 4), "2023-04");
    }

    #[test]
    fn ticks_reach_next_thousand() {
        let t = thousand_ticks(2_500.0);
        assert_eq!(t.values, vec![0.0, 1000.0, 2000.0, 3000.0]);
        assert_eq!(t.labels, vec!["0", "1K", "2K", "3K"]);
        assert_eq!(t.range, (0.0, 3000.0));
    }

    #[test]
    fn ticks_on_exact_thousand_and_empty() {
        assert_eq!(thousand_ticks(2_000.0).range.1, 3000.0);
        assert_eq!(thousand_ticks(f64::NAN).values, vec![0.0, 1000.0]);
        assert_eq!(thousand_ticks(-5.0).range, (0.0, 1000.0));
    }

    #[test]
    fn last_updated_shape() {
        let s = last_updated(-5);
        assert_eq!(s.len(), 19);
        assert_eq!(&s[4..5], "-");
    }

    #[test]
    fn ticks_stay_bounded_for_huge_maxima() {
        for max in [9.0e6, 1.0e12, i64::MAX as f64, f64::MAX] {
            let t = thousand_ticks(max);
            assert!(t.values.len() <= MAX_TICKS as usize + 1, "{} ticks for {}", t.values.len(), max);
            assert_eq!(t.values.len(), t.labels.len());
            assert!(t.values.windows(2).all(|w| w[0] < w[1]));
        }
        let t = thousand_ticks(9.0e6);
        assert_eq!(t.range.1, 9_001_000.0);
        assert_eq!(t.labels[1], "181K");
    }
}
