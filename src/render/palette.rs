//! Fixed colour assignments shared by both boards.

pub const CARD_BG: &str = "#131313";
pub const PLOT_BG: &str = "#000000";
pub const TEXT: &str = "white";
pub const MUTED: &str = "#424242";
pub const SCATTER_BLUE: &str = "#0066FF";
pub const SCATTER_EDGE: &str = "#212121";
pub const BAR_FILL: &str = "rgba(0, 204, 255, 0.2)";
pub const WATER_DEPTH: &str = "#0066FF";
pub const ALERT_BG: &str = "rgba(255, 0, 0, 0.4)";

pub const HIGHLIGHT_GREEN: &str = "rgba(51, 255, 204, 0.4)";
pub const HIGHLIGHT_RED: &str = "rgba(255, 0, 0, 0.4)";
pub const HIGHLIGHT_ORANGE: &str = "rgba(255, 165, 0, 0.6)";

/// Pie slice colours in Gas, Oil, Water order.
pub const PIE_COLORS: [&str; 3] = ["#663366", "#FF6633", "#0099FF"];

pub const CARD_WELLS: &str = "#00CCFF";
pub const CARD_OIL: &str = "#FF6633";
pub const CARD_WATER: &str = "#0066FF";
pub const CARD_GAS: &str = "#663366";
pub const CARD_HOURS: &str = "#009966";
pub const CARD_FLOW: &str = "#CC9900";

const UWI_COLORS: [(&str, &str); 17] = [
    ("Well001", "rgba(67, 160, 71, 0.6)"),
    ("Well002", "rgba(188, 170, 164, 1)"),
    ("Well004", "rgba(0, 204, 255, 0.2)"),
    ("Well005", "rgba(183, 28, 28, 0.4)"),
    ("Well006", "rgba(255, 87, 34, 0.3)"),
    ("Well007", "rgba(186, 104, 200, 0.2)"),
    ("Well008", "rgba(255, 255, 157, 0.5)"),
    ("Well009", "rgba(204, 153, 255, 0.2)"),
    ("Well010", "rgba(102, 255, 204, 0.6)"),
    ("Well012", "rgba(204, 255, 204, 1)"),
    ("Well013", "rgba(255, 255, 204, 0.2)"),
    ("Well014", "rgba(255, 255, 153, 0.2)"),
    ("Well015", "rgba(255, 153, 204, 0.6)"),
    ("Well016", "rgba(153, 204, 102, 0.4)"),
    ("Well017", "rgba(153, 153, 204, 1)"),
    ("Well018", "rgba(97, 97, 97, 0.6)"),
    ("Well019", "rgba(141, 110, 99, 0.6)"),
];

/// Line colours of the fixed BOPD trend subset.
const BOPD_TREND_COLORS: [(&str, &str); 5] = [
    ("Well013", "rgba(188, 170, 164, 0.1)"),
    ("Well017", "rgba(67, 160, 71, 0.1)"),
    ("Well002", "rgba(255, 87, 34, 0.6)"),
    ("Well008", "rgba(186, 104, 200, 0.6)"),
    ("Well010", "rgba(0, 204, 255, 0.6)"),
];

/// Per well id area fill, keyed by master-data well id.
const WELL_ID_COLORS: [(&str, &str); 17] = [
    ("D0A25FCC-4989-4D49-86C1-CAA92F1B3001", "rgba(67, 160, 71, 0.6)"),
    ("D0A25FCC-4989-4D49-86C1-CDA92F1B3002", "rgba(188, 170, 164, 1)"),
    ("D0A25FCC-4989-4D49-86C1-CDA92F1B3004", "rgba(0, 204, 255, 0.2)"),
    ("D0A25FCC-4989-4D49-86C1-CDA92F1B3005", "rgba(183, 28, 28, 0.4)"),
    ("D0A25FCC-4989-4D49-86C1-CKA92F1B3006", "rgba(255, 87, 34, 0.3)"),
    ("D0A25FCC-4989-4D49-86C1-CPA92F1B3007", "rgba(186, 104, 200, 0.2)"),
    ("D0A25FCC-4989-4D49-86C1-CDA92F1B3008", "rgba(255, 255, 157, 0.5)"),
    ("D0A25FCC-4989-4D49-86C1-CMN92F1B3009", "rgba(204, 153, 255, 0.2)"),
    ("54E7CE87-3AC7-49B2-B794-5730BE7C97010", "rgba(102, 255, 204, 0.6)"),
    ("971F0184-A90B-4029-99E4-F81C5FAB82012", "rgba(204, 255, 204, 1)"),
    ("F95DACDF-1568-4F15-95BF-DE04D3D26013", "rgba(255, 255, 204, 0.2)"),
    ("D0A25FCC-4989-4D49-86C1-JKT92F1B3014", "rgba(255, 255, 153, 0.2)"),
    ("D0A25FCC-4989-4D49-86C1-CDF92F1B3015", "rgba(255, 153, 204, 0.6)"),
    ("D0A25FCC-4989-4D49-86C1-CAA92F1B3016", "rgba(153, 204, 102, 0.4)"),
    ("D0A25FCC-4989-4D49-86C1-CDA92F1B3017", "rgba(153, 153, 204, 1)"),
    ("D0A25FCC-4989-4D49-86C1-CDA92F1B3018", "rgba(97, 97, 97, 0.6)"),
    ("D0A25FCC-4989-4D49-86C1-CDY92F1B3019", "rgba(141, 110, 99, 0.6)"),
];

/// Master-data well ids that have an assigned colour.
pub fn known_well_ids() -> impl Iterator<Item = &'static str> {
    WELL_ID_COLORS.iter().map(|(id, _)| *id)
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, c)| *c)
}

pub fn uwi_color(uwi: &str) -> &'static str {
    lookup(&UWI_COLORS, uwi).unwrap_or("rgba(0, 0, 0, 0.6)")
}

/// Colour for the oil quality trend, where unknown wells are drawn white.
pub fn uwi_line_color(uwi: &str) -> &'static str {
    lookup(&UWI_COLORS, uwi).unwrap_or("rgba(255, 255, 255, 1)")
}

pub fn bopd_trend_color(uwi: &str) -> &'static str {
    lookup(&BOPD_TREND_COLORS, uwi).unwrap_or("rgba(255, 255, 255, 0.6)")
}

pub fn well_id_line(well_id: &str) -> &'static str {
    lookup(&WELL_ID_COLORS, well_id).unwrap_or("rgba(0, 0, 0, 1)")
}

pub fn well_id_fill(well_id: &str) -> &'static str {
    lookup(&WELL_ID_COLORS, well_id).unwrap_or("rgba(0, 0, 1, 1)")
}

/// Which measure a per-year line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSeries {
    Wcut,
    Wor,
    Bopd,
    Bwpd,
}

const RATE_YEARS: [&str; 3] = ["rgba(188, 170, 164, 0.2)", "rgba(0, 204, 255, 0.3)", "rgba(186, 104, 200, 0.2)"];
const RATIO_YEARS: [&str; 3] = ["rgba(255, 255, 157, 0.4)", "rgba(255, 87, 34, 0.6)", "rgba(183, 28, 28, 1)"];

pub fn year_color(series: YearSeries, year: i32) -> &'static str {
    let (years, fallback) = match series {
        YearSeries::Wcut => (RATE_YEARS, "#000033"),
        YearSeries::Bopd => (RATE_YEARS, "#9966CC"),
        YearSeries::Wor => (RATIO_YEARS, "#3366CC"),
        YearSeries::Bwpd => (RATIO_YEARS, "#009966"),
    };
    match year {
        2021..=2023 => years[(year - 2021) as usize],
        _ => fallback,
    }
}

/// Map icon served from `/assets/` for a lift system.
pub fn lift_icon(lift_system: Option<&str>) -> &'static str {
    match lift_system.map(str::trim) {
        Some("BES") => "assets/ESP.png",
        Some("BME") => "assets/BM.png",
        Some("GAS LIFT") => "assets/GASLIFT.png",
        Some("PCP") => "assets/PCP.png",
        _ => "assets/icono_pozo6.png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_wells() {
        assert_eq!(uwi_color("Well010"), "rgba(102, 255, 204, 0.6)");
        assert_eq!(uwi_color("Well999"), "rgba(0, 0, 0, 0.6)");
        assert_eq!(uwi_line_color("Well999"), "rgba(255, 255, 255, 1)");
        assert_eq!(bopd_trend_color("Well002"), "rgba(255, 87, 34, 0.6)");
    }

    #[test]
    fn year_fallbacks_differ_by_series() {
        assert_eq!(year_color(YearSeries::Wcut, 2022), "rgba(0, 204, 255, 0.3)");
        assert_eq!(year_color(YearSeries::Wcut, 2030), "#000033");
        assert_eq!(year_color(YearSeries::Bwpd, 2030), "#009966");
        assert_eq!(year_color(YearSeries::Wor, 2023), "rgba(183, 28, 28, 1)");
    }

    #[test]
    fn icons_by_lift_system() {
        assert_eq!(lift_icon(Some("BES")), "assets/ESP.png");
        assert_eq!(lift_icon(Some("GAS LIFT")), "assets/GASLIFT.png");
        assert_eq!(lift_icon(Some("ROD")), "assets/icono_pozo6.png");
        assert_eq!(lift_icon(None), "assets/icono_pozo6.png");
    }
}
