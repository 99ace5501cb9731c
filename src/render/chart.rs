//! Plotly figure builders.
//!
//! A `Figure` is the `{data, layout}` pair the browser hands straight to
//! `Plotly.newPlot`. Builders take already-derived rows and only decide
//! trace shape, colours and axes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::derive::format::{month_full_year_label, month_year_label, thousand_ticks, year_month_key};
use crate::derive::metrics::{HoursGauge, NullGrid};
use crate::model::{WellAverage, WellLocation, WellMonthlyBopd, WellMonthlyVolume};
use crate::render::palette::{self, YearSeries};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn new(layout: Value) -> Self {
        Self { data: Vec::new(), layout }
    }

    pub fn push(&mut self, trace: Value) {
        self.data.push(trace);
    }

    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    /// Trace names in order, for legends and tests.
    pub fn trace_names(&self) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|t| t.get("name").and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

fn axis(title: &str) -> Value {
    json!({
        "title": title,
        "color": palette::TEXT,
        "titlefont": {"size": 12},
        "tickfont": {"size": 9},
    })
}

/// Black plot area with white axes, the base every board chart uses.
pub fn dark_layout(x_title: &str, y_title: &str) -> Value {
    json!({
        "xaxis": axis(x_title),
        "yaxis": axis(y_title),
        "hovermode": "closest",
        "plot_bgcolor": palette::PLOT_BG,
        "paper_bgcolor": palette::PLOT_BG,
        "font": {"color": palette::TEXT},
        "margin": {"l": 50, "r": 0, "b": 50, "t": 30},
        "height": 300,
        "legend": {"font": {"size": 9, "color": palette::TEXT}},
    })
}

/// Blue circle markers, one per point, hover text per point.
pub fn markers_scatter(xs: &[f64], ys: &[f64], text: &[String], x_title: &str, y_title: &str) -> Figure {
    let mut layout = dark_layout(x_title, y_title);
    layout["width"] = json!(400);
    let mut fig = Figure::new(layout);
    if xs.is_empty() {
        return fig;
    }
    fig.push(json!({
        "type": "scatter",
        "mode": "markers",
        "x": xs,
        "y": ys,
        "text": text,
        "marker": {
            "size": 8,
            "symbol": "circle",
            "color": palette::SCATTER_BLUE,
            "line": {"width": 0.4, "color": palette::SCATTER_EDGE},
        },
    }));
    fig
}

/// One monthly point carrying two measures drawn as paired yearly lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairPoint {
    pub year: i32,
    pub month: u32,
    pub first: f64,
    pub second: f64,
}

/// For every year, a line for each of the two measures against month number.
pub fn year_pair_lines(points: &[PairPoint], names: [&str; 2], series: [YearSeries; 2]) -> Figure {
    let mut fig = Figure::new(dark_layout("Month", "Units"));
    let mut years: Vec<i32> = Vec::new();
    for p in points {
        if !years.contains(&p.year) {
            years.push(p.year);
        }
    }
    for year in years {
        let of_year: Vec<&PairPoint> = points.iter().filter(|p| p.year == year).collect();
        let months: Vec<u32> = of_year.iter().map(|p| p.month).collect();
        for (i, name) in names.iter().enumerate() {
            let ys: Vec<f64> = of_year.iter().map(|p| if i == 0 { p.first } else { p.second }).collect();
            fig.push(json!({
                "type": "scatter",
                "mode": "lines",
                "name": format!("{} {}", name, year),
                "x": months,
                "y": ys,
                "line": {"width": 2, "color": palette::year_color(series[i], year)},
            }));
        }
    }
    fig
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Oil,
    Gas,
}

impl Measure {
    fn of(&self, row: &WellMonthlyVolume) -> f64 {
        match self {
            Measure::Oil => row.oil,
            Measure::Gas => row.gas,
        }
    }
}

/// Filled area per well over `YYYY-MM` categories, with thousand ticks on y.
pub fn well_areas(rows: &[WellMonthlyVolume], measure: Measure, x_title: &str, y_title: &str) -> Figure {
    let mut by_well: BTreeMap<&str, Vec<&WellMonthlyVolume>> = BTreeMap::new();
    let mut months: BTreeSet<(i32, u32)> = BTreeSet::new();
    let mut max = 0.0_f64;
    for r in rows {
        by_well.entry(r.well_id.as_str()).or_default().push(r);
        months.insert((r.year, r.month));
        max = max.max(measure.of(r));
    }

    let ticks = thousand_ticks(max);
    let mut layout = dark_layout(x_title, y_title);
    layout["xaxis"]["tickvals"] = json!(months.iter().map(|(y, m)| year_month_key(*y, *m)).collect::<Vec<_>>());
    layout["xaxis"]["ticktext"] = json!(months.iter().map(|(y, m)| month_year_label(*y, *m)).collect::<Vec<_>>());
    layout["yaxis"]["tickvals"] = json!(ticks.values);
    layout["yaxis"]["ticktext"] = json!(ticks.labels);
    layout["yaxis"]["dtick"] = json!(1000);
    layout["yaxis"]["range"] = json!([ticks.range.0, ticks.range.1]);
    layout["legend"]["traceorder"] = json!("normal");

    let mut fig = Figure::new(layout);
    for (well_id, mut points) in by_well {
        points.sort_by_key(|p| (p.year, p.month));
        let uwi = points.first().map(|p| p.uwi.as_str()).unwrap_or(well_id);
        fig.push(json!({
            "type": "scatter",
            "mode": "lines+markers",
            "name": uwi,
            "x": points.iter().map(|p| year_month_key(p.year, p.month)).collect::<Vec<_>>(),
            "y": points.iter().map(|p| measure.of(p)).collect::<Vec<_>>(),
            "line": {"color": palette::well_id_line(well_id)},
            "fill": "tozeroy",
            "fillcolor": palette::well_id_fill(well_id),
        }));
    }
    fig
}

/// Average oil quality per well, labelled `Jan/2023`.
pub fn oil_quality_trend(rows: &[WellMonthlyVolume]) -> Figure {
    let mut layout = dark_layout("Month", "Average Oil Quality");
    layout["xaxis"]["gridcolor"] = json!(palette::CARD_BG);
    layout["xaxis"]["showline"] = json!(true);
    layout["yaxis"]["gridcolor"] = json!(palette::CARD_BG);
    layout["margin"] = json!({"l": 0, "r": 120, "b": 0, "t": 30});
    layout["showlegend"] = json!(true);

    let mut by_uwi: BTreeMap<&str, Vec<&WellMonthlyVolume>> = BTreeMap::new();
    for r in rows.iter().filter(|r| r.oil_quality.is_some()) {
        by_uwi.entry(r.uwi.as_str()).or_default().push(r);
    }
    let mut fig = Figure::new(layout);
    for (uwi, mut points) in by_uwi {
        points.sort_by_key(|p| (p.year, p.month));
        fig.push(json!({
            "type": "scatter",
            "mode": "lines+markers",
            "name": uwi,
            "x": points.iter().map(|p| month_full_year_label(p.year, p.month)).collect::<Vec<_>>(),
            "y": points.iter().map(|p| p.oil_quality).collect::<Vec<_>>(),
            "line": {"color": palette::uwi_line_color(uwi)},
        }));
    }
    fig
}

/// Monthly summed BOPD for the fixed trend subset, labelled `Jan/23`.
pub fn bopd_trend(rows: &[WellMonthlyBopd]) -> Figure {
    let mut layout = dark_layout("Month/Year", "Sum Oil Production (BOPD)");
    layout["yaxis"]["dtick"] = json!(1_000_000);
    layout["xaxis"]["gridcolor"] = json!(palette::CARD_BG);
    layout["yaxis"]["gridcolor"] = json!(palette::CARD_BG);
    layout["width"] = json!(400);
    layout["margin"] = json!({"t": 50, "b": 0, "l": 0, "r": 0});

    let mut by_uwi: BTreeMap<&str, Vec<&WellMonthlyBopd>> = BTreeMap::new();
    for r in rows {
        by_uwi.entry(r.uwi.as_str()).or_default().push(r);
    }
    let mut fig = Figure::new(layout);
    for (uwi, mut points) in by_uwi {
        points.sort_by_key(|p| (p.year, p.month));
        fig.push(json!({
            "type": "scatter",
            "mode": "lines",
            "name": uwi,
            "fill": "tozeroy",
            "x": points.iter().map(|p| month_year_label(p.year, p.month)).collect::<Vec<_>>(),
            "y": points.iter().map(|p| p.bopd).collect::<Vec<_>>(),
            "line": {"color": palette::bopd_trend_color(uwi)},
        }));
    }
    fig
}

/// Donut chart. `compact` drops the legend and margins for map popups.
pub fn pie(labels: &[&str], values: &[f64], colors: &[&str], compact: bool) -> Figure {
    let layout = if compact {
        json!({"showlegend": false, "margin": {"l": 0, "r": 0, "t": 0, "b": 0}, "width": 150, "height": 150})
    } else {
        json!({
            "plot_bgcolor": palette::CARD_BG,
            "paper_bgcolor": palette::CARD_BG,
            "margin": {"t": 0, "b": 0, "l": 0.5, "r": 0},
            "height": 170,
        })
    };
    let (textinfo, text_size) = if compact { ("label+percent", 11) } else { ("percent", 8) };
    let mut fig = Figure::new(layout);
    fig.push(json!({
        "type": "pie",
        "labels": labels,
        "values": values,
        "hole": 0.3,
        "marker": {"colors": colors},
        "textinfo": textinfo,
        "hoverinfo": "label+percent",
        "textfont": {"color": "black", "size": text_size},
    }));
    fig
}

/// Horizontal bars of per-well averages, UWI on the y axis.
pub fn hbar(rows: &[WellAverage], x_title: &str) -> Figure {
    let layout = json!({
        "margin": {"l": 10, "r": 10, "t": 30, "b": 10},
        "plot_bgcolor": palette::PLOT_BG,
        "paper_bgcolor": palette::PLOT_BG,
        "xaxis": {"title": {"text": x_title, "font": {"color": palette::TEXT}}, "tickfont": {"color": palette::TEXT}},
        "yaxis": {"title": {"text": "UWI", "font": {"color": palette::TEXT}}, "tickfont": {"color": palette::TEXT}, "fixedrange": true},
    });
    let mut fig = Figure::new(layout);
    if rows.is_empty() {
        return fig;
    }
    fig.push(json!({
        "type": "bar",
        "orientation": "h",
        "x": rows.iter().map(|r| r.value).collect::<Vec<_>>(),
        "y": rows.iter().map(|r| r.uwi.as_str()).collect::<Vec<_>>(),
        "marker": {"color": palette::BAR_FILL},
    }));
    fig
}

/// Gauge with the mean in green over a white band up to the max.
pub fn gauge(hours: &HoursGauge, title: &str) -> Figure {
    let layout = json!({
        "plot_bgcolor": "black",
        "paper_bgcolor": "black",
        "margin": {"t": 25, "l": 10, "r": 70, "b": 7},
    });
    let mut fig = Figure::new(layout);
    fig.push(json!({
        "type": "indicator",
        "mode": "gauge+number",
        "value": hours.average,
        "domain": {"x": [0, 1], "y": [0, 1]},
        "title": {"text": title, "font": {"color": palette::TEXT}},
        "gauge": {
            "axis": {
                "range": [Value::Null, hours.max],
                "tickvals": [0, 5, 10, 15, 20],
                "tickfont": {"color": palette::TEXT},
            },
            "steps": [
                {"range": [0.0, hours.max], "color": "white"},
                {"range": [0.0, hours.average], "color": "green"},
            ],
        },
        "number": {"font": {"color": palette::TEXT}},
    }));
    fig
}

/// Wellhead markers at depth zero and a vertical line down to the inverted
/// wellhead depth. With `water` set, the aquifer depth is drawn in blue too.
pub fn trajectory_3d(wells: &[WellLocation], water: bool) -> Figure {
    let layout = json!({
        "scene": {
            "xaxis": {"title": "Long"},
            "yaxis": {"title": "Lat"},
            "zaxis": {"title": "Depth"},
            "aspectmode": "cube",
            "camera": {
                "up": {"x": 0, "y": 0, "z": 1},
                "center": {"x": 0, "y": 0, "z": 0},
                "eye": {"x": 1.5, "y": 1.5, "z": 0},
            },
        },
        "template": "plotly_dark",
        "margin": {"l": 0, "r": 0, "b": 0, "t": 20},
        "height": 300,
        "width": 400,
        "legend": {"font": {"size": 10}, "x": 0.7, "y": 0.4},
        "plot_bgcolor": palette::PLOT_BG,
        "paper_bgcolor": palette::PLOT_BG,
    });
    let mut fig = Figure::new(layout);
    for w in wells {
        fig.push(json!({
            "type": "scatter3d",
            "mode": "markers+text",
            "name": w.uwi,
            "x": [w.longitude],
            "y": [w.latitude],
            "z": [0],
            "marker": {"size": 5, "color": palette::uwi_color(&w.uwi), "opacity": 1},
            "textposition": "bottom center",
            "showlegend": true,
        }));
    }
    for w in wells {
        if water {
            if let Some(depth) = w.water_depth {
                fig.push(vertical_line(w, -depth, palette::WATER_DEPTH, format!("{} (Water)", w.uwi)));
            }
        }
        let name = if water { format!("{} (Depth)", w.uwi) } else { w.uwi.clone() };
        fig.push(vertical_line(w, -w.wellhead_depth, palette::uwi_color(&w.uwi), name));
    }
    fig
}

fn vertical_line(w: &WellLocation, bottom: f64, color: &str, name: String) -> Value {
    json!({
        "type": "scatter3d",
        "mode": "lines+text",
        "name": name,
        "x": [w.longitude, w.longitude],
        "y": [w.latitude, w.latitude],
        "z": [0.0, bottom],
        "line": {"color": color, "width": 2},
        "showlegend": false,
    })
}

/// Table by column null counts on a warm scale.
pub fn null_heatmap(grid: &NullGrid) -> Figure {
    let layout = json!({
        "plot_bgcolor": "black",
        "paper_bgcolor": "black",
        "font": {"color": palette::TEXT},
        "margin": {"t": 30, "l": 100, "r": 50, "b": 70},
        "xaxis": {"tickangle": 45, "tickfont": {"size": 9}, "title": "Columns"},
        "yaxis": {"tickangle": 45, "tickfont": {"size": 8}, "title": "Tables"},
        "height": 400,
    });
    let mut fig = Figure::new(layout);
    if grid.tables.is_empty() {
        return fig;
    }
    fig.push(json!({
        "type": "heatmap",
        "x": grid.columns,
        "y": grid.tables,
        "z": grid.z,
        "colorscale": "YlOrRd",
        "reversescale": true,
        "colorbar": {"title": {"text": "Total Nulls", "font": {"color": palette::TEXT}}},
    }));
    fig
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(well: &str, uwi: &str, year: i32, month: u32, oil: f64) -> WellMonthlyVolume {
        WellMonthlyVolume {
            well_id: well.into(),
            uwi: uwi.into(),
            year,
            month,
            oil,
            gas: oil / 2.0,
            oil_quality: Some(30.0),
        }
    }

    #[test]
    fn year_pairs_emit_two_traces_per_year() {
        let points = vec![
            PairPoint { year: 2022, month: 1, first: 1.0, second: 2.0 },
            PairPoint { year: 2022, month: 2, first: 1.5, second: 2.5 },
            PairPoint { year: 2023, month: 1, first: 3.0, second: 4.0 },
        ];
        let fig = year_pair_lines(&points, ["WCUT", "WOR"], [YearSeries::Wcut, YearSeries::Wor]);
        assert_eq!(fig.trace_names(), vec!["WCUT 2022", "WOR 2022", "WCUT 2023", "WOR 2023"]);
    }

    #[test]
    fn areas_group_by_well_and_tick_thousands() {
        let rows = vec![
            volume("a", "Well001", 2023, 1, 1200.0),
            volume("a", "Well001", 2023, 2, 800.0),
            volume("b", "Well002", 2023, 1, 2500.0),
        ];
        let fig = well_areas(&rows, Measure::Oil, "Month-Year", "Oil Production");
        assert_eq!(fig.trace_count(), 2);
        assert_eq!(fig.layout["yaxis"]["range"], json!([0.0, 3000.0]));
        assert_eq!(fig.layout["xaxis"]["ticktext"], json!(["Jan/23", "Feb/23"]));
    }

    #[test]
    fn empty_inputs_render_without_traces() {
        assert_eq!(hbar(&[], "Average Oil").trace_count(), 0);
        assert_eq!(markers_scatter(&[], &[], &[], "x", "y").trace_count(), 0);
        assert_eq!(well_areas(&[], Measure::Gas, "x", "y").trace_count(), 0);
    }

    #[test]
    fn trajectory_adds_water_lines_when_known() {
        let wells = vec![
            WellLocation { uwi: "Well001".into(), latitude: 5.0, longitude: -73.0, wellhead_depth: 1500.0, water_depth: Some(300.0) },
            WellLocation { uwi: "Well002".into(), latitude: 5.1, longitude: -73.1, wellhead_depth: 900.0, water_depth: None },
        ];
        assert_eq!(trajectory_3d(&wells, false).trace_count(), 4);
        assert_eq!(trajectory_3d(&wells, true).trace_count(), 5);
    }
}
