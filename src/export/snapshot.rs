//! Static raster of an assembled dashboard: header band, sidebar, the card
//! grid and the side column, each card sketched from its own figure or table.

use serde_json::Value;

use crate::export::raster::{parse_color, Canvas, Rgb, BLACK, WHITE};
use crate::render::palette;
use crate::render::{Card, CardBody, DataTable, Dashboard, Figure, MapSpec};

pub const WIDTH: u32 = 1280;
pub const HEIGHT: u32 = 800;

const HEADER_H: u32 = 64;
const FOOTER_H: u32 = 28;
const MARGIN: u32 = 12;
const SIDE_W: u32 = 220;
const TITLE_BAND: u32 = 20;

const GRADIENT_TOP: Rgb = [24, 26, 32];
const GRADIENT_BOTTOM: Rgb = [4, 4, 6];
const SOFT_TEXT: Rgb = [170, 170, 170];
const FALLBACK_LINE: Rgb = [0, 153, 255];

fn color(spec: &str, under: Rgb, fallback: Rgb) -> Rgb {
    parse_color(spec, under).unwrap_or(fallback)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Rect {
    fn inset(self, by: u32) -> Rect {
        Rect {
            x: self.x + by,
            y: self.y + by,
            w: self.w.saturating_sub(2 * by),
            h: self.h.saturating_sub(2 * by),
        }
    }
}

/// Splits `area` into `n` vertical slots separated by `gap`.
fn stack(area: Rect, n: usize, gap: u32) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let n32 = n as u32;
    let h = area.h.saturating_sub(gap * (n32 - 1)) / n32;
    (0..n32)
        .map(|i| Rect { x: area.x, y: area.y + i * (h + gap), w: area.w, h })
        .collect()
}

fn columns(area: Rect, n: usize, gap: u32) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let n32 = n as u32;
    let w = area.w.saturating_sub(gap * (n32 - 1)) / n32;
    (0..n32)
        .map(|i| Rect { x: area.x + i * (w + gap), y: area.y, w, h: area.h })
        .collect()
}

pub fn render(board: &Dashboard) -> Canvas {
    let mut canvas = Canvas::new(WIDTH, HEIGHT, BLACK);
    canvas.vertical_gradient(GRADIENT_TOP, GRADIENT_BOTTOM);
    draw_header(&mut canvas, board);

    let body = Rect {
        x: MARGIN,
        y: HEADER_H + MARGIN,
        w: WIDTH - 2 * MARGIN,
        h: HEIGHT - HEADER_H - FOOTER_H - 2 * MARGIN,
    };
    let left = Rect { x: body.x, y: body.y, w: SIDE_W, h: body.h };
    let right = Rect { x: body.x + body.w - SIDE_W, y: body.y, w: SIDE_W, h: body.h };
    let grid = Rect {
        x: left.x + SIDE_W + MARGIN,
        y: body.y,
        w: body.w - 2 * (SIDE_W + MARGIN),
        h: body.h,
    };

    for (card, slot) in board.sidebar.iter().zip(stack(left, board.sidebar.len(), MARGIN)) {
        draw_card(&mut canvas, card, slot);
    }
    for (row, band) in board.rows.iter().zip(stack(grid, board.rows.len(), MARGIN)) {
        for (card, slot) in row.iter().zip(columns(band, row.len(), MARGIN)) {
            draw_card(&mut canvas, card, slot);
        }
    }
    for (card, slot) in board.side_column.iter().zip(stack(right, board.side_column.len(), MARGIN)) {
        draw_card(&mut canvas, card, slot);
    }

    canvas.text_centered(WIDTH / 2, HEIGHT - FOOTER_H + 10, &board.footer, SOFT_TEXT, 1);
    canvas
}

fn draw_header(canvas: &mut Canvas, board: &Dashboard) {
    let band = color(palette::CARD_BG, BLACK, BLACK);
    canvas.fill_rect(0, 0, WIDTH, HEADER_H, band);
    canvas.text(MARGIN * 2, 25, &board.brand, WHITE, 2);
    canvas.text_centered(WIDTH / 2, 18, &board.title, WHITE, 4);
    let stamp = format!("Last Updated: {} ({})", board.last_updated, board.timezone_label);
    let w = crate::export::glyphs::text_width(&stamp, 1);
    canvas.text(WIDTH.saturating_sub(w + MARGIN * 2), 29, &stamp, SOFT_TEXT, 1);
}

fn draw_card(canvas: &mut Canvas, card: &Card, slot: Rect) {
    let bg = color(&card.background, BLACK, [19, 19, 19]);
    canvas.fill_rect(slot.x, slot.y, slot.w, slot.h, bg);
    canvas.stroke_rect(slot.x, slot.y, slot.w, slot.h, color(palette::MUTED, BLACK, SOFT_TEXT));
    canvas.text_clipped(slot.x + 8, slot.y + 7, &card.title, WHITE, 1, slot.w.saturating_sub(16));

    let body = Rect {
        x: slot.x,
        y: slot.y + TITLE_BAND,
        w: slot.w,
        h: slot.h.saturating_sub(TITLE_BAND),
    }
    .inset(6);
    if body.w < 4 || body.h < 4 {
        return;
    }
    match &card.body {
        CardBody::Metric { value, color: c } => {
            let scale = if body.h >= 40 { 3 } else { 2 };
            let top = body.y + body.h.saturating_sub(7 * scale) / 2;
            canvas.text_centered(body.x + body.w / 2, top, value, color(c, bg, WHITE), scale);
        }
        CardBody::Figure { figure } => draw_figure(canvas, figure, body, bg),
        CardBody::Table { table } => draw_table(canvas, table, body, bg),
        CardBody::Map { map } => draw_map(canvas, map, body),
        CardBody::Frame { src } => {
            canvas.text_clipped(body.x, body.y + body.h / 2, src, SOFT_TEXT, 1, body.w);
        }
    }
}

fn numbers(v: &Value) -> Vec<f64> {
    v.as_array()
        .map(|a| a.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

fn trace_color(trace: &Value, under: Rgb) -> Rgb {
    let spec = trace["line"]["color"]
        .as_str()
        .or_else(|| trace["marker"]["color"].as_str())
        .unwrap_or("");
    color(spec, under, FALLBACK_LINE)
}

fn draw_figure(canvas: &mut Canvas, figure: &Figure, area: Rect, bg: Rgb) {
    let Some(first) = figure.data.first() else {
        canvas.text_centered(area.x + area.w / 2, area.y + area.h / 2, "No data", SOFT_TEXT, 1);
        return;
    };
    match first["type"].as_str().unwrap_or("scatter") {
        "pie" => draw_pie(canvas, first, area, bg),
        "bar" => draw_bars(canvas, first, area, bg),
        "indicator" => draw_gauge(canvas, first, area),
        "heatmap" => draw_heatmap(canvas, first, area),
        _ => draw_lines(canvas, &figure.data, area, bg),
    }
}

/// Proportions as one stacked strip with percent labels under it.
fn draw_pie(canvas: &mut Canvas, trace: &Value, area: Rect, bg: Rgb) {
    let values = numbers(&trace["values"]);
    let total: f64 = values.iter().sum();
    let strip_h = (area.h / 3).max(6);
    canvas.stroke_rect(area.x, area.y, area.w, strip_h, SOFT_TEXT);
    if total <= 0.0 {
        return;
    }
    let labels = trace["labels"].as_array().cloned().unwrap_or_default();
    let mut x = area.x;
    for (i, v) in values.iter().enumerate() {
        let w = ((v / total) * area.w as f64).round() as u32;
        let c = color(trace["marker"]["colors"][i].as_str().unwrap_or(""), bg, FALLBACK_LINE);
        canvas.fill_rect(x, area.y, w, strip_h, c);
        let label = format!(
            "{} {:.0}%",
            labels.get(i).and_then(Value::as_str).unwrap_or(""),
            v / total * 100.0
        );
        canvas.text(area.x, area.y + strip_h + 6 + i as u32 * 10, &label, c, 1);
        x += w;
    }
}

fn draw_bars(canvas: &mut Canvas, trace: &Value, area: Rect, bg: Rgb) {
    let values = numbers(&trace["x"]);
    let labels = trace["y"].as_array().cloned().unwrap_or_default();
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if values.is_empty() || max <= 0.0 {
        return;
    }
    let fill = color(trace["marker"]["color"].as_str().unwrap_or(""), bg, FALLBACK_LINE);
    let label_w = 48;
    let bar_area = area.w.saturating_sub(label_w);
    for (i, slot) in stack(area, values.len(), 2).into_iter().enumerate() {
        let label = labels.get(i).and_then(Value::as_str).unwrap_or("");
        canvas.text_clipped(slot.x, slot.y + slot.h.saturating_sub(7) / 2, label, WHITE, 1, label_w - 2);
        let w = (values[i] / max * bar_area as f64).round() as u32;
        canvas.fill_rect(slot.x + label_w, slot.y, w, slot.h, fill);
    }
}

fn draw_gauge(canvas: &mut Canvas, trace: &Value, area: Rect) {
    let value = trace["value"].as_f64().unwrap_or(0.0);
    let max = trace["gauge"]["axis"]["range"][1].as_f64().unwrap_or(value);
    let bar = Rect { x: area.x, y: area.y + area.h / 2, w: area.w, h: (area.h / 5).max(4) };
    canvas.fill_rect(bar.x, bar.y, bar.w, bar.h, WHITE);
    if max > 0.0 {
        let w = (value / max).clamp(0.0, 1.0) * bar.w as f64;
        canvas.fill_rect(bar.x, bar.y, w.round() as u32, bar.h, [0, 128, 0]);
    }
    canvas.text_centered(area.x + area.w / 2, area.y + 4, &format!("{value:.2}"), WHITE, 2);
}

fn draw_heatmap(canvas: &mut Canvas, trace: &Value, area: Rect) {
    let rows: Vec<Vec<Option<f64>>> = trace["z"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|r| r.as_array().map(|c| c.iter().map(Value::as_f64).collect()).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let max = rows.iter().flatten().flatten().cloned().fold(0.0_f64, f64::max);
    for (row, band) in rows.iter().zip(stack(area, rows.len(), 1)) {
        for (cell, slot) in row.iter().zip(columns(band, row.len(), 1)) {
            let c = match cell {
                Some(v) if max > 0.0 => {
                    let t = (v / max).clamp(0.0, 1.0);
                    [(40.0 + 215.0 * t) as u8, (40.0 + 60.0 * (1.0 - t)) as u8, (120.0 * (1.0 - t)) as u8]
                }
                Some(_) => [40, 100, 120],
                None => BLACK,
            };
            canvas.fill_rect(slot.x, slot.y, slot.w, slot.h, c);
        }
    }
}

/// Every trace's `y` series as a polyline sharing one vertical scale. Points
/// are spread evenly by index so string-valued x axes need no parsing.
fn draw_lines(canvas: &mut Canvas, traces: &[Value], area: Rect, bg: Rgb) {
    let series: Vec<(Vec<f64>, Rgb)> = traces
        .iter()
        .map(|t| (numbers(&t["y"]), trace_color(t, bg)))
        .filter(|(ys, _)| !ys.is_empty())
        .collect();
    let (lo, hi) = series
        .iter()
        .flat_map(|(ys, _)| ys.iter().cloned())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if series.is_empty() {
        return;
    }
    let span = if hi > lo { hi - lo } else { 1.0 };
    canvas.fill_rect(area.x, area.y + area.h - 1, area.w, 1, SOFT_TEXT);
    for (ys, c) in &series {
        let step = if ys.len() > 1 { area.w.saturating_sub(1) as f64 / (ys.len() - 1) as f64 } else { 0.0 };
        let point = |i: usize, v: f64| {
            let x = area.x as f64 + i as f64 * step;
            let y = (area.y + area.h - 1) as f64 - (v - lo) / span * area.h.saturating_sub(1) as f64;
            (x.round() as i64, y.round() as i64)
        };
        let mut prev = None;
        for (i, v) in ys.iter().enumerate() {
            let p = point(i, *v);
            if let Some(q) = prev {
                canvas.line(q, p, *c);
            } else {
                canvas.put(p.0, p.1, *c);
            }
            prev = Some(p);
        }
    }
}

fn draw_table(canvas: &mut Canvas, table: &DataTable, area: Rect, bg: Rgb) {
    let line_h = 11;
    let cols = columns(area, table.columns.len(), 4);
    for (col, slot) in table.columns.iter().zip(&cols) {
        canvas.text_clipped(slot.x, area.y, &col.name, SOFT_TEXT, 1, slot.w);
    }
    let max_rows = (area.h / line_h).saturating_sub(1) as usize;
    for (r, row) in table.rows.iter().take(max_rows).enumerate() {
        let top = area.y + (r as u32 + 1) * line_h;
        for (col, slot) in table.columns.iter().zip(&cols) {
            let cell = row.get(&col.id).cloned().unwrap_or(Value::Null);
            if let Some(rule) = table.style_for(&col.id, &cell) {
                let fill = color(&rule.background, bg, bg);
                canvas.fill_rect(slot.x, top.saturating_sub(2), slot.w, line_h, fill);
            }
            canvas.text_clipped(slot.x, top, &DataTable::cell_text(&cell), WHITE, 1, slot.w);
        }
    }
    if table.rows.len() > max_rows && max_rows > 0 {
        let more = format!("+{} more", table.rows.len() - max_rows);
        let w = crate::export::glyphs::text_width(&more, 1);
        canvas.text(area.x + area.w.saturating_sub(w), area.y + area.h.saturating_sub(7), &more, SOFT_TEXT, 1);
    }
}

/// Marker positions projected into the card by their own bounding box.
fn draw_map(canvas: &mut Canvas, map: &MapSpec, area: Rect) {
    canvas.fill_rect(area.x, area.y, area.w, area.h, [12, 14, 18]);
    if map.markers.is_empty() {
        return;
    }
    let (mut lat_lo, mut lat_hi, mut lon_lo, mut lon_hi) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for m in &map.markers {
        lat_lo = lat_lo.min(m.position[0]);
        lat_hi = lat_hi.max(m.position[0]);
        lon_lo = lon_lo.min(m.position[1]);
        lon_hi = lon_hi.max(m.position[1]);
    }
    let lat_span = (lat_hi - lat_lo).max(1e-6);
    let lon_span = (lon_hi - lon_lo).max(1e-6);
    let inner = area.inset(6);
    let marker = color(palette::CARD_WELLS, BLACK, WHITE);
    for m in &map.markers {
        let x = inner.x as f64 + (m.position[1] - lon_lo) / lon_span * inner.w as f64;
        let y = inner.y as f64 + (lat_hi - m.position[0]) / lat_span * inner.h as f64;
        canvas.fill_rect((x as u32).saturating_sub(2), (y as u32).saturating_sub(2), 5, 5, marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardKind;
    use crate::render::{data_card, titled_card};

    fn board() -> Dashboard {
        Dashboard {
            kind: BoardKind::Trajectory,
            title: "PRODUCTION KPI's".into(),
            brand: "Acme".into(),
            last_updated: "2024-01-02 03:04:05".into(),
            timezone_label: "UTC-05:00".into(),
            filters: Vec::new(),
            sidebar: vec![data_card("Total Oil", "1,000", palette::CARD_OIL)],
            rows: vec![vec![titled_card("Empty", CardBody::Figure { figure: Figure::new(serde_json::json!({})) })]],
            side_column: Vec::new(),
            exports: true,
            footer: "Acme ©".into(),
        }
    }

    #[test]
    fn stack_divides_evenly() {
        let slots = stack(Rect { x: 0, y: 0, w: 10, h: 100 }, 3, 5);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[1].y, 35);
        assert!(slots.iter().all(|s| s.h == 30));
        assert!(stack(Rect { x: 0, y: 0, w: 1, h: 1 }, 0, 1).is_empty());
    }

    #[test]
    fn renders_full_canvas_with_header_band() {
        let canvas = render(&board());
        assert_eq!((canvas.width(), canvas.height()), (WIDTH, HEIGHT));
        assert_eq!(canvas.pixel(1, 1), Some([0x13, 0x13, 0x13]));
    }

    #[test]
    fn snapshot_is_deterministic() {
        let a = render(&board());
        let b = render(&board());
        assert_eq!(a.rgb(), b.rgb());
    }
}
