//! Full-page HTML for a dashboard.
//!
//! The page is static: every figure and map is embedded as JSON and drawn by
//! Plotly and Leaflet loaded from their CDNs. Filter widgets are rendered
//! disabled.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::BoardKind;
use crate::render::card::{Card, CardBody};
use crate::render::palette;
use crate::render::table::DataTable;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";
pub const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
pub const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
pub const FONT_CSS: &str = "https://fonts.googleapis.com/css?family=Lato";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Filter {
    Dropdown { options: Vec<String>, selected: String },
    Slider { min: u32, max: u32, step: u32, value: u32 },
    Checklist { options: Vec<String>, selected: Vec<String>, columns: u32 },
    MultiSelect { options: Vec<String> },
    TextInput { button: String, hint: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub kind: BoardKind,
    pub title: String,
    pub brand: String,
    pub last_updated: String,
    pub timezone_label: String,
    pub filters: Vec<Filter>,
    /// Left column under the filters
    pub sidebar: Vec<Card>,
    /// Rows of the centre grid
    pub rows: Vec<Vec<Card>>,
    /// Right column of KPI cards
    pub side_column: Vec<Card>,
    pub exports: bool,
    pub footer: String,
}

impl Dashboard {
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.sidebar
            .iter()
            .chain(self.rows.iter().flatten())
            .chain(self.side_column.iter())
    }

    pub fn card(&self, title: &str) -> Option<&Card> {
        self.cards().find(|c| c.title == title)
    }

    pub fn card_titles(&self) -> Vec<&str> {
        self.cards().map(|c| c.title.as_str()).collect()
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON safe to place inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

pub fn render_html(board: &Dashboard) -> String {
    let mut figures = Map::new();
    let mut maps = Map::new();
    let mut html = String::with_capacity(64 * 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{font}\">\n\
         <link rel=\"stylesheet\" href=\"{leaflet_css}\">\n\
         <link rel=\"stylesheet\" href=\"/assets/style.css\">\n\
         <script src=\"{plotly}\"></script>\n<script src=\"{leaflet}\"></script>\n\
         </head>\n<body class=\"board board-{kind}\">\n",
        title = escape(&format!("{} | {}", board.brand, board.title)),
        font = FONT_CSS,
        leaflet_css = LEAFLET_CSS,
        plotly = PLOTLY_CDN,
        leaflet = LEAFLET_JS,
        kind = board.kind.as_str(),
    );

    if board.exports {
        html.push_str("<div class=\"button-container\">");
        for (fmt, label) in [("pdf", "Export PDF"), ("pptx", "Export PPT"), ("png", "Export PNG")] {
            let _ = write!(html, "<a class=\"export-button\" id=\"btn-{fmt}\" href=\"/export/{fmt}\">{label}</a>");
        }
        html.push_str("</div>\n");
    }

    let _ = write!(
        html,
        "<header class=\"header\"><span class=\"brand\">{}</span>\
         <h1>{}</h1><div class=\"updated\">Last Updated: {} ({})</div></header>\n",
        escape(&board.brand),
        escape(&board.title),
        escape(&board.last_updated),
        escape(&board.timezone_label),
    );

    html.push_str("<main class=\"columns\">\n<aside class=\"sidebar\">\n");
    render_filters(&mut html, &board.filters);
    for card in &board.sidebar {
        render_card(&mut html, card, &mut figures, &mut maps);
    }
    html.push_str("</aside>\n<section class=\"grid\">\n");
    for row in &board.rows {
        html.push_str("<div class=\"row\">\n");
        for card in row {
            render_card(&mut html, card, &mut figures, &mut maps);
        }
        html.push_str("</div>\n");
    }
    html.push_str("</section>\n<aside class=\"kpis\">\n");
    for card in &board.side_column {
        render_card(&mut html, card, &mut figures, &mut maps);
    }
    html.push_str("</aside>\n</main>\n");

    let _ = write!(html, "<footer>{}</footer>\n", escape(&board.footer));
    let _ = write!(
        html,
        "<script>\nconst FIGURES = {};\nconst MAPS = {};\n{}</script>\n</body>\n</html>\n",
        script_json(&Value::Object(figures)),
        script_json(&Value::Object(maps)),
        BOOT_JS,
    );
    html
}

fn render_filters(html: &mut String, filters: &[Filter]) {
    if filters.is_empty() {
        return;
    }
    html.push_str("<div class=\"filters\"><h3>Filters</h3>\n");
    for f in filters {
        match f {
            Filter::Dropdown { options, selected } => {
                html.push_str("<select disabled>");
                for o in options {
                    let sel = if o == selected { " selected" } else { "" };
                    let _ = write!(html, "<option{}>{}</option>", sel, escape(o));
                }
                html.push_str("</select>\n");
            }
            Filter::Slider { min, max, step, value } => {
                let _ = write!(
                    html,
                    "<input type=\"range\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" disabled>\n"
                );
            }
            Filter::Checklist { options, selected, columns } => {
                let _ = write!(html, "<div class=\"checklist\" style=\"column-count:{columns}\">");
                for o in options {
                    let checked = if selected.contains(o) { " checked" } else { "" };
                    let _ = write!(html, "<label><input type=\"checkbox\"{} disabled>{}</label>", checked, escape(o));
                }
                html.push_str("</div>\n");
            }
            Filter::MultiSelect { options } => {
                html.push_str("<select multiple disabled>");
                for o in options {
                    let _ = write!(html, "<option selected>{}</option>", escape(o));
                }
                html.push_str("</select>\n");
            }
            Filter::TextInput { button, hint } => {
                let _ = write!(
                    html,
                    "<div><input type=\"text\" disabled><button disabled>{}</button></div><div class=\"hint\">{}</div>\n",
                    escape(button),
                    escape(hint)
                );
            }
        }
    }
    html.push_str("</div>\n");
}

fn render_card(html: &mut String, card: &Card, figures: &mut Map<String, Value>, maps: &mut Map<String, Value>) {
    let _ = write!(
        html,
        "<div class=\"card\" id=\"{id}\" style=\"background-color:{bg}\"><div class=\"card-title\">{title}</div>",
        id = escape(&card.id),
        bg = escape(&card.background),
        title = escape(&card.title),
    );
    match &card.body {
        CardBody::Figure { figure } => {
            let key = format!("fig-{}", card.id);
            let _ = write!(html, "<div class=\"plot\" id=\"{}\"></div>", escape(&key));
            figures.insert(key, json!(figure));
        }
        CardBody::Map { map } => {
            let key = format!("map-{}", card.id);
            let _ = write!(html, "<div class=\"map\" id=\"{}\"></div>", escape(&key));
            maps.insert(key, json!(map));
        }
        CardBody::Table { table } => render_table(html, table),
        CardBody::Metric { value, color } => {
            let _ = write!(
                html,
                "<div class=\"metric\" style=\"color:{}\">{}</div>",
                escape(color),
                escape(value)
            );
        }
        CardBody::Frame { src } => {
            let _ = write!(html, "<iframe class=\"frame\" src=\"{}\"></iframe>", escape(src));
        }
    }
    html.push_str("</div>\n");
}

fn render_table(html: &mut String, table: &DataTable) {
    html.push_str("<div class=\"table-wrap\"><table class=\"data-table\"><thead><tr>");
    for col in &table.columns {
        let _ = write!(html, "<th>{}</th>", escape(&col.name));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for col in &table.columns {
            let cell = row.get(&col.id).unwrap_or(&Value::Null);
            match table.style_for(&col.id, cell) {
                Some(rule) => {
                    let _ = write!(
                        html,
                        "<td style=\"background-color:{};color:{}\">{}</td>",
                        escape(&rule.background),
                        escape(&rule.color),
                        escape(&DataTable::cell_text(cell))
                    );
                }
                None => {
                    let _ = write!(html, "<td>{}</td>", escape(&DataTable::cell_text(cell)));
                }
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");
}

const BOOT_JS: &str = r#"for (const [id, fig] of Object.entries(FIGURES)) {
  Plotly.newPlot(id, fig.data, fig.layout, {displayModeBar: true});
}
for (const [id, spec] of Object.entries(MAPS)) {
  const map = L.map(id).setView(spec.center, spec.zoom);
  L.tileLayer(spec.tile_url).addTo(map);
  spec.markers.forEach((m, i) => {
    const icon = L.icon({iconUrl: '/' + m.icon_url, iconSize: m.icon_size});
    const popupId = id + '-popup-' + i;
    L.marker(m.position, {icon: icon})
      .bindTooltip(m.tooltip, {direction: 'top'})
      .bindPopup('<div id="' + popupId + '" style="width:150px;height:150px"></div>')
      .on('popupopen', () => Plotly.newPlot(popupId, m.popup.data, m.popup.layout, {displayModeBar: false}))
      .addTo(map);
  });
}
"#;

/// Stylesheet served at `/assets/style.css`.
pub fn style_css() -> String {
    format!(
        "body {{ font-family: 'Lato', sans-serif; background: {plot}; color: {text}; margin: 0; }}\n\
         .header {{ display: flex; align-items: center; background: {card}; border-radius: 7px; }}\n\
         .header .brand {{ color: #424242; font-weight: bold; }}\n\
         .header h1 {{ flex-grow: 1; font-size: 30px; font-weight: bold; text-align: center; }}\n\
         .header .updated {{ color: {muted}; font-size: 14px; font-weight: bold; }}\n\
         .columns {{ display: flex; }}\n\
         .sidebar {{ width: 17%; }}\n\
         .grid {{ display: flex; flex-direction: column; margin: 20px 0 0 30px; }}\n\
         .row {{ display: flex; gap: 30px; margin-bottom: 30px; }}\n\
         .kpis {{ width: 13%; margin: 20px 0 0 30px; }}\n\
         .filters {{ background: {card}; border-radius: 7px; padding-bottom: 10px; }}\n\
         .filters h3 {{ text-align: center; border-bottom: 1px solid {text}; padding: 10px 0; }}\n\
         .card {{ border-radius: 10px; text-align: center; margin-bottom: 30px; \
         box-shadow: 0px 0px 5px 2px rgba(255, 255, 255, 0.2); min-width: 240px; }}\n\
         .card-title {{ padding: 10px 0; border-bottom: 1px solid {text}; font-weight: bold; }}\n\
         .metric {{ padding-top: 7px; font-size: 300%; }}\n\
         .plot {{ width: 400px; height: 300px; }}\n\
         .map {{ width: 400px; height: 300px; }}\n\
         .frame {{ width: 410px; height: 460px; border: 0; transform: scale(0.75); }}\n\
         .table-wrap {{ max-height: 300px; overflow-y: auto; }}\n\
         .data-table {{ width: 400px; border-collapse: collapse; font-size: 11px; }}\n\
         .data-table th {{ background: {card}; color: {text}; text-align: center; }}\n\
         .data-table td {{ background-color: black; color: {text}; text-align: left; padding: 4px; }}\n\
         .button-container {{ display: flex; gap: 8px; }}\n\
         .export-button {{ padding: 4px 10px; background: {card}; color: {text}; text-decoration: none; }}\n\
         footer {{ text-align: center; color: {muted}; }}\n",
        plot = palette::PLOT_BG,
        text = palette::TEXT,
        card = palette::CARD_BG,
        muted = palette::MUTED,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::card::{data_card, titled_card};
    use crate::render::chart::Figure;

    fn board() -> Dashboard {
        Dashboard {
            kind: BoardKind::Kpi,
            title: "PRODUCTION KPI's".into(),
            brand: "Acme".into(),
            last_updated: "2024-01-01 00:00:00".into(),
            timezone_label: "UTC-05:00".into(),
            filters: vec![Filter::MultiSelect { options: vec!["BES".into()] }],
            sidebar: vec![],
            rows: vec![vec![titled_card(
                "Chart </script>",
                CardBody::Figure { figure: Figure::new(json!({"title": "</script>"})) },
            )]],
            side_column: vec![data_card("Producing Wells", "3", palette::CARD_WELLS)],
            exports: true,
            footer: "Acme".into(),
        }
    }

    #[test]
    fn escapes_text_and_script_json() {
        let html = render_html(&board());
        assert!(html.contains("Chart &lt;/script&gt;"));
        assert!(html.contains("<\\/script>"));
        assert_eq!(html.matches("</script>").count(), 3);
    }

    #[test]
    fn export_buttons_and_disabled_filters() {
        let html = render_html(&board());
        assert!(html.contains("href=\"/export/pptx\""));
        assert!(html.contains("<select multiple disabled>"));
        assert!(html.contains("PRODUCTION KPI&#39;s"));
    }

    #[test]
    fn card_lookup() {
        let b = board();
        assert_eq!(b.card_titles(), vec!["Chart </script>", "Producing Wells"]);
        assert_eq!(b.card("Producing Wells").and_then(|c| c.metric()), Some("3"));
    }
}
