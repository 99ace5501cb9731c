use serde::{Deserialize, Serialize};

use crate::render::chart::Figure;
use crate::render::map::MapSpec;
use crate::render::palette;
use crate::render::table::DataTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardBody {
    Figure { figure: Figure },
    Table { table: DataTable },
    Map { map: MapSpec },
    Metric { value: String, color: String },
    Frame { src: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub background: String,
    pub body: CardBody,
}

impl Card {
    pub fn with_background(mut self, background: &str) -> Self {
        self.background = background.to_string();
        self
    }

    pub fn figure(&self) -> Option<&Figure> {
        match &self.body {
            CardBody::Figure { figure } => Some(figure),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&DataTable> {
        match &self.body {
            CardBody::Table { table } => Some(table),
            _ => None,
        }
    }

    pub fn metric(&self) -> Option<&str> {
        match &self.body {
            CardBody::Metric { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A titled panel around any body.
pub fn titled_card(title: &str, body: CardBody) -> Card {
    Card {
        id: slug(title),
        title: title.to_string(),
        background: palette::CARD_BG.to_string(),
        body,
    }
}

/// A KPI number in a large coloured font under its title.
pub fn data_card(title: &str, value: &str, color: &str) -> Card {
    titled_card(
        title,
        CardBody::Metric { value: value.to_string(), color: color.trim().to_string() },
    )
}

/// `Top 5 lowest gas production` -> `top-5-lowest-gas-production`
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slug("Top 5 lowest gas production"), "top-5-lowest-gas-production");
        assert_eq!(slug("Oil/Gas/Water Proportion"), "oil-gas-water-proportion");
        assert_eq!(slug("Average Hours/Day "), "average-hours-day");
    }

    #[test]
    fn data_card_trims_colour() {
        let card = data_card("Average Caudal", "12.00", " #CC9900");
        assert_eq!(card.metric(), Some("12.00"));
        assert!(matches!(card.body, CardBody::Metric { ref color, .. } if color == "#CC9900"));
        assert_eq!(card.background, palette::CARD_BG);
    }
}
