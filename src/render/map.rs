use serde::{Deserialize, Serialize};

use crate::model::WellTotals;
use crate::render::chart::{pie, Figure};
use crate::render::palette;

pub const MAP_CENTER: [f64; 2] = [5.533995902516049, -73.35830183000226];
pub const MAP_ZOOM: f64 = 6.49;
pub const DARK_TILES: &str = "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png";
pub const ICON_SIZE: [u32; 2] = [45, 45];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: [f64; 2],
    pub icon_url: String,
    pub icon_size: [u32; 2],
    pub tooltip: String,
    /// Gas/oil/water pie shown when the marker is clicked
    pub popup: Figure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    pub center: [f64; 2],
    pub zoom: f64,
    pub tile_url: String,
    pub markers: Vec<Marker>,
}

/// One marker per located well, iconed by lift system.
pub fn wells_map(wells: &[WellTotals]) -> MapSpec {
    let markers = wells
        .iter()
        .map(|w| Marker {
            position: [w.latitude, w.longitude],
            icon_url: palette::lift_icon(w.lift_system.as_deref()).to_string(),
            icon_size: ICON_SIZE,
            tooltip: tooltip(w),
            popup: pie(&["Gas", "Oil", "Water"], &[w.gas, w.oil, w.water], &palette::PIE_COLORS, true),
        })
        .collect();
    MapSpec {
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        tile_url: DARK_TILES.to_string(),
        markers,
    }
}

fn tooltip(w: &WellTotals) -> String {
    format!("*UWI: {}, *Purpose: {}", w.uwi, w.purpose.as_deref().unwrap_or("None"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_icon_and_tooltip() {
        let wells = vec![WellTotals {
            well_id: "x".into(),
            uwi: "Well004".into(),
            gas: 1.0,
            oil: 2.0,
            water: 3.0,
            latitude: 5.2,
            longitude: -73.4,
            lift_system: Some("PCP".into()),
            purpose: Some("Producer".into()),
        }];
        let map = wells_map(&wells);
        assert_eq!(map.center, MAP_CENTER);
        assert_eq!(map.markers.len(), 1);
        let m = &map.markers[0];
        assert_eq!(m.icon_url, "assets/PCP.png");
        assert_eq!(m.tooltip, "*UWI: Well004, *Purpose: Producer");
        assert_eq!(m.position, [5.2, -73.4]);
        assert_eq!(m.popup.trace_count(), 1);
    }
}
