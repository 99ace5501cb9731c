//! Presentation specs: Plotly figures, Leaflet maps, tables and cards, and the
//! page that lays them out.

pub mod card;
pub mod chart;
pub mod map;
pub mod page;
pub mod palette;
pub mod table;

pub use card::{data_card, titled_card, Card, CardBody};
pub use chart::Figure;
pub use map::MapSpec;
pub use page::{render_html, style_css, Dashboard, Filter};
pub use table::{CellRule, Condition, DataTable};
