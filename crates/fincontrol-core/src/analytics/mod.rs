pub mod charts;
pub mod kpi;
pub mod ratios;
pub mod view;

pub use view::{apply_view, latest_record, DashboardView, TimeWindow, ViewConfig};
