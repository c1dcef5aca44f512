//! Data layer of a COVID-19 dashboard: loads the WHO case and vaccination
//! CSVs, derives the views each chart needs and describes the charts as
//! Plotly figures.

pub mod chart;
mod config;
mod controller;
mod dashboard;
mod error;
mod fetcher;
mod load;
pub mod query;
mod record;

pub use chart::Figure;
pub use config::DashboardConfig;
pub use controller::{
    country_charts, ControllerState, CountryCharts, CountrySelected, InteractionController,
};
pub use dashboard::{load_cases, load_vaccinations, Dashboard, InitialView, Overview};
pub use error::{DashboardError, Result};
pub use fetcher::{retrieve_data, Fetch, Source};
pub use load::{load_csv, DataSet};
pub use query::{latest_snapshot, series_for_country, top_n, SeriesPoint, Snapshot};
pub use record::{
    CaseRecord, CaseTable, CountryCatalog, Metric, VaccinationRecord, VaccinationTable,
};
