use tracing::{debug, warn};

use crate::chart::{cumulative_cases, daily_cases, Figure};
use crate::error::DashboardError;
use crate::query::series_for_country;
use crate::record::{CaseRecord, CountryCatalog};

/// The one inbound UI event: a country picked from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySelected(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct CountryCharts {
    pub daily: Figure,
    pub cumulative: Figure,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Idle,
    Recomputing,
}

pub fn country_charts(cases: &[CaseRecord], country: &str) -> (Figure, Figure) {
    let series = series_for_country(cases, country);
    (daily_cases(&series), cumulative_cases(&series))
}

/// Maps selection events to the per-country chart pair.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: ControllerState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always `Idle` between calls: `Recomputing` is held only while `handle`
    /// runs, and `handle` takes `&mut self` and returns once both charts exist.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn handle(
        &mut self,
        cases: &[CaseRecord],
        catalog: &CountryCatalog,
        event: &CountrySelected,
    ) -> CountryCharts {
        self.state = ControllerState::Recomputing;
        let CountrySelected(country) = event;

        if let Err(e) = check_selection(catalog, country) {
            warn!("{}, rendering empty charts", e);
        }
        let (daily, cumulative) = country_charts(cases, country);
        debug!(country = country.as_str(), "country charts rebuilt");

        self.state = ControllerState::Idle;
        CountryCharts { daily, cumulative }
    }
}

fn check_selection(catalog: &CountryCatalog, country: &str) -> Result<(), DashboardError> {
    if catalog.contains(country) {
        Ok(())
    } else {
        Err(DashboardError::EmptySelection(country.to_string()))
    }
}
