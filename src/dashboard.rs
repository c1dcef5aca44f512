use tracing::{info, instrument, warn};

use crate::chart::{geo_summary, top_countries, Figure};
use crate::config::DashboardConfig;
use crate::controller::{CountryCharts, CountrySelected, InteractionController};
use crate::error::Result;
use crate::fetcher::retrieve_data;
use crate::query::latest_snapshot;
use crate::record::{CaseTable, CountryCatalog, VaccinationTable};

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub geo_summary: Figure,
    pub top_countries: Figure,
}

/// Everything the page shows on first render.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialView {
    pub overview: Overview,
    pub country: String,
    pub charts: CountryCharts,
}

/// Loaded datasets plus the controller that serves selection events.
///
/// Owned by whoever hosts the page; handlers get it passed in instead of
/// reading process-wide state.
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    cases: CaseTable,
    vaccinations: VaccinationTable,
    catalog: CountryCatalog,
    controller: InteractionController,
}

pub async fn load_cases(source: &str) -> Result<CaseTable> {
    info!("retrieving case data from source: {}", source);
    CaseTable::from_csv(source, retrieve_data(source).await?)
}

pub async fn load_vaccinations(source: &str) -> Result<VaccinationTable> {
    info!("retrieving vaccination data from source: {}", source);
    VaccinationTable::from_csv(source, retrieve_data(source).await?)
}

async fn load_tables(config: &DashboardConfig) -> Result<(CaseTable, VaccinationTable)> {
    let cases = load_cases(&config.cases_source).await?;
    let vaccinations = load_vaccinations(&config.vaccination_source).await?;
    Ok((cases, vaccinations))
}

impl Dashboard {
    /// Load both datasets. Failing here means there is nothing to show.
    pub async fn load(config: DashboardConfig) -> Result<Self> {
        let (cases, vaccinations) = load_tables(&config).await?;
        Ok(Self::from_tables(config, cases, vaccinations))
    }

    pub fn from_tables(
        config: DashboardConfig,
        cases: CaseTable,
        vaccinations: VaccinationTable,
    ) -> Self {
        let catalog = CountryCatalog::from_cases(&cases);
        info!(countries = catalog.len(), "country catalog built");
        Self {
            config,
            cases,
            vaccinations,
            catalog,
            controller: InteractionController::new(),
        }
    }

    /// Reload both datasets. On error the previous data stays in place.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<()> {
        match load_tables(&self.config).await {
            Ok((cases, vaccinations)) => {
                self.catalog = CountryCatalog::from_cases(&cases);
                self.cases = cases;
                self.vaccinations = vaccinations;
                info!(countries = self.catalog.len(), "dashboard refreshed");
                Ok(())
            }
            Err(e) => {
                warn!("refresh failed, keeping previous data: {}", e);
                Err(e)
            }
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cases(&self) -> &CaseTable {
        &self.cases
    }

    pub fn vaccinations(&self) -> &VaccinationTable {
        &self.vaccinations
    }

    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    pub fn overview(&self) -> Result<Overview> {
        let snapshot = latest_snapshot(&self.cases);
        Ok(Overview {
            geo_summary: geo_summary(snapshot.as_ref()),
            top_countries: top_countries(snapshot.as_ref(), &self.vaccinations, self.config.top_n)?,
        })
    }

    /// With `reload_on_select` the case table is fetched again first; if that
    /// fails the error is returned and the loaded table is kept.
    pub async fn select_country(&mut self, country: &str) -> Result<CountryCharts> {
        if self.config.reload_on_select {
            let cases = load_cases(&self.config.cases_source).await?;
            self.catalog = CountryCatalog::from_cases(&cases);
            self.cases = cases;
        }
        let event = CountrySelected(country.to_string());
        Ok(self.controller.handle(&self.cases, &self.catalog, &event))
    }

    pub async fn initial_view(&mut self) -> Result<InitialView> {
        let overview = self.overview()?;
        let country = self.config.default_country.clone();
        let charts = self.select_country(&country).await?;
        Ok(InitialView {
            overview,
            country,
            charts,
        })
    }
}
