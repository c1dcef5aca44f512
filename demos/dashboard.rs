use anyhow::{Context, Result};
use covid_dashboard::{Dashboard, DashboardConfig};

// COVID_CASES_SOURCE=https://covid19.who.int/WHO-COVID-19-global-data.csv \
// COVID_VACCINATION_SOURCE=https://covid19.who.int/who-data/vaccination-data.csv \
// cargo run --example dashboard
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = DashboardConfig::from_env();
    let mut dashboard = Dashboard::load(config)
        .await
        .context("loading dashboard data")?;

    let view = dashboard.initial_view().await?;
    println!(
        "{}",
        serde_json::json!({
            "countries": dashboard.catalog().names(),
            "selected": view.country,
            "geo_summary": view.overview.geo_summary,
            "top_countries": view.overview.top_countries,
            "daily_cases": view.charts.daily,
            "cum_cases": view.charts.cumulative,
        })
    );

    Ok(())
}
