use serde::Deserialize;
use tracing::warn;

const DEFAULT_CASES_SOURCE: &str = "./data/WHO-COVID-19-global-data.csv";
const DEFAULT_VACCINATION_SOURCE: &str = "./data/vaccination-data.csv";
const DEFAULT_COUNTRY: &str = "Belgium";
const DEFAULT_TOP_N: usize = 10;

/// Where the datasets live and how the dashboard behaves.
///
/// Sources are plain paths, `file://` URLs or `http(s)://` URLs, e.g.
/// `https://covid19.who.int/WHO-COVID-19-global-data.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub cases_source: String,
    pub vaccination_source: String,
    pub default_country: String,
    pub top_n: usize,
    /// Re-fetch the case table on every country selection.
    pub reload_on_select: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cases_source: DEFAULT_CASES_SOURCE.to_string(),
            vaccination_source: DEFAULT_VACCINATION_SOURCE.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
            top_n: DEFAULT_TOP_N,
            reload_on_select: false,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `COVID_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("COVID_CASES_SOURCE") {
            self.cases_source = v;
        }
        if let Some(v) = lookup("COVID_VACCINATION_SOURCE") {
            self.vaccination_source = v;
        }
        if let Some(v) = lookup("COVID_DEFAULT_COUNTRY") {
            self.default_country = v;
        }
        if let Some(v) = lookup("COVID_TOP_N") {
            match v.trim().parse() {
                Ok(n) => self.top_n = n,
                Err(e) => warn!("ignoring COVID_TOP_N={}: {}", v, e),
            }
        }
        if let Some(v) = lookup("COVID_RELOAD_ON_SELECT") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.reload_on_select = true,
                "0" | "false" | "no" => self.reload_on_select = false,
                _ => warn!("ignoring COVID_RELOAD_ON_SELECT={}", v),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("COVID_CASES_SOURCE", "https://covid19.who.int/WHO-COVID-19-global-data.csv"),
            ("COVID_TOP_N", "5"),
            ("COVID_RELOAD_ON_SELECT", "yes"),
        ]
        .into_iter()
        .collect();
        let config = DashboardConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.cases_source, "https://covid19.who.int/WHO-COVID-19-global-data.csv");
        assert_eq!(config.vaccination_source, DEFAULT_VACCINATION_SOURCE);
        assert_eq!(config.top_n, 5);
        assert!(config.reload_on_select);
    }

    #[test]
    fn bad_values_are_ignored() {
        let config = DashboardConfig::default().with_overrides(|k| match k {
            "COVID_TOP_N" => Some("ten".to_string()),
            "COVID_RELOAD_ON_SELECT" => Some("maybe".to_string()),
            _ => None,
        });
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"default_country": "France", "top_n": 3}"#).unwrap();
        assert_eq!(config.default_country, "France");
        assert_eq!(config.top_n, 3);
        assert_eq!(config.cases_source, DEFAULT_CASES_SOURCE);
    }
}
