use std::collections::BTreeSet;
use std::ops::Deref;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::load::{load_csv, DataSet};

/// Numeric fields a record can be ranked by.
pub trait Metric {
    /// Canonical metric names, lower case.
    const METRICS: &'static [&'static str];

    /// Value of `metric`, `None` when not reported. `metric` is one of [`Metric::METRICS`].
    fn metric(&self, metric: &str) -> Option<i64>;
}

/// One row of the WHO daily case report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRecord {
    pub country: String,
    pub country_code: String,
    pub who_region: String,
    pub report_date: NaiveDate,
    pub new_cases: i64,
    pub cumulative_cases: i64,
    pub new_deaths: i64,
    pub cumulative_deaths: i64,
}

impl Metric for CaseRecord {
    const METRICS: &'static [&'static str] =
        &["new_cases", "cumulative_cases", "new_deaths", "cumulative_deaths"];

    fn metric(&self, metric: &str) -> Option<i64> {
        match metric {
            "new_cases" => Some(self.new_cases),
            "cumulative_cases" => Some(self.cumulative_cases),
            "new_deaths" => Some(self.new_deaths),
            "cumulative_deaths" => Some(self.cumulative_deaths),
            _ => None,
        }
    }
}

/// One row of the WHO vaccination snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaccinationRecord {
    pub country: String,
    pub iso3: Option<String>,
    pub who_region: Option<String>,
    pub date_updated: Option<NaiveDate>,
    pub total_vaccinations: Option<i64>,
    pub persons_vaccinated_1plus_dose: Option<i64>,
    pub persons_fully_vaccinated: Option<i64>,
}

impl Metric for VaccinationRecord {
    const METRICS: &'static [&'static str] = &[
        "persons_fully_vaccinated",
        "total_vaccinations",
        "persons_vaccinated_1plus_dose",
    ];

    fn metric(&self, metric: &str) -> Option<i64> {
        match metric {
            "persons_fully_vaccinated" => self.persons_fully_vaccinated,
            "total_vaccinations" => self.total_vaccinations,
            "persons_vaccinated_1plus_dose" => self.persons_vaccinated_1plus_dose,
            _ => None,
        }
    }
}

const CASE_COLUMNS: [&str; 8] = [
    "Date_reported",
    "Country_code",
    "Country",
    "WHO_region",
    "New_cases",
    "Cumulative_cases",
    "New_deaths",
    "Cumulative_deaths",
];

/// Case records in load order.
#[derive(Debug, Clone, Default)]
pub struct CaseTable(Vec<CaseRecord>);

impl Deref for CaseTable {
    type Target = [CaseRecord];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<CaseRecord>> for CaseTable {
    fn from(records: Vec<CaseRecord>) -> Self {
        Self(records)
    }
}

impl CaseTable {
    pub fn from_csv(source_name: &str, data: String) -> Result<Self> {
        Self::from_dataset(&load_csv(source_name, data)?)
    }

    pub fn from_dataset(ds: &DataSet) -> Result<Self> {
        ds.require(&CASE_COLUMNS)?;

        let dates = ds.text_column("Date_reported")?;
        let codes = ds.text_column("Country_code")?;
        let countries = ds.text_column("Country")?;
        let regions = ds.text_column("WHO_region")?;
        let new_cases = ds.int_column("New_cases")?;
        let cumulative_cases = ds.int_column("Cumulative_cases")?;
        let new_deaths = ds.int_column("New_deaths")?;
        let cumulative_deaths = ds.int_column("Cumulative_deaths")?;

        let mut records = Vec::with_capacity(ds.height());
        for (row, date) in dates.into_iter().enumerate() {
            let report_date = parse_date(date.as_deref())
                .ok_or_else(|| ds.malformed(format!("row {}: invalid Date_reported", row + 1)))?;
            let country = countries[row]
                .clone()
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| ds.malformed(format!("row {}: empty Country", row + 1)))?;
            records.push(CaseRecord {
                country,
                country_code: codes[row].clone().unwrap_or_default(),
                who_region: regions[row].clone().unwrap_or_default(),
                report_date,
                new_cases: new_cases[row].unwrap_or(0),
                cumulative_cases: cumulative_cases[row].unwrap_or(0),
                new_deaths: new_deaths[row].unwrap_or(0),
                cumulative_deaths: cumulative_deaths[row].unwrap_or(0),
            });
        }

        info!(source = ds.source_name(), records = records.len(), "loaded case records");
        Ok(Self(records))
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.0
    }
}

/// Vaccination records in load order.
#[derive(Debug, Clone, Default)]
pub struct VaccinationTable(Vec<VaccinationRecord>);

impl Deref for VaccinationTable {
    type Target = [VaccinationRecord];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<VaccinationRecord>> for VaccinationTable {
    fn from(records: Vec<VaccinationRecord>) -> Self {
        Self(records)
    }
}

impl VaccinationTable {
    pub fn from_csv(source_name: &str, data: String) -> Result<Self> {
        Self::from_dataset(&load_csv(source_name, data)?)
    }

    pub fn from_dataset(ds: &DataSet) -> Result<Self> {
        ds.require(&["COUNTRY", "PERSONS_FULLY_VACCINATED"])?;

        let countries = ds.text_column("COUNTRY")?;
        let fully = ds.int_column("PERSONS_FULLY_VACCINATED")?;
        let iso3 = ds.optional_text_column("ISO3")?;
        let regions = ds.optional_text_column("WHO_REGION")?;
        let updated = ds.optional_text_column("DATE_UPDATED")?;
        let total = ds.optional_int_column("TOTAL_VACCINATIONS")?;
        let one_dose = ds.optional_int_column("PERSONS_VACCINATED_1PLUS_DOSE")?;

        let mut records = Vec::with_capacity(ds.height());
        for (row, country) in countries.into_iter().enumerate() {
            let country = country
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| ds.malformed(format!("row {}: empty COUNTRY", row + 1)))?;
            records.push(VaccinationRecord {
                country,
                iso3: cell(&iso3, row).cloned().flatten(),
                who_region: cell(&regions, row).cloned().flatten(),
                date_updated: cell(&updated, row).and_then(|d| parse_date(d.as_deref())),
                total_vaccinations: cell(&total, row).copied().flatten(),
                persons_vaccinated_1plus_dose: cell(&one_dose, row).copied().flatten(),
                persons_fully_vaccinated: fully[row],
            });
        }

        info!(source = ds.source_name(), records = records.len(), "loaded vaccination records");
        Ok(Self(records))
    }

    pub fn records(&self) -> &[VaccinationRecord] {
        &self.0
    }
}

fn cell<T>(column: &Option<Vec<T>>, row: usize) -> Option<&T> {
    column.as_ref().and_then(|values| values.get(row))
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    // some exports carry a time component
    let day = value.split(|c: char| c == 'T' || c == ' ').next().unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Distinct country names of a case table, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountryCatalog(Vec<String>);

impl CountryCatalog {
    pub fn from_cases(cases: &[CaseRecord]) -> Self {
        let names: BTreeSet<&str> = cases.iter().map(|r| r.country.as_str()).collect();
        Self(names.into_iter().map(str::to_string).collect())
    }

    pub fn contains(&self, country: &str) -> bool {
        self.0.binary_search_by(|c| c.as_str().cmp(country)).is_ok()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    const CASES: &str = "\
Date_reported,Country_code,Country,WHO_region,New_cases,Cumulative_cases,New_deaths,Cumulative_deaths
2021-01-01,BE,Belgium,EURO,100,1000,5,50
2021-01-01,NA,Namibia,AFRO,,20,0,1
2021-01-02,BE,Belgium,EURO,150,1150,-1,49
";

    #[test]
    fn parses_case_rows() {
        let table = CaseTable::from_csv("cases.csv", CASES.to_string()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table[0],
            CaseRecord {
                country: "Belgium".into(),
                country_code: "BE".into(),
                who_region: "EURO".into(),
                report_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                new_cases: 100,
                cumulative_cases: 1000,
                new_deaths: 5,
                cumulative_deaths: 50,
            }
        );
        // empty cell loads as zero, corrections stay negative
        assert_eq!(table[1].new_cases, 0);
        assert_eq!(table[1].country_code, "NA");
        assert_eq!(table[2].new_deaths, -1);
    }

    #[test]
    fn missing_case_column_is_malformed() {
        let data = "Date_reported,Country,New_cases\n2021-01-01,Belgium,1\n";
        let err = CaseTable::from_csv("cases.csv", data.to_string()).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedData { .. }), "{:?}", err);
    }

    #[test]
    fn bad_date_is_malformed() {
        let data = CASES.replace("2021-01-02", "yesterday");
        let err = CaseTable::from_csv("cases.csv", data).unwrap_err();
        match err {
            DashboardError::MalformedData { reason, .. } => assert!(reason.contains("row 3")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_count_fails_load() {
        let data = CASES.replace("2021-01-02,BE,Belgium,EURO,150", "2021-01-02,BE,Belgium,EURO,oops");
        match CaseTable::from_csv("cases.csv", data).unwrap_err() {
            DashboardError::MalformedData { reason, .. } => {
                assert_eq!(reason, "row 3: invalid New_cases")
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let data = "COUNTRY,PERSONS_FULLY_VACCINATED\nBelgium,9000000.7\nFrance,n/a\n";
        let err = VaccinationTable::from_csv("vacc.csv", data.to_string()).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedData { .. }), "{:?}", err);
    }

    #[test]
    fn parses_vaccination_rows() {
        let data = "\
COUNTRY,ISO3,WHO_REGION,DATE_UPDATED,TOTAL_VACCINATIONS,PERSONS_FULLY_VACCINATED
Belgium,BEL,EURO,2021-12-01,20000000,9000000
Eritrea,ERI,AFRO,,,
";
        let table = VaccinationTable::from_csv("vacc.csv", data.to_string()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].persons_fully_vaccinated, Some(9_000_000));
        assert_eq!(table[0].date_updated, NaiveDate::from_ymd_opt(2021, 12, 1));
        assert_eq!(table[0].persons_vaccinated_1plus_dose, None);
        assert_eq!(table[1].persons_fully_vaccinated, None);
        assert_eq!(table[1].date_updated, None);
    }

    #[test]
    fn catalog_is_sorted_and_distinct() {
        let table = CaseTable::from_csv("cases.csv", CASES.to_string()).unwrap();
        let catalog = CountryCatalog::from_cases(&table);
        assert_eq!(catalog.names(), ["Belgium", "Namibia"]);
        assert!(catalog.contains("Namibia"));
        assert!(!catalog.contains("Atlantis"));
    }
}
