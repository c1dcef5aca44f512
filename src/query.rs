use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::record::{CaseRecord, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub new_cases: i64,
    pub cumulative_cases: i64,
}

/// Records sharing the most recent report date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<'a> {
    pub date: NaiveDate,
    pub records: Vec<&'a CaseRecord>,
}

/// Rows for `country` in source order. Unknown countries yield an empty series.
pub fn series_for_country(records: &[CaseRecord], country: &str) -> Vec<SeriesPoint> {
    let series: Vec<SeriesPoint> = records
        .iter()
        .filter(|r| r.country == country)
        .map(|r| SeriesPoint {
            date: r.report_date,
            new_cases: r.new_cases,
            cumulative_cases: r.cumulative_cases,
        })
        .collect();
    debug!(country, points = series.len(), "series for country");
    series
}

pub fn latest_report_date(records: &[CaseRecord]) -> Option<NaiveDate> {
    records.iter().map(|r| r.report_date).max()
}

/// Every country's record on the latest report date, first occurrence per country.
///
/// The latest date is the maximum over the whole input, so the result does not
/// depend on the input being sorted by date.
pub fn latest_snapshot(records: &[CaseRecord]) -> Option<Snapshot<'_>> {
    let date = latest_report_date(records)?;
    let mut seen = HashSet::new();
    let latest: Vec<&CaseRecord> = records
        .iter()
        .filter(|r| r.report_date == date && seen.insert(r.country.as_str()))
        .collect();
    debug!(%date, countries = latest.len(), "latest snapshot");
    Some(Snapshot {
        date,
        records: latest,
    })
}

pub fn resolve_metric<T: Metric>(metric: &str) -> Result<&'static str> {
    T::METRICS
        .iter()
        .copied()
        .find(|m| m.eq_ignore_ascii_case(metric.trim()))
        .ok_or_else(|| DashboardError::UnknownMetric(metric.to_string()))
}

/// The `n` records with the largest `metric`, descending.
///
/// The sort is stable: equal values keep their input order. Records that do
/// not report the metric are left out.
pub fn top_n<'a, T, I>(records: I, metric: &str, n: usize) -> Result<Vec<&'a T>>
where
    T: Metric + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let metric = resolve_metric::<T>(metric)?;
    let mut ranked: Vec<(i64, &'a T)> = records
        .into_iter()
        .filter_map(|r| r.metric(metric).map(|v| (v, r)))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(ranked.into_iter().take(n).map(|(_, r)| r).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VaccinationRecord;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn case(country: &str, d: u32, new_cases: i64, cumulative_cases: i64) -> CaseRecord {
        CaseRecord {
            country: country.to_string(),
            country_code: country[..2].to_uppercase(),
            who_region: "EURO".to_string(),
            report_date: day(d),
            new_cases,
            cumulative_cases,
            new_deaths: new_cases / 10,
            cumulative_deaths: cumulative_cases / 10,
        }
    }

    fn records() -> Vec<CaseRecord> {
        vec![
            case("Belgium", 1, 100, 1000),
            case("France", 1, 300, 5000),
            case("Belgium", 2, 150, 1150),
            case("France", 2, 200, 5200),
            case("Germany", 2, 200, 7000),
        ]
    }

    #[test]
    fn series_keeps_source_order() {
        let series = series_for_country(&records(), "Belgium");
        assert_eq!(
            series,
            vec![
                SeriesPoint { date: day(1), new_cases: 100, cumulative_cases: 1000 },
                SeriesPoint { date: day(2), new_cases: 150, cumulative_cases: 1150 },
            ]
        );
    }

    #[test]
    fn series_matches_only_the_country() {
        let records = records();
        for country in ["Belgium", "France", "Germany"] {
            let expected = records.iter().filter(|r| r.country == country).count();
            assert_eq!(series_for_country(&records, country).len(), expected);
        }
        // no substring or case folding
        assert!(series_for_country(&records, "belgium").is_empty());
    }

    #[test]
    fn series_for_unknown_country_is_empty() {
        assert!(series_for_country(&records(), "Atlantis").is_empty());
        assert!(series_for_country(&[], "Belgium").is_empty());
    }

    #[test]
    fn snapshot_uses_max_date_not_last_row() {
        let mut records = records();
        // last row in load order is older than the real latest date
        records.push(case("Italy", 1, 50, 900));
        let snapshot = latest_snapshot(&records).unwrap();
        assert_eq!(snapshot.date, day(2));
        let countries: Vec<&str> = snapshot.records.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, ["Belgium", "France", "Germany"]);
    }

    #[test]
    fn snapshot_has_one_row_per_country() {
        let mut records = records();
        records.push(case("France", 2, 1, 1));
        let snapshot = latest_snapshot(&records).unwrap();
        assert_eq!(snapshot.records.len(), 3);
        let france = snapshot.records.iter().find(|r| r.country == "France").unwrap();
        assert_eq!(france.new_cases, 200);
    }

    #[test]
    fn snapshot_of_nothing() {
        assert!(latest_snapshot(&[]).is_none());
    }

    #[test]
    fn top_n_sorted_descending() {
        let records = records();
        let top = top_n(&records, "new_cases", 10).unwrap();
        assert_eq!(top.len(), records.len());
        assert!(top.windows(2).all(|w| w[0].new_cases >= w[1].new_cases));

        let top = top_n(&records, "New_cases", 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].new_cases, 300);
    }

    #[test]
    fn top_n_ties_keep_input_order() {
        let records = records();
        let top = top_n(&records, "new_cases", 3).unwrap();
        let picked: Vec<(&str, i64)> = top.iter().map(|r| (r.country.as_str(), r.new_cases)).collect();
        assert_eq!(picked, [("France", 300), ("France", 200), ("Germany", 200)]);
    }

    #[test]
    fn top_n_unknown_metric() {
        let err = top_n(&records(), "hospitalized", 10).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownMetric(m) if m == "hospitalized"));
    }

    #[test]
    fn top_n_over_snapshot() {
        let records = records();
        let snapshot = latest_snapshot(&records).unwrap();
        let top = top_n(snapshot.records.iter().copied(), "cumulative_cases", 1).unwrap();
        assert_eq!(top[0].country, "Germany");
    }

    #[test]
    fn top_n_skips_unreported_values() {
        let vaccinated = |country: &str, fully: Option<i64>| VaccinationRecord {
            country: country.to_string(),
            iso3: None,
            who_region: None,
            date_updated: None,
            total_vaccinations: None,
            persons_vaccinated_1plus_dose: None,
            persons_fully_vaccinated: fully,
        };
        let records = vec![
            vaccinated("Belgium", Some(9)),
            vaccinated("Eritrea", None),
            vaccinated("India", Some(900)),
        ];
        let top = top_n(&records, "PERSONS_FULLY_VACCINATED", 10).unwrap();
        let countries: Vec<&str> = top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, ["India", "Belgium"]);
        assert!(top_n(&records, "new_cases", 10).is_err());
    }
}
