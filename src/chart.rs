//! Declarative chart descriptions in the Plotly figure JSON schema.
//!
//! Builders here only shape query output. Nothing is computed beyond what a
//! trace needs (bubble scaling, per-region grouping).

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::query::{top_n, SeriesPoint, Snapshot};
use crate::record::VaccinationRecord;

const LINE_COLOR: &str = "firebrick";
const LINE_WIDTH: u32 = 4;
const MAX_BUBBLE_SIZE: f64 = 20.0; // px
/// Plotly's default qualitative palette.
const PALETTE: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Scattergeo(GeoTrace),
    Bar(BarTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub x: Vec<NaiveDate>,
    pub y: Vec<i64>,
    pub mode: &'static str,
    pub line: Line,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: &'static str,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoTrace {
    pub name: String,
    pub locations: Vec<String>,
    pub locationmode: &'static str,
    pub hovertext: Vec<String>,
    pub marker: Marker,
    pub legendgroup: String,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: &'static str,
    pub size: Vec<i64>,
    pub sizemode: &'static str,
    pub sizeref: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub x: Vec<String>,
    pub y: Vec<i64>,
    pub name: String,
    pub xaxis: String,
    pub yaxis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl From<&str> for Title {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geo {
    pub projection: Projection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub rows: u32,
    pub columns: u32,
    pub pattern: &'static str,
}

fn time_series_layout(title: &str) -> Layout {
    Layout {
        title: title.into(),
        xaxis: Some(Axis { title: "Dates".into() }),
        yaxis: Some(Axis { title: "Cases".into() }),
        ..Layout::default()
    }
}

fn last_updated(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "n/a".to_string(),
    }
}

pub fn daily_cases(series: &[SeriesPoint]) -> Figure {
    Figure {
        data: vec![Trace::Scatter(ScatterTrace {
            x: series.iter().map(|p| p.date).collect(),
            y: series.iter().map(|p| p.new_cases).collect(),
            mode: "lines",
            line: Line {
                color: LINE_COLOR,
                width: LINE_WIDTH,
            },
            name: Some("daily_cases".to_string()),
            fill: None,
        })],
        layout: time_series_layout("Daily cases over time"),
    }
}

pub fn cumulative_cases(series: &[SeriesPoint]) -> Figure {
    Figure {
        data: vec![Trace::Scatter(ScatterTrace {
            x: series.iter().map(|p| p.date).collect(),
            y: series.iter().map(|p| p.cumulative_cases).collect(),
            mode: "lines",
            line: Line {
                color: LINE_COLOR,
                width: LINE_WIDTH,
            },
            name: None,
            fill: Some("tozeroy"),
        })],
        layout: time_series_layout("Cumulated cases over time"),
    }
}

/// Bubble map of cumulative cases, one trace per WHO region.
pub fn geo_summary(snapshot: Option<&Snapshot<'_>>) -> Figure {
    let records = snapshot.map(|s| s.records.as_slice()).unwrap_or_default();
    let largest = records
        .iter()
        .map(|r| r.cumulative_cases)
        .max()
        .unwrap_or(0)
        .max(1);
    // area sizing: a bubble of value `largest` gets diameter MAX_BUBBLE_SIZE
    let sizeref = 2.0 * largest as f64 / (MAX_BUBBLE_SIZE * MAX_BUBBLE_SIZE);

    let mut regions: Vec<&str> = Vec::new();
    for record in records {
        if !regions.contains(&record.who_region.as_str()) {
            regions.push(&record.who_region);
        }
    }

    let data = regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let members: Vec<_> = records.iter().filter(|r| r.who_region == *region).collect();
            Trace::Scattergeo(GeoTrace {
                name: region.to_string(),
                locations: members.iter().map(|r| r.country.clone()).collect(),
                locationmode: "country names",
                hovertext: members.iter().map(|r| r.country.clone()).collect(),
                marker: Marker {
                    color: PALETTE[i % PALETTE.len()],
                    size: members.iter().map(|r| r.cumulative_cases.max(0)).collect(),
                    sizemode: "area",
                    sizeref,
                },
                legendgroup: region.to_string(),
                showlegend: true,
            })
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            title: Title {
                text: format!(
                    "Global COVID-19 Cases (Last Updated: {})",
                    last_updated(snapshot.map(|s| s.date))
                ),
            },
            geo: Some(Geo {
                projection: Projection {
                    kind: "natural earth",
                },
            }),
            ..Layout::default()
        },
    }
}

/// Three ranked bar charts stacked in one column: new cases, new deaths, fully vaccinated.
pub fn top_countries(
    snapshot: Option<&Snapshot<'_>>,
    vaccinations: &[VaccinationRecord],
    n: usize,
) -> Result<Figure> {
    let latest = snapshot.map(|s| s.records.as_slice()).unwrap_or_default();

    let cases = top_n(latest.iter().copied(), "new_cases", n)?;
    let deaths = top_n(latest.iter().copied(), "new_deaths", n)?;
    let vaccinated = top_n(vaccinations, "persons_fully_vaccinated", n)?;

    let data = vec![
        Trace::Bar(BarTrace {
            x: cases.iter().map(|r| r.country_code.clone()).collect(),
            y: cases.iter().map(|r| r.new_cases).collect(),
            name: "Confirmed Cases".to_string(),
            xaxis: "x".to_string(),
            yaxis: "y".to_string(),
        }),
        Trace::Bar(BarTrace {
            x: deaths.iter().map(|r| r.country_code.clone()).collect(),
            y: deaths.iter().map(|r| r.new_deaths).collect(),
            name: "Confirmed Deaths".to_string(),
            xaxis: "x2".to_string(),
            yaxis: "y2".to_string(),
        }),
        Trace::Bar(BarTrace {
            x: vaccinated.iter().map(|r| r.country.clone()).collect(),
            y: vaccinated
                .iter()
                .filter_map(|r| r.persons_fully_vaccinated)
                .collect(),
            name: "Fully Vaccinated".to_string(),
            xaxis: "x3".to_string(),
            yaxis: "y3".to_string(),
        }),
    ];

    Ok(Figure {
        data,
        layout: Layout {
            title: Title {
                text: format!(
                    "Top {} Countries in daily figures (Last Updated: {})",
                    n,
                    last_updated(snapshot.map(|s| s.date))
                ),
            },
            grid: Some(Grid {
                rows: 3,
                columns: 1,
                pattern: "independent",
            }),
            ..Layout::default()
        },
    })
}
