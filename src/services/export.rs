use std::str::FromStr;

use chrono::SecondsFormat;
use quick_xml::se::Serializer as XmlSerializer;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::{metrics::EXPORTS_COUNTER, queries::LATEST_LIMIT, ServiceError};
use crate::{models::query::WeatherQuery, AppState};

const CSV_HEADER: [&str; 8] = [
    "id",
    "locationInput",
    "normalizedName",
    "lat",
    "lon",
    "dateFrom",
    "dateTo",
    "snapshotsCount",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Xml,
    Csv,
    Markdown,
}

impl FromStr for ExportFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "csv" => Ok(Self::Csv),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(ServiceError::UnsupportedFormat),
        }
    }
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Csv => "text/csv",
            Self::Markdown => "text/markdown",
        }
    }

    pub fn render(&self, items: &[WeatherQuery]) -> anyhow::Result<String> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(items)?),
            Self::Xml => render_xml(items),
            Self::Csv => render_csv(items),
            Self::Markdown => Ok(render_markdown(items)),
        }
    }
}

#[derive(Serialize)]
struct XmlQueries<'a> {
    query: &'a [WeatherQuery],
}

fn render_xml(items: &[WeatherQuery]) -> anyhow::Result<String> {
    let mut out = String::new();
    let mut ser = XmlSerializer::with_root(&mut out, Some("queries"))?;
    ser.indent(' ', 2);
    XmlQueries { query: items }.serialize(ser)?;
    Ok(out)
}

fn render_csv(items: &[WeatherQuery]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for q in items {
        wtr.write_record([
            q.id.to_string(),
            q.location_input.clone(),
            q.normalized_location.name.clone(),
            q.normalized_location.lat.to_string(),
            q.normalized_location.lon.to_string(),
            q.date_from.to_rfc3339_opts(SecondsFormat::Millis, true),
            q.date_to.to_rfc3339_opts(SecondsFormat::Millis, true),
            q.snapshots.len().to_string(),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Tabled)]
struct MarkdownRow {
    id: String,
    location: String,
    #[tabled(rename = "dateFrom")]
    date_from: String,
    #[tabled(rename = "dateTo")]
    date_to: String,
    snapshots: usize,
}

fn render_markdown(items: &[WeatherQuery]) -> String {
    let rows = items.iter().map(|q| MarkdownRow {
        id: q.id.to_string(),
        location: if q.normalized_location.name.is_empty() {
            q.location_input.clone()
        } else {
            q.normalized_location.name.clone()
        },
        date_from: q.date_from.format("%Y-%m-%d").to_string(),
        date_to: q.date_to.format("%Y-%m-%d").to_string(),
        snapshots: q.snapshots.len(),
    });
    Table::new(rows).with(Style::markdown()).to_string()
}

pub struct ExportService;

impl ExportService {
    /// Render the latest saved queries. The format is checked before the
    /// store is read.
    pub async fn export(
        state: &AppState,
        format: &str,
    ) -> Result<(ExportFormat, String), ServiceError> {
        let format: ExportFormat = format.parse()?;
        let items = state
            .store
            .latest(LATEST_LIMIT)
            .await
            .map_err(ServiceError::Store)?;
        let body = format.render(&items).map_err(ServiceError::Internal)?;

        EXPORTS_COUNTER.with_label_values(&[format.as_str()]).inc();
        tracing::info!("Exported {} queries as {}", items.len(), format.as_str());
        Ok((format, body))
    }
}
