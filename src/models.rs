//! Data models for the dashboard.
//!
//! This module contains the record type loaded from the dataset document,
//! the aggregation result types and the chart/table values handed to the
//! rendering collaborators.

use crate::analysis::leading_number;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// One observation (a single newborn reading).
///
/// Every field is absence-tolerant: a missing key, `null` or a value of an
/// unexpected JSON type all deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identifier. Not unique across the dataset.
    #[serde(rename = "baby_id", alias = "id", default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    /// Date/time label, unvalidated.
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    /// Open gender category.
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    /// Temperature in degrees Celsius, kept in its textual form.
    #[serde(
        rename = "temperature_c",
        alias = "temperature",
        default,
        deserialize_with = "lenient_text"
    )]
    pub temperature: Option<String>,
    /// Open risk category.
    #[serde(
        rename = "predicted_risk_label",
        alias = "risk_label",
        default,
        deserialize_with = "lenient_text"
    )]
    pub risk_label: Option<String>,
}

/// The full ordered collection of records for one run.
pub type Dataset = Vec<Record>;

/// Category label to count, in first-seen order.
pub type GroupCounts = IndexMap<String, usize>;

/// Category label to arithmetic mean, in first-seen order.
pub type AverageByGroup = IndexMap<String, f64>;

/// Accept strings, numbers and booleans as text; anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

impl Record {
    /// Leading numeric prefix of the temperature, `None` if absent or
    /// unparseable.
    pub fn temperature_value(&self) -> Option<f64> {
        self.temperature.as_deref().and_then(leading_number)
    }
}

/// Kind of chart handed to the chart presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Doughnut,
    Bar,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Pie => write!(f, "pie"),
            ChartKind::Doughnut => write!(f, "doughnut"),
            ChartKind::Bar => write!(f, "bar"),
        }
    }
}

/// Everything a chart presenter needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Stable element identifier (e.g. `riskChart`).
    pub id: String,
    /// Chart kind.
    pub kind: ChartKind,
    /// Optional heading shown above the chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Axis or slice labels.
    pub labels: Vec<String>,
    /// One value per label.
    pub series: Vec<f64>,
    /// One color per label.
    pub colors: Vec<String>,
    /// Optional slice border color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

/// Three-way color classification of a risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTone {
    Red,
    Yellow,
    Green,
}

impl RiskTone {
    /// Classify a risk label: `high` → red, `medium` → yellow, anything
    /// else (including an absent label) → green.
    pub fn classify(label: Option<&str>, high: &str, medium: &str) -> Self {
        match label {
            Some(l) if l == high => RiskTone::Red,
            Some(l) if l == medium => RiskTone::Yellow,
            _ => RiskTone::Green,
        }
    }

    /// Returns an emoji representation of the tone.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskTone::Red => "🔴",
            RiskTone::Yellow => "🟡",
            RiskTone::Green => "🟢",
        }
    }
}

impl fmt::Display for RiskTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTone::Red => write!(f, "red"),
            RiskTone::Yellow => write!(f, "yellow"),
            RiskTone::Green => write!(f, "green"),
        }
    }
}

/// One row of the recent-records table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: Option<String>,
    pub date: Option<String>,
    pub gender: Option<String>,
    /// Temperature rounded to one decimal place, `None` if unparseable.
    pub temperature: Option<f64>,
    pub risk_label: Option<String>,
    pub tone: RiskTone,
}

impl TableRow {
    /// Temperature formatted with one decimal place.
    pub fn temperature_display(&self) -> String {
        match self.temperature {
            Some(t) => format!("{:.1}", t),
            None => "n/a".to_string(),
        }
    }
}

/// Metadata about a generated dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path or URL the dataset was loaded from.
    pub source: String,
    /// Date and time of generation.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the dataset.
    pub record_count: usize,
    /// Duration of load and render in seconds.
    pub duration_seconds: f64,
}

/// A fully rendered dashboard: the charts drawn and the rows appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Page heading.
    pub title: String,
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// Charts in draw order.
    pub charts: Vec<ChartConfig>,
    /// Table rows in append order.
    pub rows: Vec<TableRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_source_field_names() {
        let json = r#"{"baby_id":"B1","date":"2024-01-01","gender":"Male",
            "temperature_c":"36.6","predicted_risk_label":"Low","weight_kg":"3.1"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("B1"));
        assert_eq!(record.gender.as_deref(), Some("Male"));
        assert_eq!(record.temperature.as_deref(), Some("36.6"));
        assert_eq!(record.risk_label.as_deref(), Some("Low"));
    }

    #[test]
    fn test_record_aliases_and_absent_fields() {
        let json = r#"{"id":7,"temperature":37.25,"risk_label":null,"gender":["x"]}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("7"));
        assert_eq!(record.temperature.as_deref(), Some("37.25"));
        assert_eq!(record.risk_label, None);
        assert_eq!(record.gender, None);
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_temperature_value() {
        let mut record = Record {
            temperature: Some(" 36.55 ".to_string()),
            ..Record::default()
        };
        assert_eq!(record.temperature_value(), Some(36.55));

        record.temperature = Some("abc".to_string());
        assert_eq!(record.temperature_value(), None);

        record.temperature = Some("NaN".to_string());
        assert_eq!(record.temperature_value(), None);

        record.temperature = Some("36.5abc".to_string());
        assert_eq!(record.temperature_value(), Some(36.5));

        record.temperature = Some("37,2".to_string());
        assert_eq!(record.temperature_value(), Some(37.0));
    }

    #[test]
    fn test_risk_tone_classify() {
        assert_eq!(RiskTone::classify(Some("High"), "High", "Medium"), RiskTone::Red);
        assert_eq!(RiskTone::classify(Some("Medium"), "High", "Medium"), RiskTone::Yellow);
        assert_eq!(RiskTone::classify(Some("Low"), "High", "Medium"), RiskTone::Green);
        assert_eq!(RiskTone::classify(Some("Unknown"), "High", "Medium"), RiskTone::Green);
        assert_eq!(RiskTone::classify(None, "High", "Medium"), RiskTone::Green);
        assert_eq!(RiskTone::classify(Some("high"), "High", "Medium"), RiskTone::Green);
    }

    #[test]
    fn test_temperature_display() {
        let row = TableRow {
            id: None,
            date: None,
            gender: None,
            temperature: Some(36.66),
            risk_label: None,
            tone: RiskTone::Green,
        };
        assert_eq!(row.temperature_display(), "36.7");
        assert_eq!(
            TableRow { temperature: None, ..row }.temperature_display(),
            "n/a"
        );
    }

    #[test]
    fn test_chart_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChartKind::Doughnut).unwrap(), "\"doughnut\"");
        assert_eq!(ChartKind::Bar.to_string(), "bar");
    }
}
