//! Chart and table construction.
//!
//! Runs the aggregations over a dataset, shapes the results into chart
//! configs and table rows, and drives the presenters.

use crate::analysis::{
    align_counts, average_numeric_by_group, count_by_field, partition_by_category, union_labels,
};
use crate::config::{DashboardConfig, Palette};
use crate::dashboard::presenter::{ChartPresenter, TableRenderer};
use crate::loader::LoadError;
use crate::models::{ChartConfig, ChartKind, GroupCounts, Record, RiskTone, TableRow};
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, error, info};

/// Result of one load-and-render sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Everything was rendered.
    Rendered {
        records: usize,
        charts: usize,
        rows: usize,
    },
    /// The dataset could not be loaded; nothing was rendered.
    LoadFailed,
}

fn gender(r: &Record) -> Option<&str> {
    r.gender.as_deref()
}

fn risk(r: &Record) -> Option<&str> {
    r.risk_label.as_deref()
}

fn temperature(r: &Record) -> Option<&str> {
    r.temperature.as_deref()
}

/// Border color of a per-gender risk chart.
fn gender_border(category: &str) -> Option<String> {
    match category {
        "Male" => Some("#1d4ed8".to_string()),
        "Female" => Some("#6b21a8".to_string()),
        _ => None,
    }
}

/// Element id of a per-gender risk chart.
///
/// Built from the lowercased ASCII alphanumerics of the category. An id
/// already in `taken` gets a numeric suffix.
fn gender_chart_id(category: &str, index: usize, taken: &mut HashSet<String>) -> String {
    let slug: String = category
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let base = if slug.is_empty() { "gender".to_string() } else { slug };

    let mut id = format!("{}RiskChart", base);
    let mut suffix = index;
    while !taken.insert(id.clone()) {
        id = format!("{}{}RiskChart", base, suffix);
        suffix += 1;
    }
    id
}

fn counts_chart(
    id: &str,
    kind: ChartKind,
    title: &str,
    counts: &GroupCounts,
    palette: &Palette,
) -> ChartConfig {
    let labels: Vec<String> = counts.keys().cloned().collect();
    ChartConfig {
        id: id.to_string(),
        kind,
        title: Some(title.to_string()),
        series: align_counts(counts, &labels),
        colors: palette.colors_for(&labels),
        labels,
        border_color: None,
    }
}

/// Build every chart of the dashboard.
///
/// Order: risk distribution, gender distribution, mean temperature per
/// risk, then one risk distribution per configured gender category.
pub fn build_charts(
    records: &[Record],
    settings: &DashboardConfig,
    palette: &Palette,
) -> Vec<ChartConfig> {
    let unknown = settings.unknown_label.as_str();
    let mut charts = Vec::with_capacity(3 + settings.gender_categories.len());

    let risk_counts = count_by_field(records, risk, unknown);
    charts.push(counts_chart(
        "riskChart",
        ChartKind::Pie,
        "Risk Distribution",
        &risk_counts,
        palette,
    ));

    let gender_counts = count_by_field(records, gender, unknown);
    charts.push(counts_chart(
        "genderChart",
        ChartKind::Doughnut,
        "Gender Distribution",
        &gender_counts,
        palette,
    ));

    let averages = average_numeric_by_group(records, risk, temperature, unknown);
    let labels: Vec<String> = averages.keys().cloned().collect();
    charts.push(ChartConfig {
        id: "tempChart".to_string(),
        kind: ChartKind::Bar,
        title: Some("Mean Temperature by Risk (°C)".to_string()),
        series: averages.values().copied().collect(),
        colors: palette.colors_for(&labels),
        labels,
        border_color: None,
    });

    // Records outside the known categories are not reconciled here.
    let partitions = partition_by_category(records, gender, &settings.gender_categories);
    let per_gender: Vec<(&String, GroupCounts)> = partitions
        .iter()
        .map(|(category, part)| {
            (category, count_by_field(part.iter().copied(), risk, unknown))
        })
        .collect();

    let all_counts: Vec<&GroupCounts> = per_gender.iter().map(|(_, counts)| counts).collect();
    let risk_labels = union_labels(&all_counts);

    let mut taken = HashSet::new();
    for (index, (category, counts)) in per_gender.iter().enumerate() {
        charts.push(ChartConfig {
            id: gender_chart_id(category, index, &mut taken),
            kind: ChartKind::Doughnut,
            title: Some(format!("Risk Distribution ({})", category)),
            series: align_counts(counts, &risk_labels),
            colors: palette.colors_for(&risk_labels),
            labels: risk_labels.clone(),
            border_color: gender_border(category),
        });
    }

    charts
}

/// Build the recent-records table: the first `max_rows` records in source order.
pub fn build_table(records: &[Record], settings: &DashboardConfig) -> Vec<TableRow> {
    records
        .iter()
        .take(settings.max_rows)
        .map(|record| TableRow {
            id: record.id.clone(),
            date: record.date.clone(),
            gender: record.gender.clone(),
            temperature: record.temperature_value().map(|t| (t * 10.0).round() / 10.0),
            risk_label: record.risk_label.clone(),
            tone: RiskTone::classify(
                record.risk_label.as_deref(),
                &settings.high_label,
                &settings.medium_label,
            ),
        })
        .collect()
}

/// Aggregate a loaded dataset and hand the results to the presenters.
pub fn render<P, T>(
    records: &[Record],
    settings: &DashboardConfig,
    palette: &Palette,
    presenter: &mut P,
    table: &mut T,
) -> RenderOutcome
where
    P: ChartPresenter + ?Sized,
    T: TableRenderer + ?Sized,
{
    let charts = build_charts(records, settings, palette);
    for chart in &charts {
        debug!("Drawing {} chart {} ({} labels)", chart.kind, chart.id, chart.labels.len());
        presenter.draw(chart);
    }

    let rows = build_table(records, settings);
    for row in &rows {
        table.append(row);
    }

    info!("Rendered {} charts and {} table rows", charts.len(), rows.len());

    RenderOutcome::Rendered {
        records: records.len(),
        charts: charts.len(),
        rows: rows.len(),
    }
}

/// Await the dataset load, then render it.
///
/// A load failure is logged once and swallowed: nothing is drawn or appended.
pub async fn load_and_render<F, P, T>(
    load: F,
    settings: &DashboardConfig,
    palette: &Palette,
    presenter: &mut P,
    table: &mut T,
) -> RenderOutcome
where
    F: Future<Output = Result<Vec<Record>, LoadError>>,
    P: ChartPresenter + ?Sized,
    T: TableRenderer + ?Sized,
{
    match load.await {
        Ok(records) => render(&records, settings, palette, presenter, table),
        Err(e) => {
            error!("Failed to load dataset: {}", e);
            RenderOutcome::LoadFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    fn record(id: &str, gender: Option<&str>, risk: Option<&str>, temp: Option<&str>) -> Record {
        Record {
            id: Some(id.to_string()),
            date: Some("2024-03-01".to_string()),
            gender: gender.map(String::from),
            temperature: temp.map(String::from),
            risk_label: risk.map(String::from),
        }
    }

    fn scenario_a() -> Vec<Record> {
        vec![
            record("B1", Some("Male"), Some("Low"), Some("36.5")),
            record("B2", Some("Male"), Some("High"), Some("38.5")),
            record("B3", Some("Female"), Some("Low"), Some("36.9")),
        ]
    }

    /// Counts ERROR-level events.
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_build_charts_scenario() {
        let records = scenario_a();
        let charts = build_charts(&records, &DashboardConfig::default(), &Palette::default());

        let ids: Vec<&str> = charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["riskChart", "genderChart", "tempChart", "maleRiskChart", "femaleRiskChart"]
        );

        assert_eq!(charts[0].kind, ChartKind::Pie);
        assert_eq!(charts[0].labels, vec!["Low", "High"]);
        assert_eq!(charts[0].series, vec![2.0, 1.0]);
        assert_eq!(charts[0].colors, vec!["#22c55e", "#ef4444"]);

        assert_eq!(charts[1].labels, vec!["Male", "Female"]);
        assert_eq!(charts[1].series, vec![2.0, 1.0]);

        assert_eq!(charts[2].kind, ChartKind::Bar);
        assert!((charts[2].series[0] - 36.7).abs() < 1e-9);
        assert!((charts[2].series[1] - 38.5).abs() < 1e-9);

        assert_eq!(charts[3].labels, vec!["Low", "High"]);
        assert_eq!(charts[3].series, vec![1.0, 1.0]);
        assert_eq!(charts[3].border_color.as_deref(), Some("#1d4ed8"));
        assert_eq!(charts[4].labels, vec!["Low", "High"]);
        assert_eq!(charts[4].series, vec![1.0, 0.0]);
        assert_eq!(charts[4].title.as_deref(), Some("Risk Distribution (Female)"));
    }

    #[test]
    fn test_unknown_gender_only_in_overall_chart() {
        let records = vec![
            record("B1", Some("Male"), Some("Low"), None),
            record("B2", None, Some("High"), None),
        ];
        let charts = build_charts(&records, &DashboardConfig::default(), &Palette::default());

        assert_eq!(charts[1].labels, vec!["Male", "Unknown"]);
        assert_eq!(charts[1].colors, vec!["#3b82f6", "#9ca3af"]);
        let per_gender_total: f64 = charts[3..].iter().flat_map(|c| c.series.iter()).sum();
        assert_eq!(per_gender_total, 1.0);
    }

    #[test]
    fn test_unlisted_label_uses_fallback_color() {
        let records = vec![record("B1", Some("Male"), Some("Critical"), None)];
        let charts = build_charts(&records, &DashboardConfig::default(), &Palette::default());
        assert_eq!(charts[0].colors, vec!["#60a5fa"]);
    }

    #[test]
    fn test_gender_chart_ids_are_unique_and_space_free() {
        let settings = DashboardConfig {
            gender_categories: vec![
                "Male".to_string(),
                "male".to_string(),
                "Not Stated".to_string(),
                "?".to_string(),
            ],
            ..DashboardConfig::default()
        };
        let records = vec![record("B1", Some("Not Stated"), Some("Low"), None)];
        let charts = build_charts(&records, &settings, &Palette::default());

        let ids: Vec<&str> = charts[3..].iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["maleRiskChart", "male1RiskChart", "notstatedRiskChart", "genderRiskChart"]
        );
        assert_eq!(charts[5].series, vec![1.0]);
        assert_eq!(charts[5].title.as_deref(), Some("Risk Distribution (Not Stated)"));
    }

    #[test]
    fn test_table_reads_temperature_prefix() {
        let records = vec![
            record("B1", Some("Male"), Some("Low"), Some("36.54abc")),
            record("B2", Some("Male"), Some("Low"), Some("37,2")),
            record("B3", Some("Male"), Some("Low"), Some("°C")),
        ];
        let rows = build_table(&records, &DashboardConfig::default());
        assert_eq!(rows[0].temperature_display(), "36.5");
        assert_eq!(rows[1].temperature_display(), "37.0");
        assert_eq!(rows[2].temperature_display(), "n/a");
    }

    #[test]
    fn test_build_table_limits_and_tones() {
        let risks = [Some("High"), Some("Medium"), Some("Low"), None, Some("Unknown")];
        let records: Vec<Record> = (0..25)
            .map(|i| {
                record(
                    &format!("B{}", i),
                    Some("Female"),
                    risks[i % risks.len()],
                    Some("36.66"),
                )
            })
            .collect();

        let rows = build_table(&records, &DashboardConfig::default());
        assert_eq!(rows.len(), 20);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.id, Some(format!("B{}", i)));
            assert_eq!(row.temperature, Some(36.7));
            assert_eq!(row.temperature_display(), "36.7");
        }
        assert_eq!(rows[0].tone, RiskTone::Red);
        assert_eq!(rows[1].tone, RiskTone::Yellow);
        assert_eq!(rows[2].tone, RiskTone::Green);
        assert_eq!(rows[3].tone, RiskTone::Green);
        assert_eq!(rows[4].tone, RiskTone::Green);
    }

    #[test]
    fn test_render_hands_everything_to_presenters() {
        let mut charts: Vec<ChartConfig> = Vec::new();
        let mut rows: Vec<TableRow> = Vec::new();

        let outcome = render(
            &scenario_a(),
            &DashboardConfig::default(),
            &Palette::default(),
            &mut charts,
            &mut rows,
        );

        assert_eq!(
            outcome,
            RenderOutcome::Rendered {
                records: 3,
                charts: 5,
                rows: 3
            }
        );
        assert_eq!(charts.len(), 5);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_render_empty_dataset() {
        let mut charts: Vec<ChartConfig> = Vec::new();
        let mut rows: Vec<TableRow> = Vec::new();

        render(&[], &DashboardConfig::default(), &Palette::default(), &mut charts, &mut rows);

        assert_eq!(charts.len(), 5);
        assert!(charts.iter().all(|c| c.labels.is_empty() && c.series.is_empty()));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_load_failure_renders_nothing_and_logs_once() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));

        let mut charts: Vec<ChartConfig> = Vec::new();
        let mut rows: Vec<TableRow> = Vec::new();
        let settings = DashboardConfig::default();
        let palette = Palette::default();

        let outcome = tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(load_and_render(
                async {
                    Err(LoadError::Status {
                        url: "http://localhost:5000/data".to_string(),
                        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    })
                },
                &settings,
                &palette,
                &mut charts,
                &mut rows,
            ))
        });

        assert_eq!(outcome, RenderOutcome::LoadFailed);
        assert!(charts.is_empty());
        assert!(rows.is_empty());
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_success_renders() {
        let mut charts: Vec<ChartConfig> = Vec::new();
        let mut rows: Vec<TableRow> = Vec::new();

        let outcome = tokio_test::block_on(load_and_render(
            async { Ok(scenario_a()) },
            &DashboardConfig::default(),
            &Palette::default(),
            &mut charts,
            &mut rows,
        ));

        assert!(matches!(outcome, RenderOutcome::Rendered { charts: 5, .. }));
        assert_eq!(rows.len(), 3);
    }
}
