//! Dashboard report generation.
//!
//! This module turns a rendered dashboard into a self-contained HTML page
//! (charts drawn client-side by Chart.js), a JSON document or Markdown
//! tables.

use crate::analysis::field_coverage;
use crate::models::{ChartConfig, ChartKind, DashboardReport, Record, ReportMetadata, TableRow};
use anyhow::Result;
use serde_json::{json, Value};

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Generate a complete HTML dashboard page.
pub fn generate_html_report(report: &DashboardReport) -> String {
    let chart_cards: String = report.charts.iter().map(render_chart_card).collect();
    let chart_scripts: String = report.charts.iter().map(render_chart_script).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{cdn}"></script>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {metadata}
        <div class="chart-grid">
{chart_cards}        </div>
        {table}
        {footer}
    </div>
    <script>
{chart_scripts}    </script>
</body>
</html>
"#,
        title = html_escape(&report.title),
        cdn = CHART_JS_CDN,
        css = inline_css(),
        metadata = render_metadata(&report.metadata),
        chart_cards = chart_cards,
        table = render_table(&report.rows),
        footer = render_footer(),
        chart_scripts = chart_scripts,
    )
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
        body { font-family: system-ui, -apple-system, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; color: #111827; }
        .container { max-width: 1200px; margin: 0 auto; }
        h1 { margin-bottom: 10px; }
        .subtitle { color: #6b7280; margin-bottom: 30px; }
        .chart-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 20px; margin-bottom: 30px; }
        .chart-container { background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .chart-container h2 { font-size: 1rem; margin: 0 0 12px 0; }
        table { width: 100%; border-collapse: collapse; background: white; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        th, td { padding: 8px; text-align: left; border-bottom: 1px solid #e5e7eb; }
        tr:hover { background: #f9fafb; }
        .risk { font-weight: 600; }
        .risk-red { color: #dc2626; }
        .risk-yellow { color: #ca8a04; }
        .risk-green { color: #16a34a; }
        footer { color: #9ca3af; font-size: 0.85em; margin-top: 20px; }
"#
}

fn render_metadata(metadata: &ReportMetadata) -> String {
    format!(
        r#"<p class="subtitle">{count} records from <code>{source}</code> &middot; generated {date}</p>"#,
        count = metadata.record_count,
        source = html_escape(&metadata.source),
        date = metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn render_chart_card(chart: &ChartConfig) -> String {
    let heading = chart
        .title
        .as_deref()
        .map(|t| format!("<h2>{}</h2>", html_escape(t)))
        .unwrap_or_default();

    format!(
        "            <div class=\"chart-container\">{}<canvas id=\"{}\"></canvas></div>\n",
        heading,
        html_escape(&chart.id)
    )
}

/// Chart.js configuration object for one chart.
pub fn chart_js_config(chart: &ChartConfig) -> Value {
    let mut dataset = json!({
        "data": chart.series,
        "backgroundColor": chart.colors,
    });
    if let Some(ref border) = chart.border_color {
        dataset["borderColor"] = json!(border);
        dataset["borderWidth"] = json!(2);
    }

    let options = match chart.kind {
        ChartKind::Bar => {
            if let Some(ref title) = chart.title {
                dataset["label"] = json!(title);
            }
            json!({
                "plugins": { "legend": { "display": false } },
                "scales": { "y": { "beginAtZero": true } }
            })
        }
        ChartKind::Pie | ChartKind::Doughnut => json!({
            "plugins": { "legend": { "position": "bottom" } }
        }),
    };

    json!({
        "type": chart.kind,
        "data": {
            "labels": chart.labels,
            "datasets": [dataset],
        },
        "options": options,
    })
}

fn render_chart_script(chart: &ChartConfig) -> String {
    // Keep "</script>" inside label strings from closing the script element.
    let config = chart_js_config(chart).to_string().replace("</", "<\\/");
    format!(
        "        new Chart(document.getElementById({}), {});\n",
        json!(chart.id),
        config
    )
}

fn render_table(rows: &[TableRow]) -> String {
    let mut section = String::new();

    section.push_str("<h2>Recent Records</h2>\n");
    section.push_str("        <table>\n");
    section.push_str(
        "            <thead><tr><th>ID</th><th>Date</th><th>Gender</th><th>Temperature (°C)</th><th>Risk</th></tr></thead>\n",
    );
    section.push_str("            <tbody id=\"dataTable\">\n");

    for row in rows {
        section.push_str(&format!(
            "                <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"risk risk-{}\">{}</td></tr>\n",
            html_escape(row.id.as_deref().unwrap_or("")),
            html_escape(row.date.as_deref().unwrap_or("")),
            html_escape(row.gender.as_deref().unwrap_or("")),
            row.temperature_display(),
            row.tone,
            html_escape(row.risk_label.as_deref().unwrap_or("")),
        ));
    }

    section.push_str("            </tbody>\n");
    section.push_str("        </table>");

    section
}

fn render_footer() -> String {
    format!(
        "<footer>Generated by VitalDash v{}</footer>",
        env!("CARGO_PKG_VERSION")
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Plain-text field coverage of a dataset, printed by `--summary`.
pub fn generate_dataset_summary(source: &str, records: &[Record]) -> String {
    let mut output = format!("\n🔍 Dataset summary: {}\n\n", source);
    output.push_str(&format!("   Records: {}\n", records.len()));

    for (field, present) in field_coverage(records) {
        output.push_str(&format!(
            "   {:<12} {:>6} present, {:>6} missing\n",
            field,
            present,
            records.len() - present
        ));
    }

    output
}

/// Generate a Markdown report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.title));
    output.push_str(&generate_metadata_section(&report.metadata));

    for chart in &report.charts {
        output.push_str(&generate_chart_section(chart));
    }

    output.push_str(&generate_table_section(&report.rows));
    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Records:** {}\n", metadata.record_count));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_chart_section(chart: &ChartConfig) -> String {
    let mut section = String::new();

    let title = chart.title.as_deref().unwrap_or(&chart.id);
    section.push_str(&format!("## {}\n\n", title));

    if chart.labels.is_empty() {
        section.push_str("No data.\n\n");
        return section;
    }

    let value_header = match chart.kind {
        ChartKind::Bar => "Mean",
        ChartKind::Pie | ChartKind::Doughnut => "Count",
    };
    section.push_str(&format!("| Label | {} | Color |\n", value_header));
    section.push_str("|:---|---:|:---:|\n");

    for ((label, value), color) in chart.labels.iter().zip(&chart.series).zip(&chart.colors) {
        let value = match chart.kind {
            ChartKind::Bar => format!("{:.1}", value),
            ChartKind::Pie | ChartKind::Doughnut => format!("{}", value),
        };
        section.push_str(&format!("| {} | {} | `{}` |\n", label, value, color));
    }
    section.push('\n');

    section
}

fn generate_table_section(rows: &[TableRow]) -> String {
    let mut section = String::new();

    section.push_str("## Recent Records\n\n");

    if rows.is_empty() {
        section.push_str("No records.\n");
        return section;
    }

    section.push_str("| ID | Date | Gender | Temperature (°C) | Risk |\n");
    section.push_str("|:---|:---|:---|---:|:---|\n");

    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} {} |\n",
            row.id.as_deref().unwrap_or(""),
            row.date.as_deref().unwrap_or(""),
            row.gender.as_deref().unwrap_or(""),
            row.temperature_display(),
            row.tone.emoji(),
            row.risk_label.as_deref().unwrap_or(""),
        ));
    }

    section
}
