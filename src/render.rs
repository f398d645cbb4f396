use crate::data_structures::{ChartModel, LineSeries, PageModel};
use serde_json::{Value, json};

const PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const STYLES: &str = r#"        body { font-family: sans-serif; margin: 0 auto; max-width: 1400px; }
        h1 { text-align: center; }
        .chart { width: 50%; display: inline-block; height: 450px; }
        .analysis { margin: 20px 20px 0 20px; text-align: left; }
        .analysis-line { margin-bottom: 15px; text-align: left; }"#;

/// Render the page model to a complete HTML document.
///
/// Chart data is embedded as JSON and drawn client-side by plotly, which
/// provides pan and zoom.
pub fn render_page(page: &PageModel) -> String {
    let charts: String = page
        .charts
        .iter()
        .enumerate()
        .map(|(index, chart)| render_chart(index, chart))
        .collect();

    let analysis: String = page
        .analysis
        .iter()
        .map(|line| format!("        <div class=\"analysis-line\">{}</div>\n", escape_html(line)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{plotly}"></script>
    <style>
{css}
    </style>
</head>
<body>
    <h1>{title}</h1>
{charts}    <div>
        <h2>Analysis</h2>
        <div class="analysis">
{analysis}        </div>
    </div>
</body>
</html>
"#,
        title = escape_html(&page.title),
        plotly = PLOTLY_SRC,
        css = STYLES,
        charts = charts,
        analysis = analysis,
    )
}

fn render_chart(index: usize, chart: &ChartModel) -> String {
    let id = format!("chart-{}", index);
    format!(
        "    <div id=\"{id}\" class=\"chart\" data-ticker=\"{ticker}\"></div>\n    \
         <script>Plotly.newPlot(\"{id}\", {data}, {layout});</script>\n",
        id = id,
        ticker = escape_html(&chart.ticker),
        data = script_json(&json!([trace(&chart.open), trace(&chart.close)])),
        layout = script_json(&figure_layout(chart)),
    )
}

pub fn trace(series: &LineSeries) -> Value {
    let x: Vec<String> = series
        .points
        .iter()
        .map(|point| point.date.format("%Y-%m-%d").to_string())
        .collect();
    let y: Vec<f64> = series.points.iter().map(|point| point.value).collect();

    json!({
        "type": "scatter",
        "mode": "lines",
        "name": series.name,
        "x": x,
        "y": y,
    })
}

pub fn figure_layout(chart: &ChartModel) -> Value {
    json!({
        "title": { "text": chart.title },
        "xaxis": { "title": { "text": "Date" } },
        "yaxis": { "title": { "text": "Price" } },
    })
}

// `<` can only occur inside JSON strings, where the < escape decodes to the same text
fn script_json(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
