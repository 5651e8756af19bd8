//! Static dashboard page.
//!
//! Three panels, fixed layout, each figure bound directly to one fetched
//! result:
//!   1. MAU            bar chart, month vs. active accounts
//!   2. Churn rate     line chart, month vs. churn percentage
//!   3. Top merchants  grouped bar chart, one trace per age bracket
//!
//! Figures serialize to plotly.js JSON and are drawn client-side.

use crate::{
    error::InsightsResult,
    fetch::FetchedResults,
    metrics::{brackets_in_order, MerchantVolume, MonthlyActive, MonthlyChurn},
};
use serde::Serialize;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Bar,
    /// plotly draws lines as scatter traces.
    #[serde(rename = "scatter")]
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub dom_id: &'static str,
    pub heading: &'static str,
    pub figure: Figure,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Dashboard {
    pub fn from_results(title: &str, results: &FetchedResults) -> InsightsResult<Self> {
        let panels = vec![
            mau_panel(&results.monthly_active()?),
            churn_panel(&results.monthly_churn()?),
            top_merchants_panel(&results.top_merchants()?),
        ];
        Ok(Self {
            title: title.to_string(),
            panels,
        })
    }

    /// The whole page as one self-contained HTML document.
    pub fn render_html(&self) -> InsightsResult<String> {
        let mut sections = String::new();
        for panel in &self.panels {
            let figure = serde_json::to_string(&panel.figure)?;
            sections.push_str(&format!(
                "  <div class=\"panel\">\n    <h3>{heading}</h3>\n    <div id=\"{id}\" class=\"graph\"></div>\n    <script>\n      (function () {{\n        var fig = {figure};\n        Plotly.newPlot(\"{id}\", fig.data, fig.layout, {{responsive: true}});\n      }})();\n    </script>\n  </div>\n",
                heading = escape_html(panel.heading),
                id = panel.dom_id,
                figure = script_safe(&figure),
            ));
        }

        Ok(PAGE_TEMPLATE
            .replace("__PLOTLY__", PLOTLY_CDN)
            .replace("__TITLE__", &escape_html(&self.title))
            .replace("__PANELS__", &sections))
    }
}

fn mau_panel(rows: &[MonthlyActive]) -> Panel {
    Panel {
        dom_id: "mau-graph",
        heading: "Monthly Active Users (MAU)",
        figure: Figure {
            data: vec![Trace {
                x: rows.iter().map(|r| r.month.to_string()).collect(),
                y: rows.iter().map(|r| Some(r.mau as f64)).collect(),
                kind: TraceKind::Bar,
                mode: None,
                name: "MAU".into(),
            }],
            layout: Layout {
                title: "Monthly Active Users".into(),
                barmode: None,
            },
        },
    }
}

fn churn_panel(rows: &[MonthlyChurn]) -> Panel {
    Panel {
        dom_id: "churn-graph",
        heading: "Churn Rate",
        figure: Figure {
            data: vec![Trace {
                x: rows.iter().map(|r| r.month.to_string()).collect(),
                // Undefined months stay null and render as gaps.
                y: rows.iter().map(|r| r.churn_rate).collect(),
                kind: TraceKind::Line,
                mode: Some("lines+markers"),
                name: "Churn Rate".into(),
            }],
            layout: Layout {
                title: "Monthly Churn Rate".into(),
                barmode: None,
            },
        },
    }
}

fn top_merchants_panel(rows: &[MerchantVolume]) -> Panel {
    let data = brackets_in_order(rows)
        .into_iter()
        .map(|bracket| {
            let in_bracket: Vec<&MerchantVolume> =
                rows.iter().filter(|r| r.bracket == bracket).collect();
            Trace {
                x: in_bracket.iter().map(|r| r.merchant.clone()).collect(),
                y: in_bracket.iter().map(|r| Some(r.total_volume)).collect(),
                kind: TraceKind::Bar,
                mode: None,
                name: bracket.label().to_string(),
            }
        })
        .collect();

    Panel {
        dom_id: "merchants-graph",
        heading: "Top Merchants by Age Bracket",
        figure: Figure {
            data,
            layout: Layout {
                title: "Top Merchants by Age Bracket".into(),
                barmode: Some("group"),
            },
        },
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON embedded in a `<script>` block must not contain `</`.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>__TITLE__</title>
  <script src="__PLOTLY__" charset="utf-8"></script>
  <style>
    body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #222; }
    h1 { font-size: 1.8rem; margin-bottom: 1.5rem; }
    .panel { margin-bottom: 2.5rem; }
    .graph { width: 100%; height: 450px; }
  </style>
</head>
<body>
  <h1>__TITLE__</h1>
__PANELS__</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escaping_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn embedded_json_cannot_close_the_script_tag() {
        assert_eq!(script_safe(r#"{"name":"</script>"}"#), r#"{"name":"<\/script>"}"#);
    }

    #[test]
    fn line_traces_serialize_as_scatter() {
        let trace = Trace {
            x: vec!["2024-02-01".into()],
            y: vec![None],
            kind: TraceKind::Line,
            mode: Some("lines+markers"),
            name: "Churn Rate".into(),
        };
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["type"], "scatter");
        assert_eq!(json["mode"], "lines+markers");
        assert!(json["y"][0].is_null());
    }
}
