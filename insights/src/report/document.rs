use std::fmt::Write;

use time::macros::format_description;
use time::OffsetDateTime;

use crate::charts::ChartRef;
use crate::format::format_metric;
use crate::metrics::{ExperimentSummary, OverallStats};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; padding: 30px; }
h1, h2 { color: #2e6c80; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ccc; padding: 8px; text-align: center; }
th { background-color: #f0f0f0; }
img { max-width: 100%; height: auto; margin-bottom: 20px; }";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub username: String,
    pub email: String,
}

impl From<&store::User> for UserIdentity {
    fn from(user: &store::User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// The seven charts a report embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSet {
    pub accuracy_bar: ChartRef,
    pub recall_bar: ChartRef,
    pub precision_bar: ChartRef,
    pub accuracy_line: ChartRef,
    pub precision_line: ChartRef,
    pub recall_line: ChartRef,
    pub loss_line: ChartRef,
}

impl ChartSet {
    /// Bar charts first, then line charts, in the order they appear in the document.
    pub fn in_document_order(&self) -> [&ChartRef; 7] {
        [
            &self.accuracy_bar,
            &self.recall_bar,
            &self.precision_bar,
            &self.accuracy_line,
            &self.precision_line,
            &self.recall_line,
            &self.loss_line,
        ]
    }
}

/// Composed HTML plus the chart files it references by `file://` URI.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub html: String,
    pub images: Vec<ChartRef>,
}

pub fn compose_report(
    user: &UserIdentity,
    stats: &OverallStats,
    top: &[ExperimentSummary],
    charts: &ChartSet,
    generated_at: OffsetDateTime,
) -> ReportDocument {
    let mut html = String::with_capacity(4 * 1024);

    let _ = write!(
        html,
        "<html><head><meta charset=\"utf-8\"><style>\n{STYLE}\n</style></head><body>\n"
    );
    html.push_str("<h1>Project Report</h1>\n");
    field(&mut html, "Generated on", &generated_stamp(generated_at));

    html.push_str("<h2>User Info</h2>\n");
    field(&mut html, "Username", &user.username);
    field(&mut html, "Email", &user.email);

    html.push_str("<h2>Summary</h2>\n");
    field(&mut html, "Total Experiments", &stats.total.to_string());
    field(&mut html, "Best Accuracy", &format_metric(stats.best_accuracy));
    field(&mut html, "Best Recall", &format_metric(stats.best_recall));
    field(&mut html, "Avg Accuracy", &format_metric(stats.mean_accuracy));
    field(&mut html, "Avg Recall", &format_metric(stats.mean_recall));

    html.push_str("<h2>Top 5 Experiments</h2>\n<table>\n");
    html.push_str(
        "<tr><th>Name</th><th>Accuracy</th><th>Precision</th><th>Recall</th><th>Loss</th></tr>\n",
    );
    for summary in top {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&summary.name),
            format_metric(summary.accuracy),
            format_metric(summary.precision),
            format_metric(summary.recall),
            format_metric(summary.final_loss),
        );
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Bar Charts</h2>\n");
    image(&mut html, "Accuracy", &charts.accuracy_bar);
    image(&mut html, "Recall", &charts.recall_bar);
    image(&mut html, "Precision", &charts.precision_bar);

    html.push_str("<h2>Line Charts</h2>\n");
    image(&mut html, "Accuracy over Epochs", &charts.accuracy_line);
    image(&mut html, "Precision over Epochs", &charts.precision_line);
    image(&mut html, "Recall over Epochs", &charts.recall_line);
    image(&mut html, "Loss over Epochs", &charts.loss_line);

    html.push_str("</body></html>\n");

    ReportDocument {
        html,
        images: charts.in_document_order().into_iter().cloned().collect(),
    }
}

fn generated_stamp(at: OffsetDateTime) -> String {
    at.to_offset(time::UtcOffset::UTC)
        .format(&format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

fn field(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(html, "<p><strong>{label}:</strong> {}</p>", escape_html(value));
}

fn image(html: &mut String, heading: &str, chart: &ChartRef) {
    let _ = writeln!(
        html,
        "<h3>{heading}</h3><img src=\"{}\">",
        escape_html(&chart.uri)
    );
}

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use store::ExperimentId;
    use time::macros::datetime;

    fn chart(name: &str) -> ChartRef {
        ChartRef {
            path: PathBuf::from(format!("/tmp/report-x/{name}.png")),
            uri: format!("file:///tmp/report-x/{name}.png"),
        }
    }

    fn charts() -> ChartSet {
        ChartSet {
            accuracy_bar: chart("accuracy_chart"),
            recall_bar: chart("recall_chart"),
            precision_bar: chart("precision_chart"),
            accuracy_line: chart("accuracy_line_chart"),
            precision_line: chart("precision_line_chart"),
            recall_line: chart("recall_line_chart"),
            loss_line: chart("loss_line_chart"),
        }
    }

    fn stats() -> OverallStats {
        OverallStats {
            total: 3,
            mean_accuracy: 0.6,
            mean_recall: 0.5,
            best_accuracy: 0.91234,
            best_recall: 0.8,
        }
    }

    fn top() -> Vec<ExperimentSummary> {
        vec![ExperimentSummary {
            experiment: ExperimentId(1),
            name: "brave-<panda>".into(),
            accuracy: 0.91234,
            precision: 0.5,
            recall: 0.25,
            final_loss: 0.123456,
            final_epoch: 3,
            samples: 3,
        }]
    }

    fn user() -> UserIdentity {
        UserIdentity {
            username: "ada".into(),
            email: "ada@example.com".into(),
        }
    }

    #[test]
    fn document_has_fixed_sections_in_order() {
        let doc = compose_report(
            &user(),
            &stats(),
            &top(),
            &charts(),
            datetime!(2024-03-05 14:07:09 UTC),
        );
        let html = &doc.html;

        let order = [
            "<h1>Project Report</h1>",
            "2024-03-05 14:07:09 UTC",
            "<h2>User Info</h2>",
            "ada@example.com",
            "<h2>Summary</h2>",
            "<h2>Top 5 Experiments</h2>",
            "accuracy_chart.png",
            "recall_chart.png",
            "precision_chart.png",
            "accuracy_line_chart.png",
            "precision_line_chart.png",
            "recall_line_chart.png",
            "loss_line_chart.png",
        ];
        let mut cursor = 0;
        for needle in order {
            let found = html[cursor..]
                .find(needle)
                .unwrap_or_else(|| panic!("missing or out of order: {needle}"));
            cursor += found + needle.len();
        }
        assert_eq!(doc.images.len(), 7);
        assert_eq!(html.matches("<img").count(), 7);
    }

    #[test]
    fn numbers_use_four_decimals_and_text_is_escaped() {
        let doc = compose_report(&user(), &stats(), &top(), &charts(), OffsetDateTime::UNIX_EPOCH);
        assert!(doc.html.contains(
            "<td>brave-&lt;panda&gt;</td><td>0.9123</td><td>0.5000</td><td>0.2500</td><td>0.1235</td>"
        ));
        assert!(doc.html.contains("<strong>Total Experiments:</strong> 3</p>"));
        assert!(doc.html.contains("<strong>Avg Accuracy:</strong> 0.6000</p>"));
        assert!(!doc.html.contains("<panda>"));
    }

    #[test]
    fn non_utc_timestamps_are_normalised() {
        let at = datetime!(2024-03-05 16:07:09 +02:00);
        assert_eq!(generated_stamp(at), "2024-03-05 14:07:09 UTC");
    }
}
