//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined and the
//! per-category results drawn as an SVG stacked bar chart.

use anyhow::{Context, Result};
use std::path::Path;

use mucher_core::report::{CategorySeries, GradeReport};

/// Bar segment colors: correct, missing, incorrect.
const SEGMENT_COLORS: [(&str, &str); 3] = [
    ("Correct", "#1f77b4"),
    ("Missing", "#7f7f7f"),
    ("Incorrect", "#bcbd22"),
];

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a grading report.
pub fn generate_html(report: &GradeReport) -> String {
    let mut html = String::new();
    let source = report.results_file.display().to_string();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>mucher report: {}</title>\n",
        html_escape(&source)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>mucher report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Results: <strong>{}</strong> | {} graded | {} unscored | {}</p>\n",
        html_escape(&source),
        report.graded_rows,
        report.unscored_rows,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Points: correct {}, missing {}, incorrect {}</p>\n",
        report.policy.points_correct, report.policy.points_missing, report.policy.points_incorrect
    ));
    html.push_str("</header>\n");

    // Category chart and table
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Categories</h2>\n");
    if report.series.is_empty() {
        html.push_str("<p>No graded answers.</p>\n");
    } else {
        html.push_str(&generate_stacked_chart(&report.series));
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Category</th><th>Correct</th><th>Missing</th><th>Incorrect</th><th>Correct %</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (i, category) in report.series.categories.iter().enumerate() {
            let Some(counts) = report.series.counts(i) else {
                continue;
            };
            let rate = if counts.total() > 0 {
                counts.correct as f64 / counts.total() as f64 * 100.0
            } else {
                0.0
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                html_escape(category),
                counts.correct,
                counts.missing,
                counts.incorrect,
                rate
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Per-student scores
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Row</th><th onclick=\"sortTable(1)\">Student</th><th onclick=\"sortTable(2)\">Score</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for student in &report.students {
        let (class, score) = match student.score {
            Some(score) => ("", score.to_string()),
            None => (" class=\"unscored\"", "-".to_string()),
        };
        html.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            student.row + 1,
            html_escape(&student.student_id),
            score
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &GradeReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// One vertical stacked bar per category, correct at the bottom.
fn generate_stacked_chart(series: &CategorySeries) -> String {
    let bar_width = 48;
    let gap = 24;
    let plot_height = 240;
    let axis_left = 40;
    let label_height = 60;
    let legend_height = 30;
    let top = legend_height + 10;

    let max_total = series.max_total().max(1);
    let width = axis_left + series.len() * (bar_width + gap) + gap;
    let height = top + plot_height + label_height;
    let scale = |count: u32| count as usize * plot_height / max_total as usize;

    let mut svg = format!(
        "<svg width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );

    for (i, (label, color)) in SEGMENT_COLORS.iter().enumerate() {
        let x = axis_left + i * 110;
        svg.push_str(&format!(
            "  <rect x=\"{x}\" y=\"8\" width=\"14\" height=\"14\" fill=\"{color}\"/>\n"
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"19\" font-size=\"12\" fill=\"currentColor\">{label}</text>\n",
            x + 20
        ));
    }

    let baseline = top + plot_height;
    svg.push_str(&format!(
        "  <line x1=\"{axis_left}\" y1=\"{baseline}\" x2=\"{width}\" y2=\"{baseline}\" stroke=\"currentColor\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{max_total}</text>\n",
        axis_left - 6,
        top
    ));

    for (i, category) in series.categories.iter().enumerate() {
        let Some(counts) = series.counts(i) else {
            continue;
        };
        let x = axis_left + gap + i * (bar_width + gap);
        let mut y = baseline;

        for ((_, color), count) in SEGMENT_COLORS
            .iter()
            .zip([counts.correct, counts.missing, counts.incorrect])
        {
            let h = scale(count);
            if h == 0 {
                continue;
            }
            y -= h;
            svg.push_str(&format!(
                "  <rect x=\"{x}\" y=\"{y}\" width=\"{bar_width}\" height=\"{h}\" fill=\"{color}\"><title>{count}</title></rect>\n"
            ));
        }

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"end\" transform=\"rotate(-45 {} {})\">{}</text>\n",
            x + bar_width / 2,
            baseline + 14,
            x + bar_width / 2,
            baseline + 14,
            html_escape(category)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --unscored: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --unscored: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.unscored { background: var(--unscored); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
