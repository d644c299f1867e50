use crate::models::DashboardSummary;
use std::fmt::Write;

/// Dashboard page: the summary when it loaded, otherwise a single error line.
pub fn render_index(summary: Option<&DashboardSummary>) -> String {
    let body = match summary {
        Some(summary) => render_summary(summary),
        None => r#"<p class="error">An error occurred while loading the dashboard.</p>"#.to_string(),
    };
    INDEX_HTML.replace("{{BODY}}", &body)
}

fn render_summary(summary: &DashboardSummary) -> String {
    let mut html = String::new();
    html.push_str(r#"<section class="cards">"#);
    stat_card(&mut html, "Total Athletes", &summary.total_athletes.to_string());
    stat_card(&mut html, "Active Training Plans", &summary.active_training_plans.to_string());
    stat_card(&mut html, "Average Performance", &format_average(summary.average_performance));
    stat_card(&mut html, "Upcoming Events", &summary.total_events.to_string());
    html.push_str("</section>");

    html.push_str(r#"<section class="lists"><div class="panel"><h2>Recent Activities</h2>"#);
    if summary.recent_activities.is_empty() {
        html.push_str(r#"<p class="muted">No recent activities</p>"#);
    } else {
        html.push_str("<ul>");
        for metric in &summary.recent_activities {
            let _ = write!(
                html,
                "<li><strong>{}</strong><span>Value: {}</span></li>",
                escape_html(&metric.metric_type),
                metric.value
            );
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");

    html.push_str(r#"<div class="panel"><h2>Upcoming Events</h2>"#);
    if summary.upcoming_events.is_empty() {
        html.push_str(r#"<p class="muted">No upcoming events</p>"#);
    } else {
        html.push_str("<ul>");
        for event in &summary.upcoming_events {
            let _ = write!(
                html,
                "<li><strong>{}</strong><span>{} &middot; {}</span></li>",
                escape_html(&event.title),
                event.event_date.format("%Y-%m-%d"),
                escape_html(&event.location)
            );
        }
        html.push_str("</ul>");
    }
    html.push_str("</div></section>");
    html
}

fn stat_card(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        r#"<div class="card"><p class="label">{label}</p><p class="value">{value}</p></div>"#
    );
}

fn format_average(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Triathlon Dashboard</title>
  <style>
    :root {
      --bg: #f4f6fb;
      --ink: #1f2937;
      --muted: #6b7280;
      --accent: #3b82f6;
      --card: #ffffff;
      --shadow: 0 10px 30px rgba(31, 41, 55, 0.08);
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    main {
      width: min(1080px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 28px;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 20px;
    }

    .lists {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 20px;
    }

    .card, .panel {
      background: var(--card);
      border-radius: 12px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    .label, .muted, li span {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .value {
      font-size: 1.6rem;
      font-weight: 600;
      margin: 4px 0 0;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 12px;
    }

    li {
      display: grid;
      gap: 2px;
    }

    .error {
      color: #dc2626;
    }
  </style>
</head>
<body>
  <main>
    <h1>Dashboard</h1>
    {{BODY}}
  </main>
</body>
</html>
"#;
