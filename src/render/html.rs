use anyhow::Context;
use crate::model::RunSummary;

/// Render a self-contained HTML report: the SVG chart inline plus the run
/// summary (embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(summary: &RunSummary, svg: &str) -> anyhow::Result<String> {
    // Embedded as a JS object literal; keep "</script>" out of variant names.
    let json = serde_json::to_string(summary)?.replace('<', "\\u003c");

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Solver run report</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .main { padding: 12px; overflow: auto; }
  .chart svg { max-width: 100%; height: auto; }
  .muted { color: #777; font-size: 12px; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<div class="main">
  <div class="chart">__CHART__</div>
  <div id="stats" class="muted"></div>
</div>

<script>
// Embedded run summary (JSON object literal)
const DATA = __DATA__;

function fmtInt(x) {
  return x === null ? "–" : x.toLocaleString("en-US");
}

function fmtSec(x) {
  return x === null ? "–" : (Math.round(x * 1000) / 1000).toFixed(3) + " s";
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderSummary() {
  const el = document.getElementById("summary");
  el.innerHTML = `
    <span class="pill">variant: <b>${escapeHtml(DATA.variant)}</b></span>
    <span class="pill">records: <b>${DATA.records}</b></span>
    <span class="pill">span: <b>${fmtSec(DATA.first_elapsed)} – ${fmtSec(DATA.last_elapsed)}</b></span>
    <span class="pill">best cost: <b>${fmtInt(DATA.best_cost)}</b></span>
    <span class="pill">final cost: <b>${fmtInt(DATA.final_cost)}</b></span>
    <span class="pill">max handled: <b>${fmtInt(DATA.max_handled)}</b></span>
  `;

  const s = DATA.stats;
  document.getElementById("stats").textContent =
    `lines read: ${s.lines} | telemetry lines: ${s.selected} | accepted: ${s.accepted} | skipped: ${s.skipped}`;
}

renderSummary();
</script>
</body>
</html>
"#;

    let (head, rest) = TEMPLATE
        .split_once("__CHART__")
        .context("report template has no chart slot")?;
    let (middle, tail) = rest
        .split_once("__DATA__")
        .context("report template has no data slot")?;

    let mut out = String::with_capacity(TEMPLATE.len() + svg.len() + json.len());
    out.push_str(head);
    out.push_str(svg);
    out.push_str(middle);
    out.push_str(&json);
    out.push_str(tail);
    Ok(out)
}
