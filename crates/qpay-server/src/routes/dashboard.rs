//! Live dashboard page.
//!
//! A static page that polls `GET /events` every two seconds and renders one
//! card per event. Failed polls leave the previous rendering in place.

use axum::{extract::State, response::Html};

use crate::state::AppState;

const PORT_PLACEHOLDER: &str = "{{port}}";

const DASHBOARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>QPay Webhook Listener</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #1f2937; }
    h1 { font-size: 1.4rem; margin-bottom: 0.25rem; }
    .hint { opacity: 0.6; margin-top: 0; }
    .card { border: 1px solid #d1d5db; border-radius: 8px; padding: 0.75rem 1rem; margin: 0.5rem 0; }
    .card.paid { border-color: #16a34a; background: #f0fdf4; }
    .card.unpaid { border-color: #ca8a04; background: #fefce8; }
    .badge { display: inline-block; padding: 1px 8px; border-radius: 4px; font-size: 0.75rem; font-weight: 600; color: #fff; margin-right: 0.5rem; }
    .badge.paid { background: #16a34a; }
    .badge.unpaid { background: #ca8a04; }
    .time { float: right; opacity: 0.5; font-variant-numeric: tabular-nums; }
    .error { color: #b91c1c; font-size: 0.85rem; }
    pre { font-size: 0.8rem; overflow-x: auto; margin: 0.5rem 0 0; }
    .empty { text-align: center; opacity: 0.5; padding: 3rem 0; }
  </style>
</head>
<body>
  <h1>QPay Webhook Listener</h1>
  <p class="hint">Listening on port {{port}}. Notifications appear here as they arrive.</p>
  <div id="events"><div class="empty">Waiting for events...</div></div>
  <script>
    function escapeHtml(text) {
      return String(text)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;');
    }

    function renderEvent(e) {
      const state = e.verified ? 'paid' : 'unpaid';
      const error = e.error ? '<div class="error">' + escapeHtml(e.error) + '</div>' : '';
      return '<div class="card ' + state + '">'
        + '<span class="badge ' + state + '">' + state.toUpperCase() + '</span>'
        + '<strong>' + escapeHtml(e.invoiceId || 'unknown') + '</strong>'
        + '<span class="time">' + escapeHtml(e.timestamp.slice(11, 19)) + '</span>'
        + error
        + '<pre>' + escapeHtml(JSON.stringify(e.body, null, 2)) + '</pre>'
        + '</div>';
    }

    async function poll() {
      try {
        const res = await fetch('/events');
        const events = await res.json();
        if (events.length === 0) return;
        document.getElementById('events').innerHTML = events.map(renderEvent).join('');
      } catch (_) {}
    }

    setInterval(poll, 2000);
    poll();
  </script>
</body>
</html>
"#;

/// Renders the dashboard for a listener on `port`.
pub fn render_dashboard(port: u16) -> String {
    DASHBOARD_TEMPLATE.replace(PORT_PLACEHOLDER, &port.to_string())
}

/// Dashboard page.
///
/// GET /
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(render_dashboard(state.port))
}
