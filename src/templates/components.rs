//! Shared HTML components: navigation, toast, page scripts, base template.

use crate::hydrate::chart_options;
use crate::render::html_escape;

use super::styles::STYLE;

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";
const MERMAID_CDN: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";

/// Per-request bits of page chrome.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageContext<'a> {
    pub user: Option<&'a str>,
    pub auth_enabled: bool,
    /// One-shot message shown as a toast, e.g. after a failed action.
    pub notice: Option<&'a str>,
    /// Diagrams and charts are activated in the browser instead of on the server.
    pub client_hydration: bool,
}

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar(ctx: &PageContext) -> String {
    let user_html = match ctx.user {
        Some(user) if ctx.auth_enabled => format!(
            r#"<span class="user">{}</span><a href="/logout">Logout</a>"#,
            html_escape(user)
        ),
        _ => String::new(),
    };

    format!(
        r#"<nav class="nav-bar">
            <a class="brand" href="/">AI Notes</a>
            <span class="spacer"></span>
            {}
        </nav>"#,
        user_html
    )
}

/// Sidebar plus main column.
pub fn app_layout(sidebar: &str, main: &str) -> String {
    format!(
        r#"<div class="layout"><aside class="sidebar">{}</aside><main class="main">{}</main></div>"#,
        sidebar, main
    )
}

pub fn toast_html(notice: Option<&str>) -> String {
    match notice.filter(|n| !n.trim().is_empty()) {
        Some(message) => format!(
            r#"<div class="toast error" id="toast" role="alert">{}</div>"#,
            html_escape(message)
        ),
        None => r#"<div class="toast hidden" id="toast" role="status"></div>"#.to_string(),
    }
}

// ============================================================================
// Page Scripts
// ============================================================================

/// Toast helper, delegated diagram zoom, and checklist write-back.
const PAGE_SCRIPT: &str = r#"<script>
function showToast(message, isError) {
    const toast = document.getElementById('toast');
    if (!toast) return;
    toast.textContent = message;
    toast.className = 'toast' + (isError ? ' error' : '');
    clearTimeout(window.toastTimer);
    window.toastTimer = setTimeout(() => toast.classList.add('hidden'), 4000);
}

(function() {
    const toast = document.getElementById('toast');
    if (toast && !toast.classList.contains('hidden')) {
        window.toastTimer = setTimeout(() => toast.classList.add('hidden'), 4000);
    }
    if (window.location.search.includes('notice=')) {
        history.replaceState(null, '', window.location.pathname + window.location.hash);
    }
})();

// Diagram zoom, one handler for every container on the page
document.addEventListener('click', function(e) {
    const btn = e.target.closest('.mermaid-control-btn');
    if (!btn) return;
    const container = btn.closest('.mermaid-container');
    const wrapper = container && container.querySelector('.mermaid-diagram-wrapper');
    if (!wrapper) return;

    const min = parseFloat(container.dataset.zoomMin);
    const max = parseFloat(container.dataset.zoomMax);
    const step = parseFloat(container.dataset.zoomStep);
    let zoom = parseFloat(container.dataset.zoom) || 1;

    if (btn.classList.contains('zoom-in')) zoom = Math.min(max, zoom + step);
    else if (btn.classList.contains('zoom-out')) zoom = Math.max(min, zoom - step);
    else zoom = 1;

    zoom = Math.round(zoom * 100) / 100;
    container.dataset.zoom = zoom;
    wrapper.style.transform = 'scale(' + zoom + ')';
});

// Copy buttons carry the raw content in data-copy
document.addEventListener('click', async function(e) {
    const btn = e.target.closest('.copy-btn');
    if (!btn) return;
    e.preventDefault();
    try {
        await navigator.clipboard.writeText(btn.dataset.copy);
        showToast('Copied!', false);
    } catch (err) {
        showToast('Copy failed', true);
    }
});

// Checklist toggles are written back to the owning content item
document.addEventListener('change', async function(e) {
    const box = e.target;
    if (!box.matches('.todo-list[data-toggle-endpoint] input[type="checkbox"]')) return;
    const list = box.closest('.todo-list');
    const url = list.dataset.toggleEndpoint + '/' + encodeURIComponent(box.dataset.contentId)
        + '/items/' + box.dataset.itemIndex;

    box.disabled = true;
    try {
        const response = await fetch(url, {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ checked: box.checked })
        });
        const data = await response.json();
        if (!response.ok || !data.ok) throw new Error(data.error || ('HTTP ' + response.status));
    } catch (err) {
        box.checked = !box.checked;
        showToast('Could not save checklist: ' + err.message, true);
    } finally {
        box.disabled = false;
    }
});
</script>"#;

/// Browser-side activation for pages the server did not hydrate.
fn client_hydration_script() -> String {
    format!(
        r#"<script type="module">
import mermaid from '{mermaid}';
mermaid.initialize({{ startOnLoad: false, securityLevel: 'strict' }});
for (const el of document.querySelectorAll('.mermaid-diagram:not([data-rendered])')) {{
    const source = el.textContent;
    try {{
        const {{ svg }} = await mermaid.render(el.id + '-svg', source);
        el.innerHTML = svg;
        el.dataset.rendered = 'true';
    }} catch (err) {{
        el.dataset.rendered = 'error';
        el.innerHTML = '<div class="diagram-error"><p>⚠️ Diagram could not be rendered</p><pre></pre></div>';
        el.querySelector('pre').textContent = source;
    }}
}}
</script>
<script>
document.querySelectorAll('canvas.chart-canvas').forEach(function(canvas) {{
    if (typeof Chart === 'undefined') return;
    const old = Chart.getChart(canvas);
    if (old) old.destroy();
    try {{
        const cfg = JSON.parse(canvas.dataset.chartConfig);
        new Chart(canvas, {{
            type: cfg.type || 'bar',
            data: {{
                labels: Array.isArray(cfg.labels) ? cfg.labels : [],
                datasets: Array.isArray(cfg.datasets) ? cfg.datasets : []
            }},
            options: {options}
        }});
    }} catch (err) {{
        console.warn('Skipping chart', canvas.id, err);
    }}
}});
</script>"#,
        mermaid = MERMAID_CDN,
        options = chart_options(),
    )
}

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, content: &str, ctx: &PageContext) -> String {
    let hydration = if ctx.client_hydration {
        client_hydration_script()
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
    <script src="{chart_js}"></script>
</head>
<body>
    {nav}
    {content}
    {toast}
    {script}
    {hydration}
</body>
</html>"#,
        title = html_escape(title),
        chart_js = CHART_JS_CDN,
        nav = nav_bar(ctx),
        content = content,
        toast = toast_html(ctx.notice),
        script = PAGE_SCRIPT,
        hydration = hydration,
    )
}
