//! CSS styles for the web interface.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base03: #002b36;
    --base02: #073642;
    --base01: #586e75;
    --base00: #657b83;
    --base0: #839496;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --red: #dc322f;
    --magenta: #d33682;
    --violet: #6c71c4;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --link-hover: var(--cyan);
    --accent: var(--base2);
    --code-bg: var(--base2);
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2, h3 { font-weight: 600; }
h1 { font-size: 1.4rem; }

.nav-bar {
    position: sticky;
    top: 0;
    background: var(--bg);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
    z-index: 100;
}
.nav-bar .brand { font-weight: 700; color: var(--base01); }
.nav-bar .spacer { flex: 1; }
.nav-bar .user { font-size: 0.85rem; color: var(--muted); }
.nav-bar a { font-size: 0.9rem; }

/* Layout */
.layout {
    display: grid;
    grid-template-columns: 260px 1fr;
    min-height: calc(100vh - 45px);
}
.main { padding: 1.5rem; min-width: 0; }

.sidebar {
    border-right: 1px solid var(--border);
    padding: 1rem;
    background: var(--accent);
}
.sidebar form { margin-bottom: 1rem; }
.sidebar .btn { width: 100%; }
.chat-list { list-style: none; }
.chat-list li a {
    display: block;
    padding: 0.4rem 0.6rem;
    border-radius: 4px;
    color: var(--base01);
    font-size: 0.9rem;
    white-space: nowrap;
    overflow: hidden;
    text-overflow: ellipsis;
}
.chat-list li a:hover { background: var(--bg); text-decoration: none; }
.chat-list li.active a { background: var(--bg); font-weight: 600; }
.chat-list .chat-date { display: block; font-size: 0.7rem; color: var(--muted); font-weight: normal; }

.chat-header {
    display: flex;
    align-items: center;
    gap: 0.75rem;
    margin-bottom: 1rem;
    flex-wrap: wrap;
}
.chat-header h1 { flex: 1; margin: 0; }
.inline-form { display: flex; gap: 0.5rem; align-items: center; }
.inline-form input[type="text"] {
    padding: 0.4rem 0.6rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-family: inherit;
}

/* Buttons */
.btn {
    padding: 0.5rem 1rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--blue);
    color: var(--base3);
    cursor: pointer;
    font-size: 0.9rem;
    font-family: inherit;
    text-decoration: none;
    display: inline-block;
}
.btn:hover { background: var(--cyan); border-color: var(--cyan); text-decoration: none; color: var(--base3); }
.btn.secondary { background: var(--base2); color: var(--base00); border-color: var(--base1); }
.btn.secondary:hover { background: var(--base3); }
.btn.small { padding: 0.25rem 0.6rem; font-size: 0.8rem; }

.delete-btn {
    background: var(--red) !important;
    color: white !important;
    border-color: var(--red) !important;
}
.delete-btn:hover {
    background: #b02020 !important;
    border-color: #b02020 !important;
}

/* Composer */
.composer {
    margin-top: 1.5rem;
    padding: 1rem;
    border: 1px solid var(--border);
    border-radius: 8px;
    background: white;
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
}
.composer textarea, .edit-form textarea {
    width: 100%;
    min-height: 90px;
    padding: 0.75rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-family: inherit;
    font-size: 0.95rem;
    resize: vertical;
}
.composer-row { display: flex; gap: 0.75rem; align-items: center; }
.composer-row .spacer { flex: 1; }
.composer select {
    padding: 0.45rem 0.6rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-family: inherit;
}

/* Content grid */
.content-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
    gap: 1rem;
}
.empty-state {
    text-align: center;
    color: var(--muted);
    padding: 3rem 1rem;
}
.content-card {
    background: white;
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 0.9rem;
    display: flex;
    flex-direction: column;
    gap: 0.6rem;
    overflow: hidden;
}
.content-card:hover { border-color: var(--base1); }
.content-type-badge {
    align-self: flex-start;
    display: inline-flex;
    gap: 0.35rem;
    font-size: 0.7rem;
    font-weight: 600;
    padding: 0.15rem 0.5rem;
    border-radius: 999px;
    text-transform: uppercase;
    letter-spacing: 0.04em;
}
.content-preview { max-height: 260px; overflow: hidden; font-size: 0.85rem; }
.content-footer { display: flex; justify-content: space-between; align-items: center; gap: 0.5rem; font-size: 0.75rem; color: var(--muted); }
.content-actions { display: flex; justify-content: flex-end; margin-top: 1rem; }
.copy-btn {
    background: none;
    border: 1px solid var(--border);
    border-radius: 4px;
    padding: 0.15rem 0.5rem;
    font-size: 0.75rem;
    color: var(--muted);
    cursor: pointer;
}
.copy-btn:hover { color: var(--blue); border-color: var(--blue); }

/* Content detail */
.content-detail {
    background: white;
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 1.25rem;
}
.meta-block {
    background: var(--accent);
    padding: 0.5rem 0.75rem;
    margin: 1rem 0;
    border-radius: 4px;
    font-size: 0.8rem;
    line-height: 1.4;
}
.meta-block .meta-row { display: flex; gap: 0.5rem; }
.meta-block .meta-label { font-weight: 600; color: var(--base01); min-width: 60px; }
.edit-panels { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; margin-top: 1.5rem; }
.edit-form { display: flex; flex-direction: column; gap: 0.5rem; }
.edit-form h3 { font-size: 1rem; }
.edit-form textarea.code { font-family: "SF Mono", "Consolas", "Liberation Mono", monospace; min-height: 220px; font-size: 0.85rem; }
.back-link { display: inline-block; margin-bottom: 1rem; font-size: 0.9rem; }

/* Note */
.note-content { white-space: pre-wrap; word-wrap: break-word; }

/* Table */
.content-table { width: 100%; border-collapse: collapse; font-size: 0.85rem; }
.content-table th, .content-table td { padding: 0.45rem 0.6rem; text-align: left; border-bottom: 1px solid var(--border); }
.content-table th { font-weight: 600; background: var(--accent); }

/* Checklist */
.todo-list { list-style: none; }
.todo-item { display: flex; gap: 0.5rem; align-items: baseline; padding: 0.2rem 0; }
.todo-item input:checked + span { text-decoration: line-through; color: var(--muted); }

/* Diagram */
.mermaid-container { position: relative; border: 1px solid var(--border); border-radius: 6px; overflow: hidden; }
.mermaid-controls { position: absolute; top: 0.4rem; right: 0.4rem; display: flex; gap: 0.25rem; z-index: 2; }
.mermaid-control-btn {
    width: 26px;
    height: 26px;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    color: var(--base01);
    cursor: pointer;
}
.mermaid-diagram-wrapper { overflow: auto; padding: 1rem; transform-origin: top left; transition: transform 0.15s ease; }
.mermaid-diagram:not([data-rendered]) { white-space: pre; font-family: "SF Mono", "Consolas", monospace; font-size: 0.8rem; color: var(--muted); }
.mermaid-diagram svg { max-width: 100%; height: auto; }
.diagram-error { border: 1px solid var(--red); background: #fdf2f2; color: var(--red); border-radius: 4px; padding: 0.5rem 0.75rem; }
.diagram-error pre { margin-top: 0.4rem; white-space: pre-wrap; font-size: 0.8rem; color: var(--base01); }

/* Chart */
.chart-title { font-weight: 600; margin-bottom: 0.5rem; }
.chart-wrapper { position: relative; }

/* Links */
.link-collection { display: flex; flex-direction: column; gap: 0.6rem; }
.link-item { padding: 0.5rem 0.6rem; border-left: 3px solid var(--cyan); background: var(--bg); }
.link-title { font-weight: 600; }
.link-url { font-size: 0.8rem; word-break: break-all; }
.link-description { font-size: 0.8rem; color: var(--muted); }

/* Form */
.form-title { margin-bottom: 0.75rem; }
.form-field { display: flex; flex-direction: column; gap: 0.25rem; margin-bottom: 0.75rem; }
.form-label { font-weight: 600; font-size: 0.85rem; }
.required-marker { color: var(--red); }
.form-input, .form-textarea, .form-select {
    padding: 0.4rem 0.6rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    font-family: inherit;
}
.form-radio-group, .form-checkbox-group { display: flex; flex-wrap: wrap; gap: 0.75rem; font-size: 0.85rem; }
.form-submit { align-self: flex-start; }

/* Login */
.login-form {
    max-width: 320px;
    margin: 4rem auto;
    padding: 2rem;
    background: var(--accent);
    border-radius: 8px;
}
.login-form h1 { margin-bottom: 1.5rem; text-align: center; }
.login-form input {
    width: 100%;
    padding: 0.75rem;
    margin-bottom: 1rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 1rem;
}
.login-form button {
    width: 100%;
    padding: 0.75rem;
    background: var(--link);
    color: white;
    border: none;
    border-radius: 4px;
    font-size: 1rem;
    cursor: pointer;
}
.login-form button:hover { background: var(--link-hover); }

.message { padding: 0.75rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
.message.error { background: #fdf2f2; color: var(--red); border: 1px solid var(--red); }

/* Toast */
.toast {
    position: fixed;
    bottom: 1.5rem;
    right: 1.5rem;
    padding: 0.75rem 1rem;
    border-radius: 6px;
    background: var(--base02);
    color: var(--base3);
    font-size: 0.9rem;
    box-shadow: 0 4px 14px rgba(0, 0, 0, 0.2);
    z-index: 200;
    transition: opacity 0.3s ease;
}
.toast.error { background: var(--red); }
.toast.hidden { opacity: 0; pointer-events: none; }

@media (max-width: 760px) {
    .layout { grid-template-columns: 1fr; }
    .sidebar { border-right: none; border-bottom: 1px solid var(--border); }
    .edit-panels { grid-template-columns: 1fr; }
}
"#;
