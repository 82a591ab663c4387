//! Static file serving for the web UI.
//!
//! The web UI is embedded directly in the binary for easy deployment.

use axum::{http::header, response::IntoResponse};

/// Placeholder in [`INDEX_HTML`] replaced with the configured path prefix.
pub const PREFIX_PLACEHOLDER: &str = "{{prefix}}";

/// CSS styles for the web UI.
pub const CSS: &str = r#"
:root {
    --bg-primary: #0f172a;
    --bg-secondary: #1e293b;
    --bg-tertiary: #334155;
    --text-primary: #f1f5f9;
    --text-secondary: #94a3b8;
    --accent: #3b82f6;
    --accent-hover: #2563eb;
    --error: #ef4444;
    --border: #475569;
}

* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
    background: var(--bg-primary);
    color: var(--text-primary);
    line-height: 1.6;
}

.container {
    max-width: 1400px;
    margin: 0 auto;
    padding: 20px;
}

header {
    background: var(--bg-secondary);
    border-bottom: 1px solid var(--border);
    padding: 15px 0;
    margin-bottom: 30px;
}

.logo {
    font-size: 1.5rem;
    font-weight: 700;
    color: var(--text-primary);
    text-decoration: none;
}

.logo span {
    color: var(--accent);
}

.search-box {
    display: flex;
    gap: 10px;
    margin-bottom: 10px;
}

.search-box input {
    flex: 1;
    padding: 12px 16px;
    background: var(--bg-secondary);
    border: 1px solid var(--border);
    border-radius: 8px;
    color: var(--text-primary);
    font-size: 1rem;
}

.search-box input:focus {
    outline: none;
    border-color: var(--accent);
}

.btn {
    padding: 12px 24px;
    border: none;
    border-radius: 8px;
    background: var(--accent);
    color: white;
    font-size: 1rem;
    cursor: pointer;
}

.btn:hover {
    background: var(--accent-hover);
}

.btn:disabled {
    opacity: 0.6;
    cursor: wait;
}

.expanded-query {
    color: var(--text-secondary);
    font-style: italic;
    margin-bottom: 10px;
}

.panels {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 20px;
}

@media (max-width: 1000px) {
    .panels {
        grid-template-columns: 1fr;
    }
}

.panel {
    background: var(--bg-secondary);
    border: 1px solid var(--border);
    border-radius: 12px;
    padding: 20px;
}

.panel-header {
    display: flex;
    justify-content: space-between;
    align-items: baseline;
    margin-bottom: 15px;
}

.panel-header h2 {
    font-size: 1.2rem;
}

.reset-link {
    color: var(--accent);
    cursor: pointer;
    font-size: 0.9rem;
}

.options h4 {
    color: var(--text-secondary);
    font-size: 0.85rem;
    text-transform: uppercase;
    margin: 10px 0 5px;
}

.options label {
    display: inline-block;
    margin-right: 12px;
    font-size: 0.9rem;
    cursor: pointer;
}

.results {
    list-style: decimal inside;
    margin-top: 15px;
}

.result {
    padding: 12px 0;
    border-bottom: 1px solid var(--bg-tertiary);
}

.result h4 {
    font-size: 1rem;
}

.result a {
    color: var(--accent);
    word-break: break-all;
    font-size: 0.85rem;
}

.result p {
    color: var(--text-secondary);
    font-size: 0.9rem;
}

.result .cluster {
    display: inline-block;
    background: var(--bg-tertiary);
    border-radius: 4px;
    padding: 0 6px;
    font-size: 0.75rem;
}

.panel-error {
    color: var(--error);
    font-size: 0.9rem;
    margin-top: 10px;
}

.error {
    color: var(--error);
    margin: 10px 0;
}

.loader-wrapper {
    display: flex;
    justify-content: center;
    padding: 30px;
}

.spinner {
    width: 40px;
    height: 40px;
    border: 3px solid var(--bg-tertiary);
    border-top-color: var(--accent);
    border-radius: 50%;
    animation: spin 1s linear infinite;
}

@keyframes spin {
    to { transform: rotate(360deg); }
}

.hidden {
    display: none;
}
"#;

/// JavaScript for the web UI.
pub const JS: &str = r#"
const state = {
    generation: 0,
    mode: { kind: 'none', value: null },
};

const MODE_PARAMS = {
    relevance: 'model',
    clustering: 'cluster',
    expansion: 'expand_query',
};

function $(id) {
    return document.getElementById(id);
}

function escapeHtml(text) {
    const div = document.createElement('div');
    div.textContent = text == null ? '' : String(text);
    return div.innerHTML;
}

function setLoading(loading) {
    $('loader').classList.toggle('hidden', !loading);
    $('submit').disabled = loading;
}

function setError(message) {
    const el = $('error');
    el.textContent = message || '';
    el.classList.toggle('hidden', !message);
}

function setExpandedQuery(text) {
    const el = $('expanded-query');
    el.textContent = text ? `Expanded query: ${text}` : '';
    el.classList.toggle('hidden', !text);
}

function renderPanel(name, outcome) {
    const list = $(`${name}-results`);
    const err = $(`${name}-error`);
    const items = outcome && outcome.status === 'ok' ? outcome.items : [];

    list.innerHTML = items.map(item => `
        <li class="result">
            <h4>${escapeHtml(item.title)}</h4>
            <a href="${escapeHtml(item.url)}" target="_blank" rel="noopener noreferrer">${escapeHtml(item.url)}</a>
            ${item.cluster != null ? `<span class="cluster">cluster ${escapeHtml(item.cluster)}</span>` : ''}
            <p>${escapeHtml(item.snippet)}</p>
        </li>
    `).join('');

    const message = outcome && outcome.status === 'failed' ? outcome.error : '';
    err.textContent = message;
    err.classList.toggle('hidden', !message);
}

function clearPanels() {
    ['custom', 'google', 'bing'].forEach(name => renderPanel(name, null));
}

function selectMode(kind, value) {
    state.mode = { kind, value };
    document.querySelectorAll('.options input[type=radio]').forEach(input => {
        input.checked = input.dataset.kind === kind && input.value === value;
    });
}

function reset() {
    state.generation += 1;
    selectMode('none', null);
    $('query').value = '';
    setExpandedQuery('');
    setError('');
    setLoading(false);
    clearPanels();
}

async function search(event) {
    event.preventDefault();

    const query = $('query').value.trim();
    if (!query) {
        setError('Query must not be empty');
        return;
    }

    const generation = ++state.generation;
    clearPanels();
    setExpandedQuery('');
    setError('');
    setLoading(true);

    const params = new URLSearchParams({ query });
    const param = MODE_PARAMS[state.mode.kind];
    if (param) {
        params.set(param, state.mode.value);
    }

    let outcome;
    let failure = null;
    try {
        const response = await fetch(`/search?${params}`);
        const body = await response.json();
        if (!response.ok) {
            failure = body.error || `HTTP ${response.status}`;
        } else {
            outcome = body;
        }
    } catch (e) {
        failure = 'Cannot load results';
    }

    // A newer submission or a reset happened while this one was in flight.
    if (generation !== state.generation) {
        return;
    }

    setLoading(false);
    if (failure) {
        setError(failure);
        return;
    }

    renderPanel('custom', outcome.custom);
    renderPanel('google', outcome.google);
    renderPanel('bing', outcome.bing);
    setExpandedQuery(outcome.expanded_query);
    setError(outcome.error);
}

document.addEventListener('DOMContentLoaded', () => {
    $('search-form').addEventListener('submit', search);
    $('reset').addEventListener('click', reset);
    document.querySelectorAll('.options input[type=radio]').forEach(input => {
        input.addEventListener('change', () => selectMode(input.dataset.kind, input.value));
    });
});
"#;

/// HTML template for the web UI.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>trisearch</title>
    <link rel="stylesheet" href="{{prefix}}/style.css">
</head>
<body>
    <header>
        <div class="container">
            <a href="{{prefix}}" class="logo">tri<span>search</span></a>
        </div>
    </header>

    <main class="container">
        <form id="search-form" class="search-box">
            <input type="text" id="query" placeholder="Enter search query..." autocomplete="off">
            <button type="submit" id="submit" class="btn">Search</button>
        </form>
        <div id="expanded-query" class="expanded-query hidden"></div>
        <p id="error" class="error hidden"></p>

        <div class="panels">
            <section class="panel">
                <div class="panel-header">
                    <h2>Custom Search</h2>
                    <a id="reset" class="reset-link">Reset Options</a>
                </div>
                <div class="options">
                    <h4>Relevance Model</h4>
                    <label><input type="radio" name="mode" data-kind="relevance" value="page_rank"> Page Rank</label>
                    <label><input type="radio" name="mode" data-kind="relevance" value="hits"> HITS</label>
                    <label><input type="radio" name="mode" data-kind="relevance" value="hybrid"> Hybrid</label>

                    <h4>Clustering</h4>
                    <label><input type="radio" name="mode" data-kind="clustering" value="kmeans"> Flat Clustering</label>
                    <label><input type="radio" name="mode" data-kind="clustering" value="agglo"> Hierarchical Clustering</label>

                    <h4>Query Expansion</h4>
                    <label><input type="radio" name="mode" data-kind="expansion" value="association"> Association</label>
                    <label><input type="radio" name="mode" data-kind="expansion" value="metric"> Metric</label>
                    <label><input type="radio" name="mode" data-kind="expansion" value="scalar"> Scalar</label>
                </div>
                <p id="custom-error" class="panel-error hidden"></p>
                <ol id="custom-results" class="results"></ol>
            </section>

            <section class="panel">
                <div class="panel-header"><h2>Google</h2></div>
                <p id="google-error" class="panel-error hidden"></p>
                <ol id="google-results" class="results"></ol>
            </section>

            <section class="panel">
                <div class="panel-header"><h2>Bing</h2></div>
                <p id="bing-error" class="panel-error hidden"></p>
                <ol id="bing-results" class="results"></ol>
            </section>
        </div>

        <div id="loader" class="loader-wrapper hidden"><div class="spinner"></div></div>
    </main>

    <script src="{{prefix}}/app.js"></script>
</body>
</html>
"#;

/// Render the main page for a path prefix such as `/ui`.
pub fn render_index(prefix: &str) -> String {
    INDEX_HTML.replace(PREFIX_PLACEHOLDER, prefix.trim_end_matches('/'))
}

/// Serve CSS styles.
pub async fn serve_css() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        CSS,
    )
}

/// Serve JavaScript.
pub async fn serve_js() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        JS,
    )
}
