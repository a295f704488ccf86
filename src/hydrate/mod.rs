//! Interactive hydration of rendered content.
//!
//! The renderer leaves placeholders behind: diagram source waiting for SVG,
//! and chart canvases carrying their configuration. A hydration pass scans a
//! [`Surface`] for placeholders that have not been activated yet and drives
//! the configured engines over them.
//!
//! Diagrams in one pass render concurrently. Each result is applied under
//! the surface lock, and only if the surface has not been replaced since the
//! pass began. Charts go through a [`ChartRegistry`] so a canvas never holds
//! two live instances.

mod engines;
mod surface;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use futures_util::future::join_all;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::render::{html_unescape, render_diagram_error};

pub use engines::{chart_options, ChartEngine, ChartInstance, ChartJsEngine, DiagramEngine, MermaidEngine};
pub use surface::Surface;

#[derive(Debug, Error)]
pub enum HydrationError {
    #[error("diagram {element_id} failed to render: {message}")]
    Diagram { element_id: String, message: String },

    #[error("chart configuration is invalid: {0}")]
    ChartConfig(#[from] serde_json::Error),

    #[error("chart {element_id} could not be constructed: {message}")]
    Chart { element_id: String, message: String },

    #[error("rendering engine failed: {0}")]
    Engine(String),
}

/// Diagram placeholders that have not been hydrated. Hydrated ones carry a
/// `data-rendered` attribute and no longer match.
static DIAGRAM_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="mermaid-diagram" id="([^"]+)">(.*?)</div>"#)
        .expect("valid regex")
});

static CHART_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<canvas id="([^"]+)" class="chart-canvas" data-chart-config="([^"]*)"></canvas>"#)
        .expect("valid regex")
});

// ============================================================================
// Chart Registry
// ============================================================================

/// Live chart instances keyed by canvas element id.
#[derive(Default)]
pub struct ChartRegistry {
    instances: HashMap<String, Box<dyn ChartInstance>>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys and forgets the instance bound to `element_id`, if any.
    pub fn dispose(&mut self, element_id: &str) -> bool {
        match self.instances.remove(element_id) {
            Some(mut instance) => {
                instance.destroy();
                true
            }
            None => false,
        }
    }

    pub fn register(&mut self, instance: Box<dyn ChartInstance>) {
        let id = instance.element_id().to_string();
        self.dispose(&id);
        self.instances.insert(id, instance);
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.instances.contains_key(element_id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Destroys every instance, e.g. when the view goes away.
    pub fn clear(&mut self) {
        for (_, mut instance) in self.instances.drain() {
            instance.destroy();
        }
    }
}

/// State that outlives a single pass over one view.
#[derive(Default)]
pub struct HydrationContext {
    pub charts: ChartRegistry,
}

impl HydrationContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What a pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub diagrams_rendered: usize,
    pub diagrams_failed: usize,
    pub charts_bound: usize,
    pub charts_failed: usize,
    /// Results dropped because the surface was replaced mid-pass.
    pub superseded: usize,
}

// ============================================================================
// Hydrator
// ============================================================================

#[derive(Clone)]
pub struct Hydrator {
    diagrams: Arc<dyn DiagramEngine>,
    charts: Arc<dyn ChartEngine>,
}

impl Default for Hydrator {
    fn default() -> Self {
        Self::new(Arc::new(MermaidEngine), Arc::new(ChartJsEngine))
    }
}

impl Hydrator {
    pub fn new(diagrams: Arc<dyn DiagramEngine>, charts: Arc<dyn ChartEngine>) -> Self {
        Self { diagrams, charts }
    }

    /// Hydrates a standalone fragment with a throwaway context.
    pub async fn hydrate_html(&self, html: String) -> String {
        let surface = Surface::new(html);
        let mut ctx = HydrationContext::new();
        self.hydrate(&surface, &mut ctx).await;
        surface.html()
    }

    pub async fn hydrate(&self, surface: &Surface, ctx: &mut HydrationContext) -> HydrationReport {
        let (generation, html) = surface.snapshot();
        let mut report = HydrationReport::default();

        self.hydrate_diagrams(surface, generation, &html, &mut report).await;
        self.hydrate_charts(surface, generation, &html, ctx, &mut report).await;

        debug!("Hydration pass at generation {}: {:?}", generation, report);
        report
    }

    async fn hydrate_diagrams(
        &self,
        surface: &Surface,
        generation: u64,
        html: &str,
        report: &mut HydrationReport,
    ) {
        let pending: Vec<(String, String)> = DIAGRAM_PLACEHOLDER
            .captures_iter(html)
            .map(|caps| (caps[1].to_string(), html_unescape(caps[2].trim())))
            .collect();
        if pending.is_empty() {
            return;
        }

        let engine = &self.diagrams;
        let results = join_all(pending.iter().map(|(id, source)| async move {
            let element_id = html_unescape(id);
            (id, source, engine.render_svg(&element_id, source).await)
        }))
        .await;

        for (id, source, result) in results {
            let (inner, marker, failed) = match result {
                Ok(svg) => (svg, "true", false),
                Err(e) => {
                    warn!("{}", e);
                    (render_diagram_error(source), "error", true)
                }
            };

            match surface.edit_if_current(generation, |html| {
                replace_diagram_placeholder(html, id, marker, &inner)
            }) {
                None => report.superseded += 1,
                Some(false) => debug!("Diagram placeholder {} is gone, skipping", id),
                Some(true) if failed => report.diagrams_failed += 1,
                Some(true) => report.diagrams_rendered += 1,
            }
        }
    }

    async fn hydrate_charts(
        &self,
        surface: &Surface,
        generation: u64,
        html: &str,
        ctx: &mut HydrationContext,
        report: &mut HydrationReport,
    ) {
        let canvases: Vec<(String, String)> = CHART_PLACEHOLDER
            .captures_iter(html)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect();

        for (id, raw_config) in canvases {
            let element_id = html_unescape(&id);
            ctx.charts.dispose(&element_id);

            let instance = match self.construct_chart(&element_id, &raw_config).await {
                Ok(instance) => instance,
                Err(e) => {
                    warn!("Skipping chart {}: {}", element_id, e);
                    report.charts_failed += 1;
                    continue;
                }
            };

            let markup = instance.markup();
            match surface.edit_if_current(generation, |html| bind_chart_markup(html, &id, &markup)) {
                None => {
                    let mut instance = instance;
                    instance.destroy();
                    report.superseded += 1;
                }
                Some(false) => {
                    let mut instance = instance;
                    instance.destroy();
                    debug!("Chart canvas {} is gone, skipping", id);
                }
                Some(true) => {
                    ctx.charts.register(instance);
                    report.charts_bound += 1;
                }
            }
        }
    }

    async fn construct_chart(
        &self,
        element_id: &str,
        raw_config: &str,
    ) -> Result<Box<dyn ChartInstance>, HydrationError> {
        let config: Value = serde_json::from_str(&html_unescape(raw_config))?;
        self.charts.construct(element_id, &config).await
    }
}

// ============================================================================
// Markup Surgery
// ============================================================================

/// Replaces the unhydrated placeholder `id` with hydrated content.
fn replace_diagram_placeholder(html: &mut String, id: &str, marker: &str, inner: &str) -> bool {
    let open_tag = format!(r#"<div class="mermaid-diagram" id="{}">"#, id);
    let Some(start) = html.find(&open_tag) else {
        return false;
    };
    let inner_start = start + open_tag.len();
    let Some(close) = html[inner_start..].find("</div>") else {
        return false;
    };
    let end = inner_start + close + "</div>".len();

    let hydrated = format!(
        r#"<div class="mermaid-diagram" id="{}" data-rendered="{}">{}</div>"#,
        id, marker, inner
    );
    html.replace_range(start..end, &hydrated);
    true
}

/// Places `markup` right after the canvas `id`, replacing a previous binding.
fn bind_chart_markup(html: &mut String, id: &str, markup: &str) -> bool {
    let open_tag = format!(r#"<canvas id="{}" class="chart-canvas""#, id);
    let Some(start) = html.find(&open_tag) else {
        return false;
    };
    let Some(close) = html[start..].find("</canvas>") else {
        return false;
    };
    let after_canvas = start + close + "</canvas>".len();

    let previous = format!(r#"<script data-chart-for="{}">"#, id);
    let mut end = after_canvas;
    if html[after_canvas..].starts_with(&previous) {
        if let Some(script_end) = html[after_canvas..].find("</script>") {
            end = after_canvas + script_end + "</script>".len();
        }
    }

    html.replace_range(after_canvas..end, markup);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentKind;
    use crate::render::render_content;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeDiagrams {
        calls: Mutex<Vec<String>>,
    }

    impl FakeDiagrams {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DiagramEngine for FakeDiagrams {
        async fn render_svg(&self, element_id: &str, source: &str) -> Result<String, HydrationError> {
            self.calls.lock().unwrap().push(element_id.to_string());
            if source.contains("boom") {
                return Err(HydrationError::Diagram {
                    element_id: element_id.to_string(),
                    message: "parse error".into(),
                });
            }
            Ok(format!("<svg data-src=\"{}\"></svg>", source.lines().count()))
        }
    }

    /// Replaces the surface while a render is in flight.
    struct SupersedingDiagrams {
        surface: Surface,
    }

    #[async_trait]
    impl DiagramEngine for SupersedingDiagrams {
        async fn render_svg(&self, _: &str, _: &str) -> Result<String, HydrationError> {
            self.surface.replace("<p>new view</p>");
            Ok("<svg></svg>".into())
        }
    }

    struct FakeChart {
        id: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ChartInstance for FakeChart {
        fn element_id(&self) -> &str {
            &self.id
        }

        fn markup(&self) -> String {
            format!(r#"<script data-chart-for="{}">bind()</script>"#, self.id)
        }

        fn destroy(&mut self) {
            self.log.lock().unwrap().push(format!("destroy:{}", self.id));
        }
    }

    struct FakeCharts {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChartEngine for FakeCharts {
        async fn construct(
            &self,
            element_id: &str,
            config: &Value,
        ) -> Result<Box<dyn ChartInstance>, HydrationError> {
            if config.get("broken").is_some() {
                return Err(HydrationError::Chart {
                    element_id: element_id.to_string(),
                    message: "unsupported".into(),
                });
            }
            self.log.lock().unwrap().push(format!("construct:{}", element_id));
            Ok(Box::new(FakeChart {
                id: element_id.to_string(),
                log: self.log.clone(),
            }))
        }
    }

    fn hydrator_with(diagrams: Arc<dyn DiagramEngine>) -> (Hydrator, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let charts = Arc::new(FakeCharts { log: log.clone() });
        (Hydrator::new(diagrams, charts), log)
    }

    #[tokio::test]
    async fn test_diagram_is_hydrated_once() {
        let engine = FakeDiagrams::new();
        let (hydrator, _) = hydrator_with(engine.clone());
        let surface = Surface::new(render_content("graph LR\nA-->B", ContentKind::Diagram, None));
        let mut ctx = HydrationContext::new();

        let first = hydrator.hydrate(&surface, &mut ctx).await;
        assert_eq!(first.diagrams_rendered, 1);
        let html = surface.html();
        assert!(html.contains(r#"data-rendered="true"><svg data-src="2"></svg></div>"#));

        let second = hydrator.hydrate(&surface, &mut ctx).await;
        assert_eq!(second, HydrationReport::default());
        assert_eq!(surface.html(), html);
        assert_eq!(engine.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_diagram_does_not_affect_siblings() {
        let (hydrator, _) = hydrator_with(FakeDiagrams::new());
        let html = format!(
            "{}{}",
            render_content("graph LR\nboom", ContentKind::Diagram, None),
            render_content("graph TD\nX-->Y", ContentKind::Diagram, None)
        );
        let surface = Surface::new(html);

        let report = hydrator.hydrate(&surface, &mut HydrationContext::new()).await;
        assert_eq!(report.diagrams_rendered, 1);
        assert_eq!(report.diagrams_failed, 1);

        let html = surface.html();
        assert!(html.contains(r#"data-rendered="error"><div class="diagram-error">"#));
        assert!(html.contains("graph LR\nboom</pre>"));
        assert!(html.contains(r#"data-rendered="true"><svg"#));
    }

    #[tokio::test]
    async fn test_superseded_results_are_dropped() {
        let surface = Surface::new(render_content("graph LR\nA-->B", ContentKind::Diagram, None));
        let engine = Arc::new(SupersedingDiagrams {
            surface: surface.clone(),
        });
        let (hydrator, _) = hydrator_with(engine);

        let report = hydrator.hydrate(&surface, &mut HydrationContext::new()).await;
        assert_eq!(report.superseded, 1);
        assert_eq!(report.diagrams_rendered, 0);
        assert_eq!(surface.html(), "<p>new view</p>");
    }

    #[test]
    fn test_missing_placeholder_is_noop() {
        let mut html = String::from("<p>nothing here</p>");
        assert!(!replace_diagram_placeholder(&mut html, "mermaid-x", "true", "<svg/>"));
        assert!(!bind_chart_markup(&mut html, "chart-x", "<script></script>"));
        assert_eq!(html, "<p>nothing here</p>");
    }

    #[tokio::test]
    async fn test_chart_disposed_before_recreation() {
        let (hydrator, log) = hydrator_with(FakeDiagrams::new());
        let chart = r#"{"type":"bar","labels":["a"],"datasets":[{"data":[1]}]}"#;
        let surface = Surface::new(render_content(chart, ContentKind::Chart, Some("c1")));
        let mut ctx = HydrationContext::new();

        assert_eq!(hydrator.hydrate(&surface, &mut ctx).await.charts_bound, 1);
        assert!(ctx.charts.contains("chart-c1"));
        assert_eq!(hydrator.hydrate(&surface, &mut ctx).await.charts_bound, 1);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["construct:chart-c1", "destroy:chart-c1", "construct:chart-c1"]
        );
        assert_eq!(ctx.charts.len(), 1);
        assert_eq!(surface.html().matches("data-chart-for").count(), 1);
    }

    #[tokio::test]
    async fn test_broken_chart_does_not_block_others() {
        let (hydrator, _) = hydrator_with(FakeDiagrams::new());
        let html = format!(
            "{}{}",
            render_content(r#"{"broken":true}"#, ContentKind::Chart, Some("bad")),
            render_content(r#"{"type":"line"}"#, ContentKind::Chart, Some("good"))
        );
        let surface = Surface::new(html);
        let mut ctx = HydrationContext::new();

        let report = hydrator.hydrate(&surface, &mut ctx).await;
        assert_eq!(report.charts_failed, 1);
        assert_eq!(report.charts_bound, 1);
        assert!(ctx.charts.contains("chart-good"));
        assert!(!ctx.charts.contains("chart-bad"));
    }

    #[test]
    fn test_registry_clear_destroys_instances() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ChartRegistry::new();
        registry.register(Box::new(FakeChart {
            id: "a".into(),
            log: log.clone(),
        }));
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["destroy:a"]);
    }
}
