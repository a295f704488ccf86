//! Rendering engines the hydrator drives, and the ones that ship.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::HydrationError;

// ============================================================================
// Engine Traits
// ============================================================================

/// Turns diagram source into SVG.
#[async_trait]
pub trait DiagramEngine: Send + Sync {
    async fn render_svg(&self, element_id: &str, source: &str) -> Result<String, HydrationError>;
}

/// A live chart bound to one canvas.
pub trait ChartInstance: Send + Sync {
    fn element_id(&self) -> &str;

    /// Markup placed right after the canvas to activate the chart.
    fn markup(&self) -> String;

    /// Releases whatever the instance holds. Called before a replacement
    /// instance for the same canvas is constructed.
    fn destroy(&mut self);
}

/// Builds chart instances from a stored configuration.
#[async_trait]
pub trait ChartEngine: Send + Sync {
    async fn construct(
        &self,
        element_id: &str,
        config: &Value,
    ) -> Result<Box<dyn ChartInstance>, HydrationError>;
}

// ============================================================================
// Mermaid
// ============================================================================

/// Native Mermaid rendering. Layout is CPU-bound, so it runs on the
/// blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidEngine;

#[async_trait]
impl DiagramEngine for MermaidEngine {
    async fn render_svg(&self, element_id: &str, source: &str) -> Result<String, HydrationError> {
        let owned = source.to_string();
        let rendered = tokio::task::spawn_blocking(move || {
            let opts = mermaid_rs_renderer::RenderOptions {
                theme: mermaid_rs_renderer::Theme::modern(),
                layout: mermaid_rs_renderer::LayoutConfig::default(),
            };
            mermaid_rs_renderer::render_with_options(&owned, opts).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| HydrationError::Engine(e.to_string()))?;

        match rendered {
            Ok(svg) => {
                debug!("Rendered {} ({} bytes of SVG)", element_id, svg.len());
                Ok(svg)
            }
            Err(message) => Err(HydrationError::Diagram {
                element_id: element_id.to_string(),
                message,
            }),
        }
    }
}

// ============================================================================
// Chart.js
// ============================================================================

/// Binds charts through Chart.js in the browser. Each instance is an inline
/// script that tears down any chart already on the canvas before drawing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartJsEngine;

#[async_trait]
impl ChartEngine for ChartJsEngine {
    async fn construct(
        &self,
        element_id: &str,
        config: &Value,
    ) -> Result<Box<dyn ChartInstance>, HydrationError> {
        let chart_type = config
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("bar")
            .to_string();

        let chart_config = serde_json::json!({
            "type": chart_type,
            "data": {
                "labels": array_or_empty(config.get("labels")),
                "datasets": array_or_empty(config.get("datasets")),
            },
            "options": chart_options(),
        });

        Ok(Box::new(ChartJsInstance {
            element_id: element_id.to_string(),
            config_json: script_safe_json(&chart_config)?,
            destroyed: false,
        }))
    }
}

/// Chart.js options shared by server and browser hydration. The chart
/// fills its wrapper instead of keeping the canvas aspect ratio.
pub fn chart_options() -> Value {
    serde_json::json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "plugins": {
            "legend": { "position": "top" },
            "title": { "display": false },
        },
    })
}

fn array_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Array(items)) => Value::Array(items.clone()),
        _ => Value::Array(Vec::new()),
    }
}

struct ChartJsInstance {
    element_id: String,
    config_json: String,
    destroyed: bool,
}

impl ChartInstance for ChartJsInstance {
    fn element_id(&self) -> &str {
        &self.element_id
    }

    fn markup(&self) -> String {
        if self.destroyed {
            return String::new();
        }
        // element_id is a JSON string literal here so quotes cannot break out.
        let id_literal = Value::String(self.element_id.clone()).to_string().replace("</", "<\\/");
        format!(
            r#"<script data-chart-for="{attr}">(function(){{var el=document.getElementById({id});if(!el||typeof Chart==='undefined')return;var old=Chart.getChart(el);if(old)old.destroy();new Chart(el,{config});}})();</script>"#,
            attr = crate::render::html_escape(&self.element_id),
            id = id_literal,
            config = self.config_json,
        )
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Serializes JSON for embedding in an inline script.
fn script_safe_json(value: &Value) -> Result<String, HydrationError> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_chartjs_instance_emits_binding_script() {
        let config = json!({"type": "pie", "labels": ["a"], "datasets": [{"data": [1]}]});
        let instance = ChartJsEngine.construct("chart-1", &config).await.unwrap();
        let markup = instance.markup();
        assert_eq!(instance.element_id(), "chart-1");
        assert!(markup.starts_with(r#"<script data-chart-for="chart-1">"#));
        assert!(markup.contains(r#""type":"pie""#));
        assert!(markup.contains("Chart.getChart(el)"));
    }

    #[tokio::test]
    async fn test_chartjs_escapes_script_terminators() {
        let config = json!({"labels": ["</script><b>"], "datasets": []});
        let instance = ChartJsEngine.construct("chart-2", &config).await.unwrap();
        let markup = instance.markup();
        assert_eq!(markup.matches("</script>").count(), 1);
        assert!(markup.contains(r#""type":"bar""#));
    }

    #[tokio::test]
    async fn test_chartjs_fills_wrapper_and_tolerates_null_members() {
        let config = json!({"type": "bar", "labels": null, "datasets": [{"data": [1]}]});
        let instance = ChartJsEngine.construct("chart-3", &config).await.unwrap();
        let markup = instance.markup();
        assert!(markup.contains(r#""maintainAspectRatio":false"#));
        assert!(markup.contains(r#""labels":[]"#));
    }

    #[tokio::test]
    async fn test_destroyed_instance_has_no_markup() {
        let mut instance = ChartJsEngine.construct("c", &json!({})).await.unwrap();
        instance.destroy();
        assert!(instance.markup().is_empty());
    }

    #[tokio::test]
    async fn test_mermaid_engine_renders_flowchart() {
        let svg = MermaidEngine.render_svg("m1", "graph LR\nA-->B").await.unwrap();
        assert!(svg.contains("<svg"));
    }
}
