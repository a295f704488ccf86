//! JSON-backed renderers: link collections, charts, and forms.

use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::{html_escape, RenderError};
use crate::models::{FieldControl, FormField, FormSpec, LinkCollection};

/// Schemes that may become clickable anchors.
const LINKABLE_SCHEMES: &[&str] = &["http", "https", "mailto"];

// ============================================================================
// Links
// ============================================================================

pub(super) fn render_links(content: &str) -> Result<String, RenderError> {
    let collection: LinkCollection = serde_json::from_str(content.trim())?;

    let mut html = String::from(r#"<div class="link-collection">"#);
    for link in &collection.links {
        let title = link.title.as_deref().unwrap_or("Link");
        let url_html = if is_linkable(&link.url) {
            format!(
                r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#,
                url = html_escape(&link.url)
            )
        } else {
            html_escape(&link.url)
        };

        html.push_str(&format!(
            r#"<div class="link-item"><div class="link-title">🔗 {}</div><div class="link-url">{}</div>"#,
            html_escape(title),
            url_html
        ));
        if let Some(description) = link.description.as_deref().filter(|d| !d.is_empty()) {
            html.push_str(&format!(
                r#"<div class="link-description">{}</div>"#,
                html_escape(description)
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    Ok(html)
}

fn is_linkable(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|u| LINKABLE_SCHEMES.contains(&u.scheme()))
        .unwrap_or(false)
}

// ============================================================================
// Charts
// ============================================================================

pub(super) fn render_chart(content: &str, content_id: Option<&str>) -> Result<String, RenderError> {
    let payload: Value = serde_json::from_str(content.trim())?;
    if !payload.is_object() {
        return Err(RenderError::Malformed("chart payload is not an object"));
    }
    let title = payload.get("title").and_then(Value::as_str).unwrap_or("Chart");

    let chart_id = match content_id {
        Some(id) => format!("chart-{}", id),
        None => format!("chart-{}", Uuid::new_v4().simple()),
    };

    Ok(format!(
        r#"<div class="chart-container"><div class="chart-title">{title}</div><div class="chart-wrapper"><canvas id="{id}" class="chart-canvas" data-chart-config="{config}"></canvas></div></div>"#,
        title = html_escape(title),
        id = html_escape(&chart_id),
        config = html_escape(&payload.to_string()),
    ))
}

// ============================================================================
// Forms
// ============================================================================

pub(super) fn render_form(content: &str) -> Result<String, RenderError> {
    let form: FormSpec = serde_json::from_str(content.trim())?;

    let mut html = String::from(r#"<div class="form-container">"#);
    if let Some(title) = form.title.as_deref() {
        html.push_str(&format!(r#"<h3 class="form-title">{}</h3>"#, html_escape(title)));
    }
    html.push_str(r#"<form class="survey-form" onsubmit="return false;">"#);

    for (index, field) in form.fields.iter().enumerate() {
        html.push_str(r#"<div class="form-field">"#);
        html.push_str(&format!(
            r#"<label class="form-label">{}{}</label>"#,
            html_escape(field.label.as_deref().unwrap_or("Field")),
            if field.required { r#"<span class="required-marker"> *</span>"# } else { "" }
        ));
        html.push_str(&render_control(field, index));
        html.push_str("</div>");
    }

    html.push_str(r#"<button type="submit" class="form-submit">Submit</button></form></div>"#);
    Ok(html)
}

fn render_control(field: &FormField, index: usize) -> String {
    let required = if field.required { " required" } else { "" };
    let placeholder = html_escape(field.placeholder.as_deref().unwrap_or(""));
    let group = format!("field-{}", index);

    match field.control() {
        FieldControl::Text | FieldControl::Email | FieldControl::Number => format!(
            r#"<input type="{kind}" class="form-input" name="{group}" placeholder="{placeholder}"{required}>"#,
            kind = field.field_type.trim().to_ascii_lowercase(),
            group = group,
            placeholder = placeholder,
            required = required,
        ),
        FieldControl::Textarea => format!(
            r#"<textarea class="form-textarea" name="{}" rows="{}" placeholder="{}"{}></textarea>"#,
            group,
            field.rows.unwrap_or(4),
            placeholder,
            required
        ),
        FieldControl::Select => {
            let mut html = format!(r#"<select class="form-select" name="{}"{}>"#, group, required);
            html.push_str(r#"<option value="">Choose...</option>"#);
            for option in field.option_labels() {
                let option = html_escape(&option);
                html.push_str(&format!(r#"<option value="{0}">{0}</option>"#, option));
            }
            html.push_str("</select>");
            html
        }
        FieldControl::Radio => {
            let mut html = String::from(r#"<div class="form-radio-group">"#);
            for option in field.option_labels() {
                let option = html_escape(&option);
                html.push_str(&format!(
                    r#"<label class="form-radio-item"><input type="radio" name="{group}" value="{option}"{required}> {option}</label>"#,
                    group = group,
                    option = option,
                    required = required,
                ));
            }
            html.push_str("</div>");
            html
        }
        FieldControl::Checkbox => {
            let mut html = String::from(r#"<div class="form-checkbox-group">"#);
            for option in field.option_labels() {
                let option = html_escape(&option);
                html.push_str(&format!(
                    r#"<label class="form-checkbox-item"><input type="checkbox" name="{group}" value="{option}"> {option}</label>"#,
                    group = group,
                    option = option,
                ));
            }
            html.push_str("</div>");
            html
        }
        FieldControl::Unknown => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::html_unescape;
    use regex::Regex;
    use serde_json::json;

    #[test]
    fn test_links_render_escaped() {
        let html = render_links(
            r#"{"links": [{"title": "<Rust>", "url": "https://rust-lang.org/?a=1&b=2", "description": "Home & docs"}]}"#,
        )
        .unwrap();
        assert!(html.contains("🔗 &lt;Rust&gt;"));
        assert!(html.contains(r#"href="https://rust-lang.org/?a=1&amp;b=2""#));
        assert!(html.contains(r#"<div class="link-description">Home &amp; docs</div>"#));
    }

    #[test]
    fn test_links_missing_array_is_empty_collection() {
        assert_eq!(
            render_links(r#"{"links": null}"#).unwrap(),
            r#"<div class="link-collection"></div>"#
        );
    }

    #[test]
    fn test_script_urls_are_not_anchors() {
        let html = render_links(r#"{"links": [{"url": "javascript:alert(1)"}]}"#).unwrap();
        assert!(!html.contains("href="));
        assert!(html.contains("🔗 Link"));
    }

    #[test]
    fn test_malformed_link_json_is_error() {
        assert!(render_links("{\"links\": [").is_err());
    }

    #[test]
    fn test_chart_payload_roundtrips_through_data_attribute() {
        let original = json!({
            "type": "line",
            "title": "Sales <Q1>",
            "labels": ["Jan", "Feb"],
            "datasets": [{"label": "It's \"good\"", "data": [1, 2]}]
        });
        let html = render_chart(&original.to_string(), Some("abc")).unwrap();
        assert!(html.contains(r#"id="chart-abc""#));
        assert!(html.contains("Sales &lt;Q1&gt;"));

        let re = Regex::new(r#"data-chart-config="([^"]*)""#).unwrap();
        let attr = re.captures(&html).unwrap().get(1).unwrap().as_str();
        let recovered: Value = serde_json::from_str(&html_unescape(attr)).unwrap();
        assert_eq!(recovered, original);
    }

    #[test]
    fn test_chart_with_odd_members_still_renders_canvas() {
        let html = render_chart(r#"{"type":"bar","labels":null,"datasets":[{"data":[1]}]}"#, Some("c1")).unwrap();
        assert!(html.contains(r#"<canvas id="chart-c1""#));
        assert!(html.contains(r#"<div class="chart-title">Chart</div>"#));

        let html = render_chart(r#"{"title": 5, "datasets": "x"}"#, None).unwrap();
        assert!(html.contains("<canvas"));
    }

    #[test]
    fn test_form_keeps_fields_with_odd_members() {
        let html = render_form(
            r#"{"fields":[{"type":"text","label":"Name","required":"true"},{"type":"select","label":"Pick","options":null},{"type":"email","label":"Mail"}]}"#,
        )
        .unwrap();
        assert!(html.contains(r#"Name<span class="required-marker"> *</span>"#));
        assert!(html.contains(r#"<select class="form-select" name="field-1">"#));
        assert!(html.contains(r#"<input type="email" class="form-input" name="field-2""#));
    }

    #[test]
    fn test_chart_rejects_non_object() {
        assert!(render_chart("[1, 2]", None).is_err());
        assert!(render_chart("{not json", None).is_err());
    }

    #[test]
    fn test_form_controls() {
        let form = json!({
            "title": "Signup",
            "fields": [
                {"type": "text", "label": "Name", "placeholder": "Your name", "required": true},
                {"type": "email", "label": "Email"},
                {"type": "textarea", "label": "Bio"},
                {"type": "select", "label": "Plan", "options": ["Free", "Pro"]},
                {"type": "radio", "label": "Size", "options": ["S", "M"]},
                {"type": "checkbox", "label": "Tags", "options": ["a", "b"]},
                {"type": "slider", "label": "Mystery"}
            ]
        });
        let html = render_form(&form.to_string()).unwrap();
        assert!(html.contains(r#"<h3 class="form-title">Signup</h3>"#));
        assert!(html.contains(r#"Name<span class="required-marker"> *</span>"#));
        assert!(html.contains(r#"<input type="text" class="form-input" name="field-0" placeholder="Your name" required>"#));
        assert!(html.contains(r#"<input type="email""#));
        assert!(html.contains(r#"rows="4""#));
        assert!(html.contains(r#"<option value="">Choose...</option><option value="Free">Free</option>"#));
        assert_eq!(html.matches(r#"type="radio" name="field-4""#).count(), 2);
        assert_eq!(html.matches(r#"type="checkbox" name="field-5""#).count(), 2);
        assert!(html.contains(r#"<label class="form-label">Mystery</label></div>"#));
    }
}
