//! Data models for the notes application.
//!
//! Chats group generated content entities. Every content entity carries one of
//! seven concrete kinds; the `auto` hint only exists at request time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Content Kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Note,
    Table,
    List,
    Diagram,
    Link,
    Chart,
    Form,
}

impl ContentKind {
    pub const ALL: [ContentKind; 7] = [
        ContentKind::Note,
        ContentKind::Table,
        ContentKind::List,
        ContentKind::Diagram,
        ContentKind::Link,
        ContentKind::Chart,
        ContentKind::Form,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Note => "note",
            ContentKind::Table => "table",
            ContentKind::List => "list",
            ContentKind::Diagram => "diagram",
            ContentKind::Link => "link",
            ContentKind::Chart => "chart",
            ContentKind::Form => "form",
        }
    }

    /// Kinds whose content is stored as a JSON document.
    pub fn is_json(&self) -> bool {
        matches!(self, ContentKind::Link | ContentKind::Chart | ContentKind::Form)
    }

    pub fn style(&self) -> KindStyle {
        match self {
            ContentKind::Note => KindStyle::new("📝", "Note", "#f59e0b"),
            ContentKind::Table => KindStyle::new("📊", "Table", "#06b6d4"),
            ContentKind::List => KindStyle::new("✅", "List", "#10b981"),
            ContentKind::Diagram => KindStyle::new("🔄", "Diagram", "#8b5cf6"),
            ContentKind::Link => KindStyle::new("🔗", "Link Collection", "#ec4899"),
            ContentKind::Chart => KindStyle::new("📈", "Chart", "#3b82f6"),
            ContentKind::Form => KindStyle::new("📋", "Form", "#f43f5e"),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown content kind: {}", s))
    }
}

/// The kind requested before generation: either a concrete kind or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContentHint {
    #[default]
    Auto,
    Kind(ContentKind),
}

impl ContentHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentHint::Auto => "auto",
            ContentHint::Kind(k) => k.as_str(),
        }
    }

    pub fn style(&self) -> KindStyle {
        match self {
            ContentHint::Auto => KindStyle::new("🤖", "Auto", "#667eea"),
            ContentHint::Kind(k) => k.style(),
        }
    }
}

impl FromStr for ContentHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") || s.trim().is_empty() {
            Ok(ContentHint::Auto)
        } else {
            s.parse().map(ContentHint::Kind)
        }
    }
}

impl TryFrom<String> for ContentHint {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ContentHint> for String {
    fn from(h: ContentHint) -> Self {
        h.as_str().to_string()
    }
}

impl From<ContentKind> for ContentHint {
    fn from(k: ContentKind) -> Self {
        ContentHint::Kind(k)
    }
}

/// Badge presentation for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindStyle {
    pub icon: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

impl KindStyle {
    const fn new(icon: &'static str, label: &'static str, color: &'static str) -> Self {
        Self { icon, label, color }
    }
}

// ============================================================================
// Stored Entities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatEntity {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentEntity {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub content: String,
    pub prompt: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a content entity; the store assigns id and time.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub chat_id: String,
    pub user_id: String,
    pub kind: ContentKind,
    pub content: String,
    pub prompt: String,
    pub model: String,
}

// ============================================================================
// Structured Payloads
// ============================================================================
//
// Parsing is lenient about missing optional members (a missing `links` array
// is an empty collection) but strict about the document being a JSON object.

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkCollection {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub links: Vec<LinkEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkEntry {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FormSpec {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FormField {
    #[serde(rename = "type", default, deserialize_with = "lenient_string_or_empty")]
    pub field_type: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub required: bool,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_rows", skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

/// Controls a form field can render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldControl {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Unknown,
}

impl FormField {
    pub fn control(&self) -> FieldControl {
        match self.field_type.trim().to_ascii_lowercase().as_str() {
            "text" => FieldControl::Text,
            "email" => FieldControl::Email,
            "number" => FieldControl::Number,
            "textarea" => FieldControl::Textarea,
            "select" => FieldControl::Select,
            "radio" => FieldControl::Radio,
            "checkbox" => FieldControl::Checkbox,
            _ => FieldControl::Unknown,
        }
    }

    /// Option labels; non-string options (numbers, booleans) use their JSON text.
    pub fn option_labels(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|o| match o {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Treats a non-array value as an empty list and skips malformed elements.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Strings pass through, numbers and booleans use their JSON text, anything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// JavaScript truthiness: `false`, `0`, `""` and `null` are false.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Row counts given as numbers or numeric strings; anything else is absent.
fn lenient_rows<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

// ============================================================================
// Request Bodies
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageForm {
    pub prompt: String,
    #[serde(default)]
    pub kind: ContentHint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameChatForm {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManualEditForm {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiEditForm {
    pub instruction: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleItemRequest {
    pub checked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `?notice=` carried across a redirect and shown as a toast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleItemResponse {
    pub ok: bool,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parse_roundtrip() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>().unwrap(), kind);
        }
        assert!("auto".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_hint_parse() {
        assert_eq!("auto".parse::<ContentHint>().unwrap(), ContentHint::Auto);
        assert_eq!("".parse::<ContentHint>().unwrap(), ContentHint::Auto);
        assert_eq!(
            "Chart".parse::<ContentHint>().unwrap(),
            ContentHint::Kind(ContentKind::Chart)
        );
        assert!("poem".parse::<ContentHint>().is_err());
    }

    #[test]
    fn test_entity_serializes_kind_as_type() {
        let entity = ContentEntity {
            id: "c1".into(),
            chat_id: "chat".into(),
            user_id: "local".into(),
            kind: ContentKind::List,
            content: "- [ ] a".into(),
            prompt: "todo".into(),
            model: "gpt-4o".into(),
            created_at: Utc::now(),
        };
        let v = serde_json::to_value(&entity).unwrap();
        assert_eq!(v["type"], "list");
    }

    #[test]
    fn test_link_collection_non_array_is_empty() {
        let links: LinkCollection = serde_json::from_str(r#"{"links": "nope"}"#).unwrap();
        assert!(links.links.is_empty());
        let links: LinkCollection = serde_json::from_str("{}").unwrap();
        assert!(links.links.is_empty());
    }

    #[test]
    fn test_link_collection_shape_roundtrip() {
        let original = json!({
            "links": [
                {"title": "Rust", "url": "https://www.rust-lang.org", "description": "Home"},
                {"url": "https://docs.rs"}
            ]
        });
        let parsed: LinkCollection = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), original);
    }

    #[test]
    fn test_form_shape_roundtrip() {
        let original = json!({
            "title": "Survey",
            "fields": [
                {"type": "text", "label": "Name", "placeholder": "Your name", "required": true},
                {"type": "radio", "label": "Pick", "required": false, "options": ["A", "B"]},
                {"type": "textarea", "label": "Notes", "required": false, "rows": 6}
            ]
        });
        let parsed: FormSpec = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), original);
    }

    #[test]
    fn test_form_field_members_are_tolerant() {
        let form: FormSpec = serde_json::from_value(json!({
            "fields": [
                {"type": "text", "label": "Name", "required": "true"},
                {"type": "select", "label": "Pick", "options": null},
                {"type": "textarea", "label": "Bio", "rows": "4"},
                {"type": 7, "label": 42, "required": 0},
                {"type": "email", "label": "Mail"}
            ]
        }))
        .unwrap();
        assert_eq!(form.fields.len(), 5);
        assert!(form.fields[0].required);
        assert!(form.fields[1].options.is_empty());
        assert_eq!(form.fields[2].rows, Some(4));
        assert_eq!(form.fields[3].label.as_deref(), Some("42"));
        assert!(!form.fields[3].required);
        assert_eq!(form.fields[3].control(), FieldControl::Unknown);
    }

    #[test]
    fn test_link_entry_with_odd_members_is_kept() {
        let links: LinkCollection =
            serde_json::from_str(r#"{"links": [{"title": null, "url": 5, "description": []}]}"#).unwrap();
        assert_eq!(links.links.len(), 1);
        assert_eq!(links.links[0].url, "5");
        assert!(links.links[0].title.is_none());
    }

    #[test]
    fn test_field_control_and_option_labels() {
        let field: FormField =
            serde_json::from_value(json!({"type": "Select", "options": ["x", 2, true]})).unwrap();
        assert_eq!(field.control(), FieldControl::Select);
        assert_eq!(field.option_labels(), vec!["x", "2", "true"]);
        let odd: FormField = serde_json::from_value(json!({"type": "slider"})).unwrap();
        assert_eq!(odd.control(), FieldControl::Unknown);
    }
}
