//! Rendering-agnostic view models.
//!
//! Pages and components describe what to render through these structures; turning them
//! into markup is the renderer's job. Field names serialize in camelCase, the shape
//! GOV.UK style templates consume.

use crate::error::ValidationError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    /// Replaces `text` when set, e.g. to prepend a section caption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_page_heading: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Hint {
    pub html: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorMessage {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Fieldset {
    pub legend: Label,
}

/// One selectable option of a list-backed field.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemViewModel {
    pub text: String,
    pub value: Value,
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<Hint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    /// Components revealed when this item is selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Vec<ComponentViewModel>>,
}

/// The view model of one field or content block. Variants fill in what they need.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldViewModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<Hint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<ErrorMessage>,
    /// The HTML input type, for fields rendered as an `<input>`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fieldset: Option<Fieldset>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemViewModel>,
    /// Sub-fields of a composite field, such as date parts or address lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentViewModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_fallback_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentViewModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub is_form_component: bool,
    pub model: FieldViewModel,
}

/// One entry of an error summary, linking to the offending field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorItem {
    /// Dotted path of the failing value.
    pub path: String,
    /// Anchor of the field, `#name`.
    pub href: String,
    /// The field name, path segments joined with `__`.
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    pub title_text: String,
    pub error_list: Vec<ErrorItem>,
}

impl ErrorSummary {
    pub fn from_validation(title: &str, error: &ValidationError) -> Self {
        let error_list = error
            .details
            .iter()
            .map(|detail| {
                let name = detail.path.join("__");
                ErrorItem {
                    path: detail.dotted_path(),
                    href: format!("#{}", name),
                    name,
                    text: detail.message.clone(),
                }
            })
            .collect();
        Self {
            title_text: title.to_string(),
            error_list,
        }
    }

    /// The message for a field, if it failed. The last matching entry wins.
    pub fn message_for(&self, name: &str) -> Option<&str> {
        self.error_list
            .iter()
            .rev()
            .find(|item| item.name == name)
            .map(|item| item.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.error_list.is_empty()
    }
}

/// Everything needed to render one page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageViewModel {
    pub path: String,
    pub page_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    pub show_title: bool,
    pub components: Vec<ComponentViewModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorSummary>,
}
