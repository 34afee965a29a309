//! The authoring format of a form: pages, sections, lists and conditions.
//!
//! These types mirror the persisted JSON one-to-one (camelCase keys, `type` and `if`
//! kept as written) so existing definitions parse unchanged. They carry no behaviour;
//! `Model` compiles them into pages and components.

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod structure;

pub use structure::validate_structure;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FormDefinition {
    pub pages: Vec<PageDefinition>,
    #[serde(default)]
    pub sections: Vec<SectionDefinition>,
    #[serde(default)]
    pub lists: Vec<ListDefinition>,
    #[serde(default)]
    pub conditions: Vec<ConditionDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PageDefinition {
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentDefinition>,
    #[serde(default)]
    pub next: Vec<NextDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SectionDefinition {
    pub name: String,
    pub title: String,
}

/// The value type shared by every item of a list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    String,
    Number,
    Boolean,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::String => "string",
            ListType::Number => "number",
            ListType::Boolean => "boolean",
        }
    }

    /// Whether a JSON value is of this list type.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            ListType::String => value.is_string(),
            ListType::Number => value.is_number(),
            ListType::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ListDefinition {
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub list_type: ListType,
    pub items: Vec<ListItemDefinition>,
}

impl ListDefinition {
    pub fn values(&self) -> Vec<Value> {
        self.items.iter().map(|item| item.value.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ListItemDefinition {
    pub text: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalDefinition>,
}

/// Components revealed when a list item is selected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConditionalDefinition {
    #[serde(default)]
    pub components: Vec<ComponentDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConditionDefinition {
    pub name: String,
    /// The expression text.
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NextDefinition {
    pub path: String,
    /// A condition name, or an inline expression.
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComponentDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub options: ComponentOptions,
    #[serde(default)]
    pub schema: SchemaOptions,
}

impl ComponentDefinition {
    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// A field is optional only when `options.required` is explicitly `false`.
    pub fn is_optional(&self) -> bool {
        self.options.required == Some(false)
    }
}

/// Presentation and binding options. Unrecognised keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComponentOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

/// Constraints applied to a component's base rule. Unrecognised keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<bool>,
    /// An extra value (or array of values) the field accepts as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Value>,
}
