use crate::definition::{ComponentDefinition, SchemaOptions};
use crate::schema::Rule;
use crate::state::FormData;
use crate::view::{ErrorMessage, ErrorSummary, FieldViewModel, Hint, Label};
use serde_json::Value;

/// Applies the definition's `schema` constraints to a base rule.
fn apply_schema_options(mut rule: Rule, schema: &SchemaOptions) -> Rule {
    if let Some(min) = schema.min {
        rule = rule.min(min);
    }
    if let Some(max) = schema.max {
        rule = rule.max(max);
    }
    if schema.trim == Some(false) {
        rule = rule.trim(false);
    }
    match &schema.allow {
        Some(Value::Array(values)) => values.iter().fold(rule, |r, v| r.allow(v.clone())),
        Some(value) => rule.allow(value.clone()),
        None => rule,
    }
}

/// The rule for a submitted value: required unless the field is optional, in which case
/// an empty string is accepted.
pub(super) fn form_rule(base: Rule, definition: &ComponentDefinition) -> Rule {
    let mut rule = apply_schema_options(base, &definition.schema);
    if let Some(title) = &definition.title {
        rule = rule.label(title);
    }
    if definition.is_optional() {
        rule.allow(Value::String(String::new()))
    } else {
        rule.required()
    }
}

/// The rule for a stored value: required unless the field is optional, in which case
/// `null` is accepted.
pub(super) fn state_rule(base: Rule, definition: &ComponentDefinition) -> Rule {
    let mut rule = apply_schema_options(base, &definition.schema);
    if let Some(title) = &definition.title {
        rule = rule.label(title);
    }
    if definition.is_optional() {
        rule.allow(Value::Null)
    } else {
        rule.required()
    }
}

pub(super) fn label_text(definition: &ComponentDefinition) -> String {
    if definition.is_optional() {
        format!("{} (optional)", definition.title_text())
    } else {
        definition.title_text().to_string()
    }
}

/// The view model every form field starts from.
pub(super) fn field_view_model(
    definition: &ComponentDefinition,
    form_data: &FormData,
    errors: Option<&ErrorSummary>,
) -> FieldViewModel {
    let name = definition.name.clone().unwrap_or_default();
    FieldViewModel {
        label: Some(Label {
            text: label_text(definition),
            classes: Some("govuk-label--s".to_string()),
            ..Label::default()
        }),
        value: form_data.get(&name).cloned(),
        hint: definition.hint.as_ref().map(|html| Hint { html: html.clone() }),
        classes: definition.options.classes.clone(),
        error_message: errors
            .and_then(|e| e.message_for(&name))
            .map(|text| ErrorMessage { text: text.to_string() }),
        id: Some(name.clone()),
        name: Some(name),
        ..FieldViewModel::default()
    }
}

/// The label of one part of a composite field, e.g. `Date of birth day`.
pub(super) fn part_label(title: &str, part: &str) -> String {
    if title.is_empty() {
        part.to_string()
    } else {
        format!("{} {}", title, part.to_lowercase())
    }
}
