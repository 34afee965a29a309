use super::base::label_text;
use super::{Component, ComponentContext};
use crate::address::POSTCODE_REGEX;
use crate::definition::ComponentDefinition;
use crate::error::DefinitionError;
use crate::schema::{Rule, SchemaKeys};
use crate::state::{FormData, State};
use crate::view::{ComponentViewModel, ErrorMessage, ErrorSummary, FieldViewModel, Fieldset, Hint, Label};
use itertools::Itertools;
use serde_json::{Map, Value};

struct AddressPart {
    key: &'static str,
    label: &'static str,
    /// Whether the part must be filled in when the address is required.
    core: bool,
    autocomplete: &'static str,
}

static PARTS: [AddressPart; 5] = [
    AddressPart { key: "premises", label: "Building number or name", core: true, autocomplete: "address-line1" },
    AddressPart { key: "street", label: "Street", core: false, autocomplete: "address-line2" },
    AddressPart { key: "locality", label: "Locality", core: false, autocomplete: "address-line3" },
    AddressPart { key: "town", label: "Town or city", core: true, autocomplete: "address-level2" },
    AddressPart { key: "postcode", label: "Postcode", core: true, autocomplete: "postal-code" },
];

/// A UK postal address entered as five text inputs, `{name}__premises` to
/// `{name}__postcode`, and stored as one object (or `null` when left empty).
#[derive(Debug)]
pub struct UkAddressField {
    definition: ComponentDefinition,
}

impl UkAddressField {
    pub fn build(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Ok(Box::new(Self {
            definition: definition.clone(),
        }))
    }

    fn part_name(&self, part: &AddressPart) -> String {
        format!("{}__{}", self.name(), part.key)
    }

    fn part_rule(&self, part: &AddressPart) -> Rule {
        let mut rule = Rule::string().max(100.0).label(part.label);
        if part.key == "postcode" {
            rule = rule.max(10.0).pattern(POSTCODE_REGEX.clone());
        }
        if part.core && !self.definition.is_optional() {
            rule.required()
        } else {
            rule.allow(Value::String(String::new()))
        }
    }
}

impl Component for UkAddressField {
    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    fn form_schema_keys(&self) -> SchemaKeys {
        PARTS.iter().fold(SchemaKeys::new(), |keys, part| {
            keys.with(&self.part_name(part), self.part_rule(part))
        })
    }

    fn state_schema_keys(&self) -> SchemaKeys {
        let keys = PARTS.iter().fold(SchemaKeys::new(), |keys, part| {
            keys.with(part.key, self.part_rule(part))
        });
        let mut rule = Rule::object(keys).label(self.title());
        rule = if self.definition.is_optional() {
            rule.allow(Value::Null)
        } else {
            rule.required()
        };
        SchemaKeys::new().with(self.name(), rule)
    }

    fn form_data_from_state(&self, state: &State) -> FormData {
        let mut form_data = FormData::new();
        if let Some(Value::Object(address)) = state.get(self.name()) {
            for part in &PARTS {
                let value = address.get(part.key).and_then(Value::as_str).unwrap_or_default();
                form_data.insert(self.part_name(part), Value::String(value.to_string()));
            }
        }
        form_data
    }

    fn state_from_valid_form(&self, payload: &FormData) -> State {
        let address: Map<String, Value> = PARTS
            .iter()
            .map(|part| {
                let value = payload
                    .get(&self.part_name(part))
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .unwrap_or_default();
                (part.key.to_string(), Value::String(value.to_string()))
            })
            .collect();
        let is_empty = address.values().all(|v| v.as_str().is_some_and(str::is_empty));

        let mut state = State::new();
        state.insert(
            self.name().to_string(),
            if is_empty { Value::Null } else { Value::Object(address) },
        );
        state
    }

    fn display_string(&self, state: &State) -> String {
        let Some(Value::Object(address)) = state.get(self.name()) else {
            return String::new();
        };
        PARTS
            .iter()
            .filter_map(|part| address.get(part.key).and_then(Value::as_str))
            .filter(|value| !value.is_empty())
            .join(", ")
    }

    fn view_model(&self, form_data: &FormData, errors: Option<&ErrorSummary>) -> FieldViewModel {
        let name = self.name().to_string();
        let mut first_error = errors
            .and_then(|e| e.message_for(&name))
            .map(|text| ErrorMessage { text: text.to_string() });

        let children: Vec<ComponentViewModel> = PARTS
            .iter()
            .map(|part| {
                let part_name = self.part_name(part);
                let error = errors
                    .and_then(|e| e.message_for(&part_name))
                    .map(|text| ErrorMessage { text: text.to_string() });
                if first_error.is_none() {
                    first_error = error.clone();
                }
                let optional = !part.core || self.definition.is_optional();
                ComponentViewModel {
                    kind: "TextField".to_string(),
                    is_form_component: true,
                    model: FieldViewModel {
                        label: Some(Label {
                            text: if optional {
                                format!("{} (optional)", part.label)
                            } else {
                                part.label.to_string()
                            },
                            ..Label::default()
                        }),
                        id: Some(part_name.clone()),
                        value: form_data.get(&part_name).cloned(),
                        name: Some(part_name),
                        classes: (part.key == "postcode").then(|| "govuk-input--width-10".to_string()),
                        autocomplete: Some(part.autocomplete.to_string()),
                        error_message: error,
                        ..FieldViewModel::default()
                    },
                }
            })
            .collect();

        FieldViewModel {
            fieldset: Some(Fieldset {
                legend: Label {
                    text: label_text(&self.definition),
                    classes: Some("govuk-fieldset__legend--s".to_string()),
                    ..Label::default()
                },
            }),
            id: Some(name.clone()),
            name: Some(name),
            hint: self.definition.hint.as_ref().map(|html| Hint { html: html.clone() }),
            classes: self.definition.options.classes.clone(),
            error_message: first_error,
            children,
            ..FieldViewModel::default()
        }
    }
}
