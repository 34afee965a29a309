use super::base::{field_view_model, form_rule, state_rule};
use super::text::parse_number;
use super::{Component, ComponentCollection, ComponentContext};
use crate::definition::{ComponentDefinition, ListDefinition, ListType};
use crate::error::DefinitionError;
use crate::schema::{Rule, SchemaKeys};
use crate::state::{FormData, State, is_truthy, loose_eq, scalar_to_form_string, selects};
use crate::view::{ErrorSummary, FieldViewModel, Fieldset, Hint, ItemViewModel, Label};
use itertools::Itertools;
use serde_json::Value;

/// The synthetic boolean list every model carries.
pub const YES_NO_LIST: &str = "__yesNo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListVariant {
    YesNo,
    Select,
    Radios,
    Checkboxes,
}

/// Components revealed by one list item.
#[derive(Debug)]
struct ConditionalGroup {
    item_index: usize,
    value: Value,
    components: ComponentCollection,
}

/// A field whose value is drawn from a named list: yes/no, select, radios or checkboxes.
///
/// Radios and checkboxes support conditional reveal: a list item may carry components
/// that are shown, and required, only while that item is selected.
#[derive(Debug)]
pub struct ListField {
    definition: ComponentDefinition,
    variant: ListVariant,
    list: ListDefinition,
    form_rule: Rule,
    state_rule: Rule,
    conditionals: Vec<ConditionalGroup>,
}

impl ListField {
    fn build(
        definition: &ComponentDefinition,
        context: &ComponentContext<'_>,
        variant: ListVariant,
    ) -> Result<Box<dyn Component>, DefinitionError> {
        let list = match variant {
            ListVariant::YesNo => context.list_named(YES_NO_LIST).ok_or_else(|| DefinitionError::UnknownList {
                location: context.location.to_string(),
                component: definition.name.clone().unwrap_or_default(),
                list: YES_NO_LIST.to_string(),
            })?,
            _ => context.list_for(definition)?,
        };

        let values = list.values();
        let base = match list.list_type {
            ListType::String => Rule::string(),
            ListType::Number => Rule::number(),
            ListType::Boolean => Rule::boolean(),
        };
        let (form_rule, state_rule) = match variant {
            ListVariant::Select => (
                form_rule(base.clone(), definition),
                state_rule(base, definition).valid(values),
            ),
            ListVariant::YesNo | ListVariant::Radios => (
                form_rule(base.clone(), definition).valid(values.clone()),
                state_rule(base, definition).valid(values),
            ),
            ListVariant::Checkboxes => {
                let choice = base.valid(values);
                let either = Rule::alternatives(vec![choice.clone(), Rule::array(choice)]);
                (form_rule(either.clone(), definition), state_rule(either, definition))
            }
        };

        let conditionals = match variant {
            ListVariant::Radios | ListVariant::Checkboxes => Self::conditional_groups(list, context)?,
            _ => Vec::new(),
        };

        Ok(Box::new(Self {
            definition: definition.clone(),
            variant,
            list: list.clone(),
            form_rule,
            state_rule,
            conditionals,
        }))
    }

    fn conditional_groups(
        list: &ListDefinition,
        context: &ComponentContext<'_>,
    ) -> Result<Vec<ConditionalGroup>, DefinitionError> {
        list.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let conditional = item.conditional.as_ref()?;
                (!conditional.components.is_empty()).then_some((index, item, conditional))
            })
            .map(|(item_index, item, conditional)| {
                Ok(ConditionalGroup {
                    item_index,
                    value: item.value.clone(),
                    components: ComponentCollection::new(&conditional.components, context)?,
                })
            })
            .collect()
    }

    pub fn yes_no(definition: &ComponentDefinition, context: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, context, ListVariant::YesNo)
    }

    pub fn select(definition: &ComponentDefinition, context: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, context, ListVariant::Select)
    }

    pub fn radios(definition: &ComponentDefinition, context: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, context, ListVariant::Radios)
    }

    pub fn checkboxes(definition: &ComponentDefinition, context: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, context, ListVariant::Checkboxes)
    }

    pub fn list(&self) -> &ListDefinition {
        &self.list
    }

    /// Converts a submitted string to the list's value type.
    fn coerce(&self, value: &Value) -> Value {
        match (value, self.list.list_type) {
            (Value::String(s), ListType::Number) => parse_number(s),
            (Value::String(s), ListType::Boolean) => match s.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => value.clone(),
            },
            _ => value.clone(),
        }
    }

    fn item_text(&self, value: &Value) -> Option<&str> {
        self.list
            .items
            .iter()
            .find(|item| loose_eq(&item.value, value))
            .map(|item| item.text.as_str())
    }
}

impl Component for ListField {
    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    /// Nested fields get a rule keyed on this field's value: required while their item
    /// is selected, otherwise optional and allowed to be empty.
    fn form_schema_keys(&self) -> SchemaKeys {
        let mut keys = SchemaKeys::new().with(self.name(), self.form_rule.clone());
        for group in &self.conditionals {
            for (key, rule) in group.components.form_schema_keys() {
                let revealed = rule.clone().required();
                let hidden = rule.optional().allow(Value::String(String::new()));
                keys.insert(&key, Rule::when(self.name(), group.value.clone(), revealed, hidden));
            }
        }
        keys
    }

    fn state_schema_keys(&self) -> SchemaKeys {
        let mut keys = SchemaKeys::new().with(self.name(), self.state_rule.clone());
        for group in &self.conditionals {
            for (key, rule) in group.components.state_schema_keys() {
                let revealed = rule.clone().required();
                let hidden = rule.optional().allow(Value::Null);
                keys.insert(&key, Rule::when(self.name(), group.value.clone(), revealed, hidden));
            }
        }
        keys
    }

    fn form_data_from_state(&self, state: &State) -> FormData {
        let mut form_data = FormData::new();
        if let Some(value) = state.get(self.name()) {
            let form_value = match value {
                Value::Array(items) => {
                    Value::Array(items.iter().map(|v| Value::String(scalar_to_form_string(v))).collect())
                }
                other => Value::String(scalar_to_form_string(other)),
            };
            form_data.insert(self.name().to_string(), form_value);
        }
        for group in &self.conditionals {
            form_data.extend(group.components.form_data_from_state(state));
        }
        form_data
    }

    /// Answers of nested fields whose item is not selected are dropped when empty, so
    /// they never reach state validation.
    fn state_from_valid_form(&self, payload: &FormData) -> State {
        let value = match payload.get(self.name()) {
            None => Value::Null,
            Some(Value::String(s)) if s.is_empty() => Value::Null,
            Some(Value::Array(items)) => Value::Array(items.iter().map(|v| self.coerce(v)).collect()),
            Some(other) => self.coerce(other),
        };

        let mut state = State::new();
        for group in &self.conditionals {
            let revealed = selects(&value, &group.value);
            for (key, nested) in group.components.state_from_valid_form(payload) {
                if revealed || is_truthy(&nested) {
                    state.insert(key, nested);
                }
            }
        }
        state.insert(self.name().to_string(), value);
        state
    }

    fn display_string(&self, state: &State) -> String {
        match state.get(self.name()) {
            Some(Value::Array(values)) => values.iter().filter_map(|v| self.item_text(v)).join(", "),
            Some(value) => self.item_text(value).unwrap_or_default().to_string(),
            None => String::new(),
        }
    }

    fn view_model(&self, form_data: &FormData, errors: Option<&ErrorSummary>) -> FieldViewModel {
        let mut model = field_view_model(&self.definition, form_data, errors);
        let selected = form_data.get(self.name()).cloned().unwrap_or(Value::Null);
        let bold = self.definition.options.bold == Some(true);

        let mut items: Vec<ItemViewModel> = self
            .list
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemViewModel {
                text: item.text.clone(),
                value: item.value.clone(),
                checked: selects(&selected, &item.value),
                hint: item.description.as_ref().map(|html| Hint { html: html.clone() }),
                label: bold.then(|| Label {
                    classes: Some("govuk-label--s".to_string()),
                    ..Label::default()
                }),
                conditional: self
                    .conditionals
                    .iter()
                    .find(|group| group.item_index == index)
                    .map(|group| group.components.view_model(form_data, errors)),
            })
            .collect();

        match self.variant {
            ListVariant::Select => {
                items.insert(
                    0,
                    ItemViewModel {
                        text: String::new(),
                        value: Value::String(String::new()),
                        checked: !items.iter().any(|item| item.checked),
                        hint: None,
                        label: None,
                        conditional: None,
                    },
                );
            }
            ListVariant::YesNo | ListVariant::Radios | ListVariant::Checkboxes => {
                if self.variant == ListVariant::YesNo && model.classes.is_none() {
                    model.classes = Some("govuk-radios--inline".to_string());
                }
                model.fieldset = model.label.clone().map(|legend| Fieldset { legend });
            }
        }
        model.items = items;
        model
    }
}
