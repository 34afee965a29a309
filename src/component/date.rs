use super::base::{field_view_model, form_rule, state_rule};
use super::{Component, ComponentContext};
use crate::definition::ComponentDefinition;
use crate::error::DefinitionError;
use crate::schema::dates::{
    datetime_input_value, display_stored, format_date, format_datetime, parse_date, parse_datetime,
};
use crate::schema::{Rule, SchemaKeys};
use crate::state::{FormData, State};
use crate::view::{ErrorSummary, FieldViewModel};
use serde_json::Value;

/// A date, or date and time, submitted as a single string.
///
/// State holds the canonical ISO text (`2024-03-05`, `2024-03-05T14:30:00`).
#[derive(Debug)]
pub struct DateField {
    definition: ComponentDefinition,
    with_time: bool,
    form_rule: Rule,
    state_rule: Rule,
}

impl DateField {
    fn build(definition: &ComponentDefinition, with_time: bool) -> Result<Box<dyn Component>, DefinitionError> {
        let base = if with_time { Rule::datetime() } else { Rule::date() };
        Ok(Box::new(Self {
            form_rule: form_rule(base.clone(), definition),
            state_rule: state_rule(base, definition),
            definition: definition.clone(),
            with_time,
        }))
    }

    pub fn date(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, false)
    }

    pub fn datetime(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, true)
    }

    /// Rewrites any accepted spelling into the canonical stored form.
    fn canonical(&self, text: &str) -> Option<String> {
        if self.with_time {
            parse_datetime(text).map(format_datetime)
        } else {
            parse_date(text).map(format_date)
        }
    }
}

impl Component for DateField {
    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    fn form_schema_keys(&self) -> SchemaKeys {
        SchemaKeys::new().with(self.name(), self.form_rule.clone())
    }

    fn state_schema_keys(&self) -> SchemaKeys {
        SchemaKeys::new().with(self.name(), self.state_rule.clone())
    }

    fn form_data_from_state(&self, state: &State) -> FormData {
        let mut form_data = FormData::new();
        let Some(value) = state.get(self.name()) else {
            return form_data;
        };
        let text = match value.as_str() {
            Some(s) if self.with_time => parse_datetime(s).map_or_else(|| s.to_string(), datetime_input_value),
            Some(s) => s.to_string(),
            None => String::new(),
        };
        form_data.insert(self.name().to_string(), Value::String(text));
        form_data
    }

    fn state_from_valid_form(&self, payload: &FormData) -> State {
        let value = match payload.get(self.name()).and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => {
                Value::String(self.canonical(s).unwrap_or_else(|| s.to_string()))
            }
            _ => Value::Null,
        };
        let mut state = State::new();
        state.insert(self.name().to_string(), value);
        state
    }

    fn display_string(&self, state: &State) -> String {
        state
            .get(self.name())
            .and_then(Value::as_str)
            .map(|text| display_stored(text, self.with_time))
            .unwrap_or_default()
    }

    fn view_model(&self, form_data: &FormData, errors: Option<&ErrorSummary>) -> FieldViewModel {
        let mut model = field_view_model(&self.definition, form_data, errors);
        model.input_type = Some(if self.with_time { "datetime-local" } else { "date" }.to_string());
        if model.classes.is_none() && !self.with_time {
            model.classes = Some("govuk-input--width-10".to_string());
        }
        model
    }
}
