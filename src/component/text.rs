use super::base::{field_view_model, form_rule, state_rule};
use super::{Component, ComponentContext};
use crate::definition::ComponentDefinition;
use crate::error::DefinitionError;
use crate::schema::{Rule, SchemaKeys};
use crate::state::{FormData, State};
use crate::view::{ErrorSummary, FieldViewModel};
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextVariant {
    Text,
    Multiline,
    Telephone,
    Email,
    Number,
}

/// A single free-text input: plain, multiline, telephone, email or number.
#[derive(Debug)]
pub struct TextField {
    definition: ComponentDefinition,
    variant: TextVariant,
    form_rule: Rule,
    state_rule: Rule,
}

impl TextField {
    fn build(definition: &ComponentDefinition, variant: TextVariant) -> Result<Box<dyn Component>, DefinitionError> {
        let base = match variant {
            TextVariant::Number => Rule::number(),
            TextVariant::Email => Rule::string().email(),
            _ => Rule::string(),
        };
        Ok(Box::new(Self {
            form_rule: form_rule(base.clone(), definition),
            state_rule: state_rule(base, definition),
            definition: definition.clone(),
            variant,
        }))
    }

    pub fn text(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, TextVariant::Text)
    }

    pub fn multiline(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, TextVariant::Multiline)
    }

    pub fn telephone(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, TextVariant::Telephone)
    }

    pub fn email(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, TextVariant::Email)
    }

    pub fn number(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, TextVariant::Number)
    }
}

impl Component for TextField {
    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    fn form_schema_keys(&self) -> SchemaKeys {
        SchemaKeys::new().with(self.name(), self.form_rule.clone())
    }

    fn state_schema_keys(&self) -> SchemaKeys {
        SchemaKeys::new().with(self.name(), self.state_rule.clone())
    }

    fn state_from_valid_form(&self, payload: &FormData) -> State {
        let value = match payload.get(self.name()) {
            None => Value::Null,
            Some(Value::String(s)) if s.trim().is_empty() => Value::Null,
            Some(Value::String(s)) if self.variant == TextVariant::Number => parse_number(s),
            Some(value) => value.clone(),
        };
        let mut state = State::new();
        state.insert(self.name().to_string(), value);
        state
    }

    fn view_model(&self, form_data: &FormData, errors: Option<&ErrorSummary>) -> FieldViewModel {
        let mut model = field_view_model(&self.definition, form_data, errors);
        match self.variant {
            TextVariant::Multiline => model.rows = self.definition.options.rows,
            TextVariant::Telephone => {
                model.input_type = Some("tel".to_string());
                model.autocomplete = Some("tel".to_string());
            }
            TextVariant::Email => {
                model.input_type = Some("email".to_string());
                model.autocomplete = Some("email".to_string());
            }
            TextVariant::Number => {
                model.input_type = Some("number".to_string());
                if model.classes.is_none() {
                    model.classes = Some("govuk-input--width-5".to_string());
                }
            }
            TextVariant::Text => {}
        }
        model
    }
}

/// Parses a submitted number, keeping whole numbers as integers. Unparseable text is
/// kept as-is so state validation can report it.
pub(super) fn parse_number(text: &str) -> Value {
    let text = text.trim();
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(text.to_string()), Value::Number)
}
