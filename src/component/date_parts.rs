use super::base::{field_view_model, part_label, state_rule};
use super::{Component, ComponentContext};
use crate::definition::ComponentDefinition;
use crate::error::DefinitionError;
use crate::schema::dates::{display_stored, format_date, format_datetime, parse_date, parse_datetime};
use crate::schema::{Rule, SchemaKeys};
use crate::state::{FormData, State};
use crate::view::{ComponentViewModel, ErrorMessage, ErrorSummary, FieldViewModel, Fieldset, Label};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde_json::Value;

struct Part {
    key: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    width: &'static str,
}

static PARTS: [Part; 5] = [
    Part { key: "day", label: "Day", min: 1.0, max: 31.0, width: "govuk-input--width-2" },
    Part { key: "month", label: "Month", min: 1.0, max: 12.0, width: "govuk-input--width-2" },
    Part { key: "year", label: "Year", min: 1000.0, max: 3000.0, width: "govuk-input--width-4" },
    Part { key: "hour", label: "Hour", min: 0.0, max: 23.0, width: "govuk-input--width-2" },
    Part { key: "minute", label: "Minute", min: 0.0, max: 59.0, width: "govuk-input--width-2" },
];

/// A date (day, month, year) or date and time (plus hour, minute) entered as separate
/// numeric inputs named `{name}__day`, `{name}__month` and so on.
///
/// Each part is validated on its own. Assembling state stores `null` only when every part
/// is blank; parts that are present but do not form a real calendar date are kept as
/// entered, so the state rule reports them.
#[derive(Debug)]
pub struct DatePartsField {
    definition: ComponentDefinition,
    with_time: bool,
    state_rule: Rule,
}

impl DatePartsField {
    fn build(definition: &ComponentDefinition, with_time: bool) -> Result<Box<dyn Component>, DefinitionError> {
        let base = if with_time { Rule::datetime() } else { Rule::date() };
        Ok(Box::new(Self {
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

    fn parts(&self) -> &'static [Part] {
        if self.with_time { &PARTS } else { &PARTS[..3] }
    }

    fn part_name(&self, part: &Part) -> String {
        format!("{}__{}", self.name(), part.key)
    }

    fn part_value(&self, payload: &FormData, part: &Part) -> Option<u32> {
        match payload.get(&self.part_name(part))? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn entered(&self, payload: &FormData, part: &Part) -> String {
        match payload.get(&self.part_name(part)) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// The parts as typed, laid out like a stored value, e.g. `2024--5` for a missing month.
    fn entered_text(&self, payload: &FormData) -> String {
        let [day, month, year, time @ ..] = self.parts() else {
            return String::new();
        };
        let date = format!(
            "{}-{}-{}",
            self.entered(payload, year),
            self.entered(payload, month),
            self.entered(payload, day)
        );
        match time {
            [hour, minute] => format!("{}T{}:{}", date, self.entered(payload, hour), self.entered(payload, minute)),
            _ => date,
        }
    }

    /// Assembles the parts into a canonical date string, or `None` when a part is
    /// missing or the combination is not a real date.
    fn assemble(&self, payload: &FormData) -> Option<String> {
        let values = self
            .parts()
            .iter()
            .map(|part| self.part_value(payload, part))
            .collect::<Option<Vec<u32>>>()?;
        let date = NaiveDate::from_ymd_opt(i32::try_from(values[2]).ok()?, values[1], values[0])?;
        if self.with_time {
            let time = NaiveTime::from_hms_opt(values[3], values[4], 0)?;
            Some(format_datetime(NaiveDateTime::new(date, time)))
        } else {
            Some(format_date(date))
        }
    }
}

impl Component for DatePartsField {
    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    fn form_schema_keys(&self) -> SchemaKeys {
        let title = self.definition.title_text();
        let optional = self.definition.is_optional();
        self.parts().iter().fold(SchemaKeys::new(), |keys, part| {
            let rule = Rule::number()
                .integer()
                .min(part.min)
                .max(part.max)
                .label(&part_label(title, part.label));
            let rule = if optional {
                rule.allow(Value::String(String::new()))
            } else {
                rule.required()
            };
            keys.with(&self.part_name(part), rule)
        })
    }

    fn state_schema_keys(&self) -> SchemaKeys {
        SchemaKeys::new().with(self.name(), self.state_rule.clone())
    }

    fn form_data_from_state(&self, state: &State) -> FormData {
        let mut form_data = FormData::new();
        let Some(text) = state.get(self.name()).and_then(Value::as_str) else {
            return form_data;
        };
        let moment = if self.with_time {
            parse_datetime(text)
        } else {
            parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0))
        };
        if let Some(moment) = moment {
            let values = [moment.day(), moment.month(), moment.year().unsigned_abs(), moment.hour(), moment.minute()];
            for (part, value) in self.parts().iter().zip(values) {
                form_data.insert(self.part_name(part), Value::String(value.to_string()));
            }
        }
        form_data
    }

    fn state_from_valid_form(&self, payload: &FormData) -> State {
        let value = match self.assemble(payload) {
            Some(text) => Value::String(text),
            None if self.parts().iter().all(|part| self.entered(payload, part).is_empty()) => Value::Null,
            // Kept as entered so the state rule rejects it.
            None => Value::String(self.entered_text(payload)),
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
        let mut first_error = model.error_message.clone();

        model.children = self
            .parts()
            .iter()
            .map(|part| {
                let name = self.part_name(part);
                let error = errors.and_then(|e| e.message_for(&name));
                if first_error.is_none() {
                    first_error = error.map(|text| ErrorMessage { text: text.to_string() });
                }
                let classes = if error.is_some() {
                    format!("{} govuk-input--error", part.width)
                } else {
                    part.width.to_string()
                };
                ComponentViewModel {
                    kind: "NumberField".to_string(),
                    is_form_component: true,
                    model: FieldViewModel {
                        label: Some(Label {
                            text: part.label.to_string(),
                            ..Label::default()
                        }),
                        id: Some(name.clone()),
                        value: form_data.get(&name).cloned(),
                        name: Some(name),
                        classes: Some(classes),
                        input_type: Some("number".to_string()),
                        ..FieldViewModel::default()
                    },
                }
            })
            .collect();

        model.error_message = first_error;
        model.value = None;
        model.fieldset = model.label.take().map(|mut legend| {
            legend.classes = Some("govuk-fieldset__legend--s".to_string());
            Fieldset { legend }
        });
        model
    }
}
