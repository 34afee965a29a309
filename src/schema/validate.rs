use super::dates::{format_date, format_datetime, parse_date, parse_datetime};
use super::{NumberRule, ObjectRule, Rule, RuleKind, StringRule, WhenRule};
use crate::error::{ValidationDetail, ValidationError};
use crate::state::{loose_eq, scalar_to_form_string, selects};
use serde_json::{Map, Number, Value};

/// Options that apply to a whole validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Accept keys that no object rule declares, passing them through unchanged.
    pub allow_unknown: bool,
}

pub(super) fn validate(
    rule: &Rule,
    value: &Value,
    options: &ValidationOptions,
) -> Result<Value, ValidationError> {
    let mut validator = Validator {
        options,
        errors: Vec::new(),
    };
    let mut path = Vec::new();
    let converted = validator.check(rule, Some(value), &mut path, None, None);
    if validator.errors.is_empty() {
        Ok(converted.unwrap_or(Value::Null))
    } else {
        Err(ValidationError {
            details: validator.errors,
        })
    }
}

struct Validator<'o> {
    options: &'o ValidationOptions,
    errors: Vec<ValidationDetail>,
}

impl Validator<'_> {
    /// Checks one value and returns its converted form, or `None` when the key is absent.
    fn check(
        &mut self,
        rule: &Rule,
        value: Option<&Value>,
        path: &mut Vec<String>,
        siblings: Option<&Map<String, Value>>,
        inherited_label: Option<&str>,
    ) -> Option<Value> {
        let label = rule
            .label
            .as_deref()
            .or(inherited_label)
            .or(path.last().map(String::as_str))
            .unwrap_or("value")
            .to_string();

        if let RuleKind::When(when) = &rule.kind {
            let branch = self.resolve_when(when, siblings);
            return self.check(branch, value, path, siblings, Some(&label));
        }

        let Some(value) = value else {
            if rule.is_required() {
                self.fail(path, &label, "is required", "any.required");
            }
            return None;
        };

        if rule.allow.contains(value) {
            return Some(value.clone());
        }
        if value.is_null() && !matches!(rule.kind, RuleKind::Any) {
            self.fail_base(rule, path, &label);
            return Some(Value::Null);
        }

        let converted = match &rule.kind {
            RuleKind::Any => Some(value.clone()),
            RuleKind::String(s) => self.check_string(s, rule, value, path, &label),
            RuleKind::Number(n) => self.check_number(n, value, path, &label),
            RuleKind::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
                Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
                _ => self.fail_base(rule, path, &label),
            },
            RuleKind::Date => match value.as_str().and_then(parse_date) {
                Some(date) => Some(Value::String(format_date(date))),
                None => self.fail_base(rule, path, &label),
            },
            RuleKind::DateTime => match value.as_str().and_then(parse_datetime) {
                Some(dt) => Some(Value::String(format_datetime(dt))),
                None => self.fail_base(rule, path, &label),
            },
            RuleKind::Object(o) => self.check_object(o, rule, value, path, &label),
            RuleKind::Array(item) => match value {
                Value::Array(items) => {
                    let mut converted = Vec::with_capacity(items.len());
                    for (index, element) in items.iter().enumerate() {
                        path.push(index.to_string());
                        if let Some(v) = self.check(item, Some(element), path, None, Some(&label)) {
                            converted.push(v);
                        }
                        path.pop();
                    }
                    Some(Value::Array(converted))
                }
                _ => self.fail_base(rule, path, &label),
            },
            RuleKind::Alternatives(rules) => self.check_alternatives(rules, value, path, siblings, &label),
            RuleKind::When(when) => {
                let branch = self.resolve_when(when, siblings);
                self.check(branch, Some(value), path, siblings, Some(&label))
            }
        }?;

        if converted != *value && rule.allow.contains(&converted) {
            return Some(converted);
        }
        if let Some(valid) = &rule.valid {
            if !valid.iter().any(|v| loose_eq(v, &converted)) {
                let choices = valid.iter().map(scalar_to_form_string).collect::<Vec<_>>().join(", ");
                self.fail(path, &label, &format!("must be one of [{}]", choices), "any.only");
            }
        }
        Some(converted)
    }

    fn resolve_when<'r>(&self, when: &'r WhenRule, siblings: Option<&Map<String, Value>>) -> &'r Rule {
        let matched = siblings
            .and_then(|s| s.get(&when.reference))
            .is_some_and(|sibling| selects(sibling, &when.is));
        if matched { &when.then } else { &when.otherwise }
    }

    fn check_string(
        &mut self,
        s: &StringRule,
        rule: &Rule,
        value: &Value,
        path: &[String],
        label: &str,
    ) -> Option<Value> {
        let Value::String(raw) = value else {
            return self.fail_base(rule, path, label);
        };
        let text = if s.trim { raw.trim() } else { raw.as_str() };
        if text.is_empty() {
            let empty = Value::String(String::new());
            if rule.allow.contains(&empty) {
                return Some(empty);
            }
            return self.fail(path, label, "is not allowed to be empty", "string.empty");
        }

        let length = text.chars().count();
        if let Some(min) = s.min.filter(|min| length < *min) {
            self.fail(path, label, &format!("length must be at least {} characters long", min), "string.min");
        }
        if let Some(max) = s.max.filter(|max| length > *max) {
            self.fail(
                path,
                label,
                &format!("length must be less than or equal to {} characters long", max),
                "string.max",
            );
        }
        if let Some(pattern) = &s.pattern {
            if !pattern.is_match(text) {
                if s.email {
                    self.fail(path, label, "must be a valid email", "string.email");
                } else {
                    self.fail(
                        path,
                        label,
                        &format!("with value \"{}\" fails to match the required pattern: /{}/", text, pattern.as_str()),
                        "string.pattern.base",
                    );
                }
            }
        }
        Some(Value::String(text.to_string()))
    }

    fn check_number(&mut self, n: &NumberRule, value: &Value, path: &[String], label: &str) -> Option<Value> {
        let parsed = match value {
            Value::Number(num) => num.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        };
        let Some(number) = parsed else {
            return self.fail(path, label, "must be a number", "number.base");
        };

        if n.integer && number.fract() != 0.0 {
            self.fail(path, label, "must be an integer", "number.integer");
        }
        if let Some(min) = n.min.filter(|min| number < *min) {
            self.fail(path, label, &format!("must be greater than or equal to {}", min), "number.min");
        }
        if let Some(max) = n.max.filter(|max| number > *max) {
            self.fail(path, label, &format!("must be less than or equal to {}", max), "number.max");
        }
        Some(number_value(number))
    }

    fn check_object(
        &mut self,
        o: &ObjectRule,
        rule: &Rule,
        value: &Value,
        path: &mut Vec<String>,
        label: &str,
    ) -> Option<Value> {
        let Value::Object(input) = value else {
            return self.fail_base(rule, path, label);
        };

        let mut converted = Map::new();
        for (key, child) in o.keys.iter() {
            path.push(key.to_string());
            if let Some(v) = self.check(child, input.get(key), path, Some(input), None) {
                converted.insert(key.to_string(), v);
            }
            path.pop();
        }

        for (key, v) in input {
            if o.keys.contains(key) {
                continue;
            }
            if o.allow_unknown || self.options.allow_unknown {
                converted.insert(key.clone(), v.clone());
            } else {
                path.push(key.clone());
                self.fail(path, key, "is not allowed", "object.unknown");
                path.pop();
            }
        }
        Some(Value::Object(converted))
    }

    /// The first alternative that passes wins. When none does, the failures of the first
    /// alternative shaped like the value are reported.
    fn check_alternatives(
        &mut self,
        rules: &[Rule],
        value: &Value,
        path: &mut Vec<String>,
        siblings: Option<&Map<String, Value>>,
        label: &str,
    ) -> Option<Value> {
        let mut reported: Option<Vec<ValidationDetail>> = None;
        for alternative in rules {
            let mut attempt = Validator {
                options: self.options,
                errors: Vec::new(),
            };
            let converted = attempt.check(alternative, Some(value), path, siblings, Some(label));
            if attempt.errors.is_empty() {
                return converted;
            }
            if reported.is_none() && accepts_shape(alternative, value) {
                reported = Some(attempt.errors);
            }
        }

        match reported {
            Some(errors) => {
                self.errors.extend(errors);
                None
            }
            None => self.fail(path, label, "does not match any of the allowed types", "alternatives.types"),
        }
    }

    fn fail_base(&mut self, rule: &Rule, path: &[String], label: &str) -> Option<Value> {
        let (message, kind) = match &rule.kind {
            RuleKind::String(_) => ("must be a string", "string.base"),
            RuleKind::Number(_) => ("must be a number", "number.base"),
            RuleKind::Boolean => ("must be a boolean", "boolean.base"),
            RuleKind::Date => ("must be a valid date", "date.base"),
            RuleKind::DateTime => ("must be a valid date and time", "date.base"),
            RuleKind::Object(_) => ("must be of type object", "object.base"),
            RuleKind::Array(_) => ("must be an array", "array.base"),
            _ => ("does not match any of the allowed types", "alternatives.types"),
        };
        self.fail(path, label, message, kind)
    }

    fn fail(&mut self, path: &[String], label: &str, message: &str, kind: &str) -> Option<Value> {
        self.errors.push(ValidationDetail {
            path: path.to_vec(),
            message: format!("\"{}\" {}", label, message),
            kind: kind.to_string(),
        });
        None
    }
}

/// Whether `value` has the JSON shape a rule expects, ignoring its constraints.
fn accepts_shape(rule: &Rule, value: &Value) -> bool {
    match &rule.kind {
        RuleKind::Any | RuleKind::When(_) => true,
        RuleKind::Array(_) => value.is_array(),
        RuleKind::Object(_) => value.is_object(),
        RuleKind::Alternatives(rules) => rules.iter().any(|r| accepts_shape(r, value)),
        _ => !value.is_array() && !value.is_object(),
    }
}

/// Whole numbers stay JSON integers.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::Number(Number::from(number as i64))
    } else {
        Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}
