//! Validation rules for form data and application state.
//!
//! A `Rule` describes one value: its base type, its constraints, whether it must be
//! present, and any extra values it tolerates. Rules compose into object rules keyed by
//! field name, which is how components, collections, pages and the whole model describe
//! the data they accept.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub mod dates;
mod validate;

pub use validate::ValidationOptions;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("EMAIL_REGEX: invalid regex pattern")
});

/// Whether a key must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Optional,
    Required,
}

#[derive(Debug, Clone, Default)]
pub struct StringRule {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub trim: bool,
    pub email: bool,
    pub pattern: Option<Regex>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectRule {
    pub keys: SchemaKeys,
    pub allow_unknown: bool,
}

/// Picks `then` when the sibling `reference` selects `is`, otherwise `otherwise`.
#[derive(Debug, Clone)]
pub struct WhenRule {
    pub reference: String,
    pub is: Value,
    pub then: Rule,
    pub otherwise: Rule,
}

#[derive(Debug, Clone)]
pub enum RuleKind {
    Any,
    String(StringRule),
    Number(NumberRule),
    Boolean,
    Date,
    DateTime,
    Object(ObjectRule),
    Array(Box<Rule>),
    Alternatives(Vec<Rule>),
    When(Box<WhenRule>),
}

/// A validation rule for a single value.
#[derive(Debug, Clone)]
pub struct Rule {
    pub kind: RuleKind,
    pub presence: Presence,
    pub label: Option<String>,
    /// Values accepted as-is, before and after conversion.
    pub allow: Vec<Value>,
    /// When set, the converted value must equal one of these.
    pub valid: Option<Vec<Value>>,
}

impl Rule {
    fn of(kind: RuleKind) -> Self {
        Self {
            kind,
            presence: Presence::Optional,
            label: None,
            allow: Vec::new(),
            valid: None,
        }
    }

    pub fn any() -> Self {
        Self::of(RuleKind::Any)
    }

    /// A string rule. Strings are trimmed unless `trim(false)` is applied.
    pub fn string() -> Self {
        Self::of(RuleKind::String(StringRule {
            trim: true,
            ..StringRule::default()
        }))
    }

    pub fn number() -> Self {
        Self::of(RuleKind::Number(NumberRule::default()))
    }

    pub fn boolean() -> Self {
        Self::of(RuleKind::Boolean)
    }

    pub fn date() -> Self {
        Self::of(RuleKind::Date)
    }

    pub fn datetime() -> Self {
        Self::of(RuleKind::DateTime)
    }

    pub fn object(keys: SchemaKeys) -> Self {
        Self::of(RuleKind::Object(ObjectRule {
            keys,
            allow_unknown: false,
        }))
    }

    pub fn array(item: Rule) -> Self {
        Self::of(RuleKind::Array(Box::new(item)))
    }

    pub fn alternatives(rules: Vec<Rule>) -> Self {
        Self::of(RuleKind::Alternatives(rules))
    }

    pub fn when(reference: &str, is: Value, then: Rule, otherwise: Rule) -> Self {
        Self::of(RuleKind::When(Box::new(WhenRule {
            reference: reference.to_string(),
            is,
            then,
            otherwise,
        })))
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn allow(mut self, value: Value) -> Self {
        if !self.allow.contains(&value) {
            self.allow.push(value);
        }
        self
    }

    pub fn valid(mut self, values: Vec<Value>) -> Self {
        self.valid = Some(values);
        self
    }

    /// Lower bound: string length for strings, value for numbers.
    pub fn min(mut self, min: f64) -> Self {
        match &mut self.kind {
            RuleKind::String(s) => s.min = Some(min.max(0.0) as usize),
            RuleKind::Number(n) => n.min = Some(min),
            _ => {}
        }
        self
    }

    /// Upper bound: string length for strings, value for numbers.
    pub fn max(mut self, max: f64) -> Self {
        match &mut self.kind {
            RuleKind::String(s) => s.max = Some(max.max(0.0) as usize),
            RuleKind::Number(n) => n.max = Some(max),
            _ => {}
        }
        self
    }

    pub fn integer(mut self) -> Self {
        if let RuleKind::Number(n) = &mut self.kind {
            n.integer = true;
        }
        self
    }

    pub fn trim(mut self, enabled: bool) -> Self {
        if let RuleKind::String(s) = &mut self.kind {
            s.trim = enabled;
        }
        self
    }

    pub fn email(mut self) -> Self {
        if let RuleKind::String(s) = &mut self.kind {
            s.email = true;
            s.pattern = Some(EMAIL_REGEX.clone());
        }
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        if let RuleKind::String(s) = &mut self.kind {
            s.pattern = Some(pattern);
        }
        self
    }

    pub fn allow_unknown(mut self, allow: bool) -> Self {
        if let RuleKind::Object(o) = &mut self.kind {
            o.allow_unknown = allow;
        }
        self
    }

    /// Merges the keys of another object rule into this one; `other` wins on clashes.
    pub fn concat(mut self, other: &Rule) -> Self {
        if let (RuleKind::Object(target), RuleKind::Object(source)) = (&mut self.kind, &other.kind) {
            target.keys.extend(source.keys.clone());
        }
        self
    }

    /// Adds a single key to an object rule.
    pub fn append(mut self, key: &str, rule: Rule) -> Self {
        if let RuleKind::Object(o) = &mut self.kind {
            o.keys.insert(key, rule);
        }
        self
    }

    /// The keys of an object rule, if this is one.
    pub fn keys(&self) -> Option<&SchemaKeys> {
        match &self.kind {
            RuleKind::Object(o) => Some(&o.keys),
            _ => None,
        }
    }

    /// Validates `value`, returning the converted value or every failure found.
    pub fn validate(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<Value, crate::error::ValidationError> {
        validate::validate(self, value, options)
    }
}

/// An ordered mapping from field name to rule.
#[derive(Debug, Clone, Default)]
pub struct SchemaKeys {
    entries: Vec<(String, Rule)>,
}

impl SchemaKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, rule: Rule) -> Self {
        self.insert(key, rule);
        self
    }

    /// Inserts or replaces the rule for `key`, keeping the original position.
    pub fn insert(&mut self, key: &str, rule: Rule) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = rule,
            None => self.entries.push((key.to_string(), rule)),
        }
    }

    pub fn extend(&mut self, other: SchemaKeys) {
        for (key, rule) in other.entries {
            self.insert(&key, rule);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Rule> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for SchemaKeys {
    type Item = (String, Rule);
    type IntoIter = std::vec::IntoIter<(String, Rule)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
