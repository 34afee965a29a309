use crate::ast::Value;
use std::fmt;
use thiserror::Error;

/// A single structural problem found in a raw form definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureIssue {
    /// Dotted location of the problem, e.g. `lists[0].items[2].value`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for StructureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors that can occur while compiling a form definition into a `Model`.
///
/// These are developer-facing startup failures; none of them is raised once a
/// model has been compiled.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Form definition is invalid ({} issue(s)): {}", .0.len(), join_issues(.0))]
    InvalidStructure(Vec<StructureIssue>),

    #[error("Failed to parse form definition JSON: {0}")]
    JsonParseError(String),

    #[error("Component '{component}' on '{location}' has an unregistered type: '{type_name}'")]
    UnknownComponentType {
        location: String,
        component: String,
        type_name: String,
    },

    #[error("A '{type_name}' component on '{location}' requires a name")]
    MissingName { location: String, type_name: String },

    #[error("Component '{component}' on '{location}' references an unknown list: '{list}'")]
    UnknownList {
        location: String,
        component: String,
        list: String,
    },

    #[error("Field name '{name}' is used more than once on '{location}'")]
    DuplicateName { location: String, name: String },

    #[error("Page '{page}' references an unknown section: '{section}'")]
    UnknownSection { page: String, section: String },

    #[error("'{referenced_by}' references '{name}', but that condition not specified in conditions list")]
    UndeclaredCondition { name: String, referenced_by: String },

    #[error("Condition '{0}' refers back to itself")]
    CircularCondition(String),

    #[error("Failed to parse expression '{expression}' at position {position}: {message}")]
    ExpressionSyntax {
        expression: String,
        position: usize,
        message: String,
    },
}

fn join_issues(issues: &[StructureIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while evaluating a condition expression.
///
/// Navigation never surfaces these: a failing condition is treated as `false`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Field '{0}' not found in the provided state")]
    InputNotFound(String),

    #[error("Field '{0}' holds a structured value that cannot be used in an expression")]
    UnsupportedValue(String),

    #[error("Condition '{0}' is not registered")]
    UnknownCondition(String),
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    /// Key path from the validated root to the offending value.
    pub path: Vec<String>,
    pub message: String,
    /// Machine-readable rule identifier such as `any.required` or `number.min`.
    pub kind: String,
}

impl ValidationDetail {
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// The complete set of failures produced by validating a value against a `Rule`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Validation failed: {}", join_messages(.details))]
pub struct ValidationError {
    pub details: Vec<ValidationDetail>,
}

fn join_messages(details: &[ValidationDetail]) -> String {
    details
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join(". ")
}

/// Errors reported by an injected state store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("State store is unavailable: {0}")]
    Unavailable(String),

    #[error("State store rejected the update: {0}")]
    Rejected(String),
}

/// Errors reported by an injected address lookup service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Postcode '{0}' is not a valid UK postcode")]
    InvalidPostcode(String),

    #[error("Address lookup failed: {0}")]
    Service(String),
}

/// Errors that abort a page submission. Validation failures are not errors: they
/// re-render the page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No page is registered at '{0}'")]
    UnknownPage(String),
}
