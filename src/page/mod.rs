//! Pages: one route's components, schemas and outbound navigation.

use crate::component::{ComponentCollection, ComponentContext};
use crate::condition::ConditionRegistry;
use crate::definition::{PageDefinition, SectionDefinition};
use crate::error::DefinitionError;
use crate::options::EngineOptions;
use crate::schema::{Rule, ValidationOptions};
use crate::state::{FormData, State};
use crate::view::ErrorSummary;
use serde_json::Value;
use std::sync::Arc;

mod flow;
mod navigation;
mod view;

pub use flow::Submission;
pub use navigation::{NextCondition, NextDecision, NextRule};

/// One compiled page.
///
/// Pages are immutable once built. Every operation is a function of its arguments, so
/// a single page may serve any number of requests at once.
#[derive(Debug)]
pub struct Page {
    path: String,
    title: String,
    section: Option<SectionDefinition>,
    components: ComponentCollection,
    next: Vec<NextRule>,
    conditions: Arc<ConditionRegistry>,
    options: Arc<EngineOptions>,
}

impl Page {
    pub fn new(
        definition: &PageDefinition,
        sections: &[SectionDefinition],
        context: &ComponentContext<'_>,
        conditions: Arc<ConditionRegistry>,
        options: Arc<EngineOptions>,
    ) -> Result<Self, DefinitionError> {
        let section = match &definition.section {
            None => None,
            Some(name) => Some(
                sections
                    .iter()
                    .find(|s| &s.name == name)
                    .cloned()
                    .ok_or_else(|| DefinitionError::UnknownSection {
                        page: definition.path.clone(),
                        section: name.clone(),
                    })?,
            ),
        };

        let components = ComponentCollection::new(&definition.components, context)?;
        let next = navigation::compile_next(&definition.next, &conditions, &definition.path)?;
        tracing::debug!(
            page = %definition.path,
            components = components.len(),
            routes = next.len(),
            "Compiled page"
        );

        Ok(Self {
            path: definition.path.clone(),
            title: definition.title.clone().unwrap_or_default(),
            section,
            components,
            next,
            conditions,
            options,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn section(&self) -> Option<&SectionDefinition> {
        self.section.as_ref()
    }

    pub fn components(&self) -> &ComponentCollection {
        &self.components
    }

    pub fn has_form_components(&self) -> bool {
        self.components.form_items().next().is_some()
    }

    pub fn has_next(&self) -> bool {
        !self.next.is_empty()
    }

    /// Outbound routes in evaluation order.
    pub fn next_rules(&self) -> &[NextRule] {
        &self.next
    }

    pub fn form_schema(&self) -> &Rule {
        self.components.form_schema()
    }

    pub fn state_schema(&self) -> &Rule {
        self.components.state_schema()
    }

    /// The path to go to after this page, given the accumulated state.
    pub fn get_next(&self, state: &State) -> String {
        self.next_decision(state).path
    }

    /// Like [`Page::get_next`], with the rule that matched and an explanation.
    pub fn next_decision(&self, state: &State) -> NextDecision {
        let context = navigation::context_for(state, self.section_name());
        navigation::decide(&self.next, &self.conditions, context, &self.options.default_next_path)
    }

    /// The slice of state this page reads and writes.
    pub fn page_state<'s>(&self, state: &'s State) -> Option<&'s State> {
        match self.section_name() {
            Some(name) => state.get(name).and_then(Value::as_object),
            None => Some(state),
        }
    }

    pub fn form_data_from_state(&self, state: &State) -> FormData {
        match self.page_state(state) {
            Some(page_state) => self.components.form_data_from_state(page_state),
            None => FormData::new(),
        }
    }

    pub fn state_from_valid_form(&self, payload: &FormData) -> State {
        self.components.state_from_valid_form(payload)
    }

    /// Validates submitted form data, returning it converted or an error summary.
    pub fn validate_form(&self, payload: &FormData) -> Result<FormData, ErrorSummary> {
        self.validate(payload, self.form_schema())
    }

    /// Validates the state assembled from a valid submission.
    pub fn validate_state(&self, state: &State) -> Result<State, ErrorSummary> {
        self.validate(state, self.state_schema())
    }

    fn validate(&self, value: &State, rule: &Rule) -> Result<State, ErrorSummary> {
        let options = ValidationOptions::default();
        match rule.validate(&Value::Object(value.clone()), &options) {
            Ok(Value::Object(converted)) => Ok(converted),
            Ok(_) => Ok(State::new()),
            Err(e) => Err(ErrorSummary::from_validation(&self.options.error_summary_title, &e)),
        }
    }

    /// Wraps a page's state under its section, ready to merge into the whole state.
    pub fn partial_merge_state(&self, value: State) -> State {
        match self.section_name() {
            Some(name) => {
                let mut update = State::new();
                update.insert(name.to_string(), Value::Object(value));
                update
            }
            None => value,
        }
    }

    fn section_name(&self) -> Option<&str> {
        self.section.as_ref().map(|s| s.name.as_str())
    }
}
