//! The compiled form: pages, sections, lists, conditions and the whole-state schema.
//!
//! A [`Model`] is built once from a raw JSON definition through [`ModelBuilder`] and is
//! read-only afterwards. It can be shared between threads and serve any number of
//! requests without locking.

use crate::condition::ConditionRegistry;
use crate::definition::{FormDefinition, ListDefinition, SectionDefinition};
use crate::error::{DefinitionError, SubmitError, ValidationError};
use crate::options::EngineOptions;
use crate::page::{Page, Submission};
use crate::schema::{Rule, ValidationOptions};
use crate::state::{FormData, State, StateStore};
use crate::summary::SummaryViewModel;
use crate::view::PageViewModel;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

mod builder;

pub use builder::ModelBuilder;

#[derive(Debug)]
pub struct Model {
    definition: FormDefinition,
    conditions: Arc<ConditionRegistry>,
    pages: Vec<Page>,
    options: Arc<EngineOptions>,
    schema: Rule,
}

impl Model {
    pub fn builder(source: Value) -> ModelBuilder {
        ModelBuilder::new(source)
    }

    /// Compiles a definition from JSON text with default options.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let source: Value = serde_json::from_str(json).map_err(|e| DefinitionError::JsonParseError(e.to_string()))?;
        ModelBuilder::new(source).build()
    }

    /// The definition the model was compiled from, with the synthetic lists added.
    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, path: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.path() == path)
    }

    pub fn sections(&self) -> &[SectionDefinition] {
        &self.definition.sections
    }

    pub fn lists(&self) -> &[ListDefinition] {
        &self.definition.lists
    }

    pub fn list(&self, name: &str) -> Option<&ListDefinition> {
        self.definition.lists.iter().rev().find(|list| list.name == name)
    }

    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The schema every answer of the form is validated against at summary time.
    pub fn schema(&self) -> &Rule {
        &self.schema
    }

    /// Validates the whole accumulated state.
    pub fn validate_state(&self, state: &State) -> Result<Value, ValidationError> {
        let options = ValidationOptions {
            allow_unknown: self.options.allow_unknown_state_keys,
        };
        self.schema.validate(&Value::Object(state.clone()), &options)
    }

    pub fn summary(&self, state: &State) -> SummaryViewModel {
        SummaryViewModel::new(self, state)
    }

    /// Renders the page at `path` from stored state.
    pub fn view(&self, path: &str, store: &dyn StateStore) -> Result<PageViewModel, SubmitError> {
        let page = self.page(path).ok_or_else(|| SubmitError::UnknownPage(path.to_string()))?;
        page.view(store).map_err(SubmitError::from)
    }

    /// Submits form data to the page at `path`.
    pub fn submit(&self, path: &str, payload: &FormData, store: &dyn StateStore) -> Result<Submission, SubmitError> {
        let page = self.page(path).ok_or_else(|| SubmitError::UnknownPage(path.to_string()))?;
        page.submit(payload, store)
    }

    /// Where to go after `path`, or `None` for an unknown page.
    pub fn next_path(&self, path: &str, state: &State) -> Option<String> {
        self.page(path).map(|page| page.get_next(state))
    }

    /// The first page of the form.
    pub fn start_page(&self) -> Option<&Page> {
        self.pages.first()
    }
}

impl FromStr for Model {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}
