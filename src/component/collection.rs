use super::{Component, ComponentContext};
use crate::definition::ComponentDefinition;
use crate::error::DefinitionError;
use crate::schema::{Rule, SchemaKeys};
use crate::state::{FormData, State};
use crate::view::{ComponentViewModel, ErrorSummary};
use ahash::AHashSet;

/// An ordered group of components sharing one schema namespace: a page, or the
/// components revealed by a list item.
#[derive(Debug)]
pub struct ComponentCollection {
    items: Vec<Box<dyn Component>>,
    form_schema: Rule,
    state_schema: Rule,
}

impl ComponentCollection {
    /// Compiles every definition and derives the aggregate schemas.
    ///
    /// Fails if two form components (or their sub-fields) claim the same key.
    pub fn new(definitions: &[ComponentDefinition], context: &ComponentContext<'_>) -> Result<Self, DefinitionError> {
        let items = definitions
            .iter()
            .map(|definition| context.registry.create(definition, context))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = AHashSet::new();
        for item in items.iter().filter(|item| item.is_form_component()) {
            for key in item.form_schema_keys().names() {
                if !seen.insert(key.to_string()) {
                    return Err(DefinitionError::DuplicateName {
                        location: context.location.to_string(),
                        name: key.to_string(),
                    });
                }
            }
        }

        let mut collection = Self {
            items,
            form_schema: Rule::object(SchemaKeys::new()),
            state_schema: Rule::object(SchemaKeys::new()),
        };
        collection.form_schema = Rule::object(collection.form_schema_keys()).required();
        collection.state_schema = Rule::object(collection.state_schema_keys()).required();
        Ok(collection)
    }

    pub fn items(&self) -> impl Iterator<Item = &dyn Component> {
        self.items.iter().map(|item| item.as_ref())
    }

    /// The components that take input, in order.
    pub fn form_items(&self) -> impl Iterator<Item = &dyn Component> {
        self.items().filter(|item| item.is_form_component())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn form_schema(&self) -> &Rule {
        &self.form_schema
    }

    pub fn state_schema(&self) -> &Rule {
        &self.state_schema
    }

    pub fn form_schema_keys(&self) -> SchemaKeys {
        self.form_items().fold(SchemaKeys::new(), |mut keys, item| {
            keys.extend(item.form_schema_keys());
            keys
        })
    }

    pub fn state_schema_keys(&self) -> SchemaKeys {
        self.form_items().fold(SchemaKeys::new(), |mut keys, item| {
            keys.extend(item.state_schema_keys());
            keys
        })
    }

    pub fn form_data_from_state(&self, state: &State) -> FormData {
        self.form_items().fold(FormData::new(), |mut form_data, item| {
            form_data.extend(item.form_data_from_state(state));
            form_data
        })
    }

    pub fn state_from_valid_form(&self, payload: &FormData) -> State {
        self.form_items().fold(State::new(), |mut state, item| {
            state.extend(item.state_from_valid_form(payload));
            state
        })
    }

    pub fn view_model(&self, form_data: &FormData, errors: Option<&ErrorSummary>) -> Vec<ComponentViewModel> {
        self.items()
            .map(|item| ComponentViewModel {
                kind: item.kind().to_string(),
                is_form_component: item.is_form_component(),
                model: item.view_model(form_data, errors),
            })
            .collect()
    }
}
