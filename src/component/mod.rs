//! Form components: fields and content blocks.
//!
//! Every component is compiled once from its `ComponentDefinition` into an object that
//! implements [`Component`]. The owning [`ComponentCollection`] aggregates what each
//! component contributes: schema keys for form data and state, conversions between the
//! two, display strings and view models.

use crate::definition::{ComponentDefinition, ListDefinition};
use crate::error::DefinitionError;
use crate::schema::SchemaKeys;
use crate::state::{FormData, State, scalar_to_form_string};
use crate::view::{ErrorSummary, FieldViewModel};
use ahash::AHashMap;
use serde_json::Value;
use std::fmt;

mod address;
mod base;
mod collection;
mod content;
mod date;
mod date_parts;
mod list;
mod text;

pub use address::UkAddressField;
pub use collection::ComponentCollection;
pub use content::ContentBlock;
pub use date::DateField;
pub use date_parts::DatePartsField;
pub use list::{ListField, YES_NO_LIST};
pub use text::TextField;

/// The behaviour shared by every component variant.
///
/// The provided methods implement a plain single-value form field keyed by the
/// component name; variants override what differs.
pub trait Component: Send + Sync + fmt::Debug {
    fn definition(&self) -> &ComponentDefinition;

    /// Content blocks return `false` and contribute no schema keys or state.
    fn is_form_component(&self) -> bool {
        true
    }

    /// Rules for validating submitted form data, keyed by field name.
    fn form_schema_keys(&self) -> SchemaKeys;

    /// Rules for validating stored state, keyed by field name.
    fn state_schema_keys(&self) -> SchemaKeys;

    fn form_data_from_state(&self, state: &State) -> FormData {
        let mut form_data = FormData::new();
        if let Some(value) = state.get(self.name()) {
            form_data.insert(self.name().to_string(), Value::String(scalar_to_form_string(value)));
        }
        form_data
    }

    fn state_from_valid_form(&self, payload: &FormData) -> State {
        let value = match payload.get(self.name()) {
            Some(Value::String(s)) if s.is_empty() => Value::Null,
            Some(value) => value.clone(),
            None => Value::Null,
        };
        let mut state = State::new();
        state.insert(self.name().to_string(), value);
        state
    }

    /// The answer as a reader should see it, e.g. on a summary page.
    fn display_string(&self, state: &State) -> String {
        state
            .get(self.name())
            .map(scalar_to_form_string)
            .unwrap_or_default()
    }

    fn view_model(&self, form_data: &FormData, errors: Option<&ErrorSummary>) -> FieldViewModel;

    fn kind(&self) -> &str {
        &self.definition().kind
    }

    fn name(&self) -> &str {
        self.definition().name.as_deref().unwrap_or_default()
    }

    fn title(&self) -> &str {
        self.definition().title_text()
    }
}

/// Builds a component from its definition.
pub type ComponentConstructor =
    fn(&ComponentDefinition, &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError>;

/// What a component may consult while it is being compiled.
#[derive(Clone, Copy)]
pub struct ComponentContext<'a> {
    pub lists: &'a [ListDefinition],
    pub registry: &'a ComponentRegistry,
    /// The page (or other owner) being compiled, for error messages.
    pub location: &'a str,
}

impl<'a> ComponentContext<'a> {
    pub fn new(lists: &'a [ListDefinition], registry: &'a ComponentRegistry, location: &'a str) -> Self {
        Self {
            lists,
            registry,
            location,
        }
    }

    /// The list named by the component's `options.list`.
    pub fn list_for(&self, definition: &ComponentDefinition) -> Result<&'a ListDefinition, DefinitionError> {
        let wanted = definition.options.list.as_deref().unwrap_or_default();
        self.list_named(wanted).ok_or_else(|| DefinitionError::UnknownList {
            location: self.location.to_string(),
            component: definition.name.clone().unwrap_or_default(),
            list: wanted.to_string(),
        })
    }

    pub fn list_named(&self, name: &str) -> Option<&'a ListDefinition> {
        self.lists.iter().rev().find(|list| list.name == name)
    }
}

/// Maps a component `type` tag to its constructor.
#[derive(Clone)]
pub struct ComponentRegistry {
    constructors: AHashMap<String, ComponentConstructor>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&String> = self.constructors.keys().collect();
        tags.sort();
        f.debug_struct("ComponentRegistry").field("types", &tags).finish()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut constructors = AHashMap::new();
        register_default_types(&mut constructors);
        Self { constructors }
    }
}

impl ComponentRegistry {
    pub fn register(&mut self, tag: &str, constructor: ComponentConstructor) {
        self.constructors.insert(tag.to_string(), constructor);
    }

    /// Makes `tag` behave like one of the built-in types. Returns `false` if `builtin`
    /// is not a built-in type.
    pub fn alias(&mut self, tag: &str, builtin: &str) -> bool {
        match constructor_by_name(builtin) {
            Some(constructor) => {
                self.constructors.insert(tag.to_string(), constructor);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Compiles one component definition.
    pub fn create(
        &self,
        definition: &ComponentDefinition,
        context: &ComponentContext<'_>,
    ) -> Result<Box<dyn Component>, DefinitionError> {
        let constructor = self.constructors.get(&definition.kind).ok_or_else(|| {
            DefinitionError::UnknownComponentType {
                location: context.location.to_string(),
                component: definition.name.clone().unwrap_or_default(),
                type_name: definition.kind.clone(),
            }
        })?;
        let component = constructor(definition, context)?;
        if component.is_form_component() && component.name().is_empty() {
            return Err(DefinitionError::MissingName {
                location: context.location.to_string(),
                type_name: definition.kind.clone(),
            });
        }
        Ok(component)
    }
}

/// Defines the built-in component types, their registration, and lookup by name.
macro_rules! define_component_types {
    ( $( $tag:literal => $constructor:path ),* $(,)? ) => {
        fn register_default_types(registry: &mut AHashMap<String, ComponentConstructor>) {
            $( registry.insert($tag.to_string(), $constructor as ComponentConstructor); )*
        }

        fn constructor_by_name(name: &str) -> Option<ComponentConstructor> {
            match name {
                $( $tag => Some($constructor as ComponentConstructor), )*
                _ => None,
            }
        }
    };
}

define_component_types! {
    // Text input
    "TextField" => TextField::text,
    "MultilineTextField" => TextField::multiline,
    "TelephoneNumberField" => TextField::telephone,
    "EmailAddressField" => TextField::email,
    "NumberField" => TextField::number,

    // Dates
    "DateField" => DateField::date,
    "DateTimeField" => DateField::datetime,
    "DatePartsField" => DatePartsField::date,
    "DateTimePartsField" => DatePartsField::datetime,

    // List backed
    "YesNoField" => ListField::yes_no,
    "SelectField" => ListField::select,
    "RadiosField" => ListField::radios,
    "CheckboxesField" => ListField::checkboxes,

    "UkAddressField" => UkAddressField::build,

    // Content
    "Para" => ContentBlock::para,
    "Html" => ContentBlock::html,
    "InsetText" => ContentBlock::inset_text,
    "Details" => ContentBlock::details,
    "WarningText" => ContentBlock::warning_text,
}
