use super::{Component, ComponentContext};
use crate::definition::ComponentDefinition;
use crate::error::DefinitionError;
use crate::schema::SchemaKeys;
use crate::state::{FormData, State};
use crate::view::{ErrorSummary, FieldViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentVariant {
    Para,
    Html,
    InsetText,
    Details,
    WarningText,
}

/// Static content: paragraphs, raw HTML, inset text, expandable details and warnings.
/// Content takes no input and holds no state.
#[derive(Debug)]
pub struct ContentBlock {
    definition: ComponentDefinition,
    variant: ContentVariant,
}

impl ContentBlock {
    fn build(definition: &ComponentDefinition, variant: ContentVariant) -> Result<Box<dyn Component>, DefinitionError> {
        Ok(Box::new(Self {
            definition: definition.clone(),
            variant,
        }))
    }

    pub fn para(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, ContentVariant::Para)
    }

    pub fn html(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, ContentVariant::Html)
    }

    pub fn inset_text(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, ContentVariant::InsetText)
    }

    pub fn details(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, ContentVariant::Details)
    }

    pub fn warning_text(definition: &ComponentDefinition, _: &ComponentContext<'_>) -> Result<Box<dyn Component>, DefinitionError> {
        Self::build(definition, ContentVariant::WarningText)
    }
}

impl Component for ContentBlock {
    fn definition(&self) -> &ComponentDefinition {
        &self.definition
    }

    fn is_form_component(&self) -> bool {
        false
    }

    fn form_schema_keys(&self) -> SchemaKeys {
        SchemaKeys::new()
    }

    fn state_schema_keys(&self) -> SchemaKeys {
        SchemaKeys::new()
    }

    fn form_data_from_state(&self, _: &State) -> FormData {
        FormData::new()
    }

    fn state_from_valid_form(&self, _: &FormData) -> State {
        State::new()
    }

    fn display_string(&self, _: &State) -> String {
        String::new()
    }

    fn view_model(&self, _: &FormData, _: Option<&ErrorSummary>) -> FieldViewModel {
        let content = self.definition.content.clone();
        match self.variant {
            ContentVariant::Para | ContentVariant::Html | ContentVariant::InsetText => FieldViewModel {
                content,
                ..FieldViewModel::default()
            },
            ContentVariant::Details => FieldViewModel {
                summary_text: self.definition.title.clone(),
                content,
                ..FieldViewModel::default()
            },
            ContentVariant::WarningText => FieldViewModel {
                content,
                icon_fallback_text: self.definition.icon.clone(),
                ..FieldViewModel::default()
            },
        }
    }
}
