use super::Model;
use crate::component::{ComponentConstructor, ComponentContext, ComponentRegistry, YES_NO_LIST};
use crate::condition::ConditionRegistry;
use crate::definition::{FormDefinition, ListDefinition, ListItemDefinition, ListType, validate_structure};
use crate::error::DefinitionError;
use crate::options::EngineOptions;
use crate::page::Page;
use crate::schema::{Rule, SchemaKeys};
use ahash::AHashSet;
use serde_json::Value;
use std::sync::Arc;

/// Configures and compiles a [`Model`].
pub struct ModelBuilder {
    source: Value,
    options: EngineOptions,
    registry: ComponentRegistry,
}

impl ModelBuilder {
    pub fn new(source: Value) -> Self {
        Self {
            source,
            options: EngineOptions::default(),
            registry: ComponentRegistry::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Registers a component type tag, replacing any built-in type of the same name.
    pub fn with_component_type(mut self, tag: &str, constructor: ComponentConstructor) -> Self {
        self.registry.register(tag, constructor);
        self
    }

    /// Makes `tag` compile as the built-in type `builtin`. Unknown built-ins are ignored.
    pub fn with_type_alias(mut self, tag: &str, builtin: &str) -> Self {
        if !self.registry.alias(tag, builtin) {
            tracing::warn!(tag = %tag, builtin = %builtin, "Ignoring alias to an unknown component type");
        }
        self
    }

    pub fn build(self) -> Result<Model, DefinitionError> {
        validate_structure(&self.source)?;
        let mut definition: FormDefinition =
            serde_json::from_value(self.source).map_err(|e| DefinitionError::JsonParseError(e.to_string()))?;

        if !definition.lists.iter().any(|list| list.name == YES_NO_LIST) {
            definition.lists.push(yes_no_list());
        }

        let conditions = Arc::new(ConditionRegistry::compile(&definition.conditions)?);
        let options = Arc::new(self.options);

        let pages = definition
            .pages
            .iter()
            .map(|page| {
                let context = ComponentContext::new(&definition.lists, &self.registry, &page.path);
                Page::new(page, &definition.sections, &context, Arc::clone(&conditions), Arc::clone(&options))
            })
            .collect::<Result<Vec<_>, _>>()?;

        warn_unknown_fields(&conditions, &definition, &pages);
        let schema = model_schema(&definition, &pages);
        tracing::info!(
            pages = pages.len(),
            sections = definition.sections.len(),
            lists = definition.lists.len(),
            conditions = conditions.len(),
            "Compiled form model"
        );

        Ok(Model {
            definition,
            conditions,
            pages,
            options,
            schema,
        })
    }
}

fn warn_unknown_fields(conditions: &ConditionRegistry, definition: &FormDefinition, pages: &[Page]) {
    let known: AHashSet<&str> = pages
        .iter()
        .filter_map(|page| page.state_schema().keys())
        .flat_map(|keys| keys.names())
        .chain(definition.sections.iter().map(|section| section.name.as_str()))
        .collect();
    for (condition, field) in conditions.unknown_fields(&known) {
        tracing::warn!(condition = %condition, field = %field, "Condition reads a field that no page collects");
    }
}

fn yes_no_list() -> ListDefinition {
    let item = |text: &str, value: bool| ListItemDefinition {
        text: text.to_string(),
        value: Value::Bool(value),
        description: None,
        conditional: None,
    };
    ListDefinition {
        name: YES_NO_LIST.to_string(),
        title: "Yes/No".to_string(),
        list_type: ListType::Boolean,
        items: vec![item("Yes", true), item("No", false)],
    }
}

/// The whole-state schema: unsectioned pages contribute top-level keys, sectioned pages
/// contribute to a required object under their section's name.
fn model_schema(definition: &FormDefinition, pages: &[Page]) -> Rule {
    let top_level = pages
        .iter()
        .filter(|page| page.section().is_none())
        .fold(Rule::object(SchemaKeys::new()).required(), |rule, page| {
            rule.concat(page.state_schema())
        });

    definition.sections.iter().fold(top_level, |schema, section| {
        let mut in_section = pages
            .iter()
            .filter(|page| page.section().is_some_and(|s| s.name == section.name))
            .peekable();
        if in_section.peek().is_none() {
            return schema;
        }
        let section_rule = in_section
            .fold(Rule::object(SchemaKeys::new()).required(), |rule, page| {
                rule.concat(page.state_schema())
            })
            .label(&section.title);
        schema.append(&section.name, section_rule)
    })
}
