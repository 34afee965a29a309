//! Named boolean predicates over application state.
//!
//! Conditions are compiled once, when the model is built, and evaluated many times
//! against different state snapshots. Evaluation never fails outward: any error is
//! logged and read as `false`.

use crate::ast::{EvaluationTrace, Expression, FieldPath};
use crate::definition::ConditionDefinition;
use crate::error::{DefinitionError, EvaluationError};
use crate::trace::TraceFormatter;
use ahash::{AHashMap, AHashSet};
use std::collections::HashSet;

mod engine;
pub mod parser;

use engine::ConditionEngine;
pub use engine::EvaluationContext;
pub use parser::parse_expression;

/// A compiled, named condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub name: String,
    /// The expression text as written in the form definition.
    pub source: String,
    pub expression: Expression,
}

/// The result of evaluating a condition with an explanation attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionOutcome {
    pub holds: bool,
    /// A human-readable explanation of how the result was reached.
    pub reason: String,
}

/// All conditions declared by one form definition, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    conditions: AHashMap<String, Condition>,
    order: Vec<String>,
}

impl ConditionRegistry {
    /// Compiles every condition definition.
    ///
    /// Later definitions with the same name replace earlier ones. A condition may
    /// refer to any other declared condition, in any order, as long as no cycle forms.
    pub fn compile(definitions: &[ConditionDefinition]) -> Result<Self, DefinitionError> {
        let known: AHashSet<String> = definitions.iter().map(|d| d.name.clone()).collect();

        let mut registry = ConditionRegistry::default();
        for definition in definitions {
            let expression = parse_expression(&definition.value, &known, &definition.name)?;
            let condition = Condition {
                name: definition.name.clone(),
                source: definition.value.clone(),
                expression,
            };
            if registry
                .conditions
                .insert(definition.name.clone(), condition)
                .is_some()
            {
                tracing::warn!(condition = %definition.name, "Condition declared more than once; the last declaration wins");
            } else {
                registry.order.push(definition.name.clone());
            }
        }

        registry.check_for_cycles()?;
        tracing::debug!(count = registry.len(), "Compiled conditions");
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Conditions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.order.iter().filter_map(|name| self.conditions.get(name))
    }

    /// The set of declared names, as used to resolve bare identifiers.
    pub fn names(&self) -> AHashSet<String> {
        self.conditions.keys().cloned().collect()
    }

    /// Single-segment fields read by a condition whose name is not in `known`.
    ///
    /// A bare identifier that names no condition compiles as a field, so a misspelt
    /// condition name shows up here.
    pub fn unknown_fields(&self, known: &AHashSet<&str>) -> Vec<(&str, FieldPath)> {
        let mut unknown = Vec::new();
        for condition in self.iter() {
            let mut fields = HashSet::new();
            condition.expression.referenced_fields(&mut fields);
            let mut fields: Vec<FieldPath> = fields
                .into_iter()
                .filter(|field| matches!(field.segments.as_slice(), [name] if !known.contains(name.as_str())))
                .collect();
            fields.sort_by(|a, b| a.segments.cmp(&b.segments));
            unknown.extend(fields.into_iter().map(|field| (condition.name.as_str(), field)));
        }
        unknown
    }

    /// Parses an ad-hoc expression, resolving condition names against this registry.
    pub fn parse_inline(&self, source: &str, owner: &str) -> Result<Expression, DefinitionError> {
        parse_expression(source, &self.names(), owner)
    }

    /// Evaluates the named condition. Unknown names and evaluation errors read as `false`.
    pub fn evaluate(&self, name: &str, context: EvaluationContext<'_>) -> bool {
        match self.get(name) {
            Some(condition) => self.evaluate_expression(&condition.expression, context),
            None => {
                tracing::debug!(condition = %name, "Evaluated an unregistered condition as false");
                false
            }
        }
    }

    /// Evaluates any expression against the context. Errors read as `false`.
    pub fn evaluate_expression(&self, expression: &Expression, context: EvaluationContext<'_>) -> bool {
        match self.trace(expression, context) {
            Ok(trace) => trace.get_outcome().is_truthy(),
            Err(e) => {
                tracing::debug!(expression = %expression, error = %e, "Condition evaluation failed; treating as false");
                false
            }
        }
    }

    /// Evaluates an expression and returns the full evaluation trace.
    pub fn trace(
        &self,
        expression: &Expression,
        context: EvaluationContext<'_>,
    ) -> Result<EvaluationTrace, EvaluationError> {
        ConditionEngine::new(self, context).evaluate(expression)
    }

    /// Evaluates an expression and explains the outcome.
    pub fn explain(&self, expression: &Expression, context: EvaluationContext<'_>) -> ConditionOutcome {
        match self.trace(expression, context) {
            Ok(trace) => ConditionOutcome {
                holds: trace.get_outcome().is_truthy(),
                reason: TraceFormatter::format_trace(&trace),
            },
            Err(e) => {
                tracing::debug!(expression = %expression, error = %e, "Condition evaluation failed; treating as false");
                ConditionOutcome {
                    holds: false,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn check_for_cycles(&self) -> Result<(), DefinitionError> {
        let mut finished: HashSet<&str> = HashSet::new();
        for name in &self.order {
            let mut visiting = Vec::new();
            self.visit(name, &mut visiting, &mut finished)?;
        }
        Ok(())
    }

    fn visit<'s>(
        &'s self,
        name: &'s str,
        visiting: &mut Vec<&'s str>,
        finished: &mut HashSet<&'s str>,
    ) -> Result<(), DefinitionError> {
        if finished.contains(name) {
            return Ok(());
        }
        if visiting.contains(&name) {
            return Err(DefinitionError::CircularCondition(name.to_string()));
        }
        let Some(condition) = self.conditions.get(name) else {
            return Ok(());
        };

        visiting.push(name);
        let mut references = HashSet::new();
        condition.expression.referenced_conditions(&mut references);
        for reference in &references {
            if let Some((key, _)) = self.conditions.get_key_value(reference.as_str()) {
                self.visit(key.as_str(), visiting, finished)?;
            }
        }
        visiting.pop();
        finished.insert(name);
        Ok(())
    }
}
