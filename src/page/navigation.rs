use crate::ast::Expression;
use crate::condition::{ConditionRegistry, EvaluationContext};
use crate::definition::NextDefinition;
use crate::error::DefinitionError;
use crate::state::State;
use itertools::Itertools;

/// The guard on one outbound route.
#[derive(Debug, Clone, PartialEq)]
pub enum NextCondition {
    /// A condition declared in the form's condition list.
    Named(String),
    /// An expression written directly in the `if` of the route.
    Inline { source: String, expression: Expression },
}

/// One outbound route of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct NextRule {
    pub path: String,
    pub condition: Option<NextCondition>,
}

impl NextRule {
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

/// The route chosen for a state, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextDecision {
    pub path: String,
    /// Index into the page's ordered rules; `None` when the default path was used.
    pub rule: Option<usize>,
    pub reason: String,
}

/// Compiles `next` entries, ordering guarded routes before unguarded ones and keeping
/// the written order within each group.
pub(super) fn compile_next(
    entries: &[NextDefinition],
    conditions: &ConditionRegistry,
    owner: &str,
) -> Result<Vec<NextRule>, DefinitionError> {
    entries
        .iter()
        .sorted_by_key(|entry| entry.condition.is_none())
        .map(|entry| {
            let condition = match entry.condition.as_deref() {
                None => None,
                Some(name) if conditions.contains(name) => Some(NextCondition::Named(name.to_string())),
                Some(source) => Some(NextCondition::Inline {
                    source: source.to_string(),
                    expression: conditions.parse_inline(source, owner)?,
                }),
            };
            Ok(NextRule {
                path: entry.path.clone(),
                condition,
            })
        })
        .collect()
}

/// Picks the first rule whose guard holds, or which has none.
pub(super) fn decide(
    rules: &[NextRule],
    conditions: &ConditionRegistry,
    context: EvaluationContext<'_>,
    default_path: &str,
) -> NextDecision {
    for (index, rule) in rules.iter().enumerate() {
        let outcome = match &rule.condition {
            None => {
                return NextDecision {
                    path: rule.path.clone(),
                    rule: Some(index),
                    reason: "unconditional route".to_string(),
                };
            }
            Some(NextCondition::Named(name)) => match conditions.get(name) {
                Some(condition) => conditions.explain(&Expression::Condition(condition.name.clone()), context),
                None => continue,
            },
            Some(NextCondition::Inline { expression, .. }) => conditions.explain(expression, context),
        };
        if outcome.holds {
            return NextDecision {
                path: rule.path.clone(),
                rule: Some(index),
                reason: outcome.reason,
            };
        }
    }
    NextDecision {
        path: default_path.to_string(),
        rule: None,
        reason: "no route matched; using the default".to_string(),
    }
}

/// The state conditions see: the page's section first, then everything.
pub(super) fn context_for<'s>(state: &'s State, section: Option<&str>) -> EvaluationContext<'s> {
    let scope = section
        .and_then(|name| state.get(name))
        .and_then(serde_json::Value::as_object);
    EvaluationContext::scoped(state, scope)
}
