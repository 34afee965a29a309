use super::ConditionRegistry;
use crate::ast::{EvaluationTrace, Expression, FieldPath, Value};
use crate::error::EvaluationError;
use crate::state::State;

/// The state a condition is evaluated against.
///
/// Field paths resolve against `scope` first (the state of the page's section, when
/// there is one) and then against the whole application state.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    scope: Option<&'a State>,
    root: &'a State,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(root: &'a State) -> Self {
        Self { scope: None, root }
    }

    pub fn scoped(root: &'a State, scope: Option<&'a State>) -> Self {
        Self { scope, root }
    }

    fn lookup(&self, path: &FieldPath) -> Option<&'a serde_json::Value> {
        self.scope
            .and_then(|scope| resolve(scope, &path.segments))
            .or_else(|| resolve(self.root, &path.segments))
    }
}

fn resolve<'v>(state: &'v State, segments: &[String]) -> Option<&'v serde_json::Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = state.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

// This macro generates a match arm for an ordering comparison.
macro_rules! eval_ordering {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $op_fn:expr) => {
        $self.eval_ordering($l, $r, $op_str, $op_fn)
    };
}

/// The core recursive engine for evaluating a single expression against one context.
pub(super) struct ConditionEngine<'a> {
    registry: &'a ConditionRegistry,
    context: EvaluationContext<'a>,
}

impl<'a> ConditionEngine<'a> {
    pub(super) fn new(registry: &'a ConditionRegistry, context: EvaluationContext<'a>) -> Self {
        Self { registry, context }
    }

    /// Evaluates the expression and returns a trace of the execution.
    pub(super) fn evaluate(&self, expression: &Expression) -> Result<EvaluationTrace, EvaluationError> {
        self.evaluate_recursive(expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> Result<EvaluationTrace, EvaluationError> {
        match expr {
            // --- Comparison Operations ---
            Expression::GreaterThan(l, r) => eval_ordering!(self, l, r, ">", |o| o.is_gt()),
            Expression::SmallerThan(l, r) => eval_ordering!(self, l, r, "<", |o| o.is_lt()),
            Expression::GreaterThanOrEqual(l, r) => {
                eval_ordering!(self, l, r, ">=", |o| o.is_ge())
            }
            Expression::SmallerThanOrEqual(l, r) => {
                eval_ordering!(self, l, r, "<=", |o| o.is_le())
            }

            // --- Equality ---
            Expression::Equal(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(left_trace.get_outcome() == right_trace.get_outcome());
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "==",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::NotEqual(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(left_trace.get_outcome() != right_trace.get_outcome());
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "!=",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::In(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let needle = left_trace.get_outcome();
                let outcome = match (&needle, right_trace.get_outcome()) {
                    (_, Value::List(items)) => Value::Bool(items.contains(&needle)),
                    (Value::Text(part), Value::Text(whole)) => Value::Bool(whole.contains(part.as_str())),
                    (_, haystack) => return Err(self.type_mismatch("in", "List or Text", haystack)),
                };
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "in",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }

            // --- Logical Operations ---
            Expression::And(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                if !left_trace.get_outcome().is_truthy() {
                    return Ok(EvaluationTrace::BinaryOp {
                        op_symbol: "and",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome: Value::Bool(false),
                    });
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(right_trace.get_outcome().is_truthy());
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "and",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::Or(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                if left_trace.get_outcome().is_truthy() {
                    return Ok(EvaluationTrace::BinaryOp {
                        op_symbol: "or",
                        left: Box::new(left_trace),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome: Value::Bool(true),
                    });
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(right_trace.get_outcome().is_truthy());
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: "or",
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::Not(v) => {
                let child_trace = self.evaluate_recursive(v)?;
                let outcome = Value::Bool(!child_trace.get_outcome().is_truthy());
                Ok(EvaluationTrace::UnaryOp {
                    op_symbol: "not",
                    child: Box::new(child_trace),
                    outcome,
                })
            }

            // --- Leaf Nodes ---
            Expression::Literal(v) => Ok(EvaluationTrace::Leaf {
                source: v.to_string(),
                value: v.clone(),
            }),
            Expression::Field(path) => {
                let raw = self
                    .context
                    .lookup(path)
                    .ok_or_else(|| EvaluationError::InputNotFound(path.segments.join(".")))?;
                let value = Value::from_json(raw)
                    .ok_or_else(|| EvaluationError::UnsupportedValue(path.segments.join(".")))?;
                Ok(EvaluationTrace::Leaf {
                    source: path.to_string(),
                    value,
                })
            }
            Expression::Condition(name) => {
                let condition = self
                    .registry
                    .get(name)
                    .ok_or_else(|| EvaluationError::UnknownCondition(name.clone()))?;
                let child_trace = self.evaluate_recursive(&condition.expression)?;
                let outcome = Value::Bool(child_trace.get_outcome().is_truthy());
                Ok(EvaluationTrace::Condition {
                    name: name.clone(),
                    child: Box::new(child_trace),
                    outcome,
                })
            }
        }
    }

    /// Helper for ordering comparisons between two numbers or two strings.
    fn eval_ordering(
        &self,
        l: &Expression,
        r: &Expression,
        op_str: &'static str,
        op_fn: fn(std::cmp::Ordering) -> bool,
    ) -> Result<EvaluationTrace, EvaluationError> {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        let ordering = match (left_trace.get_outcome(), right_trace.get_outcome()) {
            (Value::Number(lv), Value::Number(rv)) => lv
                .partial_cmp(&rv)
                .ok_or_else(|| self.type_mismatch(op_str, "comparable Number", Value::Number(lv)))?,
            (Value::Text(lv), Value::Text(rv)) => lv.cmp(&rv),
            (Value::Number(_), found) | (Value::Text(_), found) => {
                return Err(self.type_mismatch(op_str, "a value of the same type", found));
            }
            (found, _) => return Err(self.type_mismatch(op_str, "Number or Text", found)),
        };
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op_str,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome: Value::Bool(op_fn(ordering)),
        })
    }

    fn type_mismatch(&self, op: &str, expected: &str, found: Value) -> EvaluationError {
        EvaluationError::TypeMismatch {
            operation: op.to_string(),
            expected: expected.to_string(),
            found,
        }
    }
}
