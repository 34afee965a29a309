use crate::ast::EvaluationTrace;

/// Renders an [`EvaluationTrace`] as the reason text attached to a navigation decision.
///
/// Field reads show the value they saw (`$age (was 36)`) and condition references show
/// their outcome and body, e.g. `@isAdult (was true: $age (was 36) >= 18)`. Operands of a
/// short-circuited operator are left out.
pub struct TraceFormatter;

impl TraceFormatter {
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        Self::render(trace, 0)
    }

    /// Parenthesises only where the child binds looser than its parent.
    fn render(trace: &EvaluationTrace, parent_precedence: u8) -> String {
        let precedence = trace.precedence();
        let text = match trace {
            EvaluationTrace::BinaryOp { op_symbol, left, right, .. } => {
                let left = Self::render(left, precedence);
                if matches!(**right, EvaluationTrace::NotEvaluated) {
                    left
                } else {
                    format!("{} {} {}", left, op_symbol, Self::render(right, precedence + 1))
                }
            }
            EvaluationTrace::UnaryOp { op_symbol, child, .. } => {
                format!("{} {}", op_symbol, Self::render(child, precedence))
            }
            EvaluationTrace::Condition { name, child, outcome } => {
                format!("@{} (was {}: {})", name, outcome, Self::render(child, 0))
            }
            EvaluationTrace::Leaf { source, value } if source.starts_with('$') => {
                format!("{} (was {})", source, value)
            }
            EvaluationTrace::Leaf { source, .. } => source.clone(),
            EvaluationTrace::NotEvaluated => String::new(),
        };

        if precedence < parent_precedence {
            format!("({})", text)
        } else {
            text
        }
    }
}
