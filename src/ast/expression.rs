use super::{FieldPath, Value};
use std::collections::HashSet;
use std::fmt;

/// The Abstract Syntax Tree of a compiled condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),
    In(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
    Field(FieldPath),
    Condition(String),
}

impl Expression {
    /// Collects the names of every condition this expression refers to.
    pub fn referenced_conditions(&self, names: &mut HashSet<String>) {
        match self {
            Expression::Condition(name) => {
                names.insert(name.clone());
            }
            Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r)
            | Expression::In(l, r) => {
                l.referenced_conditions(names);
                r.referenced_conditions(names);
            }
            Expression::Not(v) => v.referenced_conditions(names),
            Expression::Literal(_) | Expression::Field(_) => {}
        }
    }

    /// Collects every state field path this expression reads directly.
    pub fn referenced_fields(&self, fields: &mut HashSet<FieldPath>) {
        match self {
            Expression::Field(path) => {
                fields.insert(path.clone());
            }
            Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r)
            | Expression::In(l, r) => {
                l.referenced_fields(fields);
                r.referenced_fields(fields);
            }
            Expression::Not(v) => v.referenced_fields(fields),
            Expression::Literal(_) | Expression::Condition(_) => {}
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Or(..) => 1,
            Expression::And(..) => 2,
            Expression::Equal(..) | Expression::NotEqual(..) => 4,
            Expression::GreaterThan(..)
            | Expression::GreaterThanOrEqual(..)
            | Expression::SmallerThan(..)
            | Expression::SmallerThanOrEqual(..)
            | Expression::In(..) => 5,
            Expression::Not(_) => 8,
            Expression::Literal(_) | Expression::Field(_) | Expression::Condition(_) => 9,
        }
    }

    fn fmt_with_parent(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        let own = self.precedence();
        let needs_parens = own < parent;
        if needs_parens {
            write!(f, "(")?;
        }
        match self {
            Expression::Literal(v) => write!(f, "{}", v)?,
            Expression::Field(path) => write!(f, "{}", path.segments.join("."))?,
            Expression::Condition(name) => write!(f, "@{}", name)?,
            Expression::Not(v) => {
                write!(f, "not ")?;
                v.fmt_with_parent(f, own)?;
            }
            Expression::And(l, r) => self.fmt_binary(f, "and", l, r, own)?,
            Expression::Or(l, r) => self.fmt_binary(f, "or", l, r, own)?,
            Expression::Equal(l, r) => self.fmt_binary(f, "==", l, r, own)?,
            Expression::NotEqual(l, r) => self.fmt_binary(f, "!=", l, r, own)?,
            Expression::GreaterThan(l, r) => self.fmt_binary(f, ">", l, r, own)?,
            Expression::GreaterThanOrEqual(l, r) => self.fmt_binary(f, ">=", l, r, own)?,
            Expression::SmallerThan(l, r) => self.fmt_binary(f, "<", l, r, own)?,
            Expression::SmallerThanOrEqual(l, r) => self.fmt_binary(f, "<=", l, r, own)?,
            Expression::In(l, r) => self.fmt_binary(f, "in", l, r, own)?,
        }
        if needs_parens {
            write!(f, ")")?;
        }
        Ok(())
    }

    fn fmt_binary(
        &self,
        f: &mut fmt::Formatter<'_>,
        symbol: &str,
        l: &Expression,
        r: &Expression,
        own: u8,
    ) -> fmt::Result {
        l.fmt_with_parent(f, own)?;
        write!(f, " {} ", symbol)?;
        // Right operands bind one level tighter so `a and (b and c)` keeps its parentheses.
        r.fmt_with_parent(f, own + 1)
    }
}

/// Renders the expression back into the condition grammar.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_parent(f, 0)
    }
}
