//! Parser for the condition expression grammar.
//!
//! ```text
//! expr    := or
//! or      := and (("or" | "||") and)*
//! and     := not (("and" | "&&") not)*
//! not     := ("not" | "!") not | compare
//! compare := operand (("==" | "!=" | ">" | ">=" | "<" | "<=" | "in") operand)?
//! operand := number | 'text' | "text" | true | false | null
//!          | path | "@" name | "(" expr ")"
//! path    := identifier ("." identifier)*
//! ```
//!
//! A bare single-segment identifier naming a declared condition becomes a condition
//! reference; any other identifier is a state field path.

use crate::ast::{Expression, FieldPath, Value};
use crate::error::DefinitionError;
use ahash::AHashSet;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Ident(String),
    At,
    Dot,
    LParen,
    RParen,
    Not,
    And,
    Or,
    In,
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Text(s) => format!("text '{}'", s),
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::At => "'@'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Not => "'not'".to_string(),
            Token::And => "'and'".to_string(),
            Token::Or => "'or'".to_string(),
            Token::In => "'in'".to_string(),
            Token::Eq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::LtEq => "'<='".to_string(),
        }
    }
}

/// Parses `source` into an expression.
///
/// `known_conditions` decides how bare identifiers resolve; `owner` names whatever
/// holds the expression (a condition name or a page path) for error messages.
pub fn parse_expression(
    source: &str,
    known_conditions: &AHashSet<String>,
    owner: &str,
) -> Result<Expression, DefinitionError> {
    let tokens = tokenize(source)?;
    let mut parser = ExpressionParser {
        source,
        tokens,
        pos: 0,
        known_conditions,
        owner,
    };
    let expression = parser.parse_or()?;
    if let Some((token, offset)) = parser.tokens.get(parser.pos) {
        return Err(syntax_error(
            source,
            *offset,
            format!("unexpected {} after end of expression", token.describe()),
        ));
    }
    Ok(expression)
}

fn syntax_error(source: &str, position: usize, message: String) -> DefinitionError {
    DefinitionError::ExpressionSyntax {
        expression: source.to_string(),
        position,
        message,
    }
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, DefinitionError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let peek = chars.get(i + 1).map(|(_, c)| *c);

        match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '(' => tokens.push((Token::LParen, offset)),
            ')' => tokens.push((Token::RParen, offset)),
            '@' => tokens.push((Token::At, offset)),
            '.' if !peek.is_some_and(|p| p.is_ascii_digit()) => tokens.push((Token::Dot, offset)),
            '=' if peek == Some('=') => {
                // `===` is accepted as a synonym for `==`.
                i += if chars.get(i + 2).map(|(_, c)| *c) == Some('=') { 2 } else { 1 };
                tokens.push((Token::Eq, offset));
            }
            '!' if peek == Some('=') => {
                i += if chars.get(i + 2).map(|(_, c)| *c) == Some('=') { 2 } else { 1 };
                tokens.push((Token::NotEq, offset));
            }
            '!' => tokens.push((Token::Not, offset)),
            '>' if peek == Some('=') => {
                i += 1;
                tokens.push((Token::GtEq, offset));
            }
            '>' => tokens.push((Token::Gt, offset)),
            '<' if peek == Some('=') => {
                i += 1;
                tokens.push((Token::LtEq, offset));
            }
            '<' => tokens.push((Token::Lt, offset)),
            '&' if peek == Some('&') => {
                i += 1;
                tokens.push((Token::And, offset));
            }
            '|' if peek == Some('|') => {
                i += 1;
                tokens.push((Token::Or, offset));
            }
            '\'' | '"' => {
                let quote = c;
                let mut text = String::new();
                let mut j = i + 1;
                let mut closed = false;
                while j < chars.len() {
                    let (_, ch) = chars[j];
                    if ch == '\\' {
                        if let Some((_, escaped)) = chars.get(j + 1) {
                            text.push(*escaped);
                            j += 2;
                            continue;
                        }
                    }
                    if ch == quote {
                        closed = true;
                        break;
                    }
                    text.push(ch);
                    j += 1;
                }
                if !closed {
                    return Err(syntax_error(
                        source,
                        offset,
                        "unterminated string literal".to_string(),
                    ));
                }
                tokens.push((Token::Text(text), offset));
                i = j;
            }
            c if c.is_ascii_digit()
                || c == '.'
                || (c == '-' && peek.is_some_and(|p| p.is_ascii_digit())) =>
            {
                let mut j = i + 1;
                while j < chars.len() && (chars[j].1.is_ascii_digit() || chars[j].1 == '.') {
                    j += 1;
                }
                let end = chars.get(j).map_or(source.len(), |(o, _)| *o);
                let literal = &source[offset..end];
                let number = literal.parse::<f64>().map_err(|_| {
                    syntax_error(source, offset, format!("invalid number '{}'", literal))
                })?;
                tokens.push((Token::Number(number), offset));
                i = j;
                continue;
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut j = i + 1;
                while j < chars.len() && (chars[j].1.is_alphanumeric() || chars[j].1 == '_') {
                    j += 1;
                }
                let end = chars.get(j).map_or(source.len(), |(o, _)| *o);
                let word = &source[offset..end];
                let token = match word {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    _ => Token::Ident(word.trim_start_matches('$').to_string()),
                };
                tokens.push((token, offset));
                i = j;
                continue;
            }
            other => {
                return Err(syntax_error(
                    source,
                    offset,
                    format!("unexpected character '{}'", other),
                ));
            }
        }
        i += 1;
    }

    Ok(tokens)
}

struct ExpressionParser<'a> {
    source: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    known_conditions: &'a AHashSet<String>,
    owner: &'a str,
}

impl<'a> ExpressionParser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |(_, o)| *o)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<Expression, DefinitionError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, DefinitionError> {
        let mut left = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, DefinitionError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expression, DefinitionError> {
        let left = self.parse_operand()?;
        let constructor: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
            Some(Token::Eq) => Expression::Equal,
            Some(Token::NotEq) => Expression::NotEqual,
            Some(Token::Gt) => Expression::GreaterThan,
            Some(Token::GtEq) => Expression::GreaterThanOrEqual,
            Some(Token::Lt) => Expression::SmallerThan,
            Some(Token::LtEq) => Expression::SmallerThanOrEqual,
            Some(Token::In) => Expression::In,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_operand()?;
        Ok(constructor(Box::new(left), Box::new(right)))
    }

    fn parse_operand(&mut self) -> Result<Expression, DefinitionError> {
        let offset = self.offset();
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expression::Literal(Value::Number(n))),
            Some(Token::Text(s)) => Ok(Expression::Literal(Value::Text(s))),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(syntax_error(
                        self.source,
                        offset,
                        "unbalanced parenthesis".to_string(),
                    )),
                }
            }
            Some(Token::At) => match self.advance() {
                Some(Token::Ident(name)) => {
                    if self.known_conditions.contains(&name) {
                        Ok(Expression::Condition(name))
                    } else {
                        Err(DefinitionError::UndeclaredCondition {
                            name,
                            referenced_by: self.owner.to_string(),
                        })
                    }
                }
                _ => Err(syntax_error(
                    self.source,
                    offset,
                    "expected a condition name after '@'".to_string(),
                )),
            },
            Some(Token::Ident(word)) => match word.as_str() {
                "true" => Ok(Expression::Literal(Value::Bool(true))),
                "false" => Ok(Expression::Literal(Value::Bool(false))),
                "null" | "undefined" => Ok(Expression::Literal(Value::Null)),
                _ => self.parse_path(word),
            },
            Some(token) => Err(syntax_error(
                self.source,
                offset,
                format!("expected a value but found {}", token.describe()),
            )),
            None => Err(syntax_error(
                self.source,
                offset,
                "unexpected end of expression".to_string(),
            )),
        }
    }

    fn parse_path(&mut self, first: String) -> Result<Expression, DefinitionError> {
        let mut segments = vec![first];
        while self.peek() == Some(&Token::Dot) {
            self.advance();
            let offset = self.offset();
            match self.advance() {
                Some(Token::Ident(segment)) => segments.push(segment),
                _ => {
                    return Err(syntax_error(
                        self.source,
                        offset,
                        "expected a field name after '.'".to_string(),
                    ));
                }
            }
        }

        if segments.len() == 1 && self.known_conditions.contains(&segments[0]) {
            return Ok(Expression::Condition(segments.remove(0)));
        }
        Ok(Expression::Field(FieldPath::new(segments)))
    }
}
