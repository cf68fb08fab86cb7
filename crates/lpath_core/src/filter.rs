//! Filter expression parsing
//!
//! An expression is split at its loosest top-level operator. Operators of
//! different precedence tiers mix freely; two operators of the loosest tier
//! at the same level must be grouped with parentheses.

use crate::ast::{ArithmeticOp, ComparisonOp, Filter, Literal, LogicalOp};
use crate::error::SyntaxError;
use crate::lexer::{self, Cursor};
use crate::parser::{Origin, Parser};
use regex::Regex;
use serde_json::Number;
use std::sync::LazyLock;

static NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?([eE][+-]?\d+)?$").ok());

/// Characters after which `-` and `+` are signs rather than operators
const OPERATOR_CHARS: &str = "(+-*/%<>=!&|";

/// Where an expression's result is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Predicate or logical operand
    Boolean,
    /// Comparison or arithmetic operand
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperatorKind {
    Logical(LogicalOp),
    Comparison(ComparisonOp),
    Arithmetic(ArithmeticOp),
}

impl OperatorKind {
    /// Binding strength, loosest first
    fn tier(self) -> u8 {
        match self {
            OperatorKind::Logical(LogicalOp::Or) => 0,
            OperatorKind::Logical(LogicalOp::And) => 1,
            OperatorKind::Comparison(ComparisonOp::Eq | ComparisonOp::Ne) => 2,
            OperatorKind::Comparison(_) => 3,
            OperatorKind::Arithmetic(ArithmeticOp::Add | ArithmeticOp::Subtract) => 4,
            OperatorKind::Arithmetic(_) => 5,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            OperatorKind::Logical(op) => op.symbol(),
            OperatorKind::Comparison(op) => op.symbol(),
            OperatorKind::Arithmetic(op) => op.symbol(),
        }
    }
}

/// A top-level operator found by [`Parser::scan_operators`]
#[derive(Debug, Clone, Copy)]
struct Operator {
    kind: OperatorKind,
    /// Byte index relative to the scanned text
    index: usize,
    len: usize,
}

impl<'s> Parser<'s> {
    /// Parse the text after `?` in a filter selector
    pub(crate) fn parse_filter(
        &self,
        text: &'s str,
        offset: usize,
        depth: usize,
    ) -> Result<Filter, SyntaxError> {
        self.parse_expr(text, offset, depth, Position::Boolean)
    }

    fn parse_expr(
        &self,
        text: &'s str,
        offset: usize,
        depth: usize,
        position: Position,
    ) -> Result<Filter, SyntaxError> {
        self.check_depth(depth, offset)?;

        let offset = offset + (text.len() - text.trim_start().len());
        let text = text.trim();
        if text.is_empty() {
            return Err(self.error("empty expression", offset));
        }

        let operators = self.scan_operators(text, offset)?;
        let Some(loosest) = operators.iter().map(|op| op.kind.tier()).min() else {
            return self.parse_unary(text, offset, depth, position);
        };

        let mut at_tier = operators.iter().filter(|op| op.kind.tier() == loosest);
        let Some(op) = at_tier.next() else {
            return self.parse_unary(text, offset, depth, position);
        };
        if let Some(next) = at_tier.next() {
            return Err(self.error(
                format!(
                    "operators '{}' and '{}' must be grouped with parentheses",
                    op.kind.symbol(),
                    next.kind.symbol()
                ),
                offset + next.index,
            ));
        }

        let left = &text[..op.index];
        let right = &text[op.index + op.len..];
        let right_offset = offset + op.index + op.len;

        match op.kind {
            OperatorKind::Logical(logical) => {
                if position == Position::Value {
                    return Err(self.error(
                        format!("logical '{logical}' cannot be used as a value"),
                        offset + op.index,
                    ));
                }
                Ok(Filter::Logical {
                    primary: Box::new(self.parse_expr(left, offset, depth, Position::Boolean)?),
                    op: logical,
                    secondary: Box::new(self.parse_expr(
                        right,
                        right_offset,
                        depth,
                        Position::Boolean,
                    )?),
                })
            }
            OperatorKind::Comparison(comparison) => {
                if position == Position::Value {
                    return Err(self.error(
                        format!("comparison '{comparison}' cannot be used as a value"),
                        offset + op.index,
                    ));
                }
                Ok(Filter::Comparison {
                    primary: Box::new(self.parse_expr(left, offset, depth, Position::Value)?),
                    op: comparison,
                    secondary: Box::new(self.parse_expr(
                        right,
                        right_offset,
                        depth,
                        Position::Value,
                    )?),
                })
            }
            OperatorKind::Arithmetic(arithmetic) => Ok(Filter::Arithmetic {
                primary: Box::new(self.parse_expr(left, offset, depth, Position::Value)?),
                op: arithmetic,
                secondary: Box::new(self.parse_expr(right, right_offset, depth, Position::Value)?),
            }),
        }
    }

    /// An expression with no top-level binary operator
    fn parse_unary(
        &self,
        text: &'s str,
        offset: usize,
        depth: usize,
        position: Position,
    ) -> Result<Filter, SyntaxError> {
        if let Some(rest) = text.strip_prefix('!') {
            if position == Position::Value {
                return Err(self.error("negation cannot be used as a value", offset));
            }
            let rest_offset = offset + 1 + (rest.len() - rest.trim_start().len());
            let rest = rest.trim_start();

            if rest.starts_with('(') {
                let inner = self.parse_group(rest, rest_offset, depth, Position::Boolean)?;
                return Ok(Filter::Not(Box::new(inner)));
            }
            if rest.starts_with('@') || rest.starts_with('$') {
                let path = self.parse_path(rest, rest_offset, depth, Origin::Reference)?;
                return Ok(Filter::Existence {
                    path,
                    inverted: true,
                });
            }
            return Err(self.error(
                "'!' must be followed by a node reference or a parenthesized expression",
                offset,
            ));
        }

        if text.starts_with('(') {
            return self.parse_group(text, offset, depth, position);
        }

        if text.starts_with('@') || text.starts_with('$') {
            let path = self.parse_path(text, offset, depth, Origin::Reference)?;
            return Ok(match position {
                Position::Boolean => Filter::Existence {
                    path,
                    inverted: false,
                },
                Position::Value => Filter::NodeRef(path),
            });
        }

        self.parse_literal(text, offset).map(Filter::Literal)
    }

    /// `( expr )` spanning all of `text`
    fn parse_group(
        &self,
        text: &'s str,
        offset: usize,
        depth: usize,
        position: Position,
    ) -> Result<Filter, SyntaxError> {
        let close = lexer::closing_paren(text, offset, self.source)?
            .ok_or_else(|| self.error("unclosed '('", offset))?;
        if close + 1 != text.len() {
            return Err(self.error(
                format!("unexpected text after ')': `{}`", text[close + 1..].trim()),
                offset + close + 1,
            ));
        }
        self.parse_expr(&text[1..close], offset + 1, depth + 1, position)
    }

    fn parse_literal(&self, text: &'s str, offset: usize) -> Result<Literal, SyntaxError> {
        if text.starts_with('\'') || text.starts_with('"') {
            return lexer::unquote(text, offset, self.source).map(Literal::String);
        }

        match text {
            "true" => return Ok(Literal::Bool(true)),
            "false" => return Ok(Literal::Bool(false)),
            "null" => return Ok(Literal::Null),
            _ => {}
        }

        if NUMBER.as_ref().is_some_and(|re| re.is_match(text)) {
            return self.parse_number(text, offset).map(Literal::Number);
        }

        Err(self.error(format!("unsupported expression: `{text}`"), offset))
    }

    fn parse_number(&self, text: &str, offset: usize) -> Result<Number, SyntaxError> {
        let integral = !text.contains(['.', 'e', 'E']);
        if integral && let Ok(n) = text.parse::<i64>() {
            return Ok(Number::from(n));
        }
        if integral && let Ok(n) = text.parse::<u64>() {
            return Ok(Number::from(n));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| self.error(format!("number out of range: `{text}`"), offset))
    }

    /// Find the binary operators at the top level of `text`
    fn scan_operators(&self, text: &str, offset: usize) -> Result<Vec<Operator>, SyntaxError> {
        let mut cursor = Cursor::new(text, offset, self.source).with_parens();
        let mut operators = Vec::new();
        let mut prev: Option<char> = None;
        let mut token_start = 0;

        while let Some(scanned) = cursor.advance()? {
            let index = scanned.index;
            let ch = scanned.ch;

            if scanned.plain && ch.is_whitespace() {
                token_start = index + ch.len_utf8();
                continue;
            }
            if !scanned.plain || !cursor.at_top_level() {
                prev = Some(ch);
                continue;
            }

            let follows_operand = prev.is_some_and(|p| !OPERATOR_CHARS.contains(p));
            let next = cursor.peek_char();
            let expected =
                |symbol: &str| self.error(format!("expected '{symbol}'"), offset + index);

            let found = match ch {
                '|' if next == Some('|') => Some((OperatorKind::Logical(LogicalOp::Or), 2)),
                '|' => return Err(expected("||")),
                '&' if next == Some('&') => Some((OperatorKind::Logical(LogicalOp::And), 2)),
                '&' => return Err(expected("&&")),
                '=' if next == Some('=') => Some((OperatorKind::Comparison(ComparisonOp::Eq), 2)),
                '=' => return Err(expected("==")),
                '!' if next == Some('=') => Some((OperatorKind::Comparison(ComparisonOp::Ne), 2)),
                '<' if next == Some('=') => Some((OperatorKind::Comparison(ComparisonOp::Le), 2)),
                '<' => Some((OperatorKind::Comparison(ComparisonOp::Lt), 1)),
                '>' if next == Some('=') => Some((OperatorKind::Comparison(ComparisonOp::Ge), 2)),
                '>' => Some((OperatorKind::Comparison(ComparisonOp::Gt), 1)),
                '+' | '-' if follows_operand && !is_exponent_prefix(&text[token_start..index]) => {
                    let op = if ch == '+' {
                        ArithmeticOp::Add
                    } else {
                        ArithmeticOp::Subtract
                    };
                    Some((OperatorKind::Arithmetic(op), 1))
                }
                '*' if follows_operand && !text[..index].ends_with(['.', '[']) => {
                    Some((OperatorKind::Arithmetic(ArithmeticOp::Multiply), 1))
                }
                '/' if follows_operand => Some((OperatorKind::Arithmetic(ArithmeticOp::Divide), 1)),
                '%' if follows_operand => Some((OperatorKind::Arithmetic(ArithmeticOp::Modulo), 1)),
                _ => None,
            };

            match found {
                Some((kind, len)) => {
                    if len == 2 {
                        cursor.advance()?;
                    }
                    operators.push(Operator { kind, index, len });
                    prev = text[index..index + len].chars().last();
                    token_start = index + len;
                }
                None => prev = Some(ch),
            }
        }
        cursor.finish()?;

        Ok(operators)
    }
}

/// `1e` or `-2.5E`: the sign that follows belongs to an exponent
fn is_exponent_prefix(token: &str) -> bool {
    let Some(mantissa) = token.strip_suffix(['e', 'E']) else {
        return false;
    };
    let mantissa = mantissa.strip_prefix('-').unwrap_or(mantissa);
    mantissa.starts_with(|c: char| c.is_ascii_digit())
        && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
}
