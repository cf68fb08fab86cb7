//! AST definitions for compiled paths

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

/// A compiled path: an ordered sequence of [`Node`]s
///
/// Equality and hashing are structural. `Display` writes the original source
/// text; [`JsonPath::to_canonical_string`] re-derives text from the nodes.
#[derive(Debug, Clone)]
pub struct JsonPath {
    nodes: Vec<Node>,
    source: String,
}

/// Type marker of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Document root: `$`
    Root,
    /// Node under test in a filter: `@`
    Current,
    /// Recursive descent: `..`
    DeepScan,
}

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    node_type: Option<NodeType>,
    name: Option<String>,
    /// Unescaped bare `*`; an escaped `\*` is the name "*" instead
    wildcard: bool,
    segments: Vec<Segment>,
}

/// One bracketed clause `[...]`; several selectors form a union
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    selectors: Vec<Selector>,
}

/// A selector within a segment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `[*]`
    Wildcard,
    /// `[0]` or `[-1]`
    Index(i64),
    /// `['key']`
    Name(String),
    /// `[start:end:step]`
    Slice(Slicing),
    /// `[?(expr)]`
    Filter(Box<Filter>),
}

/// Array slice bounds; absent values take their defaults at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Slicing {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<i64>,
}

/// A filter expression (a parameter of a `?(...)` predicate)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Primitive literal: `'a'`, `10`, `2.5`, `true`, `null`
    Literal(Literal),
    /// A node whose value is compared or computed with: `@.price`
    NodeRef(JsonPath),
    /// True iff the node resolves to at least one value: `@.isbn`, `!@.isbn`
    Existence { path: JsonPath, inverted: bool },
    /// Negated boolean expression: `!(@.a > 1)`
    Not(Box<Filter>),
    /// `@.price * 2`
    Arithmetic {
        primary: Box<Filter>,
        op: ArithmeticOp,
        secondary: Box<Filter>,
    },
    /// `@.price < 10`
    Comparison {
        primary: Box<Filter>,
        op: ComparisonOp,
        secondary: Box<Filter>,
    },
    /// `@.a && @.b`
    Logical {
        primary: Box<Filter>,
        op: LogicalOp,
        secondary: Box<Filter>,
    },
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equal: `==`
    Eq,
    /// Not equal: `!=`
    Ne,
    /// Less than: `<`
    Lt,
    /// Less than or equal: `<=`
    Le,
    /// Greater than: `>`
    Gt,
    /// Greater than or equal: `>=`
    Ge,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Logical AND: `&&`
    And,
    /// Logical OR: `||`
    Or,
}

/// Literal values in filter expressions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl JsonPath {
    pub(crate) fn new(nodes: Vec<Node>, source: impl Into<String>) -> Self {
        Self {
            nodes,
            source: source.into(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The text this path was compiled from, verbatim
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Text re-derived from the nodes; compiles back to an equal path
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            // Writing into a String cannot fail
            let _ = write!(out, "{node}");
        }
        out
    }
}

impl PartialEq for JsonPath {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for JsonPath {}

impl Hash for JsonPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nodes.hash(state);
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl NodeType {
    pub fn marker(self) -> &'static str {
        match self {
            NodeType::Root => "$",
            NodeType::Current => "@",
            NodeType::DeepScan => "..",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

impl Node {
    pub(crate) fn new(
        node_type: Option<NodeType>,
        name: Option<String>,
        segments: Vec<Segment>,
    ) -> Self {
        Self {
            node_type,
            name,
            wildcard: false,
            segments,
        }
    }

    /// A `.*` or `..*` step
    pub(crate) fn wildcard(node_type: Option<NodeType>, segments: Vec<Segment>) -> Self {
        Self {
            node_type,
            name: None,
            wildcard: true,
            segments,
        }
    }

    pub fn node_type(&self) -> Option<NodeType> {
        self.node_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.node_type == Some(NodeType::Root)
    }

    pub fn is_current(&self) -> bool {
        self.node_type == Some(NodeType::Current)
    }

    pub fn is_deep_scan(&self) -> bool {
        self.node_type == Some(NodeType::DeepScan)
    }

    /// The bare name `*` (as in `$.*` or `$..*`)
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// This node without its last segment
    pub(crate) fn without_last_segment(&self) -> Self {
        let mut node = self.clone();
        node.segments.pop();
        node
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_type {
            Some(node_type) => write!(f, "{node_type}")?,
            None => f.write_char('.')?,
        }
        if self.wildcard {
            f.write_char('*')?;
        } else if let Some(name) = &self.name {
            write_bare_name(f, name)?;
        }
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

fn write_bare_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    for (i, ch) in name.chars().enumerate() {
        // Operator characters are escaped so a name also reparses inside a filter
        let special = matches!(
            ch,
            '\\' | '.' | '[' | ']' | '\'' | '"' | '(' | ')' | '+' | '-' | '*' | '/' | '%'
                | '<' | '>' | '=' | '!' | '&' | '|'
        ) || (i == 0 && matches!(ch, '$' | '@'));
        if special {
            f.write_char('\\')?;
        }
        f.write_char(ch)?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('\'')?;
    for ch in value.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) <= 0x1F => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

impl Segment {
    pub(crate) fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// A union of several comma-joined alternatives
    pub fn is_repeatable(&self) -> bool {
        self.selectors.len() > 1
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            write!(f, "{selector}")?;
        }
        f.write_char(']')
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Wildcard => f.write_char('*'),
            Selector::Index(index) => write!(f, "{index}"),
            Selector::Name(name) => write_quoted(f, name),
            Selector::Slice(slicing) => write!(f, "{slicing}"),
            Selector::Filter(filter) => write!(f, "?({filter})"),
        }
    }
}

impl Slicing {
    pub fn step(&self) -> i64 {
        self.step.unwrap_or(1)
    }
}

impl fmt::Display for Slicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_char(':')?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        if let Some(step) = self.step {
            write!(f, ":{step}")?;
        }
        Ok(())
    }
}

impl Filter {
    fn is_binary(&self) -> bool {
        matches!(
            self,
            Filter::Arithmetic { .. } | Filter::Comparison { .. } | Filter::Logical { .. }
        )
    }
}

/// Binary operands are parenthesized so the text reparses to the same tree
fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Filter) -> fmt::Result {
    if operand.is_binary() {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Literal(literal) => write!(f, "{literal}"),
            Filter::NodeRef(path) => f.write_str(&path.to_canonical_string()),
            Filter::Existence { path, inverted } => {
                if *inverted {
                    f.write_char('!')?;
                }
                f.write_str(&path.to_canonical_string())
            }
            Filter::Not(inner) => write!(f, "!({inner})"),
            Filter::Arithmetic {
                primary,
                op,
                secondary,
            } => {
                write_operand(f, primary)?;
                write!(f, " {op} ")?;
                write_operand(f, secondary)
            }
            Filter::Comparison {
                primary,
                op,
                secondary,
            } => {
                write_operand(f, primary)?;
                write!(f, " {op} ")?;
                write_operand(f, secondary)
            }
            Filter::Logical {
                primary,
                op,
                secondary,
            } => {
                write_operand(f, primary)?;
                write!(f, " {op} ")?;
                write_operand(f, secondary)
            }
        }
    }
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulo => "%",
        }
    }
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }
}

impl LogicalOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write_quoted(f, s),
        }
    }
}
