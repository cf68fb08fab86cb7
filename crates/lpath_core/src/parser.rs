//! Compiler from path strings to [`JsonPath`]

use crate::ast::{JsonPath, Node, NodeType, Segment, Selector, Slicing};
use crate::error::SyntaxError;
use crate::lexer::{self, RawNode};
use crate::options::Options;
use log::debug;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static INDEX_LIST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\s*,\s*-?\d+)*$").ok());

/// Compiles path strings
///
/// A compiler holds only its [`Options`]; compiled paths are independent of
/// it and may be cached by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    options: Options,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Compile a path string (which must start with `$`)
    pub fn compile(&self, path: &str) -> Result<JsonPath, SyntaxError> {
        let parser = Parser {
            source: path,
            options: self.options,
        };
        let compiled = parser.parse_path(path, 0, 0, Origin::Root)?;
        debug!(
            "compiled `{path}` into {} node(s)",
            compiled.nodes().len()
        );
        Ok(compiled)
    }
}

impl JsonPath {
    /// Compile with default [`Options`]
    pub fn parse(path: &str) -> Result<Self, SyntaxError> {
        Compiler::new().compile(path)
    }
}

impl FromStr for JsonPath {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Which markers may start a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Top-level path: `$` only
    Root,
    /// Node reference inside a filter: `@` or `$`
    Reference,
}

/// Parsing state shared by the path, segment and filter parsers
pub(crate) struct Parser<'s> {
    /// The complete text being compiled, for error reporting
    pub source: &'s str,
    pub options: Options,
}

impl<'s> Parser<'s> {
    pub(crate) fn error(&self, message: impl Into<String>, position: usize) -> SyntaxError {
        SyntaxError::new(message, position, self.source)
    }

    pub(crate) fn check_depth(&self, depth: usize, position: usize) -> Result<(), SyntaxError> {
        if depth > self.options.max_depth {
            return Err(self.error(
                format!(
                    "expression nesting exceeds maximum depth of {}",
                    self.options.max_depth
                ),
                position,
            ));
        }
        Ok(())
    }

    /// Parse `text` (found at `offset` in the source) as a sequence of nodes
    pub(crate) fn parse_path(
        &self,
        text: &'s str,
        offset: usize,
        depth: usize,
        origin: Origin,
    ) -> Result<JsonPath, SyntaxError> {
        let allowed = match origin {
            Origin::Root => text.starts_with('$'),
            Origin::Reference => text.starts_with('$') || text.starts_with('@'),
        };
        if !allowed {
            let message = match origin {
                Origin::Root => "a path must start with '$'",
                Origin::Reference => "a node reference must start with '@' or '$'",
            };
            return Err(self.error(message, offset));
        }

        let raw_nodes = lexer::split_nodes(text, offset, self.source)?;
        let mut nodes = Vec::with_capacity(raw_nodes.len());
        for (i, raw) in raw_nodes.into_iter().enumerate() {
            nodes.push(self.parse_node(raw, i == 0, depth)?);
        }

        Ok(JsonPath::new(nodes, text))
    }

    fn parse_node(
        &self,
        raw: RawNode<'s>,
        first: bool,
        depth: usize,
    ) -> Result<Node, SyntaxError> {
        let (node_type, rest, rest_offset) = if raw.deep {
            (Some(NodeType::DeepScan), raw.text, raw.offset)
        } else if let Some(rest) = raw.text.strip_prefix('$') {
            (Some(NodeType::Root), rest, raw.offset + 1)
        } else if let Some(rest) = raw.text.strip_prefix('@') {
            (Some(NodeType::Current), rest, raw.offset + 1)
        } else {
            (None, raw.text, raw.offset)
        };

        match node_type {
            Some(NodeType::Root | NodeType::Current) if !first => {
                return Err(self.error(
                    format!("'{}' may only start a path", raw.text.get(..1).unwrap_or("")),
                    raw.offset,
                ));
            }
            _ => {}
        }

        let parts = lexer::split_node(rest, rest_offset, self.source)?;

        let wildcard = parts.name == "*";
        let name = if parts.name.is_empty() || wildcard {
            None
        } else {
            if let Some(node_type @ (NodeType::Root | NodeType::Current)) = node_type {
                return Err(self.error(
                    format!(
                        "the node with type '{node_type}' cannot have an explicit name: `{}`",
                        parts.name
                    ),
                    parts.name_offset,
                ));
            }
            Some(lexer::unescape_name(parts.name))
        };
        if wildcard && let Some(node_type @ (NodeType::Root | NodeType::Current)) = node_type {
            return Err(self.error(
                format!("the node with type '{node_type}' cannot have an explicit name: `*`"),
                parts.name_offset,
            ));
        }

        if node_type.is_none() && name.is_none() && !wildcard && parts.segments.is_empty() {
            return Err(self.error("expected a name or a bracket segment", raw.offset));
        }

        let segments = parts
            .segments
            .into_iter()
            .map(|(inner, offset)| self.parse_segment(inner, offset, depth))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(if wildcard {
            Node::wildcard(node_type, segments)
        } else {
            Node::new(node_type, name, segments)
        })
    }

    /// Classify and parse the text between `[` and `]`
    fn parse_segment(
        &self,
        inner: &'s str,
        offset: usize,
        depth: usize,
    ) -> Result<Segment, SyntaxError> {
        let body = inner.trim();
        let offset = offset + (inner.len() - inner.trim_start().len());

        if body.is_empty() {
            return Err(self.error("empty selector", offset));
        }

        if body == "*" {
            return Ok(Segment::new(vec![Selector::Wildcard]));
        }

        if let Some(expr) = body.strip_prefix('?') {
            let filter = self.parse_filter(expr, offset + 1, depth + 1)?;
            return Ok(Segment::new(vec![Selector::Filter(Box::new(filter))]));
        }

        if body.starts_with('\'') || body.starts_with('"') {
            return self.parse_names(body, offset);
        }

        let parts = lexer::split_top_level(body, offset, self.source, ':')?;
        if parts.len() > 1 {
            return self.parse_slice(&parts, offset);
        }

        if INDEX_LIST.as_ref().is_some_and(|re| re.is_match(body)) {
            return self.parse_indexes(body, offset);
        }

        Err(self.error(format!("unsupported selector: `{body}`"), offset))
    }

    fn parse_names(&self, body: &'s str, offset: usize) -> Result<Segment, SyntaxError> {
        let selectors = lexer::split_top_level(body, offset, self.source, ',')?
            .into_iter()
            .map(|(part, part_offset)| {
                let trimmed = part.trim();
                let part_offset = part_offset + (part.len() - part.trim_start().len());
                if trimmed.is_empty() {
                    return Err(self.error("empty name in name list", part_offset));
                }
                lexer::unquote(trimmed, part_offset, self.source).map(Selector::Name)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Segment::new(selectors))
    }

    fn parse_indexes(&self, body: &'s str, offset: usize) -> Result<Segment, SyntaxError> {
        let selectors = lexer::split_top_level(body, offset, self.source, ',')?
            .into_iter()
            .map(|(part, part_offset)| {
                part.trim()
                    .parse::<i64>()
                    .map(Selector::Index)
                    .map_err(|_| {
                        self.error(format!("invalid index: `{}`", part.trim()), part_offset)
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Segment::new(selectors))
    }

    fn parse_slice(
        &self,
        parts: &[(&'s str, usize)],
        offset: usize,
    ) -> Result<Segment, SyntaxError> {
        if parts.len() > 3 {
            return Err(self.error(
                "array slicing selector takes at most 3 parts (start:end:step)",
                offset,
            ));
        }

        let mut bounds = [None; 3];
        for (i, ((part, part_offset), label)) in
            parts.iter().zip(["start", "end", "step"]).enumerate()
        {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let value = part.parse::<i64>().map_err(|_| {
                self.error(
                    format!("invalid array slicing's {label} value: `{part}`"),
                    *part_offset,
                )
            })?;
            bounds[i] = Some(value);
        }

        if bounds[2] == Some(0) {
            return Err(self.error("array slicing's step cannot be zero", parts[2].1));
        }

        let [start, end, step] = bounds;
        Ok(Segment::new(vec![Selector::Slice(Slicing { start, end, step })]))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ast::{ComparisonOp, Filter, Literal};

    fn parse(path: &str) -> JsonPath {
        Compiler::new().compile(path).unwrap()
    }

    fn parse_err(path: &str) -> SyntaxError {
        Compiler::new().compile(path).unwrap_err()
    }

    fn selectors(path: &JsonPath, node: usize) -> &[Selector] {
        path.nodes()[node].segments()[0].selectors()
    }

    #[test]
    fn test_index_pattern_compiles() {
        assert!(INDEX_LIST.is_some());
    }

    #[test]
    fn test_parse_root_only() {
        let path = parse("$");
        assert_eq!(path.nodes().len(), 1);
        assert!(path.nodes()[0].is_root());
        assert!(path.nodes()[0].segments().is_empty());
    }

    #[test]
    fn test_parse_dotted_names() {
        let path = parse("$.store.book");
        assert_eq!(path.nodes().len(), 3);
        assert_eq!(path.nodes()[1].name(), Some("store"));
        assert_eq!(path.nodes()[2].name(), Some("book"));
        assert_eq!(path.nodes()[2].node_type(), None);
    }

    #[test]
    fn test_parse_root_with_segment() {
        let path = parse("$['foo']");
        assert_eq!(path.nodes().len(), 1);
        assert_eq!(selectors(&path, 0), &[Selector::Name("foo".to_string())]);
    }

    #[test]
    fn test_parse_index_list() {
        let path = parse("$.a[0, 2,5]");
        let segment = &path.nodes()[1].segments()[0];
        assert!(segment.is_repeatable());
        assert_eq!(
            segment.selectors(),
            &[Selector::Index(0), Selector::Index(2), Selector::Index(5)]
        );
    }

    #[test]
    fn test_parse_negative_index() {
        let path = parse("$.a[-1]");
        assert_eq!(selectors(&path, 1), &[Selector::Index(-1)]);
    }

    #[test]
    fn test_parse_name_list_with_escapes() {
        let path = parse(r#"$['a', "b", 'it\'s', 'x.y']"#);
        assert_eq!(
            selectors(&path, 0),
            &[
                Selector::Name("a".to_string()),
                Selector::Name("b".to_string()),
                Selector::Name("it's".to_string()),
                Selector::Name("x.y".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_wildcards() {
        let path = parse("$.a[*]");
        assert_eq!(selectors(&path, 1), &[Selector::Wildcard]);
        let path = parse("$.*");
        assert!(path.nodes()[1].is_wildcard());
        assert_eq!(path.nodes()[1].name(), None);
        let path = parse("$..*");
        assert!(path.nodes()[1].is_deep_scan() && path.nodes()[1].is_wildcard());
    }

    #[test]
    fn test_parse_escaped_star_is_a_name() {
        let path = parse(r"$.\*");
        assert!(!path.nodes()[1].is_wildcard());
        assert_eq!(path.nodes()[1].name(), Some("*"));
        assert_eq!(path.to_canonical_string(), r"$.\*");
        assert_eq!(parse(&path.to_canonical_string()), path);
        assert_ne!(path, parse("$.*"));
    }

    #[test]
    fn test_parse_deep_scan() {
        let path = parse("$..author");
        assert!(path.nodes()[1].is_deep_scan());
        assert_eq!(path.nodes()[1].name(), Some("author"));

        let path = parse("$..[0]");
        assert!(path.nodes()[1].is_deep_scan());
        assert_eq!(path.nodes()[1].name(), None);
        assert_eq!(selectors(&path, 1), &[Selector::Index(0)]);
    }

    #[test]
    fn test_parse_slices() {
        let slice = |path: &str| match &selectors(&parse(path), 1)[0] {
            Selector::Slice(s) => *s,
            other => panic!("expected slice, got {other:?}"),
        };
        assert_eq!(
            slice("$.a[1:3]"),
            Slicing {
                start: Some(1),
                end: Some(3),
                step: None
            }
        );
        assert_eq!(
            slice("$.a[::-1]"),
            Slicing {
                start: None,
                end: None,
                step: Some(-1)
            }
        );
        assert_eq!(
            slice("$.a[0:]"),
            Slicing {
                start: Some(0),
                end: None,
                step: None
            }
        );
    }

    #[test]
    fn test_parse_slice_errors_name_the_part() {
        assert_eq!(
            parse_err("$.a[x:2]").message,
            "invalid array slicing's start value: `x`"
        );
        assert_eq!(
            parse_err("$.a[1:y]").message,
            "invalid array slicing's end value: `y`"
        );
        assert_eq!(
            parse_err("$.a[1:2:z]").message,
            "invalid array slicing's step value: `z`"
        );
        assert_eq!(
            parse_err("$.a[1:2:0]").message,
            "array slicing's step cannot be zero"
        );
        assert!(parse_err("$.a[1:2:3:4]").message.contains("at most 3 parts"));
    }

    #[test]
    fn test_parse_filter_segment() {
        let path = parse("$.book[?(@.price < 10)]");
        match &selectors(&path, 1)[0] {
            Selector::Filter(filter) => match filter.as_ref() {
                Filter::Comparison { op, secondary, .. } => {
                    assert_eq!(*op, ComparisonOp::Lt);
                    assert_eq!(
                        **secondary,
                        Filter::Literal(Literal::Number(10.into()))
                    );
                }
                other => panic!("expected comparison, got {other:?}"),
            },
            other => panic!("expected filter, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_multiple_segments() {
        let path = parse("$.node[?(@.name)][0][0:][::12]");
        assert_eq!(path.nodes()[1].segments().len(), 4);
    }

    #[test]
    fn test_parse_unterminated_bracket() {
        let err = parse_err("$.store.book[");
        assert_eq!(err.message, "unterminated bracket at index 12");
        assert_eq!(err.position, 12);
        assert_eq!(err.source_text, "$.store.book[");
    }

    #[test]
    fn test_parse_must_start_with_root() {
        assert_eq!(parse_err("store").message, "a path must start with '$'");
        assert_eq!(parse_err("@.a").message, "a path must start with '$'");
    }

    #[test]
    fn test_parse_marker_with_name() {
        let err = parse_err("$abc");
        assert!(err.message.contains("cannot have an explicit name"));
    }

    #[test]
    fn test_parse_marker_not_first() {
        assert_eq!(parse_err("$.a.$").message, "'$' may only start a path");
    }

    #[test]
    fn test_parse_unsupported_selector() {
        assert_eq!(parse_err("$.a[abc]").message, "unsupported selector: `abc`");
        assert_eq!(parse_err("$.a[]").message, "empty selector");
    }

    #[test]
    fn test_numeric_text_is_never_a_slice() {
        let path = parse("$.a[12]");
        assert_eq!(selectors(&path, 1), &[Selector::Index(12)]);
    }

    #[test]
    fn test_display_keeps_source() {
        let source = "$.store .book[ 0 ]";
        assert_eq!(parse(source).to_string(), source);
    }

    #[test]
    fn test_canonical_round_trip() {
        let sources = [
            "$",
            "$.store.book[0].title",
            "$['a b']['c','d']",
            "$..author",
            "$..[0,1]",
            "$.*[*]",
            "$.a[1:3][::-1][:2:2]",
            r"$.a\.b['it\'s']",
            "$.book[?(@.price < 10 && @.cat == 'a')]",
            "$.book[?((@.a > 1 && @.b < 2) || @.c == 3)]",
            "$.book[?(!@.isbn)]",
            "$.book[?(!(@.a == 1))]",
            "$.book[?(@.price * 2 + 1 >= $.limit)]",
            "$.book[?(@.items[?(@.x)])]",
            "$.a[?(@.v == -1.5 || @.w != null)]",
            "$..",
        ];
        for source in sources {
            let path = parse(source);
            let canonical = path.to_canonical_string();
            assert_eq!(parse(&canonical), path, "{source} -> {canonical}");
        }
    }

    #[test]
    fn test_structural_equality_ignores_spacing() {
        assert_eq!(parse("$.a[ 0 ]"), parse("$.a[0]"));
        assert_ne!(parse("$.a[0]"), parse("$.a[1]"));
    }

    #[test]
    fn test_complex_path() {
        let path = parse(
            "$['library']..books[?(@.pages > 100 && (@.edition == 'Second' && @.version == '1.0'))]\
             .authors[?(@.country == 'US')][0:3:1]..[?(@['name'] && @.age >= 30)]\
             ..details['bio','contact'].social[?(@.followers > 1000)]\
             ..posts[0:][::2]['id','title'][?(@.name)]",
        );
        assert_eq!(path.nodes().len(), 7);
    }
}
