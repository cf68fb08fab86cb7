//! Lexical scanning for path strings
//!
//! Every parse stage walks its input with the same [`Cursor`], which tracks
//! quoting, backslash escapes, bracket depth and (optionally) parenthesis
//! depth. The splitters in this module cut a path into node substrings, a
//! node into its bare name and bracket segments, and a segment body into
//! comma or colon separated parts.

use crate::error::SyntaxError;
use smallvec::SmallVec;
use std::str::CharIndices;

/// One character produced by [`Cursor::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scanned {
    /// Byte offset relative to the scanned text
    pub index: usize,
    pub ch: char,
    /// False for quoted content, quote delimiters, backslashes and the
    /// character a backslash escapes
    pub plain: bool,
}

/// Quote, escape and bracket aware character cursor
pub(crate) struct Cursor<'a> {
    chars: CharIndices<'a>,
    offset: usize,
    source: &'a str,
    quote: Option<(char, usize)>,
    escaped: bool,
    brackets: SmallVec<[usize; 8]>,
    parens: Option<SmallVec<[usize; 8]>>,
}

impl<'a> Cursor<'a> {
    /// Scan `text`, which starts `offset` bytes into `source`
    pub fn new(text: &'a str, offset: usize, source: &'a str) -> Self {
        Self {
            chars: text.char_indices(),
            offset,
            source,
            quote: None,
            escaped: false,
            brackets: SmallVec::new(),
            parens: None,
        }
    }

    /// Also track `(`/`)` nesting
    pub fn with_parens(mut self) -> Self {
        self.parens = Some(SmallVec::new());
        self
    }

    pub fn advance(&mut self) -> Result<Option<Scanned>, SyntaxError> {
        let Some((index, ch)) = self.chars.next() else {
            return Ok(None);
        };

        if self.escaped {
            self.escaped = false;
            return Ok(Some(Scanned {
                index,
                ch,
                plain: false,
            }));
        }

        if ch == '\\' {
            self.escaped = true;
            return Ok(Some(Scanned {
                index,
                ch,
                plain: false,
            }));
        }

        if let Some((quote, _)) = self.quote {
            if ch == quote {
                self.quote = None;
            }
            return Ok(Some(Scanned {
                index,
                ch,
                plain: false,
            }));
        }

        match ch {
            '\'' | '"' => {
                self.quote = Some((ch, index));
                return Ok(Some(Scanned {
                    index,
                    ch,
                    plain: false,
                }));
            }
            '[' => self.brackets.push(index),
            ']' => {
                if self.brackets.pop().is_none() {
                    return Err(self.error("unbalanced ']'", index));
                }
            }
            '(' => {
                if let Some(parens) = self.parens.as_mut() {
                    parens.push(index);
                }
            }
            ')' => {
                if let Some(parens) = self.parens.as_mut()
                    && parens.pop().is_none()
                {
                    return Err(self.error("unbalanced ')'", index));
                }
            }
            _ => {}
        }

        Ok(Some(Scanned {
            index,
            ch,
            plain: true,
        }))
    }

    /// The next raw character, without consuming it
    pub fn peek_char(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, ch)| ch)
    }

    pub fn bracket_depth(&self) -> usize {
        self.brackets.len()
    }

    pub fn paren_depth(&self) -> usize {
        self.parens.as_ref().map_or(0, SmallVec::len)
    }

    pub fn is_quoted(&self) -> bool {
        self.quote.is_some()
    }

    /// Outside quotes, brackets and parentheses
    pub fn at_top_level(&self) -> bool {
        !self.is_quoted() && self.bracket_depth() == 0 && self.paren_depth() == 0
    }

    /// Report anything left open at end of input
    pub fn finish(self) -> Result<(), SyntaxError> {
        if let Some((_, index)) = self.quote {
            return Err(self.error("unterminated quote", index));
        }
        if self.escaped {
            let end = self.chars.offset().saturating_sub(1);
            return Err(self.error("dangling escape", end));
        }
        if let Some(&first) = self.brackets.first() {
            let positions: Vec<String> = self
                .brackets
                .iter()
                .map(|i| (i + self.offset).to_string())
                .collect();
            let noun = if positions.len() == 1 {
                "index"
            } else {
                "indexes"
            };
            return Err(self.error(
                format!("unterminated bracket at {noun} {}", positions.join(", ")),
                first,
            ));
        }
        if let Some(parens) = &self.parens
            && let Some(&first) = parens.first()
        {
            return Err(self.error("unclosed '('", first));
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>, index: usize) -> SyntaxError {
        SyntaxError::new(message, self.offset + index, self.source)
    }
}

/// A node substring cut out of a path by [`split_nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawNode<'a> {
    pub text: &'a str,
    /// Absolute byte offset of `text` in the source
    pub offset: usize,
    /// Preceded by `..`
    pub deep: bool,
}

/// Split a path into node substrings at top-level `.` and `..`
///
/// The first node is whatever precedes the first separator (normally `$` or
/// `@`). Node text is trimmed of surrounding whitespace.
pub(crate) fn split_nodes<'a>(
    text: &'a str,
    offset: usize,
    source: &'a str,
) -> Result<Vec<RawNode<'a>>, SyntaxError> {
    let mut cursor = Cursor::new(text, offset, source);
    let mut nodes = Vec::new();
    let mut start = 0;
    let mut deep = false;

    while let Some(scanned) = cursor.advance()? {
        if !(scanned.plain && scanned.ch == '.' && cursor.bracket_depth() == 0) {
            continue;
        }
        nodes.push(raw_node(text, offset, start, scanned.index, deep));

        if cursor.peek_char() == Some('.') {
            cursor.advance()?;
            deep = true;
            start = scanned.index + 2;
        } else {
            deep = false;
            start = scanned.index + 1;
        }
    }
    cursor.finish()?;
    nodes.push(raw_node(text, offset, start, text.len(), deep));

    let last = nodes.len() - 1;
    for (i, node) in nodes.iter().enumerate() {
        // A bare `..` may only end the path
        if node.text.is_empty() && (!node.deep || i != last) {
            return Err(SyntaxError::new("empty node", node.offset, source));
        }
    }

    Ok(nodes)
}

fn raw_node(text: &str, offset: usize, start: usize, end: usize, deep: bool) -> RawNode<'_> {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    RawNode {
        text: slice.trim(),
        offset: offset + start + leading,
        deep,
    }
}

/// A node split into its bare name and the bodies of its bracket segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeParts<'a> {
    pub name: &'a str,
    pub name_offset: usize,
    /// Text between each `[` and its matching `]`, with absolute offsets
    pub segments: Vec<(&'a str, usize)>,
}

/// Split node text (without its type marker) at the first unescaped `[`
pub(crate) fn split_node<'a>(
    text: &'a str,
    offset: usize,
    source: &'a str,
) -> Result<NodeParts<'a>, SyntaxError> {
    let mut cursor = Cursor::new(text, offset, source);
    let mut name_end = None;
    let mut segment_start = 0;
    let mut segments = Vec::new();

    while let Some(scanned) = cursor.advance()? {
        if name_end.is_none() {
            if scanned.plain && scanned.ch == '[' {
                name_end = Some(scanned.index);
                segment_start = scanned.index;
            }
            continue;
        }

        let depth = cursor.bracket_depth();
        if scanned.plain && scanned.ch == '[' && depth == 1 {
            segment_start = scanned.index;
        } else if scanned.plain && scanned.ch == ']' && depth == 0 {
            let inner = &text[segment_start + 1..scanned.index];
            segments.push((inner, offset + segment_start + 1));
        } else if depth == 0 && !scanned.ch.is_whitespace() {
            return Err(SyntaxError::new(
                format!("unexpected '{}' between segments", scanned.ch),
                offset + scanned.index,
                source,
            ));
        }
    }
    cursor.finish()?;

    let name = &text[..name_end.unwrap_or(text.len())];
    Ok(NodeParts {
        name: name.trim_end(),
        name_offset: offset,
        segments,
    })
}

/// Split `text` at every top-level occurrence of `separator`
pub(crate) fn split_top_level<'a>(
    text: &'a str,
    offset: usize,
    source: &'a str,
    separator: char,
) -> Result<Vec<(&'a str, usize)>, SyntaxError> {
    let mut cursor = Cursor::new(text, offset, source).with_parens();
    let mut parts = Vec::new();
    let mut start = 0;

    while let Some(scanned) = cursor.advance()? {
        if scanned.plain && scanned.ch == separator && cursor.at_top_level() {
            parts.push((&text[start..scanned.index], offset + start));
            start = scanned.index + scanned.ch.len_utf8();
        }
    }
    cursor.finish()?;
    parts.push((&text[start..], offset + start));

    Ok(parts)
}

/// Byte index of the `)` matching a leading `(`
pub(crate) fn closing_paren(
    text: &str,
    offset: usize,
    source: &str,
) -> Result<Option<usize>, SyntaxError> {
    if !text.starts_with('(') {
        return Ok(None);
    }
    let mut cursor = Cursor::new(text, offset, source).with_parens();
    while let Some(scanned) = cursor.advance()? {
        if scanned.plain && scanned.ch == ')' && cursor.paren_depth() == 0 {
            return Ok(Some(scanned.index));
        }
    }
    cursor.finish()?;
    Ok(None)
}

/// Remove backslash escapes from a bare name
pub(crate) fn unescape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Decode a single- or double-quoted string literal
///
/// `text` must be exactly one quoted string; anything after the closing
/// quote is an error.
pub(crate) fn unquote(text: &str, offset: usize, source: &str) -> Result<String, SyntaxError> {
    let err = |message: String, index: usize| SyntaxError::new(message, offset + index, source);

    let mut chars = text.char_indices().peekable();
    let quote = match chars.next() {
        Some((_, ch @ ('\'' | '"'))) => ch,
        _ => return Err(err("expected a quoted string".to_string(), 0)),
    };

    let mut value = String::new();
    loop {
        match chars.next() {
            Some((_, ch)) if ch == quote => {
                if let Some((rest, _)) = chars.peek() {
                    return Err(err(
                        format!("unexpected text after quoted string: `{}`", &text[*rest..]),
                        *rest,
                    ));
                }
                return Ok(value);
            }
            Some((index, '\\')) => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(err("unterminated escape sequence".to_string(), index));
                };
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\x08'),
                    'f' => value.push('\x0C'),
                    '\\' | '\'' | '"' | '/' => value.push(escaped),
                    'u' => {
                        let code = read_unicode_escape(&mut chars)
                            .ok_or_else(|| err("invalid unicode escape".to_string(), index))?;
                        let ch = if (0xD800..=0xDBFF).contains(&code) {
                            // High surrogate, a low one must follow
                            let low = match (chars.next(), chars.next()) {
                                (Some((_, '\\')), Some((_, 'u'))) => {
                                    read_unicode_escape(&mut chars)
                                }
                                _ => None,
                            }
                            .filter(|low| (0xDC00..=0xDFFF).contains(low))
                            .ok_or_else(|| err("invalid surrogate pair".to_string(), index))?;
                            char::from_u32(0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00))
                        } else {
                            char::from_u32(code)
                        };
                        value.push(ch.ok_or_else(|| {
                            err("invalid unicode code point".to_string(), index)
                        })?);
                    }
                    other => {
                        return Err(err(format!("invalid escape sequence: \\{other}"), index));
                    }
                }
            }
            Some((index, ch)) if (ch as u32) <= 0x1F => {
                return Err(err(
                    format!("unescaped control character U+{:04X}", ch as u32),
                    index,
                ));
            }
            Some((_, ch)) => value.push(ch),
            None => return Err(err("unterminated string".to_string(), 0)),
        }
    }
}

fn read_unicode_escape(chars: &mut std::iter::Peekable<CharIndices<'_>>) -> Option<u32> {
    let mut code = 0;
    for _ in 0..4 {
        let (_, ch) = chars.next()?;
        code = code * 16 + ch.to_digit(16)?;
    }
    Some(code)
}
