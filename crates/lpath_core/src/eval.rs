//! Evaluation of compiled paths against documents

use crate::ast::{
    ArithmeticOp, ComparisonOp, Filter, JsonPath, Literal, LogicalOp, Node, NodeType, Segment,
    Selector, Slicing,
};
use crate::document::{Document, Kind};
use crate::error::Error;
use crate::options::Options;
use log::{debug, trace};
use serde_json::Number;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::{self, Write as _};

/// One step of a [`Location`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    Key(String),
    Index(usize),
}

/// Normalized path from the document root to a matched value
///
/// Locations order lexicographically, so sorting in descending order puts
/// descendants before their ancestors and later array elements before
/// earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(SmallVec<[PathElement; 8]>);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn child(&self, element: PathElement) -> Self {
        let mut location = self.clone();
        location.0.push(element);
        location
    }

    fn ends_with_key(&self, name: &str) -> bool {
        matches!(self.0.last(), Some(PathElement::Key(key)) if key == name)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('$')?;
        for element in &self.0 {
            match element {
                PathElement::Key(key) => {
                    f.write_str("['")?;
                    for ch in key.chars() {
                        if matches!(ch, '\'' | '\\') {
                            f.write_char('\\')?;
                        }
                        f.write_char(ch)?;
                    }
                    f.write_str("']")?;
                }
                PathElement::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A matched value and where it was found
#[derive(Debug)]
pub struct Match<'d, D> {
    pub location: Location,
    pub value: &'d D,
}

impl<D> Clone for Match<'_, D> {
    fn clone(&self) -> Self {
        Self {
            location: self.location.clone(),
            value: self.value,
        }
    }
}

/// A primitive operand of a comparison or arithmetic expression
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar<'a> {
    Null,
    Bool(bool),
    Number(Numeric),
    String(&'a str),
}

/// Integers stay exact; anything else is compared as f64
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Integer(i128),
    Float(f64),
}

impl Numeric {
    fn from_number(n: &Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            Some(Self::Integer(i.into()))
        } else if let Some(u) = n.as_u64() {
            Some(Self::Integer(u.into()))
        } else {
            n.as_f64().map(Self::Float)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operand<'a> {
    /// Resolved to nothing, or to more than one value
    Missing,
    Scalar(Scalar<'a>),
}

/// How a plain-name step treats a value that is not an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Names {
    /// Type mismatch error
    Strict,
    /// No match, as inside filter expressions
    Lenient,
}

/// Final step of a path `set` may create when nothing matches
#[derive(Debug, Clone, Copy)]
enum NewEntry<'p> {
    Key(&'p str),
    Index(i64),
}

impl fmt::Display for NewEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewEntry::Key(key) => write!(f, "key '{key}'"),
            NewEntry::Index(index) => write!(f, "index {index}"),
        }
    }
}

/// Applies compiled paths to documents
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    options: Options,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Every match, in document order per step
    pub fn query<'d, D: Document>(
        &self,
        path: &JsonPath,
        doc: &'d D,
    ) -> Result<Vec<Match<'d, D>>, Error> {
        let start = Match {
            location: Location::root(),
            value: doc,
        };
        self.resolve(path, &start, doc, Names::Strict)
    }

    /// The matched values; [`Error::NotFound`] when there are none
    pub fn get<'d, D: Document>(&self, path: &JsonPath, doc: &'d D) -> Result<Vec<&'d D>, Error> {
        let matches = self.query(path, doc)?;
        if matches.is_empty() {
            return Err(Error::not_found(path.source()));
        }
        Ok(matches.into_iter().map(|m| m.value).collect())
    }

    pub fn contains<D: Document>(&self, path: &JsonPath, doc: &D) -> Result<bool, Error> {
        Ok(!self.query(path, doc)?.is_empty())
    }

    /// Replace every match with a value from `value`
    ///
    /// With no match, the final step is created when it is a single name or
    /// index and its parents resolve. Returns the number of values written.
    /// On error the document is left unmodified.
    pub fn set<D: Document, F: FnMut() -> D>(
        &self,
        path: &JsonPath,
        doc: &mut D,
        mut value: F,
    ) -> Result<usize, Error> {
        let locations = self.locations(path, doc)?;
        if locations.is_empty() {
            return self.create(path, doc, value);
        }

        for location in &locations {
            let Some((last, parent)) = location.elements().split_last() else {
                *doc = value();
                continue;
            };
            let written = locate_mut(doc, parent).is_some_and(|parent| match last {
                PathElement::Key(key) => parent.set_key(key, value()),
                PathElement::Index(index) => parent.set_index(*index, value()),
            });
            if !written {
                return Err(Error::evaluation(format!("{location} no longer exists")));
            }
        }
        debug!("replaced {} value(s) at `{path}`", locations.len());
        Ok(locations.len())
    }

    /// Delete every match; returns the number of entries removed
    pub fn remove<D: Document>(&self, path: &JsonPath, doc: &mut D) -> Result<usize, Error> {
        let locations = self.locations(path, doc)?;
        if locations.iter().any(Location::is_root) {
            return Err(Error::evaluation("cannot remove the document root"));
        }

        let mut removed = 0;
        for location in &locations {
            let Some((last, parent)) = location.elements().split_last() else {
                continue;
            };
            let Some(parent) = locate_mut(doc, parent) else {
                continue;
            };
            let done = match last {
                PathElement::Key(key) => parent.remove_key(key).is_some(),
                PathElement::Index(index) => parent.remove_index(*index).is_some(),
            };
            if done {
                removed += 1;
            }
        }
        debug!("removed {removed} value(s) at `{path}`");
        Ok(removed)
    }

    /// Distinct match locations, deepest and last first
    fn locations<D: Document>(&self, path: &JsonPath, doc: &D) -> Result<Vec<Location>, Error> {
        let mut locations: Vec<Location> = self
            .query(path, doc)?
            .into_iter()
            .map(|m| m.location)
            .collect();
        locations.sort_unstable_by(|a, b| b.cmp(a));
        locations.dedup();
        Ok(locations)
    }

    fn create<D: Document, F: FnMut() -> D>(
        &self,
        path: &JsonPath,
        doc: &mut D,
        mut value: F,
    ) -> Result<usize, Error> {
        let Some((parent_path, entry)) = creation_target(path) else {
            return Err(Error::not_found(path.source()));
        };

        let parents = self.query(&parent_path, &*doc)?;
        if parents.is_empty() {
            return Err(Error::not_found(path.source()));
        }

        let mut targets = Vec::with_capacity(parents.len());
        for parent in parents {
            let kind = parent.value.kind();
            let creatable = match (entry, kind) {
                (NewEntry::Key(_), Kind::Object) => true,
                (NewEntry::Index(index), Kind::Array) => usize::try_from(index)
                    .is_ok_and(|index| index >= parent.value.array_len().unwrap_or(0)),
                _ => false,
            };
            if !creatable {
                return Err(Error::evaluation(format!(
                    "cannot create {entry} in the {kind} at {}",
                    parent.location
                )));
            }
            targets.push(parent.location);
        }
        targets.sort_unstable_by(|a, b| b.cmp(a));
        targets.dedup();

        for location in &targets {
            let parent = locate_mut(doc, location.elements())
                .ok_or_else(|| Error::evaluation(format!("{location} no longer exists")))?;
            let created = match entry {
                NewEntry::Key(key) => parent.set_key(key, value()),
                NewEntry::Index(_) => parent.append(value()),
            };
            if !created {
                return Err(Error::evaluation(format!("cannot create {entry} at {location}")));
            }
        }
        debug!("created {} value(s) for `{path}`", targets.len());
        Ok(targets.len())
    }

    /// Walk `path` with `$` bound to `root` and `@` bound to `current`
    fn resolve<'d, D: Document>(
        &self,
        path: &JsonPath,
        current: &Match<'d, D>,
        root: &'d D,
        names: Names,
    ) -> Result<Vec<Match<'d, D>>, Error> {
        let mut matches = Vec::new();
        for (i, node) in path.nodes().iter().enumerate() {
            matches = if i == 0 {
                let start = if node.is_root() {
                    Match {
                        location: Location::root(),
                        value: root,
                    }
                } else {
                    current.clone()
                };
                self.apply_segments(node.segments(), vec![start], root)?
            } else {
                self.apply_node(node, matches, root, names)?
            };
            trace!("`{node}` matched {} value(s)", matches.len());
            if matches.is_empty() {
                break;
            }
        }
        Ok(matches)
    }

    fn apply_node<'d, D: Document>(
        &self,
        node: &Node,
        inputs: Vec<Match<'d, D>>,
        root: &'d D,
        names: Names,
    ) -> Result<Vec<Match<'d, D>>, Error> {
        let stepped = match (node.node_type(), node.name()) {
            (Some(NodeType::Root), _) => vec![Match {
                location: Location::root(),
                value: root,
            }],
            (Some(NodeType::Current), _) => inputs,
            // Emitted as visited, so a nested match under an earlier sibling
            // comes before a later sibling's own key
            (Some(NodeType::DeepScan), Some(name)) => {
                let mut out = Vec::new();
                for input in &inputs {
                    out.extend(
                        self.descendants(input, false)?
                            .into_iter()
                            .filter(|visited| visited.location.ends_with_key(name)),
                    );
                }
                out
            }
            (Some(NodeType::DeepScan), None)
                if !node.is_wildcard() && !node.segments().is_empty() =>
            {
                let mut out = Vec::new();
                for input in &inputs {
                    out.extend(self.descendants(input, true)?);
                }
                out
            }
            // Bare `..` and `..*`
            (Some(NodeType::DeepScan), _) => {
                let mut out = Vec::new();
                for input in &inputs {
                    out.extend(self.descendants(input, false)?);
                }
                out
            }
            (None, None) if node.is_wildcard() => inputs.iter().flat_map(children).collect(),
            (None, Some(name)) => {
                let mut out = Vec::with_capacity(inputs.len());
                for input in &inputs {
                    let kind = input.value.kind();
                    if kind != Kind::Object {
                        if names == Names::Strict {
                            return Err(Error::evaluation(format!(
                                "cannot select '{name}' from the {kind} at {}",
                                input.location
                            )));
                        }
                        continue;
                    }
                    out.extend(child_by_key(input, name));
                }
                out
            }
            (None, None) => inputs,
        };
        self.apply_segments(node.segments(), stepped, root)
    }

    fn apply_segments<'d, D: Document>(
        &self,
        segments: &[Segment],
        inputs: Vec<Match<'d, D>>,
        root: &'d D,
    ) -> Result<Vec<Match<'d, D>>, Error> {
        let mut current = inputs;
        for segment in segments {
            let mut out = Vec::new();
            for input in &current {
                for selector in segment.selectors() {
                    self.select(selector, input, root, &mut out)?;
                }
            }
            current = out;
        }
        Ok(current)
    }

    fn select<'d, D: Document>(
        &self,
        selector: &Selector,
        input: &Match<'d, D>,
        root: &'d D,
        out: &mut Vec<Match<'d, D>>,
    ) -> Result<(), Error> {
        match selector {
            Selector::Wildcard => out.extend(children(input)),
            Selector::Name(name) => out.extend(child_by_key(input, name)),
            Selector::Index(index) => {
                if let Some(len) = input.value.array_len()
                    && let Some(i) = normalize_index(*index, len)
                {
                    out.extend(child_at(input, i));
                }
            }
            Selector::Slice(slicing) => {
                if let Some(len) = input.value.array_len() {
                    for i in slice_indices(len, slicing) {
                        out.extend(child_at(input, i));
                    }
                }
            }
            Selector::Filter(filter) => {
                for child in children(input) {
                    if self.predicate(filter, &child, root)? {
                        out.push(child);
                    }
                }
            }
        }
        Ok(())
    }

    /// Pre-order traversal below `input`, optionally including it
    fn descendants<'d, D: Document>(
        &self,
        input: &Match<'d, D>,
        include_self: bool,
    ) -> Result<Vec<Match<'d, D>>, Error> {
        let mut out = Vec::new();
        let mut stack = vec![(input.clone(), 0usize)];

        while let Some((current, depth)) = stack.pop() {
            if depth > self.options.max_depth {
                return Err(Error::evaluation(format!(
                    "document nesting exceeds maximum depth of {} at {}",
                    self.options.max_depth, current.location
                )));
            }
            // Push in reverse order to maintain traversal order
            stack.extend(children(&current).into_iter().rev().map(|c| (c, depth + 1)));
            if include_self || depth > 0 {
                out.push(current);
            }
        }
        Ok(out)
    }

    fn predicate<'d, D: Document>(
        &self,
        filter: &Filter,
        current: &Match<'d, D>,
        root: &'d D,
    ) -> Result<bool, Error> {
        match filter {
            Filter::Existence { path, inverted } => {
                Ok(self.resolve(path, current, root, Names::Lenient)?.is_empty() == *inverted)
            }
            Filter::NodeRef(path) => {
                Ok(!self.resolve(path, current, root, Names::Lenient)?.is_empty())
            }
            Filter::Not(inner) => Ok(!self.predicate(inner, current, root)?),
            Filter::Logical {
                primary,
                op,
                secondary,
            } => {
                let first = self.predicate(primary, current, root)?;
                Ok(match op {
                    LogicalOp::And => first && self.predicate(secondary, current, root)?,
                    LogicalOp::Or => first || self.predicate(secondary, current, root)?,
                })
            }
            Filter::Comparison {
                primary,
                op,
                secondary,
            } => {
                let left = self.operand(primary, current, root)?;
                let right = self.operand(secondary, current, root)?;
                Ok(compare(left, *op, right))
            }
            Filter::Literal(Literal::Bool(b)) => Ok(*b),
            Filter::Literal(literal) => Err(Error::evaluation(format!(
                "literal `{literal}` is not a boolean"
            ))),
            Filter::Arithmetic { .. } => Err(Error::evaluation(format!(
                "`{filter}` is not a boolean expression"
            ))),
        }
    }

    fn operand<'a, D: Document>(
        &self,
        filter: &'a Filter,
        current: &Match<'a, D>,
        root: &'a D,
    ) -> Result<Operand<'a>, Error> {
        match filter {
            Filter::Literal(literal) => literal_scalar(literal).map(Operand::Scalar),
            Filter::NodeRef(path) => {
                match self.resolve(path, current, root, Names::Lenient)?.as_slice() {
                    [single] => document_scalar(single.value, path).map(Operand::Scalar),
                    _ => Ok(Operand::Missing),
                }
            }
            Filter::Arithmetic {
                primary,
                op,
                secondary,
            } => {
                let left = self.operand(primary, current, root)?;
                let right = self.operand(secondary, current, root)?;
                match (left, right) {
                    (Operand::Scalar(l), Operand::Scalar(r)) => {
                        arithmetic(l, *op, r).map(|n| Operand::Scalar(Scalar::Number(n)))
                    }
                    _ => Ok(Operand::Missing),
                }
            }
            Filter::Existence { .. }
            | Filter::Not(_)
            | Filter::Comparison { .. }
            | Filter::Logical { .. } => Err(Error::evaluation(format!(
                "`{filter}` cannot be used as a value"
            ))),
        }
    }
}

/// Where `set` would create a value: the parent path and the new entry
fn creation_target(path: &JsonPath) -> Option<(JsonPath, NewEntry<'_>)> {
    let (last, prefix) = path.nodes().split_last()?;
    if last.is_deep_scan() {
        return None;
    }

    if let Some(segment) = last.segments().last() {
        let entry = match segment.selectors() {
            [Selector::Name(name)] => NewEntry::Key(name),
            [Selector::Index(index)] => NewEntry::Index(*index),
            _ => return None,
        };
        let mut nodes = prefix.to_vec();
        nodes.push(last.without_last_segment());
        return Some((JsonPath::new(nodes, path.source()), entry));
    }

    match (last.node_type(), last.name()) {
        (None, Some(name)) if !prefix.is_empty() => Some((
            JsonPath::new(prefix.to_vec(), path.source()),
            NewEntry::Key(name),
        )),
        _ => None,
    }
}

fn locate_mut<'d, D: Document>(doc: &'d mut D, elements: &[PathElement]) -> Option<&'d mut D> {
    let mut node = doc;
    for element in elements {
        node = match element {
            PathElement::Key(key) => node.get_key_mut(key)?,
            PathElement::Index(index) => node.get_index_mut(*index)?,
        };
    }
    Some(node)
}

fn children<'d, D: Document>(input: &Match<'d, D>) -> Vec<Match<'d, D>> {
    match input.value.kind() {
        Kind::Object => input
            .value
            .keys()
            .into_iter()
            .filter_map(|key| child_by_key(input, key))
            .collect(),
        Kind::Array => (0..input.value.array_len().unwrap_or(0))
            .filter_map(|i| child_at(input, i))
            .collect(),
        Kind::Primitive | Kind::Null => Vec::new(),
    }
}

fn child_by_key<'d, D: Document>(input: &Match<'d, D>, key: &str) -> Option<Match<'d, D>> {
    input.value.get_key(key).map(|value| Match {
        location: input.location.child(PathElement::Key(key.to_string())),
        value,
    })
}

fn child_at<'d, D: Document>(input: &Match<'d, D>, index: usize) -> Option<Match<'d, D>> {
    input.value.get_index(index).map(|value| Match {
        location: input.location.child(PathElement::Index(index)),
        value,
    })
}

fn literal_scalar(literal: &Literal) -> Result<Scalar<'_>, Error> {
    Ok(match literal {
        Literal::Null => Scalar::Null,
        Literal::Bool(b) => Scalar::Bool(*b),
        Literal::Number(n) => Scalar::Number(
            Numeric::from_number(n)
                .ok_or_else(|| Error::evaluation(format!("number `{n}` is out of range")))?,
        ),
        Literal::String(s) => Scalar::String(s),
    })
}

fn document_scalar<'a, D: Document>(value: &'a D, path: &JsonPath) -> Result<Scalar<'a>, Error> {
    match value.kind() {
        Kind::Null => Ok(Scalar::Null),
        Kind::Object | Kind::Array => Err(Error::evaluation(format!(
            "`{path}` resolves to an {}, which cannot be compared",
            value.kind()
        ))),
        Kind::Primitive => {
            if let Some(b) = value.coerce_bool() {
                Ok(Scalar::Bool(b))
            } else if let Some(n) = value.coerce_number().as_ref().and_then(Numeric::from_number) {
                Ok(Scalar::Number(n))
            } else if let Some(s) = value.coerce_string() {
                Ok(Scalar::String(s))
            } else {
                Err(Error::evaluation(format!(
                    "`{path}` resolves to an unsupported primitive"
                )))
            }
        }
    }
}

/// Missing operands never compare; ordering is defined for numbers only
fn compare(left: Operand<'_>, op: ComparisonOp, right: Operand<'_>) -> bool {
    let (Operand::Scalar(l), Operand::Scalar(r)) = (left, right) else {
        return false;
    };
    match op {
        ComparisonOp::Eq => l == r,
        ComparisonOp::Ne => l != r,
        ComparisonOp::Lt | ComparisonOp::Le | ComparisonOp::Gt | ComparisonOp::Ge => {
            let (Scalar::Number(a), Scalar::Number(b)) = (l, r) else {
                return false;
            };
            match op {
                ComparisonOp::Lt => a < b,
                ComparisonOp::Le => a <= b,
                ComparisonOp::Gt => a > b,
                _ => a >= b,
            }
        }
    }
}

fn arithmetic(left: Scalar<'_>, op: ArithmeticOp, right: Scalar<'_>) -> Result<Numeric, Error> {
    let (Scalar::Number(a), Scalar::Number(b)) = (left, right) else {
        return Err(Error::evaluation(format!(
            "operator '{op}' requires numeric operands"
        )));
    };
    if matches!(op, ArithmeticOp::Divide | ArithmeticOp::Modulo) && b.as_f64() == 0.0 {
        return Err(Error::evaluation(format!(
            "operator '{op}' with a zero divisor"
        )));
    }

    if let (Numeric::Integer(x), Numeric::Integer(y)) = (a, b) {
        let exact = match op {
            ArithmeticOp::Add => x.checked_add(y),
            ArithmeticOp::Subtract => x.checked_sub(y),
            ArithmeticOp::Multiply => x.checked_mul(y),
            ArithmeticOp::Divide => x
                .checked_rem(y)
                .filter(|rem| *rem == 0)
                .and_then(|_| x.checked_div(y)),
            ArithmeticOp::Modulo => x.checked_rem(y),
        };
        if let Some(n) = exact {
            return Ok(Numeric::Integer(n));
        }
    }

    let (a, b) = (a.as_f64(), b.as_f64());
    Ok(Numeric::Float(match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Subtract => a - b,
        ArithmeticOp::Multiply => a * b,
        ArithmeticOp::Divide => a / b,
        ArithmeticOp::Modulo => a % b,
    }))
}

fn normalize_index(idx: i64, len: usize) -> Option<usize> {
    if idx >= 0 {
        let i = usize::try_from(idx).ok()?;
        if i < len { Some(i) } else { None }
    } else {
        let back = usize::try_from(idx.unsigned_abs()).ok()?;
        len.checked_sub(back)
    }
}

fn slice_indices(len: usize, slicing: &Slicing) -> Vec<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let step = slicing.step();

    if step == 0 {
        return vec![];
    }

    let (start, end) = if step > 0 {
        let start = slicing
            .start
            .map(|s| normalize_slice_bound(s, len))
            .unwrap_or(0);
        let end = slicing
            .end
            .map(|e| normalize_slice_bound(e, len))
            .unwrap_or(len);
        (start.max(0), end.min(len))
    } else {
        let start = slicing
            .start
            .map(|s| normalize_slice_bound(s, len))
            .unwrap_or(len - 1);
        // The end bound clamps to -1 (not 0) so index 0 can be included
        let end = slicing
            .end
            .map(|e| normalize_slice_bound_for_negative_step(e, len))
            .unwrap_or(-1);
        (start.min(len - 1), end.max(-1))
    };

    let mut indices = Vec::new();
    let mut i = start;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        if let Ok(index) = usize::try_from(i) {
            indices.push(index);
        }
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    indices
}

fn normalize_slice_bound(bound: i64, len: i64) -> i64 {
    if bound >= 0 {
        bound
    } else {
        len.saturating_add(bound).max(0)
    }
}

fn normalize_slice_bound_for_negative_step(bound: i64, len: i64) -> i64 {
    if bound >= 0 {
        bound
    } else {
        len.saturating_add(bound).max(-1)
    }
}

impl JsonPath {
    /// [`Evaluator::query`] with default options
    pub fn query<'d, D: Document>(&self, doc: &'d D) -> Result<Vec<Match<'d, D>>, Error> {
        Evaluator::new().query(self, doc)
    }

    /// [`Evaluator::get`] with default options
    pub fn get<'d, D: Document>(&self, doc: &'d D) -> Result<Vec<&'d D>, Error> {
        Evaluator::new().get(self, doc)
    }

    pub fn contains<D: Document>(&self, doc: &D) -> Result<bool, Error> {
        Evaluator::new().contains(self, doc)
    }

    /// [`Evaluator::set`] with default options, writing clones of `value`
    pub fn set<D: Document + Clone>(&self, doc: &mut D, value: D) -> Result<usize, Error> {
        Evaluator::new().set(self, doc, || value.clone())
    }

    pub fn remove<D: Document>(&self, doc: &mut D) -> Result<usize, Error> {
        Evaluator::new().remove(self, doc)
    }
}
