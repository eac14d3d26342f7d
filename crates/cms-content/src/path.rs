//! Key paths and flattened entry content
//!
//! Entry content is edited as a flat map keyed by key paths instead of a
//! nested tree. A key path is a sequence of typed segments, so a numeric
//! object key and an array position never get confused.
//!
//! # Path Syntax
//!
//! - Dot-separated keys: `author.name`
//! - Array positions as numeric segments: `tags.0`, `items.2.name`
//! - Bracket indexing is accepted on input: `items[2].name`
//!
//! # Examples
//!
//! ```
//! use cms_content::path::{KeyPath, flatten, unflatten};
//! use serde_json::json;
//!
//! let tree = json!({"title": "Hello", "tags": ["a", "b"]});
//! let flat = flatten(&tree);
//! assert_eq!(flat.get(&KeyPath::parse("tags.1")), Some(&json!("b")));
//! assert_eq!(unflatten(&flat), tree);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;

/// Flat representation of an entry's content: key path to leaf value.
///
/// Leaves are scalars or empty containers. Iteration order is the key path
/// order, which places a path before all of its descendants.
pub type FlattenedContent = BTreeMap<KeyPath, Value>;

/// A segment of a key path - either an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// A key in an object (e.g., "name" in "author.name")
    Key(String),
    /// A position in an array (e.g., 0 in "tags.0")
    Index(usize),
}

impl PathSegment {
    fn from_text(text: &str) -> Self {
        let numeric = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
        match text.parse::<usize>() {
            Ok(index) if numeric => Self::Index(index),
            _ => Self::Key(text.to_string()),
        }
    }

    /// Whether a key segment must be written in its quoted `["..."]` form
    /// to read back as the same segment
    fn needs_quoting(&self) -> bool {
        match self {
            Self::Key(key) => {
                key.is_empty()
                    || key.bytes().all(|b| b.is_ascii_digit())
                    || key.contains(['.', '[', ']', '"', '\\'])
            }
            Self::Index(_) => false,
        }
    }

    /// Returns the array index if this is an index segment
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Key(_) => None,
        }
    }

    /// Returns the object key if this is a key segment
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) if self.needs_quoting() => {
                f.write_str("[\"")?;
                for ch in key.chars() {
                    if ch == '"' || ch == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                f.write_str("\"]")
            }
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A typed key path into entry content
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    /// The empty path, addressing the content root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Parse a dotted path string into typed segments.
    ///
    /// All-digit segments become indices; `items[0]` is accepted as an
    /// alternative spelling of `items.0`. Empty segments are skipped.
    /// A quoted bracket segment such as `archive["2024"]` is always an object
    /// key, with `\"` and `\\` escapes inside the quotes. This is the form
    /// [`Display`](fmt::Display) writes for keys that would otherwise read
    /// back as an index or split on a dot.
    ///
    /// ```
    /// use cms_content::path::{KeyPath, PathSegment};
    ///
    /// let path = KeyPath::parse("items[0].name");
    /// assert_eq!(path.segments(), &[
    ///     PathSegment::Key("items".to_string()),
    ///     PathSegment::Index(0),
    ///     PathSegment::Key("name".to_string()),
    /// ]);
    /// assert_eq!(path, KeyPath::parse("items.0.name"));
    /// ```
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::from_text(&current));
                        current.clear();
                    }
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::from_text(&current));
                        current.clear();
                    }
                    if let Some(quoted) = chars.as_str().strip_prefix('"') {
                        chars = quoted.chars();
                        let mut key = String::new();
                        let mut escaped = false;
                        for ch in chars.by_ref() {
                            match ch {
                                _ if escaped => {
                                    key.push(ch);
                                    escaped = false;
                                }
                                '\\' => escaped = true,
                                '"' => break,
                                _ => key.push(ch),
                            }
                        }
                        for ch in chars.by_ref() {
                            if ch == ']' {
                                break;
                            }
                        }
                        segments.push(PathSegment::Key(key));
                        continue;
                    }
                    let mut index = String::new();
                    for ch in chars.by_ref() {
                        if ch == ']' {
                            break;
                        }
                        index.push(ch);
                    }
                    if let Ok(index) = index.parse::<usize>() {
                        segments.push(PathSegment::Index(index));
                    }
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            segments.push(PathSegment::from_text(&current));
        }

        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Path extended by one segment
    pub fn join(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// Path extended by an object key
    pub fn child(&self, key: impl Into<String>) -> Self {
        self.join(PathSegment::Key(key.into()))
    }

    /// Path extended by an array index
    pub fn index(&self, index: usize) -> Self {
        self.join(PathSegment::Index(index))
    }

    /// Path extended by every segment of `other`
    pub fn concat(&self, other: &KeyPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// The path without its last segment
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Segment-wise prefix test. `tags` is a prefix of `tags.0` but not of
    /// `tags#` or `tagsx`.
    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The remaining segments after `prefix`, if `prefix` matches
    pub fn strip_prefix(&self, prefix: &KeyPath) -> Option<&[PathSegment]> {
        self.0.strip_prefix(prefix.0.as_slice())
    }

    /// Whether the path addresses an array element or something inside one
    pub fn is_array_item(&self) -> bool {
        self.0.iter().any(|segment| segment.as_index().is_some())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 && !segment.needs_quoting() {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let path = Self::parse(s);
        if path.is_empty() && !s.is_empty() {
            return Err(Error::InvalidKeyPath {
                path: s.to_string(),
            });
        }
        Ok(path)
    }
}

impl From<&str> for KeyPath {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// Reads back the quoted form written by `Display`, so numeric object keys
// survive a round trip.
impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}

/// Flatten a nested tree into a key path map.
///
/// Non-empty objects and arrays are descended into; scalars and empty
/// containers become leaves. A scalar root produces an empty map.
pub fn flatten(value: &Value) -> FlattenedContent {
    let mut content = FlattenedContent::new();
    flatten_into(&KeyPath::root(), value, &mut content);
    content
}

/// Flatten `value` below `prefix`, inserting leaves into `content`
pub fn flatten_into(prefix: &KeyPath, value: &Value, content: &mut FlattenedContent) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(&prefix.child(key.as_str()), child, content);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(&prefix.index(index), child, content);
            }
        }
        _ => {
            if !prefix.is_empty() {
                content.insert(prefix.clone(), value.clone());
            }
        }
    }
}

/// Rebuild the nested tree from a key path map.
///
/// Array positions missing from the map become `null` holes; positions are
/// never compacted, so sibling items keep their indices. An empty-container
/// leaf never overwrites content contributed by its descendants.
pub fn unflatten(content: &FlattenedContent) -> Value {
    let mut root = Value::Null;
    for (path, value) in content {
        insert_at(&mut root, path.segments(), value.clone());
    }
    if root.is_null() {
        Value::Object(Map::new())
    } else {
        root
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_filled_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn insert_at(node: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        if !(is_filled_container(node) && is_empty_container(&value)) {
            *node = value;
        }
        return;
    };

    let child = match first {
        PathSegment::Key(key) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            match node {
                Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                _ => return,
            }
        }
        PathSegment::Index(index) => {
            if !node.is_array() && !is_filled_container(node) {
                *node = Value::Array(Vec::new());
            }
            match node {
                Value::Array(items) => {
                    if items.len() <= *index {
                        items.resize(index + 1, Value::Null);
                    }
                    match items.get_mut(*index) {
                        Some(child) => child,
                        None => return,
                    }
                }
                // A numeric key under a populated object stays an object key
                Value::Object(map) => map.entry(index.to_string()).or_insert(Value::Null),
                _ => return,
            }
        }
    };

    insert_at(child, rest, value);
}

/// Partition a flattened map around the list stored at `prefix`.
///
/// Returns the list items ordered by index and the remainder map holding
/// every other key unmodified. Keys equal to `prefix` or starting with
/// `prefix` followed by an index belong to the list; `tags#` and `tags.x`
/// stay in the remainder for prefix `tags`. Missing positions are `None`.
///
/// ```
/// use cms_content::path::{KeyPath, flatten, select_sublist};
/// use serde_json::json;
///
/// let content = flatten(&json!({"tags": ["a", "b"], "title": "T"}));
/// let (items, remainder) = select_sublist(&content, &KeyPath::parse("tags"));
/// assert_eq!(items, vec![Some(json!("a")), Some(json!("b"))]);
/// assert_eq!(remainder.len(), 1);
/// ```
pub fn select_sublist(
    content: &FlattenedContent,
    prefix: &KeyPath,
) -> (Vec<Option<Value>>, FlattenedContent) {
    let mut seeded: Vec<Option<Value>> = Vec::new();
    let mut grouped: BTreeMap<usize, FlattenedContent> = BTreeMap::new();
    let mut remainder = FlattenedContent::new();

    for (path, value) in content {
        match path.strip_prefix(prefix) {
            Some([]) => {
                // The list slot itself, e.g. `tags: []`
                if let Value::Array(items) = value {
                    seeded = items.iter().cloned().map(Some).collect();
                }
            }
            Some([PathSegment::Index(index), rest @ ..]) => {
                grouped
                    .entry(*index)
                    .or_default()
                    .insert(KeyPath::from_segments(rest.to_vec()), value.clone());
            }
            _ => {
                remainder.insert(path.clone(), value.clone());
            }
        }
    }

    let len = grouped
        .keys()
        .next_back()
        .map_or(seeded.len(), |max| seeded.len().max(max + 1));
    let mut items = seeded;
    items.resize(len, None);

    for (index, item) in grouped {
        let mut node = Value::Null;
        for (path, value) in item {
            insert_at(&mut node, path.segments(), value);
        }
        if let Some(slot) = items.get_mut(index) {
            *slot = Some(node);
        }
    }

    (items, remainder)
}

/// Inverse of [`select_sublist`]: flatten `items` back under `prefix` and
/// merge them with `remainder`. An empty list is stored as `prefix: []`;
/// `None` holes produce no keys.
pub fn merge_sublist(
    prefix: &KeyPath,
    items: &[Option<Value>],
    remainder: FlattenedContent,
) -> FlattenedContent {
    let mut content = remainder;
    if items.is_empty() {
        content.insert(prefix.clone(), Value::Array(Vec::new()));
    }
    for (index, item) in items.iter().enumerate() {
        if let Some(item) = item {
            flatten_into(&prefix.index(index), item, &mut content);
        }
    }
    content
}
