//! Value paths into decoded JSON payloads.
//!
//! Nested listings (mostly the Senado's) wrap the record array a few object
//! levels deep, e.g. `ListaPartidos.Partidos.Partido`. A [`ValuePath`] is the
//! parsed form of such a dotted path; an [`Extraction`] is either a path or a
//! named function for payloads a path cannot describe.

use serde_json::Value as JsonValue;
use std::fmt;

/// One step of a [`ValuePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Object member lookup.
    Key(String),
    /// Array position. Applied to an object, looks up the decimal key instead.
    Index(usize),
}

/// Ordered sequence of steps from a document root to a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValuePath {
    steps: Vec<Step>,
}

impl ValuePath {
    /// Parse a dotted path. Segments made only of ASCII digits become
    /// [`Step::Index`], everything else [`Step::Key`].
    pub fn parse(dotted: &str) -> Self {
        let steps = dotted
            .split('.')
            .map(|segment| {
                let numeric = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
                match segment.parse::<usize>() {
                    Ok(index) if numeric => Step::Index(index),
                    _ => Step::Key(segment.to_string()),
                }
            })
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk the path from `root`. `None` as soon as a step has nothing to
    /// land on.
    pub fn resolve<'a>(&self, root: &'a JsonValue) -> Option<&'a JsonValue> {
        self.steps.iter().try_fold(root, |node, step| match (step, node) {
            (Step::Index(i), JsonValue::Array(items)) => items.get(*i),
            (Step::Index(i), JsonValue::Object(map)) => map.get(&i.to_string()),
            (Step::Key(key), JsonValue::Object(map)) => map.get(key),
            _ => None,
        })
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match step {
                Step::Key(key) => f.write_str(key)?,
                Step::Index(index) => write!(f, "{}", index)?,
            }
        }
        Ok(())
    }
}

impl From<&str> for ValuePath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

/// Extraction function for payloads that a path cannot describe.
pub type ExtractFn = fn(&JsonValue) -> Option<&JsonValue>;

/// How to find the record array inside a nested response.
#[derive(Debug, Clone)]
pub enum Extraction {
    Path(ValuePath),
    Custom { name: &'static str, extract: ExtractFn },
}

/// Result of looking up the record array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemsLookup<'a> {
    Items(&'a [JsonValue]),
    /// The extraction landed on nothing.
    Missing,
    /// The extraction landed on a value of another JSON kind.
    NotArray(&'static str),
}

impl Extraction {
    pub fn path(dotted: &str) -> Self {
        Self::Path(ValuePath::parse(dotted))
    }

    /// Human-readable description, used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.to_string(),
            Self::Custom { name, .. } => format!("<{}>", name),
        }
    }

    pub fn lookup<'a>(&self, root: &'a JsonValue) -> ItemsLookup<'a> {
        let found = match self {
            Self::Path(path) => path.resolve(root),
            Self::Custom { extract, .. } => extract(root),
        };
        match found {
            Some(JsonValue::Array(items)) => ItemsLookup::Items(items),
            Some(other) => ItemsLookup::NotArray(json_kind(other)),
            None => ItemsLookup::Missing,
        }
    }
}

/// Name of a JSON value's kind.
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
