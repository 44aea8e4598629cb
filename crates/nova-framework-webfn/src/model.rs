use std::collections::BTreeMap;
use std::fmt;

use nova_core::Range;
use serde::{Deserialize, Serialize};

/// A fragment of a route (path segment, HTTP verb, media type, version) and where it was written.
///
/// Elements synthesized by the extractor (the implicit empty path of a builder route, for
/// example) have no range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteElement {
    pub element: String,
    pub range: Option<Range>,
}

impl RouteElement {
    pub fn new(element: impl Into<String>, range: Option<Range>) -> Self {
        Self {
            element: element.into(),
            range,
        }
    }

    pub fn synthesized(element: impl Into<String>) -> Self {
        Self::new(element, None)
    }

    pub fn as_str(&self) -> &str {
        &self.element
    }
}

/// One route registered by a functional router definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// The path written at the registration itself (without enclosing prefixes).
    pub path: Option<RouteElement>,
    /// Enclosing prefixes and the local path, outer to inner.
    pub path_elements: Vec<RouteElement>,
    pub http_methods: Vec<RouteElement>,
    pub accept_types: Vec<RouteElement>,
    pub content_types: Vec<RouteElement>,
    pub version: Option<RouteElement>,
    pub handler_class: Option<String>,
    pub handler_method: Option<String>,
    /// Predicates the extractor does not model, keyed by predicate method name.
    pub predicates: BTreeMap<String, RouteElement>,
    pub range: Option<Range>,
    pub nesting_level: usize,
}

impl RouteDefinition {
    /// The effective request path, or `None` when neither the route nor its context has one.
    pub fn full_path(&self) -> Option<String> {
        if self.path_elements.is_empty() {
            return self.path.as_ref().map(|path| combine_paths("", path.as_str()));
        }
        Some(
            self.path_elements
                .iter()
                .fold(String::new(), |acc, element| combine_paths(&acc, element.as_str())),
        )
    }

    pub fn handler_label(&self) -> Option<String> {
        match (&self.handler_class, &self.handler_method) {
            (Some(class), Some(method)) => Some(format!("{class}::{method}")),
            (Some(class), None) => Some(class.clone()),
            (None, Some(method)) => Some(method.clone()),
            (None, None) => None,
        }
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.http_methods.iter().map(RouteElement::as_str).collect()
    }
}

/// Join a parent path and a child segment.
///
/// A `/` is inserted only when neither side supplies one and the child is non-empty; existing
/// slashes are kept as written. The result always starts with `/`.
pub fn combine_paths(parent: &str, child: &str) -> String {
    let mut path = parent.to_string();
    if !child.is_empty() && !parent.ends_with('/') && !child.starts_with('/') {
        path.push('/');
    }
    path.push_str(child);

    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

fn joined(elements: &[RouteElement]) -> String {
    elements
        .iter()
        .map(RouteElement::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(self.nesting_level);
        let inner = "  ".repeat(self.nesting_level + 1);

        writeln!(f, "{indent}Route:")?;
        if self.http_methods.is_empty() {
            writeln!(f, "{inner}Methods:  N/A")?;
        } else {
            writeln!(f, "{inner}Methods:  {}", joined(&self.http_methods))?;
        }
        writeln!(
            f,
            "{inner}Path:     {}",
            self.path.as_ref().map(RouteElement::as_str).unwrap_or("N/A")
        )?;
        if let Some(full_path) = self.full_path().filter(|_| !self.path_elements.is_empty()) {
            writeln!(f, "{inner}FullPath: {full_path}")?;
        }
        if !self.accept_types.is_empty() {
            writeln!(f, "{inner}Accept:   {}", joined(&self.accept_types))?;
        }
        if !self.content_types.is_empty() {
            writeln!(f, "{inner}Content:  {}", joined(&self.content_types))?;
        }
        if let Some(version) = &self.version {
            writeln!(f, "{inner}Version:  {}", version.element)?;
        }
        for (kind, value) in &self.predicates {
            writeln!(f, "{inner}Predicate: {kind}({})", value.element)?;
        }
        writeln!(
            f,
            "{inner}Handler:  {}",
            self.handler_label().as_deref().unwrap_or("N/A")
        )
    }
}
