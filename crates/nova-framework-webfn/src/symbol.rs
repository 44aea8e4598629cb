use nova_core::Range;
use serde::{Deserialize, Serialize};

use crate::media::media_type_value;
use crate::model::{RouteDefinition, RouteElement};

/// A searchable workspace symbol for one route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSymbol {
    /// `@/person/{id} -- GET - Version: 1 - Accept: application/json`
    pub label: String,
    pub range: Option<Range>,
}

/// Build the symbol for `route`, or `None` when it has no usable path.
pub fn route_symbol(route: &RouteDefinition) -> Option<RouteSymbol> {
    let path = route.full_path().filter(|path| !path.is_empty())?;
    let methods: Vec<&str> = route.http_methods.iter().map(RouteElement::as_str).collect();
    let label = symbol_label(
        &path,
        &methods,
        route.version.as_ref().map(RouteElement::as_str),
        &mime_types(&route.accept_types),
        &mime_types(&route.content_types),
    );
    Some(RouteSymbol {
        label,
        range: route.range,
    })
}

fn mime_types(elements: &[RouteElement]) -> Vec<String> {
    elements
        .iter()
        .map(|element| media_type_value(element.as_str()).to_string())
        .collect()
}

fn symbol_label(
    path: &str,
    methods: &[&str],
    version: Option<&str>,
    accept_types: &[String],
    content_types: &[String],
) -> String {
    let mut label = if path.starts_with('/') {
        format!("@{path}")
    } else {
        format!("@/{path}")
    };
    if !methods.is_empty() {
        label.push_str(" -- ");
        label.push_str(&methods.join(", "));
    }
    if let Some(version) = version {
        label.push_str(" - Version: ");
        label.push_str(version);
    }
    if !accept_types.is_empty() {
        label.push_str(" - Accept: ");
        label.push_str(&accept_types.join(", "));
    }
    if !content_types.is_empty() {
        label.push_str(" - Content-Type: ");
        label.push_str(&content_types.join(", "));
    }
    label
}

/// Flattened route metadata, as stored in a workspace index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteIndexEntry {
    pub path: String,
    pub http_methods: Vec<String>,
    pub accept_types: Vec<String>,
    pub content_types: Vec<String>,
    pub version: Option<String>,
    pub handler_class: Option<String>,
    pub handler_method: Option<String>,
    pub range: Option<Range>,
    pub symbol_label: Option<String>,
}

impl RouteIndexEntry {
    pub fn from_route(route: &RouteDefinition) -> Self {
        Self {
            path: route.full_path().unwrap_or_default(),
            http_methods: route.method_names().into_iter().map(str::to_string).collect(),
            accept_types: mime_types(&route.accept_types),
            content_types: mime_types(&route.content_types),
            version: route.version.as_ref().map(|v| v.element.clone()),
            handler_class: route.handler_class.clone(),
            handler_method: route.handler_method.clone(),
            range: route.range,
            symbol_label: route_symbol(route).map(|symbol| symbol.label),
        }
    }
}
