//! Request-predicate analysis.
//!
//! Predicates are call chains like `GET("/x").and(accept(APPLICATION_JSON).and(version("1")))`.
//! [`traverse_predicate_chain`] walks one in source order and hands every call to a
//! [`PredicateHandler`]; the facet extractors below are all thin handlers over it.

use nova_core::TextDocument;
use nova_framework_parse::normalize_expression;

use crate::error::ExtractError;
use crate::model::{RouteDefinition, RouteElement};
use crate::syntax::{literal_or_expression, node_range, text, unparenthesize, MethodCall};

pub const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "HEAD"];

const MEDIA_TYPE_PREFIX: &str = "MediaType.";

pub fn is_http_method(name: &str) -> bool {
    HTTP_METHODS.contains(&name)
}

/// Callback for [`traverse_predicate_chain`].
///
/// Single-valued facets are returned and combined with [`PredicateHandler::merge`];
/// multi-valued facets are collected by the handler itself.
pub trait PredicateHandler<'t, T> {
    fn handle(
        &mut self,
        name: &str,
        predicate: MethodCall<'t>,
        doc: &TextDocument,
    ) -> Result<Option<T>, ExtractError>;

    /// Combine the result gathered so far with the next one in source order.
    fn merge(&mut self, current: Option<T>, next: Option<T>) -> Option<T> {
        current.or(next)
    }
}

impl<'t, T, F> PredicateHandler<'t, T> for F
where
    F: FnMut(&str, MethodCall<'t>, &TextDocument) -> Result<Option<T>, ExtractError>,
{
    fn handle(
        &mut self,
        name: &str,
        predicate: MethodCall<'t>,
        doc: &TextDocument,
    ) -> Result<Option<T>, ExtractError> {
        self(name, predicate, doc)
    }
}

/// Pins a closure to the [`PredicateHandler`] call signature.
pub fn predicate_handler<'t, T, F>(f: F) -> F
where
    F: FnMut(&str, MethodCall<'t>, &TextDocument) -> Result<Option<T>, ExtractError>,
{
    f
}

/// Visit the receiver chain, then `predicate` itself, then (for `and` / `or`) every call
/// argument.
pub fn traverse_predicate_chain<'t, T, H>(
    predicate: MethodCall<'t>,
    handler: &mut H,
    doc: &TextDocument,
) -> Result<Option<T>, ExtractError>
where
    H: PredicateHandler<'t, T> + ?Sized,
{
    let mut result = None;
    if let Some(receiver) = predicate.receiver_call() {
        result = traverse_predicate_chain(receiver, handler, doc)?;
    }

    let name = predicate.name(doc);
    let current = handler.handle(name, predicate, doc)?;
    result = handler.merge(result, current);

    if matches!(name, "and" | "or") {
        for arg in predicate.arguments() {
            if let Some(nested) = MethodCall::cast(unparenthesize(arg)) {
                let next = traverse_predicate_chain(nested, handler, doc)?;
                result = handler.merge(result, next);
            }
        }
    }
    Ok(result)
}

/// First argument as a string literal value or expression text.
fn first_argument(call: MethodCall<'_>, doc: &TextDocument) -> Result<Option<RouteElement>, ExtractError> {
    let Some(arg) = call.argument(0) else {
        return Ok(None);
    };
    let value = literal_or_expression(doc, arg);
    Ok(Some(RouteElement::new(value, Some(node_range(doc, arg)?))))
}

/// One element per argument of `accept(...)` / `contentType(...)`, `MediaType.` stripped.
pub fn media_types(call: MethodCall<'_>, doc: &TextDocument) -> Result<Vec<RouteElement>, ExtractError> {
    call.arguments()
        .into_iter()
        .map(|arg| {
            let raw = normalize_expression(text(doc, arg));
            let value = raw.strip_prefix(MEDIA_TYPE_PREFIX).unwrap_or(&raw).to_string();
            Ok(RouteElement::new(value, Some(node_range(doc, arg)?)))
        })
        .collect()
}

/// Verbs named by the arguments of `method(HttpMethod.GET, ...)`.
pub fn http_methods(call: MethodCall<'_>, doc: &TextDocument) -> Result<Vec<RouteElement>, ExtractError> {
    let mut out = Vec::new();
    for arg in call.arguments() {
        let raw = normalize_expression(text(doc, arg));
        let verb = raw.rsplit('.').next().unwrap_or(&raw);
        if is_http_method(verb) {
            out.push(RouteElement::new(verb, Some(node_range(doc, arg)?)));
        }
    }
    Ok(out)
}

/// Path of a predicate chain, collecting accept / content types along the way.
pub fn extract_path(
    predicate: MethodCall<'_>,
    accept_types: &mut Vec<RouteElement>,
    content_types: &mut Vec<RouteElement>,
    doc: &TextDocument,
) -> Result<Option<RouteElement>, ExtractError> {
    let mut handler = predicate_handler(|name, call, doc| match name {
        "path" => first_argument(call, doc),
        "accept" => {
            accept_types.extend(media_types(call, doc)?);
            Ok(None)
        }
        "contentType" => {
            content_types.extend(media_types(call, doc)?);
            Ok(None)
        }
        _ => Ok(None),
    });
    traverse_predicate_chain(predicate, &mut handler, doc)
}

pub fn extract_version(
    predicate: MethodCall<'_>,
    doc: &TextDocument,
) -> Result<Option<RouteElement>, ExtractError> {
    let mut handler = predicate_handler(|name, call, doc| match name {
        "version" => first_argument(call, doc),
        _ => Ok(None),
    });
    traverse_predicate_chain(predicate, &mut handler, doc)
}

pub fn extract_methods(
    predicate: MethodCall<'_>,
    doc: &TextDocument,
) -> Result<Vec<RouteElement>, ExtractError> {
    let mut methods = Vec::new();
    let mut handler = predicate_handler(|name, call, doc| {
        if name == "method" {
            methods.extend(http_methods(call, doc)?);
        }
        Ok(None::<()>)
    });
    traverse_predicate_chain(predicate, &mut handler, doc)?;
    Ok(methods)
}

/// Accept / content types and version of a route-local predicate, in one pass.
pub fn extract_predicate_info(
    predicate: MethodCall<'_>,
    accept_types: &mut Vec<RouteElement>,
    content_types: &mut Vec<RouteElement>,
    doc: &TextDocument,
) -> Result<Option<RouteElement>, ExtractError> {
    let mut handler = predicate_handler(|name, call, doc| match name {
        "version" => first_argument(call, doc),
        "accept" => {
            accept_types.extend(media_types(call, doc)?);
            Ok(None)
        }
        "contentType" => {
            content_types.extend(media_types(call, doc)?);
            Ok(None)
        }
        _ => Ok(None),
    });
    traverse_predicate_chain(predicate, &mut handler, doc)
}

/// Populate `route` from the request predicate of a `route(predicate, handler)` registration.
///
/// The leftmost path and version win. Predicates with no dedicated facet are kept in
/// [`RouteDefinition::predicates`].
pub fn analyze_request_predicate(
    predicate: MethodCall<'_>,
    route: &mut RouteDefinition,
    doc: &TextDocument,
) -> Result<(), ExtractError> {
    let mut handler = predicate_handler(|name, call, doc| {
        match name {
            verb if is_http_method(verb) => {
                if let Some(name_node) = call.name_node() {
                    route
                        .http_methods
                        .push(RouteElement::new(verb, Some(node_range(doc, name_node)?)));
                }
                let literal = call
                    .argument(0)
                    .filter(|arg| unparenthesize(*arg).kind() == "string_literal");
                if let Some(arg) = literal.filter(|_| route.path.is_none()) {
                    route.path = Some(RouteElement::new(
                        literal_or_expression(doc, arg),
                        Some(node_range(doc, arg)?),
                    ));
                }
            }
            "method" => route.http_methods.extend(http_methods(call, doc)?),
            "path" => {
                if route.path.is_none() {
                    route.path = first_argument(call, doc)?;
                }
            }
            "accept" => route.accept_types.extend(media_types(call, doc)?),
            "contentType" => route.content_types.extend(media_types(call, doc)?),
            "version" => {
                if route.version.is_none() {
                    route.version = first_argument(call, doc)?;
                }
            }
            "and" | "or" => {}
            other => {
                if !route.predicates.contains_key(other) {
                    let args: Vec<String> = call
                        .arguments()
                        .into_iter()
                        .map(|arg| normalize_expression(text(doc, arg)))
                        .collect();
                    route.predicates.insert(
                        other.to_string(),
                        RouteElement::new(args.join(", "), Some(call.range(doc)?)),
                    );
                }
            }
        }
        Ok(None::<()>)
    });
    traverse_predicate_chain(predicate, &mut handler, doc)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_framework_parse::parse_java;
    use pretty_assertions::assert_eq;

    fn with_predicate<R>(expr: &str, f: impl FnOnce(MethodCall<'_>, &TextDocument) -> R) -> R {
        let src = format!("class A {{ Object p = {expr}; }}");
        let tree = parse_java(&src).expect("parse");
        let doc = TextDocument::new("file:///A.java", src.clone());
        let mut found = None;
        nova_framework_parse::visit_nodes(tree.root_node(), &mut |node| {
            if found.is_none() {
                found = MethodCall::cast(node);
            }
        });
        f(found.expect("predicate call"), &doc)
    }

    fn values(elements: &[RouteElement]) -> Vec<&str> {
        elements.iter().map(RouteElement::as_str).collect()
    }

    #[test]
    fn path_and_media_types_in_one_walk() {
        with_predicate(
            r#"path("/person").and(accept(MediaType.APPLICATION_JSON).and(contentType(TEXT_PLAIN)))"#,
            |call, doc| {
                let mut accept = Vec::new();
                let mut content = Vec::new();
                let path = extract_path(call, &mut accept, &mut content, doc).expect("extract");
                assert_eq!(path.map(|p| p.element), Some("/person".to_string()));
                assert_eq!(values(&accept), vec!["APPLICATION_JSON"]);
                assert_eq!(values(&content), vec!["TEXT_PLAIN"]);
            },
        );
    }

    #[test]
    fn leftmost_value_wins() {
        with_predicate(r#"version("1").and(version("2")).or(version("3"))"#, |call, doc| {
            let version = extract_version(call, doc).expect("extract");
            assert_eq!(version.map(|v| v.element), Some("1".to_string()));
        });
    }

    #[test]
    fn methods_accept_varargs_and_static_imports() {
        with_predicate(
            "method(HttpMethod.GET, RequestMethod.POST).and(method(PUT)).and(method(foo.bar))",
            |call, doc| {
                let methods = extract_methods(call, doc).expect("extract");
                assert_eq!(values(&methods), vec!["GET", "POST", "PUT"]);
            },
        );
    }

    #[test]
    fn request_predicate_fills_the_route() {
        with_predicate(
            r#"GET("/hello").and(accept(TEXT_PLAIN)).and(queryParam("q", v -> true)).and(version(API_V2))"#,
            |call, doc| {
                let mut route = RouteDefinition::default();
                analyze_request_predicate(call, &mut route, doc).expect("analyze");
                assert_eq!(route.method_names(), vec!["GET"]);
                assert_eq!(route.path.as_ref().map(RouteElement::as_str), Some("/hello"));
                assert_eq!(values(&route.accept_types), vec!["TEXT_PLAIN"]);
                assert_eq!(route.version.as_ref().map(RouteElement::as_str), Some("API_V2"));
                assert_eq!(
                    route.predicates.get("queryParam").map(RouteElement::as_str),
                    Some(r#""q", v -> true"#)
                );
            },
        );
    }

    #[test]
    fn custom_merge_sees_every_value() {
        struct Last;
        impl<'t> PredicateHandler<'t, String> for Last {
            fn handle(
                &mut self,
                name: &str,
                _predicate: MethodCall<'t>,
                _doc: &TextDocument,
            ) -> Result<Option<String>, ExtractError> {
                Ok(Some(name.to_string()))
            }

            fn merge(&mut self, current: Option<String>, next: Option<String>) -> Option<String> {
                next.or(current)
            }
        }

        with_predicate(r#"path("/a").and(accept(X))"#, |call, doc| {
            let last = traverse_predicate_chain(call, &mut Last, doc).expect("walk");
            assert_eq!(last.as_deref(), Some("accept"));
        });
    }
}
