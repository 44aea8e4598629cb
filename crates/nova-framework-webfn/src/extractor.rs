use nova_core::TextDocument;
use tree_sitter::Node;

use crate::classifier::CallClassifier;
use crate::context::{ExtractionContext, NestFacets};
use crate::error::ExtractError;
use crate::model::{RouteDefinition, RouteElement};
use crate::predicate::{
    analyze_request_predicate, extract_methods, extract_path, extract_predicate_info,
    extract_version, is_http_method,
};
use crate::syntax::{literal_or_expression, node_range, unparenthesize, Expr, Lambda, MethodCall};

const TARGET: &str = "nova.framework.webfn";

/// Recovers route definitions from one router chain.
///
/// Two dialects are supported and told apart by the classifier:
///
/// * builder: `RouterFunctions.route().path("/a", b -> b.GET("/x", h::x)).build()`
/// * static: `nest(path("/a"), route(GET("/x"), h::x)).andRoute(POST("/y"), h::y)`
///
/// Routes come out in source order, outer to inner.
#[derive(Clone, Copy)]
pub struct RouteExtractor<'c> {
    classifier: &'c dyn CallClassifier,
}

impl<'c> RouteExtractor<'c> {
    pub fn new(classifier: &'c dyn CallClassifier) -> Self {
        Self { classifier }
    }

    /// Extract every route registered by the chain ending at `root`.
    ///
    /// Never fails: a node whose location cannot be mapped onto `doc` is logged and the whole
    /// chain yields no routes.
    pub fn extract_all_routes(&self, root: MethodCall<'_>, doc: &TextDocument) -> Vec<RouteDefinition> {
        let mut context = ExtractionContext::new();
        match self.extract_routes_in_context(root, doc, &mut context) {
            Ok(routes) => routes,
            Err(ExtractError::BadLocation(err)) => {
                tracing::error!(
                    target: TARGET,
                    uri = %err.uri,
                    offset = err.offset,
                    length = err.length,
                    "failed to map a router chain node onto the document: {err}"
                );
                Vec::new()
            }
        }
    }

    /// Like [`Self::extract_all_routes`], starting from an already populated context.
    ///
    /// The context is left exactly as it was passed in, on success and on error.
    pub fn extract_routes_in_context(
        &self,
        root: MethodCall<'_>,
        doc: &TextDocument,
        context: &mut ExtractionContext,
    ) -> Result<Vec<RouteDefinition>, ExtractError> {
        let mut routes = Vec::new();
        if self.classifier.is_builder_invocation(root, doc) {
            self.process_builder_chain(root, context, &mut routes, doc)?;
        } else if self.classifier.is_static_router_invocation(root, doc) {
            self.process_static_chain(root, context, &mut routes, doc)?;
        } else {
            tracing::trace!(target: TARGET, method = root.name(doc), "not a router chain");
        }
        Ok(routes)
    }

    fn process_builder_chain(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        if let Some(receiver) = call.receiver_call() {
            self.process_builder_chain(receiver, context, routes, doc)?;
        }

        match call.name(doc) {
            "path" => self.builder_path(call, context, routes, doc),
            "nest" => self.builder_nest(call, context, routes, doc),
            verb if is_http_method(verb) => self.builder_verb(call, context, routes, doc),
            "route" if !call.arguments().is_empty() => {
                self.route_registration(call, context, routes, doc)
            }
            other => {
                tracing::trace!(target: TARGET, method = other, "skipping builder chain link");
                Ok(())
            }
        }
    }

    /// `path(prefix, builder -> ...)`
    fn builder_path(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        let args = call.arguments();
        let lambda = args.iter().find_map(|arg| Lambda::cast(unparenthesize(*arg)));
        let prefix = args
            .iter()
            .find(|arg| unparenthesize(**arg).kind() != "lambda_expression");
        let (Some(lambda), Some(prefix)) = (lambda, prefix) else {
            return Ok(());
        };

        let prefix = RouteElement::new(
            literal_or_expression(doc, *prefix),
            Some(node_range(doc, *prefix)?),
        );
        let mut scope = context.enter(NestFacets::path(prefix));
        self.process_lambda_body(lambda, &mut scope, routes, doc)
    }

    /// `nest(predicate, builder -> ...)`
    fn builder_nest(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        let args = call.arguments();
        let (Some(predicate), Some(lambda)) = (
            args.first(),
            args.get(1).and_then(|arg| Lambda::cast(unparenthesize(*arg))),
        ) else {
            return Ok(());
        };

        let facets = nest_facets(*predicate, doc)?;
        let mut scope = context.enter(facets);
        self.process_lambda_body(lambda, &mut scope, routes, doc)
    }

    /// `GET("/x", accept(...), handler::x)` and the other verbs.
    fn builder_verb(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        let mut route = RouteDefinition {
            nesting_level: context.nesting_level(),
            range: Some(call.range(doc)?),
            ..RouteDefinition::default()
        };
        if let Some(name) = call.name_node() {
            route
                .http_methods
                .push(RouteElement::new(call.name(doc), Some(node_range(doc, name)?)));
        }

        let mut local_path = None;
        let mut predicate_path = None;
        let mut accept_types = Vec::new();
        let mut content_types = Vec::new();
        let mut local_version = None;
        for arg in call.arguments() {
            match Expr::classify(arg) {
                Expr::StringLiteral(literal) => {
                    local_path = Some(RouteElement::new(
                        literal_or_expression(doc, literal),
                        Some(node_range(doc, literal)?),
                    ));
                }
                handler if handler.is_handler() => {
                    self.classifier.extract_handler_info(arg, doc, &mut route);
                }
                Expr::Call(predicate) => {
                    let version =
                        extract_predicate_info(predicate, &mut accept_types, &mut content_types, doc)?;
                    if version.is_some() {
                        local_version = version;
                    }
                    if predicate_path.is_none() {
                        predicate_path =
                            extract_path(predicate, &mut Vec::new(), &mut Vec::new(), doc)?;
                    }
                }
                _ => {}
            }
        }

        let local_path = local_path
            .or(predicate_path)
            .unwrap_or_else(|| RouteElement::synthesized(""));
        route.path_elements = context.all_path_elements(Some(&local_path));
        route.path = Some(local_path);
        route.accept_types = context.current_accept_types();
        route.accept_types.extend(accept_types);
        route.content_types = context.current_content_types();
        route.content_types.extend(content_types);
        route.version = local_version.or_else(|| context.current_version().cloned());

        routes.push(route);
        Ok(())
    }

    fn process_lambda_body(
        &self,
        lambda: Lambda<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        for call in lambda.body_calls() {
            self.process_builder_chain(call, context, routes, doc)?;
        }
        Ok(())
    }

    fn process_static_chain(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        if let Some(receiver) = call
            .receiver_call()
            .filter(|receiver| self.classifier.is_static_router_invocation(*receiver, doc))
        {
            self.process_static_chain(receiver, context, routes, doc)?;
        }

        if self.classifier.is_route_invocation(call, doc) {
            self.route_registration(call, context, routes, doc)
        } else if self.classifier.is_static_nest_invocation(call, doc) {
            self.static_nest(call, context, routes, doc)
        } else if self.classifier.is_static_and_invocation(call, doc) {
            self.static_and(call, context, routes, doc)
        } else {
            Ok(())
        }
    }

    /// `route(predicate, handler)` in either dialect, and `andRoute(predicate, handler)`.
    fn route_registration(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        let args = call.arguments();
        let Some(predicate) = args.first() else {
            return Ok(());
        };

        let mut route = RouteDefinition {
            nesting_level: context.nesting_level(),
            range: Some(call.range(doc)?),
            ..RouteDefinition::default()
        };
        if let Some(predicate) = MethodCall::cast(unparenthesize(*predicate)) {
            analyze_request_predicate(predicate, &mut route, doc)?;
        }
        if let Some(handler) = args.get(1).filter(|arg| Expr::classify(**arg).is_handler()) {
            self.classifier.extract_handler_info(*handler, doc, &mut route);
        }

        if route.path.is_none() && !context.path_prefixes().is_empty() {
            route.path = Some(RouteElement::synthesized(""));
        }
        if route.path.is_some() {
            route.path_elements = context.all_path_elements(route.path.as_ref());
        }

        let local_accept = std::mem::replace(&mut route.accept_types, context.current_accept_types());
        route.accept_types.extend(local_accept);
        let local_content =
            std::mem::replace(&mut route.content_types, context.current_content_types());
        route.content_types.extend(local_content);
        if route.version.is_none() {
            route.version = context.current_version().cloned();
        }
        if route.http_methods.is_empty() {
            route.http_methods = context.current_methods();
        }

        routes.push(route);
        Ok(())
    }

    /// `nest(predicate, router)` / `andNest(predicate, router)`
    fn static_nest(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        let args = call.arguments();
        let (Some(predicate), Some(nested)) = (args.first(), args.get(1)) else {
            return Ok(());
        };

        let facets = nest_facets(*predicate, doc)?;
        let mut scope = context.enter(facets);
        match self.static_router_call(*nested, doc) {
            Some(nested) => self.process_static_chain(nested, &mut scope, routes, doc),
            None => Ok(()),
        }
    }

    /// `and(router)` / `andOther(router)`: the argument shares the current context.
    fn static_and(
        &self,
        call: MethodCall<'_>,
        context: &mut ExtractionContext,
        routes: &mut Vec<RouteDefinition>,
        doc: &TextDocument,
    ) -> Result<(), ExtractError> {
        match call
            .argument(0)
            .and_then(|other| self.static_router_call(other, doc))
        {
            Some(other) => self.process_static_chain(other, context, routes, doc),
            None => Ok(()),
        }
    }

    fn static_router_call<'t>(&self, node: Node<'t>, doc: &TextDocument) -> Option<MethodCall<'t>> {
        MethodCall::cast(unparenthesize(node))
            .filter(|call| self.classifier.is_static_router_invocation(*call, doc))
    }
}

/// Path (with accept / content types), version and HTTP methods of a nesting predicate.
fn nest_facets(predicate: Node<'_>, doc: &TextDocument) -> Result<NestFacets, ExtractError> {
    let Some(predicate) = MethodCall::cast(unparenthesize(predicate)) else {
        return Ok(NestFacets::default());
    };

    let mut facets = NestFacets::default();
    facets.path = extract_path(
        predicate,
        &mut facets.accept_types,
        &mut facets.content_types,
        doc,
    )?;
    facets.version = extract_version(predicate, doc)?;
    facets.methods = extract_methods(predicate, doc)?;
    Ok(facets)
}
