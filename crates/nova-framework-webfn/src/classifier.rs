//! Recognizers for router API calls.
//!
//! The extractor never matches method names itself; every "is this a route / nest / combine /
//! build call" question goes through a [`CallClassifier`].

use std::fmt;
use std::str::FromStr;

use nova_core::TextDocument;
use nova_framework_parse::{ancestors, code_children, normalize_expression, simplify_type};
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::model::RouteDefinition;
use crate::resolve::{declared_type_of, enclosing_class_name, ImportScope};
use crate::syntax::{split_method_reference, text, unparenthesize, Expr, MethodCall};

pub trait CallClassifier: Send + Sync {
    /// `route(predicate, handler)` / `andRoute(predicate, handler)`.
    fn is_route_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool;

    /// The `build()` call that finalizes a router builder.
    fn is_builder_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool;

    /// `nest(predicate, router)` in the static style.
    fn is_static_nest_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool;

    /// `and(router)` combining two router functions.
    fn is_static_and_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool;

    /// Fill in the handler class / method from a method reference or lambda argument.
    fn extract_handler_info(&self, handler: Node<'_>, doc: &TextDocument, route: &mut RouteDefinition);

    fn is_static_router_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        self.is_route_invocation(call, doc)
            || self.is_static_nest_invocation(call, doc)
            || self.is_static_and_invocation(call, doc)
    }
}

fn is_route_name(name: &str) -> bool {
    matches!(name, "route" | "andRoute")
}

fn is_nest_name(name: &str) -> bool {
    matches!(name, "nest" | "andNest")
}

fn is_and_name(name: &str) -> bool {
    matches!(name, "and" | "andOther")
}

/// Method-name matching only.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleCallClassifier;

impl CallClassifier for SimpleCallClassifier {
    fn is_route_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        is_route_name(call.name(doc))
    }

    fn is_builder_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        call.name(doc) == "build"
    }

    fn is_static_nest_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        is_nest_name(call.name(doc))
    }

    fn is_static_and_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        is_and_name(call.name(doc))
    }

    fn extract_handler_info(&self, handler: Node<'_>, doc: &TextDocument, route: &mut RouteDefinition) {
        syntactic_handler_info(handler, doc, route);
    }
}

fn syntactic_handler_info(handler: Node<'_>, doc: &TextDocument, route: &mut RouteDefinition) {
    match Expr::classify(handler) {
        Expr::MethodRef(node) => match split_method_reference(doc, node) {
            Some((class, method)) => {
                route.handler_class = Some(class);
                route.handler_method = Some(method);
            }
            None => route.handler_method = Some(normalize_expression(text(doc, node))),
        },
        Expr::Lambda(lambda) => {
            route.handler_method = Some(normalize_expression(text(doc, lambda.node())));
        }
        _ => {}
    }
}

const ROUTER_PACKAGES: [&str; 2] = [
    "org.springframework.web.reactive.function.server",
    "org.springframework.web.servlet.function",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RouterKind {
    /// `RouterFunction`
    Function,
    /// `RouterFunctions`
    Functions,
    /// `RouterFunctions$Builder`
    Builder,
}

/// One of the router API types, in either the reactive or the servlet flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RouterType {
    package: &'static str,
    kind: RouterKind,
}

impl RouterType {
    fn parse(binary_name: &str) -> Option<Self> {
        let binary_name = binary_name.replace("RouterFunctions.Builder", "RouterFunctions$Builder");
        let (package, simple) = binary_name.rsplit_once('.')?;
        let package = ROUTER_PACKAGES.iter().find(|known| **known == package)?;
        let kind = match simple {
            "RouterFunction" => RouterKind::Function,
            "RouterFunctions" => RouterKind::Functions,
            "RouterFunctions$Builder" => RouterKind::Builder,
            _ => return None,
        };
        Some(Self { package, kind })
    }

    fn is_router_function(&self) -> bool {
        matches!(self.kind, RouterKind::Function | RouterKind::Functions)
    }

    /// Return type of `method` declared on this type, as far as route extraction cares.
    fn return_type(self, method: &str, has_args: bool) -> Option<Self> {
        let kind = match (self.kind, method) {
            (RouterKind::Functions, "route") if !has_args => RouterKind::Builder,
            (RouterKind::Functions, "route" | "nest" | "resources") => RouterKind::Function,
            (
                RouterKind::Function,
                "and" | "andRoute" | "andNest" | "andOther" | "filter" | "withAttribute"
                | "withAttributes",
            ) => RouterKind::Function,
            (RouterKind::Builder, "build") => RouterKind::Function,
            (RouterKind::Builder, _) => RouterKind::Builder,
            _ => return None,
        };
        Some(Self {
            package: self.package,
            kind,
        })
    }
}

/// Resolves the declaring type of each invocation from the compilation unit and accepts only the
/// Spring functional router API (`RouterFunction`, `RouterFunctions`, `RouterFunctions.Builder`
/// of either the WebFlux or the WebMvc flavor).
#[derive(Clone, Copy, Debug, Default)]
pub struct PreciseCallClassifier;

impl PreciseCallClassifier {
    fn declaring_types(&self, call: MethodCall<'_>, doc: &TextDocument) -> Vec<RouterType> {
        let scope = ImportScope::of(call.node(), doc);
        self.declaring_types_in(call, doc, &scope)
    }

    fn declaring_types_in(
        &self,
        call: MethodCall<'_>,
        doc: &TextDocument,
        scope: &ImportScope,
    ) -> Vec<RouterType> {
        match call.receiver() {
            None => scope
                .static_owners(call.name(doc))
                .iter()
                .filter_map(|owner| RouterType::parse(owner))
                .collect(),
            Some(receiver) => self.expression_types(receiver, doc, scope),
        }
    }

    fn expression_types(
        &self,
        expr: Node<'_>,
        doc: &TextDocument,
        scope: &ImportScope,
    ) -> Vec<RouterType> {
        let expr = unparenthesize(expr);
        if let Some(call) = MethodCall::cast(expr) {
            return self.return_type(call, doc, scope).into_iter().collect();
        }
        if !matches!(expr.kind(), "identifier" | "scoped_identifier" | "field_access") {
            return Vec::new();
        }

        let written = normalize_expression(text(doc, expr));
        let variable = written.strip_prefix("this.").unwrap_or(&written);
        let written_type = declared_type_of(expr, variable, doc).unwrap_or_else(|| written.clone());
        scope
            .type_candidates(&written_type)
            .iter()
            .filter_map(|candidate| RouterType::parse(candidate))
            .collect()
    }

    fn return_type(
        &self,
        call: MethodCall<'_>,
        doc: &TextDocument,
        scope: &ImportScope,
    ) -> Option<RouterType> {
        let name = call.name(doc);
        let has_args = !call.arguments().is_empty();
        self.declaring_types_in(call, doc, scope)
            .into_iter()
            .find_map(|owner| owner.return_type(name, has_args))
    }

    fn declared_by_router_function(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        self.declaring_types(call, doc)
            .iter()
            .any(RouterType::is_router_function)
    }

    /// Binary name of the class a method reference qualifier refers to.
    fn qualifier_class(&self, qualifier: Node<'_>, doc: &TextDocument) -> Option<String> {
        let scope = ImportScope::of(qualifier, doc);
        let written = normalize_expression(text(doc, qualifier));
        match written.as_str() {
            "this" => return enclosing_class_name(qualifier, &scope, doc),
            "super" | "" => return None,
            _ => {}
        }

        let variable = written.strip_prefix("this.").unwrap_or(&written);
        let written_type = match declared_type_of(qualifier, variable, doc) {
            Some(ty) => ty,
            None if written.starts_with(|c: char| c.is_ascii_uppercase())
                || written.contains('.') =>
            {
                written.clone()
            }
            None => return None,
        };
        if written_type == "var" {
            return None;
        }
        scope.type_candidates(&written_type).into_iter().next()
    }
}

impl CallClassifier for PreciseCallClassifier {
    fn is_route_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        is_route_name(call.name(doc)) && self.declared_by_router_function(call, doc)
    }

    fn is_builder_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        call.name(doc) == "build"
            && self
                .declaring_types(call, doc)
                .iter()
                .any(|ty| ty.kind == RouterKind::Builder)
    }

    fn is_static_nest_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        is_nest_name(call.name(doc)) && self.declared_by_router_function(call, doc)
    }

    fn is_static_and_invocation(&self, call: MethodCall<'_>, doc: &TextDocument) -> bool {
        is_and_name(call.name(doc)) && self.declared_by_router_function(call, doc)
    }

    fn extract_handler_info(&self, handler: Node<'_>, doc: &TextDocument, route: &mut RouteDefinition) {
        let Expr::MethodRef(reference) = Expr::classify(handler) else {
            syntactic_handler_info(handler, doc, route);
            return;
        };

        let qualifier = code_children(reference).into_iter().next();
        let method = split_method_reference(doc, reference).map(|(_, method)| method);
        let class = qualifier.and_then(|q| self.qualifier_class(q, doc));
        match (class, method) {
            (Some(class), Some(method)) => {
                let signature = method_signature(reference, &class, &method, doc);
                route.handler_class = Some(class);
                route.handler_method = Some(signature.unwrap_or(method));
            }
            _ => syntactic_handler_info(handler, doc, route),
        }
    }
}

/// `name(ParamType, ...)` when `class` is declared in the same file and has exactly one method
/// called `method`.
fn method_signature(at: Node<'_>, class: &str, method: &str, doc: &TextDocument) -> Option<String> {
    let root = ancestors(at).last()?;
    let scope = ImportScope::of(at, doc);
    let mut found = Vec::new();
    nova_framework_parse::visit_nodes(root, &mut |node| {
        if node.kind() != "method_declaration" {
            return;
        }
        let named = node
            .child_by_field_name("name")
            .is_some_and(|name| text(doc, name) == method);
        if named && enclosing_class_name(node, &scope, doc).as_deref() == Some(class) {
            found.push(node);
        }
    });

    let [declaration] = found.as_slice() else {
        return None;
    };
    let params = declaration.child_by_field_name("parameters")?;
    let types: Vec<String> = code_children(params)
        .into_iter()
        .filter_map(|param| param.child_by_field_name("type"))
        .map(|ty| simplify_type(text(doc, ty)))
        .collect();
    Some(format!("{method}({})", types.join(", ")))
}

/// Which [`CallClassifier`] to run; this is what configuration and the CLI refer to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Simple,
    #[default]
    Precise,
}

static SIMPLE: SimpleCallClassifier = SimpleCallClassifier;
static PRECISE: PreciseCallClassifier = PreciseCallClassifier;

impl ClassifierKind {
    pub fn classifier(self) -> &'static dyn CallClassifier {
        match self {
            ClassifierKind::Simple => &SIMPLE,
            ClassifierKind::Precise => &PRECISE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassifierKind::Simple => "simple",
            ClassifierKind::Precise => "precise",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ClassifierKind::Simple),
            "precise" => Ok(ClassifierKind::Precise),
            other => Err(format!("unknown classifier `{other}` (expected `simple` or `precise`)")),
        }
    }
}
