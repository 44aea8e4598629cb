//! Typed views over the tree-sitter-java nodes the extractor cares about.

use nova_core::{Range, TextDocument};
use nova_framework_parse::{code_children, node_text, normalize_expression, string_literal_value};
use tree_sitter::Node;

use crate::error::ExtractError;

/// Source text of `node` within `doc`, or `""` when the node does not fit the snapshot.
pub(crate) fn text<'d>(doc: &'d TextDocument, node: Node<'_>) -> &'d str {
    node_text(doc.text(), node)
}

/// Range covering the whole node.
pub(crate) fn node_range(doc: &TextDocument, node: Node<'_>) -> Result<Range, ExtractError> {
    let span = node.byte_range();
    Ok(doc.to_range(span.start, span.len())?)
}

/// A `method_invocation` node: `receiver.name(arguments)` or `name(arguments)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodCall<'t> {
    node: Node<'t>,
}

impl<'t> MethodCall<'t> {
    pub fn cast(node: Node<'t>) -> Option<Self> {
        (node.kind() == "method_invocation").then_some(Self { node })
    }

    pub fn node(&self) -> Node<'t> {
        self.node
    }

    pub fn name_node(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("name")
    }

    pub fn name<'d>(&self, doc: &'d TextDocument) -> &'d str {
        self.name_node().map(|name| text(doc, name)).unwrap_or("")
    }

    /// The expression the method is invoked on, if any.
    pub fn receiver(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("object")
    }

    pub fn receiver_call(&self) -> Option<MethodCall<'t>> {
        self.receiver().and_then(MethodCall::cast)
    }

    pub fn arguments(&self) -> Vec<Node<'t>> {
        self.node
            .child_by_field_name("arguments")
            .map(code_children)
            .unwrap_or_default()
    }

    pub fn argument(&self, idx: usize) -> Option<Node<'t>> {
        self.arguments().get(idx).copied()
    }

    /// Range from the method name to the end of the invocation.
    ///
    /// For `RouterFunctions.route().GET("/x", h::get)` this is `GET("/x", h::get)`, which is what
    /// editors highlight for a route.
    pub fn range(&self, doc: &TextDocument) -> Result<Range, ExtractError> {
        let start = self
            .name_node()
            .map(|name| name.start_byte())
            .unwrap_or_else(|| self.node.start_byte());
        let end = self.node.end_byte();
        Ok(doc.to_range(start, end.saturating_sub(start))?)
    }
}

/// A `lambda_expression` node.
#[derive(Clone, Copy, Debug)]
pub struct Lambda<'t> {
    node: Node<'t>,
}

impl<'t> Lambda<'t> {
    pub fn cast(node: Node<'t>) -> Option<Self> {
        (node.kind() == "lambda_expression").then_some(Self { node })
    }

    pub fn node(&self) -> Node<'t> {
        self.node
    }

    /// Calls a lambda body evaluates: the expression body itself, or every `return` and
    /// expression statement of a block body.
    pub fn body_calls(&self) -> Vec<MethodCall<'t>> {
        let Some(body) = self.node.child_by_field_name("body") else {
            return Vec::new();
        };
        if body.kind() != "block" {
            return MethodCall::cast(unparenthesize(body)).into_iter().collect();
        }

        code_children(body)
            .into_iter()
            .filter(|stmt| matches!(stmt.kind(), "return_statement" | "expression_statement"))
            .filter_map(|stmt| code_children(stmt).into_iter().next())
            .filter_map(|expr| MethodCall::cast(unparenthesize(expr)))
            .collect()
    }
}

/// Strip any number of enclosing parentheses.
pub(crate) fn unparenthesize(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match code_children(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// The argument shapes route registrations are made of.
#[derive(Clone, Copy, Debug)]
pub enum Expr<'t> {
    Call(MethodCall<'t>),
    Lambda(Lambda<'t>),
    MethodRef(Node<'t>),
    StringLiteral(Node<'t>),
    Other(Node<'t>),
}

impl<'t> Expr<'t> {
    pub fn classify(node: Node<'t>) -> Self {
        let node = unparenthesize(node);
        match node.kind() {
            "method_invocation" => Expr::Call(MethodCall { node }),
            "lambda_expression" => Expr::Lambda(Lambda { node }),
            "method_reference" => Expr::MethodRef(node),
            "string_literal" => Expr::StringLiteral(node),
            _ => Expr::Other(node),
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, Expr::Lambda(_) | Expr::MethodRef(_))
    }
}

/// Value of a string literal node, or the normalized expression text for anything else
/// (constants, concatenations, ...).
pub(crate) fn literal_or_expression(doc: &TextDocument, node: Node<'_>) -> String {
    let node = unparenthesize(node);
    let raw = text(doc, node);
    if node.kind() == "string_literal" {
        if let Some(value) = string_literal_value(raw) {
            return value;
        }
    }
    normalize_expression(raw)
}

/// Split a method reference into `(qualifier, method)`.
pub(crate) fn split_method_reference(doc: &TextDocument, node: Node<'_>) -> Option<(String, String)> {
    let raw = normalize_expression(text(doc, node));
    let (qualifier, method) = raw.split_once("::")?;
    let qualifier = qualifier.trim();
    let method = method.trim();
    if qualifier.is_empty() {
        return None;
    }
    Some((qualifier.to_string(), method.to_string()))
}
