//! Best-effort name resolution within one compilation unit.
//!
//! This is what the precise classifier uses instead of full type attribution: imports, the
//! package declaration, and declared types of locals, parameters and fields.

use nova_core::TextDocument;
use nova_framework_parse::{ancestors, clean_type, code_children, erase_type, normalize_expression};
use tree_sitter::Node;

use crate::syntax::text;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ImportScope {
    package: Option<String>,
    /// `import a.b.Type;`
    types: Vec<String>,
    /// `import a.b.*;`
    on_demand: Vec<String>,
    /// `import static a.b.Type.member;` as `(owner, member)`.
    static_members: Vec<(String, String)>,
    /// `import static a.b.Type.*;`
    static_on_demand: Vec<String>,
}

impl ImportScope {
    /// Collect the package and imports of the compilation unit containing `node`.
    pub(crate) fn of(node: Node<'_>, doc: &TextDocument) -> Self {
        let root = ancestors(node).last().unwrap_or(node);
        let mut scope = ImportScope::default();
        for child in code_children(root) {
            match child.kind() {
                "package_declaration" => {
                    let raw = clean_type(text(doc, child));
                    let name = raw
                        .trim_start_matches("package")
                        .trim_end_matches(';')
                        .to_string();
                    if !name.is_empty() {
                        scope.package = Some(name);
                    }
                }
                "import_declaration" => scope.add_import(text(doc, child)),
                _ => {}
            }
        }
        scope
    }

    fn add_import(&mut self, raw: &str) {
        let normalized = normalize_expression(raw);
        let Some(rest) = normalized.strip_prefix("import ") else {
            return;
        };
        let rest = rest.trim_end_matches(';').trim();
        let (is_static, path) = match rest.strip_prefix("static ") {
            Some(path) => (true, clean_type(path)),
            None => (false, clean_type(rest)),
        };

        match (is_static, path.strip_suffix(".*")) {
            (false, Some(pkg)) => self.on_demand.push(pkg.to_string()),
            (false, None) => self.types.push(path),
            (true, Some(owner)) => self.static_on_demand.push(owner.to_string()),
            (true, None) => {
                if let Some((owner, member)) = path.rsplit_once('.') {
                    self.static_members
                        .push((owner.to_string(), member.to_string()));
                }
            }
        }
    }

    pub(crate) fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Candidate binary names for a type as written in source, most likely first.
    ///
    /// Qualified member types (`RouterFunctions.Builder`) resolve their outermost segment and use
    /// `$` for the nested part. Names that already look fully qualified are returned unchanged.
    pub(crate) fn type_candidates(&self, written: &str) -> Vec<String> {
        let erased = erase_type(written);
        if erased.is_empty() {
            return Vec::new();
        }

        let (outer, nested) = match erased.split_once('.') {
            Some((outer, nested)) => (outer, Some(nested)),
            None => (erased.as_str(), None),
        };
        if outer.starts_with(|c: char| c.is_ascii_lowercase()) {
            // Package-qualified name.
            return vec![erased.clone()];
        }

        let mut out: Vec<String> = self
            .types
            .iter()
            .filter(|fqn| fqn.rsplit('.').next() == Some(outer))
            .cloned()
            .collect();
        out.extend(self.package.iter().map(|pkg| format!("{pkg}.{outer}")));
        out.extend(self.on_demand.iter().map(|pkg| format!("{pkg}.{outer}")));
        if out.is_empty() {
            out.push(outer.to_string());
        }

        match nested {
            Some(nested) => out
                .into_iter()
                .map(|base| format!("{base}${}", nested.replace('.', "$")))
                .collect(),
            None => out,
        }
    }

    /// Owners of an unqualified static method call, from static imports.
    pub(crate) fn static_owners(&self, member: &str) -> Vec<String> {
        let mut owners: Vec<String> = self
            .static_members
            .iter()
            .filter(|(_, name)| name == member)
            .map(|(owner, _)| owner.clone())
            .collect();
        owners.extend(self.static_on_demand.iter().cloned());
        owners
    }
}

/// Declared type (as written) of the variable `name` visible at `at`.
///
/// Looks at lambda parameters, method / constructor parameters, locals declared earlier in an
/// enclosing block, and fields of enclosing classes. Returns `None` for untyped lambda
/// parameters, `var` locals, and unknown names.
pub(crate) fn declared_type_of(at: Node<'_>, name: &str, doc: &TextDocument) -> Option<String> {
    let use_start = at.start_byte();
    for scope in ancestors(at) {
        match scope.kind() {
            "lambda_expression" => {
                let Some(params) = scope.child_by_field_name("parameters") else {
                    continue;
                };
                match params.kind() {
                    "identifier" if text(doc, params) == name => return None,
                    "inferred_parameters" => {
                        if code_children(params).iter().any(|p| text(doc, *p) == name) {
                            return None;
                        }
                    }
                    "formal_parameters" => {
                        if let Some(ty) = parameter_type(params, name, doc) {
                            return Some(ty);
                        }
                    }
                    _ => {}
                }
            }
            "method_declaration" | "constructor_declaration" => {
                if let Some(ty) = scope
                    .child_by_field_name("parameters")
                    .and_then(|params| parameter_type(params, name, doc))
                {
                    return Some(ty);
                }
            }
            "block" | "constructor_body" | "switch_block_statement_group" => {
                let local = code_children(scope)
                    .into_iter()
                    .filter(|stmt| stmt.kind() == "local_variable_declaration")
                    .filter(|stmt| stmt.start_byte() < use_start)
                    .filter_map(|stmt| declaration_type(stmt, name, doc))
                    .last();
                if let Some(ty) = local {
                    return (ty != "var").then_some(ty);
                }
            }
            "class_body" | "enum_body" | "interface_body" | "record_declaration" => {
                let field = code_children(scope)
                    .into_iter()
                    .filter(|member| {
                        matches!(member.kind(), "field_declaration" | "constant_declaration")
                    })
                    .find_map(|member| declaration_type(member, name, doc));
                if field.is_some() {
                    return field;
                }
                if scope.kind() == "record_declaration" {
                    if let Some(ty) = scope
                        .child_by_field_name("parameters")
                        .and_then(|params| parameter_type(params, name, doc))
                    {
                        return Some(ty);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn parameter_type(params: Node<'_>, name: &str, doc: &TextDocument) -> Option<String> {
    code_children(params)
        .into_iter()
        .filter(|param| param.kind() == "formal_parameter")
        .find(|param| {
            param
                .child_by_field_name("name")
                .is_some_and(|n| text(doc, n) == name)
        })
        .and_then(|param| param.child_by_field_name("type"))
        .map(|ty| clean_type(text(doc, ty)))
}

fn declaration_type(decl: Node<'_>, name: &str, doc: &TextDocument) -> Option<String> {
    let declares = code_children(decl)
        .into_iter()
        .filter(|child| child.kind() == "variable_declarator")
        .any(|declarator| {
            declarator
                .child_by_field_name("name")
                .is_some_and(|n| text(doc, n) == name)
        });
    if !declares {
        return None;
    }
    decl.child_by_field_name("type")
        .map(|ty| clean_type(text(doc, ty)))
}

/// Binary name of the class declaration enclosing `node` (`pkg.Outer$Inner`).
pub(crate) fn enclosing_class_name(
    node: Node<'_>,
    scope: &ImportScope,
    doc: &TextDocument,
) -> Option<String> {
    let mut names: Vec<&str> = ancestors(node)
        .filter(|n| {
            matches!(
                n.kind(),
                "class_declaration"
                    | "interface_declaration"
                    | "enum_declaration"
                    | "record_declaration"
            )
        })
        .filter_map(|n| n.child_by_field_name("name"))
        .map(|n| text(doc, n))
        .collect();
    if names.is_empty() {
        return None;
    }
    names.reverse();
    let binary = names.join("$");
    Some(match scope.package() {
        Some(pkg) => format!("{pkg}.{binary}"),
        None => binary,
    })
}
