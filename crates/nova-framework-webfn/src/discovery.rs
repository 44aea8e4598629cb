use std::path::{Path, PathBuf};

use nova_core::TextDocument;
use nova_framework_parse::{ancestors, parse_java, visit_nodes};
use tree_sitter::Node;
use walkdir::WalkDir;

use crate::classifier::CallClassifier;
use crate::error::WebFnError;
use crate::extractor::RouteExtractor;
use crate::model::RouteDefinition;
use crate::syntax::MethodCall;

const TARGET: &str = "nova.framework.webfn";

/// Outermost router chain invocations under `root`, in source order.
///
/// A chain root is an invocation the classifier accepts as a builder finalization or a static
/// router call and that is not itself nested in another invocation within the same member
/// declaration.
pub fn find_router_chains<'t>(
    root: Node<'t>,
    doc: &TextDocument,
    classifier: &dyn CallClassifier,
) -> Vec<MethodCall<'t>> {
    let mut chains = Vec::new();
    visit_nodes(root, &mut |node| {
        let Some(call) = MethodCall::cast(node) else {
            return;
        };
        if has_enclosing_invocation(node) {
            return;
        }
        if classifier.is_builder_invocation(call, doc) || classifier.is_static_router_invocation(call, doc)
        {
            chains.push(call);
        }
    });
    chains
}

fn has_enclosing_invocation(node: Node<'_>) -> bool {
    for ancestor in ancestors(node) {
        match ancestor.kind() {
            "method_invocation" => return true,
            "method_declaration" | "constructor_declaration" | "class_body" | "program" => {
                return false
            }
            _ => {}
        }
    }
    false
}

/// Run the extractor over every chain root in a parsed file.
///
/// Roots are processed independently; a root whose locations cannot be mapped yields nothing
/// without affecting the others.
pub fn extract_routes_from_tree(
    root: Node<'_>,
    doc: &TextDocument,
    classifier: &dyn CallClassifier,
) -> Vec<RouteDefinition> {
    let extractor = RouteExtractor::new(classifier);
    let mut routes = Vec::new();
    for chain in find_router_chains(root, doc, classifier) {
        let found = extractor.extract_all_routes(chain, doc);
        tracing::debug!(
            target: TARGET,
            uri = doc.uri(),
            line = chain.node().start_position().row + 1,
            routes = found.len(),
            "extracted router chain"
        );
        routes.extend(found);
    }
    routes
}

pub fn extract_routes_from_source(
    uri: &str,
    text: &str,
    classifier: &dyn CallClassifier,
) -> Result<Vec<RouteDefinition>, WebFnError> {
    let tree = parse_java(text).map_err(|message| WebFnError::Parse {
        uri: uri.to_string(),
        message,
    })?;
    let doc = TextDocument::new(uri, text);
    Ok(extract_routes_from_tree(tree.root_node(), &doc, classifier))
}

/// Extract routes from every `*.java` file under `project_root`.
///
/// Directories whose name is in `excluded_dirs` are not entered. Files that cannot be read or
/// parsed are skipped. Only files with at least one route are returned, as
/// `(path relative to project_root, routes)` sorted by path.
pub fn extract_routes_in_dir(
    project_root: impl AsRef<Path>,
    classifier: &dyn CallClassifier,
    excluded_dirs: &[String],
) -> Result<Vec<(PathBuf, Vec<RouteDefinition>)>, WebFnError> {
    let project_root = project_root.as_ref();
    let walker = WalkDir::new(project_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !excluded_dirs
                    .iter()
                    .any(|excluded| entry.file_name().to_str() == Some(excluded.as_str()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| WebFnError::Io {
            path: err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| project_root.to_path_buf()),
            source: err.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("java") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();

    let mut out = Vec::new();
    for path in files {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(target: TARGET, path = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        let uri = path.display().to_string();
        let routes = match extract_routes_from_source(&uri, &text, classifier) {
            Ok(routes) => routes,
            Err(err) => {
                tracing::debug!(target: TARGET, path = %path.display(), error = %err, "skipping file");
                continue;
            }
        };
        if routes.is_empty() {
            continue;
        }
        let relative = path
            .strip_prefix(project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        out.push((relative, routes));
    }
    Ok(out)
}
