//! Predicates accumulated by enclosing nesting combinators.

use std::ops::{Deref, DerefMut};

use crate::model::RouteElement;

/// Stack state for one `extract_all_routes` call.
///
/// Each entry belongs to one active nesting level. Entries can only be added through
/// [`ExtractionContext::enter`], whose guard removes them again when it goes out of scope, so the
/// stacks are balanced on every exit path of a subtree traversal.
#[derive(Debug, Default)]
pub struct ExtractionContext {
    path_prefixes: Vec<RouteElement>,
    accept_types: Vec<Vec<RouteElement>>,
    content_types: Vec<Vec<RouteElement>>,
    versions: Vec<RouteElement>,
    methods: Vec<Vec<RouteElement>>,
    nesting_level: usize,
}

/// The facets one nesting combinator contributes to its subtree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NestFacets {
    pub path: Option<RouteElement>,
    pub accept_types: Vec<RouteElement>,
    pub content_types: Vec<RouteElement>,
    pub version: Option<RouteElement>,
    pub methods: Vec<RouteElement>,
}

impl NestFacets {
    pub fn path(prefix: RouteElement) -> Self {
        Self {
            path: Some(prefix),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_none()
            && self.accept_types.is_empty()
            && self.content_types.is_empty()
            && self.version.is_none()
            && self.methods.is_empty()
    }
}

impl ExtractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push every non-empty facet and return a guard that pops them on drop.
    ///
    /// The guard dereferences to the context; recursion into the nested subtree goes through it.
    pub fn enter(&mut self, facets: NestFacets) -> ContextScope<'_> {
        let mut pushed = Pushed::default();
        if let Some(path) = facets.path {
            self.path_prefixes.push(path);
            pushed.path = true;
        }
        if !facets.accept_types.is_empty() {
            self.accept_types.push(facets.accept_types);
            pushed.accept = true;
        }
        if !facets.content_types.is_empty() {
            self.content_types.push(facets.content_types);
            pushed.content = true;
        }
        if let Some(version) = facets.version {
            self.versions.push(version);
            pushed.version = true;
        }
        if !facets.methods.is_empty() {
            self.methods.push(facets.methods);
            pushed.methods = true;
        }
        if pushed.any() {
            self.nesting_level += 1;
        }

        ContextScope {
            context: self,
            pushed,
        }
    }

    /// Context prefixes followed by `local` when it is non-empty.
    pub fn all_path_elements(&self, local: Option<&RouteElement>) -> Vec<RouteElement> {
        let mut elements = self.path_prefixes.clone();
        if let Some(local) = local.filter(|local| !local.element.is_empty()) {
            elements.push(local.clone());
        }
        elements
    }

    pub fn path_prefixes(&self) -> &[RouteElement] {
        &self.path_prefixes
    }

    pub fn current_accept_types(&self) -> Vec<RouteElement> {
        self.accept_types.iter().flatten().cloned().collect()
    }

    pub fn current_content_types(&self) -> Vec<RouteElement> {
        self.content_types.iter().flatten().cloned().collect()
    }

    /// The innermost enclosing version.
    pub fn current_version(&self) -> Option<&RouteElement> {
        self.versions.last()
    }

    pub fn current_methods(&self) -> Vec<RouteElement> {
        self.methods.iter().flatten().cloned().collect()
    }

    pub fn nesting_level(&self) -> usize {
        self.nesting_level
    }

    /// Total number of stack entries across all facets.
    pub fn depth(&self) -> usize {
        self.path_prefixes.len()
            + self.accept_types.len()
            + self.content_types.len()
            + self.versions.len()
            + self.methods.len()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Pushed {
    path: bool,
    accept: bool,
    content: bool,
    version: bool,
    methods: bool,
}

impl Pushed {
    fn any(&self) -> bool {
        self.path || self.accept || self.content || self.version || self.methods
    }
}

/// Scope guard returned by [`ExtractionContext::enter`].
#[derive(Debug)]
pub struct ContextScope<'c> {
    context: &'c mut ExtractionContext,
    pushed: Pushed,
}

impl Deref for ContextScope<'_> {
    type Target = ExtractionContext;

    fn deref(&self) -> &ExtractionContext {
        self.context
    }
}

impl DerefMut for ContextScope<'_> {
    fn deref_mut(&mut self) -> &mut ExtractionContext {
        self.context
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        // Reverse push order.
        let ctx = &mut *self.context;
        if self.pushed.any() {
            ctx.nesting_level -= 1;
        }
        if self.pushed.methods {
            ctx.methods.pop();
        }
        if self.pushed.version {
            ctx.versions.pop();
        }
        if self.pushed.content {
            ctx.content_types.pop();
        }
        if self.pushed.accept {
            ctx.accept_types.pop();
        }
        if self.pushed.path {
            ctx.path_prefixes.pop();
        }
    }
}
