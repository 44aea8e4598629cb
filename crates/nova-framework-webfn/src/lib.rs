//! Route extraction for Spring functional routing (`RouterFunctions`, WebFlux and WebMvc.fn).
//!
//! Router definitions are ordinary Java call chains:
//!
//! ```java
//! return RouterFunctions.route()
//!     .path("/person", b -> b
//!         .GET("/{id}", accept(APPLICATION_JSON), handler::getPerson)
//!         .POST(handler::createPerson))
//!     .build();
//! ```
//!
//! [`RouteExtractor`] walks one such chain (builder or static style) and produces a flat,
//! source-ordered list of [`RouteDefinition`]s with the effective path, HTTP methods, media types,
//! version and handler of each registration. Which calls count as router API calls is decided by
//! a [`CallClassifier`]: [`SimpleCallClassifier`] matches method names, [`PreciseCallClassifier`]
//! resolves the declaring type from the compilation unit.
//!
//! [`extract_routes_from_source`] and [`extract_routes_in_dir`] locate the chains themselves.

mod classifier;
mod context;
mod discovery;
mod error;
mod extractor;
mod media;
mod model;
mod predicate;
mod resolve;
mod symbol;
mod syntax;

pub use classifier::{CallClassifier, ClassifierKind, PreciseCallClassifier, SimpleCallClassifier};
pub use context::{ContextScope, ExtractionContext, NestFacets};
pub use discovery::{
    extract_routes_from_source, extract_routes_from_tree, extract_routes_in_dir,
    find_router_chains,
};
pub use error::{ExtractError, WebFnError};
pub use extractor::RouteExtractor;
pub use media::media_type_value;
pub use model::{combine_paths, RouteDefinition, RouteElement};
pub use predicate::{
    analyze_request_predicate, extract_methods, extract_path, extract_predicate_info,
    extract_version, is_http_method, predicate_handler, traverse_predicate_chain,
    PredicateHandler, HTTP_METHODS,
};
pub use symbol::{route_symbol, RouteIndexEntry, RouteSymbol};
pub use syntax::{Expr, Lambda, MethodCall};
