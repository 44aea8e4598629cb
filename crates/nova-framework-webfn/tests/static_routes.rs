use nova_framework_parse::parse_java;
use nova_core::TextDocument;
use nova_framework_webfn::{
    extract_routes_from_source, find_router_chains, ClassifierKind, ExtractionContext, NestFacets,
    RouteDefinition, RouteElement, RouteExtractor,
};
use pretty_assertions::assert_eq;

fn source(body: &str) -> String {
    format!("class Routes {{\n  Object routes() {{\n    return {body};\n  }}\n}}\n")
}

fn routes(body: &str) -> Vec<RouteDefinition> {
    extract_routes_from_source(
        "file:///Routes.java",
        &source(body),
        ClassifierKind::Simple.classifier(),
    )
    .expect("parse")
}

fn values(elements: &[RouteElement]) -> Vec<&str> {
    elements.iter().map(RouteElement::as_str).collect()
}

fn paths_and_methods(routes: &[RouteDefinition]) -> Vec<(String, Vec<&str>)> {
    routes
        .iter()
        .map(|r| (r.full_path().unwrap_or_default(), r.method_names()))
        .collect()
}

#[test]
fn multiple_static_routes_in_source_order() {
    let routes = routes(
        r#"route(GET("/hello").and(accept(TEXT_PLAIN)), h::a).andRoute(POST("/echo"), h::b)"#,
    );

    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].full_path().as_deref(), Some("/hello"));
    assert_eq!(routes[0].method_names(), vec!["GET"]);
    assert_eq!(values(&routes[0].accept_types), vec!["TEXT_PLAIN"]);
    assert_eq!(routes[0].handler_method.as_deref(), Some("a"));

    assert_eq!(routes[1].full_path().as_deref(), Some("/echo"));
    assert_eq!(routes[1].method_names(), vec!["POST"]);
    assert!(routes[1].accept_types.is_empty());
    assert_eq!(routes[1].handler_method.as_deref(), Some("b"));
}

#[test]
fn nest_prefixes_the_path() {
    let routes = routes(r#"nest(path("/person"), route(GET("/{id}"), h::get))"#);

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].full_path().as_deref(), Some("/person/{id}"));
    assert_eq!(values(&routes[0].path_elements), vec!["/person", "/{id}"]);
    assert_eq!(routes[0].nesting_level, 1);
}

#[test]
fn and_siblings_do_not_share_nested_context() {
    let routes = routes(
        r#"nest(path("/a"), route(GET("/x"), h::x))
            .and(nest(path("/b").and(accept(APPLICATION_JSON)), route(GET("/y"), h::y)))"#,
    );

    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].full_path().as_deref(), Some("/a/x"));
    assert!(routes[0].accept_types.is_empty());
    assert_eq!(routes[1].full_path().as_deref(), Some("/b/y"));
    assert_eq!(values(&routes[1].accept_types), vec!["APPLICATION_JSON"]);
}

#[test]
fn nested_accept_and_inherited_paths() {
    let routes = routes(
        r#"nest(accept(APPLICATION_JSON),
            nest(path("/person"),
                route(GET("/{id}"), handler::getPerson)
                .andRoute(method(HttpMethod.GET), handler::listPeople)
            ).andRoute(POST("/").and(contentType(APPLICATION_JSON)), handler::createPerson))"#,
    );

    assert_eq!(
        paths_and_methods(&routes),
        vec![
            ("/person/{id}".to_string(), vec!["GET"]),
            ("/person".to_string(), vec!["GET"]),
            ("/".to_string(), vec!["POST"]),
        ]
    );
    assert!(routes
        .iter()
        .all(|r| values(&r.accept_types) == vec!["APPLICATION_JSON"]));
    assert_eq!(values(&routes[2].content_types), vec!["APPLICATION_JSON"]);
    assert_eq!(
        routes.iter().map(|r| r.nesting_level).collect::<Vec<_>>(),
        vec![2, 2, 1]
    );
}

#[test]
fn deeply_nested_combinations() {
    let routes = routes(
        r#"nest(path("/person"),
            nest(path("/sub1"),
              nest(path("/sub2"),
                nest(accept(APPLICATION_JSON),
                  route(GET("/{id}"), handler::getPerson)
                  .andRoute(method(HttpMethod.GET), handler::listPeople))
                .andRoute(GET("/nestedGet"), handler::getPerson))
              .and(nest(path("/andNestPath"),
                route(GET("/andNestPathGET"), handler::getPerson))))
            .andRoute(POST("/").and(contentType(APPLICATION_JSON)), handler::createPerson))
          .and(nest(method(HttpMethod.DELETE), route(path("/nestedDelete"), handler::deletePerson)))"#,
    );

    assert_eq!(
        paths_and_methods(&routes),
        vec![
            ("/person/sub1/sub2/{id}".to_string(), vec!["GET"]),
            ("/person/sub1/sub2".to_string(), vec!["GET"]),
            ("/person/sub1/sub2/nestedGet".to_string(), vec!["GET"]),
            ("/person/sub1/andNestPath/andNestPathGET".to_string(), vec!["GET"]),
            ("/person/".to_string(), vec!["POST"]),
            ("/nestedDelete".to_string(), vec!["DELETE"]),
        ]
    );
    assert!(routes[2].accept_types.is_empty());
    assert_eq!(routes[5].handler_method.as_deref(), Some("deletePerson"));
}

#[test]
fn combined_nest_predicates_keep_source_order() {
    let routes = routes(
        r#"nest(path("/a").and(path("/b")).and(accept(JSON)).and(accept(XML)), route(GET("/x"), h::x))"#,
    );

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].full_path().as_deref(), Some("/a/x"));
    assert_eq!(values(&routes[0].accept_types), vec!["JSON", "XML"]);
}

#[test]
fn nests_without_a_path_still_count_as_levels() {
    let routes = routes(r#"nest(accept(JSON), nest(path("/p"), route(GET("/x"), h::x)))"#);

    assert_eq!(routes.len(), 1);
    assert_eq!(values(&routes[0].path_elements), vec!["/p", "/x"]);
    assert_eq!(routes[0].nesting_level, 2);
}

#[test]
fn versions_and_unknown_predicates() {
    let routes = routes(
        r#"nest(version("1"),
            route(GET("/a").and(headers(h -> true)), h::a)
            .andRoute(GET("/b").and(version("2")), h::b))"#,
    );

    assert_eq!(
        routes
            .iter()
            .map(|r| r.version.as_ref().map(RouteElement::as_str))
            .collect::<Vec<_>>(),
        vec![Some("1"), Some("2")]
    );
    assert_eq!(
        routes[0].predicates.get("headers").map(RouteElement::as_str),
        Some("h -> true")
    );
    assert!(routes[0].to_string().contains("Predicate: headers(h -> true)"));
}

#[test]
fn context_is_balanced_after_extraction() {
    let src = source(r#"nest(path("/a"), nest(accept(X), route(GET("/x"), h::x))).and(route(GET("/y"), h::y))"#);
    let tree = parse_java(&src).expect("parse");
    let doc = TextDocument::new("file:///Routes.java", src.clone());
    let classifier = ClassifierKind::Simple.classifier();
    let root = find_router_chains(tree.root_node(), &doc, classifier)[0];
    let extractor = RouteExtractor::new(classifier);

    let mut context = ExtractionContext::new();
    let mut outer = context.enter(NestFacets::path(RouteElement::synthesized("/outer")));
    let depth_before = outer.depth();
    let routes = extractor
        .extract_routes_in_context(root, &doc, &mut outer)
        .expect("extract");
    assert_eq!(outer.depth(), depth_before);
    assert_eq!(outer.nesting_level(), 1);
    drop(outer);
    assert_eq!(context.depth(), 0);

    assert_eq!(
        paths_and_methods(&routes),
        vec![
            ("/outer/a/x".to_string(), vec!["GET"]),
            ("/outer/y".to_string(), vec!["GET"]),
        ]
    );
    assert_eq!(routes[0].nesting_level, 3);
}

#[test]
fn extraction_is_idempotent() {
    let src = source(r#"nest(path("/a"), route(GET("/x"), h::x).andRoute(POST("/y"), h::y))"#);
    let tree = parse_java(&src).expect("parse");
    let doc = TextDocument::new("file:///Routes.java", src.clone());
    let classifier = ClassifierKind::Simple.classifier();
    let root = find_router_chains(tree.root_node(), &doc, classifier)[0];
    let extractor = RouteExtractor::new(classifier);

    let first = extractor.extract_all_routes(root, &doc);
    let second = extractor.extract_all_routes(root, &doc);
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}
