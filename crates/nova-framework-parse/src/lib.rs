use std::cell::RefCell;

use tree_sitter::{Node, Parser, Tree};

thread_local! {
    static JAVA_PARSER: RefCell<Result<Parser, String>> = RefCell::new({
        let mut parser = Parser::new();
        match parser.set_language(tree_sitter_java::language()) {
            Ok(()) => Ok(parser),
            Err(_) => Err("tree-sitter-java language load failed".to_string()),
        }
    });
}

/// Parse Java source text with `tree-sitter-java`.
pub fn parse_java(source: &str) -> Result<Tree, String> {
    JAVA_PARSER.with(|parser_cell| {
        let mut parser = parser_cell
            .try_borrow_mut()
            .map_err(|_| "tree-sitter parser is already in use".to_string())?;
        let parser = match parser.as_mut() {
            Ok(parser) => parser,
            Err(err) => return Err(err.clone()),
        };

        parser
            .parse(source, None)
            .ok_or_else(|| "tree-sitter failed to produce a syntax tree".to_string())
    })
}

/// Visit a node and all its descendants in pre-order.
pub fn visit_nodes<'a, F: FnMut(Node<'a>)>(node: Node<'a>, f: &mut F) {
    f(node);
    if node.child_count() == 0 {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_nodes(child, f);
    }
}

/// Named children of `node`, skipping comments.
///
/// Comments are "extras" in the Java grammar and may appear anywhere, e.g. between call
/// arguments.
pub fn code_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| !is_comment(*child))
        .collect();
    children
}

pub fn is_comment(node: Node<'_>) -> bool {
    node.kind().ends_with("comment")
}

/// Iterate over the strict ancestors of `node`, innermost first.
pub fn ancestors(node: Node<'_>) -> impl Iterator<Item = Node<'_>> {
    std::iter::successors(node.parent(), |n| n.parent())
}

/// Return the byte slice for `node` within `source`.
///
/// Returns an empty string when the node does not fit `source` (for example when the tree was
/// produced from a different snapshot).
pub fn node_text<'a>(source: &'a str, node: Node<'_>) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Collapse every whitespace run to a single space, dropping whitespace next to punctuation.
///
/// Used to print expressions (media types, lambdas, predicate arguments) independently of how
/// they were laid out in the source.
pub fn normalize_expression(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            let prev = out.chars().next_back();
            if prev.is_some_and(is_word_char) && is_word_char(ch)
                || prev.is_some_and(|p| matches!(p, ',' | '>' | '{' | '}') || p == '-' && ch == '>')
                || matches!(ch, '{' | '}' | '-')
            {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '"'
}

/// Decode the value of a Java `string_literal` node's source text.
///
/// Handles regular literals and text blocks. Common escape sequences (including `\uXXXX`) are
/// decoded; unknown escapes are kept verbatim.
pub fn string_literal_value(literal: &str) -> Option<String> {
    let literal = literal.trim();
    let body = if let Some(block) = literal
        .strip_prefix("\"\"\"")
        .and_then(|rest| rest.strip_suffix("\"\"\""))
    {
        return Some(text_block_value(block));
    } else {
        literal.strip_prefix('"')?.strip_suffix('"')?
    };
    Some(unescape(body))
}

fn text_block_value(block: &str) -> String {
    // The opening delimiter is followed by a line terminator; content starts on the next line.
    let content = block
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or(block);
    let lines: Vec<&str> = content.lines().collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let stripped: Vec<&str> = lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or("").trim_end())
        .collect();
    unescape(&stripped.join("\n"))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Remove all whitespace from a type-like string.
pub fn clean_type(raw: &str) -> String {
    raw.split_whitespace().collect::<String>()
}

/// Simplify a type-like string down to its unqualified base type.
///
/// This strips whitespace, generic arguments, and trailing array suffixes.
pub fn simplify_type(raw: &str) -> String {
    let compact = clean_type(raw);
    let no_generics = strip_generic_args(&compact);
    let no_array = no_generics.trim_end_matches("[]");
    no_array.rsplit('.').next().unwrap_or(no_array).to_string()
}

/// Strip generic arguments and array suffixes but keep qualification (`a.b.Foo<X>[]` → `a.b.Foo`).
pub fn erase_type(raw: &str) -> String {
    let compact = clean_type(raw);
    strip_generic_args(&compact).trim_end_matches("[]").to_string()
}

fn strip_generic_args(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0u32;
    for ch in raw.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}
