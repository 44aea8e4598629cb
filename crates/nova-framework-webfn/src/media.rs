/// `MediaType` constant names and the MIME types they stand for.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("ALL", "*/*"),
    ("APPLICATION_ATOM_XML", "application/atom+xml"),
    ("APPLICATION_CBOR", "application/cbor"),
    ("APPLICATION_FORM_URLENCODED", "application/x-www-form-urlencoded"),
    ("APPLICATION_GRAPHQL_RESPONSE", "application/graphql-response+json"),
    ("APPLICATION_JSON", "application/json"),
    ("APPLICATION_NDJSON", "application/x-ndjson"),
    ("APPLICATION_JSON_UTF8", "application/json;charset=UTF-8"),
    ("APPLICATION_OCTET_STREAM", "application/octet-stream"),
    ("APPLICATION_PDF", "application/pdf"),
    ("APPLICATION_PROBLEM_JSON", "application/problem+json"),
    ("APPLICATION_PROBLEM_JSON_UTF8", "application/problem+json;charset=UTF-8"),
    ("APPLICATION_PROBLEM_XML", "application/problem+xml"),
    ("APPLICATION_PROTOBUF", "application/x-protobuf"),
    ("APPLICATION_RSS_XML", "application/rss+xml"),
    ("APPLICATION_STREAM_JSON", "application/stream+json"),
    ("APPLICATION_XHTML_XML", "application/xhtml+xml"),
    ("APPLICATION_XML", "application/xml"),
    ("APPLICATION_YAML", "application/yaml"),
    ("IMAGE_GIF", "image/gif"),
    ("IMAGE_JPEG", "image/jpeg"),
    ("IMAGE_PNG", "image/png"),
    ("MULTIPART_FORM_DATA", "multipart/form-data"),
    ("MULTIPART_MIXED", "multipart/mixed"),
    ("MULTIPART_RELATED", "multipart/related"),
    ("TEXT_EVENT_STREAM", "text/event-stream"),
    ("TEXT_HTML", "text/html"),
    ("TEXT_MARKDOWN", "text/markdown"),
    ("TEXT_PLAIN", "text/plain"),
    ("TEXT_XML", "text/xml"),
];

/// MIME type for a `MediaType` constant name (`APPLICATION_JSON` → `application/json`).
///
/// Anything else (string literals, other constants) is returned unchanged.
pub fn media_type_value(name: &str) -> &str {
    let constant = name.strip_prefix("MediaType.").unwrap_or(name);
    MEDIA_TYPES
        .iter()
        .find(|(known, _)| *known == constant)
        .map(|(_, mime)| *mime)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_constants() {
        assert_eq!(media_type_value("APPLICATION_JSON"), "application/json");
        assert_eq!(media_type_value("MediaType.TEXT_PLAIN"), "text/plain");
        assert_eq!(media_type_value("ALL"), "*/*");
    }

    #[test]
    fn passes_unknown_values_through() {
        assert_eq!(media_type_value("application/vnd.api+json"), "application/vnd.api+json");
        assert_eq!(media_type_value("CUSTOM_TYPE"), "CUSTOM_TYPE");
    }
}
