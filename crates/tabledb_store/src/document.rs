//! Document and filter types.

/// A field value inside a document.
pub use serde_json::Value;

/// A document: an unordered set of named JSON fields.
///
/// The reserved `_id` field holds the store-assigned identity.
pub type Document = serde_json::Map<String, Value>;

/// An equality filter over named fields.
///
/// A document matches when every filter field is present in the document
/// with an equal value. The empty filter matches every document.
pub type Filter = Document;

/// Converts a `serde_json::Value` into a [`Document`].
///
/// Convenience for building documents from `json!` literals.
///
/// # Panics
///
/// Panics if `value` is not a JSON object. Intended for literals whose
/// shape is known at the call site.
#[must_use]
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Returns true if `doc` satisfies the equality `filter`.
#[must_use]
pub fn matches(doc: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| doc.get(field) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_matches_all() {
        let doc = document(json!({ "name": "ada", "age": 36 }));
        assert!(matches(&doc, &Filter::new()));
        assert!(matches(&Document::new(), &Filter::new()));
    }

    #[test]
    fn single_field_match() {
        let doc = document(json!({ "name": "ada", "age": 36 }));
        assert!(matches(&doc, &document(json!({ "name": "ada" }))));
        assert!(!matches(&doc, &document(json!({ "name": "grace" }))));
    }

    #[test]
    fn all_filter_fields_must_match() {
        let doc = document(json!({ "name": "ada", "age": 36 }));
        assert!(matches(&doc, &document(json!({ "name": "ada", "age": 36 }))));
        assert!(!matches(&doc, &document(json!({ "name": "ada", "age": 37 }))));
    }

    #[test]
    fn missing_field_never_matches() {
        let doc = document(json!({ "name": "ada" }));
        assert!(!matches(&doc, &document(json!({ "email": "ada@x.com" }))));
    }

    #[test]
    fn null_filter_requires_explicit_null() {
        let doc = document(json!({ "name": "ada", "nickname": null }));
        assert!(matches(&doc, &document(json!({ "nickname": null }))));
        assert!(!matches(&doc, &document(json!({ "missing": null }))));
    }
}
