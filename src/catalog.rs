//! Catalog records decoded from API payloads.
//!
//! Book objects arrive with inconsistent key casing (`BookId` from the table,
//! `bookId` / `id` from older clients), so fields are looked up through a
//! precedence list instead of a fixed serde schema.

use serde::Deserialize;
use serde_json::Value;

/// Key precedence for the book id.
pub const ID_KEYS: [&str; 3] = ["BookId", "bookId", "id"];
/// Key precedence for the title.
pub const TITLE_KEYS: [&str; 2] = ["Title", "title"];
/// Key precedence for the author.
pub const AUTHOR_KEYS: [&str; 2] = ["Author", "author"];
/// Key precedence for the description.
pub const DESCRIPTION_KEYS: [&str; 2] = ["Description", "description"];

/// Text shown when a field is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholders {
    /// Missing title.
    pub title: &'static str,
    /// Missing author.
    pub author: &'static str,
    /// Missing description.
    pub description: &'static str,
}

/// One book as displayed. Fields are raw text, not yet escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Backend identifier; empty when the record carries none.
    pub id: String,
    /// Title or placeholder.
    pub title: String,
    /// Author or placeholder.
    pub author: String,
    /// Description or placeholder.
    pub description: String,
}

impl Book {
    /// Builds a book from one array element, filling gaps from `placeholders`.
    ///
    /// Non-object values yield a book made entirely of placeholders.
    #[must_use]
    pub fn from_value(record: &Value, placeholders: &Placeholders) -> Self {
        Self {
            id: field_text(record, &ID_KEYS).unwrap_or_default(),
            title: field_text(record, &TITLE_KEYS)
                .unwrap_or_else(|| placeholders.title.to_string()),
            author: field_text(record, &AUTHOR_KEYS)
                .unwrap_or_else(|| placeholders.author.to_string()),
            description: field_text(record, &DESCRIPTION_KEYS)
                .unwrap_or_else(|| placeholders.description.to_string()),
        }
    }
}

/// Returns the first truthy value among `keys`, rendered as text.
#[must_use]
pub fn field_text(record: &Value, keys: &[&str]) -> Option<String> {
    let object = record.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| is_truthy(value))
        .map(value_text)
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Payload of `GET /books/{id}/download`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadLink {
    /// Presigned URL to navigate to, used verbatim.
    pub download_url: String,
    /// Seconds until the link expires.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Echo of the requested id.
    #[serde(default)]
    pub book_id: Option<String>,
    /// Storage key of the file behind the link.
    #[serde(default)]
    pub file_key: Option<String>,
}

impl DownloadLink {
    /// Extracts a link from a payload; `None` when `download_url` is missing,
    /// empty, or not a string.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let url = payload.get("download_url")?.as_str()?;
        if url.is_empty() {
            return None;
        }
        match Self::deserialize(payload) {
            Ok(link) => Some(link),
            // Optional fields of an unexpected type must not hide a usable URL.
            Err(_) => Some(Self {
                download_url: url.to_string(),
                expires_in: None,
                book_id: None,
                file_key: None,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const PLACEHOLDERS: Placeholders = Placeholders {
        title: "Untitled",
        author: "Anonymous",
        description: "None",
    };

    #[test]
    fn test_from_value_prefers_capitalized_keys() {
        let record = json!({
            "BookId": "B1", "bookId": "b1", "id": "1",
            "Title": "Dune", "title": "dune",
            "Author": "Herbert", "author": "herbert",
            "Description": "Spice", "description": "spice"
        });
        let book = Book::from_value(&record, &PLACEHOLDERS);
        assert_eq!(book.id, "B1");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.description, "Spice");
    }

    #[test]
    fn test_from_value_skips_empty_variant() {
        let record = json!({ "BookId": "", "bookId": "", "id": "fallback", "Title": "", "title": "lower" });
        let book = Book::from_value(&record, &PLACEHOLDERS);
        assert_eq!(book.id, "fallback");
        assert_eq!(book.title, "lower");
    }

    #[test]
    fn test_from_value_missing_fields_use_placeholders() {
        let book = Book::from_value(&json!({}), &PLACEHOLDERS);
        assert_eq!(book.id, "");
        assert_eq!(book.title, "Untitled");
        assert_eq!(book.author, "Anonymous");
        assert_eq!(book.description, "None");
    }

    #[test]
    fn test_from_value_non_object_is_all_placeholders() {
        let book = Book::from_value(&json!("just a string"), &PLACEHOLDERS);
        assert_eq!(book.title, "Untitled");
        assert_eq!(book.id, "");
    }

    #[test]
    fn test_from_value_stringifies_numbers() {
        let book = Book::from_value(&json!({ "id": 42, "Title": true }), &PLACEHOLDERS);
        assert_eq!(book.id, "42");
        assert_eq!(book.title, "true");
    }

    #[test]
    fn test_from_value_zero_id_is_falsy() {
        let book = Book::from_value(&json!({ "BookId": 0, "id": "z" }), &PLACEHOLDERS);
        assert_eq!(book.id, "z");
    }

    #[test]
    fn test_is_truthy_table() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_download_link_full_payload() {
        let payload = json!({
            "download_url": "https://bucket.s3.amazonaws.com/a.pdf?X-Amz-Signature=abc%2B",
            "expires_in": 3600,
            "book_id": "B1",
            "file_key": "books/a.pdf"
        });
        let link = DownloadLink::from_payload(&payload).unwrap();
        assert_eq!(
            link.download_url,
            "https://bucket.s3.amazonaws.com/a.pdf?X-Amz-Signature=abc%2B"
        );
        assert_eq!(link.expires_in, Some(3600));
        assert_eq!(link.file_key.as_deref(), Some("books/a.pdf"));
    }

    #[test]
    fn test_download_link_missing_url() {
        assert!(DownloadLink::from_payload(&json!({ "message": "Book not found" })).is_none());
        assert!(DownloadLink::from_payload(&json!({ "download_url": "" })).is_none());
        assert!(DownloadLink::from_payload(&json!({ "download_url": 7 })).is_none());
        assert!(DownloadLink::from_payload(&json!(null)).is_none());
    }

    #[test]
    fn test_download_link_tolerates_odd_optional_fields() {
        let payload = json!({ "download_url": "https://x/y", "expires_in": "soon" });
        let link = DownloadLink::from_payload(&payload).unwrap();
        assert_eq!(link.download_url, "https://x/y");
        assert_eq!(link.expires_in, None);
    }
}
