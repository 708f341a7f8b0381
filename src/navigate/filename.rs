//! Filename derivation for fetched downloads.
//!
//! Presigned links carry the storage key in the path and usually a
//! `Content-Disposition` header; either can name the saved file.

use std::path::{Component, Path, PathBuf};

use url::Url;

/// Extracts a filename from a `Content-Disposition` header value.
///
/// Accepts `filename*=UTF-8''...` (RFC 5987), `filename="..."` and bare
/// `filename=...`, preferring the encoded form.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + "filename*=".len()..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                return Some(decoded.into_owned());
            }
        }
    }

    let pos = header.find("filename=")?;
    let value = header[pos + "filename=".len()..].trim();
    if let Some(stripped) = value.strip_prefix('"') {
        return stripped.find('"').map(|end| stripped[..end].to_string());
    }
    let end = value.find(';').unwrap_or(value.len());
    let name = value[..end].trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Replaces characters that are invalid on common filesystems.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }
    if is_plain_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_plain_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Last non-empty path segment of `url`, percent-decoded and sanitized.
pub(crate) fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back().filter(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    Some(sanitize_filename(&decoded))
}

/// Returns `dir/filename`, or `dir/stem_N.ext` for the first free `N >= 1`.
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = {
        let sanitized = sanitize_filename(filename);
        if sanitized.trim_matches('_').is_empty() {
            "download.bin".to_string()
        } else {
            sanitized
        }
    };
    let base_path = dir.join(&filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };
    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_content_disposition_quoted() {
        assert_eq!(
            parse_content_disposition(r#"attachment; filename="dune.pdf""#),
            Some("dune.pdf".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_unquoted_with_trailer() {
        assert_eq!(
            parse_content_disposition("attachment; filename=dune.epub; size=10"),
            Some("dune.epub".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_rfc5987_wins() {
        assert_eq!(
            parse_content_disposition(
                "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''%E4%B8%89%E4%BD%93.pdf"
            ),
            Some("三体.pdf".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_missing() {
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn test_sanitize_filename_replaces_separators() {
        assert_eq!(sanitize_filename("a/b\\c:d.pdf"), "a_b_c_d.pdf");
    }

    #[test]
    fn test_sanitize_filename_rewrites_dot_segments() {
        assert_eq!(sanitize_filename(".."), "__");
        assert_eq!(sanitize_filename(""), "_");
    }

    #[test]
    fn test_filename_from_url_decodes_last_segment() {
        let url = Url::parse("https://bucket.s3.amazonaws.com/books/My%20Book.pdf?X-Amz-Expires=3600")
            .unwrap();
        assert_eq!(filename_from_url(&url), Some("My Book.pdf".to_string()));
    }

    #[test]
    fn test_filename_from_url_root_is_none() {
        let url = Url::parse("https://bucket.s3.amazonaws.com/").unwrap();
        assert_eq!(filename_from_url(&url), None);
    }

    #[test]
    fn test_resolve_unique_path_adds_suffix() {
        let dir = TempDir::new().unwrap();
        let first = resolve_unique_path(dir.path(), "a.pdf");
        assert_eq!(first, dir.path().join("a.pdf"));
        std::fs::write(&first, b"x").unwrap();
        let second = resolve_unique_path(dir.path(), "a.pdf");
        assert_eq!(second, dir.path().join("a_1.pdf"));
    }

    #[test]
    fn test_resolve_unique_path_stays_in_dir() {
        let dir = TempDir::new().unwrap();
        let path = resolve_unique_path(dir.path(), "../../etc/passwd");
        assert_eq!(path.parent().unwrap(), dir.path());
    }
}
