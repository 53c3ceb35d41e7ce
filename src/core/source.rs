//! Image source resolution against the document location.

use std::path::Path;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("image source is empty")]
    Empty,

    #[error("cannot resolve `{raw}` against {base}: {reason}")]
    Unresolvable {
        raw: String,
        base: String,
        reason: String,
    },

    #[error("cannot build a document location from {0}")]
    InvalidDocument(String),
}

/// Resolve `raw` to an absolute URL.  Absolute sources pass through
/// unchanged; anything else is joined onto `document`.
pub fn resolve(raw: &str, document: &Url) -> Result<Url, SourceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SourceError::Empty);
    }
    if let Ok(absolute) = Url::parse(raw) {
        return Ok(absolute);
    }
    document.join(raw).map_err(|e| SourceError::Unresolvable {
        raw: raw.to_string(),
        base: document.to_string(),
        reason: e.to_string(),
    })
}

/// Document location for a manifest file: the file's own `file://` URL.
pub fn document_for_file(path: &Path) -> Result<Url, SourceError> {
    let abs = std::path::absolute(path)
        .map_err(|_| SourceError::InvalidDocument(path.display().to_string()))?;
    Url::from_file_path(&abs).map_err(|_| SourceError::InvalidDocument(abs.display().to_string()))
}

/// Document location for a directory source (trailing slash, so that
/// relative joins land inside it).
pub fn document_for_dir(path: &Path) -> Result<Url, SourceError> {
    let abs = std::path::absolute(path)
        .map_err(|_| SourceError::InvalidDocument(path.display().to_string()))?;
    Url::from_directory_path(&abs)
        .map_err(|_| SourceError::InvalidDocument(abs.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Url {
        Url::parse("file:///srv/gallery/grid.toml").unwrap()
    }

    #[test]
    fn relative_source_resolves_next_to_document() {
        let url = resolve("images/1.jpg", &doc()).unwrap();
        assert_eq!(url.as_str(), "file:///srv/gallery/images/1.jpg");
    }

    #[test]
    fn parent_relative_source_walks_up() {
        let url = resolve("../shared/2.png", &doc()).unwrap();
        assert_eq!(url.as_str(), "file:///srv/shared/2.png");
    }

    #[test]
    fn absolute_http_source_passes_through() {
        let url = resolve("https://example.com/big/3.jpg", &doc()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/big/3.jpg");
    }

    #[test]
    fn root_relative_source_keeps_scheme() {
        let url = resolve("/pics/4.jpg", &doc()).unwrap();
        assert_eq!(url.as_str(), "file:///pics/4.jpg");
    }

    #[test]
    fn empty_source_is_an_error() {
        assert_eq!(resolve("   ", &doc()), Err(SourceError::Empty));
    }

    #[test]
    fn same_source_resolves_identically() {
        // The stale-load guard compares resolved URLs for equality.
        assert_eq!(resolve("a.jpg", &doc()), resolve("./a.jpg", &doc()));
    }

    #[cfg(unix)]
    #[test]
    fn directory_document_joins_inside_it() {
        let base = document_for_dir(Path::new("/tmp/pics")).unwrap();
        assert_eq!(resolve("x.png", &base).unwrap().as_str(), "file:///tmp/pics/x.png");
    }
}
