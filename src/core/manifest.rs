//! Grid manifests: ordered `[[item]]` tables in a TOML file.
//!
//! ```toml
//! [[item]]
//! thumb = "thumbs/1.jpg"
//! largesrc = "images/1.jpg"
//! title = "Veggies sunt bona vobis"
//! description = "Komatsuna prairie turnip wattle seed."
//! url = "https://example.com/veggies"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::item::ItemPayload;
use super::source::{self, SourceError};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Location(#[from] SourceError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    item: Vec<ManifestItem>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestItem {
    thumb: String,
    largesrc: String,
    title: String,
    description: String,
    #[serde(default)]
    url: Option<String>,
}

impl From<ManifestItem> for ItemPayload {
    fn from(item: ManifestItem) -> Self {
        ItemPayload {
            thumb: item.thumb,
            largesrc: item.largesrc,
            title: item.title,
            description: item.description,
            url: item.url,
        }
    }
}

/// A parsed manifest and the location its relative sources resolve against.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub document: Url,
    pub items: Vec<ItemPayload>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = source::document_for_file(path)?;
        Self::parse(&text, path, document)
    }

    /// Parse manifest text; `path` only names the file in errors.
    pub fn parse(text: &str, path: &Path, document: Url) -> Result<Self, ManifestError> {
        let file: ManifestFile = toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            document,
            items: file.item.into_iter().map(ItemPayload::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Url {
        Url::parse("file:///gallery/grid.toml").unwrap()
    }

    #[test]
    fn items_keep_their_order() {
        let text = r#"
            [[item]]
            thumb = "t/1.jpg"
            largesrc = "l/1.jpg"
            title = "One"
            description = "first"
            url = "https://example.com/1"

            [[item]]
            thumb = "t/2.jpg"
            largesrc = "l/2.jpg"
            title = "Two"
            description = "second"
        "#;

        let manifest = Manifest::parse(text, Path::new("grid.toml"), doc()).unwrap();

        let titles: Vec<&str> = manifest.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two"]);
        assert_eq!(manifest.items[1].url, None);
        assert_eq!(manifest.document, doc());
    }

    #[test]
    fn empty_manifest_is_valid() {
        let manifest = Manifest::parse("", Path::new("grid.toml"), doc()).unwrap();
        assert!(manifest.items.is_empty());
    }

    #[test]
    fn missing_field_names_the_file() {
        let text = r#"
            [[item]]
            thumb = "t/1.jpg"
            title = "One"
            description = "first"
        "#;

        let err = Manifest::parse(text, Path::new("grid.toml"), doc()).unwrap_err();

        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().contains("grid.toml"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = r#"
            [[item]]
            thumb = "t/1.jpg"
            largesrc = "l/1.jpg"
            title = "One"
            description = "first"
            colour = "red"
        "#;

        assert!(Manifest::parse(text, Path::new("grid.toml"), doc()).is_err());
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let err = Manifest::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
