//! Catalog loading from disk with a playable fallback.
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use typhoon_game::{CatalogError, CatalogSource, ChoiceCatalog};

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("could not read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Catalog JSON stored at a filesystem path.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalog {
    type Error = CatalogLoadError;

    fn load_catalog(&self) -> Result<ChoiceCatalog, Self::Error> {
        let text = fs::read_to_string(&self.path).map_err(|source| CatalogLoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(ChoiceCatalog::from_json(&text)?)
    }
}

/// Load from `source`, logging once and substituting an empty catalog on failure.
///
/// The empty catalog still offers the built-in fallback choices.
pub fn load_or_fallback<S: CatalogSource>(source: &S) -> ChoiceCatalog {
    match source.load_catalog() {
        Ok(catalog) => {
            log::info!("loaded choice catalog with {} choices", catalog.len());
            catalog
        }
        Err(err) => {
            log::warn!("choice catalog unavailable, using fallback choices: {err}");
            ChoiceCatalog::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use typhoon_game::EmbeddedCatalog;

    #[test]
    fn missing_file_falls_back_to_empty_catalog() {
        let source = FileCatalog::new("/definitely/not/here/choices.json");
        assert!(matches!(
            source.load_catalog(),
            Err(CatalogLoadError::Io { .. })
        ));
        assert!(load_or_fallback(&source).is_empty());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let path = std::env::temp_dir().join(format!(
            "typhoon-corrupt-{}.json",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"{ not json").unwrap();
        let source = FileCatalog::new(&path);
        assert!(matches!(
            source.load_catalog(),
            Err(CatalogLoadError::Catalog(CatalogError::Parse(_)))
        ));
        assert!(load_or_fallback(&source).is_empty());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn embedded_catalog_loads() {
        assert!(!load_or_fallback(&EmbeddedCatalog).is_empty());
    }
}
