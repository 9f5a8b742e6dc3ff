use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::core::Catalog;
use crate::error::{QuizError, Result};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog/data");

const EMBEDDED_FILE: &str = "items.json";

/// Anything that can hand the engine a catalog
pub trait CatalogSource {
    fn load(&self) -> Result<Catalog>;
}

/// The item list shipped inside the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

impl CatalogSource for EmbeddedCatalog {
    fn load(&self) -> Result<Catalog> {
        let file = DATA_DIR
            .get_file(EMBEDDED_FILE)
            .ok_or_else(|| QuizError::CatalogUnavailable(format!("{EMBEDDED_FILE} not bundled")))?;
        let json = file.contents_utf8().ok_or_else(|| {
            QuizError::CatalogUnavailable(format!("{EMBEDDED_FILE} is not valid utf-8"))
        })?;
        let catalog = Catalog::from_json(json)?;
        debug!(items = catalog.len(), "loaded embedded catalog");
        Ok(catalog)
    }
}

/// A user supplied JSON item list
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> Result<Catalog> {
        let json = fs::read_to_string(&self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "catalog file unreadable");
            QuizError::CatalogUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let catalog = Catalog::from_json(&json)?;
        debug!(path = %self.path.display(), items = catalog.len(), "loaded catalog file");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BinLabel;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn embedded_catalog_loads() {
        let catalog = EmbeddedCatalog.load().unwrap();

        assert!(catalog.len() >= 20);
        let needles = catalog
            .items()
            .iter()
            .find(|i| i.name == "Needles")
            .expect("needles in catalog");
        assert_eq!(needles.correct_bin, BinLabel::White);
    }

    #[test]
    fn file_catalog_reads_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(
            &path,
            r#"[{ "name": "Placenta", "image": "images/Placenta.webp", "bin": "yellow" }]"#,
        )
        .unwrap();

        let catalog = FileCatalog::new(&path).load().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items()[0].correct_bin, BinLabel::Yellow);
    }

    #[test]
    fn missing_file_is_catalog_unavailable() {
        let dir = tempdir().unwrap();
        let source = FileCatalog::new(dir.path().join("nope.json"));

        assert_matches!(source.load(), Err(QuizError::CatalogUnavailable(_)));
    }

    #[test]
    fn empty_file_list_is_empty_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, "[]").unwrap();

        assert_matches!(FileCatalog::new(&path).load(), Err(QuizError::EmptyCatalog));
    }
}
