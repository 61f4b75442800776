use std::path::PathBuf;

use super::{CatalogError, PageSource};

/// Catalog pages stored on disk as `<root>/<catalog_id>/page-<n>.json`, in the
/// same shape the HTTP API returns.
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn page_path(&self, catalog_id: &str, page: u32) -> PathBuf {
        self.root
            .join(catalog_id)
            .join(format!("page-{}.json", page))
    }
}

impl PageSource for DirCatalog {
    fn fetch_page(&self, catalog_id: &str, page: u32) -> Result<String, CatalogError> {
        Ok(std::fs::read_to_string(self.page_path(catalog_id, page))?)
    }
}
