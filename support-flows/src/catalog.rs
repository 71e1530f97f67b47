//! Catalog loading and the compact catalog view handed to the LLM.
//!
//! The catalog is read fresh on every call; there is no cache.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::CatalogError;
use crate::types::Product;

/// Source of the product catalog.
#[async_trait]
pub trait CatalogLoader: Send + Sync {
    /// Returns the full product list.
    ///
    /// # Errors
    /// Any failure to produce the list; callers treat it as "catalog unavailable".
    async fn load(&self) -> Result<Vec<Product>, CatalogError>;
}

/// Reads a JSON array of [`Product`] objects from disk.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogLoader for JsonFileCatalog {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: self.path.clone(),
                source,
            })?;

        let products: Vec<Product> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!(count = products.len(), "catalog loaded");
        Ok(products)
    }
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CatalogLoader for StaticCatalog {
    async fn load(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.clone())
    }
}

#[derive(Serialize)]
struct PromptProduct<'a> {
    name: &'a str,
    features: &'a str,
    category: &'a str,
}

/// Compact JSON array exposing only `name`, `features` and `category`.
///
/// # Errors
/// [`CatalogError::Encode`] if serialization fails.
pub fn catalog_for_prompt(products: &[Product]) -> Result<String, CatalogError> {
    let view: Vec<PromptProduct<'_>> = products
        .iter()
        .map(|p| PromptProduct {
            name: &p.name,
            features: &p.features,
            category: &p.category,
        })
        .collect();
    serde_json::to_string(&view).map_err(CatalogError::Encode)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Write;

    use super::*;

    fn thermostat() -> Product {
        let mut extra = BTreeMap::new();
        extra.insert("warranty".to_string(), serde_json::json!("2 years"));
        Product {
            id: "1".into(),
            name: "Smart Thermostat X1000".into(),
            features: "WiFi, scheduling".into(),
            category: "Home".into(),
            price: 199.0,
            extra,
        }
    }

    #[test]
    fn prompt_view_drops_id_price_and_extensions() {
        let s = catalog_for_prompt(&[thermostat()]).unwrap();
        assert_eq!(
            s,
            r#"[{"name":"Smart Thermostat X1000","features":"WiFi, scheduling","category":"Home"}]"#
        );
    }

    #[test]
    fn empty_catalog_renders_empty_array() {
        assert_eq!(catalog_for_prompt(&[]).unwrap(), "[]");
    }

    #[tokio::test]
    async fn json_file_catalog_reads_products() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let body = serde_json::to_string(&vec![thermostat()]).unwrap();
        file.write_all(body.as_bytes()).unwrap();

        let loaded = JsonFileCatalog::new(file.path()).load().await.unwrap();
        assert_eq!(loaded, vec![thermostat()]);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileCatalog::new(dir.path().join("nope.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"not\": \"a list\"}").unwrap();

        let err = JsonFileCatalog::new(file.path()).load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
