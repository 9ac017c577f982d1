//! Catalog Service - tables and menu with in-memory caching
//!
//! The catalog is static reference data provisioned as a JSON file:
//!
//! ```json
//! { "tables": [ ... ], "menu": [ ... ] }
//! ```
//!
//! Everything is served from in-memory maps after load; the order layer
//! snapshots names and prices at command time, so a reload never rewrites
//! history.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use shared::models::{DiningTable, MenuItem};

/// Catalog file layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tables: Vec<DiningTable>,
    #[serde(default)]
    menu: Vec<MenuItem>,
}

/// Menu item metadata injected into AddItems processing
#[derive(Debug, Clone)]
pub struct MenuItemMeta {
    pub name: String,
    /// Unit price in currency minor units
    pub price: i64,
}

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Unified catalog service for tables and menu
#[derive(Clone, Default)]
pub struct CatalogService {
    /// Tables cache: table_id -> DiningTable
    tables: Arc<RwLock<HashMap<i64, DiningTable>>>,
    /// Menu cache: menu_item_id -> MenuItem
    menu: Arc<RwLock<HashMap<i64, MenuItem>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("tables", &self.tables.read().len())
            .field("menu", &self.menu.read().len())
            .finish()
    }
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reload) the catalog from a JSON file
    ///
    /// Returns (table count, menu item count).
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(usize, usize), CatalogError> {
        let raw = std::fs::read(path)?;
        let file: CatalogFile = serde_json::from_slice(&raw)?;
        Ok(self.load(file.tables, file.menu))
    }

    /// Replace the caches with the given data
    pub fn load(&self, tables: Vec<DiningTable>, menu: Vec<MenuItem>) -> (usize, usize) {
        let mut table_map = HashMap::with_capacity(tables.len());
        for table in tables {
            table_map.insert(table.id, table);
        }
        let mut menu_map = HashMap::with_capacity(menu.len());
        for item in menu {
            menu_map.insert(item.id, item);
        }

        let counts = (table_map.len(), menu_map.len());
        *self.tables.write() = table_map;
        *self.menu.write() = menu_map;
        counts
    }

    // ========== Tables ==========

    /// Get a table by id (active only)
    pub fn get_table(&self, table_id: i64) -> Option<DiningTable> {
        self.tables
            .read()
            .get(&table_id)
            .filter(|t| t.is_active)
            .cloned()
    }

    /// Resolve a table's display name
    pub fn table_name(&self, table_id: i64) -> Option<String> {
        self.get_table(table_id).map(|t| t.name)
    }

    /// All active tables, sorted by id
    pub fn get_tables(&self) -> Vec<DiningTable> {
        let mut tables: Vec<DiningTable> = self
            .tables
            .read()
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        tables.sort_by_key(|t| t.id);
        tables
    }

    // ========== Menu ==========

    /// Get a menu item by id (active only)
    pub fn get_menu_item(&self, menu_item_id: i64) -> Option<MenuItem> {
        self.menu
            .read()
            .get(&menu_item_id)
            .filter(|m| m.is_active)
            .cloned()
    }

    /// Batch metadata lookup for AddItems processing
    ///
    /// Inactive or unknown ids are simply absent from the result; the
    /// action reports them as MenuItemNotFound.
    pub fn get_item_meta_batch(&self, menu_item_ids: &[i64]) -> HashMap<i64, MenuItemMeta> {
        let cache = self.menu.read();
        menu_item_ids
            .iter()
            .filter_map(|id| {
                cache.get(id).filter(|m| m.is_active).map(|m| {
                    (
                        *id,
                        MenuItemMeta {
                            name: m.name.clone(),
                            price: m.price,
                        },
                    )
                })
            })
            .collect()
    }
}
