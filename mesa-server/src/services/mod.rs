//! Domain services
//!
//! - [`CatalogService`] - read-only table and menu registry
//! - [`SongService`] - spend-gated song requests

pub mod catalog;
pub mod songs;

pub use catalog::{CatalogError, CatalogService, MenuItemMeta};
pub use songs::{SongEligibility, SongError, SongResult, SongService};
