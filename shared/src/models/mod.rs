//! Catalog and song-request models

pub mod dining_table;
pub mod menu_item;
pub mod song;

pub use dining_table::DiningTable;
pub use menu_item::MenuItem;
pub use song::{SongInput, SongRequest, SongStatus};
