//! Client catalog for photographers.
//!
//! Keeps one record per client (name, shoot folder, shoot type, contact
//! details, cached thumbnail) and one per shoot type, in a local SQLite file.
//! The UI layer talks to [`ClientCatalog`]; everything else is plumbing.

pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod state;

pub use config::{AppConfig, AppPaths, CardSize};
pub use error::{CatalogError, Result};
pub use media::folder::{count_photos, open_in_file_browser, FolderOpen};
pub use media::thumbnail::{ThumbnailCache, ThumbnailOutcome};
pub use state::clients::ClientCatalog;
pub use state::data::{CatalogStats, Client, ClientPatch, ClientType, NewClient, RecentClient, TypeCount};
pub use state::library::Library;
