/// Shared data structures for the catalog
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.

use serde::Serialize;
use std::path::PathBuf;

/// A client row joined with its type's name and color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    /// Unique database ID
    pub id: i64,
    pub name: String,
    /// Folder with the client's photos (usually on the NAS)
    pub folder_path: String,
    pub type_id: Option<i64>,
    /// Shoot date as entered, e.g. "2024-03-20"; not validated
    pub date: Option<String>,
    pub phone: String,
    pub email: String,
    pub notes: String,
    /// Cached thumbnail, empty when none could be generated
    pub thumbnail_path: String,
    pub created_at: String,
    pub updated_at: String,
    pub type_name: Option<String>,
    pub type_color: Option<String>,
}

/// A shoot type (wedding, portrait, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientType {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: String,
    /// Number of clients referencing this type, recomputed on every change
    pub client_count: i64,
}

/// Input for `ClientCatalog::add_client`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub folder_path: PathBuf,
    /// Blank means "no type"
    pub type_name: String,
    pub date: Option<String>,
    pub phone: String,
    pub email: String,
    pub notes: String,
}

impl NewClient {
    pub fn new(
        name: impl Into<String>,
        folder_path: impl Into<PathBuf>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            folder_path: folder_path.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Partial update for a client. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub folder_path: Option<String>,
    /// Resolved through get-or-create, like on insert
    pub type_name: Option<String>,
    pub date: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub thumbnail_path: Option<String>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// (type name, client count) pair in the stats view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    pub name: String,
    pub client_count: i64,
}

/// (client name, creation time) pair in the stats view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentClient {
    pub name: String,
    pub created_at: String,
}

/// Aggregate snapshot of the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_clients: i64,
    /// Same order as `get_types`
    pub type_distribution: Vec<TypeCount>,
    /// Five newest clients, newest first
    pub recent_clients: Vec<RecentClient>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patch_is_empty() {
        assert!(ClientPatch::default().is_empty());

        let patch = ClientPatch {
            phone: Some(String::new()),
            ..ClientPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_new_client_builder() {
        let client = NewClient::new("Mary", "/nas/shoots/mary-2024", "Wedding")
            .date("2024-03-20")
            .phone("555-0100")
            .notes("outdoor");

        assert_eq!(client.name, "Mary");
        assert_eq!(client.folder_path, PathBuf::from("/nas/shoots/mary-2024"));
        assert_eq!(client.date.as_deref(), Some("2024-03-20"));
        assert_eq!(client.email, "");
        assert_eq!(client.notes, "outdoor");
    }
}
