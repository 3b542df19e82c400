use chrono::Local;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::data::{CatalogStats, Client, ClientPatch, ClientType, NewClient, RecentClient, TypeCount};
use super::library::Library;
use crate::config::{AppPaths, THEME_COLOR};
use crate::error::{CatalogError, Result};
use crate::media::folder::{self, FolderOpen};
use crate::media::thumbnail::{ThumbnailCache, ThumbnailOutcome};

/// Columns selected for every `Client`, in `client_from_row` order
const CLIENT_SELECT: &str = "
    SELECT c.id, c.name, c.folder_path, c.type_id, c.date, c.phone, c.email, c.notes,
           c.thumbnail_path, c.created_at, c.updated_at, t.name, t.color
    FROM clients c
    LEFT JOIN types t ON c.type_id = t.id";

const CLIENT_ORDER: &str = "ORDER BY c.date DESC, c.name";

/// Number of clients in the "recently added" part of the stats
const RECENT_LIMIT: i64 = 5;

/// Client and client-type records on top of the `Library`.
///
/// `types.client_count` is never incremented or decremented; whenever a
/// client's type may have changed the count is recomputed from `clients`.
#[derive(Debug, Clone)]
pub struct ClientCatalog {
    library: Library,
    thumbnails: ThumbnailCache,
    default_type_color: String,
}

impl ClientCatalog {
    pub fn new(library: Library, thumbnails: ThumbnailCache) -> Self {
        Self {
            library,
            thumbnails,
            default_type_color: THEME_COLOR.to_string(),
        }
    }

    /// Open the catalog at the standard locations.
    pub fn open(paths: &AppPaths) -> Result<Self> {
        let library = Library::open(&paths.db_path)?;
        Ok(Self::new(library, ThumbnailCache::new(&paths.thumbnail_dir)))
    }

    /// Color given to types created from now on
    pub fn with_default_type_color(mut self, color: impl Into<String>) -> Self {
        self.default_type_color = color.into();
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    /// Add a client and return its id.
    ///
    /// The folder must exist when the client is added. Thumbnail generation is
    /// best-effort and leaves an empty path when it fails.
    pub fn add_client(&self, new: &NewClient) -> Result<i64> {
        if new.name.trim().is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        if new.folder_path.as_os_str().is_empty() {
            return Err(CatalogError::MissingField("folder_path"));
        }
        if !new.folder_path.is_dir() {
            return Err(CatalogError::FolderNotFound(new.folder_path.clone()));
        }

        let resolved = self.resolve_type(&new.type_name)?;
        let type_id = resolved.id;
        let thumbnail_path = self.thumbnail_for(&new.folder_path, &new.name);

        let now = timestamp();
        let inserted = self.library.execute(
            "INSERT INTO clients (name, folder_path, type_id, date, phone, email, notes, thumbnail_path, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                new.name,
                new.folder_path.to_string_lossy().to_string(),
                type_id,
                new.date,
                new.phone,
                new.email,
                new.notes,
                thumbnail_path,
                now,
                now,
            ],
        );
        let id = self.discard_on_error(&resolved, inserted)?;

        if let Some(type_id) = type_id {
            self.refresh_type_count(type_id)?;
        }

        info!(id, name = %new.name, type_id = ?type_id, "Added client");
        Ok(id)
    }

    /// Clients whose name, phone, notes or type name contain `keyword`.
    ///
    /// A blank keyword returns the same list as `get_all_clients`.
    pub fn search_clients(&self, keyword: &str) -> Result<Vec<Client>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.get_all_clients();
        }

        let pattern = format!("%{}%", escape_like(keyword));
        let sql = format!(
            "{} WHERE c.name LIKE ?1 ESCAPE '\\' OR c.phone LIKE ?1 ESCAPE '\\'
                OR c.notes LIKE ?1 ESCAPE '\\' OR t.name LIKE ?1 ESCAPE '\\' {}",
            CLIENT_SELECT, CLIENT_ORDER
        );

        let clients = self.library.fetch(&sql, [pattern], client_from_row)?;
        debug!(keyword, found = clients.len(), "Searched clients");
        Ok(clients)
    }

    /// Every client, latest shoot date first, then by name
    pub fn get_all_clients(&self) -> Result<Vec<Client>> {
        let sql = format!("{} {}", CLIENT_SELECT, CLIENT_ORDER);
        self.library.fetch(&sql, [], client_from_row)
    }

    pub fn get_client_by_id(&self, id: i64) -> Result<Option<Client>> {
        let sql = format!("{} WHERE c.id = ?1", CLIENT_SELECT);
        Ok(self.library.fetch(&sql, [id], client_from_row)?.into_iter().next())
    }

    /// Apply the fields set in `patch` and bump `updated_at`.
    ///
    /// Updating an id that doesn't exist does nothing.
    pub fn update_client(&self, id: i64, patch: &ClientPatch) -> Result<()> {
        if patch.is_empty() {
            return Err(CatalogError::EmptyUpdate);
        }
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(CatalogError::MissingField("name"));
        }
        if patch.folder_path.as_deref().is_some_and(|path| path.trim().is_empty()) {
            return Err(CatalogError::MissingField("folder_path"));
        }

        let Some(existing) = self.get_client_by_id(id)? else {
            debug!(id, "Update of unknown client ignored");
            return Ok(());
        };

        // A type created here is removed again if the row write fails
        let resolved = match &patch.type_name {
            Some(type_name) => Some(self.resolve_type(type_name)?),
            None => None,
        };
        let new_type_id = resolved.as_ref().map(|r| r.id);

        let mut columns: Vec<&'static str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        let mut set = |column: &'static str, value: Value| {
            columns.push(column);
            values.push(value);
        };

        if let Some(name) = &patch.name {
            set("name", Value::Text(name.clone()));
        }
        if let Some(folder_path) = &patch.folder_path {
            set("folder_path", Value::Text(folder_path.clone()));
        }
        if let Some(type_id) = new_type_id {
            set("type_id", type_id.map_or(Value::Null, Value::Integer));
        }
        for (column, field) in [
            ("date", &patch.date),
            ("phone", &patch.phone),
            ("email", &patch.email),
            ("notes", &patch.notes),
            ("thumbnail_path", &patch.thumbnail_path),
        ] {
            if let Some(value) = field {
                set(column, Value::Text(value.clone()));
            }
        }
        set("updated_at", Value::Text(timestamp()));

        let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        values.push(Value::Integer(id));
        let sql = format!(
            "UPDATE clients SET {} WHERE id = ?{}",
            assignments,
            values.len()
        );

        let updated = self.library.execute(&sql, params_from_iter(values));
        match &resolved {
            Some(resolved) => self.discard_on_error(resolved, updated)?,
            None => updated?,
        };

        if let Some(type_id) = new_type_id {
            if let Some(old) = existing.type_id.filter(|old| Some(*old) != type_id) {
                self.refresh_type_count(old)?;
            }
            if let Some(new) = type_id {
                self.refresh_type_count(new)?;
            }
        }

        info!(id, fields = ?&columns[..columns.len() - 1], "Updated client");
        Ok(())
    }

    /// Remove a client row and recount its type.
    ///
    /// The photo folder and the cached thumbnail are left on disk. Unknown ids
    /// are ignored.
    pub fn delete_client(&self, id: i64) -> Result<()> {
        let type_id = self
            .library
            .fetch("SELECT type_id FROM clients WHERE id = ?1", [id], |row| {
                row.get::<_, Option<i64>>(0)
            })?
            .into_iter()
            .next();

        let Some(type_id) = type_id else {
            debug!(id, "Delete of unknown client ignored");
            return Ok(());
        };

        self.library.execute("DELETE FROM clients WHERE id = ?1", [id])?;

        if let Some(type_id) = type_id {
            self.refresh_type_count(type_id)?;
        }

        info!(id, "Deleted client");
        Ok(())
    }

    /// All types, most clients first
    pub fn get_types(&self) -> Result<Vec<ClientType>> {
        self.library.fetch(
            "SELECT id, name, color, created_at, client_count
             FROM types
             ORDER BY client_count DESC, id",
            [],
            |row| {
                Ok(ClientType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    created_at: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    client_count: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
                })
            },
        )
    }

    /// Overwrite a type's display color. The value is not checked.
    pub fn update_type_color(&self, type_id: i64, color: &str) -> Result<()> {
        self.library.execute(
            "UPDATE types SET color = ?1 WHERE id = ?2",
            params![color, type_id],
        )?;
        info!(type_id, color, "Updated type color");
        Ok(())
    }

    pub fn get_stats(&self) -> Result<CatalogStats> {
        let total_clients = self
            .library
            .fetch("SELECT COUNT(*) FROM clients", [], |row| row.get::<_, i64>(0))?
            .into_iter()
            .next()
            .unwrap_or(0);

        let type_distribution = self
            .get_types()?
            .into_iter()
            .map(|t| TypeCount {
                name: t.name,
                client_count: t.client_count,
            })
            .collect();

        let recent_clients = self.library.fetch(
            "SELECT name, created_at FROM clients ORDER BY created_at DESC, id DESC LIMIT ?1",
            [RECENT_LIMIT],
            |row| {
                Ok(RecentClient {
                    name: row.get(0)?,
                    created_at: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            },
        )?;

        Ok(CatalogStats {
            total_clients,
            type_distribution,
            recent_clients,
        })
    }

    /// Build a thumbnail for a client folder without touching the database.
    pub fn generate_thumbnail(&self, folder_path: &Path, client_name: &str) -> ThumbnailOutcome {
        self.thumbnails.generate(folder_path, client_name)
    }

    /// `generate_thumbnail` on a blocking worker thread.
    pub async fn generate_thumbnail_async(
        &self,
        folder_path: PathBuf,
        client_name: String,
    ) -> ThumbnailOutcome {
        self.thumbnails.generate_async(folder_path, client_name).await
    }

    /// Recompute `client_count` for one type from the clients table.
    pub fn refresh_type_count(&self, type_id: i64) -> Result<()> {
        self.library.execute(
            "UPDATE types
             SET client_count = (SELECT COUNT(*) FROM clients WHERE type_id = ?1)
             WHERE id = ?1",
            [type_id],
        )?;
        Ok(())
    }

    /// Recompute `client_count` for every type.
    pub fn refresh_all_type_counts(&self) -> Result<()> {
        self.library.execute(
            "UPDATE types
             SET client_count = (SELECT COUNT(*) FROM clients WHERE clients.type_id = types.id)",
            [],
        )?;
        info!("Recounted all client types");
        Ok(())
    }

    /// Clients whose folder is no longer a directory. Rows are not modified.
    pub fn find_missing_folders(&self) -> Result<Vec<Client>> {
        let missing: Vec<Client> = self
            .get_all_clients()?
            .into_iter()
            .filter(|client| !Path::new(&client.folder_path).is_dir())
            .collect();

        if !missing.is_empty() {
            warn!(count = missing.len(), "Client folders missing");
        }
        Ok(missing)
    }

    /// Show a client's folder in the file browser. `None` if the id is unknown.
    pub fn open_client_folder(&self, id: i64) -> Result<Option<FolderOpen>> {
        Ok(self
            .get_client_by_id(id)?
            .map(|client| folder::open_in_file_browser(Path::new(&client.folder_path))))
    }

    /// Get-or-create by exact name; a blank name means "no type".
    fn resolve_type(&self, type_name: &str) -> Result<ResolvedType> {
        if type_name.trim().is_empty() {
            return Ok(ResolvedType { id: None, created: false });
        }

        let existing = self
            .library
            .fetch("SELECT id FROM types WHERE name = ?1", [type_name], |row| {
                row.get::<_, i64>(0)
            })?
            .into_iter()
            .next();
        if let Some(id) = existing {
            return Ok(ResolvedType { id: Some(id), created: false });
        }

        let id = self.library.execute(
            "INSERT INTO types (name, color, created_at) VALUES (?1, ?2, ?3)",
            params![type_name, self.default_type_color, timestamp()],
        )?;

        info!(id, name = type_name, "Created client type");
        Ok(ResolvedType { id: Some(id), created: true })
    }

    /// Pass `result` through, deleting a type created for it if the write failed.
    fn discard_on_error<T>(&self, resolved: &ResolvedType, result: Result<T>) -> Result<T> {
        if let (Err(_), true, Some(type_id)) = (&result, resolved.created, resolved.id) {
            let discarded = self.library.execute(
                "DELETE FROM types
                 WHERE id = ?1 AND NOT EXISTS (SELECT 1 FROM clients WHERE type_id = ?1)",
                [type_id],
            );
            if let Err(e) = discarded {
                warn!(type_id, error = %e, "Could not remove unused client type");
            }
        }
        result
    }

    fn thumbnail_for(&self, folder_path: &Path, client_name: &str) -> String {
        let outcome = self.thumbnails.generate(folder_path, client_name);
        match &outcome {
            ThumbnailOutcome::Created(_) | ThumbnailOutcome::NotFound => {}
            other => warn!(folder = ?folder_path, outcome = ?other, "Thumbnail not generated"),
        }
        outcome.into_stored()
    }
}

/// Type id from get-or-create, remembering whether the row is new
struct ResolvedType {
    id: Option<i64>,
    created: bool,
}

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        folder_path: row.get(2)?,
        type_id: row.get(3)?,
        date: row.get(4)?,
        phone: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        email: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        notes: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        thumbnail_path: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        created_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        updated_at: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        type_name: row.get(11)?,
        type_color: row.get(12)?,
    })
}

/// Make `%`, `_` and `\` match literally under `ESCAPE '\'`.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
