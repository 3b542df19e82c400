/// Filesystem side of the catalog
///
/// This module handles:
/// - Generating and caching client thumbnails (thumbnail.rs)
/// - Counting photos and opening client folders (folder.rs)

pub mod folder;
pub mod thumbnail;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Case-insensitive extension check against a lowercase list
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Regular files directly inside `folder` with a matching extension, in file-name order.
/// A missing or unreadable folder yields nothing.
pub(crate) fn matching_files<'a>(
    folder: &Path,
    extensions: &'a [&'a str],
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(move |path| has_extension(path, extensions))
}

pub(crate) fn first_matching_file(folder: &Path, extensions: &[&str]) -> Option<PathBuf> {
    matching_files(folder, extensions).next()
}
