//! End-to-end walk through a typical session against a fresh catalog.

use std::fs;

use image::{Rgb, RgbImage};
use photo_clients::{
    count_photos, AppConfig, AppPaths, ClientCatalog, ClientPatch, NewClient, ThumbnailOutcome,
};
use tempfile::TempDir;

#[test]
fn wedding_season() {
    let root = TempDir::new().unwrap();
    let paths = AppPaths::under(root.path().join("app"));
    let catalog = ClientCatalog::open(&paths).unwrap();

    let shoots = root.path().join("nas").join("shoots");
    let mary_dir = shoots.join("mary-2024");
    let tom_dir = shoots.join("tom-2024");
    fs::create_dir_all(&mary_dir).unwrap();
    fs::create_dir_all(&tom_dir).unwrap();
    RgbImage::from_pixel(400, 300, Rgb([220, 200, 180]))
        .save(tom_dir.join("IMG_0001.png"))
        .unwrap();
    fs::write(tom_dir.join("IMG_0002.jpg"), b"x").unwrap();

    let mary = catalog
        .add_client(&NewClient::new("Mary", &mary_dir, "Wedding").date("2024-03-20"))
        .unwrap();
    let types = catalog.get_types().unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!((types[0].name.as_str(), types[0].client_count), ("Wedding", 1));

    let tom = catalog
        .add_client(&NewClient::new("Tom", &tom_dir, "Wedding").date("2024-04-01"))
        .unwrap();
    let types = catalog.get_types().unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!((types[0].name.as_str(), types[0].client_count), ("Wedding", 2));

    // Tom's folder had a usable image, Mary's was empty
    let tom_row = catalog.get_client_by_id(tom).unwrap().unwrap();
    assert!(!tom_row.thumbnail_path.is_empty());
    assert_eq!(catalog.get_client_by_id(mary).unwrap().unwrap().thumbnail_path, "");
    assert_eq!(count_photos(&tom_dir), 2);

    // Newest shoot first
    let names: Vec<String> = catalog.get_all_clients().unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Tom", "Mary"]);

    // Deleting recounts the type instead of leaving a stale count
    catalog.delete_client(mary).unwrap();
    let types = catalog.get_types().unwrap();
    assert_eq!((types[0].name.as_str(), types[0].client_count), ("Wedding", 1));

    let remaining = catalog.get_all_clients().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, tom);
    assert!(mary_dir.is_dir());

    catalog
        .update_client(
            tom,
            &ClientPatch {
                notes: Some("album delivered".to_string()),
                ..ClientPatch::default()
            },
        )
        .unwrap();
    assert_eq!(catalog.search_clients("album").unwrap()[0].id, tom);

    let stats = catalog.get_stats().unwrap();
    assert_eq!(stats.total_clients, 1);
    assert_eq!(stats.recent_clients[0].name, "Tom");
}

#[test]
fn settings_and_backup_survive_restart() {
    let root = TempDir::new().unwrap();
    let paths = AppPaths::under(root.path());

    let mut config = AppConfig::load(&paths.config_path);
    config.nas_path = "//nas/photo".to_string();
    config.save(&paths.config_path).unwrap();

    let catalog = ClientCatalog::open(&paths).unwrap();
    let folder = root.path().join("shoot");
    fs::create_dir(&folder).unwrap();
    catalog.add_client(&NewClient::new("Ann", &folder, "Family")).unwrap();

    let backup = catalog
        .library()
        .backup_to(&config.backup_dir(&paths))
        .unwrap();
    assert!(backup.starts_with(root.path().join("backups")));

    // A second process sees the same data and settings
    let reopened = ClientCatalog::open(&paths).unwrap();
    assert_eq!(reopened.get_all_clients().unwrap().len(), 1);
    assert_eq!(AppConfig::load(&paths.config_path).nas_path, "//nas/photo");
}

#[test]
fn empty_folder_gives_no_thumbnail() {
    let root = TempDir::new().unwrap();
    let catalog = ClientCatalog::open(&AppPaths::under(root.path())).unwrap();

    let folder = root.path().join("empty");
    fs::create_dir(&folder).unwrap();
    let outcome = catalog.generate_thumbnail(&folder, "Nobody");

    assert_eq!(outcome, ThumbnailOutcome::NotFound);
    assert_eq!(outcome.into_stored(), "");
}
