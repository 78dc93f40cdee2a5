use tempfile::tempdir;

use super::*;

#[tokio::test]
async fn file_store_round_trips_theme_and_creates_parent_dirs() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state").join("theme");
    let store = FileThemeStore::new(&path);

    assert_eq!(store.load().await.expect("load"), None);

    store.persist(Theme::Dark).await.expect("persist");
    assert_eq!(store.load().await.expect("load"), Some(Theme::Dark));

    // A second store over the same path sees the persisted choice.
    let reopened = FileThemeStore::new(&path);
    assert_eq!(reopened.load().await.expect("load"), Some(Theme::Dark));
}

#[tokio::test]
async fn file_store_ignores_unrecognized_contents() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("theme");
    tokio::fs::write(&path, "sepia\n").await.expect("write");

    let store = FileThemeStore::new(&path);
    assert_eq!(store.load().await.expect("load"), None);
}

#[tokio::test]
async fn file_store_tolerates_surrounding_whitespace() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("theme");
    tokio::fs::write(&path, "dark\n").await.expect("write");

    let store = FileThemeStore::new(&path);
    assert_eq!(store.load().await.expect("load"), Some(Theme::Dark));
}

#[tokio::test]
async fn memory_store_round_trips_theme() {
    let store = MemoryThemeStore::new();
    assert_eq!(store.load().await.expect("load"), None);

    store.persist(Theme::Light).await.expect("persist");
    assert_eq!(store.load().await.expect("load"), Some(Theme::Light));
}
