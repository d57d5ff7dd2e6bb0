//! 辞書ファイルとキャッシュの結合テスト

use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use yofix::error::{DictionaryError, YoError};
use yofix::{Config, DictionaryStore};

fn store_with(content: &str) -> (TempDir, DictionaryStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DictionaryStore::new(temp_dir.path().join("yo_dict"));
    fs::write(store.txt_path(), content).unwrap();
    (temp_dir, store)
}

#[test]
fn test_refresh_writes_cache() {
    let (_dir, store) = store_with("ёлке\n* ёж\n");
    let dictionary = store.refresh().unwrap();

    assert!(store.cache_path().exists());
    assert_eq!(dictionary.necessary["елке"], "ёлке");
    assert_eq!(store.load().unwrap(), dictionary);
}

#[test]
fn test_load_without_cache_is_missing() {
    let (_dir, store) = store_with("ёлке\n");
    let error = store.load().unwrap_err();
    assert!(matches!(
        error,
        YoError::Dictionary(DictionaryError::Missing { .. })
    ));
    assert!(error.is_fatal());
}

#[test]
fn test_load_or_refresh_rebuilds_stale_cache() {
    let (_dir, store) = store_with("ёлке\n");
    store.refresh().unwrap();

    fs::write(store.txt_path(), "ёлке\n* всё\n").unwrap();
    let file = fs::File::options()
        .write(true)
        .open(store.txt_path())
        .unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();

    let dictionary = store.load_or_refresh().unwrap();
    assert_eq!(dictionary.optional["все"], "всё");
}

#[test]
fn test_load_or_refresh_builds_missing_cache() {
    let (_dir, store) = store_with("* ёж\n");
    let dictionary = store.load_or_refresh().unwrap();
    assert_eq!(dictionary.optional.len(), 1);
    assert!(store.cache_path().exists());
}

#[test]
fn test_corrupt_cache_is_reported() {
    let (_dir, store) = store_with("ёлке\n");
    fs::write(store.cache_path(), "not json").unwrap();
    let error = store.load().unwrap_err();
    assert!(matches!(
        error,
        YoError::Dictionary(DictionaryError::Corrupt { .. })
    ));
}

#[test]
fn test_missing_text_dictionary() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::from_setting(temp_dir.path().join("absent.txt").to_str().unwrap()).unwrap();
    let error = config.store().load_or_refresh().unwrap_err();
    assert!(matches!(
        error,
        YoError::Dictionary(DictionaryError::Missing { .. })
    ));
}
