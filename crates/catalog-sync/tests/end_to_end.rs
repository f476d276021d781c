use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

use catalog_cache::{CacheCatalogSource, CacheKeys, FileCache};
use catalog_core::mapping::IndexMapping;
use catalog_core::traits::{ContentCatalogSource, RecordCache};
use catalog_core::types::{ContentType, IndexedIdSet};
use catalog_core::Error;
use catalog_sync::{IndexSynchronizer, NoopObserver, SyncMode, SyncOptions};
use catalog_text::TantivySearchIndex;

const TTL: Duration = Duration::from_secs(3600);

fn seed(cache: &FileCache, keys: &CacheKeys) -> anyhow::Result<()> {
    let item = ContentType::new("Item");
    cache.set(&keys.source_ids(&item), &json!([1, 2, 3]), TTL)?;
    cache.set(&keys.record(&item, 1), &json!({ "ID": 1, "Name_en": "Potion", "Name_ja": "ポーション", "PriceMid": "25" }), TTL)?;
    cache.set(&keys.record(&item, 2), &json!({ "ID": 2, "Name_en": "Ether", "PriceMid": 30 }), TTL)?;
    cache.set(&keys.record(&item, 3), &json!({ "ID": 3, "Name_en": "" }), TTL)?;
    Ok(())
}

fn source(root: &std::path::Path) -> anyhow::Result<CacheCatalogSource<FileCache>> {
    let cache = FileCache::open(root)?;
    Ok(CacheCatalogSource::new(cache, CacheKeys::default(), TTL).with_content_types(["Item"]))
}

#[test]
fn full_then_incremental_run_against_tantivy() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let cache_dir = tmp.path().join("cache");
    let keys = CacheKeys::default();
    seed(&FileCache::open(&cache_dir)?, &keys)?;

    let index = TantivySearchIndex::new(tmp.path().join("indexes"))?;
    let options = SyncOptions { mode: SyncMode::Full, ..SyncOptions::default() };
    let sync = IndexSynchronizer::new(source(&cache_dir)?, index, IndexMapping::game_data("search"), options);

    let report = sync.run(&NoopObserver)?;

    assert_eq!(report.submitted(), 2);
    assert_eq!(sync.index().doc_count("item")?, 2);
    assert_eq!(sync.index().refresh_interval("item")?, "1s");
    let potion = sync.index().get_document("item", 1)?.expect("potion indexed");
    assert_eq!(potion["NameLocale"], "Potion ポーション");
    assert_eq!(potion["PriceMid"], 25);
    assert!(sync.index().get_document("item", 3)?.is_none());
    // Release the index writer before reopening the directory.
    drop(sync);

    // A new record appears; the next incremental run only submits it.
    let item = ContentType::new("Item");
    let cache = FileCache::open(&cache_dir)?;
    cache.set(&keys.source_ids(&item), &json!([1, 2, 3, 4]), TTL)?;
    cache.set(&keys.record(&item, 4), &json!({ "ID": 4, "Name_en": "Elixir", "PriceMid": "40" }), TTL)?;

    let index = TantivySearchIndex::new(tmp.path().join("indexes"))?;
    let sync = IndexSynchronizer::new(source(&cache_dir)?, index, IndexMapping::game_data("search"), SyncOptions::default());
    let report = sync.run(&NoopObserver)?;

    let item_report = report.content("Item").expect("item report");
    assert_eq!(item_report.submitted.iter().copied().collect::<Vec<_>>(), vec![4]);
    assert_eq!(item_report.already_indexed, 2);
    assert_eq!(sync.index().doc_count("item")?, 3);
    assert_eq!(sync.source().indexed_ids(&item)?, IndexedIdSet::from([1, 2, 4]));
    Ok(())
}

#[test]
fn incremental_run_needs_an_existing_index() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let cache_dir = tmp.path().join("cache");
    seed(&FileCache::open(&cache_dir)?, &CacheKeys::default())?;

    let index = TantivySearchIndex::new(tmp.path().join("indexes"))?;
    let sync = IndexSynchronizer::new(source(&cache_dir)?, index, IndexMapping::game_data("search"), SyncOptions::default());

    assert!(matches!(sync.run(&NoopObserver), Err(Error::NotFound(_))));
    Ok(())
}
