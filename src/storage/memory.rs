use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::ClipStorage;
use super::models::{CatalogStats, Clip, ClipQuery, NewClip, TagCount};
use super::seed::default_clips;

use crate::errors::{Result, SfError};

struct Entry {
    seq: u64,
    added_at: DateTime<Utc>,
    clip: Clip,
}

#[derive(Default)]
struct Catalog {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Catalog {
    fn from_clips(clips: Vec<Clip>) -> Self {
        let mut catalog = Catalog::default();
        let now = Utc::now();
        for clip in clips {
            catalog.push(clip, now);
        }
        catalog
    }

    fn push(&mut self, clip: Clip, added_at: DateTime<Utc>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            seq,
            added_at,
            clip,
        });
    }

    fn next_id(&self) -> u64 {
        self.entries.iter().map(|e| e.clip.id).max().unwrap_or(0) + 1
    }
}

/// Append-only clip catalog held in process memory.
///
/// Results are ordered by insertion sequence, newest first. Identifiers are
/// assigned as `max(existing) + 1` and are not used for ordering.
pub struct MemoryStorage {
    catalog: RwLock<Catalog>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// A catalog holding the seed set.
    pub fn new() -> Self {
        Self::with_clips(default_clips())
    }

    pub fn empty() -> Self {
        Self::with_clips(Vec::new())
    }

    pub fn with_clips(clips: Vec<Clip>) -> Self {
        Self {
            catalog: RwLock::new(Catalog::from_clips(clips)),
        }
    }

    /// Drop every added clip and restore the seed set.
    pub fn reset(&self) -> Result<()> {
        *self.write()? = Catalog::from_clips(default_clips());
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Catalog>> {
        self.catalog
            .read()
            .map_err(|_| SfError::Storage("catalog lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Catalog>> {
        self.catalog
            .write()
            .map_err(|_| SfError::Storage("catalog lock poisoned".into()))
    }
}

impl ClipStorage for MemoryStorage {
    fn insert(&self, clip: NewClip) -> Result<Clip> {
        clip.validate()?;
        let mut catalog = self.write()?;
        let stored = Clip {
            id: catalog.next_id(),
            video_url: clip.video_url,
            title: clip.title,
            tags: clip.tags,
        };
        catalog.push(stored.clone(), Utc::now());
        Ok(stored)
    }

    fn query(&self, query: &ClipQuery) -> Result<Vec<Clip>> {
        let search = query.search_term();
        let tag = query.tag_term();

        let catalog = self.read()?;
        let mut matched: Vec<&Entry> = catalog
            .entries
            .iter()
            .filter(|e| search.as_deref().is_none_or(|s| e.clip.matches_text(s)))
            .filter(|e| tag.as_deref().is_none_or(|t| e.clip.has_tag(t)))
            .collect();
        matched.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(matched
            .into_iter()
            .skip(query.offset())
            .take(query.effective_limit() as usize)
            .map(|e| e.clip.clone())
            .collect())
    }

    fn stats(&self) -> Result<CatalogStats> {
        let catalog = self.read()?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for tag in catalog.entries.iter().flat_map(|e| e.clip.tags.iter()) {
            *counts.entry(tag.to_lowercase()).or_default() += 1;
        }
        let distinct_tags = counts.len();
        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        // BTreeMap already yields tags ascending; a stable sort keeps that within equal counts.
        tags.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(CatalogStats {
            total_clips: catalog.entries.len(),
            distinct_tags,
            tags,
            oldest: catalog.entries.iter().map(|e| e.added_at).min(),
            newest: catalog.entries.iter().map(|e| e.added_at).max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_storage() -> MemoryStorage {
        MemoryStorage::new()
    }

    fn new_clip(title: &str, tags: &[&str]) -> NewClip {
        NewClip::new(
            format!("https://example.com/{}.mp4", title.to_lowercase()),
            title,
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    fn ids(clips: &[Clip]) -> Vec<u64> {
        clips.iter().map(|c| c.id).collect()
    }

    // --- Seed ---

    #[test]
    fn test_new_holds_seed_set() {
        let storage = test_storage();
        assert_eq!(storage.len().unwrap(), 10);
        assert!(!storage.is_empty().unwrap());
    }

    #[test]
    fn test_empty_store() {
        let storage = MemoryStorage::empty();
        assert!(storage.is_empty().unwrap());
        assert!(storage.query(&ClipQuery::default()).unwrap().is_empty());
    }

    // --- Insert ---

    #[test]
    fn test_insert_assigns_next_id() {
        let storage = test_storage();
        let added = storage.insert(new_clip("X", &["x"])).unwrap();
        assert_eq!(added.id, 11);
        assert_eq!(added.title, "X");
        assert_eq!(added.tags, vec!["x"]);
        assert_eq!(storage.len().unwrap(), 11);
    }

    #[test]
    fn test_insert_into_empty_store_starts_at_one() {
        let storage = MemoryStorage::empty();
        let first = storage.insert(new_clip("First", &[])).unwrap();
        let second = storage.insert(new_clip("Second", &[])).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_insert_uses_max_id_not_count() {
        let storage = MemoryStorage::with_clips(vec![Clip {
            id: 41,
            video_url: "u".into(),
            title: "Gap".into(),
            tags: vec![],
        }]);
        let added = storage.insert(new_clip("After", &[])).unwrap();
        assert_eq!(added.id, 42);
    }

    #[test]
    fn test_insert_rejects_empty_fields() {
        let storage = test_storage();
        let err = storage.insert(NewClip::new("", "t", vec![])).unwrap_err();
        assert!(matches!(err, SfError::InvalidInput(ref m) if m == "videoUrl required"));
        let err = storage.insert(NewClip::new("u", "", vec![])).unwrap_err();
        assert!(matches!(err, SfError::InvalidInput(ref m) if m == "title required"));
        assert_eq!(storage.len().unwrap(), 10);
    }

    #[test]
    fn test_insert_keeps_duplicate_tags() {
        let storage = test_storage();
        let added = storage.insert(new_clip("Dup", &["a", "a"])).unwrap();
        assert_eq!(added.tags, vec!["a", "a"]);
    }

    // --- Query ---

    #[test]
    fn test_query_defaults_newest_first() {
        let storage = test_storage();
        let clips = storage.query(&ClipQuery::default()).unwrap();
        assert_eq!(ids(&clips), (1..=10).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_query_added_clip_comes_first() {
        let storage = test_storage();
        let added = storage.insert(new_clip("Fresh", &["new"])).unwrap();
        let clips = storage.query(&ClipQuery::default()).unwrap();
        assert_eq!(clips.len(), 11);
        assert_eq!(clips[0], added);
    }

    #[test]
    fn test_query_orders_by_insertion_not_id() {
        let storage = MemoryStorage::with_clips(vec![
            Clip {
                id: 9,
                video_url: "u".into(),
                title: "Nine".into(),
                tags: vec![],
            },
            Clip {
                id: 2,
                video_url: "u".into(),
                title: "Two".into(),
                tags: vec![],
            },
        ]);
        let clips = storage.query(&ClipQuery::default()).unwrap();
        assert_eq!(ids(&clips), vec![2, 9]);
    }

    #[test]
    fn test_query_search_matches_title_or_tag() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                q: Some("timelapse".into()),
                ..Default::default()
            })
            .unwrap();
        let titles: Vec<&str> = clips.iter().map(|c| c.title.as_str()).collect();
        assert!(titles.contains(&"City Timelapse"));
        assert!(titles.contains(&"Clouds Timelapse"));
        assert!(clips.iter().all(|c| c.matches_text("timelapse")));
    }

    #[test]
    fn test_query_search_case_insensitive_and_trimmed() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                q: Some("  OCEAN ".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&clips), vec![5]);
    }

    #[test]
    fn test_query_search_matches_tag_substring() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                q: Some("coff".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&clips), vec![9]);
    }

    #[test]
    fn test_query_blank_search_is_ignored() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                q: Some("   ".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(clips.len(), 10);
    }

    #[test]
    fn test_query_tag_is_exact() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                tag: Some("Nature".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&clips), vec![5, 2]);

        let partial = storage
            .query(&ClipQuery {
                tag: Some("natur".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(partial.is_empty());
    }

    #[test]
    fn test_query_filters_compose() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                q: Some("night".into()),
                tag: Some("city".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&clips), vec![6]);

        let none = storage
            .query(&ClipQuery {
                q: Some("ocean".into()),
                tag: Some("city".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_query_second_page_of_one() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                page: 2,
                limit: 1,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&clips), vec![9]);
    }

    #[test]
    fn test_query_pages_partition_results() {
        let storage = test_storage();
        let page = |p| {
            ids(&storage
                .query(&ClipQuery {
                    page: p,
                    limit: 4,
                    ..Default::default()
                })
                .unwrap())
        };
        assert_eq!(page(1), vec![10, 9, 8, 7]);
        assert_eq!(page(2), vec![6, 5, 4, 3]);
        assert_eq!(page(3), vec![2, 1]);
        assert!(page(4).is_empty());
    }

    #[test]
    fn test_query_out_of_range_page_is_empty() {
        let storage = test_storage();
        let clips = storage
            .query(&ClipQuery {
                page: 99,
                ..Default::default()
            })
            .unwrap();
        assert!(clips.is_empty());
    }

    #[test]
    fn test_query_returns_independent_copies() {
        let storage = test_storage();
        let mut first = storage.query(&ClipQuery::default()).unwrap();
        first[0].title = "mutated".into();
        first.clear();
        let second = storage.query(&ClipQuery::default()).unwrap();
        assert_eq!(second.len(), 10);
        assert_eq!(second[0].title, "Clouds Timelapse");
    }

    // --- Reset ---

    #[test]
    fn test_reset_discards_additions() {
        let storage = test_storage();
        storage.insert(new_clip("Gone", &[])).unwrap();
        storage.reset().unwrap();
        assert_eq!(storage.len().unwrap(), 10);
        let next = storage.insert(new_clip("Again", &[])).unwrap();
        assert_eq!(next.id, 11);
    }

    #[test]
    fn test_reset_restores_seed_on_empty_store() {
        let storage = MemoryStorage::empty();
        storage.reset().unwrap();
        assert_eq!(storage.len().unwrap(), 10);
    }

    // --- Stats ---

    #[test]
    fn test_stats_counts_tags() {
        let storage = test_storage();
        storage.insert(new_clip("Loud City", &["City", "noise"])).unwrap();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_clips, 11);
        assert_eq!(
            stats.tags[0],
            TagCount {
                tag: "city".into(),
                count: 3
            }
        );
        let demo = stats.tags.iter().find(|t| t.tag == "demo").unwrap();
        assert_eq!(demo.count, 2);
        // 16 distinct seed tags plus "noise"
        assert_eq!(stats.distinct_tags, 17);
        assert!(stats.oldest.unwrap() <= stats.newest.unwrap());
    }

    #[test]
    fn test_stats_ties_sorted_by_name() {
        let storage = test_storage();
        let stats = storage.stats().unwrap();
        let twos: Vec<&str> = stats
            .tags
            .iter()
            .filter(|t| t.count == 2)
            .map(|t| t.tag.as_str())
            .collect();
        assert_eq!(twos, vec!["city", "demo", "nature", "timelapse"]);
    }

    #[test]
    fn test_stats_empty_store() {
        let stats = MemoryStorage::empty().stats().unwrap();
        assert_eq!(stats.total_clips, 0);
        assert!(stats.tags.is_empty());
        assert!(stats.oldest.is_none());
        assert!(stats.newest.is_none());
    }

    // --- Locking ---

    #[test]
    fn test_poisoned_lock_is_storage_error() {
        let storage = Arc::new(test_storage());
        let s = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = s.catalog.write().unwrap();
            panic!("poison the catalog");
        })
        .join();
        let err = storage.query(&ClipQuery::default()).unwrap_err();
        assert!(matches!(err, SfError::Storage(_)));
    }

    #[test]
    fn test_concurrent_inserts_get_unique_ids() {
        let storage = Arc::new(MemoryStorage::empty());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = storage.clone();
                std::thread::spawn(move || s.insert(new_clip(&format!("T{}", i), &[])).unwrap().id)
            })
            .collect();
        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }
}
