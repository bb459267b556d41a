//! In-memory record store
//!
//! Keeps records in a `Vec` behind a tokio `RwLock` and evaluates filters and
//! ordering on every fetch. Good for tests and small demo data sets.

use super::types::{
    MissingCursorPolicy, OrderedRecord, RecordFilter, RecordStore, SortValue,
};
use crate::error::{Error, Result};
use crate::types::{OrderBy, SortDirection};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::marker::PhantomData;
use tokio::sync::RwLock;

/// Record store backed by a vector in memory
#[derive(Debug)]
pub struct InMemoryStore<R, F> {
    /// Stored records, in insertion order
    records: RwLock<Vec<R>>,
    /// Behaviour for cursors that no longer exist
    missing_cursor: MissingCursorPolicy,
    /// Whether `count` is supported
    counting: bool,
    _filter: PhantomData<fn(&F)>,
}

impl<R, F> Default for InMemoryStore<R, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, F> InMemoryStore<R, F> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store holding the given records
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
            missing_cursor: MissingCursorPolicy::default(),
            counting: true,
            _filter: PhantomData,
        }
    }

    /// Set the policy for cursors that point at missing records
    #[must_use]
    pub fn with_missing_cursor_policy(mut self, policy: MissingCursorPolicy) -> Self {
        self.missing_cursor = policy;
        self
    }

    /// Disable `count`, as a store without a count capability would
    #[must_use]
    pub fn without_count(mut self) -> Self {
        self.counting = false;
        self
    }

    /// Number of stored records (unfiltered)
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<R: OrderedRecord, F> InMemoryStore<R, F> {
    /// Insert a record, replacing any record with the same id
    pub async fn insert(&self, record: R) {
        let mut records = self.records.write().await;
        if let Some(existing) = records.iter_mut().find(|r| r.id() == record.id()) {
            *existing = record;
        } else {
            records.push(record);
        }
    }

    /// Remove a record by id
    pub async fn remove(&self, id: &str) -> Option<R> {
        let mut records = self.records.write().await;
        let index = records.iter().position(|r| r.id() == id)?;
        Some(records.remove(index))
    }
}

/// Ordering key for a record under `order`
fn sort_key<R: OrderedRecord>(record: &R, order: &OrderBy) -> Result<SortValue> {
    if order.is_id() {
        return Ok(SortValue::from(record.id()));
    }
    record
        .sort_value(&order.field)
        .ok_or_else(|| Error::unsupported_order("in-memory store", &order.field))
}

/// Compare two (key, id) positions in the given direction
fn compare(a: (&SortValue, &str), b: (&SortValue, &str), direction: SortDirection) -> Ordering {
    direction.apply(a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)))
}

#[async_trait]
impl<R, F> RecordStore for InMemoryStore<R, F>
where
    R: OrderedRecord + Clone,
    F: RecordFilter<R>,
{
    type Record = R;
    type Filter = F;

    async fn fetch_page(
        &self,
        filter: &F,
        order: &OrderBy,
        resume_after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<R>> {
        let records = self.records.read().await;

        // Position of the anchor record, looked up regardless of the filter
        let anchor = match resume_after {
            None => None,
            Some(id) => match records.iter().find(|r| r.id() == id) {
                Some(record) => Some((sort_key(record, order)?, id)),
                None => {
                    tracing::warn!(cursor = id, policy = ?self.missing_cursor, "Cursor record not found");
                    match self.missing_cursor {
                        MissingCursorPolicy::Restart => None,
                        MissingCursorPolicy::Exhausted => return Ok(Vec::new()),
                    }
                }
            },
        };

        let mut matching = records
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| Ok((sort_key(r, order)?, r)))
            .collect::<Result<Vec<_>>>()?;

        matching.sort_by(|(ka, a), (kb, b)| compare((ka, a.id()), (kb, b.id()), order.direction));

        let page = matching
            .into_iter()
            .filter(|(key, record)| match &anchor {
                None => true,
                Some((anchor_key, anchor_id)) => {
                    compare((key, record.id()), (anchor_key, *anchor_id), order.direction)
                        == Ordering::Greater
                }
            })
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect();

        Ok(page)
    }

    async fn count(&self, filter: &F) -> Result<Option<u64>> {
        if !self.counting {
            return Ok(None);
        }
        let records = self.records.read().await;
        Ok(Some(records.iter().filter(|r| filter.matches(r)).count() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MatchAll, Record};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        rank: i64,
    }

    impl Item {
        fn new(id: &str, rank: i64) -> Self {
            Self {
                id: id.to_string(),
                rank,
            }
        }
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl OrderedRecord for Item {
        fn sort_value(&self, field: &str) -> Option<SortValue> {
            match field {
                "rank" => Some(SortValue::Integer(self.rank)),
                _ => None,
            }
        }
    }

    struct MinRank(i64);

    impl RecordFilter<Item> for MinRank {
        fn matches(&self, record: &Item) -> bool {
            record.rank >= self.0
        }
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn store() -> InMemoryStore<Item, MatchAll> {
        InMemoryStore::with_records(vec![
            Item::new("c", 2),
            Item::new("a", 1),
            Item::new("b", 2),
            Item::new("d", 3),
        ])
    }

    #[tokio::test]
    async fn test_orders_by_key_then_id() {
        let store = store();

        let asc = store
            .fetch_page(&MatchAll, &OrderBy::asc("rank"), None, 10)
            .await
            .unwrap();
        assert_eq!(ids(&asc), vec!["a", "b", "c", "d"]);

        let desc = store
            .fetch_page(&MatchAll, &OrderBy::desc("rank"), None, 10)
            .await
            .unwrap();
        assert_eq!(ids(&desc), vec!["d", "c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_resumes_strictly_after_cursor() {
        let store = store();

        let page = store
            .fetch_page(&MatchAll, &OrderBy::asc("rank"), Some("b"), 2)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["c", "d"]);

        let page = store
            .fetch_page(&MatchAll, &OrderBy::asc("id"), Some("c"), 10)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["d"]);
    }

    #[tokio::test]
    async fn test_cursor_outside_filter_still_positions() {
        let store: InMemoryStore<Item, MinRank> = InMemoryStore::with_records(vec![
            Item::new("a", 1),
            Item::new("b", 2),
            Item::new("c", 3),
        ]);

        // "a" is excluded by the filter but still marks the resume point
        let page = store
            .fetch_page(&MinRank(2), &OrderBy::asc("rank"), Some("a"), 10)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_missing_cursor_restart() {
        let store = store();
        let page = store
            .fetch_page(&MatchAll, &OrderBy::asc("rank"), Some("zzz"), 2)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_missing_cursor_exhausted() {
        let store = store().with_missing_cursor_policy(MissingCursorPolicy::Exhausted);
        let page = store
            .fetch_page(&MatchAll, &OrderBy::asc("rank"), Some("zzz"), 2)
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_order_field() {
        let store = store();
        let err = store
            .fetch_page(&MatchAll, &OrderBy::asc("nope"), None, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOrder { .. }));
    }

    #[tokio::test]
    async fn test_count() {
        let store: InMemoryStore<Item, MinRank> =
            InMemoryStore::with_records(vec![Item::new("a", 1), Item::new("b", 5)]);
        assert_eq!(store.count(&MinRank(2)).await.unwrap(), Some(1));

        let store = store.without_count();
        assert_eq!(store.count(&MinRank(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let store = store();
        assert_eq!(store.len().await, 4);

        store.insert(Item::new("e", 0)).await;
        store.insert(Item::new("a", 9)).await;
        assert_eq!(store.len().await, 5);

        let removed = store.remove("a").await;
        assert_eq!(removed, Some(Item::new("a", 9)));
        assert!(store.remove("a").await.is_none());
        assert_eq!(store.len().await, 4);
        assert!(!store.is_empty().await);
    }
}
