//! Memoized `select` results.
//!
//! Entries are keyed by a hash of the row contents plus the predicate text, so an
//! `update` that keeps the row count still misses the cache.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::debug;

use super::rows::{self, Predicate};
use crate::storage::Row;

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
struct CacheKey {
    content: u64,
    predicate: String,
}

impl CacheKey {
    fn new(rows: &[Row], predicate: Option<&Predicate>) -> Self {
        let mut hasher = DefaultHasher::new();
        rows.hash(&mut hasher);
        let predicate = match predicate {
            Some(p) => format!("{p:?}"),
            None => "*".to_string(),
        };
        Self {
            content: hasher.finish(),
            predicate,
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectCache {
    capacity: usize,
    entries: HashMap<CacheKey, Vec<Row>>,
    hits: u64,
}

impl SelectCache {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    pub fn select(&mut self, rows: &[Row], predicate: Option<&Predicate>) -> Vec<Row> {
        if self.capacity == 0 {
            return rows::select(rows, predicate);
        }
        let key = CacheKey::new(rows, predicate);
        if let Some(found) = self.entries.get(&key) {
            self.hits += 1;
            debug!(predicate = %key.predicate, "select served from cache");
            return found.clone();
        }
        let result = rows::select(rows, predicate);
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        debug!(predicate = %key.predicate, "select result cached");
        self.entries.insert(key, result.clone());
        result
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::DataValue;

    fn row(id: i64, flag: bool) -> Row {
        [("id", DataValue::Int(id)), ("flag", DataValue::Bool(flag))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_hit_on_identical_input() {
        let mut cache = SelectCache::new(8);
        let rows = vec![row(1, true), row(2, false)];
        let p = Predicate::from([("flag".to_string(), DataValue::Bool(true))]);
        assert_eq!(cache.select(&rows, Some(&p)), vec![row(1, true)]);
        assert_eq!(cache.select(&rows, Some(&p)), vec![row(1, true)]);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_same_count_different_content_misses() {
        let mut cache = SelectCache::new(8);
        let p = Predicate::from([("flag".to_string(), DataValue::Bool(true))]);
        let before = vec![row(1, true), row(2, false)];
        let after = vec![row(1, false), row(2, false)];
        assert_eq!(cache.select(&before, Some(&p)).len(), 1);
        assert!(cache.select(&after, Some(&p)).is_empty());
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_capacity_bounds_entries() {
        let mut cache = SelectCache::new(2);
        for id in 1..=5 {
            cache.select(&[row(id, true)], None);
        }
        assert!(cache.len() <= 2);

        let mut off = SelectCache::new(0);
        off.select(&[row(1, true)], None);
        assert!(off.is_empty());
    }
}
