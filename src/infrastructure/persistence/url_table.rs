//! Indexed in-process record table shared by the memory and file backends.
//!
//! The table itself is not synchronised; owners wrap it in a single
//! reader/writer lock so a whole batch is applied under one exclusive guard.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{PendingUrl, Resolution, StoreStats, UrlRecord};
use crate::domain::errors::StorageError;

#[derive(Debug, Clone, Default)]
pub(crate) struct UrlTable {
    by_code: HashMap<String, UrlRecord>,
    /// original URL → short code, covering deleted records too.
    by_url: HashMap<String, String>,
}

/// Records to insert plus the final URL → code mapping for a batch.
#[derive(Debug)]
pub(crate) struct BatchPlan {
    pub fresh: Vec<UrlRecord>,
    pub resolved: HashMap<String, String>,
}

/// Counts produced by [`UrlTable::mark_deleted`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DeleteTally {
    /// Owned records addressed by the request.
    pub matched: u64,
    /// Records that flipped from live to deleted.
    pub flipped: u64,
}

impl UrlTable {
    /// Builds a table from loaded records; later duplicates of a code win,
    /// the first record seen for a URL keeps the URL index.
    pub fn from_records(records: impl IntoIterator<Item = UrlRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.insert(record);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn resolve(&self, code: &str) -> Resolution {
        self.by_code
            .get(code)
            .map(Resolution::from_record)
            .unwrap_or(Resolution::NotFound)
    }

    /// Works out what a batch insert would do without touching the table.
    ///
    /// URLs already stored resolve to their existing code. Repeated URLs in
    /// the batch collapse onto the first candidate.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CodeCollision`] if a candidate code for a new
    /// URL is already stored or offered twice in the batch.
    pub fn plan(&self, entries: Vec<PendingUrl>, owner_id: &str) -> Result<BatchPlan, StorageError> {
        let mut resolved = HashMap::with_capacity(entries.len());
        let mut fresh = Vec::new();
        let mut claimed = HashSet::new();

        for PendingUrl { code, original_url } in entries {
            if resolved.contains_key(&original_url) {
                continue;
            }

            if let Some(existing) = self.by_url.get(&original_url) {
                resolved.insert(original_url, existing.clone());
                continue;
            }

            if self.by_code.contains_key(&code) || !claimed.insert(code.clone()) {
                return Err(StorageError::CodeCollision(code));
            }

            resolved.insert(original_url.clone(), code.clone());
            fresh.push(UrlRecord::new(code, original_url, owner_id.to_string()));
        }

        Ok(BatchPlan { fresh, resolved })
    }

    pub fn insert(&mut self, record: UrlRecord) {
        self.by_url
            .entry(record.original_url.clone())
            .or_insert_with(|| record.short_code.clone());
        self.by_code.insert(record.short_code.clone(), record);
    }

    pub fn apply(&mut self, plan: BatchPlan) -> HashMap<String, String> {
        for record in plan.fresh {
            self.insert(record);
        }
        plan.resolved
    }

    /// Flags every listed record owned by `owner_id` as deleted.
    pub fn mark_deleted(&mut self, codes: &[String], owner_id: &str) -> DeleteTally {
        let mut tally = DeleteTally::default();
        let unique: HashSet<&String> = codes.iter().collect();

        for code in unique {
            let Some(record) = self.by_code.get_mut(code) else {
                continue;
            };
            if !record.is_owned_by(owner_id) {
                continue;
            }

            tally.matched += 1;
            if !record.deleted {
                record.deleted = true;
                tally.flipped += 1;
            }
        }

        tally
    }

    /// Live records of one owner, ordered by short code.
    pub fn user_records(&self, owner_id: &str) -> Vec<UrlRecord> {
        let mut records: Vec<UrlRecord> = self
            .by_code
            .values()
            .filter(|r| r.is_owned_by(owner_id) && !r.deleted)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.short_code.cmp(&b.short_code));
        records
    }

    pub fn stats(&self) -> StoreStats {
        let users: HashSet<&str> = self.by_code.values().map(|r| r.owner_id.as_str()).collect();
        StoreStats {
            users: users.len() as u64,
            urls: self.by_code.len() as u64,
        }
    }

    /// All records ordered by short code.
    pub fn records(&self) -> Vec<&UrlRecord> {
        let mut records: Vec<&UrlRecord> = self.by_code.values().collect();
        records.sort_by(|a, b| a.short_code.cmp(&b.short_code));
        records
    }
}
