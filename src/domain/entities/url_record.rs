//! URL record entity and the lookup/aggregate types built around it.

use uuid::Uuid;

/// A stored mapping from a short code to an original URL.
///
/// Every field except `deleted` is fixed at creation. `deleted` only ever
/// moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: Uuid,
    pub short_code: String,
    pub original_url: String,
    pub owner_id: String,
    pub deleted: bool,
}

impl UrlRecord {
    /// Creates a fresh, non-deleted record with a new random id.
    pub fn new(short_code: String, original_url: String, owner_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_code,
            original_url,
            owner_id,
            deleted: false,
        }
    }

    /// Returns true if the record belongs to `owner_id`.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// A candidate code paired with the URL it should be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUrl {
    pub code: String,
    pub original_url: String,
}

impl PendingUrl {
    pub fn new(code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            original_url: original_url.into(),
        }
    }
}

/// Result of looking up a short code.
///
/// Soft-deleted records still carry their URL so callers can tell a
/// "gone" record apart from one that never existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Active(String),
    Deleted(String),
    NotFound,
}

impl Resolution {
    /// Builds a resolution from a stored record.
    pub fn from_record(record: &UrlRecord) -> Self {
        if record.deleted {
            Self::Deleted(record.original_url.clone())
        } else {
            Self::Active(record.original_url.clone())
        }
    }

    /// True when a record exists for the code, deleted or not.
    pub fn found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }

    /// The stored URL, or `None` for an unknown code.
    pub fn original_url(&self) -> Option<&str> {
        match self {
            Self::Active(url) | Self::Deleted(url) => Some(url),
            Self::NotFound => None,
        }
    }

    /// The URL only if the record is live; collapses "deleted" into "missing".
    pub fn into_active(self) -> Option<String> {
        match self {
            Self::Active(url) => Some(url),
            Self::Deleted(_) | Self::NotFound => None,
        }
    }
}

/// Global counters reported by a backend.
///
/// Both counts include soft-deleted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub users: u64,
    pub urls: u64,
}
