//! Content Store collaborator: persistence contract, client-side TTL cache,
//! and debounced save scheduling.
//!
//! The engine is host-driven and single-threaded; there are no background
//! timers here. Both the cache and the debouncer take the current `Instant`
//! from the caller and compare it against stored deadlines, so behavior is
//! deterministic and testable.

use crate::content::{ContentDocument, DocumentSummary};
use crate::error::{FolioError, FolioResult};
use crate::styling::Styling;
use crate::validate::validate_slug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// TTL for the cached document list.
pub const LIST_TTL: Duration = Duration::from_secs(120);
/// TTL for cached single-document reads.
pub const DETAIL_TTL: Duration = Duration::from_secs(300);
/// Idle delay before a pending save fires.
pub const SAVE_DEBOUNCE: Duration = Duration::from_secs(2);

const DETAIL_KEY_PREFIX: &str = "portfolio:";
const LIST_KEY: &str = "portfolio:list";

/// One persisted portfolio document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDocument {
    pub id: String,
    pub title: String,
    pub template_id: String,
    #[serde(default)]
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub content: ContentDocument,
    #[serde(default)]
    pub styling: Styling,
    /// Monotonic revision stamp maintained by the store.
    #[serde(default)]
    pub updated_at: u64,
}

impl PortfolioDocument {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            published: self.published,
            slug: self.slug.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Persistence contract consumed by the engine. Saves take a partial update
/// (only the changed sections) and return the stored document.
pub trait PortfolioStore {
    fn load(&mut self, id: &str) -> FolioResult<PortfolioDocument>;
    fn save(&mut self, id: &str, delta: &ContentDocument) -> FolioResult<PortfolioDocument>;
    fn delete(&mut self, id: &str) -> FolioResult<()>;
    fn set_published(
        &mut self,
        id: &str,
        published: bool,
        slug: Option<&str>,
    ) -> FolioResult<PortfolioDocument>;
    fn list(&mut self) -> FolioResult<Vec<DocumentSummary>>;
}

/// In-memory store used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, PortfolioDocument>,
    revision: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut document: PortfolioDocument) {
        self.revision += 1;
        document.updated_at = self.revision;
        self.documents.insert(document.id.clone(), document);
    }

    fn get_mut(&mut self, id: &str) -> FolioResult<&mut PortfolioDocument> {
        self.documents
            .get_mut(id)
            .ok_or_else(|| FolioError::DocumentNotFound { id: id.to_string() })
    }
}

impl PortfolioStore for MemoryStore {
    fn load(&mut self, id: &str) -> FolioResult<PortfolioDocument> {
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| FolioError::DocumentNotFound { id: id.to_string() })
    }

    fn save(&mut self, id: &str, delta: &ContentDocument) -> FolioResult<PortfolioDocument> {
        self.revision += 1;
        let revision = self.revision;
        let document = self.get_mut(id)?;
        document.content = document.content.merged_with(delta);
        document.updated_at = revision;
        Ok(document.clone())
    }

    fn delete(&mut self, id: &str) -> FolioResult<()> {
        self.documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| FolioError::DocumentNotFound { id: id.to_string() })
    }

    fn set_published(
        &mut self,
        id: &str,
        published: bool,
        slug: Option<&str>,
    ) -> FolioResult<PortfolioDocument> {
        if let Some(slug) = slug {
            validate_slug(slug)?;
        }
        self.revision += 1;
        let revision = self.revision;
        let document = self.get_mut(id)?;
        document.published = published;
        if let Some(slug) = slug {
            document.slug = Some(slug.to_string());
        }
        document.updated_at = revision;
        Ok(document.clone())
    }

    fn list(&mut self) -> FolioResult<Vec<DocumentSummary>> {
        let mut summaries: Vec<_> = self.documents.values().map(|d| d.summary()).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}

// ─── TTL cache ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: Instant,
}

/// Explicit key → `{value, expires_at}` cache. Entries are invalidated on
/// every mutating operation rather than waiting for expiry.
#[derive(Debug, Default)]
pub struct TtlCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
}

impl<T> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str, now: Instant) -> Option<&T> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= now {
            return None;
        }
        Some(&entry.value)
    }

    pub fn insert(&mut self, key: &str, value: T, ttl: Duration, now: Instant) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn invalidate_prefix(&mut self, prefix: &str) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Drops entries whose deadline has passed.
    pub fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wraps a backend store with the TTL cache (2 min list, 5 min detail) and
/// write-through invalidation.
///
/// Methods take `now` explicitly, so this type does not implement
/// [`PortfolioStore`] itself; it is the host-facing layer over one.
pub struct CachingStore<S> {
    inner: S,
    detail: TtlCache<PortfolioDocument>,
    list: TtlCache<Vec<DocumentSummary>>,
}

impl<S: PortfolioStore> CachingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            detail: TtlCache::new(),
            list: TtlCache::new(),
        }
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn load(&mut self, id: &str, now: Instant) -> FolioResult<PortfolioDocument> {
        let key = detail_key(id);
        if let Some(document) = self.detail.get(&key, now) {
            debug!(id = %id, "document served from cache");
            return Ok(document.clone());
        }
        let document = self.inner.load(id)?;
        self.detail.insert(&key, document.clone(), DETAIL_TTL, now);
        Ok(document)
    }

    pub fn save(
        &mut self,
        id: &str,
        delta: &ContentDocument,
        now: Instant,
    ) -> FolioResult<PortfolioDocument> {
        let document = self.inner.save(id, delta)?;
        self.invalidate_for(id);
        self.detail
            .insert(&detail_key(id), document.clone(), DETAIL_TTL, now);
        Ok(document)
    }

    pub fn delete(&mut self, id: &str) -> FolioResult<()> {
        self.inner.delete(id)?;
        self.invalidate_for(id);
        Ok(())
    }

    pub fn set_published(
        &mut self,
        id: &str,
        published: bool,
        slug: Option<&str>,
        now: Instant,
    ) -> FolioResult<PortfolioDocument> {
        let document = self.inner.set_published(id, published, slug)?;
        self.invalidate_for(id);
        self.detail
            .insert(&detail_key(id), document.clone(), DETAIL_TTL, now);
        Ok(document)
    }

    pub fn list(&mut self, now: Instant) -> FolioResult<Vec<DocumentSummary>> {
        if let Some(summaries) = self.list.get(LIST_KEY, now) {
            debug!("document list served from cache");
            return Ok(summaries.clone());
        }
        let summaries = self.inner.list()?;
        self.list.insert(LIST_KEY, summaries.clone(), LIST_TTL, now);
        Ok(summaries)
    }

    fn invalidate_for(&mut self, id: &str) {
        self.detail.invalidate(&detail_key(id));
        self.list.invalidate(LIST_KEY);
    }
}

fn detail_key(id: &str) -> String {
    format!("{}{}", DETAIL_KEY_PREFIX, id)
}

// ─── Debounced saves ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct PendingSave {
    delta: ContentDocument,
    deadline: Instant,
}

/// Coalesces rapid edits into one save per document after an idle delay.
///
/// A new edit before the delay elapses cancels and restarts that document's
/// timer; documents debounce independently of each other.
#[derive(Debug)]
pub struct SaveDebouncer {
    delay: Duration,
    pending: HashMap<String, PendingSave>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(SAVE_DEBOUNCE)
    }
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Merges the delta into the document's pending save and restarts its
    /// deadline.
    pub fn schedule(&mut self, id: &str, delta: &ContentDocument, now: Instant) {
        let deadline = now + self.delay;
        match self.pending.get_mut(id) {
            Some(pending) => {
                pending.delta = pending.delta.merged_with(delta);
                pending.deadline = deadline;
            }
            None => {
                self.pending.insert(
                    id.to_string(),
                    PendingSave {
                        delta: delta.clone(),
                        deadline,
                    },
                );
            }
        }
    }

    /// Drains and returns saves whose idle delay has elapsed.
    pub fn due(&mut self, now: Instant) -> Vec<(String, ContentDocument)> {
        let ready: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();
        ready
            .into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|p| (id, p.delta)))
            .collect()
    }

    /// Drops a document's pending save (e.g. after its page closes without
    /// wanting the save).
    pub fn cancel(&mut self, id: &str) -> Option<ContentDocument> {
        self.pending.remove(id).map(|p| p.delta)
    }

    /// Drains every pending save regardless of deadline (explicit save-now).
    pub fn flush_all(&mut self) -> Vec<(String, ContentDocument)> {
        self.pending
            .drain()
            .map(|(id, p)| (id, p.delta))
            .collect()
    }

    /// Earliest pending deadline, for hosts that schedule a wakeup.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    pub fn has_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }
}
