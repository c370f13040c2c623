/// Keyed cache of shared resources
///
/// Entries live in a slot arena; a hash index maps each key's `ResourceId`
/// to its slot. The cache holds one `Arc` per entry, callers receive clones,
/// so a resource lives as long as the cache or any caller keeps it.
///
/// Loading follows a check-then-load convention:
///
/// ```text
/// contains(key) ──yes──► get(key)
///       │
///       no
///       ▼
/// load(key, ctor)        ctor runs once, entry is registered on success
/// ```
///
/// `load_or_get` performs the same sequence as one call. `load` on a key that
/// is already present is a caller error and never runs the constructor.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::resource::{ResourceId, ResourceKey};

new_key_type! {
    /// Slot of an entry in the cache arena
    pub struct EntryKey;
}

/// A key and the shared value registered under it
#[derive(Debug)]
pub struct CacheEntry<T> {
    key: ResourceKey,
    value: Arc<T>,
}

impl<T> CacheEntry<T> {
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn value(&self) -> &Arc<T> {
        &self.value
    }
}

pub struct ResourceCache<T> {
    /// Resource kind, used in logs and errors ("texture", "mesh", ...)
    kind: &'static str,
    entries: SlotMap<EntryKey, CacheEntry<T>>,
    index: FxHashMap<ResourceId, EntryKey>,
    id_of: fn(&str) -> ResourceId,
}

impl<T> ResourceCache<T> {
    /// Create an empty cache for resources of `kind`
    pub fn new(kind: &'static str) -> Self {
        Self::with_id_fn(kind, ResourceId::of)
    }

    pub(crate) fn with_id_fn(kind: &'static str, id_of: fn(&str) -> ResourceId) -> Self {
        Self {
            kind,
            entries: SlotMap::with_key(),
            index: FxHashMap::default(),
            id_of,
        }
    }

    /// Resource kind this cache holds
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Find the entry for `key`, reporting an id collision as an error
    fn lookup(&self, key: &str) -> Result<Option<&CacheEntry<T>>> {
        let id = (self.id_of)(key);
        let Some(slot) = self.index.get(&id) else {
            return Ok(None);
        };
        let Some(entry) = self.entries.get(*slot) else {
            return Ok(None);
        };
        if entry.key.as_str() != key {
            crate::engine_error!(
                "kiln::ResourceCache",
                "{} key '{}' collides with '{}'",
                self.kind,
                key,
                entry.key
            );
            return Err(Error::KeyCollision {
                requested: key.to_string(),
                existing: entry.key.to_string(),
            });
        }
        Ok(Some(entry))
    }

    /// Whether a resource was loaded under `key`
    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        matches!(self.lookup(key.as_ref()), Ok(Some(_)))
    }

    /// Shared reference to the resource under `key`
    pub fn get(&self, key: impl AsRef<str>) -> Result<Arc<T>> {
        let key = key.as_ref();
        match self.lookup(key)? {
            Some(entry) => Ok(entry.value.clone()),
            None => Err(Error::ResourceNotFound(format!("{} '{}'", self.kind, key))),
        }
    }

    /// Construct a resource and register it under `key`
    ///
    /// Fails with `DuplicateResource` if the key is already present; the
    /// constructor is not run in that case. A constructor error propagates
    /// and leaves the cache unchanged.
    pub fn load<F>(&mut self, key: impl Into<ResourceKey>, constructor: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let key = key.into();
        if self.lookup(key.as_str())?.is_some() {
            crate::engine_error!(
                "kiln::ResourceCache",
                "{} '{}' is already loaded",
                self.kind,
                key
            );
            return Err(Error::DuplicateResource(format!("{} '{}'", self.kind, key)));
        }

        let value = Arc::new(constructor()?);
        let id = (self.id_of)(key.as_str());
        crate::engine_debug!("kiln::ResourceCache", "Loaded {} '{}'", self.kind, key);
        let slot = self.entries.insert(CacheEntry { key, value: value.clone() });
        self.index.insert(id, slot);
        Ok(value)
    }

    /// Register an already constructed resource
    pub fn insert(&mut self, key: impl Into<ResourceKey>, value: T) -> Result<Arc<T>> {
        self.load(key, || Ok(value))
    }

    /// Return the resource under `key`, constructing it first if absent
    pub fn load_or_get<F>(&mut self, key: impl Into<ResourceKey>, constructor: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let key = key.into();
        if let Some(entry) = self.lookup(key.as_str())? {
            crate::engine_debug!("kiln::ResourceCache", "Reusing {} '{}'", self.kind, key);
            return Ok(entry.value.clone());
        }
        self.load(key, constructor)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of every entry (arena order)
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.entries.values().map(|entry| &entry.key)
    }

    /// Every entry (arena order)
    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry<T>> {
        self.entries.values()
    }

    /// Drop every entry held by the cache
    ///
    /// Resources still referenced elsewhere stay alive until those
    /// references go away.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            crate::engine_debug!(
                "kiln::ResourceCache",
                "Clearing {} {} entries",
                self.entries.len(),
                self.kind
            );
        }
        self.index.clear();
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "resource_cache_tests.rs"]
mod tests;
