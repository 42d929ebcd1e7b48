use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::model::Record;

const DRAFT_KEY_PREFIX: &str = "supervisorForm";
const DRAFT_LIST_KEY: &str = "savedForms";

/// String key-value backend drafts are kept in.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&mut self, key: &str) -> Result<(), Error>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry under a directory.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Creates `dir` if it does not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(DirStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// One file per key. Bytes outside `[A-Za-z0-9-]`, `_` included, are
    /// written as `_XX` hex so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' {
                name.push(char::from(b));
            } else {
                name.push_str(&format!("_{b:02X}"));
            }
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Listing line for a saved draft.
#[derive(Clone, Debug, PartialEq)]
pub struct DraftSummary {
    pub id: String,
    pub last_saved: Option<DateTime<Utc>>,
    pub location: String,
    pub supervisor: String,
    pub verified: bool,
}

/// Saved, not yet submitted records. Photo bytes, photo source paths and the
/// signature are never written; reloaded photos are metadata-only stubs.
pub struct Drafts<S> {
    store: S,
}

impl<S: KeyValueStore> Drafts<S> {
    pub fn new(store: S) -> Self {
        Drafts { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Save under `existing_id`, or under a new `form_<epoch millis>` id.
    /// A new id already taken in the listing is bumped to the next free
    /// number. Returns the id used.
    pub fn save(&mut self, record: &Record, existing_id: Option<&str>) -> Result<String, Error> {
        let mut ids = self.list_ids()?;
        let id = match existing_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => {
                let mut millis = Utc::now().timestamp_millis();
                while ids.iter().any(|taken| *taken == format!("form_{millis}")) {
                    millis += 1;
                }
                format!("form_{millis}")
            }
        };

        let mut stored = record.clone();
        stored.id = Some(id.clone());
        stored.last_saved = Some(Utc::now());
        stored.photos = record.photos.iter().map(|p| p.stub()).collect();
        stored.signature = None;

        self.store
            .set(&draft_key(&id), &serde_json::to_string(&stored)?)?;

        if !ids.contains(&id) {
            ids.push(id.clone());
            self.store
                .set(DRAFT_LIST_KEY, &serde_json::to_string(&ids)?)?;
        }

        log::debug!("Saved draft {id} ({} photos)", stored.photos.len());
        Ok(id)
    }

    /// Ids in the order they were first saved.
    pub fn list_ids(&self) -> Result<Vec<String>, Error> {
        match self.store.get(DRAFT_LIST_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn load(&self, id: &str) -> Result<Option<Record>, Error> {
        match self.store.get(&draft_key(id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Like [`Drafts::load`], but a missing draft is an error.
    pub fn require(&self, id: &str) -> Result<Record, Error> {
        self.load(id)?
            .ok_or_else(|| Error::DraftNotFound(id.to_string()))
    }

    /// Removes the draft and its list entry. Returns whether it existed.
    pub fn delete(&mut self, id: &str) -> Result<bool, Error> {
        let existed = self.store.get(&draft_key(id))?.is_some();
        self.store.remove(&draft_key(id))?;

        let ids: Vec<String> = self.list_ids()?.into_iter().filter(|i| i != id).collect();
        self.store
            .set(DRAFT_LIST_KEY, &serde_json::to_string(&ids)?)?;
        Ok(existed)
    }

    /// One summary per listed draft. Drafts that fail to load are listed
    /// with placeholders.
    pub fn summaries(&self) -> Result<Vec<DraftSummary>, Error> {
        let ids = self.list_ids()?;
        Ok(ids
            .into_iter()
            .map(|id| {
                let record = self.load(&id).unwrap_or_else(|e| {
                    log::warn!("Draft {id} unreadable: {e}");
                    None
                });
                summarize(id, record.as_ref())
            })
            .collect())
    }
}

fn draft_key(id: &str) -> String {
    format!("{DRAFT_KEY_PREFIX}_{id}")
}

fn summarize(id: String, record: Option<&Record>) -> DraftSummary {
    let non_blank = |s: Option<&String>, fallback: &str| {
        s.filter(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };
    DraftSummary {
        id,
        last_saved: record.and_then(|r| r.last_saved),
        location: non_blank(record.map(|r| &r.visit_location), "Sin ubicación"),
        supervisor: non_blank(record.map(|r| &r.supervisor_name), "Sin supervisor"),
        verified: record.is_some_and(|r| r.location_verified),
    }
}
