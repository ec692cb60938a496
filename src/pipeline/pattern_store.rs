// One JSON file per named pattern under the store directory:
// <base>/<name>.json = { "metadata": {...}, "events": [...] }
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::note_event::NoteEvent;

/// Open string-keyed metadata; unknown keys round-trip untouched.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pattern `{0}` not found")]
    NotFound(String),
    #[error("pattern storage i/o: {0}")]
    Io(#[from] io::Error),
    #[error("pattern `{name}`: {source}")]
    Malformed {
        name: String,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize)]
struct PatternFile {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    events: Vec<NoteEvent>,
}

pub struct PatternStore {
    base: PathBuf,
}

impl PatternStore {
    /// Opens (and creates if needed) the store directory.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base.join(format!("{name}.json"))
    }

    /// Whole-pattern overwrite: an existing name is fully replaced, never
    /// merged.
    pub fn save(
        &self,
        name: &str,
        metadata: &Metadata,
        events: &[NoteEvent],
    ) -> Result<(), StoreError> {
        let file = PatternFile {
            metadata: metadata.clone(),
            events: events.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| StoreError::Malformed {
            name: name.to_string(),
            source,
        })?;
        fs::write(self.file_path(name), json)?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<(Metadata, Vec<NoteEvent>), StoreError> {
        let text = read_named(&self.file_path(name), name)?;
        let file: PatternFile =
            serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                name: name.to_string(),
                source,
            })?;
        Ok((file.metadata, file.events))
    }

    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.file_path(name)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            other => Ok(other?),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file_path(name).exists()
    }
}

fn read_named(path: &Path, name: &str) -> Result<String, StoreError> {
    match fs::read_to_string(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(StoreError::NotFound(name.to_string()))
        }
        other => Ok(other?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, PatternStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PatternStore::new(dir.path().join("patterns")).unwrap();
        (dir, store)
    }

    fn sample_metadata() -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("name".into(), json!("Test Pattern"));
        meta.insert("tempo".into(), json!(120));
        meta
    }

    fn sample_events() -> Vec<NoteEvent> {
        vec![
            NoteEvent::new(0, 60, 0.8),
            NoteEvent::new(500, 64, 0.6),
            NoteEvent::new(1000, 67, 0.9).on_channel(1),
        ]
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        store
            .save("test_pattern", &sample_metadata(), &sample_events())
            .unwrap();

        let (meta, events) = store.load("test_pattern").unwrap();
        assert_eq!(meta, sample_metadata());
        assert_eq!(events, sample_events());
    }

    #[test]
    fn overwrite_fully_replaces() {
        let (_dir, store) = store();
        let mut v1 = Metadata::new();
        v1.insert("version".into(), json!(1));
        v1.insert("only_in_v1".into(), json!(true));
        store
            .save("overwrite", &v1, &[NoteEvent::new(0, 60, 1.0)])
            .unwrap();

        let mut v2 = Metadata::new();
        v2.insert("version".into(), json!(2));
        store
            .save("overwrite", &v2, &[NoteEvent::new(0, 72, 0.5)])
            .unwrap();

        let (meta, events) = store.load("overwrite").unwrap();
        assert_eq!(meta.get("version"), Some(&json!(2)));
        assert!(meta.get("only_in_v1").is_none(), "fields must not merge");
        assert_eq!(events[0].pitch, 72);
    }

    #[test]
    fn unknown_metadata_round_trips_losslessly() {
        let (_dir, store) = store();
        let mut meta = Metadata::new();
        meta.insert("custom_widget".into(), json!({"nested": [1, 2, 3]}));
        meta.insert("flag".into(), json!(false));
        store.save("custom", &meta, &[]).unwrap();

        let (loaded, _) = store.load("custom").unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn load_unknown_is_not_found() {
        let (_dir, store) = store();
        match store.load("nonexistent") {
            Err(StoreError::NotFound(name)) => assert_eq!(name, "nonexistent"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.delete("nonexistent"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn delete_removes_pattern() {
        let (_dir, store) = store();
        store.save("to_delete", &Metadata::new(), &[]).unwrap();
        assert!(store.exists("to_delete"));

        store.delete("to_delete").unwrap();
        assert!(!store.exists("to_delete"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_is_sorted() {
        let (_dir, store) = store();
        for name in ["charlie", "alpha", "bravo"] {
            store.save(name, &Metadata::new(), &[]).unwrap();
        }
        assert_eq!(store.list().unwrap(), vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn malformed_file_is_reported_not_swallowed() {
        let (_dir, store) = store();
        fs::write(store.file_path("broken"), "not json at all").unwrap();
        assert!(matches!(
            store.load("broken"),
            Err(StoreError::Malformed { .. })
        ));
    }
}
