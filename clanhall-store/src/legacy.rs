//! Legacy document store
//!
//! The pre-relational deployment kept the whole directory in one YAML
//! document with a `Clans` mapping. This module models that document and
//! wraps the file it lives in; the migrator consumes it read-only and the
//! store facade clears the section after a complete import.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// One clan entry in the legacy document.
///
/// Legacy files are hand-edited and messy; missing scalar fields degrade
/// to defaults instead of failing the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyClan {
    #[serde(rename = "Founder", default)]
    pub founder: String,
    #[serde(rename = "Leader", default)]
    pub leader: String,
    #[serde(rename = "Money", default)]
    pub money: f64,
    #[serde(rename = "Privacy", default)]
    pub privacy: String,
    #[serde(rename = "Users", default)]
    pub users: Vec<String>,
}

/// The legacy document. Absence of the `Clans` section means there is
/// nothing to migrate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyData {
    #[serde(rename = "Clans", default, skip_serializing_if = "Option::is_none")]
    pub clans: Option<BTreeMap<String, LegacyClan>>,

    /// Sections this layer doesn't own pass through untouched on save.
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_yaml::Value>,
}

impl LegacyData {
    /// True when there is a non-empty `Clans` section.
    pub fn has_clans(&self) -> bool {
        self.clans.as_ref().is_some_and(|clans| !clans.is_empty())
    }
}

/// File-backed reader/writer for the legacy document.
#[derive(Debug)]
pub struct LegacyStore {
    path: PathBuf,
    data: LegacyData,
}

impl LegacyStore {
    /// Load the document from disk. A missing file is an empty document,
    /// not an error; the first save will create it.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| StoreError::legacy_io(path.display().to_string(), e))?;
            serde_yaml::from_str(&content)
                .map_err(|e| StoreError::legacy_format(path.display().to_string(), e.to_string()))?
        } else {
            LegacyData::default()
        };

        Ok(Self { path, data })
    }

    pub fn data(&self) -> &LegacyData {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the `Clans` section. Callers must [`save`](Self::save) for the
    /// removal to stick.
    pub fn clear_clans(&mut self) {
        self.data.clans = None;
    }

    /// Persist the document back to its file.
    pub fn save(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::legacy_io(self.path.display().to_string(), e))?;
        }

        let content = serde_yaml::to_string(&self.data)
            .map_err(|e| StoreError::legacy_format(self.path.display().to_string(), e.to_string()))?;

        fs::write(&self.path, content)
            .map_err(|e| StoreError::legacy_io(self.path.display().to_string(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
Clans:
  Reds:
    Founder: u1
    Leader: u1
    Money: 100.0
    Privacy: open
    Users:
      - u1
      - u2
  Blues:
    Founder: u3
    Leader: u4
    Money: 0.5
    Privacy: invite
    Users:
      - u3
      - u4
      - u5
Settings:
  motd: "hello"
"#;

    fn write_sample(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("data.yml");
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn parses_clans_section() {
        let dir = TempDir::new().unwrap();
        let store = LegacyStore::load(write_sample(&dir)).unwrap();

        let clans = store.data().clans.as_ref().unwrap();
        assert_eq!(clans.len(), 2);

        let reds = &clans["Reds"];
        assert_eq!(reds.founder, "u1");
        assert_eq!(reds.leader, "u1");
        assert_eq!(reds.money, 100.0);
        assert_eq!(reds.privacy, "open");
        assert_eq!(reds.users, vec!["u1", "u2"]);
    }

    #[test]
    fn missing_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        let store = LegacyStore::load(dir.path().join("absent.yml")).unwrap();
        assert!(!store.data().has_clans());
    }

    #[test]
    fn missing_clans_section_is_fine() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.yml");
        fs::write(&path, "Settings:\n  motd: hi\n").unwrap();

        let store = LegacyStore::load(&path).unwrap();
        assert!(!store.data().has_clans());
        assert!(store.data().clans.is_none());
    }

    #[test]
    fn tolerates_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.yml");
        fs::write(&path, "Clans:\n  Bare: {}\n").unwrap();

        let store = LegacyStore::load(&path).unwrap();
        let bare = &store.data().clans.as_ref().unwrap()["Bare"];
        assert_eq!(bare.founder, "");
        assert_eq!(bare.money, 0.0);
        assert!(bare.users.is_empty());
    }

    #[test]
    fn clear_and_save_removes_only_clans() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let mut store = LegacyStore::load(&path).unwrap();
        store.clear_clans();
        store.save().unwrap();

        let reloaded = LegacyStore::load(&path).unwrap();
        assert!(reloaded.data().clans.is_none());
        // Foreign sections survive the rewrite.
        assert!(reloaded.data().rest.contains_key("Settings"));
    }

    #[test]
    fn malformed_document_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.yml");
        fs::write(&path, "Clans: [not, a, mapping]\n").unwrap();

        let err = LegacyStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::LegacyFormat { .. }));
    }
}
