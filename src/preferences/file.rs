// SPDX-License-Identifier: MIT

//! Plist-file preferences backend.

use std::{
    fs,
    io::Cursor,
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use plist::{Dictionary, Value};
use tracing::debug;

use super::PrefStore;

/// Edits a property list file in place.
///
/// Reads detect XML vs binary; writes keep the detected format and the
/// original permissions, going through a temporary file and a rename.
pub struct PlistFileStore {
    path: PathBuf,
}

struct LoadedPlist {
    root: Dictionary,
    is_binary: bool,
}

impl PlistFileStore {
    pub fn new(path: PathBuf) -> Self {
        PlistFileStore { path }
    }

    fn load(&self) -> Result<LoadedPlist> {
        if !self.path.exists() {
            // a missing file reads as an empty domain, like CFPreferences
            return Ok(LoadedPlist {
                root: Dictionary::new(),
                is_binary: true,
            });
        }
        let buf = fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        // try to parse as XML first, and if that fails, fallback to another format
        let (value, is_binary) = match Value::from_reader_xml(Cursor::new(&buf[..])) {
            Ok(v) => (v, false),
            Err(_) => (
                Value::from_reader(Cursor::new(&buf[..]))
                    .with_context(|| format!("Plist parse error in {}", self.path.display()))?,
                true,
            ),
        };

        match value {
            Value::Dictionary(root) => Ok(LoadedPlist { root, is_binary }),
            _ => bail!("{} is not a dictionary plist", self.path.display()),
        }
    }

    fn save(&self, loaded: &LoadedPlist) -> Result<()> {
        let mut buf = Vec::new();
        let value = Value::Dictionary(loaded.root.clone());
        if loaded.is_binary {
            value.to_writer_binary(&mut buf).context("Plist write error")?;
        } else {
            value.to_writer_xml(&mut buf).context("Plist write error")?;
        }

        let dir = self
            .path
            .parent()
            .context("Invalid path: no parent directory")?;
        let file_name = self
            .path
            .file_name()
            .context("Invalid path: no file name")?;
        let tmp_path = dir.join(format!("{}.tmp", file_name.to_string_lossy()));

        let orig_perm = fs::metadata(&self.path).ok().map(|m| m.permissions());

        fs::write(&tmp_path, &buf)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        if let Some(perm) = orig_perm {
            fs::set_permissions(&tmp_path, perm)?;
        }
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), binary = loaded.is_binary, "plist saved");
        Ok(())
    }
}

impl PrefStore for PlistFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.root.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut loaded = self.load()?;
        loaded.root.insert(key.to_string(), value);
        self.save(&loaded)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Dictionary {
        let mut root = Dictionary::new();
        root.insert("content_visibility".into(), Value::Integer(3.into()));
        root.insert("other".into(), Value::String("kept".into()));
        root
    }

    #[test]
    fn missing_file_reads_as_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = PlistFileStore::new(dir.path().join("absent.plist"));
        assert_eq!(store.get("apps")?, None);
        Ok(())
    }

    #[test]
    fn xml_files_stay_xml_after_a_write() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ncprefs.plist");
        Value::Dictionary(sample()).to_file_xml(&path)?;

        let mut store = PlistFileStore::new(path.clone());
        store.set("content_visibility", Value::Integer(1.into()))?;

        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("<?xml"));
        assert_eq!(
            store
                .get("content_visibility")?
                .and_then(|v| v.as_signed_integer()),
            Some(1)
        );
        assert_eq!(
            store.get("other")?.and_then(|v| v.into_string()),
            Some("kept".to_string())
        );
        assert!(!dir.path().join("ncprefs.plist.tmp").exists());
        Ok(())
    }

    #[test]
    fn binary_files_stay_binary_after_a_write() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ncprefs.plist");
        Value::Dictionary(sample()).to_file_binary(&path)?;

        let mut store = PlistFileStore::new(path.clone());
        store.set("apps", Value::Array(Vec::new()))?;

        let bytes = fs::read(&path)?;
        assert!(bytes.starts_with(b"bplist00"));
        assert_eq!(store.get("apps")?, Some(Value::Array(Vec::new())));
        Ok(())
    }

    #[test]
    fn non_dictionary_root_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("weird.plist");
        Value::Array(Vec::new()).to_file_xml(&path)?;

        let store = PlistFileStore::new(path);
        assert!(store.get("apps").is_err());
        Ok(())
    }
}
