use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;

/// Opaque durable string-keyed map the store persists into. A `set` is
/// assumed atomic at single-key granularity.
pub trait PersistenceMedium: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<M: PersistenceMedium + ?Sized> PersistenceMedium for Arc<M> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Ephemeral medium for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryMedium {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Durable medium keeping one file per key under a base directory. Writes go
/// through a temp file and a rename, so a reader never sees a half-written
/// value.
pub struct FileMedium {
    base_dir: PathBuf,
}

impl FileMedium {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("unable to prepare {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", safe_file_name(key)))
    }
}

impl PersistenceMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .with_context(|| format!("unable to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("unable to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("unable to delete {}", path.display()))?;
        }
        Ok(())
    }
}

/// Turns a key like `"@regador:plants"` into a filesystem-safe name
/// (`"regador_plants"`): ASCII alphanumerics survive lowercased, everything
/// else collapses to single underscores.
fn safe_file_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut last_was_underscore = false;
    for c in key.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_become_safe_file_names() {
        assert_eq!(safe_file_name("@regador:plants"), "regador_plants");
        assert_eq!(safe_file_name("@regador:user"), "regador_user");
        assert_eq!(safe_file_name("a//b..C"), "a_b_c");
    }

    #[test]
    fn memory_medium_gets_what_it_set() {
        let medium = MemoryMedium::new();
        assert!(medium.get("k").unwrap().is_none());
        medium.set("k", "v").unwrap();
        assert_eq!(medium.get("k").unwrap().as_deref(), Some("v"));
        medium.remove("k").unwrap();
        assert!(medium.get("k").unwrap().is_none());
    }

    #[test]
    fn file_medium_round_trips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let medium = FileMedium::new(dir.path()).unwrap();
            medium.set("@regador:plants", "{}").unwrap();
        }
        let medium = FileMedium::new(dir.path()).unwrap();
        assert_eq!(
            medium.get("@regador:plants").unwrap().as_deref(),
            Some("{}")
        );
        medium.remove("@regador:plants").unwrap();
        assert!(medium.get("@regador:plants").unwrap().is_none());
    }

    #[test]
    fn removing_an_absent_key_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::new(dir.path()).unwrap();
        medium.remove("never-set").unwrap();
    }
}
