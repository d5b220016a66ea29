use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use vcore_types::{CoreError, Result};

/// Contract for components that can save and restore their state for
/// recovery purposes.
pub trait Checkpoint: Send + Sync {
    fn save_data(&self, checkpoint_id: &str, data: &[u8]) -> Result<()>;
    fn load_data(&self, checkpoint_id: &str) -> Result<Vec<u8>>;
    fn list_checkpoints(&self) -> Result<Vec<String>>;
    fn verify_checkpoint(&self, checkpoint_id: &str) -> Result<bool>;
    fn cleanup_old_checkpoints(&self, keep_count: usize) -> Result<()>;
}

/// File-backed `Checkpoint`: `<id>.checkpoint` holds raw bytes, `<id>.meta`
/// holds `timestamp=`/`hash=`/`version=`/`magic=` lines.
pub struct FileCheckpoint {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileCheckpoint {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| CoreError::InvalidInput(format!("creating checkpoint dir: {e}")))?;
        Ok(FileCheckpoint {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn checkpoint_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.checkpoint"))
    }

    fn meta_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.meta"))
    }

    fn hash_file(path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .map_err(|e| CoreError::InvalidInput(format!("reading {}: {e}", path.display())))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    fn write_metadata(&self, id: &str, data_hash: &str) -> Result<()> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let content = format!(
            "timestamp={timestamp}\nhash={data_hash}\nversion=1.0\nmagic=SLONANA_CHECKPOINT\n"
        );
        std::fs::write(self.meta_path(id), content)
            .map_err(|e| CoreError::InvalidInput(format!("writing metadata: {e}")))
    }

    fn read_metadata(&self, id: &str) -> Result<HashMap<String, String>> {
        let raw = std::fs::read_to_string(self.meta_path(id))
            .map_err(|e| CoreError::InvalidInput(format!("reading metadata: {e}")))?;
        Ok(raw
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }
}

impl Checkpoint for FileCheckpoint {
    fn save_data(&self, checkpoint_id: &str, data: &[u8]) -> Result<()> {
        let _guard = self.lock.lock().unwrap();
        let path = self.checkpoint_path(checkpoint_id);
        std::fs::write(&path, data)
            .map_err(|e| CoreError::InvalidInput(format!("writing checkpoint: {e}")))?;
        let hash = Self::hash_file(&path)?;
        self.write_metadata(checkpoint_id, &hash)
    }

    fn load_data(&self, checkpoint_id: &str) -> Result<Vec<u8>> {
        let _guard = self.lock.lock().unwrap();
        if !self.verify_checkpoint(checkpoint_id)? {
            return Err(CoreError::InvalidInput("checkpoint verification failed".into()));
        }
        std::fs::read(self.checkpoint_path(checkpoint_id))
            .map_err(|e| CoreError::InvalidInput(format!("reading checkpoint: {e}")))
    }

    fn list_checkpoints(&self) -> Result<Vec<String>> {
        let mut entries: Vec<(String, std::time::SystemTime)> = std::fs::read_dir(&self.dir)
            .map_err(|e| CoreError::InvalidInput(format!("listing checkpoints: {e}")))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("checkpoint"))
            .filter_map(|e| {
                let modified = e.metadata().ok()?.modified().ok()?;
                let id = e.path().file_stem()?.to_str()?.to_string();
                Some((id, modified))
            })
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(entries.into_iter().map(|(id, _)| id).collect())
    }

    fn verify_checkpoint(&self, checkpoint_id: &str) -> Result<bool> {
        let path = self.checkpoint_path(checkpoint_id);
        if !path.exists() {
            return Ok(false);
        }
        let meta = match self.read_metadata(checkpoint_id) {
            Ok(m) => m,
            Err(_) => return Ok(true),
        };
        match meta.get("hash") {
            Some(expected) => Ok(Self::hash_file(&path)? == *expected),
            None => Ok(true),
        }
    }

    fn cleanup_old_checkpoints(&self, keep_count: usize) -> Result<()> {
        let checkpoints = self.list_checkpoints()?;
        for id in checkpoints.into_iter().skip(keep_count) {
            let _ = std::fs::remove_file(self.checkpoint_path(&id));
            let _ = std::fs::remove_file(self.meta_path(&id));
        }
        Ok(())
    }
}

/// Coordinates checkpointing across multiple named components, each backed
/// by its own `Checkpoint` implementation.
pub struct RecoveryManager {
    components: RwLock<HashMap<String, Box<dyn Checkpoint>>>,
}

impl Default for RecoveryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryManager {
    pub fn new() -> Self {
        RecoveryManager {
            components: RwLock::new(HashMap::new()),
        }
    }

    pub fn register_component(&self, name: &str, checkpoint: Box<dyn Checkpoint>) {
        self.components
            .write()
            .unwrap()
            .insert(name.to_string(), checkpoint);
    }

    fn component_checkpoint_id(system_id: &str, component: &str) -> String {
        format!("{system_id}_{component}")
    }

    pub fn create_system_checkpoint(&self, system_id: &str, data: &[u8]) -> Result<()> {
        let components = self.components.read().unwrap();
        let mut failed = Vec::new();
        for (name, checkpoint) in components.iter() {
            let id = Self::component_checkpoint_id(system_id, name);
            if checkpoint.save_data(&id, data).is_err() {
                failed.push(name.clone());
            }
        }
        if failed.is_empty() {
            vcore_metrics::FAULT_METRICS.checkpoint_saves.inc();
            Ok(())
        } else {
            Err(CoreError::Transient(format!(
                "failed to checkpoint components: {}",
                failed.join(", ")
            )))
        }
    }

    pub fn restore_system_checkpoint(&self, system_id: &str) -> Result<HashMap<String, Vec<u8>>> {
        let components = self.components.read().unwrap();
        let mut restored = HashMap::new();
        let mut failed = Vec::new();
        for (name, checkpoint) in components.iter() {
            let id = Self::component_checkpoint_id(system_id, name);
            match checkpoint.load_data(&id) {
                Ok(data) => {
                    restored.insert(name.clone(), data);
                }
                Err(_) => failed.push(name.clone()),
            }
        }
        if failed.is_empty() {
            vcore_metrics::FAULT_METRICS.checkpoint_restores.inc();
            Ok(restored)
        } else {
            Err(CoreError::Transient(format!(
                "failed to restore components: {}",
                failed.join(", ")
            )))
        }
    }

    pub fn get_recovery_status(&self, system_id: &str) -> HashMap<String, bool> {
        let components = self.components.read().unwrap();
        components
            .iter()
            .map(|(name, checkpoint)| {
                let id = Self::component_checkpoint_id(system_id, name);
                let ok = checkpoint.verify_checkpoint(&id).unwrap_or(false);
                (name.clone(), ok)
            })
            .collect()
    }

    /// Finds the newest system checkpoint id across all components' listed
    /// checkpoints and restores it. Intended to run at startup.
    pub fn auto_recover(&self) -> Result<Option<HashMap<String, Vec<u8>>>> {
        let components = self.components.read().unwrap();
        let mut newest: Option<String> = None;
        for checkpoint in components.values() {
            if let Ok(ids) = checkpoint.list_checkpoints() {
                if let Some(first) = ids.into_iter().next() {
                    if newest.is_none() {
                        newest = Some(first);
                    }
                }
            }
        }
        drop(components);
        match newest {
            Some(id) => {
                let system_id = id.rsplit_once('_').map(|(s, _)| s).unwrap_or(&id).to_string();
                Ok(Some(self.restore_system_checkpoint(&system_id)?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cp = FileCheckpoint::new(dir.path()).unwrap();
        cp.save_data("ledger_1", b"hello world").unwrap();
        let loaded = cp.load_data("ledger_1").unwrap();
        assert_eq!(loaded, b"hello world");
    }

    #[test]
    fn verify_detects_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let cp = FileCheckpoint::new(dir.path()).unwrap();
        cp.save_data("a", b"original").unwrap();
        std::fs::write(dir.path().join("a.checkpoint"), b"tampered!!").unwrap();
        assert!(!cp.verify_checkpoint("a").unwrap());
    }

    #[test]
    fn cleanup_keeps_only_n_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let cp = FileCheckpoint::new(dir.path()).unwrap();
        for i in 0..5 {
            cp.save_data(&format!("c{i}"), b"data").unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        cp.cleanup_old_checkpoints(2).unwrap();
        assert_eq!(cp.list_checkpoints().unwrap().len(), 2);
    }

    #[test]
    fn metadata_file_has_expected_lines() {
        let dir = tempfile::tempdir().unwrap();
        let cp = FileCheckpoint::new(dir.path()).unwrap();
        cp.save_data("m", b"x").unwrap();
        let meta = std::fs::read_to_string(dir.path().join("m.meta")).unwrap();
        assert!(meta.contains("magic=SLONANA_CHECKPOINT"));
        assert!(meta.contains("version=1.0"));
        assert!(meta.contains("hash="));
        assert!(meta.contains("timestamp="));
    }

    #[test]
    fn recovery_manager_checkpoints_all_components() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = RecoveryManager::new();
        mgr.register_component(
            "ledger",
            Box::new(FileCheckpoint::new(dir.path().join("ledger")).unwrap()),
        );
        mgr.register_component(
            "state",
            Box::new(FileCheckpoint::new(dir.path().join("state")).unwrap()),
        );
        mgr.create_system_checkpoint("snap1", b"payload").unwrap();
        let restored = mgr.restore_system_checkpoint("snap1").unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored["ledger"], b"payload");
    }
}
