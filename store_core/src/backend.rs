use crate::StoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Raw string storage behind a [`Store`](crate::Store)
pub trait Backend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
    /// Remove every entry
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Whether entries outlive the process
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Process-local storage
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    items: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Backend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.items.clear();
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

/// One `<key>.json` file per entry inside a directory
///
/// Key characters outside `[A-Za-z0-9_-]` are written as `%XX` in file names.
#[derive(Debug, Clone)]
pub struct DirBackend {
    root: PathBuf,
}

impl DirBackend {
    /// Open a directory, creating it if needed
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root).map_err(|e| StoreError::Io {
            error: e,
            path: root.to_path_buf(),
        })?;
        Ok(DirBackend {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut file = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                file.push(byte as char);
            } else {
                file.push_str(&format!("%{:02X}", byte));
            }
        }
        file.push_str(".json");
        self.root.join(file)
    }
}

impl Backend for DirBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io { error: e, path }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|e| StoreError::Io { error: e, path })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { error: e, path }),
        }
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let io = |e| StoreError::Io {
            error: e,
            path: self.root.clone(),
        };
        for entry in std::fs::read_dir(&self.root).map_err(io)? {
            let path = entry.map_err(io)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path).map_err(|e| StoreError::Io { error: e, path })?;
            }
        }
        Ok(())
    }
}
