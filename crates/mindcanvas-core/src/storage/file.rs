//! File-based storage implementation for native platforms.

use super::{BoxFuture, MapListing, MapRecord, MapStorage, StorageError, StorageResult};
use crate::document::Document;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage for native platforms.
///
/// Each map is one JSON [`MapRecord`] at `<base>/users/<user>/maps/<map>.json`.
pub struct FileStorage {
    /// Base directory for map storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/mindcanvas/`
    /// On Windows: `%LOCALAPPDATA%\mindcanvas\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("mindcanvas"))
    }

    fn maps_dir(&self, user: &str) -> PathBuf {
        self.base_path.join("users").join(sanitize(user)).join("maps")
    }

    fn map_path(&self, user: &str, map: &str) -> PathBuf {
        self.maps_dir(user).join(format!("{}.json", sanitize(map)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Make a key safe to use as a path component.
///
/// ASCII letters, digits, `-` and `_` are kept; every other byte becomes
/// `%XX`, so distinct keys always map to distinct names.
fn sanitize(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Recover the key from a sanitized name. `None` if it was not made by
/// [`sanitize`].
fn unsanitize(name: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(name.len());
    let mut rest = name.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let hex = std::str::from_utf8(tail.get(..2)?).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

fn read_record(path: &Path) -> StorageResult<MapRecord> {
    let json = fs::read_to_string(path).map_err(|e| {
        StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl MapStorage for FileStorage {
    fn save(&self, user: &str, map: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let dir = self.maps_dir(user);
        let path = self.map_path(user, map);
        let json = match serde_json::to_string_pretty(&MapRecord::now(document.clone())) {
            Ok(j) => j,
            Err(e) => return Box::pin(async move {
                Err(StorageError::Serialization(e.to_string()))
            }),
        };

        Box::pin(async move {
            fs::create_dir_all(&dir).map_err(|e| {
                StorageError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::info!("Saved map to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let path = self.map_path(user, map);
        let map_owned = map.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(map_owned));
            }
            read_record(&path).map(|record| record.data)
        })
    }

    fn list(&self, user: &str) -> BoxFuture<'_, StorageResult<MapListing>> {
        let dir = self.maps_dir(user);

        Box::pin(async move {
            let mut listing = MapListing::new();
            if !dir.exists() {
                return Ok(listing);
            }

            let entries = fs::read_dir(&dir).map_err(|e| {
                StorageError::Io(format!("Failed to read directory: {}", e))
            })?;

            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_none_or(|e| e != "json") {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|n| n.to_str()).and_then(unsanitize)
                else {
                    continue;
                };
                match read_record(&path) {
                    Ok(record) => {
                        listing.insert(name, record.summary());
                    }
                    Err(e) => log::warn!("Skipping unreadable map: {}", e),
                }
            }
            Ok(listing)
        })
    }

    fn delete(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.map_path(user, map);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn exists(&self, user: &str, map: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.map_path(user, map);
        Box::pin(async move { Ok(path.exists()) })
    }
}
