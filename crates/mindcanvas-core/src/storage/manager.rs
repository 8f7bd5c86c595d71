//! Saving and loading one user's maps.

use crate::document::Document;
use crate::editor::Editor;
use crate::storage::{MapListing, MapStorage, StorageError, StorageResult};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Manages a user's maps on top of a storage backend.
pub struct MapManager<S: MapStorage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Opaque key for the signed-in user.
    user: String,
    /// Name of the map currently open in the editor.
    current_map: Option<String>,
    /// Last save or load timestamp.
    last_sync: Option<Instant>,
}

impl<S: MapStorage> MapManager<S> {
    pub fn new(storage: Arc<S>, user: impl Into<String>) -> Self {
        Self {
            storage,
            user: user.into(),
            current_map: None,
            last_sync: None,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Name of the map last saved or loaded.
    pub fn current_map(&self) -> Option<&str> {
        self.current_map.as_deref()
    }

    /// Time of the last successful save or load.
    pub fn last_sync(&self) -> Option<Instant> {
        self.last_sync
    }

    /// Save the editor's diagram under `name` and mark the editor clean.
    pub async fn save_current(&mut self, name: &str, editor: &mut Editor) -> StorageResult<()> {
        self.storage.save(&self.user, name, &editor.export()).await?;
        log::info!("Saved map '{}' for {}", name, self.user);
        editor.mark_clean();
        self.current_map = Some(name.to_string());
        self.last_sync = Some(Instant::now());
        Ok(())
    }

    /// Load the map `name` into the editor.
    ///
    /// The stored document replaces the diagram as one import; if it is
    /// invalid the editor is left as it was.
    pub async fn load_into(&mut self, name: &str, editor: &mut Editor) -> StorageResult<()> {
        let document = self.storage.load(&self.user, name).await?;
        editor
            .import(&document)
            .map_err(|e| StorageError::Serialization(format!("Map '{}': {}", name, e)))?;
        log::info!("Loaded map '{}' for {}", name, self.user);
        editor.mark_clean();
        self.current_map = Some(name.to_string());
        self.last_sync = Some(Instant::now());
        Ok(())
    }

    /// Store an empty map under `name`.
    pub async fn create_empty(&self, name: &str) -> StorageResult<()> {
        self.storage.save(&self.user, name, &Document::empty()).await
    }

    /// Delete the map `name`.
    pub async fn delete(&mut self, name: &str) -> StorageResult<()> {
        self.storage.delete(&self.user, name).await?;
        if self.current_map.as_deref() == Some(name) {
            self.current_map = None;
        }
        Ok(())
    }

    /// List the user's maps by name.
    pub async fn list(&self) -> StorageResult<MapListing> {
        self.storage.list(&self.user).await
    }

    pub async fn exists(&self, name: &str) -> StorageResult<bool> {
        self.storage.exists(&self.user, name).await
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

/// Create a manager backed by files in the given directory, or the default
/// data directory when `None`.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_file_manager(
    base: Option<std::path::PathBuf>,
    user: impl Into<String>,
) -> StorageResult<MapManager<PlatformStorage>> {
    let storage = match base {
        Some(path) => PlatformStorage::new(path)?,
        None => PlatformStorage::default_location()?,
    };
    Ok(MapManager::new(Arc::new(storage), user))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::editor::EditorAction;
    use crate::storage::{MemoryStorage, block_on};

    fn manager() -> MapManager<MemoryStorage> {
        MapManager::new(Arc::new(MemoryStorage::new()), "alice")
    }

    #[test]
    fn test_save_clears_dirty() {
        let mut manager = manager();
        let mut editor = Editor::new();
        editor.perform(EditorAction::AddNode).unwrap();
        assert!(editor.is_dirty());

        block_on(manager.save_current("plans", &mut editor)).unwrap();

        assert!(!editor.is_dirty());
        assert_eq!(manager.current_map(), Some("plans"));
        assert!(manager.last_sync().is_some());
        assert!(block_on(manager.exists("plans")).unwrap());
    }

    #[test]
    fn test_load_into_replaces_diagram() {
        let mut manager = manager();
        let mut saved = Editor::new();
        saved.perform(EditorAction::AddNode).unwrap();
        saved.perform(EditorAction::AddNode).unwrap();
        block_on(manager.save_current("plans", &mut saved)).unwrap();

        let mut editor = Editor::new();
        block_on(manager.load_into("plans", &mut editor)).unwrap();

        assert_eq!(editor.graph().node_count(), 3);
        assert_eq!(editor.export(), saved.export());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_load_missing_map() {
        let mut manager = manager();
        let mut editor = Editor::new();
        let result = block_on(manager.load_into("absent", &mut editor));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert_eq!(editor.graph().node_count(), 1);
        assert_eq!(manager.current_map(), None);
    }

    #[test]
    fn test_create_empty_and_list() {
        let mut manager = manager();
        block_on(manager.create_empty("blank")).unwrap();
        let mut editor = Editor::new();
        block_on(manager.save_current("plans", &mut editor)).unwrap();

        let list = block_on(manager.list()).unwrap();
        assert_eq!(list.keys().map(String::as_str).collect::<Vec<_>>(), vec!["blank", "plans"]);
        assert_eq!(list["blank"].node_count, 0);

        block_on(manager.load_into("blank", &mut editor)).unwrap();
        assert!(editor.graph().is_empty());
    }

    #[test]
    fn test_delete_forgets_current() {
        let mut manager = manager();
        let mut editor = Editor::new();
        block_on(manager.save_current("plans", &mut editor)).unwrap();
        block_on(manager.delete("plans")).unwrap();

        assert_eq!(manager.current_map(), None);
        assert!(!block_on(manager.exists("plans")).unwrap());
    }

    #[test]
    fn test_maps_are_per_user() {
        let storage = Arc::new(MemoryStorage::new());
        let mut alice = MapManager::new(storage.clone(), "alice");
        let bob = MapManager::new(storage, "bob");
        let mut editor = Editor::new();

        block_on(alice.save_current("plans", &mut editor)).unwrap();
        assert!(block_on(bob.list()).unwrap().is_empty());
        assert_eq!(alice.user(), "alice");
    }
}
