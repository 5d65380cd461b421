use super::item::{Folder, Item, Recording};
use crate::{RecordingsError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Broadcast to every store subscriber after a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Added { id: Uuid, parent: Uuid },
    Renamed { id: Uuid, name: String },
    Removed { id: Uuid },
}

impl StoreChange {
    /// The item the change is about
    pub fn id(&self) -> Uuid {
        match self {
            StoreChange::Added { id, .. }
            | StoreChange::Renamed { id, .. }
            | StoreChange::Removed { id } => *id,
        }
    }
}

/// Tree of folders and recordings rooted at a single folder.
///
/// Clones share the same tree and subscriber list.
#[derive(Debug, Clone)]
pub struct Store {
    root: Arc<RwLock<Folder>>,
    base_dir: Option<PathBuf>,
    listeners: Arc<Mutex<Vec<Sender<StoreChange>>>>,
}

impl Store {
    /// Recording files live under `base_dir` as `<uuid>.wav`
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self {
            root: Arc::new(RwLock::new(Folder::new("Recordings"))),
            base_dir,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Load a tree saved with [`Store::save`]; a missing file gives an empty store
    pub fn load(path: &Path, base_dir: Option<PathBuf>) -> Result<Self> {
        let store = Self::new(base_dir);
        if !path.exists() {
            debug!("No library index at {:?}", path);
            return Ok(store);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| RecordingsError::IOError(format!("Failed to read library index: {}", e)))?;
        let root: Folder = serde_json::from_str(&content)
            .map_err(|e| RecordingsError::ConfigError(format!("Failed to parse library index: {}", e)))?;

        info!("Loaded library index from {:?}", path);
        *store.root.write() = root;
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&*self.root.read())
            .map_err(|e| RecordingsError::ConfigError(format!("Failed to serialize library index: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| RecordingsError::IOError(format!("Failed to write library index: {}", e)))?;

        debug!("Saved library index to {:?}", path);
        Ok(())
    }

    pub fn root_id(&self) -> Uuid {
        self.root.read().id
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Create (but don't insert) a recording whose file lives in the base dir
    pub fn new_recording(&self, name: impl Into<String>) -> Recording {
        let mut recording = Recording::new(name, None);
        recording.file = self
            .base_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.wav", recording.id)));
        recording
    }

    pub fn subscribe(&self) -> Receiver<StoreChange> {
        let (tx, rx) = unbounded();
        self.listeners.lock().push(tx);
        rx
    }

    pub fn insert(&self, parent: Uuid, item: impl Into<Item>) -> Result<()> {
        let item = item.into();
        let id = item.id();
        {
            let mut root = self.root.write();
            let folder = find_folder_mut(&mut root, parent)
                .ok_or_else(|| RecordingsError::NotFound(format!("Folder {}", parent)))?;
            folder.contents.push(item);
        }
        debug!("Inserted {} into {}", id, parent);
        self.publish(StoreChange::Added { id, parent });
        Ok(())
    }

    pub fn rename(&self, id: Uuid, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        {
            let mut root = self.root.write();
            if root.id == id {
                root.name = name.clone();
            } else {
                let item = find_item_mut(&mut root, id)
                    .ok_or_else(|| RecordingsError::NotFound(format!("Item {}", id)))?;
                item.set_name(name.clone());
            }
        }
        info!("Renamed {} to {:?}", id, name);
        self.publish(StoreChange::Renamed { id, name });
        Ok(())
    }

    /// Remove an item and everything below it. The root can't be removed.
    ///
    /// Subscribers get one `Removed` per item in the subtree, children first.
    pub fn remove(&self, id: Uuid) -> Result<Item> {
        let removed = remove_item(&mut self.root.write(), id)
            .ok_or_else(|| RecordingsError::NotFound(format!("Item {}", id)))?;
        let ids = removed.subtree_ids();
        debug!("Removed {} ({} items)", id, ids.len());
        for id in ids {
            self.publish(StoreChange::Removed { id });
        }
        Ok(removed)
    }

    /// First recording, anywhere in the tree, that plays `file`
    pub fn recording_for_file(&self, file: &Path) -> Option<Recording> {
        find_recording_for_file(&self.root.read(), file).cloned()
    }

    pub fn item(&self, id: Uuid) -> Option<Item> {
        let root = self.root.read();
        if root.id == id {
            return Some(Item::Folder(root.clone()));
        }
        find_item(&root, id).cloned()
    }

    /// Ids from the root down to `id`, both included
    pub fn uuid_path(&self, id: Uuid) -> Option<Vec<Uuid>> {
        let mut path = Vec::new();
        path_to(&self.root.read(), id, &mut path).then_some(path)
    }

    pub fn item_at_uuid_path(&self, path: &[Uuid]) -> Option<Item> {
        let root = self.root.read();
        let (first, rest) = path.split_first()?;
        if *first != root.id {
            return None;
        }

        let mut folder: &Folder = &root;
        for (index, id) in rest.iter().enumerate() {
            let child = folder.contents.iter().find(|item| item.id() == *id)?;
            if index == rest.len() - 1 {
                return Some(child.clone());
            }
            match child {
                Item::Folder(sub) => folder = sub,
                Item::Recording(_) => return None,
            }
        }
        Some(Item::Folder(folder.clone()))
    }

    pub fn recording_at_uuid_path(&self, path: &[Uuid]) -> Option<Recording> {
        match self.item_at_uuid_path(path)? {
            Item::Recording(recording) => Some(recording),
            Item::Folder(_) => None,
        }
    }

    fn publish(&self, change: StoreChange) {
        self.listeners
            .lock()
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(None)
    }
}

fn find_item(folder: &Folder, id: Uuid) -> Option<&Item> {
    for item in &folder.contents {
        if item.id() == id {
            return Some(item);
        }
        if let Item::Folder(sub) = item {
            if let Some(found) = find_item(sub, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_recording_for_file<'a>(folder: &'a Folder, file: &Path) -> Option<&'a Recording> {
    folder.contents.iter().find_map(|item| match item {
        Item::Recording(recording) if recording.file.as_deref() == Some(file) => Some(recording),
        Item::Recording(_) => None,
        Item::Folder(sub) => find_recording_for_file(sub, file),
    })
}

fn find_item_mut(folder: &mut Folder, id: Uuid) -> Option<&mut Item> {
    for item in folder.contents.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let Item::Folder(sub) = item {
            if let Some(found) = find_item_mut(sub, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_folder_mut(folder: &mut Folder, id: Uuid) -> Option<&mut Folder> {
    if folder.id == id {
        return Some(folder);
    }
    for item in folder.contents.iter_mut() {
        if let Item::Folder(sub) = item {
            if let Some(found) = find_folder_mut(sub, id) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_item(folder: &mut Folder, id: Uuid) -> Option<Item> {
    if let Some(index) = folder.contents.iter().position(|item| item.id() == id) {
        return Some(folder.contents.remove(index));
    }
    folder.contents.iter_mut().find_map(|item| match item {
        Item::Folder(sub) => remove_item(sub, id),
        Item::Recording(_) => None,
    })
}

fn path_to(folder: &Folder, id: Uuid, path: &mut Vec<Uuid>) -> bool {
    path.push(folder.id);
    if folder.id == id {
        return true;
    }
    for item in &folder.contents {
        match item {
            Item::Recording(recording) => {
                if recording.id == id {
                    path.push(recording.id);
                    return true;
                }
            }
            Item::Folder(sub) => {
                if path_to(sub, id, path) {
                    return true;
                }
            }
        }
    }
    path.pop();
    false
}
