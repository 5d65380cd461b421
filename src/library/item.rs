use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A recorded audio take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: Uuid,
    pub name: String,
    /// Local audio file; `None` when the take has no playable file
    pub file: Option<PathBuf>,
    pub created: DateTime<Utc>,
}

impl Recording {
    pub fn new(name: impl Into<String>, file: Option<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            file,
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub contents: Vec<Item>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            contents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Folder(Folder),
    Recording(Recording),
}

impl Item {
    pub fn id(&self) -> Uuid {
        match self {
            Item::Folder(folder) => folder.id,
            Item::Recording(recording) => recording.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Folder(folder) => &folder.name,
            Item::Recording(recording) => &recording.name,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Item::Folder(folder) => folder.name = name,
            Item::Recording(recording) => recording.name = name,
        }
    }

    /// This item's id and the ids of everything below it, children first
    pub fn subtree_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        collect_ids(self, &mut ids);
        ids
    }

    pub fn as_recording(&self) -> Option<&Recording> {
        match self {
            Item::Recording(recording) => Some(recording),
            Item::Folder(_) => None,
        }
    }
}

fn collect_ids(item: &Item, ids: &mut Vec<Uuid>) {
    if let Item::Folder(folder) = item {
        for child in &folder.contents {
            collect_ids(child, ids);
        }
    }
    ids.push(item.id());
}

impl From<Recording> for Item {
    fn from(recording: Recording) -> Self {
        Item::Recording(recording)
    }
}

impl From<Folder> for Item {
    fn from(folder: Folder) -> Self {
        Item::Folder(folder)
    }
}
