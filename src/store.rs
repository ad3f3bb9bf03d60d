use async_trait::async_trait;

use crate::error::DriveCopyError;

pub mod drive;
pub mod dry_run;

#[cfg(test)]
pub mod memory;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
}

impl EntryKind {
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            Self::Folder
        } else {
            Self::File
        }
    }
}

/// Snapshot of a file or folder as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique within the store
    pub id: String,

    /// Not unique among siblings
    pub name: String,

    pub kind: EntryKind,

    /// Owner emails, the first one being the primary owner
    pub owners: Vec<String>,
}

impl Entry {
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Exact match, no case folding.
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owners.iter().any(|owner| owner == identity)
    }
}

/// One batch of children. A `None` token marks the last page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Entry>,
    pub next_page_token: Option<String>,
}

/// The operations the walk needs from a remote drive.
#[async_trait]
pub trait RemoteStore {
    /// List one page of the non-trashed direct children of `folder_id`.
    async fn list_children(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, DriveCopyError>;

    async fn get_owners(&self, id: &str) -> Result<Vec<String>, DriveCopyError>;

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<Entry, DriveCopyError>;

    async fn copy_item(
        &self,
        id: &str,
        name: &str,
        parent_id: &str,
    ) -> Result<Entry, DriveCopyError>;
}
