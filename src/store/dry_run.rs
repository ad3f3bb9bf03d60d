use async_trait::async_trait;
use tracing::info;

use super::{Entry, EntryKind, Page, RemoteStore};
use crate::error::DriveCopyError;

const DRY_RUN_PREFIX: &str = "dry-run-";

/// Passes reads through to the wrapped store and only pretends to write.
#[derive(Debug)]
pub struct DryRun<S> {
    inner: S,
}

impl<S> DryRun<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    fn synthetic(name: &str, kind: EntryKind) -> Entry {
        Entry {
            id: format!("{DRY_RUN_PREFIX}{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            kind,
            owners: vec![],
        }
    }
}

#[async_trait]
impl<S: RemoteStore + Send + Sync> RemoteStore for DryRun<S> {
    async fn list_children(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, DriveCopyError> {
        // Nothing was created remotely, so there is nothing to list
        if folder_id.starts_with(DRY_RUN_PREFIX) {
            return Ok(Page::default());
        }
        self.inner.list_children(folder_id, page_token).await
    }

    async fn get_owners(&self, id: &str) -> Result<Vec<String>, DriveCopyError> {
        self.inner.get_owners(id).await
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<Entry, DriveCopyError> {
        info!("[dry run] Would create folder '{name}' in {parent_id}");
        Ok(Self::synthetic(name, EntryKind::Folder))
    }

    async fn copy_item(
        &self,
        id: &str,
        name: &str,
        parent_id: &str,
    ) -> Result<Entry, DriveCopyError> {
        info!("[dry run] Would copy {id} as '{name}' into {parent_id}");
        Ok(Self::synthetic(name, EntryKind::File))
    }
}
