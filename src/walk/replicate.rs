use async_recursion::async_recursion;
use tracing::{error, info};

use super::Walker;
use crate::{
    error::DriveCopyError,
    store::{Entry, EntryKind, Page, RemoteStore},
};

impl<'a, S: RemoteStore> Walker<'a, S> {
    /// Duplicate an owned entry inside `parent_id`. Folders get a new sibling
    /// with a full copy of their contents, files a plain copy.
    pub async fn replicate(
        &mut self,
        entry: &Entry,
        parent_id: &str,
    ) -> Result<(), DriveCopyError> {
        match entry.kind {
            EntryKind::Folder => {
                let Some(folder) = self.try_create_folder(&entry.name, parent_id).await else {
                    return Ok(());
                };
                self.copy_subtree(&entry.id, &folder.id).await
            }
            EntryKind::File => {
                self.try_copy(entry, parent_id).await;
                Ok(())
            }
        }
    }

    /// Copy every child of `source_id` into `dest_id`, whoever owns it.
    #[async_recursion(?Send)]
    pub async fn copy_subtree(
        &mut self,
        source_id: &str,
        dest_id: &str,
    ) -> Result<(), DriveCopyError> {
        if !self.copying.insert(source_id.to_string()) {
            return Err(DriveCopyError::Cycle(source_id.to_string()));
        }

        let mut page_token: Option<String> = None;

        loop {
            let Page {
                items,
                next_page_token,
            } = self
                .store
                .list_children(source_id, page_token.as_deref())
                .await?;

            for entry in items {
                match entry.kind {
                    EntryKind::Folder => {
                        if let Some(folder) = self.try_create_folder(&entry.name, dest_id).await {
                            self.copy_subtree(&entry.id, &folder.id).await?;
                        }
                    }
                    EntryKind::File => self.try_copy(&entry, dest_id).await,
                }
            }

            match next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        self.copying.remove(source_id);

        Ok(())
    }

    async fn try_create_folder(&mut self, name: &str, parent_id: &str) -> Option<Entry> {
        match self.store.create_folder(name, parent_id).await {
            Ok(folder) => {
                info!("Created folder '{name}' ({}) in {parent_id}", folder.id);
                self.created.insert(folder.id.clone());
                self.summary.created += 1;
                Some(folder)
            }
            Err(e) => {
                error!("Failed to create folder '{name}' in {parent_id}: {e}");
                self.summary.failed += 1;
                None
            }
        }
    }

    async fn try_copy(&mut self, entry: &Entry, parent_id: &str) {
        match self.store.copy_item(&entry.id, &entry.name, parent_id).await {
            Ok(copy) => {
                info!("Copied '{}' to {} in {parent_id}", entry.name, copy.id);
                self.created.insert(copy.id);
                self.summary.created += 1;
            }
            Err(e) => {
                error!("Failed to copy '{}' ({}): {e}", entry.name, entry.id);
                self.summary.failed += 1;
            }
        }
    }
}
