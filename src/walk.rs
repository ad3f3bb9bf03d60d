use std::collections::HashSet;

use async_recursion::async_recursion;
use tracing::{debug, info};

use crate::{
    error::DriveCopyError,
    store::{Page, RemoteStore},
};

mod replicate;

/// Counters reported once the walk is over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub folders_walked: usize,
    pub owned_found: usize,
    pub created: usize,
    pub failed: usize,
}

/// Primary owner of the root folder.
pub async fn resolve_root_owner<S: RemoteStore>(
    store: &S,
    root_id: &str,
) -> Result<String, DriveCopyError> {
    store
        .get_owners(root_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| DriveCopyError::NoOwners(root_id.to_string()))
}

/// Walks a folder tree and duplicates everything owned by `target`
/// next to the original.
#[derive(Debug)]
pub struct Walker<'a, S> {
    store: &'a S,

    target: String,

    /// Only used as context in the logs
    root_owner: String,

    /// Folders on the current walk path
    walking: HashSet<String>,

    /// Folders on the current subtree copy path
    copying: HashSet<String>,

    /// Everything this walker created, never treated as source
    created: HashSet<String>,

    summary: Summary,
}

impl<'a, S: RemoteStore> Walker<'a, S> {
    pub fn new(store: &'a S, target: &str, root_owner: &str) -> Self {
        Self {
            store,
            target: target.to_string(),
            root_owner: root_owner.to_string(),
            walking: HashSet::new(),
            copying: HashSet::new(),
            created: HashSet::new(),
            summary: Summary::default(),
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Visit every folder below `folder_id`, replicating owned items as they
    /// are found. Listing errors abort the walk, copy errors do not.
    #[async_recursion(?Send)]
    pub async fn walk(&mut self, folder_id: &str) -> Result<(), DriveCopyError> {
        if !self.walking.insert(folder_id.to_string()) {
            return Err(DriveCopyError::Cycle(folder_id.to_string()));
        }

        info!("Entering folder {folder_id}");
        self.summary.folders_walked += 1;

        let mut page_token: Option<String> = None;

        loop {
            let Page {
                items,
                next_page_token,
            } = self
                .store
                .list_children(folder_id, page_token.as_deref())
                .await?;

            debug!("{folder_id}: {} entries in page", items.len());

            for entry in items {
                if self.created.contains(&entry.id) {
                    debug!("Skipping '{}', created by this run", entry.name);
                    continue;
                }

                if entry.is_owned_by(&self.target) {
                    info!(
                        "Found '{}' ({}) owned by {} under root owned by {}",
                        entry.name, entry.id, self.target, self.root_owner
                    );
                    self.summary.owned_found += 1;
                    self.replicate(&entry, folder_id).await?;
                }

                if entry.is_folder() {
                    self.walk(&entry.id).await?;
                }
            }

            match next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        self.walking.remove(folder_id);

        Ok(())
    }
}
