//! In-memory drive used by the tests.

use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;

use super::{Entry, EntryKind, Page, RemoteStore};
use crate::error::DriveCopyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String, Option<String>),
    Owners(String),
    CreateFolder { name: String, parent: String },
    Copy { id: String, name: String, parent: String },
}

#[derive(Debug)]
struct Node {
    entry: Entry,
    parent: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: Vec<Node>,
    calls: Vec<Call>,
    failing_copies: HashSet<String>,
    failing_creates: HashSet<String>,
    failing_lists: HashSet<String>,
    next_id: usize,
    created: usize,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    page_size: usize,
    /// Owner of everything the store creates
    runner: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            page_size,
            runner: "runner@x.com".to_string(),
        }
    }

    pub fn with_runner(mut self, runner: &str) -> Self {
        self.runner = runner.to_string();
        self
    }

    fn insert(
        &self,
        parent: Option<&str>,
        id: &str,
        name: &str,
        kind: EntryKind,
        owners: &[&str],
    ) {
        self.inner.lock().unwrap().nodes.push(Node {
            entry: Entry {
                id: id.to_string(),
                name: name.to_string(),
                kind,
                owners: owners.iter().map(|s| s.to_string()).collect(),
            },
            parent: parent.map(str::to_string),
        });
    }

    /// Add a parentless folder.
    pub fn add_folder(&self, id: &str, name: &str, owners: &[&str]) {
        self.insert(None, id, name, EntryKind::Folder, owners);
    }

    pub fn add_child_folder(&self, parent: &str, id: &str, name: &str, owners: &[&str]) {
        self.insert(Some(parent), id, name, EntryKind::Folder, owners);
    }

    pub fn add_file(&self, parent: &str, id: &str, name: &str, owners: &[&str]) {
        self.insert(Some(parent), id, name, EntryKind::File, owners);
    }

    /// Re-parent an existing entry.
    pub fn move_to(&self, id: &str, parent: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(node) = inner.nodes.iter_mut().find(|n| n.entry.id == id) {
            node.parent = Some(parent.to_string());
        }
    }

    pub fn fail_copy_of(&self, id: &str) {
        self.inner.lock().unwrap().failing_copies.insert(id.to_string());
    }

    pub fn fail_create_of(&self, name: &str) {
        self.inner.lock().unwrap().failing_creates.insert(name.to_string());
    }

    pub fn fail_list_of(&self, folder_id: &str) {
        self.inner.lock().unwrap().failing_lists.insert(folder_id.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn created_count(&self) -> usize {
        self.inner.lock().unwrap().created
    }

    pub fn children_of(&self, parent: &str) -> Vec<Entry> {
        self.inner
            .lock()
            .unwrap()
            .nodes
            .iter()
            .filter(|n| n.parent.as_deref() == Some(parent))
            .map(|n| n.entry.clone())
            .collect()
    }

    /// Number of files and folders below `id`, not counting `id` itself.
    pub fn subtree_count(&self, id: &str) -> usize {
        self.children_of(id)
            .iter()
            .map(|child| 1 + self.subtree_count(&child.id))
            .sum()
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn not_found(id: &str) -> DriveCopyError {
        DriveCopyError::Api {
            status: 404,
            body: format!("File not found: {id}"),
        }
    }

    fn create(&self, name: &str, kind: EntryKind, parent: &str) -> Entry {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        inner.created += 1;

        let entry = Entry {
            id: format!("new-{}", inner.next_id),
            name: name.to_string(),
            kind,
            owners: vec![self.runner.clone()],
        };

        inner.nodes.push(Node {
            entry: entry.clone(),
            parent: Some(parent.to_string()),
        });

        entry
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_children(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, DriveCopyError> {
        self.record(Call::List(
            folder_id.to_string(),
            page_token.map(str::to_string),
        ));

        if self.inner.lock().unwrap().failing_lists.contains(folder_id) {
            return Err(DriveCopyError::Api {
                status: 500,
                body: "backend error".to_string(),
            });
        }

        let offset = match page_token {
            Some(token) => token
                .strip_prefix('p')
                .and_then(|offset| offset.parse::<usize>().ok())
                .ok_or_else(|| DriveCopyError::Api {
                    status: 400,
                    body: format!("invalid page token {token}"),
                })?,
            None => 0,
        };

        let children = self.children_of(folder_id);
        let end = (offset + self.page_size).min(children.len());

        Ok(Page {
            items: children[offset.min(end)..end].to_vec(),
            next_page_token: (end < children.len()).then(|| format!("p{end}")),
        })
    }

    async fn get_owners(&self, id: &str) -> Result<Vec<String>, DriveCopyError> {
        self.record(Call::Owners(id.to_string()));

        self.inner
            .lock()
            .unwrap()
            .nodes
            .iter()
            .find(|n| n.entry.id == id)
            .map(|n| n.entry.owners.clone())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<Entry, DriveCopyError> {
        self.record(Call::CreateFolder {
            name: name.to_string(),
            parent: parent_id.to_string(),
        });

        if self.inner.lock().unwrap().failing_creates.contains(name) {
            return Err(DriveCopyError::Api {
                status: 403,
                body: "insufficient permissions".to_string(),
            });
        }

        Ok(self.create(name, EntryKind::Folder, parent_id))
    }

    async fn copy_item(
        &self,
        id: &str,
        name: &str,
        parent_id: &str,
    ) -> Result<Entry, DriveCopyError> {
        self.record(Call::Copy {
            id: id.to_string(),
            name: name.to_string(),
            parent: parent_id.to_string(),
        });

        if self.inner.lock().unwrap().failing_copies.contains(id) {
            return Err(DriveCopyError::Api {
                status: 403,
                body: "cannot copy".to_string(),
            });
        }

        let kind = self
            .inner
            .lock()
            .unwrap()
            .nodes
            .iter()
            .find(|n| n.entry.id == id)
            .map(|n| n.entry.kind)
            .ok_or_else(|| Self::not_found(id))?;

        Ok(self.create(name, kind, parent_id))
    }
}
