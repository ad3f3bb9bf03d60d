use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::debug;

use super::{Entry, EntryKind, Page, RemoteStore, FOLDER_MIME_TYPE};
use crate::error::DriveCopyError;

const ENTRY_FIELDS: &str = "id,name,mimeType,owners(emailAddress)";

/// Drive v3 REST client. The access token is used as is and never refreshed.
#[derive(Debug, Clone)]
pub struct DriveClient {
    client: Client,
    api_url: String,
    access_token: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    owners: Vec<DriveUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveUser {
    #[serde(default)]
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct OwnersResponse {
    #[serde(default)]
    owners: Vec<DriveUser>,
}

impl From<DriveFile> for Entry {
    fn from(value: DriveFile) -> Self {
        let DriveFile {
            id,
            name,
            mime_type,
            owners,
        } = value;

        Self {
            id,
            name,
            kind: EntryKind::from_mime_type(&mime_type),
            owners: emails(owners),
        }
    }
}

fn emails(owners: Vec<DriveUser>) -> Vec<String> {
    owners
        .into_iter()
        .map(|owner| owner.email_address)
        .filter(|email| !email.is_empty())
        .collect()
}

/// Quote an id for use inside a `q` search expression.
fn quote(id: &str) -> String {
    format!("'{}'", id.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl DriveClient {
    pub fn new(api_url: &str, access_token: String, page_size: u32) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token,
            page_size,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.api_url))
            .bearer_auth(&self.access_token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{path}", self.api_url))
            .bearer_auth(&self.access_token)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, DriveCopyError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DriveCopyError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn list_children(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, DriveCopyError> {
        let query = format!("{} in parents and trashed = false", quote(folder_id));
        let fields = format!("nextPageToken,files({ENTRY_FIELDS})");
        let page_size = self.page_size.to_string();

        let mut params = vec![
            ("q", query.as_str()),
            ("fields", fields.as_str()),
            ("pageSize", page_size.as_str()),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ];

        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        debug!("Listing {folder_id} (token: {page_token:?})");

        let response = self.get("/files").query(&params).send().await?;
        let FileList {
            files,
            next_page_token,
        } = read_json(response).await?;

        Ok(Page {
            items: files.into_iter().map(Entry::from).collect(),
            next_page_token: next_page_token.filter(|token| !token.is_empty()),
        })
    }

    async fn get_owners(&self, id: &str) -> Result<Vec<String>, DriveCopyError> {
        let response = self
            .get(&format!("/files/{id}"))
            .query(&[
                ("fields", "owners(emailAddress)"),
                ("supportsAllDrives", "true"),
            ])
            .send()
            .await?;

        let OwnersResponse { owners } = read_json(response).await?;
        Ok(emails(owners))
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<Entry, DriveCopyError> {
        let response = self
            .post("/files")
            .query(&[("fields", ENTRY_FIELDS), ("supportsAllDrives", "true")])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME_TYPE,
                "parents": [parent_id],
            }))
            .send()
            .await?;

        read_json::<DriveFile>(response).await.map(Entry::from)
    }

    async fn copy_item(
        &self,
        id: &str,
        name: &str,
        parent_id: &str,
    ) -> Result<Entry, DriveCopyError> {
        let response = self
            .post(&format!("/files/{id}/copy"))
            .query(&[("fields", ENTRY_FIELDS), ("supportsAllDrives", "true")])
            .json(&json!({
                "name": name,
                "parents": [parent_id],
            }))
            .send()
            .await?;

        read_json::<DriveFile>(response).await.map(Entry::from)
    }
}
