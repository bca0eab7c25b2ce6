//! In-process asset host used by the reconciler integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use vitrine_assets::{AssetError, AssetHost, AssetRecord, UploadOptions, UploadedAsset};
use vitrine_core::AssetReference;

pub const ENDPOINT: &str = "https://ik.example.io/acct";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    List(Option<String>),
    Delete(String),
}

#[derive(Default)]
pub struct FakeHost {
    files: Mutex<Vec<AssetRecord>>,
    calls: Mutex<Vec<Call>>,
    failing_deletes: Mutex<HashSet<String>>,
    list_fails: Mutex<bool>,
    failing_folders: Mutex<HashSet<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file at `file_path` with identifier `id`.
    pub fn with_file(self, id: &str, file_path: &str) -> Self {
        self.files.lock().unwrap().push(record(id, file_path));
        self
    }

    pub fn fail_delete_of(self, id: &str) -> Self {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn fail_listing(self) -> Self {
        *self.list_fails.lock().unwrap() = true;
        self
    }

    /// Fails listings scoped to `folder`; account-wide listings still work.
    pub fn fail_listing_of(self, folder: &str) -> Self {
        self.failing_folders
            .lock()
            .unwrap()
            .insert(folder.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn lists(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List(folder) => Some(folder),
                _ => None,
            })
            .collect()
    }

    pub fn file_ids(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.file_id.clone())
            .collect()
    }
}

pub fn url_for(file_path: &str) -> String {
    format!("{ENDPOINT}{file_path}")
}

pub fn hosted(id: &str, file_path: &str) -> AssetReference {
    AssetReference::new(url_for(file_path), Some(id.to_string()), file_path)
}

pub fn hosted_legacy(file_path: &str) -> AssetReference {
    AssetReference::legacy(url_for(file_path))
}

fn record(id: &str, file_path: &str) -> AssetRecord {
    let name = file_path.rsplit('/').next().unwrap_or(file_path).to_string();
    AssetRecord {
        file_id: id.to_string(),
        name,
        file_path: file_path.to_string(),
        url: url_for(file_path),
        size: 100,
        width: None,
        height: None,
        mime_type: Some("image/jpeg".to_string()),
        tags: None,
    }
}

fn parent(file_path: &str) -> &str {
    match file_path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &file_path[..idx],
    }
}

#[async_trait]
impl AssetHost for FakeHost {
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        folder: &str,
        _options: &UploadOptions,
    ) -> Result<UploadedAsset, AssetError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Upload(file_name.to_string()));
        let mut files = self.files.lock().unwrap();
        let id = format!("up-{}", files.len() + 1);
        let file_path = format!("{}/{file_name}", folder.trim_end_matches('/'));
        let rec = record(&id, &file_path);
        files.push(rec.clone());
        Ok(UploadedAsset {
            file_id: rec.file_id,
            name: rec.name,
            url: rec.url,
            file_path: rec.file_path,
            size: data.len() as u64,
            width: None,
            height: None,
            mime_type: rec.mime_type,
        })
    }

    async fn list(
        &self,
        folder: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AssetRecord>, AssetError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::List(folder.map(ToOwned::to_owned)));
        let folder_fails =
            folder.is_some_and(|f| self.failing_folders.lock().unwrap().contains(f));
        if *self.list_fails.lock().unwrap() || folder_fails {
            return Err(AssetError::List {
                scope: folder.unwrap_or("all files").to_string(),
                status: Some(503),
                message: "host unavailable".to_string(),
            });
        }
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .filter(|r| folder.is_none_or(|f| parent(&r.file_path) == f))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete(&self, remote_id: &str) -> Result<(), AssetError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(remote_id.to_string()));
        if self.failing_deletes.lock().unwrap().contains(remote_id) {
            return Err(AssetError::Delete {
                remote_id: remote_id.to_string(),
                status: Some(500),
                message: "internal error".to_string(),
            });
        }
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|r| r.file_id != remote_id);
        if files.len() == before {
            return Err(AssetError::Delete {
                remote_id: remote_id.to_string(),
                status: Some(404),
                message: "The requested file does not exist.".to_string(),
            });
        }
        Ok(())
    }
}
