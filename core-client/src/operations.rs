//! File operations against the file-hosting REST API.
//!
//! Each operation builds one or more requests, sends them through the
//! [`Pipeline`], and turns the responses into a success payload or a
//! [`ClientError`]. Multi-step operations (`get`, `get_multiple`, `update`,
//! `delete`) run every sub-request under the same [`CallContext`], so a
//! cancellation issued between steps stops the sequence before the next
//! request leaves.

use bridge_traits::http::{HttpMethod, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::{ClientError, Result};
use crate::pipeline::{CallContext, Pipeline};
use crate::types::{find_file, DirectoryEntry, FileMetadata, WriteBody, FILE_EXTENSION};

pub const UPLOADED: &str = "File uploaded successfully";
pub const UPDATED: &str = "File updated successfully";
pub const DELETED: &str = "File deleted successfully";

/// File-level operations over a shared pipeline.
pub struct FileOperations {
    pipeline: Pipeline,
    api_base: String,
}

impl FileOperations {
    pub fn new(pipeline: Pipeline, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { pipeline, api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// `{base}/{path}/{file_name}.json`, each segment percent-encoded.
    pub fn file_url(&self, path: &str, file_name: &str) -> String {
        let mut url = self.dir_url(path);
        url.push('/');
        url.push_str(&urlencoding::encode(&format!("{}{}", file_name, FILE_EXTENSION)));
        url
    }

    /// `{base}/{path}`; `/` separators in `path` are kept, empty segments dropped.
    pub fn dir_url(&self, path: &str) -> String {
        let mut url = self.api_base.clone();
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    #[instrument(skip(self, content, call), fields(request_id = %call.request_id()))]
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        content: &str,
        call: &CallContext,
    ) -> Result<String> {
        let request = write_request(
            HttpMethod::Put,
            self.file_url(path, file_name),
            &WriteBody::create(path, file_name, content),
            call,
        )?;

        let response = self.send(request, call).await?;
        if !response.is_success() {
            return Err(ClientError::Rejected {
                step: "Upload failed",
                status: response.status,
            });
        }

        info!(path, file_name, "File uploaded");
        Ok(UPLOADED.to_string())
    }

    #[instrument(skip(self, call), fields(request_id = %call.request_id()))]
    pub async fn get(&self, path: &str, file_name: &str, call: &CallContext) -> Result<String> {
        let entries = self.fetch_listing(path, call).await?;
        let entry = find_file(&entries, file_name).ok_or(ClientError::NotFound)?;
        self.download(entry, call).await
    }

    #[instrument(skip(self, call), fields(request_id = %call.request_id()))]
    pub async fn get_dir(&self, path: &str, call: &CallContext) -> Result<String> {
        self.fetch_text(self.dir_url(path), call).await
    }

    /// Fetches every named file present in the listing and returns a JSON
    /// object keyed by file name. Names without a matching entry are left
    /// out; a failed download fails the whole call.
    #[instrument(skip(self, call), fields(request_id = %call.request_id(), count = file_names.len()))]
    pub async fn get_multiple(
        &self,
        path: &str,
        file_names: &[String],
        call: &CallContext,
    ) -> Result<String> {
        let entries = self.fetch_listing(path, call).await?;

        let mut files = Map::new();
        for file_name in file_names {
            match find_file(&entries, file_name) {
                Some(entry) => {
                    let content = self.download(entry, call).await?;
                    files.insert(file_name.clone(), Value::String(content));
                }
                None => debug!(file_name = %file_name, "No listing entry, skipping"),
            }
        }

        Ok(Value::Object(files).to_string())
    }

    #[instrument(skip(self, content, call), fields(request_id = %call.request_id()))]
    pub async fn update(
        &self,
        path: &str,
        file_name: &str,
        content: &str,
        call: &CallContext,
    ) -> Result<String> {
        let url = self.file_url(path, file_name);
        let sha = self.fetch_sha(&url, call).await?;

        let request = write_request(
            HttpMethod::Put,
            url,
            &WriteBody::update(path, file_name, content, sha),
            call,
        )?;

        let response = self.send(request, call).await?;
        if !response.is_success() {
            return Err(ClientError::Rejected {
                step: "Upload failed",
                status: response.status,
            });
        }

        info!(path, file_name, "File updated");
        Ok(UPDATED.to_string())
    }

    #[instrument(skip(self, call), fields(request_id = %call.request_id()))]
    pub async fn delete(&self, path: &str, file_name: &str, call: &CallContext) -> Result<String> {
        let url = self.file_url(path, file_name);
        let sha = self.fetch_sha(&url, call).await?;

        let request = write_request(
            HttpMethod::Delete,
            url,
            &WriteBody::delete(path, file_name, sha),
            call,
        )?;

        let response = self.send(request, call).await?;
        if !response.is_success() {
            return Err(ClientError::Rejected {
                step: "Delete failed",
                status: response.status,
            });
        }

        info!(path, file_name, "File deleted");
        Ok(DELETED.to_string())
    }

    async fn send(&self, request: HttpRequest, call: &CallContext) -> Result<HttpResponse> {
        if call.is_cancelled() {
            return Err(ClientError::Cancelled {
                request_id: call.request_id().clone(),
            });
        }

        self.pipeline
            .execute(request, call)
            .await
            .map_err(|err| ClientError::from_bridge(err, call.request_id()))
    }

    /// GET `url` and return the body of a successful response.
    async fn fetch_text(&self, url: String, call: &CallContext) -> Result<String> {
        let response = self.send(HttpRequest::get(url), call).await?;
        if !response.is_success() {
            return Err(ClientError::Http {
                status: response.status,
                reason: response.reason().to_string(),
            });
        }
        Ok(response.text())
    }

    async fn fetch_listing(&self, path: &str, call: &CallContext) -> Result<Vec<DirectoryEntry>> {
        let body = self.fetch_text(self.dir_url(path), call).await?;
        parse(&body)
    }

    async fn download(&self, entry: &DirectoryEntry, call: &CallContext) -> Result<String> {
        let url = entry
            .download_url
            .clone()
            .ok_or(ClientError::MissingField("download_url"))?;
        self.fetch_text(url, call).await
    }

    /// Current `sha` of the file at `url`, always fetched past any cache.
    async fn fetch_sha(&self, url: &str, call: &CallContext) -> Result<String> {
        let request = HttpRequest::get(url).header("Cache-Control", "no-cache");
        let response = self.send(request, call).await?;
        if !response.is_success() {
            return Err(ClientError::Rejected {
                step: "Failed to get file",
                status: response.status,
            });
        }

        let metadata: FileMetadata = parse(&response.text())?;
        metadata.sha.ok_or(ClientError::MissingField("sha"))
    }
}

fn write_request(
    method: HttpMethod,
    url: String,
    body: &WriteBody,
    call: &CallContext,
) -> Result<HttpRequest> {
    HttpRequest::new(method, url)
        .json(body)
        .map_err(|err| ClientError::from_bridge(err, call.request_id()))
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}
