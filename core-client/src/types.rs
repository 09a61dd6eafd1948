//! Identifiers and wire types of the file-hosting API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Suffix every stored file name carries on the server.
pub const FILE_EXTENSION: &str = ".json";

/// Identifier a call is registered and cancelled under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(String);

impl RequestId {
    /// Generates `"<operation>-<uuid>"`.
    pub fn generate(operation: &str) -> Self {
        Self(format!("{}-{}", operation, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for RequestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub name: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirectoryEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }

    /// Exact, case-sensitive match against `file_name` plus the extension.
    pub fn matches(&self, file_name: &str) -> bool {
        self.is_file()
            && self.name.len() == file_name.len() + FILE_EXTENSION.len()
            && self.name.starts_with(file_name)
            && self.name.ends_with(FILE_EXTENSION)
    }
}

/// First entry matching `file_name`, in listing order.
pub fn find_file<'a>(entries: &'a [DirectoryEntry], file_name: &str) -> Option<&'a DirectoryEntry> {
    entries.iter().find(|entry| entry.matches(file_name))
}

/// The part of a file's metadata the client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    Create,
    Update,
    Delete,
}

impl CommitKind {
    fn verb(&self) -> &'static str {
        match self {
            CommitKind::Create => "Create",
            CommitKind::Update => "Update",
            CommitKind::Delete => "Delete",
        }
    }
}

/// JSON body of a create, update or delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteBody {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl WriteBody {
    pub fn create(path: &str, file_name: &str, content: &str) -> Self {
        Self {
            message: commit_message(CommitKind::Create, path, file_name),
            content: STANDARD.encode(content),
            sha: None,
        }
    }

    pub fn update(path: &str, file_name: &str, content: &str, sha: String) -> Self {
        Self {
            message: commit_message(CommitKind::Update, path, file_name),
            content: STANDARD.encode(content),
            sha: Some(sha),
        }
    }

    /// The delete body carries the base64 of the `sha` itself as `content`;
    /// servers relying on that shape must keep working.
    pub fn delete(path: &str, file_name: &str, sha: String) -> Self {
        Self {
            message: commit_message(CommitKind::Delete, path, file_name),
            content: STANDARD.encode(&sha),
            sha: Some(sha),
        }
    }
}

pub fn commit_message(kind: CommitKind, path: &str, file_name: &str) -> String {
    format!("{} {}: {}", kind.verb(), path, file_name)
}
