// Data shapes shared by the upload pipeline and the list endpoint. Field
// names on the wire follow the pinning service, so several structs carry
// explicit serde renames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// Content-addressing version requested for every upload.
pub const CID_VERSION: u8 = 1;

/// A path to upload and whether it names a single file or a directory root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub path: PathBuf,
    pub is_single_file: bool,
}

impl UploadTarget {
    /// Base name of the target, used as the upload's display name and as the
    /// leading component of every filename in a directory upload.
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// A regular file discovered during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Metadata attached once to the whole upload.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyvalues: Option<Map<String, Value>>,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Metadata {
            name: name.into(),
            keyvalues: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    #[serde(rename = "cidVersion")]
    pub cid_version: u8,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            cid_version: CID_VERSION,
        }
    }
}

/// Decoded body of a successful pin request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
    #[serde(rename = "PinSize")]
    pub pin_size: u64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "isDuplicate", default)]
    pub is_duplicate: bool,
}

/// Bearer token read from the credential store. The token never shows up in
/// `Debug` output so it cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into().trim().to_string())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// One row of the pin list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: String,
    pub ipfs_pin_hash: String,
    pub size: u64,
    pub user_id: String,
    pub date_pinned: String,
    pub date_unpinned: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub number_of_files: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PinList {
    #[serde(default)]
    pub count: Option<u64>,
    pub rows: Vec<Pin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PinStatus {
    #[default]
    Pinned,
    Unpinned,
    All,
}

impl PinStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinStatus::Pinned => "pinned",
            PinStatus::Unpinned => "unpinned",
            PinStatus::All => "all",
        }
    }
}

pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Filters for the pin list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_limit: u32,
    pub cid: Option<String>,
    pub name: Option<String>,
    pub status: PinStatus,
    pub page_offset: Option<u32>,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            page_limit: 10,
            cid: None,
            name: None,
            status: PinStatus::Pinned,
            page_offset: None,
        }
    }
}

impl ListQuery {
    /// Query-string pairs in the order the endpoint documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("includesCount", "false".to_string()),
            ("status", self.status.as_str().to_string()),
            ("pageLimit", self.page_limit.min(MAX_PAGE_LIMIT).to_string()),
        ];
        if let Some(cid) = &self.cid {
            pairs.push(("hashContains", cid.clone()));
        }
        if let Some(name) = &self.name {
            pairs.push(("metadata[name]", name.clone()));
        }
        if let Some(offset) = self.page_offset {
            pairs.push(("pageOffset", offset.to_string()));
        }
        pairs
    }
}
