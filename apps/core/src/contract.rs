use serde::{Deserialize, Serialize};

use crate::action_executor::OpenAction;
use crate::command::{Resolution, Target};
use crate::model::{IndexItem, ItemType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResultDto {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub label: String,
    pub icon: String,
    pub url: String,
    pub section: String,
    pub target_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<SearchResultDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveResponse {
    pub label: String,
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveKeyRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveKeyResponse {
    pub url: String,
    /// Configured spelling of the alias when the key is known.
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenizeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenizeResponse {
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenRequest {
    pub id: String,
    #[serde(default)]
    pub open_all: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenResponse {
    pub actions: Vec<OpenAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreRequest {
    Search(SearchRequest),
    Resolve(ResolveRequest),
    ResolveKey(ResolveKeyRequest),
    Tokenize(TokenizeRequest),
    Open(OpenRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreResponse {
    Search(SearchResponse),
    Resolve(ResolveResponse),
    ResolveKey(ResolveKeyResponse),
    Tokenize(TokenizeResponse),
    Open(OpenResponse),
}

impl From<IndexItem> for SearchResultDto {
    fn from(value: IndexItem) -> Self {
        Self {
            target_count: value.command.as_ref().map_or(0, |cmd| cmd.targets.len()),
            id: value.id,
            item_type: value.item_type,
            label: value.label,
            icon: value.icon,
            url: value.url,
            section: value.section,
        }
    }
}

impl From<Resolution> for ResolveResponse {
    fn from(value: Resolution) -> Self {
        Self {
            label: value.label,
            targets: value.targets,
        }
    }
}
