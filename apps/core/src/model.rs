use serde::{Deserialize, Serialize};

use crate::command::Resolution;
use crate::dashboard::DashboardConfig;

pub const ICON_LINK: &str = "🔗";
pub const ICON_GO_ALIAS: &str = "🏷️";
pub const ICON_GO_SEARCH: &str = "🔎";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    Link,
    Go,
    Cmd,
    GoSearch,
    Learned,
}

/// A candidate shown by the quick launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexItem {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub url: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub section: String,
    pub search_text: String,
    /// Resolved command for `cmd` and `learned` items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Resolution>,
}

impl IndexItem {
    pub fn link(label: &str, url: &str, icon: Option<&str>, section: &str) -> Self {
        let label = if label.is_empty() { url } else { label };
        Self {
            id: format!("link:{label}"),
            label: label.to_string(),
            icon: icon.unwrap_or(ICON_LINK).to_string(),
            url: url.to_string(),
            item_type: ItemType::Link,
            section: section.to_string(),
            search_text: normalize_for_search(&[label, section, url].join(" ")),
            command: None,
        }
    }

    pub fn go_alias(key: &str, url: &str) -> Self {
        Self {
            id: format!("go:{key}"),
            label: key.to_string(),
            icon: ICON_GO_ALIAS.to_string(),
            url: url.to_string(),
            item_type: ItemType::Go,
            section: "go/".to_string(),
            search_text: normalize_for_search(&format!("go {key} {url}")),
            command: None,
        }
    }

    pub fn go_search(query: &str, fallback_search_url: &str) -> Self {
        Self {
            id: format!("go-search:{query}"),
            label: format!("Search go/: {query}"),
            icon: ICON_GO_SEARCH.to_string(),
            url: format!("{fallback_search_url}{}", urlencoding::encode(query)),
            item_type: ItemType::GoSearch,
            section: String::new(),
            search_text: format!("go {query}"),
            command: None,
        }
    }

    /// The "Run: ..." row for text that resolved into targets.
    pub fn command(query: &str, resolution: Resolution) -> Self {
        let label = if resolution.targets.len() > 1 {
            format!("Run: {query}  (opens {})", resolution.targets.len())
        } else {
            format!("Run: {query}")
        };
        Self {
            id: format!("cmd:{query}"),
            label,
            icon: first_icon(&resolution),
            url: resolution.first_href().unwrap_or_default().to_string(),
            item_type: ItemType::Cmd,
            section: "command".to_string(),
            search_text: normalize_for_search(query),
            command: Some(resolution),
        }
    }

    /// A previously used command suggested again from learned patterns.
    pub fn learned(command: &str, resolution: Resolution) -> Self {
        Self {
            id: format!("learned:{command}"),
            label: command.to_string(),
            icon: first_icon(&resolution),
            url: resolution.first_href().unwrap_or_default().to_string(),
            item_type: ItemType::Learned,
            section: "learned".to_string(),
            search_text: normalize_for_search(command),
            command: Some(resolution),
        }
    }

    /// Counter key in the usage map for this item.
    pub fn usage_key(&self) -> String {
        match self.item_type {
            ItemType::GoSearch => self.id.clone(),
            ItemType::Go => format!("go:{}", self.label),
            ItemType::Cmd | ItemType::Learned => match &self.command {
                Some(resolution) => format!("cmd:{}", resolution.label),
                None => format!("cmd:{}", self.label),
            },
            ItemType::Link => format!("link:{}", self.label),
        }
    }

    /// Text recorded by pattern learning when this item is opened.
    pub fn command_text(&self) -> Option<&str> {
        match self.item_type {
            ItemType::Cmd | ItemType::Learned => {
                self.command.as_ref().map(|resolution| resolution.label.as_str())
            }
            _ => None,
        }
    }
}

fn first_icon(resolution: &Resolution) -> String {
    resolution
        .targets
        .first()
        .map(|target| target.icon.clone())
        .unwrap_or_else(|| crate::command::ICON_TEMPLATE.to_string())
}

/// Builds the static candidate index: every section link in order, then
/// every go/ alias.
pub fn build_index(cfg: &DashboardConfig) -> Vec<IndexItem> {
    let mut items = Vec::new();
    for section in &cfg.sections {
        for link in &section.links {
            items.push(IndexItem::link(
                &link.label,
                &link.url,
                link.icon.as_deref(),
                &section.title,
            ));
        }
    }
    for (key, url) in cfg.go.key_to_url.iter() {
        items.push(IndexItem::go_alias(key, url));
    }
    items
}

pub fn normalize_for_search(input: &str) -> String {
    input.to_lowercase()
}
