use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const BUILTIN_DASHBOARD: &str = include_str!("../assets/default-dashboard.json5");

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("failed to read dashboard config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON dashboard config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid JSON5 dashboard config: {0}")]
    Json5(#[from] json5::Error),
    #[error("invalid TOML dashboard config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The dashboard configuration the launcher consumes. Loading and merging
/// layered configs happens elsewhere; this is the already-assembled view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub go: GoConfig,
    pub command_dsl: CommandDslConfig,
    pub sections: Vec<Section>,
    pub analytics: AnalyticsConfig,
    pub keybinds: Keybinds,
}

impl DashboardConfig {
    /// The sample dashboard shipped with the binary.
    pub fn builtin() -> Result<Self, DashboardError> {
        Self::from_json5_str(BUILTIN_DASHBOARD)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DashboardError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json5_str(raw: &str) -> Result<Self, DashboardError> {
        Ok(json5::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, DashboardError> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads a dashboard file, choosing the format from its extension.
    /// Unknown extensions are read as JSON5, which also accepts plain JSON.
    pub fn load_file(path: &Path) -> Result<Self, DashboardError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Self::from_json_str(&raw),
            "toml" => Self::from_toml_str(&raw),
            _ => Self::from_json5_str(&raw),
        }
    }

    /// Loads `path` when it exists, otherwise the builtin sample.
    pub fn load_or_builtin(path: &Path) -> Result<Self, DashboardError> {
        if path.exists() {
            Self::load_file(path)
        } else {
            log::info!(
                "dashboard config {} not found, using builtin sample",
                path.display()
            );
            Self::builtin()
        }
    }

    pub fn analytics_enabled(&self) -> bool {
        self.analytics.enable_local
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoConfig {
    pub homepage_url: String,
    pub fallback_search_url: String,
    pub key_to_url: OrderedMap<String>,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            homepage_url: "https://go/".to_string(),
            fallback_search_url: String::new(),
            key_to_url: OrderedMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandDslConfig {
    /// Pattern to URL template, in declaration order.
    pub templates: OrderedMap<String>,
    /// Pattern to expansion commands, in declaration order.
    pub macros: OrderedMap<Vec<String>>,
    pub defaults: DslDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DslDefaults {
    pub default_repo: String,
    pub default_tracker_prefix: String,
    pub tracker_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub title: String,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsConfig {
    pub enable_local: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Keybinds {
    pub quick_launcher_open: String,
    pub quick_launcher_close: String,
    pub quick_launcher_next: String,
    pub quick_launcher_prev: String,
    pub quick_launcher_open_in_tab: String,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            quick_launcher_open: "Mod+K".to_string(),
            quick_launcher_close: "Escape".to_string(),
            quick_launcher_next: "ArrowDown".to_string(),
            quick_launcher_prev: "ArrowUp".to_string(),
            quick_launcher_open_in_tab: "Enter".to_string(),
        }
    }
}

/// String-keyed map that keeps declaration order.
///
/// Template and macro precedence is decided by the order the user wrote the
/// rules in, so these tables cannot be hash maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts or replaces a value; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
