use crate::action_executor::{LaunchError, OpenAction};
use crate::command::{resolve_command, Resolution};
use crate::config::{validate, Config, ConfigError};
use crate::contract::{
    CoreRequest, CoreResponse, OpenResponse, ResolveKeyResponse, ResolveResponse,
    SearchResponse, TokenizeResponse,
};
use crate::dashboard::{DashboardConfig, DashboardError};
use crate::go_alias::{find_key, go_input_key, resolve_go_input, resolve_key, usage_key_for_input};
use crate::launcher::{Launcher, LauncherOptions};
use crate::local_store::{LocalStore, StoreError};
use crate::model::IndexItem;
use crate::tokenizer::tokenize;
use crate::usage::record_open;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("dashboard error: {0}")]
    Dashboard(#[from] DashboardError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Request-level facade over one launcher and its local store.
pub struct CoreService {
    config: Config,
    store: LocalStore,
    launcher: Launcher,
}

impl CoreService {
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        validate(&config)?;
        let dashboard = DashboardConfig::load_or_builtin(&config.dashboard_path)?;
        let store = LocalStore::open_from_config(&config)?;
        Self::with_store(config, dashboard, store)
    }

    pub fn with_store(
        config: Config,
        dashboard: DashboardConfig,
        store: LocalStore,
    ) -> Result<Self, ServiceError> {
        validate(&config)?;
        let launcher = Launcher::new(dashboard, LauncherOptions::from(&config));
        Ok(Self {
            config,
            store,
            launcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut Launcher {
        &mut self.launcher
    }

    pub fn replace_dashboard(&mut self, dashboard: DashboardConfig) {
        self.launcher.replace_config(dashboard);
    }

    /// Launcher rows for `query`. A `limit` of 0 keeps every row.
    pub fn search(&self, query: &str, limit: usize) -> Vec<IndexItem> {
        let mut rows = self.launcher.compute_results(&self.store, query);
        if limit > 0 {
            rows.truncate(limit);
        }
        rows
    }

    pub fn resolve(&self, text: &str) -> Resolution {
        resolve_command(text, self.launcher.dashboard())
    }

    pub fn resolve_key(&self, key: &str) -> ResolveKeyResponse {
        let go = &self.launcher.dashboard().go;
        ResolveKeyResponse {
            url: resolve_key(go, key),
            key: find_key(go, key).map(str::to_string),
        }
    }

    /// Resolves go/ box input and counts it like the dashboard's go box.
    pub fn go(&self, input: &str) -> String {
        let dashboard = self.launcher.dashboard();
        let url = resolve_go_input(&dashboard.go, input);
        if !dashboard.analytics_enabled() {
            return url;
        }
        let usage_key = go_input_key(input).and_then(|key| usage_key_for_input(&dashboard.go, key));
        if let Some(usage_key) = usage_key {
            if let Err(error) = record_open(&self.store, &usage_key) {
                log::warn!("failed to record go/ usage for '{usage_key}': {error}");
            }
        }
        url
    }

    /// Opens a row by id. Dynamic rows (`cmd:`, `learned:`, `go-search:`)
    /// are rebuilt from the text embedded in the id.
    pub fn open(&self, id: &str, open_all: bool) -> Result<Vec<OpenAction>, ServiceError> {
        let item = self.find_item(id)?;
        Ok(self.launcher.open_item(&self.store, &item, open_all)?)
    }

    fn find_item(&self, id: &str) -> Result<IndexItem, ServiceError> {
        if let Some(item) = self.launcher.index().iter().find(|item| item.id == id) {
            return Ok(item.clone());
        }

        let dashboard = self.launcher.dashboard();
        if let Some(text) = id.strip_prefix("cmd:") {
            let resolution = resolve_command(text, dashboard);
            if !resolution.is_empty() {
                let label = resolution.label.clone();
                return Ok(IndexItem::command(&label, resolution));
            }
        } else if let Some(text) = id.strip_prefix("learned:") {
            let resolution = resolve_command(text, dashboard);
            if !resolution.is_empty() {
                return Ok(IndexItem::learned(text, resolution));
            }
        } else if let Some(query) = id.strip_prefix("go-search:") {
            let fallback = &dashboard.go.fallback_search_url;
            if !fallback.is_empty() && !query.trim().is_empty() {
                return Ok(IndexItem::go_search(query, fallback));
            }
        }
        Err(ServiceError::ItemNotFound(id.to_string()))
    }

    pub fn handle_command(&self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Search(request) => {
                let limit = request.limit.unwrap_or(0);
                let results = self
                    .search(&request.query, limit)
                    .into_iter()
                    .map(Into::into)
                    .collect();
                Ok(CoreResponse::Search(SearchResponse { results }))
            }
            CoreRequest::Resolve(request) => Ok(CoreResponse::Resolve(ResolveResponse::from(
                self.resolve(&request.text),
            ))),
            CoreRequest::ResolveKey(request) => {
                if request.key.trim().is_empty() {
                    return Err(ServiceError::InvalidRequest("key is required".to_string()));
                }
                Ok(CoreResponse::ResolveKey(self.resolve_key(&request.key)))
            }
            CoreRequest::Tokenize(request) => Ok(CoreResponse::Tokenize(TokenizeResponse {
                tokens: tokenize(&request.text),
            })),
            CoreRequest::Open(request) => {
                let actions = self.open(&request.id, request.open_all)?;
                Ok(CoreResponse::Open(OpenResponse { actions }))
            }
        }
    }
}
