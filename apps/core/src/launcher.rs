use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::action_executor::{plan_item, plan_targets, LaunchError, OpenAction};
use crate::command::resolve_command;
use crate::config::Config;
use crate::dashboard::DashboardConfig;
use crate::keybinds::{KeyEvent, Keymap, LauncherKey};
use crate::local_store::LocalStore;
use crate::model::{build_index, IndexItem};
use crate::patterns::{learn_command, CommandPatterns, MAX_SUGGESTIONS};
use crate::search::Ranker;
use crate::usage::{record_open, UsageCounts};

const MIN_LEARN_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LauncherOptions {
    pub max_results: usize,
    pub debounce: Duration,
}

impl Default for LauncherOptions {
    fn default() -> Self {
        Self {
            max_results: 50,
            debounce: Duration::from_millis(120),
        }
    }
}

impl From<&Config> for LauncherOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            max_results: usize::from(cfg.max_results),
            debounce: Duration::from_millis(cfg.debounce_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Opened,
    Closed,
    Moved(usize),
    Confirmed(Vec<OpenAction>),
    Ignored,
}

#[derive(Debug, Clone)]
struct PendingRender {
    query: String,
    due: Instant,
}

/// One quick launcher session over an immutable candidate index.
pub struct Launcher {
    dashboard: DashboardConfig,
    index: Vec<IndexItem>,
    keymap: Keymap,
    options: LauncherOptions,
    clock: fn() -> DateTime<Utc>,
    visible: bool,
    query: String,
    results: Vec<IndexItem>,
    selected: usize,
    pending: Option<PendingRender>,
}

impl Launcher {
    pub fn new(dashboard: DashboardConfig, options: LauncherOptions) -> Self {
        let index = build_index(&dashboard);
        let keymap = Keymap::from_config(&dashboard.keybinds);
        log::debug!("launcher index built with {} items", index.len());
        Self {
            dashboard,
            index,
            keymap,
            options,
            clock: Utc::now,
            visible: false,
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            pending: None,
        }
    }

    /// Overrides the wall clock used for pattern recency.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Swaps in a new dashboard. The index is rebuilt from scratch and the
    /// current results are dropped.
    pub fn replace_config(&mut self, dashboard: DashboardConfig) {
        self.index = build_index(&dashboard);
        self.keymap = Keymap::from_config(&dashboard.keybinds);
        self.dashboard = dashboard;
        self.results.clear();
        self.selected = 0;
        self.pending = None;
        log::info!("launcher config replaced, index has {} items", self.index.len());
    }

    pub fn dashboard(&self) -> &DashboardConfig {
        &self.dashboard
    }

    pub fn index(&self) -> &[IndexItem] {
        &self.index
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[IndexItem] {
        &self.results
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&IndexItem> {
        self.results.get(self.selected)
    }

    pub fn has_pending_render(&self) -> bool {
        self.pending.is_some()
    }

    /// Shows the launcher with an empty query and popularity-ordered rows.
    pub fn open(&mut self, store: &LocalStore) {
        self.visible = true;
        self.pending = None;
        self.render_now(store, "");
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.pending = None;
    }

    /// Records typed text. Rendering waits for the debounce window; a newer
    /// call replaces the pending one.
    pub fn input_changed(&mut self, text: &str, now: Instant) {
        self.query = text.to_string();
        self.pending = Some(PendingRender {
            query: text.to_string(),
            due: now + self.options.debounce,
        });
    }

    /// Renders the pending query once its deadline has passed. Returns
    /// whether a render happened.
    pub fn poll(&mut self, store: &LocalStore, now: Instant) -> bool {
        let due = match &self.pending {
            Some(pending) if now >= pending.due => pending.query.clone(),
            _ => return false,
        };
        self.render_now(store, &due);
        true
    }

    pub fn render_now(&mut self, store: &LocalStore, query: &str) {
        self.query = query.to_string();
        self.pending = None;
        self.results = self.compute_results(store, query);
        self.selected = 0;
    }

    /// Result rows for `query`: learned suggestions, the command row, the
    /// ranked index and the go/ search row, in that order.
    pub fn compute_results(&self, store: &LocalStore, query: &str) -> Vec<IndexItem> {
        let query = query.trim();
        let analytics = self.dashboard.analytics_enabled();
        let now = (self.clock)();
        let counts = UsageCounts::load(store);
        let patterns = if analytics {
            CommandPatterns::load(store)
        } else {
            CommandPatterns::default()
        };

        let mut rows = Vec::new();
        if !query.is_empty() {
            rows.extend(self.learned_rows(&patterns, query, now));
            let resolution = resolve_command(query, &self.dashboard);
            if !resolution.is_empty() {
                rows.push(IndexItem::command(query, resolution));
            }
        }

        let ranker = Ranker::new(&counts, &patterns, analytics, now);
        rows.extend(
            ranker
                .rank(query, &self.index)
                .into_iter()
                .take(self.options.max_results)
                .map(|scored| scored.item.clone()),
        );

        let fallback = &self.dashboard.go.fallback_search_url;
        if !query.is_empty() && !fallback.is_empty() {
            rows.push(IndexItem::go_search(query, fallback));
        }
        rows
    }

    fn learned_rows(
        &self,
        patterns: &CommandPatterns,
        query: &str,
        now: DateTime<Utc>,
    ) -> Vec<IndexItem> {
        patterns
            .ranked_suggestions(query, now)
            .into_iter()
            .filter(|suggestion| suggestion.command != query)
            .filter_map(|suggestion| {
                let resolution = resolve_command(&suggestion.command, &self.dashboard);
                if resolution.is_empty() {
                    log::debug!("learned command '{}' no longer resolves", suggestion.command);
                    return None;
                }
                Some(IndexItem::learned(&suggestion.command, resolution))
            })
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// Moves the selection, wrapping at both ends.
    pub fn move_selection(&mut self, delta: isize) -> usize {
        let len = self.results.len();
        if len == 0 {
            return 0;
        }
        let len = len as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
        self.selected
    }

    pub fn handle_key(
        &mut self,
        store: &LocalStore,
        event: &KeyEvent,
    ) -> Result<KeyOutcome, LaunchError> {
        let Some(action) = self.keymap.action_for(event, self.visible) else {
            return Ok(KeyOutcome::Ignored);
        };
        match action {
            LauncherKey::Open => {
                self.open(store);
                Ok(KeyOutcome::Opened)
            }
            LauncherKey::Close => {
                self.close();
                Ok(KeyOutcome::Closed)
            }
            LauncherKey::Next => Ok(KeyOutcome::Moved(self.move_selection(1))),
            LauncherKey::Prev => Ok(KeyOutcome::Moved(self.move_selection(-1))),
            LauncherKey::Confirm { open_all } => {
                self.confirm(store, open_all).map(KeyOutcome::Confirmed)
            }
        }
    }

    /// Opens the selected row, or runs the typed text as a command when
    /// there is no row. A pending render is flushed first so the selection
    /// reflects the latest text.
    pub fn confirm(
        &mut self,
        store: &LocalStore,
        open_all: bool,
    ) -> Result<Vec<OpenAction>, LaunchError> {
        if let Some(pending) = self.pending.take() {
            self.render_now(store, &pending.query);
        }

        let actions = match self.selected_item().cloned() {
            Some(item) => self.open_item(store, &item, open_all)?,
            None => {
                let resolution = resolve_command(&self.query, &self.dashboard);
                let actions = plan_targets(&resolution.targets, open_all)?;
                self.record(store, &format!("cmd:{}", resolution.label), Some(&resolution.label));
                actions
            }
        };
        self.close();
        Ok(actions)
    }

    /// Plans the actions for `item` and records the open.
    pub fn open_item(
        &self,
        store: &LocalStore,
        item: &IndexItem,
        open_all: bool,
    ) -> Result<Vec<OpenAction>, LaunchError> {
        let actions = plan_item(item, open_all)?;
        self.record(store, &item.usage_key(), item.command_text());
        Ok(actions)
    }

    fn record(&self, store: &LocalStore, usage_key: &str, command: Option<&str>) {
        if !self.dashboard.analytics_enabled() {
            return;
        }
        if let Err(error) = record_open(store, usage_key) {
            log::warn!("failed to record usage for '{usage_key}': {error}");
        }
        let Some(command) = command.map(str::trim) else {
            return;
        };
        if command.chars().count() < MIN_LEARN_LEN {
            return;
        }
        if let Err(error) = learn_command(store, command, (self.clock)()) {
            log::warn!("failed to learn command '{command}': {error}");
        }
    }
}
