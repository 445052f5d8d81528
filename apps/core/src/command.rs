use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dashboard::{DashboardConfig, DslDefaults};
use crate::go_alias::resolve_key;
use crate::interpolate::interpolate;
use crate::pattern::match_pattern;
use crate::tokenizer::{split_segments, tokenize};

/// Macros may expand into other macros; expansion stops past this depth so a
/// self-referencing macro resolves to nothing instead of recursing forever.
pub const MAX_MACRO_DEPTH: usize = 8;

pub const ICON_GO: &str = "🏷️";
pub const ICON_PULL_REQUEST: &str = "🔀";
pub const ICON_TRACKER: &str = "🎫";
pub const ICON_TEMPLATE: &str = "⚡";
pub const ICON_TIMER: &str = "⏱️";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LocalAction {
    Timer { minutes: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetKind {
    Url { url: String },
    Action(LocalAction),
}

/// One concrete outcome of a command: a URL to open or a local action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub label: String,
    pub icon: String,
    #[serde(flatten)]
    pub kind: TargetKind,
}

impl Target {
    pub fn url(label: impl Into<String>, icon: &str, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: icon.to_string(),
            kind: TargetKind::Url { url: url.into() },
        }
    }

    pub fn timer(minutes: u32) -> Self {
        Self {
            label: format!("Focus {minutes} min"),
            icon: ICON_TIMER.to_string(),
            kind: TargetKind::Action(LocalAction::Timer { minutes }),
        }
    }

    pub fn href(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::Url { url } => Some(url),
            TargetKind::Action(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub targets: Vec<Target>,
    pub label: String,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn first_href(&self) -> Option<&str> {
        self.targets.first().and_then(Target::href)
    }
}

/// Resolves launcher text into targets. `|` separates segments that are
/// resolved independently; their targets are concatenated in order.
pub fn resolve_command(raw: &str, cfg: &DashboardConfig) -> Resolution {
    let text = raw.trim();
    if text.is_empty() {
        return Resolution::default();
    }

    let targets = split_segments(text)
        .iter()
        .flat_map(|segment| resolve_segment(segment, cfg, 0))
        .collect();

    Resolution {
        targets,
        label: text.to_string(),
    }
}

fn resolve_segment(segment: &str, cfg: &DashboardConfig, depth: usize) -> Vec<Target> {
    let raw = segment.trim();
    let tokens = tokenize(raw);
    let Some(first) = tokens.first() else {
        return Vec::new();
    };
    let dsl = &cfg.command_dsl;

    if first.eq_ignore_ascii_case("go") {
        let key = tokens[1..].join(" ").trim().to_string();
        if key.is_empty() {
            return Vec::new();
        }
        return vec![go_target(cfg, &key)];
    }

    if let Some(target) = pull_request_shorthand(&tokens, &dsl.defaults) {
        return vec![target];
    }

    if let Some(target) = tracker_shorthand(&tokens, &dsl.defaults) {
        return vec![target];
    }

    if depth < MAX_MACRO_DEPTH {
        for (pattern, expansions) in dsl.macros.iter() {
            let Some(matched) = match_pattern(pattern, &tokens) else {
                continue;
            };
            let expanded: Vec<Target> = expansions
                .iter()
                .flat_map(|expansion| {
                    resolve_segment(&interpolate(expansion, &matched.vars), cfg, depth + 1)
                })
                .collect();
            if !expanded.is_empty() {
                return expanded;
            }
        }
    }

    for (pattern, template) in dsl.templates.iter() {
        let Some(matched) = match_pattern(pattern, &tokens) else {
            continue;
        };
        if template.is_empty() && delegates_to_go(pattern) {
            let key = matched.vars.get("key").cloned().unwrap_or_default();
            return vec![go_target(cfg, &key)];
        }
        return vec![Target::url(raw, ICON_TEMPLATE, interpolate(template, &matched.vars))];
    }

    if let Some(target) = timer_shorthand(&tokens) {
        return vec![target];
    }

    Vec::new()
}

fn go_target(cfg: &DashboardConfig, key: &str) -> Target {
    Target::url(format!("go {key}"), ICON_GO, resolve_key(&cfg.go, key))
}

fn pull_request_shorthand(tokens: &[String], defaults: &DslDefaults) -> Option<Target> {
    let [keyword, number, ..] = tokens else {
        return None;
    };
    if !keyword.eq_ignore_ascii_case("pr") || !is_all_digits(number) {
        return None;
    }
    let repo = defaults.default_repo.trim();
    if repo.is_empty() {
        return None;
    }
    Some(Target::url(
        format!("PR #{number} in {repo}"),
        ICON_PULL_REQUEST,
        format!("https://github.com/{repo}/pull/{number}"),
    ))
}

fn tracker_shorthand(tokens: &[String], defaults: &DslDefaults) -> Option<Target> {
    if defaults.tracker_url.is_empty() {
        return None;
    }
    let joined = tokens.join(" ");
    let detected = tracker_id_regex()
        .and_then(|re| re.captures(&joined))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    let prefix = defaults.default_tracker_prefix.as_str();
    let id = match detected {
        Some(id) => id,
        None if !prefix.is_empty()
            && joined.to_uppercase().starts_with(&prefix.to_uppercase()) =>
        {
            joined.trim().to_string()
        }
        None => return None,
    };

    let id = id.to_uppercase();
    let vars = HashMap::from([("id".to_string(), id.clone())]);
    let url = interpolate(&defaults.tracker_url, &vars);
    Some(Target::url(id, ICON_TRACKER, url))
}

fn timer_shorthand(tokens: &[String]) -> Option<Target> {
    let [keyword, minutes, ..] = tokens else {
        return None;
    };
    if !keyword.eq_ignore_ascii_case("time") || !is_all_digits(minutes) {
        return None;
    }
    // all digits, so only overflow can fail
    Some(Target::timer(minutes.parse::<u32>().unwrap_or(u32::MAX)))
}

fn delegates_to_go(pattern: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^go\s+\{").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(pattern.trim()))
}

fn tracker_id_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    // ASCII word boundaries: a preceding non-ASCII letter still starts an ID.
    RE.get_or_init(|| Regex::new(r"(?-u:\b)([A-Za-z]+-[0-9]+)(?-u:\b)").ok())
        .as_ref()
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{resolve_command, LocalAction, Target, TargetKind};
    use crate::dashboard::DashboardConfig;

    fn config() -> DashboardConfig {
        DashboardConfig::builtin().unwrap()
    }

    fn hrefs(text: &str, cfg: &DashboardConfig) -> Vec<String> {
        resolve_command(text, cfg)
            .targets
            .iter()
            .filter_map(|t| t.href().map(str::to_string))
            .collect()
    }

    #[test]
    fn template_builds_url() {
        let cfg = config();
        assert_eq!(
            hrefs("gh octo/cat pr 7", &cfg),
            vec!["https://github.com/octo/cat/pull/7"]
        );
        assert_eq!(
            hrefs("mdn array methods", &cfg),
            vec!["https://developer.mozilla.org/en-US/search?q=array%20methods"]
        );
    }

    #[test]
    fn template_target_uses_segment_as_label() {
        let resolution = resolve_command("  npm left-pad ", &config());
        assert_eq!(resolution.label, "npm left-pad");
        assert_eq!(resolution.targets[0].label, "npm left-pad");
        assert_eq!(resolution.targets[0].icon, "⚡");
    }

    #[test]
    fn pr_shorthand_uses_default_repo() {
        let mut cfg = config();
        cfg.command_dsl.defaults.default_repo = "acme/widgets".to_string();
        assert_eq!(hrefs("pr 9", &cfg), hrefs("gh acme/widgets pr 9", &cfg));
        assert_eq!(resolve_command("pr 9", &cfg).targets[0].label, "PR #9 in acme/widgets");
    }

    #[test]
    fn pr_shorthand_needs_default_repo() {
        assert!(resolve_command("pr 9", &config()).is_empty());
    }

    #[test]
    fn macro_fans_out_to_each_expansion() {
        let resolution = resolve_command("pkg left-pad", &config());
        assert_eq!(
            resolution
                .targets
                .iter()
                .filter_map(Target::href)
                .collect::<Vec<_>>(),
            vec![
                "https://www.npmjs.com/package/left-pad",
                "https://unpkg.com/browse/left-pad/",
                "https://bundlephobia.com/package/left-pad",
            ]
        );
    }

    #[test]
    fn empty_macro_falls_through_to_templates() {
        let mut cfg = config();
        cfg.command_dsl
            .macros
            .insert("so {q}", vec!["nothing-matches {q}".to_string()]);
        assert_eq!(
            hrefs("so borrow checker", &cfg),
            vec!["https://stackoverflow.com/search?q=borrow%20checker"]
        );
    }

    #[test]
    fn recursive_macro_terminates() {
        let mut cfg = config();
        cfg.command_dsl
            .macros
            .insert("loop {x}", vec!["loop {x}".to_string()]);
        assert!(resolve_command("loop me", &cfg).is_empty());
    }

    #[test]
    fn go_prefix_uses_key_alias_resolver() {
        let cfg = config();
        let resolution = resolve_command("GO pam", &cfg);
        assert_eq!(resolution.first_href(), Some("https://go/pam"));
        assert_eq!(resolution.targets[0].label, "go pam");
        assert!(resolve_command("go", &cfg).is_empty());
    }

    #[test]
    fn tracker_ids_are_detected_and_upper_cased() {
        let mut cfg = config();
        cfg.command_dsl.defaults.tracker_url = "https://jira.example.com/browse/{id}".to_string();
        let resolution = resolve_command("look at abc-123 please", &cfg);
        assert_eq!(resolution.targets[0].label, "ABC-123");
        assert_eq!(
            resolution.first_href(),
            Some("https://jira.example.com/browse/ABC-123")
        );
    }

    #[test]
    fn tracker_ids_use_ascii_word_boundaries() {
        let mut cfg = config();
        cfg.command_dsl.defaults.tracker_url = "https://t/{id}".to_string();
        let resolution = resolve_command("see ñABC-12", &cfg);
        assert_eq!(resolution.targets.len(), 1);
        assert_eq!(resolution.targets[0].label, "ABC-12");
        assert!(resolve_command("see ABC-12x", &cfg).is_empty());
    }

    #[test]
    fn tracker_prefix_uses_whole_text() {
        let mut cfg = config();
        cfg.command_dsl.defaults.tracker_url = "https://t/{id}".to_string();
        cfg.command_dsl.defaults.default_tracker_prefix = "ops".to_string();
        assert_eq!(hrefs("ops incident", &cfg), vec!["https://t/OPS INCIDENT"]);
    }

    #[test]
    fn tracker_needs_url() {
        let cfg = config();
        assert!(resolve_command("ABC-123", &cfg).is_empty());
    }

    #[test]
    fn time_yields_timer_action() {
        let resolution = resolve_command("time 25", &config());
        assert_eq!(
            resolution.targets[0].kind,
            TargetKind::Action(LocalAction::Timer { minutes: 25 })
        );
        assert_eq!(resolution.targets[0].label, "Focus 25 min");
        assert!(resolve_command("time later", &config()).is_empty());
    }

    #[test]
    fn oversized_timer_saturates() {
        let resolution = resolve_command("time 5000000000", &config());
        assert_eq!(resolution.targets.len(), 1);
        assert_eq!(
            resolution.targets[0].kind,
            TargetKind::Action(LocalAction::Timer { minutes: u32::MAX })
        );
    }

    #[test]
    fn pipes_concatenate_segments() {
        let resolution = resolve_command("npm react | time 5 | nonsense words", &config());
        assert_eq!(resolution.targets.len(), 2);
        assert_eq!(resolution.label, "npm react | time 5 | nonsense words");
    }

    #[test]
    fn declaration_order_wins_for_overlaps() {
        let mut cfg = DashboardConfig::default();
        cfg.command_dsl.templates.insert("{q}", "https://generic/{q}".to_string());
        cfg.command_dsl
            .templates
            .insert("gh {owner}/{repo}", "https://github.com/{owner}/{repo}".to_string());
        assert_eq!(hrefs("gh a/b", &cfg), vec!["https://generic/gh a/b"]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let cfg = config();
        assert_eq!(
            resolve_command("pkg serde | so lifetimes", &cfg),
            resolve_command("pkg serde | so lifetimes", &cfg)
        );
    }

    #[test]
    fn unknown_text_has_no_targets() {
        assert!(resolve_command("definitely not a command", &config()).is_empty());
        assert!(resolve_command("   ", &config()).label.is_empty());
    }

    #[test]
    fn targets_serialize_with_kind_tag() {
        let json = serde_json::to_value(Target::timer(5)).unwrap();
        assert_eq!(json["kind"], "action");
        assert_eq!(json["action"], "timer");
        assert_eq!(json["minutes"], 5);
    }
}
