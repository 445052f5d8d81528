use crate::dashboard::GoConfig;

/// Resolves a go/ key to a URL.
///
/// Keys match case-insensitively. Unknown keys go to the fallback search URL
/// with the key appended percent-encoded, or to the homepage when no fallback
/// is configured.
pub fn resolve_key(go: &GoConfig, key: &str) -> String {
    if let Some(url) = lookup(go, key).map(|(_, url)| url) {
        return url.to_string();
    }
    if !go.fallback_search_url.is_empty() {
        return format!("{}{}", go.fallback_search_url, urlencoding::encode(key));
    }
    go.homepage_url.clone()
}

/// Returns the configured spelling of `key`, if it is a known alias.
pub fn find_key<'a>(go: &'a GoConfig, key: &str) -> Option<&'a str> {
    lookup(go, key).map(|(configured, _)| configured)
}

/// Resolves free text typed into the go/ box: `go/key`, `go key` or a bare
/// key. Empty input, `go` and `go/` open the homepage.
pub fn resolve_go_input(go: &GoConfig, raw: &str) -> String {
    match go_input_key(raw) {
        Some(key) => resolve_key(go, key),
        None => go.homepage_url.clone(),
    }
}

/// The key named by go/ box input, or `None` when the input only asks for
/// the homepage.
pub fn go_input_key(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("go") {
        return None;
    }
    let key = raw
        .strip_prefix("go/")
        .or_else(|| raw.strip_prefix("go "))
        .unwrap_or(raw)
        .trim();
    (!key.is_empty()).then_some(key)
}

/// Usage counter key for a go/ box submission: `go:<key>` for known aliases,
/// `go-search:<text>` for free-text searches when a fallback exists.
pub fn usage_key_for_input(go: &GoConfig, key: &str) -> Option<String> {
    if let Some(configured) = find_key(go, key) {
        return Some(format!("go:{configured}"));
    }
    if !go.fallback_search_url.is_empty() {
        return Some(format!("go-search:{key}"));
    }
    None
}

fn lookup<'a>(go: &'a GoConfig, key: &str) -> Option<(&'a str, &'a str)> {
    let wanted = key.to_lowercase();
    go.key_to_url
        .iter()
        .find(|(configured, _)| configured.to_lowercase() == wanted)
        .map(|(configured, url)| (configured, url.as_str()))
}

#[cfg(test)]
mod tests {
    use super::{find_key, go_input_key, resolve_go_input, resolve_key, usage_key_for_input};
    use crate::dashboard::GoConfig;

    fn go_config(fallback: &str) -> GoConfig {
        GoConfig {
            homepage_url: "https://go/".to_string(),
            fallback_search_url: fallback.to_string(),
            key_to_url: [("PAM", "https://go/pam".to_string())].into_iter().collect(),
        }
    }

    #[test]
    fn resolves_case_insensitively() {
        assert_eq!(resolve_key(&go_config(""), "pam"), "https://go/pam");
        assert_eq!(find_key(&go_config(""), "pAm"), Some("PAM"));
    }

    #[test]
    fn unknown_key_without_fallback_opens_homepage() {
        assert_eq!(resolve_key(&go_config(""), "missing"), "https://go/");
        assert_eq!(find_key(&go_config(""), "missing"), None);
    }

    #[test]
    fn unknown_key_with_fallback_searches() {
        let cfg = go_config("https://go/search?q=");
        assert_eq!(resolve_key(&cfg, "team docs"), "https://go/search?q=team%20docs");
    }

    #[test]
    fn go_box_input_forms() {
        let cfg = go_config("");
        assert_eq!(resolve_go_input(&cfg, "go/pam"), "https://go/pam");
        assert_eq!(resolve_go_input(&cfg, "go pam"), "https://go/pam");
        assert_eq!(resolve_go_input(&cfg, "PAM"), "https://go/pam");
        assert_eq!(resolve_go_input(&cfg, " go/ "), "https://go/");
        assert_eq!(resolve_go_input(&cfg, "GO"), "https://go/");
    }

    #[test]
    fn go_input_key_strips_prefixes() {
        assert_eq!(go_input_key("go/ pam "), Some("pam"));
        assert_eq!(go_input_key("go team docs"), Some("team docs"));
        assert_eq!(go_input_key("go/"), None);
        assert_eq!(go_input_key("   "), None);
    }

    #[test]
    fn usage_keys_distinguish_alias_and_search() {
        assert_eq!(usage_key_for_input(&go_config(""), "pam").as_deref(), Some("go:PAM"));
        assert_eq!(usage_key_for_input(&go_config(""), "x"), None);
        assert_eq!(
            usage_key_for_input(&go_config("https://s/?q="), "x").as_deref(),
            Some("go-search:x")
        );
    }
}
