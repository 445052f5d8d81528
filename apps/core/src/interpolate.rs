use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Substitutes every `{expr}` in `template`.
///
/// `expr` is either a variable name or a call such as `urlencode(lower(q))`;
/// unbound variables become empty strings. Text outside braces is copied
/// unchanged.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    let Some(re) = placeholder_regex() else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &Captures<'_>| eval_expr(&caps[1], vars))
        .into_owned()
}

fn eval_expr(expr: &str, vars: &HashMap<String, String>) -> String {
    let expr = expr.trim();
    if let Some(caps) = call_regex().and_then(|re| re.captures(expr)) {
        let inner = eval_expr(&caps[2], vars);
        return apply_transform(&caps[1], &inner);
    }
    vars.get(expr).cloned().unwrap_or_default()
}

/// Applies a named transform; unknown names return the value unchanged.
pub fn apply_transform(name: &str, value: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "urlencode" => urlencoding::encode(value).into_owned(),
        "lower" => value.to_lowercase(),
        "kebab" => kebab_case(value),
        _ => value.to_string(),
    }
}

pub fn kebab_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

fn placeholder_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").ok()).as_ref()
}

fn call_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{interpolate, kebab_case};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn url_encodes_values() {
        let out = interpolate(
            "https://developer.mozilla.org/en-US/search?q={urlencode(q)}",
            &vars(&[("q", "a b")]),
        );
        assert!(out.contains("q=a%20b"));
    }

    #[test]
    fn substitutes_plain_variables_and_blanks_unbound() {
        let out = interpolate(
            "https://github.com/{owner}/{repo}/pull/{num}",
            &vars(&[("owner", "octo"), ("repo", "cat")]),
        );
        assert_eq!(out, "https://github.com/octo/cat/pull/");
    }

    #[test]
    fn nests_transforms() {
        let out = interpolate("{urlencode(lower(q))}", &vars(&[("q", "Hello World")]));
        assert_eq!(out, "hello%20world");
        let out = interpolate("{ KEBAB( title ) }", &vars(&[("title", "  Hello, World!  ")]));
        assert_eq!(out, "hello-world");
    }

    #[test]
    fn unknown_transform_passes_value_through() {
        let out = interpolate("{shout(q)}", &vars(&[("q", "hi")]));
        assert_eq!(out, "hi");
    }

    #[test]
    fn unbalanced_brace_is_left_alone() {
        let out = interpolate("a{b", &vars(&[("b", "x")]));
        assert_eq!(out, "a{b");
    }

    #[test]
    fn kebab_collapses_runs() {
        assert_eq!(kebab_case("--Foo__Bar  baz--"), "foo-bar-baz");
        assert_eq!(kebab_case("***"), "");
    }
}
