use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Variables bound by a successful pattern match.
pub type Vars = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub vars: Vars,
    pub used_tokens: usize,
}

/// Matches input tokens against a pattern such as `gh {owner}/{repo} pr {num}`.
///
/// A final pattern token that is a bare `{name}` captures every remaining
/// input token joined with single spaces; any other pattern needs exactly one
/// input token per pattern token. Returns `None` when the input does not fit.
pub fn match_pattern(pattern: &str, tokens: &[String]) -> Option<PatternMatch> {
    let pattern_tokens: Vec<&str> = pattern.split_whitespace().collect();
    let (last, fixed) = pattern_tokens.split_last()?;
    let mut vars = Vars::new();

    if let Some(rest_name) = rest_capture_name(last) {
        if tokens.len() < fixed.len() {
            return None;
        }
        for (pattern_token, input) in fixed.iter().zip(tokens) {
            bind_token(pattern_token, input, &mut vars)?;
        }
        let rest = tokens[fixed.len()..].join(" ").trim().to_string();
        vars.insert(rest_name.to_string(), rest);
        return Some(PatternMatch {
            vars,
            used_tokens: tokens.len(),
        });
    }

    if tokens.len() != pattern_tokens.len() {
        return None;
    }
    for (pattern_token, input) in pattern_tokens.iter().zip(tokens) {
        bind_token(pattern_token, input, &mut vars)?;
    }
    Some(PatternMatch {
        vars,
        used_tokens: pattern_tokens.len(),
    })
}

fn rest_capture_name(pattern_token: &str) -> Option<&str> {
    static BARE_PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    let re = BARE_PLACEHOLDER
        .get_or_init(|| Regex::new(r"^\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}$").ok())
        .as_ref()?;
    re.captures(pattern_token)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str())
}

fn bind_token(pattern_token: &str, input: &str, vars: &mut Vars) -> Option<()> {
    let compiled = TokenRegex::build(pattern_token)?;
    let caps = compiled.regex.captures(input)?;
    for (index, name) in compiled.names.iter().enumerate() {
        let value = caps.get(index + 1).map(|m| m.as_str()).unwrap_or_default();
        vars.insert(name.clone(), value.to_string());
    }
    Some(())
}

/// Anchored regex for one pattern token plus its placeholder names in
/// capture-group order.
#[derive(Debug)]
pub struct TokenRegex {
    pub regex: Regex,
    pub names: Vec<String>,
}

impl TokenRegex {
    /// Placeholders capture `[^/]+` when the token contains a `/`, so that
    /// `{owner}/{repo}` splits on the separator, and `[^\s]+` otherwise. A `{`
    /// without a closing brace is literal text. Returns `None` if the regex
    /// cannot be compiled.
    pub fn build(pattern_token: &str) -> Option<Self> {
        let slash_aware = pattern_token.contains('/');
        let mut source = String::from("^");
        let mut names = Vec::new();
        let mut rest = pattern_token;

        while let Some(open) = rest.find('{') {
            source.push_str(&regex::escape(&rest[..open]));
            let after_open = &rest[open + 1..];
            match after_open.find('}') {
                Some(close) => {
                    names.push(after_open[..close].trim().to_string());
                    source.push_str(if slash_aware { "([^/]+)" } else { r"([^\s]+)" });
                    rest = &after_open[close + 1..];
                }
                None => {
                    source.push_str(r"\{");
                    rest = after_open;
                }
            }
        }
        source.push_str(&regex::escape(rest));
        source.push('$');

        let regex = Regex::new(&source).ok()?;
        Some(Self { regex, names })
    }
}

#[cfg(test)]
mod tests {
    use super::{match_pattern, TokenRegex};
    use crate::tokenizer::tokenize;

    #[test]
    fn binds_embedded_placeholders() {
        let matched =
            match_pattern("gh {owner}/{repo} pr {num}", &tokenize("gh octo/cat pr 7")).unwrap();
        assert_eq!(matched.vars["owner"], "octo");
        assert_eq!(matched.vars["repo"], "cat");
        assert_eq!(matched.vars["num"], "7");
        assert_eq!(matched.used_tokens, 4);
    }

    #[test]
    fn rest_capture_joins_remaining_tokens() {
        let matched = match_pattern("mdn {q}", &tokenize("mdn array methods")).unwrap();
        assert_eq!(matched.vars["q"], "array methods");
        assert_eq!(matched.used_tokens, 3);
    }

    #[test]
    fn rest_capture_may_be_empty() {
        let matched = match_pattern("gh code {q}", &tokenize("gh code")).unwrap();
        assert_eq!(matched.vars["q"], "");
    }

    #[test]
    fn rest_capture_needs_prefix_tokens() {
        assert!(match_pattern("gh code {q}", &tokenize("gh")).is_none());
        assert!(match_pattern("gh code {q}", &tokenize("gh issues x")).is_none());
    }

    #[test]
    fn exact_patterns_need_exact_length() {
        assert!(match_pattern("gh {owner}/{repo}", &tokenize("gh a/b extra")).is_none());
        assert!(match_pattern("gh {owner}/{repo} i {num}", &tokenize("gh a/b i")).is_none());
    }

    #[test]
    fn literal_tokens_must_match_exactly() {
        assert!(match_pattern("npm {pkg}", &tokenize("NPM react")).is_none());
        assert!(match_pattern("r/{sub}", &tokenize("r/rust")).is_some());
        assert!(match_pattern("r/{sub}", &tokenize("rx/rust")).is_none());
    }

    #[test]
    fn slash_aware_placeholder_rejects_missing_separator() {
        assert!(match_pattern("gh {owner}/{repo}", &tokenize("gh onlyowner")).is_none());
    }

    #[test]
    fn stray_brace_is_literal() {
        let matched = match_pattern("x {a", &tokenize("x {a")).unwrap();
        assert!(matched.vars.is_empty());
        assert!(match_pattern("x {a", &tokenize("x a")).is_none());
    }

    #[test]
    fn later_binding_overwrites_earlier() {
        let matched = match_pattern("{v} {v}", &tokenize("one two")).unwrap();
        assert_eq!(matched.vars["v"], "two");
    }

    #[test]
    fn empty_pattern_never_matches() {
        assert!(match_pattern("   ", &tokenize("anything")).is_none());
    }

    #[test]
    fn token_regex_escapes_literals() {
        let compiled = TokenRegex::build("a.b+{x}").unwrap();
        assert!(compiled.regex.is_match("a.b+c"));
        assert!(!compiled.regex.is_match("axb+c"));
        assert_eq!(compiled.names, vec!["x".to_string()]);
    }
}
