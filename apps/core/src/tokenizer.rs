/// Replaces typographic quotes with their ASCII equivalents so that text
/// pasted from documents tokenizes the same way as typed text.
pub fn normalize_smart_quotes(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Splits launcher input into shell-like tokens.
///
/// Whitespace separates tokens unless it is quoted. Single and double quotes
/// group text (each is literal inside the other), and a backslash takes the
/// next character literally. Unterminated quotes are accepted: the partial
/// token is still returned.
pub fn tokenize(input: &str) -> Vec<String> {
    let normalized = normalize_smart_quotes(input);
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for ch in normalized.trim().chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' => escaped = true,
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            ch if ch.is_whitespace() && !in_single && !in_double => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Splits input on `|` into independently resolved command segments.
///
/// Pipes inside quotes or after a backslash do not split. Quotes and escapes
/// are kept verbatim in the segment so that [`tokenize`] sees them again.
pub fn split_segments(input: &str) -> Vec<String> {
    let normalized = normalize_smart_quotes(input);
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for ch in normalized.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' => {
                escaped = true;
                current.push(ch);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(ch);
            }
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(ch);
            }
            '|' if !in_single && !in_double => {
                segments.push(std::mem::take(&mut current));
            }
            ch => current.push(ch),
        }
    }
    segments.push(current);

    segments
        .into_iter()
        .map(|segment| segment.trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect()
}
