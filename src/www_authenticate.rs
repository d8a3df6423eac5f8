//! `WWW-Authenticate` challenge parsing.

use std::collections::HashMap;

/// Split a challenge such as `OAuth realm="Mobile Vikings", error="expired"`
/// into its scheme and parameters.
///
/// Quoted values are unquoted, commas inside quotes are kept, and parameter
/// names are lowercased. A header without a scheme yields an empty one.
pub fn parse_www_authenticate(header: &str) -> (String, HashMap<String, String>) {
    let header = header.trim();
    let (scheme, rest) = match header.find(char::is_whitespace) {
        Some(idx) => (&header[..idx], &header[idx..]),
        None if header.contains('=') => ("", header),
        None => (header, ""),
    };

    let mut params = HashMap::new();
    for item in split_unquoted(rest) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let mut kv = item.splitn(2, '=');
        let key = kv.next().unwrap_or_default().trim().to_ascii_lowercase();
        let value = unquote(kv.next().unwrap_or_default().trim());
        params.insert(key, value);
    }
    (scheme.to_string(), params)
}

fn split_unquoted(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unquote(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_realm() {
        let (scheme, params) = parse_www_authenticate("OAuth realm=\"Mobile Vikings\"");
        assert_eq!(scheme, "OAuth");
        assert_eq!(params["realm"], "Mobile Vikings");
    }

    #[test]
    fn several_parameters() {
        let (scheme, params) = parse_www_authenticate(
            "OAuth realm=\"a, b\", oauth_problem=token_expired, Note=\"say \\\"hi\\\"\"",
        );
        assert_eq!(scheme, "OAuth");
        assert_eq!(params.len(), 3);
        assert_eq!(params["realm"], "a, b");
        assert_eq!(params["oauth_problem"], "token_expired");
        assert_eq!(params["note"], "say \"hi\"");
    }

    #[test]
    fn scheme_only() {
        let (scheme, params) = parse_www_authenticate("Basic");
        assert_eq!(scheme, "Basic");
        assert!(params.is_empty());
    }

    #[test]
    fn parameters_only() {
        let (scheme, params) = parse_www_authenticate("realm=\"x\"");
        assert_eq!(scheme, "");
        assert_eq!(params["realm"], "x");
    }
}
