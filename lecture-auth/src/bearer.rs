//! `Authorization: Bearer <token>` extraction, kept verbatim from the
//! original strategy's header-parsing shape (SPEC_FULL.md §6 requires this
//! header on every route but `/login`/`/callback`).

use std::collections::HashMap;

/// Pull the token out of an `authorization` header value of the form
/// `Bearer <token>`. Case-insensitive on both the header name lookup (the
/// caller is expected to have normalized keys, but we check both cases
/// defensively) and the `Bearer` scheme itself.
pub fn extract_bearer_token(headers: &HashMap<String, String>) -> Option<String> {
    let raw = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?;

    let raw = raw.trim();
    let (scheme, token) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_case_insensitively() {
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "bearer abc.def.ghi".to_string());
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_other_schemes() {
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "Basic dXNlcjpwYXNz".to_string());
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(extract_bearer_token(&HashMap::new()), None);
    }
}
