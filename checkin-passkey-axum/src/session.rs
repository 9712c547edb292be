use http::HeaderMap;
use http::header::AUTHORIZATION;

/// Pulls the admin session token out of a request, in the order the admin UI
/// sends it: `Authorization: Bearer`, then the `x-admin-session` header, then
/// a `token` query parameter (used for direct image links the UI cannot
/// attach headers to).
pub(crate) fn session_token_from_parts(
    headers: &HeaderMap,
    query: Option<&str>,
) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    let header_token = headers
        .get("x-admin-session")
        .and_then(|v| v.to_str().ok())
        .filter(|token| !token.is_empty());
    if let Some(token) = header_token {
        return Some(token.to_string());
    }

    token_from_query(query)
}

fn token_from_query(query: Option<&str>) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some("token"), Some(v)) if !v.is_empty() => Some(v.to_string()),
            _ => None,
        }
    })
}
