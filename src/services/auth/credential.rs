/*
 * Responsibility
 * - request の cookie / header から token 候補を取り出す (検証はしない)
 * - 優先順位は固定: cookie `X-auth-token` → header `x-auth-token` → absent
 *
 * Notes
 * - header 名の大文字小文字は HeaderMap が正規化済み。ここ以外で再チェックしない
 * - cookie 名は case-sensitive
 * - 値は加工しない (空文字もそのまま返し、拒否は pipeline 側)
 */
use axum::http::{HeaderMap, HeaderName, header};

/// Cookie carrying the token.
pub const TOKEN_COOKIE: &str = "X-auth-token";

/// Fallback request header carrying the token.
pub const TOKEN_HEADER: HeaderName = HeaderName::from_static("x-auth-token");

/// Where a candidate token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cookie,
    Header,
    Absent,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Cookie => "cookie",
            CredentialSource::Header => "header",
            CredentialSource::Absent => "absent",
        }
    }
}

/// Output of the resolver: the raw candidate and its source.
///
/// `token` is `None` exactly when `source` is [`CredentialSource::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    token: Option<String>,
    source: CredentialSource,
}

impl ResolvedCredential {
    fn found(token: String, source: CredentialSource) -> Self {
        Self {
            token: Some(token),
            source,
        }
    }

    fn absent() -> Self {
        Self {
            token: None,
            source: CredentialSource::Absent,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn into_parts(self) -> (Option<String>, CredentialSource) {
        (self.token, self.source)
    }
}

/// Locate a candidate token in the request headers.
pub fn resolve(headers: &HeaderMap) -> ResolvedCredential {
    if let Some(token) = find_cookie(headers, TOKEN_COOKIE) {
        return ResolvedCredential::found(token, CredentialSource::Cookie);
    }

    match headers.get(TOKEN_HEADER) {
        // Non-visible-ASCII bytes are kept (lossily) so the verifier rejects them as malformed
        Some(value) => ResolvedCredential::found(
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
            CredentialSource::Header,
        ),
        None => ResolvedCredential::absent(),
    }
}

// First matching pair across all `Cookie` headers wins. Pairs are split on raw bytes so
// non-ASCII values elsewhere in the header do not hide the token.
fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|value| value.as_bytes().split(|&b| b == b';'))
        .filter_map(|pair| {
            let eq = pair.iter().position(|&b| b == b'=')?;
            Some((&pair[..eq], &pair[eq + 1..]))
        })
        .find(|(key, _)| key.trim_ascii() == name.as_bytes())
        .map(|(_, value)| String::from_utf8_lossy(value.trim_ascii()).into_owned())
}
