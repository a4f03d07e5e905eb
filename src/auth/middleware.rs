//! Request gate: resolves the security context of every inbound request
//!
//! The gate never rejects. A missing or invalid bearer token leaves the
//! request anonymous and the per-route requirement decides.

use crate::auth::{
    context::{Principal, SecurityContext},
    jwt::JwtService,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Paths that skip token processing.
///
/// Entries are exact paths, or prefixes when they end with `*`.
#[derive(Debug, Clone, Default)]
pub struct PublicPaths {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl PublicPaths {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut paths = Self::default();
        for pattern in patterns {
            let pattern = pattern.into();
            match pattern.strip_suffix('*') {
                Some(prefix) => paths.prefixes.push(prefix.to_string()),
                None => paths.exact.push(pattern),
            }
        }
        paths
    }

    pub fn matches(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Outcome of the gate for one request, used for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Bypassed,
    NoToken,
    Authenticated,
    InvalidToken,
}

impl GateOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            GateOutcome::Bypassed => "bypassed",
            GateOutcome::NoToken => "no_token",
            GateOutcome::Authenticated => "authenticated",
            GateOutcome::InvalidToken => "invalid_token",
        }
    }
}

/// Shared gate state handed to the middleware
#[derive(Clone)]
pub struct RequestGate {
    jwt_service: Arc<JwtService>,
    public_paths: Arc<PublicPaths>,
}

impl RequestGate {
    pub fn new(jwt_service: Arc<JwtService>, public_paths: PublicPaths) -> Self {
        Self {
            jwt_service,
            public_paths: Arc::new(public_paths),
        }
    }

    /// Decide the security context for a request path and its headers
    pub fn resolve(&self, path: &str, headers: &HeaderMap) -> (SecurityContext, GateOutcome) {
        if self.public_paths.matches(path) {
            return (SecurityContext::Anonymous, GateOutcome::Bypassed);
        }

        if !headers.contains_key(header::AUTHORIZATION) {
            return (SecurityContext::Anonymous, GateOutcome::NoToken);
        }

        let Some(token) = extract_token(headers) else {
            tracing::warn!(path = %path, "Authorization header is not a bearer token");
            return (SecurityContext::Anonymous, GateOutcome::InvalidToken);
        };

        match self.jwt_service.verify(&token) {
            Ok(claims) => {
                let principal = Principal::from(claims);
                tracing::debug!(username = %principal.username, "Bearer token accepted");
                (SecurityContext::authenticated(principal), GateOutcome::Authenticated)
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Bearer token rejected, continuing anonymously");
                (SecurityContext::Anonymous, GateOutcome::InvalidToken)
            }
        }
    }
}

/// Extract the raw bearer token from the Authorization header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(|s| s.trim().to_string())
}

/// Request gate middleware, applied to every route
pub async fn request_gate(
    State(gate): State<RequestGate>,
    mut req: Request,
    next: Next,
) -> Response {
    let (context, outcome) = gate.resolve(req.uri().path(), req.headers());

    metrics::counter!("auth_gate_total", "outcome" => outcome.as_str()).increment(1);

    req.extensions_mut().insert(context);

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const SECRET: &str = "test_secret_key_32_characters_long!";

    fn gate() -> RequestGate {
        let jwt = Arc::new(JwtService::new(SECRET, "blog-test", 1800).unwrap());
        RequestGate::new(
            jwt,
            PublicPaths::new(["/auth/login", "/api/users/register", "/swagger-ui*"]),
        )
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        headers
    }

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new(["/health", "/v3/api-docs*"]);

        assert!(paths.matches("/health"));
        assert!(paths.matches("/v3/api-docs"));
        assert!(paths.matches("/v3/api-docs/swagger-config"));
        assert!(!paths.matches("/health/deep"));
        assert!(!paths.matches("/api/posts"));
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(&bearer("abc")), Some("abc".to_string()));
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_no_token_is_anonymous() {
        let (ctx, outcome) = gate().resolve("/api/posts", &HeaderMap::new());
        assert!(ctx.is_anonymous());
        assert_eq!(outcome, GateOutcome::NoToken);
    }

    #[test]
    fn test_valid_token_authenticates() {
        let gate = gate();
        let authorities: BTreeSet<String> =
            ["ROLE_AUTHOR".to_string(), "PUBLISH".to_string()].into();
        let token = gate.jwt_service.issue("alice", &authorities).unwrap();

        let (ctx, outcome) = gate.resolve("/api/posts", &bearer(&token));
        assert_eq!(outcome, GateOutcome::Authenticated);

        let principal = ctx.principal().unwrap();
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.authorities, authorities);
    }

    #[test]
    fn test_malformed_token_is_anonymous() {
        let (ctx, outcome) = gate().resolve("/api/posts", &bearer("not.a.jwt"));
        assert!(ctx.is_anonymous());
        assert_eq!(outcome, GateOutcome::InvalidToken);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        let (ctx, outcome) = gate().resolve("/api/posts", &headers);
        assert!(ctx.is_anonymous());
        assert_eq!(outcome, GateOutcome::InvalidToken);
    }

    #[test]
    fn test_bypass_ignores_token() {
        let gate = gate();
        let token = gate.jwt_service.issue("alice", &BTreeSet::new()).unwrap();

        let (ctx, outcome) = gate.resolve("/api/users/register", &bearer(&token));
        assert!(ctx.is_anonymous());
        assert_eq!(outcome, GateOutcome::Bypassed);

        let (_, outcome) = gate.resolve("/swagger-ui/index.html", &HeaderMap::new());
        assert_eq!(outcome, GateOutcome::Bypassed);
    }
}
