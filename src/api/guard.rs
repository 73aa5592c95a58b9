//! Page navigation guard.
//!
//! Runs in front of the page routes (never `/api` or asset fetches) and
//! redirects based on path class and session state: authenticated users
//! away from the auth pages, unauthenticated users away from the editor.
//! The decision is made fresh on every navigation from the session token
//! alone; nothing is remembered between requests.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::AppState;

use super::auth::resolve_session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Login and registration pages
    AuthPage,
    /// The note editor, in both create and edit modes
    Protected,
    Other,
}

pub fn classify(path: &str) -> PathClass {
    if path.starts_with("/login") || path.starts_with("/register") {
        PathClass::AuthPage
    } else if path.starts_with("/note") {
        PathClass::Protected
    } else {
        PathClass::Other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    PassThrough,
    Redirect(String),
}

/// Redirect decision for one navigation. The original URL (path plus
/// query) survives the login redirect as the callbackUrl parameter.
pub fn decide(path: &str, query: Option<&str>, authenticated: bool) -> GuardAction {
    match classify(path) {
        PathClass::AuthPage if authenticated => GuardAction::Redirect("/".to_string()),
        PathClass::Protected if !authenticated => {
            let target = match query {
                Some(q) if !q.is_empty() => format!("{}?{}", path, q),
                _ => path.to_string(),
            };
            GuardAction::Redirect(format!(
                "/login?callbackUrl={}",
                urlencoding::encode(&target)
            ))
        }
        _ => GuardAction::PassThrough,
    }
}

/// Middleware evaluating the guard before any page is served.
pub async fn page_guard(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // API calls and asset fetches are not page navigations
    if path.starts_with("/api/") || path.starts_with("/assets/") || path.contains('.') {
        return next.run(request).await;
    }

    let authenticated = resolve_session(request.headers(), &state.config.auth).is_some();
    let query = request.uri().query().map(|q| q.to_string());

    match decide(&path, query.as_deref(), authenticated) {
        GuardAction::Redirect(target) => Redirect::to(&target).into_response(),
        GuardAction::PassThrough => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("/login"), PathClass::AuthPage);
        assert_eq!(classify("/register"), PathClass::AuthPage);
        assert_eq!(classify("/note"), PathClass::Protected);
        assert_eq!(classify("/note/anything"), PathClass::Protected);
        assert_eq!(classify("/"), PathClass::Other);
        assert_eq!(classify("/about"), PathClass::Other);
    }

    #[test]
    fn test_unauthenticated_editor_visit_redirects_to_login() {
        let action = decide("/note", None, false);
        assert_eq!(
            action,
            GuardAction::Redirect("/login?callbackUrl=%2Fnote".to_string())
        );

        // The callback decodes back to the original path
        if let GuardAction::Redirect(target) = action {
            let encoded = target.split('=').nth(1).unwrap();
            assert_eq!(urlencoding::decode(encoded).unwrap(), "/note");
        }
    }

    #[test]
    fn test_callback_preserves_query() {
        let action = decide("/note", Some("id=abc"), false);
        if let GuardAction::Redirect(target) = action {
            let encoded = target.split('=').nth(1).unwrap();
            assert_eq!(urlencoding::decode(encoded).unwrap(), "/note?id=abc");
        } else {
            panic!("expected redirect");
        }
    }

    #[test]
    fn test_authenticated_auth_page_visit_redirects_home() {
        assert_eq!(
            decide("/login", None, true),
            GuardAction::Redirect("/".to_string())
        );
        assert_eq!(
            decide("/register", None, true),
            GuardAction::Redirect("/".to_string())
        );
    }

    #[test]
    fn test_pass_through_cases() {
        assert_eq!(decide("/login", None, false), GuardAction::PassThrough);
        assert_eq!(decide("/note", None, true), GuardAction::PassThrough);
        assert_eq!(decide("/", None, true), GuardAction::PassThrough);
        assert_eq!(decide("/", None, false), GuardAction::PassThrough);
    }
}
