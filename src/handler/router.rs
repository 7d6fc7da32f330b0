//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Five fixed behaviors: home view,
//! health probe, artificial delay, kill switch, and static asset fallback.
//! The session middleware runs ahead of every route, and any error raised
//! while producing a response is caught here, logged, and answered with a
//! generic 500 -- the server keeps serving.

use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::error::ServerError;
use crate::handler::{diagnostics, static_files, views};
use crate::http;
use crate::logger;
use crate::logger::AccessLogEntry;
use crate::session::{self, cookie};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: Method,
    pub path: &'a str,
    pub is_head: bool,
    pub cookie_header: Option<String>,
    pub if_none_match: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, ServerError> {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let ctx = RequestContext {
        is_head: method == Method::HEAD,
        method,
        path: uri.path(),
        cookie_header: header("cookie"),
        if_none_match: header("if-none-match"),
        referer: header("referer"),
        user_agent: header("user-agent"),
    };

    let result = respond(&ctx, &state).await;

    if state.config.logging.access_log {
        if let Ok(response) = &result {
            let mut entry = AccessLogEntry::new(
                peer_addr.to_string(),
                ctx.method.to_string(),
                ctx.path.to_string(),
            );
            entry.query = uri.query().map(ToString::to_string);
            entry.status = response.status().as_u16();
            entry.body_bytes = content_length(response);
            entry.referer = ctx.referer.clone();
            entry.user_agent = ctx.user_agent.clone();
            logger::log_access(&entry, &state.config.logging.access_log_format);
        }
    }

    result
}

fn content_length(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Dispatch and apply the central error policy.
///
/// `ShutdownRequested` passes through so the `/kill` connection is aborted
/// without a response; everything else degrades to a 500 that is terminal
/// to this request only.
async fn respond(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Result<Response<Full<Bytes>>, ServerError> {
    match dispatch(ctx, state).await {
        Ok(response) => Ok(response),
        Err(ServerError::ShutdownRequested) => Err(ServerError::ShutdownRequested),
        Err(e) => {
            logger::log_error(&format!("Unhandled error serving {}: {e}", ctx.path));
            Ok(http::build_500_response())
        }
    }
}

/// Route a request to one of the five fixed behaviors.
async fn dispatch(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Result<Response<Full<Bytes>>, ServerError> {
    match &ctx.method {
        &Method::GET | &Method::HEAD => {}
        &Method::OPTIONS => return Ok(http::build_options_response()),
        other => {
            logger::log_warning(&format!("Method not allowed: {other}"));
            return Ok(http::build_405_response());
        }
    }

    // Session middleware runs on every request regardless of route.
    let session = session::establish(state, ctx.cookie_header.as_deref()).await?;

    let mut response = if ctx.path == "/" {
        views::render_home(state, ctx.is_head).await?
    } else if ctx.path == "/health" {
        diagnostics::health()
    } else if ctx.path == "/kill" {
        return Err(diagnostics::kill(state));
    } else if let Some(sec) = delay_param(ctx.path) {
        diagnostics::delay(sec).await
    } else {
        static_files::serve(ctx, state).await
    };

    if session.is_new {
        let cfg = &state.config.session;
        let value = cookie::set_cookie(
            &cfg.cookie_name,
            &session.id,
            cfg.secret.as_bytes(),
            cfg.ttl_secs(),
        );
        let value = HeaderValue::from_str(&value).map_err(hyper::http::Error::from)?;
        response.headers_mut().insert(SET_COOKIE, value);
    }

    Ok(response)
}

/// `/delay/:sec` takes exactly one extra path segment.
fn delay_param(path: &str) -> Option<&str> {
    let sec = path.strip_prefix("/delay/")?;
    if sec.is_empty() || sec.contains('/') {
        return None;
    }
    Some(sec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn get(path: &str) -> RequestContext<'_> {
        RequestContext {
            method: Method::GET,
            path,
            is_head: false,
            cookie_header: None,
            if_none_match: None,
            referer: None,
            user_agent: None,
        }
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn set_cookie_header(response: &Response<Full<Bytes>>) -> Option<String> {
        response
            .headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_delay_param() {
        assert_eq!(delay_param("/delay/2000"), Some("2000"));
        assert_eq!(delay_param("/delay/abc"), Some("abc"));
        assert_eq!(delay_param("/delay/"), None);
        assert_eq!(delay_param("/delay"), None);
        assert_eq!(delay_param("/delay/1/2"), None);
        assert_eq!(delay_param("/health"), None);
    }

    #[tokio::test]
    async fn test_health_route() {
        let state = Arc::new(AppState::for_tests());
        let response = respond(&get("/health"), &state).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            &body_of(response).await[..],
            br#"{"message":"App is healthy"}"#
        );
    }

    #[tokio::test]
    async fn test_home_route_renders_html() {
        let state = Arc::new(AppState::for_tests());
        let response = respond(&get("/"), &state).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["Content-Type"].to_str().unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_not_500() {
        let state = Arc::new(AppState::for_tests());
        let response = respond(&get("/definitely/not/here.xyz"), &state)
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_non_get_method_is_405() {
        let state = Arc::new(AppState::for_tests());
        let mut ctx = get("/health");
        ctx.method = Method::POST;
        let response = respond(&ctx, &state).await.unwrap();
        assert_eq!(response.status(), 405);
    }

    #[tokio::test]
    async fn test_new_session_gets_cookie_and_keeps_it() {
        let state = Arc::new(AppState::for_tests());

        let first = respond(&get("/health"), &state).await.unwrap();
        let header = set_cookie_header(&first).expect("first response sets a session cookie");
        let value = header.split(';').next().unwrap().to_string();

        let mut ctx = get("/health");
        ctx.cookie_header = Some(value);
        let second = respond(&ctx, &state).await.unwrap();
        assert!(
            set_cookie_header(&second).is_none(),
            "a returning session must not be re-issued"
        );
    }

    #[tokio::test]
    async fn test_kill_aborts_without_response_and_requests_shutdown() {
        let state = Arc::new(AppState::for_tests());
        let result = respond(&get("/kill"), &state).await;
        assert!(matches!(result, Err(ServerError::ShutdownRequested)));
        assert!(state.lifecycle.is_requested());
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500() {
        let state = Arc::new(AppState::for_tests());
        // An interior NUL makes the view read fail with a non-NotFound error.
        let mut broken = AppState::for_tests();
        broken.config.views.dir = "views\u{0}bad".to_string();
        let broken = Arc::new(broken);

        let response = respond(&get("/"), &broken).await.unwrap();
        assert_eq!(response.status(), 500);

        // The healthy state still serves afterwards.
        let response = respond(&get("/health"), &state).await.unwrap();
        assert_eq!(response.status(), 200);
    }
}
