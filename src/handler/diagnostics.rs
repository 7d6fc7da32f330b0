//! Diagnostic endpoints
//!
//! `/health`, `/delay/:sec`, and `/kill`. Each logs the same line the
//! response carries, so probes can be correlated with server output.

use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::error::ServerError;
use crate::http;
use crate::logger;

/// GET /health -- liveness probe.
pub fn health() -> Response<Full<Bytes>> {
    logger::log_diagnostic("App is healthy");
    http::build_json_response("App is healthy")
}

/// GET /delay/:sec -- suspend the response for `sec` milliseconds.
///
/// The suspension is a plain async timer; other in-flight requests keep
/// being serviced, and dropping this future (client disconnect) cancels it.
///
/// The echoed message divides whatever was supplied by 1000 with JavaScript
/// `Number` semantics, so non-numeric input yields `delay=NaNsec` while the
/// actual delay degrades to zero. Known quirk, preserved deliberately: no
/// 400 path exists and probes depend on the current output.
pub async fn delay(sec: &str) -> Response<Full<Bytes>> {
    let message = format!("Response with delay={}sec", delay_label(sec));
    logger::log_diagnostic(&message);

    if let Some(pause) = delay_duration(sec) {
        tokio::time::sleep(pause).await;
    }

    http::build_json_response(&message)
}

/// GET /kill -- request orderly shutdown.
///
/// The lifecycle manager stops the accept loop and closes the session
/// store; this connection is aborted with no response flushed.
pub fn kill(state: &AppState) -> ServerError {
    logger::log_diagnostic("App was intentionally killed");
    state.lifecycle.request_shutdown();
    ServerError::ShutdownRequested
}

/// Milliseconds to actually sleep: unparseable or non-positive input is no
/// delay at all.
fn delay_duration(sec: &str) -> Option<Duration> {
    let ms = sec.trim().parse::<f64>().ok()?;
    if !ms.is_finite() || ms <= 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let millis = ms as u64;
    Some(Duration::from_millis(millis))
}

/// `sec / 1000` rendered the way JavaScript would print it.
fn delay_label(sec: &str) -> String {
    match sec.trim().parse::<f64>() {
        Ok(ms) if ms.is_finite() => format_number(ms / 1000.0),
        _ => "NaN".to_string(),
    }
}

/// Integral values print without a fractional part (`2`, not `2.0`).
#[allow(clippy::cast_possible_truncation)]
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::time::Instant;

    #[test]
    fn test_delay_label_coercion() {
        assert_eq!(delay_label("2000"), "2");
        assert_eq!(delay_label("500"), "0.5");
        assert_eq!(delay_label("0"), "0");
        assert_eq!(delay_label("abc"), "NaN");
        assert_eq!(delay_label("12abc"), "NaN");
        assert_eq!(delay_label("-1000"), "-1");
    }

    #[test]
    fn test_delay_duration_degrades_to_none() {
        assert_eq!(delay_duration("2000"), Some(Duration::from_millis(2000)));
        assert_eq!(delay_duration("abc"), None);
        assert_eq!(delay_duration("-5"), None);
        assert_eq!(delay_duration("0"), None);
    }

    #[tokio::test]
    async fn test_zero_delay_responds_promptly() {
        let start = Instant::now();
        let response = delay("0").await;
        assert!(start.elapsed() < Duration::from_millis(100));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"message":"Response with delay=0sec"}"#);
    }

    #[tokio::test]
    async fn test_delay_suspends_for_requested_duration() {
        let start = Instant::now();
        let _ = delay("80").await;
        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_non_numeric_delay_does_not_error() {
        let start = Instant::now();
        let response = delay("abc").await;
        assert!(start.elapsed() < Duration::from_millis(100));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"message":"Response with delay=NaNsec"}"#);
    }
}
