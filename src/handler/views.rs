//! View rendering
//!
//! Views are plain HTML files under the configured views directory. A
//! missing `home` view falls back to the built-in page so a bare checkout
//! still serves something.

use std::path::Path;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::config::AppState;
use crate::error::ServerError;
use crate::http;

const HOME_VIEW: &str = "home";

/// GET / -- render the home view.
pub async fn render_home(
    state: &AppState,
    is_head: bool,
) -> Result<Response<Full<Bytes>>, ServerError> {
    let html = render(&state.config.views.dir, HOME_VIEW).await?;
    Ok(http::build_html_response(html, is_head))
}

/// Load `<views_dir>/<name>.html`.
async fn render(views_dir: &str, name: &str) -> Result<String, ServerError> {
    let path = Path::new(views_dir).join(format!("{name}.html"));
    match fs::read_to_string(&path).await {
        Ok(html) => Ok(html),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(builtin_home_page()),
        Err(_) => Err(ServerError::ViewRender(name.to_string())),
    }
}

fn builtin_home_page() -> String {
    String::from(
        r"<!DOCTYPE html>
<html>
<head>
    <meta charset='utf-8'>
    <meta name='viewport' content='width=device-width, initial-scale=1'>
    <title>Vitals</title>
</head>
<body>
    <h1>Vitals</h1>
    <p>Diagnostic HTTP server.</p>
    <ul>
        <li><code>GET /health</code> &mdash; liveness probe</li>
        <li><code>GET /delay/:sec</code> &mdash; delayed response (milliseconds)</li>
    </ul>
</body>
</html>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_view_falls_back_to_builtin() {
        let html = render("no-such-views-dir", HOME_VIEW).await.unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Vitals"));
    }

    #[tokio::test]
    async fn test_view_loaded_from_disk() {
        let dir = std::env::temp_dir().join(format!("vitals-views-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("home.html"), "<html>custom</html>").unwrap();

        let html = render(dir.to_str().unwrap(), HOME_VIEW).await.unwrap();
        assert_eq!(html, "<html>custom</html>");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_view_is_an_error() {
        let result = render("views\u{0}bad", HOME_VIEW).await;
        assert!(matches!(result, Err(ServerError::ViewRender(_))));
    }
}
