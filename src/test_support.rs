//! Shared fixtures for tests that need a live HTTP endpoint.

use axum::Router;
use tokio::net::TcpListener;

/// A BBC-style article with one byline and two text blocks.
pub const ARTICLE_HTML: &str = r#"
<html><body>
  <article>
    <div data-component="byline-block">
      <span data-testid="byline-new-contributors">Jane Doe[BREAK]Business reporter</span>
    </div>
    <div data-component="text-block">First paragraph.</div>
    <div data-component="text-block">Second paragraph.</div>
  </article>
</body></html>
"#;

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
