use axum::{
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web"]
struct WebAssets;

/// Serve the embedded prediction form and its assets
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Try exact path first
    if !path.is_empty() {
        if let Some(content) = <WebAssets as Embed>::get(path) {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            return (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response();
        }
    }

    // Any other route gets the form page
    if let Some(content) = <WebAssets as Embed>::get("index.html") {
        return Html(String::from_utf8_lossy(&content.data).to_string()).into_response();
    }

    Html(FALLBACK_HTML.to_string()).into_response()
}

const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Dry Bean Classifier</title>
</head>
<body>
    <h1>Dry Bean Classifier</h1>
    <p>The web form is not bundled in this build. The HTTP API is available:</p>
    <ul>
        <li><code>GET /api/schema</code> lists the 16 input features and their defaults</li>
        <li><code>POST /api/predict</code> classifies one bean</li>
        <li><code>POST /api/predict/batch</code> classifies an uploaded CSV</li>
        <li><code>POST /api/predict/url</code> classifies a CSV fetched by URL</li>
        <li><code>POST /api/preview/batch</code> and <code>/api/preview/url</code> show the parsed rows</li>
    </ul>
</body>
</html>
"#;
