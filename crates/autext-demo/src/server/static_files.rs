use axum::{
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "static"]
struct WebAssets;

/// Serve the embedded demo page and its assets
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

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

    if path.is_empty() || path == "index.html" {
        if let Some(content) = <WebAssets as Embed>::get("index.html") {
            return Html(String::from_utf8_lossy(&content.data).to_string()).into_response();
        }
    }

    (StatusCode::NOT_FOUND, "Not found").into_response()
}
