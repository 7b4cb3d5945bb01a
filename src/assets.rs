use axum::{
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "static/"]
pub struct StaticAssets;

/// Assets the index page links to. Startup fails if any is missing.
pub const REQUIRED_STATIC: &[&str] = &["app.js", "style.css"];

pub fn verify() -> anyhow::Result<()> {
    for name in REQUIRED_STATIC {
        if StaticAssets::get(name).is_none() {
            anyhow::bail!("static asset {} is not embedded", name);
        }
    }
    Ok(())
}

pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_owned())], Body::from(content.data.into_owned()))
                .into_response()
        }
        None => {
            tracing::debug!(path, "static asset not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_assets_are_embedded() {
        verify().unwrap();
    }

    #[tokio::test]
    async fn test_serve_static_sets_content_type() {
        let resp = serve_static(Path("style.css".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/css");
    }

    #[tokio::test]
    async fn test_serve_static_missing_is_not_found() {
        let resp = serve_static(Path("nope.png".to_string())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
