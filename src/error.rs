use std::io;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures of the bookmark file. Each carries the path it happened on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to decode bookmarks file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read bookmarks file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write bookmarks file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn path(&self) -> &PathBuf {
        use StoreError::*;
        match self {
            Decode { path, .. } | Read { path, .. } | Write { path, .. } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown template {0}")]
    Unknown(String),
    #[error("failed to serialize template data")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to render template")]
    Render(#[source] askama::Error),
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid request body")]
    Request(#[source] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Request(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status(), crate::unpack_error(&self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_message_carries_path_and_cause() {
        let source = serde_json::from_str::<serde_json::Value>("[{").unwrap_err();
        let err = HandlerError::from(StoreError::Decode {
            path: PathBuf::from("/tmp/bookmarks.json"),
            source,
        });

        let msg = crate::unpack_error(&err);
        assert!(msg.starts_with("failed to decode bookmarks file /tmp/bookmarks.json: "));
        assert!(msg.contains("EOF"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_error_is_bad_request() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = HandlerError::Request(source);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(crate::unpack_error(&err).starts_with("invalid request body: "));
    }
}
