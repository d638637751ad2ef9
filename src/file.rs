use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use tracing::debug;

use crate::error::HttpError;

const ASSET_DIR: &str = "public";

pub async fn static_assets(
    req: Request<Body>,
) -> Result<(StatusCode, HeaderMap, Vec<u8>), HttpError> {
    async fn read_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
        let path = path.as_ref();
        debug!("Loading: {:?}", path.canonicalize()?);
        Ok(tokio::fs::read(path).await?)
    }

    let path = if req.uri().path() == "/" {
        "index.html"
    } else {
        &req.uri().path()[1..]
    };
    if path.split('/').any(|segment| segment == "..") {
        return Ok((StatusCode::NOT_FOUND, HeaderMap::new(), Vec::new()));
    }

    let path = PathBuf::from(ASSET_DIR).join(path);
    if !path.is_file() {
        return Ok((StatusCode::NOT_FOUND, HeaderMap::new(), Vec::new()));
    }

    let mut headers = HeaderMap::with_capacity(1);
    if let Some(mime) = mime_guess::from_path(&path).first() {
        headers.append(header::CONTENT_TYPE, mime.as_ref().parse().unwrap());
    }
    Ok((StatusCode::OK, headers, read_file(path).await?))
}
