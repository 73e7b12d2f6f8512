use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::{
    errors::AppResult,
    files::content_disposition,
    handlers::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct FileParams {
    filename: Option<String>,
}

/// `GET /downloadfile?filename=..` sends a downloaded file as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Query(params): Query<FileParams>,
) -> AppResult<Response> {
    let filename = params.filename.unwrap_or_default();
    log::info!("downloadfile requested: {:?}", filename);

    let path = state.files.resolve(&filename).await?;
    let file = File::open(&path).await?;
    let length = file.metadata().await?.len();

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        body,
    )
        .into_response())
}
