use axum::{Router, routing::get};

use crate::handlers::{AppState, download, download_file, index};

pub fn schema(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/download", get(download))
        .route("/downloadfile", get(download_file))
        .with_state(state)
}
