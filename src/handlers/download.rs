use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;

use crate::{
    handlers::AppState,
    session::{self, parse_count},
};

#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
    keyword: Option<String>,
    count: Option<String>,
}

/// `GET /download?keyword=..&count=..` as a server-sent event stream
pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let keyword = params.keyword.unwrap_or_default();
    let count = parse_count(params.count.as_deref(), state.max_count);

    let rx = session::spawn(state.search.clone(), state.fetcher.clone(), keyword, count);

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        // SSE data may not carry carriage returns; yt-dlp stderr often does.
        let data = event.to_data().replace('\r', "");
        Some((Ok::<_, Infallible>(Event::default().data(data)), rx))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::to_bytes, http::header, response::IntoResponse};
    use tempfile::tempdir;

    use super::*;
    use crate::{
        fetcher::Fetcher,
        files::FileServer,
        testing::{FakeDownloader, FakeSearch},
        utils::FilenamePolicy,
    };

    fn state(search: FakeSearch, downloader: FakeDownloader, dir: &std::path::Path) -> AppState {
        AppState {
            search: Arc::new(search),
            fetcher: Arc::new(Fetcher::new(
                Arc::new(downloader),
                dir,
                FilenamePolicy::PassThrough,
            )),
            files: Arc::new(FileServer::new(dir)),
            max_count: 50,
        }
    }

    async fn body_of(state: AppState, params: DownloadParams) -> (String, String) {
        let response = download(State(state), Query(params)).await.into_response();
        let content_type = response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn streams_events_in_order() {
        let dir = tempdir().unwrap();
        let state = state(
            FakeSearch::Hits(vec!["a".into(), "b".into()]),
            FakeDownloader::failing_download(&["a"]),
            dir.path(),
        );

        let (content_type, body) = body_of(
            state,
            DownloadParams {
                keyword: Some("rust".into()),
                count: Some("2".into()),
            },
        )
        .await;

        assert!(content_type.starts_with("text/event-stream"));
        let started = body.find("다운로드를 시작합니다.").unwrap();
        let failed = body.find("1번째 영상 오류").unwrap();
        let completed = body.find("2번째 다운로드 완료!").unwrap();
        let finished = body.find("다운로드가 모두 끝났습니다.").unwrap();
        assert!(started < failed && failed < completed && completed < finished);
        assert!(body.contains("/downloadfile?filename="));
        assert_eq!(body.matches("data:").count(), 4);
    }

    #[tokio::test]
    async fn missing_keyword_closes_after_one_event() {
        let dir = tempdir().unwrap();
        let state = state(
            FakeSearch::Hits(vec!["a".into()]),
            FakeDownloader::default(),
            dir.path(),
        );

        let (_, body) = body_of(state, DownloadParams::default()).await;
        assert!(body.contains("검색 키워드를 입력해 주세요."));
        assert_eq!(body.matches("data:").count(), 1);
    }

    #[tokio::test]
    async fn non_numeric_count_behaves_like_one() {
        let dir = tempdir().unwrap();
        let state = state(
            FakeSearch::Hits(vec!["a".into(), "b".into(), "c".into()]),
            FakeDownloader::default(),
            dir.path(),
        );

        let (_, body) = body_of(
            state,
            DownloadParams {
                keyword: Some("rust".into()),
                count: Some("abc".into()),
            },
        )
        .await;
        assert!(body.contains("1번째 다운로드 완료!"));
        assert!(!body.contains("2번째"));
    }
}
