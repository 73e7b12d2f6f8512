use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::errors::{AppError, AppResult};
use crate::fetcher::Fetcher;
use crate::video::VideoSearch;

/// Buffered events per session before the producer waits for the client
const EVENT_BUFFER: usize = 16;

/// Short id tagging one download session in the logs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string()[..8].to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated keyword plus how many results to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub count: u32,
}

impl SearchQuery {
    pub fn new(keyword: &str, count: u32) -> AppResult<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::validation("keyword is empty"));
        }
        if count == 0 {
            return Err(AppError::validation("count must be positive"));
        }
        Ok(Self {
            keyword: keyword.to_string(),
            count,
        })
    }
}

/// `count` query value -> result limit. Anything unusable means 1.
pub fn parse_count(raw: Option<&str>, max: u32) -> u32 {
    match raw.map(str::trim).and_then(|value| value.parse::<u32>().ok()) {
        Some(0) | None => 1,
        Some(n) => n.min(max.max(1)),
    }
}

/// One status line pushed to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    KeywordMissing,
    Started,
    NoResults,
    Completed { index: usize, saved_path: PathBuf },
    Failed { index: usize, reason: String },
    SearchFailed(String),
    Finished,
}

impl ProgressEvent {
    pub fn message(&self) -> String {
        match self {
            ProgressEvent::KeywordMissing => "검색 키워드를 입력해 주세요.".to_string(),
            ProgressEvent::Started => "다운로드를 시작합니다.".to_string(),
            ProgressEvent::NoResults => "검색 결과가 없습니다.".to_string(),
            ProgressEvent::Completed { index, saved_path } => {
                format!("{}번째 다운로드 완료! ({})", index, saved_path.display())
            }
            ProgressEvent::Failed { index, reason } => {
                format!("{}번째 영상 오류: {}", index, reason)
            }
            ProgressEvent::SearchFailed(reason) => format!("오류가 발생했습니다: {}", reason),
            ProgressEvent::Finished => "다운로드가 모두 끝났습니다.".to_string(),
        }
    }

    /// `/downloadfile` URL that serves the file this event reports
    pub fn download_link(&self) -> Option<String> {
        match self {
            ProgressEvent::Completed { saved_path, .. } => Some(download_link(saved_path)),
            _ => None,
        }
    }

    /// Markup sent as the event's `data:` payload; the page inserts it as HTML.
    pub fn to_data(&self) -> String {
        let message = self.message();
        let message = html_escape::encode_text(&message);
        match self.download_link() {
            Some(link) => format!(
                "{} <a href=\"{}\" download>다운로드</a>",
                message,
                html_escape::encode_double_quoted_attribute(&link)
            ),
            None => message.into_owned(),
        }
    }
}

fn download_link(saved_path: &Path) -> String {
    let file_name = saved_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("/downloadfile?filename={}", urlencoding::encode(&file_name))
}

/// Start a session in the background; events arrive on the returned receiver.
pub fn spawn(
    search: Arc<dyn VideoSearch>,
    fetcher: Arc<Fetcher>,
    keyword: String,
    count: u32,
) -> mpsc::Receiver<ProgressEvent> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(async move {
        run(search.as_ref(), &fetcher, &keyword, count, tx).await;
    });
    rx
}

/// Search, then fetch every hit in order, reporting each step on `tx`.
///
/// A failed fetch is reported and the next candidate is tried. Once the
/// receiver is gone the in-flight fetch still finishes but nothing new starts.
pub async fn run(
    search: &dyn VideoSearch,
    fetcher: &Fetcher,
    keyword: &str,
    count: u32,
    tx: mpsc::Sender<ProgressEvent>,
) {
    let session = SessionId::new();

    let query = match SearchQuery::new(keyword, count) {
        Ok(query) => query,
        Err(e) => {
            log::warn!("[{}] rejected request: {}", session, e);
            let _ = tx.send(ProgressEvent::KeywordMissing).await;
            return;
        }
    };

    log::info!(
        "[{}] session started: {:?} x{}",
        session,
        query.keyword,
        query.count
    );

    if !emit(&tx, &session, ProgressEvent::Started).await {
        return;
    }

    let candidates = match search.search(&query.keyword, query.count).await {
        Ok(candidates) => candidates,
        Err(e) => {
            log::error!("[{}] search failed: {}", session, e);
            if emit(&tx, &session, ProgressEvent::SearchFailed(e.to_string())).await {
                emit(&tx, &session, ProgressEvent::Finished).await;
            }
            return;
        }
    };

    if candidates.is_empty() {
        if emit(&tx, &session, ProgressEvent::NoResults).await {
            emit(&tx, &session, ProgressEvent::Finished).await;
        }
        return;
    }

    for (index, candidate) in candidates.iter().enumerate().map(|(i, c)| (i + 1, c)) {
        let event = match fetcher.fetch(candidate, index).await {
            Ok(result) => ProgressEvent::Completed {
                index,
                saved_path: result.saved_path,
            },
            Err(e) => {
                log::error!("[{}] candidate {} ({}) failed: {}", session, index, candidate.id, e);
                ProgressEvent::Failed {
                    index,
                    reason: e.to_string(),
                }
            }
        };

        if !emit(&tx, &session, event).await {
            return;
        }
    }

    emit(&tx, &session, ProgressEvent::Finished).await;
    log::info!("[{}] session finished", session);
}

/// Returns false once the client has gone away.
async fn emit(tx: &mpsc::Sender<ProgressEvent>, session: &SessionId, event: ProgressEvent) -> bool {
    if tx.send(event).await.is_err() {
        log::info!("[{}] client disconnected, stopping", session);
        return false;
    }
    true
}
