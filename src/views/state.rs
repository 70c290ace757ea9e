use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::api::ApiError;

/// What a failed load shows: the extracted message, plus the HTTP status when there was one.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub message: String,
    pub status: Option<u16>,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure { status: err.status().map(|s| s.as_u16()), message: err.to_string() }
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure { message: message.to_string(), status: None }
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure { message, status: None }
    }
}

/// Fetch lifecycle shared by every view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(Failure),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.failure().map(|f| f.message.as_str())
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ViewState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Handed out by [`Loader::begin`]; a result is only applied while its ticket is current.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    pub cancel: CancellationToken,
}

/// Guards a view against responses that arrive after the view moved on.
///
/// Starting a new load cancels the previous one; unmounting cancels the
/// current one and rejects everything afterwards.
#[derive(Debug)]
pub struct Loader {
    generation: u64,
    current: Option<CancellationToken>,
    mounted: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self { generation: 0, current: None, mounted: true }
    }
}

impl Loader {
    pub fn begin(&mut self) -> LoadTicket {
        self.begin_under(None)
    }

    /// Like `begin`, but the ticket is also cancelled when `parent` is.
    pub fn begin_under(&mut self, parent: Option<&CancellationToken>) -> LoadTicket {
        if let Some(prev) = self.current.take() {
            prev.cancel();
        }
        self.generation += 1;
        let cancel = parent.map(CancellationToken::child_token).unwrap_or_else(CancellationToken::new);
        self.current = Some(cancel.clone());
        LoadTicket { generation: self.generation, cancel }
    }

    pub fn accepts(&self, ticket: &LoadTicket) -> bool {
        self.mounted && ticket.generation == self.generation
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        if let Some(current) = self.current.take() {
            current.cancel();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// Applies a finished fetch to `state` unless the ticket went stale.
/// Returns whether the state changed.
pub fn settle<T, E: Into<Failure>>(
    loader: &Loader,
    ticket: &LoadTicket,
    state: &mut ViewState<T>,
    result: Result<T, E>,
) -> bool {
    if !loader.accepts(ticket) {
        return false;
    }
    *state = match result {
        Ok(data) => ViewState::Ready(data),
        Err(err) => ViewState::Failed(err.into()),
    };
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_load_supersedes_older() {
        let mut loader = Loader::default();
        let mut state: ViewState<u32> = ViewState::Loading;

        let first = loader.begin();
        let second = loader.begin();
        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());

        assert!(!settle(&loader, &first, &mut state, Ok::<_, String>(1)));
        assert!(state.is_loading());
        assert!(settle(&loader, &second, &mut state, Ok::<_, String>(2)));
        assert_eq!(state.data(), Some(&2));
    }

    #[test]
    fn unmounted_view_ignores_results() {
        let mut loader = Loader::default();
        let mut state: ViewState<u32> = ViewState::Loading;
        let ticket = loader.begin();

        loader.unmount();
        assert!(ticket.cancel.is_cancelled());
        assert!(!loader.is_mounted());
        assert!(!settle(&loader, &ticket, &mut state, Err::<u32, _>("boom")));
        assert!(state.error().is_none());
    }

    #[test]
    fn parent_cancellation_reaches_ticket() {
        let parent = CancellationToken::new();
        let mut loader = Loader::default();
        let ticket = loader.begin_under(Some(&parent));
        assert!(!ticket.cancel.is_cancelled());
        parent.cancel();
        assert!(ticket.cancel.is_cancelled());
    }

    #[test]
    fn failure_keeps_message() {
        let mut loader = Loader::default();
        let mut state: ViewState<u32> = ViewState::Idle;
        let ticket = loader.begin();
        settle(&loader, &ticket, &mut state, Err::<u32, _>("HTTP 504 Gateway Timeout"));
        assert_eq!(state.error(), Some("HTTP 504 Gateway Timeout"));
        assert!(state.data().is_none());
    }

    #[test]
    fn api_failures_keep_their_status() {
        let mut loader = Loader::default();
        let mut state: ViewState<u32> = ViewState::Loading;
        let ticket = loader.begin();
        let err = ApiError::from_response(
            reqwest::StatusCode::NOT_FOUND,
            Some("Not Found"),
            br#"{"detail": "Dataset not found"}"#,
        );
        settle(&loader, &ticket, &mut state, Err::<u32, _>(err));
        assert_eq!(
            state.failure(),
            Some(&Failure { message: "Dataset not found".into(), status: Some(404) })
        );

        let cancelled = Failure::from(ApiError::Cancelled);
        assert_eq!(cancelled.status, None);
    }
}
