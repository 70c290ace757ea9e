use crate::api::types::{Dataset, DatasetId};
use crate::api::{CallOptions, DatasetsClient};

use super::route::Route;
use super::state::{settle, Loader, ViewState};

pub const MAX_SELECTION: usize = 2;
pub const NO_DATASETS: &str = "no datasets yet";

/// Dataset list with a two-slot selection for comparisons.
#[derive(Debug)]
pub struct ListView {
    pub state: ViewState<Vec<Dataset>>,
    selection: Vec<DatasetId>,
    loader: Loader,
}

impl Default for ListView {
    fn default() -> Self {
        Self { state: ViewState::Idle, selection: Vec::new(), loader: Loader::default() }
    }
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, client: &DatasetsClient, opts: &CallOptions) -> bool {
        let ticket = self.loader.begin_under(opts.cancel.as_ref());
        self.state = ViewState::Loading;
        let result = client
            .list(&opts.with_cancel(ticket.cancel.clone()))
            .await
            .map(|resp| resp.datasets);
        settle(&self.loader, &ticket, &mut self.state, result)
    }

    pub fn unmount(&mut self) {
        self.loader.unmount();
    }

    pub fn datasets(&self) -> &[Dataset] {
        self.state.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.state.data().is_some_and(Vec::is_empty)
    }

    /// Toggle membership; a third id is ignored while two are selected.
    pub fn toggle(&mut self, id: DatasetId) {
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else if self.selection.len() < MAX_SELECTION {
            self.selection.push(id);
        }
    }

    pub fn selection(&self) -> &[DatasetId] {
        &self.selection
    }

    pub fn can_compare(&self) -> bool {
        self.selection.len() == MAX_SELECTION
    }

    /// Selection order decides base and target.
    pub fn compare_route(&self) -> Option<Route> {
        match self.selection.as_slice() {
            [base, target] => Some(Route::compare(*base, *target)),
            _ => None,
        }
    }

    /// Drop a deleted dataset from local state and from the selection.
    pub fn purge(&mut self, id: DatasetId) {
        if let Some(datasets) = self.state.data_mut() {
            datasets.retain(|d| d.dataset_id != id);
        }
        self.selection.retain(|s| *s != id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::transport::MockTransport;
    use crate::api::ClientConfig;
    use serde_json::json;

    fn client(mock: Arc<MockTransport>) -> DatasetsClient {
        DatasetsClient::with_transport(ClientConfig { base_url: Some("http://example.test".into()) }, mock)
    }

    #[test]
    fn selection_is_capped_at_two() {
        let mut view = ListView::new();
        view.toggle(3);
        assert!(!view.can_compare());
        view.toggle(1);
        view.toggle(7);
        assert_eq!(view.selection(), &[3, 1]);
        assert!(view.can_compare());
        assert_eq!(view.compare_route(), Some(Route::compare(3, 1)));

        view.toggle(3);
        assert_eq!(view.selection(), &[1]);
        assert_eq!(view.compare_route(), None);
        view.toggle(7);
        assert_eq!(view.compare_route(), Some(Route::compare(1, 7)));
    }

    #[tokio::test]
    async fn load_success_and_purge() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, &json!({"datasets": [
            {"dataset_id": 1, "filename": "a.csv", "created_at": "2025-01-01T00:00:00", "row_count": 4},
            {"dataset_id": 2, "filename": "b.csv", "created_at": "2025-01-02T00:00:00", "row_count": 5}
        ]}));
        let mut view = ListView::new();
        view.toggle(2);

        assert!(view.load(&client(mock), &CallOptions::default()).await);
        assert_eq!(view.datasets().len(), 2);

        view.purge(2);
        assert_eq!(view.datasets().len(), 1);
        assert!(view.selection().is_empty());
    }

    #[tokio::test]
    async fn empty_list_is_not_an_error() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, &json!({"datasets": []}));
        let mut view = ListView::new();

        view.load(&client(mock), &CallOptions::default()).await;
        assert!(view.is_empty());
        assert!(view.state.error().is_none());
    }

    #[tokio::test]
    async fn load_failure_shows_message() {
        let mock = Arc::new(MockTransport::new());
        mock.push_raw(500, "Internal Server Error", "");
        let mut view = ListView::new();

        view.load(&client(mock), &CallOptions::default()).await;
        assert_eq!(view.state.error(), Some("HTTP 500 Internal Server Error"));
        assert!(view.datasets().is_empty());
    }
}
