use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::types::{ComparisonAnalysisResponse, DatasetComparisonResponse, DatasetId};
use crate::api::{ApiError, CallOptions, DatasetsClient};

use super::state::{settle, LoadTicket, Loader, ViewState};

pub const INVALID_IDS: &str = "invalid dataset id";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareBundle {
    pub comparison: DatasetComparisonResponse,
    pub analysis: ComparisonAnalysisResponse,
}

pub async fn fetch(
    client: &DatasetsClient,
    base: DatasetId,
    target: DatasetId,
    opts: &CallOptions,
) -> Result<CompareBundle, ApiError> {
    let (comparison, analysis) = tokio::try_join!(
        client.compare(base, target, opts),
        client.compare_analysis(base, target, opts),
    )?;
    Ok(CompareBundle { comparison, analysis })
}

#[derive(Debug)]
pub struct CompareView {
    base: Option<DatasetId>,
    target: Option<DatasetId>,
    pub state: ViewState<CompareBundle>,
    loader: Loader,
}

impl CompareView {
    pub fn new(base: Option<DatasetId>, target: Option<DatasetId>) -> Self {
        Self { base, target, state: ViewState::Idle, loader: Loader::default() }
    }

    pub fn ids(&self) -> Option<(DatasetId, DatasetId)> {
        self.base.zip(self.target)
    }

    /// New route parameters invalidate whatever is in flight for the old pair.
    pub fn navigate(&mut self, base: Option<DatasetId>, target: Option<DatasetId>) -> LoadTicket {
        self.base = base;
        self.target = target;
        self.begin()
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.begin_under(None)
    }

    fn begin_under(&mut self, parent: Option<&CancellationToken>) -> LoadTicket {
        self.state = ViewState::Loading;
        self.loader.begin_under(parent)
    }

    pub fn apply(&mut self, ticket: &LoadTicket, result: Result<CompareBundle, ApiError>) -> bool {
        settle(&self.loader, ticket, &mut self.state, result)
    }

    /// Missing ids fail locally; equal ids are left for the backend to reject.
    pub async fn load(&mut self, client: &DatasetsClient, opts: &CallOptions) -> bool {
        let ticket = self.begin_under(opts.cancel.as_ref());
        let Some((base, target)) = self.ids() else {
            self.state = ViewState::Failed(INVALID_IDS.into());
            return true;
        };
        let result = fetch(client, base, target, &opts.with_cancel(ticket.cancel.clone())).await;
        self.apply(&ticket, result)
    }

    pub fn unmount(&mut self) {
        self.loader.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::api::transport::MockTransport;
    use crate::api::ClientConfig;
    use serde_json::json;

    fn client(mock: Arc<MockTransport>) -> DatasetsClient {
        DatasetsClient::with_transport(ClientConfig { base_url: Some("http://example.test".into()) }, mock)
    }

    fn dataset_ref(id: i64, rows: i64) -> serde_json::Value {
        json!({"dataset_id": id, "filename": format!("d{id}.csv"), "created_at": "2025-01-02T03:04:05", "rows": rows})
    }

    fn push_pair(mock: &MockTransport) {
        mock.push_json(200, &json!({
            "base_dataset": dataset_ref(1, 3),
            "target_dataset": dataset_ref(2, 4),
            "comparison": {"rows_change": {"base": 3, "target": 4, "diff": 1, "percent": 33.33}, "columns_change": []}
        }));
        mock.push_json(200, &json!({
            "base_dataset": dataset_ref(1, 3),
            "target_dataset": dataset_ref(2, 4),
            "comparison_summary": {"rows_change": {"base": 3, "target": 4, "diff": 1, "percent": 33.33}, "significant_changes": []},
            "analysis_text": "steady",
            "generated_at": "2025-01-03T00:00:00"
        }));
    }

    #[tokio::test]
    async fn both_requests_are_in_flight_together() {
        let mock = Arc::new(MockTransport::gated(2));
        push_pair(&mock);
        let mut view = CompareView::new(Some(1), Some(2));

        let loaded = tokio::time::timeout(
            Duration::from_secs(5),
            view.load(&client(mock.clone()), &CallOptions::default()),
        )
        .await
        .expect("comparison and analysis should be requested together");
        assert!(loaded);
        assert_eq!(view.state.data().map(|b| b.analysis.analysis_text.as_str()), Some("steady"));
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn first_failure_settles_without_waiting_for_analysis() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(404, &json!({"detail": "Dataset not found"}));
        mock.push_hang();
        let mut view = CompareView::new(Some(1), Some(99));

        tokio::time::timeout(Duration::from_secs(5), view.load(&client(mock), &CallOptions::default()))
            .await
            .expect("a failed request should not wait on the other one");
        assert_eq!(view.state.error(), Some("Dataset not found"));
        assert_eq!(view.state.failure().and_then(|f| f.status), Some(404));
    }

    #[tokio::test]
    async fn navigating_to_new_ids_drops_the_old_result() {
        let mock = Arc::new(MockTransport::new());
        push_pair(&mock);
        let client = client(mock);
        let mut view = CompareView::new(Some(1), Some(2));

        let stale = view.begin();
        let result = fetch(&client, 1, 2, &CallOptions::default()).await;
        let _fresh = view.navigate(Some(3), Some(4));

        assert!(stale.cancel.is_cancelled());
        assert!(!view.apply(&stale, result));
        assert!(view.state.is_loading());
        assert_eq!(view.ids(), Some((3, 4)));
    }

    #[tokio::test]
    async fn loads_comparison_and_analysis() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, &json!({
            "base_dataset": dataset_ref(1, 3),
            "target_dataset": dataset_ref(2, 4),
            "comparison": {"rows_change": {"base": 3, "target": 4, "diff": 1, "percent": 33.33}, "columns_change": []}
        }));
        mock.push_json(200, &json!({
            "base_dataset": dataset_ref(1, 3),
            "target_dataset": dataset_ref(2, 4),
            "comparison_summary": {
                "rows_change": {"base": 3, "target": 4, "diff": 1, "percent": 33.33},
                "significant_changes": [{"column_name": "price", "change_type": "avg", "base_value": 200.0,
                                         "target_value": 287.5, "diff": 87.5, "percent": 43.75}]
            },
            "analysis_text": "prices went up",
            "generated_at": "2025-01-03T00:00:00"
        }));
        let mut view = CompareView::new(Some(1), Some(2));

        assert!(view.load(&client(mock.clone()), &CallOptions::default()).await);
        let bundle = view.state.data().unwrap();
        assert_eq!(bundle.comparison.comparison.rows_change.diff, 1);
        assert_eq!(bundle.analysis.comparison_summary.significant_changes[0].column_name, "price");
        let urls: Vec<String> = mock.calls().into_iter().map(|c| c.url).collect();
        assert_eq!(urls, vec![
            "http://example.test/datasets/compare?base=1&target=2",
            "http://example.test/datasets/compare/analysis?base=1&target=2",
        ]);
    }

    #[tokio::test]
    async fn missing_ids_fail_without_network() {
        let mock = Arc::new(MockTransport::new());
        let mut view = CompareView::new(None, Some(2));

        view.load(&client(mock.clone()), &CallOptions::default()).await;
        assert_eq!(view.state.error(), Some(INVALID_IDS));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn same_ids_show_backend_message() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(400, &json!({"detail": "Cannot compare dataset with itself"}));
        mock.push_json(400, &json!({"detail": "Cannot compare dataset with itself"}));
        let mut view = CompareView::new(Some(5), Some(5));

        view.load(&client(mock), &CallOptions::default()).await;
        assert_eq!(view.state.error(), Some("Cannot compare dataset with itself"));
    }
}
