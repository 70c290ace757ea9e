use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::types::{DatasetAnalysis, DatasetDetail, DatasetId, DatasetStats};
use crate::api::{ApiError, CallOptions, DatasetsClient};

use super::route::Route;
use super::state::{settle, Failure, LoadTicket, Loader, ViewState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailBundle {
    pub detail: DatasetDetail,
    pub stats: DatasetStats,
    pub analysis: DatasetAnalysis,
}

/// Detail, stats and analysis are requested together; the first failure wins
/// and the other results are dropped.
pub async fn fetch(client: &DatasetsClient, id: DatasetId, opts: &CallOptions) -> Result<DetailBundle, ApiError> {
    let (detail, stats, analysis) = tokio::try_join!(
        client.detail(id, opts),
        client.stats(id, opts),
        client.analysis(id, opts),
    )?;
    Ok(DetailBundle { detail, stats, analysis })
}

pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Declined,
    Deleted { next: Route },
    Failed(Failure),
}

#[derive(Debug)]
pub struct DetailView {
    id: DatasetId,
    pub state: ViewState<DetailBundle>,
    deleting: bool,
    delete_error: Option<Failure>,
    loader: Loader,
}

impl DetailView {
    pub fn new(id: DatasetId) -> Self {
        Self { id, state: ViewState::Idle, deleting: false, delete_error: None, loader: Loader::default() }
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    /// Switching datasets invalidates whatever is in flight for the old one.
    pub fn navigate(&mut self, id: DatasetId) -> LoadTicket {
        self.id = id;
        self.begin()
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.begin_under(None)
    }

    fn begin_under(&mut self, parent: Option<&CancellationToken>) -> LoadTicket {
        self.state = ViewState::Loading;
        self.delete_error = None;
        self.loader.begin_under(parent)
    }

    pub fn apply(&mut self, ticket: &LoadTicket, result: Result<DetailBundle, ApiError>) -> bool {
        settle(&self.loader, ticket, &mut self.state, result)
    }

    pub async fn load(&mut self, client: &DatasetsClient, opts: &CallOptions) -> bool {
        let ticket = self.begin_under(opts.cancel.as_ref());
        let result = fetch(client, self.id, &opts.with_cancel(ticket.cancel.clone())).await;
        self.apply(&ticket, result)
    }

    pub fn unmount(&mut self) {
        self.loader.unmount();
    }

    pub fn can_delete(&self) -> bool {
        !self.deleting
    }

    pub fn delete_error(&self) -> Option<&str> {
        self.delete_error.as_ref().map(|f| f.message.as_str())
    }

    /// The question put to the user before deleting.
    pub fn delete_prompt(&self) -> String {
        let label = self
            .state
            .data()
            .map(|b| format!("dataset {} ({})", self.id, b.detail.filename))
            .unwrap_or_else(|| format!("dataset {}", self.id));
        format!("Delete {label}? This cannot be undone.")
    }

    pub async fn delete(
        &mut self,
        client: &DatasetsClient,
        opts: &CallOptions,
        confirm: &dyn Confirm,
    ) -> DeleteOutcome {
        if !confirm.confirm(&self.delete_prompt()) {
            return DeleteOutcome::Declined;
        }

        self.deleting = true;
        self.delete_error = None;
        let result = client.remove(self.id, opts).await;
        self.deleting = false;
        match result {
            Ok(()) => DeleteOutcome::Deleted { next: Route::List },
            Err(err) => {
                let failure = Failure::from(err);
                self.delete_error = Some(failure.clone());
                DeleteOutcome::Failed(failure)
            }
        }
    }
}
