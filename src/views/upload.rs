use crate::api::types::UploadDatasetResponse;
use crate::api::{CallOptions, DatasetsClient, UploadFile};

use super::route::Route;
use super::state::Failure;

pub const NO_FILE_SELECTED: &str = "select a CSV file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Uploading,
}

#[derive(Debug)]
pub struct UploadView {
    selected: Option<UploadFile>,
    phase: UploadPhase,
    pub result: Option<UploadDatasetResponse>,
    error: Option<Failure>,
}

impl Default for UploadView {
    fn default() -> Self {
        Self { selected: None, phase: UploadPhase::Idle, result: None, error: None }
    }
}

impl UploadView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, file: Option<UploadFile>) {
        self.selected = file;
    }

    pub fn selected(&self) -> Option<&UploadFile> {
        self.selected.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|f| f.message.as_str())
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.error.as_ref()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn can_upload(&self) -> bool {
        self.selected.is_some() && self.phase == UploadPhase::Idle
    }

    /// Always ends back in `Idle`, whatever the outcome.
    pub async fn upload(&mut self, client: &DatasetsClient, opts: &CallOptions) -> bool {
        let Some(file) = self.selected.clone() else {
            self.error = Some(NO_FILE_SELECTED.into());
            return false;
        };
        if self.phase == UploadPhase::Uploading {
            return false;
        }

        self.phase = UploadPhase::Uploading;
        self.result = None;
        self.error = None;
        let outcome = client.upload(file, opts).await;
        self.phase = UploadPhase::Idle;

        match outcome {
            Ok(resp) => {
                self.result = Some(resp);
                true
            }
            Err(err) => {
                self.error = Some(err.into());
                false
            }
        }
    }

    /// Where "view details" leads once an upload succeeded.
    pub fn detail_route(&self) -> Option<Route> {
        self.result.as_ref().map(|r| Route::Detail(r.dataset_id))
    }
}
