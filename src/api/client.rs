use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::config::{resolve_base_url, CallOptions, ClientConfig};
use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, HttpTransport, RequestBody, Transport, UploadFile};
use super::types::*;

/// Typed client for the dataset backend. Bodies are returned exactly as the
/// server shaped them; failures go through [`super::error::error_message`].
#[derive(Clone)]
pub struct DatasetsClient {
    transport: Arc<dyn Transport>,
    cfg: ClientConfig,
}

impl DatasetsClient {
    pub fn new(cfg: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_transport(cfg, Arc::new(HttpTransport::new()?)))
    }

    pub fn with_transport(cfg: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, cfg }
    }

    pub fn base_url(&self, opts: &CallOptions) -> String {
        resolve_base_url(opts.base_url.as_deref(), self.cfg.base_url.as_deref())
    }

    fn endpoint(&self, opts: &CallOptions, path: &str) -> String {
        format!("{}{}", self.base_url(opts), path)
    }

    pub async fn upload(&self, file: UploadFile, opts: &CallOptions) -> Result<UploadDatasetResponse, ApiError> {
        let request = ApiRequest {
            method: Method::POST,
            url: self.endpoint(opts, "/datasets/upload"),
            body: RequestBody::Multipart { field: "file", file },
        };
        decode(self.dispatch(request, opts).await?)
    }

    pub async fn list(&self, opts: &CallOptions) -> Result<GetDatasetsResponse, ApiError> {
        self.get_json("/datasets".to_string(), opts).await
    }

    pub async fn detail(&self, id: DatasetId, opts: &CallOptions) -> Result<DatasetDetail, ApiError> {
        self.get_json(format!("/datasets/{id}"), opts).await
    }

    pub async fn stats(&self, id: DatasetId, opts: &CallOptions) -> Result<DatasetStats, ApiError> {
        self.get_json(format!("/datasets/{id}/stats"), opts).await
    }

    pub async fn analysis(&self, id: DatasetId, opts: &CallOptions) -> Result<DatasetAnalysis, ApiError> {
        self.get_json(format!("/datasets/{id}/analysis"), opts).await
    }

    pub async fn compare(
        &self,
        base: DatasetId,
        target: DatasetId,
        opts: &CallOptions,
    ) -> Result<DatasetComparisonResponse, ApiError> {
        self.get_json(format!("/datasets/compare?base={base}&target={target}"), opts).await
    }

    pub async fn compare_analysis(
        &self,
        base: DatasetId,
        target: DatasetId,
        opts: &CallOptions,
    ) -> Result<ComparisonAnalysisResponse, ApiError> {
        self.get_json(format!("/datasets/compare/analysis?base={base}&target={target}"), opts).await
    }

    pub async fn remove(&self, id: DatasetId, opts: &CallOptions) -> Result<(), ApiError> {
        let request = ApiRequest {
            method: Method::DELETE,
            url: self.endpoint(opts, &format!("/datasets/{id}")),
            body: RequestBody::Empty,
        };
        // 204: nothing to parse
        self.dispatch(request, opts).await.map(|_| ())
    }

    pub async fn health(&self, opts: &CallOptions) -> Result<HealthResponse, ApiError> {
        self.get_json("/health".to_string(), opts).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: String, opts: &CallOptions) -> Result<T, ApiError> {
        let request = ApiRequest {
            method: Method::GET,
            url: self.endpoint(opts, &path),
            body: RequestBody::Empty,
        };
        decode(self.dispatch(request, opts).await?)
    }

    async fn dispatch(&self, request: ApiRequest, opts: &CallOptions) -> Result<ApiResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "api request");
        let send = self.transport.send(request);
        let response = match &opts.cancel {
            Some(ct) => tokio::select! {
                biased;
                _ = ct.cancelled() => return Err(ApiError::Cancelled),
                res = send => res?,
            },
            None => send.await?,
        };
        if !response.status.is_success() {
            let err = ApiError::from_response(response.status, response.reason.as_deref(), &response.body);
            debug!(status = response.status.as_u16(), error = %err, "api request failed");
            return Err(err);
        }
        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(ApiError::Decode)
}
