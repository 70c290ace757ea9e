pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use client::DatasetsClient;
pub use config::{CallOptions, ClientConfig};
pub use error::ApiError;
pub use transport::UploadFile;
