pub mod api;
pub mod cmd;
pub mod export;
pub mod output;
pub mod telemetry;
pub mod util;
pub mod views;
