pub mod list;
pub mod upload;
pub mod detail;
pub mod compare;
pub mod remove;
pub mod open;
pub mod health;
